pub use crate::error::*;

mod auth;
mod database;
mod entity;
mod error;
mod event;
mod job;
mod modify;
mod query;
mod storage;

#[cfg(feature = "prelude")]
pub mod prelude {
    pub mod entity {
        pub use crate::entity::*;
    }
}

#[cfg(feature = "interface")]
pub mod interface {
    pub mod auth {
        pub use crate::auth::*;
    }
    pub mod database {
        pub use crate::database::*;
    }
    pub mod event {
        pub use crate::event::*;
    }
    pub mod query {
        pub use crate::query::*;
    }
    pub mod storage {
        pub use crate::storage::*;
    }
    pub mod update {
        pub use crate::modify::*;
    }
    pub mod job {
        pub use crate::job::*;
    }
}
