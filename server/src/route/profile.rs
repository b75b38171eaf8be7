use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use application::service::GetProfileService;

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;

use self::request::{GetRequest, Transformer};
use self::response::{Presenter, ProfileResponse};

mod request;
mod response;

pub trait ProfileRouter {
    fn route_profile(self) -> Self;
}

impl ProfileRouter for Router<AppModule> {
    fn route_profile(self) -> Self {
        self.route(
            "/profiles/:username",
            get(
                |State(module): State<AppModule>, Path(username): Path<String>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(GetRequest::new(username))
                        .handle(|dto| async move { module.get_profile_by_username(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|res| {
                            res.map(ProfileResponse::into_response)
                                .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
                        })
                },
            ),
        )
    }
}
