use std::net::SocketAddr;
use std::time::Duration;

use error_stack::{Report, ResultExt};
use vodca::References;

use kernel::interface::job::SweepConfig;
use kernel::KernelError;

static SERVER_BIND: &str = "SERVER_BIND";
static COMPLETION_SWEEP_SECS: &str = "COMPLETION_SWEEP_SECS";

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, References)]
pub struct ServerConfig {
    bind: SocketAddr,
    sweep: SweepConfig,
}

impl ServerConfig {
    pub fn from_env() -> error_stack::Result<Self, KernelError> {
        let bind = dotenvy::var(SERVER_BIND).unwrap_or_else(|_| DEFAULT_BIND.to_string());
        let bind = bind
            .parse::<SocketAddr>()
            .change_context_lazy(|| KernelError::Internal)
            .attach_printable_lazy(|| format!("Invalid {SERVER_BIND}: {bind}"))?;

        let sweep = match dotenvy::var(COMPLETION_SWEEP_SECS) {
            Err(_) => SweepConfig::default(),
            Ok(secs) => {
                let secs = secs
                    .parse::<u64>()
                    .change_context_lazy(|| KernelError::Internal)
                    .attach_printable_lazy(|| format!("Invalid {COMPLETION_SWEEP_SECS}: {secs}"))?;
                if secs == 0 {
                    return Err(Report::new(KernelError::Internal)
                        .attach_printable(format!("{COMPLETION_SWEEP_SECS} must be positive")));
                }
                SweepConfig::new(Duration::from_secs(secs))
            }
        };
        Ok(Self { bind, sweep })
    }
}
