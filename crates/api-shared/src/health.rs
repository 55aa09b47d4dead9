use crate::models::HealthRes;
use vault_core::constants::{APP_VERSION, PIPELINE_DESCRIPTION};

/// Health check shared by every API surface.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Health response for the given surface, e.g. `"REST"`.
    pub fn check_health(mode: &str) -> HealthRes {
        HealthRes {
            status: "running".into(),
            mode: mode.into(),
            version: APP_VERSION.into(),
            pipeline: PIPELINE_DESCRIPTION.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_reports_running() {
        let res = HealthService::check_health("REST");
        assert_eq!(res.status, "running");
        assert_eq!(res.mode, "REST");
        assert_eq!(res.version, "2.1.0");
    }
}
