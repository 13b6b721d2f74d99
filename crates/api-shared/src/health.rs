use crate::messages::HealthRes;

/// Plain-text liveness confirmation served at `GET /`.
pub const LIVENESS_MESSAGE: &str = "Server is up and running!";

/// Simple health service shared by the REST API and any future surface
///
/// This service provides a standardised way to report that the process is alive.
/// It never touches the store.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    pub fn new() -> Self {
        Self
    }

    /// Reports the service as healthy without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Liaison MDX is alive".into(),
        }
    }

    /// The plain-text body returned by the root liveness route.
    pub fn liveness() -> &'static str {
        LIVENESS_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_health_reports_ok() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert!(!res.message.is_empty());
    }

    #[test]
    fn test_liveness_message() {
        assert_eq!(HealthService::liveness(), "Server is up and running!");
    }
}
