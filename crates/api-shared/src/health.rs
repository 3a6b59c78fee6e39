use crate::dto::HealthRes;

/// Simple health service shared by the vstore entry points.
///
/// Reports liveness only; it does not check the storage root.
#[derive(Clone, Debug)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "vstore is alive".into(),
        }
    }
}
