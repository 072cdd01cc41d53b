//! The seam between the enumeration pipeline and the native driver.
//!
//! Every enumeration the driver offers is exposed as a count/fill pair so the
//! two-phase query idiom stays explicit and testable. [`AshDriver`] implements
//! these traits over the real Vulkan loader; [`FakeDriver`] implements them
//! over canned data.
//!
//! [`AshDriver`]: crate::ash_driver::AshDriver
//! [`FakeDriver`]: crate::fake::FakeDriver

use vkscope_report::{
    CapabilityExtension, DeviceHandle, DeviceIdentity, MemoryProfile, QueueFamilyCapability,
    StatusCode,
};

/// Result of a single driver entry point.
pub type DriverResult<T> = Result<T, StatusCode>;

/// Raw layer record as reported by the driver, before extensions are
/// attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRecord {
    pub name: String,
    pub description: String,
    pub spec_version: u32,
    pub implementation_version: u32,
}

/// Pre-context capability queries plus context creation.
pub trait CapabilityDriver {
    /// Count phase of the extension query. `scope` of `None` means global
    /// platform extensions; a layer name scopes the query to that layer.
    fn extension_count(&self, scope: Option<&str>) -> DriverResult<u32>;

    /// Fill phase of the extension query; `count` is the value the count
    /// phase returned.
    fn extension_fill(
        &self,
        scope: Option<&str>,
        count: u32,
    ) -> DriverResult<Vec<CapabilityExtension>>;

    /// Count phase of the instance layer query.
    fn layer_count(&self) -> DriverResult<u32>;

    /// Fill phase of the instance layer query.
    fn layer_fill(&self, count: u32) -> DriverResult<Vec<LayerRecord>>;

    /// Create the top-level driver context with the given layers activated.
    ///
    /// Fixed identity metadata (application/engine name and version, requested
    /// API version) is a static constant of the implementation, not caller
    /// supplied. The discovered platform extensions are informational only;
    /// none are requested at creation time.
    fn create_context(&self, enabled_layers: &[String]) -> DriverResult<Box<dyn DriverContext>>;
}

/// Queries that require a live driver context.
///
/// Implementors release the underlying context exactly once, in `Drop`.
/// Device handles obtained through this trait are driver-owned and valid only
/// while the context is alive.
pub trait DriverContext {
    /// Layer names that were activated at creation, verbatim and in order.
    fn enabled_layers(&self) -> &[String];

    /// Count phase of the physical device query.
    fn device_count(&self) -> DriverResult<u32>;

    /// Fill phase of the physical device query.
    fn device_fill(&self, count: u32) -> DriverResult<Vec<DeviceHandle>>;

    /// Identity/category properties of one device.
    fn device_identity(&self, device: DeviceHandle) -> DriverResult<DeviceIdentity>;

    /// Memory heap/type properties of one device.
    fn device_memory(&self, device: DeviceHandle) -> DriverResult<MemoryProfile>;

    /// Count phase of the per-device queue family query.
    fn queue_family_count(&self, device: DeviceHandle) -> DriverResult<u32>;

    /// Fill phase of the per-device queue family query.
    fn queue_family_fill(
        &self,
        device: DeviceHandle,
        count: u32,
    ) -> DriverResult<Vec<QueueFamilyCapability>>;
}

/// Run one two-phase count/fill query.
///
/// Queries the count first and short-circuits with an empty `Vec` when it is
/// zero; otherwise fills a buffer of exactly that size. Every enumeration in
/// the pipeline goes through this helper.
pub fn two_phase<T, E>(
    count: impl FnOnce() -> Result<u32, E>,
    fill: impl FnOnce(u32) -> Result<Vec<T>, E>,
) -> Result<Vec<T>, E> {
    let n = count()?;
    if n == 0 {
        return Ok(Vec::new());
    }
    fill(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_short_circuits_without_fill() {
        let result: Result<Vec<u32>, StatusCode> = two_phase(
            || Ok(0),
            |_| panic!("fill phase must not run when the count is zero"),
        );
        assert_eq!(result, Ok(Vec::new()));
    }

    #[test]
    fn fill_receives_the_counted_size() {
        let result: Result<Vec<u32>, StatusCode> = two_phase(
            || Ok(3),
            |n| {
                assert_eq!(n, 3);
                Ok(vec![7; n as usize])
            },
        );
        assert_eq!(result, Ok(vec![7, 7, 7]));
    }

    #[test]
    fn count_failure_propagates() {
        let result: Result<Vec<u32>, StatusCode> = two_phase(
            || Err(StatusCode::INITIALIZATION_FAILED),
            |_| panic!("fill phase must not run when the count fails"),
        );
        assert_eq!(result, Err(StatusCode::INITIALIZATION_FAILED));
    }

    #[test]
    fn fill_failure_propagates() {
        let result: Result<Vec<u32>, StatusCode> =
            two_phase(|| Ok(2), |_| Err(StatusCode::OUT_OF_HOST_MEMORY));
        assert_eq!(result, Err(StatusCode::OUT_OF_HOST_MEMORY));
    }
}
