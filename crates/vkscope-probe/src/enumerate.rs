//! The enumeration pipeline: extensions, layers, context, devices.
//!
//! All functions are synchronous, blocking, and driver-order preserving.
//! A failed query aborts the run; there is no retry and no partial report.

use tracing::debug;
use vkscope_report::{CapabilityExtension, DeviceDescriptor, LayerDescriptor};

use crate::driver::{two_phase, CapabilityDriver, DriverContext};
use crate::{ProbeError, QueryScope};

/// List the capability extensions of one scope.
///
/// `None` queries the global platform extensions; a layer name queries the
/// extensions that layer exposes. An empty result is normal, never an error.
pub fn list_extensions(
    driver: &dyn CapabilityDriver,
    scope: Option<&str>,
) -> Result<Vec<CapabilityExtension>, ProbeError> {
    two_phase(|| driver.extension_count(scope), |n| driver.extension_fill(scope, n)).map_err(
        |status| ProbeError::DriverQuery { scope: QueryScope::extensions(scope), status },
    )
}

/// Enumerate installed instance layers and attach each layer's own extension
/// set immediately after discovery.
///
/// One synchronous extension round trip per layer; zero layers is a normal
/// terminal state. Order matches the driver's reported order.
pub fn enumerate_layers(
    driver: &dyn CapabilityDriver,
) -> Result<Vec<LayerDescriptor>, ProbeError> {
    let records = two_phase(|| driver.layer_count(), |n| driver.layer_fill(n))
        .map_err(|status| ProbeError::DriverQuery { scope: QueryScope::Layers, status })?;

    let mut layers = Vec::with_capacity(records.len());
    for record in records {
        let extensions = list_extensions(driver, Some(&record.name))?;
        debug!("layer {} exposes {} extension(s)", record.name, extensions.len());
        layers.push(LayerDescriptor {
            name: record.name,
            description: record.description,
            spec_version: record.spec_version,
            implementation_version: record.implementation_version,
            extensions,
        });
    }
    Ok(layers)
}

/// Create the driver context with the given layers activated.
///
/// Failure is fatal to the whole run; no fallback context is attempted.
pub fn create_context(
    driver: &dyn CapabilityDriver,
    enabled_layers: &[String],
) -> Result<Box<dyn DriverContext>, ProbeError> {
    debug!("creating driver context with {} enabled layer(s)", enabled_layers.len());
    driver
        .create_context(enabled_layers)
        .map_err(|status| ProbeError::ContextCreation { status })
}

/// Enumerate physical devices and, for each, its identity, memory, and queue
/// family properties.
///
/// The three per-device queries are independent; they are issued in a fixed
/// order here, one device at a time. Zero devices is valid and yields an
/// empty sequence.
pub fn enumerate_devices(
    ctx: &dyn DriverContext,
) -> Result<Vec<DeviceDescriptor>, ProbeError> {
    let handles = two_phase(|| ctx.device_count(), |n| ctx.device_fill(n))
        .map_err(|status| ProbeError::DriverQuery { scope: QueryScope::Devices, status })?;

    let mut devices = Vec::with_capacity(handles.len());
    for handle in handles {
        let identity = ctx.device_identity(handle).map_err(|status| ProbeError::DriverQuery {
            scope: QueryScope::DeviceIdentity,
            status,
        })?;
        let memory = ctx.device_memory(handle).map_err(|status| ProbeError::DriverQuery {
            scope: QueryScope::DeviceMemory,
            status,
        })?;
        let queue_families = two_phase(
            || ctx.queue_family_count(handle),
            |n| ctx.queue_family_fill(handle, n),
        )
        .map_err(|status| ProbeError::DriverQuery { scope: QueryScope::QueueFamilies, status })?;

        debug!("device {} has {} queue familie(s)", identity.name, queue_families.len());
        devices.push(DeviceDescriptor { handle, identity, memory, queue_families });
    }
    Ok(devices)
}
