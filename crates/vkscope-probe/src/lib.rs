//! Driver capability enumeration for `vkscope`.
//!
//! Queries the Vulkan driver stack for platform extensions, instance layers,
//! and physical devices, and assembles the results into a
//! [`vkscope_report::Report`]. The driver is reached through the
//! [`driver::CapabilityDriver`] seam, with two interchangeable backends:
//! [`ash_driver::AshDriver`] over the real Vulkan loader, and
//! [`fake::FakeDriver`] over deterministic canned data for tests and offline
//! smoke runs.

pub mod ash_driver;
pub mod driver;
pub mod enumerate;
pub mod fake;
#[cfg(feature = "xcb-window")]
pub mod window;

use std::fmt;

use thiserror::Error;
use tracing::debug;
use vkscope_report::{LayerDescriptor, Report, StatusCode};

use crate::driver::{CapabilityDriver, DriverContext};
pub use crate::enumerate::{create_context, enumerate_devices, enumerate_layers, list_extensions};

// ── Errors ───────────────────────────────────────────────────────────────────

/// The enumeration that a failed query was serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    GlobalExtensions,
    LayerExtensions(String),
    Layers,
    Devices,
    DeviceIdentity,
    DeviceMemory,
    QueueFamilies,
}

impl QueryScope {
    /// Scope for an extension query; `None` is the global scope.
    pub fn extensions(layer: Option<&str>) -> Self {
        match layer {
            None => Self::GlobalExtensions,
            Some(name) => Self::LayerExtensions(name.to_string()),
        }
    }
}

impl fmt::Display for QueryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GlobalExtensions => f.write_str("platform extensions"),
            Self::LayerExtensions(layer) => write!(f, "extensions of layer '{layer}'"),
            Self::Layers => f.write_str("instance layers"),
            Self::Devices => f.write_str("physical devices"),
            Self::DeviceIdentity => f.write_str("device identity properties"),
            Self::DeviceMemory => f.write_str("device memory properties"),
            Self::QueueFamilies => f.write_str("queue family properties"),
        }
    }
}

/// Errors produced by the probe pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The Vulkan loader could not be loaded at all.
    #[error("failed to load the vulkan loader: {0}")]
    Loader(String),

    /// A count/fill query failed or returned an unexpected status.
    #[error("driver query failed while enumerating {scope}: {status}")]
    DriverQuery { scope: QueryScope, status: StatusCode },

    /// The driver context could not be created. Fatal to the whole run.
    #[error("driver context creation failed: {status}")]
    ContextCreation { status: StatusCode },
}

// ── Layer activation policy ──────────────────────────────────────────────────

/// Which of the discovered layers to activate at context creation.
///
/// The reference behavior enables every discovered layer, unfiltered; that
/// stays the default. The policy exists so callers can opt out without the
/// pipeline silently changing the historical behavior.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LayerPolicy {
    /// Activate every discovered layer, in discovery order (reference
    /// behavior).
    #[default]
    EnableAll,
    /// Activate no layers.
    EnableNone,
    /// Activate exactly the named layers, in the given order.
    Explicit(Vec<String>),
}

impl LayerPolicy {
    /// Resolve the policy against the discovered layer set.
    pub fn resolve(&self, discovered: &[LayerDescriptor]) -> Vec<String> {
        match self {
            Self::EnableAll => discovered.iter().map(|layer| layer.name.clone()).collect(),
            Self::EnableNone => Vec::new(),
            Self::Explicit(names) => names.clone(),
        }
    }
}

/// Options for one probe run.
#[derive(Debug, Clone, Default)]
pub struct ProbeOptions {
    pub layer_policy: LayerPolicy,
}

// ── Snapshot ─────────────────────────────────────────────────────────────────

/// The assembled report plus exclusive ownership of the driver context it was
/// derived from.
///
/// All report data is copied out of the driver eagerly, so nothing in
/// [`Report`] can dangle; the context is released exactly once when the
/// snapshot is dropped.
pub struct CapabilitySnapshot {
    pub report: Report,
    context: Box<dyn DriverContext>,
}

impl CapabilitySnapshot {
    /// Layer names recorded by the context at creation, verbatim and in
    /// activation order.
    pub fn enabled_layers(&self) -> &[String] {
        self.context.enabled_layers()
    }
}

impl fmt::Debug for CapabilitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilitySnapshot")
            .field("report", &self.report)
            .field("enabled_layers", &self.context.enabled_layers())
            .finish()
    }
}

/// Run the full enumeration sequence and assemble the report.
///
/// Order: global extensions, layers (with per-layer extensions), context
/// creation with the layers the policy selects, then devices. Any failure
/// aborts immediately; a context created before a later failure is released
/// by drop on the error path.
pub fn probe(
    driver: &dyn CapabilityDriver,
    options: &ProbeOptions,
) -> Result<CapabilitySnapshot, ProbeError> {
    let extensions = list_extensions(driver, None)?;
    debug!("found {} platform extension(s)", extensions.len());

    let layers = enumerate_layers(driver)?;
    debug!("found {} instance layer(s)", layers.len());

    let enabled = options.layer_policy.resolve(&layers);
    let context = create_context(driver, &enabled)?;

    let devices = enumerate_devices(context.as_ref())?;
    debug!("found {} physical device(s)", devices.len());

    Ok(CapabilitySnapshot { report: Report { extensions, layers, devices }, context })
}
