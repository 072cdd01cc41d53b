//! Deterministic in-memory driver backend.
//!
//! Implements the driver seam over canned capability sets so the pipeline,
//! presenter, and CLI can be exercised without a GPU or a Vulkan loader.
//! Selected at the CLI via `--fake` or the `VKSCOPE_FAKE` environment
//! variable.

use std::cell::Cell;

use vkscope_report::{
    CapabilityExtension, DeviceCategory, DeviceHandle, DeviceIdentity, MemoryHeap, MemoryProfile,
    QueueFamilyCapability, QueueFlags, StatusCode,
};

use crate::driver::{CapabilityDriver, DriverContext, DriverResult, LayerRecord};

/// Fake device handles start here; a zero handle is never valid.
const HANDLE_BASE: u64 = 0x1000;

/// One canned layer with its extension set.
#[derive(Debug, Clone)]
pub struct FakeLayer {
    pub record: LayerRecord,
    pub extensions: Vec<CapabilityExtension>,
}

/// One canned physical device.
#[derive(Debug, Clone)]
pub struct FakeDevice {
    pub identity: DeviceIdentity,
    pub memory: MemoryProfile,
    pub queue_families: Vec<QueueFamilyCapability>,
}

/// Canned capability sets plus injectable failure points.
///
/// All fields are public so tests can shape arbitrary scenarios directly.
#[derive(Debug, Default)]
pub struct FakeDriver {
    pub extensions: Vec<CapabilityExtension>,
    pub layers: Vec<FakeLayer>,
    pub devices: Vec<FakeDevice>,
    /// Fail context creation with this status instead of succeeding.
    pub context_failure: Option<StatusCode>,
    /// Fail the global extension count phase with this status.
    pub extension_failure: Option<StatusCode>,
    contexts_created: Cell<u32>,
}

impl FakeDriver {
    /// A driver reporting nothing at all: zero extensions, layers, devices.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The reference scenario: zero layers, zero extensions, one discrete
    /// device with a single graphics+compute family of one queue.
    pub fn reference() -> Self {
        Self {
            devices: vec![FakeDevice {
                identity: DeviceIdentity {
                    name: "vkscope fake device".to_string(),
                    vendor_id: 0xFFFF,
                    device_id: 0x0001,
                    category: DeviceCategory::DiscreteGpu,
                    api_version: (1 << 22) | (1 << 12),
                    driver_version: 1,
                },
                memory: MemoryProfile {
                    heaps: vec![MemoryHeap { size: 4 * 1024 * 1024 * 1024, device_local: true }],
                    type_count: 2,
                },
                queue_families: vec![QueueFamilyCapability {
                    flags: QueueFlags::GRAPHICS | QueueFlags::COMPUTE,
                    queue_count: 1,
                }],
            }],
            ..Self::default()
        }
    }

    /// Add a validation-style layer exposing one debug extension.
    pub fn with_validation_layer(mut self) -> Self {
        self.layers.push(FakeLayer {
            record: LayerRecord {
                name: "VK_LAYER_FAKE_validation".to_string(),
                description: "fake validation layer".to_string(),
                spec_version: (1 << 22) | (1 << 12),
                implementation_version: 1,
            },
            extensions: vec![CapabilityExtension {
                name: "VK_EXT_debug_utils".to_string(),
                spec_version: 2,
            }],
        });
        self
    }

    /// Make context creation fail with the given status.
    pub fn with_context_failure(mut self, status: StatusCode) -> Self {
        self.context_failure = Some(status);
        self
    }

    /// How many contexts this driver has created so far.
    pub fn contexts_created(&self) -> u32 {
        self.contexts_created.get()
    }

    fn layer_extensions(&self, name: &str) -> DriverResult<&[CapabilityExtension]> {
        self.layers
            .iter()
            .find(|layer| layer.record.name == name)
            .map(|layer| layer.extensions.as_slice())
            .ok_or(StatusCode::LAYER_NOT_PRESENT)
    }
}

impl CapabilityDriver for FakeDriver {
    fn extension_count(&self, scope: Option<&str>) -> DriverResult<u32> {
        match scope {
            None => {
                if let Some(status) = self.extension_failure {
                    return Err(status);
                }
                Ok(self.extensions.len() as u32)
            }
            Some(name) => Ok(self.layer_extensions(name)?.len() as u32),
        }
    }

    fn extension_fill(
        &self,
        scope: Option<&str>,
        count: u32,
    ) -> DriverResult<Vec<CapabilityExtension>> {
        let all = match scope {
            None => self.extensions.as_slice(),
            Some(name) => self.layer_extensions(name)?,
        };
        Ok(all.iter().take(count as usize).cloned().collect())
    }

    fn layer_count(&self) -> DriverResult<u32> {
        Ok(self.layers.len() as u32)
    }

    fn layer_fill(&self, count: u32) -> DriverResult<Vec<LayerRecord>> {
        Ok(self.layers.iter().take(count as usize).map(|layer| layer.record.clone()).collect())
    }

    fn create_context(&self, enabled_layers: &[String]) -> DriverResult<Box<dyn DriverContext>> {
        if let Some(status) = self.context_failure {
            return Err(status);
        }
        self.contexts_created.set(self.contexts_created.get() + 1);
        Ok(Box::new(FakeContext {
            enabled_layers: enabled_layers.to_vec(),
            devices: self.devices.clone(),
        }))
    }
}

/// Context over a cloned device list.
#[derive(Debug)]
pub struct FakeContext {
    enabled_layers: Vec<String>,
    devices: Vec<FakeDevice>,
}

impl FakeContext {
    fn device(&self, handle: DeviceHandle) -> DriverResult<&FakeDevice> {
        handle
            .0
            .checked_sub(HANDLE_BASE)
            .and_then(|index| self.devices.get(index as usize))
            .ok_or(StatusCode::INITIALIZATION_FAILED)
    }
}

impl DriverContext for FakeContext {
    fn enabled_layers(&self) -> &[String] {
        &self.enabled_layers
    }

    fn device_count(&self) -> DriverResult<u32> {
        Ok(self.devices.len() as u32)
    }

    fn device_fill(&self, count: u32) -> DriverResult<Vec<DeviceHandle>> {
        Ok((0..count.min(self.devices.len() as u32))
            .map(|index| DeviceHandle(HANDLE_BASE + u64::from(index)))
            .collect())
    }

    fn device_identity(&self, device: DeviceHandle) -> DriverResult<DeviceIdentity> {
        Ok(self.device(device)?.identity.clone())
    }

    fn device_memory(&self, device: DeviceHandle) -> DriverResult<MemoryProfile> {
        Ok(self.device(device)?.memory.clone())
    }

    fn queue_family_count(&self, device: DeviceHandle) -> DriverResult<u32> {
        Ok(self.device(device)?.queue_families.len() as u32)
    }

    fn queue_family_fill(
        &self,
        device: DeviceHandle,
        count: u32,
    ) -> DriverResult<Vec<QueueFamilyCapability>> {
        Ok(self.device(device)?.queue_families.iter().take(count as usize).copied().collect())
    }
}
