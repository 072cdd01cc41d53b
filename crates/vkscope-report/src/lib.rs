//! Capability report data model for `vkscope`.
//!
//! Plain-data mirror types for everything the Vulkan driver reports during
//! enumeration: platform extensions, instance layers, physical devices and
//! their queue/memory topology. Decoupled from the `ash` binding so the
//! report can be built, rendered, and tested without a GPU.

pub mod render;

use std::fmt;

use bitflags::bitflags;
use serde::{Serialize, Serializer};

pub use render::{render, render_verbose};

// ── Driver status codes ──────────────────────────────────────────────────────

/// Raw status code returned by a driver entry point.
///
/// Well-known failure codes get a human-readable name in `Display`; anything
/// else falls back to the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCode(pub i32);

impl StatusCode {
    pub const SUCCESS: Self = Self(0);
    pub const INCOMPLETE: Self = Self(5);
    pub const OUT_OF_HOST_MEMORY: Self = Self(-1);
    pub const OUT_OF_DEVICE_MEMORY: Self = Self(-2);
    pub const INITIALIZATION_FAILED: Self = Self(-3);
    pub const LAYER_NOT_PRESENT: Self = Self(-6);
    pub const EXTENSION_NOT_PRESENT: Self = Self(-7);
    pub const INCOMPATIBLE_DRIVER: Self = Self(-9);

    /// Human-readable name for well-known codes.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::SUCCESS => Some("success"),
            Self::INCOMPLETE => Some("incomplete"),
            Self::OUT_OF_HOST_MEMORY => Some("out of host memory"),
            Self::OUT_OF_DEVICE_MEMORY => Some("out of device memory"),
            Self::INITIALIZATION_FAILED => Some("initialization failed"),
            Self::LAYER_NOT_PRESENT => Some("layer not present"),
            Self::EXTENSION_NOT_PRESENT => Some("extension not present"),
            Self::INCOMPATIBLE_DRIVER => Some("incompatible driver"),
            _ => None,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "status code {}", self.0),
        }
    }
}

// ── Extensions and layers ────────────────────────────────────────────────────

/// One optional driver feature: an immutable (name, version) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityExtension {
    pub name: String,
    pub spec_version: u32,
}

/// An installed instance layer and the extensions it exposes.
///
/// Extensions are attached immediately after layer discovery and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerDescriptor {
    pub name: String,
    pub description: String,
    pub spec_version: u32,
    pub implementation_version: u32,
    pub extensions: Vec<CapabilityExtension>,
}

// ── Queue families ───────────────────────────────────────────────────────────

bitflags! {
    /// Operation classes a queue family supports.
    ///
    /// Bit values match the Vulkan `VkQueueFlagBits` definitions so a driver
    /// backend can pass raw bits through unchanged. Membership tests are
    /// independent; a family commonly advertises several classes at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct QueueFlags: u32 {
        const GRAPHICS = 0x1;
        const COMPUTE = 0x2;
        const TRANSFER = 0x4;
        const SPARSE_BINDING = 0x8;
        const PROTECTED = 0x10;
    }
}

impl QueueFlags {
    /// All known capability bits with their report labels, in the order the
    /// presenter emits them.
    pub const LABELED: [(QueueFlags, &'static str); 5] = [
        (QueueFlags::GRAPHICS, "Graphics"),
        (QueueFlags::COMPUTE, "Compute"),
        (QueueFlags::TRANSFER, "Transfer"),
        (QueueFlags::SPARSE_BINDING, "Sparse Binding"),
        (QueueFlags::PROTECTED, "Protected"),
    ];

    /// Labels of every set capability bit, in presenter order.
    pub fn labels(self) -> Vec<&'static str> {
        Self::LABELED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, label)| *label)
            .collect()
    }
}

impl Serialize for QueueFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.labels())
    }
}

/// Capabilities of one queue family: the supported operation classes and how
/// many queues can be scheduled concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueFamilyCapability {
    pub flags: QueueFlags,
    pub queue_count: u32,
}

// ── Devices ──────────────────────────────────────────────────────────────────

/// Closed classification of a physical accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceCategory {
    Other,
    IntegratedGpu,
    DiscreteGpu,
    VirtualGpu,
    Cpu,
    /// Driver reported a value outside the known set.
    Unknown,
}

impl DeviceCategory {
    /// Map a raw `VkPhysicalDeviceType` value; out-of-range codes become
    /// [`DeviceCategory::Unknown`] rather than failing.
    pub fn from_driver_code(code: i32) -> Self {
        match code {
            0 => Self::Other,
            1 => Self::IntegratedGpu,
            2 => Self::DiscreteGpu,
            3 => Self::VirtualGpu,
            4 => Self::Cpu,
            _ => Self::Unknown,
        }
    }

    /// Short label used in the text report.
    pub fn label(self) -> &'static str {
        match self {
            Self::Other => "other",
            Self::IntegratedGpu => "igpu",
            Self::DiscreteGpu => "gpu",
            Self::VirtualGpu => "vgpu",
            Self::Cpu => "cpu",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque non-owning reference to a driver-owned physical device.
///
/// Only meaningful while the driver context that produced it is alive; the
/// report uses it purely for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceHandle(pub u64);

/// Identity fields reported for a physical device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub name: String,
    pub vendor_id: u32,
    pub device_id: u32,
    pub category: DeviceCategory,
    pub api_version: u32,
    pub driver_version: u32,
}

/// One memory heap reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryHeap {
    pub size: u64,
    pub device_local: bool,
}

/// Memory topology of a physical device.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MemoryProfile {
    pub heaps: Vec<MemoryHeap>,
    pub type_count: u32,
}

/// Everything enumerated for one physical accelerator.
///
/// Queue families are kept in driver-reported order; the family index is
/// semantically meaningful and never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    pub handle: DeviceHandle,
    pub identity: DeviceIdentity,
    pub memory: MemoryProfile,
    pub queue_families: Vec<QueueFamilyCapability>,
}

// ── Report ───────────────────────────────────────────────────────────────────

/// The root aggregate: global extensions, layers, and devices, each in
/// driver-reported order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Report {
    pub extensions: Vec<CapabilityExtension>,
    pub layers: Vec<LayerDescriptor>,
    pub devices: Vec<DeviceDescriptor>,
}

/// Decode a packed Vulkan version into (major, minor, patch).
pub const fn decode_version(version: u32) -> (u32, u32, u32) {
    (version >> 22, (version >> 12) & 0x3ff, version & 0xfff)
}
