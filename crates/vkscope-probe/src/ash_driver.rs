//! Real driver backend over the Vulkan loader via `ash`.
//!
//! Enumerations use the raw `fp_v1_0()` entry points so each count/fill pair
//! maps onto one [`two_phase`](crate::driver::two_phase) call; the loader's
//! count-then-fill contract is kept visible instead of hidden inside `ash`'s
//! convenience wrappers.

use std::ffi::{c_char, CStr, CString};

use ash::vk::{self, Handle as _};
use tracing::debug;
use vkscope_report::{
    CapabilityExtension, DeviceCategory, DeviceHandle, DeviceIdentity, MemoryHeap, MemoryProfile,
    QueueFamilyCapability, QueueFlags, StatusCode,
};

use crate::driver::{CapabilityDriver, DriverContext, DriverResult, LayerRecord};
use crate::ProbeError;

/// Fixed identity metadata passed at context creation. Not user supplied.
const APP_NAME: &CStr = c"vkscope";
const APP_VERSION: u32 = 1;
const ENGINE_NAME: &CStr = c"vkscope";
const ENGINE_VERSION: u32 = 1;
const API_VERSION: u32 = vk::make_api_version(0, 1, 1, 0);

/// Map a raw Vulkan status to a [`DriverResult`].
///
/// `INCOMPLETE` is accepted: it means the item count shrank between the two
/// phases and the fill was truncated, which the callers handle by reading the
/// written count.
fn check(ret: vk::Result) -> DriverResult<()> {
    match ret {
        vk::Result::SUCCESS | vk::Result::INCOMPLETE => Ok(()),
        other => Err(StatusCode(other.as_raw())),
    }
}

/// Copy a fixed-size NUL-terminated C string field into an owned `String`.
fn fixed_cstr(raw: &[c_char]) -> String {
    let bytes: Vec<u8> = raw.iter().take_while(|&&c| c != 0).map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Pre-context driver backend over the Vulkan loader.
pub struct AshDriver {
    entry: ash::Entry,
}

impl AshDriver {
    /// Load the Vulkan loader.
    pub fn load() -> Result<Self, ProbeError> {
        // SAFETY: loads the Vulkan loader via dynamic linking; it is only
        // used for capability queries.
        let entry =
            unsafe { ash::Entry::load() }.map_err(|e| ProbeError::Loader(e.to_string()))?;
        debug!("vulkan loader loaded");
        Ok(Self { entry })
    }
}

impl CapabilityDriver for AshDriver {
    fn extension_count(&self, scope: Option<&str>) -> DriverResult<u32> {
        let layer = scope_cstring(scope)?;
        let name_ptr = layer.as_ref().map_or(std::ptr::null(), |c| c.as_ptr());
        let mut count = 0u32;
        // SAFETY: a null properties pointer requests only the count.
        let ret = unsafe {
            (self.entry.fp_v1_0().enumerate_instance_extension_properties)(
                name_ptr,
                &mut count,
                std::ptr::null_mut(),
            )
        };
        check(ret)?;
        Ok(count)
    }

    fn extension_fill(
        &self,
        scope: Option<&str>,
        count: u32,
    ) -> DriverResult<Vec<CapabilityExtension>> {
        let layer = scope_cstring(scope)?;
        let name_ptr = layer.as_ref().map_or(std::ptr::null(), |c| c.as_ptr());
        let mut written = count;
        let mut props = vec![vk::ExtensionProperties::default(); count as usize];
        // SAFETY: the buffer holds exactly `count` elements and `written`
        // starts at that size.
        let ret = unsafe {
            (self.entry.fp_v1_0().enumerate_instance_extension_properties)(
                name_ptr,
                &mut written,
                props.as_mut_ptr(),
            )
        };
        check(ret)?;
        props.truncate(written as usize);
        Ok(props
            .iter()
            .map(|p| CapabilityExtension {
                name: fixed_cstr(&p.extension_name),
                spec_version: p.spec_version,
            })
            .collect())
    }

    fn layer_count(&self) -> DriverResult<u32> {
        let mut count = 0u32;
        // SAFETY: a null properties pointer requests only the count.
        let ret = unsafe {
            (self.entry.fp_v1_0().enumerate_instance_layer_properties)(
                &mut count,
                std::ptr::null_mut(),
            )
        };
        check(ret)?;
        Ok(count)
    }

    fn layer_fill(&self, count: u32) -> DriverResult<Vec<LayerRecord>> {
        let mut written = count;
        let mut props = vec![vk::LayerProperties::default(); count as usize];
        // SAFETY: the buffer holds exactly `count` elements.
        let ret = unsafe {
            (self.entry.fp_v1_0().enumerate_instance_layer_properties)(
                &mut written,
                props.as_mut_ptr(),
            )
        };
        check(ret)?;
        props.truncate(written as usize);
        Ok(props
            .iter()
            .map(|p| LayerRecord {
                name: fixed_cstr(&p.layer_name),
                description: fixed_cstr(&p.description),
                spec_version: p.spec_version,
                implementation_version: p.implementation_version,
            })
            .collect())
    }

    fn create_context(&self, enabled_layers: &[String]) -> DriverResult<Box<dyn DriverContext>> {
        let layer_names: Vec<CString> = enabled_layers
            .iter()
            .map(|name| CString::new(name.as_str()))
            .collect::<Result<_, _>>()
            .map_err(|_| StatusCode::LAYER_NOT_PRESENT)?;
        let layer_ptrs: Vec<*const c_char> = layer_names.iter().map(|c| c.as_ptr()).collect();

        let app_info = vk::ApplicationInfo::default()
            .application_name(APP_NAME)
            .application_version(APP_VERSION)
            .engine_name(ENGINE_NAME)
            .engine_version(ENGINE_VERSION)
            .api_version(API_VERSION);
        // The discovered platform extensions are informational only; none
        // are requested here.
        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_ptrs);

        // SAFETY: create_info points to stack-local data valid for the call.
        let instance = unsafe { self.entry.create_instance(&create_info, None) }
            .map_err(|e| StatusCode(e.as_raw()))?;
        debug!("driver context created ({} layer(s) enabled)", enabled_layers.len());

        Ok(Box::new(AshContext { instance, enabled_layers: enabled_layers.to_vec() }))
    }
}

fn scope_cstring(scope: Option<&str>) -> DriverResult<Option<CString>> {
    match scope {
        None => Ok(None),
        // An interior NUL cannot name a real layer.
        Some(name) => {
            CString::new(name).map(Some).map_err(|_| StatusCode::LAYER_NOT_PRESENT)
        }
    }
}

/// A live Vulkan instance with the layers recorded at creation.
///
/// Destroyed exactly once in `Drop`, after which every device handle derived
/// from it is invalid; the pipeline copies all device data out before then.
pub struct AshContext {
    instance: ash::Instance,
    enabled_layers: Vec<String>,
}

impl AshContext {
    fn physical_device(&self, device: DeviceHandle) -> vk::PhysicalDevice {
        vk::PhysicalDevice::from_raw(device.0)
    }
}

impl DriverContext for AshContext {
    fn enabled_layers(&self) -> &[String] {
        &self.enabled_layers
    }

    fn device_count(&self) -> DriverResult<u32> {
        let mut count = 0u32;
        // SAFETY: valid instance handle; null pointer requests only the count.
        let ret = unsafe {
            (self.instance.fp_v1_0().enumerate_physical_devices)(
                self.instance.handle(),
                &mut count,
                std::ptr::null_mut(),
            )
        };
        check(ret)?;
        Ok(count)
    }

    fn device_fill(&self, count: u32) -> DriverResult<Vec<DeviceHandle>> {
        let mut written = count;
        let mut devices = vec![vk::PhysicalDevice::null(); count as usize];
        // SAFETY: the buffer holds exactly `count` elements.
        let ret = unsafe {
            (self.instance.fp_v1_0().enumerate_physical_devices)(
                self.instance.handle(),
                &mut written,
                devices.as_mut_ptr(),
            )
        };
        check(ret)?;
        devices.truncate(written as usize);
        Ok(devices.iter().map(|d| DeviceHandle(d.as_raw())).collect())
    }

    fn device_identity(&self, device: DeviceHandle) -> DriverResult<DeviceIdentity> {
        // SAFETY: the handle originates from enumerate_physical_devices on
        // this instance.
        let props =
            unsafe { self.instance.get_physical_device_properties(self.physical_device(device)) };
        Ok(DeviceIdentity {
            name: fixed_cstr(&props.device_name),
            vendor_id: props.vendor_id,
            device_id: props.device_id,
            category: DeviceCategory::from_driver_code(props.device_type.as_raw()),
            api_version: props.api_version,
            driver_version: props.driver_version,
        })
    }

    fn device_memory(&self, device: DeviceHandle) -> DriverResult<MemoryProfile> {
        // SAFETY: the handle originates from this instance.
        let props = unsafe {
            self.instance.get_physical_device_memory_properties(self.physical_device(device))
        };
        let heaps = props.memory_heaps[..props.memory_heap_count as usize]
            .iter()
            .map(|heap| MemoryHeap {
                size: heap.size,
                device_local: heap.flags.contains(vk::MemoryHeapFlags::DEVICE_LOCAL),
            })
            .collect();
        Ok(MemoryProfile { heaps, type_count: props.memory_type_count })
    }

    fn queue_family_count(&self, device: DeviceHandle) -> DriverResult<u32> {
        let mut count = 0u32;
        // SAFETY: valid device handle; null pointer requests only the count.
        // This entry point has no status return.
        unsafe {
            (self.instance.fp_v1_0().get_physical_device_queue_family_properties)(
                self.physical_device(device),
                &mut count,
                std::ptr::null_mut(),
            );
        }
        Ok(count)
    }

    fn queue_family_fill(
        &self,
        device: DeviceHandle,
        count: u32,
    ) -> DriverResult<Vec<QueueFamilyCapability>> {
        let mut written = count;
        let mut families = vec![vk::QueueFamilyProperties::default(); count as usize];
        // SAFETY: the buffer holds exactly `count` elements.
        unsafe {
            (self.instance.fp_v1_0().get_physical_device_queue_family_properties)(
                self.physical_device(device),
                &mut written,
                families.as_mut_ptr(),
            );
        }
        families.truncate(written as usize);
        Ok(families
            .iter()
            .map(|family| QueueFamilyCapability {
                // Same bit values; unknown driver bits are dropped.
                flags: QueueFlags::from_bits_truncate(family.queue_flags.as_raw()),
                queue_count: family.queue_count,
            })
            .collect())
    }
}

impl Drop for AshContext {
    fn drop(&mut self) {
        // SAFETY: destroyed exactly once; no handle derived from this
        // instance is used afterwards.
        unsafe { self.instance.destroy_instance(None) };
        debug!("driver context released");
    }
}
