//! Text presenter for the capability report.
//!
//! A deterministic, order-preserving projection of [`Report`]; never mutates
//! it. The section counts are the sequence lengths themselves, so the printed
//! numbers cannot drift from the report contents.

use std::fmt::{self, Write};

use crate::{decode_version, DeviceDescriptor, Report};

/// Render the report as the standard text output.
pub fn render(report: &Report) -> String {
    let mut out = String::new();
    // Writing to a String never fails.
    let _ = write_report(&mut out, report, false);
    out
}

/// Render the report including per-device memory topology and version info.
pub fn render_verbose(report: &Report) -> String {
    let mut out = String::new();
    let _ = write_report(&mut out, report, true);
    out
}

fn write_report<W: Write>(out: &mut W, report: &Report, verbose: bool) -> fmt::Result {
    writeln!(out, "found {} vulkan enabled gpus", report.devices.len())?;
    for device in &report.devices {
        write_device(out, device, verbose)?;
    }

    writeln!(out, "found {} Vulkan Layers", report.layers.len())?;
    for layer in &report.layers {
        writeln!(out, "\t{}", layer.name)?;
        for extension in &layer.extensions {
            writeln!(out, "\t\t{}", extension.name)?;
        }
    }

    writeln!(out, "found {} Vulkan extension on this platform", report.extensions.len())?;
    for extension in &report.extensions {
        writeln!(out, "\t{}", extension.name)?;
    }
    Ok(())
}

fn write_device<W: Write>(out: &mut W, device: &DeviceDescriptor, verbose: bool) -> fmt::Result {
    writeln!(
        out,
        "{} type: '(0x{:x})' {}",
        device.identity.name,
        device.handle.0,
        device.identity.category.label()
    )?;

    // One line per set capability bit, not just the first match.
    for family in &device.queue_families {
        for label in family.flags.labels() {
            writeln!(out, "\tFound {label} queue w/ {} queue(s)", family.queue_count)?;
        }
    }

    if verbose {
        let (major, minor, patch) = decode_version(device.identity.api_version);
        writeln!(out, "\tapi version: {major}.{minor}.{patch}")?;
        writeln!(
            out,
            "\tmemory: {} heap(s), {} type(s)",
            device.memory.heaps.len(),
            device.memory.type_count
        )?;
        for (index, heap) in device.memory.heaps.iter().enumerate() {
            let local = if heap.device_local { ", device-local" } else { "" };
            writeln!(out, "\t\theap {index}: {} MiB{local}", heap.size / (1024 * 1024))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CapabilityExtension, DeviceCategory, DeviceHandle, DeviceIdentity, LayerDescriptor,
        MemoryHeap, MemoryProfile, QueueFamilyCapability, QueueFlags,
    };

    fn discrete_device(families: Vec<QueueFamilyCapability>) -> DeviceDescriptor {
        DeviceDescriptor {
            handle: DeviceHandle(0xdead),
            identity: DeviceIdentity {
                name: "Test GPU".to_string(),
                vendor_id: 0x10de,
                device_id: 0x2204,
                category: DeviceCategory::DiscreteGpu,
                api_version: (1 << 22) | (1 << 12),
                driver_version: 1,
            },
            memory: MemoryProfile {
                heaps: vec![MemoryHeap { size: 8 * 1024 * 1024 * 1024, device_local: true }],
                type_count: 2,
            },
            queue_families: families,
        }
    }

    #[test]
    fn empty_report_renders_zero_counts() {
        let text = render(&Report::default());
        assert!(text.contains("found 0 vulkan enabled gpus"));
        assert!(text.contains("found 0 Vulkan Layers"));
        assert!(text.contains("found 0 Vulkan extension on this platform"));
    }

    #[test]
    fn one_line_per_capability_flag() {
        let device = discrete_device(vec![QueueFamilyCapability {
            flags: QueueFlags::GRAPHICS | QueueFlags::TRANSFER,
            queue_count: 4,
        }]);
        let report = Report { devices: vec![device], ..Report::default() };
        let text = render(&report);
        assert!(text.contains("\tFound Graphics queue w/ 4 queue(s)\n"));
        assert!(text.contains("\tFound Transfer queue w/ 4 queue(s)\n"));
        assert_eq!(text.matches("queue w/").count(), 2);
    }

    #[test]
    fn reference_scenario_single_discrete_device() {
        // Zero layers, zero extensions, one discrete device with one
        // graphics+compute family of one queue.
        let device = discrete_device(vec![QueueFamilyCapability {
            flags: QueueFlags::GRAPHICS | QueueFlags::COMPUTE,
            queue_count: 1,
        }]);
        let report = Report { devices: vec![device], ..Report::default() };
        let text = render(&report);

        assert!(text.contains("found 1 vulkan enabled gpus"));
        assert!(text.contains("Test GPU type: '(0xdead)' gpu"));
        assert!(text.contains("\tFound Graphics queue w/ 1 queue(s)\n"));
        assert!(text.contains("\tFound Compute queue w/ 1 queue(s)\n"));
        assert!(text.contains("found 0 Vulkan Layers"));
        assert!(text.contains("found 0 Vulkan extension on this platform"));
    }

    #[test]
    fn layers_render_with_indented_extensions() {
        let report = Report {
            layers: vec![LayerDescriptor {
                name: "VK_LAYER_KHRONOS_validation".to_string(),
                description: "Khronos validation".to_string(),
                spec_version: 1,
                implementation_version: 1,
                extensions: vec![CapabilityExtension {
                    name: "VK_EXT_debug_utils".to_string(),
                    spec_version: 2,
                }],
            }],
            ..Report::default()
        };
        let text = render(&report);
        assert!(text.contains("found 1 Vulkan Layers\n\tVK_LAYER_KHRONOS_validation\n\t\tVK_EXT_debug_utils\n"));
    }

    #[test]
    fn counts_match_sequence_lengths() {
        let report = Report {
            extensions: vec![
                CapabilityExtension { name: "VK_KHR_surface".to_string(), spec_version: 25 },
                CapabilityExtension { name: "VK_KHR_display".to_string(), spec_version: 23 },
            ],
            ..Report::default()
        };
        let text = render(&report);
        assert!(text.contains(&format!(
            "found {} Vulkan extension on this platform",
            report.extensions.len()
        )));
        assert_eq!(text.matches("\tVK_KHR_").count(), report.extensions.len());
    }

    #[test]
    fn extension_order_is_preserved() {
        let report = Report {
            extensions: vec![
                CapabilityExtension { name: "zzz_last_alphabetically".to_string(), spec_version: 1 },
                CapabilityExtension { name: "aaa_first_alphabetically".to_string(), spec_version: 1 },
            ],
            ..Report::default()
        };
        let text = render(&report);
        let zzz = text.find("zzz_last_alphabetically").unwrap();
        let aaa = text.find("aaa_first_alphabetically").unwrap();
        assert!(zzz < aaa, "driver-reported order must not be re-sorted");
    }

    #[test]
    fn verbose_includes_memory_topology() {
        let device = discrete_device(vec![]);
        let report = Report { devices: vec![device], ..Report::default() };
        let text = render_verbose(&report);
        assert!(text.contains("\tapi version: 1.1.0"));
        assert!(text.contains("\tmemory: 1 heap(s), 2 type(s)"));
        assert!(text.contains("\t\theap 0: 8192 MiB, device-local"));
    }

    #[test]
    fn default_render_omits_memory_topology() {
        let device = discrete_device(vec![]);
        let report = Report { devices: vec![device], ..Report::default() };
        let text = render(&report);
        assert!(!text.contains("memory:"));
    }
}
