//! End-to-end pipeline tests against the deterministic fake driver.

use vkscope_probe::driver::CapabilityDriver;
use vkscope_probe::fake::FakeDriver;
use vkscope_probe::{probe, LayerPolicy, ProbeError, ProbeOptions, QueryScope};
use vkscope_report::{render, StatusCode};

#[test]
fn empty_driver_yields_empty_sequences_not_errors() {
    let driver = FakeDriver::empty();
    let snapshot = probe(&driver, &ProbeOptions::default()).unwrap();

    assert!(snapshot.report.extensions.is_empty());
    assert!(snapshot.report.layers.is_empty());
    assert!(snapshot.report.devices.is_empty());

    let text = render(&snapshot.report);
    assert!(text.contains("found 0 vulkan enabled gpus"));
    assert!(text.contains("found 0 Vulkan Layers"));
    assert!(text.contains("found 0 Vulkan extension on this platform"));
}

#[test]
fn count_phase_is_idempotent_across_scopes() {
    let driver = FakeDriver::reference().with_validation_layer();
    assert_eq!(driver.extension_count(None), driver.extension_count(None));
    assert_eq!(
        driver.extension_count(Some("VK_LAYER_FAKE_validation")),
        driver.extension_count(Some("VK_LAYER_FAKE_validation"))
    );
    assert_eq!(driver.layer_count(), driver.layer_count());
}

#[test]
fn queue_family_sequence_length_matches_count_phase() {
    let driver = FakeDriver::reference();
    let snapshot = probe(&driver, &ProbeOptions::default()).unwrap();

    let ctx = driver.create_context(&[]).unwrap();
    for (index, device) in snapshot.report.devices.iter().enumerate() {
        let handle = ctx.device_fill(ctx.device_count().unwrap()).unwrap()[index];
        let counted = ctx.queue_family_count(handle).unwrap();
        assert_eq!(device.queue_families.len() as u32, counted);
    }
}

#[test]
fn enabled_layer_names_round_trip_in_order() {
    let driver = FakeDriver::reference().with_validation_layer().with_validation_layer();
    // Two identical layer records are fine for the order-preservation law;
    // the context must record what it was given, verbatim.
    let snapshot = probe(&driver, &ProbeOptions::default()).unwrap();

    let discovered: Vec<String> =
        snapshot.report.layers.iter().map(|layer| layer.name.clone()).collect();
    assert_eq!(snapshot.enabled_layers(), discovered.as_slice());
}

#[test]
fn explicit_layer_policy_round_trips_verbatim() {
    let driver = FakeDriver::reference();
    let names = vec!["VK_LAYER_ZZZ".to_string(), "VK_LAYER_AAA".to_string()];
    let options = ProbeOptions { layer_policy: LayerPolicy::Explicit(names.clone()) };
    let snapshot = probe(&driver, &options).unwrap();
    assert_eq!(snapshot.enabled_layers(), names.as_slice());
}

#[test]
fn enable_none_policy_creates_layerless_context() {
    let driver = FakeDriver::reference().with_validation_layer();
    let options = ProbeOptions { layer_policy: LayerPolicy::EnableNone };
    let snapshot = probe(&driver, &options).unwrap();
    assert!(snapshot.enabled_layers().is_empty());
    // Discovery is unaffected by the activation policy.
    assert_eq!(snapshot.report.layers.len(), 1);
}

#[test]
fn scenario_single_discrete_device_end_to_end() {
    let driver = FakeDriver::reference();
    let snapshot = probe(&driver, &ProbeOptions::default()).unwrap();
    let text = render(&snapshot.report);

    assert!(text.contains("found 1 vulkan enabled gpus"));
    assert!(text.contains("' gpu\n"), "device line must carry the discrete label: {text}");
    assert!(text.contains("\tFound Graphics queue w/ 1 queue(s)\n"));
    assert!(text.contains("\tFound Compute queue w/ 1 queue(s)\n"));
    assert_eq!(text.matches("queue w/").count(), 2);
    assert!(text.contains("found 0 Vulkan Layers"));
    assert!(text.contains("found 0 Vulkan extension on this platform"));
}

#[test]
fn context_creation_failure_aborts_before_device_enumeration() {
    let driver = FakeDriver::reference().with_context_failure(StatusCode::INCOMPATIBLE_DRIVER);
    let err = probe(&driver, &ProbeOptions::default()).unwrap_err();

    assert_eq!(err, ProbeError::ContextCreation { status: StatusCode::INCOMPATIBLE_DRIVER });
    assert!(err.to_string().contains("incompatible driver"), "got: {err}");
    assert_eq!(driver.contexts_created(), 0, "no context may exist after the failure");
}

#[test]
fn query_failure_aborts_the_whole_report() {
    let mut driver = FakeDriver::reference();
    driver.extension_failure = Some(StatusCode::OUT_OF_HOST_MEMORY);
    let err = probe(&driver, &ProbeOptions::default()).unwrap_err();

    match err {
        ProbeError::DriverQuery { scope, status } => {
            assert_eq!(scope, QueryScope::GlobalExtensions);
            assert_eq!(status, StatusCode::OUT_OF_HOST_MEMORY);
        }
        other => panic!("expected a driver query error, got {other:?}"),
    }
    assert_eq!(driver.contexts_created(), 0);
}

#[test]
fn layer_extensions_are_attached_during_discovery() {
    let driver = FakeDriver::empty().with_validation_layer();
    let snapshot = probe(&driver, &ProbeOptions::default()).unwrap();

    assert_eq!(snapshot.report.layers.len(), 1);
    let layer = &snapshot.report.layers[0];
    assert_eq!(layer.name, "VK_LAYER_FAKE_validation");
    assert_eq!(layer.extensions.len(), 1);
    assert_eq!(layer.extensions[0].name, "VK_EXT_debug_utils");
}

#[test]
fn snapshot_drop_releases_the_context() {
    // The context is owned by the snapshot; dropping it must not panic and
    // the driver can create a fresh context afterwards.
    let driver = FakeDriver::reference();
    let snapshot = probe(&driver, &ProbeOptions::default()).unwrap();
    assert_eq!(driver.contexts_created(), 1);
    drop(snapshot);
    let _second = probe(&driver, &ProbeOptions::default()).unwrap();
    assert_eq!(driver.contexts_created(), 2);
}
