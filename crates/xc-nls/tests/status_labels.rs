mod common;

use common::{CountingLoader, console_bundles, facade, tag};
use futures::executor::block_on;
use std::sync::Arc;
use xc_nls::{
    DesktopState, NlsError, ResourceFacade, StaticLoader, StatusCode, StatusLabelMapper,
    StatusLabelTable, SyncOpState, VmState,
};

fn mapper(table: StatusLabelTable) -> StatusLabelMapper {
    let facade = Arc::new(facade(Arc::new(CountingLoader::new(console_bundles()))));
    StatusLabelMapper::new(facade, table).unwrap()
}

/// A default-locale bundle defining every status label as its lowercase name.
fn complete_status_bundle() -> StaticLoader {
    StaticLoader::new().with_bundle(
        "VM",
        "en-us",
        StatusCode::all().map(|code| (code.name(), code.name().to_lowercase())),
    )
}

#[test]
fn labels_use_the_fallback_chain() {
    let mapper = mapper(StatusLabelTable::default());

    let running = block_on(mapper.label_for(VmState::Running, &tag("fr-FR"))).unwrap();
    assert_eq!(running, "actif");

    let paused = block_on(mapper.label_for(VmState::Paused, &tag("fr-FR"))).unwrap();
    assert_eq!(paused, "paused");
}

#[test]
fn overridden_key_is_used() {
    let table = StatusLabelTable::default()
        .with_overrides([("VM_PAUSED", "VM_RUNNING")])
        .unwrap();
    let mapper = mapper(table);

    let paused = block_on(mapper.label_for(VmState::Paused, &tag("fr-FR"))).unwrap();
    assert_eq!(paused, "actif");
}

#[test]
fn label_missing_from_every_bundle_is_key_not_found() {
    let mapper = mapper(StatusLabelTable::default());

    let err = block_on(mapper.label_for(DesktopState::Publishing, &tag("fr"))).unwrap_err();
    assert!(matches!(err, NlsError::KeyNotFound { key, .. } if key == "PUBLISHING"));
}

#[test]
fn incomplete_table_is_rejected() {
    let facade = Arc::new(ResourceFacade::new(tag("en-us"), Arc::new(StaticLoader::new())));
    let table = StatusLabelTable::empty("VM").with_key(VmState::Running, "VM_RUNNING");

    let err = StatusLabelMapper::new(facade, table).unwrap_err();
    assert!(matches!(err, NlsError::UnknownStatusCode(_)));
}

#[test]
fn verifies_complete_default_bundle() {
    let facade = Arc::new(ResourceFacade::new(tag("en-us"), Arc::new(complete_status_bundle())));
    let mapper = StatusLabelMapper::new(Arc::clone(&facade), StatusLabelTable::default()).unwrap();

    block_on(mapper.verify_default_bundle()).unwrap();

    let label = block_on(mapper.label_for(SyncOpState::TransferNetintStalled, &tag("de-DE")));
    assert_eq!(label.unwrap(), "transfer_netint_stalled");
}

#[test]
fn verification_names_the_first_missing_label() {
    let mapper = mapper(StatusLabelTable::default());

    let err = block_on(mapper.verify_default_bundle()).unwrap_err();
    assert!(matches!(err, NlsError::KeyNotFound { key, .. } if key == "VM_CREATED"));
}

#[test]
fn verification_fails_without_default_bundle() {
    let facade = Arc::new(ResourceFacade::new(tag("en-us"), Arc::new(StaticLoader::new())));
    let mapper = StatusLabelMapper::new(facade, StatusLabelTable::default()).unwrap();

    let err = block_on(mapper.verify_default_bundle()).unwrap_err();
    assert!(matches!(err, NlsError::BundleLoadFailed { .. }));
}
