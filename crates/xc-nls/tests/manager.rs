mod common;

use common::tag;
use futures::executor::block_on;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use xc_nls::{NlsError, NlsManager, StatusCode, VmState};

fn write_bundle(root: &Path, locale: &str, namespace: &str, file: &str, content: &str) {
    let dir = root.join("i18n").join(locale);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}.{}", namespace, file)), content).unwrap();
}

fn console_dir(config: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("nls.toml"), config).unwrap();

    let labels: Vec<String> = StatusCode::all()
        .map(|code| format!("{:?}: {:?}", code.name(), code.name().to_lowercase()))
        .collect();
    let en = format!(
        "{{\"NAME_MASK\": \"Name: {{0}}\", \"START\": \"Start\", {}}}",
        labels.join(", ")
    );
    write_bundle(temp_dir.path(), "en-us", "VM", "json", &en);
    write_bundle(
        temp_dir.path(),
        "fr",
        "VM",
        "js",
        "({ NAME_MASK: \"Nom : {0}\", VM_RUNNING: \"actif\" });",
    );
    write_bundle(
        temp_dir.path(),
        "en-us",
        "MediaWizard",
        "json",
        r#"{"TITLE": "Media Wizard"}"#,
    );

    temp_dir
}

const CONFIG: &str = r#"
default_locale = "en_US"
assets_dir = "i18n"
namespaces = ["VM", "MediaWizard"]
"#;

#[test]
fn resolves_from_manifest_dir() {
    let temp_dir = console_dir(CONFIG);
    let nls = NlsManager::from_manifest_dir(temp_dir.path()).unwrap();

    assert_eq!(nls.facade().default_locale(), &tag("en-us"));

    let fr = tag("fr-FR");
    let name = block_on(nls.resolve_text("VM", "NAME_MASK", &fr, &["Alice".into()])).unwrap();
    assert_eq!(name, "Nom : Alice");

    let state = block_on(nls.label_for(VmState::Running, &fr)).unwrap();
    assert_eq!(state, "actif");

    let start = block_on(nls.resolve_text("VM", "START", &fr, &[])).unwrap();
    assert_eq!(start, "Start");

    block_on(nls.validate()).unwrap();
}

#[test]
fn status_overrides_come_from_config() {
    let config = format!("{}\n[status_labels]\nkeys = {{ VM_PAUSED = \"VM_RUNNING\" }}\n", CONFIG);
    let temp_dir = console_dir(&config);
    let nls = NlsManager::from_manifest_dir(temp_dir.path()).unwrap();

    let paused = block_on(nls.label_for(VmState::Paused, &tag("fr"))).unwrap();
    assert_eq!(paused, "actif");
}

#[test]
fn unknown_status_code_in_config_is_rejected() {
    let config = format!("{}\n[status_labels]\nkeys = {{ VM_EXPLODED = \"X\" }}\n", CONFIG);
    let temp_dir = console_dir(&config);

    let err = NlsManager::from_manifest_dir(temp_dir.path()).unwrap_err();
    assert!(matches!(err, NlsError::UnknownStatusCode(code) if code == "VM_EXPLODED"));
}

#[test]
fn invalid_config_is_rejected() {
    let config = r#"
default_locale = "en-us"
assets_dir = "i18n"
namespaces = ["MediaWizard"]
"#;
    let temp_dir = console_dir(config);

    let err = NlsManager::from_manifest_dir(temp_dir.path()).unwrap_err();
    assert!(matches!(err, NlsError::Config(_)));
}

#[test]
fn missing_config_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();

    let err = NlsManager::from_manifest_dir(temp_dir.path()).unwrap_err();
    assert!(matches!(err, NlsError::Config(_)));
}

#[test]
fn validate_reports_missing_default_bundle() {
    let config = r#"
default_locale = "en-us"
assets_dir = "i18n"
namespaces = ["VM", "Network"]
"#;
    let temp_dir = console_dir(config);
    let nls = NlsManager::from_manifest_dir(temp_dir.path()).unwrap();

    let err = block_on(nls.validate()).unwrap_err();
    assert!(matches!(err, NlsError::BundleLoadFailed { namespace, .. } if namespace == "Network"));
}
