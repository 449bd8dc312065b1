#![doc = include_str!("../README.md")]

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use unic_langid::{LanguageIdentifier, LanguageIdentifierError};

/// Name of the configuration file looked up in a manifest directory.
pub const CONFIG_FILE_NAME: &str = "nls.toml";

/// Namespace holding the status labels when `[status_labels]` does not name one.
pub const DEFAULT_STATUS_NAMESPACE: &str = "VM";

#[derive(Debug, Error)]
pub enum NlsConfigError {
    /// Configuration file not found.
    #[error("nls.toml configuration file not found")]
    NotFound,
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] io::Error),
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),
    /// The configured default locale is not a valid language identifier.
    #[error("Invalid default locale '{name}'")]
    InvalidDefaultLocale {
        /// The invalid identifier.
        name: String,
        /// The parsing error produced by `unic-langid`.
        #[source]
        source: LanguageIdentifierError,
    },
    /// Encountered an invalid locale directory name in the assets directory.
    #[error("Invalid locale identifier '{name}' found in assets directory")]
    InvalidLocaleIdentifier {
        /// The invalid identifier.
        name: String,
        /// The parsing error produced by `unic-langid`.
        #[source]
        source: LanguageIdentifierError,
    },
    /// Encountered a locale that uses an unsupported subtag combination.
    #[error("Locale '{name}' is not supported: {reason}")]
    UnsupportedLocale {
        /// The rejected identifier.
        name: String,
        /// Explanation of why it is not supported.
        reason: String,
    },
    /// A namespace entry is an empty string.
    #[error("Namespace names must not be empty")]
    EmptyNamespace,
    /// The same namespace is listed twice.
    #[error("Namespace '{0}' is listed more than once")]
    DuplicateNamespace(String),
    /// The status label namespace is missing from the declared namespaces.
    #[error("Status label namespace '{0}' is not listed in `namespaces`")]
    UndeclaredStatusNamespace(String),
}

/// The `[status_labels]` table.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StatusLabelsConfig {
    /// Namespace whose bundles carry the status labels.
    #[serde(default = "default_status_namespace")]
    pub namespace: String,
    /// Overrides from status code name (e.g. `VM_PAUSED`) to resource key.
    ///
    /// Codes not listed here use their own name as key.
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

impl Default for StatusLabelsConfig {
    fn default() -> Self {
        Self {
            namespace: default_status_namespace(),
            keys: BTreeMap::new(),
        }
    }
}

fn default_status_namespace() -> String {
    DEFAULT_STATUS_NAMESPACE.to_string()
}

/// The configuration for `xc-nls`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NlsConfig {
    /// The locale every fallback chain ends in (e.g. "en-us").
    ///
    /// Its bundles are expected to be complete.
    pub default_locale: String,
    /// Path to the assets directory containing bundle files.
    /// Expected structure: {assets_dir}/{locale}/{namespace}.json
    pub assets_dir: PathBuf,
    /// Namespaces served by the engine.
    ///
    /// An empty list accepts any namespace.
    ///
    /// ```toml
    /// namespaces = ["VM", "MediaWizard"]
    /// ```
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Status code to resource key mapping.
    #[serde(default)]
    pub status_labels: StatusLabelsConfig,
}

impl NlsConfig {
    /// Builds a configuration in code, without a file.
    pub fn new(default_locale: impl Into<String>, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            default_locale: default_locale.into(),
            assets_dir: assets_dir.into(),
            namespaces: Vec::new(),
            status_labels: StatusLabelsConfig::default(),
        }
    }

    /// Reads the configuration from a path.
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, NlsConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(NlsConfigError::NotFound);
        }

        let content = fs_err::read_to_string(path)?;

        Self::from_toml_str(&content)
    }

    /// Parses the configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, NlsConfigError> {
        let config: NlsConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Reads the configuration from the `CARGO_MANIFEST_DIR` directory.
    pub fn read_from_manifest_dir() -> Result<Self, NlsConfigError> {
        let manifest_dir = env::var("CARGO_MANIFEST_DIR").map_err(|_| NlsConfigError::NotFound)?;
        Self::from_manifest_dir(Path::new(&manifest_dir))
    }

    /// Reads `nls.toml` from the given directory.
    pub fn from_manifest_dir(manifest_dir: &Path) -> Result<Self, NlsConfigError> {
        Self::read_from_path(manifest_dir.join(CONFIG_FILE_NAME))
    }

    /// Returns the path to the assets directory from a base directory.
    /// If `base_dir` is `None`, uses `CARGO_MANIFEST_DIR` environment variable.
    pub fn assets_dir_from_base(&self, base_dir: Option<&Path>) -> Result<PathBuf, NlsConfigError> {
        let base = match base_dir {
            Some(dir) => dir.to_path_buf(),
            None => {
                let manifest_dir =
                    env::var("CARGO_MANIFEST_DIR").map_err(|_| NlsConfigError::NotFound)?;
                PathBuf::from(manifest_dir)
            },
        };

        Ok(base.join(&self.assets_dir))
    }

    /// Returns the configured default locale as a `LanguageIdentifier`.
    pub fn default_locale_identifier(&self) -> Result<LanguageIdentifier, NlsConfigError> {
        let lang = self
            .default_locale
            .replace('_', "-")
            .parse::<LanguageIdentifier>()
            .map_err(|source| NlsConfigError::InvalidDefaultLocale {
                name: self.default_locale.clone(),
                source,
            })?;

        ensure_supported_locale(&lang, &self.default_locale)?;

        Ok(lang)
    }

    /// Returns the locales available under the assets directory of `base_dir`.
    ///
    /// Each sub-directory name must parse as a language identifier; plain files
    /// are ignored.
    pub fn available_locales_from_base(
        &self,
        base_dir: Option<&Path>,
    ) -> Result<Vec<LanguageIdentifier>, NlsConfigError> {
        let assets_path = self.assets_dir_from_base(base_dir)?;
        let entries = fs_err::read_dir(&assets_path)?;

        let mut locales: Vec<(String, LanguageIdentifier)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| parse_locale_entry(&entry).transpose())
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|lang| (lang.to_string(), lang))
            .collect();

        locales.sort_by(|a, b| a.0.cmp(&b.0));
        locales.dedup_by(|a, b| a.0 == b.0);

        Ok(locales.into_iter().map(|(_, lang)| lang).collect())
    }

    /// Returns `true` when `namespace` may be served under this configuration.
    pub fn allows_namespace(&self, namespace: &str) -> bool {
        self.namespaces.is_empty() || self.namespaces.iter().any(|ns| ns == namespace)
    }

    /// Checks the configuration for startup errors.
    pub fn validate(&self) -> Result<(), NlsConfigError> {
        self.default_locale_identifier()?;

        let mut seen = BTreeSet::new();
        for namespace in &self.namespaces {
            if namespace.trim().is_empty() {
                return Err(NlsConfigError::EmptyNamespace);
            }
            if !seen.insert(namespace.as_str()) {
                return Err(NlsConfigError::DuplicateNamespace(namespace.clone()));
            }
        }

        if self.status_labels.namespace.trim().is_empty() {
            return Err(NlsConfigError::EmptyNamespace);
        }
        if !self.allows_namespace(&self.status_labels.namespace) {
            return Err(NlsConfigError::UndeclaredStatusNamespace(
                self.status_labels.namespace.clone(),
            ));
        }

        Ok(())
    }
}

/// Parse a directory entry as a locale identifier.
///
/// Returns `Ok(None)` if the entry is not a directory.
fn parse_locale_entry(
    entry: &fs_err::DirEntry,
) -> Result<Option<LanguageIdentifier>, NlsConfigError> {
    if !entry.file_type()?.is_dir() {
        return Ok(None);
    }

    let raw_name = entry.file_name();
    let name = raw_name.into_string().map_err(|raw| {
        NlsConfigError::ReadError(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Assets directory contains a non UTF-8 entry: {:?}", raw),
        ))
    })?;

    let lang = name
        .parse::<LanguageIdentifier>()
        .map_err(|source| NlsConfigError::InvalidLocaleIdentifier {
            name: name.clone(),
            source,
        })?;

    ensure_supported_locale(&lang, &name)?;
    Ok(Some(lang))
}

fn ensure_supported_locale(lang: &LanguageIdentifier, original: &str) -> Result<(), NlsConfigError> {
    if lang.variants().next().is_some() {
        return Err(NlsConfigError::UnsupportedLocale {
            name: original.to_string(),
            reason: "variants are not supported".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn config_with_namespaces(namespaces: &[&str]) -> NlsConfig {
        let mut config = NlsConfig::new("en-us", "nls");
        config.namespaces = namespaces.iter().map(|ns| ns.to_string()).collect();
        config
    }

    #[test]
    fn test_read_from_path_success() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);

        let config_content = r#"
default_locale = "en-us"
assets_dir = "nls"
namespaces = ["VM", "MediaWizard"]
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = NlsConfig::read_from_path(&config_path).unwrap();
        assert_eq!(config.default_locale, "en-us");
        assert_eq!(config.assets_dir, PathBuf::from("nls"));
        assert_eq!(config.namespaces, vec!["VM", "MediaWizard"]);
        assert_eq!(config.status_labels, StatusLabelsConfig::default());
    }

    #[test]
    fn test_read_from_path_file_not_found() {
        let result = NlsConfig::read_from_path("/non/existent/path/nls.toml");
        assert!(matches!(result, Err(NlsConfigError::NotFound)));
    }

    #[test]
    fn test_read_from_manifest_dir_uses_cargo_manifest_dir() {
        // this crate ships no nls.toml of its own
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        assert!(!manifest_dir.join(CONFIG_FILE_NAME).exists());

        assert!(matches!(
            NlsConfig::read_from_manifest_dir(),
            Err(NlsConfigError::NotFound)
        ));
    }

    #[test]
    fn test_from_manifest_dir_reads_nls_toml() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "default_locale = \"fr-fr\"\nassets_dir = \"i18n\"\n",
        )
        .unwrap();

        let config = NlsConfig::from_manifest_dir(temp_dir.path()).unwrap();
        assert_eq!(config.default_locale, "fr-fr");
        assert_eq!(
            config.assets_dir_from_base(Some(temp_dir.path())).unwrap(),
            temp_dir.path().join("i18n")
        );
    }

    #[test]
    fn test_read_from_path_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);

        let invalid_config = r#"
default_locale = "en-us"
[invalid_section]
assets_dir = "nls"
"#;

        fs::write(&config_path, invalid_config).unwrap();

        let result = NlsConfig::read_from_path(&config_path);
        assert!(matches!(result, Err(NlsConfigError::ParseError(_))));
    }

    #[test]
    fn test_status_label_overrides() {
        let config = NlsConfig::from_toml_str(
            r#"
default_locale = "en-us"
assets_dir = "nls"

[status_labels]
namespace = "Status"

[status_labels.keys]
VM_PAUSED = "VM_RUNNING"
"#,
        )
        .unwrap();

        assert_eq!(config.status_labels.namespace, "Status");
        assert_eq!(
            config.status_labels.keys.get("VM_PAUSED").map(String::as_str),
            Some("VM_RUNNING")
        );
    }

    #[rstest]
    #[case("en-us", "en-US")]
    #[case("fr_FR", "fr-FR")]
    #[case("zh-cn", "zh-CN")]
    fn test_default_locale_identifier_success(#[case] raw: &str, #[case] expected: &str) {
        let config = NlsConfig::new(raw, "nls");
        let lang = config.default_locale_identifier().unwrap();
        assert_eq!(lang.to_string(), expected);
    }

    #[test]
    fn test_default_locale_identifier_invalid() {
        let config = NlsConfig::new("invalid-lang!", "nls");

        let result = config.default_locale_identifier();

        assert!(matches!(
            result,
            Err(NlsConfigError::InvalidDefaultLocale { name, .. }) if name == "invalid-lang!"
        ));
    }

    #[test]
    fn test_default_locale_with_variant_is_rejected() {
        let config = NlsConfig::new("de-DE-1996", "nls");

        assert!(matches!(
            config.default_locale_identifier(),
            Err(NlsConfigError::UnsupportedLocale { .. })
        ));
    }

    #[test]
    fn test_available_locales_collects_directories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        let assets = base.join("nls");
        fs::create_dir(&assets).unwrap();
        fs::create_dir(assets.join("en-us")).unwrap();
        fs::create_dir(assets.join("fr-fr")).unwrap();
        fs::create_dir(assets.join("zh-cn")).unwrap();
        fs::write(assets.join("README.txt"), "ignored file").unwrap();

        let config = NlsConfig::new("en-us", "nls");
        let locales = config.available_locales_from_base(Some(base)).unwrap();
        let codes: Vec<String> = locales.into_iter().map(|lang| lang.to_string()).collect();

        assert_eq!(codes, vec!["en-US", "fr-FR", "zh-CN"]);
    }

    #[test]
    fn test_available_locales_reports_invalid_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        let assets = base.join("nls");
        fs::create_dir(&assets).unwrap();
        fs::create_dir(assets.join("not a locale")).unwrap();

        let config = NlsConfig::new("en-us", "nls");

        assert!(matches!(
            config.available_locales_from_base(Some(base)),
            Err(NlsConfigError::InvalidLocaleIdentifier { .. })
        ));
    }

    #[test]
    fn test_validate_accepts_declared_status_namespace() {
        config_with_namespaces(&["VM", "MediaWizard"]).validate().unwrap();
    }

    #[test]
    fn test_validate_accepts_any_namespace_when_unrestricted() {
        let config = config_with_namespaces(&[]);
        config.validate().unwrap();
        assert!(config.allows_namespace("Anything"));
    }

    #[rstest]
    #[case(&["VM", "VM"])]
    #[case(&["VM", " "])]
    #[case(&["MediaWizard"])]
    fn test_validate_rejects_bad_namespaces(#[case] namespaces: &[&str]) {
        assert!(config_with_namespaces(namespaces).validate().is_err());
    }
}
