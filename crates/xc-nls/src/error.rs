use thiserror::Error;
use xc_nls_core::{FormatError, LoadError, LocaleTag};
use xc_nls_toml::NlsConfigError;

#[derive(Debug, Error)]
pub enum NlsError {
    /// The default locale's bundle could not be loaded, so the chain has no
    /// complete bundle left to consult.
    #[error("Failed to load bundle '{namespace}' for locale '{locale}': {source}")]
    BundleLoadFailed {
        namespace: String,
        locale: LocaleTag,
        #[source]
        source: LoadError,
    },
    /// No bundle along the fallback chain defines the key.
    #[error("Key '{key}' not found in namespace '{namespace}'")]
    KeyNotFound { namespace: String, key: String },
    /// The template could not be rendered with the supplied arguments.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// A status code without a registered key, or an unknown status code name.
    #[error("Unknown status code '{0}'")]
    UnknownStatusCode(String),
    /// The namespace is not one of the configured namespaces.
    #[error("Namespace '{0}' is not configured")]
    UnknownNamespace(String),
    #[error("Invalid configuration: {0}")]
    Config(#[from] NlsConfigError),
}

impl NlsError {
    /// `true` for content defects: a missing key or a template/argument mismatch.
    pub fn is_content_error(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. } | Self::Format(_))
    }
}
