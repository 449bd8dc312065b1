use crate::error::NlsError;
use crate::facade::ResourceFacade;
use crate::status::{StatusCode, StatusLabelMapper, StatusLabelTable};
use std::path::Path;
use std::sync::Arc;
use xc_nls_core::{BundleLoader, DirectoryLoader, FormatArg, LocaleTag};
use xc_nls_toml::NlsConfig;

/// A configured façade together with its status label mapper.
#[derive(Debug)]
pub struct NlsManager {
    facade: Arc<ResourceFacade>,
    status_labels: StatusLabelMapper,
}

impl NlsManager {
    /// Builds the manager from `config`, fetching bundles through `loader`.
    pub fn from_config(config: &NlsConfig, loader: Arc<dyn BundleLoader>) -> Result<Self, NlsError> {
        let facade = Arc::new(ResourceFacade::from_config(config, loader)?);
        let table = StatusLabelTable::from_config(&config.status_labels)?;
        let status_labels = StatusLabelMapper::new(Arc::clone(&facade), table)?;

        tracing::info!(
            "NLS ready: default locale '{}', {} namespace(s)",
            facade.default_locale(),
            facade.namespaces().len()
        );

        Ok(Self {
            facade,
            status_labels,
        })
    }

    /// Reads `nls.toml` from `manifest_dir` and serves bundles from its assets directory.
    pub fn from_manifest_dir(manifest_dir: &Path) -> Result<Self, NlsError> {
        let config = NlsConfig::from_manifest_dir(manifest_dir)?;
        let assets_dir = config.assets_dir_from_base(Some(manifest_dir))?;
        tracing::debug!("Serving bundles from {}", assets_dir.display());

        Self::from_config(&config, Arc::new(DirectoryLoader::new(assets_dir)))
    }

    pub fn facade(&self) -> &Arc<ResourceFacade> {
        &self.facade
    }

    pub fn status_labels(&self) -> &StatusLabelMapper {
        &self.status_labels
    }

    pub async fn resolve_text(
        &self,
        namespace: &str,
        key: &str,
        locale: &LocaleTag,
        args: &[FormatArg],
    ) -> Result<String, NlsError> {
        self.facade.resolve_text(namespace, key, locale, args).await
    }

    pub async fn label_for(
        &self,
        code: impl Into<StatusCode>,
        locale: &LocaleTag,
    ) -> Result<String, NlsError> {
        self.status_labels.label_for(code, locale).await
    }

    /// Startup check: every configured namespace has a default bundle, and the
    /// status namespace defines every status label.
    pub async fn validate(&self) -> Result<(), NlsError> {
        for namespace in self.facade.namespaces() {
            self.facade.default_bundle(namespace).await?;
        }
        self.status_labels.verify_default_bundle().await
    }
}
