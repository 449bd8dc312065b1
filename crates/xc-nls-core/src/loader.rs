//! Sources of raw bundles.

use crate::bundle::{BundleId, RawBundle};
use crate::locale::LocaleTag;
use crate::source::{BundleFormat, BundleParseError};
use futures::FutureExt as _;
use futures::future::{self, BoxFuture};
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Failure to produce a bundle.
///
/// Cheap to clone: one failed fetch is reported to every caller waiting on it.
#[derive(Clone, Debug, Error)]
pub enum LoadError {
    #[error("No bundle for namespace '{namespace}' in locale '{locale}'")]
    NotFound { namespace: String, locale: LocaleTag },
    #[error("Failed to read bundle '{origin}': {source}")]
    Io {
        origin: String,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Failed to parse bundle '{origin}': {source}")]
    Parse {
        origin: String,
        #[source]
        source: Arc<BundleParseError>,
    },
    #[error("Bundle backend error: {0}")]
    Backend(Arc<anyhow::Error>),
}

impl LoadError {
    pub fn not_found(id: &BundleId) -> Self {
        Self::NotFound {
            namespace: id.namespace.clone(),
            locale: id.locale.clone(),
        }
    }

    pub fn parse(origin: impl Into<String>, source: BundleParseError) -> Self {
        Self::Parse {
            origin: origin.into(),
            source: Arc::new(source),
        }
    }

    pub fn backend(error: impl Into<anyhow::Error>) -> Self {
        Self::Backend(Arc::new(error.into()))
    }

    /// `true` when the source simply has no such bundle.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Fetches the raw content of one (namespace, locale) bundle.
///
/// Implementations only produce bytes-turned-pairs; caching, fallback and
/// de-duplication of concurrent fetches are the caller's job. The returned
/// future owns everything it needs so it can be shared between waiters.
pub trait BundleLoader: Send + Sync {
    fn fetch_bundle(
        &self,
        namespace: &str,
        locale: &LocaleTag,
    ) -> BoxFuture<'static, Result<RawBundle, LoadError>>;
}

/// Serves bundles held in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticLoader {
    bundles: FxHashMap<BundleId, RawBundle>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle<K, V>(
        mut self,
        namespace: &str,
        locale: &str,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.insert(
            BundleId::new(namespace, LocaleTag::new(locale)),
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Adds a bundle given as source text in `format`.
    pub fn with_source(
        mut self,
        namespace: &str,
        locale: &str,
        format: BundleFormat,
        text: &str,
    ) -> Result<Self, BundleParseError> {
        let raw = format.parse(text)?;
        self.insert(BundleId::new(namespace, LocaleTag::new(locale)), raw);
        Ok(self)
    }

    pub fn insert(&mut self, id: BundleId, raw: RawBundle) {
        self.bundles.insert(id, raw);
    }
}

impl BundleLoader for StaticLoader {
    fn fetch_bundle(
        &self,
        namespace: &str,
        locale: &LocaleTag,
    ) -> BoxFuture<'static, Result<RawBundle, LoadError>> {
        let id = BundleId::new(namespace, locale.clone());
        let result = self
            .bundles
            .get(&id)
            .cloned()
            .ok_or_else(|| LoadError::not_found(&id));
        future::ready(result).boxed()
    }
}

/// Reads `{root}/{locale}/{namespace}.json`, falling back to `.js`.
#[derive(Clone, Debug)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(root: &Path, id: &BundleId) -> Result<RawBundle, LoadError> {
        let dir = root.join(id.locale.as_str());

        for extension in BundleFormat::EXTENSIONS {
            let path = dir.join(format!("{}.{}", id.namespace, extension));
            let text = match fs_err::read_to_string(&path) {
                Ok(text) => text,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => {
                    return Err(LoadError::Io {
                        origin: path.display().to_string(),
                        source: Arc::new(err),
                    });
                },
            };

            let format = BundleFormat::from_extension(extension).unwrap_or(BundleFormat::Json);
            tracing::debug!("Reading bundle {} from {}", id, path.display());
            return format
                .parse(&text)
                .map_err(|err| LoadError::parse(path.display().to_string(), err));
        }

        Err(LoadError::not_found(id))
    }
}

impl BundleLoader for DirectoryLoader {
    fn fetch_bundle(
        &self,
        namespace: &str,
        locale: &LocaleTag,
    ) -> BoxFuture<'static, Result<RawBundle, LoadError>> {
        let root = self.root.clone();
        let id = BundleId::new(namespace, locale.clone());
        async move { Self::read(&root, &id) }.boxed()
    }
}

/// Serves bundles compiled into the binary with `rust-embed`.
///
/// Files are laid out as for [`DirectoryLoader`]: `{locale}/{namespace}.json`
/// or `{locale}/{namespace}.js` relative to the embedded folder.
pub struct EmbeddedLoader<T: RustEmbed> {
    _assets: PhantomData<fn() -> T>,
}

impl<T: RustEmbed> Default for EmbeddedLoader<T> {
    fn default() -> Self {
        Self {
            _assets: PhantomData,
        }
    }
}

impl<T: RustEmbed> EmbeddedLoader<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locales that have at least one embedded bundle, sorted.
    pub fn available_locales() -> Vec<LocaleTag> {
        let mut locales: Vec<LocaleTag> = T::iter()
            .filter_map(|path| {
                let (locale, file) = path.split_once('/')?;
                let (_, extension) = file.rsplit_once('.')?;
                BundleFormat::from_extension(extension).map(|_| LocaleTag::new(locale))
            })
            .collect();
        locales.sort();
        locales.dedup();
        locales
    }

    fn read(id: &BundleId) -> Result<RawBundle, LoadError> {
        for extension in BundleFormat::EXTENSIONS {
            let path = format!("{}/{}.{}", id.locale, id.namespace, extension);
            let Some(file) = T::get(&path) else {
                continue;
            };

            let text = std::str::from_utf8(&file.data).map_err(|err| LoadError::Io {
                origin: path.clone(),
                source: Arc::new(io::Error::new(io::ErrorKind::InvalidData, err)),
            })?;
            let format = BundleFormat::from_extension(extension).unwrap_or(BundleFormat::Json);
            return format.parse(text).map_err(|err| LoadError::parse(path, err));
        }

        Err(LoadError::not_found(id))
    }
}

impl<T: RustEmbed> BundleLoader for EmbeddedLoader<T> {
    fn fetch_bundle(
        &self,
        namespace: &str,
        locale: &LocaleTag,
    ) -> BoxFuture<'static, Result<RawBundle, LoadError>> {
        let id = BundleId::new(namespace, locale.clone());
        future::ready(Self::read(&id)).boxed()
    }
}
