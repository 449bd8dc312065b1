//! The public lookup entry point: key + locale + arguments to display text.

use crate::error::NlsError;
use futures::FutureExt as _;
use futures::future::{BoxFuture, Shared};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use xc_nls_core::{
    Bundle, BundleId, BundleLoader, BundleStore, FallbackChain, FormatArg, LoadError, LocaleTag,
};
use xc_nls_toml::NlsConfig;

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<Bundle>, LoadError>>>;

/// Placeholder returned by [`ResourceFacade::resolve_text_or_missing`].
pub fn missing_translation(key: &str) -> String {
    format!("[missing translation: {}]", key)
}

#[derive(Default)]
struct InFlight {
    /// Bumped by every cache clear; fetches started under an older value
    /// neither register their bundle nor record their failure.
    generation: u64,
    loads: FxHashMap<BundleId, SharedLoad>,
}

#[derive(Default)]
struct LoadState {
    in_flight: Mutex<InFlight>,
    failed: Mutex<FxHashMap<BundleId, LoadError>>,
}

/// Resolves keys to rendered text along a locale's fallback chain.
///
/// Bundles are fetched from the loader on first use and kept in the
/// [`BundleStore`]. Concurrent requests for the same cold bundle share a single
/// fetch; a fetch keeps running when the caller that started it goes away.
pub struct ResourceFacade {
    default_locale: LocaleTag,
    namespaces: Vec<String>,
    loader: Arc<dyn BundleLoader>,
    store: Arc<BundleStore>,
    chains: RwLock<FxHashMap<LocaleTag, FallbackChain>>,
    state: Arc<LoadState>,
}

impl ResourceFacade {
    pub fn new(default_locale: LocaleTag, loader: Arc<dyn BundleLoader>) -> Self {
        Self {
            default_locale,
            namespaces: Vec::new(),
            loader,
            store: Arc::new(BundleStore::new()),
            chains: RwLock::new(FxHashMap::default()),
            state: Arc::new(LoadState::default()),
        }
    }

    /// Restricts lookups to `namespaces`. An empty list accepts any namespace.
    pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    /// Shares an existing store instead of starting empty.
    pub fn with_store(mut self, store: Arc<BundleStore>) -> Self {
        self.store = store;
        self
    }

    /// Builds a façade from a validated configuration.
    pub fn from_config(config: &NlsConfig, loader: Arc<dyn BundleLoader>) -> Result<Self, NlsError> {
        config.validate()?;
        let default_locale = LocaleTag::from(config.default_locale_identifier()?);

        Ok(Self::new(default_locale, loader).with_namespaces(config.namespaces.iter().cloned()))
    }

    pub fn default_locale(&self) -> &LocaleTag {
        &self.default_locale
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn store(&self) -> &Arc<BundleStore> {
        &self.store
    }

    /// The fallback chain for `locale`, computed once and cached.
    ///
    /// Every distinct requested locale adds one cache entry, and entries are
    /// only dropped by [`clear_cache`](Self::clear_cache).
    pub fn fallback_chain(&self, locale: &LocaleTag) -> FallbackChain {
        if let Some(chain) = self.chains.read().get(locale) {
            return chain.clone();
        }

        let chain = FallbackChain::resolve(locale, &self.default_locale);
        tracing::debug!("Fallback chain for '{}': {:?}", locale, chain.as_slice());
        self.chains
            .write()
            .entry(locale.clone())
            .or_insert(chain)
            .clone()
    }

    /// Resolves `key` in `namespace` for `locale` and renders it with `args`.
    ///
    /// The first bundle along the fallback chain that defines `key` wins, and
    /// its template is rendered with that bundle's locale. Bundles that fail to
    /// load are skipped, except for the default locale's.
    pub async fn resolve_text(
        &self,
        namespace: &str,
        key: &str,
        locale: &LocaleTag,
        args: &[FormatArg],
    ) -> Result<String, NlsError> {
        self.ensure_namespace(namespace)?;

        let chain = self.fallback_chain(locale);
        for tag in &chain {
            match self.bundle(namespace, tag).await {
                Ok(bundle) => {
                    if let Some(template) = bundle.get(key) {
                        return Ok(template.render(args, bundle.locale())?);
                    }
                },
                Err(source) => self.skip_failed_bundle(namespace, tag, source)?,
            }
        }

        Err(NlsError::KeyNotFound {
            namespace: namespace.to_string(),
            key: key.to_string(),
        })
    }

    /// Like [`resolve_text`](Self::resolve_text), but any failure is logged and
    /// replaced by a visible placeholder.
    pub async fn resolve_text_or_missing(
        &self,
        namespace: &str,
        key: &str,
        locale: &LocaleTag,
        args: &[FormatArg],
    ) -> String {
        match self.resolve_text(namespace, key, locale, args).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("Showing placeholder for '{}/{}': {}", namespace, key, err);
                missing_translation(key)
            },
        }
    }

    /// Loads every bundle along `locale`'s chain for all configured namespaces.
    pub async fn preload(&self, locale: &LocaleTag) -> Result<(), NlsError> {
        let chain = self.fallback_chain(locale);
        let loads = self.namespaces.iter().map(|namespace| {
            let chain = &chain;
            async move {
                for tag in chain {
                    if let Err(source) = self.bundle(namespace, tag).await {
                        self.skip_failed_bundle(namespace, tag, source)?;
                    }
                }
                Ok::<(), NlsError>(())
            }
        });

        futures::future::try_join_all(loads).await?;
        Ok(())
    }

    /// Keys of the default locale's bundle that `locale`'s own bundle lacks.
    pub async fn missing_keys(
        &self,
        namespace: &str,
        locale: &LocaleTag,
    ) -> Result<Vec<String>, NlsError> {
        self.ensure_namespace(namespace)?;

        let reference = self.default_bundle(namespace).await?;
        match self.bundle(namespace, locale).await {
            Ok(bundle) => Ok(bundle.missing_keys(&reference)),
            Err(err) if err.is_not_found() => {
                let mut keys: Vec<String> = reference.keys().map(str::to_string).collect();
                keys.sort();
                Ok(keys)
            },
            Err(source) => Err(NlsError::BundleLoadFailed {
                namespace: namespace.to_string(),
                locale: locale.clone(),
                source,
            }),
        }
    }

    /// The default locale's bundle for `namespace`, loading it if needed.
    pub async fn default_bundle(&self, namespace: &str) -> Result<Arc<Bundle>, NlsError> {
        self.bundle(namespace, &self.default_locale)
            .await
            .map_err(|source| NlsError::BundleLoadFailed {
                namespace: namespace.to_string(),
                locale: self.default_locale.clone(),
                source,
            })
    }

    /// Drops cached chains, remembered load failures and loaded bundles.
    ///
    /// Fetches still running keep serving their current waiters, but their
    /// results are discarded, so the next request fetches again.
    pub fn clear_cache(&self) {
        let mut in_flight = self.state.in_flight.lock();
        in_flight.generation += 1;
        in_flight.loads.clear();
        self.state.failed.lock().clear();
        self.store.clear();
        self.chains.write().clear();
        tracing::debug!("Cleared NLS caches (generation {})", in_flight.generation);
    }

    fn ensure_namespace(&self, namespace: &str) -> Result<(), NlsError> {
        if self.namespaces.is_empty() || self.namespaces.iter().any(|ns| ns == namespace) {
            Ok(())
        } else {
            Err(NlsError::UnknownNamespace(namespace.to_string()))
        }
    }

    /// Logs a failed chain entry; only the default locale's failure is fatal.
    fn skip_failed_bundle(
        &self,
        namespace: &str,
        tag: &LocaleTag,
        source: LoadError,
    ) -> Result<(), NlsError> {
        if tag == &self.default_locale {
            tracing::error!("Default bundle '{}/{}' unavailable: {}", tag, namespace, source);
            return Err(NlsError::BundleLoadFailed {
                namespace: namespace.to_string(),
                locale: tag.clone(),
                source,
            });
        }

        if source.is_not_found() {
            tracing::debug!("No bundle '{}/{}', trying next locale", tag, namespace);
        } else {
            tracing::warn!("Skipping bundle '{}/{}': {}", tag, namespace, source);
        }
        Ok(())
    }

    async fn bundle(&self, namespace: &str, locale: &LocaleTag) -> Result<Arc<Bundle>, LoadError> {
        if let Some(bundle) = self.store.load(namespace, locale) {
            return Ok(bundle);
        }

        let id = BundleId::new(namespace, locale.clone());
        let load = {
            let mut in_flight = self.state.in_flight.lock();
            // a fetch may have finished between the store check and taking the lock
            if let Some(bundle) = self.store.load(namespace, locale) {
                return Ok(bundle);
            }
            if let Some(err) = self.state.failed.lock().get(&id) {
                return Err(err.clone());
            }
            let generation = in_flight.generation;
            in_flight
                .loads
                .entry(id.clone())
                .or_insert_with(|| self.start_fetch(id, generation))
                .clone()
        };

        load.await
    }

    fn start_fetch(&self, id: BundleId, generation: u64) -> SharedLoad {
        let loader = Arc::clone(&self.loader);
        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);

        async move {
            tracing::info!("Fetching bundle {}", id);
            let result = loader
                .fetch_bundle(&id.namespace, &id.locale)
                .await
                .and_then(|raw| {
                    Bundle::new(id.namespace.clone(), id.locale.clone(), raw)
                        .map_err(|err| LoadError::parse(id.to_string(), err))
                });

            let mut in_flight = state.in_flight.lock();
            if in_flight.generation != generation {
                tracing::debug!("Discarding result of bundle {} fetched before a cache clear", id);
                return result.map(Arc::new);
            }

            in_flight.loads.remove(&id);
            match result {
                Ok(bundle) => Ok(store.register(bundle)),
                Err(err) => {
                    state.failed.lock().insert(id, err.clone());
                    Err(err)
                },
            }
        }
        .boxed()
        .shared()
    }
}

impl std::fmt::Debug for ResourceFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceFacade")
            .field("default_locale", &self.default_locale)
            .field("namespaces", &self.namespaces)
            .field("bundles", &self.store.len())
            .finish_non_exhaustive()
    }
}
