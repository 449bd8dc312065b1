//! Registry of parsed bundles.

use crate::bundle::{Bundle, BundleId};
use crate::locale::LocaleTag;
use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;
use std::sync::Arc;

type LocaleBundles = FxHashMap<LocaleTag, Arc<Bundle>>;
type NamespaceBundles = FxHashMap<String, LocaleBundles>;

/// Holds one bundle per (namespace, locale).
///
/// The whole map is swapped on every registration, so a reader holds either
/// the old or the new bundle and never waits on a writer. The store performs no
/// I/O and no fallback.
#[derive(Debug)]
pub struct BundleStore {
    bundles: ArcSwap<NamespaceBundles>,
}

impl Default for BundleStore {
    fn default() -> Self {
        Self {
            bundles: ArcSwap::from_pointee(NamespaceBundles::default()),
        }
    }
}

impl BundleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bundle registered for exactly (`namespace`, `locale`).
    pub fn load(&self, namespace: &str, locale: &LocaleTag) -> Option<Arc<Bundle>> {
        self.bundles
            .load()
            .get(namespace)
            .and_then(|locales| locales.get(locale))
            .cloned()
    }

    /// Installs `bundle`, replacing any bundle with the same id.
    pub fn register(&self, bundle: Bundle) -> Arc<Bundle> {
        let bundle = Arc::new(bundle);
        self.register_shared(Arc::clone(&bundle));
        bundle
    }

    pub fn register_shared(&self, bundle: Arc<Bundle>) {
        tracing::debug!("Registering bundle {} ({} keys)", bundle.id(), bundle.len());
        self.bundles.rcu(|current| {
            let mut next = NamespaceBundles::clone(current);
            next.entry(bundle.namespace().to_string())
                .or_default()
                .insert(bundle.locale().clone(), Arc::clone(&bundle));
            next
        });
    }

    /// Removes the bundle for `id`, returning it when present.
    pub fn remove(&self, id: &BundleId) -> Option<Arc<Bundle>> {
        let previous = self.load(&id.namespace, &id.locale)?;
        self.bundles.rcu(|current| {
            let mut next = NamespaceBundles::clone(current);
            if let Some(locales) = next.get_mut(&id.namespace) {
                locales.remove(&id.locale);
                if locales.is_empty() {
                    next.remove(&id.namespace);
                }
            }
            next
        });
        Some(previous)
    }

    pub fn clear(&self) {
        self.bundles.store(Arc::new(NamespaceBundles::default()));
    }

    pub fn contains(&self, namespace: &str, locale: &LocaleTag) -> bool {
        self.load(namespace, locale).is_some()
    }

    /// Ids of every registered bundle, sorted.
    pub fn ids(&self) -> Vec<BundleId> {
        let snapshot = self.bundles.load();
        let mut ids: Vec<BundleId> = snapshot
            .values()
            .flat_map(|locales| locales.values().map(|bundle| bundle.id().clone()))
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.bundles.load().values().map(|locales| locales.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
