#![allow(dead_code)]

use futures::FutureExt as _;
use futures::channel::oneshot;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use xc_nls::{
    BundleId, BundleLoader, LoadError, LocaleTag, RawBundle, ResourceFacade, StaticLoader,
};

pub fn tag(raw: &str) -> LocaleTag {
    LocaleTag::new(raw)
}

/// Wraps a [`StaticLoader`], counting fetches and optionally holding the
/// first one back until released.
#[derive(Default)]
pub struct CountingLoader {
    inner: StaticLoader,
    calls: AtomicUsize,
    broken: FxHashSet<BundleId>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl CountingLoader {
    pub fn new(inner: StaticLoader) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Makes fetching (`namespace`, `locale`) fail with an I/O error.
    pub fn with_broken(mut self, namespace: &str, locale: &str) -> Self {
        self.broken.insert(BundleId::new(namespace, tag(locale)));
        self
    }

    /// Holds the next fetch until the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        *self.gate.lock() = Some(receiver);
        sender
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BundleLoader for CountingLoader {
    fn fetch_bundle(
        &self,
        namespace: &str,
        locale: &LocaleTag,
    ) -> BoxFuture<'static, Result<RawBundle, LoadError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let id = BundleId::new(namespace, locale.clone());
        let broken = self.broken.contains(&id);
        let fetch = self.inner.fetch_bundle(namespace, locale);
        let gate = self.gate.lock().take();

        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if broken {
                return Err(LoadError::Io {
                    origin: id.to_string(),
                    source: Arc::new(io::Error::other("disk unavailable")),
                });
            }
            fetch.await
        }
        .boxed()
    }
}

/// The bundles used across these tests: complete `en-us`, partial `fr` and `fr-fr`.
pub fn console_bundles() -> StaticLoader {
    StaticLoader::new()
        .with_bundle(
            "VM",
            "en-us",
            [
                ("START", "Start"),
                ("DELETE", "Delete"),
                ("NAME_MASK", "Name: {0}"),
                ("VM_RUNNING", "running"),
                ("VM_PAUSED", "paused"),
                ("DISK_COUNT", "{0:n} disks"),
            ],
        )
        .with_bundle("VM", "fr", [("START", "Démarrer"), ("DELETE", "Supprimer")])
        .with_bundle(
            "VM",
            "fr-fr",
            [
                ("START", "Lancer"),
                ("NAME_MASK", "Nom : {0}"),
                ("VM_RUNNING", "actif"),
            ],
        )
        .with_bundle("MediaWizard", "en-us", [("TITLE", "Media Wizard")])
}

pub fn facade(loader: Arc<CountingLoader>) -> ResourceFacade {
    ResourceFacade::new(tag("en-us"), loader).with_namespaces(["VM", "MediaWizard"])
}
