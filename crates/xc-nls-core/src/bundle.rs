use crate::locale::LocaleTag;
use crate::source::BundleParseError;
use crate::template::Template;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::fmt;

/// Key/template pairs as delivered by a loader, in source order.
pub type RawBundle = IndexMap<String, String>;

/// Identifies a bundle: one namespace (`VM`, `MediaWizard`) in one locale.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BundleId {
    pub namespace: String,
    pub locale: LocaleTag,
}

impl BundleId {
    pub fn new(namespace: impl Into<String>, locale: LocaleTag) -> Self {
        Self {
            namespace: namespace.into(),
            locale,
        }
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.locale, self.namespace)
    }
}

/// An immutable mapping from key to parsed template.
///
/// A bundle is never edited after construction; newer content is registered as
/// a new bundle that replaces this one.
#[derive(Debug)]
pub struct Bundle {
    id: BundleId,
    entries: FxHashMap<String, Template>,
}

impl Bundle {
    pub fn new(
        namespace: impl Into<String>,
        locale: LocaleTag,
        raw: RawBundle,
    ) -> Result<Self, BundleParseError> {
        let mut entries = FxHashMap::with_capacity_and_hasher(raw.len(), Default::default());
        for (key, template) in raw {
            if key.is_empty() {
                return Err(BundleParseError::EmptyKey);
            }
            entries.insert(key, Template::parse(template));
        }

        Ok(Self {
            id: BundleId::new(namespace, locale),
            entries,
        })
    }

    /// Builds a bundle from literal pairs.
    pub fn from_pairs<K, V>(
        namespace: impl Into<String>,
        locale: LocaleTag,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, BundleParseError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let raw = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::new(namespace, locale, raw)
    }

    pub fn id(&self) -> &BundleId {
        &self.id
    }

    pub fn namespace(&self) -> &str {
        &self.id.namespace
    }

    pub fn locale(&self) -> &LocaleTag {
        &self.id.locale
    }

    pub fn get(&self, key: &str) -> Option<&Template> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys present in `reference` but absent from this bundle, sorted.
    pub fn missing_keys(&self, reference: &Bundle) -> Vec<String> {
        let mut missing: Vec<String> = reference
            .keys()
            .filter(|key| !self.contains_key(key))
            .map(str::to_string)
            .collect();
        missing.sort();
        missing
    }
}
