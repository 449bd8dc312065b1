use crate::locale::LocaleTag;

/// Locales to consult for a request, most specific first, ending in the default.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FallbackChain(Vec<LocaleTag>);

impl FallbackChain {
    /// Computes the chain for `requested`.
    ///
    /// Subtags are stripped from the right until the bare language remains, then
    /// `default` is appended. If `default` is reached while stripping, the chain
    /// stops there, so it never holds duplicates and always ends in `default`.
    /// Malformed or empty tags still yield a chain (possibly just `[default]`).
    pub fn resolve(requested: &LocaleTag, default: &LocaleTag) -> Self {
        let mut tags = Vec::new();
        let mut current = (!requested.is_empty()).then(|| requested.clone());

        while let Some(tag) = current {
            if &tag == default {
                break;
            }
            current = tag.parent();
            tags.push(tag);
        }

        tags.push(default.clone());
        Self(tags)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocaleTag> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[LocaleTag] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The default locale the chain terminates in.
    pub fn default_locale(&self) -> Option<&LocaleTag> {
        self.0.last()
    }
}

impl<'a> IntoIterator for &'a FallbackChain {
    type Item = &'a LocaleTag;
    type IntoIter = std::slice::Iter<'a, LocaleTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Shorthand for [`FallbackChain::resolve`].
pub fn fallback_chain(requested: &LocaleTag, default: &LocaleTag) -> FallbackChain {
    FallbackChain::resolve(requested, default)
}
