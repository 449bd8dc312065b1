//! Normalized locale identifiers.

use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use unic_langid::LanguageIdentifier;

/// A locale identifier reduced to lower-case, hyphen-separated subtags.
///
/// Normalization never fails: `fr_FR.UTF-8@euro`, `FR-fr` and ` fr-fr ` all
/// become `fr-fr`. Equality is plain string equality after normalization.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct LocaleTag(String);

impl LocaleTag {
    pub fn new(raw: &str) -> Self {
        // POSIX locales carry `.codeset` and `@modifier` suffixes.
        let without_modifier = raw.trim().split('@').next().unwrap_or_default();
        let without_codeset = without_modifier.split('.').next().unwrap_or_default();

        let subtags: Vec<String> = without_codeset
            .split(['-', '_'])
            .filter(|subtag| !subtag.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        Self(subtags.join("-"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for a tag that had no usable subtag.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The primary language subtag (`fr` for `fr-fr`).
    pub fn language(&self) -> &str {
        self.subtags().next().unwrap_or_default()
    }

    pub fn subtags(&self) -> impl Iterator<Item = &str> {
        self.0.split('-').filter(|subtag| !subtag.is_empty())
    }

    /// The tag with its most specific subtag removed, `None` for a bare language.
    pub fn parent(&self) -> Option<LocaleTag> {
        self.0
            .rsplit_once('-')
            .map(|(parent, _)| LocaleTag(parent.to_string()))
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LocaleTag {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for LocaleTag {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for LocaleTag {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&LanguageIdentifier> for LocaleTag {
    fn from(lang: &LanguageIdentifier) -> Self {
        Self::new(&lang.to_string())
    }
}

impl From<LanguageIdentifier> for LocaleTag {
    fn from(lang: LanguageIdentifier) -> Self {
        Self::from(&lang)
    }
}

impl AsRef<str> for LocaleTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LocaleTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}
