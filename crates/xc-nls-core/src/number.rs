//! Locale-aware digit grouping for the `n` format hint.

use crate::locale::LocaleTag;
use fixed_decimal::{Decimal, FloatPrecision};
use icu::decimal::DecimalFormatter;
use icu::decimal::options::DecimalFormatterOptions;
use icu::locale::{Locale, locale};

/// Formats numbers with the grouping and decimal separators of one locale.
pub struct NumberFormatter {
    locale: LocaleTag,
    formatter: Option<DecimalFormatter>,
}

impl NumberFormatter {
    pub fn for_locale(tag: &LocaleTag) -> Self {
        let icu_locale = tag.as_str().parse::<Locale>().unwrap_or_else(|_| {
            tracing::debug!("Locale '{}' is not a valid ICU locale, using root rules", tag);
            locale!("und")
        });

        let formatter =
            match DecimalFormatter::try_new(icu_locale.into(), DecimalFormatterOptions::default()) {
                Ok(formatter) => Some(formatter),
                Err(err) => {
                    tracing::warn!(
                        "No decimal formatting data for '{}', digits will not be grouped: {}",
                        tag,
                        err
                    );
                    None
                },
            };

        Self {
            locale: tag.clone(),
            formatter,
        }
    }

    pub fn locale(&self) -> &LocaleTag {
        &self.locale
    }

    pub fn format_integer(&self, value: i64) -> String {
        self.format_decimal(&Decimal::from(value))
    }

    /// Formats a float with its shortest round-trip digits.
    ///
    /// Returns `None` for NaN and infinities.
    pub fn format_float(&self, value: f64) -> Option<String> {
        let decimal = Decimal::try_from_f64(value, FloatPrecision::RoundTrip).ok()?;
        Some(self.format_decimal(&decimal))
    }

    /// Formats numeric text, e.g. a count that arrived as a string.
    pub fn format_text(&self, value: &str) -> Option<String> {
        let value = value.trim();
        if let Ok(integer) = value.parse::<i64>() {
            return Some(self.format_integer(integer));
        }
        value
            .parse::<f64>()
            .ok()
            .filter(|float| float.is_finite())
            .and_then(|float| self.format_float(float))
    }

    fn format_decimal(&self, decimal: &Decimal) -> String {
        match &self.formatter {
            Some(formatter) => formatter.format(decimal).to_string(),
            None => decimal.to_string(),
        }
    }
}

impl std::fmt::Debug for NumberFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumberFormatter")
            .field("locale", &self.locale)
            .field("has_data", &self.formatter.is_some())
            .finish()
    }
}
