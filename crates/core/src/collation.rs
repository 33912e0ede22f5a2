//! Locale-aware string ordering for heritage titles.
//!
//! Titles are mostly Japanese, so byte order is meaningless; ordering goes
//! through an ICU collator for the configured locale.

use std::cmp::Ordering;
use std::fmt;

use icu::collator::{Collator, CollatorOptions};
use icu::locid::Locale;

use crate::error::CoreError;

/// Locale used when none is configured.
pub const DEFAULT_COLLATION_LOCALE: &str = "ja";

pub struct TitleCollator {
    locale: String,
    collator: Collator,
}

impl TitleCollator {
    /// Build a collator for a BCP-47 locale such as `ja` or `en-US`.
    pub fn new(locale: &str) -> Result<Self, CoreError> {
        let parsed: Locale = locale.parse().map_err(|e| CoreError::Collation {
            locale: locale.to_string(),
            reason: format!("{e}"),
        })?;

        let collator = Collator::try_new(&(&parsed).into(), CollatorOptions::new()).map_err(
            |e| CoreError::Collation {
                locale: locale.to_string(),
                reason: format!("{e}"),
            },
        )?;

        Ok(Self {
            locale: locale.to_string(),
            collator,
        })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        self.collator.compare(left, right)
    }
}

impl fmt::Debug for TitleCollator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TitleCollator")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_kana_by_gojuon() {
        let collator = TitleCollator::new(DEFAULT_COLLATION_LOCALE).unwrap();
        assert_eq!(collator.compare("あおもり", "かまくら"), Ordering::Less);
        assert_eq!(collator.compare("さくら", "かまくら"), Ordering::Greater);
    }

    #[test]
    fn ignores_case_at_primary_level() {
        let collator = TitleCollator::new("en").unwrap();
        // Byte order would put "Banana" first.
        assert_eq!(collator.compare("apple", "Banana"), Ordering::Less);
    }

    #[test]
    fn rejects_malformed_locale() {
        let err = TitleCollator::new("not a locale!").unwrap_err();
        assert!(err.to_string().contains("not a locale!"));
    }
}
