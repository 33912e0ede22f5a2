//! Client-side filtering and ordering of the heritage list.
//!
//! Pure functions over a slice of cached entries. All active predicates
//! combine with AND; the multi-select predicates (criteria, regions,
//! features) require the entry to carry *every* selected value.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::collation::TitleCollator;
use crate::error::CoreError;
use crate::models::HeritageEntry;
use crate::vocabulary::{TagKind, Vocabulary};

/// Direction of the title sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// The set of active list predicates. The default filter matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeritageFilter {
    /// Case-insensitive substring of the title.
    pub search: String,
    pub criteria: Vec<u32>,
    /// Exact UNESCO classification.
    pub unesco_tag: Option<String>,
    pub regions: Vec<String>,
    pub features: Vec<String>,
}

impl HeritageFilter {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.criteria.is_empty()
            && self.unesco_tag.is_none()
            && self.regions.is_empty()
            && self.features.is_empty()
    }

    pub fn matches(&self, entry: &HeritageEntry) -> bool {
        self.matches_search(entry)
            && self.criteria.iter().all(|c| entry.has_criterion(*c))
            && self
                .unesco_tag
                .as_deref()
                .map_or(true, |tag| entry.unesco_tag.as_deref() == Some(tag))
            && self.regions.iter().all(|r| entry.has_region(r))
            && self.features.iter().all(|f| entry.has_feature(f))
    }

    fn matches_search(&self, entry: &HeritageEntry) -> bool {
        let needle = self.search.trim();
        needle.is_empty() || entry.title.to_lowercase().contains(&needle.to_lowercase())
    }

    /// Add `criterion` if absent, remove it if present.
    pub fn toggle_criterion(&mut self, criterion: u32) {
        toggle(&mut self.criteria, criterion);
    }

    pub fn toggle_region(&mut self, tag: &str) {
        toggle(&mut self.regions, tag.to_string());
    }

    pub fn toggle_feature(&mut self, tag: &str) {
        toggle(&mut self.features, tag.to_string());
    }

    /// Check every selected value against `vocab`. The first value outside
    /// its list is reported.
    pub fn validate(&self, vocab: &Vocabulary) -> Result<(), CoreError> {
        for criterion in &self.criteria {
            vocab.ensure_criterion(*criterion)?;
        }
        if let Some(tag) = &self.unesco_tag {
            vocab.ensure(TagKind::Unesco, tag)?;
        }
        for region in &self.regions {
            vocab.ensure(TagKind::Region, region)?;
        }
        for feature in &self.features {
            vocab.ensure(TagKind::Feature, feature)?;
        }
        Ok(())
    }
}

fn toggle<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if let Some(pos) = values.iter().position(|v| *v == value) {
        values.remove(pos);
    } else {
        values.push(value);
    }
}

/// Order two entries by title, breaking ties by id so the order is total.
pub fn compare_entries(
    collator: &TitleCollator,
    order: SortOrder,
    a: &HeritageEntry,
    b: &HeritageEntry,
) -> Ordering {
    let ordering = collator
        .compare(&a.title, &b.title)
        .then_with(|| a.id.cmp(&b.id));
    order.apply(ordering)
}

/// Filter `entries` and sort the survivors by title.
pub fn filter_and_sort<'a>(
    entries: &'a [HeritageEntry],
    filter: &HeritageFilter,
    collator: &TitleCollator,
    order: SortOrder,
) -> Vec<&'a HeritageEntry> {
    let mut visible: Vec<&HeritageEntry> = entries.iter().filter(|e| filter.matches(e)).collect();
    visible.sort_by(|a, b| compare_entries(collator, order, a, b));
    visible
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::collation::DEFAULT_COLLATION_LOCALE;

    fn entry(id: i64, title: &str) -> HeritageEntry {
        HeritageEntry {
            id,
            title: title.to_string(),
            description: None,
            summary: None,
            simple_summary: None,
            criteria: None,
            unesco_tag: None,
            country: None,
            region: None,
            feature: None,
        }
    }

    fn sample() -> Vec<HeritageEntry> {
        let mut himeji = entry(1, "姫路城 Himeji");
        himeji.criteria = Some(vec![1, 4]);
        himeji.unesco_tag = Some("文化遺産".into());
        himeji.region = Some(vec!["アジア".into()]);
        himeji.feature = Some(vec!["城郭・要塞".into()]);

        let mut yakushima = entry(2, "屋久島 Yakushima");
        yakushima.criteria = Some(vec![7, 9]);
        yakushima.unesco_tag = Some("自然遺産".into());
        yakushima.region = Some(vec!["アジア".into()]);
        yakushima.feature = Some(vec!["森林".into(), "島嶼".into()]);

        let mut mont = entry(3, "Mont-Saint-Michel");
        mont.criteria = Some(vec![1, 3, 6]);
        mont.unesco_tag = Some("文化遺産".into());
        mont.region = Some(vec!["ヨーロッパ".into()]);
        mont.feature = Some(vec!["宗教建築".into(), "島嶼".into()]);

        vec![himeji, yakushima, mont, entry(4, "Untagged")]
    }

    fn ids(entries: &[&HeritageEntry]) -> Vec<i64> {
        entries.iter().map(|e| e.id).collect()
    }

    fn matched(entries: &[HeritageEntry], filter: &HeritageFilter) -> Vec<i64> {
        entries
            .iter()
            .filter(|e| filter.matches(e))
            .map(|e| e.id)
            .collect()
    }

    fn collator() -> TitleCollator {
        TitleCollator::new(DEFAULT_COLLATION_LOCALE).unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let entries = sample();
        let filter = HeritageFilter::default();
        assert!(filter.is_empty());
        assert!(entries.iter().all(|e| filter.matches(e)));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let entries = sample();
        let filter = HeritageFilter {
            search: "himeji".into(),
            ..Default::default()
        };
        assert_eq!(matched(&entries, &filter), vec![1]);
    }

    #[test]
    fn criteria_require_all_selected() {
        let entries = sample();
        let mut filter = HeritageFilter::default();
        filter.toggle_criterion(1);
        assert_eq!(matched(&entries, &filter), vec![1, 3]);

        filter.toggle_criterion(4);
        assert_eq!(matched(&entries, &filter), vec![1]);
    }

    #[test]
    fn unesco_tag_is_exact() {
        let entries = sample();
        let filter = HeritageFilter {
            unesco_tag: Some("自然遺産".into()),
            ..Default::default()
        };
        assert_eq!(matched(&entries, &filter), vec![2]);
    }

    #[test]
    fn regions_and_features_require_all_selected() {
        let entries = sample();
        let filter = HeritageFilter {
            features: vec!["島嶼".into()],
            ..Default::default()
        };
        assert_eq!(matched(&entries, &filter), vec![2, 3]);

        let filter = HeritageFilter {
            regions: vec!["アジア".into()],
            features: vec!["島嶼".into(), "森林".into()],
            ..Default::default()
        };
        assert_eq!(matched(&entries, &filter), vec![2]);
    }

    #[test]
    fn combined_predicates_are_the_intersection() {
        let entries = sample();
        let by_criteria = HeritageFilter {
            criteria: vec![1],
            ..Default::default()
        };
        let by_feature = HeritageFilter {
            features: vec!["島嶼".into()],
            ..Default::default()
        };
        let combined = HeritageFilter {
            criteria: vec![1],
            features: vec!["島嶼".into()],
            ..Default::default()
        };

        for e in &entries {
            assert_eq!(
                combined.matches(e),
                by_criteria.matches(e) && by_feature.matches(e)
            );
        }
    }

    #[test]
    fn toggle_removes_on_second_call() {
        let mut filter = HeritageFilter::default();
        filter.toggle_region("アジア");
        filter.toggle_region("アジア");
        assert!(filter.regions.is_empty());
    }

    #[test]
    fn validate_rejects_values_outside_vocabulary() {
        let vocab = Vocabulary::standard();
        let mut filter = HeritageFilter::default();
        filter.toggle_region("アジア");
        filter.toggle_criterion(10);
        assert!(filter.validate(&vocab).is_ok());

        filter.toggle_region("Atlantis");
        assert_matches!(
            filter.validate(&vocab),
            Err(CoreError::UnknownTag { vocabulary: "region", .. })
        );

        let filter = HeritageFilter {
            criteria: vec![42],
            ..Default::default()
        };
        assert_matches!(
            filter.validate(&vocab),
            Err(CoreError::UnknownCriterion(raw)) if raw == "42"
        );

        let filter = HeritageFilter {
            unesco_tag: Some("無形遺産".into()),
            ..Default::default()
        };
        assert!(filter.validate(&vocab).is_err());
    }

    #[test]
    fn descending_is_exact_reverse_of_ascending() {
        let mut entries = sample();
        // Duplicate title to exercise the id tie-break.
        entries.push(entry(5, "Untagged"));
        let collator = collator();
        let filter = HeritageFilter::default();

        let asc = ids(&filter_and_sort(&entries, &filter, &collator, SortOrder::Ascending));
        let mut desc = ids(&filter_and_sort(
            &entries,
            &filter,
            &collator,
            SortOrder::Ascending.toggled(),
        ));
        desc.reverse();

        assert_eq!(asc, desc);
        assert_eq!(asc.len(), entries.len());
    }

    #[test]
    fn sort_uses_collation_not_bytes() {
        let entries = vec![
            entry(1, "さくら"),
            entry(2, "Banana"),
            entry(3, "apple"),
            entry(4, "あおもり"),
        ];
        let collator = TitleCollator::new("en").unwrap();
        let sorted = filter_and_sort(
            &entries,
            &HeritageFilter::default(),
            &collator,
            SortOrder::Ascending,
        );
        let titles: Vec<&str> = sorted.iter().map(|e| e.title.as_str()).collect();

        let apple = titles.iter().position(|t| *t == "apple").unwrap();
        let banana = titles.iter().position(|t| *t == "Banana").unwrap();
        let aomori = titles.iter().position(|t| *t == "あおもり").unwrap();
        let sakura = titles.iter().position(|t| *t == "さくら").unwrap();
        assert!(apple < banana);
        assert!(aomori < sakura);
    }
}
