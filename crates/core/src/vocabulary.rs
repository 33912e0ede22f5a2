//! Controlled vocabularies shared by the filter and edit paths.
//!
//! A single [`Vocabulary`] value is built once (usually via
//! [`Vocabulary::standard`]) and handed to every controller that filters or
//! edits heritage entries, so the two sides can never drift apart. The tag
//! strings are the exact values the backend stores.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// UNESCO inscription criteria are numbered 1 through 10.
pub const MIN_CRITERION: u32 = 1;
pub const MAX_CRITERION: u32 = 10;

/// Which tag list a lookup refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Unesco,
    Region,
    Feature,
}

impl TagKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Unesco => "unesco",
            Self::Region => "region",
            Self::Feature => "feature",
        }
    }
}

/// The fixed tag lists a heritage entry may draw from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub unesco_tags: Vec<String>,
    pub region_tags: Vec<String>,
    pub feature_tags: Vec<String>,
}

impl Vocabulary {
    /// The vocabulary the backend's extraction prompt produces.
    pub fn standard() -> Self {
        Self {
            unesco_tags: to_strings(&["文化遺産", "自然遺産", "複合遺産"]),
            region_tags: to_strings(&[
                "アジア",
                "ヨーロッパ",
                "アフリカ",
                "北アメリカ",
                "南アメリカ",
                "オセアニア",
            ]),
            feature_tags: to_strings(&[
                // --- Built heritage ---
                "宗教建築",
                "キリスト教建築",
                "イスラム建築",
                "仏教建築",
                "ヒンドゥー教建築",
                "神社建築",
                "その他宗教建築",
                "宮殿・邸宅",
                "城郭・要塞",
                "遺跡・考古学的遺跡",
                "歴史的都市・集落",
                "文化的景観",
                "産業遺産",
                "交通遺産",
                "庭園・公園",
                "古墳・墓所",
                "記念建造物",
                "岩絵・壁画",
                "負の遺産",
                // --- Natural heritage ---
                "山岳・山脈",
                "火山・火山地形",
                "森林",
                "砂漠",
                "河川・湖沼",
                "湿地・湿原",
                "氷河・氷床・フィヨルド",
                "海岸・崖",
                "島嶼",
                "海洋生態系",
                "サンゴ礁",
                "カルスト地形・洞窟",
                "滝",
                "特殊な地形・地質",
                "化石産地",
                "国立公園・自然保護区",
            ]),
        }
    }

    pub fn tags(&self, kind: TagKind) -> &[String] {
        match kind {
            TagKind::Unesco => &self.unesco_tags,
            TagKind::Region => &self.region_tags,
            TagKind::Feature => &self.feature_tags,
        }
    }

    pub fn contains(&self, kind: TagKind, tag: &str) -> bool {
        self.tags(kind).iter().any(|t| t == tag)
    }

    /// Return `Ok` if `tag` belongs to the `kind` list.
    pub fn ensure(&self, kind: TagKind, tag: &str) -> Result<(), CoreError> {
        if self.contains(kind, tag) {
            Ok(())
        } else {
            Err(CoreError::UnknownTag {
                vocabulary: kind.label(),
                tag: tag.to_string(),
            })
        }
    }

    /// All valid criteria, in order.
    pub fn criteria(&self) -> impl Iterator<Item = u32> {
        MIN_CRITERION..=MAX_CRITERION
    }

    pub fn is_criterion(&self, value: u32) -> bool {
        (MIN_CRITERION..=MAX_CRITERION).contains(&value)
    }

    pub fn ensure_criterion(&self, value: u32) -> Result<(), CoreError> {
        if self.is_criterion(value) {
            Ok(())
        } else {
            Err(CoreError::UnknownCriterion(value.to_string()))
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

fn to_strings(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

/// Render a criterion the way UNESCO cites it: `(i)` through `(x)`.
///
/// Values outside the criteria range fall back to plain digits.
pub fn roman_numeral(criterion: u32) -> String {
    const NUMERALS: [&str; 10] = ["i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x"];
    match criterion {
        MIN_CRITERION..=MAX_CRITERION => format!("({})", NUMERALS[(criterion - 1) as usize]),
        other => other.to_string(),
    }
}
