use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// A garment image saved in the user's wardrobe.
///
/// The `id` is stable across sessions and is what the selection set stores.
/// The image itself lives behind `image_url`, which is either a local
/// path/`file://` URI or a remote URL returned by blob storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarmentRef {
    pub id: String,
    pub image_url: String,
    /// Classification tag. Older wardrobe entries may be uncategorised.
    pub category: Option<GarmentCategory>,
    pub created_at: DateTime<Utc>,
}

/// Fixed garment vocabulary used for wardrobe filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GarmentCategory {
    Top,
    Pants,
    Skirt,
    Dress,
    Acc,
}

impl GarmentCategory {
    /// Every category in display order.
    pub const ALL: [GarmentCategory; 5] = [
        GarmentCategory::Top,
        GarmentCategory::Pants,
        GarmentCategory::Skirt,
        GarmentCategory::Dress,
        GarmentCategory::Acc,
    ];
}

impl fmt::Display for GarmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GarmentCategory::Top => write!(f, "TOP"),
            GarmentCategory::Pants => write!(f, "PANTS"),
            GarmentCategory::Skirt => write!(f, "SKIRT"),
            GarmentCategory::Dress => write!(f, "DRESS"),
            GarmentCategory::Acc => write!(f, "ACC"),
        }
    }
}

impl FromStr for GarmentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TOP" => Ok(GarmentCategory::Top),
            "PANTS" => Ok(GarmentCategory::Pants),
            "SKIRT" => Ok(GarmentCategory::Skirt),
            "DRESS" => Ok(GarmentCategory::Dress),
            "ACC" => Ok(GarmentCategory::Acc),
            other => Err(format!("invalid garment category: '{other}'")),
        }
    }
}

/// Wardrobe listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(GarmentCategory),
}

impl CategoryFilter {
    /// Whether a garment passes this filter.
    pub fn matches(&self, garment: &GarmentRef) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => garment.category == Some(*category),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse::<GarmentCategory>().map(CategoryFilter::Only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn garment(category: Option<GarmentCategory>) -> GarmentRef {
        GarmentRef {
            id: "g1".to_string(),
            image_url: "https://cdn.example/g1.jpg".to_string(),
            category,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_category_display_fromstr_roundtrip() {
        for category in GarmentCategory::ALL {
            let parsed: GarmentCategory = category.to_string().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn test_category_fromstr_case_insensitive() {
        assert_eq!("skirt".parse::<GarmentCategory>().unwrap(), GarmentCategory::Skirt);
        assert!("hat".parse::<GarmentCategory>().is_err());
    }

    #[test]
    fn test_category_serializes_uppercase() {
        let json = serde_json::to_string(&GarmentCategory::Acc).unwrap();
        assert_eq!(json, "\"ACC\"");
    }

    #[test]
    fn test_category_filter_matches() {
        let top = garment(Some(GarmentCategory::Top));
        let untagged = garment(None);

        assert!(CategoryFilter::All.matches(&top));
        assert!(CategoryFilter::All.matches(&untagged));
        assert!(CategoryFilter::Only(GarmentCategory::Top).matches(&top));
        assert!(!CategoryFilter::Only(GarmentCategory::Top).matches(&untagged));
        assert!(!CategoryFilter::Only(GarmentCategory::Dress).matches(&top));
    }

    #[test]
    fn test_category_filter_fromstr() {
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "pants".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(GarmentCategory::Pants)
        );
    }
}
