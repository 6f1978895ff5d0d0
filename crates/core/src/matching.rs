//! Filtering, sorting and inventory matching over customer requests.
//!
//! Everything here is pure: callers hand in the current snapshot of records
//! (and inventory) and get derived views back. No I/O, no caching.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{CustomerRequest, InventoryItem, VehicleRequest};

/// Field used to order the filtered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Keep the store order (newest first).
    #[default]
    #[serde(rename = "")]
    None,
    Make,
    Model,
}

impl SortKey {
    /// Query-string value for this key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Make => "make",
            Self::Model => "model",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "make" => Ok(Self::Make),
            "model" => Ok(Self::Model),
            other => Err(format!("unknown sort key '{other}' (expected make or model)")),
        }
    }
}

/// Active filter controls.
///
/// Empty strings mean "not selected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub sort: SortKey,
}

impl FilterCriteria {
    /// Reset make, model and sort, keeping the search text.
    #[must_use]
    pub fn cleared(&self) -> Self {
        Self {
            search: self.search.clone(),
            ..Self::default()
        }
    }

    /// Drop a model selection that the make selection cannot produce.
    ///
    /// A model is only meaningful once a make is chosen, and only if some
    /// record of that make carries it.
    #[must_use]
    pub fn normalized(mut self, facets: &Facets) -> Self {
        if self.make.is_empty() || !facets.models.contains(&self.model) {
            self.model.clear();
        }
        self
    }
}

/// A record paired with its decomposed vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomposedRequest<'a> {
    pub request: &'a CustomerRequest,
    pub vehicle: VehicleRequest,
}

/// Distinct values offered by the make and model filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    /// Every make, in order of first appearance.
    pub makes: Vec<String>,
    /// Models of the selected make (or of every record if none is selected).
    pub models: Vec<String>,
}

/// Decompose every record once.
#[must_use]
pub fn decompose_all(records: &[CustomerRequest]) -> Vec<DecomposedRequest<'_>> {
    records
        .iter()
        .map(|request| DecomposedRequest {
            request,
            vehicle: request.vehicle(),
        })
        .collect()
}

/// Derive make and model facets for the given make selection.
#[must_use]
pub fn facets(records: &[DecomposedRequest<'_>], selected_make: &str) -> Facets {
    let makes = distinct(records.iter().map(|r| r.vehicle.make.as_str()));
    let models = distinct(
        records
            .iter()
            .filter(|r| selected_make.is_empty() || r.vehicle.make == selected_make)
            .map(|r| r.vehicle.model.as_str()),
    );
    Facets { makes, models }
}

/// Whether a record passes the active filter.
///
/// The search text is used as typed, surrounding whitespace included.
#[must_use]
pub fn passes(record: &DecomposedRequest<'_>, criteria: &FilterCriteria) -> bool {
    let search = criteria.search.to_lowercase();
    record.request.name.to_lowercase().contains(&search)
        && (criteria.make.is_empty() || record.vehicle.make == criteria.make)
        && (criteria.model.is_empty() || record.vehicle.model == criteria.model)
}

/// Filter, then (if a sort key is active) stably sort.
#[must_use]
pub fn filter_and_sort<'a>(
    records: &[DecomposedRequest<'a>],
    criteria: &FilterCriteria,
) -> Vec<DecomposedRequest<'a>> {
    let mut view: Vec<_> = records
        .iter()
        .filter(|r| passes(r, criteria))
        .cloned()
        .collect();

    match criteria.sort {
        SortKey::None => {}
        SortKey::Make => view.sort_by(|a, b| compare_ci(&a.vehicle.make, &b.vehicle.make)),
        SortKey::Model => view.sort_by(|a, b| compare_ci(&a.vehicle.model, &b.vehicle.model)),
    }

    view
}

/// Records whose requested vehicle is currently in inventory.
///
/// Order follows the input records.
#[must_use]
pub fn matched_requests<'a>(
    records: &[DecomposedRequest<'a>],
    inventory: &[InventoryItem],
) -> Vec<&'a CustomerRequest> {
    records
        .iter()
        .filter(|r| inventory.iter().any(|item| item.satisfies(&r.vehicle)))
        .map(|r| r.request)
        .collect()
}

/// Case-insensitive lexicographic comparison.
#[must_use]
pub fn compare_ci(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::types::RequestId;

    fn record(id: u32, name: &str, vehicle: &str) -> CustomerRequest {
        CustomerRequest {
            id: RequestId::new(id.to_string()),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: String::new(),
            vehicle_request: vehicle.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, id).single().unwrap_or_default(),
        }
    }

    fn sample() -> Vec<CustomerRequest> {
        vec![
            record(1, "Alice", "1967 Ford Mustang"),
            record(2, "Bob", "1969 chevrolet Camaro"),
            record(3, "alicia", "1965 Ford Thunderbird"),
            record(4, "Dan", "1967 Ford Mustang Fastback"),
            record(5, "Eve", ""),
            record(6, "Frank", "1970 Chevrolet Chevelle"),
        ]
    }

    fn names(view: &[DecomposedRequest<'_>]) -> Vec<String> {
        view.iter().map(|r| r.request.name.clone()).collect()
    }

    #[test]
    fn test_facets_preserve_first_appearance_and_skip_empty() {
        let records = sample();
        let decomposed = decompose_all(&records);
        let f = facets(&decomposed, "");
        assert_eq!(f.makes, vec!["Ford", "chevrolet", "Chevrolet"]);
        assert_eq!(
            f.models,
            vec!["Mustang", "Camaro", "Thunderbird", "Mustang Fastback", "Chevelle"]
        );
    }

    #[test]
    fn test_model_facets_restricted_to_selected_make() {
        let records = sample();
        let decomposed = decompose_all(&records);
        let f = facets(&decomposed, "Ford");
        assert_eq!(f.models, vec!["Mustang", "Thunderbird", "Mustang Fastback"]);
    }

    #[test]
    fn test_filter_by_name_is_case_insensitive_substring() {
        let records = sample();
        let decomposed = decompose_all(&records);
        let criteria = FilterCriteria {
            search: "ALI".to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(names(&filter_and_sort(&decomposed, &criteria)), vec!["Alice", "alicia"]);
    }

    #[test]
    fn test_filter_by_make_and_model_is_exact() {
        let records = sample();
        let decomposed = decompose_all(&records);
        let criteria = FilterCriteria {
            make: "Ford".to_string(),
            model: "Mustang".to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(names(&filter_and_sort(&decomposed, &criteria)), vec!["Alice"]);

        let lower = FilterCriteria {
            make: "ford".to_string(),
            ..FilterCriteria::default()
        };
        assert!(filter_and_sort(&decomposed, &lower).is_empty());
    }

    #[test]
    fn test_filter_result_is_subset_satisfying_all_predicates() {
        let records = sample();
        let decomposed = decompose_all(&records);
        let criteria = FilterCriteria {
            search: "a".to_string(),
            make: "Ford".to_string(),
            ..FilterCriteria::default()
        };
        let view = filter_and_sort(&decomposed, &criteria);
        assert!(!view.is_empty());
        for r in &view {
            assert!(records.contains(r.request));
            assert!(r.request.name.to_lowercase().contains('a'));
            assert_eq!(r.vehicle.make, "Ford");
        }
    }

    #[test]
    fn test_no_sort_keeps_store_order() {
        let records = sample();
        let decomposed = decompose_all(&records);
        let view = filter_and_sort(&decomposed, &FilterCriteria::default());
        assert_eq!(
            names(&view),
            vec!["Alice", "Bob", "alicia", "Dan", "Eve", "Frank"]
        );
    }

    #[test]
    fn test_sort_by_make_is_case_insensitive_and_stable() {
        let records = sample();
        let decomposed = decompose_all(&records);
        let criteria = FilterCriteria {
            sort: SortKey::Make,
            ..FilterCriteria::default()
        };
        let view = filter_and_sort(&decomposed, &criteria);
        // Eve has no make and sorts first; chevrolet/Chevrolet tie and keep input order.
        assert_eq!(
            names(&view),
            vec!["Eve", "Bob", "Frank", "Alice", "alicia", "Dan"]
        );
        for pair in view.windows(2) {
            assert_ne!(
                compare_ci(&pair[0].vehicle.make, &pair[1].vehicle.make),
                Ordering::Greater
            );
        }
    }

    #[test]
    fn test_sort_by_model() {
        let records = sample();
        let decomposed = decompose_all(&records);
        let criteria = FilterCriteria {
            make: "Ford".to_string(),
            sort: SortKey::Model,
            ..FilterCriteria::default()
        };
        let view = filter_and_sort(&decomposed, &criteria);
        assert_eq!(names(&view), vec!["Alice", "Dan", "alicia"]);
    }

    #[test]
    fn test_matched_requests_examples() {
        let records = sample();
        let decomposed = decompose_all(&records);
        let inventory = vec![
            InventoryItem::new("1967", "ford", "mustang"),
            InventoryItem::new("69", "Chevrolet", "Camaro"),
            InventoryItem::new("1970", "CHEVROLET", "Chevelle"),
        ];
        let matched: Vec<_> = matched_requests(&decomposed, &inventory)
            .into_iter()
            .map(|r| r.name.as_str())
            .collect();
        // Dan wants a Fastback; Bob's year is formatted differently in inventory.
        assert_eq!(matched, vec!["Alice", "Frank"]);
    }

    #[test]
    fn test_nothing_matches_empty_inventory() {
        let records = sample();
        let decomposed = decompose_all(&records);
        assert!(matched_requests(&decomposed, &[]).is_empty());
    }

    #[test]
    fn test_search_text_is_not_trimmed() {
        let records = sample();
        let decomposed = decompose_all(&records);
        let blank = FilterCriteria {
            search: "  ".to_string(),
            ..FilterCriteria::default()
        };
        assert!(filter_and_sort(&decomposed, &blank).is_empty());

        let padded = FilterCriteria {
            search: " ali".to_string(),
            ..FilterCriteria::default()
        };
        assert!(filter_and_sort(&decomposed, &padded).is_empty());
    }

    #[test]
    fn test_normalized_drops_orphan_model() {
        let records = sample();
        let decomposed = decompose_all(&records);

        let no_make = FilterCriteria {
            model: "Mustang".to_string(),
            ..FilterCriteria::default()
        };
        assert!(no_make.normalized(&facets(&decomposed, "")).model.is_empty());

        let wrong_make = FilterCriteria {
            make: "Chevrolet".to_string(),
            model: "Mustang".to_string(),
            ..FilterCriteria::default()
        };
        assert!(wrong_make.normalized(&facets(&decomposed, "Chevrolet")).model.is_empty());

        let ok = FilterCriteria {
            make: "Ford".to_string(),
            model: "Mustang".to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(ok.clone().normalized(&facets(&decomposed, "Ford")), ok);
    }

    #[test]
    fn test_cleared_keeps_search_only() {
        let criteria = FilterCriteria {
            search: "ali".to_string(),
            make: "Ford".to_string(),
            model: "Mustang".to_string(),
            sort: SortKey::Model,
        };
        let cleared = criteria.cleared();
        assert_eq!(cleared.search, "ali");
        assert!(cleared.make.is_empty() && cleared.model.is_empty());
        assert_eq!(cleared.sort, SortKey::None);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("make".parse::<SortKey>(), Ok(SortKey::Make));
        assert_eq!(" Model ".parse::<SortKey>(), Ok(SortKey::Model));
        assert_eq!("".parse::<SortKey>(), Ok(SortKey::None));
        assert!("year".parse::<SortKey>().is_err());
    }
}
