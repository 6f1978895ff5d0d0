//! Vehicle descriptions: decomposed customer requests and inventory rows.

use serde::{Deserialize, Serialize};

/// A free-text vehicle request split into year, make and model.
///
/// Decomposition splits on whitespace: the first token is the year, the
/// second the make, and every remaining token joined by a single space is
/// the model. It never fails; missing tokens decompose to empty strings.
///
/// ```
/// use classic_matcher_core::VehicleRequest;
///
/// let v = VehicleRequest::parse("1967  Ford Mustang   Fastback");
/// assert_eq!(v.year, "1967");
/// assert_eq!(v.make, "Ford");
/// assert_eq!(v.model, "Mustang Fastback");
///
/// let empty = VehicleRequest::parse("");
/// assert!(empty.make.is_empty() && empty.model.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRequest {
    pub year: String,
    pub make: String,
    pub model: String,
}

impl VehicleRequest {
    /// Decompose free text into year, make and model.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut tokens = text.split_whitespace();
        let year = tokens.next().unwrap_or_default().to_owned();
        let make = tokens.next().unwrap_or_default().to_owned();
        let model = tokens.collect::<Vec<_>>().join(" ");
        Self { year, make, model }
    }

    /// Whether any of the three parts is missing.
    #[must_use]
    pub const fn is_incomplete(&self) -> bool {
        self.year.is_empty() || self.make.is_empty() || self.model.is_empty()
    }
}

/// One vehicle currently listed in the vendor inventory feed.
///
/// Rebuilt from the feed on every fetch; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub year: String,
    pub make: String,
    pub model: String,
}

impl InventoryItem {
    /// Build an item, trimming each field.
    #[must_use]
    pub fn new(year: &str, make: &str, model: &str) -> Self {
        Self {
            year: year.trim().to_owned(),
            make: make.trim().to_owned(),
            model: model.trim().to_owned(),
        }
    }

    /// Whether this listing satisfies a decomposed request.
    ///
    /// Year must be string-equal ("67" is not "1967"); make and model
    /// compare case-insensitively. Incomplete requests never match.
    #[must_use]
    pub fn satisfies(&self, request: &VehicleRequest) -> bool {
        !request.is_incomplete()
            && self.year == request.year
            && self.make.to_lowercase() == request.make.to_lowercase()
            && self.model.to_lowercase() == request.model.to_lowercase()
    }
}

impl std::fmt::Display for InventoryItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.year, self.make, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_tokens() {
        let v = VehicleRequest::parse("1967 Ford Mustang");
        assert_eq!(
            v,
            VehicleRequest {
                year: "1967".to_string(),
                make: "Ford".to_string(),
                model: "Mustang".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_joins_remaining_tokens_with_single_space() {
        let v = VehicleRequest::parse("  1969 Chevrolet\tCamaro  Z/28 RS ");
        assert_eq!(v.year, "1969");
        assert_eq!(v.make, "Chevrolet");
        assert_eq!(v.model, "Camaro Z/28 RS");
    }

    #[test]
    fn test_parse_short_input_is_total() {
        assert_eq!(VehicleRequest::parse(""), VehicleRequest::default());
        assert_eq!(VehicleRequest::parse("   "), VehicleRequest::default());

        let one = VehicleRequest::parse("1967");
        assert_eq!(one.year, "1967");
        assert!(one.make.is_empty() && one.model.is_empty());

        let two = VehicleRequest::parse("1967 Ford");
        assert_eq!(two.make, "Ford");
        assert!(two.model.is_empty());
        assert!(two.is_incomplete());
    }

    #[test]
    fn test_rejoining_preserves_year_and_make() {
        for text in ["1967 Ford Mustang", "1955  Chevy   Bel Air", "1931 Ford"] {
            let v = VehicleRequest::parse(text);
            let rejoined = format!("{} {} {}", v.year, v.make, v.model);
            let again = VehicleRequest::parse(&rejoined);
            assert_eq!(again.year, v.year);
            assert_eq!(again.make, v.make);
            assert_eq!(again, v);
        }
    }

    #[test]
    fn test_inventory_item_trims_fields() {
        let item = InventoryItem::new(" 1967\n", "  Ford ", "Mustang ");
        assert_eq!(item.to_string(), "1967 Ford Mustang");
    }

    #[test]
    fn test_satisfies_is_case_insensitive_on_make_and_model() {
        let request = VehicleRequest::parse("1967 Ford Mustang");
        assert!(InventoryItem::new("1967", "Ford", "Mustang").satisfies(&request));
        assert!(InventoryItem::new("1967", "ford", "mustang").satisfies(&request));
        assert!(InventoryItem::new("1967", "FORD", "MUSTANG").satisfies(&request));
    }

    #[test]
    fn test_satisfies_requires_exact_year_string() {
        let request = VehicleRequest::parse("1967 Ford Mustang");
        assert!(!InventoryItem::new("67", "Ford", "Mustang").satisfies(&request));
        assert!(!InventoryItem::new("1968", "Ford", "Mustang").satisfies(&request));
    }

    #[test]
    fn test_satisfies_requires_full_model() {
        let request = VehicleRequest::parse("1967 Ford Mustang Fastback");
        assert!(!InventoryItem::new("1967", "Ford", "Mustang").satisfies(&request));
        assert!(InventoryItem::new("1967", "Ford", "mustang fastback").satisfies(&request));
    }

    #[test]
    fn test_incomplete_request_never_matches_blank_listing() {
        let request = VehicleRequest::parse("");
        assert!(!InventoryItem::new("", "", "").satisfies(&request));
    }
}
