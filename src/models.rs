//! Core data models used throughout HomeMatch.
//!
//! These types represent the listings, stored records, and retrieval
//! results that flow through the generate → load → query → personalize
//! pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of property a listing describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Townhouse,
    Condo,
    House,
    Mansion,
}

impl PropertyType {
    /// Every variant, in the order the generator draws from.
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Townhouse,
        PropertyType::Condo,
        PropertyType::House,
        PropertyType::Mansion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Townhouse => "townhouse",
            PropertyType::Condo => "condo",
            PropertyType::House => "house",
            PropertyType::Mansion => "mansion",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single real-estate listing as produced by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub listing_id: u64,
    pub property_type: PropertyType,
    pub address: String,
    pub neighborhood: String,
    pub price: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub description: String,
    pub neighborhood_description: String,
    pub sqft: f64,
}

impl Listing {
    /// The free-text document indexed by the collection.
    ///
    /// Both description fields live only here, never in the metadata.
    pub fn document(&self) -> String {
        format!("{}\n{}", self.description, self.neighborhood_description)
    }

    /// The structured fields stored alongside the document.
    pub fn metadata(&self) -> ListingMetadata {
        ListingMetadata {
            property_type: self.property_type,
            address: self.address.clone(),
            neighborhood: self.neighborhood.clone(),
            price: self.price,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            sqft: self.sqft,
        }
    }
}

/// Structured listing fields stored as collection metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingMetadata {
    pub property_type: PropertyType,
    pub address: String,
    pub neighborhood: String,
    pub price: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub sqft: f64,
}

impl ListingMetadata {
    /// Convert into the untyped map a [`Collection`](crate::store::Collection) stores.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// A record as held by a collection: id, document text, and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub document: String,
    pub metadata: Map<String, Value>,
}

/// One retrieval hit, reassembled into a flat listing-like record.
///
/// Metadata fields are spread at the top level when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingMatch {
    pub listing_id: String,
    pub description: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl ListingMatch {
    /// Parse the spread-in metadata back into typed listing fields.
    pub fn listing_metadata(&self) -> Option<ListingMetadata> {
        serde_json::from_value(Value::Object(self.metadata.clone())).ok()
    }
}

/// Questions asked of a user and the answers they gave, in the same order.
///
/// `answers[0]` is the user's introduction (usually their name); the
/// remaining answers each drive one retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Questionnaire {
    pub questions: Vec<String>,
    pub answers: Vec<String>,
}

impl Questionnaire {
    /// Answers that drive retrieval: everything after the introduction.
    pub fn search_answers(&self) -> &[String] {
        search_answers(&self.answers)
    }
}

/// Answers after the introduction; empty if there is at most one answer.
pub fn search_answers(answers: &[String]) -> &[String] {
    answers.get(1..).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Listing {
        Listing {
            listing_id: 7,
            property_type: PropertyType::Condo,
            address: "12 Cedar St.".to_string(),
            neighborhood: "Kitsilano".to_string(),
            price: 650000.0,
            bedrooms: 2,
            bathrooms: 1,
            description: "Bright corner unit.".to_string(),
            neighborhood_description: "Steps from the beach.".to_string(),
            sqft: 850.0,
        }
    }

    #[test]
    fn test_document_joins_descriptions_with_newline() {
        assert_eq!(sample().document(), "Bright corner unit.\nSteps from the beach.");
    }

    #[test]
    fn test_metadata_map_has_exactly_seven_fields() {
        let map = sample().metadata().to_map();
        let mut keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
        keys.sort();
        let mut expected = vec![
            "property_type",
            "address",
            "neighborhood",
            "price",
            "bedrooms",
            "bathrooms",
            "sqft",
        ];
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(map["property_type"], "condo");
    }

    #[test]
    fn test_property_type_serializes_lowercase() {
        let json = serde_json::to_string(&PropertyType::Mansion).unwrap();
        assert_eq!(json, "\"mansion\"");
        let parsed: PropertyType = serde_json::from_str("\"townhouse\"").unwrap();
        assert_eq!(parsed, PropertyType::Townhouse);
    }

    #[test]
    fn test_listing_match_flattens_metadata() {
        let m = ListingMatch {
            listing_id: "7".to_string(),
            description: "doc".to_string(),
            metadata: sample().metadata().to_map(),
        };
        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(value["listing_id"], "7");
        assert_eq!(value["neighborhood"], "Kitsilano");
        assert!(value.get("metadata").is_none());
        assert_eq!(m.listing_metadata(), Some(sample().metadata()));
    }

    #[test]
    fn test_search_answers_skip_introduction() {
        let q = Questionnaire {
            questions: vec![],
            answers: vec!["I'm Ana".to_string(), "a".to_string()],
        };
        assert_eq!(q.search_answers(), &["a".to_string()]);
        assert!(Questionnaire::default().search_answers().is_empty());
        assert!(search_answers(&["only intro".to_string()]).is_empty());
    }
}
