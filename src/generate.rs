//! Synthetic listing generation.
//!
//! Listings are generated one per model call; asking for several at once
//! runs into the model's output token limit. Property type and address
//! number are drawn from an injected RNG so runs are reproducible with a
//! seeded generator.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{HomeMatchError, Result};
use crate::llm::LanguageModel;
use crate::models::{Listing, PropertyType};

pub const DEFAULT_PLACE: &str = "Vancouver Canada";

/// Address numbers are drawn from `0..ADDRESS_NUMBER_RANGE`.
pub const ADDRESS_NUMBER_RANGE: u32 = 10_000;

pub const MIN_DESCRIPTION_WORDS: usize = 75;

/// The worked example shown to the model, retargeted to the requested id
/// and property type.
pub fn example_listing(listing_id: u64, property_type: PropertyType) -> serde_json::Value {
    json!({
        "listing_id": listing_id,
        "property_type": property_type,
        "address": "2999 Maple Ave.",
        "neighborhood": "Kitsilano",
        "price": 800000,
        "bedrooms": 2,
        "bathrooms": 2,
        "description": "Welcome to the best kept secret of downtown...",
        "neighborhood_description": "Don't miss out on Knickle & Grant's last remaining build in Samara Heights...",
        "sqft": 1000
    })
}

pub fn build_listing_prompt(
    listing_id: u64,
    property_type: PropertyType,
    address_number: u32,
    place: &str,
) -> String {
    let example = example_listing(listing_id, property_type);
    format!(
        "Can you generate a real estate listing in {place} in JSON format. For example:\n\n\
         {example}\n\n\
         Make sure the listing_id is equal to {listing_id}.\n\n\
         Use {address_number} as the address number with a randomly generated street name.\n\n\
         Make sure the property_type is {property_type} and generate new values for the rest \
         of the fields that are sensible for a {property_type}.\n\n\
         Make sure the description field has at least {MIN_DESCRIPTION_WORDS} words.\n"
    )
}

/// Generate one listing with a random property type and address number.
///
/// The returned listing always carries the requested `listing_id` and the
/// drawn property type, even if the model answered with different values.
pub async fn generate_listing<R: Rng>(
    listing_id: u64,
    model: &dyn LanguageModel,
    rng: &mut R,
    place: &str,
) -> Result<Listing> {
    let property_type = *PropertyType::ALL
        .choose(&mut *rng)
        .unwrap_or(&PropertyType::House);
    let address_number = rng.gen_range(0..ADDRESS_NUMBER_RANGE);

    let prompt = build_listing_prompt(listing_id, property_type, address_number, place);
    tracing::debug!(listing_id, %property_type, address_number, "requesting listing");

    let response = model.invoke(&prompt).await?;
    let mut listing = parse_listing(&response)?;

    if listing.listing_id != listing_id || listing.property_type != property_type {
        tracing::warn!(
            requested_id = listing_id,
            returned_id = listing.listing_id,
            requested_type = %property_type,
            returned_type = %listing.property_type,
            "model diverged from requested listing fields; enforcing requested values"
        );
        listing.listing_id = listing_id;
        listing.property_type = property_type;
    }

    Ok(listing)
}

/// Generate `count` listings with consecutive ids starting at `start_id`.
pub async fn generate_listings<R: Rng>(
    start_id: u64,
    count: usize,
    model: &dyn LanguageModel,
    rng: &mut R,
    place: &str,
) -> Result<Vec<Listing>> {
    let mut listings = Vec::with_capacity(count);
    for listing_id in (start_id..).take(count) {
        listings.push(generate_listing(listing_id, model, &mut *rng, place).await?);
        tracing::info!(listing_id, generated = listings.len(), total = count, "listing generated");
    }
    Ok(listings)
}

/// Parse a model response into a [`Listing`].
///
/// Accepts bare JSON or JSON wrapped in a Markdown code fence.
pub fn parse_listing(response: &str) -> Result<Listing> {
    serde_json::from_str(strip_code_fence(response)).map_err(|e| HomeMatchError::ResponseParse {
        reason: e.to_string(),
        response: response.to_string(),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the language tag line, e.g. ```json
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Write listings as JSON Lines, one listing per line.
pub fn write_listings_jsonl(path: &Path, listings: &[Listing]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for listing in listings {
        serde_json::to_writer(&mut writer, listing)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read listings from a JSON Lines file, skipping blank lines.
pub fn read_listings_jsonl(path: &Path) -> anyhow::Result<Vec<Listing>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut listings = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let listing: Listing = serde_json::from_str(&line).map_err(|e| {
            anyhow::anyhow!("{}:{}: invalid listing: {}", path.display(), index + 1, e)
        })?;
        listings.push(listing);
    }
    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FnModel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    /// Answers with the prompt's own example, the way a compliant model
    /// fills in the template.
    fn echo_example_model() -> FnModel<impl Fn(&str) -> Result<String> + Send + Sync> {
        FnModel::new(|prompt: &str| {
            let start = prompt.find('{').unwrap();
            let end = prompt.find('}').unwrap();
            Ok(prompt[start..=end].to_string())
        })
    }

    #[test]
    fn test_prompt_contains_targets() {
        let prompt = build_listing_prompt(42, PropertyType::Mansion, 1234, DEFAULT_PLACE);
        assert!(prompt.contains("real estate listing in Vancouver Canada"));
        assert!(prompt.contains("\"listing_id\":42"));
        assert!(prompt.contains("\"property_type\":\"mansion\""));
        assert!(prompt.contains("listing_id is equal to 42"));
        assert!(prompt.contains("Use 1234 as the address number"));
        assert!(prompt.contains("sensible for a mansion"));
        assert!(prompt.contains("at least 75 words"));
    }

    #[tokio::test]
    async fn test_generated_listing_matches_requested_fields() {
        let model = echo_example_model();
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let listing = generate_listing(seed + 100, &model, &mut rng, DEFAULT_PLACE)
                .await
                .unwrap();
            assert_eq!(listing.listing_id, seed + 100);

            let mut replay = StdRng::seed_from_u64(seed);
            let expected = *PropertyType::ALL.choose(&mut replay).unwrap();
            assert_eq!(listing.property_type, expected);
        }
    }

    #[tokio::test]
    async fn test_seeded_generation_is_deterministic() {
        let prompts = Mutex::new(Vec::new());
        let model = FnModel::new(|prompt: &str| {
            prompts.lock().unwrap().push(prompt.to_string());
            let start = prompt.find('{').unwrap();
            let end = prompt.find('}').unwrap();
            Ok(prompt[start..=end].to_string())
        });

        for _ in 0..2 {
            let mut rng = StdRng::seed_from_u64(7);
            generate_listing(1, &model, &mut rng, DEFAULT_PLACE)
                .await
                .unwrap();
        }
        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts[0], prompts[1]);
    }

    #[tokio::test]
    async fn test_divergent_fields_are_enforced() {
        let model = FnModel::new(|_: &str| {
            Ok(serde_json::to_string(&example_listing(999, PropertyType::Condo))
                .unwrap()
                .replace("condo", "mansion"))
        });
        let mut rng = StdRng::seed_from_u64(3);
        let listing = generate_listing(5, &model, &mut rng, DEFAULT_PLACE)
            .await
            .unwrap();
        let mut replay = StdRng::seed_from_u64(3);
        assert_eq!(listing.listing_id, 5);
        assert_eq!(
            listing.property_type,
            *PropertyType::ALL.choose(&mut replay).unwrap()
        );
    }

    #[tokio::test]
    async fn test_malformed_response_is_parse_error() {
        let model = FnModel::new(|_: &str| Ok("Sure! Here is your listing.".to_string()));
        let mut rng = StdRng::seed_from_u64(1);
        let err = generate_listing(1, &model, &mut rng, DEFAULT_PLACE)
            .await
            .unwrap_err();
        match err {
            HomeMatchError::ResponseParse { response, .. } => {
                assert_eq!(response, "Sure! Here is your listing.")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let err = parse_listing(r#"{"listing_id": 1, "property_type": "condo"}"#).unwrap_err();
        assert!(matches!(err, HomeMatchError::ResponseParse { .. }));
    }

    #[test]
    fn test_parse_fenced_json() {
        let body = example_listing(3, PropertyType::House).to_string();
        let listing = parse_listing(&format!("```json\n{}\n```", body)).unwrap();
        assert_eq!(listing.listing_id, 3);
        assert_eq!(listing.neighborhood, "Kitsilano");
    }

    #[tokio::test]
    async fn test_generate_listings_uses_consecutive_ids() {
        let model = echo_example_model();
        let mut rng = StdRng::seed_from_u64(11);
        let listings = generate_listings(20, 3, &model, &mut rng, DEFAULT_PLACE)
            .await
            .unwrap();
        let ids: Vec<u64> = listings.iter().map(|l| l.listing_id).collect();
        assert_eq!(ids, vec![20, 21, 22]);
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("listings.jsonl");
        let listings = vec![
            parse_listing(&example_listing(1, PropertyType::Condo).to_string()).unwrap(),
            parse_listing(&example_listing(2, PropertyType::House).to_string()).unwrap(),
        ];
        write_listings_jsonl(&path, &listings).unwrap();
        assert_eq!(read_listings_jsonl(&path).unwrap(), listings);
    }
}
