use std::ops::Range;
use std::sync::Arc;

use failure::format_err;
use log::debug;
use regex::Regex;

use super::EntityExtractor;
use crate::errors::*;
use crate::ontology::{Entities, PaymentMode};
use crate::resources::gazetteer::Gazetteer;
use crate::resources::{SharedResources, LOCATIONS_GAZETTEER};
use crate::utils::{deduplicate_overlapping_items, ranges_overlap, title_case, tokenize_light};

/// Longest location phrase, in tokens, looked up in the gazetteer.
const MAX_LOCATION_NGRAM: usize = 3;

/// Time keywords, checked in order before the clock patterns.
const TIME_KEYWORDS: &[(&str, &str)] = &[
    ("morning", "morning"),
    ("afternoon", "afternoon"),
    ("evening", "evening"),
    ("night", "night"),
    ("kal", "tomorrow"),
    ("aaj", "today"),
    ("parso", "day_after_tomorrow"),
];

const FRAGILE_KEYWORDS: &[&str] = &["fragile", "breakable", "handle carefully", "delicate"];

/// Payment keywords, checked in order: COD markers take precedence.
const PAYMENT_KEYWORDS: &[(&str, PaymentMode)] = &[
    ("cod", PaymentMode::Cod),
    ("cash on delivery", PaymentMode::Cod),
    ("cash", PaymentMode::Cod),
    ("prepaid", PaymentMode::Prepaid),
    ("online", PaymentMode::Prepaid),
    ("upi", PaymentMode::Prepaid),
    ("card", PaymentMode::Prepaid),
];

#[derive(Debug, Clone, PartialEq)]
struct LocationMatch {
    token_range: Range<usize>,
    value: String,
}

/// Rule based extraction of the logistics entities: locations from the
/// gazetteer, the rest from regexes and keyword tables.
pub struct RuleBasedEntityExtractor {
    location_gazetteer: Arc<dyn Gazetteer>,
    weight_regex: Regex,
    packages_regex: Regex,
    clock_regexes: Vec<Regex>,
    phone_regexes: Vec<Regex>,
}

impl RuleBasedEntityExtractor {
    pub fn new(shared_resources: Arc<SharedResources>) -> Result<Self> {
        let location_gazetteer = shared_resources
            .gazetteers
            .get(LOCATIONS_GAZETTEER)
            .cloned()
            .ok_or_else(|| {
                format_err!(
                    "Cannot find gazetteer '{}' in shared resources",
                    LOCATIONS_GAZETTEER
                )
            })?;
        let weight_regex = Regex::new(r"(\d+\.?\d*)\s*(?:kg|kgs|kilogram|kilos)")?;
        let packages_regex = Regex::new(r"(\d+)\s*(?:box|package|parcel|item)")?;
        let clock_regexes = vec![
            Regex::new(r"(\d{1,2})\s*(?:am|pm)")?,
            Regex::new(r"(\d{1,2}):(\d{2})\s*(?:am|pm)?")?,
            Regex::new(r"(\d{1,2})\s*baje")?,
        ];
        let phone_regexes = vec![
            Regex::new(r"\b[6-9]\d{9}\b")?,
            Regex::new(r"\+91[\s-]?[6-9]\d{9}\b")?,
        ];
        Ok(Self {
            location_gazetteer,
            weight_regex,
            packages_regex,
            clock_regexes,
            phone_regexes,
        })
    }

    /// Locations found in the query, ordered by position; overlapping matches
    /// are resolved in favor of the longest phrase ("navi mumbai" wins over
    /// "mumbai").
    fn find_locations(&self, tokens: &[String]) -> Vec<String> {
        let mut matches: Vec<LocationMatch> = Vec::new();
        for ngram_size in 1..=MAX_LOCATION_NGRAM.min(tokens.len()) {
            for start in 0..=(tokens.len() - ngram_size) {
                let phrase = tokens[start..start + ngram_size].join(" ");
                if self.location_gazetteer.contains(&phrase) {
                    matches.push(LocationMatch {
                        token_range: start..start + ngram_size,
                        value: phrase,
                    });
                }
            }
        }
        let overlap = |lhs: &LocationMatch, rhs: &LocationMatch| {
            ranges_overlap(&lhs.token_range, &rhs.token_range)
        };
        let sort_key = |location_match: &LocationMatch| {
            (
                -(location_match.token_range.clone().count() as i32),
                location_match.token_range.start,
            )
        };
        let mut deduped = deduplicate_overlapping_items(matches, overlap, sort_key);
        deduped.sort_by_key(|location_match| location_match.token_range.start);

        let mut locations: Vec<String> = Vec::with_capacity(deduped.len());
        for location_match in deduped {
            let location = title_case(&location_match.value);
            if !locations.contains(&location) {
                locations.push(location);
            }
        }
        locations
    }

    fn extract_locations(&self, tokens: &[String]) -> (Option<String>, Option<String>) {
        let mut locations = self.find_locations(tokens);
        let has_token = |token: &str| tokens.iter().any(|t| t == token);
        match locations.len() {
            0 => (None, None),
            1 => {
                let location = locations.pop();
                if has_token("pickup") || has_token("se") || has_token("from") {
                    (location, None)
                } else if has_token("drop") || has_token("delivery") || has_token("to") {
                    (None, location)
                } else {
                    (None, None)
                }
            }
            _ => {
                let drop_location = Some(locations.swap_remove(1));
                let pickup_location = Some(locations.swap_remove(0));
                (pickup_location, drop_location)
            }
        }
    }

    fn extract_weight(&self, text: &str) -> Option<f64> {
        self.weight_regex
            .captures(text)
            .and_then(|captures| captures.get(1))
            .and_then(|group| group.as_str().parse::<f64>().ok())
    }

    fn extract_packages(&self, text: &str) -> Option<u32> {
        self.packages_regex
            .captures(text)
            .and_then(|captures| captures.get(1))
            .and_then(|group| group.as_str().parse::<u32>().ok())
    }

    fn extract_time(&self, text: &str, tokens: &[String]) -> Option<String> {
        for (keyword, value) in TIME_KEYWORDS {
            if tokens.iter().any(|token| token == keyword) {
                return Some(value.to_string());
            }
        }
        self.clock_regexes
            .iter()
            .find_map(|regex| regex.find(text))
            .map(|found| found.as_str().trim_end().to_string())
    }

    fn extract_fragile(&self, text: &str) -> bool {
        FRAGILE_KEYWORDS.iter().any(|keyword| text.contains(keyword))
    }

    fn extract_payment_mode(&self, text: &str, tokens: &[String]) -> Option<PaymentMode> {
        for (keyword, mode) in PAYMENT_KEYWORDS {
            let found = if keyword.contains(' ') {
                text.contains(keyword)
            } else {
                tokens.iter().any(|token| token == keyword)
            };
            if found {
                return Some(*mode);
            }
        }
        None
    }

    fn extract_phone_number(&self, text: &str) -> Option<String> {
        self.phone_regexes
            .iter()
            .find_map(|regex| regex.find(text))
            .map(|found| found.as_str().to_string())
    }
}

impl EntityExtractor for RuleBasedEntityExtractor {
    fn extract(&self, query: &str) -> Result<Entities> {
        debug!("Extracting entities...");
        let lowercased = query.to_lowercase();
        let tokens = tokenize_light(query);
        let (pickup_location, drop_location) = self.extract_locations(&tokens);
        let entities = Entities {
            pickup_location,
            drop_location,
            weight_kg: self.extract_weight(&lowercased),
            packages: self.extract_packages(&lowercased),
            pickup_time: self.extract_time(&lowercased, &tokens),
            fragile: self.extract_fragile(&lowercased),
            payment_mode: self.extract_payment_mode(&lowercased, &tokens),
            phone_number: self.extract_phone_number(query),
        };
        debug!("Entities extracted: {:?}", entities);
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::SharedResourcesBuilder;

    fn sample_extractor() -> RuleBasedEntityExtractor {
        let resources = SharedResourcesBuilder::default()
            .locations_gazetteer(vec![
                "mumbai",
                "navi mumbai",
                "pune",
                "delhi",
                "bangalore",
                "andheri",
                "powai",
                "gurgaon",
                "noida",
                "ghaziabad",
            ])
            .build();
        RuleBasedEntityExtractor::new(Arc::new(resources)).unwrap()
    }

    #[test]
    fn test_extract_pickup_and_drop_locations() {
        // Given
        let extractor = sample_extractor();

        // When
        let entities = extractor
            .extract("Bhai pickup karna hai Andheri se Powai, 2 boxes hai")
            .unwrap();

        // Then
        assert_eq!(Some("Andheri".to_string()), entities.pickup_location);
        assert_eq!(Some("Powai".to_string()), entities.drop_location);
        assert_eq!(Some(2), entities.packages);
    }

    #[test]
    fn test_extract_weight_and_fragile() {
        // Given
        let extractor = sample_extractor();

        // When
        let entities = extractor
            .extract("Rate batao Mumbai to Pune 10kg fragile package")
            .unwrap();

        // Then
        assert_eq!(Some("Mumbai".to_string()), entities.pickup_location);
        assert_eq!(Some("Pune".to_string()), entities.drop_location);
        assert_eq!(Some(10.0), entities.weight_kg);
        assert!(entities.fragile);
        assert_eq!(None, entities.packages);
    }

    #[test]
    fn test_extract_time_keyword_and_phone_number() {
        // Given
        let extractor = sample_extractor();

        // When
        let entities = extractor
            .extract("Kal morning pickup possible hai kya 9876543210")
            .unwrap();

        // Then
        assert_eq!(Some("morning".to_string()), entities.pickup_time);
        assert_eq!(Some("9876543210".to_string()), entities.phone_number);
        assert_eq!(None, entities.pickup_location);
    }

    #[test]
    fn test_extract_payment_mode_and_packages() {
        // Given
        let extractor = sample_extractor();

        // When
        let entities = extractor
            .extract("COD me 3 parcels bhejne hai Delhi se Bangalore")
            .unwrap();

        // Then
        assert_eq!(Some(PaymentMode::Cod), entities.payment_mode);
        assert_eq!(Some(3), entities.packages);
        assert_eq!(Some("Delhi".to_string()), entities.pickup_location);
        assert_eq!(Some("Bangalore".to_string()), entities.drop_location);
    }

    #[test]
    fn test_extract_single_location_with_pickup_context() {
        // Given
        let extractor = sample_extractor();

        // When
        let entities = extractor
            .extract("Evening 6 baje pickup kar lo Gurgaon se")
            .unwrap();

        // Then
        assert_eq!(Some("Gurgaon".to_string()), entities.pickup_location);
        assert_eq!(None, entities.drop_location);
        assert_eq!(Some("evening".to_string()), entities.pickup_time);
    }

    #[test]
    fn test_clock_pattern_used_when_no_time_keyword() {
        // Given
        let extractor = sample_extractor();

        // When
        let entities = extractor.extract("Pickup at 6 pm from Andheri").unwrap();

        // Then
        assert_eq!(Some("6 pm".to_string()), entities.pickup_time);
    }

    #[test]
    fn test_longest_location_phrase_wins() {
        // Given
        let extractor = sample_extractor();

        // When
        let entities = extractor
            .extract("Pickup from Navi Mumbai to Pune tomorrow")
            .unwrap();

        // Then
        assert_eq!(Some("Navi Mumbai".to_string()), entities.pickup_location);
        assert_eq!(Some("Pune".to_string()), entities.drop_location);
    }

    #[test]
    fn test_single_location_without_context_is_unassigned() {
        // Given
        let extractor = sample_extractor();

        // When
        let entities = extractor.extract("Mumbai serviceable hai kya").unwrap();

        // Then
        assert_eq!(None, entities.pickup_location);
        assert_eq!(None, entities.drop_location);
    }

    #[test]
    fn test_prepaid_payment_and_plus_prefixed_phone() {
        // Given
        let extractor = sample_extractor();

        // When
        let entities = extractor
            .extract("UPI se pay karunga, number +91 9876543210")
            .unwrap();

        // Then
        assert_eq!(Some(PaymentMode::Prepaid), entities.payment_mode);
        assert_eq!(Some("9876543210".to_string()), entities.phone_number);
    }

    #[test]
    fn test_extractor_requires_locations_gazetteer() {
        // Given
        let resources = SharedResourcesBuilder::default().build();

        // When
        let extractor = RuleBasedEntityExtractor::new(Arc::new(resources));

        // Then
        assert!(extractor.is_err());
    }
}
