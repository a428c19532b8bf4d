//! Ordered keyword rules behind the local answer stub.
//!
//! The answer is a pure function of the lowercased query, whether an image
//! is attached, and whether a location is known. First matching rule wins.

use kisan_core::query::FetchResponse;

/// Prepended to every answer when the session has a location.
pub const LOCATION_DISCLAIMER: &str =
    "Based on your approximate location (advice may vary by district): ";

struct KeywordRule {
    keywords: &'static [&'static str],
    answer: &'static str,
    confidence: f32,
    source: &'static str,
}

const RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["pesticide", "leaf spot"],
        answer: "Leaf spot is usually fungal. Remove and destroy badly affected leaves, \
                 avoid overhead watering, and spray a copper-based fungicide or mancozeb \
                 (2-2.5 g per litre of water) in the evening. Repeat after 10-15 days if \
                 new spots appear, and wear gloves and a mask while spraying.",
        confidence: 0.82,
        source: "Krishi Vigyan Kendra crop protection guide",
    },
    KeywordRule {
        keywords: &["price", "market"],
        answer: "Market prices change daily. Check today's rates at your nearest mandi or on \
                 the eNAM portal before selling, and compare at least two nearby markets. \
                 If prices are low, consider short-term storage if your produce keeps well.",
        confidence: 0.74,
        source: "eNAM market price bulletin",
    },
    KeywordRule {
        keywords: &["weather", "rain"],
        answer: "Rain is possible in the coming days. Avoid spraying pesticides or \
                 fertiliser if rain is expected within 24 hours, since it will wash off. \
                 Check the local weather forecast in the morning and plan spraying for a \
                 dry, calm day.",
        confidence: 0.7,
        source: "District agro-meteorological advisory",
    },
];

const IMAGE_ANSWER: &str = "Thanks for the photo. I can't analyse images reliably yet. \
     Please describe what you see (spots, yellowing, insects) so I can help, \
     or show it to your local agriculture officer.";

const EMPTY_ANSWER: &str =
    "Please type your question or attach a photo of the crop so I can help.";

const FALLBACK_ANSWER: &str = "I'm not sure about that yet. Please ask about pests and \
     leaf spot, market prices, or the weather, or contact your local Krishi Vigyan Kendra.";

/// Computes the local answer for a query.
pub fn answer_for(query: &str, has_image: bool, has_location: bool) -> FetchResponse {
    let mut response = route(&query.trim().to_lowercase(), has_image);
    if has_location {
        response.answer = format!("{LOCATION_DISCLAIMER}{}", response.answer);
    }
    response
}

fn route(query: &str, has_image: bool) -> FetchResponse {
    if let Some(rule) = RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| query.contains(kw)))
    {
        return FetchResponse::success(rule.answer, rule.confidence)
            .with_sources(vec![rule.source.to_string()]);
    }

    match (query.is_empty(), has_image) {
        (true, true) => FetchResponse::success(IMAGE_ANSWER, 0.4),
        (true, false) => FetchResponse::success(EMPTY_ANSWER, 0.0),
        (false, _) => FetchResponse::success(FALLBACK_ANSWER, 0.2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_spot() {
        let response = answer_for("leaf spot", false, false);
        assert!(response.answer.contains("Leaf spot"));
        assert!(!response.error);
        assert_eq!(response.sources.len(), 1);
    }

    #[test]
    fn test_pesticide_routes_to_leaf_spot() {
        assert!(answer_for("Which PESTICIDE for tomato?", false, false)
            .answer
            .contains("Leaf spot"));
    }

    #[test]
    fn test_market_price() {
        let answer = answer_for("market price", false, false).answer;
        assert!(answer.contains("mandi"));
        assert!(answer.to_lowercase().contains("market"));
    }

    #[test]
    fn test_rain_tomorrow() {
        let answer = answer_for("rain tomorrow", false, false).answer;
        assert!(answer.contains("weather"));
        assert!(answer.contains("spraying"));
    }

    #[test]
    fn test_first_match_wins() {
        // Mentions both leaf spot and rain; leaf spot rule comes first.
        let answer = answer_for("leaf spot after rain", false, false).answer;
        assert!(answer.starts_with("Leaf spot"));
    }

    #[test]
    fn test_empty_without_image_prompts() {
        let answer = answer_for("", false, false).answer;
        assert!(answer.starts_with("Please type your question"));
    }

    #[test]
    fn test_empty_with_image() {
        let answer = answer_for("  ", true, false).answer;
        assert!(answer.contains("photo"));
    }

    #[test]
    fn test_unmatched_falls_back() {
        let answer = answer_for("how do I fix my tractor", false, false).answer;
        assert!(answer.contains("not sure"));
    }

    #[test]
    fn test_only_listed_keywords_match() {
        for query in ["leafspot on chilli", "mandi rates today", "forecast for sowing"] {
            let answer = answer_for(query, false, false).answer;
            assert!(answer.contains("not sure"), "{query} matched a rule");
        }
    }

    #[test]
    fn test_location_prefix_only_with_location() {
        for query in ["leaf spot", "market price", "rain", "tractor", ""] {
            assert!(answer_for(query, false, true).answer.starts_with(LOCATION_DISCLAIMER));
            assert!(!answer_for(query, false, false).answer.starts_with(LOCATION_DISCLAIMER));
        }
    }

    #[test]
    fn test_confidence_in_unit_range() {
        for query in ["leaf spot", "price", "weather", "other", ""] {
            let confidence = answer_for(query, false, false).confidence.unwrap();
            assert!((0.0..=1.0).contains(&confidence));
        }
    }
}
