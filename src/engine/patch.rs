//! Two-phase article patch.
//!
//! An update request distinguishes three states per field: absent (keep
//! the stored value), JSON null (clear it), and a value (replace it).
//! Phase one collects those tagged changes; phase two validates them and
//! applies the cross-field rule that an explicit `strategic: false`
//! clears category, subcategory and cycle no matter what else the same
//! request carried.

use serde::{Deserialize, Deserializer};
use std::str::FromStr;

use crate::types::{NewsError, Relevance, Sentiment, StrategicCategory, Topic};

/// One tagged field change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Change<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Change::Keep)
    }

    /// The new value, if this change sets one.
    pub fn set_value(&self) -> Option<&T> {
        match self {
            Change::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> Default for Change<T> {
    fn default() -> Self {
        Change::Keep
    }
}

// Absent fields never reach this function (serde falls back to Default);
// a present field is either null or a value.
fn tri_state_field<'de, D, T>(deserializer: D) -> Result<Change<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<T>::deserialize(deserializer)? {
        Some(value) => Change::Set(value),
        None => Change::Clear,
    })
}

/// The raw patch body for the update workflow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArticlePatch {
    #[serde(deserialize_with = "tri_state_field")]
    pub relevance: Change<String>,
    #[serde(deserialize_with = "tri_state_field")]
    pub topic: Change<String>,
    #[serde(deserialize_with = "tri_state_field")]
    pub sentiment: Change<String>,
    #[serde(deserialize_with = "tri_state_field")]
    pub strategic: Change<bool>,
    #[serde(deserialize_with = "tri_state_field")]
    pub category: Change<String>,
    #[serde(deserialize_with = "tri_state_field")]
    pub subcategory: Change<String>,
    #[serde(deserialize_with = "tri_state_field")]
    pub cycle: Change<i64>,
}

impl ArticlePatch {
    /// Number of explicitly-provided fields.
    pub fn provided(&self) -> usize {
        [
            self.relevance.is_keep(),
            self.topic.is_keep(),
            self.sentiment.is_keep(),
            self.strategic.is_keep(),
            self.category.is_keep(),
            self.subcategory.is_keep(),
            self.cycle.is_keep(),
        ]
        .iter()
        .filter(|kept| !**kept)
        .count()
    }

    /// Validate and normalize the patch, then apply the strategic-false
    /// rule. Set values come back in canonical stored form.
    pub fn resolve(mut self) -> Result<ArticlePatch, NewsError> {
        if self.provided() == 0 {
            return Err(NewsError::Validation(
                "no updatable fields supplied".to_string(),
            ));
        }

        if let Change::Set(value) = &self.relevance {
            let relevance = Relevance::classify(Some(value)).ok_or_else(|| {
                NewsError::Validation(format!("relevance must be one of Useful, Trash, Support (got '{value}')"))
            })?;
            self.relevance = Change::Set(relevance.as_str().to_string());
        }

        if let Change::Set(value) = &self.sentiment {
            let sentiment = Sentiment::classify(Some(value)).ok_or_else(|| {
                NewsError::Validation(format!(
                    "sentiment must be one of Positive, Negative, Neutral (got '{value}')"
                ))
            })?;
            self.sentiment = Change::Set(sentiment.as_str().to_string());
        }

        if let Change::Set(value) = &self.topic {
            let topic = Topic::from_str(value)
                .map_err(|_| NewsError::Validation(format!("unknown topic '{value}'")))?;
            self.topic = Change::Set(topic.as_str().to_string());
        }

        if let Change::Set(value) = &self.category {
            let category = StrategicCategory::classify(value).ok_or_else(|| {
                NewsError::Validation(format!(
                    "category must be one of Infrastructure, Social, Education, Health (got '{value}')"
                ))
            })?;
            self.category = Change::Set(category.as_str().to_string());
        }

        if let Change::Set(value) = &self.subcategory {
            if value.chars().count() > 250 {
                return Err(NewsError::Validation(
                    "subcategory exceeds 250 characters".to_string(),
                ));
            }
        }

        if self.strategic == Change::Clear {
            return Err(NewsError::Validation(
                "strategic flag cannot be cleared, only set".to_string(),
            ));
        }

        // Strategic=false wins over any strategic sub-field in the same
        // request: all three are forced to null atomically.
        if self.strategic == Change::Set(false) {
            self.category = Change::Clear;
            self.subcategory = Change::Clear;
            self.cycle = Change::Clear;
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ArticlePatch {
        serde_json::from_str(json).unwrap()
    }

    // -- deserialization tests --

    #[test]
    fn test_absent_null_and_value_are_distinct() {
        let patch = parse(r#"{"sentiment": "Positive", "topic": null}"#);
        assert_eq!(patch.sentiment, Change::Set("Positive".to_string()));
        assert_eq!(patch.topic, Change::Clear);
        assert_eq!(patch.relevance, Change::Keep);
        assert_eq!(patch.provided(), 2);
    }

    #[test]
    fn test_empty_body_provides_nothing() {
        let patch = parse("{}");
        assert_eq!(patch.provided(), 0);
    }

    // -- resolution tests --

    #[test]
    fn test_empty_patch_is_rejected() {
        let err = parse("{}").resolve().unwrap_err();
        assert!(matches!(err, NewsError::Validation(_)));
    }

    #[test]
    fn test_strategic_false_forces_nulls_over_request_values() {
        let patch = parse(
            r#"{"strategic": false, "category": "Health", "subcategory": "clinics", "cycle": 3}"#,
        );
        let resolved = patch.resolve().unwrap();
        assert_eq!(resolved.strategic, Change::Set(false));
        assert_eq!(resolved.category, Change::Clear);
        assert_eq!(resolved.subcategory, Change::Clear);
        assert_eq!(resolved.cycle, Change::Clear);
    }

    #[test]
    fn test_strategic_true_keeps_request_values() {
        let patch = parse(r#"{"strategic": true, "category": "Health", "cycle": 3}"#);
        let resolved = patch.resolve().unwrap();
        assert_eq!(resolved.category, Change::Set("Health".to_string()));
        assert_eq!(resolved.cycle, Change::Set(3));
    }

    #[test]
    fn test_strategic_null_is_rejected() {
        let err = parse(r#"{"strategic": null}"#).resolve().unwrap_err();
        assert!(matches!(err, NewsError::Validation(_)));
    }

    #[test]
    fn test_enum_fields_are_validated_and_canonicalized() {
        let resolved = parse(r#"{"relevance": " Useful ", "sentiment": "Negative"}"#)
            .resolve()
            .unwrap();
        assert_eq!(resolved.relevance, Change::Set("Useful".to_string()));
        assert_eq!(resolved.sentiment, Change::Set("Negative".to_string()));

        assert!(parse(r#"{"relevance": "Important"}"#).resolve().is_err());
        assert!(parse(r#"{"sentiment": "great"}"#).resolve().is_err());
        assert!(parse(r#"{"category": "Sports"}"#).resolve().is_err());
        assert!(parse(r#"{"topic": "gossip"}"#).resolve().is_err());
    }

    #[test]
    fn test_clearing_sentiment_is_allowed() {
        let resolved = parse(r#"{"sentiment": null}"#).resolve().unwrap();
        assert_eq!(resolved.sentiment, Change::Clear);
    }

    #[test]
    fn test_subcategory_length_limit() {
        let ok = format!(r#"{{"subcategory": "{}"}}"#, "x".repeat(250));
        assert!(parse(&ok).resolve().is_ok());

        let too_long = format!(r#"{{"subcategory": "{}"}}"#, "x".repeat(251));
        let err = parse(&too_long).resolve().unwrap_err();
        assert!(matches!(err, NewsError::Validation(_)));
    }
}
