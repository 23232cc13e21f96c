//! Annotation records and the element-shape predicates that admit them.
//!
//! The model emits flat JSON objects with no discriminant. A record is a
//! rule critique when it carries `rule` + `suggestion`, and general feedback
//! when it carries `category` + `feedback`. Both variants require a
//! non-empty string `snippet`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Rule numbers the rule-based prompt enumerates.
pub const RULE_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// One critique item returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationRecord {
    pub snippet: String,
    #[serde(flatten)]
    pub critique: Critique,
}

/// The classification and advice attached to a snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Critique {
    Rule { rule: i64, suggestion: String },
    General { category: String, feedback: String },
}

impl AnnotationRecord {
    pub fn rule(snippet: impl Into<String>, rule: i64, suggestion: impl Into<String>) -> Self {
        Self {
            snippet: snippet.into(),
            critique: Critique::Rule {
                rule,
                suggestion: suggestion.into(),
            },
        }
    }

    pub fn general(
        snippet: impl Into<String>,
        category: impl Into<String>,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            snippet: snippet.into(),
            critique: Critique::General {
                category: category.into(),
                feedback: feedback.into(),
            },
        }
    }

    /// Short classification label: `rule 4` or the category name.
    pub fn label(&self) -> String {
        match &self.critique {
            Critique::Rule { rule, .. } => format!("rule {rule}"),
            Critique::General { category, .. } => category.clone(),
        }
    }

    /// The advice text, whichever variant this is.
    pub fn advice(&self) -> &str {
        match &self.critique {
            Critique::Rule { suggestion, .. } => suggestion,
            Critique::General { feedback, .. } => feedback,
        }
    }
}

/// Which element shapes a validation pass admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Rule,
    General,
    /// Rule or General, whichever the element satisfies.
    Either,
}

impl Shape {
    /// Build a record from `element` if it satisfies this shape.
    pub fn admit(self, element: &Value) -> Option<AnnotationRecord> {
        let obj = element.as_object()?;
        let snippet = obj.get("snippet")?.as_str().filter(|s| !s.is_empty())?;

        let critique = match self {
            Shape::Rule => rule_fields(obj)?,
            Shape::General => general_fields(obj)?,
            Shape::Either => rule_fields(obj).or_else(|| general_fields(obj))?,
        };

        Some(AnnotationRecord {
            snippet: snippet.to_string(),
            critique,
        })
    }
}

fn rule_fields(obj: &Map<String, Value>) -> Option<Critique> {
    let rule = obj.get("rule")?.as_i64()?;
    let suggestion = obj.get("suggestion")?.as_str()?;
    if !RULE_RANGE.contains(&rule) {
        debug!(rule, "rule number outside the prompted range");
    }
    Some(Critique::Rule {
        rule,
        suggestion: suggestion.to_string(),
    })
}

fn general_fields(obj: &Map<String, Value>) -> Option<Critique> {
    let category = obj.get("category")?.as_str()?;
    let feedback = obj.get("feedback")?.as_str()?;
    Some(Critique::General {
        category: category.to_string(),
        feedback: feedback.to_string(),
    })
}

/// The two analyses a user can request over the same text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    /// Numbered writing-rule critique (`rule` + `suggestion`).
    Rules,
    /// Free-form category feedback (`category` + `feedback`).
    General,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 2] = [AnalysisKind::Rules, AnalysisKind::General];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::General => "general",
        }
    }

    /// Element shape admitted when validating this kind's responses.
    ///
    /// Both kinds accept either record variant, so a model that answers a
    /// rules prompt with category feedback still renders.
    pub fn shape(&self) -> Shape {
        Shape::Either
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" | "rule" => Ok(Self::Rules),
            "general" => Ok(Self::General),
            other => Err(format!("unknown analysis kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn admits_rule_variant() {
        let el = json!({"snippet": "utilize", "rule": 2, "suggestion": "use"});
        let rec = Shape::Either.admit(&el).unwrap();
        assert_eq!(rec, AnnotationRecord::rule("utilize", 2, "use"));
    }

    #[test]
    fn admits_general_variant() {
        let el = json!({"snippet": "Basically", "category": "style", "feedback": "filler"});
        let rec = Shape::Either.admit(&el).unwrap();
        assert_eq!(rec, AnnotationRecord::general("Basically", "style", "filler"));
    }

    #[test]
    fn rule_wins_when_both_variants_present() {
        let el = json!({
            "snippet": "x", "rule": 1, "suggestion": "s",
            "category": "c", "feedback": "f"
        });
        let rec = Shape::Either.admit(&el).unwrap();
        assert!(matches!(rec.critique, Critique::Rule { .. }));
    }

    #[test]
    fn single_variant_shapes_are_strict() {
        let rule = json!({"snippet": "x", "rule": 1, "suggestion": "s"});
        let general = json!({"snippet": "x", "category": "c", "feedback": "f"});
        assert!(Shape::Rule.admit(&general).is_none());
        assert!(Shape::General.admit(&rule).is_none());
        assert!(Shape::Rule.admit(&rule).is_some());
        assert!(Shape::General.admit(&general).is_some());
    }

    #[test]
    fn rejects_empty_or_missing_snippet() {
        assert!(Shape::Either
            .admit(&json!({"snippet": "", "rule": 1, "suggestion": "s"}))
            .is_none());
        assert!(Shape::Either
            .admit(&json!({"rule": 1, "suggestion": "s"}))
            .is_none());
        assert!(Shape::Either
            .admit(&json!({"snippet": 3, "rule": 1, "suggestion": "s"}))
            .is_none());
    }

    #[test]
    fn rejects_half_a_variant() {
        assert!(Shape::Either.admit(&json!({"snippet": "x", "rule": 1})).is_none());
        assert!(Shape::Either
            .admit(&json!({"snippet": "x", "category": "c"}))
            .is_none());
    }

    #[test]
    fn rejects_mistyped_companions() {
        assert!(Shape::Either
            .admit(&json!({"snippet": "x", "rule": "4", "suggestion": "s"}))
            .is_none());
        assert!(Shape::Either
            .admit(&json!({"snippet": "x", "rule": 4.5, "suggestion": "s"}))
            .is_none());
        assert!(Shape::Either
            .admit(&json!({"snippet": "x", "category": "c", "feedback": null}))
            .is_none());
    }

    #[test]
    fn out_of_range_rule_is_still_admitted() {
        let rec = Shape::Rule
            .admit(&json!({"snippet": "x", "rule": 9, "suggestion": "s"}))
            .unwrap();
        assert_eq!(rec.label(), "rule 9");
    }

    #[test]
    fn serializes_back_to_flat_shape() {
        let rec = AnnotationRecord::rule("was done", 4, "use active voice");
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            value,
            json!({"snippet": "was done", "rule": 4, "suggestion": "use active voice"})
        );
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Rules".parse::<AnalysisKind>(), Ok(AnalysisKind::Rules));
        assert_eq!("general".parse::<AnalysisKind>(), Ok(AnalysisKind::General));
        assert!("tone".parse::<AnalysisKind>().is_err());
    }
}
