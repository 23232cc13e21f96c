//! Response normalisation: pull a JSON payload out of free-form model output.
//!
//! Models wrap their answer in prose, in ```` ```json ```` fences, or both,
//! and routinely leave a trailing comma before a closing bracket. This module
//! only produces a cleaned candidate string; parsing happens in
//! [`validate`](crate::validate).

use std::sync::LazyLock;

use regex::Regex;

use crate::ExtractError;

/// First fenced block: an opening line of three backticks with an optional
/// `json` info string, up to the next line that is only three backticks.
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^[ \t]*```(?:json)?[ \t]*\r?\n(.*?)^[ \t]*```[ \t]*\r?$")
        .expect("fence pattern is valid")
});

/// A comma followed (across whitespace) by a closing brace or bracket.
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("trailing comma pattern is valid"));

/// Extract and clean the JSON candidate from a raw model response.
///
/// Uses the first fenced block when present, otherwise the whole trimmed
/// response. Fails with [`ExtractError::EmptyPayload`] when nothing remains.
pub fn normalize(raw: &str) -> Result<String, ExtractError> {
    let candidate = match FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => raw.trim(),
    };

    if candidate.is_empty() {
        return Err(ExtractError::EmptyPayload);
    }

    Ok(TRAILING_COMMA.replace_all(candidate, "$1").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    #[test]
    fn plain_json_passes_through() {
        let raw = r#"  [{"snippet":"a","rule":1,"suggestion":"b"}]  "#;
        assert_eq!(
            normalize(raw).unwrap(),
            r#"[{"snippet":"a","rule":1,"suggestion":"b"}]"#
        );
    }

    #[test]
    fn extracts_json_fence_from_prose() {
        let raw = "Here is my analysis:\n```json\n[1, 2]\n```\nHope that helps!";
        assert_eq!(normalize(raw).unwrap(), "[1, 2]");
    }

    #[test]
    fn extracts_bare_fence() {
        let raw = "```\n[]\n```";
        assert_eq!(normalize(raw).unwrap(), "[]");
    }

    #[test]
    fn uses_first_fenced_block() {
        let raw = "```json\n[1]\n```\nand also\n```json\n[2]\n```";
        assert_eq!(normalize(raw).unwrap(), "[1]");
    }

    #[test]
    fn strips_trailing_commas_across_whitespace() {
        let raw = "[{\"a\": 1,\n}, {\"b\": [1, 2,  ]},\n]";
        let cleaned = normalize(raw).unwrap();
        assert_eq!(cleaned, "[{\"a\": 1\n}, {\"b\": [1, 2  ]}\n]");
        assert!(serde_json::from_str::<Value>(&cleaned).is_ok());
    }

    #[test]
    fn empty_input_is_empty_payload() {
        assert!(matches!(normalize(""), Err(ExtractError::EmptyPayload)));
        assert!(matches!(normalize("   \n\t"), Err(ExtractError::EmptyPayload)));
    }

    #[test]
    fn empty_fence_is_empty_payload() {
        assert!(matches!(
            normalize("prose\n```json\n\n```"),
            Err(ExtractError::EmptyPayload)
        ));
    }

    #[test]
    fn inline_backticks_in_prose_are_not_a_fence() {
        let raw = "Format: wrap in ``` per your request.\n```json\n[{\"snippet\":\"a\",\"rule\":1,\"suggestion\":\"b\"}]\n```";
        assert_eq!(
            normalize(raw).unwrap(),
            r#"[{"snippet":"a","rule":1,"suggestion":"b"}]"#
        );
    }

    #[test]
    fn indented_crlf_fence_is_recognised() {
        let raw = "Result:\r\n  ```json\r\n[1]\r\n  ```\r\nDone.";
        assert_eq!(normalize(raw).unwrap(), "[1]");
    }

    #[test]
    fn single_line_fence_is_not_a_block() {
        let raw = "```[1]```";
        assert_eq!(normalize(raw).unwrap(), "```[1]```");
    }

    #[test]
    fn unterminated_fence_falls_back_to_whole_text() {
        let raw = "```json\n[1, 2,]";
        assert_eq!(normalize(raw).unwrap(), "```json\n[1, 2]");
    }

    proptest! {
        #[test]
        fn fenced_array_with_trailing_comma_round_trips(
            items in prop::collection::vec(("[a-zA-Z ]{1,12}", 1i64..=5, "[a-z ]{0,16}"), 1..6)
        ) {
            let original: Value = items
                .iter()
                .map(|(snippet, rule, suggestion)| {
                    json!({"snippet": snippet, "rule": rule, "suggestion": suggestion})
                })
                .collect();

            let body = serde_json::to_string_pretty(&original).unwrap();
            let close = body.rfind(']').unwrap();
            let with_comma = format!("{},\n{}", &body[..close].trim_end(), &body[close..]);
            let raw = format!("Sure! Here you go:\n```json\n{with_comma}\n```\nLet me know.");

            let cleaned = normalize(&raw).unwrap();
            let parsed: Value = serde_json::from_str(&cleaned).unwrap();
            prop_assert_eq!(parsed, original);
        }
    }
}
