//! Client token normalization.
//!
//! Tokens arrive already split by the client. The only transformation is
//! Unicode lowercasing; nothing is split, stemmed or dropped, so output
//! position `i` always corresponds to input position `i`.

use serde::Serialize;
use serde_json::Value;

use crate::PipelineError;

/// Ordered, lowercased tokens for one request. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenSequence(Vec<String>);

impl TokenSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for TokenSequence {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|t| t.as_ref().to_lowercase()).collect())
    }
}

/// Lowercase already-typed tokens.
pub fn normalize_strs<I, S>(raw: I) -> TokenSequence
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter().collect()
}

/// Validate and lowercase the untyped `tokens` value of a request body.
///
/// `None` means the field was absent. Anything other than an array of strings
/// is rejected; an empty array is fine.
pub fn normalize(raw: Option<&Value>) -> Result<TokenSequence, PipelineError> {
    let value = raw.ok_or_else(|| {
        PipelineError::InvalidInput("missing required field `tokens`".to_string())
    })?;

    let items = value.as_array().ok_or_else(|| {
        PipelineError::InvalidInput(format!(
            "`tokens` must be a list of strings, got {}",
            json_kind(value)
        ))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_str().map(str::to_lowercase).ok_or_else(|| {
                PipelineError::InvalidInput(format!(
                    "`tokens[{idx}]` must be a string, got {}",
                    json_kind(item)
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(TokenSequence)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lowercases_without_splitting() {
        let raw = json!(["Bob", "Ross", "was", "an", "artist", "."]);
        let tokens = normalize(Some(&raw)).unwrap();
        assert_eq!(
            tokens.as_slice(),
            &["bob", "ross", "was", "an", "artist", "."]
        );
    }

    #[test]
    fn multiword_strings_stay_single_tokens() {
        let raw = json!(["New York", "IL-6"]);
        let tokens = normalize(Some(&raw)).unwrap();
        assert_eq!(tokens.as_slice(), &["new york", "il-6"]);
    }

    #[test]
    fn unicode_lowercasing() {
        let tokens = normalize_strs(["ÉCOLE", "Straße", "ÅNGSTRÖM"]);
        assert_eq!(tokens.as_slice(), &["école", "straße", "ångström"]);
    }

    #[test]
    fn empty_list_is_valid() {
        let tokens = normalize(Some(&json!([]))).unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn empty_string_token_round_trips() {
        let tokens = normalize(Some(&json!(["", "A"]))).unwrap();
        assert_eq!(tokens.as_slice(), &["", "a"]);
    }

    #[test]
    fn missing_field_is_rejected() {
        let err = normalize(None).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(ref msg) if msg.contains("tokens")));
    }

    #[test]
    fn non_list_is_rejected() {
        for value in [json!("bob ross"), json!(null), json!(3), json!({"a": 1})] {
            let err = normalize(Some(&value)).unwrap_err();
            assert!(matches!(err, PipelineError::InvalidInput(_)), "{value}");
        }
    }

    #[test]
    fn non_string_element_is_rejected() {
        let err = normalize(Some(&json!(["bob", 7]))).unwrap_err();
        assert!(err.to_string().contains("tokens[1]"));
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn serializes_as_plain_list() {
        let tokens = normalize_strs(["A", "b"]);
        assert_eq!(serde_json::to_value(&tokens).unwrap(), json!(["a", "b"]));
    }
}
