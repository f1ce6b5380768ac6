//! Tolerant reading of order placement responses, which come in several shapes.

use serde_json::Value;

const REDIRECT_URL_FIELDS: &[&[&str]] = &[&["redirect_url"], &["data", "redirect_url"]];

const ORDER_ID_FIELDS: &[&[&str]] = &[
    &["order", "id"],
    &["data", "order", "id"],
    &["order_id"],
    &["data", "order_id"],
    &["id"],
    &["data", "id"],
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, field| current.get(field))
}

fn as_identifier(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        _ => None,
    }
}

/// The payment gateway URL, when the backend wants the browser sent elsewhere.
pub fn redirect_url(response: &Value) -> Option<String> {
    REDIRECT_URL_FIELDS
        .iter()
        .filter_map(|path| lookup(response, path))
        .find_map(|value| value.as_str())
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(ToOwned::to_owned)
}

/// The order identifier from the first candidate field that holds one, or the response itself
/// when it is a bare id.
pub fn order_id(response: &Value) -> Option<OrderId> {
    ORDER_ID_FIELDS
        .iter()
        .filter_map(|path| lookup(response, path))
        .find_map(as_identifier)
        .or_else(|| as_identifier(response))
        .map(OrderId)
}
