//! Response envelope normalization.
//!
//! The helpdesk does not commit to one list envelope, so listings accept
//! `{"data": [...]}`, `{"result": [...]}` and a bare array alike.

use serde_json::Value;

use crate::transport::ResponseBody;

/// Extract the list of records from a decoded response body.
///
/// Looks at `data`, then `result`, then the body itself. Whatever that
/// resolves to must be an array; anything else yields no records.
#[must_use]
pub fn records(body: ResponseBody) -> Vec<Value> {
    match body {
        ResponseBody::Json(value) => records_from_value(value),
        ResponseBody::Text(_) => Vec::new(),
    }
}

fn records_from_value(mut value: Value) -> Vec<Value> {
    let resolved = if let Some(data) = value.get_mut("data") {
        data.take()
    } else if let Some(result) = value.get_mut("result") {
        result.take()
    } else {
        value
    };

    match resolved {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}
