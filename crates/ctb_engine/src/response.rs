use serde_json::{Number, Value};

use crate::{FailureKind, UploadError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Parses a response body as JSON and renders it back as compact text.
///
/// Object keys keep their original order, so `{"status":"ok","rows":12}`
/// round-trips unchanged. Whole-valued floats print as integers (`4.0` as
/// `4`, `-0.0` as `0`), the way a browser stringifies them.
pub fn render_json(body: &[u8]) -> Result<String, UploadError> {
    let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);
    let mut value: Value = serde_json::from_slice(body)
        .map_err(|err| UploadError::new(FailureKind::InvalidJson, err.to_string()))?;
    normalize_numbers(&mut value);
    serde_json::to_string(&value)
        .map_err(|err| UploadError::new(FailureKind::InvalidJson, err.to_string()))
}

fn normalize_numbers(value: &mut Value) {
    match value {
        Value::Number(number) => {
            if let Some(integer) = whole_float(number) {
                *number = Number::from(integer);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_numbers),
        Value::Object(map) => map.values_mut().for_each(normalize_numbers),
        Value::Null | Value::Bool(_) | Value::String(_) => {}
    }
}

fn whole_float(number: &Number) -> Option<i64> {
    if !number.is_f64() {
        return None;
    }
    let float = number.as_f64()?;
    if float.is_finite() && float.fract() == 0.0 && float.abs() <= MAX_SAFE_INTEGER {
        Some(float as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compacts_whitespace_and_keeps_key_order() {
        let body = br#"{ "status": "ok",
            "rows": 12,
            "buildable": [ { "Final_Product": "FP-1", "Buildable_Units": 4 } ] }"#;

        assert_eq!(
            render_json(body).unwrap(),
            r#"{"status":"ok","rows":12,"buildable":[{"Final_Product":"FP-1","Buildable_Units":4}]}"#
        );
    }

    #[test]
    fn whole_floats_print_as_integers() {
        assert_eq!(
            render_json(br#"{"units":4.0,"big":1e2,"z":-0.0}"#).unwrap(),
            r#"{"units":4,"big":100,"z":0}"#
        );
        assert_eq!(
            render_json(br#"[{"Buildable_Units":4.0,"On_Hand":12.5}]"#).unwrap(),
            r#"[{"Buildable_Units":4,"On_Hand":12.5}]"#
        );
    }

    #[test]
    fn floats_beyond_safe_integer_range_keep_float_form() {
        assert_eq!(render_json(b"[1e300]").unwrap(), "[1e300]");
    }

    #[test]
    fn leading_bom_is_skipped() {
        assert_eq!(render_json(b"\xEF\xBB\xBF{\"a\":1}").unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn scalar_bodies_are_valid_json() {
        assert_eq!(render_json(b"\"done\"").unwrap(), "\"done\"");
        assert_eq!(render_json(b"null").unwrap(), "null");
    }

    #[test]
    fn rejects_non_json() {
        let err = render_json(b"<html>Internal Server Error</html>").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidJson);
    }

    #[test]
    fn rejects_empty_body() {
        let err = render_json(b"").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidJson);
    }
}
