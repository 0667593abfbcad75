//! JSON 라인 공통 헬퍼
//!
//! 두 JSON 디코더가 공유하는 객체 파싱과 평탄화 로직입니다.

use deceptinet_core::event::EventFields;
use serde_json::{Map, Value};

use crate::error::LogPipelineError;

/// 한 라인을 JSON 객체로 파싱합니다. 최상위가 객체가 아니면 에러입니다.
pub(crate) fn parse_object(line: &str, format: &str) -> Result<Map<String, Value>, LogPipelineError> {
    let value: Value = serde_json::from_str(line).map_err(|e| LogPipelineError::Decode {
        format: format.to_owned(),
        reason: e.to_string(),
    })?;

    match value {
        Value::Object(object) => Ok(object),
        _ => Err(LogPipelineError::Decode {
            format: format.to_owned(),
            reason: "expected JSON object at top level".to_owned(),
        }),
    }
}

/// 스칼라 값을 문자열로 변환합니다. 객체/배열/null은 `None`.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 객체의 키를 스칼라 문자열로 꺼냅니다.
pub(crate) fn get_scalar(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(scalar_to_string)
}

/// JSON 객체를 dot notation 필드로 평탄화하여 `fields`에 추가합니다.
///
/// - 중첩 객체: `parent.child`
/// - 배열: JSON 문자열로 직렬화
/// - null: 스킵
pub(crate) fn flatten_into(fields: &mut EventFields, object: &Map<String, Value>, prefix: &str) {
    for (key, val) in object {
        let field_name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match val {
            Value::Object(nested) => flatten_into(fields, nested, &field_name),
            Value::Array(arr) => {
                if let Ok(s) = serde_json::to_string(arr) {
                    fields.insert(field_name, s);
                }
            }
            Value::Null => {}
            scalar => {
                if let Some(s) = scalar_to_string(scalar) {
                    fields.insert(field_name, s);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_object_rejects_non_objects() {
        assert!(parse_object("[1,2,3]", "test").is_err());
        assert!(parse_object("\"text\"", "test").is_err());
        assert!(parse_object("{not json", "test").is_err());
        assert!(parse_object("{}", "test").is_ok());
    }

    #[test]
    fn flatten_nested_objects_and_arrays() {
        let object = parse_object(
            r#"{"username":"admin","attempt":3,"ok":false,"meta":{"geo":{"cc":"KR"}},"tags":["a","b"],"gone":null}"#,
            "test",
        )
        .unwrap();
        let mut fields = EventFields::new();
        flatten_into(&mut fields, &object, "");

        assert_eq!(fields.get("username"), "admin");
        assert_eq!(fields.get("attempt"), "3");
        assert_eq!(fields.get("ok"), "false");
        assert_eq!(fields.get("meta.geo.cc"), "KR");
        assert_eq!(fields.get("tags"), r#"["a","b"]"#);
        assert!(!fields.contains("gone"));
    }

    #[test]
    fn get_scalar_ignores_structures() {
        let object = parse_object(r#"{"a":"x","b":{"c":1},"n":7}"#, "test").unwrap();
        assert_eq!(get_scalar(&object, "a").as_deref(), Some("x"));
        assert_eq!(get_scalar(&object, "n").as_deref(), Some("7"));
        assert_eq!(get_scalar(&object, "b"), None);
        assert_eq!(get_scalar(&object, "missing"), None);
    }
}
