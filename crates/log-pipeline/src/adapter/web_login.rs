//! 웹 로그인 디코이 디코더
//!
//! 한 라인이 하나의 JSON 객체인 로그를 읽습니다.
//!
//! ```text
//! {"timestamp":"2024-01-15T12:00:00.123456","event_type":"LOGIN_ATTEMPT",
//!  "data":{"ip":"203.0.113.7","user_agent":"curl/8.0","username":"admin","password":"admin"}}
//! ```
//!
//! 두 번째 웹 디코이는 `event` 키와 최상위 `ip`/`user_agent`를 씁니다.
//! 두 형태 모두 같은 이벤트로 정규화됩니다.

use deceptinet_core::error::DeceptinetError;
use deceptinet_core::event::{EventFields, EventSource, HoneypotEvent, UNKNOWN_ACTOR, parse_timestamp};
use deceptinet_core::pipeline::EventDecoder;
use serde_json::Value;

use super::json::{flatten_into, get_scalar, parse_object};

/// 최상위에 있으면 `data`에 없는 경우 필드로 보충하는 키
const TOP_LEVEL_FALLBACKS: &[&str] = &["ip", "user_agent"];

/// 웹 로그인 디코이 JSON Lines 디코더
#[derive(Debug, Clone, Copy, Default)]
pub struct WebLoginDecoder;

impl EventDecoder for WebLoginDecoder {
    fn format_name(&self) -> &str {
        "web_login"
    }

    fn decode(&self, line: &str) -> Result<HoneypotEvent, DeceptinetError> {
        let object = parse_object(line, self.format_name())?;

        let event_type = get_scalar(&object, "event_type")
            .or_else(|| get_scalar(&object, "event"))
            .unwrap_or_default();

        let mut fields = EventFields::new();
        if let Some(Value::Object(data)) = object.get("data") {
            flatten_into(&mut fields, data, "");
        }
        for key in TOP_LEVEL_FALLBACKS {
            if let Some(value) = get_scalar(&object, key) {
                fields.insert_if_absent(*key, value);
            }
        }

        let actor = match fields.get("ip") {
            "" => UNKNOWN_ACTOR.to_owned(),
            ip => ip.to_owned(),
        };
        let timestamp = get_scalar(&object, "timestamp").and_then(|raw| parse_timestamp(&raw));

        let mut event = HoneypotEvent::new(EventSource::WebLogin, event_type)
            .with_actor(actor)
            .with_timestamp(timestamp);
        event.fields = fields;
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(line: &str) -> HoneypotEvent {
        WebLoginDecoder.decode(line).unwrap()
    }

    #[test]
    fn decodes_login_attempt() {
        let event = decode(
            r#"{"timestamp":"2024-01-15T12:00:00.123456","event_type":"LOGIN_ATTEMPT","data":{"ip":"1.1.1.1","user_agent":"curl/8.0","username":"admin","password":"hunter2"}}"#,
        );
        assert_eq!(event.source, EventSource::WebLogin);
        assert_eq!(event.event_type, "LOGIN_ATTEMPT");
        assert_eq!(event.actor_ip, "1.1.1.1");
        assert_eq!(event.field("username"), "admin");
        assert_eq!(event.field("password"), "hunter2");
        assert_eq!(event.field("user_agent"), "curl/8.0");
        assert!(event.timestamp.is_some());
    }

    #[test]
    fn unknown_event_types_pass_through() {
        let event = decode(r#"{"event_type":"FORM_FUZZ","data":{"ip":"9.9.9.9"}}"#);
        assert_eq!(event.event_type, "FORM_FUZZ");
    }

    #[test]
    fn legacy_event_key_and_top_level_ip() {
        let event = decode(
            r#"{"timestamp":"2024-01-15T12:00:00","event":"PATH_PROBE","ip":"5.5.5.5","user_agent":"sqlmap","data":{"path":"/wp-admin"}}"#,
        );
        assert_eq!(event.event_type, "PATH_PROBE");
        assert_eq!(event.actor_ip, "5.5.5.5");
        assert_eq!(event.field("user_agent"), "sqlmap");
        assert_eq!(event.field("path"), "/wp-admin");
    }

    #[test]
    fn data_ip_wins_over_top_level_ip() {
        let event = decode(r#"{"event_type":"LOGIN_ATTEMPT","ip":"2.2.2.2","data":{"ip":"1.1.1.1"}}"#);
        assert_eq!(event.actor_ip, "1.1.1.1");
        assert_eq!(event.field("ip"), "1.1.1.1");
    }

    #[test]
    fn missing_ip_is_unknown_and_missing_fields_are_empty() {
        let event = decode(r#"{"event_type":"LOGIN_ATTEMPT","data":{}}"#);
        assert_eq!(event.actor_ip, UNKNOWN_ACTOR);
        assert_eq!(event.field("username"), "");
        assert_eq!(event.field("password"), "");
    }

    #[test]
    fn missing_event_type_is_empty_not_an_error() {
        let event = decode(r#"{"data":{"ip":"1.1.1.1"}}"#);
        assert_eq!(event.event_type, "");
    }

    #[test]
    fn unparseable_timestamp_is_kept_as_none() {
        let event = decode(r#"{"timestamp":"last tuesday","event_type":"PAGE_VISIT"}"#);
        assert!(event.timestamp.is_none());
    }

    #[test]
    fn non_object_data_is_ignored() {
        let event = decode(r#"{"event_type":"PAGE_VISIT","data":"oops"}"#);
        assert!(event.fields.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(WebLoginDecoder.decode("{\"event_type\": ").is_err());
        assert!(WebLoginDecoder.decode("[]").is_err());
    }
}
