//! 이벤트 모델 -- 모든 어댑터가 정규화하는 공통 단위
//!
//! 허니팟마다 로그 형식이 다르지만, 어댑터는 모두 [`HoneypotEvent`]로 변환합니다.
//! 집계 엔진과 리포트 생성기는 이 타입만 알면 됩니다.
//!
//! 이벤트는 라인 단위로 생성되고 집계에 반영된 뒤 바로 버려집니다.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// 액터 IP를 알 수 없을 때 사용하는 값
pub const UNKNOWN_ACTOR: &str = "unknown";

/// 이벤트를 기록한 허니팟 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// 웹 로그인 트랩 (Flask 디코이)
    WebLogin,
    /// SSH 세션 트랩 (Cowrie)
    SshSession,
    /// 악성코드 수집 트랩 (Dionaea)
    MalwareCapture,
}

impl EventSource {
    /// 로그/메트릭 레이블에 쓰는 고정 태그
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebLogin => "web_login",
            Self::SshSession => "ssh_session",
            Self::MalwareCapture => "malware_capture",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 소스별 속성 맵 (username, password, user_agent, input, session 등)
///
/// 없는 키를 조회하면 빈 문자열을 반환합니다. 에러가 아닙니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventFields(BTreeMap<String, String>);

impl EventFields {
    /// 빈 필드 맵을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드 값을 조회합니다. 없으면 `""`.
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    /// 필드를 추가하거나 덮어씁니다.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// 키가 없을 때만 추가합니다.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_insert_with(|| value.into());
    }

    /// 키 존재 여부
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EventFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// 정규화된 허니팟 이벤트
///
/// 파싱에 성공한 로그 라인 하나당 정확히 하나가 생성됩니다.
/// `event_type`은 자유 형식이며 알 수 없는 값도 그대로 통과합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoneypotEvent {
    /// 이벤트를 기록한 허니팟
    pub source: EventSource,
    /// 발생 시각 (없거나 파싱 불가하면 `None`)
    pub timestamp: Option<DateTime<Utc>>,
    /// 이벤트 타입 태그 (예: `LOGIN_ATTEMPT`, `cowrie.command.input`)
    pub event_type: String,
    /// 공격자 IP (없으면 `"unknown"`)
    pub actor_ip: String,
    /// 소스별 추가 속성
    pub fields: EventFields,
}

impl HoneypotEvent {
    /// 필수 항목만으로 이벤트를 생성합니다. 액터는 `unknown`으로 시작합니다.
    pub fn new(source: EventSource, event_type: impl Into<String>) -> Self {
        Self {
            source,
            timestamp: None,
            event_type: event_type.into(),
            actor_ip: UNKNOWN_ACTOR.to_owned(),
            fields: EventFields::new(),
        }
    }

    pub fn with_actor(mut self, actor_ip: impl Into<String>) -> Self {
        self.actor_ip = actor_ip.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key, value);
        self
    }

    /// 필드 조회 단축 메서드 (없으면 `""`)
    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key)
    }
}

impl fmt::Display for HoneypotEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = self
            .timestamp
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_owned());
        write!(
            f,
            "[{}] {} {} from {} ({} fields)",
            ts,
            self.source,
            self.event_type,
            self.actor_ip,
            self.fields.len(),
        )
    }
}

/// 타임스탬프 문자열을 UTC 시각으로 변환합니다.
///
/// 지원 형식:
/// - RFC 3339: `2024-01-15T12:00:00Z`, `2024-01-15T12:00:00+09:00`
/// - 타임존 없는 ISO 8601 (UTC로 간주): `2024-01-15T12:00:00.123456`
/// - Unix timestamp (초/밀리초): `1705320000`, `1705320000000`
///
/// 해석할 수 없으면 `None`을 반환합니다.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(ts_num) = raw.parse::<i64>() {
        // 10자리 = 초, 13자리 = 밀리초
        let ts_secs = if ts_num > 9_999_999_999 {
            ts_num / 1000
        } else {
            ts_num
        };
        return DateTime::from_timestamp(ts_secs, 0);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_reads_as_empty() {
        let event = HoneypotEvent::new(EventSource::WebLogin, "LOGIN_ATTEMPT");
        assert_eq!(event.field("username"), "");
        assert!(!event.fields.contains("username"));
    }

    #[test]
    fn new_event_defaults_to_unknown_actor() {
        let event = HoneypotEvent::new(EventSource::SshSession, "cowrie.session.connect");
        assert_eq!(event.actor_ip, UNKNOWN_ACTOR);
        assert!(event.timestamp.is_none());
    }

    #[test]
    fn builder_methods_set_values() {
        let event = HoneypotEvent::new(EventSource::WebLogin, "LOGIN_ATTEMPT")
            .with_actor("1.1.1.1")
            .with_field("username", "admin");
        assert_eq!(event.actor_ip, "1.1.1.1");
        assert_eq!(event.field("username"), "admin");
    }

    #[test]
    fn insert_if_absent_keeps_existing() {
        let mut fields = EventFields::new();
        fields.insert("ip", "1.1.1.1");
        fields.insert_if_absent("ip", "2.2.2.2");
        fields.insert_if_absent("user_agent", "curl/8.0");
        assert_eq!(fields.get("ip"), "1.1.1.1");
        assert_eq!(fields.get("user_agent"), "curl/8.0");
    }

    #[test]
    fn fields_from_iterator() {
        let fields: EventFields = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("b"), "2");
    }

    #[test]
    fn source_tags_are_stable() {
        assert_eq!(EventSource::WebLogin.to_string(), "web_login");
        assert_eq!(EventSource::SshSession.to_string(), "ssh_session");
        assert_eq!(EventSource::MalwareCapture.to_string(), "malware_capture");
    }

    #[test]
    fn source_serializes_snake_case() {
        let json = serde_json::to_string(&EventSource::MalwareCapture).unwrap();
        assert_eq!(json, "\"malware_capture\"");
    }

    #[test]
    fn parse_timestamp_rfc3339() {
        let ts = parse_timestamp("2024-01-15T12:00:00Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-15T12:00:00+00:00");
    }

    #[test]
    fn parse_timestamp_with_offset_normalizes_to_utc() {
        let ts = parse_timestamp("2024-01-15T21:00:00+09:00").unwrap();
        assert_eq!(ts, parse_timestamp("2024-01-15T12:00:00Z").unwrap());
    }

    #[test]
    fn parse_timestamp_naive_isoformat() {
        let ts = parse_timestamp("2024-01-15T12:00:00.123456").unwrap();
        assert_eq!(ts.timestamp(), 1_705_320_000);
    }

    #[test]
    fn parse_timestamp_unix_seconds_and_millis() {
        let secs = parse_timestamp("1705320000").unwrap();
        let millis = parse_timestamp("1705320000000").unwrap();
        assert_eq!(secs, millis);
    }

    #[test]
    fn parse_timestamp_garbage_is_none() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn event_display_without_timestamp() {
        let event = HoneypotEvent::new(EventSource::WebLogin, "PAGE_VISIT").with_actor("9.9.9.9");
        let display = event.to_string();
        assert!(display.contains("[-]"));
        assert!(display.contains("PAGE_VISIT"));
        assert!(display.contains("9.9.9.9"));
    }

    #[test]
    fn events_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<HoneypotEvent>();
    }
}
