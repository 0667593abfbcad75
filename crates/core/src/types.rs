//! 도메인 타입 -- 설정과 파이프라인이 공유하는 공통 타입

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::{EventSource, HoneypotEvent};

/// 로그 소스 어댑터 종류
///
/// 허니팟별로 다른 로그 스키마를 닫힌 집합으로 표현합니다.
/// 설정의 `kind` 값으로 선택되며, 런타임 타입 검사로 고르지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `event_type` + `data` 구조의 JSON Lines (웹 디코이)
    WebLogin,
    /// 스키마가 고정되지 않은 세션/명령 JSON Lines (SSH 디코이)
    SshSession,
    /// 파싱하지 않고 파일 목록만 보고 (악성코드 디코이)
    MalwareListing,
}

impl SourceKind {
    /// 문자열에서 어댑터 종류를 파싱합니다. 대소문자와 `-`/`_`를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "web_login" | "web" | "flask" => Some(Self::WebLogin),
            "ssh_session" | "ssh" | "cowrie" => Some(Self::SshSession),
            "malware_listing" | "malware" | "dionaea" => Some(Self::MalwareListing),
            _ => None,
        }
    }

    /// 이 어댑터가 생성하는 이벤트의 소스
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::WebLogin => EventSource::WebLogin,
            Self::SshSession => EventSource::SshSession,
            Self::MalwareListing => EventSource::MalwareCapture,
        }
    }

    /// 파일 목록만 보고하는 모드인지 여부
    pub fn is_inventory_only(&self) -> bool {
        matches!(self, Self::MalwareListing)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WebLogin => write!(f, "web_login"),
            Self::SshSession => write!(f, "ssh_session"),
            Self::MalwareListing => write!(f, "malware_listing"),
        }
    }
}

/// 이벤트에서 집계 키를 꺼내는 선택자
///
/// 설정 파일에서는 문자열로 표기합니다: `actor_ip`, `event_type`, `fields.<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldSelector {
    /// [`HoneypotEvent::actor_ip`]
    ActorIp,
    /// [`HoneypotEvent::event_type`]
    EventType,
    /// [`HoneypotEvent::fields`]의 키
    Field(String),
}

impl FieldSelector {
    /// 편의 생성자
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// 이벤트에서 값을 선택합니다. 없는 필드는 `""`입니다.
    pub fn select<'a>(&self, event: &'a HoneypotEvent) -> &'a str {
        match self {
            Self::ActorIp => &event.actor_ip,
            Self::EventType => &event.event_type,
            Self::Field(name) => event.field(name),
        }
    }

    /// 이벤트에 선택 대상 값이 존재하는지 여부
    ///
    /// `actor_ip`와 `event_type`은 항상 존재합니다. 필드는 키가 있어야 하며,
    /// 값이 빈 문자열이어도 존재로 봅니다.
    pub fn is_present(&self, event: &HoneypotEvent) -> bool {
        match self {
            Self::ActorIp | Self::EventType => true,
            Self::Field(name) => event.fields.contains(name),
        }
    }
}

impl TryFrom<String> for FieldSelector {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "actor_ip" => Ok(Self::ActorIp),
            "event_type" => Ok(Self::EventType),
            other => match other.strip_prefix("fields.") {
                Some(name) if !name.is_empty() => Ok(Self::Field(name.to_owned())),
                _ => Err(format!(
                    "invalid selector '{other}' (expected actor_ip, event_type or fields.<name>)"
                )),
            },
        }
    }
}

impl From<FieldSelector> for String {
    fn from(selector: FieldSelector) -> Self {
        selector.to_string()
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActorIp => write!(f, "actor_ip"),
            Self::EventType => write!(f, "event_type"),
            Self::Field(name) => write!(f, "fields.{name}"),
        }
    }
}

/// 집계 차원 -- 이벤트 필드 하나를 이름 붙은 빈도 테이블에 매핑합니다.
///
/// 집계 관련 항목(`selector`, `event_types`, `missing_as`)과
/// 표시 관련 항목(`title`, `top_n`, `truncate`, `quoted`, `hide_empty`)을 함께 담습니다.
/// 표시 항목은 집계 결과에 영향을 주지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    /// 테이블 이름 (예: "ips", "usernames")
    pub name: String,
    /// 리포트 제목
    #[serde(default)]
    pub title: String,
    /// 값 선택자
    pub selector: FieldSelector,
    /// 비어 있지 않으면 이 타입의 이벤트만 집계
    #[serde(default)]
    pub event_types: Vec<String>,
    /// 추출 값이 비었을 때 대신 기록할 키
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_as: Option<String>,
    /// 상위 N개 (없으면 리포트 기본값)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
    /// 표시할 때 자를 최대 글자 수
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncate: Option<usize>,
    /// 표시할 때 키를 따옴표로 감쌀지 여부
    #[serde(default)]
    pub quoted: bool,
    /// 표시할 때 빈(공백뿐인) 키를 숨길지 여부
    #[serde(default)]
    pub hide_empty: bool,
    /// 선택 대상 필드가 없는 이벤트는 집계하지 않음 (빈 값은 집계)
    #[serde(default)]
    pub skip_absent: bool,
}

impl Dimension {
    pub fn new(name: impl Into<String>, selector: FieldSelector) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            selector,
            event_types: Vec::new(),
            missing_as: None,
            top_n: None,
            truncate: None,
            quoted: false,
            hide_empty: false,
            skip_absent: false,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// 특정 이벤트 타입으로 집계 대상을 제한합니다.
    pub fn only(mut self, event_types: &[&str]) -> Self {
        self.event_types = event_types.iter().map(|t| (*t).to_owned()).collect();
        self
    }

    pub fn missing_as(mut self, key: impl Into<String>) -> Self {
        self.missing_as = Some(key.into());
        self
    }

    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    pub fn truncate(mut self, width: usize) -> Self {
        self.truncate = Some(width);
        self
    }

    pub fn quoted(mut self) -> Self {
        self.quoted = true;
        self
    }

    pub fn hide_empty(mut self) -> Self {
        self.hide_empty = true;
        self
    }

    pub fn skip_absent(mut self) -> Self {
        self.skip_absent = true;
        self
    }

    /// 이 차원이 해당 이벤트를 집계하는지 여부
    pub fn applies_to(&self, event: &HoneypotEvent) -> bool {
        let type_matches = self.event_types.is_empty()
            || self.event_types.iter().any(|t| *t == event.event_type);
        type_matches && (!self.skip_absent || self.selector.is_present(event))
    }

    /// 이벤트에서 집계 키를 추출합니다.
    ///
    /// 대상이 아닌 이벤트면 `None`. 빈 값은 `missing_as`가 있으면 그 값으로,
    /// 없으면 빈 문자열 키로 기록됩니다 (버리지 않음).
    pub fn extract<'a>(&'a self, event: &'a HoneypotEvent) -> Option<&'a str> {
        if !self.applies_to(event) {
            return None;
        }
        let value = self.selector.select(event);
        match (&self.missing_as, value.is_empty()) {
            (Some(fallback), true) => Some(fallback.as_str()),
            _ => Some(value),
        }
    }
}
