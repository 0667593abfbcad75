//! 집계 엔진 -- 이벤트 시퀀스를 차원별 빈도 테이블로 접기
//!
//! [`AggregationPlan`]은 어떤 이벤트 필드를 어떤 이름의 테이블에 셀지 정의합니다.
//! [`Aggregator`]는 한 번의 분석 실행 동안만 존재하며, 전역 상태를 두지 않습니다.
//!
//! # 사용 예시
//! ```
//! use deceptinet_core::event::{EventSource, HoneypotEvent};
//! use deceptinet_log_pipeline::aggregate::{AggregationPlan, aggregate};
//!
//! let events = vec![
//!     HoneypotEvent::new(EventSource::WebLogin, "LOGIN_ATTEMPT")
//!         .with_actor("1.1.1.1")
//!         .with_field("username", "admin"),
//! ];
//! let summary = aggregate(events, &AggregationPlan::web_login(), EventSource::WebLogin);
//! assert_eq!(summary.table("usernames").unwrap().count("admin"), 1);
//! ```

pub mod frequency;

pub use frequency::FrequencyTable;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use deceptinet_core::config::SourceConfig;
use deceptinet_core::event::{EventSource, HoneypotEvent};
use deceptinet_core::types::{Dimension, FieldSelector, SourceKind};
use serde::Serialize;

/// 웹 로그인 시도 이벤트 타입
pub const LOGIN_ATTEMPT: &str = "LOGIN_ATTEMPT";
/// SSH 명령 입력 이벤트 타입
pub const SSH_COMMAND_INPUT: &str = "cowrie.command.input";
/// SSH 로그인 실패 이벤트 타입
pub const SSH_LOGIN_FAILED: &str = "cowrie.login.failed";
/// SSH 로그인 성공 이벤트 타입
pub const SSH_LOGIN_SUCCESS: &str = "cowrie.login.success";

/// 요약 맨 위에 따로 보여줄 이벤트 타입 카운트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    /// 표시 레이블 (예: "Total login attempts")
    pub label: String,
    /// 셀 이벤트 타입
    pub event_type: String,
}

/// 집계 계획 -- 차원 목록과 세션 필드
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationPlan {
    /// 집계 차원 (리포트 출력 순서)
    pub dimensions: Vec<Dimension>,
    /// 고유 세션을 셀 필드 이름
    pub session_field: Option<String>,
    pub headline: Option<Headline>,
}

impl AggregationPlan {
    pub fn new(dimensions: Vec<Dimension>) -> Self {
        Self {
            dimensions,
            session_field: None,
            headline: None,
        }
    }

    pub fn with_session_field(mut self, field: impl Into<String>) -> Self {
        self.session_field = Some(field.into());
        self
    }

    pub fn with_headline(mut self, label: impl Into<String>, event_type: impl Into<String>) -> Self {
        self.headline = Some(Headline {
            label: label.into(),
            event_type: event_type.into(),
        });
        self
    }

    /// 웹 로그인 디코이 기본 계획
    pub fn web_login() -> Self {
        Self::new(vec![
            Dimension::new("event_types", FieldSelector::EventType).title("Event types"),
            Dimension::new("ips", FieldSelector::ActorIp)
                .title("Top attacking IPs")
                .only(&[LOGIN_ATTEMPT]),
            Dimension::new("usernames", FieldSelector::field("username"))
                .title("Top usernames tried")
                .only(&[LOGIN_ATTEMPT])
                .quoted()
                .hide_empty(),
            Dimension::new("passwords", FieldSelector::field("password"))
                .title("Top passwords tried")
                .only(&[LOGIN_ATTEMPT])
                .quoted()
                .hide_empty(),
            Dimension::new("user_agents", FieldSelector::field("user_agent"))
                .title("Top user agents")
                .only(&[LOGIN_ATTEMPT])
                .missing_as("unknown")
                .top_n(5)
                .truncate(80),
        ])
        .with_headline("Total login attempts", LOGIN_ATTEMPT)
    }

    /// SSH 세션 디코이 기본 계획
    pub fn ssh_session() -> Self {
        let logins = [SSH_LOGIN_FAILED, SSH_LOGIN_SUCCESS];
        Self::new(vec![
            Dimension::new("ips", FieldSelector::field("src_ip"))
                .title("Top attacking IPs")
                .skip_absent()
                .hide_empty(),
            Dimension::new("commands", FieldSelector::field("input"))
                .title("Top commands executed")
                .only(&[SSH_COMMAND_INPUT])
                .top_n(15)
                .quoted()
                .hide_empty(),
            Dimension::new("usernames", FieldSelector::field("username"))
                .title("Top usernames tried")
                .only(&logins)
                .quoted()
                .hide_empty(),
            Dimension::new("passwords", FieldSelector::field("password"))
                .title("Top passwords tried")
                .only(&logins)
                .quoted()
                .hide_empty(),
        ])
        .with_session_field("session")
    }

    /// 어댑터 종류별 기본 계획. 목록 소스는 빈 계획입니다.
    pub fn for_kind(kind: SourceKind) -> Self {
        match kind {
            SourceKind::WebLogin => Self::web_login(),
            SourceKind::SshSession => Self::ssh_session(),
            SourceKind::MalwareListing => Self::default(),
        }
    }

    /// 소스 설정의 계획. `dimensions`를 지정하지 않았으면 기본 계획입니다.
    pub fn from_source(source: &SourceConfig) -> Self {
        match &source.dimensions {
            Some(dimensions) => Self {
                dimensions: dimensions.clone(),
                session_field: source.session_field.clone(),
                headline: None,
            },
            None => Self::for_kind(source.kind),
        }
    }

    /// 이름으로 차원 조회
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }
}

/// 소스 하나의 집계 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub source: EventSource,
    /// 전체 이벤트 수
    pub total_events: u64,
    /// 고유 세션 ID
    pub sessions: BTreeSet<String>,
    /// 차원 이름 → 빈도 테이블
    pub tables: BTreeMap<String, FrequencyTable>,
    /// 가장 이른 이벤트 시각
    pub first_seen: Option<DateTime<Utc>>,
    /// 가장 늦은 이벤트 시각
    pub last_seen: Option<DateTime<Utc>>,
    /// 파싱 실패로 건너뛴 라인 수
    pub malformed_lines: u64,
    /// 계획의 헤드라인 이벤트 타입과 일치한 이벤트 수
    pub headline_events: u64,
}

impl SourceSummary {
    pub fn new(source: EventSource) -> Self {
        Self {
            source,
            total_events: 0,
            sessions: BTreeSet::new(),
            tables: BTreeMap::new(),
            first_seen: None,
            last_seen: None,
            malformed_lines: 0,
            headline_events: 0,
        }
    }

    pub fn table(&self, name: &str) -> Option<&FrequencyTable> {
        self.tables.get(name)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// 이벤트를 하나씩 접어 [`SourceSummary`]를 만드는 집계기
pub struct Aggregator<'p> {
    plan: &'p AggregationPlan,
    summary: SourceSummary,
}

impl<'p> Aggregator<'p> {
    pub fn new(plan: &'p AggregationPlan, source: EventSource) -> Self {
        let mut summary = SourceSummary::new(source);
        // 이벤트가 없어도 모든 차원이 결과에 나타나도록 미리 생성
        for dim in &plan.dimensions {
            summary.tables.entry(dim.name.clone()).or_default();
        }
        Self { plan, summary }
    }

    /// 이벤트 하나를 반영합니다.
    pub fn fold(&mut self, event: &HoneypotEvent) {
        self.summary.total_events += 1;
        if self
            .plan
            .headline
            .as_ref()
            .is_some_and(|h| h.event_type == event.event_type)
        {
            self.summary.headline_events += 1;
        }

        for dim in &self.plan.dimensions {
            if let Some(key) = dim.extract(event) {
                self.summary
                    .tables
                    .entry(dim.name.clone())
                    .or_default()
                    .increment(key);
            }
        }

        if let Some(field) = &self.plan.session_field {
            let session = event.field(field);
            if !session.is_empty() && !self.summary.sessions.contains(session) {
                self.summary.sessions.insert(session.to_owned());
            }
        }

        if let Some(ts) = event.timestamp {
            self.summary.first_seen = Some(self.summary.first_seen.map_or(ts, |cur| cur.min(ts)));
            self.summary.last_seen = Some(self.summary.last_seen.map_or(ts, |cur| cur.max(ts)));
        }
    }

    pub fn finish(self) -> SourceSummary {
        self.summary
    }
}

/// 이벤트 시퀀스 전체를 집계합니다.
pub fn aggregate<I>(events: I, plan: &AggregationPlan, source: EventSource) -> SourceSummary
where
    I: IntoIterator<Item = HoneypotEvent>,
{
    let mut aggregator = Aggregator::new(plan, source);
    for event in events {
        aggregator.fold(&event);
    }
    aggregator.finish()
}

/// 실패할 수 있는 이벤트 시퀀스를 집계합니다.
///
/// 첫 에러에서 중단합니다. 끝까지 읽지 못한 소스는 요약으로 보고하지 않습니다.
pub fn try_aggregate<I, E>(
    events: I,
    plan: &AggregationPlan,
    source: EventSource,
) -> Result<SourceSummary, E>
where
    I: IntoIterator<Item = Result<HoneypotEvent, E>>,
{
    let mut aggregator = Aggregator::new(plan, source);
    for event in events {
        aggregator.fold(&event?);
    }
    Ok(aggregator.finish())
}
