//! 리포트 생성기 -- 소스별 스캔/집계를 구동하고 리포트 문서를 조립
//!
//! 소스별 스캔은 서로 독립적이므로 `spawn_blocking` 태스크로 동시에 실행하고,
//! 결과는 설정 순서대로 모읍니다. 한 소스의 실패는 해당 섹션에만 기록되고
//! 나머지 소스는 계속 진행됩니다.
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() {
//! use deceptinet_core::config::DeceptinetConfig;
//! use deceptinet_log_pipeline::ReportGenerator;
//!
//! let generator = ReportGenerator::new(DeceptinetConfig::default());
//! let report = generator.run().await;
//! for section in &report.sections {
//!     println!("{}: {}", section.name, section.outcome.label());
//! }
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use deceptinet_core::config::{DeceptinetConfig, ReportConfig, SourceConfig};
use deceptinet_core::metrics as m;
use deceptinet_core::types::SourceKind;
use serde::Serialize;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::adapter::{Inventory, SourceAdapter, SourceScan};
use crate::aggregate::{AggregationPlan, SourceSummary, try_aggregate};
use crate::error::LogPipelineError;
use crate::fleet::FleetStatus;

/// 표시용 말줄임 접미사
const ELLIPSIS: &str = "...";

/// 분석 리포트 문서
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// 실행 ID
    pub run_id: Uuid,
    /// 생성 시각
    pub generated_at: DateTime<Utc>,
    /// 플릿 상태
    pub fleet: FleetStatus,
    /// 설정 순서대로의 소스별 섹션
    pub sections: Vec<SourceSection>,
}

impl AnalysisReport {
    /// 이름으로 섹션 조회
    pub fn section(&self, name: &str) -> Option<&SourceSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// 실패한 섹션 수
    pub fn failed_sections(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| matches!(s.outcome, SectionOutcome::Failed { .. }))
            .count()
    }
}

/// 소스 하나의 리포트 섹션
#[derive(Debug, Clone, Serialize)]
pub struct SourceSection {
    pub name: String,
    pub kind: SourceKind,
    /// 스캔한 경로
    pub path: PathBuf,
    pub outcome: SectionOutcome,
}

/// 섹션 결과
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutcome {
    /// 이벤트 집계 요약
    Summary(SummaryView),
    /// 파일 목록 (이벤트 없음)
    Inventory {
        inventory: Inventory,
        /// 출력할 최대 파일 수
        limit: usize,
    },
    /// 소스 없음 (활동 없음)
    Missing,
    /// 소스 읽기 실패
    Failed { error: String },
}

impl SectionOutcome {
    /// 로그/메트릭 레이블
    pub fn label(&self) -> &'static str {
        match self {
            Self::Summary(_) => "summary",
            Self::Inventory { .. } => "inventory",
            Self::Missing => "missing",
            Self::Failed { .. } => "failed",
        }
    }
}

/// 집계 요약의 표시용 뷰
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryView {
    /// 계획에 헤드라인이 있으면 해당 이벤트 타입 카운트
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<HeadlineCount>,
    pub total_events: u64,
    pub malformed_lines: u64,
    /// 고유 세션 수 (세션 필드가 있는 소스만)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions: Option<usize>,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
    /// 계획 순서대로의 차원별 순위
    pub dimensions: Vec<RankedDimension>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadlineCount {
    pub label: String,
    pub count: u64,
}

/// 차원 하나의 상위 N 순위
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedDimension {
    pub name: String,
    pub title: String,
    /// 공백이 아닌 고유 키 수
    pub unique: usize,
    /// 표시할 때 따옴표로 감쌀지 여부
    pub quoted: bool,
    pub entries: Vec<RankedEntry>,
}

/// 순위 항목 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    /// 집계된 원래 키
    pub key: String,
    /// 표시용 (잘린) 키
    pub display: String,
    pub count: u64,
}

impl SummaryView {
    /// 집계 결과와 계획으로 표시용 뷰를 만듭니다.
    ///
    /// 상위 N개를 고른 뒤 `hide_empty` 차원의 빈 키를 뺍니다.
    pub fn build(summary: &SourceSummary, plan: &AggregationPlan, default_top_n: usize) -> Self {
        let dimensions = plan
            .dimensions
            .iter()
            .map(|dim| {
                let table = summary.table(&dim.name);
                let entries = table
                    .map(|t| t.top_n(dim.top_n.unwrap_or(default_top_n)))
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|(key, _)| !(dim.hide_empty && key.trim().is_empty()))
                    .map(|(key, count)| RankedEntry {
                        display: truncate_display(&key, dim.truncate),
                        key,
                        count,
                    })
                    .collect();

                RankedDimension {
                    name: dim.name.clone(),
                    title: if dim.title.is_empty() {
                        dim.name.clone()
                    } else {
                        dim.title.clone()
                    },
                    unique: table.map_or(0, |t| t.distinct_non_empty()),
                    quoted: dim.quoted,
                    entries,
                }
            })
            .collect();

        Self {
            headline: plan.headline.as_ref().map(|h| HeadlineCount {
                label: h.label.clone(),
                count: summary.headline_events,
            }),
            total_events: summary.total_events,
            malformed_lines: summary.malformed_lines,
            sessions: plan.session_field.as_ref().map(|_| summary.session_count()),
            first_seen: summary.first_seen,
            last_seen: summary.last_seen,
            dimensions,
        }
    }

    /// 이름으로 차원 조회
    pub fn dimension(&self, name: &str) -> Option<&RankedDimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }
}

/// 표시용으로 `width`자를 넘는 값을 잘라 `...`를 붙입니다.
pub fn truncate_display(value: &str, width: Option<usize>) -> String {
    match width {
        Some(width) if value.chars().count() > width => {
            let mut truncated: String = value.chars().take(width).collect();
            truncated.push_str(ELLIPSIS);
            truncated
        }
        _ => value.to_owned(),
    }
}

/// 리포트 생성기
pub struct ReportGenerator {
    config: Arc<DeceptinetConfig>,
}

impl ReportGenerator {
    pub fn new(config: DeceptinetConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &DeceptinetConfig {
        &self.config
    }

    /// 전체 분석을 실행합니다.
    ///
    /// 활성화된 모든 소스가 설정 순서대로 섹션에 나타납니다.
    pub async fn run(&self) -> AnalysisReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", %run_id);

        async move {
            let started = Instant::now();
            let report_config = self.config.report.clone();
            info!(log_dir = %report_config.log_dir.display(), "analysis started");

            let handles: Vec<_> = self
                .config
                .sources
                .iter()
                .filter(|source| source.enabled)
                .cloned()
                .map(|source| {
                    let report_config = report_config.clone();
                    let scan_source_config = source.clone();
                    let handle = tokio::task::spawn_blocking(move || {
                        scan_source(&scan_source_config, &report_config)
                    });
                    (source, handle)
                })
                .collect();

            let fleet = self.status().await;

            let mut sections = Vec::with_capacity(handles.len());
            for (source, handle) in handles {
                let section = match handle.await {
                    Ok(section) => section,
                    Err(e) => {
                        warn!(source = %source.name, error = %e, "scan task failed");
                        failed_section(
                            &source,
                            &report_config,
                            LogPipelineError::Task(e.to_string()),
                        )
                    }
                };
                sections.push(section);
            }

            let report = AnalysisReport {
                run_id,
                generated_at: Utc::now(),
                fleet,
                sections,
            };
            info!(
                sections = report.sections.len(),
                failed = report.failed_sections(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "analysis complete"
            );
            report
        }
        .instrument(span)
        .await
    }

    /// 플릿 상태만 조사합니다.
    pub async fn status(&self) -> FleetStatus {
        let config = Arc::clone(&self.config);
        match tokio::task::spawn_blocking(move || FleetStatus::probe(&config)).await {
            Ok(fleet) => fleet,
            Err(e) => {
                warn!(error = %e, "fleet probe task failed");
                FleetStatus {
                    log_dir: self.config.report.log_dir.clone(),
                    total_log_files: 0,
                    sources: Vec::new(),
                }
            }
        }
    }
}

/// 소스 하나를 스캔하고 집계합니다 (동기 I/O).
///
/// `tokio::task::spawn_blocking` 내에서 호출되어야 합니다.
/// 어떤 결과든 섹션으로 변환되며 에러를 돌려주지 않습니다.
pub fn scan_source(source: &SourceConfig, report: &ReportConfig) -> SourceSection {
    let started = Instant::now();
    let path = source.resolve(&report.log_dir);
    let label = source.kind.event_source().as_str();
    debug!(source = %source.name, path = %path.display(), "scanning source");

    let outcome = match scan_outcome(source, report, &path) {
        Ok(outcome) => outcome,
        Err(e) if e.is_missing() => {
            info!(source = %source.name, path = %path.display(), "source not found");
            SectionOutcome::Missing
        }
        Err(e) => {
            warn!(source = %source.name, error = %e, "source scan failed");
            metrics::counter!(m::SOURCE_FAILURES_TOTAL, m::LABEL_SOURCE => label).increment(1);
            SectionOutcome::Failed {
                error: e.to_string(),
            }
        }
    };

    metrics::counter!(m::SOURCE_SCANS_TOTAL, m::LABEL_OUTCOME => outcome.label()).increment(1);
    metrics::histogram!(m::SCAN_DURATION_SECONDS, m::LABEL_SOURCE => label)
        .record(started.elapsed().as_secs_f64());

    SourceSection {
        name: source.name.clone(),
        kind: source.kind,
        path,
        outcome,
    }
}

fn scan_outcome(
    source: &SourceConfig,
    report: &ReportConfig,
    path: &std::path::Path,
) -> Result<SectionOutcome, LogPipelineError> {
    let adapter = SourceAdapter::from_config(source, report.max_line_bytes)?;

    match adapter.open(path)? {
        SourceScan::Events(mut stream) => {
            let plan = AggregationPlan::from_source(source);
            let event_source = source.kind.event_source();
            let mut summary = try_aggregate(&mut stream, &plan, event_source)?;

            let stats = stream.stats();
            summary.malformed_lines = stats.malformed;

            let label = event_source.as_str();
            metrics::counter!(m::EVENTS_TOTAL, m::LABEL_SOURCE => label).increment(stats.events);
            metrics::counter!(m::LINES_MALFORMED_TOTAL, m::LABEL_SOURCE => label)
                .increment(stats.malformed);

            if stats.malformed > 0 {
                warn!(
                    source = %source.name,
                    malformed = stats.malformed,
                    lines = stats.lines_read,
                    "skipped malformed lines"
                );
            }
            info!(
                source = %source.name,
                events = stats.events,
                sessions = summary.session_count(),
                "source aggregated"
            );

            Ok(SectionOutcome::Summary(SummaryView::build(
                &summary,
                &plan,
                report.top_n,
            )))
        }
        SourceScan::Inventory(inventory) => {
            info!(
                source = %source.name,
                files = inventory.total_files,
                "source inventoried"
            );
            Ok(SectionOutcome::Inventory {
                inventory,
                limit: report.listing_limit,
            })
        }
    }
}

fn failed_section(
    source: &SourceConfig,
    report: &ReportConfig,
    error: LogPipelineError,
) -> SourceSection {
    SourceSection {
        name: source.name.clone(),
        kind: source.kind,
        path: source.resolve(&report.log_dir),
        outcome: SectionOutcome::Failed {
            error: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{FrequencyTable, aggregate};
    use deceptinet_core::event::{EventSource, HoneypotEvent};
    use deceptinet_core::types::{Dimension, FieldSelector};
    use std::fs;

    #[test]
    fn truncate_only_long_values() {
        assert_eq!(truncate_display("short", Some(80)), "short");
        assert_eq!(truncate_display("abcdef", Some(3)), "abc...");
        assert_eq!(truncate_display("abcdef", None), "abcdef");
        // 문자 단위로 자름
        assert_eq!(truncate_display("가나다라", Some(2)), "가나...");
    }

    #[test]
    fn summary_view_hides_empty_after_ranking_and_keeps_raw_key() {
        let long_ua = "Mozilla/5.0 ".repeat(10);
        let events = vec![
            HoneypotEvent::new(EventSource::WebLogin, "LOGIN_ATTEMPT")
                .with_field("user_agent", long_ua.clone()),
            HoneypotEvent::new(EventSource::WebLogin, "LOGIN_ATTEMPT")
                .with_field("username", "admin"),
        ];
        let plan = AggregationPlan::web_login();
        let summary = aggregate(events, &plan, EventSource::WebLogin);
        let view = SummaryView::build(&summary, &plan, 10);

        let users = view.dimension("usernames").unwrap();
        assert_eq!(users.entries.len(), 1);
        assert_eq!(users.entries[0].key, "admin");
        assert_eq!(users.unique, 1);
        assert!(users.quoted);

        let agents = view.dimension("user_agents").unwrap();
        let long = agents.entries.iter().find(|e| e.key == long_ua).unwrap();
        assert_eq!(long.display.chars().count(), 83);
        assert!(long.display.ends_with("..."));
        assert!(agents.entries.iter().any(|e| e.key == "unknown"));
        assert!(view.sessions.is_none());
    }

    #[test]
    fn summary_view_uses_default_and_per_dimension_top_n() {
        let mut summary = SourceSummary::new(EventSource::SshSession);
        let mut ips = FrequencyTable::new();
        let mut commands = FrequencyTable::new();
        for i in 0..30 {
            ips.increment(&format!("10.0.0.{i}"));
            commands.increment(&format!("cmd{i}"));
        }
        summary.tables.insert("ips".to_owned(), ips);
        summary.tables.insert("commands".to_owned(), commands);

        let plan = AggregationPlan::ssh_session();
        let view = SummaryView::build(&summary, &plan, 10);
        assert_eq!(view.dimension("ips").unwrap().entries.len(), 10);
        assert_eq!(view.dimension("commands").unwrap().entries.len(), 15);
        assert_eq!(view.sessions, Some(0));
    }

    #[test]
    fn ssh_lines_without_src_ip_do_not_crowd_out_real_ips() {
        use crate::adapter::SshSessionDecoder;
        use deceptinet_core::pipeline::EventDecoder;

        let mut lines = Vec::new();
        for _ in 0..5 {
            lines.push(r#"{"eventid":"cowrie.log.closed","session":"s1"}"#.to_owned());
        }
        for i in 0..12 {
            lines.push(format!(
                r#"{{"eventid":"cowrie.session.connect","src_ip":"10.0.0.{i}","session":"s{i}"}}"#
            ));
        }
        let events = lines
            .iter()
            .map(|line| SshSessionDecoder.decode(line).unwrap());

        let plan = AggregationPlan::ssh_session();
        let summary = aggregate(events, &plan, EventSource::SshSession);
        let ips = summary.table("ips").unwrap();
        assert_eq!(ips.count(""), 0);
        assert_eq!(ips.total(), 12);

        let view = SummaryView::build(&summary, &plan, 10);
        let shown = view.dimension("ips").unwrap();
        assert_eq!(shown.entries.len(), 10);
        assert_eq!(shown.unique, 12);
        assert_eq!(summary.total_events, 17);
    }

    #[test]
    fn empty_title_falls_back_to_name() {
        let mut dim = Dimension::new("paths", FieldSelector::field("path"));
        dim.title = String::new();
        let plan = AggregationPlan::new(vec![dim]);
        let summary = aggregate(Vec::new(), &plan, EventSource::WebLogin);
        let view = SummaryView::build(&summary, &plan, 10);
        assert_eq!(view.dimensions[0].title, "paths");
    }

    #[test]
    fn scan_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = ReportConfig {
            log_dir: dir.path().to_path_buf(),
            ..ReportConfig::default()
        };
        let source = SourceConfig::new("Cowrie SSH", SourceKind::SshSession, "cowrie/cowrie.json");
        let section = scan_source(&source, &report);
        assert!(matches!(section.outcome, SectionOutcome::Missing));
        assert_eq!(section.path, dir.path().join("cowrie/cowrie.json"));
    }

    #[test]
    fn scan_source_counts_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("cowrie")).unwrap();
        fs::write(
            dir.path().join("cowrie/cowrie.json"),
            "{\"session\":\"s1\",\"src_ip\":\"1.1.1.1\"}\n<<garbage>>\n{\"session\":\"s2\"}\n",
        )
        .unwrap();
        let report = ReportConfig {
            log_dir: dir.path().to_path_buf(),
            ..ReportConfig::default()
        };
        let source = SourceConfig::new("Cowrie SSH", SourceKind::SshSession, "cowrie/cowrie.json");

        let SectionOutcome::Summary(view) = scan_source(&source, &report).outcome else {
            panic!("expected summary");
        };
        assert_eq!(view.total_events, 2);
        assert_eq!(view.malformed_lines, 1);
        assert_eq!(view.sessions, Some(2));
    }

    #[tokio::test]
    async fn run_keeps_config_order_and_all_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("dionaea")).unwrap();
        fs::write(dir.path().join("dionaea/dionaea.log"), b"x").unwrap();

        let mut config = DeceptinetConfig::default();
        config.report.log_dir = dir.path().to_path_buf();

        let report = ReportGenerator::new(config).run().await;
        let names: Vec<_> = report.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Flask Web", "Cowrie SSH", "Dionaea Malware"]);
        assert!(matches!(report.sections[0].outcome, SectionOutcome::Missing));
        assert!(matches!(report.sections[1].outcome, SectionOutcome::Missing));
        assert!(matches!(
            report.sections[2].outcome,
            SectionOutcome::Inventory { limit: 5, .. }
        ));
        assert_eq!(report.fleet.active_sources().collect::<Vec<_>>(), vec!["Dionaea Malware"]);
        assert_eq!(report.failed_sections(), 0);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(SectionOutcome::Missing).unwrap();
        assert_eq!(json["status"], "missing");
        let json = serde_json::to_value(SectionOutcome::Failed {
            error: "boom".to_owned(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");
    }
}
