//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않으면 호출은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `deceptinet_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(deceptinet_core::metrics::EVENTS_TOTAL, "source" => "web_login").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 소스 레이블 키 (web_login, ssh_session, malware_capture)
pub const LABEL_SOURCE: &str = "source";

/// 결과 레이블 키 (summary, inventory, missing, failed)
pub const LABEL_OUTCOME: &str = "outcome";

// ─── 파이프라인 메트릭 ─────────────────────────────────────────────

/// 정규화된 이벤트 수 (counter, label: source)
pub const EVENTS_TOTAL: &str = "deceptinet_events_total";

/// 파싱 실패로 건너뛴 라인 수 (counter, label: source)
pub const LINES_MALFORMED_TOTAL: &str = "deceptinet_lines_malformed_total";

/// 읽기 실패한 소스 수 (counter, label: source)
pub const SOURCE_FAILURES_TOTAL: &str = "deceptinet_source_failures_total";

/// 소스 스캔 완료 수 (counter, label: outcome)
pub const SOURCE_SCANS_TOTAL: &str = "deceptinet_source_scans_total";

/// 소스 하나의 스캔+집계 소요 시간 (histogram, 초, label: source)
pub const SCAN_DURATION_SECONDS: &str = "deceptinet_scan_duration_seconds";

/// 모든 메트릭 이름 목록
pub const ALL_METRIC_NAMES: &[&str] = &[
    EVENTS_TOTAL,
    LINES_MALFORMED_TOTAL,
    SOURCE_FAILURES_TOTAL,
    SOURCE_SCANS_TOTAL,
    SCAN_DURATION_SECONDS,
];

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 후 한 번 호출합니다. 레코더가 없어도 패닉하지 않습니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(EVENTS_TOTAL, "Total canonical events produced by adapters");
    describe_counter!(
        LINES_MALFORMED_TOTAL,
        "Total log lines skipped because they could not be decoded"
    );
    describe_counter!(
        SOURCE_FAILURES_TOTAL,
        "Total sources that failed with an unreadable error"
    );
    describe_counter!(SOURCE_SCANS_TOTAL, "Total source scans by outcome");
    describe_histogram!(
        SCAN_DURATION_SECONDS,
        "Time spent scanning and aggregating one source (seconds)"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_metrics_start_with_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("deceptinet_"),
                "Metric '{}' does not start with 'deceptinet_' prefix",
                name
            );
        }
    }

    #[test]
    fn metric_names_are_unique() {
        let mut names: Vec<_> = ALL_METRIC_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL_METRIC_NAMES.len());
    }

    #[test]
    fn describe_all_does_not_panic() {
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        for label in [LABEL_SOURCE, LABEL_OUTCOME] {
            assert_eq!(label.to_lowercase(), label);
        }
    }
}
