//! # deceptinet-log-pipeline
//!
//! 허니팟 로그를 정규화된 이벤트로 읽고, 차원별 빈도를 집계해 리포트 문서를 만듭니다.
//!
//! # 모듈 구성
//!
//! - [`adapter`]: 허니팟별 로그 소스 어댑터 (웹 로그인, SSH 세션, 악성코드 파일 목록)
//! - [`aggregate`]: 빈도 테이블과 집계 계획/집계기
//! - [`fleet`]: 로그 루트의 파일 수와 허니팟별 활성 여부
//! - [`report`]: 소스별 스캔 구동 및 리포트 문서 조립
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! ReportGenerator -> SourceAdapter -> EventStream -> Aggregator -> SummaryView
//!        |               |                |              |
//!   spawn_blocking   kind별 선택     라인 순서/제한    FrequencyTable
//!        |
//!   FleetStatus (walkdir)
//! ```

pub mod adapter;
pub mod aggregate;
pub mod error;
pub mod fleet;
pub mod report;

// --- 주요 타입 re-export ---

// 어댑터
pub use adapter::{
    EventStream, Inventory, InventoryEntry, ScanStats, SourceAdapter, SourceScan,
    SshSessionDecoder, WebLoginDecoder,
};

// 집계
pub use aggregate::{
    AggregationPlan, Aggregator, FrequencyTable, Headline, SourceSummary, aggregate,
    try_aggregate,
};

// 에러
pub use error::LogPipelineError;

// 플릿 상태
pub use fleet::{FleetStatus, SourcePresence};

// 리포트
pub use report::{
    AnalysisReport, HeadlineCount, RankedDimension, RankedEntry, ReportGenerator, SectionOutcome,
    SourceSection, SummaryView,
};
