//! DeceptiNet 공통 크레이트
//!
//! 허니팟 로그 분석 파이프라인의 모든 크레이트가 공유하는
//! 이벤트 모델, 에러 타입, 설정, 확장 trait을 정의합니다.
//!
//! # 모듈 구성
//!
//! - [`event`]: 정규화된 이벤트 모델 ([`HoneypotEvent`])
//! - [`types`]: 어댑터 종류, 집계 차원 등 공통 도메인 타입
//! - [`pipeline`]: 라인 디코더 trait ([`EventDecoder`])
//! - [`config`]: `deceptinet.toml` 설정
//! - [`error`]: 도메인 에러 타입
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod pipeline;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, DeceptinetError, ParseError, SourceError};

// 설정
pub use config::{DeceptinetConfig, GeneralConfig, ReportConfig, SourceConfig};

// 이벤트
pub use event::{EventFields, EventSource, HoneypotEvent, UNKNOWN_ACTOR, parse_timestamp};

// 파이프라인 trait
pub use pipeline::EventDecoder;

// 도메인 타입
pub use types::{Dimension, FieldSelector, SourceKind};
