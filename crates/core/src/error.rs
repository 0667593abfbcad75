//! 에러 타입 -- 도메인별 에러 정의
//!
//! 어댑터 경계의 에러 분류는 세 가지입니다.
//! - [`SourceError::Missing`]: 소스 파일/디렉토리 없음 (활동 없음으로 보고)
//! - [`ParseError`]: 라인 단위 파싱 실패 (복구 가능, 집계만 됨)
//! - [`SourceError::Unreadable`]: 권한/I/O 실패 (해당 소스만 실패 처리)

/// DeceptiNet 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum DeceptinetError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로그 소스 에러
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 로그 소스 단위 에러
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// 소스 경로가 존재하지 않음
    #[error("source not found: {path}")]
    Missing { path: String },

    /// 소스를 읽을 수 없음 (권한, I/O 실패)
    #[error("source unreadable: {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// 라인 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 형식이 잘못된 라인
    #[error("malformed {format} line: {reason}")]
    Malformed { format: String, reason: String },

    /// 입력 데이터 초과
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}
