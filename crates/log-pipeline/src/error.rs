//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 어댑터, 집계, 리포트 생성 중 발생하는 에러를 표현합니다.
//! `From<LogPipelineError> for DeceptinetError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 어댑터 경계 밖으로는 원시 I/O 에러가 나가지 않습니다.
//! 파일이 없으면 [`SourceMissing`](LogPipelineError::SourceMissing),
//! 그 외 I/O 실패는 [`SourceUnreadable`](LogPipelineError::SourceUnreadable)로 변환됩니다.

use std::io;
use std::path::Path;

use deceptinet_core::error::{ConfigError, DeceptinetError, ParseError, SourceError};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 라인 디코딩 실패 (복구 가능, 집계만 됨)
    #[error("decode error: {format}: {reason}")]
    Decode {
        /// 디코더 형식 (web_login, ssh_session)
        format: String,
        /// 실패 사유
        reason: String,
    },

    /// 소스 경로 없음 (활동 없음으로 보고)
    #[error("source not found: {path}")]
    SourceMissing {
        /// 소스 경로
        path: String,
    },

    /// 소스를 읽을 수 없음 (권한, I/O 실패)
    #[error("source unreadable: {path}: {reason}")]
    SourceUnreadable {
        /// 소스 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 스캔 태스크 실패 (패닉, 취소)
    #[error("scan task failed: {0}")]
    Task(String),
}

impl LogPipelineError {
    /// 어댑터 경계에서 I/O 에러를 분류합니다.
    ///
    /// `NotFound`는 [`SourceMissing`](Self::SourceMissing), 나머지는
    /// [`SourceUnreadable`](Self::SourceUnreadable)입니다.
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::SourceMissing {
                path: path.display().to_string(),
            }
        } else {
            Self::SourceUnreadable {
                path: path.display().to_string(),
                reason: err.to_string(),
            }
        }
    }

    /// 소스 없음 여부
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::SourceMissing { .. })
    }
}

impl From<LogPipelineError> for DeceptinetError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::Decode { format, reason } => {
                DeceptinetError::Parse(ParseError::Malformed { format, reason })
            }
            LogPipelineError::SourceMissing { path } => {
                DeceptinetError::Source(SourceError::Missing { path })
            }
            LogPipelineError::SourceUnreadable { path, reason } => {
                DeceptinetError::Source(SourceError::Unreadable { path, reason })
            }
            LogPipelineError::Config { field, reason } => {
                DeceptinetError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogPipelineError::Task(reason) => DeceptinetError::Io(io::Error::other(reason)),
        }
    }
}
