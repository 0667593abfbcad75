//! 로그 소스 어댑터 -- 허니팟별 로그를 정규화된 이벤트 스트림으로 변환
//!
//! [`SourceAdapter`]는 설정의 [`SourceKind`]로 선택되는 닫힌 집합입니다.
//!
//! | 어댑터 | 입력 | 결과 |
//! |--------|------|------|
//! | `WebLogin` | JSON Lines (`event_type` + `data`) | [`SourceScan::Events`] |
//! | `SshSession` | JSON Lines (고정 스키마 없음) | [`SourceScan::Events`] |
//! | `MalwareListing` | 로그 디렉토리 | [`SourceScan::Inventory`] |
//!
//! 이벤트 스트림은 파일 순서대로 한 번만 소비되는 지연 시퀀스입니다.
//! 다시 스캔하려면 [`SourceAdapter::open`]을 다시 호출합니다.
//!
//! # 사용 예시
//! ```no_run
//! use std::path::Path;
//! use deceptinet_log_pipeline::adapter::{SourceAdapter, SourceScan};
//!
//! let adapter = SourceAdapter::SshSession { max_line_bytes: 64 * 1024 };
//! if let Ok(SourceScan::Events(mut stream)) = adapter.open(Path::new("cowrie/cowrie.json")) {
//!     for event in stream.by_ref().flatten() {
//!         println!("{event}");
//!     }
//!     println!("malformed lines: {}", stream.stats().malformed);
//! }
//! ```

mod json;
pub mod malware_listing;
pub mod reader;
pub mod ssh_session;
pub mod web_login;

pub use malware_listing::{Inventory, InventoryEntry, list_inventory};
pub use reader::{LineReader, RawLine};
pub use ssh_session::SshSessionDecoder;
pub use web_login::WebLoginDecoder;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use deceptinet_core::config::SourceConfig;
use deceptinet_core::error::ParseError;
use deceptinet_core::event::HoneypotEvent;
use deceptinet_core::pipeline::EventDecoder;
use deceptinet_core::types::SourceKind;
use serde::Serialize;
use tracing::debug;

use crate::error::LogPipelineError;

/// 로그 소스 어댑터
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceAdapter {
    /// 웹 로그인 디코이 JSON Lines
    WebLogin {
        /// 라인 최대 길이 (바이트)
        max_line_bytes: usize,
    },
    /// SSH 세션 디코이 JSON Lines
    SshSession {
        /// 라인 최대 길이 (바이트)
        max_line_bytes: usize,
    },
    /// 악성코드 디코이 파일 목록
    MalwareListing {
        /// 파일 접미사 필터
        suffix: String,
    },
}

impl SourceAdapter {
    /// 소스 설정에서 어댑터를 선택합니다.
    pub fn from_config(
        source: &SourceConfig,
        max_line_bytes: usize,
    ) -> Result<Self, LogPipelineError> {
        if source.kind.is_inventory_only() {
            if source.suffix.is_empty() {
                return Err(LogPipelineError::Config {
                    field: "suffix".to_owned(),
                    reason: format!("source '{}' needs a file suffix", source.name),
                });
            }
        } else if max_line_bytes == 0 {
            return Err(LogPipelineError::Config {
                field: "max_line_bytes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(match source.kind {
            SourceKind::WebLogin => Self::WebLogin { max_line_bytes },
            SourceKind::SshSession => Self::SshSession { max_line_bytes },
            SourceKind::MalwareListing => Self::MalwareListing {
                suffix: source.suffix.clone(),
            },
        })
    }

    /// 어댑터 종류
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::WebLogin { .. } => SourceKind::WebLogin,
            Self::SshSession { .. } => SourceKind::SshSession,
            Self::MalwareListing { .. } => SourceKind::MalwareListing,
        }
    }

    /// 이벤트 어댑터의 라인 디코더. 목록 어댑터는 `None`.
    pub fn decoder(&self) -> Option<Box<dyn EventDecoder>> {
        match self {
            Self::WebLogin { .. } => Some(Box::new(WebLoginDecoder)),
            Self::SshSession { .. } => Some(Box::new(SshSessionDecoder)),
            Self::MalwareListing { .. } => None,
        }
    }

    /// 소스를 열어 스캔을 시작합니다 (동기 I/O).
    ///
    /// 경로가 없으면 [`LogPipelineError::SourceMissing`], 그 외 I/O 실패는
    /// [`LogPipelineError::SourceUnreadable`]입니다.
    pub fn open(&self, path: &Path) -> Result<SourceScan, LogPipelineError> {
        match self {
            Self::WebLogin { max_line_bytes } | Self::SshSession { max_line_bytes } => {
                let decoder = self.decoder().ok_or_else(|| LogPipelineError::Config {
                    field: "kind".to_owned(),
                    reason: format!("no decoder for {}", self.kind()),
                })?;
                let file = File::open(path).map_err(|e| LogPipelineError::from_io(path, &e))?;
                let metadata = file
                    .metadata()
                    .map_err(|e| LogPipelineError::from_io(path, &e))?;
                if metadata.is_dir() {
                    return Err(LogPipelineError::SourceUnreadable {
                        path: path.display().to_string(),
                        reason: "expected a log file, found a directory".to_owned(),
                    });
                }
                Ok(SourceScan::Events(EventStream::new(
                    path,
                    BufReader::new(file),
                    decoder,
                    *max_line_bytes,
                )))
            }
            Self::MalwareListing { suffix } => {
                list_inventory(path, suffix).map(SourceScan::Inventory)
            }
        }
    }
}

/// 소스 스캔 결과
pub enum SourceScan {
    /// 이벤트 스트림 (이벤트 어댑터)
    Events(EventStream),
    /// 파일 목록 (목록 어댑터)
    Inventory(Inventory),
}

/// 스캔 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// 읽은 라인 수 (빈 라인 제외)
    pub lines_read: u64,
    /// 생성된 이벤트 수
    pub events: u64,
    /// 파싱 실패로 건너뛴 라인 수
    pub malformed: u64,
}

/// 파일 하나에 대한 지연 이벤트 스트림
///
/// 라인 순서대로 이벤트를 돌려주고, 파싱할 수 없는 라인은 세기만 하고 건너뜁니다.
/// 읽기 중 I/O 에러가 나면 [`LogPipelineError::SourceUnreadable`]을 한 번 돌려주고 끝납니다.
pub struct EventStream<R = BufReader<File>> {
    path: PathBuf,
    reader: LineReader<R>,
    decoder: Box<dyn EventDecoder>,
    stats: ScanStats,
    finished: bool,
}

impl<R: BufRead> EventStream<R> {
    pub fn new(
        path: impl Into<PathBuf>,
        reader: R,
        decoder: Box<dyn EventDecoder>,
        max_line_bytes: usize,
    ) -> Self {
        Self {
            path: path.into(),
            reader: LineReader::new(reader, max_line_bytes),
            decoder,
            stats: ScanStats::default(),
            finished: false,
        }
    }

    /// 지금까지의 스캔 통계
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn skip(&mut self, reason: &dyn std::fmt::Display) {
        self.stats.malformed += 1;
        debug!(
            path = %self.path.display(),
            line = self.stats.lines_read,
            format = self.decoder.format_name(),
            reason = %reason,
            "skipping malformed line"
        );
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = Result<HoneypotEvent, LogPipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let line = match self.reader.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(LogPipelineError::SourceUnreadable {
                        path: self.path.display().to_string(),
                        reason: e.to_string(),
                    }));
                }
            };
            self.stats.lines_read += 1;

            match line {
                RawLine::Text(text) => match self.decoder.decode(&text) {
                    Ok(event) => {
                        self.stats.events += 1;
                        return Some(Ok(event));
                    }
                    Err(e) => self.skip(&e),
                },
                RawLine::Oversized { len } => {
                    let max = self.reader.max_line_bytes();
                    self.skip(&ParseError::TooLarge { size: len, max });
                }
                RawLine::InvalidUtf8 => self.skip(&"line is not valid UTF-8"),
            }
        }
    }
}
