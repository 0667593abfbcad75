//! 악성코드 디코이 파일 목록
//!
//! 이 소스의 로그는 라인 단위 JSON이 아니므로 이벤트로 파싱하지 않습니다.
//! 디렉토리의 로그 파일 목록만 [`Inventory`]로 보고합니다.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::LogPipelineError;

/// 목록의 파일 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    /// 파일 이름
    pub name: String,
    /// 파일 크기 (바이트)
    pub size_bytes: u64,
}

/// 파일 목록 결과 (이벤트 없음)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inventory {
    /// 나열한 디렉토리
    pub directory: PathBuf,
    /// 필터 접미사
    pub suffix: String,
    /// 이름순으로 정렬된 파일 목록
    pub files: Vec<InventoryEntry>,
    /// 전체 파일 수
    pub total_files: usize,
}

impl Inventory {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// 앞에서부터 최대 `limit`개
    pub fn head(&self, limit: usize) -> &[InventoryEntry] {
        &self.files[..self.files.len().min(limit)]
    }

    /// 전체 파일 크기 합계
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }
}

/// 디렉토리에서 접미사가 일치하는 파일을 나열합니다 (비재귀, 동기 I/O).
///
/// `tokio::task::spawn_blocking` 내에서 호출되어야 합니다.
pub fn list_inventory(dir: &Path, suffix: &str) -> Result<Inventory, LogPipelineError> {
    let entries = fs::read_dir(dir).map_err(|e| LogPipelineError::from_io(dir, &e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(suffix) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "failed to read file metadata");
                continue;
            }
        };
        if !metadata.is_file() {
            debug!(name = %name, "skipping non-file entry");
            continue;
        }

        files.push(InventoryEntry {
            name,
            size_bytes: metadata.len(),
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    let total_files = files.len();

    Ok(Inventory {
        directory: dir.to_path_buf(),
        suffix: suffix.to_owned(),
        files,
        total_files,
    })
}
