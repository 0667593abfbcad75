//! 플릿 상태 -- 로그 루트 아래 파일 수와 허니팟별 활성 여부
//!
//! 파싱 결과와 무관하게 디스크에 로그가 있는지만 봅니다.
//! 잘못된 라인만 있는 소스도 활성으로 표시됩니다.

use std::fs;
use std::path::{Path, PathBuf};

use deceptinet_core::config::DeceptinetConfig;
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

/// 소스 하나의 디스크 존재 여부
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcePresence {
    /// 소스 이름
    pub name: String,
    /// 확인한 경로
    pub path: PathBuf,
    /// 존재하고 비어 있지 않음
    pub active: bool,
}

/// 플릿 전체 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetStatus {
    /// 로그 루트 디렉토리
    pub log_dir: PathBuf,
    /// 로그 루트 아래 (재귀) 접미사가 일치하는 파일 수
    pub total_log_files: usize,
    /// 설정 순서대로의 소스별 존재 여부
    pub sources: Vec<SourcePresence>,
}

impl FleetStatus {
    /// 설정된 로그 루트를 조사합니다 (동기 I/O).
    ///
    /// `tokio::task::spawn_blocking` 내에서 호출되어야 합니다.
    pub fn probe(config: &DeceptinetConfig) -> Self {
        let log_dir = &config.report.log_dir;
        let total_log_files = count_log_files(log_dir, &config.report.fleet_suffixes);

        let sources = config
            .sources
            .iter()
            .filter(|source| source.enabled)
            .map(|source| {
                let path = source.presence_dir(log_dir);
                let active = is_active(&path);
                debug!(source = %source.name, path = %path.display(), active, "probed source presence");
                SourcePresence {
                    name: source.name.clone(),
                    path,
                    active,
                }
            })
            .collect();

        Self {
            log_dir: log_dir.clone(),
            total_log_files,
            sources,
        }
    }

    /// 활성 소스 이름 (설정 순서)
    pub fn active_sources(&self) -> impl Iterator<Item = &str> {
        self.sources
            .iter()
            .filter(|s| s.active)
            .map(|s| s.name.as_str())
    }

    pub fn active_count(&self) -> usize {
        self.sources.iter().filter(|s| s.active).count()
    }
}

/// 루트 아래 (재귀) 접미사가 일치하는 일반 파일 수
///
/// 루트가 없거나 읽을 수 없는 항목은 세지 않습니다.
pub fn count_log_files(root: &Path, suffixes: &[String]) -> usize {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
        })
        .count()
}

/// 경로가 존재하고 비어 있지 않은지 확인합니다.
///
/// 디렉토리는 항목이 하나 이상, 파일은 크기가 0보다 커야 합니다.
pub fn is_active(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => fs::read_dir(path)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false),
        Ok(meta) => meta.len() > 0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deceptinet_core::config::SourceConfig;
    use deceptinet_core::types::SourceKind;

    fn suffixes() -> Vec<String> {
        vec![".log".to_owned(), ".json".to_owned()]
    }

    #[test]
    fn counts_recursively_by_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("cowrie").join("archive");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("cowrie").join("cowrie.json"), b"{}").unwrap();
        fs::write(nested.join("cowrie.json.2024-01-14"), b"{}").unwrap();
        fs::write(nested.join("old.log"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        assert_eq!(count_log_files(dir.path(), &suffixes()), 2);
    }

    #[test]
    fn missing_root_counts_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(count_log_files(&dir.path().join("absent"), &suffixes()), 0);
    }

    #[test]
    fn active_requires_non_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty");
        let full = dir.path().join("full");
        fs::create_dir(&empty).unwrap();
        fs::create_dir(&full).unwrap();
        fs::write(full.join("garbage.json"), b"not json").unwrap();

        assert!(!is_active(&empty));
        assert!(is_active(&full));
        assert!(!is_active(&dir.path().join("absent")));
    }

    #[test]
    fn active_file_must_be_non_empty() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.json");
        let full = dir.path().join("full.json");
        fs::write(&empty, b"").unwrap();
        fs::write(&full, b"x").unwrap();
        assert!(!is_active(&empty));
        assert!(is_active(&full));
    }

    #[test]
    fn probe_reports_sources_in_config_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("cowrie")).unwrap();
        fs::write(dir.path().join("cowrie").join("cowrie.json"), b"junk\n").unwrap();

        let mut config = DeceptinetConfig::default();
        config.report.log_dir = dir.path().to_path_buf();
        let mut disabled = SourceConfig::new("Disabled", SourceKind::WebLogin, "off/web.json");
        disabled.enabled = false;
        config.sources.push(disabled);

        let fleet = FleetStatus::probe(&config);
        let names: Vec<_> = fleet.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Flask Web", "Cowrie SSH", "Dionaea Malware"]);
        assert_eq!(fleet.active_sources().collect::<Vec<_>>(), vec!["Cowrie SSH"]);
        assert_eq!(fleet.active_count(), 1);
        assert_eq!(fleet.total_log_files, 1);
    }
}
