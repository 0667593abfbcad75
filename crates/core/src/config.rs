//! 설정 관리 -- deceptinet.toml 파싱 및 런타임 설정
//!
//! [`DeceptinetConfig`]는 분석 실행에 필요한 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`DECEPTINET_REPORT_LOG_DIR=/srv/logs` 형식)
//! 3. 설정 파일 (`deceptinet.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! 설정 파일이 없어도 기본값만으로 세 허니팟(Flask, Cowrie, Dionaea)을 분석할 수 있습니다.
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), deceptinet_core::error::DeceptinetError> {
//! use deceptinet_core::config::DeceptinetConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = DeceptinetConfig::load("deceptinet.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = DeceptinetConfig::parse("[report]\ntop_n = 20")?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, DeceptinetError};
use crate::types::{Dimension, SourceKind};

/// 라인 최대 길이 상한 (설정 검증용)
const MAX_LINE_BYTES_LIMIT: usize = 16 * 1024 * 1024;

/// DeceptiNet 통합 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeceptinetConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 리포트 설정
    #[serde(default)]
    pub report: ReportConfig,
    /// 분석할 로그 소스 목록 (설정 순서대로 리포트에 출력)
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Default for DeceptinetConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            report: ReportConfig::default(),
            sources: default_sources(),
        }
    }
}

impl DeceptinetConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DeceptinetError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 있으면 로드하고, 없으면 기본값에 환경변수만 적용합니다.
    ///
    /// 경로를 명시하지 않은 실행에서 사용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, DeceptinetError> {
        let path = path.as_ref();
        match tokio::fs::try_exists(path).await {
            Ok(true) => Self::load(path).await,
            _ => {
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DeceptinetError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DeceptinetError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                DeceptinetError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, DeceptinetError> {
        toml::from_str(toml_str).map_err(|e| {
            DeceptinetError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `DECEPTINET_{SECTION}_{FIELD}`
    /// 예: `DECEPTINET_REPORT_TOP_N=20`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "DECEPTINET_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "DECEPTINET_GENERAL_LOG_FORMAT");

        // Report
        override_path(&mut self.report.log_dir, "DECEPTINET_REPORT_LOG_DIR");
        override_usize(&mut self.report.top_n, "DECEPTINET_REPORT_TOP_N");
        override_usize(
            &mut self.report.max_line_bytes,
            "DECEPTINET_REPORT_MAX_LINE_BYTES",
        );
        override_usize(
            &mut self.report.listing_limit,
            "DECEPTINET_REPORT_LISTING_LIMIT",
        );
        override_csv(
            &mut self.report.fleet_suffixes,
            "DECEPTINET_REPORT_FLEET_SUFFIXES",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), DeceptinetError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.report.top_n == 0 {
            return Err(invalid("report.top_n", "must be greater than 0"));
        }

        if self.report.max_line_bytes == 0 || self.report.max_line_bytes > MAX_LINE_BYTES_LIMIT {
            return Err(invalid(
                "report.max_line_bytes",
                format!("must be 1-{}", MAX_LINE_BYTES_LIMIT),
            ));
        }

        if self.report.fleet_suffixes.iter().any(|s| s.is_empty()) {
            return Err(invalid(
                "report.fleet_suffixes",
                "suffixes must not be empty strings",
            ));
        }

        let mut seen_names = HashSet::new();
        for (idx, source) in self.sources.iter().enumerate() {
            let field = |name: &str| format!("sources[{idx}].{name}");

            if source.name.trim().is_empty() {
                return Err(invalid(&field("name"), "source name must not be empty"));
            }
            if !seen_names.insert(source.name.as_str()) {
                return Err(invalid(
                    &field("name"),
                    format!("duplicate source name '{}'", source.name),
                ));
            }
            if source.path.as_os_str().is_empty() {
                return Err(invalid(&field("path"), "source path must not be empty"));
            }
            if source.kind.is_inventory_only() && source.suffix.is_empty() {
                return Err(invalid(
                    &field("suffix"),
                    "inventory sources need a file suffix",
                ));
            }
            if let Some(dimensions) = &source.dimensions {
                if source.kind.is_inventory_only() {
                    return Err(invalid(
                        &field("dimensions"),
                        "inventory-only sources are not aggregated",
                    ));
                }
                let mut seen_dims = HashSet::new();
                for dim in dimensions {
                    if dim.name.is_empty() || !seen_dims.insert(dim.name.as_str()) {
                        return Err(invalid(
                            &field("dimensions"),
                            format!("dimension names must be unique and non-empty ('{}')", dim.name),
                        ));
                    }
                    if dim.top_n == Some(0) {
                        return Err(invalid(
                            &field("dimensions"),
                            format!("dimension '{}' top_n must be greater than 0", dim.name),
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> DeceptinetError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 리포트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 로그 루트 디렉토리
    pub log_dir: PathBuf,
    /// 차원별 기본 상위 N개
    pub top_n: usize,
    /// 라인 최대 길이 (바이트). 초과 라인은 잘못된 라인으로 집계
    pub max_line_bytes: usize,
    /// 플릿 상태 집계 시 인정하는 로그 파일 접미사
    pub fleet_suffixes: Vec<String>,
    /// 파일 목록 소스에서 출력할 최대 파일 수
    pub listing_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./data/logs"),
            top_n: 10,
            max_line_bytes: 64 * 1024, // 64KB
            fleet_suffixes: vec![".log".to_owned(), ".json".to_owned()],
            listing_limit: 5,
        }
    }
}

/// 로그 소스 하나의 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// 리포트에 표시할 이름 (예: "Flask Web")
    pub name: String,
    /// 어댑터 종류
    pub kind: SourceKind,
    /// `log_dir` 기준 상대 경로 (이벤트 소스는 파일, 목록 소스는 디렉토리)
    pub path: PathBuf,
    /// 목록 소스의 파일 접미사
    #[serde(default = "default_listing_suffix")]
    pub suffix: String,
    /// 활성화 여부
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 집계 차원 (없으면 종류별 기본 차원)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Vec<Dimension>>,
    /// 세션 ID 필드 (`dimensions`를 직접 지정할 때만 사용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_field: Option<String>,
}

impl SourceConfig {
    pub fn new(name: impl Into<String>, kind: SourceKind, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            path: path.into(),
            suffix: default_listing_suffix(),
            enabled: true,
            dimensions: None,
            session_field: None,
        }
    }

    /// 로그 루트와 결합한 실제 경로
    pub fn resolve(&self, log_dir: &Path) -> PathBuf {
        log_dir.join(&self.path)
    }

    /// 플릿 상태에서 존재 여부를 확인할 디렉토리
    ///
    /// 이벤트 소스는 로그 파일의 상위 디렉토리, 목록 소스는 자기 자신입니다.
    pub fn presence_dir(&self, log_dir: &Path) -> PathBuf {
        let resolved = self.resolve(log_dir);
        if self.kind.is_inventory_only() {
            return resolved;
        }
        match resolved.parent() {
            Some(parent) if parent != log_dir && !parent.as_os_str().is_empty() => {
                parent.to_path_buf()
            }
            _ => resolved,
        }
    }
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new(
            "Flask Web",
            SourceKind::WebLogin,
            "flask-fake-login/login.json",
        ),
        SourceConfig::new("Cowrie SSH", SourceKind::SshSession, "cowrie/cowrie.json"),
        SourceConfig::new("Dionaea Malware", SourceKind::MalwareListing, "dionaea"),
    ]
}

fn default_listing_suffix() -> String {
    ".log".to_owned()
}

fn default_true() -> bool {
    true
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_path(target: &mut PathBuf, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = PathBuf::from(val);
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}
