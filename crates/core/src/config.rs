//! 설정 관리 — logminer.toml 파싱 및 런타임 설정
//!
//! [`LogminerConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGMINER_INGEST_CHUNK_SIZE=500` 형식)
//! 3. 설정 파일 (`logminer.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logminer_core::error::LogminerError> {
//! use logminer_core::config::LogminerConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogminerConfig::load("logminer.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogminerConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LogminerError};

/// 중첩 아카이브 추출 깊이의 유효 범위
pub const ARCHIVE_DEPTH_RANGE: std::ops::RangeInclusive<usize> = 1..=10;

/// Logminer 통합 설정
///
/// `logminer.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogminerConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 수집 파이프라인 설정
    #[serde(default)]
    pub ingest: IngestSettings,
}

/// 일반 설정 (로깅 등)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 출력 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 수집 파이프라인 설정
///
/// 디렉토리, 파일명 패턴, 배치 크기, 아카이브 깊이 제한을 담습니다.
/// 패턴은 원본 CLI 계약과 동일하게 콤마로 구분된 글롭 목록 문자열입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// nginx 로그 루트 디렉토리
    pub nginx_dir: String,
    /// Nexus 로그 루트 디렉토리
    pub nexus_dir: String,
    /// nginx 파일명 패턴 (콤마 구분 글롭 목록)
    pub nginx_pattern: String,
    /// Nexus 파일명 패턴 (콤마 구분 글롭 목록)
    pub nexus_pattern: String,
    /// 배치 크기 (이 개수만큼 모이면 스토리지로 플러시)
    pub chunk_size: usize,
    /// 중첩 아카이브 최대 추출 깊이
    pub max_archive_depth: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            nginx_dir: "./logs/nginx".to_owned(),
            nexus_dir: "./logs/nexus".to_owned(),
            nginx_pattern: "access.log*".to_owned(),
            nexus_pattern: "request*.log*,nexus_logs_*.tar,nexus_logs_*.tar.gz".to_owned(),
            chunk_size: 1000,
            max_archive_depth: 3,
        }
    }
}

impl IngestSettings {
    /// nginx 패턴 문자열을 글롭 목록으로 분해합니다.
    pub fn nginx_patterns(&self) -> Vec<String> {
        split_patterns(&self.nginx_pattern)
    }

    /// Nexus 패턴 문자열을 글롭 목록으로 분해합니다.
    pub fn nexus_patterns(&self) -> Vec<String> {
        split_patterns(&self.nexus_pattern)
    }
}

/// 콤마 구분 패턴 문자열을 공백 제거 후 목록으로 변환합니다.
fn split_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}

impl LogminerConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogminerError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogminerError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogminerError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogminerError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogminerError> {
        toml::from_str(toml_str).map_err(|e| {
            LogminerError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGMINER_{SECTION}_{FIELD}`
    /// 예: `LOGMINER_INGEST_NGINX_DIR=/var/log/nginx`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGMINER_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGMINER_GENERAL_LOG_FORMAT");

        // Ingest
        override_string(&mut self.ingest.nginx_dir, "LOGMINER_INGEST_NGINX_DIR");
        override_string(&mut self.ingest.nexus_dir, "LOGMINER_INGEST_NEXUS_DIR");
        override_string(
            &mut self.ingest.nginx_pattern,
            "LOGMINER_INGEST_NGINX_PATTERN",
        );
        override_string(
            &mut self.ingest.nexus_pattern,
            "LOGMINER_INGEST_NEXUS_PATTERN",
        );
        override_usize(&mut self.ingest.chunk_size, "LOGMINER_INGEST_CHUNK_SIZE");
        override_usize(
            &mut self.ingest.max_archive_depth,
            "LOGMINER_INGEST_MAX_ARCHIVE_DEPTH",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogminerError> {
        const MAX_CHUNK_SIZE: usize = 100_000;

        if self.ingest.chunk_size == 0 || self.ingest.chunk_size > MAX_CHUNK_SIZE {
            return Err(invalid("ingest.chunk_size", format!("must be 1-{MAX_CHUNK_SIZE}")));
        }

        if !ARCHIVE_DEPTH_RANGE.contains(&self.ingest.max_archive_depth) {
            return Err(invalid(
                "ingest.max_archive_depth",
                format!(
                    "must be {}-{}",
                    ARCHIVE_DEPTH_RANGE.start(),
                    ARCHIVE_DEPTH_RANGE.end()
                ),
            ));
        }

        if self.ingest.nginx_patterns().is_empty() {
            return Err(invalid(
                "ingest.nginx_pattern",
                "at least one pattern must be specified".to_owned(),
            ));
        }

        if self.ingest.nexus_patterns().is_empty() {
            return Err(invalid(
                "ingest.nexus_pattern",
                "at least one pattern must be specified".to_owned(),
            ));
        }

        match self.general.log_format.as_str() {
            "json" | "pretty" => {}
            other => {
                return Err(invalid(
                    "general.log_format",
                    format!("unknown format '{other}', expected 'json' or 'pretty'"),
                ));
            }
        }

        if self.ingest.nginx_dir == self.ingest.nexus_dir {
            tracing::warn!(
                dir = %self.ingest.nginx_dir,
                "nginx and nexus directories are the same"
            );
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> LogminerError {
    LogminerError::Config(ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    })
}

/// 환경변수가 존재하면 문자열 필드를 덮어씁니다.
fn override_string(target: &mut String, env_key: &str) {
    if let Ok(value) = std::env::var(env_key) {
        *target = value;
    }
}

/// 환경변수가 존재하고 숫자로 파싱되면 usize 필드를 덮어씁니다.
fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(value) = std::env::var(env_key) {
        match value.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => {
                tracing::warn!(key = env_key, value = %value, "ignoring non-numeric env override");
            }
        }
    }
}
