//! 수집 파이프라인 설정
//!
//! [`IngestConfig`]는 core의 [`IngestSettings`](logminer_core::config::IngestSettings)를
//! 기반으로 수집 파이프라인 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use logminer_core::config::LogminerConfig;
//! use logminer_ingest::config::IngestConfig;
//!
//! let core_config = LogminerConfig::default();
//! let config = IngestConfig::from_core(&core_config.ingest);
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// 패밀리별 수집 대상 정의
///
/// 루트 디렉토리 하나와 파일명 글롭 패턴 목록의 쌍입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    /// 탐색 루트 디렉토리
    pub root_dir: PathBuf,
    /// 파일명 글롭 패턴 목록 (대소문자 구분 없음)
    pub patterns: Vec<String>,
}

/// 수집 파이프라인 설정
///
/// core의 `IngestSettings`에서 파생되며, 파이프라인 내부에서
/// 사용하는 추가 설정을 포함합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// nginx 수집 대상
    pub nginx: SourceSpec,
    /// Nexus 수집 대상
    pub nexus: SourceSpec,
    /// 배치 크기 (이 개수만큼 모이면 스토리지로 플러시)
    pub chunk_size: usize,
    /// 중첩 아카이브 최대 추출 깊이
    pub max_archive_depth: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::from_core(&logminer_core::config::IngestSettings::default())
    }
}

impl IngestConfig {
    /// core의 `IngestSettings`에서 수집 설정을 생성합니다.
    pub fn from_core(core: &logminer_core::config::IngestSettings) -> Self {
        Self {
            nginx: SourceSpec {
                root_dir: PathBuf::from(&core.nginx_dir),
                patterns: core.nginx_patterns(),
            },
            nexus: SourceSpec {
                root_dir: PathBuf::from(&core.nexus_dir),
                patterns: core.nexus_patterns(),
            },
            chunk_size: core.chunk_size,
            max_archive_depth: core.max_archive_depth,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), IngestError> {
        const MAX_CHUNK_SIZE: usize = 100_000;

        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(IngestError::Config {
                field: "chunk_size".to_owned(),
                reason: format!("must be 1-{MAX_CHUNK_SIZE}"),
            });
        }

        if !logminer_core::config::ARCHIVE_DEPTH_RANGE.contains(&self.max_archive_depth) {
            return Err(IngestError::Config {
                field: "max_archive_depth".to_owned(),
                reason: format!(
                    "must be {}-{}",
                    logminer_core::config::ARCHIVE_DEPTH_RANGE.start(),
                    logminer_core::config::ARCHIVE_DEPTH_RANGE.end()
                ),
            });
        }

        for (name, spec) in [("nginx", &self.nginx), ("nexus", &self.nexus)] {
            if spec.patterns.is_empty() {
                return Err(IngestError::Config {
                    field: format!("{name}.patterns"),
                    reason: "at least one pattern must be specified".to_owned(),
                });
            }
            if spec.patterns.iter().any(|p| p.trim().is_empty()) {
                return Err(IngestError::Config {
                    field: format!("{name}.patterns"),
                    reason: "empty pattern is not allowed".to_owned(),
                });
            }
        }

        Ok(())
    }
}

/// 수집 설정 빌더
#[derive(Default)]
pub struct IngestConfigBuilder {
    config: IngestConfig,
}

impl IngestConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// nginx 루트 디렉토리를 설정합니다.
    pub fn nginx_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.nginx.root_dir = dir.into();
        self
    }

    /// nginx 파일명 패턴을 설정합니다.
    pub fn nginx_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.nginx.patterns = patterns;
        self
    }

    /// Nexus 루트 디렉토리를 설정합니다.
    pub fn nexus_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.nexus.root_dir = dir.into();
        self
    }

    /// Nexus 파일명 패턴을 설정합니다.
    pub fn nexus_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.nexus.patterns = patterns;
        self
    }

    /// 배치 크기를 설정합니다.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// 중첩 아카이브 최대 추출 깊이를 설정합니다.
    pub fn max_archive_depth(mut self, depth: usize) -> Self {
        self.config.max_archive_depth = depth;
        self
    }

    /// 설정을 검증하고 `IngestConfig`를 생성합니다.
    pub fn build(self) -> Result<IngestConfig, IngestError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
