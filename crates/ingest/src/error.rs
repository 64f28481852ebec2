//! 수집 파이프라인 에러 타입
//!
//! [`IngestError`]는 디스커버리, 아카이브 추출, 청크 처리에서 발생하는 모든
//! 에러를 표현합니다. `From<IngestError> for LogminerError` 변환이 구현되어
//! 있어 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use std::path::PathBuf;

use logminer_core::error::{IngestStageError, LogminerError};

/// 수집 파이프라인 도메인 에러
///
/// 디렉토리 워킹, 아카이브 추출, 파일 읽기, 설정 검증 등 파이프라인
/// 내부의 모든 에러 상황을 포괄합니다.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 루트 디렉토리가 존재하지 않거나 읽을 수 없음
    #[error("discovery error: {path}: {reason}")]
    Discovery {
        /// 문제가 된 경로
        path: PathBuf,
        /// 에러 사유
        reason: String,
    },

    /// 아카이브 추출 실패 (아카이브 전체 단위)
    #[error("extraction error: {archive}: {reason}")]
    Extraction {
        /// 아카이브 경로
        archive: PathBuf,
        /// 에러 사유
        reason: String,
    },

    /// 지원하지 않는 아카이브 형식
    #[error("unsupported archive format: {0}")]
    UnsupportedArchive(PathBuf),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 글롭 패턴 컴파일 실패
    #[error("invalid glob pattern '{pattern}': {reason}")]
    Pattern {
        /// 문제가 된 패턴
        pattern: String,
        /// 실패 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IngestError> for LogminerError {
    fn from(err: IngestError) -> Self {
        let stage = match &err {
            IngestError::Discovery { .. } | IngestError::Pattern { .. } => {
                IngestStageError::Discovery(err.to_string())
            }
            IngestError::Extraction { .. } | IngestError::UnsupportedArchive(_) => {
                IngestStageError::Extraction(err.to_string())
            }
            IngestError::Config { .. } | IngestError::Io(_) => {
                IngestStageError::RunFailed(err.to_string())
            }
        };
        LogminerError::Ingest(stage)
    }
}
