//! 에러 타입 — 도메인별 에러 정의

/// Logminer 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogminerError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 수집(디스커버리/추출/처리) 에러
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestStageError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 스토리지 계약 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

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

/// 수집 단계(디스커버리, 아카이브 추출, 오케스트레이션) 에러
///
/// `logminer-ingest`의 도메인 에러가 상위 레이어로 전파될 때 이 형태로 변환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum IngestStageError {
    /// 디스커버리 실패
    #[error("discovery failed: {0}")]
    Discovery(String),

    /// 아카이브 추출 실패
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// 파이프라인 실행 실패
    #[error("pipeline run failed: {0}")]
    RunFailed(String),
}

/// 로그 라인 파싱 에러
///
/// 형식에 전혀 맞지 않는 라인, 또는 필수 필드(타임스탬프, 상태 코드)의 실패만
/// 에러가 됩니다. 그 외의 이상 값은 파서가 센티널/None으로 흡수합니다.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 라인이 로그 문법과 전혀 일치하지 않음
    #[error("line does not match {family} log format ({lineage}:{line_number})")]
    FormatMismatch {
        /// 로그 패밀리명 (nginx, nexus)
        family: &'static str,
        /// 소스 계보 문자열
        lineage: String,
        /// 라인 번호
        line_number: u64,
    },

    /// 타임스탬프 파싱 실패
    #[error("invalid timestamp '{value}' ({lineage}:{line_number})")]
    InvalidTimestamp {
        /// 원본 타임스탬프 문자열
        value: String,
        /// 소스 계보 문자열
        lineage: String,
        /// 라인 번호
        line_number: u64,
    },

    /// 상태 코드 파싱 실패
    #[error("invalid status code '{value}' ({lineage}:{line_number})")]
    InvalidStatusCode {
        /// 원본 상태 코드 문자열
        value: String,
        /// 소스 계보 문자열
        lineage: String,
        /// 라인 번호
        line_number: u64,
    },
}

/// 스토리지 계약 에러
///
/// 배치 삽입을 받는 외부 협력자(데이터베이스 등)가 반환하는 에러입니다.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 연결 실패
    #[error("connection failed: {0}")]
    Connection(String),

    /// 배치 삽입 실패
    #[error("batch insert failed: {0}")]
    BatchInsert(String),

    /// 구조적으로 유효하지 않은 레코드
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
