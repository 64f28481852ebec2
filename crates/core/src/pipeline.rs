//! 파이프라인 trait — 모듈 확장 포인트 정의

use crate::error::{ParseError, StorageError};
use crate::types::{LogFamily, LogRecord};

/// 로그 파서 trait
///
/// 새로운 로그 형식을 지원하려면 이 trait을 구현합니다.
/// 한 라인에 대한 순수 함수이며, 공유 가변 상태를 갖지 않습니다.
/// 에러 카운팅은 호출자(청크 프로세서)의 책임입니다.
pub trait LogParser: Send + Sync {
    /// 이 파서가 처리하는 로그 패밀리
    fn family(&self) -> LogFamily;

    /// 원시 라인 하나를 레코드로 파싱
    ///
    /// `line_number`와 `source`는 에러 보고용 컨텍스트입니다.
    fn parse(&self, line: &str, line_number: u64, source: &str) -> Result<LogRecord, ParseError>;
}

/// 스토리지 협력자 계약
///
/// 파이프라인이 소비하는 유일한 쓰기 표면입니다. 부분 배치를 허용해야 하며,
/// 호출 간 전역 순서를 요구해서는 안 됩니다. 구조적으로 유효하지 않은
/// 레코드에 대해 에러를 반환할 수 있고, 오케스트레이터는 이를 파일 단위로
/// 격리합니다.
pub trait StorageSink: Send + Sync {
    /// 레코드 배치를 삽입하고 삽입된 개수를 반환합니다.
    fn batch_insert(
        &self,
        family: LogFamily,
        records: &[LogRecord],
    ) -> impl Future<Output = Result<usize, StorageError>> + Send;
}
