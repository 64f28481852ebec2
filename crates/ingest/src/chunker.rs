//! 청크 단위 스트림 처리
//!
//! [`ChunkedReader`]는 스트림을 라인 단위로 읽어 파싱된 레코드를
//! `batch_size`개씩 묶어 내보냅니다. 파일 크기와 무관하게 피크 메모리가
//! 배치 크기에 비례하도록 라인을 한 번에 하나씩만 읽습니다. 바이트
//! 청크가 아닌 라인 단위라 로그 엔트리가 중간에 잘리지 않습니다.
//!
//! 빈 라인은 에러로 세지 않고 건너뜁니다. 유효하지 않은 UTF-8은 손실
//! 변환으로 흡수합니다. 시퀀스는 유한하며 재시작할 수 없습니다.

use std::io::BufRead;

use tracing::warn;

use logminer_core::pipeline::LogParser;
use logminer_core::types::LogRecord;

/// 파싱된 레코드의 배치 이터레이터
///
/// 배치가 `batch_size`에 도달하는 즉시 내보내고, 스트림 끝에서 남은
/// 레코드가 있으면 마지막 부분 배치를 내보냅니다. 처리/에러 카운터는
/// 스트림을 전부 소비한 뒤 접근자로 읽습니다.
pub struct ChunkedReader<'a, R: BufRead> {
    reader: R,
    parser: &'a dyn LogParser,
    source: String,
    batch_size: usize,
    line_number: u64,
    records_parsed: u64,
    parse_errors: u64,
    finished: bool,
}

impl<'a, R: BufRead> ChunkedReader<'a, R> {
    /// 새 청크 리더를 생성합니다.
    pub fn new(reader: R, parser: &'a dyn LogParser, source: impl Into<String>, batch_size: usize) -> Self {
        Self {
            reader,
            parser,
            source: source.into(),
            batch_size: batch_size.max(1),
            line_number: 0,
            records_parsed: 0,
            parse_errors: 0,
            finished: false,
        }
    }

    /// 파싱에 성공한 레코드 수
    pub fn records_parsed(&self) -> u64 {
        self.records_parsed
    }

    /// 파싱 에러 수
    pub fn parse_errors(&self) -> u64 {
        self.parse_errors
    }

    /// 처리된 비어 있지 않은 라인 수 (성공 + 에러)
    pub fn lines_processed(&self) -> u64 {
        self.records_parsed + self.parse_errors
    }

    /// 다음 라인을 읽습니다. EOF면 None입니다.
    ///
    /// 유효하지 않은 UTF-8은 손실 변환하고, I/O 에러는 스트림 종료로
    /// 취급합니다 (경고 후 지금까지의 배치는 보존).
    fn read_line(&mut self) -> Option<String> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                let line = String::from_utf8_lossy(&buf);
                Some(line.trim_end_matches(['\n', '\r']).to_owned())
            }
            Err(e) => {
                warn!(source = %self.source, line = self.line_number, error = %e, "read failed, stopping stream");
                None
            }
        }
    }
}

impl<R: BufRead> Iterator for ChunkedReader<'_, R> {
    type Item = Vec<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut batch = Vec::with_capacity(self.batch_size);
        loop {
            let Some(line) = self.read_line() else {
                self.finished = true;
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            match self.parser.parse(&line, self.line_number, &self.source) {
                Ok(record) => {
                    self.records_parsed += 1;
                    batch.push(record);
                }
                Err(e) => {
                    self.parse_errors += 1;
                    warn!(error = %e, "line dropped");
                }
            }

            if batch.len() >= self.batch_size {
                return Some(batch);
            }
        }

        if batch.is_empty() { None } else { Some(batch) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::NginxParser;
    use std::io::Cursor;

    fn nginx_line(n: u32) -> String {
        format!(
            r#"10.0.0.{} - - [29/May/2025:00:00:09 -0400] "GET /item/{n} HTTP/1.1" 200 12 "-" "-""#,
            n % 250 + 1
        )
    }

    fn reader_over(content: String, parser: &NginxParser, batch: usize) -> ChunkedReader<'_, Cursor<Vec<u8>>> {
        ChunkedReader::new(Cursor::new(content.into_bytes()), parser, "nginx:access.log", batch)
    }

    #[test]
    fn exact_batches_with_no_remainder() {
        let content: String = (0..10_000).map(|n| nginx_line(n) + "\n").collect();
        let parser = NginxParser::new().unwrap();
        let mut reader = reader_over(content, &parser, 1000);
        let batches: Vec<_> = reader.by_ref().collect();
        assert_eq!(batches.len(), 10);
        assert!(batches.iter().all(|b| b.len() == 1000));
        assert_eq!(reader.records_parsed(), 10_000);
        assert_eq!(reader.parse_errors(), 0);
    }

    #[test]
    fn final_partial_batch_is_emitted() {
        let content: String = (0..2500).map(|n| nginx_line(n) + "\n").collect();
        let parser = NginxParser::new().unwrap();
        let batches: Vec<_> = reader_over(content, &parser, 1000).collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].len(), 500);
    }

    #[test]
    fn batch_count_is_ceil_of_lines_over_batch_size() {
        for (lines, batch, expected) in [(1, 10, 1), (10, 10, 1), (11, 10, 2), (0, 10, 0)] {
            let content: String = (0..lines).map(|n| nginx_line(n) + "\n").collect();
            let parser = NginxParser::new().unwrap();
            let batches: Vec<_> = reader_over(content, &parser, batch).collect();
            assert_eq!(batches.len(), expected);
            let total: usize = batches.iter().map(Vec::len).sum();
            assert_eq!(total, lines as usize);
        }
    }

    #[test]
    fn blank_lines_are_skipped_without_counting() {
        let content = format!("{}\n\n   \n{}\n", nginx_line(1), nginx_line(2));
        let parser = NginxParser::new().unwrap();
        let mut reader = reader_over(content, &parser, 10);
        let batches: Vec<_> = reader.by_ref().collect();
        assert_eq!(batches[0].len(), 2);
        assert_eq!(reader.lines_processed(), 2);
        assert_eq!(reader.parse_errors(), 0);
    }

    #[test]
    fn unparseable_lines_are_counted_not_fatal() {
        let content = format!("{}\ngarbage line\n{}\n", nginx_line(1), nginx_line(2));
        let parser = NginxParser::new().unwrap();
        let mut reader = reader_over(content, &parser, 10);
        let batches: Vec<_> = reader.by_ref().collect();
        assert_eq!(batches[0].len(), 2);
        assert_eq!(reader.parse_errors(), 1);
        assert_eq!(reader.lines_processed(), 3);
    }

    #[test]
    fn invalid_utf8_is_lossily_absorbed() {
        let mut bytes = nginx_line(1).into_bytes();
        bytes.push(b'\n');
        bytes.extend_from_slice(b"\xff\xfe not a log line\n");
        let parser = NginxParser::new().unwrap();
        let mut reader =
            ChunkedReader::new(Cursor::new(bytes), &parser, "nginx:access.log", 10);
        let batches: Vec<_> = reader.by_ref().collect();
        assert_eq!(batches[0].len(), 1);
        assert_eq!(reader.parse_errors(), 1);
    }

    #[test]
    fn line_numbers_reach_parser_context() {
        let content = format!("{}\ngarbage\n", nginx_line(1));
        let parser = NginxParser::new().unwrap();
        let mut reader = reader_over(content, &parser, 10);
        let _: Vec<_> = reader.by_ref().collect();
        // garbage는 두 번째 라인에서 실패
        assert_eq!(reader.parse_errors(), 1);
    }

    #[test]
    fn empty_stream_yields_nothing() {
        let parser = NginxParser::new().unwrap();
        let mut reader = reader_over(String::new(), &parser, 10);
        assert!(reader.next().is_none());
        assert_eq!(reader.lines_processed(), 0);
    }
}
