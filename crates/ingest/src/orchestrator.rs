//! 수집 오케스트레이터
//!
//! 패밀리별로 디스커버리 → 파싱 → 배치 삽입 전체 흐름을 실행합니다.
//! 파일 하나의 실패(추출 에러, 읽기 실패, 스토리지 에러)는 에러 하나로
//! 집계하고 다음 파일로 넘어갑니다. 실패 격리는 파일 단위입니다.
//! 임시 디렉토리 정리는 런의 성패와 무관하게 항상 실행됩니다.

use std::fs::File;
use std::io::BufReader;
use std::time::Instant;

use tracing::{info, warn};

use logminer_core::error::LogminerError;
use logminer_core::pipeline::{LogParser, StorageSink};
use logminer_core::types::LogFamily;

use crate::chunker::ChunkedReader;
use crate::config::{IngestConfig, SourceSpec};
use crate::discovery::{DiscoveredFile, DiscoveryEngine};
use crate::error::IngestError;
use crate::parser;
use crate::stats::ProcessingStatistics;

/// 파일 하나의 처리 결과 카운터
#[derive(Debug, Default)]
struct FileCounts {
    lines_processed: u64,
    records_parsed: u64,
    parse_errors: u64,
}

/// 수집 오케스트레이터
///
/// 한 번의 수집 런을 대표합니다. [`run`](Self::run)은 nginx, Nexus 순서로
/// 두 패밀리를 처리하고 통계를 반환합니다.
pub struct IngestOrchestrator<S: StorageSink> {
    config: IngestConfig,
    sink: S,
}

impl<S: StorageSink> IngestOrchestrator<S> {
    /// 검증된 설정으로 오케스트레이터를 생성합니다.
    pub fn new(config: IngestConfig, sink: S) -> Result<Self, IngestError> {
        config.validate()?;
        Ok(Self { config, sink })
    }

    /// 빌더를 생성합니다.
    pub fn builder() -> IngestOrchestratorBuilder<S> {
        IngestOrchestratorBuilder::new()
    }

    /// 오케스트레이터를 해체하고 싱크를 돌려받습니다.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// 전체 수집 런을 실행합니다.
    ///
    /// 정리와 통계 마감은 처리 실패 여부와 무관하게 수행됩니다.
    pub async fn run(&self) -> Result<ProcessingStatistics, LogminerError> {
        let mut stats = ProcessingStatistics::new();
        let mut engine = DiscoveryEngine::new(self.config.max_archive_depth);
        info!(
            chunk_size = self.config.chunk_size,
            max_archive_depth = self.config.max_archive_depth,
            "ingestion run started"
        );

        let result = self.process_all(&mut engine, &mut stats).await;

        engine.cleanup();
        stats.finalize();

        result?;
        info!(
            files = stats.total_files(),
            records = stats.total_records(),
            errors = stats.total_errors(),
            "ingestion run finished"
        );
        Ok(stats)
    }

    async fn process_all(
        &self,
        engine: &mut DiscoveryEngine,
        stats: &mut ProcessingStatistics,
    ) -> Result<(), LogminerError> {
        let families: [(LogFamily, &SourceSpec); 2] = [
            (LogFamily::Nginx, &self.config.nginx),
            (LogFamily::Nexus, &self.config.nexus),
        ];
        for (family, spec) in families {
            self.process_family(engine, family, spec, stats).await?;
        }
        Ok(())
    }

    /// 패밀리 하나를 처리합니다.
    ///
    /// 파일 목록은 미리 전부 materialize합니다. 보고에 전체 개수가
    /// 필요하고, 추출된 파일 경로가 엔진의 임시 디렉토리에 유효하게
    /// 남아 있는 동안 순차 처리하기 위해서입니다.
    async fn process_family(
        &self,
        engine: &mut DiscoveryEngine,
        family: LogFamily,
        spec: &SourceSpec,
        stats: &mut ProcessingStatistics,
    ) -> Result<(), LogminerError> {
        let parser = parser::parser_for(family).map_err(LogminerError::from)?;
        let started = Instant::now();

        let files: Vec<DiscoveredFile> = engine.discover(spec, family)?.collect();
        info!(family = %family, count = files.len(), "discovery complete");

        for file in &files {
            info!(source = %file.lineage, "processing file");
            match self.process_file(parser.as_ref(), file).await {
                Ok(counts) => {
                    let family_stats = stats.family_mut(family);
                    family_stats.files_processed += 1;
                    family_stats.lines_processed += counts.lines_processed;
                    family_stats.records_parsed += counts.records_parsed;
                    family_stats.parse_errors += counts.parse_errors;
                }
                Err(e) => {
                    warn!(source = %file.lineage, error = %e, "file processing failed, continuing");
                    stats.family_mut(family).parse_errors += 1;
                }
            }
        }

        stats.family_mut(family).elapsed += started.elapsed();
        Ok(())
    }

    /// 파일 하나를 배치 단위로 스토리지에 흘려보냅니다.
    ///
    /// 스토리지 실패는 파일 단위 실패로 승격되어 남은 배치는 포기합니다.
    async fn process_file(
        &self,
        parser: &dyn LogParser,
        file: &DiscoveredFile,
    ) -> Result<FileCounts, LogminerError> {
        let handle = File::open(&file.path).map_err(IngestError::Io)?;
        let mut reader = ChunkedReader::new(
            BufReader::new(handle),
            parser,
            file.lineage.clone(),
            self.config.chunk_size,
        );

        while let Some(batch) = reader.next() {
            let inserted = self.sink.batch_insert(file.family, &batch).await?;
            if inserted != batch.len() {
                warn!(
                    source = %file.lineage,
                    sent = batch.len(),
                    inserted,
                    "storage inserted fewer records than sent"
                );
            }
        }

        Ok(FileCounts {
            lines_processed: reader.lines_processed(),
            records_parsed: reader.records_parsed(),
            parse_errors: reader.parse_errors(),
        })
    }
}

/// 오케스트레이터 빌더
pub struct IngestOrchestratorBuilder<S: StorageSink> {
    config: IngestConfig,
    sink: Option<S>,
}

impl<S: StorageSink> IngestOrchestratorBuilder<S> {
    /// 기본 설정의 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: IngestConfig::default(),
            sink: None,
        }
    }

    /// 수집 설정을 지정합니다.
    pub fn config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    /// 스토리지 싱크를 지정합니다.
    pub fn sink(mut self, sink: S) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 설정을 검증하고 오케스트레이터를 생성합니다.
    pub fn build(self) -> Result<IngestOrchestrator<S>, IngestError> {
        let sink = self.sink.ok_or_else(|| IngestError::Config {
            field: "sink".to_owned(),
            reason: "storage sink is required".to_owned(),
        })?;
        IngestOrchestrator::new(self.config, sink)
    }
}

impl<S: StorageSink> Default for IngestOrchestratorBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
