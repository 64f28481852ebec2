mod cli;
mod logging;
mod output;
mod sink;

use anyhow::{Context, Result};
use clap::Parser;

use logminer_core::config::LogminerConfig;
use logminer_ingest::config::IngestConfig;
use logminer_ingest::orchestrator::IngestOrchestrator;

use cli::LogminerCli;
use sink::JsonlSink;

#[tokio::main]
async fn main() -> Result<()> {
    let args = LogminerCli::parse();

    // 설정 우선순위: CLI 플래그 > 환경변수 > 설정 파일 > 기본값
    let mut config = if args.config.exists() {
        LogminerConfig::from_file(&args.config)
            .await
            .with_context(|| format!("failed to load config from {}", args.config.display()))?
    } else {
        LogminerConfig::default()
    };
    config.apply_env_overrides();
    args.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    logging::init_tracing(&config.general)?;

    if args.validate {
        println!("configuration OK");
        return Ok(());
    }

    tracing::info!(
        nginx_dir = %config.ingest.nginx_dir,
        nexus_dir = %config.ingest.nexus_dir,
        chunk_size = config.ingest.chunk_size,
        "logminer starting"
    );

    let ingest_config = IngestConfig::from_core(&config.ingest);
    let sink = JsonlSink::new(&args.output_dir)
        .with_context(|| format!("failed to open output dir {}", args.output_dir.display()))?;

    let orchestrator = IngestOrchestrator::builder()
        .config(ingest_config)
        .sink(sink)
        .build()
        .context("failed to build ingestion pipeline")?;

    let stats = orchestrator.run().await.context("ingestion run failed")?;
    orchestrator.into_sink().flush().context("failed to flush output")?;

    let stdout = std::io::stdout();
    output::write_summary(&mut stdout.lock(), &stats)?;

    Ok(())
}
