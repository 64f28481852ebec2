//! Terminal summary rendering.
//!
//! Renders the end-of-run `ProcessingStatistics` as a colored table
//! for humans; callers on the `json` log format get the structured
//! summary through tracing instead.

use std::io::Write;

use colored::Colorize;

use logminer_ingest::stats::{FamilyStats, ProcessingStatistics};

/// Write the run summary to `w`.
pub fn write_summary(w: &mut dyn Write, stats: &ProcessingStatistics) -> std::io::Result<()> {
    writeln!(w, "{}", "ingestion summary".bold())?;
    write_family(w, "nginx", &stats.nginx)?;
    write_family(w, "nexus", &stats.nexus)?;

    let errors = stats.total_errors();
    let errors_text = if errors == 0 {
        errors.to_string().green().to_string()
    } else {
        errors.to_string().red().to_string()
    };
    writeln!(
        w,
        "{} {} files, {} records, {} errors",
        "total:".bold(),
        stats.total_files(),
        stats.total_records(),
        errors_text,
    )?;

    if let Some(finished) = stats.finished_at {
        let elapsed = finished.signed_duration_since(stats.started_at);
        writeln!(
            w,
            "elapsed: {:.2}s",
            elapsed.num_milliseconds() as f64 / 1000.0
        )?;
    }
    Ok(())
}

fn write_family(w: &mut dyn Write, name: &str, stats: &FamilyStats) -> std::io::Result<()> {
    writeln!(
        w,
        "  {}: {} files, {} lines, {} records, {} errors ({:.1}% ok, {:.2}s)",
        name.cyan(),
        stats.files_processed,
        stats.lines_processed,
        stats.records_parsed,
        stats.parse_errors,
        stats.success_rate() * 100.0,
        stats.elapsed.as_secs_f64(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use logminer_core::types::LogFamily;

    #[test]
    fn summary_contains_counters() {
        let mut stats = ProcessingStatistics::new();
        stats.family_mut(LogFamily::Nginx).files_processed = 2;
        stats.family_mut(LogFamily::Nginx).records_parsed = 100;
        stats.family_mut(LogFamily::Nexus).parse_errors = 3;
        stats.finalize();

        let mut buf = Vec::new();
        write_summary(&mut buf, &stats).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("nginx"));
        assert!(text.contains("100"));
        assert!(text.contains("3"));
        assert!(text.contains("elapsed"));
    }
}
