use anyhow::{Context, Result};
use clap::ValueEnum;
use mcqscan_core::{PipelineStages, ProcessingOutcome, QuestionSummary};
use serde_json::json;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Array of question records
    Records,
    /// Aggregate counters only
    Summary,
    /// Records, summary and processing counters in one document
    Full,
}

/// Render the processing result as pretty JSON in the requested layout.
pub fn render(outcome: &ProcessingOutcome, format: OutputFormat, source: &str) -> Result<String> {
    let value = match format {
        OutputFormat::Records => serde_json::to_value(&outcome.questions)?,
        OutputFormat::Summary => {
            serde_json::to_value(QuestionSummary::from_questions(&outcome.questions))?
        }
        OutputFormat::Full => json!({
            "source": source,
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "processing": {
                "blocks_seen": outcome.blocks_seen,
                "blocks_rejected": outcome.blocks_rejected,
                "questions": outcome.questions.len(),
                "low_confidence_classifications": outcome.low_confidence_classifications,
            },
            "summary": QuestionSummary::from_questions(&outcome.questions),
            "questions": outcome.questions,
        }),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Write rendered output to a file, or stdout when no path is given.
pub fn write(rendered: &str, output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write output to {}", path.display()))?;
            tracing::info!("💾 Results saved to: {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Dump every captured pipeline stage as its own file under `output_dir`.
pub fn save_stages(stages: &PipelineStages, output_dir: &Path, source: &str) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create stage directory {}", output_dir.display()))?;

    // Stage 1: normalized text
    let text_path = output_dir.join("stage1_normalized.txt");
    fs::write(&text_path, &stages.normalized_text)?;
    tracing::info!("  💾 {}", text_path.display());

    // Stage 2a: blocks
    let blocks_path = output_dir.join("stage2a_blocks.json");
    fs::write(&blocks_path, serde_json::to_string_pretty(&stages.blocks)?)?;
    tracing::info!("  💾 {} ({} blocks)", blocks_path.display(), stages.blocks.len());

    // Stage 2b: accept/reject decision per block
    let outcomes_path = output_dir.join("stage2b_outcomes.json");
    fs::write(&outcomes_path, serde_json::to_string_pretty(&stages.outcomes)?)?;
    tracing::info!("  💾 {}", outcomes_path.display());

    // Stage 2c: validated questions before classification
    let parsed_path = output_dir.join("stage2c_parsed_questions.json");
    fs::write(&parsed_path, serde_json::to_string_pretty(&stages.parsed_questions)?)?;
    tracing::info!("  💾 {} ({} questions)", parsed_path.display(), stages.parsed_questions.len());

    // Stage 3: classified questions
    let questions_path = output_dir.join("stage3_questions.json");
    fs::write(&questions_path, serde_json::to_string_pretty(&stages.questions)?)?;
    tracing::info!("  💾 {}", questions_path.display());

    // Summary file: quick reference for validation scripts
    let accepted = stages.outcomes.iter().filter(|o| o.is_accepted()).count();
    let summary = json!({
        "source": source,
        "captured_at": chrono::Utc::now().to_rfc3339(),
        "fingerprints": {
            "source": stages.source_fingerprint,
            "config": stages.config_fingerprint,
            "taxonomy": stages.taxonomy_fingerprint,
        },
        "stage_counts": {
            "normalized_bytes": stages.normalized_text.len(),
            "blocks": stages.blocks.len(),
            "accepted": accepted,
            "rejected": stages.outcomes.len() - accepted,
            "questions": stages.questions.len(),
        }
    });
    let summary_path = output_dir.join("summary.json");
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    tracing::info!("  💾 {}", summary_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcqscan_core::{McqProcessor, ParsingConfig};

    const SAMPLE: &str = "1. What is the unit of electric current? (a) Volt (b) Ampere (c) Ohm (d) Watt";

    fn processor() -> McqProcessor {
        McqProcessor::new(ParsingConfig::default()).unwrap()
    }

    #[test]
    fn records_render_as_array() {
        let outcome = processor().process_text(SAMPLE);
        let rendered = render(&outcome, OutputFormat::Records, "inline").unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert_eq!(value[0]["id"], "Q001");
    }

    #[test]
    fn full_document_carries_counters_and_summary() {
        let outcome = processor().process_text(SAMPLE);
        let rendered = render(&outcome, OutputFormat::Full, "sample.txt").unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["source"], "sample.txt");
        assert_eq!(value["processing"]["blocks_seen"], 1);
        assert_eq!(value["summary"]["total_questions"], 1);
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn summary_of_empty_input_is_zeroed() {
        let outcome = processor().process_text("no questions here");
        let rendered = render(&outcome, OutputFormat::Summary, "-").unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["total_questions"], 0);
    }

    #[test]
    fn writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write("[]", Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn stage_dump_writes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let stages = processor().process_text_capture_stages(SAMPLE).unwrap();
        save_stages(&stages, dir.path(), "inline").unwrap();

        for name in [
            "stage1_normalized.txt",
            "stage2a_blocks.json",
            "stage2b_outcomes.json",
            "stage2c_parsed_questions.json",
            "stage3_questions.json",
            "summary.json",
        ] {
            assert!(dir.path().join(name).exists(), "missing {name}");
        }

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("summary.json")).unwrap()).unwrap();
        assert_eq!(summary["stage_counts"]["accepted"], 1);
        assert_eq!(summary["fingerprints"]["source"].as_str().map(str::len), Some(64));
    }
}
