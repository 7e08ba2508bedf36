use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};

use mcqscan_cli::output::{self, OutputFormat};
use mcqscan_cli::{logging, DebugConfig, McqProcessor, ParsingConfig};

#[derive(Parser)]
#[command(name = "mcqscan")]
#[command(about = "Extract multiple-choice questions from document text and tag them by subject")]
struct Args {
    /// Text file to process, or `-` for stdin
    #[arg(short, long, required_unless_present_any = ["taxonomy_stats", "dump_taxonomy"])]
    input: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keyword taxonomy (JSON or YAML); overrides the config's taxonomy_path
    #[arg(short, long)]
    taxonomy: Option<PathBuf>,

    /// Parse only, leave subject and topic empty
    #[arg(long)]
    no_classify: bool,

    /// Keep line breaks during normalization (for documents without blank lines between questions)
    #[arg(long)]
    preserve_line_breaks: bool,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output layout
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Records)]
    format: OutputFormat,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Dump all intermediate pipeline stage outputs to a directory
    /// Captures: normalized text, blocks, block outcomes, parsed and classified questions
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output
    #[arg(long, default_value = "test_outputs/stages")]
    stages_dir: PathBuf,

    /// Print subject/topic/keyword counts of the active taxonomy
    #[arg(long)]
    taxonomy_stats: bool,

    /// Write the active taxonomy to this path (JSON, or YAML by extension)
    #[arg(long)]
    dump_taxonomy: Option<PathBuf>,

    /// Trace blocks whose text contains any of these patterns
    #[arg(long, num_args = 1..)]
    debug_filter: Vec<String>,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    tracing::info!("🦀 mcqscan");

    let config = build_config(&args)?;
    let mut processor = McqProcessor::new(config).context("failed to build processor")?;

    if !args.debug_filter.is_empty() {
        processor.set_debug_config(DebugConfig::new(true, args.debug_filter.clone()));
    }

    if args.taxonomy_stats {
        let stats = processor.taxonomy().stats();
        tracing::info!(
            "📚 Taxonomy: {} subjects, {} topics, {} keywords",
            stats.total_subjects,
            stats.total_topics,
            stats.total_keywords
        );
    }

    if let Some(path) = &args.dump_taxonomy {
        processor
            .taxonomy()
            .save_to_file(path)
            .with_context(|| format!("failed to dump taxonomy to {}", path.display()))?;
    }

    let Some(input) = args.input.as_deref() else {
        return Ok(());
    };

    let raw = read_input(input)?;
    tracing::info!("📄 Processing: {}", input);

    // Stage dump mode: capture and save all intermediates
    if args.dump_stages {
        tracing::info!("🔬 Pipeline stage dump mode");
        let stages = processor
            .process_text_capture_stages(&raw)
            .context("stage capture failed")?;
        output::save_stages(&stages, &args.stages_dir, input)?;
        tracing::info!("✅ All stages dumped to: {}", args.stages_dir.display());
        return Ok(());
    }

    let outcome = processor.process_text_with_profiling(&raw, args.profile);
    if outcome.questions.is_empty() && outcome.blocks_seen > 0 {
        tracing::warn!(
            "⚠️  All {} blocks were rejected; try --preserve-line-breaks if questions run together",
            outcome.blocks_seen
        );
    }
    if outcome.low_confidence_classifications > 0 {
        tracing::info!(
            "🏷️  {} questions classified below the confidence threshold",
            outcome.low_confidence_classifications
        );
    }

    let rendered = output::render(&outcome, args.format, input)?;
    output::write(&rendered, args.output.as_deref())?;

    Ok(())
}

/// Load config (explicit file must parse) and apply CLI overrides.
fn build_config(args: &Args) -> Result<ParsingConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let config = ParsingConfig::load_from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            tracing::info!("📋 Loaded config from: {}", path.display());
            config
        }
        None => {
            tracing::info!("📋 Using default config");
            ParsingConfig::default()
        }
    };

    if let Some(taxonomy) = &args.taxonomy {
        config.classification.taxonomy_path = Some(taxonomy.clone());
    }
    if args.no_classify {
        config.classification.enabled = false;
    }
    if args.preserve_line_breaks {
        config.normalization.preserve_line_breaks = true;
    }

    Ok(config)
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }

    let path = Path::new(input);
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    // Extracted text is often not clean UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
