//! Command line driver for glyph deduplication across font files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use gallra::{
    batch_subset, find_duplicates, find_shape_variants, format_file_size, format_validation,
    parse_ranges, validate_glyph_coverage, AnalysisReport, DedupEngine, DedupError, DedupOutcome,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report duplicated glyphs across fonts without modifying anything
    Analyze {
        /// Font files to analyze
        #[arg(required = true)]
        fonts: Vec<PathBuf>,

        /// Compare glyph outlines to split true duplicates from shape variants
        #[arg(long)]
        shape_analysis: bool,

        /// Similarity threshold in 0.0..=1.0 below which outlines count as variants
        #[arg(long, default_value_t = 1.0)]
        similarity_threshold: f32,

        /// Analyze at most this many shared code points, smallest first
        #[arg(long)]
        codepoint_limit: Option<usize>,
    },
    /// Remove duplicated glyphs from lower priority fonts and write slimmed copies
    Deduplicate {
        /// Font files to process
        #[arg(required = true)]
        fonts: Vec<PathBuf>,

        /// Directory the subset fonts are written to
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Fonts in priority order, highest first (repeatable); unlisted
        /// fonts follow in input order
        #[arg(short, long)]
        priority: Vec<PathBuf>,

        /// Only deduplicate inside this code point range, e.g. 0x4E00-0x9FFF
        /// (repeatable)
        #[arg(short = 'r', long = "range")]
        ranges: Vec<String>,

        /// Never remove code points in this range, e.g. 0x0020-0x007F
        /// (repeatable)
        #[arg(short = 'e', long = "exclude")]
        excludes: Vec<String>,

        /// Suffix appended to output file names
        #[arg(short, long, default_value = "_dedup")]
        suffix: String,

        /// Keep code points whose outlines differ between fonts in every font
        #[arg(long)]
        shape_analysis: bool,

        /// Similarity threshold in 0.0..=1.0 below which outlines count as variants
        #[arg(long, default_value_t = 1.0)]
        similarity_threshold: f32,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(args.command) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<ExitCode, DedupError> {
    match command {
        Command::Analyze {
            fonts,
            shape_analysis,
            similarity_threshold,
            codepoint_limit,
        } => {
            check_font_inputs(&fonts)?;
            let report = if shape_analysis {
                AnalysisReport::ShapeVariants(find_shape_variants(
                    &fonts,
                    similarity_threshold,
                    codepoint_limit,
                )?)
            } else {
                AnalysisReport::Duplicates(find_duplicates(&fonts)?)
            };
            println!("{}", report.render());
            Ok(ExitCode::SUCCESS)
        }
        Command::Deduplicate {
            fonts,
            output_dir,
            priority,
            ranges,
            excludes,
            suffix,
            shape_analysis,
            similarity_threshold,
        } => {
            check_font_inputs(&fonts)?;
            for path in &priority {
                if !fonts.contains(path) {
                    return Err(DedupError::PriorityNotInInputs(path.clone()));
                }
            }
            if output_dir.exists() && !output_dir.is_dir() {
                return Err(DedupError::OutputNotDirectory(output_dir));
            }
            let unicode_ranges = if ranges.is_empty() {
                None
            } else {
                Some(parse_ranges(&ranges)?)
            };
            let exclude_ranges = if excludes.is_empty() {
                None
            } else {
                Some(parse_ranges(&excludes)?)
            };
            let priority = (!priority.is_empty()).then_some(priority);

            log::info!("partitioning code points across {} fonts", fonts.len());
            let outcome = if shape_analysis {
                let engine = DedupEngine::with_shape_analysis(priority, similarity_threshold)?;
                DedupOutcome::ShapeAware(engine.deduplicate_with_shapes(
                    &fonts,
                    unicode_ranges.as_deref(),
                    exclude_ranges.as_deref(),
                )?)
            } else {
                let engine = DedupEngine::new(priority);
                DedupOutcome::Basic(engine.deduplicate(
                    &fonts,
                    unicode_ranges.as_deref(),
                    exclude_ranges.as_deref(),
                )?)
            };
            println!("{}", outcome.render());

            log::info!("subsetting {} fonts", outcome.kept().len());
            let outputs = batch_subset(outcome.kept(), &output_dir, &suffix)?;

            println!("Output validation");
            let mut all_valid = true;
            for ((source, kept), output) in outcome.kept().iter().zip(&outputs) {
                let validation = validate_glyph_coverage(output, kept);
                if !validation.is_valid {
                    all_valid = false;
                }
                println!();
                println!("{}", display_name(output));
                println!("{}", format_validation(&validation));
                if let (Ok(original), Ok(new)) =
                    (std::fs::metadata(source), std::fs::metadata(output))
                {
                    println!("{}", format_file_size(original.len(), new.len()));
                }
            }

            if all_valid {
                println!();
                println!("Done. Output written to {}", output_dir.display());
                Ok(ExitCode::SUCCESS)
            } else {
                println!();
                println!("Some outputs failed validation, see above.");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn check_font_inputs(fonts: &[PathBuf]) -> Result<(), DedupError> {
    for path in fonts {
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
            .unwrap_or(false);
        if !supported {
            return Err(DedupError::UnsupportedFormat(path.clone()));
        }
    }
    Ok(())
}
