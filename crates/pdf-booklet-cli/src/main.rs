use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pdf_booklet::{BookletOptions, PageSize, SizeStatus};
use std::path::PathBuf;

/// Ratio above which the summary suggests further manual reduction
const TIPS_RATIO: f64 = 4.0;

#[derive(Parser)]
#[command(name = "pdfb", about = "Turn a PDF into a printable booklet", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Impose and optimize a PDF as a booklet
    Create {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Load options from a JSON file; flags given here override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Booklet page size (half of each output sheet)
        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        /// Binding margin in mm, added on the spine side of each page
        #[arg(long)]
        binding_margin: Option<f32>,

        /// Bleed in mm, added on the outer edges of each page
        #[arg(long)]
        bleed: Option<f32>,

        /// Draw crop marks at the trim corners
        #[arg(long)]
        crop_marks: bool,

        /// Pages per signature (rounded up to a multiple of 4)
        #[arg(long)]
        signature: Option<usize>,

        /// Stream compression level, 0 (none) to 4 (maximum)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=4))]
        compression: Option<u8>,

        /// Never re-encode embedded images
        #[arg(long)]
        no_image_optimization: bool,

        /// JPEG quality for re-encoded images (25-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(25..=100))]
        quality: Option<u8>,

        /// Skip qpdf linearization in the aggressive pass
        #[arg(long)]
        no_linearize: bool,
    },

    /// Show the booklet plan for a PDF without rendering it
    Plan {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Pages per signature (rounded up to a multiple of 4)
        #[arg(long)]
        signature: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A4,
    Letter,
    Legal,
}

impl From<PaperArg> for PageSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A4 => Self::A4,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Create {
            input,
            output,
            config,
            paper,
            binding_margin,
            bleed,
            crop_marks,
            signature,
            compression,
            no_image_optimization,
            quality,
            no_linearize,
        } => {
            let mut options = match &config {
                Some(path) => BookletOptions::load(path)
                    .await
                    .with_context(|| format!("loading {}", path.display()))?,
                None => BookletOptions::default(),
            };

            if let Some(paper) = paper {
                options.page_size = paper.into();
            }
            if let Some(mm) = binding_margin {
                options.binding_margin_mm = mm;
            }
            if let Some(mm) = bleed {
                options.bleed_mm = mm;
            }
            if crop_marks {
                options.crop_marks = true;
            }
            if signature.is_some() {
                options.signature_size = signature;
            }
            if let Some(level) = compression {
                options.compression_level = level;
            }
            if no_image_optimization {
                options.optimize_images = false;
            }
            if let Some(quality) = quality {
                options.image_quality = quality;
            }
            if no_linearize {
                options.linearize = false;
            }

            let metadata = pdf_booklet::convert_file(&input, &output, &options)
                .await
                .with_context(|| format!("converting {}", input.display()))?;

            println!("Booklet → {}", output.display());
            println!(
                "  Pages: {} ({} blank added)",
                metadata.padded_page_count,
                metadata.blank_pages_added()
            );
            for stage in &metadata.stages {
                println!(
                    "  {}: {} → {} bytes",
                    stage.stage, stage.size_before, stage.size_after
                );
                for note in &stage.notes {
                    println!("    {}", note);
                }
            }
            for degraded in &metadata.degraded {
                println!("  {} skipped: {}", degraded.stage, degraded.reason);
            }

            let status = match metadata.status {
                SizeStatus::Good => "good",
                SizeStatus::Large => "large",
            };
            println!(
                "  Size: {:.2} MB → {:.2} MB ({:.1}x, {})",
                megabytes(metadata.original_size_bytes),
                megabytes(metadata.final_size_bytes),
                metadata.size_ratio,
                status
            );

            if metadata.size_ratio > TIPS_RATIO {
                println!();
                println!("The booklet is still much larger than the source. To reduce it further:");
                println!("  - lower --quality");
                println!("  - drop --no-image-optimization if set");
                println!("  - raise --compression to 4");
            }
        }

        Commands::Plan { input, signature } => {
            let document = pdf_booklet::load_pdf(&input)
                .await
                .with_context(|| format!("loading {}", input.display()))?;
            let page_count = document.get_pages().len();

            let options = BookletOptions {
                signature_size: signature,
                ..Default::default()
            };
            let stats = pdf_booklet::calculate_statistics(page_count, &options)?;
            let plan = pdf_booklet::normalize(page_count, signature)?;

            println!("Booklet plan for {}:", input.display());
            println!("  Source pages: {}", stats.source_pages);
            println!("  Padded pages: {}", stats.padded_pages);
            println!("  Blank pages added: {}", stats.blank_pages_added);
            println!("  Signatures: {}", stats.signatures);
            println!("  Output spreads: {}", stats.output_spreads);
            println!("  Sheets: {}", stats.sheets);

            for (number, &range) in plan.signature_ranges.iter().enumerate() {
                println!(
                    "  Signature {} (pages {}-{}):",
                    number + 1,
                    range.start + 1,
                    range.end
                );
                for pair in pdf_booklet::layout::plan_signature(range) {
                    println!(
                        "    {} | {}",
                        page_label(&plan, pair.left),
                        page_label(&plan, pair.right)
                    );
                }
            }
        }
    }

    Ok(())
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// One-based page number, or "blank" for padding
fn page_label(plan: &pdf_booklet::BookletPlan, index: usize) -> String {
    if plan.is_real_page(index) {
        (index + 1).to_string()
    } else {
        "blank".to_string()
    }
}
