use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use panelcut::analysis::{self, AnalyzerConfig, GeminiConfig};
use panelcut::synthetic::MockPage;
use panelcut::{Exporter, PanelConfig, build_standard_pipeline, load_page};

#[derive(Parser)]
#[command(name = "panelcut")]
#[command(about = "Detect comic panels on a page and export them in reading order")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract panels from a page image
    Extract(ExtractArgs),

    /// Write a synthetic page with known panels
    MockPage {
        /// Where to write the page
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        #[arg(long, default_value_t = 800)]
        width: u32,

        #[arg(long, default_value_t = 1200)]
        height: u32,
    },
}

#[derive(Args)]
struct ExtractArgs {
    /// Path to input page image
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// JSON config file; flags below override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory panels are written to
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// File name template, must contain {index}
    #[arg(long)]
    template: Option<String>,

    /// Adaptive threshold window size (odd)
    #[arg(long)]
    block_size: Option<u32>,

    /// Constant subtracted from the local mean
    #[arg(long, allow_hyphen_values = true)]
    bias: Option<i32>,

    /// Minimum panel width and height in pixels
    #[arg(long)]
    min_dim: Option<u32>,

    /// Minimum panel area as a fraction of the page
    #[arg(long)]
    min_area_frac: Option<f64>,

    /// Maximum panel area as a fraction of the page
    #[arg(long)]
    max_area_frac: Option<f64>,

    /// Overlap ratio above which a box is suppressed
    #[arg(long)]
    overlap_thresh: Option<f64>,

    /// Save every stage's images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print the exported panels as JSON
    #[arg(long)]
    json: bool,

    /// Describe each panel's content after export
    #[arg(long)]
    analyze: bool,

    /// Gemini API key; without one, analysis returns placeholders
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model used for analysis
    #[arg(long, default_value = analysis::gemini::DEFAULT_MODEL)]
    model: String,

    /// Per-panel analysis timeout in seconds
    #[arg(long, default_value_t = 60)]
    analysis_timeout: u64,
}

impl ExtractArgs {
    fn panel_config(&self) -> anyhow::Result<PanelConfig> {
        let mut config = match &self.config {
            Some(path) => PanelConfig::from_file(path)?,
            None => PanelConfig::default(),
        };

        if let Some(out) = &self.out {
            config.export.output_dir = out.clone();
        }
        if let Some(template) = &self.template {
            config.export.file_template = template.clone();
        }
        if let Some(block_size) = self.block_size {
            config.threshold.block_size = block_size;
        }
        if let Some(bias) = self.bias {
            config.threshold.bias = bias;
        }
        if let Some(min_dim) = self.min_dim {
            config.filter.min_dim = min_dim;
        }
        if let Some(frac) = self.min_area_frac {
            config.filter.min_area_frac = frac;
        }
        if let Some(frac) = self.max_area_frac {
            config.filter.max_area_frac = frac;
        }
        if let Some(thresh) = self.overlap_thresh {
            config.nms.overlap_thresh = thresh;
        }

        config.validate()?;
        Ok(config)
    }

    fn analyzer_config(&self) -> AnalyzerConfig {
        match AnalyzerConfig::from_api_key(self.api_key.clone()) {
            AnalyzerConfig::Gemini(gemini) => AnalyzerConfig::Gemini(
                GeminiConfig {
                    model: self.model.clone(),
                    ..gemini
                }
                .with_timeout(Duration::from_secs(self.analysis_timeout)),
            ),
            unconfigured => unconfigured,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "panelcut=debug" } else { "panelcut=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Extract(args) => extract(args).await,
        Command::MockPage { output, width, height } => {
            let page = MockPage::scaled(width, height)?;
            page.render()
                .save(&output)
                .with_context(|| format!("Failed to save mock page to {}", output.display()))?;
            println!("Mock page saved to {}", output.display());
            for (i, b) in page.panels().iter().enumerate() {
                println!("  Panel {}: ({}, {}) {}x{}", i + 1, b.x(), b.y(), b.width(), b.height());
            }
            Ok(())
        }
    }
}

async fn extract(args: ExtractArgs) -> anyhow::Result<()> {
    let config = args.panel_config()?;

    tracing::debug!("Loading image: {:?}", args.image_path);
    let img = load_page(&args.image_path)?;
    tracing::debug!("Image loaded: {}x{}", img.width(), img.height());

    // Build pipeline
    let mut pipeline_builder = build_standard_pipeline(&config);
    if let Some(debug_dir) = &args.debug_out {
        pipeline_builder = pipeline_builder.with_debug(debug_dir)?;
    }

    let results = pipeline_builder.run(img)?;
    let crops = results
        .into_iter()
        .map(|item| -> anyhow::Result<_> { Ok((item.region("Export")?, item.image)) })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let exporter = Exporter::new(config.export.clone())?;
    let artifacts = match exporter.export_crops(crops) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            for artifact in e.written() {
                eprintln!("  written before failure: {}", artifact.path.display());
            }
            return Err(e.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&artifacts)?);
    } else {
        println!("\n=== Panel Extraction Results ===");
        println!("Total panels: {}", artifacts.len());
        if artifacts.is_empty() {
            println!("No panels detected.");
        }
        for a in &artifacts {
            println!("  {} at ({}, {}) {}x{} -> {}",
                    a.index, a.bbox.x(), a.bbox.y(), a.bbox.width(), a.bbox.height(),
                    a.path.display());
        }
    }

    if args.analyze && !artifacts.is_empty() {
        let analyzer = args.analyzer_config().build()?;
        let reports = analysis::analyze_panels(analyzer.as_ref(), &artifacts, analysis::DEFAULT_PROMPT).await;

        println!("\n=== Panel Analysis ===");
        for report in reports {
            println!("\nPanel {} ({}):", report.index, report.path.display());
            match report.result {
                Ok(analysis) => println!("{}", serde_json::to_string_pretty(&analysis)?),
                Err(e) => println!("  analysis failed: {e}"),
            }
        }
    }

    Ok(())
}
