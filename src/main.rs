use clap::{Parser, Subcommand};
use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};
use tracing::info;

use shelfcheck::annotate::annotate;
use shelfcheck::{ArrangementChecker, ArrangementReport, Detection, ShelfConfig, ShelfReport};

#[derive(Parser)]
#[command(name = "shelfcheck")]
#[command(about = "Check product arrangement on shelf photographs")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with tuning parameters
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Vertical tolerance in pixels for grouping products into rows
    #[arg(long, global = true)]
    row_thresh: Option<f64>,

    /// Text similarity needed to treat two products as the same
    #[arg(long, global = true)]
    match_threshold: Option<f64>,

    /// Include per-row OCR text and product names in the report
    #[arg(long, global = true)]
    trace: bool,

    /// Pretty-print the JSON report
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Check a JSON list of detections
    Check {
        /// Path to detections JSON file
        #[arg(value_name = "DETECTIONS")]
        detections: PathBuf,

        /// Shelf image the detections came from (needed for --annotate-out)
        #[arg(long, value_name = "IMAGE")]
        image: Option<PathBuf>,

        /// Save an annotated copy of the image
        #[arg(long, value_name = "FILE", requires = "image")]
        annotate_out: Option<PathBuf>,
    },
    /// Read text from detector regions on an image, then check the arrangement
    #[cfg(feature = "ocr")]
    Scan {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// JSON list of {x1,y1,x2,y2} product boxes from the detector
        #[arg(long, value_name = "FILE")]
        regions: Option<PathBuf>,

        /// Discard OCR fragments at or below this confidence
        #[arg(long)]
        min_confidence: Option<f32>,

        /// Save an annotated copy of the image
        #[arg(long, value_name = "FILE")]
        annotate_out: Option<PathBuf>,

        /// Save debug outputs to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<ShelfConfig> {
    let mut config = match &cli.config {
        Some(path) => ShelfConfig::load(path)?,
        None => ShelfConfig::default(),
    };
    if let Some(row_thresh) = cli.row_thresh {
        config.row_thresh = row_thresh;
    }
    if let Some(match_threshold) = cli.match_threshold {
        config.match_threshold = match_threshold;
    }
    Ok(config)
}

fn load_image(path: &Path) -> anyhow::Result<DynamicImage> {
    info!(path = %path.display(), "loading image");
    let img = ImageReader::open(path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    info!(width = img.width(), height = img.height(), "image loaded");
    Ok(img)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))
}

fn save_annotated(
    image: &DynamicImage,
    detections: &[Detection],
    report: &ArrangementReport,
    out: &Path,
) -> anyhow::Result<()> {
    annotate(image, detections, &report.verdict)
        .save(out)
        .map_err(|e| anyhow::anyhow!("Failed to save annotated image: {}", e))?;
    info!(path = %out.display(), "annotated image saved");
    Ok(())
}

fn print_report(
    cli: &Cli,
    report: &ArrangementReport,
    detections: &[Detection],
) -> anyhow::Result<()> {
    let mut shelf_report = ShelfReport::new(report);
    if cli.trace {
        shelf_report = shelf_report.with_trace(report, detections);
    }
    println!("{}", shelf_report.to_json(cli.pretty)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    config.validate()?;
    let checker = ArrangementChecker::from_config(&config);

    match &cli.command {
        Command::Check {
            detections,
            image,
            annotate_out,
        } => {
            let detections: Vec<Detection> = read_json(detections)?;
            let report = checker.check(&detections)?;

            if let (Some(image_path), Some(out)) = (image, annotate_out) {
                let img = load_image(image_path)?;
                save_annotated(&img, &detections, &report, out)?;
            }

            print_report(&cli, &report, &detections)?;
        }
        #[cfg(feature = "ocr")]
        Command::Scan {
            image,
            regions,
            min_confidence,
            annotate_out,
            debug_out,
        } => {
            let img = load_image(image)?;
            let regions: Vec<shelfcheck::BBox> = match regions {
                Some(path) => read_json(path)?,
                None => Vec::new(),
            };

            let mut config = config.clone();
            if let Some(min_confidence) = min_confidence {
                config.min_ocr_confidence = *min_confidence;
            }
            config.validate()?;

            let mut supplier = shelfcheck::DetectionSupplier::with_ocrs().with_config(&config);
            if let Some(dir) = debug_out {
                supplier = supplier.with_debug(dir.clone());
            }

            let detections = supplier.supply(img.clone(), &regions)?;
            info!(count = detections.len(), "detections built");
            let report = checker.check(&detections)?;

            if let Some(out) = annotate_out {
                save_annotated(&img, &detections, &report, out)?;
            }

            print_report(&cli, &report, &detections)?;
        }
    }

    Ok(())
}
