use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use region_cli::region_core::default_threads;
use region_cli::region_descriptors::{
    AngleConvention, ApproximationMode, Binarization, CsvFormat, DescriptorStrategy, RetrievalMode,
};
use region_cli::{
    compare_images, describe_images, init_thread_pool, load_descriptor_config, load_image, render_matches,
    save_rendering, settings_error, setup_logging, DescriptorConfig, DescriptorPipeline, KeypointPipelineBuilder,
    PipelineBuilder, RegionError, RegionResult, DEFAULT_OUT_DIR,
};

#[derive(Parser)]
#[command(name = "regions")]
#[command(about = "Contour region descriptors and keypoint comparison for images")]
#[command(version)]
struct Cli {
    /// Log filter, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Write rotating log files to this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Worker threads, 0 for one per core
    #[arg(long, global = true, default_value_t = 0)]
    threads: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe the regions of each image and write `<out>/<stem>.csv`
    Describe(DescribeArgs),
    /// Detect and match keypoints between two images
    Compare(CompareArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Raw,
    Hull,
    Approx,
}

#[derive(Clone, Copy, ValueEnum)]
enum BinarizeArg {
    Edge,
    Otsu,
}

#[derive(Clone, Copy, ValueEnum)]
enum RetrievalArg {
    External,
    List,
    Ccomp,
    Tree,
}

#[derive(Clone, Copy, ValueEnum)]
enum ApproximationArg {
    None,
    Simple,
}

#[derive(Clone, Copy, ValueEnum)]
enum AngleArg {
    Signed,
    Unsigned,
}

#[derive(Args)]
struct DescribeArgs {
    /// Images to describe
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Base configuration (.json or .toml); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_OUT_DIR)]
    out: PathBuf,

    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    #[arg(long, value_enum)]
    binarize: Option<BinarizeArg>,

    #[arg(long, value_enum)]
    retrieval: Option<RetrievalArg>,

    #[arg(long, value_enum)]
    approximation: Option<ApproximationArg>,

    #[arg(long, value_enum)]
    angle: Option<AngleArg>,

    /// Minimum and maximum region area
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    area: Option<Vec<f64>>,

    /// Four-column CSV without centroid and Hu moments
    #[arg(long)]
    legacy_csv: bool,

    #[arg(long)]
    no_hu: bool,

    /// Order regions by ascending area
    #[arg(long)]
    sort: bool,

    /// Also write the effective configuration to this file
    #[arg(long)]
    save_config: Option<PathBuf>,
}

#[derive(Args)]
struct CompareArgs {
    first: PathBuf,
    second: PathBuf,

    #[arg(long, default_value = DEFAULT_OUT_DIR)]
    out: PathBuf,

    /// Side-by-side match image
    #[arg(long)]
    render: Option<PathBuf>,

    #[arg(long)]
    threshold: Option<u8>,

    #[arg(long)]
    max_keypoints: Option<usize>,

    #[arg(long)]
    no_cross_check: bool,

    /// Also pair regions of the two images by Hu-moment distance
    #[arg(long)]
    shapes: bool,
}

fn descriptor_builder(args: &DescribeArgs) -> RegionResult<PipelineBuilder> {
    let base = match &args.config {
        Some(path) => load_descriptor_config(path)?,
        None => DescriptorConfig::new(),
    };
    let mut builder = PipelineBuilder::from_config(base);

    if let Some(strategy) = args.strategy {
        builder = builder.strategy(match strategy {
            StrategyArg::Raw => DescriptorStrategy::Unmodified,
            StrategyArg::Hull => DescriptorStrategy::ConvexHull,
            StrategyArg::Approx => DescriptorStrategy::PolygonApproximation,
        });
    }
    match args.binarize {
        Some(BinarizeArg::Otsu) => builder = builder.otsu(),
        Some(BinarizeArg::Edge) => builder = builder.binarization(Binarization::DEFAULT_EDGE),
        None => {}
    }
    if let Some(retrieval) = args.retrieval {
        builder = builder.retrieval(match retrieval {
            RetrievalArg::External => RetrievalMode::External,
            RetrievalArg::List => RetrievalMode::List,
            RetrievalArg::Ccomp => RetrievalMode::CComp,
            RetrievalArg::Tree => RetrievalMode::Tree,
        });
    }
    if let Some(approximation) = args.approximation {
        builder = builder.approximation(match approximation {
            ApproximationArg::None => ApproximationMode::None,
            ApproximationArg::Simple => ApproximationMode::Simple,
        });
    }
    if let Some(angle) = args.angle {
        builder = builder.angle_convention(match angle {
            AngleArg::Signed => AngleConvention::Signed,
            AngleArg::Unsigned => AngleConvention::Unsigned,
        });
    }
    if let Some([min, max]) = args.area.as_deref() {
        builder = builder.size_filter(*min, *max);
    }
    if args.legacy_csv {
        builder = builder.csv_format(CsvFormat::Legacy);
    }
    if args.no_hu {
        builder = builder.hu_moments(false);
    }
    if args.sort {
        builder = builder.sort_by_area(true);
    }
    Ok(builder)
}

fn run_describe(args: &DescribeArgs) -> RegionResult<bool> {
    let builder = descriptor_builder(args)?;
    log::info!("Descriptor settings: {}", builder.summary());
    let config = builder.to_config().map_err(|e| settings_error(args.config.as_deref(), e))?;

    if let Some(path) = &args.save_config {
        let saved = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            config.save_json(path)
        } else {
            config.save_toml(path)
        };
        if let Err(e) = saved {
            log::warn!("Could not save configuration to {}: {}", path.display(), e);
        }
    }

    let pipeline = DescriptorPipeline::new(config).map_err(|e| settings_error(args.config.as_deref(), e))?;

    let t0 = Instant::now();
    let results = describe_images(&pipeline, &args.images, &args.out);
    let mut all_ok = true;
    for (image, result) in args.images.iter().zip(results) {
        match result {
            Ok(collection) => {
                println!("== {} ({} regions)", image.display(), collection.len());
                if !collection.is_empty() {
                    println!("{}", collection.report());
                }
            }
            Err(e) => {
                log::error!("{}", e);
                all_ok = false;
            }
        }
    }
    log::info!("Described {} images in {:.2?}", args.images.len(), t0.elapsed());
    Ok(all_ok)
}

fn run_compare(args: &CompareArgs) -> RegionResult<()> {
    let mut builder = KeypointPipelineBuilder::new().cross_check(!args.no_cross_check);
    if let Some(threshold) = args.threshold {
        builder = builder.threshold(threshold);
    }
    if let Some(max) = args.max_keypoints {
        builder = builder.max_keypoints(max);
    }
    let pipeline = builder.build()?;

    let t0 = Instant::now();
    let (first, second, comparison) = compare_images(&pipeline, &args.first, &args.second, &args.out)?;
    println!("Time taken: {:.2?}", t0.elapsed());
    println!(
        "{}: {} keypoints, {}: {} keypoints, {} matches",
        args.first.display(),
        comparison.first.keypoints.len(),
        args.second.display(),
        comparison.second.keypoints.len(),
        comparison.matches.len()
    );

    if let Some(path) = &args.render {
        save_rendering(&render_matches(&first, &second, &comparison), path)?;
        println!("Saved match image as {}", path.display());
    }

    if args.shapes {
        print_shape_pairs(&args.first, &args.second)?;
    }
    Ok(())
}

fn print_shape_pairs(first: &Path, second: &Path) -> RegionResult<()> {
    let pipeline = PipelineBuilder::new().build().map_err(RegionError::Settings)?;
    let (a, b) = (load_image(first)?, load_image(second)?);
    let comparison = pipeline
        .compare(&a, &b)
        .map_err(|source| RegionError::Describe { path: first.to_path_buf(), source })?;
    for pair in &comparison.pairs {
        println!("Region {} <-> Region {}: distance {:.4}", pair.first, pair.second, pair.distance);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _logger = match setup_logging(&cli.log_level, cli.log_dir.as_deref()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            None
        }
    };

    let threads = if cli.threads == 0 { default_threads() } else { cli.threads };
    match init_thread_pool(threads) {
        Ok(()) => log::debug!("Worker threads: {}", threads),
        Err(e) => log::warn!("Using the default thread pool: {}", e),
    }

    let outcome = match &cli.command {
        Commands::Describe(args) => run_describe(args),
        Commands::Compare(args) => run_compare(args).map(|()| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
