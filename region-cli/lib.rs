use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use flexi_logger::{Cleanup, Duplicate, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageReader, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use rayon::prelude::*;

pub use region_core::{self, init_thread_pool, Contour, Keypoint, Point};
pub use region_descriptors::{self, DescriptorCollection, DescriptorConfig, DescriptorError, DescriptorPipeline, PipelineBuilder};
pub use region_keypoints::{self, KeypointComparison, KeypointConfig, KeypointError, KeypointPipeline, KeypointPipelineBuilder};

/// Default directory for CSV artifacts, relative to the working directory
pub const DEFAULT_OUT_DIR: &str = "out";

/// Failure of one stage, naming the image or file it concerns
#[derive(Debug)]
pub enum RegionError {
    /// The file could not be opened or decoded
    Load { path: PathBuf, source: ImageError },
    /// Extraction, measurement or CSV export failed for one image
    Describe { path: PathBuf, source: DescriptorError },
    /// Keypoint comparison failed
    Compare(KeypointError),
    /// The match image could not be written
    Render { path: PathBuf, source: ImageError },
    Config { path: PathBuf, message: String },
    /// Descriptor settings from command-line flags are inconsistent
    Settings(DescriptorError),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for RegionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionError::Load { path, source } => write!(f, "Cannot load {}: {}", path.display(), source),
            RegionError::Describe { path, source } => {
                write!(f, "Describing {} failed: {}", path.display(), source)
            }
            RegionError::Compare(e) => write!(f, "Keypoint comparison failed: {}", e),
            RegionError::Render { path, source } => {
                write!(f, "Cannot render matches to {}: {}", path.display(), source)
            }
            RegionError::Config { path, message } => {
                write!(f, "Invalid configuration file {}: {}", path.display(), message)
            }
            RegionError::Settings(e) => write!(f, "Invalid descriptor settings: {}", e),
            RegionError::ThreadPool(e) => write!(f, "Thread pool error: {}", e),
        }
    }
}

impl std::error::Error for RegionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegionError::Load { source, .. } | RegionError::Render { source, .. } => Some(source),
            RegionError::Describe { source, .. } | RegionError::Settings(source) => Some(source),
            RegionError::Compare(e) => Some(e),
            RegionError::ThreadPool(e) => Some(e),
            RegionError::Config { .. } => None,
        }
    }
}

impl From<KeypointError> for RegionError {
    fn from(err: KeypointError) -> Self {
        RegionError::Compare(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for RegionError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        RegionError::ThreadPool(err)
    }
}

pub type RegionResult<T> = Result<T, RegionError>;

/// Logger for the binary: stderr by default, rotating files plus stderr
/// warnings when `log_dir` is given. `level` is overridden by `RUST_LOG`.
pub fn setup_logging(level: &str, log_dir: Option<&Path>) -> Result<LoggerHandle, FlexiLoggerError> {
    let logger = Logger::try_with_env_or_str(level)?;
    let logger = match log_dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir))
            .duplicate_to_stderr(Duplicate::Warn)
            .rotate(
                flexi_logger::Criterion::Size(1024 * 1024),
                Naming::Timestamps,
                Cleanup::KeepLogFiles(5),
            ),
        None => logger.log_to_stderr(),
    };
    logger.start()
}

/// Decode an image file, format guessed from its contents
pub fn load_image<P: AsRef<Path>>(path: P) -> RegionResult<DynamicImage> {
    let path = path.as_ref();
    let load_err = |source| RegionError::Load { path: path.to_path_buf(), source };
    ImageReader::open(path)
        .map_err(ImageError::IoError)
        .and_then(|reader| reader.with_guessed_format().map_err(ImageError::IoError))
        .and_then(|reader| reader.decode())
        .map_err(load_err)
}

/// Descriptor configuration from a `.json` file, anything else is read as TOML
pub fn load_descriptor_config<P: AsRef<Path>>(path: P) -> RegionResult<DescriptorConfig> {
    let path = path.as_ref();
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let loaded = if is_json { DescriptorConfig::load_json(path) } else { DescriptorConfig::load_toml(path) };
    loaded.map_err(|e| RegionError::Config { path: path.to_path_buf(), message: e.to_string() })
}

/// Attribute an invalid descriptor configuration to the file it came from,
/// or to the command-line settings when there is none
pub fn settings_error(config_file: Option<&Path>, err: DescriptorError) -> RegionError {
    match config_file {
        Some(path) => RegionError::Config { path: path.to_path_buf(), message: err.to_string() },
        None => RegionError::Settings(err),
    }
}

/// `<out_dir>/<image stem><suffix>.csv`
pub fn csv_path(out_dir: &Path, image: &Path, suffix: &str) -> PathBuf {
    let stem = image.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "image".to_string());
    out_dir.join(format!("{}{}.csv", stem, suffix))
}

/// Keypoint CSV paths for a pair; identical stems get `_1` / `_2` appended
pub fn keypoint_csv_paths(out_dir: &Path, first: &Path, second: &Path) -> (PathBuf, PathBuf) {
    if first.file_stem() == second.file_stem() {
        (csv_path(out_dir, first, "_1_keypoints"), csv_path(out_dir, second, "_2_keypoints"))
    } else {
        (csv_path(out_dir, first, "_keypoints"), csv_path(out_dir, second, "_keypoints"))
    }
}

/// Descriptor CSV path per image. Images sharing a stem are numbered
/// `_1`, `_2`, ... in input order so no two write the same file.
pub fn descriptor_csv_paths(out_dir: &Path, images: &[PathBuf]) -> Vec<PathBuf> {
    let mut totals: HashMap<Option<&OsStr>, usize> = HashMap::new();
    for image in images {
        *totals.entry(image.file_stem()).or_default() += 1;
    }

    let mut seen: HashMap<Option<&OsStr>, usize> = HashMap::new();
    images
        .iter()
        .map(|image| {
            let stem = image.file_stem();
            if totals[&stem] == 1 {
                return csv_path(out_dir, image, "");
            }
            let n = seen.entry(stem).or_default();
            *n += 1;
            csv_path(out_dir, image, &format!("_{}", n))
        })
        .collect()
}

/// Load, describe and export one image to `csv`
pub fn describe_image(pipeline: &DescriptorPipeline, image: &Path, csv: &Path) -> RegionResult<DescriptorCollection> {
    let decoded = load_image(image)?;
    pipeline
        .describe_and_export(&decoded, csv)
        .map_err(|source| RegionError::Describe { path: image.to_path_buf(), source })
}

/// One independent pipeline run per image, in parallel. Results keep input
/// order; a failing image does not affect the others.
pub fn describe_images(
    pipeline: &DescriptorPipeline,
    images: &[PathBuf],
    out_dir: &Path,
) -> Vec<RegionResult<DescriptorCollection>> {
    let targets = descriptor_csv_paths(out_dir, images);
    images
        .par_iter()
        .zip(targets.par_iter())
        .map(|(image, csv)| describe_image(pipeline, image, csv))
        .collect()
}

/// Keypoint comparison of two files, writing both keypoint CSVs under `out_dir`
pub fn compare_images(
    pipeline: &KeypointPipeline,
    first: &Path,
    second: &Path,
    out_dir: &Path,
) -> RegionResult<(DynamicImage, DynamicImage, KeypointComparison)> {
    let a = load_image(first)?;
    let b = load_image(second)?;
    let (csv1, csv2) = keypoint_csv_paths(out_dir, first, second);
    let images = [a, b];
    let comparison = pipeline.compare_and_export(&images, csv1, csv2)?;
    let [a, b] = images;
    Ok((a, b, comparison))
}

/// Side-by-side canvas, second image resized to the first's size, keypoints
/// circled and matches joined by lines
pub fn render_matches(first: &DynamicImage, second: &DynamicImage, comparison: &KeypointComparison) -> RgbaImage {
    let left = first.to_rgba8();
    let (w, h) = left.dimensions();
    let right = imageops::resize(&second.to_rgba8(), w, h, FilterType::Triangle);

    let mut canvas = RgbaImage::new(w * 2, h);
    imageops::replace(&mut canvas, &left, 0, 0);
    imageops::replace(&mut canvas, &right, w as i64, 0);

    let marker = Rgba([255, 0, 0, 255]);
    let line = Rgba([0, 255, 0, 255]);
    let offset = w as f32;

    for kp in &comparison.first.keypoints {
        draw_hollow_circle_mut(&mut canvas, (kp.x as i32, kp.y as i32), 3, marker);
    }
    for kp in &comparison.second.keypoints {
        draw_hollow_circle_mut(&mut canvas, ((kp.x + offset) as i32, kp.y as i32), 3, marker);
    }
    for m in &comparison.matches {
        let (a, b) = (&comparison.first.keypoints[m.query_idx], &comparison.second.keypoints[m.train_idx]);
        draw_line_segment_mut(&mut canvas, (a.x, a.y), (b.x + offset, b.y), line);
    }
    canvas
}

pub fn save_rendering<P: AsRef<Path>>(canvas: &RgbaImage, path: P) -> RegionResult<()> {
    let path = path.as_ref();
    let render_err = |source| RegionError::Render { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| render_err(ImageError::IoError(e)))?;
    }
    canvas.save(path).map_err(render_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn write_square_png(dir: &Path, name: &str, x0: u32, y0: u32) -> PathBuf {
        let img = GrayImage::from_fn(100, 100, |x, y| {
            if x >= x0 && x < x0 + 30 && y >= y0 && y < y0 + 30 { Luma([230]) } else { Luma([20]) }
        });
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_csv_paths() {
        let out = Path::new("out");
        assert_eq!(csv_path(out, Path::new("data/coins.png"), ""), PathBuf::from("out/coins.csv"));
        assert_eq!(
            keypoint_csv_paths(out, Path::new("a/scene.png"), Path::new("b/scene.jpg")),
            (PathBuf::from("out/scene_1_keypoints.csv"), PathBuf::from("out/scene_2_keypoints.csv"))
        );
        assert_eq!(
            keypoint_csv_paths(out, Path::new("left.png"), Path::new("right.png")).1,
            PathBuf::from("out/right_keypoints.csv")
        );
    }

    #[test]
    fn test_descriptor_csv_paths_number_shared_stems() {
        let images = [
            PathBuf::from("a/scene.png"),
            PathBuf::from("coins.jpg"),
            PathBuf::from("b/scene.png"),
        ];
        assert_eq!(
            descriptor_csv_paths(Path::new("out"), &images),
            [
                PathBuf::from("out/scene_1.csv"),
                PathBuf::from("out/coins.csv"),
                PathBuf::from("out/scene_2.csv"),
            ]
        );
    }

    #[test]
    fn test_same_stem_images_keep_separate_csvs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        let one = write_square_png(&dir.path().join("a"), "scene.png", 20, 20);
        let two = {
            let img = GrayImage::from_fn(100, 100, |x, y| {
                let left = (10..30).contains(&x) && (10..30).contains(&y);
                let right = (60..90).contains(&x) && (50..80).contains(&y);
                if left || right { Luma([230]) } else { Luma([20]) }
            });
            let path = dir.path().join("b").join("scene.png");
            img.save(&path).unwrap();
            path
        };
        let out = dir.path().join("out");

        let pipeline = PipelineBuilder::new().otsu().build().unwrap();
        let results = describe_images(&pipeline, &[one, two], &out);
        assert_eq!(results[0].as_ref().unwrap().len(), 1);
        assert_eq!(results[1].as_ref().unwrap().len(), 2);

        let rows = |name: &str| std::fs::read_to_string(out.join(name)).unwrap().lines().count() - 1;
        assert_eq!(rows("scene_1.csv"), 1);
        assert_eq!(rows("scene_2.csv"), 2);
        assert!(!out.join("scene.csv").exists());
    }

    #[test]
    fn test_missing_image_names_the_file() {
        let err = load_image("does/not/exist.png").unwrap_err();
        assert!(matches!(err, RegionError::Load { .. }));
        assert!(err.to_string().contains("does/not/exist.png"));
    }

    #[test]
    fn test_describe_images_is_fail_soft() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_square_png(dir.path(), "square.png", 20, 20);
        let bad = dir.path().join("missing.png");
        let out = dir.path().join("out");

        let pipeline = PipelineBuilder::new().otsu().build().unwrap();
        let results = describe_images(&pipeline, &[bad, good], &out);

        assert!(matches!(results[0], Err(RegionError::Load { .. })));
        let collection = results[1].as_ref().unwrap();
        assert_eq!(collection.len(), 1);
        assert!(out.join("square.csv").exists());
        assert!(!out.join("missing.csv").exists());
    }

    #[test]
    fn test_compare_and_render() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_square_png(dir.path(), "a.png", 15, 15);
        let b = write_square_png(dir.path(), "b.png", 45, 40);
        let out = dir.path().join("out");

        let pipeline = KeypointPipeline::new(KeypointConfig::new()).unwrap();
        let (img_a, img_b, comparison) = compare_images(&pipeline, &a, &b, &out).unwrap();
        assert!(out.join("a_keypoints.csv").exists());
        assert!(out.join("b_keypoints.csv").exists());

        let canvas = render_matches(&img_a, &img_b, &comparison);
        assert_eq!(canvas.dimensions(), (200, 100));
        let render = dir.path().join("render").join("matches.png");
        save_rendering(&canvas, &render).unwrap();
        assert!(render.exists());
    }

    #[test]
    fn test_config_file_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "strategy = 12").unwrap();
        let err = load_descriptor_config(&path).unwrap_err();
        assert!(matches!(err, RegionError::Config { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_invalid_flags_without_config_file() {
        let err = PipelineBuilder::new().size_filter(10.0, 1.0).to_config().unwrap_err();
        let err = settings_error(None, err);
        assert!(matches!(err, RegionError::Settings(_)));
        let message = err.to_string();
        assert!(message.starts_with("Invalid descriptor settings: "), "{}", message);
        assert!(!message.contains("file"));

        let from_file = PipelineBuilder::new().size_filter(10.0, 1.0).to_config().unwrap_err();
        let from_file = settings_error(Some(Path::new("cfg/regions.toml")), from_file);
        assert!(from_file.to_string().contains("cfg/regions.toml"));
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        DescriptorConfig::legacy_preset().save_json(&path).unwrap();
        assert_eq!(load_descriptor_config(&path).unwrap(), DescriptorConfig::legacy_preset());
    }
}
