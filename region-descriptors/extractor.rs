use image::{DynamicImage, GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use region_core::{Contour, Point};

use crate::config::{ApproximationMode, Binarization, RetrievalMode};
use crate::error::{DescriptorError, DescriptorResult};

/// A traced border with its place in the nesting hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct TracedContour {
    pub contour: Contour,
    pub is_hole: bool,
    /// Index of the enclosing border in the same result, if the retrieval mode keeps one
    pub parent: Option<usize>,
}

/// Finds closed region boundaries in an image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionExtractor {
    binarization: Binarization,
    retrieval: RetrievalMode,
    approximation: ApproximationMode,
}

impl Default for RegionExtractor {
    fn default() -> Self {
        Self::new(Binarization::default(), RetrievalMode::External, ApproximationMode::Simple)
    }
}

impl RegionExtractor {
    pub fn new(binarization: Binarization, retrieval: RetrievalMode, approximation: ApproximationMode) -> Self {
        Self { binarization, retrieval, approximation }
    }

    pub fn binarization(&self) -> Binarization {
        self.binarization
    }

    pub fn retrieval(&self) -> RetrievalMode {
        self.retrieval
    }

    pub fn approximation(&self) -> ApproximationMode {
        self.approximation
    }

    /// Raw contours in detection order. A blank image gives an empty list.
    pub fn extract_regions(&self, image: &DynamicImage) -> DescriptorResult<Vec<Contour>> {
        Ok(self
            .extract_hierarchy(image)?
            .into_iter()
            .map(|traced| traced.contour)
            .collect())
    }

    /// Contours together with hole flags and parent links
    pub fn extract_hierarchy(&self, image: &DynamicImage) -> DescriptorResult<Vec<TracedContour>> {
        let gray = to_grayscale(image)?;
        Ok(self.extract_from_gray(&gray))
    }

    /// Trace an already single-channel image
    pub fn extract_from_gray(&self, gray: &GrayImage) -> Vec<TracedContour> {
        let binary = binarize(gray, self.binarization);
        let traced = trace_contours(&binary, self.retrieval, self.approximation);
        log::debug!(
            "traced {} contours from {}x{} image ({:?}, {:?})",
            traced.len(),
            gray.width(),
            gray.height(),
            self.binarization,
            self.retrieval
        );
        traced
    }
}

/// Single-channel copy of the input; the caller's image is never modified
pub fn to_grayscale(image: &DynamicImage) -> DescriptorResult<GrayImage> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(DescriptorError::InvalidInput { width, height });
    }
    Ok(match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => other.to_luma8(),
    })
}

/// Foreground map: white (255) pixels are traced, black (0) is background
pub fn binarize(gray: &GrayImage, mode: Binarization) -> GrayImage {
    match mode {
        Binarization::Edge { low, high } => imageproc::edges::canny(gray, low, high),
        Binarization::Otsu => {
            let mut pixels = gray.pixels().map(|p| p[0]);
            let first = pixels.next().unwrap_or(0);
            if pixels.all(|v| v == first) {
                // nothing to separate
                return GrayImage::new(gray.width(), gray.height());
            }
            let level = imageproc::contrast::otsu_level(gray);
            GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
                if gray.get_pixel(x, y)[0] > level {
                    Luma([255])
                } else {
                    Luma([0])
                }
            })
        }
    }
}

/// Border following over a binary map, filtered and re-linked per retrieval mode
pub fn trace_contours(binary: &GrayImage, retrieval: RetrievalMode, approximation: ApproximationMode) -> Vec<TracedContour> {
    let raw = find_contours::<i32>(binary);

    raw.into_iter()
        .filter(|c| match retrieval {
            RetrievalMode::External => c.border_type == BorderType::Outer && c.parent.is_none(),
            _ => true,
        })
        .map(|c| {
            let is_hole = c.border_type == BorderType::Hole;
            let parent = match retrieval {
                RetrievalMode::External | RetrievalMode::List => None,
                RetrievalMode::CComp if !is_hole => None,
                RetrievalMode::CComp | RetrievalMode::Tree => c.parent,
            };
            let points: Vec<Point> = c.points.iter().map(|p| Point::new(p.x, p.y)).collect();
            let points = match approximation {
                ApproximationMode::None => close_ring(points),
                ApproximationMode::Simple => compress_runs(&close_ring(points)),
            };
            TracedContour { contour: Contour::new(points), is_hole, parent }
        })
        .collect()
}

/// Drop a trailing repeat of the first point
fn close_ring(mut points: Vec<Point>) -> Vec<Point> {
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Keep only points where the boundary changes direction
pub fn compress_runs(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            let (ax, ay) = ((cur.x - prev.x) as i64, (cur.y - prev.y) as i64);
            let (bx, by) = ((next.x - cur.x) as i64, (next.y - cur.y) as i64);
            let straight = ax * by - ay * bx == 0 && ax * bx + ay * by > 0;
            !straight
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() { points.to_vec() } else { kept }
}
