use image::GrayImage;

/// Bresenham circle of radius 3, clockwise from the top
pub const FAST_OFFSETS: [(i32, i32); 16] = [
    (0, -3), (1, -3), (2, -2), (3, -1),
    (3, 0), (3, 1), (2, 2), (1, 3),
    (0, 3), (-1, 3), (-2, 2), (-3, 1),
    (-3, 0), (-3, -1), (-2, -2), (-1, -3),
];

/// Contiguous arc length for FAST-9
pub const ARC_LENGTH: usize = 9;

/// Corner candidate in level coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    pub x: u32,
    pub y: u32,
    pub response: f32,
}

/// Check if there are at least `min_count` consecutive set bits in a circular 16-bit mask
pub fn has_consecutive_bits(mask: u16, min_count: usize) -> bool {
    if min_count == 0 || min_count > 16 {
        return false;
    }
    let mut test_mask = mask;
    for i in 1..min_count {
        test_mask &= mask.rotate_left(i as u32);
        if test_mask == 0 {
            return false;
        }
    }
    test_mask != 0
}

/// Segment test at one pixel. Returns the corner response, the mean absolute
/// contrast of the circle pixels beyond the threshold, or `None`.
/// The caller keeps `(x, y)` at least 3 pixels from every border.
pub fn segment_test(img: &GrayImage, x: u32, y: u32, threshold: u8) -> Option<f32> {
    let center = img.get_pixel(x, y)[0] as i32;
    let t = threshold as i32;
    let mut brighter: u16 = 0;
    let mut darker: u16 = 0;
    let mut contrast = 0i32;
    let mut count = 0i32;

    for (i, &(dx, dy)) in FAST_OFFSETS.iter().enumerate() {
        let p = img.get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32)[0] as i32;
        if p > center + t {
            brighter |= 1 << i;
        } else if p < center - t {
            darker |= 1 << i;
        } else {
            continue;
        }
        contrast += (p - center).abs();
        count += 1;
    }

    if has_consecutive_bits(brighter, ARC_LENGTH) || has_consecutive_bits(darker, ARC_LENGTH) {
        Some(contrast as f32 / count as f32)
    } else {
        None
    }
}

/// All FAST-9 corners of an image in raster order
pub fn detect_corners(img: &GrayImage, threshold: u8) -> Vec<Corner> {
    let (w, h) = img.dimensions();
    if w < 7 || h < 7 {
        return Vec::new();
    }
    let mut corners = Vec::new();
    for y in 3..h - 3 {
        for x in 3..w - 3 {
            if let Some(response) = segment_test(img, x, y, threshold) {
                corners.push(Corner { x, y, response });
            }
        }
    }
    corners
}

/// Greedy suppression: strongest first, drop anything closer than `min_distance`
/// to an already kept corner. Ties keep raster order.
pub fn non_maximum_suppression(corners: &[Corner], min_distance: f32) -> Vec<Corner> {
    let mut sorted = corners.to_vec();
    sorted.sort_by(|a, b| b.response.total_cmp(&a.response));

    let min_distance_sq = min_distance * min_distance;
    let mut kept: Vec<Corner> = Vec::new();
    for candidate in sorted {
        let isolated = kept.iter().all(|k| {
            let dx = candidate.x as f32 - k.x as f32;
            let dy = candidate.y as f32 - k.y as f32;
            dx * dx + dy * dy >= min_distance_sq
        });
        if isolated {
            kept.push(candidate);
        }
    }
    kept
}
