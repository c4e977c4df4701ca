use crate::types::ImageDescriptor;

/// Ordered descriptors of one image. Insertion order is detection order
/// until [`DescriptorCollection::sort_by_area`] is called.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorCollection {
    descriptors: Vec<ImageDescriptor>,
}

/// Closest region of the second image for one region of the first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionPairing {
    pub first: usize,
    pub second: usize,
    pub distance: f64,
}

/// Log-scaled invariants beyond this magnitude (raw below 1e-5) carry no
/// shape information and are left out of [`shape_distance`]
pub const MAX_MATCHED_LOG_HU: f64 = 5.0;

fn carries_shape(h: f64) -> bool {
    h != 0.0 && h.abs() <= MAX_MATCHED_LOG_HU
}

/// I1-style distance between two log-scaled Hu vectors; `None` unless both carry Hu moments.
/// Components that are negligible in either vector are skipped.
pub fn shape_distance(a: &ImageDescriptor, b: &ImageDescriptor) -> Option<f64> {
    let (ha, hb) = (a.hu_moments.as_ref()?, b.hu_moments.as_ref()?);
    Some(
        ha.iter()
            .zip(hb)
            .filter(|&(&x, &y)| carries_shape(x) && carries_shape(y))
            .map(|(x, y)| (x - y).abs())
            .sum(),
    )
}

impl DescriptorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, descriptor: ImageDescriptor) {
        self.descriptors.push(descriptor);
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageDescriptor> {
        self.descriptors.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ImageDescriptor> {
        self.descriptors.get(index)
    }

    /// Ascending area; equal areas keep their detection order
    pub fn sort_by_area(&mut self) {
        self.descriptors.sort_by(|a, b| a.area.total_cmp(&b.area));
    }

    /// Human-readable block per region, numbered from 0 in collection order
    pub fn report(&self) -> String {
        let mut out = String::new();
        for (i, descriptor) in self.descriptors.iter().enumerate() {
            out.push_str(&format!("Region {}\n{}", i, descriptor));
        }
        out
    }

    /// Pair each region here with its nearest region in `other` by [`shape_distance`].
    /// Regions without Hu moments are left unpaired.
    pub fn pair_by_shape(&self, other: &DescriptorCollection) -> Vec<RegionPairing> {
        self.descriptors
            .iter()
            .enumerate()
            .filter_map(|(first, a)| {
                other
                    .descriptors
                    .iter()
                    .enumerate()
                    .filter_map(|(second, b)| shape_distance(a, b).map(|distance| RegionPairing { first, second, distance }))
                    .min_by(|x, y| x.distance.total_cmp(&y.distance))
            })
            .collect()
    }
}

impl FromIterator<ImageDescriptor> for DescriptorCollection {
    fn from_iter<I: IntoIterator<Item = ImageDescriptor>>(iter: I) -> Self {
        Self { descriptors: iter.into_iter().collect() }
    }
}

impl Extend<ImageDescriptor> for DescriptorCollection {
    fn extend<I: IntoIterator<Item = ImageDescriptor>>(&mut self, iter: I) {
        self.descriptors.extend(iter);
    }
}

impl<'a> IntoIterator for &'a DescriptorCollection {
    type Item = &'a ImageDescriptor;
    type IntoIter = std::slice::Iter<'a, ImageDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

impl IntoIterator for DescriptorCollection {
    type Item = ImageDescriptor;
    type IntoIter = std::vec::IntoIter<ImageDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}
