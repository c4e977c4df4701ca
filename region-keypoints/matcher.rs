use rayon::prelude::*;
use region_core::Descriptor;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A query descriptor paired with its nearest train descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DescriptorMatch {
    pub query_idx: usize,
    pub train_idx: usize,
    /// Hamming distance in bits
    pub distance: u32,
}

pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// Index and distance of the closest candidate; the lowest index wins ties
fn nearest(query: &Descriptor, candidates: &[Descriptor]) -> Option<(usize, u32)> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| (i, hamming_distance(query, c)))
        .min_by_key(|&(i, d)| (d, i))
}

/// Exhaustive Hamming nearest-neighbour matcher
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceMatcher {
    cross_check: bool,
}

impl BruteForceMatcher {
    pub fn new(cross_check: bool) -> Self {
        Self { cross_check }
    }

    pub fn cross_check(&self) -> bool {
        self.cross_check
    }

    /// At most one match per query, in query order. With cross-check a match
    /// survives only when the query is also the train descriptor's nearest.
    pub fn match_descriptors(&self, query: &[Descriptor], train: &[Descriptor]) -> Vec<DescriptorMatch> {
        query
            .par_iter()
            .enumerate()
            .filter_map(|(query_idx, q)| {
                let (train_idx, distance) = nearest(q, train)?;
                if self.cross_check {
                    let (back, _) = nearest(&train[train_idx], query)?;
                    if back != query_idx {
                        return None;
                    }
                }
                Some(DescriptorMatch { query_idx, train_idx, distance })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(fill: u8) -> Descriptor {
        [fill; 32]
    }

    #[test]
    fn test_hamming_distance() {
        assert_eq!(hamming_distance(&desc(0), &desc(0)), 0);
        assert_eq!(hamming_distance(&desc(0), &desc(0xff)), 256);
        assert_eq!(hamming_distance(&desc(0b1010_1010), &desc(0b0101_0101)), 256);
        let mut one = desc(0);
        one[5] = 0b0001_0000;
        assert_eq!(hamming_distance(&desc(0), &one), 1);
    }

    #[test]
    fn test_nearest_neighbour() {
        let query = [desc(0x00), desc(0xff)];
        let train = [desc(0xf0), desc(0xfe), desc(0x01)];
        let matches = BruteForceMatcher::new(false).match_descriptors(&query, &train);
        assert_eq!(matches.len(), 2);
        assert_eq!((matches[0].train_idx, matches[0].distance), (2, 32));
        assert_eq!((matches[1].train_idx, matches[1].distance), (1, 32));
    }

    #[test]
    fn test_cross_check_drops_one_sided_matches() {
        // both queries prefer train 0, which prefers query 0
        let query = [desc(0x0f), desc(0x1f)];
        let train = [desc(0x0f), desc(0xf0)];
        let plain = BruteForceMatcher::new(false).match_descriptors(&query, &train);
        let checked = BruteForceMatcher::new(true).match_descriptors(&query, &train);
        assert_eq!(plain.len(), 2);
        assert_eq!(checked, vec![DescriptorMatch { query_idx: 0, train_idx: 0, distance: 0 }]);
    }

    #[test]
    fn test_empty_inputs() {
        let matcher = BruteForceMatcher::new(true);
        assert!(matcher.match_descriptors(&[], &[desc(1)]).is_empty());
        assert!(matcher.match_descriptors(&[desc(1)], &[]).is_empty());
    }
}
