//! The alphabet partition (spec §4.1 step 1): code-points are grouped into
//! equivalence classes by intersecting every character class used by any
//! pattern, so DFA transitions are indexed by a small class id instead of a
//! raw code point.
use super::charclass::CharClass;

#[derive(Debug, Clone)]
pub struct AlphabetMap {
  /// Sorted, non-overlapping, contiguous blocks; block index == class id.
  blocks: Vec<(u32, u32)>,
}

impl AlphabetMap {
  /// Builds the partition from every [CharClass] that appears as a pattern
  /// leaf. `alphabet_max` bounds the default "everything else" class.
  pub fn build(classes: &[CharClass], alphabet_max: u32) -> Self {
    let mut breakpoints: Vec<u32> = vec![0, alphabet_max.saturating_add(1)];
    for class in classes {
      for &(lo, hi) in &class.ranges {
        breakpoints.push(lo);
        if hi < u32::MAX {
          breakpoints.push(hi + 1);
        }
      }
    }
    breakpoints.sort_unstable();
    breakpoints.dedup();

    let mut blocks = Vec::with_capacity(breakpoints.len());
    for w in breakpoints.windows(2) {
      if w[0] < w[1] {
        blocks.push((w[0], w[1] - 1));
      }
    }
    if blocks.is_empty() {
      blocks.push((0, alphabet_max));
    }
    Self { blocks }
  }

  pub fn num_classes(&self) -> u32 {
    self.blocks.len() as u32
  }

  pub fn class_of(&self, code_point: u32) -> Option<u32> {
    self
      .blocks
      .binary_search_by(|&(lo, hi)| {
        if code_point < lo {
          std::cmp::Ordering::Greater
        } else if code_point > hi {
          std::cmp::Ordering::Less
        } else {
          std::cmp::Ordering::Equal
        }
      })
      .ok()
      .map(|i| i as u32)
  }

  /// Returns every alphabet class id fully covered by `class` -- valid
  /// because every class's boundaries are also partition breakpoints.
  pub fn classes_covering(&self, class: &CharClass) -> Vec<u32> {
    let mut out = Vec::new();
    for (i, &(lo, _hi)) in self.blocks.iter().enumerate() {
      if class.contains(lo) {
        out.push(i as u32);
      }
    }
    out
  }

  pub fn block_range(&self, class_id: u32) -> (u32, u32) {
    self.blocks[class_id as usize]
  }

  pub fn blocks(&self) -> &[(u32, u32)] {
    &self.blocks
  }
}
