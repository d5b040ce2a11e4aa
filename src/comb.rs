//! Combinatorics: enumeration of ordered, non-repeating runner sequences.

/// Decodes a mixed-radix `sequence` number into its constituent `ordinals`.
pub fn pick(cardinalities: &[usize], sequence: u64, ordinals: &mut [usize]) {
    let mut residual = sequence;
    for (index, &cardinality) in cardinalities.iter().enumerate() {
        let cardinality = cardinality as u64;
        let (quotient, remainder) = (residual / cardinality, residual % cardinality);
        residual = quotient;
        ordinals[index] = remainder as usize;
    }
}

/// Number of ordered selections of `positions` distinct items from a pool of `items`;
/// the falling factorial `items · (items − 1) · … · (items − positions + 1)`. Zero when
/// `positions` exceeds `items`.
pub fn count_permutations(items: usize, positions: usize) -> u64 {
    if positions > items {
        return 0;
    }
    ((items - positions + 1)..=items)
        .map(|item| item as u64)
        .product()
}

pub fn is_unique_quadratic(elements: &[usize]) -> bool {
    for (index, element) in elements.iter().enumerate() {
        for other in &elements[index + 1..] {
            if element == other {
                return false;
            }
        }
    }
    true
}

pub fn is_unique_linear(elements: &[usize], bitmap: &mut [bool]) -> bool {
    bitmap.fill(false);
    for &element in elements {
        if bitmap[element] {
            return false;
        }
        bitmap[element] = true;
    }
    true
}

/// Iterates over every ordered sequence of `positions` distinct items drawn from a pool
/// of `items`, in a deterministic generation order. An `items` pool smaller than
/// `positions` yields nothing.
pub struct Permuter {
    cardinalities: Vec<usize>,
    sequences: u64,
}
impl Permuter {
    pub fn new(items: usize, positions: usize) -> Self {
        let cardinalities = vec![items; positions];
        let sequences = cardinalities.iter().product::<usize>() as u64;
        Self {
            cardinalities,
            sequences,
        }
    }
}

impl IntoIterator for Permuter {
    type Item = Vec<usize>;
    type IntoIter = Iter;

    fn into_iter(self) -> Self::IntoIter {
        let items = self.cardinalities.first().copied().unwrap_or(0);
        Self::IntoIter {
            bitmap: vec![false; items],
            permuter: self,
            sequence: 0,
        }
    }
}

pub struct Iter {
    permuter: Permuter,
    sequence: u64,
    bitmap: Vec<bool>,
}
impl Iterator for Iter {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.sequence != self.permuter.sequences {
            let mut ordinals = vec![0; self.permuter.cardinalities.len()];
            pick(&self.permuter.cardinalities, self.sequence, &mut ordinals);
            self.sequence += 1;
            if is_unique_linear(&ordinals, &mut self.bitmap) {
                return Some(ordinals);
            }
        }
        None
    }
}
