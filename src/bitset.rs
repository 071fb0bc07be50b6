//! Dense bit sets over state indices.
//!
//! Used for visited marks in graph searches, for the rows of simulation
//! preorders and for antichain macro-states, where whole-set operations
//! (subset tests, intersections) dominate the running time.

/// A set of small integers backed by a vector of u64 words.
///
/// # Invariants
///
/// - `count` equals the number of set bits.
/// - Two sets with the same members compare equal regardless of how many
///   trailing zero words they carry.
#[derive(Debug, Clone, Default)]
pub struct BitSet {
    words: Vec<u64>,
    count: usize,
}

impl BitSet {
    const BITS_PER_WORD: usize = 64;

    /// Creates an empty set able to hold `capacity` bits without growing.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(Self::BITS_PER_WORD)],
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    fn word_and_bit(index: usize) -> (usize, u64) {
        (index / Self::BITS_PER_WORD, 1u64 << (index % Self::BITS_PER_WORD))
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        let (w, mask) = Self::word_and_bit(index);
        w < self.words.len() && self.words[w] & mask != 0
    }

    /// Sets a bit. Returns true if it was not set before.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        let (w, mask) = Self::word_and_bit(index);
        if w >= self.words.len() {
            self.words.resize(w + 1, 0);
        }
        if self.words[w] & mask != 0 {
            return false;
        }
        self.words[w] |= mask;
        self.count += 1;
        true
    }

    /// Clears a bit. Returns true if it was set before.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        let (w, mask) = Self::word_and_bit(index);
        if w >= self.words.len() || self.words[w] & mask == 0 {
            return false;
        }
        self.words[w] &= !mask;
        self.count -= 1;
        true
    }

    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
        self.count = 0;
    }

    /// Checks whether every member of `self` is a member of `other`.
    pub fn is_subset(&self, other: &BitSet) -> bool {
        if self.count > other.count {
            return false;
        }
        self.words.iter().enumerate().all(|(i, &w)| {
            let o = other.words.get(i).copied().unwrap_or(0);
            w & !o == 0
        })
    }

    /// Keeps only the members also in `other`.
    pub fn intersect_with(&mut self, other: &BitSet) {
        for (i, w) in self.words.iter_mut().enumerate() {
            *w &= other.words.get(i).copied().unwrap_or(0);
        }
        self.recount();
    }

    fn recount(&mut self) {
        self.count = self.words.iter().map(|w| w.count_ones() as usize).sum();
    }

    /// Iterates over the members in increasing order.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            words: &self.words,
            word_idx: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl PartialEq for BitSet {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.is_subset(other)
    }
}

impl Eq for BitSet {}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = BitSet::default();
        set.extend(iter);
        set
    }
}

impl Extend<usize> for BitSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for index in iter {
            self.insert(index);
        }
    }
}

/// Iterator over the members of a [`BitSet`].
pub struct BitSetIter<'a> {
    words: &'a [u64],
    word_idx: usize,
    current: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_idx * BitSet::BITS_PER_WORD + bit);
            }
            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word_idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut bs = BitSet::new(10);
        assert!(bs.insert(3));
        assert!(!bs.insert(3));
        assert!(bs.insert(200));
        assert_eq!(bs.len(), 2);
        assert!(bs.contains(200));
        assert!(bs.remove(3));
        assert!(!bs.remove(3));
        assert_eq!(bs.iter().collect::<Vec<_>>(), vec![200]);
    }

    #[test]
    fn test_subset_ignores_capacity() {
        let small: BitSet = [1, 5].into_iter().collect();
        let mut large = BitSet::new(1000);
        large.extend([1, 5, 900]);
        assert!(small.is_subset(&large));
        assert!(!large.is_subset(&small));
        large.remove(900);
        assert_eq!(small, large);
    }

    #[test]
    fn test_intersect_with() {
        let mut a: BitSet = [1, 2, 3, 64].into_iter().collect();
        let b: BitSet = [2, 64, 100].into_iter().collect();
        a.intersect_with(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![2, 64]);
        assert_eq!(a.len(), 2);

        let mut wide = BitSet::new(200);
        wide.extend([5, 150]);
        wide.intersect_with(&[5].into_iter().collect());
        assert_eq!(wide.iter().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_clear() {
        let mut bs: BitSet = [1, 50, 99].into_iter().collect();
        bs.clear();
        assert!(bs.is_empty());
        assert_eq!(bs.iter().next(), None);
    }
}
