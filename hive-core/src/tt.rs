//! Transposition table keyed by position fingerprint

use crate::game::Move;

/// How a stored score relates to the true value of the position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// True value is at least the score (fail-high)
    Lower,
    /// True value is at most the score (fail-low)
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: u64,
    /// Remaining search depth the score was computed with
    pub depth: u32,
    pub score: i32,
    pub bound: Bound,
    pub best: Option<Move>,
}

/// Probe and store counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TtStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
    pub used: usize,
}

/// Fixed-size, one entry per bucket, depth-preferred replacement
pub struct TranspositionTable {
    buckets: Vec<Option<Entry>>,
    mask: usize,
    probes: u64,
    hits: u64,
    stores: u64,
}

impl TranspositionTable {
    /// `size` is rounded up to a power of two
    pub fn new(size: usize) -> Self {
        let size = size.max(1).next_power_of_two();
        Self {
            buckets: vec![None; size],
            mask: size - 1,
            probes: 0,
            hits: 0,
            stores: 0,
        }
    }

    pub fn probe(&mut self, key: u64) -> Option<Entry> {
        self.probes += 1;
        let entry = self.buckets[key as usize & self.mask].filter(|e| e.key == key);
        if entry.is_some() {
            self.hits += 1;
        }
        entry
    }

    /// Keep the existing entry only if it belongs to the same position and
    /// was searched deeper.
    pub fn store(&mut self, entry: Entry) {
        let slot = &mut self.buckets[entry.key as usize & self.mask];
        let replace = match slot {
            Some(old) => old.key != entry.key || old.depth <= entry.depth,
            None => true,
        };
        if replace {
            *slot = Some(entry);
            self.stores += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().filter(|b| b.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.buckets.fill(None);
        self.probes = 0;
        self.hits = 0;
        self.stores = 0;
    }

    pub fn stats(&self) -> TtStats {
        TtStats {
            probes: self.probes,
            hits: self.hits,
            stores: self.stores,
            used: self.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: u64, depth: u32, score: i32) -> Entry {
        Entry {
            key,
            depth,
            score,
            bound: Bound::Exact,
            best: None,
        }
    }

    #[test]
    fn test_store_and_probe() {
        let mut tt = TranspositionTable::new(16);
        assert!(tt.probe(5).is_none());
        tt.store(entry(5, 2, 40));
        assert_eq!(tt.probe(5).map(|e| e.score), Some(40));
        // same bucket, different key
        assert!(tt.probe(5 + 16).is_none());
        assert_eq!(tt.stats().hits, 1);
    }

    #[test]
    fn test_depth_preferred_replacement() {
        let mut tt = TranspositionTable::new(16);
        tt.store(entry(3, 4, 10));
        tt.store(entry(3, 1, 99));
        assert_eq!(tt.probe(3).unwrap().score, 10);
        tt.store(entry(3, 4, 20));
        assert_eq!(tt.probe(3).unwrap().score, 20);
        // a different position always takes the bucket
        tt.store(entry(3 + 16, 0, 7));
        assert!(tt.probe(3).is_none());
        assert_eq!(tt.probe(3 + 16).unwrap().score, 7);
    }

    #[test]
    fn test_clear() {
        let mut tt = TranspositionTable::new(10);
        tt.store(entry(1, 1, 1));
        assert_eq!(tt.len(), 1);
        tt.clear();
        assert!(tt.is_empty());
        assert_eq!(tt.stats(), TtStats::default());
    }
}
