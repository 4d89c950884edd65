//! Bounded batches of candidates.

use super::entry::CandidateEntry;
use super::ids::BatchId;

/// An ordered group of up to `capacity` candidates, processed together to
/// limit resource spikes. Exists only for the duration of one deletion
/// attempt.
#[derive(Debug)]
pub struct Batch {
    pub id: BatchId,
    entries: Vec<CandidateEntry>,
    capacity: usize,
}

impl Batch {
    pub fn new(capacity: usize) -> Self {
        Self {
            id: BatchId::generate(),
            entries: Vec::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Push a candidate. Callers must check [`Batch::is_full`] first.
    pub fn push(&mut self, entry: CandidateEntry) {
        debug_assert!(self.entries.len() < self.capacity);
        self.entries.push(entry);
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drain the batch for processing, keeping the allocation.
    pub fn take(&mut self) -> Vec<CandidateEntry> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_up_to_capacity() {
        let mut batch = Batch::new(2);
        assert!(batch.is_empty());

        batch.push(CandidateEntry::file("/a", 1));
        assert!(!batch.is_full());

        batch.push(CandidateEntry::file("/b", 1));
        assert!(batch.is_full());
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn take_empties_the_batch() {
        let mut batch = Batch::new(8);
        batch.push(CandidateEntry::file("/a", 1));

        let drained = batch.take();
        assert_eq!(drained.len(), 1);
        assert!(batch.is_empty());
    }
}
