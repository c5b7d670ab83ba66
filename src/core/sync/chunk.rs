//! Chunk accumulation
//!
//! The accumulator holds at most `capacity` document sets. One slot is used
//! per record, whatever the number of locales.

use crate::domain::{LocalizedDocumentSet, Result, SyncError};

/// An ordered batch of document sets ready for dispatch
#[derive(Debug, Clone)]
pub struct Chunk {
    index: u64,
    items: Vec<LocalizedDocumentSet>,
}

impl Chunk {
    /// Sequence number of the chunk within the run, starting at 1
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Document sets in read order
    pub fn items(&self) -> &[LocalizedDocumentSet] {
        &self.items
    }

    /// Number of records in the chunk
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for chunks handed out by the accumulator
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Collects document sets into chunks of a fixed capacity
#[derive(Debug)]
pub struct ChunkAccumulator {
    capacity: usize,
    current: Vec<LocalizedDocumentSet>,
    next_index: u64,
}

impl ChunkAccumulator {
    /// Create an accumulator
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero capacity.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SyncError::Configuration(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            capacity,
            current: Vec::with_capacity(capacity),
            next_index: 1,
        })
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items in the open chunk
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Whether the open chunk is empty
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Whether the open chunk reached capacity
    pub fn is_full(&self) -> bool {
        self.current.len() >= self.capacity
    }

    /// Adds one document set and reports whether the chunk is now full
    ///
    /// # Errors
    ///
    /// Returns an engine error if the chunk was already full; it must be
    /// taken before appending again.
    pub fn append(&mut self, item: LocalizedDocumentSet) -> Result<bool> {
        if self.is_full() {
            return Err(SyncError::Engine(format!(
                "chunk of {} items is full and must be dispatched first",
                self.capacity
            )));
        }
        self.current.push(item);
        Ok(self.is_full())
    }

    /// Takes the open chunk if it is full
    pub fn take_full(&mut self) -> Option<Chunk> {
        if self.is_full() {
            self.take()
        } else {
            None
        }
    }

    /// Takes whatever is left at end of input, if anything
    pub fn flush_remainder(&mut self) -> Option<Chunk> {
        let chunk = self.take();
        if let Some(ref chunk) = chunk {
            tracing::debug!(chunk = chunk.index, size = chunk.len(), "Flushing final chunk");
        }
        chunk
    }

    fn take(&mut self) -> Option<Chunk> {
        if self.current.is_empty() {
            return None;
        }
        let items = std::mem::replace(&mut self.current, Vec::with_capacity(self.capacity));
        let chunk = Chunk {
            index: self.next_index,
            items,
        };
        self.next_index += 1;
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductId;
    use test_case::test_case;

    fn item(n: usize) -> LocalizedDocumentSet {
        LocalizedDocumentSet::new(ProductId::new(format!("P{n}")).unwrap())
    }

    fn chunk_sizes(records: usize, capacity: usize) -> Vec<usize> {
        let mut acc = ChunkAccumulator::new(capacity).unwrap();
        let mut sizes = Vec::new();
        for n in 0..records {
            if acc.append(item(n)).unwrap() {
                sizes.push(acc.take_full().unwrap().len());
            }
        }
        if let Some(chunk) = acc.flush_remainder() {
            sizes.push(chunk.len());
        }
        sizes
    }

    #[test_case(7, 3 => vec![3, 3, 1] ; "seven records in threes")]
    #[test_case(1000, 500 => vec![500, 500] ; "exact multiple")]
    #[test_case(2, 500 => vec![2] ; "single short chunk")]
    #[test_case(0, 10 => Vec::<usize>::new() ; "no input")]
    #[test_case(5, 1 => vec![1, 1, 1, 1, 1] ; "capacity one")]
    fn test_chunk_sizes(records: usize, capacity: usize) -> Vec<usize> {
        chunk_sizes(records, capacity)
    }

    #[test_case(1001, 500)]
    #[test_case(499, 500)]
    #[test_case(12345, 17)]
    fn test_chunk_totals(records: usize, capacity: usize) {
        let sizes = chunk_sizes(records, capacity);
        let full = sizes.iter().filter(|&&s| s == capacity).count();
        assert_eq!(full, records / capacity);
        assert_eq!(sizes.iter().sum::<usize>(), records);
        assert!(sizes.iter().all(|&s| (1..=capacity).contains(&s)));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(ChunkAccumulator::new(0).unwrap_err().is_configuration());
    }

    #[test]
    fn test_append_to_full_chunk_fails() {
        let mut acc = ChunkAccumulator::new(1).unwrap();
        assert!(acc.append(item(1)).unwrap());
        assert!(matches!(acc.append(item(2)), Err(SyncError::Engine(_))));
    }

    #[test]
    fn test_chunk_indices_and_order() {
        let mut acc = ChunkAccumulator::new(2).unwrap();
        acc.append(item(1)).unwrap();
        assert!(acc.take_full().is_none());
        acc.append(item(2)).unwrap();

        let first = acc.take_full().unwrap();
        assert_eq!(first.index(), 1);
        let ids: Vec<_> = first.items().iter().map(|s| s.label()).collect();
        assert_eq!(ids, vec!["P1", "P2"]);

        acc.append(item(3)).unwrap();
        let last = acc.flush_remainder().unwrap();
        assert_eq!(last.index(), 2);
        assert!(acc.flush_remainder().is_none());
        assert!(acc.is_empty());
    }
}
