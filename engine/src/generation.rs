//! Monotonic request generations.
//!
//! Each centrality request takes the next generation number. A result is
//! only applied if its generation is still the latest one issued: anything
//! older belongs to a view the caller has already moved past.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared counter; clones observe the same sequence.
#[derive(Debug, Clone, Default)]
pub struct RequestGeneration(Arc<AtomicU64>);

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new generation. The first call returns 1.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Latest generation issued, 0 if none.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let gen = RequestGeneration::new();
        assert_eq!(gen.current(), 0);
        assert_eq!(gen.advance(), 1);
        assert_eq!(gen.advance(), 2);
        assert!(gen.is_current(2));
        assert!(!gen.is_current(1));
    }

    #[test]
    fn test_clones_share_sequence() {
        let a = RequestGeneration::new();
        let b = a.clone();
        a.advance();
        assert_eq!(b.advance(), 2);
        assert_eq!(a.current(), 2);
    }
}
