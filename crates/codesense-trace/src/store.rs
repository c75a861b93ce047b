//! Trace store: the ordered step sequence of the current session.

use std::sync::Arc;

use crate::error::{Result, TraceError};
use crate::step::Step;

/// Holds the read-only step sequence of one trace.
///
/// Cloning is cheap; clones share the same steps.
#[derive(Debug, Clone)]
pub struct TraceStore {
    steps: Arc<[Step]>,
}

impl Default for TraceStore {
    fn default() -> Self {
        Self {
            steps: Arc::from(Vec::new()),
        }
    }
}

impl TraceStore {
    /// Create an empty store ("no trace yet").
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `steps`.
    pub fn from_steps(steps: Vec<Step>) -> Result<Self> {
        let mut store = Self::new();
        store.load(steps)?;
        Ok(store)
    }

    /// Replace the sequence. On error the previous sequence is kept.
    ///
    /// Indices must form the contiguous range `[0, len)`.
    pub fn load(&mut self, steps: Vec<Step>) -> Result<()> {
        if let Some((expected, step)) = steps
            .iter()
            .enumerate()
            .find(|(position, step)| step.index != *position)
        {
            return Err(TraceError::IndexMismatch {
                expected,
                found: step.index,
            });
        }
        self.steps = steps.into();
        Ok(())
    }

    /// The step at `index`, clamped into `[0, len - 1]`.
    pub fn get(&self, index: usize) -> Result<&Step> {
        let index = self.clamp(index).ok_or(TraceError::OutOfRange)?;
        Ok(&self.steps[index])
    }

    /// Clamp `index` into the valid range; `None` when empty.
    pub fn clamp(&self, index: usize) -> Option<usize> {
        self.last_index().map(|last| index.min(last))
    }

    pub fn last_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Visualization;
    use proptest::prelude::*;

    fn make_steps(count: usize) -> Vec<Step> {
        (0..count)
            .map(|i| Step::new(i, Some(i as u32 + 1), Visualization::default()))
            .collect()
    }

    #[test]
    fn empty_store_fails_lookup() {
        let store = TraceStore::new();
        assert_eq!(store.get(0).unwrap_err(), TraceError::OutOfRange);
        assert!(store.is_empty());
    }

    #[test]
    fn get_clamps_past_end() {
        let store = TraceStore::from_steps(make_steps(3)).unwrap();
        assert_eq!(store.get(2).unwrap().index, 2);
        assert_eq!(store.get(100).unwrap().index, 2);
    }

    #[test]
    fn load_replaces_sequence() {
        let mut store = TraceStore::from_steps(make_steps(5)).unwrap();
        store.load(make_steps(2)).unwrap();
        assert_eq!(store.len(), 2);

        store.load(Vec::new()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn rejected_load_keeps_previous_steps() {
        let mut store = TraceStore::from_steps(make_steps(2)).unwrap();
        let mut bad = make_steps(3);
        bad[2].index = 7;

        assert_eq!(
            store.load(bad),
            Err(TraceError::IndexMismatch { expected: 2, found: 7 })
        );
        assert_eq!(store.len(), 2);
    }

    proptest! {
        #[test]
        fn get_stays_in_bounds(len in 1usize..50, index in 0usize..1000) {
            let store = TraceStore::from_steps(make_steps(len)).unwrap();
            let step = store.get(index).unwrap();
            prop_assert!(step.index < len);
            prop_assert_eq!(step.index, index.min(len - 1));
        }
    }
}
