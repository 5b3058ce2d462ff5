//! Fixed-capacity rolling buffer.

use std::collections::VecDeque;

/// Insertion-ordered buffer holding at most `capacity` values.
///
/// Pushing into a full buffer evicts the oldest value.
#[derive(Debug, Clone)]
pub struct RollingBuffer<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> RollingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest when at capacity.
    /// A zero-capacity buffer stays empty.
    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Copy of the contents, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.values.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
