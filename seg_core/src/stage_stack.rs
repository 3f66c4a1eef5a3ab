//! Bounded LIFO of per-stage encoder outputs.
//!
//! The encoder pushes one entry per stage; the decoder pops them back in reverse order as
//! skip connections. The stack tracks both counters so the pass can verify it consumed
//! exactly what it produced.

use crate::error::{Result, SegCoreError};

/// A bounded stack with a checked push/pop balance.
#[derive(Debug, Clone)]
pub struct StageStack<T> {
    entries: Vec<T>,
    capacity: usize,
    pushes: usize,
    pops: usize,
}

impl<T> StageStack<T> {
    /// Create an empty stack holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            pushes: 0,
            pops: 0,
        }
    }

    /// Push one stage output.
    pub fn push(&mut self, entry: T) -> Result<()> {
        if self.entries.len() == self.capacity {
            return Err(SegCoreError::StageStackOverflow {
                capacity: self.capacity,
            });
        }
        self.entries.push(entry);
        self.pushes += 1;
        Ok(())
    }

    /// Pop the most recent stage output.
    pub fn pop(&mut self) -> Result<T> {
        let entry = self.entries.pop().ok_or(SegCoreError::StageStackUnderflow)?;
        self.pops += 1;
        Ok(entry)
    }

    /// Number of entries currently held.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total pushes so far.
    #[inline]
    pub fn pushes(&self) -> usize {
        self.pushes
    }

    /// Total pops so far.
    #[inline]
    pub fn pops(&self) -> usize {
        self.pops
    }

    /// Consume the stack, failing unless every push was matched by a pop.
    pub fn finish(self) -> Result<()> {
        if self.pushes != self.pops || !self.entries.is_empty() {
            return Err(SegCoreError::UnbalancedStageStack {
                pushes: self.pushes,
                pops: self.pops,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut stack = StageStack::new(3);
        stack.push("stage0").unwrap();
        stack.push("stage1").unwrap();
        stack.push("stage2").unwrap();

        assert_eq!(stack.pop().unwrap(), "stage2");
        assert_eq!(stack.pop().unwrap(), "stage1");
        assert_eq!(stack.pop().unwrap(), "stage0");
        assert_eq!(stack.pushes(), 3);
        assert_eq!(stack.pops(), 3);
        stack.finish().unwrap();
    }

    #[test]
    fn test_overflow() {
        let mut stack = StageStack::new(1);
        stack.push(1).unwrap();
        assert_eq!(
            stack.push(2).unwrap_err(),
            SegCoreError::StageStackOverflow { capacity: 1 }
        );
    }

    #[test]
    fn test_underflow() {
        let mut stack: StageStack<u8> = StageStack::new(2);
        assert_eq!(stack.pop().unwrap_err(), SegCoreError::StageStackUnderflow);
        assert_eq!(stack.pops(), 0);
    }

    #[test]
    fn test_unbalanced_finish() {
        let mut stack = StageStack::new(4);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        stack.pop().unwrap();

        assert_eq!(
            stack.finish().unwrap_err(),
            SegCoreError::UnbalancedStageStack { pushes: 2, pops: 1 }
        );
    }
}
