//! Bounded write cursor for member buffers.

use crate::error::{ConvertError, ConvertResult};

/// Write position into a member buffer of fixed capacity.
///
/// Every fill step advances the cursor before writing; a step that would
/// pass the capacity fails instead of growing the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    member: String,
    position: usize,
    capacity: usize,
}

impl Cursor {
    pub fn new(member: impl Into<String>, capacity: usize) -> Self {
        Self {
            member: member.into(),
            position: 0,
            capacity,
        }
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.position
    }

    /// Reserve `n` slots, returning the start offset.
    pub fn advance(&mut self, n: usize) -> ConvertResult<usize> {
        if n > self.remaining() {
            return Err(ConvertError::CursorOverflow {
                member: self.member.clone(),
                capacity: self.capacity,
            });
        }
        let start = self.position;
        self.position += n;
        Ok(start)
    }

    /// Fails unless every slot has been written.
    pub fn finish(&self) -> ConvertResult<()> {
        if self.position != self.capacity {
            return Err(ConvertError::IncompleteFill {
                member: self.member.clone(),
                written: self.position,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
