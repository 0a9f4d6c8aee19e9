//! Multi-dimensional index into a row-major array.

use crate::error::{CdmError, CdmResult};

/// Row-major index with a mutable current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    shape: Vec<usize>,
    strides: Vec<usize>,
    current: Vec<usize>,
}

impl Index {
    pub fn new(shape: &[usize]) -> Self {
        let mut strides = vec![1; shape.len()];
        for k in (0..shape.len().saturating_sub(1)).rev() {
            strides[k] = strides[k + 1] * shape[k + 1];
        }
        Self {
            shape: shape.to_vec(),
            strides,
            current: vec![0; shape.len()],
        }
    }

    /// Number of elements addressed by `shape`; 1 for a scalar.
    pub fn compute_size(shape: &[usize]) -> usize {
        shape.iter().product()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn size(&self) -> usize {
        Self::compute_size(&self.shape)
    }

    pub fn current(&self) -> &[usize] {
        &self.current
    }

    /// Move to `position`, checking rank and bounds.
    pub fn set(&mut self, position: &[usize]) -> CdmResult<&mut Self> {
        if position.len() != self.shape.len() {
            return Err(CdmError::RankMismatch {
                expected: self.shape.len(),
                actual: position.len(),
            });
        }
        if position.iter().zip(&self.shape).any(|(p, s)| p >= s) {
            return Err(CdmError::IndexOutOfBounds {
                index: position.to_vec(),
                shape: self.shape.clone(),
            });
        }
        self.current.copy_from_slice(position);
        Ok(self)
    }

    /// Linear offset of the current position.
    pub fn current_element(&self) -> usize {
        self.current
            .iter()
            .zip(&self.strides)
            .map(|(c, s)| c * s)
            .sum()
    }

    /// Advance in row-major order. Returns false after the last element.
    pub fn incr(&mut self) -> bool {
        for k in (0..self.current.len()).rev() {
            self.current[k] += 1;
            if self.current[k] < self.shape[k] {
                return true;
            }
            self.current[k] = 0;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_offsets() {
        let mut index = Index::new(&[4, 3]);
        assert_eq!(index.set(&[0, 2]).unwrap().current_element(), 2);
        assert_eq!(index.set(&[2, 1]).unwrap().current_element(), 7);
        assert_eq!(index.set(&[3, 2]).unwrap().current_element(), 11);
    }

    #[test]
    fn test_scalar_index() {
        let index = Index::new(&[]);
        assert_eq!(index.size(), 1);
        assert_eq!(index.current_element(), 0);
    }

    #[test]
    fn test_bounds_and_rank() {
        let mut index = Index::new(&[2, 2]);
        assert!(matches!(
            index.set(&[2, 0]),
            Err(CdmError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            index.set(&[1]),
            Err(CdmError::RankMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_incr_visits_all() {
        let mut index = Index::new(&[2, 3]);
        let mut seen = vec![index.current_element()];
        while index.incr() {
            seen.push(index.current_element());
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }
}
