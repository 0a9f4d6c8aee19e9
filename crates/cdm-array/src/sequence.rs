//! Jagged (nested) sequence arrays.

use crate::array::{ArrayData, CdmArray};
use crate::error::{CdmError, CdmResult};
use crate::structure::{ArrayStructure, StructureMembers};

/// One variable-length row set per outer element.
///
/// Member arrays hold the rows of every outer element back to back;
/// `row_lengths[i]` says how many of them belong to outer element `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySequenceNested {
    members: StructureMembers,
    row_lengths: Vec<usize>,
    offsets: Vec<usize>,
}

impl ArraySequenceNested {
    pub fn new(members: StructureMembers, row_lengths: Vec<usize>) -> CdmResult<Self> {
        let mut offsets = Vec::with_capacity(row_lengths.len() + 1);
        let mut total = 0;
        offsets.push(0);
        for len in &row_lengths {
            total += len;
            offsets.push(total);
        }
        members.check_records(total)?;
        Ok(Self {
            members,
            row_lengths,
            offsets,
        })
    }

    pub fn members(&self) -> &StructureMembers {
        &self.members
    }

    /// Number of outer elements.
    pub fn outer_len(&self) -> usize {
        self.row_lengths.len()
    }

    pub fn row_count(&self, outer: usize) -> Option<usize> {
        self.row_lengths.get(outer).copied()
    }

    pub fn row_lengths(&self) -> &[usize] {
        &self.row_lengths
    }

    pub fn total_rows(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Rows belonging to outer element `outer`.
    pub fn sequence(&self, outer: usize) -> CdmResult<ArrayStructure> {
        let len = self
            .row_count(outer)
            .ok_or_else(|| CdmError::IndexOutOfBounds {
                index: vec![outer],
                shape: vec![self.outer_len()],
            })?;
        ArrayStructure::new(self.members.slice_records(self.offsets[outer], len)?, len)
    }

    /// Concatenate every row set into one structure array of shape `[total_rows]`.
    pub fn flatten(&self) -> CdmResult<CdmArray> {
        let total = self.total_rows();
        let structure = ArrayStructure::new(self.members.clone(), total)?;
        CdmArray::new(vec![total], ArrayData::Structure(structure))
    }

    pub fn slice(&self, start: usize, count: usize) -> CdmResult<Self> {
        let end = start + count;
        if end > self.outer_len() {
            return Err(CdmError::IndexOutOfBounds {
                index: vec![end],
                shape: vec![self.outer_len()],
            });
        }
        let first_row = self.offsets[start];
        let rows = self.offsets[end] - first_row;
        Self::new(
            self.members.slice_records(first_row, rows)?,
            self.row_lengths[start..end].to_vec(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Member;

    fn jagged() -> ArraySequenceNested {
        let mut members = StructureMembers::new("inner");
        members.add_member(Member::new(
            "v",
            vec![],
            CdmArray::new(vec![5], ArrayData::Int(vec![1, 2, 3, 4, 5].into())).unwrap(),
        ));
        ArraySequenceNested::new(members, vec![2, 0, 3]).unwrap()
    }

    #[test]
    fn test_row_lengths() {
        let seq = jagged();
        assert_eq!(seq.outer_len(), 3);
        assert_eq!(seq.total_rows(), 5);
        assert_eq!(seq.row_count(1), Some(0));
        assert_eq!(seq.row_count(3), None);
    }

    #[test]
    fn test_sequence_rows() {
        let seq = jagged();
        let third = seq.sequence(2).unwrap();
        assert_eq!(third.records(), 3);
        assert_eq!(third.record(0).unwrap().scalar_i64("v").unwrap(), 3);
        assert_eq!(seq.sequence(1).unwrap().records(), 0);
    }

    #[test]
    fn test_flatten_concatenates() {
        let flat = jagged().flatten().unwrap();
        assert_eq!(flat.shape(), &[5]);
        let structure = flat.as_structure().unwrap();
        let values: Vec<i64> = structure
            .iter()
            .map(|r| r.scalar_i64("v").unwrap())
            .collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_slice_outer() {
        let tail = jagged().slice(1, 2).unwrap();
        assert_eq!(tail.row_lengths(), &[0, 3]);
        assert_eq!(tail.total_rows(), 3);
    }

    #[test]
    fn test_inconsistent_lengths_rejected() {
        let members = jagged().members().clone();
        assert!(ArraySequenceNested::new(members, vec![1, 1]).is_err());
    }
}
