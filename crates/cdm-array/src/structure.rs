//! Structure-typed arrays.
//!
//! Members are stored column-wise: each [`Member`] owns one array holding
//! its values for every record, shaped `[records] ++ member_shape`.
//! A record is a view selecting one slice from each member.

use crate::array::CdmArray;
use crate::data_type::DataType;
use crate::error::{CdmError, CdmResult};
use crate::index::Index;

/// One named, typed field of a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    name: String,
    shape: Vec<usize>,
    data: CdmArray,
}

impl Member {
    /// `shape` is the per-record shape; `data` holds all records.
    pub fn new(name: impl Into<String>, shape: Vec<usize>, data: CdmArray) -> Self {
        Self {
            name: name.into(),
            shape,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Values of this member across every record.
    pub fn data(&self) -> &CdmArray {
        &self.data
    }

    pub fn is_unsigned(&self) -> bool {
        self.data.is_unsigned()
    }

    /// Elements per record.
    pub fn element_count(&self) -> usize {
        Index::compute_size(&self.shape)
    }
}

/// Ordered member list of a structure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructureMembers {
    name: String,
    members: Vec<Member>,
}

impl StructureMembers {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_member(&mut self, member: Member) {
        self.members.push(member);
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn find_member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check every member holds exactly `records` records.
    pub(crate) fn check_records(&self, records: usize) -> CdmResult<()> {
        for member in &self.members {
            let expected = records * member.element_count();
            if member.data.size() != expected {
                return Err(CdmError::ShapeMismatch {
                    shape: member.data.shape().to_vec(),
                    expected,
                    actual: member.data.size(),
                });
            }
        }
        Ok(())
    }

    /// Records `[start, start + count)` of every member.
    pub(crate) fn slice_records(&self, start: usize, count: usize) -> CdmResult<Self> {
        let mut sliced = StructureMembers::new(self.name.clone());
        for member in &self.members {
            let n = member.element_count();
            let mut shape = Vec::with_capacity(member.shape.len() + 1);
            shape.push(count);
            shape.extend_from_slice(&member.shape);
            let data = member.data.section_linear(start * n, count * n, shape)?;
            sliced.add_member(Member::new(member.name.clone(), member.shape.clone(), data));
        }
        Ok(sliced)
    }
}

/// An array of structure records.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayStructure {
    members: StructureMembers,
    records: usize,
}

impl ArrayStructure {
    pub fn new(members: StructureMembers, records: usize) -> CdmResult<Self> {
        members.check_records(records)?;
        Ok(Self { members, records })
    }

    pub fn members(&self) -> &StructureMembers {
        &self.members
    }

    pub fn find_member(&self, name: &str) -> Option<&Member> {
        self.members.find_member(name)
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn record(&self, index: usize) -> Option<StructureData<'_>> {
        (index < self.records).then(|| StructureData {
            structure: self,
            record: index,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = StructureData<'_>> {
        (0..self.records).map(move |record| StructureData {
            structure: self,
            record,
        })
    }

    pub fn slice(&self, start: usize, count: usize) -> CdmResult<Self> {
        Ok(Self {
            members: self.members.slice_records(start, count)?,
            records: count,
        })
    }
}

/// One record of an [`ArrayStructure`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureData<'a> {
    structure: &'a ArrayStructure,
    record: usize,
}

impl<'a> StructureData<'a> {
    pub fn record_index(&self) -> usize {
        self.record
    }

    pub fn members(&self) -> &'a StructureMembers {
        &self.structure.members
    }

    /// This record's slice of member `name`, shaped like the member.
    pub fn member_array(&self, name: &str) -> CdmResult<CdmArray> {
        let member = self
            .structure
            .find_member(name)
            .ok_or_else(|| CdmError::MemberNotFound(name.to_string()))?;
        let n = member.element_count();
        member
            .data
            .section_linear(self.record * n, n, member.shape.clone())
    }

    pub fn scalar_i64(&self, name: &str) -> CdmResult<i64> {
        let array = self.member_array(name)?;
        array
            .get_i64(0)
            .ok_or_else(|| CdmError::wrong_type("numeric", array.data_type()))
    }

    pub fn scalar_f64(&self, name: &str) -> CdmResult<f64> {
        let array = self.member_array(name)?;
        array
            .get_f64(0)
            .ok_or_else(|| CdmError::wrong_type("numeric", array.data_type()))
    }

    /// Text of a char or String member (first string for String arrays).
    pub fn string(&self, name: &str) -> CdmResult<String> {
        let array = self.member_array(name)?;
        match array.data_type() {
            DataType::Char => array.char_string(),
            DataType::String => Ok(array.get_str(0).unwrap_or_default().to_string()),
            other => Err(CdmError::wrong_type("char or String", other)),
        }
    }

    /// All strings of a String member, or one per row of a char member.
    pub fn strings(&self, name: &str) -> CdmResult<Vec<String>> {
        let array = self.member_array(name)?;
        match array.data_type() {
            DataType::Char => array.char_strings(),
            DataType::String => Ok((0..array.size())
                .filter_map(|i| array.get_str(i).map(str::to_string))
                .collect()),
            other => Err(CdmError::wrong_type("char or String", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ArrayData;

    fn two_record_structure() -> ArrayStructure {
        let mut members = StructureMembers::new("obs");
        members.add_member(Member::new(
            "id",
            vec![],
            CdmArray::new(vec![2], ArrayData::Int(vec![10, 11].into())).unwrap(),
        ));
        members.add_member(Member::new(
            "xy",
            vec![2],
            CdmArray::new(vec![2, 2], ArrayData::Double(vec![1.0, 2.0, 3.0, 4.0].into()))
                .unwrap(),
        ));
        ArrayStructure::new(members, 2).unwrap()
    }

    #[test]
    fn test_record_access() {
        let structure = two_record_structure();
        let second = structure.record(1).unwrap();
        assert_eq!(second.scalar_i64("id").unwrap(), 11);
        let xy = second.member_array("xy").unwrap();
        assert_eq!(xy.shape(), &[2]);
        assert_eq!(xy.get_f64(0), Some(3.0));
        assert!(structure.record(2).is_none());
    }

    #[test]
    fn test_member_not_found() {
        let structure = two_record_structure();
        let first = structure.record(0).unwrap();
        assert_eq!(
            first.member_array("zz").unwrap_err(),
            CdmError::MemberNotFound("zz".to_string())
        );
    }

    #[test]
    fn test_record_count_checked() {
        let structure = two_record_structure();
        let members = structure.members().clone();
        assert!(ArrayStructure::new(members, 3).is_err());
    }

    #[test]
    fn test_slice_keeps_member_order() {
        let structure = two_record_structure();
        let tail = structure.slice(1, 1).unwrap();
        assert_eq!(tail.members().names(), vec!["id", "xy"]);
        assert_eq!(tail.record(0).unwrap().scalar_i64("id").unwrap(), 11);
    }
}
