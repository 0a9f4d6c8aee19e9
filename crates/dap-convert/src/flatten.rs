//! Flattening: pulling a nested member's data out of its top-level structure.

use cdm_array::{ArrayData, CdmArray, Variable};
use std::iter;

use crate::error::{ConvertError, ConvertResult};

/// Step from the materialized top-level data down to `variable`'s member.
///
/// The path is the variable's enclosing structure names below the
/// top-level one, then its own short name. Stepping through a nested
/// sequence uses its concatenated rows; if the member reached is itself a
/// nested sequence, its rows are concatenated into one array. A top-level
/// variable is returned unchanged.
pub fn resolve_flattened(variable: &Variable, data: CdmArray) -> ConvertResult<CdmArray> {
    let Some((_, inner)) = variable.parents().split_first() else {
        return Ok(data);
    };
    let path: Vec<&str> = inner
        .iter()
        .map(String::as_str)
        .chain(iter::once(variable.short_name()))
        .collect();

    let mut current = data;
    for (depth, segment) in path.iter().enumerate() {
        let not_found = || ConvertError::MemberNotFound {
            segment: segment.to_string(),
            depth,
        };
        let members = match current.data() {
            ArrayData::Structure(s) => s.members(),
            ArrayData::Sequence(s) => s.members(),
            _ => return Err(not_found()),
        };
        let next = members
            .find_member(segment)
            .ok_or_else(not_found)?
            .data()
            .clone();
        current = next;
    }

    match current.data() {
        ArrayData::Sequence(seq) => Ok(seq.flatten()?),
        _ => Ok(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdm_array::{ArrayStructure, DataType, Member, StructureMembers};

    fn outer() -> CdmArray {
        let mut inner = StructureMembers::new("inner");
        inner.add_member(Member::new(
            "x",
            vec![],
            CdmArray::new(vec![2], ArrayData::Int(vec![4, 5].into())).unwrap(),
        ));
        let inner = ArrayStructure::new(inner, 2).unwrap();

        let mut top = StructureMembers::new("top");
        top.add_member(Member::new(
            "inner",
            vec![],
            CdmArray::new(vec![2], ArrayData::Structure(inner)).unwrap(),
        ));
        CdmArray::new(
            vec![2],
            ArrayData::Structure(ArrayStructure::new(top, 2).unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn test_resolves_nested_member() {
        let var = Variable::new("x", DataType::Int, vec![]).member_of(["top", "inner"]);
        let data = resolve_flattened(&var, outer()).unwrap();
        assert_eq!(data.shape(), &[2]);
        assert_eq!(data.get_i64(1), Some(5));
    }

    #[test]
    fn test_missing_segment_reports_depth() {
        let var = Variable::new("y", DataType::Int, vec![]).member_of(["top", "inner"]);
        match resolve_flattened(&var, outer()).unwrap_err() {
            ConvertError::MemberNotFound { segment, depth } => {
                assert_eq!(segment, "y");
                assert_eq!(depth, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_top_level_unchanged() {
        let var = Variable::new("top", DataType::Structure, vec![2]);
        let data = outer();
        assert_eq!(resolve_flattened(&var, data.clone()).unwrap(), data);
    }
}
