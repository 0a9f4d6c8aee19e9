//! String to fixed-width char conversions.

use bytes::Bytes;
use cdm_array::{ArrayData, CdmArray, Index, Variable};

use super::cursor::Cursor;
use crate::error::{ConvertError, ConvertResult};

/// Pack strings into a char block of `shape`.
///
/// Each string is written left-justified into a field as wide as the
/// variable's innermost declared extent, truncated when longer and NUL
/// padded when shorter. A block holding exactly one char per string has
/// no string-length dimension; single-character strings then fill one
/// char each.
pub fn pack_strings(
    strings: &[&str],
    variable: &Variable,
    shape: &[usize],
) -> ConvertResult<CdmArray> {
    let total = Index::compute_size(shape);
    let mut buffer = vec![0u8; total];
    let mut cursor = Cursor::new(variable.short_name(), total);

    let max_len = strings.iter().map(|s| s.len()).max().unwrap_or(0);
    if max_len == 1 && total == strings.len() {
        for s in strings {
            let pos = cursor.advance(1)?;
            buffer[pos] = s.as_bytes().first().copied().unwrap_or(0);
        }
    } else {
        let width = variable.shape().last().copied().ok_or_else(|| {
            ConvertError::invalid_variable(format!(
                "char variable '{}' has no string length dimension",
                variable.full_name()
            ))
        })?;
        for s in strings {
            let pos = cursor.advance(width)?;
            write_field(&mut buffer[pos..pos + width], s);
        }
    }

    Ok(CdmArray::new(shape.to_vec(), ArrayData::Char(Bytes::from(buffer)))?)
}

/// Copy one string into a char buffer sized to the whole variable.
pub fn string_to_chars(value: &str, variable: &Variable) -> ConvertResult<CdmArray> {
    let mut buffer = vec![0u8; variable.size()];
    write_field(&mut buffer, value);
    Ok(CdmArray::new(
        variable.shape().to_vec(),
        ArrayData::Char(Bytes::from(buffer)),
    )?)
}

/// Left-justify `value` into `field`, truncating; untouched bytes stay NUL.
fn write_field(field: &mut [u8], value: &str) {
    let bytes = value.as_bytes();
    let len = bytes.len().min(field.len());
    field[..len].copy_from_slice(&bytes[..len]);
}
