//! Value generators for synthetic DAP data.
//!
//! These produce predictable, verifiable values so tests can check that
//! elements land in the right order after conversion.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Returns
///
/// A `Vec<f32>` in row-major order (row 0 first, then row 1, etc.)
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(3, 4);
/// assert_eq!(grid.len(), 12);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[3], 1.0);    // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Evenly spaced coordinates `start, start + step, ...`.
pub fn create_axis(start: f32, step: f32, len: usize) -> Vec<f32> {
    (0..len).map(|i| start + step * i as f32).collect()
}

/// `0, 1, ..., n - 1` as `i32`.
pub fn create_ramp(n: usize) -> Vec<i32> {
    (0..n as i32).collect()
}

/// Every unsigned 16-bit value in ascending order.
pub fn create_all_u16() -> Vec<u16> {
    (0..=u16::MAX).collect()
}

/// Unsigned 32-bit values around the sign boundary.
pub fn create_u32_edges() -> Vec<u32> {
    vec![0, 1, i32::MAX as u32, i32::MAX as u32 + 1, u32::MAX - 1, u32::MAX]
}

/// A string of `len` letters starting at `a + offset`, wrapping after `z`.
pub fn create_letters(len: usize, offset: usize) -> String {
    (0..len)
        .map(|i| (b'a' + ((i + offset) % 26) as u8) as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(3, 2);
        assert_eq!(grid, vec![0.0, 1000.0, 2000.0, 1.0, 1001.0, 2001.0]);
    }

    #[test]
    fn test_create_all_u16() {
        let values = create_all_u16();
        assert_eq!(values.len(), 65536);
        assert_eq!(values[65535], u16::MAX);
    }

    #[test]
    fn test_create_letters() {
        assert_eq!(create_letters(6, 0), "abcdef");
        assert_eq!(create_letters(3, 25), "zab");
    }
}
