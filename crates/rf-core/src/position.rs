//! Board coordinates

use serde::{Deserialize, Serialize};

/// A cell on the board, addressed reel-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub reel: usize,
    pub row: usize,
}

impl Position {
    pub const fn new(reel: usize, row: usize) -> Self {
        Self { reel, row }
    }

    /// Shift the row for client output when padding symbols are shown
    #[inline]
    pub fn padded(self, include_padding: bool) -> Self {
        if include_padding {
            Self {
                reel: self.reel,
                row: self.row + 1,
            }
        } else {
            self
        }
    }
}

impl From<(usize, usize)> for Position {
    fn from((reel, row): (usize, usize)) -> Self {
        Self { reel, row }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_offsets_row_only() {
        let p = Position::new(2, 0);
        assert_eq!(p.padded(true), Position::new(2, 1));
        assert_eq!(p.padded(false), p);
    }

    #[test]
    fn test_ordering_is_reel_major() {
        let mut v = vec![Position::new(1, 0), Position::new(0, 2), Position::new(0, 1)];
        v.sort();
        assert_eq!(
            v,
            vec![Position::new(0, 1), Position::new(0, 2), Position::new(1, 0)]
        );
    }
}
