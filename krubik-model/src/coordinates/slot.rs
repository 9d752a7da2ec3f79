use std::convert::TryInto;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collections::indexed::FixedSizeIndex;

/// Position of a facelet within its face, numbered row-major from the top
/// left corner.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "u8"),
    serde(into = "u8")
)]
pub struct Slot(u8);

impl Slot {
    /// Facelets along one edge of a face.
    pub const WIDTH: u8 = 3;

    /// Facelets on one face.
    pub const COUNT: usize = (Self::WIDTH * Self::WIDTH) as usize;

    /// The center facelet, which never moves relative to its face.
    pub const CENTER: Slot = Slot(4);

    /// Construct a slot with the given index. Panic if out of bounds.
    #[inline]
    pub fn new(val: u8) -> Self {
        assert!(
            (0..Self::COUNT as u8).contains(&val),
            "slot must be in range [0, {}), got {}",
            Self::COUNT,
            val
        );
        Self(val)
    }

    /// Construct a slot from its row and column within the face.
    #[inline]
    pub fn at(row: u8, col: u8) -> Self {
        assert!(row < Self::WIDTH && col < Self::WIDTH);
        Self(row * Self::WIDTH + col)
    }

    /// Row within the face, 0 at the top.
    #[inline]
    pub fn row(self) -> u8 {
        self.0 / Self::WIDTH
    }

    /// Column within the face, 0 at the left.
    #[inline]
    pub fn col(self) -> u8 {
        self.0 % Self::WIDTH
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "r{}c{}", self.row(), self.col())
    }
}

slot_fromint!(Slot, Slot::COUNT, u8, i8, u16, i16, u32, i32, u64, i64, usize, isize);

impl FixedSizeIndex for Slot {
    const NUM_INDEXES: usize = Slot::COUNT;

    #[inline]
    fn idx(&self) -> usize {
        self.0 as usize
    }

    fn from_idx(idx: usize) -> Self {
        idx.try_into().expect("index out of range")
    }
}
