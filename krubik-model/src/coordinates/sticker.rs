use std::convert::{TryFrom, TryInto};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collections::indexed::FixedSizeIndex;
use crate::{Face, OutOfRange, Slot};

/// One of the 54 facelets: a face and a slot on it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sticker {
    face: Face,
    slot: Slot,
}

impl Sticker {
    /// Total stickers on the cube.
    pub const COUNT: usize = Face::COUNT * Slot::COUNT;

    #[inline]
    pub fn new(face: Face, slot: Slot) -> Self {
        Sticker { face, slot }
    }

    /// Face this sticker sits on. This is a position, not the sticker's color.
    #[inline]
    pub fn face(&self) -> Face {
        self.face
    }

    #[inline]
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Iterator over all stickers in serialization order.
    pub fn all() -> crate::Values<Self> {
        Self::values()
    }
}

impl fmt::Display for Sticker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.face, self.slot)
    }
}

impl<T> TryFrom<(Face, T)> for Sticker
where
    T: TryInto<Slot> + Copy + fmt::Debug,
{
    type Error = OutOfRange<T>;

    fn try_from((face, slot): (Face, T)) -> Result<Self, Self::Error> {
        let s = slot.try_into().map_err(|_| OutOfRange(slot))?;
        Ok(Sticker::new(face, s))
    }
}

impl FixedSizeIndex for Sticker {
    const NUM_INDEXES: usize = Sticker::COUNT;

    #[inline]
    fn idx(&self) -> usize {
        self.face.idx() * Slot::COUNT + self.slot.idx()
    }

    fn from_idx(idx: usize) -> Self {
        assert!(
            idx < Self::NUM_INDEXES,
            "sticker index must be in range [0, {}), got {}",
            Self::NUM_INDEXES,
            idx
        );
        Sticker {
            face: Face::from_idx(idx / Slot::COUNT),
            slot: Slot::from_idx(idx % Slot::COUNT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips() {
        for (i, sticker) in Sticker::all().enumerate() {
            assert_eq!(sticker.idx(), i);
        }
        assert_eq!(Sticker::all().len(), 54);
    }

    #[test]
    fn faces_are_contiguous() {
        let front: Vec<_> = Sticker::all()
            .filter(|s| s.face() == Face::F)
            .map(|s| s.idx())
            .collect();
        assert_eq!(front, (18..27).collect::<Vec<usize>>());
    }

    #[test]
    fn from_pair() {
        assert_eq!(
            Sticker::try_from((Face::B, 8usize)),
            Ok(Sticker::new(Face::B, Slot::new(8)))
        );
        assert_eq!(Sticker::try_from((Face::B, 9usize)), Err(OutOfRange(9usize)));
    }
}
