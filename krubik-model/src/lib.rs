use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use collections::indexed::{FixedSizeIndex, IncorrectSize, IndexMap, Values};
pub use coordinates::{OutOfRange, Slot, Sticker};
pub use solution::{SolveResult, SolverStatus, Source, UnknownSource};
pub use state::CubeState;
pub use validate::{normalize, validate, FaceCounts, InvalidState, Validation, ValidationError};

mod collections;
#[macro_use]
mod coordinates;
mod solution;
mod state;
pub mod validate;

/// One of the six faces of the cube. Also used as a facelet color: a facelet
/// is labelled with the face whose center shares its color.
///
/// The declaration order is the serialization order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(u8)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "char"),
    serde(into = "char")
)]
pub enum Face {
    /// Up.
    U,
    /// Right.
    R,
    /// Front.
    F,
    /// Down.
    D,
    /// Left.
    L,
    /// Back.
    B,
}

impl Face {
    /// Number of faces.
    pub const COUNT: usize = 6;

    /// All faces in serialization order.
    pub const ALL: [Face; Face::COUNT] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    /// The letter used for this face in serialized states.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            Face::U => 'U',
            Face::R => 'R',
            Face::F => 'F',
            Face::D => 'D',
            Face::L => 'L',
            Face::B => 'B',
        }
    }

    /// Parse a face letter, ignoring case.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'U' => Some(Face::U),
            'R' => Some(Face::R),
            'F' => Some(Face::F),
            'D' => Some(Face::D),
            'L' => Some(Face::L),
            'B' => Some(Face::B),
            _ => None,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FixedSizeIndex for Face {
    const NUM_INDEXES: usize = Face::COUNT;

    #[inline]
    fn idx(&self) -> usize {
        *self as usize
    }

    #[inline]
    fn from_idx(idx: usize) -> Self {
        assert!(
            (0..Self::NUM_INDEXES).contains(&idx),
            "Face index must be in range [0, {}), got {}",
            Self::NUM_INDEXES,
            idx
        );
        Face::ALL[idx]
    }
}

/// A character that does not name a face.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("{0:?} is not one of the face letters U, R, F, D, L, B")]
pub struct InvalidColor(pub char);

impl TryFrom<char> for Face {
    type Error = InvalidColor;

    fn try_from(letter: char) -> Result<Self, Self::Error> {
        Face::from_letter(letter).ok_or(InvalidColor(letter))
    }
}

impl From<Face> for char {
    fn from(face: Face) -> char {
        face.letter()
    }
}

impl FromStr for Face {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Face::try_from(letter),
            (Some(letter), Some(_)) => Err(InvalidColor(letter)),
            (None, _) => Err(InvalidColor(' ')),
        }
    }
}

/// Set up for testing -- enables logging.
#[cfg(test)]
pub(crate) fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}
