use std::convert::TryFrom;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::validate::{validate, InvalidState};
use crate::{Face, FixedSizeIndex, IndexMap, Slot, Sticker};

/// Colors of all 54 facelets.
///
/// Any coloring is representable: the per-color counts are only checked when
/// the state is validated for submission.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct CubeState(IndexMap<Sticker, Face>);

impl CubeState {
    /// Length of the serialized form.
    pub const SERIALIZED_LEN: usize = Sticker::COUNT;

    /// Create a solved cube: every facelet has the color of its own face.
    pub fn new() -> Self {
        CubeState(IndexMap::from_fn(|sticker: Sticker| sticker.face()))
    }

    /// Color of a single facelet.
    #[inline]
    pub fn get(&self, sticker: Sticker) -> Face {
        self.0[sticker]
    }

    /// Recolor a single facelet. The cube may become invalid.
    pub fn set(&mut self, sticker: Sticker, color: Face) {
        trace!("Setting {} to {}", sticker, color);
        self.0[sticker] = color;
    }

    /// The nine facelets of `face` in row-major order.
    pub fn face(&self, face: Face) -> &[Face] {
        self.0.slice(Self::face_range(face))
    }

    /// Mutable view of the nine facelets of `face` in row-major order.
    pub fn face_mut(&mut self, face: Face) -> &mut [Face] {
        self.0.slice_mut(Self::face_range(face))
    }

    /// Restore the solved coloring.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether every facelet carries the color of its own face.
    pub fn is_solved(&self) -> bool {
        self.0.iter().all(|(sticker, &color)| sticker.face() == color)
    }

    /// Flat 54 letter encoding: faces in `U R F D L B` order, each face
    /// row-major.
    pub fn serialize(&self) -> String {
        self.0.values().map(|face| face.letter()).collect()
    }

    fn face_range(face: Face) -> std::ops::Range<usize> {
        let start = face.idx() * Slot::COUNT;
        start..start + Slot::COUNT
    }
}

impl Default for CubeState {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Sticker> for CubeState {
    type Output = Face;

    fn index(&self, sticker: Sticker) -> &Face {
        &self.0[sticker]
    }
}

impl IndexMut<Sticker> for CubeState {
    fn index_mut(&mut self, sticker: Sticker) -> &mut Face {
        &mut self.0[sticker]
    }
}

impl fmt::Display for CubeState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for face in self.0.values() {
            write!(f, "{}", face)?;
        }
        Ok(())
    }
}

impl FromStr for CubeState {
    type Err = InvalidState;

    /// Parse a serialized state. Whitespace and case are ignored; the string
    /// must otherwise pass [`validate`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let validation = validate(s);
        if !validation.is_valid() {
            return Err(validation.into_error());
        }
        let colors: Vec<Face> = validation
            .normalized()
            .chars()
            .filter_map(Face::from_letter)
            .collect();
        match IndexMap::try_from(colors) {
            Ok(map) => Ok(CubeState(map)),
            // validated above, so the length is always right
            Err(_) => Err(validation.into_error()),
        }
    }
}

impl TryFrom<&str> for CubeState {
    type Error = InvalidState;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationError;

    const SOLVED: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

    #[test]
    fn default_serializes_in_face_order() {
        crate::setup();

        let state = CubeState::new();
        assert_eq!(state.serialize(), SOLVED);
        assert_eq!(state.serialize().len(), CubeState::SERIALIZED_LEN);
        assert_eq!(state.to_string(), SOLVED);
        assert!(state.is_solved());
    }

    #[test]
    fn set_changes_one_position() {
        crate::setup();

        let mut state = CubeState::new();
        state.set(Sticker::new(Face::F, Slot::new(2)), Face::B);
        let serialized = state.serialize();
        assert_eq!(serialized.len(), 54);
        assert_eq!(&serialized[18..27], "FFBFFFFFF");
        assert_eq!(state.face(Face::F)[2], Face::B);
        assert!(!state.is_solved());

        state.reset();
        assert_eq!(state.serialize(), SOLVED);
    }

    #[test]
    fn parse_round_trip() {
        crate::setup();

        let raw = "uuuuuuuuf rrrrrrrrr ffffffffu ddddddddd lllllllll bbbbbbbbb";
        let state: CubeState = raw.parse().unwrap();
        assert_eq!(state.face(Face::U)[8], Face::F);
        assert_eq!(state.face(Face::F)[8], Face::U);
        assert_eq!(state.serialize(), raw.replace(' ', "").to_uppercase());
    }

    #[test]
    fn parse_rejects_invalid() {
        crate::setup();

        let err = "UUU".parse::<CubeState>().unwrap_err();
        assert!(err
            .errors()
            .iter()
            .any(|e| matches!(e, ValidationError::Length { actual: 3, .. })));
    }

    #[test]
    fn unbalanced_edit_fails_validation() {
        crate::setup();

        let mut state = CubeState::new();
        for slot in state.face_mut(Face::U) {
            *slot = Face::R;
        }
        let validation = validate(&state.serialize());
        assert_eq!(
            validation.errors(),
            &[
                ValidationError::Count {
                    face: Face::U,
                    count: 0
                },
                ValidationError::Count {
                    face: Face::R,
                    count: 18
                },
            ]
        );
    }
}
