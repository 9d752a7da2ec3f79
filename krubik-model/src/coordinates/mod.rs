//! Positions on the cube surface: a slot within one face, and a sticker
//! addressing one of the 54 facelets.
use std::fmt;

use thiserror::Error;

pub use slot::Slot;
pub use sticker::Sticker;

#[macro_use]
mod shared_macros;

mod slot;
mod sticker;

/// Error used when creating a coordinate type from a number that's out of range.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("value {0:?} is out of range")]
pub struct OutOfRange<T: fmt::Debug>(pub T);
