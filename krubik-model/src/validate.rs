//! Syntactic checks on serialized cube states.
//!
//! Only the length, the alphabet and the number of facelets per color are
//! checked. Whether the coloring is a reachable cube is left to the solver.
use std::ops::Index;

use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Face, IndexMap, Slot, Sticker};

/// Required length of a serialized state.
pub const EXPECTED_LEN: usize = Sticker::COUNT;

/// Required number of facelets of each color.
pub const EXPECTED_PER_COLOR: usize = Slot::COUNT;

/// Order in which the per-color counts are checked and reported.
const COUNT_ORDER: [Face; Face::COUNT] = [Face::U, Face::D, Face::F, Face::B, Face::L, Face::R];

/// A single reason a serialized state cannot be submitted.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "kind"),
    serde(rename_all = "snake_case")
)]
pub enum ValidationError {
    /// The state does not have exactly 54 facelets.
    #[error("state must contain {expected} facelets, got {actual}")]
    Length { expected: usize, actual: usize },
    /// The state contains characters that are not face letters. Each character
    /// is listed once, in order of first appearance.
    #[error("unsupported characters: {}", join_chars(.chars))]
    Alphabet { chars: Vec<char> },
    /// A color does not appear exactly nine times.
    #[error("color {face} appears {count} times, expected {}", EXPECTED_PER_COLOR)]
    Count { face: Face, count: usize },
}

fn join_chars(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len() * 3);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push(*c);
    }
    out
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// All the reasons a state was rejected.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("invalid cube state: {}", join_errors(.errors))]
pub struct InvalidState {
    errors: Vec<ValidationError>,
}

impl InvalidState {
    /// Individual failures, in check order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
}

/// Result of validating a raw state string.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Validation {
    normalized: String,
    errors: Vec<ValidationError>,
}

impl Validation {
    /// The input with whitespace removed and letters uppercased.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Every check that failed. Empty when the state may be submitted.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// True if no check failed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert to the normalized string, or all failures.
    pub fn into_result(self) -> Result<String, InvalidState> {
        if self.errors.is_empty() {
            Ok(self.normalized)
        } else {
            Err(InvalidState {
                errors: self.errors,
            })
        }
    }

    pub(crate) fn into_error(self) -> InvalidState {
        InvalidState {
            errors: self.errors,
        }
    }
}

/// Number of facelets of each color in a string. Characters that are not
/// face letters are ignored.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FaceCounts(IndexMap<Face, usize>);

impl FaceCounts {
    /// Count the face letters in an already normalized string.
    pub fn count(normalized: &str) -> Self {
        let mut counts = IndexMap::new();
        for face in normalized.chars().filter_map(Face::from_letter) {
            counts[face] += 1;
        }
        FaceCounts(counts)
    }

    /// Whether every color appears exactly nine times.
    pub fn is_balanced(&self) -> bool {
        self.0.values().all(|&count| count == EXPECTED_PER_COLOR)
    }
}

impl Index<Face> for FaceCounts {
    type Output = usize;

    fn index(&self, face: Face) -> &usize {
        &self.0[face]
    }
}

/// Remove all whitespace and uppercase everything else. Characters that are
/// not face letters are kept so they can be reported.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Run every check against `raw` and collect all failures.
pub fn validate(raw: &str) -> Validation {
    let normalized = normalize(raw);
    let mut errors = Vec::new();

    let actual = normalized.chars().count();
    if actual != EXPECTED_LEN {
        errors.push(ValidationError::Length {
            expected: EXPECTED_LEN,
            actual,
        });
    }

    let mut unsupported = Vec::new();
    for c in normalized.chars() {
        if Face::from_letter(c).is_none() && !unsupported.contains(&c) {
            unsupported.push(c);
        }
    }
    if !unsupported.is_empty() {
        errors.push(ValidationError::Alphabet { chars: unsupported });
    }

    let counts = FaceCounts::count(&normalized);
    if !counts.is_balanced() {
        for &face in COUNT_ORDER.iter() {
            if counts[face] != EXPECTED_PER_COLOR {
                errors.push(ValidationError::Count {
                    face,
                    count: counts[face],
                });
            }
        }
    }

    if !errors.is_empty() {
        debug!(
            "State of length {} failed {} validation checks",
            actual,
            errors.len()
        );
    }
    Validation { normalized, errors }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLVED: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";
    const SCRAMBLED: &str = "DRLUUBFBRBLURRLRUBLRDDFDLFUFUFFDBRDUBRUFLLFDDBFLUBLRBD";

    #[test]
    fn normalize_strips_whitespace_and_uppercases() {
        assert_eq!(normalize(" u r\n\tf x "), "URFX");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in &[
            "  uuu rrr\nfff ",
            "x y z 1 2",
            SCRAMBLED,
            "\tdDd  lLl\r\nbBb",
            "ß straße",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input {:?}", raw);
        }
    }

    #[test]
    fn valid_states_have_no_errors() {
        crate::setup();

        for raw in &[SOLVED, SCRAMBLED] {
            let validation = validate(raw);
            assert!(validation.is_valid(), "{:?}", validation.errors());
            assert_eq!(validation.normalized(), *raw);
        }

        let spaced = SCRAMBLED
            .as_bytes()
            .chunks(9)
            .map(|chunk| std::str::from_utf8(chunk).unwrap().to_lowercase())
            .collect::<Vec<_>>()
            .join("\n");
        let validation = validate(&spaced);
        assert!(validation.is_valid());
        assert_eq!(validation.normalized(), SCRAMBLED);
    }

    #[test]
    fn length_error_reports_actual_length() {
        crate::setup();

        let validation = validate(&"U".repeat(10));
        assert_eq!(
            validation.errors()[0],
            ValidationError::Length {
                expected: 54,
                actual: 10
            }
        );
        let message = validation.errors()[0].to_string();
        assert!(message.contains("54"));
        assert!(message.contains("10"));
    }

    #[test]
    fn unsupported_characters_reported_once() {
        crate::setup();

        let raw = format!("X{}XX1", &SOLVED[..50]);
        let validation = validate(&raw);
        let alphabet: Vec<_> = validation
            .errors()
            .iter()
            .filter(|e| matches!(e, ValidationError::Alphabet { .. }))
            .collect();
        assert_eq!(
            alphabet,
            vec![&ValidationError::Alphabet {
                chars: vec!['X', '1']
            }]
        );
        assert_eq!(
            alphabet[0].to_string(),
            "unsupported characters: X, 1"
        );
    }

    #[test]
    fn all_checks_reported_together() {
        crate::setup();

        let validation = validate("UUXRF");
        assert_eq!(
            validation.errors(),
            &[
                ValidationError::Length {
                    expected: 54,
                    actual: 5
                },
                ValidationError::Alphabet { chars: vec!['X'] },
                ValidationError::Count {
                    face: Face::U,
                    count: 2
                },
                ValidationError::Count {
                    face: Face::D,
                    count: 0
                },
                ValidationError::Count {
                    face: Face::F,
                    count: 1
                },
                ValidationError::Count {
                    face: Face::B,
                    count: 0
                },
                ValidationError::Count {
                    face: Face::L,
                    count: 0
                },
                ValidationError::Count {
                    face: Face::R,
                    count: 1
                },
            ]
        );
        assert!(validation.into_result().is_err());
    }

    #[test]
    fn right_length_wrong_distribution() {
        crate::setup();

        let raw = SOLVED.replacen('B', "F", 1);
        let validation = validate(&raw);
        assert_eq!(
            validation.errors(),
            &[
                ValidationError::Count {
                    face: Face::F,
                    count: 10
                },
                ValidationError::Count {
                    face: Face::B,
                    count: 8
                },
            ]
        );
        assert!(!FaceCounts::count(validation.normalized()).is_balanced());
        assert!(FaceCounts::count(SOLVED).is_balanced());
    }

    #[test]
    fn invalid_state_lists_everything() {
        let err = validate("UUXRF").into_result().unwrap_err();
        assert_eq!(err.errors().len(), 8);
        assert!(err
            .to_string()
            .starts_with("invalid cube state: state must contain 54 facelets, got 5; "));
    }
}
