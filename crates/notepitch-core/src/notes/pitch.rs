use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One symbol of the fixed pitch vocabulary.
///
/// Discriminants follow the classifier's output order, so a probability
/// vector index maps directly onto a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pitch {
    C4,
    D4,
    E4,
    F4,
    G4,
    A4,
    B4,
    C5,
    D5,
    E5,
    F5,
    G5,
    A5,
    B5,
    C6,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pitch symbol '{0}' (expected one of C4..C6)")]
pub struct ParsePitchError(pub String);

impl Pitch {
    /// Number of symbols in the vocabulary.
    pub const COUNT: usize = 15;

    /// Vocabulary in classifier order.
    pub const ALL: [Pitch; Pitch::COUNT] = [
        Pitch::C4,
        Pitch::D4,
        Pitch::E4,
        Pitch::F4,
        Pitch::G4,
        Pitch::A4,
        Pitch::B4,
        Pitch::C5,
        Pitch::D5,
        Pitch::E5,
        Pitch::F5,
        Pitch::G5,
        Pitch::A5,
        Pitch::B5,
        Pitch::C6,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Pitch> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Pitch::C4 => "C4",
            Pitch::D4 => "D4",
            Pitch::E4 => "E4",
            Pitch::F4 => "F4",
            Pitch::G4 => "G4",
            Pitch::A4 => "A4",
            Pitch::B4 => "B4",
            Pitch::C5 => "C5",
            Pitch::D5 => "D5",
            Pitch::E5 => "E5",
            Pitch::F5 => "F5",
            Pitch::G5 => "G5",
            Pitch::A5 => "A5",
            Pitch::B5 => "B5",
            Pitch::C6 => "C6",
        }
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pitch {
    type Err = ParsePitchError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParsePitchError(s.to_string()))
    }
}
