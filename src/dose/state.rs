//! Dose State Module
//!
//! The discrete pill-count values shown in a medication schedule cell and the
//! click-driven cycle between them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AppError;

// == Dose State ==
/// Pill count shown in one schedule cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum DoseState {
    #[default]
    Empty,
    Quarter,
    Half,
    ThreeQuarters,
    One,
    OneAndQuarter,
    OneAndHalf,
    OneAndThreeQuarters,
    Two,
    Three,
    Four,
}

impl DoseState {
    /// Every state in cycling order. `Empty` comes first.
    pub const ORDER: [DoseState; 11] = [
        DoseState::Empty,
        DoseState::Quarter,
        DoseState::Half,
        DoseState::ThreeQuarters,
        DoseState::One,
        DoseState::OneAndQuarter,
        DoseState::OneAndHalf,
        DoseState::OneAndThreeQuarters,
        DoseState::Two,
        DoseState::Three,
        DoseState::Four,
    ];

    /// Position in [`DoseState::ORDER`].
    pub fn index(self) -> usize {
        self as usize
    }

    // == Cycle ==
    /// Next state after a click.
    ///
    /// `Empty` advances to the first dose and the last dose wraps back to
    /// `Empty`, not to `Quarter`, so a cell can be cleared by clicking through.
    pub fn cycle(self) -> DoseState {
        let next = (self.index() + 1) % Self::ORDER.len();
        Self::ORDER[next]
    }

    /// Printed label for the cell.
    pub fn label(self) -> &'static str {
        match self {
            DoseState::Empty => "",
            DoseState::Quarter => "¼",
            DoseState::Half => "½",
            DoseState::ThreeQuarters => "¾",
            DoseState::One => "1",
            DoseState::OneAndQuarter => "1 ¼",
            DoseState::OneAndHalf => "1 ½",
            DoseState::OneAndThreeQuarters => "1 ¾",
            DoseState::Two => "2",
            DoseState::Three => "3",
            DoseState::Four => "4",
        }
    }

    /// Dose as a number of pills.
    pub fn quantity(self) -> f32 {
        match self {
            DoseState::Empty => 0.0,
            DoseState::Quarter => 0.25,
            DoseState::Half => 0.5,
            DoseState::ThreeQuarters => 0.75,
            DoseState::One => 1.0,
            DoseState::OneAndQuarter => 1.25,
            DoseState::OneAndHalf => 1.5,
            DoseState::OneAndThreeQuarters => 1.75,
            DoseState::Two => 2.0,
            DoseState::Three => 3.0,
            DoseState::Four => 4.0,
        }
    }

    pub fn is_empty(self) -> bool {
        self == DoseState::Empty
    }
}

/// Free function form of [`DoseState::cycle`].
pub fn cycle(state: DoseState) -> DoseState {
    state.cycle()
}

impl fmt::Display for DoseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DoseState {
    type Err = AppError;

    /// Accepts the printed labels plus ASCII spellings such as `1/2` or `1 1/4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let state = match normalized.as_str() {
            "" => DoseState::Empty,
            "¼" | "1/4" => DoseState::Quarter,
            "½" | "1/2" => DoseState::Half,
            "¾" | "3/4" => DoseState::ThreeQuarters,
            "1" => DoseState::One,
            "1 ¼" | "1¼" | "1 1/4" => DoseState::OneAndQuarter,
            "1 ½" | "1½" | "1 1/2" => DoseState::OneAndHalf,
            "1 ¾" | "1¾" | "1 3/4" => DoseState::OneAndThreeQuarters,
            "2" => DoseState::Two,
            "3" => DoseState::Three,
            "4" => DoseState::Four,
            other => {
                return Err(AppError::InvalidRequest(format!(
                    "Unknown dose label: {other}"
                )))
            }
        };
        Ok(state)
    }
}

impl Serialize for DoseState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for DoseState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}
