//! Dose Module
//!
//! Discrete dose values for the medication chart and the click cycle that
//! edits them, plus the slot, form and frequency vocabulary around it.

mod slot;
mod state;

pub use slot::{AdministrationForm, Frequency, TimeSlot};
pub use state::{cycle, DoseState};
