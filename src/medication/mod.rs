//! Medication Module
//!
//! The medication list ("cartola"): file model, per-cell dose editing and the
//! printable chart.

mod chart;
mod model;
mod schedule;

pub use chart::render_chart_html;
pub use model::{ChartPatient, DoseCell, Inhaler, Injectable, Medication, MedicationList};
pub use schedule::MedicationSchedule;
