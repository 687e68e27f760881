//! Medication list file model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dose::{AdministrationForm, DoseState, Frequency, TimeSlot};
use crate::error::{AppError, Result};

// == Dose Cell ==
/// Content of one schedule cell.
///
/// Cyclable forms hold a [`DoseState`]; drops, sachets and other forms hold
/// whatever the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "lowercase")]
pub enum DoseCell {
    Cycled(DoseState),
    Text(String),
}

impl DoseCell {
    /// Initial cell for a newly added medication.
    pub fn initial(form: AdministrationForm, filled: bool) -> Self {
        if form.uses_dose_cycle() {
            DoseCell::Cycled(if filled { DoseState::One } else { DoseState::Empty })
        } else {
            DoseCell::Text(String::new())
        }
    }

    pub fn display(&self) -> String {
        match self {
            DoseCell::Cycled(state) => state.label().to_string(),
            DoseCell::Text(text) => text.trim().to_string(),
        }
    }
}

impl Default for DoseCell {
    fn default() -> Self {
        DoseCell::Cycled(DoseState::Empty)
    }
}

// == Medication ==
/// An oral medication row of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: String,
    pub name: String,
    /// Strength as written on the box, e.g. "500 mg"
    #[serde(default)]
    pub presentation: String,
    #[serde(default)]
    pub form: AdministrationForm,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub morning: DoseCell,
    #[serde(default)]
    pub afternoon: DoseCell,
    #[serde(default)]
    pub night: DoseCell,
    #[serde(default)]
    pub notes: String,
}

impl Medication {
    /// New row with slots pre-filled from the prescribed frequency.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        form: AdministrationForm,
        frequency: Frequency,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            presentation: String::new(),
            form,
            frequency,
            morning: DoseCell::initial(form, frequency.covers(TimeSlot::Morning)),
            afternoon: DoseCell::initial(form, frequency.covers(TimeSlot::Afternoon)),
            night: DoseCell::initial(form, frequency.covers(TimeSlot::Night)),
            notes: String::new(),
        }
    }

    pub fn cell(&self, slot: TimeSlot) -> &DoseCell {
        match slot {
            TimeSlot::Morning => &self.morning,
            TimeSlot::Afternoon => &self.afternoon,
            TimeSlot::Night => &self.night,
        }
    }

    pub fn cell_mut(&mut self, slot: TimeSlot) -> &mut DoseCell {
        match slot {
            TimeSlot::Morning => &mut self.morning,
            TimeSlot::Afternoon => &mut self.afternoon,
            TimeSlot::Night => &mut self.night,
        }
    }
}

/// An injectable with its schedule written out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Injectable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dose: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub notes: String,
}

/// An inhaler with puffs per use and schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inhaler {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub puffs: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub notes: String,
}

/// Patient header of the chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartPatient {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rut: String,
    #[serde(default)]
    pub date: String,
}

// == Medication List ==
/// The medication list file: `{ patient, medications, injectables, inhalers }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MedicationList {
    pub patient: ChartPatient,
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub injectables: Vec<Injectable>,
    #[serde(default)]
    pub inhalers: Vec<Inhaler>,
}

impl MedicationList {
    /// Parses a medication list file, rejecting it whole if malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let object = value
            .as_object()
            .ok_or_else(|| AppError::InvalidFile("el archivo no contiene una cartola".to_string()))?;

        if !object.get("patient").is_some_and(Value::is_object) {
            return Err(AppError::InvalidFile("falta el paciente".to_string()));
        }
        if !object.get("medications").is_some_and(Value::is_array) {
            return Err(AppError::InvalidFile("falta la lista de medicamentos".to_string()));
        }

        Ok(serde_json::from_value(value)?)
    }

    pub fn is_empty(&self) -> bool {
        self.medications.is_empty() && self.injectables.is_empty() && self.inhalers.is_empty()
    }
}
