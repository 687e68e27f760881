//! Editing operations over the oral medications of a chart.

use tracing::debug;

use super::model::{DoseCell, Medication, MedicationList};
use crate::dose::{AdministrationForm, DoseState, Frequency, TimeSlot};
use crate::error::{AppError, Result};

/// Wraps a [`MedicationList`] and applies the per-cell edits of the chart editor.
#[derive(Debug, Clone, Default)]
pub struct MedicationSchedule {
    list: MedicationList,
    next_id: u64,
}

impl MedicationSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_list(list: MedicationList) -> Self {
        let next_id = list.medications.len() as u64;
        Self { list, next_id }
    }

    pub fn list(&self) -> &MedicationList {
        &self.list
    }

    pub fn into_list(self) -> MedicationList {
        self.list
    }

    /// Adds a medication with its slots pre-filled from `frequency`.
    ///
    /// Returns the generated id.
    pub fn add(
        &mut self,
        name: &str,
        presentation: &str,
        form: AdministrationForm,
        frequency: Frequency,
    ) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidRequest(
                "el nombre del medicamento es obligatorio".to_string(),
            ));
        }

        let id = self.fresh_id();
        let mut med = Medication::new(id.clone(), name, form, frequency);
        med.presentation = presentation.trim().to_string();
        self.list.medications.push(med);
        debug!(id = %id, "medication added");
        Ok(id)
    }

    /// Advances the dose in one cell to the next state of the cycle.
    pub fn cycle_dose(&mut self, id: &str, slot: TimeSlot) -> Result<DoseState> {
        let med = self.find_mut(id)?;
        if !med.form.uses_dose_cycle() {
            return Err(AppError::InvalidRequest(format!(
                "'{}' usa dosis de texto libre",
                med.name
            )));
        }

        let next = match med.cell(slot) {
            DoseCell::Cycled(state) => state.cycle(),
            // a text cell left over from a form change restarts the cycle
            DoseCell::Text(_) => DoseState::Empty.cycle(),
        };
        *med.cell_mut(slot) = DoseCell::Cycled(next);
        Ok(next)
    }

    /// Writes a free-text dose for forms that do not cycle.
    pub fn set_dose_text(&mut self, id: &str, slot: TimeSlot, text: &str) -> Result<()> {
        let med = self.find_mut(id)?;
        if med.form.uses_dose_cycle() {
            return Err(AppError::InvalidRequest(format!(
                "'{}' usa el ciclo de dosis",
                med.name
            )));
        }
        *med.cell_mut(slot) = DoseCell::Text(text.to_string());
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Medication> {
        let index = self
            .list
            .medications
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("medication {id}")))?;
        Ok(self.list.medications.remove(index))
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Medication> {
        self.list
            .medications
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("medication {id}")))
    }

    fn fresh_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let candidate = format!("med-{}", self.next_id);
            if !self.list.medications.iter().any(|m| m.id == candidate) {
                return candidate;
            }
        }
    }
}
