//! Time slots, administration forms and prescribed frequencies.

use serde::{Deserialize, Serialize};

// == Time Slot ==
/// Time of day a dose is taken. Each medication has one cell per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Night,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Night];

    /// Column heading on the printed chart.
    pub fn heading(self) -> &'static str {
        match self {
            TimeSlot::Morning => "Mañana",
            TimeSlot::Afternoon => "Tarde",
            TimeSlot::Night => "Noche",
        }
    }
}

// == Administration Form ==
/// How the medication is administered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministrationForm {
    #[serde(alias = "comprimido")]
    Tablet,
    #[serde(alias = "gotas")]
    Drops,
    #[serde(alias = "sobre")]
    Sachet,
    #[serde(alias = "otro")]
    Other,
    #[default]
    #[serde(alias = "ninguno")]
    None,
}

impl AdministrationForm {
    /// Whether schedule cells use the click-driven dose cycle.
    ///
    /// Drops, sachets and other forms take free-text doses instead.
    pub fn uses_dose_cycle(self) -> bool {
        matches!(self, AdministrationForm::Tablet | AdministrationForm::None)
    }

    /// Unit printed after a free-text dose.
    pub fn unit_hint(self) -> &'static str {
        match self {
            AdministrationForm::Tablet => "comp.",
            AdministrationForm::Drops => "gotas",
            AdministrationForm::Sachet => "sobre",
            AdministrationForm::Other | AdministrationForm::None => "",
        }
    }
}

// == Frequency ==
/// Prescribed frequency, deciding which slots start filled when a medication is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    #[serde(rename = "1 vez al día (mañana)")]
    OnceMorning,
    #[serde(rename = "1 vez al día (noche)")]
    OnceNight,
    #[serde(rename = "cada 12 horas")]
    Every12Hours,
    #[serde(rename = "cada 8 horas")]
    Every8Hours,
    #[serde(rename = "SOS")]
    AsNeeded,
}

impl Frequency {
    /// Slots that receive a dose by default.
    pub fn slots(self) -> &'static [TimeSlot] {
        match self {
            Frequency::OnceMorning => &[TimeSlot::Morning],
            Frequency::OnceNight => &[TimeSlot::Night],
            Frequency::Every12Hours => &[TimeSlot::Morning, TimeSlot::Night],
            Frequency::Every8Hours => &[TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Night],
            Frequency::AsNeeded => &[],
        }
    }

    pub fn covers(self, slot: TimeSlot) -> bool {
        self.slots().contains(&slot)
    }
}
