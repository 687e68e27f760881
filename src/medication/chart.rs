//! Printable chart rendering.
//!
//! The output is a standalone HTML fragment that the front-end prints or
//! turns into a PDF. Every user-supplied string is escaped.

use std::fmt::Write;

use super::model::MedicationList;
use crate::dose::{Frequency, TimeSlot};
use crate::sanitize::escape_html;

const TABLE_STYLE: &str = "border-collapse: collapse; width: 100%";
const CELL_STYLE: &str = "border: 1px solid #444; padding: 4px";

/// Renders the medication list as printable HTML tables.
pub fn render_chart_html(list: &MedicationList) -> String {
    let mut out = String::new();
    let patient = &list.patient;

    out.push_str("<div class=\"cartola\">");
    let _ = write!(
        out,
        "<h2>Cartola de medicamentos</h2><p><b>Paciente:</b> {}<br><b>RUT:</b> {}<br><b>Fecha:</b> {}</p>",
        escape_html(&patient.name),
        escape_html(&patient.rut),
        escape_html(&patient.date),
    );

    if !list.medications.is_empty() {
        out.push_str("<h3>Medicamentos orales</h3>");
        open_table(&mut out, &["Medicamento", "Presentación", "Frecuencia"], true);
        for med in &list.medications {
            out.push_str("<tr>");
            cell(&mut out, &med.name);
            cell(&mut out, &med.presentation);
            cell(&mut out, &frequency_label(med.frequency));
            for slot in TimeSlot::ALL {
                let dose = med.cell(slot).display();
                let unit = med.form.unit_hint();
                let text = if dose.is_empty() || unit.is_empty() || !med.form.uses_dose_cycle() {
                    dose
                } else {
                    format!("{dose} {unit}")
                };
                cell(&mut out, &text);
            }
            cell(&mut out, &med.notes);
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
    }

    if !list.injectables.is_empty() {
        out.push_str("<h3>Inyectables</h3>");
        open_table(&mut out, &["Medicamento", "Dosis", "Horario", "Observaciones"], false);
        for inj in &list.injectables {
            out.push_str("<tr>");
            for text in [&inj.name, &inj.dose, &inj.schedule, &inj.notes] {
                cell(&mut out, text);
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
    }

    if !list.inhalers.is_empty() {
        out.push_str("<h3>Inhaladores</h3>");
        open_table(&mut out, &["Inhalador", "Puffs", "Horario", "Observaciones"], false);
        for inh in &list.inhalers {
            out.push_str("<tr>");
            for text in [&inh.name, &inh.puffs, &inh.schedule, &inh.notes] {
                cell(&mut out, text);
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
    }

    out.push_str("</div>");
    out
}

fn open_table(out: &mut String, headings: &[&str], with_slots: bool) {
    let _ = write!(out, "<table style=\"{TABLE_STYLE}\"><thead><tr>");
    for heading in headings {
        let _ = write!(out, "<th style=\"{CELL_STYLE}\">{heading}</th>");
    }
    if with_slots {
        for slot in TimeSlot::ALL {
            let _ = write!(out, "<th style=\"{CELL_STYLE}\">{}</th>", slot.heading());
        }
        let _ = write!(out, "<th style=\"{CELL_STYLE}\">Observaciones</th>");
    }
    out.push_str("</tr></thead><tbody>");
}

fn cell(out: &mut String, text: &str) {
    let _ = write!(out, "<td style=\"{CELL_STYLE}\">{}</td>", escape_html(text));
}

fn frequency_label(frequency: Frequency) -> String {
    serde_json::to_value(frequency)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
