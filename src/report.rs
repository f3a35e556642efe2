//! Printable patient report.
//!
//! Renders one record as an A4 PDF with the same field formatting the
//! read-only report view uses: missing optionals show as "N/A",
//! tri-states as Yes/No/N/A, and symptom descriptions only when their
//! flag is Yes. PDF generation via `printpdf`.

use printpdf::*;
use std::io::BufWriter;

use crate::db::DatabaseError;
use crate::models::{PatientRecord, TriState};
use crate::normalize::{display_or_na, list_to_display};

/// Generates a PDF for the record. Returns PDF bytes.
pub fn render_patient_pdf(record: &PatientRecord) -> Result<Vec<u8>, DatabaseError> {
    let title = format!("Patient Record — {} {}", record.first_name, record.last_name);
    let (doc, page1, layer1) = PdfDocument::new(&title, Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("PDF font error: {e}")))?;

    let mut y = Mm(280.0);

    // Title + record identity
    layer.use_text(&title, 14.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    layer.use_text(
        format!("Record ID: {}", record.id),
        8.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(4.5);
    layer.use_text(
        format!(
            "Created: {}    Last updated: {}",
            record.created_at, record.updated_at
        ),
        8.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(10.0);

    let personal: [(&str, String); 9] = [
        ("Phone", display_or_na(Some(&record.phone))),
        ("City", display_or_na(Some(&record.city))),
        ("Occupation", display_or_na(Some(&record.occupation))),
        ("Marital Status", record.marital_status.as_str().to_string()),
        ("Spouse Name", display_or_na(Some(&record.spouse_name))),
        ("Age", record.age.to_string()),
        ("Gender", record.gender.as_str().to_string()),
        ("Birth Date", record.birth_date.to_string()),
        (
            "Photo on file",
            if record.photo.is_some() { "Yes" } else { "No" }.to_string(),
        ),
    ];
    y = section(&layer, &font, &bold, y, "PERSONAL INFORMATION", &personal);

    let allergies: [(&str, String); 2] = [
        ("Allergic", if record.allergic { "Yes" } else { "No" }.to_string()),
        (
            "Allergies",
            if record.allergic {
                display_or_na(Some(&record.allergies))
            } else {
                display_or_na(None)
            },
        ),
    ];
    y = section(&layer, &font, &bold, y, "ALLERGIES", &allergies);

    let history: [(&str, String); 1] = [(
        "Conditions",
        if record.medical_history.is_empty() {
            display_or_na(None)
        } else {
            list_to_display(&record.medical_history)
        },
    )];
    y = section(&layer, &font, &bold, y, "MEDICAL HISTORY", &history);

    if let Some(female) = &record.female {
        let rows: [(&str, String); 11] = [
            ("Period Type", female.period_type.as_str().to_string()),
            (
                "Still having periods",
                female.still_having_periods.display().to_string(),
            ),
            (
                "Difficulty with periods",
                female.difficulty_with_periods.as_str().to_string(),
            ),
            ("Pregnancies", female.pregnancies.to_string()),
            ("Births", female.births.to_string()),
            ("Miscarriages", female.miscarriages.to_string()),
            ("Abortions", female.abortions.to_string()),
            (
                "Leakage of urine",
                symptom_row(female.leakage_of_urine, &female.leakage_description),
            ),
            (
                "Pelvic pain",
                symptom_row(female.pelvic_pain, &female.pelvic_description),
            ),
            (
                "Abnormal discharge",
                symptom_row(
                    female.abnormal_discharge,
                    &female.abnormal_discharge_description,
                ),
            ),
            (
                "Abnormal Pap Smear",
                symptom_row(
                    female.abnormal_pap_smear,
                    &female.abnormal_pap_smear_description,
                ),
            ),
        ];
        section(&layer, &font, &bold, y, "WOMEN'S HEALTH", &rows);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| DatabaseError::ConstraintViolation(format!("PDF buffer error: {e}")))
}

/// Tri-state flag with its description appended only when the flag is Yes.
fn symptom_row(flag: TriState, description: &str) -> String {
    match flag {
        TriState::Yes if !description.is_empty() => {
            format!("{} — {}", flag.display(), description)
        }
        _ => flag.display().to_string(),
    }
}

fn section(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
    mut y: Mm,
    heading: &str,
    rows: &[(&str, String)],
) -> Mm {
    layer.use_text(heading, 11.0, Mm(20.0), y, bold);
    y -= Mm(6.0);
    for (label, value) in rows {
        let text = format!("  {label}: {value}");
        for line in wrap_text(&text, 90) {
            layer.use_text(&line, 9.0, Mm(25.0), y, font);
            y -= Mm(4.5);
        }
    }
    y -= Mm(6.0);
    y
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
