// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Certificate renderer — lay out a signed attestation record as a one-page
// PDF certificate using `printpdf` 0.8.
//
// The renderer is a read-only projection of the record: the only derived
// values are unit conversions (bytes to GB, seconds to minutes) and the
// fingerprint of the embedded record signature. It knows nothing about
// document signing.
//
// Output is byte-stable for a given record: the info dates come from
// `wipe_process.end_time` and the trailer `/ID` from the record hash.

use chrono::{DateTime, NaiveDateTime};
use printpdf::{
    BuiltinFont, Mm, OffsetDateTime, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point,
    Pt, TextItem,
};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use wipeseal_core::error::{Result, WipesealError};
use wipeseal_core::{AttestationRecord, PaperSize, value_f64, value_text};
use wipeseal_security::hash_bytes;

/// Title printed at the top of every certificate.
pub const CERTIFICATE_TITLE: &str = "SSD WIPE CERTIFICATE OF DATA DESTRUCTION";

const NOT_AVAILABLE: &str = "N/A";
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Turns a signed record into rendered document bytes.
///
/// Implementations must be pure: same record in, same document content out.
pub trait DocumentRenderer {
    fn render(&self, record: &AttestationRecord) -> Result<Vec<u8>>;
}

/// One line of the certificate body.
#[derive(Debug, Clone, PartialEq)]
pub enum CertificateLine {
    Title(String),
    Heading(String),
    Row { label: String, value: String },
    Gap,
}

/// Renders the destruction certificate with the PDF base-14 fonts.
#[derive(Debug, Clone)]
pub struct CertificateRenderer {
    paper_size: PaperSize,
}

impl Default for CertificateRenderer {
    fn default() -> Self {
        Self::new(PaperSize::A4)
    }
}

impl CertificateRenderer {
    pub fn new(paper_size: PaperSize) -> Self {
        Self { paper_size }
    }

    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }
}

impl DocumentRenderer for CertificateRenderer {
    #[instrument(skip_all, fields(paper = ?self.paper_size))]
    fn render(&self, record: &AttestationRecord) -> Result<Vec<u8>> {
        let (page_w, page_h) = self.page_dimensions();
        let page_w_pt = page_w.into_pt().0;
        let page_h_pt = page_h.into_pt().0;
        let margin_pt = Mm(18.0).into_pt().0;
        let value_x_pt = margin_pt + Mm(40.0).into_pt().0;

        // Helvetica averages about half an em per glyph.
        let value_width_pt = page_w_pt - value_x_pt - margin_pt;
        let max_value_chars = (value_width_pt / (0.5 * BODY_SIZE)).max(8.0) as usize;

        let mut ops: Vec<Op> = Vec::new();
        let mut y_pt = page_h_pt - margin_pt;

        for line in certificate_lines(record) {
            match line {
                CertificateLine::Title(text) => {
                    let estimated_width = text.chars().count() as f32 * 0.6 * TITLE_SIZE;
                    let x_pt = ((page_w_pt - estimated_width) / 2.0).max(margin_pt);
                    push_text(&mut ops, &text, x_pt, y_pt, TITLE_SIZE, BuiltinFont::HelveticaBold);
                    y_pt -= TITLE_SIZE * 2.0;
                }
                CertificateLine::Heading(text) => {
                    push_text(&mut ops, &text, margin_pt, y_pt, HEADING_SIZE, BuiltinFont::HelveticaBold);
                    y_pt -= HEADING_SIZE * 1.6;
                }
                CertificateLine::Row { label, value } => {
                    push_text(&mut ops, &label, margin_pt, y_pt, BODY_SIZE, BuiltinFont::HelveticaBold);
                    for chunk in wrap_value(&value, max_value_chars) {
                        push_text(&mut ops, &chunk, value_x_pt, y_pt, BODY_SIZE, BuiltinFont::Helvetica);
                        y_pt -= BODY_SIZE * 1.5;
                    }
                }
                CertificateLine::Gap => y_pt -= BODY_SIZE * 1.5,
            }
        }

        if y_pt < margin_pt {
            return Err(WipesealError::Render(
                "certificate content does not fit on one page".into(),
            ));
        }

        let mut doc = PdfDocument::new(CERTIFICATE_TITLE);
        let issued = issue_date(record);
        doc.metadata.info.creation_date = issued;
        doc.metadata.info.modification_date = issued;
        doc.metadata.info.metadata_date = issued;
        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings");
        }
        if output.is_empty() {
            return Err(WipesealError::Render("renderer produced no output".into()));
        }
        let output = pin_document_id(output, record)?;

        info!(bytes = output.len(), "certificate rendered");
        Ok(output)
    }
}

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.0;

/// Info dictionary date: the record's `end_time`, or the epoch when it is
/// missing or unparseable.
fn issue_date(record: &AttestationRecord) -> OffsetDateTime {
    let timestamp = value_text(record.wipe_process.end_time.as_ref())
        .and_then(|text| parse_timestamp(&text))
        .unwrap_or(0);
    OffsetDateTime::from_unix_timestamp(timestamp).unwrap_or_else(|_| OffsetDateTime::epoch())
}

/// Seconds since the epoch for an RFC 3339 or naive ISO 8601 (read as UTC)
/// timestamp.
fn parse_timestamp(text: &str) -> Option<i64> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(text) {
        return Some(aware.timestamp());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp())
}

/// Overwrite the random trailer `/ID` strings in place with hex taken from the
/// record hash. Lengths are kept, so every xref offset stays valid.
fn pin_document_id(mut output: Vec<u8>, record: &AttestationRecord) -> Result<Vec<u8>> {
    let parsed = lopdf::Document::load_mem(&output)
        .map_err(|e| WipesealError::Render(format!("rendered certificate does not parse: {e}")))?;
    let ids: Vec<Vec<u8>> = match parsed.trailer.get(b"ID").and_then(lopdf::Object::as_array) {
        Ok(array) => array
            .iter()
            .filter_map(|id| id.as_str().ok())
            .map(<[u8]>::to_vec)
            .collect(),
        Err(_) => return Ok(output),
    };

    let seed = hash_bytes(&serde_json::to_vec(record)?);
    for (index, id) in ids.iter().enumerate().filter(|(_, id)| !id.is_empty()) {
        let Some(at) = output.windows(id.len()).rposition(|window| window == id.as_slice()) else {
            continue;
        };
        let replacement = seed.bytes().cycle().skip(index * 32).take(id.len());
        for (slot, byte) in output[at..at + id.len()].iter_mut().zip(replacement) {
            *slot = byte;
        }
    }
    Ok(output)
}

fn push_text(ops: &mut Vec<Op>, text: &str, x_pt: f32, y_pt: f32, size: f32, font: BuiltinFont) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(x_pt),
            y: Pt(y_pt),
        },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size),
        font,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_string())],
        font,
    });
    ops.push(Op::EndTextSection);
}

// -- Layout -------------------------------------------------------------------

/// The certificate content, top to bottom.
pub fn certificate_lines(record: &AttestationRecord) -> Vec<CertificateLine> {
    let device = &record.device;
    let wipe = &record.wipe_process;

    let fingerprint = record
        .signature()
        .map(|jws| hash_bytes(jws.as_bytes()))
        .unwrap_or_else(|| "unsigned".to_string());

    let lines = vec![
        CertificateLine::Title(CERTIFICATE_TITLE.to_string()),
        CertificateLine::Heading("Device Information:".to_string()),
        row("Device Type:", or_na(device.device_type.as_ref())),
        row("Model:", or_na(device.model.as_ref())),
        row("Serial:", or_na(device.serial_number.as_ref())),
        row("Capacity:", format_capacity(device.capacity_bytes.as_ref())),
        CertificateLine::Gap,
        CertificateLine::Heading("Wipe Process:".to_string()),
        row("Method:", or_na(wipe.wipe_method.as_ref())),
        row("Started:", or_na(wipe.start_time.as_ref())),
        row("Finished:", or_na(wipe.end_time.as_ref())),
        row("Duration:", format_duration(wipe.duration_seconds.as_ref())),
        row(
            "Status:",
            format_status(record.verification.verification_status.as_ref()),
        ),
        CertificateLine::Gap,
        CertificateLine::Heading("Record Signature:".to_string()),
        row("Fingerprint:", fingerprint),
    ];

    debug!(lines = lines.len(), "certificate layout built");
    lines
}

fn row(label: &str, value: String) -> CertificateLine {
    CertificateLine::Row {
        label: label.to_string(),
        value,
    }
}

fn or_na(value: Option<&Value>) -> String {
    value_text(value).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Capacity in GiB with one decimal; a missing capacity shows as `0.0 GB`
/// and a non-numeric one is printed as given.
pub fn format_capacity(bytes: Option<&Value>) -> String {
    format_scaled(bytes, BYTES_PER_GB, "GB")
}

/// Duration in minutes with one decimal.
pub fn format_duration(seconds: Option<&Value>) -> String {
    format_scaled(seconds, 60.0, "minutes")
}

fn format_scaled(value: Option<&Value>, divisor: f64, unit: &str) -> String {
    match (value_f64(value), value_text(value)) {
        (Some(number), _) => format!("{:.1} {unit}", number / divisor),
        (None, Some(text)) => text,
        (None, None) => format!("{:.1} {unit}", 0.0),
    }
}

pub fn format_status(status: Option<&Value>) -> String {
    or_na(status).to_uppercase()
}

/// Split a value into chunks of at most `max_chars`, breaking on whitespace
/// where possible.
fn wrap_value(value: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in value.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        if current.is_empty() {
            current = word;
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scenario() -> AttestationRecord {
        AttestationRecord::from_value(json!({
            "device": {
                "device_type": "SSD",
                "model": "X1",
                "serial_number": "S123",
                "capacity_bytes": 1000000000000u64
            },
            "wipe_process": {
                "wipe_method": "NIST-Clear",
                "start_time": "2024-01-01T00:00:00",
                "end_time": "2024-01-01T00:30:00",
                "duration_seconds": 1800
            },
            "verification": {"verification_status": "passed"},
            "audit": {"digital_signature": "header.payload.signature"}
        }))
        .unwrap()
    }

    fn value_of(lines: &[CertificateLine], wanted: &str) -> String {
        lines
            .iter()
            .find_map(|line| match line {
                CertificateLine::Row { label, value } if label == wanted => Some(value.clone()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn derived_display_values() {
        let lines = certificate_lines(&scenario());
        assert_eq!(lines[0], CertificateLine::Title(CERTIFICATE_TITLE.to_string()));
        assert_eq!(value_of(&lines, "Capacity:"), "931.3 GB");
        assert_eq!(value_of(&lines, "Duration:"), "30.0 minutes");
        assert_eq!(value_of(&lines, "Status:"), "PASSED");
        assert_eq!(
            value_of(&lines, "Fingerprint:"),
            hash_bytes(b"header.payload.signature")
        );
    }

    #[test]
    fn missing_values_show_placeholders() {
        let lines = certificate_lines(&AttestationRecord::default());
        assert_eq!(value_of(&lines, "Model:"), "N/A");
        assert_eq!(value_of(&lines, "Capacity:"), "0.0 GB");
        assert_eq!(value_of(&lines, "Duration:"), "0.0 minutes");
        assert_eq!(value_of(&lines, "Status:"), "N/A");
        assert_eq!(value_of(&lines, "Fingerprint:"), "unsigned");
    }

    #[test]
    fn render_produces_a_pdf_without_touching_the_record() {
        let record = scenario();
        let before = record.clone();
        let bytes = CertificateRenderer::new(PaperSize::Letter)
            .render(&record)
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(record, before);
        assert_eq!(
            lopdf::Document::load_mem(&bytes).unwrap().get_pages().len(),
            1
        );
    }

    #[test]
    fn non_string_fields_are_displayed() {
        let record = AttestationRecord::from_value(json!({
            "device": {"serial_number": 4711, "capacity_bytes": "1000000000000", "model": null},
            "wipe_process": {"duration_seconds": "unknown"},
            "verification": {"verification_status": true},
            "audit": {"digital_signature": null}
        }))
        .unwrap();
        let lines = certificate_lines(&record);
        assert_eq!(value_of(&lines, "Serial:"), "4711");
        assert_eq!(value_of(&lines, "Capacity:"), "931.3 GB");
        assert_eq!(value_of(&lines, "Model:"), "N/A");
        assert_eq!(value_of(&lines, "Duration:"), "unknown");
        assert_eq!(value_of(&lines, "Status:"), "TRUE");
        assert!(CertificateRenderer::default().render(&record).is_ok());
    }

    #[test]
    fn rendering_is_byte_stable() {
        let renderer = CertificateRenderer::default();
        let first = renderer.render(&scenario()).unwrap();
        let second = renderer.render(&scenario()).unwrap();
        assert_eq!(first, second);

        let doc = lopdf::Document::load_mem(&first).unwrap();
        let ids = doc.trailer.get(b"ID").unwrap().as_array().unwrap();
        let seed = hash_bytes(&serde_json::to_vec(&scenario()).unwrap());
        assert_eq!(ids[0].as_str().unwrap(), &seed.as_bytes()[..32]);
        assert_eq!(ids[1].as_str().unwrap(), &seed.as_bytes()[32..]);

        let mut other = scenario();
        other.device.model = Some(json!("X2"));
        assert_ne!(renderer.render(&other).unwrap(), first);
    }

    #[test]
    fn issue_date_follows_end_time() {
        assert_eq!(parse_timestamp("2024-01-01T00:30:00"), Some(1_704_069_000));
        assert_eq!(parse_timestamp("2024-01-01T00:30:00.250"), Some(1_704_069_000));
        assert_eq!(parse_timestamp("2024-01-01T01:30:00+01:00"), Some(1_704_069_000));
        assert_eq!(parse_timestamp("yesterday"), None);

        let issued = issue_date(&scenario());
        assert_eq!(issued.year(), 2024);
        assert_eq!(issue_date(&AttestationRecord::default()).year(), 1970);
    }

    #[test]
    fn long_values_wrap() {
        let wrapped = wrap_value("alpha beta gamma", 10);
        assert_eq!(wrapped, vec!["alpha beta", "gamma"]);
        let wrapped = wrap_value("abcdefghijkl", 5);
        assert_eq!(wrapped, vec!["abcde", "fghij", "kl"]);
        assert_eq!(wrap_value("", 5), vec![""]);
    }
}
