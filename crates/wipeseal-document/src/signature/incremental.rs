// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Incremental PDF signer — append a detached CMS signature to a rendered PDF
// without touching any of its existing bytes (ISO 32000-1 §7.5.6, §12.8).
//
// The update appends, after the original `%%EOF`:
//   * a signature dictionary with a fixed-width `/ByteRange` placeholder and a
//     zero-filled `/Contents <...>` hex placeholder of `reserve_bytes`;
//   * an invisible signature widget / field on page 1;
//   * new revisions of the catalog (with `/AcroForm`) and of page 1 (with the
//     widget in `/Annots`);
//   * a cross-reference table and a trailer chained with `/Prev` to the
//     previous section, which may be a table or a cross-reference stream.
//
// `/ByteRange` is then patched to cover everything except the `/Contents`
// value, the SHA-256 of those two ranges goes into the CMS `messageDigest`,
// and the hex CMS is written into the placeholder. Patching never changes a
// byte count, so the offsets recorded in the new xref stay valid.

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Object, ObjectId};
use tracing::{debug, info, instrument};
use wipeseal_core::SealConfig;
use wipeseal_core::error::{Result, WipesealError};
use wipeseal_security::{KeyMaterialProvider, SigningIdentity, sha256_digest};

use super::cms::build_signed_data;
use crate::pdf::reader::PdfReader;
use crate::pdf::syntax::{text_string, write_object};

/// Fixed-width stand-in for the final `/ByteRange` array.
const BYTE_RANGE_PLACEHOLDER: &[u8] = b"[0 0000000000 0000000000 0000000000]";

/// Annotation flags for the widget: Print | Locked.
const WIDGET_FLAGS: i64 = 132;

/// AcroForm `/SigFlags`: SignaturesExist | AppendOnly.
const SIG_FLAGS: i64 = 3;

/// Appends a cryptographic signature to already rendered document bytes.
pub trait DocumentSigner {
    /// Return the signed document. `rendered` must be a prefix of the result.
    fn sign_document(&self, rendered: &[u8], identity: &SigningIdentity) -> Result<Vec<u8>>;
}

/// Knobs for the signature dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureOptions {
    /// `/T` of the signature field.
    pub field_name: String,
    /// Maximum DER size of the CMS blob; the placeholder is twice this in hex.
    pub reserve_bytes: usize,
    pub reason: Option<String>,
    pub location: Option<String>,
    /// Fixed signing time, `None` for the current time.
    pub signing_time: Option<DateTime<Utc>>,
}

impl Default for SignatureOptions {
    fn default() -> Self {
        Self {
            field_name: "Signature1".to_string(),
            reserve_bytes: 8192,
            reason: None,
            location: None,
            signing_time: None,
        }
    }
}

impl SignatureOptions {
    pub fn from_config(config: &SealConfig) -> Self {
        Self {
            field_name: config.signature_field_name.clone(),
            reserve_bytes: config.signature_reserve_bytes,
            reason: config.signer_reason.clone(),
            location: config.signer_location.clone(),
            signing_time: None,
        }
    }
}

/// Load the signing identity from `keys` and sign `rendered`.
pub fn sign_document(
    rendered: &[u8],
    keys: &impl KeyMaterialProvider,
    options: &SignatureOptions,
) -> Result<Vec<u8>> {
    let identity = keys.load_signing_identity()?;
    IncrementalPdfSigner::new(options.clone()).sign_document(rendered, &identity)
}

/// The PDF incremental-update signer.
#[derive(Debug, Clone, Default)]
pub struct IncrementalPdfSigner {
    options: SignatureOptions,
}

/// Where the placeholders ended up in the output.
struct Placeholders {
    byte_range_at: usize,
    contents_start: usize,
    contents_end: usize,
}

impl IncrementalPdfSigner {
    pub fn new(options: SignatureOptions) -> Self {
        Self { options }
    }

    /// Append the signature revision with empty placeholders.
    fn append_update(
        &self,
        reader: &PdfReader,
        rendered: &[u8],
        signer_name: &str,
        signing_time: DateTime<Utc>,
    ) -> Result<(Vec<u8>, Placeholders)> {
        let catalog_id = reader.catalog_id()?;
        let page_id = reader.first_page_id()?;
        let mut catalog = reader.dictionary(catalog_id)?;
        let mut page = reader.dictionary(page_id)?;

        let base = reader
            .trailer_size()
            .unwrap_or(0)
            .max(reader.max_object_id() + 1);
        let sig_id: ObjectId = (base, 0);
        let widget_id: ObjectId = (base + 1, 0);
        let size = base + 2;

        // Field registration: AcroForm may be inline, indirect, or missing.
        let mut acro_form_revision = None;
        match catalog.get(b"AcroForm").ok().cloned() {
            Some(Object::Reference(form_id)) => {
                let mut form = reader.dictionary(form_id)?;
                add_field(reader, &mut form, widget_id)?;
                acro_form_revision = Some((form_id, form));
            }
            Some(Object::Dictionary(mut form)) => {
                add_field(reader, &mut form, widget_id)?;
                catalog.set("AcroForm", Object::Dictionary(form));
            }
            _ => {
                let mut form = Dictionary::new();
                add_field(reader, &mut form, widget_id)?;
                catalog.set("AcroForm", Object::Dictionary(form));
            }
        }

        let mut annots = match page.get(b"Annots") {
            Ok(existing) => reader
                .resolve(existing)?
                .as_array()
                .map_err(|e| WipesealError::Render(format!("page /Annots: {e}")))?
                .clone(),
            Err(_) => Vec::new(),
        };
        annots.push(Object::Reference(widget_id));
        page.set("Annots", Object::Array(annots));

        let mut widget = Dictionary::new();
        widget.set("Type", Object::Name(b"Annot".to_vec()));
        widget.set("Subtype", Object::Name(b"Widget".to_vec()));
        widget.set("FT", Object::Name(b"Sig".to_vec()));
        widget.set("T", text_string(&self.options.field_name));
        widget.set("V", Object::Reference(sig_id));
        widget.set("F", Object::Integer(WIDGET_FLAGS));
        widget.set("Rect", Object::Array(vec![Object::Integer(0); 4]));
        widget.set("P", Object::Reference(page_id));

        let mut out = rendered.to_vec();
        if !out.ends_with(b"\n") {
            out.push(b'\n');
        }
        let mut xref: Vec<(ObjectId, usize)> = Vec::new();

        // Signature dictionary, written by hand to pin the placeholder offsets.
        xref.push((sig_id, out.len()));
        out.extend_from_slice(format!("{} {} obj\n", sig_id.0, sig_id.1).as_bytes());
        out.extend_from_slice(
            b"<</Type /Sig/Filter /Adobe.PPKLite/SubFilter /adbe.pkcs7.detached/ByteRange ",
        );
        let byte_range_at = out.len();
        out.extend_from_slice(BYTE_RANGE_PLACEHOLDER);
        out.extend_from_slice(b"/Contents ");
        let contents_start = out.len();
        out.push(b'<');
        out.resize(out.len() + 2 * self.options.reserve_bytes, b'0');
        out.push(b'>');
        let contents_end = out.len();

        out.extend_from_slice(b"/M ");
        write_object(&mut out, &text_string(&pdf_date(signing_time)))?;
        out.extend_from_slice(b"/Name ");
        write_object(&mut out, &text_string(signer_name))?;
        if let Some(reason) = &self.options.reason {
            out.extend_from_slice(b"/Reason ");
            write_object(&mut out, &text_string(reason))?;
        }
        if let Some(location) = &self.options.location {
            out.extend_from_slice(b"/Location ");
            write_object(&mut out, &text_string(location))?;
        }
        out.extend_from_slice(b">>\nendobj\n");

        write_indirect(&mut out, &mut xref, widget_id, &Object::Dictionary(widget))?;
        write_indirect(&mut out, &mut xref, catalog_id, &Object::Dictionary(catalog))?;
        write_indirect(&mut out, &mut xref, page_id, &Object::Dictionary(page))?;
        if let Some((form_id, form)) = acro_form_revision {
            write_indirect(&mut out, &mut xref, form_id, &Object::Dictionary(form))?;
        }

        let xref_offset = out.len();
        xref.sort_by_key(|((id, _), _)| *id);
        out.extend_from_slice(b"xref\n");
        for ((id, generation), offset) in &xref {
            out.extend_from_slice(
                format!("{id} 1\n{offset:010} {generation:05} n\r\n").as_bytes(),
            );
        }

        let mut trailer = Dictionary::new();
        trailer.set("Size", Object::Integer(i64::from(size)));
        trailer.set("Root", Object::Reference(catalog_id));
        trailer.set("Prev", Object::Integer(reader.startxref() as i64));
        for key in [&b"Info"[..], &b"ID"[..]] {
            if let Some(value) = reader.trailer_entry(key) {
                trailer.set(key.to_vec(), value.clone());
            }
        }
        out.extend_from_slice(b"trailer\n");
        write_object(&mut out, &Object::Dictionary(trailer))?;
        out.extend_from_slice(format!("\nstartxref\n{xref_offset}\n%%EOF\n").as_bytes());

        debug!(
            objects = xref.len(),
            xref_offset,
            contents_start,
            contents_end,
            "signature update appended"
        );

        Ok((
            out,
            Placeholders {
                byte_range_at,
                contents_start,
                contents_end,
            },
        ))
    }
}

impl DocumentSigner for IncrementalPdfSigner {
    #[instrument(skip_all, fields(rendered_len = rendered.len(), field = %self.options.field_name))]
    fn sign_document(&self, rendered: &[u8], identity: &SigningIdentity) -> Result<Vec<u8>> {
        let reader = PdfReader::from_bytes(rendered)?;
        let signing_time = self.options.signing_time.unwrap_or_else(Utc::now);
        let (mut out, slots) =
            self.append_update(&reader, rendered, &identity.subject(), signing_time)?;

        let total = out.len();
        let byte_range = format!(
            "[0 {} {} {}]",
            slots.contents_start,
            slots.contents_end,
            total - slots.contents_end
        );
        if byte_range.len() > BYTE_RANGE_PLACEHOLDER.len() {
            return Err(WipesealError::Render(
                "document too large for the /ByteRange placeholder".into(),
            ));
        }
        let padded = format!("{byte_range:<width$}", width = BYTE_RANGE_PLACEHOLDER.len());
        out[slots.byte_range_at..slots.byte_range_at + padded.len()]
            .copy_from_slice(padded.as_bytes());

        let digest = sha256_digest(&[
            &out[..slots.contents_start],
            &out[slots.contents_end..],
        ]);
        let cms = build_signed_data(&digest, signing_time, identity)?;
        if cms.len() > self.options.reserve_bytes {
            return Err(WipesealError::Render(format!(
                "signature of {} bytes exceeds the {} bytes reserved",
                cms.len(),
                self.options.reserve_bytes
            )));
        }

        let encoded = hex::encode_upper(&cms);
        let hex_start = slots.contents_start + 1;
        out[hex_start..hex_start + encoded.len()].copy_from_slice(encoded.as_bytes());

        info!(
            signed_len = out.len(),
            cms_len = cms.len(),
            byte_range = %byte_range,
            "document signed"
        );
        Ok(out)
    }
}

/// Append `id` to the form's `/Fields` and mark the document as signed.
fn add_field(reader: &PdfReader, form: &mut Dictionary, widget_id: ObjectId) -> Result<()> {
    let mut fields = match form.get(b"Fields") {
        Ok(existing) => reader
            .resolve(existing)?
            .as_array()
            .map_err(|e| WipesealError::Render(format!("AcroForm /Fields: {e}")))?
            .clone(),
        Err(_) => Vec::new(),
    };
    fields.push(Object::Reference(widget_id));
    form.set("Fields", Object::Array(fields));
    form.set("SigFlags", Object::Integer(SIG_FLAGS));
    Ok(())
}

fn write_indirect(
    out: &mut Vec<u8>,
    xref: &mut Vec<(ObjectId, usize)>,
    id: ObjectId,
    object: &Object,
) -> Result<()> {
    xref.push((id, out.len()));
    out.extend_from_slice(format!("{} {} obj\n", id.0, id.1).as_bytes());
    write_object(out, object)?;
    out.extend_from_slice(b"\nendobj\n");
    Ok(())
}

/// PDF date string in UTC, e.g. `D:20240101003000+00'00'`.
fn pdf_date(time: DateTime<Utc>) -> String {
    time.format("D:%Y%m%d%H%M%S+00'00'").to_string()
}
