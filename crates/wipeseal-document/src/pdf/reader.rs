// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — inspect a rendered PDF with `lopdf` before a signature update
// is appended to it.
//
// The signer needs the catalog, the first page, the trailer entries that
// carry over into the update, and the offset of the previous cross-reference
// section. All failures here mean the input is not a usable PDF and surface
// as `Render` errors.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, instrument};
use wipeseal_core::error::{Result, WipesealError};

/// Read-only view of an existing PDF.
pub struct PdfReader {
    document: Document,
    /// Offset of the last cross-reference section (`startxref` value).
    startxref: usize,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(&data)
    }

    /// Parse raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if !data.starts_with(b"%PDF-") {
            return Err(render_err("input does not start with a %PDF- header"));
        }
        let startxref = find_startxref(data)?;
        let document = Document::load_mem(data)
            .map_err(|err| render_err(&format!("failed to parse PDF: {err}")))?;

        debug!(pages = document.get_pages().len(), startxref, "PDF loaded");
        Ok(Self {
            document,
            startxref,
        })
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    pub fn startxref(&self) -> usize {
        self.startxref
    }

    /// Highest object number in use.
    pub fn max_object_id(&self) -> u32 {
        self.document.max_id
    }

    /// `/Size` declared by the current trailer, if any.
    pub fn trailer_size(&self) -> Option<u32> {
        self.trailer_entry(b"Size")
            .and_then(|size| size.as_i64().ok())
            .and_then(|size| u32::try_from(size).ok())
    }

    /// A trailer entry copied verbatim into the update (`/Info`, `/ID`).
    pub fn trailer_entry(&self, key: &[u8]) -> Option<&Object> {
        self.document.trailer.get(key).ok()
    }

    pub fn catalog_id(&self) -> Result<ObjectId> {
        self.document
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(|err| render_err(&format!("trailer has no /Root reference: {err}")))
    }

    pub fn first_page_id(&self) -> Result<ObjectId> {
        self.document
            .get_pages()
            .get(&1)
            .copied()
            .ok_or_else(|| render_err("document has no pages"))
    }

    /// Clone of the dictionary stored under `id`.
    pub fn dictionary(&self, id: ObjectId) -> Result<Dictionary> {
        self.document
            .get_dictionary(id)
            .cloned()
            .map_err(|err| render_err(&format!("object {} {} R: {err}", id.0, id.1)))
    }

    /// Follow a reference once; direct objects are returned as they are.
    pub fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object> {
        match object {
            Object::Reference(id) => self
                .document
                .get_object(*id)
                .map_err(|err| render_err(&format!("object {} {} R: {err}", id.0, id.1))),
            direct => Ok(direct),
        }
    }
}

/// Value following the last `startxref` keyword.
pub fn find_startxref(data: &[u8]) -> Result<usize> {
    const KEYWORD: &[u8] = b"startxref";
    let position = data
        .windows(KEYWORD.len())
        .rposition(|window| window == KEYWORD)
        .ok_or_else(|| render_err("no startxref keyword"))?;

    let digits: String = data[position + KEYWORD.len()..]
        .iter()
        .skip_while(|byte| byte.is_ascii_whitespace())
        .take_while(|byte| byte.is_ascii_digit())
        .map(|&byte| char::from(byte))
        .collect();

    let offset: usize = digits
        .parse()
        .map_err(|_| render_err("startxref is not followed by an offset"))?;
    if offset >= data.len() {
        return Err(render_err("startxref points past the end of the file"));
    }
    Ok(offset)
}

fn render_err(detail: &str) -> WipesealError {
    WipesealError::Render(detail.to_string())
}
