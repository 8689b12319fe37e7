//! PDF export adapters
//!
//! Two deterministic renderings of a project snapshot:
//! - the lyric sheet (every strophe, stressed words in bold, adlibs in
//!   parentheses)
//! - the shooting script (only verses with camera settings, one scene block
//!   per verse with its setup rows and any image media embedded)
//!
//! Pagination rule: before writing a block, check the remaining vertical
//! space against the block height; when it does not fit, start a new page
//! and reset the cursor to the top margin. Output is byte-stable for a given
//! snapshot modulo embedded document timestamps.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use thiserror::Error;
use tracing::debug;

use letra_common::model::{MediaData, Project, SongInfo, Verse};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 20.0;
const MARGIN_LEFT: f32 = 10.0;
const LINE_HEIGHT: f32 = 10.0;
const IMAGE_BLOCK_HEIGHT: f32 = 60.0;

/// PDF export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// Page cursor implementing the pagination rule
struct Cursor {
    layer: PdfLayerReference,
    y: f32,
}

impl Cursor {
    fn start(layer: PdfLayerReference) -> Self {
        Self {
            layer,
            y: PAGE_HEIGHT - MARGIN_TOP,
        }
    }

    /// Start a new page when less than `needed` mm remain
    fn ensure_space(&mut self, doc: &PdfDocumentReference, needed: f32) {
        if self.y - needed < MARGIN_BOTTOM {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN_TOP;
        }
    }

    /// Write one text line at `x`, advancing the cursor
    fn text(
        &mut self,
        doc: &PdfDocumentReference,
        text: &str,
        size: f32,
        x: f32,
        font: &IndirectFontRef,
    ) {
        self.ensure_space(doc, LINE_HEIGHT);
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
        self.y -= LINE_HEIGHT;
    }
}

/// Approximate advance width of builtin Helvetica, in mm.
///
/// The builtin fonts expose no metrics; an average glyph advance of half the
/// point size is close enough for word spacing on the lyric sheet.
fn approx_width_mm(text: &str, size: f32) -> f32 {
    const PT_TO_MM: f32 = 0.352_778;
    text.chars().count() as f32 * size * 0.5 * PT_TO_MM
}

/// Download filename derived from sanitized artist/title
pub fn export_filename(info: &SongInfo, suffix: &str) -> String {
    fn sanitize(s: &str, fallback: &str) -> String {
        let mut out = String::new();
        let mut last_underscore = false;
        for c in s.trim().chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c.to_ascii_lowercase());
                last_underscore = false;
            } else if !last_underscore && !out.is_empty() {
                out.push('_');
                last_underscore = true;
            }
        }
        let out = out.trim_end_matches('_').to_string();
        if out.is_empty() {
            fallback.to_string()
        } else {
            out
        }
    }

    format!(
        "{}_{}{}.pdf",
        sanitize(&info.artist, "artista"),
        sanitize(&info.title, "musica"),
        suffix
    )
}

fn document_header(
    doc: &PdfDocumentReference,
    cursor: &mut Cursor,
    info: &SongInfo,
    regular: &IndirectFontRef,
) {
    cursor.text(
        doc,
        &format!(
            "{} - {}",
            info.artist.to_uppercase(),
            info.title.to_uppercase()
        ),
        18.0,
        MARGIN_LEFT,
        regular,
    );

    if !info.featuring.is_empty() {
        cursor.text(
            doc,
            &format!("FEATURING: {}", info.featuring.join(", ")),
            12.0,
            MARGIN_LEFT,
            regular,
        );
    }

    if !info.producer.is_empty() {
        cursor.text(
            doc,
            &format!("PRODUCED BY: {}", info.producer.to_uppercase()),
            12.0,
            MARGIN_LEFT,
            regular,
        );
    }
}

/// Render the lyric sheet
pub fn lyric_sheet(project: &Project) -> Result<Vec<u8>, ExportError> {
    let (doc, page, layer) = PdfDocument::new(
        format!(
            "{} - {}",
            project.song_info.artist.to_uppercase(),
            project.song_info.title.to_uppercase()
        ),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let mut cursor = Cursor::start(doc.get_page(page).get_layer(layer));
    document_header(&doc, &mut cursor, &project.song_info, &regular);

    for (index, strophe) in project.strophes.iter().enumerate() {
        cursor.ensure_space(&doc, LINE_HEIGHT);
        cursor.text(
            &doc,
            &format!(
                "Estrofe {} ({})",
                index + 1,
                strophe.architecture.label()
            ),
            14.0,
            MARGIN_LEFT,
            &regular,
        );

        for verse in &strophe.verses {
            cursor.ensure_space(&doc, LINE_HEIGHT);
            let mut x = MARGIN_LEFT + 5.0;
            for word in &verse.words {
                let font = if word.stressed == Some(true) {
                    &bold
                } else {
                    &regular
                };
                cursor
                    .layer
                    .use_text(word.text.as_str(), 12.0, Mm(x), Mm(cursor.y), font);
                x += approx_width_mm(&word.text, 12.0) + 2.0;
            }
            if let Some(adlib) = &verse.adlib {
                cursor.layer.use_text(
                    format!("({})", adlib.to_uppercase()),
                    12.0,
                    Mm(x),
                    Mm(cursor.y),
                    &regular,
                );
            }
            cursor.y -= LINE_HEIGHT;
        }

        // Gap between strophes
        cursor.y -= LINE_HEIGHT;
    }

    doc.save_to_bytes().map_err(|e| ExportError::Pdf(e.to_string()))
}

/// Right-aligned label/value row used by the shooting script
fn info_row(
    doc: &PdfDocumentReference,
    cursor: &mut Cursor,
    label: &str,
    value: &str,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    cursor.ensure_space(doc, LINE_HEIGHT);
    let value_width = approx_width_mm(value, 11.0);
    let label_width = approx_width_mm(label, 11.0);
    let value_x = PAGE_WIDTH - MARGIN_LEFT - value_width;
    let label_x = value_x - label_width - 4.0;
    cursor
        .layer
        .use_text(label, 11.0, Mm(label_x.max(MARGIN_LEFT)), Mm(cursor.y), bold);
    cursor
        .layer
        .use_text(value, 11.0, Mm(value_x.max(MARGIN_LEFT)), Mm(cursor.y), regular);
    cursor.y -= LINE_HEIGHT;
}

fn embed_media(doc: &PdfDocumentReference, cursor: &mut Cursor, verse: &Verse) {
    let Some(media) = &verse.media else {
        return;
    };
    // Only image MIME types are embedded; video references are skipped
    if !media.is_image() {
        return;
    }
    let MediaData::Base64(encoded) = &media.data else {
        return;
    };

    let Ok(bytes) = BASE64.decode(encoded) else {
        debug!(verse_id = %verse.id, "skipping media: invalid base64");
        return;
    };
    let Ok(decoded) = printpdf::image_crate::load_from_memory(&bytes) else {
        debug!(verse_id = %verse.id, "skipping media: undecodable image");
        return;
    };

    cursor.ensure_space(doc, IMAGE_BLOCK_HEIGHT);
    cursor.y -= IMAGE_BLOCK_HEIGHT;
    let image = Image::from_dynamic_image(&decoded);
    image.add_to_layer(
        cursor.layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN_LEFT)),
            translate_y: Some(Mm(cursor.y)),
            dpi: Some(150.0),
            ..Default::default()
        },
    );
    cursor.y -= LINE_HEIGHT;
}

/// Render the shooting script: only verses carrying camera settings.
pub fn shooting_script(project: &Project) -> Result<Vec<u8>, ExportError> {
    let (doc, page, layer) = PdfDocument::new(
        format!(
            "{} - {} (guiao de filmagem)",
            project.song_info.artist.to_uppercase(),
            project.song_info.title.to_uppercase()
        ),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let mut cursor = Cursor::start(doc.get_page(page).get_layer(layer));
    document_header(&doc, &mut cursor, &project.song_info, &regular);

    let flat = project.flat_verses();
    let scenes: Vec<(usize, &Verse)> = flat
        .iter()
        .enumerate()
        .filter(|(_, v)| v.camera.is_some())
        .map(|(i, v)| (i + 1, *v))
        .collect();

    cursor.text(
        &doc,
        &format!("TOTAL DE CENAS: {}", scenes.len()),
        12.0,
        MARGIN_LEFT,
        &regular,
    );

    let upper_or_dash = |v: &Option<String>| -> String {
        match v.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_uppercase(),
            _ => "-".to_string(),
        }
    };

    for (scene_number, (position, verse)) in scenes.iter().copied().enumerate() {
        let camera = verse.camera.as_ref().expect("scene list is pre-filtered");

        // A scene block never starts at the very bottom of a page
        cursor.ensure_space(&doc, 4.0 * LINE_HEIGHT);

        let label = camera
            .scene_label
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!(" - {}", s.to_uppercase()))
            .unwrap_or_default();
        cursor.text(
            &doc,
            &format!("CENA {} (verso {}){}", scene_number + 1, position, label),
            14.0,
            MARGIN_LEFT,
            &bold,
        );
        cursor.text(&doc, &verse.line(), 12.0, MARGIN_LEFT + 5.0, &regular);

        let shot = camera
            .shot_type
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| "Não definido".to_string());
        info_row(&doc, &mut cursor, "Tipo de Plano", &shot, &regular, &bold);
        info_row(
            &doc,
            &mut cursor,
            "Movimento de Câmera",
            &upper_or_dash(&camera.movement),
            &regular,
            &bold,
        );
        info_row(
            &doc,
            &mut cursor,
            "Cobertura e Ambiente",
            &upper_or_dash(&camera.location),
            &regular,
            &bold,
        );
        info_row(
            &doc,
            &mut cursor,
            "Resolução",
            &upper_or_dash(&camera.resolution),
            &regular,
            &bold,
        );
        info_row(
            &doc,
            &mut cursor,
            "Estabilização",
            &upper_or_dash(&camera.stabilization),
            &regular,
            &bold,
        );

        // Related setups by flattened position, resolved lazily from ids
        let related = project.resolve_related(&camera.related_verses);
        if !related.is_empty() {
            let positions = related
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            info_row(
                &doc,
                &mut cursor,
                "Versos Relacionados",
                &positions,
                &regular,
                &bold,
            );
        }

        embed_media(&doc, &mut cursor, verse);
        cursor.y -= LINE_HEIGHT / 2.0;
    }

    doc.save_to_bytes().map_err(|e| ExportError::Pdf(e.to_string()))
}
