use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

use crate::error::{Result, SalaryAnalystError};
use crate::report::fonts::FontFace;
use crate::report::layout::{pt_to_mm, Page, PageGeometry};

struct FontSet {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    bold_italic: IndirectFontRef,
    mono: IndirectFontRef,
}

impl FontSet {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let add = |font: BuiltinFont| {
            doc.add_builtin_font(font)
                .map_err(|e| SalaryAnalystError::Rendering(format!("font setup failed: {:?}", e)))
        };

        Ok(Self {
            regular: add(BuiltinFont::Helvetica)?,
            bold: add(BuiltinFont::HelveticaBold)?,
            italic: add(BuiltinFont::HelveticaOblique)?,
            bold_italic: add(BuiltinFont::HelveticaBoldOblique)?,
            mono: add(BuiltinFont::Courier)?,
        })
    }

    fn get(&self, face: FontFace) -> &IndirectFontRef {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
            FontFace::Italic => &self.italic,
            FontFace::BoldItalic => &self.bold_italic,
            FontFace::Mono => &self.mono,
        }
    }
}

/// Draws already-paginated text into a PDF and returns the file bytes.
pub fn render_pdf(title: &str, pages: &[Page], geometry: &PageGeometry) -> Result<Vec<u8>> {
    let width = Mm(geometry.width_mm);
    let height = Mm(geometry.height_mm);
    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Page 1");
    let fonts = FontSet::load(&doc)?;

    let mut first = Some((first_page, first_layer));
    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = match first.take() {
            Some(indices) => indices,
            None => doc.add_page(width, height, format!("Page {}", index + 1)),
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for item in &page.items {
            layer.use_text(
                item.text.as_str(),
                item.size,
                Mm(pt_to_mm(item.x)),
                Mm(pt_to_mm(item.y)),
                fonts.get(item.face),
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| SalaryAnalystError::Rendering(format!("PDF serialization failed: {:?}", e)))
}
