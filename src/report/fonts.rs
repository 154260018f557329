//! Built-in PDF font faces, their advance widths, and text folding to the
//! character set those fonts can draw.

/// Font faces used by the renderer. All of them are PDF base-14 fonts, so no
/// font files need to be embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
    BoldItalic,
    Mono,
}

impl FontFace {
    pub fn from_emphasis(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontFace::Regular,
            (true, false) => FontFace::Bold,
            (false, true) => FontFace::Italic,
            (true, true) => FontFace::BoldItalic,
        }
    }

    /// Advance width of one character in 1/1000 em.
    pub fn char_width(&self, c: char) -> u16 {
        match self {
            FontFace::Mono => 600,
            FontFace::Regular | FontFace::Italic => ascii_width(&HELVETICA_WIDTHS, c),
            FontFace::Bold | FontFace::BoldItalic => ascii_width(&HELVETICA_BOLD_WIDTHS, c),
        }
    }

    /// Width of `text` in points at `size`.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 * size / 1000.0
    }
}

fn ascii_width(table: &[u16; 95], c: char) -> u16 {
    let code = c as u32;
    if (32..=126).contains(&code) {
        table[(code - 32) as usize]
    } else {
        556
    }
}

// Widths for U+0020..=U+007E from the Adobe core font metrics.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Folds text to printable ASCII so the base-14 fonts can draw every glyph.
///
/// Common typographic characters get ASCII stand-ins; anything else becomes `?`.
pub fn fold_to_ascii(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' => folded.push(c),
            '\t' => folded.push_str("    "),
            '\u{2013}' | '\u{2014}' | '\u{2212}' | '\u{2010}' | '\u{2011}' => folded.push('-'),
            '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{2032}' => folded.push('\''),
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{2033}' => folded.push('"'),
            '\u{2022}' | '\u{25cf}' | '\u{00b7}' => folded.push('-'),
            '\u{2026}' => folded.push_str("..."),
            '\u{20b9}' => folded.push_str("Rs."),
            '\u{20ac}' => folded.push_str("EUR"),
            '\u{00a3}' => folded.push_str("GBP"),
            '\u{00a0}' | '\u{2009}' | '\u{202f}' => folded.push(' '),
            '\u{00d7}' => folded.push('x'),
            '\u{2264}' => folded.push_str("<="),
            '\u{2265}' => folded.push_str(">="),
            '\u{2192}' => folded.push_str("->"),
            c if c.is_control() => {}
            _ => folded.push('?'),
        }
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        assert_eq!(FontFace::Regular.char_width(' '), 278);
        assert_eq!(FontFace::Regular.char_width('W'), 944);
        assert_eq!(FontFace::Bold.char_width('b'), 611);
        assert_eq!(FontFace::Mono.char_width('i'), 600);
        assert!((FontFace::Mono.text_width("abcd", 10.0) - 24.0).abs() < 1e-4);
        assert!(FontFace::Bold.text_width("Tax", 10.0) > FontFace::Regular.text_width("Tax", 10.0));
    }

    #[test]
    fn test_fold_to_ascii() {
        assert_eq!(fold_to_ascii("India \u{2014} 2024-25"), "India - 2024-25");
        assert_eq!(fold_to_ascii("\u{20b9}1,50,000"), "Rs.1,50,000");
        assert_eq!(fold_to_ascii("\u{201c}ELSS\u{201d}\u{2026}"), "\"ELSS\"...");
        assert_eq!(fold_to_ascii("a\u{7}b\u{4e2d}"), "ab?");
    }
}
