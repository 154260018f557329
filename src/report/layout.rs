//! Layout primitives and the paginator that places them on A4 pages.

use crate::report::fonts::{fold_to_ascii, FontFace};

const PT_PER_MM: f32 = 72.0 / 25.4;

/// A run of text with uniform emphasis.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            italic: false,
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulletItem {
    /// Nesting depth, 0 for top-level items.
    pub depth: usize,
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    Body,
    /// Small italic text used for the closing disclaimer.
    Fineprint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, spans: Vec<Span> },
    Paragraph { style: ParagraphStyle, spans: Vec<Span> },
    BulletList { items: Vec<BulletItem> },
    Preformatted { text: String },
    Spacer { height: f32 },
}

/// Size, leading, base emphasis and trailing space for one kind of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub leading: f32,
    pub bold: bool,
    pub italic: bool,
    pub space_after: f32,
}

impl TextStyle {
    pub const BODY: TextStyle = TextStyle {
        size: 10.0,
        leading: 12.0,
        bold: false,
        italic: false,
        space_after: 0.0,
    };

    pub const FINEPRINT: TextStyle = TextStyle {
        size: 9.0,
        leading: 11.0,
        bold: false,
        italic: true,
        space_after: 0.0,
    };

    pub const MONO: TextStyle = TextStyle {
        size: 9.0,
        leading: 12.0,
        bold: false,
        italic: false,
        space_after: 0.0,
    };

    pub fn heading(level: u8) -> TextStyle {
        let (size, leading, space_after) = match level {
            0 | 1 => (14.0, 16.0, 6.0),
            2 => (12.0, 14.0, 4.0),
            _ => (11.0, 13.0, 3.0),
        };
        TextStyle {
            size,
            leading,
            bold: true,
            italic: false,
            space_after,
        }
    }

    pub fn paragraph(style: ParagraphStyle) -> TextStyle {
        match style {
            ParagraphStyle::Body => TextStyle::BODY,
            ParagraphStyle::Fineprint => TextStyle::FINEPRINT,
        }
    }
}

/// Page size and margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width_mm: 210.0,
        height_mm: 297.0,
        margin_mm: 18.0,
    };

    pub fn content_width(&self) -> f32 {
        (self.width_mm - 2.0 * self.margin_mm) * PT_PER_MM
    }

    fn left(&self) -> f32 {
        self.margin_mm * PT_PER_MM
    }

    fn top(&self) -> f32 {
        (self.height_mm - self.margin_mm) * PT_PER_MM
    }

    fn bottom(&self) -> f32 {
        self.margin_mm * PT_PER_MM
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

pub fn pt_to_mm(pt: f32) -> f32 {
    pt / PT_PER_MM
}

/// A piece of text placed on a page. Coordinates are in points from the
/// bottom-left corner; `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub face: FontFace,
    pub size: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<PlacedText>,
}

impl Page {
    /// All text on the page, one entry per placed run.
    pub fn text(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.text.as_str()).collect()
    }
}

/// One run inside a wrapped line, offset from the line start.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRun {
    pub offset: f32,
    pub text: String,
    pub face: FontFace,
}

struct Word {
    text: String,
    face: FontFace,
    space_before: bool,
}

fn split_words(spans: &[Span], style: &TextStyle) -> Vec<Word> {
    let mut words = Vec::new();
    let mut pending_space = false;

    for span in spans {
        let face = FontFace::from_emphasis(style.bold || span.bold, style.italic || span.italic);
        let text = fold_to_ascii(&span.text);
        let mut current = String::new();

        for c in text.chars() {
            if c.is_whitespace() {
                if !current.is_empty() {
                    words.push(Word {
                        text: std::mem::take(&mut current),
                        face,
                        space_before: pending_space,
                    });
                }
                pending_space = true;
            } else {
                current.push(c);
            }
        }

        if !current.is_empty() {
            words.push(Word {
                text: current,
                face,
                space_before: pending_space,
            });
            pending_space = false;
        }
    }

    words
}

/// Splits `text` into pieces no wider than `max_width`, at least one char each.
fn hard_split(text: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut width = 0.0;

    for c in text.chars() {
        let char_width = f32::from(face.char_width(c)) * size / 1000.0;
        if !current.is_empty() && width + char_width > max_width {
            pieces.push(std::mem::take(&mut current));
            width = 0.0;
        }
        current.push(c);
        width += char_width;
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Greedy word wrap of styled spans into lines no wider than `max_width`.
pub fn wrap_spans(spans: &[Span], style: &TextStyle, max_width: f32) -> Vec<Vec<LineRun>> {
    let mut lines: Vec<Vec<LineRun>> = Vec::new();
    let mut line: Vec<LineRun> = Vec::new();
    let mut line_width = 0.0_f32;

    for word in split_words(spans, style) {
        let mut pieces = hard_split(&word.text, word.face, style.size, max_width).into_iter();
        let mut space_before = word.space_before;

        while let Some(piece) = pieces.next() {
            let piece_width = word.face.text_width(&piece, style.size);
            let space_width = if space_before && !line.is_empty() {
                word.face.text_width(" ", style.size)
            } else {
                0.0
            };

            if !line.is_empty() && line_width + space_width + piece_width > max_width {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            }

            let leading_space = space_before && !line.is_empty();
            match line.last_mut() {
                Some(last) if last.face == word.face => {
                    if leading_space {
                        last.text.push(' ');
                    }
                    last.text.push_str(&piece);
                }
                _ => {
                    let mut offset = line_width;
                    if leading_space {
                        offset += word.face.text_width(" ", style.size);
                    }
                    line.push(LineRun {
                        offset,
                        text: piece,
                        face: word.face,
                    });
                }
            }

            if leading_space {
                line_width += word.face.text_width(" ", style.size);
            }
            line_width += piece_width;
            space_before = false;

            // Remaining pieces of an over-long word always start a new line.
            if pieces.len() > 0 {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            }
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Places blocks on pages top to bottom, breaking to a new page whenever the
/// next line would cross the bottom margin. Always returns at least one page.
pub fn paginate(blocks: &[Block], geometry: &PageGeometry) -> Vec<Page> {
    let mut paginator = Paginator::new(*geometry);
    for block in blocks {
        paginator.place(block);
    }
    paginator.finish()
}

struct Paginator {
    geometry: PageGeometry,
    pages: Vec<Page>,
    current: Page,
    cursor: f32,
}

impl Paginator {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: Page::default(),
            cursor: geometry.top(),
        }
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.cursor = self.geometry.top();
    }

    fn at_page_top(&self) -> bool {
        self.current.items.is_empty() && self.cursor >= self.geometry.top()
    }

    /// Reserves one line of `leading` and returns its baseline.
    fn next_baseline(&mut self, style: &TextStyle) -> f32 {
        if self.cursor - style.leading < self.geometry.bottom() && !self.at_page_top() {
            self.break_page();
        }
        let baseline = self.cursor - style.size;
        self.cursor -= style.leading;
        baseline
    }

    fn skip(&mut self, height: f32) {
        if self.at_page_top() {
            return;
        }
        self.cursor = (self.cursor - height).max(self.geometry.bottom());
    }

    fn place_lines(&mut self, lines: Vec<Vec<LineRun>>, style: &TextStyle, x: f32) {
        for line in lines {
            let baseline = self.next_baseline(style);
            for run in line {
                self.current.items.push(PlacedText {
                    x: x + run.offset,
                    y: baseline,
                    text: run.text,
                    face: run.face,
                    size: style.size,
                });
            }
        }
    }

    fn place(&mut self, block: &Block) {
        let left = self.geometry.left();
        let width = self.geometry.content_width();

        match block {
            Block::Heading { level, spans } => {
                let style = TextStyle::heading(*level);
                let lines = wrap_spans(spans, &style, width);
                self.place_lines(lines, &style, left);
                self.skip(style.space_after);
            }
            Block::Paragraph { style, spans } => {
                let style = TextStyle::paragraph(*style);
                let lines = wrap_spans(spans, &style, width);
                self.place_lines(lines, &style, left);
                self.skip(style.space_after);
            }
            Block::BulletList { items } => {
                let style = TextStyle::BODY;
                for item in items {
                    let indent = 12.0 * item.depth as f32;
                    let bullet_x = left + 6.0 + indent;
                    let text_x = left + 18.0 + indent;
                    let lines = wrap_spans(&item.spans, &style, (width - 18.0 - indent).max(36.0));

                    let mut first = true;
                    for line in lines {
                        let baseline = self.next_baseline(&style);
                        if first {
                            self.current.items.push(PlacedText {
                                x: bullet_x,
                                y: baseline,
                                text: "-".to_string(),
                                face: FontFace::Regular,
                                size: style.size,
                            });
                            first = false;
                        }
                        for run in line {
                            self.current.items.push(PlacedText {
                                x: text_x + run.offset,
                                y: baseline,
                                text: run.text,
                                face: run.face,
                                size: style.size,
                            });
                        }
                    }
                }
            }
            Block::Preformatted { text } => {
                let style = TextStyle::MONO;
                for raw_line in text.split('\n') {
                    let line = fold_to_ascii(raw_line.trim_end());
                    if line.is_empty() {
                        self.next_baseline(&style);
                        continue;
                    }
                    for piece in hard_split(&line, FontFace::Mono, style.size, width) {
                        let baseline = self.next_baseline(&style);
                        self.current.items.push(PlacedText {
                            x: left,
                            y: baseline,
                            text: piece,
                            face: FontFace::Mono,
                            size: style.size,
                        });
                    }
                }
            }
            Block::Spacer { height } => self.skip(*height),
        }
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.items.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> Block {
        Block::Paragraph {
            style: ParagraphStyle::Body,
            spans: vec![Span::plain(text)],
        }
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "word ".repeat(200);
        let style = TextStyle::BODY;
        let lines = wrap_spans(&[Span::plain(text)], &style, 200.0);
        assert!(lines.len() > 5);
        for line in &lines {
            let width: f32 = line
                .iter()
                .map(|run| run.offset + run.face.text_width(&run.text, style.size))
                .fold(0.0, f32::max);
            assert!(width <= 200.0 + 0.01, "line too wide: {}", width);
        }
    }

    #[test]
    fn test_mixed_emphasis_runs() {
        let spans = vec![
            Span::bold("Standard Deduction:"),
            Span::plain(" 50000 per year"),
        ];
        let lines = wrap_spans(&spans, &TextStyle::BODY, 500.0);
        assert_eq!(lines.len(), 1);
        let runs = &lines[0];
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Standard Deduction:");
        assert_eq!(runs[0].face, FontFace::Bold);
        assert_eq!(runs[1].text, "50000 per year");
        assert_eq!(runs[1].face, FontFace::Regular);
        assert!(runs[1].offset > FontFace::Bold.text_width("Standard Deduction:", 10.0));
    }

    #[test]
    fn test_adjacent_spans_without_space() {
        let spans = vec![Span::bold("80C"), Span::plain("-eligible")];
        let lines = wrap_spans(&spans, &TextStyle::BODY, 500.0);
        let runs = &lines[0];
        let expected = FontFace::Bold.text_width("80C", 10.0);
        assert!((runs[1].offset - expected).abs() < 1e-3);
    }

    #[test]
    fn test_long_word_is_split() {
        let lines = wrap_spans(&[Span::plain("x".repeat(300))], &TextStyle::BODY, 100.0);
        assert!(lines.len() > 1);
        let total: usize = lines.iter().flatten().map(|run| run.text.len()).sum();
        assert_eq!(total, 300);
    }

    #[test]
    fn test_single_page_for_short_content() {
        let pages = paginate(&[body("Hello")], &PageGeometry::A4);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text(), vec!["Hello"]);

        let empty = paginate(&[], &PageGeometry::A4);
        assert_eq!(empty.len(), 1);
        assert!(empty[0].items.is_empty());
    }

    #[test]
    fn test_page_break_keeps_text_inside_margins() {
        let blocks: Vec<Block> = (0..120).map(|i| body(&format!("Line {}", i))).collect();
        let geometry = PageGeometry::A4;
        let pages = paginate(&blocks, &geometry);

        assert!(pages.len() >= 2);
        let bottom = geometry.margin_mm * PT_PER_MM;
        for page in &pages {
            for item in &page.items {
                assert!(item.y >= bottom - item.size);
                assert!(item.y <= geometry.height_mm * PT_PER_MM);
            }
        }
        let placed: usize = pages.iter().map(|page| page.items.len()).sum();
        assert_eq!(placed, 120);
        assert!(pages[1].items[0].text.starts_with("Line "));
    }

    #[test]
    fn test_preformatted_keeps_indentation_and_wraps() {
        let text = format!("{{\n  \"basic_salary\": 50000.0\n}}\n{}", "9".repeat(150));
        let pages = paginate(&[Block::Preformatted { text }], &PageGeometry::A4);
        let texts = pages[0].text();
        assert_eq!(texts[0], "{");
        assert_eq!(texts[1], "  \"basic_salary\": 50000.0");
        assert_eq!(texts[2], "}");
        assert!(texts.len() >= 5);
        assert!(pages[0].items.iter().all(|item| item.face == FontFace::Mono));
    }

    #[test]
    fn test_bullets_are_indented() {
        let block = Block::BulletList {
            items: vec![
                BulletItem {
                    depth: 0,
                    spans: vec![Span::plain("first")],
                },
                BulletItem {
                    depth: 1,
                    spans: vec![Span::plain("nested")],
                },
            ],
        };
        let pages = paginate(&[block], &PageGeometry::A4);
        let items = &pages[0].items;
        assert_eq!(items[0].text, "-");
        assert_eq!(items[1].text, "first");
        assert!(items[1].x > items[0].x);
        assert!(items[3].x > items[1].x);
    }

    #[test]
    fn test_leading_spacer_is_dropped_at_page_top() {
        let pages = paginate(
            &[Block::Spacer { height: 50.0 }, body("Top")],
            &PageGeometry::A4,
        );
        let geometry = PageGeometry::A4;
        let expected = geometry.top() - TextStyle::BODY.size;
        assert!((pages[0].items[0].y - expected).abs() < 1e-3);
    }
}
