//! The markdown subset the analysis prompt asks the model to produce:
//! `#`/`##`/`###` headings, `- ` bullets, `**bold**` and `*italic*`.
//! Anything else is treated as paragraph text.

use crate::report::layout::{Block, BulletItem, ParagraphStyle, Span};

/// Strips stray glyphs the model sometimes emits, normalizes line endings and
/// collapses runs of blank lines.
pub fn sanitize_text(text: &str) -> String {
    let cleaned = text
        .replace('\u{25a0}', "")
        .replace('\u{200b}', "")
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut collapsed = String::with_capacity(cleaned.len());
    let mut newlines = 0;
    for c in cleaned.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        collapsed.push(c);
    }

    collapsed.trim().to_string()
}

/// Wraps long single-line paragraphs to `width` characters.
///
/// Paragraphs are separated by blank lines. A paragraph that already has line
/// breaks, or fits, is only trimmed so its structure is preserved.
pub fn wrap_text(text: &str, width: usize) -> String {
    text.split("\n\n")
        .map(|paragraph| {
            let trimmed = paragraph.trim();
            if paragraph.contains('\n') || paragraph.chars().count() <= width {
                trimmed.to_string()
            } else {
                fill(trimmed, width)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn fill(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let line_len = line.chars().count();
        if line_len > 0 && line_len + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

/// Splits a line into plain, bold and italic spans. Unmatched markers stay
/// literal, and `*` surrounded by spaces (as in `5000 * 12`) is not emphasis.
pub fn parse_inline(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(pos) = rest.find('*') {
        let (before, marker) = rest.split_at(pos);
        plain.push_str(before);

        if let Some(inner) = marker.strip_prefix("**") {
            match inner.find("**").filter(|close| *close > 0) {
                Some(close) => {
                    flush_plain(&mut spans, &mut plain);
                    spans.push(Span::bold(&inner[..close]));
                    rest = &inner[close + 2..];
                }
                None => {
                    plain.push_str("**");
                    rest = inner;
                }
            }
            continue;
        }

        let inner = &marker[1..];
        let italic = inner.find('*').filter(|close| {
            let content = &inner[..*close];
            !content.is_empty()
                && !content.starts_with(char::is_whitespace)
                && !content.ends_with(char::is_whitespace)
        });

        match italic {
            Some(close) => {
                flush_plain(&mut spans, &mut plain);
                spans.push(Span::italic(&inner[..close]));
                rest = &inner[close + 1..];
            }
            None => {
                plain.push('*');
                rest = inner;
            }
        }
    }

    plain.push_str(rest);
    flush_plain(&mut spans, &mut plain);
    spans
}

fn flush_plain(spans: &mut Vec<Span>, plain: &mut String) {
    if !plain.is_empty() {
        spans.push(Span::plain(std::mem::take(plain)));
    }
}

fn heading(line: &str) -> Option<(u8, &str)> {
    if let Some(text) = line.strip_prefix("### ") {
        Some((3, text))
    } else if let Some(text) = line.strip_prefix("## ") {
        Some((2, text))
    } else {
        line.strip_prefix("# ").map(|text| (1, text))
    }
}

fn bullet(line: &str) -> Option<(usize, &str)> {
    let stripped = line.trim_start();
    let indent = line.len() - stripped.len();
    stripped
        .strip_prefix("- ")
        .map(|text| (indent / 2, text.trim()))
}

fn starts_block(line: &str) -> bool {
    heading(line).is_some() || bullet(line).is_some()
}

/// Converts markdown-like report text into layout blocks.
pub fn markdown_to_blocks(markdown: &str) -> Vec<Block> {
    let markdown = sanitize_text(markdown);
    let lines: Vec<&str> = markdown.lines().collect();
    let mut blocks = Vec::new();
    let mut bullets: Vec<BulletItem> = Vec::new();

    let flush_bullets = |blocks: &mut Vec<Block>, bullets: &mut Vec<BulletItem>| {
        if !bullets.is_empty() {
            blocks.push(Block::BulletList {
                items: std::mem::take(bullets),
            });
            blocks.push(Block::Spacer { height: 6.0 });
        }
    };

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim_end();

        if line.is_empty() {
            flush_bullets(&mut blocks, &mut bullets);
            i += 1;
            continue;
        }

        if let Some((level, text)) = heading(line) {
            flush_bullets(&mut blocks, &mut bullets);
            blocks.push(Block::Heading {
                level,
                spans: parse_inline(text),
            });
            blocks.push(Block::Spacer {
                height: if level == 1 { 8.0 } else { 6.0 },
            });
            i += 1;
        } else if let Some((depth, text)) = bullet(line) {
            bullets.push(BulletItem {
                depth,
                spans: parse_inline(text),
            });
            i += 1;
        } else {
            flush_bullets(&mut blocks, &mut bullets);
            let mut paragraph = vec![line.trim()];
            let mut j = i + 1;
            while j < lines.len() && !lines[j].trim().is_empty() && !starts_block(lines[j]) {
                paragraph.push(lines[j].trim());
                j += 1;
            }
            blocks.push(Block::Paragraph {
                style: ParagraphStyle::Body,
                spans: parse_inline(&paragraph.join(" ")),
            });
            blocks.push(Block::Spacer { height: 6.0 });
            i = j;
        }
    }

    flush_bullets(&mut blocks, &mut bullets);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_text() {
        let raw = "  \u{25a0} Title\r\nline\u{200b}two\r\n\r\n\r\n\r\nend\rlast  ";
        assert_eq!(sanitize_text(raw), "Title\nlinetwo\n\nend\nlast");
        assert_eq!(sanitize_text(""), "");
    }

    #[test]
    fn test_wrap_text() {
        let long = "alpha beta gamma delta epsilon";
        assert_eq!(wrap_text(long, 11), "alpha beta\ngamma delta\nepsilon");

        let structured = "{\n  \"a\": 1\n}\n\nshort";
        assert_eq!(wrap_text(structured, 5), structured);
    }

    #[test]
    fn test_parse_inline() {
        assert_eq!(
            parse_inline("**Standard Deduction:** 50,000 and *annual* value"),
            vec![
                Span::bold("Standard Deduction:"),
                Span::plain(" 50,000 and "),
                Span::italic("annual"),
                Span::plain(" value"),
            ]
        );
    }

    #[test]
    fn test_parse_inline_literal_markers() {
        assert_eq!(
            parse_inline("1,800 * 12 = 21,600"),
            vec![Span::plain("1,800 * 12 = 21,600")]
        );
        assert_eq!(parse_inline("**open"), vec![Span::plain("**open")]);
        assert_eq!(parse_inline("a ** b"), vec![Span::plain("a ** b")]);
        assert_eq!(
            parse_inline("PF * 12 plus *bonus*"),
            vec![Span::plain("PF * 12 plus "), Span::italic("bonus")]
        );
    }

    #[test]
    fn test_markdown_to_blocks_structure() {
        let markdown = "### Analysis complete\n\
                        ## Section 1\n\
                        - **PF:** 21,600\n\
                        - Professional Tax\n\
                        \x20\x20- nested detail\n\
                        \n\
                        Some paragraph\n\
                        continues here.\n\
                        # Top";
        let blocks = markdown_to_blocks(markdown);

        assert!(matches!(&blocks[0], Block::Heading { level: 3, .. }));
        assert!(matches!(&blocks[1], Block::Spacer { height } if *height == 6.0));
        assert!(matches!(&blocks[2], Block::Heading { level: 2, .. }));

        match &blocks[4] {
            Block::BulletList { items } => {
                assert_eq!(items.len(), 3);
                assert_eq!(items[0].spans[0], Span::bold("PF:"));
                assert_eq!(items[2].depth, 1);
            }
            other => panic!("expected bullet list, got {:?}", other),
        }

        match &blocks[6] {
            Block::Paragraph { spans, .. } => {
                assert_eq!(spans, &vec![Span::plain("Some paragraph continues here.")]);
            }
            other => panic!("expected paragraph, got {:?}", other),
        }

        assert!(matches!(&blocks[8], Block::Heading { level: 1, .. }));
        assert!(matches!(&blocks[9], Block::Spacer { height } if *height == 8.0));
        assert_eq!(blocks.len(), 10);
    }

    #[test]
    fn test_paragraph_stops_at_bullet() {
        let blocks = markdown_to_blocks("Intro text\n- item");
        assert!(matches!(&blocks[0], Block::Paragraph { .. }));
        assert!(matches!(&blocks[2], Block::BulletList { items } if items.len() == 1));
    }

    #[test]
    fn test_unsupported_heading_depth_is_paragraph() {
        let blocks = markdown_to_blocks("#### Deep");
        assert!(matches!(
            &blocks[0],
            Block::Paragraph { spans, .. } if spans == &vec![Span::plain("#### Deep")]
        ));
    }
}
