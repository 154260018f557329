//! PDF rendering of the final report.
//!
//! Rendering is a three-stage pipeline: document structure and the model's
//! markdown become [`Block`]s, the paginator places them on A4 pages, and the
//! PDF writer draws the placed text with base-14 fonts.

pub mod fonts;
pub mod layout;
pub mod markdown;
pub mod pdf;

pub use fonts::{fold_to_ascii, FontFace};
pub use layout::{paginate, Block, BulletItem, Page, PageGeometry, ParagraphStyle, Span};
pub use markdown::{markdown_to_blocks, parse_inline, sanitize_text, wrap_text};

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use log::{debug, info};

use crate::error::Result;
use crate::prompts::PDF_DISCLAIMER;
use crate::schema::PayslipComponents;

pub const DEFAULT_REPORT_TITLE: &str = "Salary Analyzer & Tax Opportunity Report";

/// Character width used when wrapping pasted payslip text and JSON.
pub const PREFORMATTED_WRAP_WIDTH: usize = 95;

/// Asia/Kolkata is UTC+05:30 all year round.
const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

pub fn kolkata_offset() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// Current time in Asia/Kolkata, used for the report header and filename.
pub fn kolkata_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&kolkata_offset())
}

/// Download filename, e.g. `salary_report_20240501_103000.pdf`.
pub fn report_filename<Tz: TimeZone>(generated_at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("salary_report_{}.pdf", generated_at.format("%Y%m%d_%H%M%S"))
}

fn format_generated_at(generated_at: &DateTime<FixedOffset>) -> String {
    let stamp = generated_at.format("%Y-%m-%d %H:%M:%S");
    if generated_at.offset().local_minus_utc() == IST_OFFSET_SECONDS {
        format!("{} IST", stamp)
    } else {
        format!("{} {}", stamp, generated_at.offset())
    }
}

/// Everything that goes into the downloadable report.
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub title: &'a str,
    pub country: &'a str,
    pub tax_year: &'a str,
    pub payslip_text: Option<&'a str>,
    pub confirmed_data: &'a PayslipComponents,
    pub final_report: &'a str,
    pub generated_at: DateTime<FixedOffset>,
}

fn section_heading(text: &str) -> Block {
    Block::Heading {
        level: 2,
        spans: vec![Span::plain(text)],
    }
}

fn body_line(text: String) -> Block {
    Block::Paragraph {
        style: ParagraphStyle::Body,
        spans: vec![Span::plain(text)],
    }
}

/// Lays out the whole document: header, pasted payslip (if any), confirmed
/// data, the analysis report and the closing disclaimer.
pub fn build_report_blocks(input: &ReportInput<'_>) -> Result<Vec<Block>> {
    let mut blocks = vec![
        Block::Heading {
            level: 1,
            spans: vec![Span::plain(input.title)],
        },
        body_line(format!("{} - {}", input.country, input.tax_year)),
        body_line(format!(
            "Generated: {}",
            format_generated_at(&input.generated_at)
        )),
        Block::Spacer { height: 6.0 },
    ];

    if let Some(payslip) = input.payslip_text.filter(|text| !text.trim().is_empty()) {
        blocks.push(section_heading("Original Payslip Text (as pasted):"));
        blocks.push(Block::Preformatted {
            text: wrap_text(&sanitize_text(payslip), PREFORMATTED_WRAP_WIDTH),
        });
        blocks.push(Block::Spacer { height: 8.0 });
    }

    blocks.push(section_heading("Parsed / Confirmed Monthly Data (JSON):"));
    blocks.push(Block::Preformatted {
        text: wrap_text(
            &input.confirmed_data.to_pretty_json()?,
            PREFORMATTED_WRAP_WIDTH,
        ),
    });
    blocks.push(Block::Spacer { height: 8.0 });

    blocks.push(section_heading("AI Analysis Report:"));
    blocks.extend(markdown_to_blocks(input.final_report));
    blocks.push(Block::Spacer { height: 8.0 });

    blocks.push(Block::Paragraph {
        style: ParagraphStyle::Fineprint,
        spans: vec![Span::plain(PDF_DISCLAIMER)],
    });
    blocks.push(Block::Spacer { height: 4.0 });

    Ok(blocks)
}

/// Builds the PDF report and returns its bytes.
pub fn generate_pdf_report(input: &ReportInput<'_>) -> Result<Vec<u8>> {
    let geometry = PageGeometry::A4;
    let blocks = build_report_blocks(input)?;
    let pages = paginate(&blocks, &geometry);
    debug!(
        "Laid out {} blocks on {} page(s)",
        blocks.len(),
        pages.len()
    );

    let bytes = pdf::render_pdf(&fold_to_ascii(input.title), &pages, &geometry)?;
    info!("Generated PDF report ({} bytes)", bytes.len());
    Ok(bytes)
}
