//! # Salary Tax Analyst
//!
//! A two-call LLM assistant that turns pasted payslip text into a
//! personalized tax-opportunity report.
//!
//! ## Pipeline
//!
//! 1. **Extraction**: the model is forced to call the `PayslipComponents` tool,
//!    whose arguments are validated against [`PayslipComponents`].
//! 2. **Confirmation**: the user checks the extracted monthly figures.
//! 3. **Analysis**: the confirmed JSON and the static [`tax_rules`] entry for the
//!    chosen country and year are combined into a markdown report.
//! 4. **Rendering**: the report, the confirmed data and the original text are
//!    laid out as a paginated PDF.
//!
//! The [`Session`] type sequences these steps. The network side lives behind
//! the `openai` feature.
//!
//! ## Example
//!
//! ```rust,ignore
//! use salary_tax_analyst::*;
//!
//! let agent = SalaryAgent::from_env()?;
//! let mut session = Session::new(Country::India, "2024-25");
//!
//! session.submit_payslip(&agent, "Basic Salary: 50,000\nHRA: 20,000").await?;
//! session.confirm(&agent).await?;
//!
//! let input = session.report_input(kolkata_now()).unwrap();
//! let pdf = generate_pdf_report(&input)?;
//! std::fs::write(report_filename(&input.generated_at), pdf)?;
//! ```

pub mod error;
pub mod prompts;
pub mod report;
pub mod schema;
pub mod session;
pub mod tax_rules;

#[cfg(feature = "openai")]
pub mod llm;

pub use error::{Result, SalaryAnalystError};
pub use report::{
    generate_pdf_report, kolkata_now, report_filename, ReportInput, DEFAULT_REPORT_TITLE,
};
pub use schema::{parse_amount, Component, PayslipComponents};
pub use session::{PayslipAnalyzer, Session, Step};
pub use tax_rules::{get_tax_rules, tax_rules_as_string, Country, RuleValue, TaxRules};

#[cfg(feature = "openai")]
pub use llm::{AgentConfig, OpenAiClient, SalaryAgent};
