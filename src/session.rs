//! The three-step flow: paste a payslip, confirm the extraction, read the report.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use log::{error, info};

use crate::error::{Result, SalaryAnalystError};
use crate::prompts::ANALYSIS_FAILED_MESSAGE;
use crate::report::{ReportInput, DEFAULT_REPORT_TITLE};
use crate::schema::PayslipComponents;
use crate::tax_rules::{get_tax_rules, tax_rules_as_string, Country};

/// The two model calls the flow depends on.
#[async_trait]
pub trait PayslipAnalyzer: Send + Sync {
    /// Call 1: extract monthly components from pasted payslip text.
    async fn parse_payslip_text(&self, payslip_text: &str) -> Result<PayslipComponents>;

    /// Call 2: write the report from confirmed data and the rule table.
    async fn generate_analysis_report(
        &self,
        confirmed: &PayslipComponents,
        country: &str,
        tax_year: &str,
        tax_rules: &str,
    ) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    AwaitingInput,
    AwaitingConfirmation,
    ShowingReport,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::AwaitingInput => "awaiting_input",
            Step::AwaitingConfirmation => "awaiting_confirmation",
            Step::ShowingReport => "showing_report",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    step: Step,
    country: Country,
    tax_year: String,
    payslip_text: Option<String>,
    parsed_data: Option<PayslipComponents>,
    final_report: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        let country = Country::default();
        Self::new(country, country.default_tax_year())
    }
}

impl Session {
    pub fn new(country: Country, tax_year: impl Into<String>) -> Self {
        Self {
            step: Step::AwaitingInput,
            country,
            tax_year: tax_year.into().trim().to_string(),
            payslip_text: None,
            parsed_data: None,
            final_report: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn country(&self) -> Country {
        self.country
    }

    pub fn tax_year(&self) -> &str {
        &self.tax_year
    }

    pub fn payslip_text(&self) -> Option<&str> {
        self.payslip_text.as_deref()
    }

    pub fn parsed_data(&self) -> Option<&PayslipComponents> {
        self.parsed_data.as_ref()
    }

    pub fn final_report(&self) -> Option<&str> {
        self.final_report.as_deref()
    }

    /// Changes the country and tax year without touching the current step.
    pub fn set_jurisdiction(&mut self, country: Country, tax_year: impl Into<String>) {
        self.country = country;
        self.tax_year = tax_year.into().trim().to_string();
    }

    fn expect_step(&self, expected: Step, action: &'static str) -> Result<()> {
        if self.step != expected {
            return Err(SalaryAnalystError::InvalidTransition {
                action,
                step: self.step.to_string(),
            });
        }
        Ok(())
    }

    /// Step 1 -> 2. Nothing changes unless extraction succeeds.
    pub async fn submit_payslip<A>(
        &mut self,
        analyzer: &A,
        payslip_text: &str,
    ) -> Result<&PayslipComponents>
    where
        A: PayslipAnalyzer + ?Sized,
    {
        self.expect_step(Step::AwaitingInput, "analyze a payslip")?;

        if payslip_text.trim().is_empty() {
            return Err(SalaryAnalystError::EmptyPayslip);
        }

        if get_tax_rules(self.country.key(), &self.tax_year).is_none() {
            return Err(SalaryAnalystError::UnsupportedJurisdiction {
                country: self.country.display_name().to_string(),
                tax_year: self.tax_year.clone(),
            });
        }

        info!("Calling parser (call 1/2)");
        let parsed = analyzer.parse_payslip_text(payslip_text).await?;
        parsed.validate()?;

        self.payslip_text = Some(payslip_text.to_string());
        self.step = Step::AwaitingConfirmation;
        Ok(self.parsed_data.insert(parsed))
    }

    /// Step 2 -> 3. A failed analysis call still reaches the report step, with
    /// the fallback message as the report text.
    pub async fn confirm<A>(&mut self, analyzer: &A) -> Result<&str>
    where
        A: PayslipAnalyzer + ?Sized,
    {
        self.expect_step(Step::AwaitingConfirmation, "confirm the parsed data")?;

        let confirmed = self
            .parsed_data
            .as_ref()
            .ok_or(SalaryAnalystError::InvalidTransition {
                action: "confirm the parsed data",
                step: "awaiting_confirmation without parsed data".to_string(),
            })?;

        let tax_rules = tax_rules_as_string(self.country.key(), &self.tax_year);

        info!("Calling analyst (call 2/2)");
        let report = match analyzer
            .generate_analysis_report(
                confirmed,
                self.country.display_name(),
                &self.tax_year,
                &tax_rules,
            )
            .await
        {
            Ok(report) => report,
            Err(e) => {
                error!("Analysis call failed: {}", e);
                ANALYSIS_FAILED_MESSAGE.to_string()
            }
        };

        self.step = Step::ShowingReport;
        Ok(self.final_report.insert(report).as_str())
    }

    /// Back to step 1. The jurisdiction is kept.
    pub fn start_over(&mut self) {
        self.step = Step::AwaitingInput;
        self.payslip_text = None;
        self.parsed_data = None;
        self.final_report = None;
    }

    /// Renderer input for the finished report, `None` before step 3.
    pub fn report_input(&self, generated_at: DateTime<FixedOffset>) -> Option<ReportInput<'_>> {
        if self.step != Step::ShowingReport {
            return None;
        }

        Some(ReportInput {
            title: DEFAULT_REPORT_TITLE,
            country: self.country.display_name(),
            tax_year: &self.tax_year,
            payslip_text: self.payslip_text.as_deref(),
            confirmed_data: self.parsed_data.as_ref()?,
            final_report: self.final_report.as_deref().unwrap_or_default(),
            generated_at,
        })
    }
}
