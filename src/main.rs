//! salary-analyst: terminal front end for the payslip tax analyst.

use std::fs;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use salary_tax_analyst::llm::{AgentConfig, SalaryAgent};
use salary_tax_analyst::prompts::{DATA_HANDLING_WARNING, NOT_ADVICE_DISCLAIMER};
use salary_tax_analyst::report::{
    generate_pdf_report, kolkata_now, report_filename, ReportInput, DEFAULT_REPORT_TITLE,
};
use salary_tax_analyst::tax_rules::{available_years, get_tax_rules, tax_rules_table, Country};
use salary_tax_analyst::{PayslipComponents, SalaryAnalystError, Session};
use tracing_subscriber::EnvFilter;

/// Salary Analyzer & Tax Opportunity Agent
#[derive(Parser, Debug)]
#[command(name = "salary-analyst", version)]
#[command(about = "Find tax-saving opportunities in a pasted payslip", long_about = None)]
struct Args {
    /// Log verbosity: -v (info), -vv (debug). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a payslip, confirm the figures, then generate the report and PDF
    Analyze(AnalyzeArgs),

    /// Print the built-in tax rules as JSON
    Rules {
        #[arg(long)]
        country: Option<Country>,

        #[arg(long)]
        tax_year: Option<String>,
    },

    /// Render a PDF from an existing report and confirmed data, without any model call
    Render {
        /// Markdown report produced by `analyze`
        #[arg(long)]
        report: PathBuf,

        /// Confirmed monthly data as JSON
        #[arg(long)]
        data: PathBuf,

        /// Original payslip text to include
        #[arg(long)]
        payslip: Option<PathBuf>,

        #[arg(long, default_value = "india")]
        country: Country,

        #[arg(long)]
        tax_year: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
    /// Country whose tax rules apply (india, usa)
    #[arg(long, default_value = "india")]
    country: Country,

    /// Financial year, e.g. 2024-25 for India or 2024 for the USA
    #[arg(long)]
    tax_year: Option<String>,

    /// File with the payslip text (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// PDF destination: a file path or an existing directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Accept the parsed figures without asking
    #[arg(short, long)]
    yes: bool,

    /// Skip writing the PDF
    #[arg(long)]
    no_pdf: bool,

    /// Chat model to use
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,
}

impl AnalyzeArgs {
    /// A payslip piped on stdin leaves no way to answer the confirmation prompt.
    fn check_confirmable(&self, stdin_is_terminal: bool) -> Result<()> {
        if self.input.is_none() && !self.yes && !stdin_is_terminal {
            bail!("The payslip is piped on stdin, so it cannot be confirmed interactively. Pass --yes or --input.");
        }
        Ok(())
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let default_filter = format!("salary_tax_analyst={level},salary_analyst={level}");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn read_payslip(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read payslip from {}", path.display())),
        None => {
            if io::stdin().is_terminal() {
                println!("Step 1: Paste your payslip text. Remember to remove personal info.");
                println!("Finish with Ctrl-D on an empty line.");
            }
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read payslip from stdin")?;
            Ok(text)
        }
    }
}

fn ask_confirmation() -> Result<bool> {
    print!("Confirm & generate report? [y/N]: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn resolve_output(output: Option<PathBuf>, filename: String) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(filename),
        Some(path) => path,
        None => PathBuf::from(filename),
    }
}

fn write_pdf(input: &ReportInput<'_>, output: Option<PathBuf>) -> Result<PathBuf> {
    let pb = spinner("Generating downloadable PDF...");
    let bytes = generate_pdf_report(input);
    pb.finish_and_clear();

    let path = resolve_output(output, report_filename(&input.generated_at));
    fs::write(&path, bytes?).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(path)
}

fn explain_submit_error(err: SalaryAnalystError) -> anyhow::Error {
    match err {
        SalaryAnalystError::EmptyPayslip => {
            anyhow::anyhow!("Please paste your payslip text before analyzing.")
        }
        SalaryAnalystError::UnsupportedJurisdiction { country, tax_year } => {
            let known = available_years(&country);
            anyhow::anyhow!(
                "Sorry, I don't have the tax rules for {} {}. Known years: {}",
                country,
                tax_year,
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            )
        }
        other => anyhow::anyhow!(
            "Sorry, I was unable to parse your payslip ({}). Please try again, perhaps with clearer formatting.",
            other
        ),
    }
}

async fn analyze(args: AnalyzeArgs) -> Result<()> {
    let country = args.country;
    let tax_year = args
        .tax_year
        .clone()
        .unwrap_or_else(|| country.default_tax_year().to_string());

    println!("{}\n", DATA_HANDLING_WARNING.trim());
    println!("{}\n", NOT_ADVICE_DISCLAIMER.trim());
    println!("Your current settings are: Country: {}, Year: {}\n", country, tax_year);

    args.check_confirmable(io::stdin().is_terminal())?;

    let mut config = AgentConfig::from_env().context("Agent could not be initialized")?;
    if let Some(model) = args.model {
        config = config.with_model(model);
    }
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }
    let agent = SalaryAgent::new(config)?;
    let mut session = Session::new(country, tax_year);

    let payslip_text = read_payslip(args.input.as_deref())?;

    let pb = spinner("Calling AI Parser Engine... (call 1/2)");
    let submitted = session.submit_payslip(&agent, &payslip_text).await;
    pb.finish_and_clear();
    let parsed = submitted.map_err(explain_submit_error)?;

    println!("Step 2: Please confirm your parsed data");
    println!("I have parsed the following *monthly* figures:\n");
    println!("{}\n", parsed.to_pretty_json()?);

    if !args.yes && !ask_confirmation()? {
        session.start_over();
        println!("Starting over. Re-run with corrected payslip text.");
        return Ok(());
    }

    let pb = spinner("Calling AI Analysis Engine... (call 2/2)");
    let confirmed = session.confirm(&agent).await;
    pb.finish_and_clear();
    let report = confirmed?;

    println!("\nStep 3: Your Personalized Tax Opportunity Report\n");
    println!("{}\n", report);
    println!("I hope this analysis is useful!");
    println!("{}\n", NOT_ADVICE_DISCLAIMER.trim());

    if args.no_pdf {
        return Ok(());
    }

    let input = session
        .report_input(kolkata_now())
        .context("Report is not ready")?;
    let path = write_pdf(&input, args.output)?;
    println!("PDF report saved to {}", path.display());
    Ok(())
}

fn print_rules(country: Option<Country>, tax_year: Option<String>) -> Result<()> {
    let rendered = match (country, tax_year) {
        (Some(country), Some(tax_year)) => match get_tax_rules(country.key(), &tax_year) {
            Some(rules) => serde_json::to_string_pretty(rules)?,
            None => bail!(
                "No rules for {} {}. Known years: {}",
                country,
                tax_year,
                available_years(country.key()).join(", ")
            ),
        },
        (Some(country), None) => serde_json::to_string_pretty(&tax_rules_table()[country.key()])?,
        (None, Some(_)) => bail!("--tax-year needs --country"),
        (None, None) => serde_json::to_string_pretty(&tax_rules_table())?,
    };
    println!("{}", rendered);
    Ok(())
}

fn render(
    report: PathBuf,
    data: PathBuf,
    payslip: Option<PathBuf>,
    country: Country,
    tax_year: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let tax_year = tax_year.unwrap_or_else(|| country.default_tax_year().to_string());
    let final_report = fs::read_to_string(&report)
        .with_context(|| format!("Failed to read {}", report.display()))?;
    let raw_data = fs::read_to_string(&data)
        .with_context(|| format!("Failed to read {}", data.display()))?;
    let confirmed: PayslipComponents = serde_json::from_str(&raw_data)
        .with_context(|| format!("{} is not valid payslip JSON", data.display()))?;
    let payslip_text = payslip
        .map(|path| {
            fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))
        })
        .transpose()?;

    let input = ReportInput {
        title: DEFAULT_REPORT_TITLE,
        country: country.display_name(),
        tax_year: &tax_year,
        payslip_text: payslip_text.as_deref(),
        confirmed_data: &confirmed,
        final_report: &final_report,
        generated_at: kolkata_now(),
    };
    let path = write_pdf(&input, output)?;
    println!("PDF report saved to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Commands::Analyze(analyze_args) => analyze(analyze_args).await,
        Commands::Rules { country, tax_year } => print_rules(country, tax_year),
        Commands::Render {
            report,
            data,
            payslip,
            country,
            tax_year,
            output,
        } => render(report, data, payslip, country, tax_year, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_args(extra: &[&str]) -> AnalyzeArgs {
        let mut argv = vec!["salary-analyst", "analyze"];
        argv.extend_from_slice(extra);
        match Args::try_parse_from(argv).unwrap().command {
            Commands::Analyze(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_analyze_defaults() {
        let args = analyze_args(&[]);
        assert_eq!(args.country, Country::India);
        assert!(args.tax_year.is_none());
        assert!(!args.yes);

        let args = analyze_args(&["--country", "USA", "--tax-year", "2024", "-y"]);
        assert_eq!(args.country, Country::Usa);
        assert_eq!(args.tax_year.as_deref(), Some("2024"));
        assert!(args.yes);
    }

    #[test]
    fn test_piped_stdin_needs_yes_or_input() {
        let err = analyze_args(&[]).check_confirmable(false).unwrap_err();
        assert!(err.to_string().contains("--yes"));

        assert!(analyze_args(&[]).check_confirmable(true).is_ok());
        assert!(analyze_args(&["--yes"]).check_confirmable(false).is_ok());
        assert!(analyze_args(&["--input", "payslip.txt"])
            .check_confirmable(false)
            .is_ok());
    }

    #[test]
    fn test_submit_errors_become_user_messages() {
        let message = explain_submit_error(SalaryAnalystError::EmptyPayslip).to_string();
        assert_eq!(message, "Please paste your payslip text before analyzing.");

        let message = explain_submit_error(SalaryAnalystError::UnsupportedJurisdiction {
            country: "India".to_string(),
            tax_year: "2019-20".to_string(),
        })
        .to_string();
        assert!(message.contains("India 2019-20"));
        assert!(message.ends_with("Known years: 2024-25, 2023-24"));

        let message = explain_submit_error(SalaryAnalystError::UnsupportedJurisdiction {
            country: "Mars".to_string(),
            tax_year: "2024".to_string(),
        })
        .to_string();
        assert!(message.ends_with("Known years: none"));

        let message =
            explain_submit_error(SalaryAnalystError::ExtractionFailed("no tool call".to_string()))
                .to_string();
        assert!(message.starts_with("Sorry, I was unable to parse your payslip"));
        assert!(message.contains("no tool call"));
    }

    #[test]
    fn test_output_can_be_directory_or_file() {
        let filename = "salary_report_20240501_103000.pdf".to_string();

        let dir = std::env::temp_dir();
        assert_eq!(
            resolve_output(Some(dir.clone()), filename.clone()),
            dir.join(&filename)
        );

        let file = dir.join("does-not-exist").join("my_report.pdf");
        assert_eq!(resolve_output(Some(file.clone()), filename.clone()), file);

        assert_eq!(resolve_output(None, filename.clone()), PathBuf::from(filename));
    }
}
