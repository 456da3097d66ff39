//! Credit Risk CLI
//!
//! Command-line interface for the remote credit risk API:
//! - Check API health
//! - Show the dataset summary
//! - Browse loan records
//! - Score a loan application
//! - Render charts to SVG

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use credit_risk::charts::ChartKind;
use credit_risk::client::{ApiClient, ClientError, CreditRiskApi, DataQuery};
use credit_risk::config::{generate_default_config, Config};
use credit_risk::dashboard::explorer::COLUMNS;
use credit_risk::dashboard::health::check_once;
use credit_risk::dashboard::{
    pagination_items, ApiStatus, ApplicationForm, PageItem, PredictionPanel, SummaryMetrics,
    TableRow,
};
use credit_risk::logging::init_logging;
use credit_risk::mappings::{self, Code, Domain};

#[derive(Parser)]
#[command(name = "credit-risk-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the credit risk scoring API")]
#[command(long_about = "Query loan data and default-risk predictions from the credit risk API.\nConfiguration is read from the usual config locations unless --config is given.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL, including the /api prefix (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether the API is reachable
    Health,

    /// Show record counts and the default rate
    Summary,

    /// List one page of loan records
    Data {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Records per page (10, 20, 50 or 100)
        #[arg(long, default_value = "20")]
        per_page: u32,
        /// Loan status filter: code or label (e.g. 1, Default)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Score a loan application; unspecified fields keep their defaults
    Predict {
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        income: Option<String>,
        /// Code or label (OWN, MORTGAGE, RENT, OTHER)
        #[arg(long)]
        home_ownership: Option<String>,
        /// Employment length in years
        #[arg(long)]
        emp_length: Option<String>,
        /// Code or label (EDUCATION, MEDICAL, VENTURE, ...)
        #[arg(long)]
        intent: Option<String>,
        /// Code or label (A-G)
        #[arg(long)]
        grade: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        /// Interest rate in percent
        #[arg(long)]
        int_rate: Option<String>,
        /// Loan as a fraction of income (0.01-1)
        #[arg(long)]
        percent_income: Option<String>,
        /// Code or label (N, Y)
        #[arg(long)]
        default_on_file: Option<String>,
        /// Credit history length in years
        #[arg(long)]
        cred_hist: Option<String>,
    },

    /// Render a chart to SVG
    Chart {
        /// Chart kind (loan-distribution, default-rate, loan-grade, correlation)
        kind: String,
        /// JSON file with the chart data (default: bundled sample data)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Render mark N in its hovered state
        #[arg(long)]
        hover: Option<usize>,
    },

    /// Show the category mapping tables
    Mappings {
        /// Only this domain (home-ownership, loan-intent, loan-grade, default-on-file, loan-status)
        domain: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    // Keep stdout clean for piping unless RUST_LOG asks for more
    let mut logging = config.logging.clone();
    logging.level = "warn".to_string();
    init_logging(&logging)?;

    config.install_mappings()?;

    let client = ApiClient::new(config.client_config())?;
    let api: Arc<dyn CreditRiskApi> = Arc::new(client);

    match cli.command {
        Commands::Health => {
            let snapshot = check_once(api.as_ref()).await;
            match snapshot.status {
                ApiStatus::Online => println!("API status: online ({})", config.api.base_url),
                _ => {
                    eprintln!(
                        "API status: offline ({}): {}",
                        config.api.base_url,
                        snapshot.error.unwrap_or_default()
                    );
                    std::process::exit(1);
                }
            }
        }

        Commands::Summary => {
            let summary = api.summary().await.map_err(api_error)?;
            let metrics = SummaryMetrics::from_summary(&summary);

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&metrics)?),
                OutputFormat::Csv => {
                    let mut writer = csv::Writer::from_writer(std::io::stdout());
                    writer.write_record(["metric", "value"])?;
                    for (title, value) in metrics.cards() {
                        writer.write_record([title, value.as_str()])?;
                    }
                    writer.flush()?;
                }
                OutputFormat::Table => {
                    for (title, value) in metrics.cards() {
                        println!("{:<20} {:>12}", title, value);
                    }
                }
            }
        }

        Commands::Data {
            page,
            per_page,
            status,
        } => {
            let loan_status = status.as_deref().map(parse_status).transpose()?;
            let query = DataQuery {
                page: page.max(1),
                per_page,
                loan_status,
            };

            let data = api.data(&query).await.map_err(api_error)?;
            let pagination = data.pagination_or_default();
            let tables = mappings::mappings();
            let rows: Vec<TableRow> = data
                .data
                .iter()
                .map(|record| TableRow::from_record(record, &tables))
                .collect();

            match cli.format {
                OutputFormat::Json => {
                    let body = serde_json::json!({
                        "rows": rows,
                        "pagination": pagination,
                    });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                OutputFormat::Csv => print_csv(&rows)?,
                OutputFormat::Table => {
                    print_table(&rows);
                    println!();
                    println!(
                        "Page {} of {} ({} records)  {}",
                        query.page,
                        pagination.total_pages,
                        credit_risk::format::thousands(pagination.total_records),
                        page_bar(query.page, pagination.total_pages)
                    );
                }
            }
        }

        Commands::Predict {
            age,
            income,
            home_ownership,
            emp_length,
            intent,
            grade,
            amount,
            int_rate,
            percent_income,
            default_on_file,
            cred_hist,
        } => {
            let fields = [
                ("person_age", age),
                ("person_income", income),
                ("person_home_ownership", home_ownership),
                ("person_emp_length", emp_length),
                ("loan_intent", intent),
                ("loan_grade", grade),
                ("loan_amnt", amount),
                ("loan_int_rate", int_rate),
                ("loan_percent_income", percent_income),
                ("cb_person_default_on_file", default_on_file),
                ("cb_person_cred_hist_length", cred_hist),
            ];
            let form = ApplicationForm::from_pairs(
                fields
                    .iter()
                    .filter_map(|(name, value)| value.as_deref().map(|v| (*name, v))),
            )?;

            let mut panel = PredictionPanel::with_form(api, form);
            panel.submit().await;

            let assessment = match (panel.assessment(), panel.error()) {
                (Some(assessment), _) => assessment,
                (None, Some(error)) => bail!("{}", error),
                (None, None) => bail!("Prediction did not complete"),
            };

            match cli.format {
                OutputFormat::Json => println!("{}", assessment.raw_json()),
                OutputFormat::Table | OutputFormat::Csv => {
                    let (debt_to_income, income_to_loan) = panel.form().derived_display();
                    println!("Debt to income:       {}", debt_to_income);
                    println!("Income to loan ratio: {}", income_to_loan);
                    println!();
                    println!(
                        "Prediction:           {} ({:.2}% confidence)",
                        assessment.classification,
                        assessment.confidence * 100.0
                    );
                    println!(
                        "Default probability:  {:.2}% - {}",
                        assessment.default_probability * 100.0,
                        assessment.tier.label()
                    );
                    println!(
                        "Model:                {} {}",
                        assessment.model_name, assessment.model_version
                    );
                    if let Some(metrics) = &assessment.metrics {
                        println!(
                            "Metrics:              accuracy {:.4}, precision {:.4}, recall {:.4}, f1 {:.4}",
                            metrics.accuracy, metrics.precision, metrics.recall, metrics.f1
                        );
                    }
                    println!();
                    println!("{}", assessment.recommendation());
                }
            }
        }

        Commands::Chart {
            kind,
            input,
            output,
            hover,
        } => {
            let kind: ChartKind = kind.parse()?;
            let mut surface = match &input {
                Some(path) => {
                    let json = std::fs::read_to_string(path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    kind.render_json(&json)?
                }
                None => kind.render_sample(),
            }
            .with_background("#212529");

            if let Some(index) = hover {
                let Some(mark) = surface.marks().get(index).copied() else {
                    bail!("{} chart has {} marks", kind, surface.mark_count());
                };
                surface.pointer_enter(mark);
            }

            let svg = surface.to_svg();
            match output {
                Some(path) => {
                    std::fs::write(&path, svg)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote {} chart to {}", kind, path.display());
                }
                None => println!("{}", svg),
            }
        }

        Commands::Mappings { domain } => {
            let domains: Vec<Domain> = match domain {
                Some(key) => match Domain::from_key(&key) {
                    Some(domain) => vec![domain],
                    None => bail!("Unknown mapping domain: {}", key),
                },
                None => Domain::ALL.to_vec(),
            };

            let tables = mappings::mappings();
            for domain in domains {
                println!("{}", domain.key());
                for (code, label) in tables.table(domain).entries() {
                    println!("  {:>3}  {}", code, label);
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Attach the user-facing explanation to a client error
fn api_error(error: ClientError) -> anyhow::Error {
    anyhow::anyhow!("{} ({})", error.user_message(), error)
}

/// Status filter as a code, or a label resolved through the mapping
fn parse_status(raw: &str) -> anyhow::Result<Code> {
    if let Ok(code) = raw.trim().parse::<Code>() {
        return Ok(code);
    }
    match mappings::mappings().code(Domain::LoanStatus, raw.trim()) {
        Some(code) => Ok(code),
        None => bail!("Unknown loan status: {}", raw),
    }
}

fn print_table(rows: &[TableRow]) {
    if rows.is_empty() {
        println!("No records found");
        return;
    }

    let cells: Vec<[String; 11]> = rows.iter().map(TableRow::cells).collect();
    let widths: Vec<usize> = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .max()
                .unwrap_or(0)
                .max(column.len())
        })
        .collect();

    // Header
    let header: Vec<String> = COLUMNS
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{:<width$}", column, width = width))
        .collect();
    println!("{}", header.join(" | "));

    // Separator
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 3 * (widths.len() - 1)));

    // Data rows
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        println!("{}", line.join(" | "));
    }
}

fn print_csv(rows: &[TableRow]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    writer.flush()?;
    Ok(())
}

/// Text rendering of the pagination controls: `< 1 … 3 4 [5] 6 7 … 20 >`
fn page_bar(page: u32, total_pages: u32) -> String {
    pagination_items(page, total_pages)
        .into_iter()
        .map(|item| match item {
            PageItem::Previous { disabled, .. } => (if disabled { " " } else { "<" }).to_string(),
            PageItem::Next { disabled, .. } => (if disabled { " " } else { ">" }).to_string(),
            PageItem::Page { number, active: true } => format!("[{}]", number),
            PageItem::Page { number, .. } => number.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
