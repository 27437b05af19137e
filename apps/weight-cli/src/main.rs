//! weight-check binary
//!
//! `check` runs the manual GR vs invoice pre-check on two weights.
//! `analyze` reconciles a Goods Receipt against invoices from PDF files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use shipment_types::{ShipmentDocumentSet, Table, TableRow, WeightPair};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use weight_engine::{
    check_weights, run_analysis, AnalysisConfig, DiscrepancyCheck, ReconciliationResult,
    DEFAULT_TOLERANCE,
};

#[derive(Parser, Debug)]
#[command(name = "weight-check")]
#[command(version, about = "GR vs invoice weight tolerance check and line-item reallocation")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare a GR weight with an invoice weight (both kg)
    Check {
        /// Goods-Receipt weight, kg
        #[arg(long)]
        gr: f64,

        /// Commercial invoice weight, kg
        #[arg(long)]
        invoice: f64,

        /// Tolerance fraction
        #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
        tolerance: f64,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Reconcile a GR PDF against one or more invoice PDFs
    Analyze {
        /// PDF files: one GR and one or more invoices
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Tolerance fraction, overrides the config file
        #[arg(long)]
        tolerance: Option<f64>,

        /// TOML file with an [analysis] section
        #[arg(long)]
        config: Option<PathBuf>,

        /// Per-document parse budget, overrides the config file
        #[arg(long)]
        timeout_ms: Option<u64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let args = Args::parse();

    // stdout carries the tables, logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Check {
            gr,
            invoice,
            tolerance,
            format,
        } => {
            let check = check_weights(WeightPair::new(gr, invoice)?, tolerance)?;
            print!("{}", render_check(&check, format)?);
        }
        Command::Analyze {
            files,
            tolerance,
            config,
            timeout_ms,
            format,
        } => {
            let mut analysis = match config {
                Some(path) => AnalysisConfig::from_file(&path)?,
                None => AnalysisConfig::default(),
            };
            if let Some(tolerance) = tolerance {
                analysis.tolerance = tolerance;
            }
            if let Some(timeout_ms) = timeout_ms {
                analysis.parse_timeout_ms = timeout_ms;
            }

            let documents = read_documents(&files)?;
            tracing::info!(files = documents.len(), "starting analysis");
            let result = run_analysis(&documents, &analysis)?;
            print!("{}", render_analysis(&result, format)?);
        }
    }
    Ok(())
}

/// Load PDFs keyed by file name
fn read_documents(paths: &[PathBuf]) -> Result<ShipmentDocumentSet> {
    let mut documents = BTreeMap::new();
    for path in paths {
        let bytes =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let name = file_name(path);
        if documents.insert(name.clone(), bytes).is_some() {
            anyhow::bail!("two input files are named '{name}'");
        }
    }
    Ok(documents)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn render_check(check: &DiscrepancyCheck, format: OutputFormat) -> Result<String> {
    let verdict = if check.needs_documents() {
        format!(
            "Out of tolerance: upload the GR and invoice PDFs. A corrected invoice total must be between {:.3} and {:.3} kg.",
            check.target.low, check.target.high
        )
    } else {
        "Within tolerance: no documents needed.".to_string()
    };

    match format {
        OutputFormat::Text => Ok(format!("{}\n{}\n", check.to_table().to_text(), verdict)),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "check": check,
                "needs_documents": check.needs_documents(),
                "message": verdict,
            });
            Ok(format!("{}\n", serde_json::to_string_pretty(&value)?))
        }
    }
}

fn render_analysis(result: &ReconciliationResult, format: OutputFormat) -> Result<String> {
    let totals = result.totals();

    if format == OutputFormat::Json {
        let value = serde_json::json!({
            "summary": result.summary.to_json()?,
            "full_table": result.full_table.to_json()?,
            "adjusted_table": result.adjusted_table.to_json()?,
            "validation_table": result
                .validation_table
                .as_ref()
                .map(Table::to_json)
                .transpose()?,
            "totals": totals,
            "warnings": result.warnings,
        });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&value)?));
    }

    let mut out = String::new();
    for warning in &result.warnings {
        out.push_str(&format!("warning: {warning}\n"));
    }
    if !result.warnings.is_empty() {
        out.push('\n');
    }

    push_table(&mut out, &result.summary);
    push_table(&mut out, &result.full_table);
    out.push_str(&format!(
        "Sum NEW WEIGHT lbs: {:.2}\nSum NEW WEIGHT kgs: {:.3}\n\n",
        totals.new_weight_lb, totals.new_weight_kg
    ));

    if result.adjusted_table.is_empty() {
        out.push_str("No line items needed adjusting.\n\n");
    } else {
        push_table(&mut out, &result.adjusted_table);
    }

    if let Some(validation) = &result.validation_table {
        push_table(&mut out, validation);
    }

    Ok(out)
}

fn push_table<R: TableRow>(out: &mut String, table: &Table<R>) {
    out.push_str(&table.to_text());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use weight_engine::analyze_texts;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_check_defaults() {
        let args = Args::try_parse_from(["weight-check", "check", "--gr", "95", "--invoice", "100"])
            .unwrap();
        match args.command {
            Command::Check {
                gr,
                invoice,
                tolerance,
                format,
            } => {
                assert_eq!(gr, 95.0);
                assert_eq!(invoice, 100.0);
                assert_eq!(tolerance, DEFAULT_TOLERANCE);
                assert_eq!(format, OutputFormat::Text);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_analyze_requires_files() {
        assert!(Args::try_parse_from(["weight-check", "analyze"]).is_err());

        let args = Args::try_parse_from([
            "weight-check",
            "analyze",
            "gr.pdf",
            "inv.pdf",
            "--format",
            "json",
            "--timeout-ms",
            "500",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Command::Analyze {
                format: OutputFormat::Json,
                timeout_ms: Some(500),
                ..
            }
        ));
    }

    #[test]
    fn test_render_check_messages() {
        let inside = check_weights(WeightPair::new(95.0, 100.0).unwrap(), 0.10).unwrap();
        let text = render_check(&inside, OutputFormat::Text).unwrap();
        assert!(text.contains("Within tolerance"));
        assert!(text.contains("90.000"));

        let outside = check_weights(WeightPair::new(80.0, 100.0).unwrap(), 0.10).unwrap();
        let json = render_check(&outside, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["needs_documents"], true);
    }

    #[test]
    fn test_render_analysis_prints_new_weight_sums() {
        let texts: BTreeMap<String, String> = [
            ("gr.pdf", "GOODS RECEIPT\nTOTAL WEIGHT: 190 KG"),
            ("inv.pdf", "COMMERCIAL INVOICE\nPIECE 1 100 KG\nPIECE 2 100 KG"),
        ]
        .into_iter()
        .map(|(n, t)| (n.to_string(), t.to_string()))
        .collect();
        let result = analyze_texts(&texts, &AnalysisConfig::default()).unwrap();

        let text = render_analysis(&result, OutputFormat::Text).unwrap();
        assert!(text.contains("Sum NEW WEIGHT kgs: 190.000"));
        assert!(text.contains("warning: 'inv.pdf'"));

        let json = render_analysis(&result, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["full_table"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_file_name_strips_directories() {
        assert_eq!(file_name(Path::new("/tmp/docs/GR_1.pdf")), "GR_1.pdf");
    }
}
