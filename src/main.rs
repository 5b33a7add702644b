use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use scholar_fanout::config::{find_config_file, load_config, Config, LogFormat};
use scholar_fanout::utils::{
    apply_view, format_citation, is_terminal, render_plain, render_table, terminal_width,
    CitationStyle, DedupPolicy, ScriptFilter, ViewOptions,
};
use scholar_fanout::{AggregateResponse, Aggregator, NormalizedRecord};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Scholar Fanout - Search Semantic Scholar, arXiv and OpenAlex at once
#[derive(Parser, Debug)]
#[command(name = "scholar-fanout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search Semantic Scholar, arXiv and OpenAlex with one query", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Table on a terminal, plain text otherwise
    Auto,
    Table,
    Json,
    Plain,
    /// One citation per record (see `--style`)
    Cite,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    Bibtex,
    Apa,
    Mla,
    Chicago,
}

impl From<Style> for CitationStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Bibtex => CitationStyle::Bibtex,
            Style::Apa => CitationStyle::Apa,
            Style::Mla => CitationStyle::Mla,
            Style::Chicago => CitationStyle::Chicago,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search every enabled source and print the merged results
    #[command(alias = "s")]
    Search {
        /// Search query string
        query: String,

        /// Maximum results per source
        #[arg(long, short)]
        limit: Option<usize>,

        /// Per-source timeout in seconds
        #[arg(long, short)]
        timeout: Option<u64>,

        /// Sort by citation count, most cited first
        #[arg(long)]
        popular: bool,

        /// Keep only records with Japanese text in the title or abstract
        #[arg(long)]
        japanese_only: bool,

        /// Drop cross-source duplicates
        #[arg(long)]
        dedup: bool,

        /// Citation style used by `--output cite`
        #[arg(long, value_enum, default_value_t = Style::Bibtex)]
        style: Style,

        /// Print per-source counts, timings and errors to stderr
        #[arg(long)]
        report: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("scholar_fanout={}", level)),
    );

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Plain => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Load the explicit config file, else a discovered one, else defaults plus environment
fn resolve_config(path: Option<&PathBuf>) -> Result<Config> {
    let path = path.cloned().or_else(find_config_file);
    let config = load_config(path.as_deref()).with_context(|| match &path {
        Some(p) => format!("Failed to load config from {}", p.display()),
        None => "Failed to load config from environment".to_string(),
    })?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = resolve_config(cli.config.as_ref())?;
    init_tracing(&cli, &config);

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
        Commands::Search {
            ref query,
            limit,
            timeout,
            popular,
            japanese_only,
            dedup,
            style,
            report,
        } => {
            if let Some(limit) = limit {
                config.search.per_source_limit = limit;
            }
            if let Some(timeout) = timeout {
                config.search.source_timeout_secs = timeout;
            }

            let mut aggregator = Aggregator::from_config(&config)?;
            if dedup {
                aggregator = aggregator.with_dedup(DedupPolicy::KeepFirst);
            }

            let response = aggregator.search_detailed(query).await?;
            if report {
                print_report(&response);
            }

            let options = ViewOptions {
                script: japanese_only.then(ScriptFilter::japanese),
                sort_by_popularity: popular,
            };
            let view = apply_view(&response.records, &options);

            if view.is_empty() {
                if response.records.is_empty() {
                    println!("No papers found.");
                } else {
                    println!("No papers match your filter.");
                }
                return Ok(());
            }

            print!("{}", render_records(&view, cli.output, style.into())?);
        }
    }

    Ok(())
}

/// Render the records in the chosen format, newline-terminated
fn render_records(
    records: &[NormalizedRecord],
    output: OutputFormat,
    style: CitationStyle,
) -> Result<String> {
    let output = match output {
        OutputFormat::Auto if is_terminal() => OutputFormat::Table,
        OutputFormat::Auto => OutputFormat::Plain,
        other => other,
    };

    let body = match output {
        OutputFormat::Table => render_table(records, terminal_width()),
        OutputFormat::Json => serde_json::to_string_pretty(records)?,
        OutputFormat::Cite => records
            .iter()
            .map(|r| format_citation(r, style))
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Plain | OutputFormat::Auto => render_plain(records),
    };

    Ok(format!("{}\n", body))
}

fn print_report(response: &AggregateResponse) {
    for report in &response.reports {
        match &report.error {
            None => eprintln!(
                "{:<17} {:>3} records in {:>5} ms",
                report.source.name(),
                report.count,
                report.elapsed.as_millis()
            ),
            Some(error) => eprintln!(
                "{:<17} failed after {} ms: {}",
                report.source.name(),
                report.elapsed.as_millis(),
                error
            ),
        }
    }
    eprintln!("{:<17} {:>3} records", "merged", response.records.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_fanout::models::{RecordBuilder, SourceKind};

    fn sample_records() -> Vec<NormalizedRecord> {
        let record = RecordBuilder::new("W1", "Graph Theory", "https://x/W1", SourceKind::OpenAlex)
            .authors(["Ada Lovelace"])
            .year(Some(2020))
            .build()
            .unwrap();
        vec![record]
    }

    #[test]
    fn test_every_output_format_ends_with_newline() {
        let records = sample_records();
        for output in [
            OutputFormat::Plain,
            OutputFormat::Json,
            OutputFormat::Table,
            OutputFormat::Cite,
        ] {
            let text = render_records(&records, output, CitationStyle::Bibtex).unwrap();
            assert!(text.ends_with('\n'), "{:?} output lacks a final newline", output);
            assert!(!text.ends_with("\n\n"), "{:?} output ends with a blank line", output);
        }
    }

    #[test]
    fn test_plain_output_lists_record() {
        let text = render_records(&sample_records(), OutputFormat::Plain, CitationStyle::Bibtex)
            .unwrap();
        assert!(text.starts_with("1. Graph Theory (2020)"));
        assert!(text.trim_end().ends_with("https://x/W1"));
    }

    #[test]
    fn test_cli_version() {
        let version = env!("CARGO_PKG_VERSION");
        let parts: Vec<&str> = version.split('.').collect();
        assert!(parts.len() >= 2);
        assert!(parts[0].parse::<u32>().is_ok());
    }

    #[test]
    fn test_search_defaults() {
        let cli = Cli::parse_from(["scholar-fanout", "search", "transformers"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert_eq!(cli.output, OutputFormat::Auto);

        match cli.command {
            Commands::Search {
                query,
                limit,
                timeout,
                popular,
                japanese_only,
                dedup,
                style,
                report,
            } => {
                assert_eq!(query, "transformers");
                assert_eq!(limit, None);
                assert_eq!(timeout, None);
                assert!(!popular && !japanese_only && !dedup && !report);
                assert_eq!(style, Style::Bibtex);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_search_flags() {
        let cli = Cli::parse_from([
            "scholar-fanout",
            "-vv",
            "s",
            "機械学習",
            "--limit",
            "5",
            "--timeout",
            "3",
            "--popular",
            "--japanese-only",
            "--dedup",
            "-o",
            "cite",
            "--style",
            "apa",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, OutputFormat::Cite);

        match cli.command {
            Commands::Search {
                query,
                limit,
                timeout,
                popular,
                japanese_only,
                dedup,
                style,
                ..
            } => {
                assert_eq!(query, "機械学習");
                assert_eq!(limit, Some(5));
                assert_eq!(timeout, Some(3));
                assert!(popular && japanese_only && dedup);
                assert_eq!(CitationStyle::from(style), CitationStyle::Apa);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_config_command() {
        let cli = Cli::parse_from(["scholar-fanout", "--config", "/tmp/sf.toml", "config"]);
        assert!(matches!(cli.command, Commands::Config));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/sf.toml")));
    }

    #[test]
    fn test_query_is_required() {
        assert!(Cli::try_parse_from(["scholar-fanout", "search"]).is_err());
        assert!(Cli::try_parse_from(["scholar-fanout"]).is_err());
    }
}
