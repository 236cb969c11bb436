//! MdFetch CLI - Command-line interface for fetching web pages as markdown

use clap::{Args, Parser, Subcommand, ValueEnum};
use mdfetch::{
    fetch_batch, fetch_markdown, BatchEntry, BatchSummary, FetchOptions, FetchResult,
    DEFAULT_SERVICE_URL, DEFAULT_TIMEOUT_MS, TOOL_LLMTXT,
};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

/// Output format for fetch subcommands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Markdown with YAML frontmatter
    #[default]
    Md,
    /// JSON format
    Json,
}

/// MdFetch - token-efficient web page fetching as markdown
#[derive(Parser, Debug)]
#[command(name = "mdfetch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a URL and output markdown with metadata frontmatter
    Fetch {
        /// URL to fetch (https:// is added when no scheme is given)
        url: String,

        #[command(flatten)]
        args: FetchArgs,
    },
    /// Fetch several URLs concurrently
    Batch {
        /// URLs to fetch
        #[arg(required = true)]
        urls: Vec<String>,

        /// Maximum number of fetches in flight
        #[arg(long)]
        concurrency: Option<usize>,

        #[command(flatten)]
        args: FetchArgs,
    },
}

/// Options shared by fetch subcommands
#[derive(Args, Debug, Clone)]
struct FetchArgs {
    /// Output format
    #[arg(long, short, default_value = "md")]
    output: OutputFormat,

    /// Fail instead of fetching the page directly when conversion fails
    #[arg(long)]
    no_fallback: bool,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "MDFETCH_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Conversion service base URL
    #[arg(long, env = "MDFETCH_SERVICE_URL", default_value = DEFAULT_SERVICE_URL)]
    service_url: String,

    /// Custom User-Agent
    #[arg(long, env = "MDFETCH_USER_AGENT")]
    user_agent: Option<String>,
}

impl FetchArgs {
    fn to_options(&self) -> FetchOptions {
        let mut options = FetchOptions::new()
            .fallback(!self.no_fallback)
            .timeout_ms(self.timeout_ms)
            .service_url(self.service_url.clone());
        if let Some(ref ua) = self.user_agent {
            options = options.user_agent(ua.clone());
        }
        options
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Fetch { url, args }) => {
            run_fetch(&url, &args).await;
        }
        Some(Commands::Batch {
            urls,
            concurrency,
            args,
        }) => {
            run_batch(&urls, concurrency, &args).await;
        }
        None => {
            eprintln!("Usage: mdfetch fetch <URL>");
            eprintln!("   or: mdfetch batch <URL>...");
            eprintln!("   or: mdfetch --help");
            std::process::exit(1);
        }
    }
}

/// Log to stderr, filtered by RUST_LOG
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run_fetch(url: &str, args: &FetchArgs) {
    match fetch_markdown(url, &args.to_options()).await {
        Ok(result) => match args.output {
            OutputFormat::Md => writeln_safe(&format_md_with_frontmatter(&result)),
            OutputFormat::Json => writeln_safe(&to_json(&result)),
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_batch(urls: &[String], concurrency: Option<usize>, args: &FetchArgs) {
    let mut options = args.to_options();
    if let Some(limit) = concurrency {
        options = options.max_concurrency(limit);
    }

    let entries = fetch_batch(urls, &options).await;
    let summary = BatchSummary::from_entries(&entries);

    match args.output {
        OutputFormat::Md => {
            for entry in &entries {
                writeln_safe(&format_batch_line(entry));
            }
        }
        OutputFormat::Json => writeln_safe(&to_json(&entries)),
    }

    eprintln!(
        "{} fetched, {} failed ({} total)",
        summary.succeeded, summary.failed, summary.total
    );

    if summary.failed > 0 {
        std::process::exit(1);
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing response: {}", e);
        std::process::exit(1);
    })
}

/// Format result as markdown with YAML frontmatter
fn format_md_with_frontmatter(result: &FetchResult) -> String {
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("url: {}\n", result.url));
    output.push_str(&format!("method: {}\n", result.method));
    if let Some(tokens) = result.tokens {
        output.push_str(&format!("tokens: {}\n", tokens));
    }
    output.push_str("---\n");
    output.push_str(&result.content);

    output
}

/// One status line per batch entry
fn format_batch_line(entry: &BatchEntry) -> String {
    match (&entry.result, &entry.error) {
        (Some(result), _) => {
            let mut line = format!(
                "ok    {} ({}, {} chars",
                entry.url,
                result.method,
                result.content.chars().count()
            );
            if let Some(tokens) = result.tokens {
                line.push_str(&format!(", {} tokens", tokens));
            }
            line.push(')');
            line
        }
        (None, Some(error)) => format!("error {}: {}", entry.url, error),
        (None, None) => format!("error {}: unknown failure", entry.url),
    }
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
