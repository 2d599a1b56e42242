//! CLI binary for pdfqa.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `QaConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use pdfqa::{answer, AnswerMode, QaConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One question against a local file
  pdfqa report.pdf -q "When was the company founded?"

  # Several questions, answers printed in order
  pdfqa report.pdf -q "Who is the CEO?" -q "What was 2024 revenue?"

  # Questions from a file, one per line
  pdfqa report.pdf --questions-file questions.txt

  # Ask about a document behind a URL
  pdfqa https://example.com/10k.pdf -q "What is the fiscal year end?"

  # Use a local OpenAI-compatible endpoint (vLLM, LM Studio, Ollama)
  pdfqa --base-url http://localhost:8000 --model llama3 report.pdf -q "..."

  # Embedding-based retrieval instead of lexical scoring
  pdfqa --embeddings report.pdf -q "Summarise the risk factors"

  # One batched call per document sweep instead of one call per question
  pdfqa --sweep report.pdf --questions-file questions.txt

  # Full structured JSON output (answers + per-question detail + stats)
  pdfqa --json report.pdf -q "..." > output.json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY        API key for the default OpenAI endpoint
  PDFQA_BASE_URL        OpenAI-compatible endpoint base URL
  PDFQA_MODEL           Completion model ID (default: gpt-4o)
  PDFQA_EMBEDDING_MODEL Embedding model ID (default: text-embedding-3-small)

SETUP:
  1. Set API key:   export OPENAI_API_KEY=sk-...
  2. Ask:           pdfqa document.pdf -q "What is this document about?"
"#;

/// Answer questions about PDF documents using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdfqa",
    version,
    about = "Answer questions about PDF files and URLs using an LLM",
    long_about = "Extract text from a PDF (local file or URL), retrieve the passages most \
relevant to each question, and answer from those passages via an OpenAI-compatible \
completion endpoint (OpenAI, vLLM, LM Studio, Ollama, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Question to ask. Repeat for several questions.
    #[arg(short, long = "question")]
    questions: Vec<String>,

    /// Read questions from a file, one per line. Blank lines keep their slot.
    #[arg(long, env = "PDFQA_QUESTIONS_FILE")]
    questions_file: Option<PathBuf>,

    /// Completion model ID (e.g. gpt-4o, llama3).
    #[arg(long, env = "PDFQA_MODEL")]
    model: Option<String>,

    /// OpenAI-compatible endpoint base URL.
    #[arg(long, env = "PDFQA_BASE_URL")]
    base_url: Option<String>,

    /// Chunk window size in bytes.
    #[arg(long, env = "PDFQA_CHUNK_SIZE", default_value_t = 2000)]
    chunk_size: usize,

    /// Overlap between consecutive chunks in bytes.
    #[arg(long, env = "PDFQA_CHUNK_OVERLAP", default_value_t = 200)]
    chunk_overlap: usize,

    /// Top-scoring chunks sent as context per question.
    #[arg(short = 'k', long, env = "PDFQA_TOP_K", default_value_t = 3)]
    top_k: usize,

    /// Concurrent completion calls in per-question mode.
    #[arg(short, long, env = "PDFQA_CONCURRENCY", default_value_t = 5)]
    concurrency: usize,

    /// Sweep mode: one batched call per group of chunks instead of one call
    /// per question.
    #[arg(long, env = "PDFQA_SWEEP")]
    sweep: bool,

    /// Score chunks with embeddings + cosine instead of lexical similarity.
    #[arg(long, env = "PDFQA_EMBEDDINGS")]
    embeddings: bool,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDFQA_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Max LLM output tokens per call.
    #[arg(long, env = "PDFQA_MAX_TOKENS", default_value_t = 500)]
    max_tokens: u32,

    /// Retries per completion call on failure.
    #[arg(long, env = "PDFQA_MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    /// Output structured JSON (QaOutput) instead of plain answers.
    #[arg(long, env = "PDFQA_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFQA_VERBOSE")]
    verbose: bool,

    /// Suppress all output except answers and errors.
    #[arg(long, env = "PDFQA_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDFQA_DOWNLOAD_TIMEOUT", default_value_t = 60)]
    download_timeout: u64,

    /// Per completion/embedding call timeout in seconds.
    #[arg(long, env = "PDFQA_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Collect questions ────────────────────────────────────────────────
    let questions = collect_questions(&cli).await?;
    if questions.is_empty() {
        anyhow::bail!("No questions given. Use -q or --questions-file.");
    }

    let config = build_config(&cli)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = answer(&cli.input, &questions, &config)
        .await
        .context("Question answering failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        for (question, answer) in questions.iter().zip(&output.answers) {
            if questions.len() > 1 {
                writeln!(handle, "{}", bold(question)).context("Failed to write to stdout")?;
            }
            let line = if answer.is_empty() {
                red("(no answer)")
            } else {
                answer.clone()
            };
            writeln!(handle, "{line}").context("Failed to write to stdout")?;
        }
    }

    if !cli.quiet && !cli.json {
        let s = &output.stats;
        eprintln!(
            "{}  {}/{} answered  {}",
            if s.unanswered == 0 { green("✔") } else { red("⚠") },
            s.answered,
            s.total_questions,
            dim(&format!(
                "{} chunks, {} retries, {}ms total",
                output.metadata.chunk_count, s.total_retries, s.total_duration_ms
            )),
        );
    }

    Ok(())
}

/// Merge `-q` flags and `--questions-file` lines, flags first.
async fn collect_questions(cli: &Cli) -> Result<Vec<String>> {
    let mut questions = cli.questions.clone();

    if let Some(ref path) = cli.questions_file {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read questions from {:?}", path))?;
        questions.extend(content.lines().map(|l| l.trim().to_string()));
    }

    Ok(questions)
}

/// Map CLI args to `QaConfig`.
fn build_config(cli: &Cli) -> Result<QaConfig> {
    let mut builder = QaConfig::builder()
        .chunk_size(cli.chunk_size)
        .chunk_overlap(cli.chunk_overlap)
        .top_k(cli.top_k)
        .concurrency(cli.concurrency)
        .use_embeddings(cli.embeddings)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .max_retries(cli.max_retries)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout);

    if cli.sweep {
        builder = builder.mode(AnswerMode::Sweep);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url);
    }

    builder.build().context("Invalid configuration")
}
