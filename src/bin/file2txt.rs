//! CLI binary for file2txt.
//!
//! `file2txt serve` starts the web UI; `file2txt convert FILE` runs one
//! conversion and writes the `.txt` outputs next to each other.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use file2txt::session::{run_request, ConversionRequest, Dispatch, PdfMode, SessionState};
use file2txt::web::{self, DEFAULT_MAX_UPLOAD_BYTES};
use file2txt::{ConversionConfig, ConversionProgressCallback, NoopProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar for OCR runs.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("OCR");
        self.bar.reset_eta();
    }

    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, _page_num: usize, _total_pages: usize, _text_len: usize) {
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, _total_pages: usize) {
        self.bar.finish_and_clear();
    }
}

impl Drop for CliProgressCallback {
    fn drop(&mut self) {
        // Conversions that fail before the first page never finish the bar.
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

/// Convert EPUB and PDF documents to plain text.
#[derive(Parser, Debug)]
#[command(
    name = "file2txt",
    version,
    about = "Convert EPUB and PDF documents to plain text (web UI or one-shot)",
    color = clap::ColorChoice::Auto
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory containing the pdfium shared library.
    #[arg(long, global = true, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Tesseract executable.
    #[arg(long, global = true, env = "FILE2TXT_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Tesseract language set.
    #[arg(long, global = true, env = "FILE2TXT_OCR_LANG", default_value = "chi_sim+eng")]
    ocr_lang: String,

    /// OCR rasterisation DPI (72–600).
    #[arg(long, global = true, env = "FILE2TXT_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "FILE2TXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "FILE2TXT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the web UI.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "FILE2TXT_HOST", default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to listen on.
        #[arg(short, long, env = "FILE2TXT_PORT", default_value_t = 8501)]
        port: u16,

        /// Largest accepted upload, in MiB.
        #[arg(long, env = "FILE2TXT_MAX_UPLOAD_MB", default_value_t = (DEFAULT_MAX_UPLOAD_BYTES / (1024 * 1024)) as u64)]
        max_upload_mb: u64,
    },

    /// Convert one file and write the .txt outputs.
    Convert {
        /// `.epub` or `.pdf` file.
        input: PathBuf,

        /// OCR a PDF instead of reading its text layer.
        #[arg(long)]
        ocr: bool,

        /// With --ocr, also write the text-layer extraction.
        #[arg(long, requires = "ocr")]
        extra_text: bool,

        /// Directory for the outputs. Default: next to the input.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Also print the extracted TOC to stderr.
        #[arg(long)]
        show_toc: bool,

        /// Disable the progress bar.
        #[arg(long, env = "FILE2TXT_NO_PROGRESS")]
        no_progress: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    match cli.command {
        Command::Serve {
            host,
            port,
            max_upload_mb,
        } => {
            let addr = SocketAddr::new(host, port);
            let limit = usize::try_from(max_upload_mb.saturating_mul(1024 * 1024))
                .unwrap_or(usize::MAX);
            if !cli.quiet {
                eprintln!("{} {}", green("◆"), bold(&format!("file2txt on http://{addr}")));
            }
            web::serve(addr, config, limit)
                .await
                .with_context(|| format!("Server on {addr} failed"))?;
        }
        Command::Convert {
            ref input,
            ocr,
            extra_text,
            ref output_dir,
            show_toc,
            no_progress,
        } => {
            let show_progress = ocr && !no_progress && !cli.quiet;
            let input = input.clone();
            let output_dir = output_dir.clone();
            let quiet = cli.quiet;

            // Conversions block; keep them off the async worker threads.
            tokio::task::spawn_blocking(move || {
                convert_one(
                    &input,
                    &config,
                    ConvertOptions {
                        ocr,
                        extra_text,
                        output_dir: output_dir.as_deref(),
                        show_toc,
                        show_progress,
                        quiet,
                    },
                )
            })
            .await
            .context("Conversion task panicked")??;
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .ocr_dpi(cli.dpi)
        .ocr_languages(cli.ocr_lang.clone())
        .tesseract_cmd(cli.tesseract.clone());
    if let Some(ref dir) = cli.pdfium_lib {
        builder = builder.pdfium_lib_dir(dir.clone());
    }
    builder.build().context("Invalid configuration")
}

struct ConvertOptions<'a> {
    ocr: bool,
    extra_text: bool,
    output_dir: Option<&'a Path>,
    show_toc: bool,
    show_progress: bool,
    quiet: bool,
}

fn convert_one(input: &Path, config: &ConversionConfig, opts: ConvertOptions<'_>) -> Result<()> {
    let bytes = std::fs::read(input).with_context(|| format!("Failed to read {:?}", input))?;
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Input has no UTF-8 file name: {:?}", input))?
        .to_string();

    let request = ConversionRequest {
        file_name,
        bytes,
        pdf_mode: if opts.ocr { PdfMode::Ocr } else { PdfMode::Text },
        extra_text: opts.extra_text,
    };

    let dispatch = if opts.show_progress {
        let cb = CliProgressCallback::new();
        run_request(&request, config, &cb)
    } else {
        run_request(&request, config, &NoopProgressCallback)
    };

    let mut state = SessionState::default();
    if dispatch == Dispatch::Unsupported {
        bail!("{}", yellow(file2txt::session::UNSUPPORTED_FILE_WARNING));
    }
    state.record(dispatch);

    if opts.show_toc {
        if let Some(ref toc) = state.toc {
            eprint!("{toc}");
        }
    }

    let dir = match opts.output_dir {
        Some(d) => d.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;

    let Some((name, text)) = state.primary_download() else {
        bail!("No text was extracted from {:?}", input);
    };
    let primary = dir.join(&name);
    write_output(&primary, text)?;
    if !opts.quiet {
        eprintln!("{} {}", green("✔"), bold(&primary.display().to_string()));
    }

    if let Some((name, text)) = state.secondary_download() {
        let secondary = dir.join(&name);
        write_output(&secondary, text)?;
        if !opts.quiet {
            eprintln!("{} {}", green("✔"), bold(&secondary.display().to_string()));
        }
    }

    Ok(())
}

/// Atomic write: temp file in the same directory, then rename.
fn write_output(path: &Path, text: &str) -> Result<()> {
    let tmp_path = path.with_extension("txt.tmp");
    std::fs::write(&tmp_path, text.as_bytes())
        .with_context(|| format!("Failed to write output file {:?}", tmp_path))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to write output file {:?}", path))?;
    Ok(())
}
