//! Binary entry point for the subtitle normalizer.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use subnorm_core::api::{self, OutputFormat};
use subnorm_core::{cleanup, convert, cue, playlist, read_cues, SourceFormat};
use tracing::{info, trace};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Command line options for the binary.
#[derive(Parser)]
#[command(name = "subnorm", version, about = "Normalize TTML, WebVTT and SRT subtitles to clean SRT")]
struct Cli {
    /// Enable verbose debug and trace logs.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a TTML, WebVTT or SRT file to normalized SRT.
    Convert {
        /// Subtitle file to read.
        input: PathBuf,

        /// Source format; guessed from the file name, then the content, when omitted.
        #[arg(long)]
        from: Option<SourceFormat>,

        /// Where to write the result instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit the cues as JSON instead of SRT.
        #[arg(long)]
        json: bool,
    },
    /// Strip formatting residue and duplicate entries from an SRT file.
    Clean {
        /// SRT file to clean, e.g. closed captions dumped by a demuxer.
        input: PathBuf,

        /// Where to write the result instead of stdout.
        #[arg(short, long, conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Overwrite the input file.
        #[arg(long)]
        in_place: bool,
    },
    /// Extract subtitles from a saved subtitles API JSON response.
    Response {
        /// JSON response file to read.
        input: PathBuf,

        /// `srt` to convert, `ttml` to keep the embedded document as is.
        #[arg(long, default_value_t = OutputFormat::Srt)]
        format: OutputFormat,

        /// Where to write the result instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the subtitle tracks of a downloaded HLS master playlist as JSON.
    Tracks {
        /// Playlist file to read.
        playlist: PathBuf,

        /// URL the playlist was fetched from, used to resolve relative URIs.
        #[arg(long)]
        base_url: Url,

        /// Only print the best track for this language tag.
        #[arg(long)]
        language: Option<String>,

        /// Where to write the result instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Application entry point which parses CLI args and performs actions.
/// This function should initialize logging and delegate to the core library.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.debug {
        EnvFilter::default()
            .add_directive("subnorm=trace".parse()?)
            .add_directive("subnorm_core=trace".parse()?)
            .add_directive("info".parse()?)
    } else {
        EnvFilter::default()
            .add_directive("subnorm=info".parse()?)
            .add_directive("subnorm_core=info".parse()?)
            .add_directive("warn".parse()?)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    run(cli.command)
}

/// Execute one subcommand.
fn run(command: Command) -> Result<()> {
    match command {
        Command::Convert {
            input,
            from,
            output,
            json,
        } => {
            let content = read(&input)?;
            let format = resolve_format(&input, &content, from)?;
            info!("converting {} as {format}", input.display());
            let text = if json {
                cue::to_json(&read_cues(&content, format)?)?
            } else {
                convert(&content, format)?
            };
            emit(&text, output.as_deref())
        }
        Command::Clean {
            input,
            output,
            in_place,
        } => {
            let content = read(&input)?;
            let cleaned = cleanup::clean_srt_document(&content)?;
            let target = if in_place { Some(input.as_path()) } else { output.as_deref() };
            emit(&cleaned, target)
        }
        Command::Response {
            input,
            format,
            output,
        } => {
            let content = read(&input)?;
            info!("extracting {format} subtitles from {}", input.display());
            let text = api::render_response(&content, format)?;
            emit(&text, output.as_deref())
        }
        Command::Tracks {
            playlist: path,
            base_url,
            language,
            output,
        } => {
            let content = read(&path)?;
            let tracks = playlist::subtitle_tracks(&content, &base_url);
            info!("found {} subtitle tracks", tracks.len());
            let text = match language {
                Some(lang) => {
                    let track = playlist::find_language(&tracks, &lang)
                        .ok_or_else(|| anyhow!("no subtitle track for language {lang}"))?;
                    serde_json::to_string_pretty(track)?
                }
                None => serde_json::to_string_pretty(&tracks)?,
            };
            emit(&text, output.as_deref())
        }
    }
}

/// Decide the source format: explicit flag, then file name, then content.
fn resolve_format(path: &Path, content: &str, explicit: Option<SourceFormat>) -> Result<SourceFormat> {
    trace!("resolve_format(path={})", path.display());
    explicit
        .or_else(|| SourceFormat::from_path_hint(&path.to_string_lossy()))
        .or_else(|| SourceFormat::sniff(content))
        .ok_or_else(|| anyhow!("cannot tell the subtitle format of {}; pass --from", path.display()))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Write `text` to `path`, or to stdout when no path is given.
fn emit(text: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            info!("writing output to {}", path.display());
            fs::write(path, format!("{text}\n"))
                .with_context(|| format!("writing {}", path.display()))
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
