use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use pyscope_tagger::{read_source_lines, Cursor, ScopeFinder, StatusLine, Tag};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

mod config;
mod report;

use config::{load_config, ConfigOverrides};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "pyscope")]
#[command(about = "Which class or function is this line in?", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Tagger config file (JSON or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tab stop width for visual indentation
    #[arg(long, global = true)]
    tab_width: Option<usize>,

    /// Measure indentation by display column instead of character count
    #[arg(long, global = true)]
    visual_indent: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every class, method and function in a file
    Tags(TagsArgs),

    /// Print the tag enclosing a line of a file
    At(AtArgs),

    /// Serve editor events (JSON lines on stdin) against a shared tag cache
    Session,
}

#[derive(Args)]
struct TagsArgs {
    /// Python source file
    file: PathBuf,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AtArgs {
    /// Python source file
    file: PathBuf,

    /// Cursor line (1-indexed)
    #[arg(short, long)]
    line: usize,

    /// Cursor column (1-indexed, informational)
    #[arg(short, long, default_value_t = 1)]
    column: usize,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct AtOutput<'a> {
    file: &'a Path,
    cursor: Cursor,
    status: StatusLine,
    tag: Option<Tag>,
}

/// One editor event read by `pyscope session`
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", deny_unknown_fields)]
enum SessionEvent {
    /// Cursor moved in a buffer whose text is in `path`
    Cursor {
        buffer: u64,
        tick: u64,
        path: PathBuf,
        line: usize,
        #[serde(default = "default_column")]
        column: usize,
    },
    /// Buffer closed: drop its cached tags
    Close { buffer: u64 },
}

const fn default_column() -> usize {
    1
}

#[derive(Serialize)]
struct SessionReply {
    buffer: u64,
    status: StatusLine,
}

pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let json_output = match &cli.command {
        Commands::Tags(args) => args.json,
        Commands::At(args) => args.json,
        Commands::Session => true,
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.quiet || json_output {
        builder.filter_level(log::LevelFilter::Error);
    }
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = load_config(
        cli.config.as_deref(),
        ConfigOverrides {
            tab_width: cli.tab_width,
            visual_indent: cli.visual_indent,
        },
    )?;
    let mut finder: ScopeFinder<u64> =
        ScopeFinder::new(config).context("Failed to set up tagger")?;

    match cli.command {
        Commands::Tags(args) => run_tags(&mut finder, &args),
        Commands::At(args) => run_at(&mut finder, &args),
        Commands::Session => run_session(&mut finder, io::stdin().lock()),
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    read_source_lines(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn run_tags(finder: &mut ScopeFinder<u64>, args: &TagsArgs) -> Result<()> {
    let lines = read_lines(&args.file)?;
    let index = finder.get_or_build_tags(0, 0, &lines);

    if args.json {
        let tags: Vec<&Tag> = index.iter().collect();
        print_stdout(&serde_json::to_string_pretty(&tags)?)
    } else {
        print_stdout(report::render_outline(&index).trim_end())
    }
}

fn run_at(finder: &mut ScopeFinder<u64>, args: &AtArgs) -> Result<()> {
    let lines = read_lines(&args.file)?;
    let cursor = Cursor::new(args.line, args.column);
    let tag = finder.find_tag(0, 0, &lines, cursor);
    let status = StatusLine::from_tag(tag.as_ref());

    if args.json {
        let output = AtOutput {
            file: &args.file,
            cursor,
            status,
            tag,
        };
        print_stdout(&serde_json::to_string_pretty(&output)?)
    } else {
        print_stdout(&status.combined)
    }
}

fn run_session(finder: &mut ScopeFinder<u64>, input: impl BufRead) -> Result<()> {
    for (idx, line) in input.lines().enumerate() {
        let line = line.context("Failed to read event")?;
        if line.trim().is_empty() {
            continue;
        }

        let event: SessionEvent = serde_json::from_str(&line)
            .with_context(|| format!("Invalid event on line {}", idx + 1))?;
        log::debug!("session event {event:?}");

        match event {
            SessionEvent::Cursor {
                buffer,
                tick,
                path,
                line: cursor_line,
                column,
            } => {
                let lines = read_lines(&path)?;
                let cursor = Cursor::new(cursor_line, column);
                let status = finder.status_line(buffer, tick, &lines, cursor);
                print_stdout(&serde_json::to_string(&SessionReply { buffer, status })?)?;
            }
            SessionEvent::Close { buffer } => finder.evict(&buffer),
        }
    }

    let stats = finder.cache_stats();
    log::debug!(
        "session done: {} hits, {} rebuilds, {} evictions",
        stats.hits,
        stats.rebuilds,
        stats.evictions
    );
    Ok(())
}
