//! CLI module - Command-line interface definitions and handlers

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use mdscope::cache::CacheKey;
use mdscope::core::config::Settings;
use mdscope::core::file_reader::{read_document, DocumentRead};
use mdscope::core::model::{filter_projects, Project};
use mdscope::core::output::{OutputConfig, OutputFormat, Printer};
use mdscope::core::paths::{make_relative, normalize_path};
use mdscope::core::tokenizer::{count_tokens, TokenBand, TokenModel};
use mdscope::markdown::terminal::to_ansi;
use mdscope::markdown::Renderer;
use mdscope::pins::{PinStore, PIN_STORE_FILE};
use mdscope::scan::{DirectoryScanner, ScanReport, ScanWorker};

/// Directory under $HOME holding the default config and pin store
const STATE_DIR: &str = ".mdscope";
const CONFIG_FILE: &str = "config.toml";

/// mdscope - find CLAUDE.md projects and read their documents.
#[derive(Parser, Debug)]
#[command(name = "mdscope")]
#[command(
    author,
    version,
    about,
    long_about = r#"mdscope walks your code folders, finds project roots (CLAUDE.md, a .claude
directory, or an ecosystem manifest) and lets you browse their markdown documents.

Project lists are printed in the selected format (default: jsonl).

Output formats:
- jsonl: one JSON object per line
- json: a single JSON array
- md: human-friendly Markdown
- raw: project paths only

Examples:
    mdscope scan --folder ~/code --depth 3
    mdscope scan --search api --format md
    mdscope docs ~/code/app
    mdscope pin ~/code/app --doc docs/guide.md
    mdscope show ~/code/app/CLAUDE.md --tokens cl100k
"#
)]
pub struct Cli {
    /// Settings file (TOML).
    #[arg(
        long,
        global = true,
        env = "MDSCOPE_CONFIG",
        value_name = "FILE",
        long_help = "Settings file in TOML format (scan_folders, scan_depth,\n\
scan_interval_minutes, exclude_patterns, follow_links).\n\n\
Defaults to ~/.mdscope/config.toml. A missing file means built-in defaults."
    )]
    pub config: Option<PathBuf>,

    /// Pin store file (JSON).
    #[arg(
        long,
        global = true,
        env = "MDSCOPE_PINS",
        value_name = "FILE",
        long_help = "Where pinned projects and documents are stored.\n\n\
Defaults to pins.json next to the settings file."
    )]
    pub pins: Option<PathBuf>,

    /// Output format (jsonl/json/md/raw).
    #[arg(long, global = true, default_value = "jsonl", value_name = "FORMAT")]
    pub format: String,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable colored output. This is useful when piping to files or when your\n\
terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (no logs, no summaries on stderr).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides applied on top of the settings file
#[derive(Args, Debug, Default, Clone)]
pub struct ScanArgs {
    /// Root folder to scan (repeatable; replaces scan_folders).
    #[arg(long = "folder", value_name = "DIR")]
    pub folders: Vec<PathBuf>,

    /// Maximum depth below each root folder.
    #[arg(long, value_name = "N")]
    pub depth: Option<usize>,

    /// Directory name to skip (repeatable; replaces exclude_patterns).
    #[arg(long = "exclude", value_name = "NAME")]
    pub excludes: Vec<String>,

    /// Follow symbolic links while scanning.
    #[arg(long)]
    pub follow_links: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan root folders and list discovered projects.
    #[command(long_about = "Scan the configured root folders and emit one record per project,\n\
pinned projects first, then by CLAUDE.md modification time (newest first).\n\n\
The number of projects without a CLAUDE.md is printed on stderr.\n\n\
Examples:\n\
  mdscope scan --folder ~/code\n\
  mdscope scan --exclude node_modules --exclude target --depth 4\n\
  mdscope scan --search \"payments\" --format md\n")]
    Scan {
        #[command(flatten)]
        scan: ScanArgs,

        /// Only projects whose name or CLAUDE.md contains QUERY (case-insensitive).
        #[arg(long, value_name = "QUERY")]
        search: Option<String>,
    },

    /// List the markdown documents of one project.
    Docs {
        /// Project root directory.
        #[arg(value_name = "PROJECT_DIR")]
        project: PathBuf,
    },

    /// Toggle a project pin, or a document pin with --doc.
    Pin {
        /// Project root directory.
        #[arg(value_name = "PROJECT_DIR")]
        project: PathBuf,

        /// Document to toggle (relative to the project unless absolute).
        #[arg(long, value_name = "FILE")]
        doc: Option<PathBuf>,
    },

    /// Render a markdown document to the terminal.
    #[command(long_about = "Render a markdown document with the built-in style: headings, lists,\n\
code blocks and inline code are coloured with true-colour ANSI.\n\n\
Examples:\n\
  mdscope show CLAUDE.md\n\
  mdscope show CLAUDE.md --json\n\
  mdscope show CLAUDE.md --tokens o200k\n")]
    Show {
        /// Markdown file to render.
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Emit styled runs as JSON instead of ANSI text.
        #[arg(long)]
        json: bool,

        /// Print a token count on stderr (quarter/cl100k/o200k).
        #[arg(long, value_name = "MODEL")]
        tokens: Option<String>,
    },

    /// Re-scan on the configured interval and print every new result.
    WatchScan {
        #[command(flatten)]
        scan: ScanArgs,

        /// Run a single pass through the worker and exit.
        #[arg(long)]
        once: bool,
    },
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info,ignore=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Shared state of one invocation
struct Invocation {
    output: OutputConfig,
    config_path: PathBuf,
    pins_path: PathBuf,
    color: bool,
    quiet: bool,
}

impl Invocation {
    fn from_cli(cli: &Cli) -> Self {
        let format: OutputFormat = cli.format.parse().unwrap_or_default();
        let config_path = cli.config.clone().unwrap_or_else(default_config_path);
        let pins_path = cli.pins.clone().unwrap_or_else(|| {
            config_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(PIN_STORE_FILE)
        });
        Self {
            output: OutputConfig::with_pretty(format, cli.pretty),
            config_path,
            pins_path,
            color: !cli.no_color,
            quiet: cli.quiet,
        }
    }

    fn settings(&self, args: &ScanArgs) -> Result<Settings> {
        let mut settings = Settings::load(&self.config_path)?;
        if !args.folders.is_empty() {
            settings.scan_folders = args.folders.clone();
        }
        if let Some(depth) = args.depth {
            settings.scan_depth = depth;
        }
        if !args.excludes.is_empty() {
            settings.exclude_patterns = args.excludes.clone();
        }
        if args.follow_links {
            settings.follow_links = true;
        }
        settings.validate()?;
        if settings.scan_folders.is_empty() {
            bail!("No scan folders configured. Pass --folder or set scan_folders in the settings file.");
        }
        Ok(settings)
    }

    fn pins(&self) -> Result<PinStore> {
        Ok(PinStore::load(&self.pins_path)?)
    }

    fn summary(&self, message: std::fmt::Arguments<'_>) {
        if !self.quiet {
            eprintln!("{}", message);
        }
    }
}

fn default_config_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STATE_DIR)
        .join(CONFIG_FILE)
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let ctx = Invocation::from_cli(&cli);
    match cli.command {
        Commands::Scan { scan, search } => run_scan(&ctx, &scan, search.as_deref()),
        Commands::Docs { project } => run_docs(&ctx, &project),
        Commands::Pin { project, doc } => run_pin(&ctx, &project, doc.as_deref()),
        Commands::Show { file, json, tokens } => run_show(&ctx, &file, json, tokens.as_deref()),
        Commands::WatchScan { scan, once } => run_watch_scan(&ctx, &scan, once),
    }
}

fn run_scan(ctx: &Invocation, args: &ScanArgs, search: Option<&str>) -> Result<()> {
    let settings = ctx.settings(args)?;
    let mut outcome = DirectoryScanner::new().scan(&settings.scan_config());
    ctx.pins()?.apply(&mut outcome.projects);

    let view = filter_projects(&outcome.projects, search.unwrap_or(""));
    Printer::new(ctx.output).render_to(&view, io::stdout().lock())?;

    ctx.summary(format_args!(
        "{} project(s), {} without CLAUDE.md",
        outcome.projects.len(),
        outcome.missing_marker_count()
    ));
    Ok(())
}

fn load_project(ctx: &Invocation, dir: &Path) -> Result<Project> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("Project directory not found: {}", dir.display()))?;
    let Some(mut project) = DirectoryScanner::new().project_at(&dir) else {
        bail!("Not a project directory: {}", dir.display());
    };
    ctx.pins()?.apply(std::slice::from_mut(&mut project));
    Ok(project)
}

fn run_docs(ctx: &Invocation, dir: &Path) -> Result<()> {
    let project = load_project(ctx, dir)?;
    let mut out = io::stdout().lock();

    let records: Vec<serde_json::Value> = project
        .sorted_docs()
        .into_iter()
        .map(|doc| {
            serde_json::json!({
                "path": doc,
                "pinned": project.pinned_docs.iter().any(|p| p == doc),
            })
        })
        .collect();

    match ctx.output.format {
        OutputFormat::Jsonl => {
            for record in &records {
                let line = if ctx.output.pretty {
                    serde_json::to_string_pretty(record)?
                } else {
                    serde_json::to_string(record)?
                };
                writeln!(out, "{}", line)?;
            }
        }
        OutputFormat::Json => {
            let json = if ctx.output.pretty {
                serde_json::to_string_pretty(&records)?
            } else {
                serde_json::to_string(&records)?
            };
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Markdown => {
            writeln!(out, "## {}", project.name)?;
            writeln!(out)?;
            for doc in project.sorted_docs() {
                let pin = if project.pinned_docs.iter().any(|p| p == doc) {
                    "📌 "
                } else {
                    ""
                };
                let rel = make_relative(doc, &project.path).unwrap_or_else(|| normalize_path(doc));
                writeln!(out, "- {}`{}`", pin, rel)?;
            }
        }
        OutputFormat::Raw => {
            for doc in project.sorted_docs() {
                writeln!(out, "{}", doc.display())?;
            }
        }
    }
    Ok(())
}

fn run_pin(ctx: &Invocation, dir: &Path, doc: Option<&Path>) -> Result<()> {
    let mut project = load_project(ctx, dir)?;
    let mut store = ctx.pins()?;

    let (target, pinned) = match doc {
        Some(doc) => {
            let doc = if doc.is_absolute() {
                doc.to_path_buf()
            } else {
                project.path.join(doc)
            };
            let was_pinned = project.pinned_docs.contains(&doc);
            if !was_pinned && !project.available_docs.contains(&doc) {
                bail!("Not a document of {}: {}", project.name, doc.display());
            }
            let pinned = project.toggle_doc_pin(&doc);
            store.record(&project);
            (doc, pinned)
        }
        None => {
            let pinned = store.toggle_project(&project.path);
            (project.path.clone(), pinned)
        }
    };

    store.save(&ctx.pins_path)?;
    let state = if pinned { "pinned" } else { "unpinned" };
    println!("{} {}", state, target.display());
    Ok(())
}

fn run_show(ctx: &Invocation, file: &Path, json: bool, tokens: Option<&str>) -> Result<()> {
    let content = match read_document(file) {
        DocumentRead::Present(content) => content,
        DocumentRead::Missing => bail!("File not found: {}", file.display()),
        DocumentRead::Unreadable { reason } => {
            bail!("Cannot read {}: {}", file.display(), reason)
        }
    };

    let renderer = Renderer::default();
    let doc = renderer.render(&content, Some(&CacheKey::for_file(file)));

    let mut out = io::stdout().lock();
    if json {
        let text = if ctx.output.pretty {
            serde_json::to_string_pretty(doc.as_ref())?
        } else {
            serde_json::to_string(doc.as_ref())?
        };
        writeln!(out, "{}", text)?;
    } else {
        write!(out, "{}", to_ansi(&doc, ctx.color))?;
    }

    if let Some(model) = tokens {
        let model: TokenModel = model
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        let count = count_tokens(&content, model);
        ctx.summary(format_args!(
            "{} tokens ({}, {:?})",
            count,
            model,
            TokenBand::for_tokens(count)
        ));
    }
    Ok(())
}

fn run_watch_scan(ctx: &Invocation, args: &ScanArgs, once: bool) -> Result<()> {
    let settings = ctx.settings(args)?;
    let config = settings.scan_config();

    let worker = if once {
        let worker = ScanWorker::spawn()?;
        worker.submit(config)?;
        worker
    } else {
        ctx.summary(format_args!(
            "Scanning every {} minute(s); Ctrl-C to stop",
            settings.scan_interval_minutes
        ));
        ScanWorker::spawn_periodic(config, settings.scan_interval())?
    };

    let mut latest: Option<ScanReport> = None;
    loop {
        let mut report = worker.recv()?;
        if !report.supersedes(latest.as_ref()) {
            continue;
        }

        // Pins may have changed between passes
        ctx.pins()?.apply(&mut report.outcome.projects);
        let view = filter_projects(&report.outcome.projects, "");
        Printer::new(ctx.output).render_to(&view, io::stdout().lock())?;
        ctx.summary(format_args!(
            "scan #{} at {}: {} project(s), {} without CLAUDE.md",
            report.ticket,
            report.finished_at.format("%H:%M:%S"),
            report.outcome.projects.len(),
            report.outcome.missing_marker_count()
        ));

        latest = Some(report);
        if once {
            break;
        }
    }

    worker.shutdown();
    Ok(())
}
