use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vault_capture::capture::{
    rank, CaptureSession, Collaborators, DefaultsStore, LinkDetector, NoteIndex,
    NoteWriter, SelectionReader,
};
use vault_capture::config::CaptureConfig;
use vault_capture::db::Database;
use vault_capture::error::CaptureError;
use vault_capture::fetch::{HttpContentFetcher, HttpSummarizer};
use vault_capture::models::{SourceLink, Vault};
use vault_capture::platform::{
    AppleScriptLinkDetector, AppleScriptSelection, DryRunWriter, FixedLink, FixedSelection,
    TerminalNotifier, UriOpener,
};
use vault_capture::{index, vaults};

#[derive(Parser)]
#[command(name = "vcap")]
#[command(about = "Capture highlights, links and page contents into an Obsidian vault")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture the current selection and browser tab into a note
    Capture(CaptureArgs),
    /// Rank existing notes whose title matches a query
    Search {
        query: String,

        /// Vault to search (defaults to the last used vault)
        #[arg(short, long)]
        vault: Option<String>,
    },
    /// Rebuild the note index cache
    Index {
        /// Only index this vault
        #[arg(short, long)]
        vault: Option<String>,
    },
    /// List known vaults
    Vaults,
}

#[derive(Args)]
struct CaptureArgs {
    /// Note title (file name without extension)
    #[arg(short, long)]
    title: String,

    /// Vault to write to (defaults to the last used vault)
    #[arg(short, long)]
    vault: Option<String>,

    /// Folder relative to the vault root (defaults to the last used folder)
    #[arg(short, long)]
    folder: Option<String>,

    /// Free-text note to add
    #[arg(short, long)]
    note: Option<String>,

    /// Use this text as the highlight instead of reading the selection
    #[arg(long)]
    highlight: Option<String>,

    /// Use this URL as the source instead of reading the browser
    #[arg(long)]
    url: Option<String>,

    /// Display title for --url
    #[arg(long, requires = "url")]
    label: Option<String>,

    /// Leave the highlight out of the note
    #[arg(long)]
    no_highlight: bool,

    /// Include the fetched page content or video transcript
    #[arg(long)]
    include_page: bool,

    /// Include an AI summary of the page
    #[arg(long)]
    include_summary: bool,

    /// Write into the Nth ranked existing note instead of using --folder/--title
    #[arg(long, value_name = "N")]
    pick: Option<usize>,

    /// Skip selection and browser detection
    #[arg(long)]
    no_detect: bool,

    /// Print the write URI instead of opening it
    #[arg(long)]
    dry_run: bool,
}

/// Initialize tracing on stderr so stdout only carries command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "vault_capture=info,vcap=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = CaptureConfig::load();
    let db = Database::open_default()?;
    db.migrate()?;

    match cli.command {
        Commands::Capture(args) => run_capture(args, &config, db).await?,
        Commands::Search { query, vault } => {
            let known = load_vaults(&config);
            let vault = choose_vault(&known, vault.as_deref(), &db)?;
            let notes = db.notes(&vault);
            if notes.is_empty() {
                tracing::warn!("No cached notes for {}, run `vcap index` first", vault.name);
            }
            for (i, note) in rank(&query, &notes).iter().enumerate() {
                println!("{:>2}. {}  ({})", i + 1, note.title, note.path);
            }
        }
        Commands::Index { vault } => {
            let known = load_vaults(&config);
            let selected: Vec<&Vault> = known
                .iter()
                .filter(|v| vault.as_deref().map_or(true, |name| v.name == name))
                .collect();
            if selected.is_empty() {
                bail!("No matching vault found");
            }
            for v in selected {
                let count = index::refresh(&db, v)?;
                println!("{}: {} notes", v.name, count);
            }
        }
        Commands::Vaults => {
            for v in load_vaults(&config) {
                let plugin = if v.has_advanced_uri {
                    "advanced-uri"
                } else {
                    "no advanced-uri"
                };
                let indexed = match db.get_index_run(&v.name)? {
                    Some(run) => format!(
                        "{} notes, indexed {}",
                        run.note_count,
                        run.indexed_at.format("%Y-%m-%d %H:%M")
                    ),
                    None => "not indexed".to_string(),
                };
                println!("{}\t{}\t{}\t{}", v.name, v.root_path.display(), plugin, indexed);
            }
        }
    }

    Ok(())
}

fn load_vaults(config: &CaptureConfig) -> Vec<Vault> {
    match config.obsidian_config_path() {
        Some(path) => vaults::discover(&path),
        None => {
            tracing::warn!("Could not determine Obsidian config location");
            Vec::new()
        }
    }
}

fn choose_vault(known: &[Vault], name: Option<&str>, db: &Database) -> anyhow::Result<Vault> {
    let saved = db.load_defaults()?.vault;
    let wanted = name.map(str::to_string).or(saved);
    wanted
        .and_then(|name| known.iter().find(|v| v.name == name))
        .or_else(|| known.first())
        .cloned()
        .context("No Obsidian vaults found")
}

async fn run_capture(
    args: CaptureArgs,
    config: &CaptureConfig,
    db: Database,
) -> anyhow::Result<()> {
    let db = Arc::new(db);

    let links: Arc<dyn LinkDetector> = if args.no_detect || args.url.is_some() {
        let link = args
            .url
            .clone()
            .map(|url| SourceLink::new(url, args.label.clone()));
        Arc::new(FixedLink(link))
    } else {
        Arc::new(AppleScriptLinkDetector)
    };
    let selection: Arc<dyn SelectionReader> = if args.no_detect || args.highlight.is_some() {
        Arc::new(FixedSelection(args.highlight.clone()))
    } else {
        Arc::new(AppleScriptSelection)
    };
    let writer: Arc<dyn NoteWriter> = if args.dry_run {
        Arc::new(DryRunWriter::default())
    } else {
        Arc::new(UriOpener)
    };

    let collaborators = Collaborators {
        links,
        selection,
        fetcher: Arc::new(HttpContentFetcher::new()?),
        summarizer: Arc::new(HttpSummarizer::new(config.summary.clone())),
        writer,
        notifier: Arc::new(TerminalNotifier),
        index: db.clone(),
        defaults: db.clone(),
    };

    let mut session =
        match CaptureSession::new(collaborators, load_vaults(config), config.preferences()) {
            Ok(session) => session,
            Err(CaptureError::NoVaults) => {
                eprintln!("No Obsidian vaults found. Open a folder as a vault in Obsidian first.");
                bail!(CaptureError::NoVaults);
            }
            Err(CaptureError::PluginMissing) => {
                eprintln!(
                    "Captures are written through the Advanced URI plugin. \
                     Install and enable \"{}\" in at least one vault.",
                    vaults::ADVANCED_URI_PLUGIN
                );
                bail!(CaptureError::PluginMissing);
            }
            Err(e) => return Err(e.into()),
        };

    session.initialize().await;

    if let Some(name) = args.vault.as_deref() {
        let vault = session
            .eligible_vaults()
            .find(|v| v.name == name)
            .cloned()
            .with_context(|| format!("Vault {} not found or missing the Advanced URI plugin", name))?;
        session.draft_mut().vault = Some(vault);
    }
    if let Some(folder) = args.folder {
        session.draft_mut().folder = folder;
    }

    {
        let draft = session.draft_mut();
        draft.note_text = args.note;
        draft.include_highlight = !args.no_highlight;
        draft.include_page_body = args.include_page;
    }
    if args.include_page && session.page_option_label().is_none() {
        tracing::warn!("No page content was fetched, skipping it");
    }

    let candidates = session.set_file_name(&args.title).to_vec();
    if let Some(n) = args.pick {
        let note = n
            .checked_sub(1)
            .and_then(|i| candidates.get(i))
            .with_context(|| format!("No candidate #{} for {:?}", n, args.title))?;
        session.select_candidate(note);
    }

    if args.include_summary {
        if session.summary_available() {
            session.set_include_summary(true).await;
        } else {
            tracing::warn!("Summary unavailable: needs page content and a summary API key");
        }
    }

    let outcome = session.submit(chrono::Local::now().naive_local()).await?;
    if !args.dry_run {
        println!(
            "{} {}",
            if outcome.destination.append {
                "Appended to"
            } else {
                "Created"
            },
            outcome.destination.absolute_path.display()
        );
    }
    Ok(())
}
