mod display;
mod fields;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use busmaint_core::{ChecklistKind, FormData, RecordStatus, search};
use busmaint_store::{FileBackend, FormReconciler, RecordStore, StoreError};
use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;

use crate::fields::{Answer, FieldArgs};

#[derive(Parser)]
#[command(name = "busmaint", version, about = "Bus maintenance and repair inspection records")]
struct Cli {
    /// Directory holding the record collection
    #[arg(long, global = true, env = "BUSMAINT_DATA_DIR", default_value = ".busmaint")]
    data_dir: PathBuf,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List records, optionally filtered by plate, technician, or type
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one record as a card
    Show { id: i64 },
    /// Create a new record
    New {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Edit general fields of an existing record
    Edit {
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Answer one checklist item on an existing record
    Check {
        id: i64,
        /// `checks` or `post-tests`
        list: ChecklistKind,
        /// Item key, see `busmaint items`
        key: String,
        #[arg(value_enum)]
        answer: Answer,
        /// Justification for a failed item
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark a record as completed
    Complete { id: i64 },
    /// Move a completed record back to pending
    Reopen { id: i64 },
    /// Delete every record
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
    /// List checklist item keys
    Items,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("busmaint v{}", env!("CARGO_PKG_VERSION"));
    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let backend = FileBackend::open(&cli.data_dir)
        .await
        .with_context(|| format!("opening data directory {}", cli.data_dir.display()))?;
    let store = RecordStore::new(Arc::new(backend));
    let reconciler = FormReconciler::new(store.clone());

    match cli.command {
        Command::List { search: term } => {
            let records = store.get_all_records().await;
            let shown = search::filter(&records, term.as_deref().unwrap_or(""));
            print!("{}", display::render_list(&shown));
        }
        Command::Show { id } => {
            let records = store.get_all_records().await;
            let record = records
                .iter()
                .find(|r| r.id == id)
                .ok_or(StoreError::NotFound(id))?;
            print!("{}", display::render_card(record));
        }
        Command::New { fields } => {
            let mut draft = reconciler.load_for_edit(None).await?;
            fields.apply(&mut draft);
            let saved = reconciler
                .save(&draft, None)
                .await
                .context("saving new record")?;
            println!("Created record {}", saved.id);
        }
        Command::Edit { id, fields } => {
            let mut draft = reconciler.load_for_edit(Some(id)).await?;
            fields.apply(&mut draft);
            save_edit(&reconciler, &draft, id).await?;
        }
        Command::Check {
            id,
            list,
            key,
            answer,
            notes,
        } => {
            let mut draft = reconciler.load_for_edit(Some(id)).await?;
            draft.set_check(list, &key, answer.status(), notes)?;
            save_edit(&reconciler, &draft, id).await?;
        }
        Command::Complete { id } => {
            reconciler.set_status(id, RecordStatus::Completed).await?;
            println!("Record {id} completed");
        }
        Command::Reopen { id } => {
            reconciler.set_status(id, RecordStatus::Pending).await?;
            println!("Record {id} reopened");
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to delete all records without --yes");
            }
            store.clear_records().await?;
            println!("All records deleted");
        }
        Command::Items => print!("{}", display::render_catalog()),
    }
    Ok(())
}

async fn save_edit(reconciler: &FormReconciler, draft: &FormData, id: i64) -> anyhow::Result<()> {
    reconciler
        .save(draft, Some(id))
        .await
        .with_context(|| format!("saving record {id}"))?;
    println!("Updated record {id}");
    warn_missing_notes(draft);
    Ok(())
}

fn warn_missing_notes(draft: &FormData) {
    for issue in draft.validate() {
        let label = issue.kind.spec(issue.key).map_or(issue.key, |s| s.label);
        eprintln!("warning: failed item has no notes: {label} ({})", issue.kind);
    }
}
