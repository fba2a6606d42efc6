//! `lanyard` — who has which access card.
//!
//! # Usage
//!
//! ```
//! lanyard seed
//! lanyard list --status out
//! lanyard sign-out 4 "Ana Petrova" --notes "escorting contractor"
//! lanyard return 4
//! lanyard export --out history.csv
//! ```
//!
//! The database path comes from `--db`, the `LANYARD_DB` environment
//! variable, or defaults to `cards.db` in the working directory.

mod output;

use std::{fs::File, io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use lanyard_core::{
  card::{CardStatus, NewCard},
  query::{CardFilter, HistoryFilter},
  store::CardStore,
};
use lanyard_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "lanyard", version, about = "Track who holds the office access cards")]
struct Cli {
  /// Path to the SQLite database file.
  #[arg(long, env = "LANYARD_DB", default_value = "cards.db", global = true)]
  db: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Register a new card.
  Add {
    /// Display label, e.g. "Visitor 3".
    label: String,
    /// Four-digit code printed on the card.
    #[arg(long)]
    code: Option<String>,
    /// Where the card lives when nobody has it.
    #[arg(long)]
    location: Option<String>,
  },
  /// Replace a card's label, code and home location.
  ///
  /// Options left out are cleared, not kept.
  Edit {
    id: i64,
    label: String,
    #[arg(long)]
    code: Option<String>,
    #[arg(long)]
    location: Option<String>,
  },
  /// Delete a card. Its history stays.
  Remove { id: i64 },
  /// Hand a card to someone.
  SignOut {
    id: i64,
    /// Who is taking the card.
    holder: String,
    /// Why, or anything worth remembering.
    #[arg(long)]
    notes: Option<String>,
  },
  /// Take a card back.
  Return { id: i64 },
  /// Flag a card as lost, keeping the last borrower visible.
  MarkLost { id: i64 },
  /// Put a lost card back in circulation.
  MarkFound { id: i64 },
  /// List cards, naturally sorted by label.
  List {
    /// Match against label, holder, notes, code and home location.
    #[arg(short, long)]
    search: Option<String>,
    /// Only cards in this status: available, out or lost.
    #[arg(long)]
    status: Option<String>,
    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
  },
  /// Show sign-out history, newest first.
  History {
    /// Only records whose card label matches.
    #[arg(long)]
    card: Option<String>,
    /// Only records whose holder matches.
    #[arg(long)]
    holder: Option<String>,
    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
  },
  /// Write history as CSV, to stdout or a file.
  Export {
    /// Only records whose card label matches.
    #[arg(long)]
    card: Option<String>,
    /// Only records whose holder matches.
    #[arg(long)]
    holder: Option<String>,
    /// Write to this file instead of stdout.
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
  },
  /// Load the built-in card catalog, skipping cards that already exist.
  Seed,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
  // Logs go to stderr so tables and CSV on stdout stay clean.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  let mut store = SqliteStore::open(&cli.db)
    .with_context(|| format!("opening card database {}", cli.db.display()))?;

  match cli.command {
    Command::Add { label, code, location } => {
      let card =
        store.add_card(NewCard::new(&label, code.as_deref(), location.as_deref())?)?;
      println!("{} added {} (id {})", "✓".green(), card.label, card.id);
    }

    Command::Edit { id, label, code, location } => {
      let card =
        store.edit_card(id, NewCard::new(&label, code.as_deref(), location.as_deref())?)?;
      println!("{} updated {} (id {})", "✓".green(), card.label, card.id);
    }

    Command::Remove { id } => {
      store.remove_card(id)?;
      println!("{} removed card {id}", "✓".green());
    }

    Command::SignOut { id, holder, notes } => {
      let card = store.sign_out(id, &holder, notes.as_deref())?;
      println!(
        "{} {} signed out to {}",
        "✓".green(),
        card.label,
        card.holder.as_deref().unwrap_or("?"),
      );
    }

    Command::Return { id } => {
      let card = store.return_card(id)?;
      println!("{} {} returned", "✓".green(), card.label);
    }

    Command::MarkLost { id } => {
      let card = store.mark_lost(id)?;
      println!("{} {} marked lost", "✓".green(), card.label);
    }

    Command::MarkFound { id } => {
      let card = store.mark_found(id)?;
      println!("{} {} back in circulation", "✓".green(), card.label);
    }

    Command::List { search, status, json } => {
      let status = status.map(|s| s.parse::<CardStatus>()).transpose()?;
      let cards = store.list_cards(&CardFilter { search, status })?;
      if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
      } else if cards.is_empty() && store.is_first_run()? {
        eprintln!(
          "No cards yet. Run `lanyard seed` to load the preset catalog, or `lanyard add`."
        );
      } else {
        output::print_cards(&cards);
      }
    }

    Command::History { card, holder, json } => {
      let records = store.list_history(&HistoryFilter { card, holder })?;
      if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
      } else {
        output::print_history(&records);
      }
    }

    Command::Export { card, holder, out } => {
      let records = store.list_history(&HistoryFilter { card, holder })?;
      match out {
        Some(path) => {
          let file =
            File::create(&path).with_context(|| format!("creating {}", path.display()))?;
          output::write_history_csv(file, &records)?;
          println!(
            "{} wrote {} records to {}",
            "✓".green(),
            records.len(),
            path.display(),
          );
        }
        None => output::write_history_csv(io::stdout().lock(), &records)?,
      }
    }

    Command::Seed => {
      let inserted = store.seed_defaults()?;
      if inserted == 0 {
        println!("Catalog already loaded; nothing to do.");
      } else {
        println!("{} seeded {inserted} cards", "✓".green());
      }
    }
  }

  Ok(())
}
