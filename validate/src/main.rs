//! Offline inspector for mapping and config INI files.
//!
//! Lets a user check what the engine would see before loading a save:
//! which save contexts exist, how their records parse under strict or
//! relaxed rules, whether the file survives a round-trip untouched, and
//! the allocator offset a context would produce.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;
use upkeep_core::config::config_from_document;
use upkeep_core::forms::FormAllocator;
use upkeep_core::ini::IniDocument;
use upkeep_core::mapping::MappingStore;

#[derive(Parser)]
#[command(version, about = "Inspect maintained-spell mapping files")]
struct Cli {
    /// Path to the INI file
    #[arg(short, long)]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the save contexts present in the file
    Saves,
    /// Dump the parsed records for one save context
    Entries {
        save: String,
        /// Emit records as JSON
        #[arg(long)]
        json: bool,
        /// Default malformed identities to null instead of rejecting
        #[arg(long)]
        relaxed: bool,
    },
    /// Parse and re-render the file, confirming it round-trips unchanged
    Check,
    /// Show the allocator offset a save context would load with
    Offset { save: String },
    /// Show the engine configuration the file would produce
    Config,
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let store = MappingStore::open(&cli.file).map_err(|e| e.to_string())?;

    match &cli.command {
        Commands::Saves => {
            for save in store.saves() {
                println!("{save}");
            }
        }
        Commands::Entries {
            save,
            json,
            relaxed,
        } => {
            let (entries, errors) = store.scan(save, !relaxed);
            for err in &errors {
                eprintln!("bad record: {err}");
            }
            if *json {
                let out = serde_json::to_string_pretty(&entries).map_err(|e| e.to_string())?;
                println!("{out}");
            } else {
                for entry in &entries {
                    let label = entry.label.as_deref().unwrap_or("?");
                    let cost = entry
                        .cost
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{}  {} / {}  cost {}  ({})",
                        entry.key, entry.maintained, entry.debuff, cost, label
                    );
                }
            }
            if !errors.is_empty() {
                return Err(format!("{} malformed record(s)", errors.len()));
            }
        }
        Commands::Check => {
            let raw = std::fs::read_to_string(&cli.file).map_err(|e| e.to_string())?;
            let doc = IniDocument::parse(&raw).map_err(|e| e.to_string())?;
            if doc.render() == raw {
                println!("ok: file round-trips unchanged");
            } else {
                return Err("render does not match the input file".to_string());
            }
        }
        Commands::Offset { save } => {
            let ids = store.persisted_ids(save);
            let mut forms = FormAllocator::new();
            forms.load_offset(ids.iter().copied());
            println!("{} persisted id(s), offset 0x{:08X}", ids.len(), forms.offset());
        }
        Commands::Config => {
            let config = config_from_document(store.document());
            println!("LogLevel     = {}", config.log_level.as_str());
            println!("bSilenceFX   = {}", config.silence_fx);
            println!("bStrictParse = {}", config.strict_parse);
            println!("bStrictAudit = {}", config.strict_audit);
        }
    }
    Ok(())
}
