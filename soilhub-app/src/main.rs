//! soilhub CLI - inspect crop filter state and farm field boundaries.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use soilhub::data::geojson;
use soilhub::{FieldRegistry, FilterStateStore, FilterValue, HttpFieldRemote, ServicesBuilder};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "soilhub", version, about = "CAAIN Soil Hub client state toolkit")]
struct Cli {
    /// Directory holding the persisted filter state
    #[arg(long, global = true, default_value = ".soilhub")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the geodesic area of a boundary GeoJSON file
    Area {
        /// Polygon/Rectangle geometry or a Feature wrapping one
        file: PathBuf,
    },

    /// Inspect or change the active crop filters
    Filters {
        #[command(subcommand)]
        action: FiltersAction,
    },

    /// Manage labeled filter snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// Fields stored on the fields service
    Fields {
        #[command(subcommand)]
        action: FieldsAction,
    },
}

#[derive(Subcommand)]
enum FiltersAction {
    /// Print the active filters as JSON
    Show,
    /// Set one filter from a JSON value, e.g. '["wheat"]' or '{"min":6,"max":7}'
    Set { key: String, value: String },
    /// Remove one filter
    Remove { key: String },
    /// Clear every filter
    Reset,
    /// Write the filter configuration envelope to stdout
    Export,
    /// Replace the filters with an exported configuration file
    Import { file: PathBuf },
    /// Print the active filters as CSV
    Csv,
}

#[derive(Subcommand)]
enum SnapshotAction {
    Save {
        label: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    Load {
        label: String,
    },
    Delete {
        label: String,
    },
    List,
}

#[derive(Subcommand)]
enum FieldsAction {
    /// List stored fields with their recomputed areas
    List {
        /// Base URL of the fields service
        #[arg(long)]
        api: String,
    },
    /// Export stored fields as CSV
    Export {
        #[arg(long)]
        api: String,
        /// Output path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Area { file } => run_area(&file),
        Command::Filters { action } => run_filters(&cli.state_dir, action),
        Command::Snapshot { action } => run_snapshot(&cli.state_dir, action),
        Command::Fields { action } => run_fields(action).await,
    }
}

fn open_store(state_dir: &Path) -> anyhow::Result<FilterStateStore> {
    let services = ServicesBuilder::new()
        .with_state_dir(state_dir)
        .build()
        .context("could not set up filter state")?;
    Ok(services.filters)
}

fn run_area(file: &Path) -> anyhow::Result<()> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("could not read {}", file.display()))?;
    let boundary = geojson::from_json_str(&json)?;
    let Some(area) = FieldRegistry::calculate_area(&boundary) else {
        bail!("{} encloses no area", file.display());
    };

    println!("{:.0} m²", area.square_meters);
    println!("{:.2} ha", area.hectares);
    println!("{:.2} acres", area.acres);
    Ok(())
}

fn run_filters(state_dir: &Path, action: FiltersAction) -> anyhow::Result<()> {
    let mut store = open_store(state_dir)?;

    match action {
        FiltersAction::Show => {
            println!("{}", serde_json::to_string_pretty(store.current())?);
        }
        FiltersAction::Set { key, value } => {
            let value: FilterValue = serde_json::from_str(&value)
                .with_context(|| format!("{:?} is not a filter value", value))?;
            store.set_filter(key.as_str(), value);
            println!("{}", serde_json::to_string_pretty(store.current())?);
        }
        FiltersAction::Remove { key } => {
            if !store.remove_filter(&key) {
                bail!("no filter named {:?}", key);
            }
        }
        FiltersAction::Reset => store.reset(),
        FiltersAction::Export => println!("{}", store.export_configuration()?),
        FiltersAction::Import { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("could not read {}", file.display()))?;
            for warning in store.import_configuration(&json)? {
                log::warn!("{:?}", warning);
            }
        }
        FiltersAction::Csv => print!("{}", store.summary_csv()?),
    }
    Ok(())
}

fn run_snapshot(state_dir: &Path, action: SnapshotAction) -> anyhow::Result<()> {
    let mut store = open_store(state_dir)?;

    match action {
        SnapshotAction::Save { label, description } => {
            store.save_filter_snapshot(&label, &description);
        }
        SnapshotAction::Load { label } => {
            if !store.load_filter_snapshot(&label) {
                bail!("no snapshot labeled {:?}", label);
            }
            println!("{}", serde_json::to_string_pretty(store.current())?);
        }
        SnapshotAction::Delete { label } => {
            if !store.delete_filter_snapshot(&label) {
                bail!("no snapshot labeled {:?}", label);
            }
        }
        SnapshotAction::List => {
            for snapshot in store.snapshots().iter() {
                println!(
                    "{}\t{}\t{} filters\t{}",
                    snapshot.label,
                    snapshot.created_at.format("%Y-%m-%d %H:%M"),
                    snapshot.filters.len(),
                    snapshot.description
                );
            }
        }
    }
    Ok(())
}

async fn run_fields(action: FieldsAction) -> anyhow::Result<()> {
    let (api, output) = match &action {
        FieldsAction::List { api } => (api, None),
        FieldsAction::Export { api, output } => (api, Some(output)),
    };

    let remote = HttpFieldRemote::new(api)?;
    let mut registry = FieldRegistry::default();
    let loaded = registry
        .load_fields(&remote)
        .await
        .with_context(|| format!("could not load fields from {}", remote.endpoint()))?;
    log::info!("{} fields loaded", loaded);

    match output {
        None => {
            for field in registry.fields() {
                println!("{}\t{}\t{:.2} acres", field.id, field.name, field.area.acres);
            }
            println!("total\t{:.2} acres", registry.total_area().acres);
        }
        Some(None) => print!("{}", registry.export_csv()?),
        Some(Some(path)) => {
            fs::write(path, registry.export_csv()?)
                .with_context(|| format!("could not write {}", path.display()))?;
        }
    }
    Ok(())
}
