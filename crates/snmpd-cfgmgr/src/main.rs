//! snmpdcfg - SNMP daemon configuration manager
//!
//! Entry point for the snmpdcfg command line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use snmpd_cfgmgr::form::FieldKind;
use snmpd_cfgmgr::{form_config, FormValues, MibFile, ServiceCtl, SnmpdMgr, SNMPD_CONFIG};
use snmpd_cfgmgr_common::{defaults, uci, MemoryStore};

/// SNMP daemon configuration manager
#[derive(Parser, Debug)]
#[command(name = "snmpdcfg")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the UCI packages
    #[arg(short = 'c', long, env = "SNMPDCFG_CONFIG_DIR", default_value = defaults::CONFIG_DIR)]
    config_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current form values
    Show {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Apply submitted form values
    Apply {
        /// JSON object of field name to value
        #[arg(short = 'f', long)]
        form: PathBuf,

        /// Print the resulting package instead of saving it
        #[arg(long)]
        dry_run: bool,

        /// Reload snmpd after saving
        #[arg(long)]
        reload: bool,
    },

    /// Copy the MIB file offered for download
    Mib {
        /// Destination directory
        #[arg(short = 'o', long)]
        out: PathBuf,

        /// Filesystem root the configured MIB path is relative to
        #[arg(long, env = "SNMPDCFG_ROOT", default_value = "/")]
        root: PathBuf,
    },
}

/// Initializes tracing/logging subsystem
fn init_logging(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

/// Loads the packages the form reads
fn load_store(config_dir: &Path) -> Result<MemoryStore> {
    let mut store = MemoryStore::new();
    for config in [SNMPD_CONFIG, form_config::CONFIG] {
        let found = uci::load_package(&mut store, config_dir, config)
            .with_context(|| format!("loading package {}", config))?;
        if !found {
            info!("Package {} not found in {}", config, config_dir.display());
        }
    }
    Ok(store)
}

fn show(config_dir: &Path, json: bool) -> Result<()> {
    let mgr = SnmpdMgr::new(load_store(config_dir)?);
    let values = FormValues::load(&mgr);

    if json {
        let mut tabs = serde_json::Map::new();
        for (tab, fields) in values.grouped() {
            let fields: serde_json::Map<String, serde_json::Value> = fields
                .into_iter()
                .map(|(spec, value)| (spec.name.to_string(), serde_json::Value::from(value)))
                .collect();
            tabs.insert(tab.id().to_string(), serde_json::Value::Object(fields));
        }
        println!("{}", serde_json::to_string_pretty(&tabs)?);
        return Ok(());
    }

    for (tab, fields) in values.grouped() {
        println!("[{}] {}", tab.id(), tab.title());
        for (spec, value) in fields {
            let shown = if spec.kind == FieldKind::Password && !value.is_empty() {
                "********"
            } else {
                value
            };
            println!("  {} = {}", spec.name, shown);
        }
    }
    Ok(())
}

async fn apply(config_dir: &Path, form: &Path, dry_run: bool, reload: bool) -> Result<()> {
    let text = std::fs::read_to_string(form)
        .with_context(|| format!("reading form values from {}", form.display()))?;
    let patch = FormValues::from_json(&text)?;

    let mut mgr = SnmpdMgr::new(load_store(config_dir)?);
    let mut values = FormValues::load(&mgr);
    values.merge(patch);

    let revision = mgr.store().revision();
    let summary = values.apply(&mut mgr)?;
    let changed = mgr.store().revision() != revision;

    if !changed {
        info!("No changes to {}", SNMPD_CONFIG);
    } else if dry_run {
        let package = mgr
            .store()
            .package(SNMPD_CONFIG)
            .context("snmpd package missing after apply")?;
        print!("{}", uci::export_package(package));
    } else {
        uci::save_package(mgr.store(), config_dir, SNMPD_CONFIG)?;
        info!("Saved {}", SNMPD_CONFIG);

        if reload {
            ServiceCtl::default().reload().await?;
        }
    }

    eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn mib(config_dir: &Path, root: &Path, out: &Path) -> Result<()> {
    let store = load_store(config_dir)?;
    let mib = MibFile::locate(&store, root).context("no MIB file available for download")?;

    let dest = mib.download_to(out)?;
    println!("{} ({})", dest.display(), mib.size_label());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    let result = match &args.command {
        Command::Show { json } => show(&args.config_dir, *json),
        Command::Apply {
            form,
            dry_run,
            reload,
        } => apply(&args.config_dir, form, *dry_run, *reload).await,
        Command::Mib { out, root } => mib(&args.config_dir, root, out),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("snmpdcfg failed: {:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
