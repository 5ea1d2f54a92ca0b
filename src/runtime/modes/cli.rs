//! One-shot commands

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::cli::{Commands, ConfigCommands, DeployCommands, ExportPreset, ReagentCommands};
use crate::config::StaticConfig;
use crate::data::{DataStore, SAGA_COLUMNS, TableKind, fetch_table};
use crate::deploy::{DeployMode, PublishPlan, export_dependency_lock, prepare_bundle};
use crate::reagents::{INDEX_SET_LETTERS, LimsClient, NamingGroup, REAGENT_TYPES, ReagentQueue};
use crate::runtime::lifetime::startup::open_database;
use crate::utils::colors::field;
use crate::{print_info, print_success, print_warning};

/// Run a command other than `serve`
pub async fn run_cli(command: Commands, config: &StaticConfig) -> Result<()> {
    match command {
        Commands::Serve => bail!("serve is handled by the server mode"),
        Commands::Fetch => fetch(config).await,
        Commands::Export {
            kind,
            preset,
            output,
        } => export(config, kind, preset, output.as_deref()).await,
        Commands::Reagents { action } => match action {
            ReagentCommands::Kits => {
                list_kits(config);
                Ok(())
            }
            ReagentCommands::Check => check_lims(config).await,
        },
        Commands::Deploy { action } => deploy(config, action),
        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path, force } => {
                config_generate(output_path.as_deref(), force)
            }
        },
    }
}

async fn fetch(config: &StaticConfig) -> Result<()> {
    let db = open_database(config)?;
    let pin = db.pin().to_string();
    let store = DataStore::load(db, config.lims.ui_url.clone())
        .await
        .with_context(|| format!("Failed to load {}", pin))?;

    let snapshot = store.snapshot();
    print_success!("Loaded {}", pin.blue());
    for kind in TableKind::all() {
        println!("{}", field(kind.title(), format!("{} rows", snapshot.table(kind).len())));
    }

    let updates = snapshot.update_info.formatted(snapshot.loaded_at);
    println!("{}", field("Last update", &updates.last_update));
    for (label, stamp) in &updates.tables {
        println!("{}", field(&format!("  {}", label), stamp));
    }
    if let Some(err) = &snapshot.update_info.error {
        print_warning!("Update info unavailable: {}", err);
    }
    Ok(())
}

async fn export(
    config: &StaticConfig,
    kind: TableKind,
    preset: Option<ExportPreset>,
    output: Option<&str>,
) -> Result<()> {
    let db = open_database(config)?;
    let mut table = fetch_table(&db, kind, &config.lims.ui_url).await?;
    if preset == Some(ExportPreset::Saga) {
        table = table.select(&SAGA_COLUMNS);
    }

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Cannot create {}", path))?;
            table.write_csv(file)?;
            print_success!("Exported {} rows of {} to {}", table.len(), kind, path.blue());
        }
        None => table.write_csv(io::stdout().lock())?,
    }
    Ok(())
}

fn list_kits(config: &StaticConfig) {
    let queue = ReagentQueue::new(config.lims.sequence_numbers.clone());
    for reagent in REAGENT_TYPES.iter() {
        println!(
            "{} {} {}",
            reagent.short_name.bold(),
            reagent.name,
            format!("[{}]", reagent.category).dimmed()
        );
        println!("{}", field("Kit", reagent.kit_uri(&config.lims.api_url)));

        let letters: Vec<Option<String>> = match reagent.naming_group {
            NamingGroup::Index => INDEX_SET_LETTERS.iter().map(|c| Some(c.to_string())).collect(),
            NamingGroup::Prep => vec![None],
        };
        let names: Vec<String> = letters
            .iter()
            .filter_map(|letter| queue.preview(reagent.short_name, letter.as_deref()).ok())
            .collect();
        println!("{}", field("Next", names.join(", ")));
    }
}

async fn check_lims(config: &StaticConfig) -> Result<()> {
    let client = LimsClient::from_config(&config.lims);
    print_info!("Checking {}", client.base_url().blue());
    let status = tokio::task::spawn_blocking(move || client.test_connection())
        .await
        .context("Connection check task failed")?;

    if status.connected {
        print_success!("{}", status.message);
        Ok(())
    } else {
        bail!("{}", status.message)
    }
}

fn deploy(config: &StaticConfig, action: DeployCommands) -> Result<()> {
    let deploy = &config.deploy;
    let root = Path::new(".");

    match action {
        DeployCommands::Mode => {
            let mode = DeployMode::from_file(&deploy.mode_file)?;
            print_info!("Deploy mode: {}", mode.as_str().bold());
            println!("{}", field("Branches", mode.branches().join(", ")));
        }
        DeployCommands::Lock => {
            let count = export_dependency_lock(
                &root.join(&deploy.cargo_lock),
                &root.join(&deploy.lock_output),
            )?;
            print_success!("Wrote {} dependencies to {}", count, deploy.lock_output.blue());
        }
        DeployCommands::Manifest => {
            let manifest = prepare_bundle(root, deploy)?;
            print_success!(
                "Manifest {} lists {} files (entrypoint {})",
                deploy.manifest_path.blue(),
                manifest.files.len(),
                manifest.metadata.entrypoint
            );
        }
        DeployCommands::Publish { dry_run } => {
            let mode = DeployMode::from_file(&deploy.mode_file)?;
            print_info!("Deploy mode: {}", mode.as_str().bold());
            prepare_bundle(root, deploy)?;

            let plan = PublishPlan::new(mode, deploy);
            if dry_run {
                for command in plan.commands() {
                    println!("{}", command);
                }
                return Ok(());
            }

            let report = plan.execute(root)?;
            if !report.committed {
                print_info!("Nothing to commit");
            }
            print_success!("Pushed to {}", report.pushed.join(", "));
        }
    }
    Ok(())
}

fn config_generate(output_path: Option<&str>, force: bool) -> Result<()> {
    let path = output_path.unwrap_or("config.example.toml");

    if !force && Path::new(path).exists() {
        print!(
            "{} {} {}",
            "File already exists:".yellow(),
            path.blue(),
            "Overwrite? [y/N] ".yellow()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", "Aborted.".red());
            return Ok(());
        }
    }

    StaticConfig::default()
        .save_to_file(path)
        .map_err(|e| anyhow::anyhow!("Unable to write configuration file: {}", e))?;
    print_success!("Configuration file generated: {}", path.blue());
    Ok(())
}
