mod cli;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use svsm::backup::BackupReport;
use svsm::catalog::search_pattern;
use svsm::config::{SvsmConfig, load_cfg, load_cfg_from, save_cfg, save_cfg_to, settings_path};
use svsm::worker::EngineWorker;
use svsm::{
    BackendKind, CancelToken, CatalogScan, OperationReport, SaveManager, SaveRecord, TransferError,
    TransferFailure,
};

use cli::{Cli, Commands};

fn init_logging() {
    let filter = EnvFilter::try_from_env("SVSM_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_cfg_from(path),
        None => load_cfg(),
    };

    if let Commands::Config { save } = cli.command {
        return show_config(&config, cli.config.as_deref(), save);
    }

    let manager = Arc::new(SaveManager::from_config(&config)?);
    let worker = EngineWorker::spawn();
    let cancel = CancelToken::new();

    if config.backup_on_start && !cli.no_backup && !matches!(cli.command, Commands::Backup) {
        let report = run(&worker, &manager, &cancel, |m, c| m.snapshot(c))?;
        match report {
            Ok(report) => print_backup(&report),
            Err(e) => warn!("Startup backup failed: {}", e),
        }
    }

    match cli.command {
        Commands::List { backend, filter } => {
            let pattern = filter
                .as_deref()
                .map(search_pattern)
                .transpose()
                .context("Invalid --filter pattern")?;
            let kinds = match backend {
                Some(kind) => vec![kind],
                None => vec![BackendKind::Local, BackendKind::Remote],
            };
            for kind in kinds {
                let mut scan = run(&worker, &manager, &cancel, move |m, c| m.scan(kind, c))?;
                if let Some(pattern) = &pattern {
                    scan.retain_matching(pattern);
                }
                print_scan(&scan, &manager);
            }
        }

        Commands::Transfer { name, id, from } => {
            let record = find(&worker, &manager, &cancel, from, &name, &id)?;
            let target = record.clone();
            let result = run(&worker, &manager, &cancel, move |m, c| m.transfer(&target, c))?;
            if let Err(TransferError::Failed(TransferFailure::PartialCopy(partial))) = &result {
                print_failures(partial);
            }
            let report = result.with_context(|| {
                format!("Failed to copy {} to {}", record.entry_name(), from.opposite())
            })?;
            println!(
                "Copied {} to {} ({} item(s)). The {} copy was kept.",
                record.farm_label(),
                from.opposite(),
                report.items.len(),
                from
            );
        }

        Commands::Delete { name, id, from, yes } => {
            let record = find(&worker, &manager, &cancel, from, &name, &id)?;
            if !yes && !confirm(&format!("Delete {} ({}) from {}?", record.farm_label(), id, from))? {
                println!("Cancelled.");
                return Ok(());
            }
            let target = record.clone();
            let report = run(&worker, &manager, &cancel, move |m, c| m.delete(&target, c))?
                .with_context(|| format!("Failed to delete {}", record.entry_name()))?;
            print_failures(&report);
            if report.is_complete() {
                println!("Deleted {} from {}.", record.farm_label(), from);
            } else {
                bail!(
                    "{} was only partly deleted ({} item(s) left behind)",
                    record.entry_name(),
                    report.failure_count()
                );
            }
        }

        Commands::Backup => {
            let report = run(&worker, &manager, &cancel, |m, c| m.snapshot(c))?
                .context("Backup failed")?;
            print_backup(&report);
            if !report.is_complete() {
                bail!("Some saves were not fully backed up");
            }
        }

        Commands::Export { name, id, from, dest } => {
            let record = find(&worker, &manager, &cancel, from, &name, &id)?;
            let target = record.clone();
            let dest_dir = dest.clone();
            let report = run(&worker, &manager, &cancel, move |m, c| {
                m.export(&target, &dest_dir, c)
            })?
            .with_context(|| format!("Failed to export {}", record.entry_name()))?;
            print_failures(&report);
            println!(
                "Exported {} to {}",
                record.farm_label(),
                dest.join(record.entry_name()).display()
            );
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Run one engine call on the worker and wait for it
fn run<T, F>(
    worker: &EngineWorker,
    manager: &Arc<SaveManager>,
    cancel: &CancelToken,
    f: F,
) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&SaveManager, &CancelToken) -> T + Send + 'static,
{
    let manager = Arc::clone(manager);
    let cancel = cancel.clone();
    worker
        .submit(move || f(&manager, &cancel))
        .wait()
        .context("Worker stopped before finishing the operation")
}

fn find(
    worker: &EngineWorker,
    manager: &Arc<SaveManager>,
    cancel: &CancelToken,
    kind: BackendKind,
    name: &str,
    id: &str,
) -> Result<SaveRecord> {
    let (n, i) = (name.to_string(), id.to_string());
    let found = run(worker, manager, cancel, move |m, c| m.find(kind, &n, &i, c))??;
    match found {
        Some(record) => Ok(record),
        None => bail!("No save {}_{} on {}", name, id, kind),
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_scan(scan: &CatalogScan, manager: &SaveManager) {
    let title = match scan.backend {
        BackendKind::Local => "PC saves",
        BackendKind::Remote => "Android saves",
    };
    println!("{} ({})", title, manager.backend(scan.backend).describe_root());

    if scan.records.is_empty() {
        println!("  (none)");
    } else {
        let width = scan
            .records
            .iter()
            .map(|r| r.farm_label().len())
            .max()
            .unwrap_or(0)
            .max("Farm".len());
        println!("  {:<width$}  {:<12}  Last played", "Farm", "ID");
        for record in &scan.records {
            println!(
                "  {:<width$}  {:<12}  {}",
                record.farm_label(),
                record.id,
                record.last_played_label()
            );
        }
    }

    for diagnostic in &scan.diagnostics {
        println!("  ! {}", diagnostic);
    }
    println!();
}

fn print_failures(report: &OperationReport) {
    for item in report.failures() {
        if let svsm::backend::Outcome::Failed(reason) = &item.outcome {
            eprintln!("  failed: {}: {}", item.item.display(), reason);
        }
    }
}

fn print_backup(report: &BackupReport) {
    println!(
        "Backed up {} save(s) to {}",
        report.entries.len(),
        report.root.display()
    );
    for entry in report.incomplete() {
        eprintln!("  {} incomplete:", entry.entry);
        print_failures(&entry.report);
    }
}

fn show_config(config: &SvsmConfig, path: Option<&Path>, save: bool) -> Result<()> {
    let location = path.map(Path::to_path_buf).or_else(settings_path);
    match &location {
        Some(p) => println!("Settings file: {}", p.display()),
        None => println!("Settings file: (no configuration directory)"),
    }
    println!("{}", serde_json::to_string_pretty(config)?);
    println!("Local saves: {}", config.resolve_local_root()?.display());
    println!("Backups: {}", config.resolve_backup_root().display());

    if save {
        match path {
            Some(p) => save_cfg_to(config, p)?,
            None => save_cfg(config)?,
        }
        println!("Settings saved.");
    }
    Ok(())
}
