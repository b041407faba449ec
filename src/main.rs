use anyhow::Context;
use carbon_import::{cli, config, error, history, pipeline, reader, report, submit, template};
use carbon_import_common::{CategoryScopeClassifier, ImportReport, RecordImportValidator};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use history::ImportHistory;
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::ImportPipeline;
use report::RunSummary;
use std::path::PathBuf;
use submit::{DryRunSubmitter, EmissionSubmitter, HttpSubmitter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Validate { paths, json } => {
            println!("📋 carbon-import - validate\n");

            println!("[1/2] Scanning input files...");
            let files = scan(&paths)?;
            println!("✔ {} file(s) found\n", files.len());

            let registry = config.load_registry()?;
            let validator = RecordImportValidator::new(&registry);

            println!("[2/2] Validating...");
            let mut reports = Vec::with_capacity(files.len());
            for file in &files {
                let rows = reader::read_rows(&file.path)?;
                let validations = pipeline::validate_table(&validator, &rows);
                let report = ImportReport::validation_only(&file.file_name, &validations);
                report::print_report(&report);
                reports.push(report);
            }

            let summary = RunSummary::new(&CategoryScopeClassifier::new(&registry), reports, true);
            println!();
            summary.print();

            if let Some(path) = json {
                summary
                    .write_json(&path)
                    .with_context(|| format!("failed to write report {}", path.display()))?;
                println!("✔ Report saved: {}", path.display());
            }

            println!("\n✅ Validation finished");
        }

        Commands::Import { paths, dry_run, concurrency, output, yes, force } => {
            println!(
                "🚀 carbon-import - import{}\n",
                if dry_run { " (dry run)" } else { "" }
            );

            println!("[1/3] Scanning input files...");
            let files = scan(&paths)?;
            println!("✔ {} file(s) found\n", files.len());

            let registry = config.load_registry()?;
            let concurrency = concurrency.unwrap_or(config.concurrency).max(1);

            println!("[2/3] Connecting...");
            let submitter: Box<dyn EmissionSubmitter> = if dry_run {
                println!("✔ Dry run: nothing will be submitted\n");
                Box::new(DryRunSubmitter::new(registry.clone()))
            } else {
                let token = config.get_api_token()?;
                let http = HttpSubmitter::new(&config.api_base_url(), token, config.timeout_seconds)?;
                println!("✔ {}\n", http.endpoint());
                Box::new(http)
            };

            println!("[3/3] Importing...");
            let mut reports = Vec::with_capacity(files.len());
            for file in &files {
                let folder = history::history_folder(&file.path);
                let mut import_history = ImportHistory::load(&folder);

                // dry runs neither check nor record history
                let fingerprint = if dry_run {
                    None
                } else {
                    let hash = history::compute_file_hash(&file.path)?;
                    let size = std::fs::metadata(&file.path)?.len();
                    Some((hash, size))
                };

                if let (Some((hash, _)), false) = (&fingerprint, force) {
                    if let Some(previous) = import_history.get(hash) {
                        println!(
                            "⚠ {} was already imported on {}",
                            file.file_name, previous.imported_at
                        );
                        if !yes && !history::confirm_reimport(&file.file_name, previous)? {
                            println!("- Skipped {}", file.file_name);
                            continue;
                        }
                    }
                }

                let rows = reader::read_rows(&file.path)?;
                let bar = progress_bar(rows.len().saturating_sub(1) as u64, &file.file_name);
                let import = ImportPipeline::new(RecordImportValidator::new(&registry), submitter.as_ref())
                    .with_concurrency(concurrency);
                let report = import
                    .run_with_progress(&file.file_name, &rows, |_| bar.inc(1))
                    .await;
                bar.finish_and_clear();

                report::print_report(&report);

                if let Some((hash, size)) = fingerprint {
                    import_history.record(hash, size, &report);
                    import_history.save(&folder)?;
                }
                reports.push(report);
            }

            let summary = RunSummary::new(&CategoryScopeClassifier::new(&registry), reports, dry_run);
            println!();
            summary.print();

            if let Some(path) = output {
                summary
                    .write_json(&path)
                    .with_context(|| format!("failed to write report {}", path.display()))?;
                println!("✔ Report saved: {}", path.display());
            }

            println!("\n✅ Import finished");
        }

        Commands::Classify { categories } => {
            let registry = config.load_registry()?;
            let classifier = CategoryScopeClassifier::new(&registry);
            for category in &categories {
                let classification = classifier.classify(category);
                println!(
                    "{:<32} {}  ({})",
                    classification.key, classification.scope, classification.basis
                );
            }
        }

        Commands::Categories { scope } => {
            let registry = config.load_registry()?;
            let mut count = 0;
            for def in registry.iter().filter(|d| scope.map_or(true, |s| d.scope == s)) {
                println!("{:<34} {:<8} {:<8} {}", def.key, def.unit, def.scope.to_string(), def.name);
                count += 1;
            }
            println!("\n{} categories", count);
        }

        Commands::Template { output, format } => {
            let format = format
                .or_else(|| template::TemplateFormat::from_path(&output))
                .unwrap_or_default();
            let registry = config.load_registry()?;
            template::write_template(&output, format, &registry)?;
            println!("✔ Template written ({}): {}", format, output.display());
        }

        Commands::Config { set_url, set_token, show } => {
            let mut config = config;

            if let Some(url) = set_url {
                config.set_api_base_url(url)?;
                println!("✔ API URL set");
            }

            if let Some(token) = set_token {
                config.set_api_token(token)?;
                println!("✔ API token set");
            }

            if show {
                println!("Settings:");
                println!("  API URL: {}", config.api_base_url());
                println!("  API token: {}", if config.get_api_token().is_ok() { "set" } else { "not set" });
                println!("  Timeout: {}s", config.timeout_seconds);
                println!("  Concurrency: {}", config.concurrency);
                match &config.registry_path {
                    Some(path) => println!("  Registry: {}", path.display()),
                    None => println!("  Registry: built-in TGO"),
                }
            }
        }

        Commands::History { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| PathBuf::from("."));
            let history_path = ImportHistory::history_path(&target);

            if info || !clear {
                if history_path.exists() {
                    let import_history = ImportHistory::load(&target);
                    println!("Import history:");
                    println!("  Path: {}", history_path.display());
                    println!("  Files: {}", import_history.len());
                    if import_history.is_empty() {
                        // left behind by an unreadable or outdated ledger
                        println!("  No usable entries; the next import starts a fresh history");
                    } else if info {
                        for entry in import_history.entries() {
                            println!(
                                "  {}  {} ({} bytes): {} ok / {} failed",
                                entry.imported_at,
                                entry.file_name,
                                entry.file_size,
                                entry.success_count,
                                entry.error_count
                            );
                        }
                    }
                } else {
                    println!("No import history: {}", history_path.display());
                }
            }

            if clear {
                match ImportHistory::clear(&target) {
                    Ok(true) => println!("✔ Import history deleted: {}", history_path.display()),
                    Ok(false) => println!("No import history"),
                    Err(e) => println!("Failed to delete import history: {}", e),
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn scan(paths: &[PathBuf]) -> error::Result<Vec<reader::InputFile>> {
    let files = reader::scan_inputs(paths)?;
    if files.is_empty() {
        let joined: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        return Err(error::CarbonImportError::NoInputFiles(joined.join(", ")));
    }
    Ok(files)
}

fn progress_bar(len: u64, file_name: &str) -> ProgressBar {
    let bar = ProgressBar::new(len);
    let style = ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message(file_name.to_string());
    bar
}
