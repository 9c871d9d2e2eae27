use crate::builders::reporter::{ConsoleReporter, RunReport};
use crate::core::config::{ConfigManager, ConfigProvider, ExportFormat, ToggleConfig};
use crate::core::engine::BlockToggler;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Options shared by every command.
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    pub file: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Logs go to stderr so the success message and reports stay alone on stdout.
/// `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn initialize_config(options: &RunOptions) -> Result<()> {
    let config_manager = get_config_manager(options)?;
    let path = config_manager.get_config_path()?;
    if config_manager.initialize()? {
        println!("✓ Wrote default rules to {}", path.display());
    } else {
        println!("ℹ️  {} already exists", path.display());
    }
    Ok(())
}

pub fn toggle_dependencies(options: &RunOptions) -> Result<RunReport> {
    let config_manager = get_config_manager(options)?;
    toggle_with(&config_manager, options)
}

pub fn restore_dependencies(options: &RunOptions) -> Result<RunReport> {
    let config_manager = get_config_manager(options)?;
    restore_with(&config_manager, options)
}

/// Applies the configured rules to the target file.
pub fn toggle_with(config_manager: &ConfigManager, options: &RunOptions) -> Result<RunReport> {
    let config = config_manager.load_config()?;
    let path = resolve_target(config_manager, &config, options);
    let toggler = BlockToggler::new(&config.global_settings).with_dry_run(options.dry_run);

    let report = toggler
        .run(&path, &config.rules)
        .with_context(|| format!("Failed to update {}", path.display()))?;
    finish(&report, &config, options, "POM.xml updated successfully");
    Ok(report)
}

/// Strips the wrappers the configured rules produced from the target file.
pub fn restore_with(config_manager: &ConfigManager, options: &RunOptions) -> Result<RunReport> {
    let config = config_manager.load_config()?;
    let path = resolve_target(config_manager, &config, options);
    let toggler = BlockToggler::new(&config.global_settings).with_dry_run(options.dry_run);

    let report = toggler
        .restore(&path, &config.rules)
        .with_context(|| format!("Failed to restore {}", path.display()))?;
    finish(&report, &config, options, "POM.xml restored successfully");
    Ok(report)
}

pub fn validate_config(options: &RunOptions) -> Result<()> {
    get_config_manager(options)?.validate_config()
}

pub fn list_rules(options: &RunOptions) -> Result<()> {
    get_config_manager(options)?.list_rules()
}

pub fn export_rules(options: &RunOptions, output: &Path, format: ExportFormat) -> Result<()> {
    get_config_manager(options)?.export_rules(output, format)?;
    println!("✓ Exported rules to {}", output.display());
    Ok(())
}

fn resolve_target(
    config_manager: &ConfigManager,
    config: &ToggleConfig,
    options: &RunOptions,
) -> PathBuf {
    match &options.file {
        Some(file) => config_manager.get_root().join(file),
        None => config_manager.target_path(config),
    }
}

fn finish(report: &RunReport, config: &ToggleConfig, options: &RunOptions, message: &str) {
    if options.dry_run || options.verbose || config.global_settings.verbose {
        ConsoleReporter::new().print(report);
    }

    if report.written {
        println!("{message}");
    }
}

// Helper function to create ConfigManager instance
fn get_config_manager(options: &RunOptions) -> Result<ConfigManager> {
    let root = std::env::current_dir().context("Failed to determine working directory")?;
    config_manager_for(root, options)
}

/// Builds a `ConfigManager` rooted at `root`, honouring `--config`.
pub fn config_manager_for(root: PathBuf, options: &RunOptions) -> Result<ConfigManager> {
    let mut config_manager = ConfigManager::new_at(root)?;
    if let Some(path) = &options.config {
        config_manager.set_config_path(path.clone());
    }
    Ok(config_manager)
}
