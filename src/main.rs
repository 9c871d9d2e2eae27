/// Comments out Maven dependencies that cannot be resolved right now.
///
/// Internal artifacts that are not published yet, or Spring Cloud starters
/// whose BOM is unreachable, break the whole build. This tool wraps those
/// declarations in XML comments so the rest of the project still builds,
/// and `restore` puts them back exactly as they were.
use anyhow::Result;
use clap::{Parser, Subcommand};
use pom_toggle::core::config::ExportFormat;
use pom_toggle::utils::{self, RunOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pom-toggle")]
#[command(about = "Temporarily comment out unavailable dependencies in a Maven POM")]
struct Cli {
    /// POM to rewrite, relative to the working directory (default: pom.xml)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Rule file to use instead of ./pom-toggle.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show what would change without writing the file
    #[arg(long, global = true)]
    dry_run: bool,

    /// Print a per-rule report and info-level logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Comment out every configured dependency (the default)
    Apply,
    /// Remove the comments added by `apply`
    Restore,
    /// Write the default rules to ./pom-toggle.toml
    Init,
    /// Check the rule file for problems
    Validate,
    /// List the configured rules
    List,
    /// Export the rule file in another format
    Export {
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, value_enum, default_value_t)]
        format: ExportFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose);

    let options = RunOptions {
        file: cli.file,
        config: cli.config,
        dry_run: cli.dry_run,
        verbose: cli.verbose,
    };

    match cli.command.unwrap_or(Commands::Apply) {
        Commands::Apply => utils::toggle_dependencies(&options).map(|_| ()),
        Commands::Restore => utils::restore_dependencies(&options).map(|_| ()),
        Commands::Init => utils::initialize_config(&options),
        Commands::Validate => utils::validate_config(&options),
        Commands::List => utils::list_rules(&options),
        Commands::Export { output, format } => utils::export_rules(&options, &output, format),
    }
}
