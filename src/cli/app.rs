//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::output::{Output, OutputFormat};
use super::{build, diff, migrate_cmd, resolve, shells, snapshot_cmd};
use crate::shell::ShellKind;
use crate::storage::Project;

#[derive(Parser)]
#[command(name = "rcweave")]
#[command(author, version, about = "Assemble shell startup files from small modules")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new module project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Assemble and install the startup files
    Build {
        /// Target platform tag (defaults to this machine)
        #[arg(long)]
        os: Option<String>,

        /// Shell to write files for (defaults to project config)
        #[arg(long)]
        shell: Option<ShellKind>,

        /// Restrict the build to these target buckets (repeatable)
        #[arg(long = "target")]
        targets: Vec<String>,

        /// Where to install the output files (defaults to project config)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print rendered content instead of writing files
        #[arg(long)]
        stdout: bool,

        /// Show what would be written without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Skip the pre-build snapshot of installed files
        #[arg(long)]
        no_snapshot: bool,
    },

    /// Print the dependency-resolved module order
    Resolve,

    /// Check the manifest and report every problem found
    Validate,

    /// Compare rendered output against the installed files
    Diff {
        /// Target platform tag (defaults to this machine)
        #[arg(long)]
        os: Option<String>,

        /// Shell to compare against (defaults to project config)
        #[arg(long)]
        shell: Option<ShellKind>,
    },

    /// Split a monolithic rc file into modules
    Migrate {
        /// The rc file to split (e.g. ~/.zshrc)
        file: PathBuf,

        /// Directory to create the module project in
        #[arg(long, default_value = ".")]
        into: PathBuf,

        /// Show the proposed split without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage snapshots of the installed files
    #[command(subcommand)]
    Snapshot(snapshot_cmd::SnapshotCommands),

    /// Show the startup files each supported shell reads
    Shells,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("rcweave starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.success(&format!(
                "Initialized rcweave project at {}",
                project.root().display()
            ));
        }

        Commands::Build {
            os,
            shell,
            targets,
            output_dir,
            stdout,
            dry_run,
            no_snapshot,
        } => build::run(
            &output,
            os.as_deref(),
            shell,
            &targets,
            output_dir.as_deref(),
            stdout,
            dry_run,
            no_snapshot,
        )?,

        Commands::Resolve => resolve::order(&output)?,
        Commands::Validate => resolve::lint(&output)?,

        Commands::Diff { os, shell } => diff::run(&output, os.as_deref(), shell)?,

        Commands::Migrate {
            file,
            into,
            dry_run,
        } => migrate_cmd::run(&output, &file, &into, dry_run)?,

        Commands::Snapshot(cmd) => snapshot_cmd::run(cmd, &output)?,

        Commands::Shells => shells::run(&output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
