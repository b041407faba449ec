use crate::template::TemplateFormat;
use carbon_import_common::Scope;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "carbon-import")]
#[command(about = "Emission record import and validation tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate CSV/Excel files without submitting anything
    Validate {
        /// Files or folders
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Validate and submit emission records
    Import {
        /// Files or folders
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Validate and estimate CO2e offline, submit nothing
        #[arg(long)]
        dry_run: bool,

        /// Rows in flight at once (default from config)
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Write the report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not ask before re-importing a file
        #[arg(short, long)]
        yes: bool,

        /// Skip the import history check
        #[arg(long)]
        force: bool,
    },

    /// Show the GHG scope of category names
    Classify {
        #[arg(required = true)]
        categories: Vec<String>,
    },

    /// List known categories
    Categories {
        /// Only this scope (1 or 2)
        #[arg(long)]
        scope: Option<Scope>,
    },

    /// Write an import template
    Template {
        /// Output file
        #[arg(required = true)]
        output: PathBuf,

        /// csv or xlsx (default: from the file extension)
        #[arg(short, long)]
        format: Option<TemplateFormat>,
    },

    /// Show or edit settings
    Config {
        /// API base URL
        #[arg(long)]
        set_url: Option<String>,

        /// API bearer token
        #[arg(long)]
        set_token: Option<String>,

        /// Show settings
        #[arg(long)]
        show: bool,
    },

    /// Import history of a folder
    History {
        /// Delete the history
        #[arg(long)]
        clear: bool,

        /// Target folder (default: current)
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// Show history details
        #[arg(long)]
        info: bool,
    },
}
