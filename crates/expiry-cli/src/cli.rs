//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "expiry")]
#[command(author, version, about = "Track expiry dates and get notified before things go off", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file to use instead of the default location
    #[arg(long, global = true, env = "EXPIRY_SETTINGS", value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the background scanner
    Run {
        /// Run without a tray icon
        #[arg(long)]
        no_tray: bool,
    },

    /// Scan all tracked databases once and print what was found
    Scan {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage tracked databases
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Manage products in a tracked database
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },

    /// View or change scan settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Open the interactive product editor
    Edit,

    /// Open the interactive settings editor
    Settings,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum DbAction {
    /// List tracked databases
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new database file and track it
    Create {
        /// Path of the new database file
        path: PathBuf,

        /// Display name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite a tracked database with the same name without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Track an existing database file
    Add {
        /// Path of the database file
        path: PathBuf,

        /// Display name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite a tracked database with the same name without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Stop tracking a database (the file is kept)
    Remove {
        /// Display name of the database
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProductsAction {
    /// List products
    List {
        /// Database to use (defaults to the first tracked database)
        #[arg(long)]
        db: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a product
    Add {
        /// Product name
        name: String,

        /// Expiry date (YYYY-MM-DD)
        expiry_date: String,

        /// Database to use (defaults to the first tracked database)
        #[arg(long)]
        db: Option<String>,
    },

    /// Remove a product by id
    Remove {
        /// Product id, as shown by `products list`
        id: i64,

        /// Database to use (defaults to the first tracked database)
        #[arg(long)]
        db: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the current settings
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the settings file path
    Path,

    /// Set the scan interval (seconds, 15m, 3h, or a preset such as "3 hours")
    SetInterval {
        /// New interval
        interval: String,
    },

    /// Set how many days ahead count as upcoming
    SetNotifyDays {
        /// Number of days
        days: u32,
    },
}
