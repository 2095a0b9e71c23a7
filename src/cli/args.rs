//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Organization hierarchy editor: departments, managers and their tree
#[derive(Parser, Debug)]
#[command(name = "orgtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Forest file (overrides config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath, env = "ORGTREE_FOREST")]
    pub forest: Option<PathBuf>,

    /// Employee directory file (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Parent choice shared by `add` and `move`.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ParentArgs {
    /// Parent organization id
    #[arg(short, long)]
    pub parent: Option<String>,

    /// Place at root level
    #[arg(long)]
    pub root: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show hierarchy as tree
    Tree,

    /// List organizations in pre-order (id and label)
    List,

    /// Show one organization
    Show {
        /// Organization id
        id: String,
    },

    /// Print the id the next added organization will get
    NextId,

    /// Add an organization
    Add {
        /// Organization name
        #[arg(short, long)]
        name: String,
        /// Manager employee id
        #[arg(short, long)]
        manager: String,
        #[command(flatten)]
        parent: ParentArgs,
    },

    /// Rename an organization and/or change its manager
    Update {
        /// Organization id
        id: String,
        /// New organization name
        #[arg(short, long)]
        name: String,
        /// New manager employee id
        #[arg(short, long)]
        manager: String,
    },

    /// Remove an organization
    Remove {
        /// Organization id
        id: String,
    },

    /// Move an organization with its subtree
    Move {
        /// Organization id
        id: String,
        #[command(flatten)]
        parent: ParentArgs,
    },

    /// Search organizations (or employees) by id or name
    Search {
        /// Query, case-insensitive substring
        query: String,
        /// Search the employee directory instead
        #[arg(short, long)]
        employees: bool,
    },

    /// Replace the forest with one built from flat records
    Import {
        /// JSON array of flat organization records
        #[arg(value_hint = ValueHint::FilePath)]
        records: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
}
