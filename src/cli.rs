use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gistyc", bin_name = "gistyc", version)]
#[command(about = "Create, update and delete gists from local files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Gist REST API token (falls back to ~/.gistyc_token)
    #[arg(short = 't', long, env = "GIST_TOKEN", global = true, hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// Line that separates the file into several gist files
    #[arg(short, long)]
    pub separator: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a gist from a file
    Create {
        file: PathBuf,
        #[command(flatten)]
        split: SplitArgs,
    },

    /// Update the gist holding this file (by file name, or by --id)
    Update {
        file: PathBuf,
        /// Gist id, required when the file name is ambiguous
        #[arg(long)]
        id: Option<String>,
        #[command(flatten)]
        split: SplitArgs,
    },

    /// Delete a gist by id or by the name of a file it contains
    #[command(group(
        clap::ArgGroup::new("target").required(true).args(["file", "id"])
    ))]
    Delete {
        #[arg(short, long)]
        file: Option<String>,
        #[arg(long)]
        id: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List every gist visible to the token
    List,

    /// Create or update a gist for every matching file under a directory
    Sync {
        dir: PathBuf,
        /// File extension to pick up
        #[arg(long, default_value = "py")]
        ext: String,
        /// Stop at the first failing file
        #[arg(long)]
        fail_fast: bool,
        #[command(flatten)]
        split: SplitArgs,
    },

    /// Store a token in ~/.gistyc_token
    Auth,
}
