// UI layer: runs one parsed command against the client and prints the
// result. Prompts use `dialoguer`, remote calls show an `indicatif` spinner.

use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::{Confirm, Password};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::GistClient;
use crate::cli::{Cli, Commands, SplitArgs};
use crate::config::{self, Config, Credential};
use crate::model::Gist;
use crate::sync::{self, SyncAction, SyncPolicy, SyncReport};
use crate::transport::Transport;

/// Execute the command described by `cli`.
pub fn run(cli: Cli) -> Result<()> {
    if let Commands::Auth = cli.command {
        return handle_auth();
    }

    let credential = credential(cli.auth_token.as_deref())?;
    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Commands::Sync {
        split: SplitArgs {
            separator: Some(separator),
        },
        ..
    } = &cli.command
    {
        config.separator = separator.clone();
    }
    let client = GistClient::new(credential, config).context("Failed to build HTTP client")?;
    dispatch(&client, cli.command)
}

fn dispatch<T: Transport>(client: &GistClient<T>, command: Commands) -> Result<()> {
    match command {
        Commands::Create { file, split } => {
            let gist = with_spinner("Creating gist...", || {
                client.create(&file, split.separator.as_deref())
            })
            .with_context(|| format!("Failed to create gist from {}", file.display()))?;
            print_gist(&gist);
        }
        Commands::Update { file, id, split } => {
            let gist = with_spinner("Updating gist...", || {
                client.update_with(&file, id.as_deref(), split.separator.as_deref())
            })
            .with_context(|| format!("Failed to update gist from {}", file.display()))?;
            print_gist(&gist);
        }
        Commands::Delete { file, id, yes } => {
            let target = id.as_deref().or(file.as_deref()).unwrap_or_default();
            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Delete gist {target}?"))
                    .default(false)
                    .interact()?
            {
                println!("Aborted.");
                return Ok(());
            }
            let status = with_spinner("Deleting gist...", || {
                client.delete(file.as_deref(), id.as_deref())
            })
            .with_context(|| format!("Failed to delete gist {target}"))?;
            println!("{status}");
        }
        Commands::List => {
            let directory = with_spinner("Listing gists...", || client.list_all())
                .context("Failed to list gists")?;
            for gist in &directory {
                let names: Vec<&str> = gist.file_names().collect();
                println!("{}  {}", gist.id, names.join(", "));
            }
        }
        Commands::Sync {
            dir,
            ext,
            fail_fast,
            ..
        } => {
            let policy = if fail_fast {
                SyncPolicy::FailFast
            } else {
                SyncPolicy::ContinueOnError
            };
            let report = with_spinner("Syncing...", || sync::sync_dir(client, &dir, &ext, policy))
                .with_context(|| format!("Failed to sync {}", dir.display()))?;
            print_report(&report);
            if !report.is_clean() {
                anyhow::bail!("{} file(s) failed to sync", report.failed.len());
            }
        }
        Commands::Auth => handle_auth()?,
    }
    Ok(())
}

/// Token from the flag or `GIST_TOKEN`, else the persisted token file.
fn credential(flag: Option<&str>) -> Result<Credential> {
    flag.map(Credential::new)
        .filter(|c| !c.is_empty())
        .or_else(config::load_token)
        .with_context(|| {
            format!(
                "No token: pass --auth-token, set GIST_TOKEN or run `gistyc auth` ({})",
                config::token_path().display()
            )
        })
}

/// Prompt for a token with hidden input and persist it.
fn handle_auth() -> Result<()> {
    let token: String = Password::new().with_prompt("Gist API token").interact()?;
    let path = config::persist_token(&token).context("Failed to store token")?;
    println!("Token stored in {}", path.display());
    Ok(())
}

fn with_spinner<R>(message: &'static str, f: impl FnOnce() -> R) -> R {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    spinner.finish_and_clear();
    result
}

fn print_gist(gist: &Gist) {
    println!("id: {}", gist.id);
    if let Some(url) = &gist.html_url {
        println!("url: {url}");
    }
    if let Some(updated) = gist.updated_at.as_ref().or(gist.created_at.as_ref()) {
        println!("updated: {updated}");
    }
    for name in gist.file_names() {
        println!("  {name}");
    }
}

fn print_report(report: &SyncReport) {
    for outcome in &report.synced {
        let verb = match outcome.action {
            SyncAction::Created => "created",
            SyncAction::Updated => "updated",
        };
        println!("{verb} {} -> {}", outcome.path.display(), outcome.id);
    }
    for (path, err) in &report.failed {
        eprintln!("failed {}: {}", path.display(), err);
    }
    println!(
        "{} created, {} updated, {} failed",
        report.count(SyncAction::Created),
        report.count(SyncAction::Updated),
        report.failed.len()
    );
}
