use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use phishshield_core::api::AppConfig;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Checks top-level navigations against a phishing scoring service")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./phishshield.toml, then the user config dir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Scoring endpoint, overrides `scoring.endpoint`.
    #[arg(long, global = true)]
    pub score_url: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Read navigation events from stdin and write redirect commands to stdout.
    Watch(WatchArgs),
    /// Score a single URL and print the decision.
    Check(CheckArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct WatchArgs {
    #[arg(long)]
    pub block_page: Option<String>,

    /// Append one JSON line per decision to this file.
    #[arg(long)]
    pub events_out: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CheckArgs {
    pub url: String,

    #[arg(long)]
    pub block_page: Option<String>,
}

impl Args {
    /// Command line values win over file and environment.
    pub fn apply_overrides(&self, cfg: &mut AppConfig) {
        if let Some(url) = &self.score_url {
            cfg.scoring.endpoint = url.clone();
        }
        let block_page = match &self.command {
            Commands::Watch(w) => w.block_page.as_ref(),
            Commands::Check(c) => c.block_page.as_ref(),
        };
        if let Some(page) = block_page {
            cfg.gatekeeper.block_page_url = page.clone();
        }
        if let Commands::Watch(WatchArgs {
            events_out: Some(path),
            ..
        }) = &self.command
        {
            cfg.events_out.enabled = true;
            cfg.events_out.path = path.clone();
        }
    }
}
