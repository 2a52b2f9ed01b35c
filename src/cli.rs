//! Command-line front end.
//!
//! A thin subscriber of the feed controller: parses filters, drives
//! refresh/load-more/swipe, and prints the resulting feed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use crate::api::{Candidate, HttpDiscoveryApi};
use crate::config::Config;
use crate::controller::{AppendOutcome, FeedController, FeedSettings, ReplaceOutcome};
use crate::criteria::{CriteriaStore, FileKeyValueStore, FilterUpdate, PreferenceVector, ProjectStage};
use crate::swipe::SwipeDecision;

#[derive(Debug, Parser)]
#[command(
    name = "matchfeed",
    version,
    about = "Browse and swipe founder match candidates"
)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/matchfeed/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List candidates matching the given filters
    Browse {
        #[command(flatten)]
        filters: FilterArgs,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: usize,

        /// Print candidates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record an accept/reject decision on a candidate
    Swipe {
        /// Candidate id as shown by `browse`
        candidate_id: String,

        /// accept | reject
        decision: SwipeDecision,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Manage saved compatibility preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,

    /// Location filter
    #[arg(long)]
    pub location: Option<String>,

    /// Project stage (idea, prototype, mvp, launched, growth)
    #[arg(long)]
    pub stage: Option<ProjectStage>,

    /// What the founder is looking for
    #[arg(long = "looking-for")]
    pub looking_for: Option<String>,

    /// Required skill (repeatable)
    #[arg(long = "skill")]
    pub skills: Vec<String>,
}

impl FilterArgs {
    pub fn to_update(&self) -> FilterUpdate {
        FilterUpdate {
            search: self.search.clone(),
            location: self.location.clone(),
            looking_for: self.looking_for.clone(),
            project_stage: self.stage.map(Some),
            skills: (!self.skills.is_empty()).then(|| self.skills.clone()),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum PrefsAction {
    /// Print saved preferences
    Show,
    /// Answer one compatibility question
    Set { question: String, option: String },
    /// Remove all saved preferences
    Clear,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let storage = Arc::new(FileKeyValueStore::new(config.storage.preferences_path()));
    let mut criteria = CriteriaStore::open(storage);

    match cli.command {
        Command::Prefs { action } => run_prefs(&mut criteria, action),
        Command::Browse {
            filters,
            pages,
            json,
        } => {
            criteria.set_filter(filters.to_update());
            let controller = build_controller(&config, criteria)?;
            load_pages(&controller, pages.max(1)).await?;

            let candidates = controller.snapshot().candidates;
            if json {
                println!("{}", serde_json::to_string_pretty(&candidates)?);
            } else if candidates.is_empty() {
                println!("No candidates match these filters.");
            } else {
                for (index, candidate) in candidates.iter().enumerate() {
                    println!("{}", format_candidate(index, candidate));
                }
            }
            controller.dispose();
            Ok(())
        }
        Command::Swipe {
            candidate_id,
            decision,
            filters,
        } => {
            criteria.set_filter(filters.to_update());
            let controller = build_controller(&config, criteria)?;
            controller.refresh().await?;

            while !controller.snapshot().contains(&candidate_id) {
                match controller.load_more().await {
                    AppendOutcome::Appended { .. } => continue,
                    _ => bail!("Candidate '{}' is not in the current feed", candidate_id),
                }
            }

            let event = controller.swipe(&candidate_id, decision).await?;
            if event.match_created {
                println!("It's a match! ({} -> {})", decision, event.founder_id);
            } else {
                println!("Recorded {} for {}", decision, event.candidate_id);
            }
            controller.dispose();
            Ok(())
        }
    }
}

fn build_controller(config: &Config, criteria: CriteriaStore) -> anyhow::Result<FeedController> {
    let api = HttpDiscoveryApi::new(config.api.clone()).context("Failed to build HTTP client")?;
    Ok(FeedController::new(
        Arc::new(api),
        criteria,
        FeedSettings::from(&config.feed),
    ))
}

async fn load_pages(controller: &FeedController, pages: usize) -> anyhow::Result<()> {
    if let ReplaceOutcome::Replaced { fetched, .. } = controller.refresh().await? {
        tracing::debug!(fetched, "First page loaded");
    }
    for _ in 1..pages {
        match controller.load_more().await {
            AppendOutcome::Appended { has_more: true, .. } => {}
            _ => break,
        }
    }
    Ok(())
}

fn run_prefs(criteria: &mut CriteriaStore, action: PrefsAction) -> anyhow::Result<()> {
    match action {
        PrefsAction::Show => {}
        PrefsAction::Set { question, option } => {
            let mut preferences: PreferenceVector = criteria.preferences().clone();
            preferences.set(question, option);
            criteria.set_preferences(preferences)?;
        }
        PrefsAction::Clear => {
            criteria.clear_preferences()?;
        }
    }

    let preferences = criteria.preferences();
    if preferences.is_empty() {
        println!("No preferences saved.");
    } else {
        for (question, option) in preferences.iter() {
            println!("{} = {}", question, option);
        }
    }
    Ok(())
}

/// One-line listing: position, id, name, score.
pub fn format_candidate(index: usize, candidate: &Candidate) -> String {
    let name = candidate.display_name().unwrap_or("-");
    let score = candidate
        .compatibility_score
        .map(|s| format!("{:.0}%", s))
        .unwrap_or_else(|| "n/a".to_string());
    format!("{:>3}. {:<24} {:<24} {}", index + 1, candidate.id, name, score)
}
