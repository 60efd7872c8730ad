// One run: load -> normalize -> aggregate -> build views -> emit.

use anyhow::Context;
use std::path::PathBuf;
use tracing::info;

use crate::aggregate;
use crate::config::Config;
use crate::loader;
use crate::output::{self, Artifacts};
use crate::teams::{self, TeamDirectory};
use crate::views;

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total_shots: usize,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub rows_skipped: usize,
    pub seasons: usize,
    pub unassigned_teams: Vec<String>,
    pub written: Vec<PathBuf>,
}

pub fn run(config: &Config) -> anyhow::Result<RunSummary> {
    let (mut log, report) =
        loader::load_shot_log(&config.input).context("failed to load shot logs")?;

    let directory = TeamDirectory::from_config(&config.teams);
    let unassigned_teams = teams::normalize_teams(&mut log, &directory);

    let aggregates =
        aggregate::aggregate_all(&log, &config.thresholds, &config.views.key_players);
    let views = views::build_views(&aggregates, &directory, &config.thresholds, &config.views);

    let written = output::emit_all(
        &config.output,
        &config.views,
        &Artifacts {
            log: &log,
            report: &report,
            aggregates: &aggregates,
            views: &views,
        },
    )
    .with_context(|| format!("failed to write outputs to {}", config.output.dir.display()))?;

    let summary = RunSummary {
        total_shots: log.len(),
        files_loaded: report.files.len(),
        files_skipped: report.skipped.len(),
        rows_skipped: report.rows_skipped(),
        seasons: aggregates.league_seasons.len(),
        unassigned_teams,
        written,
    };
    info!(
        "Run complete: {} shots from {} files ({} skipped), {} seasons",
        summary.total_shots, summary.files_loaded, summary.files_skipped, summary.seasons
    );
    Ok(summary)
}
