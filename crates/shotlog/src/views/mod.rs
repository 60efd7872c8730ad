// Read-only projections over the aggregate tables: careers, leaderboard,
// conference hierarchy and the dashboard bundle.

pub mod career;
pub mod hierarchy;
pub mod leaderboard;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregate::{Aggregates, LeagueSeason, ZoneEfficiency};
use crate::config::{Thresholds, ViewsConfig};
use crate::teams::TeamDirectory;

pub use career::{PlayerCareer, TeamHistory};
pub use hierarchy::Hierarchy;
pub use leaderboard::LeaderboardEntry;

/// A named output view. The name is the stem of its `.csv` / `.json` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    PlayerCareer,
    TeamSeason,
    ShotAnalytics,
    SituationAnalytics,
    LeagueTrends,
    TopShooters,
    TeamsByConference,
    KeyPlayers,
}

impl ViewKind {
    pub fn all() -> Vec<ViewKind> {
        vec![
            ViewKind::PlayerCareer,
            ViewKind::TeamSeason,
            ViewKind::ShotAnalytics,
            ViewKind::SituationAnalytics,
            ViewKind::LeagueTrends,
            ViewKind::TopShooters,
            ViewKind::TeamsByConference,
            ViewKind::KeyPlayers,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            ViewKind::PlayerCareer => "player_career",
            ViewKind::TeamSeason => "team_season",
            ViewKind::ShotAnalytics => "shot_analytics",
            ViewKind::SituationAnalytics => "situation_analytics",
            ViewKind::LeagueTrends => "league_trends",
            ViewKind::TopShooters => "top_shooters",
            ViewKind::TeamsByConference => "teams_by_conference",
            ViewKind::KeyPlayers => "key_players",
        }
    }
}

/// Every derived view for one run.
#[derive(Debug, Clone)]
pub struct Views {
    pub player_careers: Vec<PlayerCareer>,
    /// Configured key players that have data, in configured order.
    pub key_players: Vec<PlayerCareer>,
    pub team_histories: Vec<TeamHistory>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub hierarchy: Hierarchy,
}

pub fn build_views(
    aggregates: &Aggregates,
    directory: &TeamDirectory,
    thresholds: &Thresholds,
    config: &ViewsConfig,
) -> Views {
    let player_careers = career::player_careers(&aggregates.player_seasons);
    let key_players = career::player_careers(&aggregates.key_player_seasons);
    for name in &config.key_players {
        if !key_players.iter().any(|c| &c.player == name) {
            warn!("key player '{}' has no shots in the loaded seasons", name);
        }
    }
    let team_histories = career::team_histories(&aggregates.team_seasons);
    let leaderboard = leaderboard::build_leaderboard(
        &aggregates.player_seasons,
        thresholds,
        config.leaderboard_size,
    );
    let hierarchy = hierarchy::build_hierarchy(&team_histories, directory);

    info!(
        "Built views: {} player careers, {} team histories, {} leaderboard entries, {} teams placed",
        player_careers.len(),
        team_histories.len(),
        leaderboard.len(),
        hierarchy.team_count()
    );

    Views {
        player_careers,
        key_players,
        team_histories,
        leaderboard,
        hierarchy,
    }
}

// ---------------------------------------------------------------------------
// Dashboard bundle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DashboardCounts {
    pub total_teams: usize,
    pub total_players: usize,
    pub conferences: Vec<String>,
    pub divisions_per_conference: usize,
    pub teams_per_division: usize,
}

/// The single document the visualization loads.
#[derive(Debug, Serialize)]
pub struct Dashboard<'a> {
    pub league_trends: &'a [LeagueSeason],
    pub team_data: &'a [TeamHistory],
    pub team_conferences: &'a Hierarchy,
    pub player_data: &'a [LeaderboardEntry],
    pub efficiency_comparison: ZoneEfficiency,
    pub metadata: DashboardCounts,
}

impl<'a> Dashboard<'a> {
    pub fn new(aggregates: &'a Aggregates, views: &'a Views) -> Self {
        Dashboard {
            league_trends: &aggregates.league_seasons,
            team_data: &views.team_histories,
            team_conferences: &views.hierarchy,
            player_data: &views.leaderboard,
            efficiency_comparison: aggregates.zone_efficiency,
            metadata: DashboardCounts {
                total_teams: views.team_histories.len(),
                total_players: views.leaderboard.len(),
                conferences: views
                    .hierarchy
                    .conferences
                    .iter()
                    .map(|c| c.name.clone())
                    .collect(),
                divisions_per_conference: views.hierarchy.divisions_per_conference,
                teams_per_division: views.hierarchy.teams_per_division,
            },
        }
    }
}
