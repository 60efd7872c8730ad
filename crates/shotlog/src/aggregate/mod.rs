// Group-by tables over the normalized shot log.
//
// Each table is an independent single pass over the records; none reads
// another table's output.

pub mod league;
pub mod player;
pub mod situation;
pub mod team;
pub mod zone;

use tracing::info;

use crate::config::Thresholds;
use crate::record::ShotLog;

pub use league::{LeagueSeason, ThreePointEvolution, ZoneEfficiency};
pub use player::PlayerSeason;
pub use situation::PeriodSeason;
pub use team::TeamSeason;
pub use zone::ZoneSeason;

/// Every aggregate table for one run.
#[derive(Debug, Clone)]
pub struct Aggregates {
    pub player_seasons: Vec<PlayerSeason>,
    /// Unthresholded seasons of the configured key players.
    pub key_player_seasons: Vec<PlayerSeason>,
    pub team_seasons: Vec<TeamSeason>,
    pub zone_seasons: Vec<ZoneSeason>,
    pub period_seasons: Vec<PeriodSeason>,
    pub league_seasons: Vec<LeagueSeason>,
    pub zone_efficiency: ZoneEfficiency,
}

/// Build all tables. Team-keyed tables read `ShotRecord::team`, so the log
/// must already be normalized.
pub fn aggregate_all(
    log: &ShotLog,
    thresholds: &Thresholds,
    key_players: &[String],
) -> Aggregates {
    let aggregates = Aggregates {
        player_seasons: player::player_seasons(log, thresholds.player_min_shots),
        key_player_seasons: player::key_player_seasons(log, key_players),
        team_seasons: team::team_seasons(log),
        zone_seasons: zone::zone_seasons(log),
        period_seasons: situation::period_seasons(log),
        league_seasons: league::league_seasons(log),
        zone_efficiency: league::zone_efficiency(log),
    };
    info!(
        "Aggregated {} player-seasons, {} team-seasons, {} zone groups, {} period groups, {} seasons",
        aggregates.player_seasons.len(),
        aggregates.team_seasons.len(),
        aggregates.zone_seasons.len(),
        aggregates.period_seasons.len(),
        aggregates.league_seasons.len()
    );
    aggregates
}
