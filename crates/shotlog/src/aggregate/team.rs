// Team x season shooting profile, keyed by canonical team name.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::record::ShotLog;
use crate::stats::{round1, ShotTally};

#[derive(Debug, Clone, Serialize)]
pub struct TeamSeason {
    pub team: String,
    pub season: i32,
    pub total_shots: u64,
    pub makes: u64,
    #[serde(serialize_with = "round1")]
    pub fg_percentage: f64,
    pub three_pt_shots: u64,
    pub three_pt_made: u64,
    #[serde(serialize_with = "round1")]
    pub three_pt_rate: f64,
    #[serde(serialize_with = "round1")]
    pub three_pt_percentage: f64,
    pub two_pt_shots: u64,
    pub two_pt_made: u64,
    #[serde(serialize_with = "round1")]
    pub two_pt_percentage: f64,
    pub mid_range_shots: u64,
    #[serde(serialize_with = "round1")]
    pub mid_range_rate: f64,
    /// Restricted-area attempts only.
    pub paint_shots: u64,
    #[serde(serialize_with = "round1")]
    pub paint_rate: f64,
    /// 1.5x three-point proxy, see `stats::efg_proxy`.
    #[serde(serialize_with = "round1")]
    pub efg_percentage: f64,
    pub unique_players: usize,
    pub games_played: usize,
}

#[derive(Default)]
struct Group<'a> {
    first_seen: usize,
    tally: ShotTally,
    players: HashSet<&'a str>,
    games: HashSet<&'a str>,
}

/// One row per (canonical team, season), ordered by the team's first
/// appearance then season. Records without a team are left out.
pub fn team_seasons(log: &ShotLog) -> Vec<TeamSeason> {
    let mut team_order: HashMap<&str, usize> = HashMap::new();
    let mut groups: HashMap<(&str, i32), Group<'_>> = HashMap::new();

    for record in &log.records {
        let Some(team) = record.team.as_deref() else {
            continue;
        };
        let next = team_order.len();
        let order = *team_order.entry(team).or_insert(next);
        let group = groups.entry((team, record.year)).or_insert_with(|| Group {
            first_seen: order,
            ..Group::default()
        });
        group.tally.add(record);
        group.players.insert(record.player_name.as_str());
        if let Some(game) = record.game_id.as_deref() {
            group.games.insert(game);
        }
    }

    let mut rows: Vec<(usize, TeamSeason)> = groups
        .into_iter()
        .map(|((team, season), g)| {
            let t = g.tally;
            (
                g.first_seen,
                TeamSeason {
                    team: team.to_string(),
                    season,
                    total_shots: t.attempts,
                    makes: t.made,
                    fg_percentage: t.fg_percentage(),
                    three_pt_shots: t.three_attempts,
                    three_pt_made: t.three_made,
                    three_pt_rate: t.three_pt_rate(),
                    three_pt_percentage: t.three_pt_percentage(),
                    two_pt_shots: t.two_attempts,
                    two_pt_made: t.two_made,
                    two_pt_percentage: t.two_pt_percentage(),
                    mid_range_shots: t.mid_range,
                    mid_range_rate: t.mid_range_rate(),
                    paint_shots: t.restricted_area,
                    paint_rate: t.restricted_area_rate(),
                    efg_percentage: t.efg_percentage(),
                    unique_players: g.players.len(),
                    games_played: g.games.len(),
                },
            )
        })
        .collect();

    rows.sort_by_key(|(order, row)| (*order, row.season));
    rows.into_iter().map(|(_, row)| row).collect()
}
