// Player x season shooting table.

use serde::Serialize;
use std::collections::HashMap;

use crate::record::ShotLog;
use crate::stats::{round1, round2, RunningStats, ShotTally};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSeason {
    pub player: String,
    pub season: i32,
    pub season_label: String,
    pub total_shots: u64,
    pub makes: u64,
    #[serde(serialize_with = "round1")]
    pub fg_percentage: f64,
    pub three_pt_shots: u64,
    pub made_threes: u64,
    #[serde(serialize_with = "round1")]
    pub three_pt_rate: f64,
    #[serde(serialize_with = "round1")]
    pub three_pt_percentage: f64,
    #[serde(serialize_with = "round2")]
    pub avg_distance: f64,
    pub three_point_zone_shots: u64,
    pub mid_range_shots: u64,
    pub paint_shots: u64,
}

struct Group {
    first_seen: usize,
    season_label: String,
    tally: ShotTally,
    distance: RunningStats,
}

/// One row per (player, season) with at least `min_shots` attempts, ordered
/// by the player's first appearance in the log, then season.
pub fn player_seasons(log: &ShotLog, min_shots: u32) -> Vec<PlayerSeason> {
    let mut player_order: HashMap<&str, usize> = HashMap::new();
    collect_seasons(log, min_shots, |name| {
        let next = player_order.len();
        Some(*player_order.entry(name).or_insert(next))
    })
}

/// Every season with data for the named players, with no volume cutoff.
/// Rows follow the order of `players`, then season; names absent from the
/// log produce no rows.
pub fn key_player_seasons(log: &ShotLog, players: &[String]) -> Vec<PlayerSeason> {
    collect_seasons(log, 1, |name| players.iter().position(|p| p == name))
}

/// Group the log by (player, season). `rank` gives a player's sort position,
/// or `None` to leave the player out.
fn collect_seasons<'a, F>(log: &'a ShotLog, min_shots: u32, mut rank: F) -> Vec<PlayerSeason>
where
    F: FnMut(&'a str) -> Option<usize>,
{
    let mut groups: HashMap<(&str, i32), Group> = HashMap::new();

    for record in &log.records {
        let Some(order) = rank(record.player_name.as_str()) else {
            continue;
        };
        let group = groups
            .entry((record.player_name.as_str(), record.year))
            .or_insert_with(|| Group {
                first_seen: order,
                season_label: record.season.clone(),
                tally: ShotTally::default(),
                distance: RunningStats::default(),
            });
        group.tally.add(record);
        if let Some(d) = record.shot_distance {
            group.distance.push(d);
        }
    }

    let mut rows: Vec<(usize, PlayerSeason)> = groups
        .into_iter()
        .filter(|(_, g)| g.tally.attempts >= u64::from(min_shots))
        .map(|((player, season), g)| {
            let t = g.tally;
            (
                g.first_seen,
                PlayerSeason {
                    player: player.to_string(),
                    season,
                    season_label: g.season_label,
                    total_shots: t.attempts,
                    makes: t.made,
                    fg_percentage: t.fg_percentage(),
                    three_pt_shots: t.three_attempts,
                    made_threes: t.three_made,
                    three_pt_rate: t.three_pt_rate(),
                    three_pt_percentage: t.three_pt_percentage(),
                    avg_distance: g.distance.mean(),
                    three_point_zone_shots: t.three_zone,
                    mid_range_shots: t.mid_range,
                    paint_shots: t.paint,
                },
            )
        })
        .collect();

    rows.sort_by_key(|(order, row)| (*order, row.season));
    rows.into_iter().map(|(_, row)| row).collect()
}
