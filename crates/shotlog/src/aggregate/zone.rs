// Shot type x basic zone x season efficiency.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::record::{ShotLog, ShotType};
use crate::stats::{pct, round3, RunningStats};

#[derive(Debug, Clone, Serialize)]
pub struct ZoneSeason {
    pub shot_type: ShotType,
    pub basic_zone: String,
    pub season: i32,
    pub makes: u64,
    pub attempts: u64,
    #[serde(serialize_with = "round3")]
    pub fg_percentage: f64,
    #[serde(serialize_with = "round3")]
    pub avg_distance: f64,
    #[serde(serialize_with = "round3")]
    pub distance_std: f64,
    pub unique_players: usize,
}

#[derive(Default)]
struct Group<'a> {
    attempts: u64,
    makes: u64,
    distance: RunningStats,
    players: HashSet<&'a str>,
}

/// Rows sorted by shot type, zone, then season. Records with no basic zone
/// are not counted here.
pub fn zone_seasons(log: &ShotLog) -> Vec<ZoneSeason> {
    let mut groups: BTreeMap<(ShotType, &str, i32), Group<'_>> = BTreeMap::new();

    for record in &log.records {
        let Some(zone) = record.basic_zone.as_deref() else {
            continue;
        };
        let group = groups
            .entry((record.shot_type, zone, record.year))
            .or_default();
        group.attempts += 1;
        group.makes += u64::from(record.made);
        if let Some(d) = record.shot_distance {
            group.distance.push(d);
        }
        group.players.insert(record.player_name.as_str());
    }

    groups
        .into_iter()
        .map(|((shot_type, zone, season), g)| ZoneSeason {
            shot_type,
            basic_zone: zone.to_string(),
            season,
            makes: g.makes,
            attempts: g.attempts,
            fg_percentage: pct(g.makes, g.attempts),
            avg_distance: g.distance.mean(),
            distance_std: g.distance.sample_std(),
            unique_players: g.players.len(),
        })
        .collect()
}
