// Per-entity season histories.

use serde::Serialize;
use std::collections::HashMap;

use crate::aggregate::{PlayerSeason, TeamSeason};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerCareer {
    pub player: String,
    pub seasons: Vec<PlayerSeason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamHistory {
    pub team: String,
    pub seasons: Vec<TeamSeason>,
}

impl TeamHistory {
    pub fn first_season(&self) -> Option<i32> {
        self.seasons.first().map(|s| s.season)
    }

    pub fn last_season(&self) -> Option<i32> {
        self.seasons.last().map(|s| s.season)
    }

    pub fn total_shots(&self) -> u64 {
        self.seasons.iter().map(|s| s.total_shots).sum()
    }
}

/// Group rows by `key`, keeping keys in first-appearance order and each
/// group's rows sorted by `season` ascending.
fn group_by_entity<T, K, S>(rows: &[T], key: K, season: S) -> Vec<(String, Vec<T>)>
where
    T: Clone,
    K: Fn(&T) -> &str,
    S: Fn(&T) -> i32,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<T>)> = Vec::new();

    for row in rows {
        let name = key(row);
        let slot = *index.entry(name).or_insert_with(|| {
            groups.push((name.to_string(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row.clone());
    }

    for (_, seasons) in &mut groups {
        seasons.sort_by_key(|s| season(s));
    }
    groups
}

pub fn player_careers(rows: &[PlayerSeason]) -> Vec<PlayerCareer> {
    group_by_entity(rows, |r| r.player.as_str(), |r| r.season)
        .into_iter()
        .map(|(player, seasons)| PlayerCareer { player, seasons })
        .collect()
}

pub fn team_histories(rows: &[TeamSeason]) -> Vec<TeamHistory> {
    group_by_entity(rows, |r| r.team.as_str(), |r| r.season)
        .into_iter()
        .map(|(team, seasons)| TeamHistory { team, seasons })
        .collect()
}
