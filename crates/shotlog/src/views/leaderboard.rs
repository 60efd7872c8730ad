// Career three-point leaderboard.
//
// Built from volume shooter seasons, ranked by career made threes. Ties keep
// the order in which players first appear in the log.

use serde::Serialize;
use std::collections::HashMap;

use crate::aggregate::PlayerSeason;
use crate::config::Thresholds;
use crate::stats::{pct, round1};

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub player: String,
    pub career_threes: u64,
    pub career_attempts: u64,
    #[serde(serialize_with = "round1")]
    pub career_accuracy: f64,
    pub peak_threes: u64,
    pub peak_season: i32,
    pub seasons: Vec<PlayerSeason>,
}

/// Tabular form of an entry; `seasons` becomes a count.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow<'a> {
    pub rank: usize,
    pub player: &'a str,
    pub career_threes: u64,
    pub career_attempts: u64,
    #[serde(serialize_with = "round1")]
    pub career_accuracy: f64,
    pub peak_threes: u64,
    pub peak_season: i32,
    pub seasons: usize,
}

impl LeaderboardEntry {
    pub fn row(&self) -> LeaderboardRow<'_> {
        LeaderboardRow {
            rank: self.rank,
            player: &self.player,
            career_threes: self.career_threes,
            career_attempts: self.career_attempts,
            career_accuracy: self.career_accuracy,
            peak_threes: self.peak_threes,
            peak_season: self.peak_season,
            seasons: self.seasons.len(),
        }
    }
}

/// Player seasons with at least `min_three_attempts` three-point attempts.
pub fn shooter_seasons(rows: &[PlayerSeason], min_three_attempts: u32) -> Vec<PlayerSeason> {
    rows.iter()
        .filter(|r| r.three_pt_shots >= u64::from(min_three_attempts))
        .cloned()
        .collect()
}

/// Top `size` shooter careers with at least `career_min_made_threes` makes
/// over at least `career_min_seasons` qualifying seasons.
pub fn build_leaderboard(
    player_seasons: &[PlayerSeason],
    thresholds: &Thresholds,
    size: usize,
) -> Vec<LeaderboardEntry> {
    let shooters = shooter_seasons(player_seasons, thresholds.shooter_min_three_attempts);

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut careers: Vec<Vec<&PlayerSeason>> = Vec::new();
    for season in &shooters {
        let slot = *index.entry(season.player.as_str()).or_insert_with(|| {
            careers.push(Vec::new());
            careers.len() - 1
        });
        careers[slot].push(season);
    }

    let mut entries: Vec<LeaderboardEntry> = careers
        .into_iter()
        .filter(|seasons| seasons.len() >= thresholds.career_min_seasons)
        .filter_map(|mut seasons| {
            seasons.sort_by_key(|s| s.season);
            let career_threes: u64 = seasons.iter().map(|s| s.made_threes).sum();
            if career_threes < u64::from(thresholds.career_min_made_threes) {
                return None;
            }
            let career_attempts: u64 = seasons.iter().map(|s| s.three_pt_shots).sum();
            // Earliest season wins a tie for the peak.
            let peak = seasons
                .iter()
                .copied()
                .reduce(|best, s| if s.made_threes > best.made_threes { s } else { best })?;
            Some(LeaderboardEntry {
                rank: 0,
                player: peak.player.clone(),
                career_threes,
                career_attempts,
                career_accuracy: pct(career_threes, career_attempts),
                peak_threes: peak.made_threes,
                peak_season: peak.season,
                seasons: seasons.into_iter().cloned().collect(),
            })
        })
        .collect();

    // Stable: equal totals keep first-appearance order.
    entries.sort_by(|a, b| b.career_threes.cmp(&a.career_threes));
    entries.truncate(size);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}
