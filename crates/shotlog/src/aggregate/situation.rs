// Game period x shot type x season: clutch and late-clock context.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::record::{GamePeriod, ShotLog, ShotType};
use crate::stats::{pct, round3, RunningStats};

#[derive(Debug, Clone, Serialize)]
pub struct PeriodSeason {
    pub game_period: GamePeriod,
    pub shot_type: ShotType,
    pub season: i32,
    pub makes: u64,
    pub attempts: u64,
    #[serde(serialize_with = "round3")]
    pub fg_percentage: f64,
    /// Seconds left in the period, averaged over records with a full clock.
    #[serde(serialize_with = "round3")]
    pub avg_time_remaining: f64,
}

#[derive(Default)]
struct Group {
    attempts: u64,
    makes: u64,
    clock: RunningStats,
}

/// Rows sorted Q1..Q4, OT, then shot type, then season.
pub fn period_seasons(log: &ShotLog) -> Vec<PeriodSeason> {
    let mut groups: BTreeMap<(GamePeriod, ShotType, i32), Group> = BTreeMap::new();

    for record in &log.records {
        let group = groups
            .entry((record.game_period(), record.shot_type, record.year))
            .or_default();
        group.attempts += 1;
        group.makes += u64::from(record.made);
        if let Some(secs) = record.time_remaining() {
            group.clock.push(f64::from(secs));
        }
    }

    groups
        .into_iter()
        .map(|((game_period, shot_type, season), g)| PeriodSeason {
            game_period,
            shot_type,
            season,
            makes: g.makes,
            attempts: g.attempts,
            fg_percentage: pct(g.makes, g.attempts),
            avg_time_remaining: g.clock.mean(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{log_of, shot, ShotExt};

    #[test]
    fn quarters_and_overtime() {
        let records = vec![
            shot("A", "T", 2015).clock(1, 11, 0),
            shot("A", "T", 2015).clock(2, 0, 30),
            shot("A", "T", 2015).clock(3, 5, 0),
            shot("A", "T", 2015).clock(4, 0, 2).made(),
            shot("A", "T", 2015).clock(5, 1, 0),
            shot("A", "T", 2015).clock(6, 2, 0),
        ];
        let rows = period_seasons(&log_of(records));
        let periods: Vec<&str> = rows.iter().map(|r| r.game_period.label()).collect();
        assert_eq!(periods, vec!["Q1", "Q2", "Q3", "Q4", "OT"]);

        let ot = &rows[4];
        assert_eq!(ot.attempts, 2);
        assert!((ot.avg_time_remaining - 90.0).abs() < 1e-9);
        assert!((rows[3].fg_percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn missing_clock_is_left_out_of_the_mean() {
        let mut partial = shot("A", "T", 2015).clock(4, 1, 0);
        partial.secs_left = None;
        let records = vec![partial, shot("A", "T", 2015).clock(4, 0, 20)];
        let rows = period_seasons(&log_of(records));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].attempts, 2);
        assert!((rows[0].avg_time_remaining - 20.0).abs() < 1e-9);
    }

    #[test]
    fn absent_quarter_counts_as_overtime() {
        let rows = period_seasons(&log_of(vec![shot("A", "T", 2015).three()]));
        assert_eq!(rows[0].game_period, GamePeriod::OT);
        assert_eq!(rows[0].shot_type, ShotType::ThreePoint);
        assert_eq!(rows[0].avg_time_remaining, 0.0);
    }
}
