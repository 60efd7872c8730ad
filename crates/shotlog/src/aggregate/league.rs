// League-wide trends by season and whole-log zone efficiency.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::record::{ShotLog, ZoneGroup, RESTRICTED_AREA};
use crate::stats::{ratio, round2, round3, ShotTally};

#[derive(Debug, Clone, Serialize)]
pub struct LeagueSeason {
    pub season: i32,
    pub total_shots: u64,
    #[serde(serialize_with = "round2")]
    pub three_pt_rate: f64,
    #[serde(serialize_with = "round2")]
    pub mid_range_rate: f64,
    #[serde(serialize_with = "round2")]
    pub fg_percentage: f64,
    #[serde(serialize_with = "round2")]
    pub efg_percentage: f64,
    pub three_pt_shots: u64,
    pub mid_range_shots: u64,
}

pub fn league_seasons(log: &ShotLog) -> Vec<LeagueSeason> {
    let mut seasons: BTreeMap<i32, ShotTally> = BTreeMap::new();
    for record in &log.records {
        seasons.entry(record.year).or_default().add(record);
    }

    seasons
        .into_iter()
        .map(|(season, t)| LeagueSeason {
            season,
            total_shots: t.attempts,
            three_pt_rate: t.three_pt_rate(),
            mid_range_rate: t.mid_range_rate(),
            fg_percentage: t.fg_percentage(),
            efg_percentage: t.efg_percentage(),
            three_pt_shots: t.three_attempts,
            mid_range_shots: t.mid_range,
        })
        .collect()
}

/// Points per attempt by court region over the whole log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ZoneEfficiency {
    #[serde(serialize_with = "round3")]
    pub mid_range_efficiency: f64,
    #[serde(serialize_with = "round3")]
    pub three_point_efficiency: f64,
    #[serde(serialize_with = "round3")]
    pub restricted_area_efficiency: f64,
}

#[derive(Default)]
struct Points {
    attempts: u64,
    points: u64,
}

impl Points {
    fn add(&mut self, made: bool, value: u32) {
        self.attempts += 1;
        if made {
            self.points += u64::from(value);
        }
    }

    fn per_attempt(&self) -> f64 {
        ratio(self.points as f64, self.attempts)
    }
}

pub fn zone_efficiency(log: &ShotLog) -> ZoneEfficiency {
    let mut mid = Points::default();
    let mut three = Points::default();
    let mut rim = Points::default();

    for record in &log.records {
        let value = record.shot_type.points();
        if record.is_three() {
            three.add(record.made, value);
        }
        if record.zone_group() == ZoneGroup::MidRange {
            mid.add(record.made, value);
        }
        if record.basic_zone.as_deref() == Some(RESTRICTED_AREA) {
            rim.add(record.made, value);
        }
    }

    ZoneEfficiency {
        mid_range_efficiency: mid.per_attempt(),
        three_point_efficiency: three.per_attempt(),
        restricted_area_efficiency: rim.per_attempt(),
    }
}

/// First vs. last season three-point rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThreePointEvolution {
    pub first_season: i32,
    #[serde(serialize_with = "round2")]
    pub first_rate: f64,
    pub last_season: i32,
    #[serde(serialize_with = "round2")]
    pub last_rate: f64,
    /// `last_rate / first_rate`, 0 when the first season had no threes.
    #[serde(serialize_with = "round2")]
    pub increase_factor: f64,
}

impl ThreePointEvolution {
    pub fn from_trends(trends: &[LeagueSeason]) -> Option<Self> {
        let first = trends.first()?;
        let last = trends.last()?;
        let increase_factor = if first.three_pt_rate == 0.0 {
            0.0
        } else {
            last.three_pt_rate / first.three_pt_rate
        };
        Some(Self {
            first_season: first.season,
            first_rate: first.three_pt_rate,
            last_season: last.season,
            last_rate: last.three_pt_rate,
            increase_factor,
        })
    }
}
