// Record builders shared by unit tests.

use std::path::PathBuf;

use crate::record::{ShotLog, ShotRecord, ShotType, SourceFile};

pub fn shot(player: &str, team: &str, year: i32) -> ShotRecord {
    ShotRecord {
        source: 0,
        year,
        season: format!("{year}-{:02}", (year + 1) % 100),
        player_name: player.to_string(),
        player_id: None,
        team_name: Some(team.to_string()),
        team_id: None,
        position: None,
        game_id: None,
        game_date: None,
        event_type: None,
        action_type: None,
        made: false,
        shot_type: ShotType::TwoPoint,
        basic_zone: None,
        zone_name: None,
        zone_abb: None,
        zone_range: None,
        loc_x: None,
        loc_y: None,
        shot_distance: None,
        quarter: None,
        mins_left: None,
        secs_left: None,
        team: Some(team.to_string()),
        raw: csv::StringRecord::new(),
    }
}

pub trait ShotExt {
    fn made(self) -> Self;
    fn three(self) -> Self;
    fn zone(self, zone: &str) -> Self;
    fn distance(self, feet: f64) -> Self;
    fn clock(self, quarter: u32, mins: u32, secs: u32) -> Self;
    fn game(self, id: &str) -> Self;
}

impl ShotExt for ShotRecord {
    fn made(mut self) -> Self {
        self.made = true;
        self
    }

    fn three(mut self) -> Self {
        self.shot_type = ShotType::ThreePoint;
        self
    }

    fn zone(mut self, zone: &str) -> Self {
        self.basic_zone = Some(zone.to_string());
        self
    }

    fn distance(mut self, feet: f64) -> Self {
        self.shot_distance = Some(feet);
        self
    }

    fn clock(mut self, quarter: u32, mins: u32, secs: u32) -> Self {
        self.quarter = Some(quarter);
        self.mins_left = Some(mins);
        self.secs_left = Some(secs);
        self
    }

    fn game(mut self, id: &str) -> Self {
        self.game_id = Some(id.to_string());
        self
    }
}

/// `count` copies of a record.
pub fn repeat(record: ShotRecord, count: usize) -> Vec<ShotRecord> {
    vec![record; count]
}

pub fn log_of(records: Vec<ShotRecord>) -> ShotLog {
    ShotLog {
        columns: Vec::new(),
        sources: vec![SourceFile::new(PathBuf::from("test.csv"), 0, Vec::new())],
        records,
    }
}
