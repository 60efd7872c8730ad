// Typed shot records and the unified multi-season record set.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Shot classification
// ---------------------------------------------------------------------------

/// Field-goal value of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ShotType {
    #[serde(rename = "2PT Field Goal")]
    TwoPoint,
    #[serde(rename = "3PT Field Goal")]
    ThreePoint,
}

impl ShotType {
    /// Parse the `SHOT_TYPE` column. Accepts the shot-log labels and the
    /// short `2PT`/`3PT` forms.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "2PT FIELD GOAL" | "2PT" => Some(Self::TwoPoint),
            "3PT FIELD GOAL" | "3PT" => Some(Self::ThreePoint),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TwoPoint => "2PT Field Goal",
            Self::ThreePoint => "3PT Field Goal",
        }
    }

    pub fn points(self) -> u32 {
        match self {
            Self::TwoPoint => 2,
            Self::ThreePoint => 3,
        }
    }
}

impl fmt::Display for ShotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ShotType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ShotType::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown shot type '{raw}'")))
    }
}

/// Game-period bucket derived from the quarter number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GamePeriod {
    Q1,
    Q2,
    Q3,
    Q4,
    OT,
}

impl GamePeriod {
    /// Quarters 1-4 map to their own bucket; anything else, including an
    /// absent quarter, is overtime.
    pub fn from_quarter(quarter: Option<u32>) -> Self {
        match quarter {
            Some(1) => Self::Q1,
            Some(2) => Self::Q2,
            Some(3) => Self::Q3,
            Some(4) => Self::Q4,
            _ => Self::OT,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
            Self::OT => "OT",
        }
    }
}

impl fmt::Display for GamePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const RESTRICTED_AREA: &str = "Restricted Area";
pub const PAINT_NON_RA: &str = "In The Paint (Non-RA)";
pub const MID_RANGE: &str = "Mid-Range";
const THREE_POINT_ZONES: &[&str] = &["Left Corner 3", "Right Corner 3", "Above the Break 3"];

/// Coarse court region used by the zone breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneGroup {
    ThreePoint,
    MidRange,
    Paint,
    Other,
}

impl ZoneGroup {
    pub fn classify(basic_zone: Option<&str>) -> Self {
        match basic_zone {
            Some(z) if THREE_POINT_ZONES.contains(&z) => Self::ThreePoint,
            Some(MID_RANGE) => Self::MidRange,
            Some(RESTRICTED_AREA) | Some(PAINT_NON_RA) => Self::Paint,
            _ => Self::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// ShotRecord
// ---------------------------------------------------------------------------

/// One field-goal attempt, validated at load time.
///
/// `raw` keeps the source CSV row so the combined table can be re-emitted
/// with every source column; `source` indexes into `ShotLog::sources`.
#[derive(Debug, Clone)]
pub struct ShotRecord {
    pub source: usize,
    pub year: i32,
    pub season: String,
    pub player_name: String,
    pub player_id: Option<String>,
    pub team_name: Option<String>,
    pub team_id: Option<String>,
    pub position: Option<String>,
    pub game_id: Option<String>,
    pub game_date: Option<String>,
    pub event_type: Option<String>,
    pub action_type: Option<String>,
    pub made: bool,
    pub shot_type: ShotType,
    pub basic_zone: Option<String>,
    pub zone_name: Option<String>,
    pub zone_abb: Option<String>,
    pub zone_range: Option<String>,
    pub loc_x: Option<f64>,
    pub loc_y: Option<f64>,
    pub shot_distance: Option<f64>,
    pub quarter: Option<u32>,
    pub mins_left: Option<u32>,
    pub secs_left: Option<u32>,
    /// Filled in by the normalizer.
    pub team: Option<String>,
    pub raw: csv::StringRecord,
}

impl ShotRecord {
    pub fn is_three(&self) -> bool {
        self.shot_type == ShotType::ThreePoint
    }

    pub fn zone_group(&self) -> ZoneGroup {
        ZoneGroup::classify(self.basic_zone.as_deref())
    }

    pub fn game_period(&self) -> GamePeriod {
        GamePeriod::from_quarter(self.quarter)
    }

    /// Seconds left in the period, when both clock fields are present and
    /// the total fits in a `u32`.
    pub fn time_remaining(&self) -> Option<u32> {
        let (m, s) = (self.mins_left?, self.secs_left?);
        m.checked_mul(60)?.checked_add(s)
    }
}

// ---------------------------------------------------------------------------
// ShotLog
// ---------------------------------------------------------------------------

/// One input file that passed validation.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub year: i32,
    pub headers: Vec<String>,
    index: HashMap<String, usize>,
}

impl SourceFile {
    pub fn new(path: PathBuf, year: i32, headers: Vec<String>) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        Self {
            path,
            year,
            headers,
            index,
        }
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// All seasons concatenated. `columns` is the union of every source header
/// in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ShotLog {
    pub columns: Vec<String>,
    pub sources: Vec<SourceFile>,
    pub records: Vec<ShotRecord>,
}

impl ShotLog {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add a source header to the column union, keeping first-seen order.
    pub(crate) fn extend_columns(&mut self, headers: &[String]) {
        for h in headers {
            if !self.columns.iter().any(|c| c == h) {
                self.columns.push(h.clone());
            }
        }
    }

    /// Raw value of `column` for a record, or `None` when the record's source
    /// file does not have that column.
    pub fn cell<'a>(&self, record: &'a ShotRecord, column: &str) -> Option<&'a str> {
        let idx = self.sources[record.source].column_index(column)?;
        record.raw.get(idx)
    }

    /// Record values for every union column, with `missing` standing in for
    /// columns the source file lacked.
    pub fn row<'a>(&self, record: &'a ShotRecord, missing: &'a str) -> Vec<&'a str> {
        let source = &self.sources[record.source];
        self.columns
            .iter()
            .map(|c| {
                source
                    .column_index(c)
                    .and_then(|i| record.raw.get(i))
                    .unwrap_or(missing)
            })
            .collect()
    }

    pub fn years(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
