// Shot-log discovery and loading.
//
// One CSV per season, named with its 4-digit year (NBA_2004_Shots.csv). Each
// file is checked for the required columns, parsed into typed records and
// appended to a single ShotLog whose column set is the union of all headers.

use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::InputConfig;
use crate::record::{ShotLog, ShotRecord, ShotType, SourceFile};

/// Columns a file must carry to be loaded at all.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "PLAYER_NAME",
    "SHOT_TYPE",
    "SHOT_MADE",
    "SEASON_1",
    "SEASON_2",
];

// ---------------------------------------------------------------------------
// Error and report types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read data directory {path}: {source}")]
    DataDir {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("no valid shot-log files in {dir} matching '{pattern}' ({skipped} skipped)")]
    NoValidFiles {
        dir: String,
        pattern: String,
        skipped: usize,
    },
}

/// Outcome for one file that was loaded.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub year: i32,
    pub rows_loaded: usize,
    pub rows_skipped: usize,
}

/// A candidate file that was not loaded, and why.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub files: Vec<FileReport>,
    pub skipped: Vec<SkippedFile>,
}

impl LoadReport {
    pub fn rows_skipped(&self) -> usize {
        self.files.iter().map(|f| f.rows_skipped).sum()
    }
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// Shot-log CSV row. Only the required columns are mandatory; everything
/// else may be absent from a given season's file. Unknown columns are
/// ignored here and survive through `ShotRecord::raw`.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawShot {
    PLAYER_NAME: String,
    SEASON_1: String,
    SEASON_2: String,
    SHOT_TYPE: ShotType,
    #[serde(deserialize_with = "de_flag")]
    SHOT_MADE: bool,
    #[serde(default)]
    PLAYER_ID: Option<String>,
    #[serde(default)]
    TEAM_NAME: Option<String>,
    #[serde(default)]
    TEAM_ID: Option<String>,
    #[serde(default)]
    POSITION: Option<String>,
    #[serde(default)]
    GAME_ID: Option<String>,
    #[serde(default)]
    GAME_DATE: Option<String>,
    #[serde(default)]
    EVENT_TYPE: Option<String>,
    #[serde(default)]
    ACTION_TYPE: Option<String>,
    #[serde(default)]
    BASIC_ZONE: Option<String>,
    #[serde(default)]
    ZONE_NAME: Option<String>,
    #[serde(default)]
    ZONE_ABB: Option<String>,
    #[serde(default)]
    ZONE_RANGE: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    LOC_X: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    LOC_Y: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    SHOT_DISTANCE: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_count")]
    QUARTER: Option<u32>,
    #[serde(default, deserialize_with = "de_opt_minutes")]
    MINS_LEFT: Option<u32>,
    #[serde(default, deserialize_with = "de_opt_seconds")]
    SECS_LEFT: Option<u32>,
}

fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid made flag '{raw}'")))
}

fn de_opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => {
            let v: f64 = s
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid number '{s}'")))?;
            Ok(v.is_finite().then_some(v))
        }
    }
}

/// Clock and quarter columns: whole numbers, sometimes written as `3.0`.
fn de_opt_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = de_opt_f64(deserializer)?;
    match value {
        None => Ok(None),
        Some(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => Ok(Some(v as u32)),
        Some(v) => Err(serde::de::Error::custom(format!(
            "expected a whole non-negative number, got {v}"
        ))),
    }
}

/// Longest period clock, in minutes.
const MAX_CLOCK_MINUTES: u32 = 60;

fn de_opt_minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    match de_opt_count(deserializer)? {
        Some(m) if m > MAX_CLOCK_MINUTES => Err(serde::de::Error::custom(format!(
            "MINS_LEFT {m} exceeds {MAX_CLOCK_MINUTES}"
        ))),
        other => Ok(other),
    }
}

fn de_opt_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    match de_opt_count(deserializer)? {
        Some(s) if s >= 60 => Err(serde::de::Error::custom(format!(
            "SECS_LEFT {s} is not below 60"
        ))),
        other => Ok(other),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Made-flag spellings seen across seasons.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" | "t" | "yes" | "made" => Some(true),
        "false" | "0" | "0.0" | "f" | "no" | "missed" => Some(false),
        _ => None,
    }
}

/// The first run of four ASCII digits in a file name.
pub fn year_from_file_name(name: &str) -> Option<i32> {
    let bytes = name.as_bytes();
    bytes
        .windows(4)
        .position(|w| w.iter().all(u8::is_ascii_digit))
        .and_then(|start| name[start..start + 4].parse().ok())
}

/// Season label for a record: `SEASON_1-<last two chars of SEASON_2>` when
/// both markers are present, otherwise derived from the file year.
pub fn season_label(season_1: &str, season_2: &str, year: i32) -> String {
    let s1 = season_1.trim();
    let s2 = season_2.trim();
    if s1.is_empty() || s2.is_empty() {
        return format!("{year}-{:02}", (year + 1).rem_euclid(100));
    }
    let tail: String = {
        let chars: Vec<char> = s2.chars().collect();
        chars[chars.len().saturating_sub(2)..].iter().collect()
    };
    format!("{s1}-{tail}")
}

/// Required columns absent from a header row.
pub fn missing_required(headers: &[String]) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == col))
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let t = v.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn into_record(
    raw: RawShot,
    row: csv::StringRecord,
    source: usize,
    year: i32,
) -> Result<ShotRecord, String> {
    let player_name = raw.PLAYER_NAME.trim().to_string();
    if player_name.is_empty() {
        return Err("empty PLAYER_NAME".into());
    }
    let season = season_label(&raw.SEASON_1, &raw.SEASON_2, year);
    Ok(ShotRecord {
        source,
        year,
        season,
        player_name,
        player_id: non_empty(raw.PLAYER_ID),
        team_name: non_empty(raw.TEAM_NAME),
        team_id: non_empty(raw.TEAM_ID),
        position: non_empty(raw.POSITION),
        game_id: non_empty(raw.GAME_ID),
        game_date: non_empty(raw.GAME_DATE),
        event_type: non_empty(raw.EVENT_TYPE),
        action_type: non_empty(raw.ACTION_TYPE),
        made: raw.SHOT_MADE,
        shot_type: raw.SHOT_TYPE,
        basic_zone: non_empty(raw.BASIC_ZONE),
        zone_name: non_empty(raw.ZONE_NAME),
        zone_abb: non_empty(raw.ZONE_ABB),
        zone_range: non_empty(raw.ZONE_RANGE),
        loc_x: raw.LOC_X,
        loc_y: raw.LOC_Y,
        shot_distance: raw.SHOT_DISTANCE,
        quarter: raw.QUARTER,
        mins_left: raw.MINS_LEFT,
        secs_left: raw.SECS_LEFT,
        team: None,
        raw: row,
    })
}

// ---------------------------------------------------------------------------
// Reader-based loading (private, enables testing without temp files)
// ---------------------------------------------------------------------------

/// Parsed contents of one season file.
struct ParsedFile {
    headers: Vec<String>,
    records: Vec<ShotRecord>,
    rows_skipped: usize,
}

#[derive(Debug)]
enum FileFailure {
    MissingColumns(Vec<&'static str>),
    Csv(csv::Error),
}

impl std::fmt::Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFailure::MissingColumns(cols) => {
                write!(f, "missing required columns: {}", cols.join(", "))
            }
            FileFailure::Csv(e) => write!(f, "unreadable CSV: {e}"),
        }
    }
}

fn parse_reader<R: Read>(rdr: R, year: i32, source: usize) -> Result<ParsedFile, FileFailure> {
    let mut reader = csv::Reader::from_reader(rdr);
    let header_record = reader.headers().map_err(FileFailure::Csv)?.clone();
    let headers: Vec<String> = header_record.iter().map(|h| h.trim().to_string()).collect();

    let missing = missing_required(&headers);
    if !missing.is_empty() {
        return Err(FileFailure::MissingColumns(missing));
    }
    let trimmed_headers = csv::StringRecord::from(headers.clone());

    let mut records = Vec::new();
    let mut rows_skipped = 0;
    let mut row = csv::StringRecord::new();
    loop {
        match reader.read_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(FileFailure::Csv(e)),
            Err(e) => {
                warn!("skipping malformed shot row: {}", e);
                rows_skipped += 1;
                continue;
            }
        }
        let parsed = row
            .deserialize::<RawShot>(Some(&trimmed_headers))
            .map_err(|e| e.to_string())
            .and_then(|raw| into_record(raw, row.clone(), source, year));
        match parsed {
            Ok(record) => records.push(record),
            Err(reason) => {
                let line = row.position().map(|p| p.line()).unwrap_or_default();
                warn!("skipping shot row at line {}: {}", line, reason);
                rows_skipped += 1;
            }
        }
    }

    Ok(ParsedFile {
        headers,
        records,
        rows_skipped,
    })
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Find files in `dir` whose names match `pattern` and carry a year, sorted
/// by year then path. Matching names without a year are skipped.
pub fn discover_files(dir: &Path, pattern: &str) -> Result<Vec<(i32, PathBuf)>, LoadError> {
    let matcher = glob::Pattern::new(pattern).map_err(|e| LoadError::Pattern {
        pattern: pattern.to_string(),
        source: e,
    })?;
    let entries = std::fs::read_dir(dir).map_err(|e| LoadError::DataDir {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LoadError::DataDir {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !matcher.matches(name) {
            continue;
        }
        match year_from_file_name(name) {
            Some(year) => found.push((year, path)),
            None => warn!("skipping {}: no 4-digit year in file name", name),
        }
    }
    found.sort();
    Ok(found)
}

/// Load the given season files into one record set. Files that fail to
/// open or lack required columns are skipped; the run fails only when no
/// file loads.
pub fn load_files(files: &[(i32, PathBuf)]) -> (ShotLog, LoadReport) {
    let mut log = ShotLog::default();
    let mut report = LoadReport::default();

    for (year, path) in files {
        let file_label = path.display().to_string();
        let file = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("skipping {}: {}", file_label, e);
                report.skipped.push(SkippedFile {
                    file: file_label,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let source = log.sources.len();
        match parse_reader(file, *year, source) {
            Ok(parsed) => {
                debug!(
                    "{}: {} columns, {} rows, {} skipped",
                    file_label,
                    parsed.headers.len(),
                    parsed.records.len(),
                    parsed.rows_skipped
                );
                log.extend_columns(&parsed.headers);
                report.files.push(FileReport {
                    file: file_label,
                    year: *year,
                    rows_loaded: parsed.records.len(),
                    rows_skipped: parsed.rows_skipped,
                });
                log.sources
                    .push(SourceFile::new(path.clone(), *year, parsed.headers));
                log.records.extend(parsed.records);
            }
            Err(failure) => {
                warn!("skipping {}: {}", file_label, failure);
                report.skipped.push(SkippedFile {
                    file: file_label,
                    reason: failure.to_string(),
                });
            }
        }
    }

    (log, report)
}

/// Discover and load every season file named by the input config.
pub fn load_shot_log(input: &InputConfig) -> Result<(ShotLog, LoadReport), LoadError> {
    let files = discover_files(&input.data_dir, &input.file_pattern)?;
    info!(
        "Found {} shot-log files in {}",
        files.len(),
        input.data_dir.display()
    );

    let (log, report) = load_files(&files);
    if log.sources.is_empty() {
        return Err(LoadError::NoValidFiles {
            dir: input.data_dir.display().to_string(),
            pattern: input.file_pattern.clone(),
            skipped: report.skipped.len(),
        });
    }

    info!(
        "Loaded {} shots from {} files ({} files skipped, {} rows skipped)",
        log.len(),
        log.sources.len(),
        report.skipped.len(),
        report.rows_skipped()
    );
    Ok((log, report))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
