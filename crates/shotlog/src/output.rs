// Artifact writer: per-view CSV/JSON pairs, the combined table, the seeded
// sample, the dashboard bundle and run metadata.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::aggregate::{
    Aggregates, LeagueSeason, PeriodSeason, PlayerSeason, TeamSeason, ThreePointEvolution,
    ZoneSeason,
};
use crate::config::{OutputConfig, ViewsConfig};
use crate::loader::{FileReport, LoadReport, SkippedFile};
use crate::record::{ShotLog, ShotRecord};
use crate::stats::round2;
use crate::views::hierarchy::HierarchyRow;
use crate::views::leaderboard::LeaderboardRow;
use crate::views::{Dashboard, ViewKind, Views};

/// Columns appended to every row of the combined table.
pub const DERIVED_COLUMNS: &[&str] = &[
    "FILE_YEAR",
    "DATA_SOURCE",
    "SEASON",
    "CANONICAL_TEAM",
    "TIME_REMAINING",
    "GAME_PERIOD",
];

pub const DASHBOARD_FILE: &str = "dashboard.json";
pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("failed to write {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

// ---------------------------------------------------------------------------
// View CSV columns
// ---------------------------------------------------------------------------

/// Header of a view CSV, in the row type's serialized field order. Written
/// up front so a view with no rows still gets its header line.
pub trait CsvColumns {
    const COLUMNS: &'static [&'static str];
}

impl<T: CsvColumns + ?Sized> CsvColumns for &T {
    const COLUMNS: &'static [&'static str] = T::COLUMNS;
}

impl CsvColumns for PlayerSeason {
    const COLUMNS: &'static [&'static str] = &[
        "player",
        "season",
        "season_label",
        "total_shots",
        "makes",
        "fg_percentage",
        "three_pt_shots",
        "made_threes",
        "three_pt_rate",
        "three_pt_percentage",
        "avg_distance",
        "three_point_zone_shots",
        "mid_range_shots",
        "paint_shots",
    ];
}

impl CsvColumns for TeamSeason {
    const COLUMNS: &'static [&'static str] = &[
        "team",
        "season",
        "total_shots",
        "makes",
        "fg_percentage",
        "three_pt_shots",
        "three_pt_made",
        "three_pt_rate",
        "three_pt_percentage",
        "two_pt_shots",
        "two_pt_made",
        "two_pt_percentage",
        "mid_range_shots",
        "mid_range_rate",
        "paint_shots",
        "paint_rate",
        "efg_percentage",
        "unique_players",
        "games_played",
    ];
}

impl CsvColumns for ZoneSeason {
    const COLUMNS: &'static [&'static str] = &[
        "shot_type",
        "basic_zone",
        "season",
        "makes",
        "attempts",
        "fg_percentage",
        "avg_distance",
        "distance_std",
        "unique_players",
    ];
}

impl CsvColumns for PeriodSeason {
    const COLUMNS: &'static [&'static str] = &[
        "game_period",
        "shot_type",
        "season",
        "makes",
        "attempts",
        "fg_percentage",
        "avg_time_remaining",
    ];
}

impl CsvColumns for LeagueSeason {
    const COLUMNS: &'static [&'static str] = &[
        "season",
        "total_shots",
        "three_pt_rate",
        "mid_range_rate",
        "fg_percentage",
        "efg_percentage",
        "three_pt_shots",
        "mid_range_shots",
    ];
}

impl CsvColumns for LeaderboardRow<'_> {
    const COLUMNS: &'static [&'static str] = &[
        "rank",
        "player",
        "career_threes",
        "career_attempts",
        "career_accuracy",
        "peak_threes",
        "peak_season",
        "seasons",
    ];
}

impl CsvColumns for HierarchyRow<'_> {
    const COLUMNS: &'static [&'static str] = &[
        "conference",
        "division",
        "team",
        "seasons",
        "first_season",
        "last_season",
        "total_shots",
    ];
}

// ---------------------------------------------------------------------------
// Low-level writers
// ---------------------------------------------------------------------------

fn write_csv<T, I>(path: &Path, rows: I) -> Result<(), EmitError>
where
    T: Serialize + CsvColumns,
    I: IntoIterator<Item = T>,
{
    let csv_err = |source| EmitError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    writer.write_record(T::COLUMNS).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), EmitError> {
    let file = File::create(path).map_err(|source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| EmitError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Write `<name>.csv` and `<name>.json` for one view. Returns both paths.
pub fn write_view(
    dir: &Path,
    kind: ViewKind,
    aggregates: &Aggregates,
    views: &Views,
) -> Result<[PathBuf; 2], EmitError> {
    let csv_path = dir.join(format!("{}.csv", kind.name()));
    let json_path = dir.join(format!("{}.json", kind.name()));

    match kind {
        ViewKind::PlayerCareer => {
            write_csv(&csv_path, views.player_careers.iter().flat_map(|c| &c.seasons))?;
            write_json(&json_path, &views.player_careers)?;
        }
        ViewKind::TeamSeason => {
            write_csv(&csv_path, views.team_histories.iter().flat_map(|t| &t.seasons))?;
            write_json(&json_path, &views.team_histories)?;
        }
        ViewKind::ShotAnalytics => {
            write_csv(&csv_path, &aggregates.zone_seasons)?;
            write_json(&json_path, &aggregates.zone_seasons)?;
        }
        ViewKind::SituationAnalytics => {
            write_csv(&csv_path, &aggregates.period_seasons)?;
            write_json(&json_path, &aggregates.period_seasons)?;
        }
        ViewKind::LeagueTrends => {
            write_csv(&csv_path, &aggregates.league_seasons)?;
            write_json(&json_path, &aggregates.league_seasons)?;
        }
        ViewKind::TopShooters => {
            write_csv(&csv_path, views.leaderboard.iter().map(|e| e.row()))?;
            write_json(&json_path, &views.leaderboard)?;
        }
        ViewKind::TeamsByConference => {
            write_csv(&csv_path, views.hierarchy.rows())?;
            write_json(&json_path, &views.hierarchy)?;
        }
        ViewKind::KeyPlayers => {
            write_csv(&csv_path, views.key_players.iter().flat_map(|c| &c.seasons))?;
            write_json(&json_path, &views.key_players)?;
        }
    }

    debug!("Wrote view {}", kind.name());
    Ok([csv_path, json_path])
}

// ---------------------------------------------------------------------------
// Combined table and sample
// ---------------------------------------------------------------------------

/// Header of the combined table: the column union, then the derived columns
/// that do not shadow a source column.
pub fn master_columns(log: &ShotLog) -> Vec<String> {
    let mut columns = log.columns.clone();
    columns.extend(derived_columns(log).into_iter().map(str::to_string));
    columns
}

fn derived_columns(log: &ShotLog) -> Vec<&'static str> {
    DERIVED_COLUMNS
        .iter()
        .copied()
        .filter(|d| !log.columns.iter().any(|c| c == d))
        .collect()
}

fn derived_value(column: &str, log: &ShotLog, record: &ShotRecord, missing: &str) -> String {
    match column {
        "FILE_YEAR" => record.year.to_string(),
        "DATA_SOURCE" => log.sources[record.source].file_name(),
        "SEASON" => record.season.clone(),
        "CANONICAL_TEAM" => record.team.clone().unwrap_or_else(|| missing.to_string()),
        "TIME_REMAINING" => record
            .time_remaining()
            .map(|t| t.to_string())
            .unwrap_or_else(|| missing.to_string()),
        "GAME_PERIOD" => record.game_period().label().to_string(),
        _ => missing.to_string(),
    }
}

fn write_records<'a, I>(
    path: &Path,
    log: &ShotLog,
    records: I,
    missing: &str,
) -> Result<(), EmitError>
where
    I: IntoIterator<Item = &'a ShotRecord>,
{
    let csv_err = |source| EmitError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let derived = derived_columns(log);
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(master_columns(log)).map_err(csv_err)?;

    for record in records {
        let extra: Vec<String> = derived
            .iter()
            .map(|d| derived_value(d, log, record, missing))
            .collect();
        let mut row = log.row(record, missing);
        row.extend(extra.iter().map(String::as_str));
        writer.write_record(&row).map_err(csv_err)?;
    }

    writer.flush().map_err(|source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Indices of `min(size, total)` records drawn without replacement by a
/// generator seeded with `seed`, ascending so the sample keeps log order.
pub fn sample_indices(total: usize, size: usize, seed: u64) -> Vec<usize> {
    let amount = size.min(total);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut indices = rand::seq::index::sample(&mut rng, total, amount).into_vec();
    indices.sort_unstable();
    indices
}

pub fn write_master(path: &Path, log: &ShotLog, missing: &str) -> Result<(), EmitError> {
    write_records(path, log, &log.records, missing)?;
    info!("Wrote combined table ({} records) to {}", log.len(), path.display());
    Ok(())
}

pub fn write_sample(path: &Path, log: &ShotLog, output: &OutputConfig) -> Result<usize, EmitError> {
    let indices = sample_indices(log.len(), output.sample_size, output.sample_seed);
    write_records(
        path,
        log,
        indices.iter().map(|&i| &log.records[i]),
        &output.missing_marker,
    )?;
    info!("Wrote sample ({} records) to {}", indices.len(), path.display());
    Ok(indices.len())
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct YearRange {
    pub start_year: i32,
    pub end_year: i32,
}

/// Combined-table and sample sizes in MiB, plus the byte size of every file
/// written before the metadata.
#[derive(Debug, Serialize)]
pub struct FileSizes {
    #[serde(serialize_with = "round2")]
    pub master_csv_mb: f64,
    #[serde(serialize_with = "round2")]
    pub sample_csv_mb: f64,
    pub files: BTreeMap<String, u64>,
}

/// Field names are read by downstream drift checks; keep them stable.
#[derive(Debug, Serialize)]
pub struct Metadata<'a> {
    pub creation_date: String,
    pub total_shots: usize,
    pub date_range: Option<YearRange>,
    pub unique_players: usize,
    pub unique_teams: usize,
    pub columns: Vec<String>,
    pub file_sizes: FileSizes,
    pub analysis_datasets: Vec<&'static str>,
    pub files_loaded: &'a [FileReport],
    pub skipped_files: &'a [SkippedFile],
    pub rows_skipped: usize,
    pub unassigned_teams: &'a [String],
    pub missing_teams: &'a [String],
    pub three_pt_evolution: Option<ThreePointEvolution>,
}

fn file_len(path: &Path) -> Result<u64, EmitError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| EmitError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn mebibytes(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

fn file_sizes(master: &Path, sample: &Path, paths: &[PathBuf]) -> Result<FileSizes, EmitError> {
    let mut files = BTreeMap::new();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        files.insert(name, file_len(path)?);
    }
    Ok(FileSizes {
        master_csv_mb: mebibytes(file_len(master)?),
        sample_csv_mb: mebibytes(file_len(sample)?),
        files,
    })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Everything one run hands to the emitter.
pub struct Artifacts<'a> {
    pub log: &'a ShotLog,
    pub report: &'a LoadReport,
    pub aggregates: &'a Aggregates,
    pub views: &'a Views,
}

/// Write every artifact into `output.dir` and return the written paths in
/// order, metadata last.
pub fn emit_all(
    output: &OutputConfig,
    views_config: &ViewsConfig,
    artifacts: &Artifacts<'_>,
) -> Result<Vec<PathBuf>, EmitError> {
    let dir = output.dir.as_path();
    fs::create_dir_all(dir).map_err(|source| EmitError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();

    let master = dir.join(&output.master_file);
    write_master(&master, artifacts.log, &output.missing_marker)?;
    written.push(master.clone());

    let sample = dir.join(&output.sample_file);
    write_sample(&sample, artifacts.log, output)?;
    written.push(sample.clone());

    let mut emitted: Vec<ViewKind> = Vec::new();
    for &kind in &views_config.emit {
        if emitted.contains(&kind) {
            continue;
        }
        written.extend(write_view(dir, kind, artifacts.aggregates, artifacts.views)?);
        emitted.push(kind);
    }

    let dashboard = dir.join(DASHBOARD_FILE);
    write_json(&dashboard, &Dashboard::new(artifacts.aggregates, artifacts.views))?;
    written.push(dashboard);

    let log = artifacts.log;
    let metadata = Metadata {
        creation_date: chrono::Utc::now().to_rfc3339(),
        total_shots: log.len(),
        date_range: log.years().map(|(start_year, end_year)| YearRange {
            start_year,
            end_year,
        }),
        unique_players: log
            .records
            .iter()
            .map(|r| r.player_name.as_str())
            .collect::<HashSet<_>>()
            .len(),
        unique_teams: log
            .records
            .iter()
            .filter_map(|r| r.team.as_deref())
            .collect::<HashSet<_>>()
            .len(),
        columns: master_columns(log),
        file_sizes: file_sizes(&master, &sample, &written)?,
        analysis_datasets: emitted.iter().map(|k| k.name()).collect(),
        files_loaded: &artifacts.report.files,
        skipped_files: &artifacts.report.skipped,
        rows_skipped: artifacts.report.rows_skipped(),
        unassigned_teams: &artifacts.views.hierarchy.unassigned,
        missing_teams: &artifacts.views.hierarchy.missing,
        three_pt_evolution: ThreePointEvolution::from_trends(&artifacts.aggregates.league_seasons),
    };
    let metadata_path = dir.join(METADATA_FILE);
    write_json(&metadata_path, &metadata)?;
    written.push(metadata_path);

    info!("Wrote {} files to {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_all;
    use crate::config::{ConferenceConfig, DivisionConfig, TeamsConfig, Thresholds};
    use crate::record::SourceFile;
    use crate::teams::TeamDirectory;
    use crate::testutil::{log_of, repeat, shot, ShotExt};
    use crate::views::build_views;

    fn thresholds() -> Thresholds {
        Thresholds {
            player_min_shots: 50,
            shooter_min_three_attempts: 20,
            career_min_made_threes: 200,
            career_min_seasons: 3,
        }
    }

    fn views_config() -> ViewsConfig {
        ViewsConfig {
            leaderboard_size: 10,
            key_players: vec!["Shooter".to_string()],
            emit: ViewKind::all(),
        }
    }

    fn pacific() -> TeamDirectory {
        TeamDirectory::from_config(&TeamsConfig {
            aliases: Default::default(),
            conferences: vec![ConferenceConfig {
                name: "Western Conference".into(),
                divisions: vec![DivisionConfig {
                    name: "Pacific".into(),
                    teams: vec!["Phoenix Suns".into()],
                }],
            }],
        })
    }

    fn serialized_header<T: Serialize>(row: T) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(row).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        text.lines().next().unwrap().to_string()
    }

    fn assert_columns<T: Serialize + CsvColumns>(row: T) {
        assert_eq!(serialized_header(row), T::COLUMNS.join(","));
    }

    #[test]
    fn sample_is_deterministic_and_ordered() {
        let a = sample_indices(1000, 100, 42);
        let b = sample_indices(1000, 100, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
        assert_ne!(a, sample_indices(1000, 100, 7));
    }

    #[test]
    fn sample_larger_than_log_takes_everything() {
        assert_eq!(sample_indices(5, 100, 42), vec![0, 1, 2, 3, 4]);
        assert!(sample_indices(0, 100, 42).is_empty());
    }

    #[test]
    fn master_table_has_union_and_derived_columns() {
        let dir = tempfile::tempdir().unwrap();
        let headers = vec!["PLAYER_NAME".to_string(), "EXTRA".to_string()];
        let mut record = shot("Nash", "Phoenix Suns", 2006).clock(4, 1, 5);
        record.raw = csv::StringRecord::from(vec!["Nash"]);

        let mut log = log_of(vec![record]);
        log.sources = vec![SourceFile::new(
            PathBuf::from("NBA_2006_Shots.csv"),
            2006,
            vec!["PLAYER_NAME".to_string()],
        )];
        log.columns = headers;

        let path = dir.path().join("master.csv");
        write_master(&path, &log, "NA").unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(&header[..2], &["PLAYER_NAME", "EXTRA"]);
        assert_eq!(&header[2..], DERIVED_COLUMNS);

        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "Nash");
        assert_eq!(&row[1], "NA");
        assert_eq!(&row[2], "2006");
        assert_eq!(&row[3], "NBA_2006_Shots.csv");
        assert_eq!(&row[5], "Phoenix Suns");
        assert_eq!(&row[6], "65");
        assert_eq!(&row[7], "Q4");
    }

    #[test]
    fn source_column_shadows_derived_column() {
        let mut log = log_of(Vec::new());
        log.columns = vec!["SEASON".to_string(), "PLAYER_NAME".to_string()];
        let columns = master_columns(&log);
        assert_eq!(columns.iter().filter(|c| *c == "SEASON").count(), 1);
        assert_eq!(columns.len(), 2 + DERIVED_COLUMNS.len() - 1);
    }

    #[test]
    fn column_lists_match_serialized_rows() {
        let mut records = Vec::new();
        for year in [2010, 2011, 2012] {
            let three = shot("Shooter", "Phoenix Suns", year)
                .three()
                .made()
                .zone("Above the Break 3")
                .distance(25.0)
                .clock(2, 5, 30);
            records.extend(repeat(three, 80));
        }
        let log = log_of(records);
        let config = views_config();
        let aggregates = aggregate_all(&log, &thresholds(), &config.key_players);
        let views = build_views(&aggregates, &pacific(), &thresholds(), &config);

        assert_columns(&aggregates.player_seasons[0]);
        assert_columns(&aggregates.key_player_seasons[0]);
        assert_columns(&aggregates.team_seasons[0]);
        assert_columns(&aggregates.zone_seasons[0]);
        assert_columns(&aggregates.period_seasons[0]);
        assert_columns(&aggregates.league_seasons[0]);
        assert_columns(views.leaderboard[0].row());
        assert_columns(views.hierarchy.rows().remove(0));
    }

    #[test]
    fn empty_views_still_get_header_row() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_of(repeat(shot("Rookie", "Phoenix Suns", 2020), 3));
        let config = views_config();
        let aggregates = aggregate_all(&log, &thresholds(), &[]);
        let views = build_views(&aggregates, &TeamDirectory::default(), &thresholds(), &config);
        assert!(views.leaderboard.is_empty());
        assert!(views.key_players.is_empty());
        assert!(aggregates.player_seasons.is_empty());

        for (kind, columns, empty_json) in [
            (ViewKind::TopShooters, LeaderboardRow::COLUMNS, "[]"),
            (ViewKind::KeyPlayers, PlayerSeason::COLUMNS, "[]"),
            (ViewKind::PlayerCareer, PlayerSeason::COLUMNS, "[]"),
            (ViewKind::TeamsByConference, HierarchyRow::COLUMNS, "{}"),
        ] {
            let [csv_path, json_path] =
                write_view(dir.path(), kind, &aggregates, &views).unwrap();
            let text = fs::read_to_string(&csv_path).unwrap();
            assert_eq!(text, format!("{}\n", columns.join(",")), "{}", kind.name());
            assert_eq!(fs::read_to_string(&json_path).unwrap().trim(), empty_json);
        }
    }
}
