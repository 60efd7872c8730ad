// End-to-end runs of the shot-log pipeline over generated season files in a
// temporary project directory, configured from the shipped defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use shotlog::config::{load_config_from, Config};
use shotlog::pipeline;
use shotlog::views::ViewKind;

// ===========================================================================
// Test helpers
// ===========================================================================

const HEADER: &str = "PLAYER_NAME,TEAM_NAME,GAME_ID,SEASON_1,SEASON_2,SHOT_MADE,SHOT_TYPE,BASIC_ZONE,SHOT_DISTANCE,QUARTER,MINS_LEFT,SECS_LEFT";

/// A project directory with `config/` copied from `defaults/` and an empty
/// `Data/` directory.
fn project() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let config_dir = tmp.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::create_dir_all(tmp.path().join("Data")).unwrap();

    let defaults = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("defaults");
    fs::copy(defaults.join("pipeline.toml"), config_dir.join("pipeline.toml")).unwrap();
    fs::copy(defaults.join("teams.toml"), config_dir.join("teams.toml")).unwrap();

    let pipeline = config_dir.join("pipeline.toml");
    let text = fs::read_to_string(&pipeline).unwrap();
    fs::write(&pipeline, text.replace("sample_size = 100000", "sample_size = 50")).unwrap();
    tmp
}

fn load(root: &Path) -> Config {
    load_config_from(root).unwrap()
}

/// One season file with `shots` rows of which `threes` are three-point
/// attempts, plus one extra column named `extra`.
fn write_season(root: &Path, year: i32, shots: usize, threes: usize, extra: &str) {
    let (home, traded) = if year < 2008 {
        ("Seattle SuperSonics", "Boston Celtics")
    } else {
        ("Oklahoma City Thunder", "Boston Celtics")
    };

    let mut text = format!("{HEADER},{extra}\n");
    for i in 0..shots {
        let three = i < threes;
        let (shot_type, zone, distance) = if three {
            ("3PT Field Goal", "Above the Break 3", 25)
        } else if i % 2 == 0 {
            ("2PT Field Goal", "Mid-Range", 15)
        } else {
            ("2PT Field Goal", "Restricted Area", 2)
        };
        let team = if i % 2 == 0 { home } else { traded };
        text.push_str(&format!(
            "Player {p},{team},g{year}{game},{year},{prev}-{short:02},{made},{shot_type},{zone},{distance},{q},{m},{s},{extra}-{i}\n",
            p = i % 10,
            game = i % 20,
            prev = year - 1,
            short = year % 100,
            made = if i % 3 == 0 { "True" } else { "False" },
            q = i % 5 + 1,
            m = i % 12,
            s = i % 60,
        ));
    }
    fs::write(root.join("Data").join(format!("NBA_{year}_Shots.csv")), text).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn out_dir(config: &Config) -> PathBuf {
    config.output.dir.clone()
}

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn two_seasons_end_to_end() {
    let tmp = project();
    write_season(tmp.path(), 2004, 1000, 100, "OLD_COL");
    write_season(tmp.path(), 2024, 1000, 400, "NEW_COL");
    let config = load(tmp.path());

    let summary = pipeline::run(&config).unwrap();
    assert_eq!(summary.total_shots, 2000);
    assert_eq!(summary.files_loaded, 2);
    assert_eq!(summary.files_skipped, 0);
    assert_eq!(summary.seasons, 2);
    assert!(summary.unassigned_teams.is_empty());

    let out = out_dir(&config);

    // League trend: one entry per season with the expected three-point rates.
    let trends = read_json(&out.join("league_trends.json"));
    let trends = trends.as_array().unwrap();
    assert_eq!(trends.len(), 2);
    assert_eq!(trends[0]["season"], 2004);
    assert_eq!(trends[0]["three_pt_rate"], 10.0);
    assert_eq!(trends[1]["season"], 2024);
    assert_eq!(trends[1]["three_pt_rate"], 40.0);

    // Relocated franchise merges under its current name.
    let teams = read_json(&out.join("team_season.json"));
    let names: Vec<&str> = teams
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["team"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Oklahoma City Thunder"));
    assert!(!names.contains(&"Seattle SuperSonics"));
    let okc = teams
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["team"] == "Oklahoma City Thunder")
        .unwrap();
    assert_eq!(okc["seasons"].as_array().unwrap().len(), 2);

    // Combined table keeps the union of columns, missing cells as NA.
    let mut reader = csv::Reader::from_path(out.join(&config.output.master_file)).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    let old_idx = header.iter().position(|h| h == "OLD_COL").unwrap();
    let new_idx = header.iter().position(|h| h == "NEW_COL").unwrap();
    let team_idx = header.iter().position(|h| h == "CANONICAL_TEAM").unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2000);
    assert_eq!(&rows[0][new_idx], "NA");
    assert_eq!(&rows[0][team_idx], "Oklahoma City Thunder");
    assert_eq!(&rows[1999][old_idx], "NA");
    assert_ne!(&rows[1999][new_idx], "NA");

    // Seeded sample.
    let sample = csv::Reader::from_path(out.join(&config.output.sample_file))
        .unwrap()
        .records()
        .count();
    assert_eq!(sample, 50);

    // Metadata.
    let meta = read_json(&out.join("metadata.json"));
    assert_eq!(meta["total_shots"], 2000);
    assert_eq!(meta["date_range"]["start_year"], 2004);
    assert_eq!(meta["date_range"]["end_year"], 2024);
    assert_eq!(meta["unique_players"], 10);
    assert_eq!(meta["unique_teams"], 2);
    assert_eq!(meta["three_pt_evolution"]["increase_factor"], 4.0);
    assert_eq!(meta["analysis_datasets"].as_array().unwrap().len(), 8);
    assert!(meta["file_sizes"]["files"]["dashboard.json"].as_u64().unwrap() > 0);
    assert!(meta["file_sizes"]["master_csv_mb"].as_f64().is_some());
    assert!(meta["file_sizes"]["sample_csv_mb"].as_f64().is_some());
    assert!(meta["creation_date"].as_str().unwrap().contains('T'));
    assert!(meta.get("created_at").is_none());

    let dashboard = read_json(&out.join("dashboard.json"));
    assert_eq!(dashboard["league_trends"].as_array().unwrap().len(), 2);
    assert!(dashboard["team_conferences"]["Eastern Conference"]["Atlantic"]
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t["team"] == "Boston Celtics"));
    assert_eq!(dashboard["metadata"]["divisions_per_conference"], 3);
    assert_eq!(dashboard["metadata"]["teams_per_division"], 5);

    // None of the default key players appear in generated data: header only.
    let key_players = fs::read_to_string(out.join("key_players.csv")).unwrap();
    assert_eq!(key_players.lines().count(), 1);
    assert!(key_players.starts_with("player,season,season_label,"));

    for kind in ViewKind::all() {
        assert!(out.join(format!("{}.csv", kind.name())).exists());
        assert!(out.join(format!("{}.json", kind.name())).exists());
    }
}

#[test]
fn invalid_file_is_skipped_and_reported() {
    let tmp = project();
    write_season(tmp.path(), 2010, 200, 50, "X");
    fs::write(
        tmp.path().join("Data/NBA_2011_Shots.csv"),
        "PLAYER_NAME,SHOT_MADE\nSomeone,True\n",
    )
    .unwrap();
    let config = load(tmp.path());

    let summary = pipeline::run(&config).unwrap();
    assert_eq!(summary.files_loaded, 1);
    assert_eq!(summary.files_skipped, 1);
    assert_eq!(summary.total_shots, 200);

    let meta = read_json(&config.output.dir.join("metadata.json"));
    let skipped = meta["skipped_files"].as_array().unwrap();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0]["file"].as_str().unwrap().ends_with("NBA_2011_Shots.csv"));
    assert!(skipped[0]["reason"].as_str().unwrap().contains("SHOT_TYPE"));
}

#[test]
fn no_valid_files_aborts() {
    let tmp = project();
    fs::write(tmp.path().join("Data/NBA_2004_Shots.csv"), "A,B\n1,2\n").unwrap();
    let config = load(tmp.path());

    let err = pipeline::run(&config).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("no valid shot-log files"), "{chain}");
    assert!(!config.output.dir.join("metadata.json").exists());
}

#[test]
fn emit_selection_limits_views() {
    let tmp = project();
    write_season(tmp.path(), 2015, 100, 30, "X");
    let mut config = load(tmp.path());
    config.views.emit = vec![ViewKind::LeagueTrends];

    pipeline::run(&config).unwrap();
    let out = out_dir(&config);
    assert!(out.join("league_trends.csv").exists());
    assert!(!out.join("top_shooters.csv").exists());
    assert!(out.join("dashboard.json").exists());
    assert!(out.join(&config.output.master_file).exists());
}

#[test]
fn key_players_view_follows_configured_names() {
    let tmp = project();
    write_season(tmp.path(), 2016, 60, 20, "X");
    let mut config = load(tmp.path());
    config.views.key_players = vec!["Player 3".to_string(), "Player 1".to_string()];
    config.views.emit = vec![ViewKind::KeyPlayers];

    pipeline::run(&config).unwrap();
    let out = out_dir(&config);
    let careers = read_json(&out.join("key_players.json"));
    let careers = careers.as_array().unwrap();
    assert_eq!(careers.len(), 2);
    assert_eq!(careers[0]["player"], "Player 3");
    assert_eq!(careers[1]["player"], "Player 1");
    // Six shots each, well under the player-season volume cutoff.
    assert_eq!(careers[0]["seasons"][0]["total_shots"], 6);
    assert!(!out.join("player_career.csv").exists());
}
