// Configuration loading and parsing (pipeline.toml, teams.toml).

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::views::ViewKind;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub thresholds: Thresholds,
    pub views: ViewsConfig,
    pub teams: TeamsConfig,
}

// ---------------------------------------------------------------------------
// pipeline.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire pipeline.toml file.
#[derive(Debug, Clone, Deserialize)]
struct PipelineFile {
    input: InputConfig,
    output: OutputConfig,
    thresholds: Thresholds,
    views: ViewsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Directory holding one shot-log CSV per season. Relative paths are
    /// resolved against the directory the config was loaded from.
    pub data_dir: PathBuf,
    /// Glob matched against file names inside `data_dir`. The season year is
    /// the first run of four digits in the matched file name.
    pub file_pattern: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub master_file: String,
    pub sample_file: String,
    pub sample_size: usize,
    #[serde(default = "default_sample_seed")]
    pub sample_seed: u64,
    /// Written in the combined table wherever a record's source file did not
    /// carry the column.
    #[serde(default = "default_missing_marker")]
    pub missing_marker: String,
}

/// Minimum-volume cutoffs. These are tuning knobs for what counts as a
/// meaningful sample, not properties of the data.
#[derive(Debug, Clone, Deserialize)]
pub struct Thresholds {
    /// Shots in a season before a player gets a player-season row.
    pub player_min_shots: u32,
    /// Three-point attempts in a season before that season counts toward the
    /// shooter leaderboard.
    pub shooter_min_three_attempts: u32,
    /// Career made threes (over qualifying seasons) to enter the leaderboard.
    pub career_min_made_threes: u32,
    /// Qualifying seasons to enter the leaderboard.
    pub career_min_seasons: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewsConfig {
    pub leaderboard_size: usize,
    /// Players featured in the `key_players` view, in display order.
    #[serde(default = "default_key_players")]
    pub key_players: Vec<String>,
    /// Views to write. The combined table, sample, dashboard and metadata are
    /// always written.
    #[serde(default = "ViewKind::all")]
    pub emit: Vec<ViewKind>,
}

fn default_sample_seed() -> u64 {
    42
}

fn default_missing_marker() -> String {
    "NA".into()
}

fn default_key_players() -> Vec<String> {
    [
        "Stephen Curry",
        "James Harden",
        "Klay Thompson",
        "Ray Allen",
        "Damian Lillard",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

// ---------------------------------------------------------------------------
// teams.toml structs
// ---------------------------------------------------------------------------

/// Static franchise tables: historical name aliases and the
/// conference/division membership of current teams.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamsConfig {
    /// Historical or relocated name -> current canonical name.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    /// Conferences in display order.
    #[serde(default)]
    pub conferences: Vec<ConferenceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConferenceConfig {
    pub name: String,
    pub divisions: Vec<DivisionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DivisionConfig {
    pub name: String,
    pub teams: Vec<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/pipeline.toml` and
/// `config/teams.toml`, both relative to `base_dir`.
///
/// Does not write defaults; prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let pipeline_path = config_dir.join("pipeline.toml");
    let pipeline_text = read_file(&pipeline_path)?;
    let pipeline: PipelineFile =
        toml::from_str(&pipeline_text).map_err(|e| ConfigError::ParseError {
            path: pipeline_path.clone(),
            source: e,
        })?;

    let teams_path = config_dir.join("teams.toml");
    let teams_text = read_file(&teams_path)?;
    let teams: TeamsConfig = toml::from_str(&teams_text).map_err(|e| ConfigError::ParseError {
        path: teams_path.clone(),
        source: e,
    })?;

    let mut input = pipeline.input;
    input.data_dir = resolve(base_dir, &input.data_dir);
    let mut output = pipeline.output;
    output.dir = resolve(base_dir, &output.dir);

    let config = Config {
        input,
        output,
        thresholds: pipeline.thresholds,
        views: pipeline.views,
        teams,
    };

    validate(&config)?;

    Ok(config)
}

/// Shipped configuration, compiled in so first-run setup does not depend on
/// where the binary is started from.
const SHIPPED_DEFAULTS: &[(&str, &str)] = &[
    ("pipeline.toml", include_str!("../defaults/pipeline.toml")),
    ("teams.toml", include_str!("../defaults/teams.toml")),
];

/// Write any shipped config file that is missing from `base_dir/config/`.
/// Existing files are left untouched. Returns the paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let config_dir = base_dir.join("config");
    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("cannot create {}: {e}", config_dir.display()),
    })?;

    let mut written = Vec::new();
    for (name, contents) in SHIPPED_DEFAULTS {
        let target = config_dir.join(name);
        if write_new(&target, contents)? {
            written.push(target);
        }
    }
    Ok(written)
}

/// `Ok(false)` when `path` already exists.
fn write_new(path: &Path, contents: &str) -> Result<bool, ConfigError> {
    use std::io::Write;

    let file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path);
    let mut file = match file {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(ConfigError::DefaultsCopyError {
                message: format!("cannot create {}: {e}", path.display()),
            })
        }
    };
    file.write_all(contents.as_bytes())
        .map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("cannot write {}: {e}", path.display()),
        })?;
    Ok(true)
}

/// Loads config from `config/` under the current working directory, writing
/// the shipped defaults there first if any file is missing. Relative data and
/// output paths then resolve against the working directory too.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub(crate) fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.input.file_pattern.trim().is_empty() {
        return Err(invalid("input.file_pattern", "must not be empty"));
    }
    if let Err(e) = glob::Pattern::new(&config.input.file_pattern) {
        return Err(invalid("input.file_pattern", format!("invalid glob: {e}")));
    }

    let output = &config.output;
    let file_fields: &[(&str, &str)] = &[
        ("output.master_file", &output.master_file),
        ("output.sample_file", &output.sample_file),
    ];
    for (name, val) in file_fields {
        if val.trim().is_empty() {
            return Err(invalid(*name, "must not be empty"));
        }
    }
    if output.master_file == output.sample_file {
        return Err(invalid(
            "output.sample_file",
            "must differ from output.master_file",
        ));
    }

    let t = &config.thresholds;
    let size_fields: &[(&str, usize)] = &[
        ("output.sample_size", output.sample_size),
        ("views.leaderboard_size", config.views.leaderboard_size),
        ("thresholds.player_min_shots", t.player_min_shots as usize),
        ("thresholds.career_min_seasons", t.career_min_seasons),
    ];
    for (name, val) in size_fields {
        if *val == 0 {
            return Err(invalid(*name, "must be > 0"));
        }
    }

    validate_teams(&config.teams)
}

fn validate_teams(teams: &TeamsConfig) -> Result<(), ConfigError> {
    // An alias pointing at another alias would make normalization depend on
    // how many times it is applied.
    for (alias, canonical) in &teams.aliases {
        if canonical.trim().is_empty() {
            return Err(invalid(format!("aliases.{alias}"), "canonical name is empty"));
        }
        if alias != canonical && teams.aliases.contains_key(canonical) {
            return Err(invalid(
                format!("aliases.{alias}"),
                format!("target `{canonical}` is itself an alias"),
            ));
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for conference in &teams.conferences {
        for division in &conference.divisions {
            for team in &division.teams {
                if !seen.insert(team.as_str()) {
                    return Err(invalid(
                        format!("conferences.{}.{}", conference.name, division.name),
                        format!("team `{team}` is listed in more than one division"),
                    ));
                }
                if teams.aliases.get(team).is_some_and(|c| c != team) {
                    return Err(invalid(
                        format!("conferences.{}.{}", conference.name, division.name),
                        format!("team `{team}` is a historical alias, list its canonical name"),
                    ));
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
