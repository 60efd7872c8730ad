// Franchise identity: historical-name normalization and conference/division
// membership, both built from the teams config.

use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

use crate::config::TeamsConfig;
use crate::record::ShotLog;

/// Where a current franchise sits in the league structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub conference: String,
    pub division: String,
}

/// Lookup tables for team identity. Built once per run from configuration
/// and passed to the stages that need it.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    aliases: HashMap<String, String>,
    members: HashMap<String, Membership>,
    /// (conference, [(division, [team])]) in configured order.
    layout: Vec<(String, Vec<(String, Vec<String>)>)>,
}

impl TeamDirectory {
    pub fn from_config(config: &TeamsConfig) -> Self {
        let mut members = HashMap::new();
        let mut layout = Vec::with_capacity(config.conferences.len());
        for conference in &config.conferences {
            let mut divisions = Vec::with_capacity(conference.divisions.len());
            for division in &conference.divisions {
                for team in &division.teams {
                    members.insert(
                        team.clone(),
                        Membership {
                            conference: conference.name.clone(),
                            division: division.name.clone(),
                        },
                    );
                }
                divisions.push((division.name.clone(), division.teams.clone()));
            }
            layout.push((conference.name.clone(), divisions));
        }
        Self {
            aliases: config.aliases.clone(),
            members,
            layout,
        }
    }

    /// Current name for a possibly historical team name. Names not in the
    /// alias table are already canonical.
    pub fn canonical_team_name<'a>(&'a self, raw: &'a str) -> &'a str {
        let trimmed = raw.trim();
        self.aliases
            .get(trimmed)
            .map(String::as_str)
            .unwrap_or(trimmed)
    }

    pub fn membership(&self, canonical: &str) -> Option<&Membership> {
        self.members.get(canonical)
    }

    pub fn layout(&self) -> &[(String, Vec<(String, Vec<String>)>)] {
        &self.layout
    }

    pub fn has_membership(&self) -> bool {
        !self.members.is_empty()
    }
}

/// Fill in `ShotRecord::team` with the canonical name of every record's raw
/// team. Must run before any team-keyed aggregation.
///
/// Returns canonical names that have no conference membership, each logged
/// once. When no membership table is configured nothing is reported.
pub fn normalize_teams(log: &mut ShotLog, directory: &TeamDirectory) -> Vec<String> {
    let mut renamed = 0usize;
    let mut unknown: BTreeSet<String> = BTreeSet::new();

    for record in &mut log.records {
        let Some(raw) = record.team_name.as_deref() else {
            continue;
        };
        let canonical = directory.canonical_team_name(raw);
        if canonical != raw {
            renamed += 1;
        }
        if directory.has_membership() && directory.membership(canonical).is_none() {
            unknown.insert(canonical.to_string());
        }
        record.team = Some(canonical.to_string());
    }

    for name in &unknown {
        warn!("team '{}' has no conference/division membership", name);
    }
    info!("Normalized team names ({} records renamed)", renamed);
    unknown.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
