// Conference -> division -> team histories, laid out from the teams config.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use crate::teams::TeamDirectory;
use crate::views::career::TeamHistory;

#[derive(Debug, Clone)]
pub struct DivisionView {
    pub name: String,
    pub teams: Vec<TeamHistory>,
}

#[derive(Debug, Clone)]
pub struct ConferenceView {
    pub name: String,
    pub divisions: Vec<DivisionView>,
}

/// Teams placed in the configured league structure. Serializes as an ordered
/// `{conference: {division: [team, ...]}}` object.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    pub conferences: Vec<ConferenceView>,
    /// Teams with data but no membership, in first-appearance order. The
    /// normalizer already warned about each of them.
    pub unassigned: Vec<String>,
    /// Configured member teams with no data this run.
    pub missing: Vec<String>,
    /// Widest conference in the configured layout.
    pub divisions_per_conference: usize,
    /// Largest division in the configured layout.
    pub teams_per_division: usize,
}

impl Serialize for Hierarchy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Divisions<'a>(&'a [DivisionView]);

        impl Serialize for Divisions<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for division in self.0 {
                    map.serialize_entry(&division.name, &division.teams)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(self.conferences.len()))?;
        for conference in &self.conferences {
            map.serialize_entry(&conference.name, &Divisions(&conference.divisions))?;
        }
        map.end()
    }
}

/// One line per placed team.
#[derive(Debug, Clone, Serialize)]
pub struct HierarchyRow<'a> {
    pub conference: &'a str,
    pub division: &'a str,
    pub team: &'a str,
    pub seasons: usize,
    pub first_season: Option<i32>,
    pub last_season: Option<i32>,
    pub total_shots: u64,
}

impl Hierarchy {
    pub fn rows(&self) -> Vec<HierarchyRow<'_>> {
        let mut rows = Vec::new();
        for conference in &self.conferences {
            for division in &conference.divisions {
                for team in &division.teams {
                    rows.push(HierarchyRow {
                        conference: &conference.name,
                        division: &division.name,
                        team: &team.team,
                        seasons: team.seasons.len(),
                        first_season: team.first_season(),
                        last_season: team.last_season(),
                        total_shots: team.total_shots(),
                    });
                }
            }
        }
        rows
    }

    pub fn team_count(&self) -> usize {
        self.conferences
            .iter()
            .flat_map(|c| &c.divisions)
            .map(|d| d.teams.len())
            .sum()
    }
}

pub fn build_hierarchy(histories: &[TeamHistory], directory: &TeamDirectory) -> Hierarchy {
    let by_name: HashMap<&str, &TeamHistory> =
        histories.iter().map(|h| (h.team.as_str(), h)).collect();

    let mut missing = Vec::new();
    let conferences = directory
        .layout()
        .iter()
        .map(|(conference, divisions)| ConferenceView {
            name: conference.clone(),
            divisions: divisions
                .iter()
                .map(|(division, teams)| DivisionView {
                    name: division.clone(),
                    teams: teams
                        .iter()
                        .filter_map(|team| match by_name.get(team.as_str()) {
                            Some(history) => Some((*history).clone()),
                            None => {
                                missing.push(team.clone());
                                None
                            }
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    let unassigned: Vec<String> = if directory.has_membership() {
        histories
            .iter()
            .filter(|h| directory.membership(&h.team).is_none())
            .map(|h| h.team.clone())
            .collect()
    } else {
        Vec::new()
    };

    for team in &missing {
        warn!("team '{}' is configured but has no data", team);
    }

    let layout = directory.layout();
    Hierarchy {
        conferences,
        unassigned,
        missing,
        divisions_per_conference: layout.iter().map(|(_, d)| d.len()).max().unwrap_or(0),
        teams_per_division: layout
            .iter()
            .flat_map(|(_, d)| d)
            .map(|(_, teams)| teams.len())
            .max()
            .unwrap_or(0),
    }
}
