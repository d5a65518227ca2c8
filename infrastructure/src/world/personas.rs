//! Persona roster
//!
//! Reads a characters file shaped as
//! `{"characters": {"<id>": {"name": "...", "persona": "...", ...}}}`
//! (extra fields are ignored) or falls back to a generated built-in roster.

use deliberation_domain::{AgentProfile, RandomSource, sample};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PersonaError {
    #[error("Failed to read persona file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse persona file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Persona file contains no usable characters")]
    Empty,
}

#[derive(Deserialize)]
struct CharactersFile {
    characters: BTreeMap<String, CharacterEntry>,
}

#[derive(Deserialize)]
struct CharacterEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    persona: String,
}

const FIRST_NAMES: [&str; 24] = [
    "Ada", "Bruno", "Chiara", "Dmitri", "Elena", "Farid", "Greta", "Hiro", "Imani", "Jonas",
    "Keiko", "Luis", "Maya", "Nikolai", "Olu", "Priya", "Quinn", "Rosa", "Samir", "Tove",
    "Umar", "Vera", "Wen", "Yusuf",
];

const LAST_NAMES: [&str; 12] = [
    "Alder", "Brook", "Castell", "Dunmore", "Ekberg", "Fontaine", "Garza", "Holm", "Ito",
    "Jensen", "Kowalski", "Lindqvist",
];

const ROLES: [&str; 16] = [
    "a night-shift nurse who has seen people at their most fragile",
    "a retired sailor who spent forty years crossing oceans",
    "a small-town baker who knows every regular by name",
    "a software engineer at a fast-growing startup",
    "a high-school history teacher",
    "a divorce lawyer with a dry sense of humor",
    "a farmer whose family has worked the same land for generations",
    "a touring jazz musician who rarely sleeps in the same city twice",
    "a first-year university student far from home",
    "a grandmother of seven who ran a corner shop for decades",
    "a paramedic in a busy city",
    "a freelance illustrator juggling several clients",
    "a former professional athlete now coaching kids",
    "an accountant who plans everything in spreadsheets",
    "a monk who left the monastery to open a tea house",
    "an immigrant who built a restaurant from nothing",
];

const TEMPERAMENTS: [&str; 8] = [
    "Cautious and practical, distrusts easy answers.",
    "Optimistic to a fault and quick to encourage.",
    "Blunt, skeptical and allergic to wishful thinking.",
    "Warm and patient, always asks how people feel.",
    "Adventurous and restless, values experience over security.",
    "Frugal and methodical, thinks in costs and trade-offs.",
    "Spiritual and reflective, looks for the meaning behind choices.",
    "Pragmatic and community-minded, weighs the effect on others.",
];

/// Profiles available to populate the crowd
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    profiles: Vec<AgentProfile>,
}

impl PersonaCatalog {
    /// Generated roster: every first/last name pair, with roles and temperaments interleaved
    pub fn builtin() -> Self {
        let total = FIRST_NAMES.len() * LAST_NAMES.len();
        let profiles = (0..total)
            .map(|i| {
                let first = FIRST_NAMES[i % FIRST_NAMES.len()];
                let last = LAST_NAMES[(i / FIRST_NAMES.len()) % LAST_NAMES.len()];
                let role = ROLES[(i + i / FIRST_NAMES.len()) % ROLES.len()];
                let temperament = TEMPERAMENTS[(i / 3) % TEMPERAMENTS.len()];
                AgentProfile::new(
                    format!("character_{:04}", i + 1),
                    format!("{first} {last}"),
                    format!("You are {role}. {temperament}"),
                )
            })
            .collect();
        Self { profiles }
    }

    pub fn from_json(content: &str) -> Result<Self, PersonaError> {
        let file: CharactersFile = serde_json::from_str(content)?;
        let profiles: Vec<AgentProfile> = file
            .characters
            .into_iter()
            .filter_map(|(id, entry)| {
                if entry.persona.trim().is_empty() {
                    warn!("Skipping character {} without a persona", id);
                    return None;
                }
                Some(AgentProfile::new(id, entry.name, entry.persona))
            })
            .collect();
        if profiles.is_empty() {
            return Err(PersonaError::Empty);
        }
        Ok(Self { profiles })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersonaError> {
        let path = path.as_ref();
        let catalog = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!("Loaded {} personas from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn profiles(&self) -> &[AgentProfile] {
        &self.profiles
    }

    /// `n` distinct profiles chosen at random (all of them when `n` exceeds the roster)
    pub fn select(&self, n: usize, random: &dyn RandomSource) -> Vec<AgentProfile> {
        if n > self.profiles.len() {
            warn!(
                "Requested {} agents but only {} personas are available",
                n,
                self.profiles.len()
            );
        }
        sample(&self.profiles, n, random)
    }
}
