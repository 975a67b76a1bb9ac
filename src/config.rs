use crate::allocator::{AllocateOptions, TieBreak};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration d'un évènement (`event.json`), tous les champs optionnels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventConfig {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub tie_break: TieBreak,
    /// Gabarit de message, relatif au répertoire de l'évènement.
    #[serde(default)]
    pub message_template: Option<PathBuf>,
}

/// Champs repris dans chaque fichier `.ics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub calendar_name: String,
    pub event_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_name: "Shifts".to_string(),
            event_name: "Shift".to_string(),
            description: String::new(),
            location: String::new(),
        }
    }
}

impl EventConfig {
    pub fn validate(&self) -> Result<()> {
        if self.calendar.calendar_name.trim().is_empty() {
            bail!("calendar_name cannot be empty");
        }
        if self.calendar.event_name.trim().is_empty() {
            bail!("event_name cannot be empty");
        }
        if let Some(path) = &self.message_template {
            if path.as_os_str().is_empty() {
                bail!("message_template cannot be an empty path");
            }
        }
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: EventConfig = serde_json::from_slice(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("writing config {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn allocate_options(&self) -> AllocateOptions {
        AllocateOptions {
            tie_break: self.tie_break,
        }
    }
}
