use crate::allocator::{ensure_consistent, AllocateOptions, AllocationOutcome};
use crate::model::SlotCapacity;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Document persisté après un run : capacités d'origine + résultat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationReport {
    pub generated_at: DateTime<Utc>,
    pub options: AllocateOptions,
    pub capacities: Vec<SlotCapacity>,
    pub outcome: AllocationOutcome,
}

pub trait Storage {
    /// Charge un rapport depuis un support.
    fn load(&self) -> anyhow::Result<AllocationReport>;
    /// Sauvegarde de manière atomique.
    fn save(&self, report: &AllocationReport) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Charge sans valider l'affectation (pour l'inspecter).
    pub fn load_unchecked(&self) -> anyhow::Result<AllocationReport> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_slice(&data).with_context(|| format!("parsing {}", self.path.display()))
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<AllocationReport> {
        let report = self.load_unchecked()?;
        ensure_consistent(&report.outcome.assignment, &report.capacities)
            .with_context(|| format!("validating {}", self.path.display()))?;
        Ok(report)
    }

    fn save(&self, report: &AllocationReport) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(report)?;
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(parent).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
