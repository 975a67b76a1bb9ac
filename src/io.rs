use crate::config::EventConfig;
use crate::model::{
    parse_timestamp, CompactPreference, PersonName, ShiftRecord, SlotCapacity, SlotId, Timespan,
    Timestamp,
};
use crate::projector::MasterRow;
use anyhow::{bail, Context};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CAPACITIES_FILE: &str = "capacities.csv";
pub const PREFERENCES_FILE: &str = "preferences.csv";
pub const TIMELINE_FILE: &str = "timeline.csv";
pub const MESSAGE_FILE: &str = "message.txt";
pub const CONFIG_FILE: &str = "event.json";

/// Import des capacités: header `category,start,end,capacity`
pub fn import_capacities_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<SlotCapacity>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let category = rec.get(0).context("missing category")?.trim();
        if category.is_empty() {
            bail!("invalid capacity row (empty category)");
        }
        let start = parse_timestamp(rec.get(1).context("missing start")?).context("start RFC3339")?;
        let end = parse_timestamp(rec.get(2).context("missing end")?).context("end RFC3339")?;
        let capacity: u32 = rec
            .get(3)
            .context("missing capacity")?
            .trim()
            .parse()
            .with_context(|| format!("invalid capacity for category {category}"))?;
        let span = Timespan::new(start, end)?;
        out.push(SlotCapacity::new(SlotId::new(category, span), capacity));
    }
    Ok(out)
}

/// Import des préférences: header `name,categories,timespans`
///
/// `categories` séparées par `;`, `timespans` au format `start/end;start/end`.
/// Une liste vide est conservée telle quelle (ignorée plus tard, avec avertissement).
pub fn import_preferences_csv<P: AsRef<Path>>(
    path: P,
) -> anyhow::Result<Vec<(PersonName, CompactPreference)>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid preference row (empty name)");
        }
        let categories = rec
            .get(1)
            .unwrap_or("")
            .split(';')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        let timespans = parse_timespans(rec.get(2).unwrap_or(""))
            .with_context(|| format!("invalid timespans for {name}"))?;
        out.push((PersonName::new(name), CompactPreference::new(categories, timespans)));
    }
    Ok(out)
}

fn parse_timespans(raw: &str) -> anyhow::Result<Vec<Timespan>> {
    raw.split(';')
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| parse_timespan(chunk.trim()))
        .collect()
}

fn parse_timespan(chunk: &str) -> anyhow::Result<Timespan> {
    let Some((start_raw, end_raw)) = chunk.split_once('/').or_else(|| chunk.split_once("..")) else {
        bail!("expected start/end, got {chunk}");
    };
    let start = parse_timestamp(start_raw).with_context(|| format!("invalid start: {start_raw}"))?;
    let end = parse_timestamp(end_raw).with_context(|| format!("invalid end: {end_raw}"))?;
    Ok(Timespan::new(start, end)?)
}

/// Import d'une grille horaire.
///
/// - 1re colonne : horodatages ; les autres : noms des personnes par poste.
/// - La ligne d'en-tête nomme les postes (utilisés comme catégories).
/// - La dernière ligne ne contient que l'heure de fin du dernier service.
/// - Cellule vide : personne.
///
/// Les enregistrements sont émis colonne par colonne (poste, puis temps) :
/// deux lignes consécutives d'un même poste restent voisines pour la
/// personne et fusionnent, même si elle occupe un autre poste sur la même
/// ligne. Les noms de la dernière ligne (sans heure de fin) sont ignorés
/// avec un avertissement.
pub fn import_timeline_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ShiftRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let positions: Vec<String> = rdr
        .headers()?
        .iter()
        .skip(1)
        .enumerate()
        .map(|(idx, h)| {
            let h = h.trim();
            if h.is_empty() {
                format!("Position {}", idx + 1)
            } else {
                h.to_string()
            }
        })
        .collect();

    let rows: Vec<StringRecord> = rdr.records().collect::<Result<_, _>>()?;
    let mut times: Vec<Timestamp> = Vec::with_capacity(rows.len());
    for (line, row) in rows.iter().enumerate() {
        let raw = row.get(0).context("missing time cell")?;
        let t = parse_timestamp(raw).with_context(|| format!("row {}: invalid time {raw}", line + 2))?;
        if let Some(prev) = times.last() {
            if t <= *prev {
                bail!("row {}: times must be strictly increasing", line + 2);
            }
        }
        times.push(t);
    }

    if let Some(last) = rows.last() {
        for name in last.iter().skip(1).map(str::trim).filter(|n| !n.is_empty()) {
            tracing::warn!(person = name, "name in the final timeline row has no end time, ignored");
        }
    }

    let mut out = Vec::new();
    for (col, category) in positions.iter().enumerate() {
        for (i, row) in rows.iter().enumerate() {
            let Some(&end) = times.get(i + 1) else {
                break;
            };
            let name = row.get(col + 1).map(str::trim).unwrap_or("");
            if name.is_empty() {
                continue;
            }
            out.push(ShiftRecord {
                person: PersonName::new(name),
                start: times[i],
                end,
                category: category.clone(),
            });
        }
    }
    Ok(out)
}

/// Export CSV de la table maître: un fichier par catégorie, header `Start,End,Staff`
pub fn export_master_csv<P: AsRef<Path>>(
    dir: P,
    tables: &BTreeMap<String, Vec<MasterRow>>,
) -> anyhow::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut written = Vec::new();
    for (category, rows) in tables {
        let path = dir.join(format!("{}.csv", file_stem(category)));
        let mut w = WriterBuilder::new().has_headers(true).from_path(&path)?;
        w.write_record(["Start", "End", "Staff"])?;
        for row in rows {
            let start = row.start.to_rfc3339();
            let end = row.end.to_rfc3339();
            w.write_record([start.as_str(), end.as_str(), row.staff_label().as_str()])?;
        }
        w.flush()?;
        written.push(path);
    }
    Ok(written)
}

/// Nom de fichier sûr pour une catégorie ou une personne.
pub fn file_stem(raw: &str) -> String {
    let stem: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() {
        "_".to_string()
    } else {
        stem
    }
}

/// Élément optionnel d'une configuration partielle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence<T> {
    Found(T),
    Missing(PathBuf),
}

impl<T> Presence<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Presence::Found(v) => Some(v),
            Presence::Missing(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Presence::Found(_))
    }
}

/// Contenu d'un répertoire d'évènement.
#[derive(Debug, Clone)]
pub struct EventInputs {
    pub capacities: Vec<SlotCapacity>,
    pub preferences: Vec<(PersonName, CompactPreference)>,
    pub timeline: Presence<Vec<ShiftRecord>>,
    pub message: Presence<String>,
    pub config: Presence<EventConfig>,
}

/// Charge un répertoire d'évènement : capacités et préférences obligatoires,
/// le reste optionnel. Un fichier présent mais illisible reste une erreur.
pub fn load_event_dir<P: AsRef<Path>>(dir: P) -> anyhow::Result<EventInputs> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let capacities = import_capacities_csv(dir.join(CAPACITIES_FILE))
        .with_context(|| format!("reading {}", dir.join(CAPACITIES_FILE).display()))?;
    let preferences = import_preferences_csv(dir.join(PREFERENCES_FILE))
        .with_context(|| format!("reading {}", dir.join(PREFERENCES_FILE).display()))?;

    let timeline = optional(dir.join(TIMELINE_FILE), |p| import_timeline_csv(p))?;
    let message = optional(dir.join(MESSAGE_FILE), |p| Ok(fs::read_to_string(p)?))?;
    let config = optional(dir.join(CONFIG_FILE), |p| EventConfig::load(p))?;

    Ok(EventInputs {
        capacities,
        preferences,
        timeline,
        message,
        config,
    })
}

fn optional<T, F>(path: PathBuf, read: F) -> anyhow::Result<Presence<T>>
where
    F: FnOnce(&Path) -> anyhow::Result<T>,
{
    if !path.exists() {
        tracing::warn!(path = %path.display(), "optional input not found");
        return Ok(Presence::Missing(path));
    }
    let value = read(&path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Presence::Found(value))
}
