use crate::io::file_stem;
use crate::model::{Interval, PersonName};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const NAME_KEY: &str = "<name>";
pub const ROLE_KEY: &str = "<role>";
pub const SHIFTS_KEY: &str = "<shifts>";

/// Messages générés par publipostage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedMessages {
    pub messages: Vec<String>,
    /// Colonnes de longueurs différentes : nombre de messages réellement produits.
    pub truncated_to: Option<usize>,
}

/// Remplit `template` une fois par index à partir de colonnes parallèles.
///
/// La colonne la plus courte fixe le nombre de messages.
pub fn fill_template(template: &str, columns: &[(&str, Vec<String>)]) -> MergedMessages {
    let Some(first) = columns.first() else {
        return MergedMessages {
            messages: Vec::new(),
            truncated_to: None,
        };
    };
    let expected = first.1.len();
    let size = columns.iter().map(|(_, values)| values.len()).min().unwrap_or(0);
    let truncated_to = columns
        .iter()
        .any(|(_, values)| values.len() != expected)
        .then_some(size);
    if let Some(size) = truncated_to {
        tracing::warn!(size, "placeholder columns differ in length, extra values ignored");
    }

    let messages = (0..size)
        .map(|i| {
            columns
                .iter()
                .fold(template.to_string(), |text, (key, values)| text.replace(key, &values[i]))
        })
        .collect();

    MergedMessages {
        messages,
        truncated_to,
    }
}

/// Message destiné à une personne.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub person: PersonName,
    pub content: String,
}

/// Un message par personne : `<name>`, `<role>` (catégories distinctes),
/// `<shifts>` (une ligne par intervalle).
pub fn prepare_notices(template: &str, by_person: &BTreeMap<PersonName, Vec<Interval>>) -> Vec<Notice> {
    let mut names = Vec::with_capacity(by_person.len());
    let mut roles = Vec::with_capacity(by_person.len());
    let mut shifts = Vec::with_capacity(by_person.len());

    for (person, intervals) in by_person {
        names.push(person.as_str().to_string());

        let mut categories: Vec<&str> = Vec::new();
        for interval in intervals {
            if !categories.contains(&interval.category.as_str()) {
                categories.push(&interval.category);
            }
        }
        roles.push(categories.join(", "));

        let lines: Vec<String> = intervals
            .iter()
            .map(|i| format!("- {} → {} ({})", i.start.to_rfc3339(), i.end.to_rfc3339(), i.category))
            .collect();
        shifts.push(lines.join("\n"));
    }

    let merged = fill_template(
        template,
        &[(NAME_KEY, names), (ROLE_KEY, roles), (SHIFTS_KEY, shifts)],
    );
    by_person
        .keys()
        .zip(merged.messages)
        .map(|(person, content)| Notice {
            person: person.clone(),
            content,
        })
        .collect()
}

/// Écrit `<personne>.txt` dans `dir`.
pub fn write_notices<P: AsRef<Path>>(dir: P, notices: &[Notice]) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    notices
        .iter()
        .map(|notice| {
            let path = dir.join(format!("{}.txt", file_stem(notice.person.as_str())));
            fs::write(&path, &notice.content)
                .with_context(|| format!("writing {}", path.display()))?;
            Ok(path)
        })
        .collect()
}
