//! Émission iCalendar (RFC 5545) : un fichier par personne, un VEVENT par intervalle.

use crate::config::CalendarConfig;
use crate::io::file_stem;
use crate::model::{Interval, PersonName, Timestamp};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const PRODID: &str = "-//shiftmatch//shiftmatch//EN";
const MAX_LINE_OCTETS: usize = 75;

/// Rend le calendrier d'une personne (lignes CRLF).
pub fn render_calendar(
    person: &PersonName,
    intervals: &[Interval],
    config: &CalendarConfig,
    stamp: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODID}"),
        format!("X-WR-CALNAME:{}", escape_text(&config.calendar_name)),
    ];

    for interval in intervals {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}", event_uid(person, interval)));
        lines.push(format!("DTSTAMP:{}", format_utc(stamp)));
        lines.push(format!("DTSTART:{}", format_timestamp(interval.start)));
        lines.push(format!("DTEND:{}", format_timestamp(interval.end)));
        lines.push(format!(
            "SUMMARY:{}",
            escape_text(&format!("{} ({})", config.event_name, interval.category))
        ));
        if !config.description.is_empty() {
            lines.push(format!("DESCRIPTION:{}", escape_text(&config.description)));
        }
        if !config.location.is_empty() {
            lines.push(format!("LOCATION:{}", escape_text(&config.location)));
        }
        lines.push("END:VEVENT".to_string());
    }
    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in &lines {
        out.push_str(&fold_line(line));
        out.push_str("\r\n");
    }
    out
}

/// Écrit `<personne>.ics` dans `dir` pour chaque personne.
pub fn write_calendars<P: AsRef<Path>>(
    dir: P,
    by_person: &BTreeMap<PersonName, Vec<Interval>>,
    config: &CalendarConfig,
    stamp: DateTime<Utc>,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut written = Vec::with_capacity(by_person.len());
    for (person, intervals) in by_person {
        let path = dir.join(format!("{}.ics", file_stem(person.as_str())));
        let ics = render_calendar(person, intervals, config, stamp);
        fs::write(&path, ics).with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(person = %person, events = intervals.len(), path = %path.display(), "calendar written");
        written.push(path);
    }
    Ok(written)
}

/// UID stable : ré-exporter met à jour l'évènement au lieu de le dupliquer.
fn event_uid(person: &PersonName, interval: &Interval) -> String {
    let key = format!(
        "{}/{}/{}/{}",
        person,
        interval.category,
        interval.start.to_rfc3339(),
        interval.end.to_rfc3339()
    );
    format!("{}@shiftmatch", Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()))
}

fn format_timestamp(ts: Timestamp) -> String {
    format_utc(ts.with_timezone(&Utc))
}

fn format_utc(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Plie les lignes à 75 octets sans couper un caractère UTF-8.
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut width = 0usize;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            // l'espace de continuation compte dans la ligne suivante
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out
}
