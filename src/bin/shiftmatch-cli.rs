#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use shiftmatch::{
    allocator::{check_assignment, Allocator, ConflictKind, TieBreak, Warning},
    calendar,
    config::{CalendarConfig, EventConfig},
    consolidate::consolidate,
    io::{self, Presence},
    notification, projector,
    storage::{AllocationReport, JsonStorage, Storage},
};
use std::path::{Path, PathBuf};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI d'affectation de créneaux par préférences
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du rapport d'allocation
    #[arg(long, global = true, default_value = "report.json")]
    report: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Allouer les créneaux d'un répertoire d'évènement
    Allocate {
        /// Répertoire contenant capacities.csv, preferences.csv (+ optionnels)
        #[arg(long)]
        dir: PathBuf,
        /// Départage des égalités (sinon event.json, sinon ordre d'entrée)
        #[arg(long, value_enum)]
        tie_break: Option<TieBreakArg>,
        /// Fichier du rapport (sinon --report)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Exporter table maître et/ou calendriers depuis le rapport
    Export {
        #[arg(long)]
        out: PathBuf,
        /// Une table CSV par catégorie
        #[arg(long)]
        master: bool,
        /// Un fichier .ics par personne
        #[arg(long)]
        calendars: bool,
        /// Fusionner les créneaux contigus de même catégorie dans les calendriers
        #[arg(long)]
        consolidate: bool,
        #[command(flatten)]
        calendar: CalendarArgs,
    },

    /// Consolider une grille horaire et écrire un .ics par personne
    Timeline {
        /// Grille CSV (sinon timeline.csv du répertoire --dir)
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        calendar: CalendarArgs,
    },

    /// Vérifier le rapport (capacités, doubles affectations)
    Check {
        /// Répertoire d'évènement dont les capacités font foi (sinon celles du rapport)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Générer un message texte par personne
    Messages {
        /// Gabarit avec <name>, <role>, <shifts> (sinon message.txt du répertoire --dir)
        #[arg(long)]
        template: Option<PathBuf>,
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TieBreakArg {
    InputOrder,
    Fewest,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::InputOrder => TieBreak::InputOrder,
            TieBreakArg::Fewest => TieBreak::FewestAssignments,
        }
    }
}

#[derive(Args, Debug)]
struct CalendarArgs {
    /// event.json dont la section calendar sert de base
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    calendar_name: Option<String>,
    #[arg(long)]
    event_name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    location: Option<String>,
}

impl CalendarArgs {
    fn resolve(self) -> Result<CalendarConfig> {
        let mut config = match &self.config {
            Some(path) => EventConfig::load(path)?.calendar,
            None => CalendarConfig::default(),
        };
        if let Some(v) = self.calendar_name {
            config.calendar_name = v;
        }
        if let Some(v) = self.event_name {
            config.event_name = v;
        }
        if let Some(v) = self.description {
            config.description = v;
        }
        if let Some(v) = self.location {
            config.location = v;
        }
        if config.calendar_name.trim().is_empty() || config.event_name.trim().is_empty() {
            bail!("calendar and event names cannot be empty");
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.report)?;

    let code = match cli.cmd {
        Commands::Allocate {
            dir,
            tie_break,
            out,
        } => {
            let storage = match out {
                Some(path) => JsonStorage::open(path)?,
                None => storage,
            };
            let inputs = io::load_event_dir(&dir)?;
            let config = match inputs.config {
                Presence::Found(config) => config,
                Presence::Missing(path) => {
                    eprintln!("Note: {} not found, using defaults", path.display());
                    EventConfig::default()
                }
            };
            let mut options = config.allocate_options();
            if let Some(arg) = tie_break {
                options.tie_break = arg.into();
            }

            let capacities = inputs.capacities.clone();
            let outcome = Allocator::from_compact(inputs.capacities, inputs.preferences).run(options);

            for warning in &outcome.warnings {
                eprintln!("Warning: {}", describe_warning(warning));
            }
            for shortfall in &outcome.shortfalls {
                eprintln!(
                    "Under-filled: {} ({}/{})",
                    shortfall.slot, shortfall.filled, shortfall.capacity
                );
            }
            for person in &outcome.unassigned {
                eprintln!("Unassigned: {person}");
            }
            println!(
                "{} slot(s) processed in {} round(s)",
                outcome.assignment.slots.len(),
                outcome.rounds
            );

            let incomplete = !outcome.shortfalls.is_empty();
            let report = AllocationReport {
                generated_at: Utc::now(),
                options,
                capacities,
                outcome,
            };
            storage.save(&report)?;
            println!("Report saved to {}", storage.path().display());
            // Code 2 = WARNING/INCOMPLETE
            if incomplete {
                2
            } else {
                0
            }
        }
        Commands::Export {
            out,
            master,
            calendars,
            consolidate: merge,
            calendar: calendar_args,
        } => {
            if !master && !calendars {
                bail!("nothing to export: pass --master and/or --calendars");
            }
            let report = storage.load()?;
            let assignment = &report.outcome.assignment;
            if master {
                let tables = projector::master_table(assignment);
                for path in io::export_master_csv(&out, &tables)? {
                    println!("{}", path.display());
                }
            }
            if calendars {
                let config = calendar_args.resolve()?;
                let by_person = if merge {
                    consolidate(&projector::shift_records(assignment)).by_person
                } else {
                    projector::per_person(assignment)
                };
                for path in calendar::write_calendars(&out, &by_person, &config, Utc::now())? {
                    println!("{}", path.display());
                }
            }
            0
        }
        Commands::Timeline {
            csv,
            dir,
            out,
            calendar: calendar_args,
        } => {
            let config = calendar_args.resolve()?;
            let records = match (csv, dir) {
                (Some(csv), _) => io::import_timeline_csv(&csv)
                    .with_context(|| format!("reading timeline {}", csv.display()))?,
                (None, Some(dir)) => match io::load_event_dir(&dir)?.timeline {
                    Presence::Found(records) => records,
                    Presence::Missing(path) => bail!("no timeline: {} not found", path.display()),
                },
                (None, None) => bail!("pass --csv or --dir"),
            };
            let merged = consolidate(&records);
            for path in calendar::write_calendars(&out, &merged.by_person, &config, Utc::now())? {
                println!("{}", path.display());
            }
            0
        }
        Commands::Check { dir, out } => {
            let report = storage.load_unchecked()?;
            let capacities = match dir {
                Some(dir) => io::import_capacities_csv(dir.join(io::CAPACITIES_FILE))?,
                None => report.capacities.clone(),
            };
            let conflicts = check_assignment(&report.outcome.assignment, &capacities);
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                if let Some(path) = out {
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["kind", "person", "slot_a", "slot_b"])?;
                    for c in &conflicts {
                        let person = c.person.as_ref().map(|p| p.as_str()).unwrap_or("");
                        let slot_a = c.slot_a.to_string();
                        let slot_b = c.slot_b.as_ref().map(ToString::to_string).unwrap_or_default();
                        w.write_record([
                            match c.kind {
                                ConflictKind::OverCapacity => "over_capacity",
                                ConflictKind::UnknownSlot => "unknown_slot",
                                ConflictKind::DoubleBooking => "double_booking",
                                ConflictKind::Overlap => "overlap",
                            },
                            person,
                            slot_a.as_str(),
                            slot_b.as_str(),
                        ])?;
                    }
                    w.flush()?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Messages { template, dir, out } => {
            let report = storage.load()?;
            let text = match (template, dir) {
                (Some(path), _) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading template {}", path.display()))?,
                (None, Some(dir)) => message_from_event_dir(&dir)?,
                (None, None) => bail!("pass --template or --dir"),
            };
            let by_person = consolidate(&projector::shift_records(&report.outcome.assignment)).by_person;
            let notices = notification::prepare_notices(&text, &by_person);
            let written = notification::write_notices(&out, &notices)?;
            println!("{} message(s) written to {}", written.len(), out.display());
            0
        }
    };

    std::process::exit(code);
}

/// message.txt, sinon le gabarit désigné par event.json.
fn message_from_event_dir(dir: &Path) -> Result<String> {
    let inputs = io::load_event_dir(dir)?;
    match (inputs.message, inputs.config) {
        (Presence::Found(text), _) => Ok(text),
        (Presence::Missing(_), Presence::Found(config)) => match config.message_template {
            Some(rel) => {
                let path = dir.join(rel);
                std::fs::read_to_string(&path)
                    .with_context(|| format!("reading template {}", path.display()))
            }
            None => bail!("event.json names no message_template"),
        },
        (Presence::Missing(path), Presence::Missing(_)) => {
            bail!("no message template: {} not found", path.display())
        }
    }
}

fn describe_warning(warning: &Warning) -> String {
    match warning {
        Warning::DuplicateSlot { slot } => format!("duplicate slot ignored: {slot}"),
        Warning::DuplicatePerson { person } => format!("duplicate person ignored: {person}"),
        Warning::MalformedPreference { message } => message.clone(),
        Warning::UnknownSlot { person, slot } => {
            format!("{person} prefers unknown slot {slot}")
        }
    }
}
