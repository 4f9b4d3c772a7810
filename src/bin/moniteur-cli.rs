#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use moniteur::{
    engine::{InMemoryHistory, Ranker, ValidationOutcome},
    interval::HourInterval,
    io,
    model::{BookingRequest, Commitment, CommitmentId, LanguageCode, ParticipantId},
    storage::{JsonStorage, Storage},
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste de l'école de ski (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du planning
    #[arg(long, global = true, default_value = "planning.json")]
    snapshot: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des moniteurs depuis un CSV
    ImportInstructors {
        #[arg(long)]
        csv: String,
    },

    /// Importer des engagements depuis un CSV
    ImportCommitments {
        #[arg(long)]
        csv: String,
    },

    /// Importer des absences depuis un CSV
    ImportAbsences {
        #[arg(long)]
        csv: String,
    },

    /// Classer les moniteurs pour une demande de réservation
    Rank {
        /// liste "2026-01-10,2026-01-11,..."
        #[arg(long)]
        dates: String,
        /// ski | snowboard
        #[arg(long)]
        sport: Option<String>,
        /// Code langue du client (ex: fr, en)
        #[arg(long)]
        language: Option<String>,
        /// Durée souhaitée en heures pleines
        #[arg(long)]
        duration: Option<u32>,
        /// Heure de début souhaitée (0..23)
        #[arg(long)]
        start: Option<u32>,
        #[arg(long)]
        meeting_point: Option<String>,
        /// liste "participant1,participant2,..."
        #[arg(long)]
        participants: Option<String>,
        /// Fragment du nom du moniteur demandé
        #[arg(long)]
        prefer: Option<String>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier qu'un créneau est affectable
    Validate {
        #[arg(long)]
        instructor: String,
        /// AAAA-MM-JJ
        #[arg(long)]
        date: String,
        #[arg(long)]
        start: u32,
        #[arg(long)]
        end: u32,
    },

    /// Valider puis enregistrer un engagement
    Book {
        #[arg(long)]
        instructor: String,
        /// AAAA-MM-JJ
        #[arg(long)]
        date: String,
        #[arg(long)]
        start: u32,
        #[arg(long)]
        end: u32,
        /// private | group
        #[arg(long, default_value = "private")]
        kind: String,
        #[arg(long)]
        sport: Option<String>,
        #[arg(long)]
        meeting_point: Option<String>,
        #[arg(long)]
        participant: Option<String>,
    },

    /// Annuler un engagement
    Cancel {
        #[arg(long)]
        commitment: String,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.snapshot)?;
    let mut snapshot = storage.load()?;

    let code = match cli.cmd {
        Commands::ImportInstructors { csv } => {
            let instructors = io::import_instructors_csv(csv)?;
            snapshot.instructors.extend(instructors);
            storage.save(&snapshot)?;
            0
        }
        Commands::ImportCommitments { csv } => {
            let commitments = io::import_commitments_csv(csv, &snapshot)?;
            snapshot.commitments.extend(commitments);
            storage.save(&snapshot)?;
            0
        }
        Commands::ImportAbsences { csv } => {
            let absences = io::import_absences_csv(csv, &snapshot)?;
            snapshot.absences.extend(absences);
            storage.save(&snapshot)?;
            0
        }
        Commands::Rank {
            dates,
            sport,
            language,
            duration,
            start,
            meeting_point,
            participants,
            prefer,
            out_json,
            out_csv,
        } => {
            let mut request = BookingRequest::for_dates(parse_dates(&dates)?);
            if let Some(s) = sport {
                request.sport = Some(io::parse_sport(&s)?);
            }
            if let Some(l) = language {
                request.language = LanguageCode::new(l);
            }
            request.duration_hours = duration;
            request.desired_start_hour = start;
            request.meeting_point = meeting_point;
            if let Some(list) = participants {
                request.continuity_participants = list
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ParticipantId::new)
                    .collect();
            }
            request.preferred_instructor = prefer;

            let ranker = Ranker::new();
            let history = InMemoryHistory::new(snapshot.commitments.clone());
            let rankings = ranker.rank(
                &request,
                &snapshot.instructors,
                &snapshot.commitments,
                &snapshot.absences,
                &history,
            )?;

            if let Some(path) = out_json {
                io::export_rankings_json(path, &rankings)?;
            }
            if let Some(path) = out_csv {
                io::export_rankings_csv(path, &rankings)?;
            }

            // Liste vide = aucun éligible, pas une erreur.
            if rankings.is_empty() {
                println!("aucun moniteur éligible");
            }
            for (idx, rc) in rankings.iter().enumerate() {
                let window = if rc.available_for_window {
                    "libre"
                } else {
                    "occupé"
                };
                let continuity = if rc.continuity_match { " | continuité" } else { "" };
                println!(
                    "{:>2}. {} ({}) | score {} | {}{}",
                    idx + 1,
                    rc.instructor.full_name(),
                    rc.instructor.handle,
                    rc.score,
                    window,
                    continuity
                );
                for c in &rc.conflicts {
                    println!("      note: {}", c.message);
                }
            }
            0
        }
        Commands::Validate {
            instructor,
            date,
            start,
            end,
        } => {
            let inst = snapshot
                .find_instructor_by_handle(&instructor)
                .ok_or_else(|| anyhow::anyhow!("unknown instructor: {}", instructor))?;
            let date = io::parse_date(&date)?;
            let interval = HourInterval::new(start, end).map_err(anyhow::Error::msg)?;
            let ranker = Ranker::new();
            match ranker.validate_assignment(
                &inst.id,
                date,
                &interval,
                &snapshot.commitments,
                &snapshot.absences,
            ) {
                ValidationOutcome::Approved => {
                    println!("OK: {} est affectable le {} ({})", inst.full_name(), date, interval);
                    0
                }
                ValidationOutcome::Rejected(reason) => {
                    eprintln!("Refus: {reason}");
                    // Code 2 = WARNING/INCOMPLETE
                    2
                }
            }
        }
        Commands::Book {
            instructor,
            date,
            start,
            end,
            kind,
            sport,
            meeting_point,
            participant,
        } => {
            let inst_id = snapshot
                .find_instructor_by_handle(&instructor)
                .map(|i| i.id.clone())
                .ok_or_else(|| anyhow::anyhow!("unknown instructor: {}", instructor))?;
            let date = io::parse_date(&date)?;
            let interval = HourInterval::new(start, end).map_err(anyhow::Error::msg)?;
            let mut commitment = Commitment::new(inst_id, date, interval, io::parse_kind(&kind)?);
            if let Some(s) = sport {
                commitment = commitment.with_sport(io::parse_sport(&s)?);
            }
            if let Some(p) = meeting_point {
                commitment = commitment.with_meeting_point(p);
            }
            if let Some(p) = participant {
                commitment = commitment.with_participant(ParticipantId::new(p));
            }
            let ranker = Ranker::new();
            let id = ranker.confirm_booking(&mut snapshot, commitment)?;
            storage.save(&snapshot)?;
            println!("Engagement {} enregistré", id.as_str());
            0
        }
        Commands::Cancel { commitment } => {
            let id = CommitmentId::new(commitment);
            if !snapshot.remove_commitment(&id) {
                bail!("unknown commitment: {}", id.as_str());
            }
            storage.save(&snapshot)?;
            0
        }
        Commands::List { out_json, out_csv } => {
            if let Some(path) = out_json {
                io::export_snapshot_json(path, &snapshot)?;
            }
            if let Some(path) = out_csv {
                io::export_commitments_csv(path, &snapshot)?;
            }
            // impression compacte
            for c in &snapshot.commitments {
                let handle = snapshot
                    .find_instructor_by_id(&c.instructor_id)
                    .map(|i| i.handle.as_str())
                    .unwrap_or("-");
                println!("{} | {} {} | {}", c.id.as_str(), c.date, c.interval, handle);
            }
            0
        }
    };

    std::process::exit(code);
}

fn parse_dates(raw: &str) -> Result<Vec<NaiveDate>> {
    let dates: Vec<NaiveDate> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(io::parse_date)
        .collect::<Result<_>>()?;
    Ok(dates)
}
