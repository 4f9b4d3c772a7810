use crate::engine::RankedCandidate;
use crate::interval::HourInterval;
use crate::model::{
    Absence, AbsenceStatus, Commitment, CommitmentKind, EmploymentStatus, Instructor,
    LanguageCode, LiveStatus, ParticipantId, Snapshot, Specialization, Sport,
};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de moniteurs depuis CSV: header
/// `handle,first_name,last_name,specialization[,languages][,employment_status][,live_status]`
pub fn import_instructors_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Instructor>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let first = rec.get(1).context("missing first_name")?.trim();
        let last = rec.get(2).context("missing last_name")?.trim();
        let specialization = rec.get(3).context("missing specialization")?.trim();
        if handle.is_empty() || first.is_empty() || last.is_empty() {
            bail!("invalid instructor row (empty)");
        }
        let mut instructor =
            Instructor::new(handle, first, last, parse_specialization(specialization)?);
        if let Some(raw) = rec.get(4) {
            let raw = raw.trim();
            if !raw.is_empty() {
                instructor.languages = raw
                    .split(';')
                    .map(str::trim)
                    .filter(|chunk| !chunk.is_empty())
                    .map(LanguageCode::new)
                    .collect();
            }
        }
        if let Some(raw) = rec.get(5) {
            let raw = raw.trim();
            if !raw.is_empty() {
                instructor.employment_status = parse_employment_status(raw)
                    .with_context(|| format!("invalid employment_status for handle {handle}"))?;
            }
        }
        if let Some(raw) = rec.get(6) {
            let raw = raw.trim();
            if !raw.is_empty() {
                instructor.live_status = parse_live_status(raw)
                    .with_context(|| format!("invalid live_status for handle {handle}"))?;
            }
        }
        out.push(instructor);
    }
    Ok(out)
}

/// Import d'engagements: header
/// `instructor,date,start_hour,end_hour[,kind][,sport][,meeting_point][,participant]`
///
/// La colonne `instructor` porte le handle, résolu contre le snapshot.
pub fn import_commitments_csv<P: AsRef<Path>>(
    path: P,
    snapshot: &Snapshot,
) -> anyhow::Result<Vec<Commitment>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing instructor")?.trim();
        let instructor = snapshot
            .find_instructor_by_handle(handle)
            .with_context(|| format!("unknown instructor handle: {handle}"))?;
        let date = parse_date(rec.get(1).context("missing date")?.trim())?;
        let start = parse_hour(rec.get(2).context("missing start_hour")?.trim())?;
        let end = parse_hour(rec.get(3).context("missing end_hour")?.trim())?;
        let interval = HourInterval::new(start, end).map_err(anyhow::Error::msg)?;

        let mut c = Commitment::new(
            instructor.id.clone(),
            date,
            interval,
            CommitmentKind::PrivateLesson,
        );
        if let Some(raw) = rec.get(4) {
            let raw = raw.trim();
            if !raw.is_empty() {
                c.kind = parse_kind(raw)
                    .with_context(|| format!("invalid kind for handle {handle}"))?;
            }
        }
        if let Some(raw) = rec.get(5) {
            let raw = raw.trim();
            if !raw.is_empty() {
                c.sport = Some(
                    parse_sport(raw)
                        .with_context(|| format!("invalid sport for handle {handle}"))?,
                );
            }
        }
        if let Some(raw) = rec.get(6) {
            let raw = raw.trim();
            if !raw.is_empty() {
                c.meeting_point = Some(raw.to_string());
            }
        }
        if let Some(raw) = rec.get(7) {
            let raw = raw.trim();
            if !raw.is_empty() {
                c.participant_id = Some(ParticipantId::new(raw));
            }
        }
        out.push(c);
    }
    Ok(out)
}

/// Import d'absences: header
/// `instructor,start_date,end_date[,status][,full_day][,time_start][,time_end]`
pub fn import_absences_csv<P: AsRef<Path>>(
    path: P,
    snapshot: &Snapshot,
) -> anyhow::Result<Vec<Absence>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing instructor")?.trim();
        let instructor = snapshot
            .find_instructor_by_handle(handle)
            .with_context(|| format!("unknown instructor handle: {handle}"))?;
        let start_date = parse_date(rec.get(1).context("missing start_date")?.trim())?;
        let end_date = parse_date(rec.get(2).context("missing end_date")?.trim())?;

        let mut absence = Absence::full_day(instructor.id.clone(), start_date, end_date);
        if let Some(raw) = rec.get(3) {
            let raw = raw.trim();
            if !raw.is_empty() {
                absence.status = parse_absence_status(raw)
                    .with_context(|| format!("invalid status for handle {handle}"))?;
            }
        }
        if let Some(raw) = rec.get(4) {
            let raw = raw.trim();
            if !raw.is_empty() {
                absence.is_full_day = parse_bool(raw)
                    .with_context(|| format!("invalid full_day value for handle {handle}"))?;
            }
        }
        let time_start = rec.get(5).map(str::trim).filter(|s| !s.is_empty());
        let time_end = rec.get(6).map(str::trim).filter(|s| !s.is_empty());
        if let (Some(ts), Some(te)) = (time_start, time_end) {
            let window = HourInterval::new(parse_hour(ts)?, parse_hour(te)?)
                .map_err(anyhow::Error::msg)?;
            absence.time_window = Some(window);
        }
        out.push(absence);
    }
    Ok(out)
}

/// Export JSON du snapshot complet (jolie mise en forme)
pub fn export_snapshot_json<P: AsRef<Path>>(path: P, snapshot: &Snapshot) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export JSON du classement (jolie mise en forme)
pub fn export_rankings_json<P: AsRef<Path>>(
    path: P,
    rankings: &[RankedCandidate],
) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(rankings)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV du classement: header
/// `rank,handle,name,score,available,continuity,hours_total,conflicts`
pub fn export_rankings_csv<P: AsRef<Path>>(
    path: P,
    rankings: &[RankedCandidate],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "rank",
        "handle",
        "name",
        "score",
        "available",
        "continuity",
        "hours_total",
        "conflicts",
    ])?;
    let mut rank_buf = itoa::Buffer::new();
    let mut score_buf = itoa::Buffer::new();
    let mut hours_buf = itoa::Buffer::new();
    for (idx, rc) in rankings.iter().enumerate() {
        let name = rc.instructor.full_name();
        let hours_total: u32 = rc.hours_booked.values().sum();
        let conflicts = rc
            .conflicts
            .iter()
            .map(|c| c.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        w.write_record([
            rank_buf.format(idx + 1),
            rc.instructor.handle.as_str(),
            name.as_str(),
            score_buf.format(rc.score),
            if rc.available_for_window { "true" } else { "false" },
            if rc.continuity_match { "true" } else { "false" },
            hours_buf.format(hours_total),
            conflicts.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des engagements: header
/// `id,instructor,date,start,end,kind,sport,meeting_point`
pub fn export_commitments_csv<P: AsRef<Path>>(
    path: P,
    snapshot: &Snapshot,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "id",
        "instructor",
        "date",
        "start",
        "end",
        "kind",
        "sport",
        "meeting_point",
    ])?;
    let mut start_buf = itoa::Buffer::new();
    let mut end_buf = itoa::Buffer::new();
    for c in &snapshot.commitments {
        let handle = snapshot
            .find_instructor_by_id(&c.instructor_id)
            .map(|i| i.handle.as_str())
            .unwrap_or(c.instructor_id.as_str());
        let date = c.date.to_string();
        let sport = c.sport.map(|s| s.to_string()).unwrap_or_default();
        w.write_record([
            c.id.as_str(),
            handle,
            date.as_str(),
            start_buf.format(c.interval.start()),
            end_buf.format(c.interval.end()),
            kind_label(c.kind),
            sport.as_str(),
            c.meeting_point.as_deref().unwrap_or(""),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn kind_label(kind: CommitmentKind) -> &'static str {
    match kind {
        CommitmentKind::PrivateLesson => "private",
        CommitmentKind::GroupCourse => "group",
    }
}

pub fn parse_specialization(s: &str) -> anyhow::Result<Specialization> {
    match s.to_ascii_lowercase().as_str() {
        "ski" => Ok(Specialization::Ski),
        "snowboard" => Ok(Specialization::Snowboard),
        "both" | "mixte" => Ok(Specialization::Both),
        _ => bail!("expected specialization (ski|snowboard|both)"),
    }
}

pub fn parse_employment_status(s: &str) -> anyhow::Result<EmploymentStatus> {
    match s.to_ascii_lowercase().as_str() {
        "active" | "actif" => Ok(EmploymentStatus::Active),
        "inactive" | "inactif" => Ok(EmploymentStatus::Inactive),
        "paused" | "pause" => Ok(EmploymentStatus::Paused),
        _ => bail!("expected employment status (active|inactive|paused)"),
    }
}

pub fn parse_live_status(s: &str) -> anyhow::Result<LiveStatus> {
    match s.to_ascii_lowercase().as_str() {
        "available" | "disponible" => Ok(LiveStatus::Available),
        "on_call" | "astreinte" => Ok(LiveStatus::OnCall),
        "unavailable" | "indisponible" => Ok(LiveStatus::Unavailable),
        _ => bail!("expected live status (available|on_call|unavailable)"),
    }
}

pub fn parse_sport(s: &str) -> anyhow::Result<Sport> {
    match s.to_ascii_lowercase().as_str() {
        "ski" => Ok(Sport::Ski),
        "snowboard" => Ok(Sport::Snowboard),
        _ => bail!("expected sport (ski|snowboard)"),
    }
}

pub fn parse_kind(s: &str) -> anyhow::Result<CommitmentKind> {
    match s.to_ascii_lowercase().as_str() {
        "private" | "prive" => Ok(CommitmentKind::PrivateLesson),
        "group" | "groupe" => Ok(CommitmentKind::GroupCourse),
        _ => bail!("expected kind (private|group)"),
    }
}

pub fn parse_absence_status(s: &str) -> anyhow::Result<AbsenceStatus> {
    match s.to_ascii_lowercase().as_str() {
        "pending" | "en_attente" => Ok(AbsenceStatus::Pending),
        "confirmed" | "confirmee" => Ok(AbsenceStatus::Confirmed),
        "rejected" | "rejetee" => Ok(AbsenceStatus::Rejected),
        _ => bail!("expected absence status (pending|confirmed|rejected)"),
    }
}

pub fn parse_hour(s: &str) -> anyhow::Result<u32> {
    let hour: u32 = s
        .parse()
        .with_context(|| format!("invalid hour: {s}"))?;
    if hour > 24 {
        bail!("hour out of range: {hour}");
    }
    Ok(hour)
}

pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date: {s}"))
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}
