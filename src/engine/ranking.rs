use super::availability::AvailabilityIndex;
use super::continuity::ContinuityResolver;
use super::{conflicts, EngineError, HistorySource, RankOptions, RankedCandidate};
use crate::interval::HourInterval;
use crate::model::{Absence, BookingRequest, Commitment, EmploymentStatus, Instructor, LiveStatus};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

pub(super) fn rank_candidates(
    opts: &RankOptions,
    request: &BookingRequest,
    instructors: &[Instructor],
    commitments: &[Commitment],
    absences: &[Absence],
    history: &dyn HistorySource,
) -> Result<Vec<RankedCandidate>, EngineError> {
    check_request(request)?;
    let window = requested_window(request)?;

    // Dates dédoublonnées et triées : le score est indépendant de
    // l'ordre de saisie.
    let dates: Vec<NaiveDate> = request
        .dates
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let index = AvailabilityIndex::build(commitments, absences);
    let continuity = ContinuityResolver::prepare(
        history,
        &request.continuity_participants,
        opts.continuity_lookback,
    );

    let mut out: Vec<RankedCandidate> = instructors
        .iter()
        .filter(|i| is_eligible(opts, request, i))
        .map(|i| {
            score_candidate(
                opts,
                request,
                i,
                &dates,
                window.as_ref(),
                &index,
                &continuity,
                commitments,
            )
        })
        .collect();

    // Les moniteurs libres sur la fenêtre passent devant, puis score
    // décroissant, puis nom de famille (tri stable).
    out.sort_by(|a, b| {
        b.available_for_window
            .cmp(&a.available_for_window)
            .then_with(|| b.score.cmp(&a.score))
            .then_with(|| a.instructor.last_name.cmp(&b.instructor.last_name))
    });

    tracing::debug!(candidates = out.len(), dates = dates.len(), "classement terminé");
    Ok(out)
}

fn check_request(request: &BookingRequest) -> Result<(), EngineError> {
    if request.dates.is_empty() {
        return Err(EngineError::EmptyDates);
    }
    if request.duration_hours == Some(0) {
        return Err(EngineError::InvalidDuration);
    }
    Ok(())
}

/// Fenêtre horaire demandée, si la demande précise heure ET durée.
fn requested_window(request: &BookingRequest) -> Result<Option<HourInterval>, EngineError> {
    match (request.desired_start_hour, request.duration_hours) {
        (Some(start), Some(duration)) => HourInterval::new(start, start.saturating_add(duration))
            .map(Some)
            .map_err(EngineError::InvalidInterval),
        _ => Ok(None),
    }
}

/// Filtres durs : contrat actif, discipline couverte, langue parlée.
fn is_eligible(opts: &RankOptions, request: &BookingRequest, instructor: &Instructor) -> bool {
    if instructor.employment_status != EmploymentStatus::Active {
        return false;
    }
    if let Some(sport) = request.sport {
        if !instructor.specialization.covers(sport) {
            return false;
        }
    }
    // La langue de repli n'exclut personne ; toute autre langue exige
    // que le moniteur parle la langue demandée ou celle de repli.
    if request.language != opts.fallback_language
        && !instructor.speaks(&request.language)
        && !instructor.speaks(&opts.fallback_language)
    {
        return false;
    }
    true
}

/// Recherche nominative : fragment d'au moins `min_len` caractères,
/// comparé sans tenir compte de la casse au nom complet.
fn preferred_matches(preferred: Option<&str>, instructor: &Instructor, min_len: usize) -> bool {
    let Some(raw) = preferred else {
        return false;
    };
    let fragment = raw.trim();
    if fragment.chars().count() < min_len {
        return false;
    }
    instructor
        .full_name()
        .to_lowercase()
        .contains(&fragment.to_lowercase())
}

/// Barème de charge journalière.
fn density_bonus(weights: &super::ScoreWeights, hours: u32) -> i64 {
    match hours {
        0 => 0,
        1..=3 => weights.partial_day,
        4..=5 => weights.near_capacity,
        _ => weights.overload,
    }
}

#[allow(clippy::too_many_arguments)]
fn score_candidate(
    opts: &RankOptions,
    request: &BookingRequest,
    instructor: &Instructor,
    dates: &[NaiveDate],
    window: Option<&HourInterval>,
    index: &AvailabilityIndex,
    continuity: &ContinuityResolver,
    commitments: &[Commitment],
) -> RankedCandidate {
    let weights = &opts.weights;
    let mut score = 0i64;

    if preferred_matches(
        request.preferred_instructor.as_deref(),
        instructor,
        opts.preferred_name_min_len,
    ) {
        score += weights.preferred_name;
    }

    let continuity_match = continuity.has_taught(&instructor.id);
    if continuity_match {
        score += weights.continuity;
    }

    let mut hours_booked = BTreeMap::new();
    let mut total_hours = 0u32;
    let mut all_conflicts = Vec::new();

    for &date in dates {
        let hours = index.hours_booked(&instructor.id, date);
        score += density_bonus(weights, hours);
        if index.has_absence_on(&instructor.id, date) {
            score += weights.absence;
        }
        all_conflicts.extend(conflicts::detect_conflicts(
            opts,
            request,
            instructor,
            date,
            window,
            commitments,
        ));
        hours_booked.insert(date, hours);
        total_hours += hours;
    }

    // Garde-fou d'efficacité : activer un moniteur à zéro heure coûte,
    // encore plus pour une leçon d'une seule heure.
    if total_hours == 0 {
        score += weights.idle_activation;
        if request.duration_hours == Some(1) {
            score += weights.idle_short_booking;
        }
    }

    score += match instructor.live_status {
        LiveStatus::Available => weights.live_available,
        LiveStatus::OnCall => weights.live_on_call,
        LiveStatus::Unavailable => 0,
    };

    // Sans fenêtre précise la partition est neutre : tout le monde est
    // réputé libre.
    let available_for_window = window
        .map(|w| {
            dates
                .iter()
                .all(|&d| index.is_block_available(&instructor.id, d, w.start(), w.duration()))
        })
        .unwrap_or(true);

    RankedCandidate {
        instructor: instructor.clone(),
        score,
        available_for_window,
        continuity_match,
        conflicts: all_conflicts,
        hours_booked,
    }
}
