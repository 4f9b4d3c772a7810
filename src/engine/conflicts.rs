use super::{Conflict, ConflictKind, RankOptions};
use crate::interval::HourInterval;
use crate::model::{BookingRequest, Commitment, Instructor};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Signale les gênes logistiques entre la demande et les engagements
/// existants du moniteur ce jour-là. Purement informatif.
pub(super) fn detect_conflicts(
    opts: &RankOptions,
    request: &BookingRequest,
    instructor: &Instructor,
    date: NaiveDate,
    window: Option<&HourInterval>,
    commitments: &[Commitment],
) -> Vec<Conflict> {
    let mut out = Vec::new();

    let same_day: Vec<&Commitment> = commitments
        .iter()
        .filter(|c| c.instructor_id == instructor.id && c.date == date)
        .collect();

    if let (Some(window), Some(requested_sport)) = (window, request.sport) {
        for c in same_day.iter() {
            let Some(existing_sport) = c.sport else {
                continue;
            };
            if existing_sport == requested_sport {
                continue;
            }
            if !window.is_adjacent(&c.interval) {
                continue;
            }
            // Le cours existant vient-il avant ou après la demande ?
            let (first, second) = if c.interval.end() == window.start() {
                (existing_sport, requested_sport)
            } else {
                (requested_sport, existing_sport)
            };
            out.push(Conflict {
                kind: ConflictKind::MaterialChange,
                date,
                message: format!(
                    "changement de matériel : {first} puis {second} (prévoir {} min)",
                    opts.material_change_buffer_min
                ),
            });
        }
    }

    if let Some(requested_point) = request.meeting_point.as_deref() {
        let mut seen = BTreeSet::new();
        for c in same_day.iter() {
            let Some(point) = c.meeting_point.as_deref() else {
                continue;
            };
            if point == requested_point {
                continue;
            }
            if !seen.insert(point) {
                continue;
            }
            out.push(Conflict {
                kind: ConflictKind::LocationChange,
                date,
                message: format!("changement de lieu : {point} et {requested_point} le même jour"),
            });
        }
    }

    out
}
