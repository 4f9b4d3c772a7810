use super::availability::AvailabilityIndex;
use super::{EngineError, RejectReason, SlotState, ValidationOutcome};
use crate::interval::HourInterval;
use crate::model::{Absence, Commitment, CommitmentId, InstructorId, Snapshot};
use chrono::NaiveDate;

/// Vérifie heure par heure que l'intervalle est affectable.
///
/// Un refus est définitif : aucune dérogation, le moteur de classement
/// ne propose que des candidats, la validation tranche.
pub(super) fn validate_assignment(
    instructor: &InstructorId,
    date: NaiveDate,
    interval: &HourInterval,
    commitments: &[Commitment],
    absences: &[Absence],
) -> ValidationOutcome {
    let index = AvailabilityIndex::build(commitments, absences);
    for hour in interval.start()..interval.end() {
        match index.slot_state(instructor, date, hour) {
            SlotState::Booked => {
                return ValidationOutcome::Rejected(RejectReason::AlreadyBooked);
            }
            SlotState::Absent => {
                return ValidationOutcome::Rejected(RejectReason::Absent);
            }
            SlotState::Free => {}
        }
    }
    ValidationOutcome::Approved
}

/// Valide puis insère l'engagement dans le jeu de travail.
pub(super) fn confirm_booking(
    snapshot: &mut Snapshot,
    commitment: Commitment,
) -> Result<CommitmentId, EngineError> {
    if snapshot
        .find_instructor_by_id(&commitment.instructor_id)
        .is_none()
    {
        return Err(EngineError::UnknownInstructor(
            commitment.instructor_id.as_str().to_string(),
        ));
    }

    match validate_assignment(
        &commitment.instructor_id,
        commitment.date,
        &commitment.interval,
        &snapshot.commitments,
        &snapshot.absences,
    ) {
        ValidationOutcome::Approved => {
            tracing::debug!(
                commitment = commitment.id.as_str(),
                date = %commitment.date,
                "engagement confirmé"
            );
            let id = commitment.id.clone();
            snapshot.commitments.push(commitment);
            Ok(id)
        }
        ValidationOutcome::Rejected(reason) => Err(EngineError::AssignmentRejected(reason)),
    }
}
