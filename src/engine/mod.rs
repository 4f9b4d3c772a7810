mod availability;
mod conflicts;
mod continuity;
mod ranking;
mod types;
mod validate;

pub use availability::AvailabilityIndex;
pub use continuity::{HistorySource, InMemoryHistory};
pub use types::{
    Conflict, ConflictKind, EngineError, RankOptions, RankedCandidate, RejectReason, ScoreWeights,
    SlotState, ValidationOutcome,
};

use crate::interval::HourInterval;
use crate::model::{
    Absence, BookingRequest, Commitment, CommitmentId, Instructor, InstructorId, Snapshot,
};
use chrono::NaiveDate;

/// Ranker : façade du moteur de classement et de validation.
///
/// Sans état entre deux appels : chaque invocation reçoit le jeu de
/// travail complet, plusieurs classements peuvent donc tourner en
/// parallèle sur le même snapshot partagé en lecture.
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    opts: RankOptions,
}

impl Ranker {
    pub fn new() -> Self {
        Self {
            opts: RankOptions::default(),
        }
    }

    pub fn with_options(opts: RankOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &RankOptions {
        &self.opts
    }

    /// Classe les moniteurs éligibles pour la demande, du meilleur au
    /// moins bon. Une liste vide n'est pas une erreur.
    pub fn rank(
        &self,
        request: &BookingRequest,
        instructors: &[Instructor],
        commitments: &[Commitment],
        absences: &[Absence],
        history: &dyn HistorySource,
    ) -> Result<Vec<RankedCandidate>, EngineError> {
        ranking::rank_candidates(&self.opts, request, instructors, commitments, absences, history)
    }

    /// Verdict d'affectation pour un intervalle précis.
    pub fn validate_assignment(
        &self,
        instructor: &InstructorId,
        date: NaiveDate,
        interval: &HourInterval,
        commitments: &[Commitment],
        absences: &[Absence],
    ) -> ValidationOutcome {
        validate::validate_assignment(instructor, date, interval, commitments, absences)
    }

    /// Valide puis enregistre l'engagement dans le snapshot.
    pub fn confirm_booking(
        &self,
        snapshot: &mut Snapshot,
        commitment: Commitment,
    ) -> Result<CommitmentId, EngineError> {
        validate::confirm_booking(snapshot, commitment)
    }
}
