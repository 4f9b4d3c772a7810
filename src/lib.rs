#![forbid(unsafe_code)]
//! Moniteur — moteur de classement des moniteurs d'une école de ski (sans BD).
//!
//! - Index de disponibilité par heures pleines (engagements + absences).
//! - Classement par score additif : demande nominative, continuité
//!   pédagogique, charge journalière, statut instantané.
//! - Conflits logistiques signalés, jamais bloquants.
//! - Validation stricte avant toute écriture d'engagement.
//! - Stockage fichiers (JSON/CSV) ; dates naïves, heures pleines.

pub mod engine;
pub mod interval;
pub mod io;
pub mod model;
pub mod storage;

pub use engine::{
    Conflict, ConflictKind, EngineError, HistorySource, InMemoryHistory, RankOptions,
    RankedCandidate, Ranker, RejectReason, ScoreWeights, ValidationOutcome,
};
pub use interval::HourInterval;
pub use model::{
    Absence, AbsenceId, AbsenceStatus, BookingRequest, Commitment, CommitmentId, CommitmentKind,
    EmploymentStatus, Instructor, InstructorId, LanguageCode, LiveStatus, ParticipantId, Snapshot,
    Specialization, Sport,
};
pub use storage::{JsonStorage, Storage};
