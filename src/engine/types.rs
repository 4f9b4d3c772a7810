use crate::model::{Instructor, LanguageCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Poids du barème de classement (unités de score, additives).
///
/// Les valeurs par défaut suivent le barème maison : la recherche
/// nominative domine tout, la continuité pédagogique domine le reste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    /// Correspondance avec le moniteur demandé nommément.
    pub preferred_name: i64,
    /// Le moniteur a déjà encadré un des participants.
    pub continuity: i64,
    /// Journée peu chargée (1 à 3 h déjà réservées).
    pub partial_day: i64,
    /// Journée presque pleine (4 à 5 h).
    pub near_capacity: i64,
    /// Journée saturée (6 h et plus).
    pub overload: i64,
    /// Absence déclarée sur la date demandée.
    pub absence: i64,
    /// Moniteur sans aucune heure sur les dates demandées.
    pub idle_activation: i64,
    /// Malus supplémentaire si la demande ne fait qu'une heure.
    pub idle_short_booking: i64,
    /// Statut instantané « disponible ».
    pub live_available: i64,
    /// Statut instantané « en réserve ».
    pub live_on_call: i64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            preferred_name: 10_000,
            continuity: 500,
            partial_day: 100,
            near_capacity: 20,
            overload: -200,
            absence: -1_000,
            idle_activation: -30,
            idle_short_booking: -50,
            live_available: 20,
            live_on_call: 5,
        }
    }
}

/// Options de classement.
#[derive(Debug, Clone)]
pub struct RankOptions {
    pub weights: ScoreWeights,
    /// Battement annoncé lors d'un changement de matériel (minutes).
    pub material_change_buffer_min: u32,
    /// Profondeur de l'historique consulté pour la continuité.
    pub continuity_lookback: usize,
    /// Langue de repli de l'école.
    pub fallback_language: LanguageCode,
    /// Longueur minimale d'une recherche nominative (caractères).
    pub preferred_name_min_len: usize,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            material_change_buffer_min: 30,
            continuity_lookback: 50,
            fallback_language: LanguageCode::default(),
            preferred_name_min_len: 2,
        }
    }
}

/// Gêne logistique annoncée au staff, jamais bloquante.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    MaterialChange,
    LocationChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub date: NaiveDate,
    pub message: String,
}

/// Candidat classé, rendu enrichi pour l'affichage côté staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub instructor: Instructor,
    pub score: i64,
    /// Vrai si la fenêtre demandée est libre sur toutes les dates.
    pub available_for_window: bool,
    pub continuity_match: bool,
    pub conflicts: Vec<Conflict>,
    /// Heures déjà réservées, par date demandée.
    pub hours_booked: BTreeMap<NaiveDate, u32>,
}

/// État d'un créneau horaire pour un moniteur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Free,
    Booked,
    Absent,
}

/// Motif de refus d'une affectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    AlreadyBooked,
    Absent,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::AlreadyBooked => f.write_str("slot already booked"),
            RejectReason::Absent => f.write_str("instructor absent"),
        }
    }
}

/// Verdict binaire de la validation d'affectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Approved,
    Rejected(RejectReason),
}

impl ValidationOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, ValidationOutcome::Approved)
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("booking request must contain at least one date")]
    EmptyDates,
    #[error("booking duration must be at least one hour")]
    InvalidDuration,
    #[error("invalid hour interval: {0}")]
    InvalidInterval(String),
    #[error("unknown instructor: {0}")]
    UnknownInstructor(String),
    #[error("assignment rejected: {0}")]
    AssignmentRejected(RejectReason),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
