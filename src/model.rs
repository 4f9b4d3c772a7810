use crate::interval::HourInterval;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifiant fort pour Instructor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstructorId(String);

impl InstructorId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour Participant (élève)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour Commitment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentId(String);

impl CommitmentId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour Absence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbsenceId(String);

impl AbsenceId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Code langue (type ISO 639-1), normalisé en minuscules à la création.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().trim().to_lowercase())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Langue de repli de l'école : l'allemand.
impl Default for LanguageCode {
    fn default() -> Self {
        Self("de".to_string())
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Discipline demandée par un client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Ski,
    Snowboard,
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sport::Ski => f.write_str("ski"),
            Sport::Snowboard => f.write_str("snowboard"),
        }
    }
}

/// Spécialisation d'un moniteur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Specialization {
    Ski,
    Snowboard,
    Both,
}

impl Specialization {
    /// Vrai si la spécialisation couvre la discipline demandée.
    pub fn covers(&self, sport: Sport) -> bool {
        matches!(
            (self, sport),
            (Specialization::Both, _)
                | (Specialization::Ski, Sport::Ski)
                | (Specialization::Snowboard, Sport::Snowboard)
        )
    }
}

/// Statut contractuel ; seuls les moniteurs actifs entrent au classement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentStatus {
    Active,
    Inactive,
    Paused,
}

/// Statut instantané déclaré par le moniteur lui-même.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiveStatus {
    Available,
    OnCall,
    Unavailable,
}

/// Statut d'une absence ; une absence rejetée est sans effet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbsenceStatus {
    Pending,
    Confirmed,
    Rejected,
}

/// Nature d'un engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentKind {
    PrivateLesson,
    GroupCourse,
}

/// Moniteur de l'école (la gestion RH reste hors du moteur).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    pub id: InstructorId,
    pub handle: String,
    pub first_name: String,
    pub last_name: String,
    pub specialization: Specialization,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<LanguageCode>,
    pub employment_status: EmploymentStatus,
    pub live_status: LiveStatus,
}

impl Instructor {
    pub fn new<H, F, L>(
        handle: H,
        first_name: F,
        last_name: L,
        specialization: Specialization,
    ) -> Self
    where
        H: Into<String>,
        F: Into<String>,
        L: Into<String>,
    {
        Self {
            id: InstructorId::random(),
            handle: handle.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            specialization,
            languages: Vec::new(),
            employment_status: EmploymentStatus::Active,
            live_status: LiveStatus::Available,
        }
    }

    /// Nom complet « Prénom Nom », base de la recherche nominative.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn speaks(&self, language: &LanguageCode) -> bool {
        self.languages.iter().any(|l| l == language)
    }
}

/// Engagement : un créneau occupé pour un moniteur à une date donnée.
///
/// Invariant : deux engagements d'un même moniteur le même jour ne se
/// chevauchent jamais (garanti par la validation avant toute écriture).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub id: CommitmentId,
    pub instructor_id: InstructorId,
    pub date: NaiveDate,
    pub interval: HourInterval,
    pub kind: CommitmentKind,
    #[serde(default)]
    pub sport: Option<Sport>,
    #[serde(default)]
    pub meeting_point: Option<String>,
    #[serde(default)]
    pub participant_id: Option<ParticipantId>,
}

impl Commitment {
    pub fn new(
        instructor_id: InstructorId,
        date: NaiveDate,
        interval: HourInterval,
        kind: CommitmentKind,
    ) -> Self {
        Self {
            id: CommitmentId::random(),
            instructor_id,
            date,
            interval,
            kind,
            sport: None,
            meeting_point: None,
            participant_id: None,
        }
    }

    pub fn with_sport(mut self, sport: Sport) -> Self {
        self.sport = Some(sport);
        self
    }

    pub fn with_meeting_point<S: Into<String>>(mut self, point: S) -> Self {
        self.meeting_point = Some(point.into());
        self
    }

    pub fn with_participant(mut self, participant: ParticipantId) -> Self {
        self.participant_id = Some(participant);
        self
    }

    /// Durée en heures pleines.
    pub fn duration_hours(&self) -> u32 {
        self.interval.duration()
    }
}

/// Absence d'un moniteur sur une plage de dates (bornes incluses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    pub id: AbsenceId,
    pub instructor_id: InstructorId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: AbsenceStatus,
    pub is_full_day: bool,
    #[serde(default)]
    pub time_window: Option<HourInterval>,
}

impl Absence {
    /// Absence journée entière, confirmée.
    pub fn full_day(
        instructor_id: InstructorId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: AbsenceId::random(),
            instructor_id,
            start_date,
            end_date,
            status: AbsenceStatus::Confirmed,
            is_full_day: true,
            time_window: None,
        }
    }

    /// Absence partielle : seule la fenêtre déclarée bloque le planning.
    pub fn partial(
        instructor_id: InstructorId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        time_window: HourInterval,
    ) -> Self {
        Self {
            id: AbsenceId::random(),
            instructor_id,
            start_date,
            end_date,
            status: AbsenceStatus::Confirmed,
            is_full_day: false,
            time_window: Some(time_window),
        }
    }

    /// Une absence rejetée n'affecte jamais la disponibilité.
    pub fn is_blocking(&self) -> bool {
        self.status != AbsenceStatus::Rejected
    }

    pub fn covers_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Demande de réservation soumise au moteur de classement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub dates: Vec<NaiveDate>,
    #[serde(default)]
    pub sport: Option<Sport>,
    #[serde(default)]
    pub language: LanguageCode,
    #[serde(default)]
    pub duration_hours: Option<u32>,
    #[serde(default)]
    pub desired_start_hour: Option<u32>,
    #[serde(default)]
    pub meeting_point: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub continuity_participants: Vec<ParticipantId>,
    #[serde(default)]
    pub preferred_instructor: Option<String>,
}

impl BookingRequest {
    pub fn for_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            dates: dates.into_iter().collect(),
            sport: None,
            language: LanguageCode::default(),
            duration_hours: None,
            desired_start_hour: None,
            meeting_point: None,
            continuity_participants: Vec::new(),
            preferred_instructor: None,
        }
    }
}

/// Jeu de travail complet prêté au moteur par l'appelant.
///
/// Le moteur n'en conserve rien entre deux invocations : tout
/// re-classement part d'entrées fraîches.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Snapshot {
    pub instructors: Vec<Instructor>,
    pub commitments: Vec<Commitment>,
    pub absences: Vec<Absence>,
}

impl Snapshot {
    pub fn find_instructor_by_handle<'a>(&'a self, handle: &str) -> Option<&'a Instructor> {
        self.instructors.iter().find(|i| i.handle == handle)
    }
    pub fn find_instructor_by_id<'a>(&'a self, id: &InstructorId) -> Option<&'a Instructor> {
        self.instructors.iter().find(|i| &i.id == id)
    }
    pub fn find_commitment<'a>(&'a self, id: &CommitmentId) -> Option<&'a Commitment> {
        self.commitments.iter().find(|c| &c.id == id)
    }
    /// Retire un engagement (annulation côté appelant).
    pub fn remove_commitment(&mut self, id: &CommitmentId) -> bool {
        let before = self.commitments.len();
        self.commitments.retain(|c| &c.id != id);
        self.commitments.len() < before
    }
}
