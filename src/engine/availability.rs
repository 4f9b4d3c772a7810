use super::SlotState;
use crate::interval::HourInterval;
use crate::model::{Absence, Commitment, InstructorId};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Charge d'une journée : créneaux occupés et total d'heures.
#[derive(Debug, Clone, Default)]
struct DayLoad {
    intervals: Vec<HourInterval>,
    hours: u32,
}

/// Absence aplatie pour la consultation.
///
/// `window == None` vaut « journée entière » : soit l'absence est
/// déclarée telle quelle, soit elle est partielle sans fenêtre et on
/// dégrade prudemment vers le blocage complet.
#[derive(Debug, Clone)]
struct AbsenceSpan {
    start_date: NaiveDate,
    end_date: NaiveDate,
    window: Option<HourInterval>,
}

impl AbsenceSpan {
    fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    fn blocks_hour(&self, date: NaiveDate, hour: u32) -> bool {
        if !self.covers(date) {
            return false;
        }
        match &self.window {
            Some(w) => w.contains_hour(hour),
            None => true,
        }
    }
}

/// Index de disponibilité : vue consolidée engagements + absences.
///
/// Construit à chaque classement à partir du jeu de travail courant,
/// puis consulté en lecture seule.
#[derive(Debug, Default)]
pub struct AvailabilityIndex {
    booked: HashMap<InstructorId, HashMap<NaiveDate, DayLoad>>,
    absences: HashMap<InstructorId, Vec<AbsenceSpan>>,
}

impl AvailabilityIndex {
    pub fn build(commitments: &[Commitment], absences: &[Absence]) -> Self {
        let mut index = Self::default();

        for c in commitments {
            let day = index
                .booked
                .entry(c.instructor_id.clone())
                .or_default()
                .entry(c.date)
                .or_default();
            day.intervals.push(c.interval);
            day.hours += c.interval.duration();
        }

        for a in absences {
            if !a.is_blocking() {
                continue;
            }
            if a.end_date < a.start_date {
                tracing::warn!(
                    absence = a.id.as_str(),
                    "absence ignorée : date de fin avant la date de début"
                );
                continue;
            }
            let window = if a.is_full_day { None } else { a.time_window };
            index
                .absences
                .entry(a.instructor_id.clone())
                .or_default()
                .push(AbsenceSpan {
                    start_date: a.start_date,
                    end_date: a.end_date,
                    window,
                });
        }

        index
    }

    /// État d'un créneau d'une heure ; un engagement prime l'absence.
    pub fn slot_state(&self, instructor: &InstructorId, date: NaiveDate, hour: u32) -> SlotState {
        if let Some(days) = self.booked.get(instructor) {
            if let Some(day) = days.get(&date) {
                if day.intervals.iter().any(|iv| iv.contains_hour(hour)) {
                    return SlotState::Booked;
                }
            }
        }
        if let Some(spans) = self.absences.get(instructor) {
            if spans.iter().any(|s| s.blocks_hour(date, hour)) {
                return SlotState::Absent;
            }
        }
        SlotState::Free
    }

    pub fn is_free(&self, instructor: &InstructorId, date: NaiveDate, hour: u32) -> bool {
        self.slot_state(instructor, date, hour) == SlotState::Free
    }

    /// Vrai si le bloc `[start, start + duration)` est entièrement libre.
    pub fn is_block_available(
        &self,
        instructor: &InstructorId,
        date: NaiveDate,
        start: u32,
        duration: u32,
    ) -> bool {
        let Ok(block) = HourInterval::new(start, start.saturating_add(duration)) else {
            return false;
        };

        if let Some(days) = self.booked.get(instructor) {
            if let Some(day) = days.get(&date) {
                if !block.is_clear_of(&day.intervals) {
                    return false;
                }
            }
        }

        if let Some(spans) = self.absences.get(instructor) {
            for span in spans.iter().filter(|s| s.covers(date)) {
                match &span.window {
                    None => return false,
                    Some(w) => {
                        if block.overlaps(w) {
                            return false;
                        }
                    }
                }
            }
        }

        true
    }

    /// Total d'heures déjà réservées ce jour-là.
    pub fn hours_booked(&self, instructor: &InstructorId, date: NaiveDate) -> u32 {
        self.booked
            .get(instructor)
            .and_then(|days| days.get(&date))
            .map(|day| day.hours)
            .unwrap_or(0)
    }

    /// Vrai si une absence (même partielle) recouvre la date.
    pub fn has_absence_on(&self, instructor: &InstructorId, date: NaiveDate) -> bool {
        self.absences
            .get(instructor)
            .map(|spans| spans.iter().any(|s| s.covers(date)))
            .unwrap_or(false)
    }
}
