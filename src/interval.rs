use serde::{Deserialize, Serialize};
use std::fmt;

/// Intervalle horaire demi-ouvert `[start, end)` sur une journée.
///
/// Les heures sont des entiers sur la grille d'une date calendaire
/// (granularité libre, bornée par les 24 h du jour). La grille métier
/// (09:00–16:00 en station) est une donnée, pas une contrainte du type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawHourInterval")]
pub struct HourInterval {
    start: u32,
    end: u32,
}

impl HourInterval {
    /// Construit un intervalle en validant `start < end <= 24`.
    pub fn new(start: u32, end: u32) -> Result<Self, String> {
        if start >= end {
            return Err(format!("interval start {start} must be before end {end}"));
        }
        if end > 24 {
            return Err(format!("interval end {end} exceeds the 24h day grid"));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Durée en heures pleines.
    pub fn duration(&self) -> u32 {
        self.end - self.start
    }

    pub fn contains_hour(&self, hour: u32) -> bool {
        self.start <= hour && hour < self.end
    }

    /// Chevauchement strict de deux intervalles demi-ouverts.
    pub fn overlaps(&self, other: &HourInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Accolement exact (fin de l'un sur le début de l'autre).
    pub fn is_adjacent(&self, other: &HourInterval) -> bool {
        self.end == other.start || other.end == self.start
    }

    /// Vrai si aucun des intervalles occupés ne mord sur celui-ci.
    pub fn is_clear_of(&self, busy: &[HourInterval]) -> bool {
        !busy.iter().any(|b| self.overlaps(b))
    }
}

impl fmt::Display for HourInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h-{}h", self.start, self.end)
    }
}

/// Paire brute côté JSON ; la désérialisation repasse par [`HourInterval::new`].
#[derive(Deserialize)]
struct RawHourInterval {
    start: u32,
    end: u32,
}

impl TryFrom<RawHourInterval> for HourInterval {
    type Error = String;

    fn try_from(raw: RawHourInterval) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}
