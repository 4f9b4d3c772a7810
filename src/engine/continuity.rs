use crate::model::{Commitment, InstructorId, ParticipantId};
use std::collections::HashSet;

/// Source d'historique des cours passés, injectée par l'appelant.
///
/// Le moteur ne lit aucune base : l'intégrateur fournit les derniers
/// engagements, triés du plus récent au plus ancien.
pub trait HistorySource {
    fn recent_instructors(
        &self,
        participants: &[ParticipantId],
        limit: usize,
    ) -> anyhow::Result<Vec<InstructorId>>;
}

/// Historique en mémoire, suffisant pour les jeux de travail du CLI.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    commitments: Vec<Commitment>,
}

impl InMemoryHistory {
    pub fn new(mut commitments: Vec<Commitment>) -> Self {
        commitments.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.interval.start().cmp(&a.interval.start()))
        });
        Self { commitments }
    }
}

impl HistorySource for InMemoryHistory {
    fn recent_instructors(
        &self,
        participants: &[ParticipantId],
        limit: usize,
    ) -> anyhow::Result<Vec<InstructorId>> {
        let out = self
            .commitments
            .iter()
            .filter(|c| {
                c.participant_id
                    .as_ref()
                    .map(|p| participants.contains(p))
                    .unwrap_or(false)
            })
            .take(limit)
            .map(|c| c.instructor_id.clone())
            .collect();
        Ok(out)
    }
}

/// Résolution de continuité : une seule consultation de l'historique
/// par classement, mémorisée pour tous les candidats.
#[derive(Debug, Default)]
pub(super) struct ContinuityResolver {
    taught: HashSet<InstructorId>,
}

impl ContinuityResolver {
    pub(super) fn prepare(
        history: &dyn HistorySource,
        participants: &[ParticipantId],
        lookback: usize,
    ) -> Self {
        if participants.is_empty() {
            return Self::default();
        }
        let taught = match history.recent_instructors(participants, lookback) {
            Ok(ids) => ids.into_iter().collect(),
            Err(err) => {
                tracing::warn!(error = %err, "historique indisponible, continuité ignorée");
                HashSet::new()
            }
        };
        Self { taught }
    }

    pub(super) fn has_taught(&self, instructor: &InstructorId) -> bool {
        self.taught.contains(instructor)
    }
}
