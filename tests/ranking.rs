#![forbid(unsafe_code)]
use chrono::NaiveDate;
use moniteur::engine::{
    ConflictKind, EngineError, HistorySource, InMemoryHistory, RankOptions, Ranker, ScoreWeights,
};
use moniteur::model::{
    Absence, BookingRequest, Commitment, CommitmentKind, EmploymentStatus, Instructor,
    InstructorId, LanguageCode, LiveStatus, ParticipantId, Specialization, Sport,
};
use moniteur::HourInterval;
use std::cell::RefCell;

#[test]
fn empty_dates_is_an_error() {
    let request = BookingRequest::for_dates([]);
    let err = Ranker::new()
        .rank(&request, &[], &[], &[], &no_history())
        .unwrap_err();
    assert!(matches!(err, EngineError::EmptyDates));
}

#[test]
fn zero_duration_is_an_error() {
    let mut request = BookingRequest::for_dates([d(2026, 1, 10)]);
    request.duration_hours = Some(0);
    let err = Ranker::new()
        .rank(&request, &[], &[], &[], &no_history())
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidDuration));
}

#[test]
fn window_past_midnight_is_an_error() {
    let mut request = BookingRequest::for_dates([d(2026, 1, 10)]);
    request.desired_start_hour = Some(23);
    request.duration_hours = Some(5);
    let err = Ranker::new()
        .rank(&request, &[], &[], &[], &no_history())
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInterval(_)));
}

#[test]
fn eligibility_filters_contract_and_sport() {
    let mut paused = Instructor::new("paula", "Paula", "Blanc", Specialization::Both);
    paused.employment_status = EmploymentStatus::Paused;
    let ski_only = Instructor::new("serge", "Serge", "Roux", Specialization::Ski);
    let rider = Instructor::new("rita", "Rita", "Keller", Specialization::Both);

    let mut request = BookingRequest::for_dates([d(2026, 1, 10)]);
    request.sport = Some(Sport::Snowboard);

    let ranked = Ranker::new()
        .rank(&request, &[paused, ski_only, rider], &[], &[], &no_history())
        .unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].instructor.handle, "rita");
}

#[test]
fn fallback_language_excludes_nobody() {
    // Demande en allemand (langue de repli) : aucun filtre de langue.
    let silent = Instructor::new("sven", "Sven", "Oberer", Specialization::Both);
    let request = BookingRequest::for_dates([d(2026, 1, 10)]);
    let ranked = Ranker::new()
        .rank(&request, &[silent], &[], &[], &no_history())
        .unwrap();
    assert_eq!(ranked.len(), 1);
}

#[test]
fn foreign_language_keeps_speakers_and_fallback_speakers() {
    let mut italian = Instructor::new("ivo", "Ivo", "Conti", Specialization::Both);
    italian.languages = vec![LanguageCode::new("it")];
    let mut german = Instructor::new("greta", "Greta", "Huber", Specialization::Both);
    german.languages = vec![LanguageCode::new("de")];
    let mut french = Instructor::new("fanny", "Fanny", "Morel", Specialization::Both);
    french.languages = vec![LanguageCode::new("fr")];

    let mut request = BookingRequest::for_dates([d(2026, 1, 10)]);
    request.language = LanguageCode::new("fr");

    let ranked = Ranker::new()
        .rank(&request, &[italian, german, french], &[], &[], &no_history())
        .unwrap();
    let handles: Vec<&str> = ranked.iter().map(|r| r.instructor.handle.as_str()).collect();
    assert_eq!(ranked.len(), 2);
    assert!(handles.contains(&"greta"));
    assert!(handles.contains(&"fanny"));
}

#[test]
fn preferred_name_outweighs_every_malus() {
    let date = d(2026, 1, 10);
    let wanted = Instructor::new("alice", "Alice", "Martin", Specialization::Both);
    let busy = Instructor::new("bruno", "Bruno", "Keller", Specialization::Both);

    // La demandée est absente et sans aucune heure ; l'autre cumule
    // continuité et charge idéale.
    let absence = Absence::full_day(wanted.id.clone(), date, date);
    let lesson = Commitment::new(busy.id.clone(), date, iv(9, 11), CommitmentKind::PrivateLesson);
    let past = Commitment::new(
        busy.id.clone(),
        d(2025, 12, 20),
        iv(9, 11),
        CommitmentKind::PrivateLesson,
    )
    .with_participant(ParticipantId::new("emma"));

    let mut request = BookingRequest::for_dates([date]);
    request.preferred_instructor = Some("Martin".to_string());
    request.continuity_participants = vec![ParticipantId::new("emma")];

    let history = InMemoryHistory::new(vec![past]);
    let ranked = Ranker::new()
        .rank(
            &request,
            &[wanted.clone(), busy],
            &[lesson],
            &[absence],
            &history,
        )
        .unwrap();

    assert_eq!(ranked[0].instructor.handle, "alice");
    // 10000 (nominative) - 1000 (absence) - 30 (zéro heure) + 20 (dispo)
    assert_eq!(ranked[0].score, 8990);
    // 500 (continuité) + 100 (charge partielle) + 20 (dispo)
    assert_eq!(ranked[1].score, 620);
}

#[test]
fn short_preference_fragment_is_ignored() {
    let alice = Instructor::new("alice", "Alice", "Martin", Specialization::Both);
    let mut request = BookingRequest::for_dates([d(2026, 1, 10)]);
    request.preferred_instructor = Some(" a ".to_string());

    let ranked = Ranker::new()
        .rank(&request, &[alice], &[], &[], &no_history())
        .unwrap();
    // -30 (zéro heure) + 20 (dispo), sans bonus nominatif.
    assert_eq!(ranked[0].score, -10);
}

#[test]
fn preference_matching_ignores_case() {
    let alice = Instructor::new("alice", "Alice", "Martin", Specialization::Both);
    let mut request = BookingRequest::for_dates([d(2026, 1, 10)]);
    request.preferred_instructor = Some("aLiCe mAr".to_string());

    let ranked = Ranker::new()
        .rank(&request, &[alice], &[], &[], &no_history())
        .unwrap();
    assert_eq!(ranked[0].score, 10_000 - 30 + 20);
}

#[test]
fn continuity_queries_history_once() {
    let alice = Instructor::new("alice", "Alice", "Martin", Specialization::Both);
    let bruno = Instructor::new("bruno", "Bruno", "Keller", Specialization::Both);
    let carla = Instructor::new("carla", "Carla", "Dupont", Specialization::Both);

    let history = CountingHistory {
        calls: RefCell::new(0),
        taught: vec![alice.id.clone()],
    };
    let mut request = BookingRequest::for_dates([d(2026, 1, 10)]);
    request.continuity_participants = vec![ParticipantId::new("emma")];

    let ranked = Ranker::new()
        .rank(&request, &[alice, bruno, carla], &[], &[], &history)
        .unwrap();

    assert_eq!(*history.calls.borrow(), 1);
    assert_eq!(ranked[0].instructor.handle, "alice");
    assert!(ranked[0].continuity_match);
    assert!(!ranked[1].continuity_match);
    assert_eq!(ranked[0].score - ranked[1].score, 500);
}

#[test]
fn no_participants_skips_history() {
    let alice = Instructor::new("alice", "Alice", "Martin", Specialization::Both);
    let history = CountingHistory {
        calls: RefCell::new(0),
        taught: vec![alice.id.clone()],
    };
    let request = BookingRequest::for_dates([d(2026, 1, 10)]);

    let ranked = Ranker::new()
        .rank(&request, &[alice], &[], &[], &history)
        .unwrap();
    assert_eq!(*history.calls.borrow(), 0);
    assert!(!ranked[0].continuity_match);
}

#[test]
fn history_failure_degrades_to_no_continuity() {
    let alice = Instructor::new("alice", "Alice", "Martin", Specialization::Both);
    let mut request = BookingRequest::for_dates([d(2026, 1, 10)]);
    request.continuity_participants = vec![ParticipantId::new("emma")];

    let ranked = Ranker::new()
        .rank(&request, &[alice], &[], &[], &FailingHistory)
        .unwrap();
    assert_eq!(ranked.len(), 1);
    assert!(!ranked[0].continuity_match);
}

#[test]
fn daily_load_tiers() {
    let date = d(2026, 1, 10);
    let idle = Instructor::new("ines", "Ines", "Weber", Specialization::Both);
    let light = Instructor::new("lea", "Lea", "Faure", Specialization::Both);
    let heavy = Instructor::new("hugo", "Hugo", "Petit", Specialization::Both);
    let full = Instructor::new("fred", "Fred", "Simon", Specialization::Both);

    let commitments = vec![
        Commitment::new(light.id.clone(), date, iv(9, 11), CommitmentKind::PrivateLesson),
        Commitment::new(heavy.id.clone(), date, iv(9, 13), CommitmentKind::GroupCourse),
        Commitment::new(full.id.clone(), date, iv(9, 15), CommitmentKind::GroupCourse),
    ];
    let mut request = BookingRequest::for_dates([date]);
    request.duration_hours = Some(2);

    let ranked = Ranker::new()
        .rank(&request, &[idle, light, heavy, full], &commitments, &[], &no_history())
        .unwrap();

    let handles: Vec<&str> = ranked.iter().map(|r| r.instructor.handle.as_str()).collect();
    assert_eq!(handles, vec!["lea", "hugo", "ines", "fred"]);
    assert_eq!(ranked[0].score, 120); // 1-3 h : +100, +20 dispo
    assert_eq!(ranked[1].score, 40); // 4-5 h : +20, +20 dispo
    assert_eq!(ranked[2].score, -10); // zéro heure : -30, +20 dispo
    assert_eq!(ranked[3].score, -180); // 6 h et plus : -200, +20 dispo
}

#[test]
fn absence_penalises_without_excluding() {
    let date = d(2026, 1, 10);
    let away = Instructor::new("abel", "Abel", "Girard", Specialization::Both);
    let there = Instructor::new("tina", "Tina", "Lopez", Specialization::Both);
    let absence = Absence::full_day(away.id.clone(), date, date);

    let request = BookingRequest::for_dates([date]);
    let ranked = Ranker::new()
        .rank(&request, &[away, there], &[], &[absence], &no_history())
        .unwrap();

    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].instructor.handle, "tina");
    assert_eq!(ranked[0].score - ranked[1].score, 1_000);
}

#[test]
fn one_hour_booking_doubles_idle_penalty() {
    let date = d(2026, 1, 10);
    let idle = Instructor::new("ines", "Ines", "Weber", Specialization::Both);
    let busy = Instructor::new("bruno", "Bruno", "Keller", Specialization::Both);
    let lesson = Commitment::new(busy.id.clone(), date, iv(9, 11), CommitmentKind::PrivateLesson);

    let mut request = BookingRequest::for_dates([date]);
    request.duration_hours = Some(1);

    let ranked = Ranker::new()
        .rank(&request, &[idle, busy], &[lesson], &[], &no_history())
        .unwrap();
    assert_eq!(ranked[0].instructor.handle, "bruno");
    assert_eq!(ranked[0].score, 120);
    // -30 (zéro heure) - 50 (leçon d'une heure) + 20 (dispo)
    assert_eq!(ranked[1].score, -60);
}

#[test]
fn live_status_nudges_the_order() {
    let avail = Instructor::new("ava", "Ava", "Blanc", Specialization::Both);
    let mut on_call = Instructor::new("omar", "Omar", "Diaz", Specialization::Both);
    on_call.live_status = LiveStatus::OnCall;
    let mut off = Instructor::new("ugo", "Ugo", "Renard", Specialization::Both);
    off.live_status = LiveStatus::Unavailable;

    let request = BookingRequest::for_dates([d(2026, 1, 10)]);
    let ranked = Ranker::new()
        .rank(&request, &[avail, on_call, off], &[], &[], &no_history())
        .unwrap();

    let handles: Vec<&str> = ranked.iter().map(|r| r.instructor.handle.as_str()).collect();
    assert_eq!(handles, vec!["ava", "omar", "ugo"]);
    assert_eq!(ranked[0].score - ranked[2].score, 20);
    assert_eq!(ranked[1].score - ranked[2].score, 5);
}

#[test]
fn window_availability_beats_any_score() {
    let date = d(2026, 1, 10);
    let star = Instructor::new("stella", "Stella", "Martin", Specialization::Both);
    let free = Instructor::new("felix", "Felix", "Aubry", Specialization::Both);
    let blocking =
        Commitment::new(star.id.clone(), date, iv(10, 12), CommitmentKind::PrivateLesson);

    let mut request = BookingRequest::for_dates([date]);
    request.preferred_instructor = Some("Stella".to_string());
    request.desired_start_hour = Some(10);
    request.duration_hours = Some(2);

    let ranked = Ranker::new()
        .rank(&request, &[star, free], &[blocking], &[], &no_history())
        .unwrap();

    assert_eq!(ranked[0].instructor.handle, "felix");
    assert!(ranked[0].available_for_window);
    assert_eq!(ranked[1].instructor.handle, "stella");
    assert!(!ranked[1].available_for_window);
    assert!(ranked[1].score > ranked[0].score);
}

#[test]
fn without_window_everyone_is_marked_available() {
    let date = d(2026, 1, 10);
    let busy = Instructor::new("bruno", "Bruno", "Keller", Specialization::Both);
    let lesson = Commitment::new(busy.id.clone(), date, iv(9, 15), CommitmentKind::GroupCourse);

    let mut request = BookingRequest::for_dates([date]);
    request.duration_hours = Some(2); // durée sans heure : pas de fenêtre

    let ranked = Ranker::new()
        .rank(&request, &[busy], &[lesson], &[], &no_history())
        .unwrap();
    assert!(ranked[0].available_for_window);
}

#[test]
fn multi_date_window_needs_every_date_free() {
    let d1 = d(2026, 1, 10);
    let d2 = d(2026, 1, 11);
    let partly = Instructor::new("paul", "Paul", "Arnaud", Specialization::Both);
    let free = Instructor::new("fanny", "Fanny", "Morel", Specialization::Both);
    let blocking = Commitment::new(partly.id.clone(), d2, iv(10, 12), CommitmentKind::GroupCourse);

    let mut request = BookingRequest::for_dates([d1, d2]);
    request.desired_start_hour = Some(10);
    request.duration_hours = Some(2);

    let ranked = Ranker::new()
        .rank(&request, &[partly, free], &[blocking], &[], &no_history())
        .unwrap();

    assert_eq!(ranked[0].instructor.handle, "fanny");
    assert!(ranked[0].available_for_window);
    assert!(!ranked[1].available_for_window);
}

#[test]
fn duplicate_dates_are_counted_once() {
    let date = d(2026, 1, 10);
    let alice = Instructor::new("alice", "Alice", "Martin", Specialization::Both);
    let absence = Absence::full_day(alice.id.clone(), date, date);

    let request = BookingRequest::for_dates([date, date, date]);
    let ranked = Ranker::new()
        .rank(&request, &[alice], &[], &[absence], &no_history())
        .unwrap();
    // Un seul malus d'absence malgré la date répétée.
    assert_eq!(ranked[0].score, -1_000 - 30 + 20);
}

#[test]
fn ranking_is_deterministic() {
    let date = d(2026, 1, 10);
    let alice = Instructor::new("alice", "Alice", "Martin", Specialization::Both);
    let bruno = Instructor::new("bruno", "Bruno", "Keller", Specialization::Both);
    let lesson = Commitment::new(alice.id.clone(), date, iv(9, 11), CommitmentKind::PrivateLesson);

    let request = BookingRequest::for_dates([date]);
    let ranker = Ranker::new();
    let first = ranker
        .rank(&request, &[alice.clone(), bruno.clone()], &[lesson.clone()], &[], &no_history())
        .unwrap();
    let second = ranker
        .rank(&request, &[alice, bruno], &[lesson], &[], &no_history())
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn last_name_breaks_score_ties() {
    let martin = Instructor::new("m1", "Alice", "Martin", Specialization::Both);
    let durand = Instructor::new("d1", "Zoe", "Durand", Specialization::Both);

    let request = BookingRequest::for_dates([d(2026, 1, 10)]);
    let ranked = Ranker::new()
        .rank(&request, &[martin, durand], &[], &[], &no_history())
        .unwrap();
    assert_eq!(ranked[0].score, ranked[1].score);
    assert_eq!(ranked[0].instructor.last_name, "Durand");
    assert_eq!(ranked[1].instructor.last_name, "Martin");
}

#[test]
fn adjacent_same_sport_raises_no_conflict() {
    let date = d(2026, 1, 10);
    let alice = Instructor::new("alice", "Alice", "Martin", Specialization::Ski);
    let morning = Commitment::new(alice.id.clone(), date, iv(9, 11), CommitmentKind::PrivateLesson)
        .with_sport(Sport::Ski)
        .with_meeting_point("Pointe Nord");

    let mut request = BookingRequest::for_dates([date]);
    request.sport = Some(Sport::Ski);
    request.desired_start_hour = Some(11);
    request.duration_hours = Some(2);
    request.meeting_point = Some("Pointe Nord".to_string());

    let ranked = Ranker::new()
        .rank(&request, &[alice], &[morning], &[], &no_history())
        .unwrap();

    assert!(ranked[0].available_for_window);
    assert!(ranked[0].conflicts.is_empty());
    assert_eq!(ranked[0].score, 120); // 2 h déjà posées : +100, +20 dispo
}

#[test]
fn material_change_is_flagged_not_blocking() {
    let date = d(2026, 1, 10);
    let bruno = Instructor::new("bruno", "Bruno", "Keller", Specialization::Both);
    let board = Commitment::new(bruno.id.clone(), date, iv(9, 10), CommitmentKind::PrivateLesson)
        .with_sport(Sport::Snowboard);

    let mut request = BookingRequest::for_dates([date]);
    request.sport = Some(Sport::Ski);
    request.desired_start_hour = Some(10);
    request.duration_hours = Some(2);

    let ranked = Ranker::new()
        .rank(&request, &[bruno], &[board], &[], &no_history())
        .unwrap();

    assert!(ranked[0].available_for_window);
    assert_eq!(ranked[0].conflicts.len(), 1);
    assert_eq!(ranked[0].conflicts[0].kind, ConflictKind::MaterialChange);
    insta::assert_snapshot!(
        ranked[0].conflicts[0].message,
        @"changement de matériel : snowboard puis ski (prévoir 30 min)"
    );
}

#[test]
fn material_change_reads_in_lesson_order() {
    let date = d(2026, 1, 10);
    let bruno = Instructor::new("bruno", "Bruno", "Keller", Specialization::Both);
    let afternoon =
        Commitment::new(bruno.id.clone(), date, iv(13, 14), CommitmentKind::PrivateLesson)
            .with_sport(Sport::Snowboard);

    let mut request = BookingRequest::for_dates([date]);
    request.sport = Some(Sport::Ski);
    request.desired_start_hour = Some(11);
    request.duration_hours = Some(2);

    let ranked = Ranker::new()
        .rank(&request, &[bruno], &[afternoon], &[], &no_history())
        .unwrap();
    assert_eq!(ranked[0].conflicts.len(), 1);
    assert!(ranked[0].conflicts[0].message.contains("ski puis snowboard"));
}

#[test]
fn location_change_is_flagged_and_deduplicated() {
    let date = d(2026, 1, 10);
    let alice = Instructor::new("alice", "Alice", "Martin", Specialization::Both);
    let first = Commitment::new(alice.id.clone(), date, iv(9, 10), CommitmentKind::GroupCourse)
        .with_meeting_point("Pointe Nord");
    let second = Commitment::new(alice.id.clone(), date, iv(14, 15), CommitmentKind::GroupCourse)
        .with_meeting_point("Pointe Nord");

    let mut request = BookingRequest::for_dates([date]);
    request.meeting_point = Some("Village".to_string());

    let ranked = Ranker::new()
        .rank(&request, &[alice], &[first, second], &[], &no_history())
        .unwrap();
    let location_notes: Vec<_> = ranked[0]
        .conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::LocationChange)
        .collect();
    assert_eq!(location_notes.len(), 1);
    assert!(location_notes[0].message.contains("Pointe Nord"));
    assert!(location_notes[0].message.contains("Village"));
}

#[test]
fn custom_weights_change_the_order() {
    let date = d(2026, 1, 10);
    let faithful = Instructor::new("fab", "Fabien", "Caron", Specialization::Both);
    let busy = Instructor::new("bea", "Bea", "Nguyen", Specialization::Both);

    let past = Commitment::new(
        faithful.id.clone(),
        d(2025, 12, 20),
        iv(9, 11),
        CommitmentKind::PrivateLesson,
    )
    .with_participant(ParticipantId::new("emma"));
    let lesson = Commitment::new(busy.id.clone(), date, iv(9, 11), CommitmentKind::PrivateLesson);

    let mut request = BookingRequest::for_dates([date]);
    request.continuity_participants = vec![ParticipantId::new("emma")];

    let history = InMemoryHistory::new(vec![past]);
    let default_ranker = Ranker::new();
    let ranked = default_ranker
        .rank(&request, &[faithful.clone(), busy.clone()], &[lesson.clone()], &[], &history)
        .unwrap();
    assert_eq!(ranked[0].instructor.handle, "fab");

    let opts = RankOptions {
        weights: ScoreWeights {
            continuity: 10,
            ..ScoreWeights::default()
        },
        ..RankOptions::default()
    };
    let tuned_ranker = Ranker::with_options(opts);
    let ranked = tuned_ranker
        .rank(&request, &[faithful, busy], &[lesson], &[], &history)
        .unwrap();
    assert_eq!(ranked[0].instructor.handle, "bea");
}

#[test]
fn hours_map_covers_requested_dates() {
    let d1 = d(2026, 1, 10);
    let d2 = d(2026, 1, 11);
    let alice = Instructor::new("alice", "Alice", "Martin", Specialization::Both);
    let commitments = vec![
        Commitment::new(alice.id.clone(), d1, iv(9, 11), CommitmentKind::PrivateLesson),
        Commitment::new(alice.id.clone(), d2, iv(14, 15), CommitmentKind::GroupCourse),
    ];

    let request = BookingRequest::for_dates([d1, d2]);
    let ranked = Ranker::new()
        .rank(&request, &[alice], &commitments, &[], &no_history())
        .unwrap();

    assert_eq!(ranked[0].hours_booked.get(&d1), Some(&2));
    assert_eq!(ranked[0].hours_booked.get(&d2), Some(&1));
}

struct CountingHistory {
    calls: RefCell<u32>,
    taught: Vec<InstructorId>,
}

impl HistorySource for CountingHistory {
    fn recent_instructors(
        &self,
        _participants: &[ParticipantId],
        _limit: usize,
    ) -> anyhow::Result<Vec<InstructorId>> {
        *self.calls.borrow_mut() += 1;
        Ok(self.taught.clone())
    }
}

struct FailingHistory;

impl HistorySource for FailingHistory {
    fn recent_instructors(
        &self,
        _participants: &[ParticipantId],
        _limit: usize,
    ) -> anyhow::Result<Vec<InstructorId>> {
        anyhow::bail!("historique hors service")
    }
}

fn no_history() -> InMemoryHistory {
    InMemoryHistory::new(Vec::new())
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn iv(start: u32, end: u32) -> HourInterval {
    HourInterval::new(start, end).unwrap()
}
