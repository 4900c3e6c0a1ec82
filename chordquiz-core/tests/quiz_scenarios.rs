use chordquiz_core::midi::MidiNormalizer;
use chordquiz_core::quiz::{
    Advance, DeferredOutcome, FollowUp, Quiz, QuizMode, QuizSettings, Validation,
};
use chordquiz_core::selection::{build_selection, ChordSelection};
use chordquiz_core::theory::{chord_name, Note};
use chordquiz_core::QuizError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

fn note(name: &str) -> Note {
    name.parse().unwrap()
}

fn notes_quiz() -> Quiz {
    Quiz::new(QuizSettings {
        mode: QuizMode::SelectNotes(Validation::Auto),
        ..QuizSettings::default()
    })
}

#[test]
fn test_c_major_universe_auto_validation() {
    let universe = build_selection(&["C"], &["major"]).unwrap();
    let mut quiz = notes_quiz();
    let mut rng = StdRng::seed_from_u64(42);
    let start = Instant::now();
    quiz.start(&universe, &mut rng, start).unwrap();

    let question = quiz.current_question().unwrap();
    assert_eq!(question.total, 20);
    assert_eq!(question.chord.name(), "C");

    assert!(quiz.toggle_note(note("C")).unwrap().verdict.is_none());
    assert!(quiz.toggle_note(note("E")).unwrap().verdict.is_none());
    let toggle = quiz.toggle_note(note("G")).unwrap();
    let verdict = toggle.verdict.unwrap();
    assert!(verdict.is_correct);
    assert_eq!(quiz.correct_count(), 1);

    let FollowUp::Schedule(action) = verdict.follow_up else {
        panic!("expected a scheduled advance");
    };
    let outcome = quiz.apply_deferred(&action, start + action.delay);
    assert!(matches!(
        outcome,
        DeferredOutcome::Advanced(Advance::Question(_))
    ));

    let question = quiz.current_question().unwrap();
    assert_eq!(question.number, 2);
    assert_eq!(question.chord.name(), "C");
    assert!(quiz.selection().is_empty());
}

#[test]
fn test_full_session_of_twenty() {
    let universe = build_selection(&["C", "F#/Gb", "A#/Bb"], &["minor", "seventh"]).unwrap();
    let mut quiz = Quiz::new(QuizSettings {
        mode: QuizMode::SelectNotes(Validation::Manual),
        ..QuizSettings::default()
    });
    let mut rng = StdRng::seed_from_u64(3);
    let start = Instant::now();
    quiz.start(&universe, &mut rng, start).unwrap();

    let mut last_index = 0;
    let mut summary = None;
    for i in 0..20 {
        let question = quiz.current_question().unwrap();
        assert_eq!(question.tag.index, i);
        let chord_notes: Vec<Note> = question.chord.notes().to_vec();

        // Answer every other question, spelled with flats where possible
        if i % 2 == 0 {
            for n in chord_notes {
                quiz.toggle_note(n.enharmonic()).unwrap();
            }
        } else {
            quiz.toggle_note(note("D")).unwrap();
        }
        quiz.check_answer().unwrap();

        match quiz.advance(start + Duration::from_secs(5 * (i as u64 + 1))) {
            Some(Advance::Question(tag)) => {
                assert_eq!(tag.index, last_index + 1);
                last_index = tag.index;
            }
            Some(Advance::Finished(s)) => summary = Some(s),
            None => panic!("quiz stopped early"),
        }
    }

    let summary = summary.unwrap();
    assert!(summary.correct <= 20);
    // A single note never matches a chord
    assert_eq!(summary.correct, 10);
    assert_eq!(summary.total, 20);
    assert_eq!(summary.accuracy, 50);
    assert_eq!(summary.elapsed_secs, 100);
    assert!(quiz.current_question().is_none());
}

#[test]
fn test_empty_roots_cannot_start() {
    let no_roots: [&str; 0] = [];
    assert_eq!(
        build_selection(&no_roots, &["major"]),
        Err(QuizError::EmptySelection)
    );

    let selection = ChordSelection::from_labels(&no_roots, &["major"]).unwrap();
    let universe = selection.chords().unwrap_or_default();
    let mut quiz = notes_quiz();
    let result = quiz.start(&universe, &mut StdRng::seed_from_u64(1), Instant::now());
    assert_eq!(result, Err(QuizError::EmptySelection));
    assert!(quiz.is_idle());
}

#[test]
fn test_double_submission_on_one_question() {
    let universe = build_selection(&["D"], &["minor"]).unwrap();
    let mut quiz = Quiz::new(QuizSettings {
        mode: QuizMode::NameTheChord,
        ..QuizSettings::default()
    });
    quiz.start(&universe, &mut StdRng::seed_from_u64(9), Instant::now())
        .unwrap();

    assert_eq!(quiz.choices(), vec!["Dm"]);
    assert!(quiz.submit_answer("Dm").unwrap().is_correct);
    assert!(quiz.submit_answer("Dm").is_none());
    assert_eq!(quiz.correct_count(), 1);
}

#[test]
fn test_midi_into_quiz() {
    let universe = build_selection(&["G#/Ab"], &["major"]).unwrap();
    let mut quiz = notes_quiz();
    quiz.start(&universe, &mut StdRng::seed_from_u64(5), Instant::now())
        .unwrap();

    let mut normalizer = MidiNormalizer::default();
    // Ab4, a bounced Ab4, C5, clock, Eb5
    let messages: [(u64, &[u8]); 5] = [
        (0, &[0x90, 68, 90]),
        (10_000, &[0x90, 68, 90]),
        (200_000, &[0x90, 72, 90]),
        (210_000, &[0xF8]),
        (400_000, &[0x90, 75, 90]),
    ];

    let mut last_toggle = None;
    for (stamp, bytes) in messages {
        if let Some(n) = normalizer.handle(stamp, bytes) {
            last_toggle = quiz.toggle_note(n);
        }
    }

    let verdict = last_toggle.unwrap().verdict.unwrap();
    assert!(verdict.is_correct);
    assert_eq!(verdict.chord.name(), chord_name("G#/Ab", "major"));
}
