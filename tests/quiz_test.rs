//! Quiz session and terminal renderer tests

use rand::rngs::StdRng;
use rand::SeedableRng;
use spanish_practice::audio::AudioRef;
use spanish_practice::questions::{Conversation, PracticeItem, Turn};
use spanish_practice::quiz::{terminal, Feedback, QuizSession};
use std::io::Cursor;

fn item(answer: &str) -> PracticeItem {
    PracticeItem {
        conversation: Conversation::new(vec![
            Turn {
                speaker: "Luis".to_string(),
                text: "¿Quieres ir al cine?".to_string(),
            },
            Turn {
                speaker: "Marta".to_string(),
                text: "Sí, a las ocho.".to_string(),
            },
        ]),
        question: "¿A qué hora van al cine?".to_string(),
        answer: answer.to_string(),
        distractors: [
            "A las siete".to_string(),
            "A las nueve".to_string(),
            "No van".to_string(),
        ],
        conversation_audio: AudioRef("conv.wav".to_string()),
        question_audio: AudioRef("q.mp3".to_string()),
        choice_audio: (0..4).map(|i| AudioRef(format!("c{}.mp3", i))).collect(),
    }
}

fn letter(session: &QuizSession, question: usize, correct: bool) -> char {
    let state = session.question(question).unwrap();
    let right = state.correct_index().unwrap();
    let index = if correct { right } else { (right + 1) % 4 };
    (b'a' + index as u8) as char
}

#[test]
fn test_perfect_run() {
    let mut session = QuizSession::new(
        vec![item("A las ocho"), item("A las ocho")],
        &mut StdRng::seed_from_u64(1),
    );
    let input = format!("{}\n{}\n", letter(&session, 0, true), letter(&session, 1, true));
    let mut out = Vec::new();

    let score = terminal::run(&mut session, Cursor::new(input), &mut out)
        .unwrap()
        .unwrap();
    assert_eq!(score.correct, 2);
    assert_eq!(score.feedback, Feedback::Perfect);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Question 1 of 2"));
    assert!(text.contains("Marta: Sí, a las ocho."));
    assert!(text.contains("Score: 2/2 (100%)"));
}

#[test]
fn test_invalid_answer_reprompts() {
    let mut session = QuizSession::new(vec![item("A las ocho")], &mut StdRng::seed_from_u64(2));
    let input = format!("x\n9\n{}\n", letter(&session, 0, false));
    let mut out = Vec::new();

    let score = terminal::run(&mut session, Cursor::new(input), &mut out)
        .unwrap()
        .unwrap();
    assert_eq!(score.correct, 0);
    assert_eq!(score.feedback, Feedback::KeepStudying);

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("Please answer").count(), 2);
    assert!(text.contains("The correct answer is: A las ocho"));
}

#[test]
fn test_input_ends_early() {
    let mut session = QuizSession::new(
        vec![item("A las ocho"), item("A las ocho")],
        &mut StdRng::seed_from_u64(3),
    );
    let input = format!("{}\n", letter(&session, 0, true));
    let score = terminal::run(&mut session, Cursor::new(input), Vec::new()).unwrap();
    assert!(score.is_none());
    assert!(session.question(0).unwrap().checked);
    assert!(!session.question(1).unwrap().checked);
}

#[test]
fn test_sessions_are_independent() {
    let items = vec![item("A las ocho")];
    let mut first = QuizSession::new(items.clone(), &mut StdRng::seed_from_u64(4));
    let second = QuizSession::new(items, &mut StdRng::seed_from_u64(4));

    first.select(0, 0).unwrap();
    first.check(0).unwrap();
    assert!(second.question(0).unwrap().selected.is_none());
    assert!(second.score().is_none());
}

#[test]
fn test_empty_session() {
    let mut session = QuizSession::new(Vec::new(), &mut StdRng::seed_from_u64(5));
    let mut out = Vec::new();
    assert!(terminal::run(&mut session, Cursor::new(""), &mut out)
        .unwrap()
        .is_none());
    assert!(String::from_utf8(out).unwrap().contains("No questions"));
}
