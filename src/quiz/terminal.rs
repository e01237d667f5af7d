//! Plain-text quiz renderer
//!
//! Prints each question to any writer and reads answers line by line, so the
//! same loop drives an interactive terminal and scripted input in tests.

use super::{QuizSession, Score};
use crate::Result;
use log::debug;
use std::io::{BufRead, Write};

const LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Parse an answer like "b", "B" or "2" into a choice index
pub fn parse_answer(line: &str, choices: usize) -> Option<usize> {
    let line = line.trim();
    let mut chars = line.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return line
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=choices).contains(n))
            .map(|n| n - 1);
    }
    if let Some(digit) = first.to_digit(10) {
        let n = digit as usize;
        return (1..=choices).contains(&n).then(|| n - 1);
    }
    LETTERS
        .iter()
        .take(choices)
        .position(|l| l.eq_ignore_ascii_case(&first))
}

fn render_question<W: Write>(session: &QuizSession, index: usize, out: &mut W) -> Result<()> {
    let (Some(item), Some(state)) = (session.item(index), session.question(index)) else {
        return Ok(());
    };

    writeln!(out)?;
    writeln!(out, "Question {} of {}", index + 1, session.len())?;
    writeln!(out, "Conversation audio: {}", item.conversation_audio)?;
    for turn in item.conversation.turns() {
        writeln!(out, "  {}: {}", turn.speaker, turn.text)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", item.question)?;
    writeln!(out, "  (audio: {})", item.question_audio)?;
    for (choice, letter) in state.choices.iter().zip(LETTERS) {
        match &choice.audio {
            Some(audio) => writeln!(out, "  {}) {}  [{}]", letter, choice.text, audio)?,
            None => writeln!(out, "  {}) {}", letter, choice.text)?,
        }
    }
    Ok(())
}

/// Run the session to completion
///
/// Returns the score, or `None` if input ran out before every question was
/// answered.
pub fn run<R: BufRead, W: Write>(
    session: &mut QuizSession,
    mut input: R,
    mut out: W,
) -> Result<Option<Score>> {
    if session.is_empty() {
        writeln!(out, "No questions available. Generate some first.")?;
        return Ok(None);
    }

    for index in 0..session.len() {
        render_question(session, index, &mut out)?;
        let choices = session.question(index).map_or(0, |q| q.choices.len());
        let last = LETTERS[choices.clamp(1, LETTERS.len()) - 1];

        loop {
            write!(out, "Your answer (A-{}): ", last)?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                debug!("Input closed at question {}", index + 1);
                return Ok(None);
            }

            match parse_answer(&line, choices) {
                Some(choice) => {
                    session.select(index, choice)?;
                    break;
                }
                None => writeln!(out, "Please answer with a letter between A and {}.", last)?,
            }
        }

        if session.check(index)? {
            writeln!(out, "✓ ¡Correcto!")?;
        } else if let Some(state) = session.question(index) {
            writeln!(
                out,
                "✗ Incorrect. The correct answer is: {}",
                state.correct_answer
            )?;
        }
    }

    let score = session.score();
    if let Some(score) = &score {
        writeln!(out)?;
        writeln!(
            out,
            "Score: {}/{} ({:.0}%)",
            score.correct, score.checked, score.percentage
        )?;
        writeln!(out, "{}", score.feedback)?;
    }
    Ok(score)
}
