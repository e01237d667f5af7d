//! Parser tests against realistic model replies

use spanish_practice::questions::{parse, DraftError};

const ONE_BLOCK: &str = "Conversation:
[Speaker 1]: ¿Vienes a la fiesta el sábado?
[Speaker 2]: No puedo, tengo que trabajar.
Question: ¿Por qué no va a la fiesta?
Correct Answer: Tiene que trabajar
Incorrect Answer 1: Está enfermo
Incorrect Answer 2: No le gustan las fiestas
Incorrect Answer 3: Va a viajar
";

#[test]
fn test_single_block() {
    let report = parse(ONE_BLOCK);
    assert!(report.rejected.is_empty());
    assert_eq!(report.items.len(), 1);

    let item = &report.items[0];
    assert_eq!(item.conversation.len(), 2);
    assert_eq!(item.conversation.turns()[0].speaker, "Speaker 1");
    assert_eq!(
        item.conversation.turns()[1].text,
        "No puedo, tengo que trabajar."
    );
    assert_eq!(item.question, "¿Por qué no va a la fiesta?");
    assert_eq!(
        item.choices(),
        vec![
            "Tiene que trabajar",
            "Está enfermo",
            "No le gustan las fiestas",
            "Va a viajar"
        ]
    );
}

#[test]
fn test_two_blocks() {
    let second = ONE_BLOCK
        .replace("sábado", "domingo")
        .replace("trabajar", "estudiar");
    let report = parse(&format!("{}\n{}", ONE_BLOCK, second));

    assert_eq!(report.items.len(), 2);
    assert_eq!(report.items[0].answer, "Tiene que trabajar");
    assert_eq!(report.items[1].answer, "Tiene que estudiar");
}

#[test]
fn test_markdown_decoration_ignored() {
    let decorated = ONE_BLOCK
        .replace("Conversation:", "**Conversation:**")
        .replace("Question:", "### Question:");
    let report = parse(&decorated);
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].question, "¿Por qué no va a la fiesta?");
}

#[test]
fn test_incomplete_block_rejected() {
    let truncated: String = ONE_BLOCK
        .lines()
        .filter(|l| !l.starts_with("Incorrect Answer 3"))
        .map(|l| format!("{}\n", l))
        .collect();
    let report = parse(&format!("{}{}", truncated, ONE_BLOCK));

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.rejected.len(), 1);
    match &report.rejected[0] {
        DraftError::Incomplete { index, missing } => {
            assert_eq!(*index, 0);
            assert_eq!(missing, &vec!["incorrect answer 3"]);
        }
        other => panic!("unexpected rejection {other:?}"),
    }
}

#[test]
fn test_no_blocks() {
    let report = parse("Lo siento, no puedo ayudar con eso.");
    assert!(report.items.is_empty());
}
