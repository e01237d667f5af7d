//! Prompt templates

/// Prompt asking for `count` new items in the style of `example`
pub fn question_prompt(example: &str, count: usize) -> String {
    format!(
        "You are a Spanish language teacher creating multiple choice questions for listening comprehension practice.
For each question, you will create:
1. A new conversation between two people
2. A specific question about that conversation
3. One correct answer
4. Three incorrect but plausible answers in Spanish

IMPORTANT: For the conversation, use this exact format:
[Speaker 1]: ¡Hola! ¿Cómo estás?
[Speaker 2]: Muy bien, gracias. ¿Y tú?

Make sure each line of dialogue is on its own line.
Do not add any extra text or descriptions.

Here's an example conversation in the style we want:
{example}

Now generate {count} multiple choice questions. For each question:
1. Create a NEW conversation between two people in a similar style and difficulty level
2. Make the conversation natural and relevant to everyday Spanish usage
3. Create a specific question about the conversation
4. Create one correct answer that directly answers the question
5. Create three incorrect but plausible answers in Spanish that could trick a student

Use this exact format for each question:
Conversation:
[Speaker 1]: ...
[Speaker 2]: ...
Question: [specific question about the conversation]
Correct Answer: [correct answer]
Incorrect Answer 1: [plausible wrong answer]
Incorrect Answer 2: [plausible wrong answer]
Incorrect Answer 3: [plausible wrong answer]

Make sure each conversation is different and covers various everyday topics and situations.",
        example = example.trim(),
        count = count
    )
}

/// Prompt extracting conversation/question/answer records from a test transcript
pub fn transcript_prompt(transcript: &str) -> String {
    format!(
        "You are an expert Spanish listening comprehension test question extractor.
Given the following transcript of a Spanish listening comprehension test, extract
the conversation, question, and answer of every exercise. Format the output as a
raw JSON array of objects with exactly these keys:

[{{\"Conversation\": \"conversation\", \"Question\": \"question\", \"Answer\": \"answer\"}}]

Do not include the initial introduction.
Do not number the conversations.
Add punctuation to the questions.

Transcript: {transcript}"
    )
}

/// Prompt for reading Spanish text from an image
pub const IMAGE_PROMPT: &str = "Please analyze this image and extract any Spanish text you see.
If there is text in the image, provide:
1. The original Spanish text
2. An English translation
3. Any relevant context about the text
If no text is found, please indicate that.";
