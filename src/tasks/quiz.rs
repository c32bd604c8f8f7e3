use super::helpers::extract_question_count;
use super::{prompts, Assistant, QUIZ};
use crate::error::Result;

pub const DEFAULT_QUESTION_COUNT: usize = 10;

pub const PARTIAL_QUIZ_WARNING: &str =
    "⚠️ Only partial quiz generated. Here is what we could extract:";

/// Prefix a warning when the output has fewer `A)` option markers than
/// questions requested. A rough signal only; formatting drift fools it.
pub fn flag_partial_quiz(quiz: String, requested: usize) -> String {
    if quiz.matches("A)").count() < requested {
        format!("{}\n\n{}", PARTIAL_QUIZ_WARNING, quiz)
    } else {
        quiz
    }
}

impl Assistant {
    pub async fn quiz(&self, session_id: &str, request: Option<&str>) -> Result<String> {
        let question_count = extract_question_count(request.unwrap_or(""), DEFAULT_QUESTION_COUNT);
        let quiz = self
            .generate(&QUIZ, session_id, |content| prompts::quiz(question_count, content))
            .await?;
        Ok(flag_partial_quiz(quiz, question_count))
    }
}
