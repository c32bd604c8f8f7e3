use super::{prompts, Assistant, CASE_STUDY};
use crate::error::Result;

impl Assistant {
    pub async fn case_study(&self, session_id: &str, instructions: Option<&str>) -> Result<String> {
        self.generate(&CASE_STUDY, session_id, |content| prompts::case_study(instructions, content))
            .await
    }
}
