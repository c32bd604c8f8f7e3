//! Prompt templates, one per task.

pub fn summary(content: &str) -> String {
    format!(
        "You are a clear and engaging explainer. Create a detailed, accurate summary of the following content, \
         making it easy for students to understand while keeping all important facts and technical details.\n\n\
         Focus on:\n\
         1. Breaking big ideas into smaller, easy-to-digest points.\n\
         2. Keeping important terms, numbers, and examples.\n\
         3. Organizing ideas with short headings or bullet points.\n\
         4. Avoiding extra fluff. Stick to what's in the text.\n\
         5. If something is missing, mark it as [information not provided].\n\n\
         Output format:\n\
         - Short intro paragraph giving the big picture.\n\
         - Clear section-by-section breakdown.\n\
         - A 'Key Takeaways' list for quick revision.\n\n\
         Document Content:\n{}\n\nDetailed Summary:",
        content
    )
}

pub fn explanation(concept: &str) -> String {
    format!(
        "You are a patient teacher. Explain the concept '{}' ONLY using the provided class notes. \
         Do not add outside facts. Format your response in clear Markdown with sections: \
         What it is, Why it matters, How it works, Examples, Common mistakes, Quick check.",
        concept
    )
}

pub fn quiz(question_count: usize, content: &str) -> String {
    format!(
        "Create a {}-question multiple-choice quiz based ONLY on the provided content.\n\
         The quiz should be in three categories of difficulty: easy, moderate, and hard.\n\
         First, list all questions with their options. Do NOT mark correct answers inline.\n\
         Format the questions in clean **Markdown** so each question and its options are on separate lines.\n\n\
         Each question should be numbered `1.`, `2.`, etc.\n\
         Each option should be labeled `A)`, `B)`, `C)`, `D)` on its own line.\n\n\
         After all questions have been listed, include an `Answers:` section that maps each question to its correct option, for example:\n\
         `Answers:`\n\
         `Q1) A`\n\
         `Q2) C`\n\n\
         Content:\n{}\n\n\
         Quiz:\n",
        question_count, content
    )
}

const CASE_STUDY_INSTRUCTIONS: &str = "Read uploaded PDF content and create a business case study \
     designed for undergraduate business students to solve in about 30 minutes. \
     Make it engaging and realistic.\n\
     End the case study with 5 thought-provoking discussion questions.";

/// Caller instructions replace the default brief; the content is always attached.
pub fn case_study(instructions: Option<&str>, content: &str) -> String {
    let instructions = instructions
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(CASE_STUDY_INSTRUCTIONS);
    format!("{}\n\nContent:\n{}\n\nCase Study:", instructions, content)
}

pub const NOTHING_TO_VISUALIZE: &str = "I cannot visualize data from this document.";

pub fn visualization(content: &str) -> String {
    format!(
        "You are an assistant that reads the document content about data and decides if there is \
         something meaningful to visualize. If yes, respond *only* with a JSON object containing:\n \
         - description (string): short summary of the data\n \
         - type (string): type of chart, e.g. 'bar_chart'\n \
         - data (array): array of objects with 'label' and 'value' fields\n\
         If you cannot visualize the data, reply with the exact string:\n\
         '{}'\n\n\
         Document Content:\n{}\n\n\
         Answer with JSON only:",
        NOTHING_TO_VISUALIZE, content
    )
}
