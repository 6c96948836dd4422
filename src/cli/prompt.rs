//! Interactive confirmation.

use std::io::{BufRead, Write};

/// Asks the user a question and returns the raw answer.
pub trait Prompt: Send + Sync {
    /// Show `question` and read one line of answer, without the line ending.
    fn confirm(&self, question: &str) -> std::io::Result<String>;
}

/// Reads answers from standard input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&self, question: &str) -> std::io::Result<String> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", question)?;
        stdout.flush()?;

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Answers every question with a fixed string; used for `--no-input`.
#[derive(Debug, Clone)]
pub struct FixedAnswer(pub String);

impl FixedAnswer {
    /// Decline every confirmation
    pub fn decline() -> Self {
        Self("n".to_string())
    }
}

impl Prompt for FixedAnswer {
    fn confirm(&self, question: &str) -> std::io::Result<String> {
        log::info!("{}{} (non-interactive)", question, self.0);
        Ok(self.0.clone())
    }
}

/// Whether an answer means yes.
pub fn is_affirmative(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("y")
}
