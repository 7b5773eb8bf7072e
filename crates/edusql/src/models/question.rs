#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    raw: String,
    normalized: String,
}

impl Question {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = raw.trim().to_lowercase();
        Self { raw, normalized }
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn trimmed(&self) -> &str {
        self.raw.trim()
    }

    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Matches `/name` and `/name@botname` forms of a chat command.
    #[must_use]
    pub fn is_command(&self, name: &str) -> bool {
        let Some(rest) = self.normalized.strip_prefix('/') else {
            return false;
        };
        let command = rest.split_whitespace().next().unwrap_or_default();
        let command = command.split('@').next().unwrap_or_default();
        command == name
    }
}

#[cfg(test)]
mod tests {
    use super::Question;

    #[test]
    fn normalized_form_is_trimmed_and_lowercased() {
        let question = Question::new("  Show ME Attendance \n");
        assert_eq!(question.raw(), "  Show ME Attendance \n");
        assert_eq!(question.trimmed(), "Show ME Attendance");
        assert_eq!(question.normalized(), "show me attendance");
    }

    #[test]
    fn recognizes_chat_commands_with_bot_suffix() {
        assert!(Question::new("/start").is_command("start"));
        assert!(Question::new("/START@school_bot").is_command("start"));
        assert!(!Question::new("start").is_command("start"));
        assert!(!Question::new("/stats").is_command("start"));
    }
}
