/// Number of prior turns forwarded to the completion service.
pub const HISTORY_LIMIT: usize = 10;

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    /// Maps a client-supplied role. Only `user` is trusted as the learner;
    /// everything else is replayed as the assistant.
    #[must_use]
    pub fn from_client(raw: &str) -> Self {
        if raw == "user" {
            ChatRole::User
        } else {
            ChatRole::Assistant
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    #[must_use]
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The trailing `limit` turns of a conversation.
#[must_use]
pub fn recent_turns(turns: &[ChatTurn], limit: usize) -> &[ChatTurn] {
    &turns[turns.len().saturating_sub(limit)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(n: usize) -> Vec<ChatTurn> {
        (0..n)
            .map(|i| ChatTurn::new(ChatRole::User, format!("m{i}")))
            .collect()
    }

    #[test]
    fn recent_turns_keeps_the_tail() {
        let all = turns(15);
        let recent = recent_turns(&all, HISTORY_LIMIT);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].content, "m5");
        assert_eq!(recent[9].content, "m14");
    }

    #[test]
    fn recent_turns_short_history_is_untouched() {
        let all = turns(3);
        assert_eq!(recent_turns(&all, HISTORY_LIMIT), all.as_slice());
        assert!(recent_turns(&[], HISTORY_LIMIT).is_empty());
    }

    #[test]
    fn unknown_client_roles_become_assistant() {
        assert_eq!(ChatRole::from_client("user"), ChatRole::User);
        assert_eq!(ChatRole::from_client("assistant"), ChatRole::Assistant);
        assert_eq!(ChatRole::from_client("system"), ChatRole::Assistant);
        assert_eq!(ChatRole::from_client("USER"), ChatRole::Assistant);
    }

    #[test]
    fn roles_use_lowercase_wire_names() {
        let names: Vec<&str> = [ChatRole::System, ChatRole::User, ChatRole::Assistant]
            .into_iter()
            .map(ChatRole::as_str)
            .collect();
        assert_eq!(names, ["system", "user", "assistant"]);
    }
}
