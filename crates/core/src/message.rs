/// Conversation epoch.
///
/// Bumped on every "New Chat" so results routed to an older epoch can be
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Identifier for one submit within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExchangeId(pub u64);

impl ExchangeId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Routing key used for stale-result rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeTarget {
    pub generation: Generation,
    pub exchange: ExchangeId,
}

impl ExchangeTarget {
    pub const fn new(generation: Generation, exchange: ExchangeId) -> Self {
        Self {
            generation,
            exchange,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    User,
    Bot,
}

/// One displayed entry. Never edited after it is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub speaker: Speaker,
    pub text: String,
}

impl Message {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Speaker::Bot, text)
    }
}

/// Append-only message sequence for the current run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conversation {
    generation: Generation,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drops every message and starts a new generation.
    pub fn reset(&mut self) -> Generation {
        self.messages.clear();
        self.generation = self.generation.next();
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_messages_and_advances_generation() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("hi"));
        conversation.push(Message::bot("hello"));
        conversation.push(Message::user("hi"));
        let before = conversation.generation();

        let after = conversation.reset();

        assert!(conversation.is_empty());
        assert_ne!(before, after);
        assert_eq!(conversation.generation(), after);
    }

    #[test]
    fn messages_keep_append_order_and_duplicates() {
        let mut conversation = Conversation::new();
        for message in [Message::user("a"), Message::user("a"), Message::bot("b")] {
            conversation.push(message);
        }

        let speakers = conversation
            .messages()
            .iter()
            .map(|message| message.speaker)
            .collect::<Vec<_>>();
        assert_eq!(speakers, vec![Speaker::User, Speaker::User, Speaker::Bot]);
        assert_eq!(conversation.len(), 3);
    }
}
