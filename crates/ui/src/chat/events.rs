/// Emitted when the user submits non-blank input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submit {
    pub content: String,
}

impl Submit {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Emitted by the sidebar "New chat" button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NewChatClicked;
