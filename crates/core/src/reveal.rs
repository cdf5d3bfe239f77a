use std::time::Duration;

pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(10);

/// In-progress prefix of a bot reply.
///
/// Starts empty and grows by one Unicode scalar value per [`Reveal::advance`],
/// so an N-character reply is visible through N+1 prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    full: String,
    visible_end: usize,
}

impl Reveal {
    pub fn new(full: impl Into<String>) -> Self {
        Self {
            full: full.into(),
            visible_end: 0,
        }
    }

    pub fn visible(&self) -> &str {
        &self.full[..self.visible_end]
    }

    /// Shows one more character. Returns `false` once the whole reply is visible.
    pub fn advance(&mut self) -> bool {
        match self.full[self.visible_end..].chars().next() {
            Some(next) => {
                self.visible_end += next.len_utf8();
                true
            }
            None => false,
        }
    }

    pub fn into_full(self) -> String {
        self.full
    }
}
