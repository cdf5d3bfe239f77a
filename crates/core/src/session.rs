use super::exchange::{ExchangeOutcome, Submission};
use super::message::{Conversation, ExchangeId, ExchangeTarget, Generation, Message};
use super::reveal::Reveal;
use super::state::{TransitionRejection, ViewState, ViewTransition};

/// Bot text appended when an exchange fails for any reason.
pub const APOLOGY_MESSAGE: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// Input was empty once trimmed.
    Blank,
    Busy { active: ExchangeTarget },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    /// One more character is visible.
    Advanced,
    /// The reply was appended as a message and the view is idle again.
    Finished,
}

/// How an accepted exchange outcome left the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeResolution {
    /// The reply is being revealed; the submitted draft can be discarded.
    Revealing,
    /// The apology was appended; the draft stays for another attempt.
    Apologized,
}

impl ExchangeResolution {
    pub fn clears_draft(self) -> bool {
        matches!(self, Self::Revealing)
    }
}

/// Conversation view model: messages, phase and the reveal buffer.
///
/// All mutation goes through methods that validate the exchange target, so a
/// result that belongs to an earlier generation cannot touch the conversation.
#[derive(Debug, Default)]
pub struct ChatSession {
    conversation: Conversation,
    state: ViewState,
    reveal: Option<Reveal>,
    last_exchange: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn generation(&self) -> Generation {
        self.conversation.generation()
    }

    pub fn is_busy(&self) -> bool {
        !self.state.is_idle()
    }

    /// Visible prefix of the reply being revealed, if any.
    pub fn reveal_text(&self) -> Option<&str> {
        self.reveal.as_ref().map(Reveal::visible)
    }

    /// Accepts user input and appends it as a User message.
    pub fn submit(&mut self, input: &str) -> Result<Submission, SubmitRejection> {
        let text = input.trim();
        if text.is_empty() {
            return Err(SubmitRejection::Blank);
        }

        let target = ExchangeTarget::new(
            self.conversation.generation(),
            ExchangeId::new(self.last_exchange.wrapping_add(1)),
        );
        self.state = self
            .state
            .apply(ViewTransition::Submit(target))
            .map_err(|_| SubmitRejection::Busy {
                active: self.state.active_target().unwrap_or(target),
            })?;
        self.last_exchange = target.exchange.0;
        self.conversation.push(Message::user(text));

        Ok(Submission {
            target,
            text: text.to_string(),
        })
    }

    pub fn apply_outcome(
        &mut self,
        outcome: ExchangeOutcome,
    ) -> Result<ExchangeResolution, TransitionRejection> {
        match outcome {
            ExchangeOutcome::Replied { target, reply } => self
                .accept_reply(target, reply.bot_text)
                .map(|()| ExchangeResolution::Revealing),
            ExchangeOutcome::Failed { target, .. } => self
                .fail_exchange(target)
                .map(|()| ExchangeResolution::Apologized),
        }
    }

    /// Starts revealing `bot_text` for the exchange in flight.
    pub fn accept_reply(
        &mut self,
        target: ExchangeTarget,
        bot_text: impl Into<String>,
    ) -> Result<(), TransitionRejection> {
        self.state = self.state.apply(ViewTransition::Reply(target))?;
        self.reveal = Some(Reveal::new(bot_text));
        Ok(())
    }

    pub fn fail_exchange(&mut self, target: ExchangeTarget) -> Result<(), TransitionRejection> {
        self.state = self.state.apply(ViewTransition::Fail(target))?;
        self.conversation.push(Message::bot(APOLOGY_MESSAGE));
        Ok(())
    }

    /// One reveal tick.
    ///
    /// Shows the next character while any remain. The tick after the whole
    /// reply is visible appends it as a Bot message and returns to idle.
    pub fn advance_reveal(
        &mut self,
        target: ExchangeTarget,
    ) -> Result<RevealStep, TransitionRejection> {
        let finished = self.state.apply(ViewTransition::Finish(target))?;
        let reveal = self
            .reveal
            .as_mut()
            .ok_or(TransitionRejection::NoActiveExchange)?;

        if reveal.advance() {
            return Ok(RevealStep::Advanced);
        }

        if let Some(reveal) = self.reveal.take() {
            self.conversation.push(Message::bot(reveal.into_full()));
        }
        self.state = finished;
        Ok(RevealStep::Finished)
    }

    /// Clears the conversation from any phase and starts a new generation.
    pub fn new_chat(&mut self) -> Generation {
        self.reveal = None;
        self.state = ViewState::Idle;
        self.conversation.reset()
    }
}
