//! Conversation model and exchange orchestration for the chat client.
//!
//! Nothing here depends on the GUI. The view owns a [`ChatSession`], hands each
//! [`Submission`] to [`run_exchange`] and feeds the outcome and reveal ticks back.

pub mod config;
pub mod error;
pub mod exchange;
pub mod message;
pub mod reveal;
pub mod session;
pub mod state;
pub mod tokens;

pub use config::{AppConfig, ThemePreference};
pub use error::{ConfigError, ConfigResult};
pub use exchange::{ExchangeOutcome, Submission, run_exchange};
pub use message::{Conversation, ExchangeId, ExchangeTarget, Generation, Message, Speaker};
pub use reveal::{DEFAULT_REVEAL_INTERVAL, Reveal};
pub use session::{
    APOLOGY_MESSAGE, ChatSession, ExchangeResolution, RevealStep, SubmitRejection,
};
pub use state::{TransitionRejection, ViewState, ViewTransition};
pub use tokens::{SESSION_TOKEN_KEY, SessionTokenStore};
