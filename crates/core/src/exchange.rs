use std::sync::Arc;

use chatbot_transport::{ChatTransport, ExchangeReply, TransportError};

use super::message::ExchangeTarget;
use super::tokens::SessionTokenStore;

/// Accepted user input waiting for its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub target: ExchangeTarget,
    pub text: String,
}

#[derive(Debug)]
pub enum ExchangeOutcome {
    Replied {
        target: ExchangeTarget,
        reply: ExchangeReply,
    },
    Failed {
        target: ExchangeTarget,
        error: TransportError,
    },
}

impl ExchangeOutcome {
    pub fn target(&self) -> ExchangeTarget {
        match self {
            Self::Replied { target, .. } | Self::Failed { target, .. } => *target,
        }
    }
}

/// Performs one backend round trip for `submission`.
///
/// The stored token is read once before the call. A non-empty token in the
/// reply replaces it. Storage failures are logged and never fail the exchange.
pub async fn run_exchange(
    transport: Arc<dyn ChatTransport>,
    tokens: SessionTokenStore,
    submission: Submission,
) -> ExchangeOutcome {
    let Submission { target, text } = submission;

    let session_token = tokens.load().unwrap_or_else(|error| {
        tracing::warn!(
            generation = target.generation.0,
            exchange = target.exchange.0,
            "failed to read session token, sending without one: {}",
            error
        );
        None
    });

    match transport.send_message(&text, session_token.as_ref()).await {
        Ok(reply) => {
            if let Some(token) = reply.session_token.as_ref()
                && let Err(error) = tokens.save(token)
            {
                tracing::warn!(
                    generation = target.generation.0,
                    exchange = target.exchange.0,
                    "failed to store session token: {}",
                    error
                );
            }

            tracing::debug!(
                generation = target.generation.0,
                exchange = target.exchange.0,
                reply_chars = reply.bot_text.chars().count(),
                "exchange replied"
            );
            ExchangeOutcome::Replied { target, reply }
        }
        Err(error) => {
            tracing::error!(
                generation = target.generation.0,
                exchange = target.exchange.0,
                stage = error.stage(),
                "error sending message: {}",
                error
            );
            ExchangeOutcome::Failed { target, error }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chatbot_storage::{KeyValueStore, MemoryStore};
    use chatbot_transport::{BoxFuture, SessionToken, TransportResult};

    use super::*;
    use crate::message::{ExchangeId, Generation};
    use crate::tokens::SESSION_TOKEN_KEY;

    /// Replays canned replies and records the token each call carried.
    struct ScriptedTransport {
        reply: Option<ExchangeReply>,
        seen_tokens: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedTransport {
        fn replying(bot_text: &str, session_id: &str) -> Self {
            Self {
                reply: Some(ExchangeReply {
                    user_text: String::new(),
                    bot_text: bot_text.to_string(),
                    session_token: SessionToken::new(session_id),
                }),
                seen_tokens: Mutex::default(),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                seen_tokens: Mutex::default(),
            }
        }
    }

    impl ChatTransport for ScriptedTransport {
        fn send_message<'a>(
            &'a self,
            text: &'a str,
            session_token: Option<&'a SessionToken>,
        ) -> BoxFuture<'a, TransportResult<ExchangeReply>> {
            self.seen_tokens
                .lock()
                .unwrap()
                .push(session_token.map(|token| token.to_string()));
            let result = match &self.reply {
                Some(reply) => Ok(ExchangeReply {
                    user_text: text.to_string(),
                    ..reply.clone()
                }),
                None => Err(TransportError::Status {
                    stage: "scripted-transport",
                    status: 503,
                    body: String::new(),
                }),
            };
            Box::pin(async move { result })
        }
    }

    fn submission(text: &str) -> Submission {
        Submission {
            target: ExchangeTarget::new(Generation::new(0), ExchangeId::new(1)),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn success_stores_returned_token() {
        let backing = Arc::new(MemoryStore::new());
        let transport = Arc::new(ScriptedTransport::replying("hello", "s1"));

        let outcome = run_exchange(
            transport.clone(),
            SessionTokenStore::new(backing.clone()),
            submission("hi"),
        )
        .await;

        match outcome {
            ExchangeOutcome::Replied { reply, .. } => {
                assert_eq!(reply.user_text, "hi");
                assert_eq!(reply.bot_text, "hello");
            }
            other => panic!("expected reply, got {other:?}"),
        }
        assert_eq!(backing.get(SESSION_TOKEN_KEY).unwrap().as_deref(), Some("s1"));
        assert_eq!(*transport.seen_tokens.lock().unwrap(), vec![None]);
    }

    #[tokio::test]
    async fn stored_token_is_sent_and_kept_when_reply_has_none() {
        let backing = Arc::new(MemoryStore::new());
        backing.set(SESSION_TOKEN_KEY, "s0").unwrap();
        let transport = Arc::new(ScriptedTransport::replying("hello", ""));

        run_exchange(
            transport.clone(),
            SessionTokenStore::new(backing.clone()),
            submission("hi"),
        )
        .await;

        assert_eq!(
            *transport.seen_tokens.lock().unwrap(),
            vec![Some("s0".to_string())]
        );
        assert_eq!(backing.get(SESSION_TOKEN_KEY).unwrap().as_deref(), Some("s0"));
    }

    #[tokio::test]
    async fn failure_writes_no_token() {
        let backing = Arc::new(MemoryStore::new());

        let outcome = run_exchange(
            Arc::new(ScriptedTransport::failing()),
            SessionTokenStore::new(backing.clone()),
            submission("hi"),
        )
        .await;

        assert!(matches!(outcome, ExchangeOutcome::Failed { .. }));
        assert_eq!(outcome.target().exchange, ExchangeId::new(1));
        assert!(backing.is_empty());
    }
}
