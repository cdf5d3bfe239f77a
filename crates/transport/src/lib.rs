//! HTTP transport for the chat backend.
//!
//! The backend exposes one operation, `POST /api/send-message`. This crate
//! owns the wire format and the request; callers own the session token and
//! every retry or user-facing error policy.

mod client;
mod error;
mod types;

pub use client::{BoxFuture, ChatTransport, HttpTransport, SEND_MESSAGE_PATH, TransportConfig};
pub use error::{TransportError, TransportResult};
pub use types::{ExchangeReply, SendMessageResponse, SessionToken};
