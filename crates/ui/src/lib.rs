#![deny(unsafe_code)]

/// Window shell, actions and theme wiring.
pub mod app;
/// Conversation view and its child components.
pub mod chat;
/// Wiring of configuration, transport and local storage.
pub mod startup;
