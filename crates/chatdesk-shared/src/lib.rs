//! Wire types shared between the chatdesk hub and its UI collaborators.

pub mod preview;
pub mod schemas;

pub const DEFAULT_SESSION_TITLE: &str = "New Conversation";
pub const DEFAULT_SESSION_MODE: &str = "code";
