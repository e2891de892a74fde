//! Conversation session management
//!
//! This module provides the `ConversationSession` abstraction that manages:
//! - Snapshot ingestion from both segment feeds and the chat feed
//! - Segment reconciliation and timeline snapshots for presentation
//! - Enrichment of finalized agent speech into session fields
//! - Outbound chat forwarding and disconnect/reset semantics

mod config;
mod session;
mod stats;

pub use config::SessionConfig;
pub use session::{ChatFeed, ConversationSession, SegmentFeed};
pub use stats::SessionStats;
