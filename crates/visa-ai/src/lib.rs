//! Conversation engine for a WhatsApp immigration assistant.
//!
//! The crate owns the pieces with real domain logic: the staged conversation
//! dispatcher, the per-country eligibility scoring engine, the document
//! checklist generator, the visa fee schedule, and the bounded session store.
//! Everything the assistant merely relays (translation, OCR, letter
//! generation, interview coaching, bookings) is reached through the
//! collaborator contracts in [`conversation::collaborators`].

pub mod config;
pub mod conversation;
pub mod error;
pub mod telemetry;
