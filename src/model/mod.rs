//! Data models for qsheet.
//!
//! This module contains the domain models:
//! - Topic
//! - SubTopic
//! - Question
//! - SheetState (the normalized tables)

pub mod entity;
pub mod sheet;

pub use entity::{
    new_id, Difficulty, EntityKind, ParentType, Question, QuestionPatch, QuestionStatus, SubTopic,
    Topic,
};
pub use sheet::{IntegrityViolation, SheetMetadata, SheetState};
