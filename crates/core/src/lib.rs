//! `vidstream-core`: identity building blocks shared by every vidstream crate.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod plan;

pub use entity::Entity;
pub use error::DomainError;
pub use id::{SessionId, UserId};
pub use plan::Plan;
