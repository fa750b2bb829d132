//! Core type definitions for the funding ledger
//!
//! All types follow these naming conventions:
//! - snake_case for field names
//! - *_id suffix for identifiers
//! - *_amount suffix for monetary values (smallest currency unit)
//! - *_at suffix for timestamps

mod campaign;
mod common;
mod contribution;
mod milestone;
mod update;
mod user;

pub use campaign::*;
pub use common::*;
pub use contribution::*;
pub use milestone::*;
pub use update::*;
pub use user::*;
