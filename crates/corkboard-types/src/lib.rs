//! Shared types for the corkboard server and its clients.
//!
//! These types describe the JSON shapes exchanged over the REST API and the
//! rows stored in the server database.
//!
//! # Features
//!
//! - `sqlx`: Enables `sqlx::FromRow` derives for database integration.

pub mod activity;
pub mod api;
pub mod attachment;
pub mod column;
pub mod comment;
pub mod ids;
pub mod project;
pub mod task;
pub mod user;

pub use activity::*;
pub use api::*;
pub use attachment::*;
pub use column::*;
pub use comment::*;
pub use ids::*;
pub use project::*;
pub use task::*;
pub use user::*;
