// Re-export all shared types from corkboard-types
pub use corkboard_types::*;
