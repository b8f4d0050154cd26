//! Headless board client. [`view`] is the pure board model, [`store`] the
//! reducer-driven state container that reconciles optimistic moves with the
//! server's answers, and [`client`] the HTTP transport.

pub mod client;
pub mod error;
pub mod store;
pub mod view;

pub use client::EaselClient;
pub use error::EaselError;
pub use store::{BoardAction, BoardStore, MoveId, MoveIntent, MoveState};
pub use view::{BoardView, ColumnView, TaskCard};

pub type Result<T> = std::result::Result<T, EaselError>;
