pub mod activity_service;
pub mod auth_service;
pub mod column_service;
pub mod metrics_service;
pub mod project_service;
pub mod task_service;
pub mod user_service;

pub use activity_service::*;
pub use auth_service::*;
pub use column_service::*;
pub use metrics_service::*;
pub use project_service::*;
pub use task_service::*;
pub use user_service::*;
