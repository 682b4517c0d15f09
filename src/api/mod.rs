// Typed wrappers over the backend's REST endpoints

pub mod admin;
pub mod answers;
pub mod auth;
pub mod badcase;
pub mod dashboard;
pub mod questions;
pub mod scheduler;
pub mod scores;
pub mod stats;

pub use admin::AdminApi;
pub use answers::AnswersApi;
pub use auth::{AuthApi, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
pub use badcase::BadcaseApi;
pub use dashboard::DashboardApi;
pub use questions::QuestionsApi;
pub use scheduler::{SchedulerApi, SchedulerConfigRecord, SchedulerStatusPayload, WorkflowStatusPayload};
pub use scores::ScoresApi;
pub use stats::StatsApi;
