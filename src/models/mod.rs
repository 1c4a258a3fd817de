//! Domain DTOs shared by state, services, and storage.

mod api;
mod task;
mod user;

pub use api::ApiResponse;
pub use task::{CreateTaskRequest, Task, TaskFilters, TaskPriority, TaskStatus, UpdateTaskRequest};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, TokenPair, User, UserRole, UserUpdate};
