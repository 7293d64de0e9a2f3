pub mod task;
pub mod user;

pub use task::TaskUsecases;
pub use user::UserUsecases;
