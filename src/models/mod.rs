pub mod account;
pub mod datetime;
pub mod task;

pub use account::{Account, AccountId, AccountView};
pub use task::{NewTask, Priority, Task, TaskPatch, TaskQuery};
