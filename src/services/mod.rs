//! Session services: pure transitions plus the tasks that drive them

pub mod compile_poller;
pub mod port_reconciler;
pub mod scheduler;
pub mod session_machine;
pub mod session_runner;
pub mod upload_driver;

pub use compile_poller::CompilePoller;
pub use port_reconciler::reconcile;
pub use scheduler::ScheduledTask;
pub use session_machine::{SessionState, Transition};
pub use session_runner::{SessionHandle, SessionRunner, SessionSettings};
pub use upload_driver::{UploadDispatch, UploadDriver};
