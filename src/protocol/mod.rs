pub mod env;
pub mod result;

pub use env::{pull_request_environment, push_environment, Environment, PushContext};
pub use result::{ExecutionResult, HostOutcome, Veto};
