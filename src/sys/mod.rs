pub mod engine;
pub mod poller;
pub mod runtime;
