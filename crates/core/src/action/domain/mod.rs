pub mod action_descriptor;
pub mod action_dispatcher;
pub mod action_sink;
pub mod dispatch_error;
pub mod media_executor;
