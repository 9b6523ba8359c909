pub mod hold_tracker;
pub mod trigger_engine;
