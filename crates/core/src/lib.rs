pub mod action;
pub mod config;
pub mod expression;
pub mod landmarks;
pub mod pipeline;
pub mod shared;
pub mod trigger;
