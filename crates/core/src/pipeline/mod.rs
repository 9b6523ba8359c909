pub mod expression_trigger_use_case;
pub mod session_logger;
