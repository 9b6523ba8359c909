pub mod capture_error;
pub mod landmark_source;
