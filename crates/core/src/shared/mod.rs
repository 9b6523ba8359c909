pub mod constants;
pub mod landmark_frame;
