pub mod expression_classifier;
pub mod expression_signal;
pub mod face_geometry;
pub mod running_baseline;
