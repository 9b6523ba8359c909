//! Scale-free ratios over a landmark frame.
//!
//! Every ratio divides by a distance measured on the same face, so moving
//! closer to or farther from the camera leaves it unchanged.

use crate::shared::landmark_frame::{LandmarkFrame, LandmarkId, Side};

/// Mean eyebrow-to-eye-center distance over the inter-ocular distance.
///
/// Measured against the eye corners rather than the lid so that closing an
/// eye does not read as a raised brow. Uses whichever sides are visible;
/// `None` if neither is or the face scale is unavailable.
pub fn eyebrow_lift_ratio(frame: &LandmarkFrame) -> Option<f64> {
    let scale = frame.inter_ocular_distance()?;

    let lifts: Vec<f64> = [Side::Left, Side::Right]
        .iter()
        .filter_map(|side| {
            let brow = frame.get(side.eyebrow())?;
            let eye = frame.eye_center(*side)?;
            Some(brow.distance(&eye))
        })
        .collect();

    if lifts.is_empty() {
        return None;
    }
    let mean = lifts.iter().sum::<f64>() / lifts.len() as f64;
    Some(mean / scale)
}

/// Lid gap over eye width for one eye: ~0.3 open, near 0 closed.
pub fn eye_openness_ratio(frame: &LandmarkFrame, side: Side) -> Option<f64> {
    let top = frame.get(side.eye_top())?;
    let bottom = frame.get(side.eye_bottom())?;
    let inner = frame.get(side.eye_inner())?;
    let outer = frame.get(side.eye_outer())?;

    let width = inner.distance(&outer);
    if width <= f64::EPSILON {
        return None;
    }
    Some(top.distance(&bottom) / width)
}

/// Mouth corner distance over the inter-ocular distance.
pub fn mouth_width_ratio(frame: &LandmarkFrame) -> Option<f64> {
    let scale = frame.inter_ocular_distance()?;
    let left = frame.get(LandmarkId::MouthLeft)?;
    let right = frame.get(LandmarkId::MouthRight)?;
    Some(left.distance(&right) / scale)
}
