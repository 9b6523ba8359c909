//! Named facial landmarks for a single detection cycle.
//!
//! Coordinates are in whatever normalized space the landmark model emits
//! (typically image-relative, y pointing down). Classification only ever
//! uses ratios of distances, so the unit does not matter.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

/// Landmarks the classifier knows about, in frame order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LandmarkId {
    LeftEyebrow,
    RightEyebrow,
    LeftEyeTop,
    LeftEyeBottom,
    LeftEyeInner,
    LeftEyeOuter,
    RightEyeTop,
    RightEyeBottom,
    RightEyeInner,
    RightEyeOuter,
    MouthLeft,
    MouthRight,
}

impl LandmarkId {
    pub const ALL: &[LandmarkId] = &[
        LandmarkId::LeftEyebrow,
        LandmarkId::RightEyebrow,
        LandmarkId::LeftEyeTop,
        LandmarkId::LeftEyeBottom,
        LandmarkId::LeftEyeInner,
        LandmarkId::LeftEyeOuter,
        LandmarkId::RightEyeTop,
        LandmarkId::RightEyeBottom,
        LandmarkId::RightEyeInner,
        LandmarkId::RightEyeOuter,
        LandmarkId::MouthLeft,
        LandmarkId::MouthRight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LandmarkId::LeftEyebrow => "left_eyebrow",
            LandmarkId::RightEyebrow => "right_eyebrow",
            LandmarkId::LeftEyeTop => "left_eye_top",
            LandmarkId::LeftEyeBottom => "left_eye_bottom",
            LandmarkId::LeftEyeInner => "left_eye_inner",
            LandmarkId::LeftEyeOuter => "left_eye_outer",
            LandmarkId::RightEyeTop => "right_eye_top",
            LandmarkId::RightEyeBottom => "right_eye_bottom",
            LandmarkId::RightEyeInner => "right_eye_inner",
            LandmarkId::RightEyeOuter => "right_eye_outer",
            LandmarkId::MouthLeft => "mouth_left",
            LandmarkId::MouthRight => "mouth_right",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.name() == name)
    }
}

/// Which side of the face a paired landmark belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn eyebrow(&self) -> LandmarkId {
        match self {
            Side::Left => LandmarkId::LeftEyebrow,
            Side::Right => LandmarkId::RightEyebrow,
        }
    }

    pub fn eye_top(&self) -> LandmarkId {
        match self {
            Side::Left => LandmarkId::LeftEyeTop,
            Side::Right => LandmarkId::RightEyeTop,
        }
    }

    pub fn eye_bottom(&self) -> LandmarkId {
        match self {
            Side::Left => LandmarkId::LeftEyeBottom,
            Side::Right => LandmarkId::RightEyeBottom,
        }
    }

    pub fn eye_inner(&self) -> LandmarkId {
        match self {
            Side::Left => LandmarkId::LeftEyeInner,
            Side::Right => LandmarkId::RightEyeInner,
        }
    }

    pub fn eye_outer(&self) -> LandmarkId {
        match self {
            Side::Left => LandmarkId::LeftEyeOuter,
            Side::Right => LandmarkId::RightEyeOuter,
        }
    }
}

/// A 3D point; `z` defaults to 0 for 2D models.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// In-plane distance. Depth is ignored because landmark models
    /// estimate it far less reliably than x/y.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::with_z(
            (self.x + other.x) / 2.0,
            (self.y + other.y) / 2.0,
            (self.z + other.z) / 2.0,
        )
    }
}

/// Immutable snapshot of one face's landmarks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkFrame {
    points: BTreeMap<LandmarkId, Point>,
    timestamp: Option<Duration>,
}

impl LandmarkFrame {
    pub fn new(points: impl IntoIterator<Item = (LandmarkId, Point)>) -> Self {
        Self {
            points: points.into_iter().collect(),
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: Duration) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Returns the point only if present and finite.
    pub fn get(&self, id: LandmarkId) -> Option<Point> {
        self.points.get(&id).copied().filter(Point::is_finite)
    }

    pub fn points(&self) -> impl Iterator<Item = (LandmarkId, Point)> + '_ {
        self.points.iter().map(|(id, p)| (*id, *p))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Capture time relative to the start of the stream, if the source provides one.
    pub fn timestamp(&self) -> Option<Duration> {
        self.timestamp
    }

    /// Midpoint between the inner and outer corner of one eye.
    pub fn eye_center(&self, side: Side) -> Option<Point> {
        let inner = self.get(side.eye_inner())?;
        let outer = self.get(side.eye_outer())?;
        Some(inner.midpoint(&outer))
    }

    /// Distance between the two eye centers; the face-scale reference.
    ///
    /// Returns `None` when either eye is missing or the distance is degenerate.
    pub fn inter_ocular_distance(&self) -> Option<f64> {
        let left = self.eye_center(Side::Left)?;
        let right = self.eye_center(Side::Right)?;
        let d = left.distance(&right);
        (d.is_finite() && d > f64::EPSILON).then_some(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn eyes_only() -> LandmarkFrame {
        LandmarkFrame::new([
            (LandmarkId::LeftEyeInner, Point::new(0.45, 0.40)),
            (LandmarkId::LeftEyeOuter, Point::new(0.35, 0.40)),
            (LandmarkId::RightEyeInner, Point::new(0.55, 0.40)),
            (LandmarkId::RightEyeOuter, Point::new(0.65, 0.40)),
        ])
    }

    #[rstest]
    #[case(LandmarkId::LeftEyebrow)]
    #[case(LandmarkId::RightEyeOuter)]
    #[case(LandmarkId::MouthRight)]
    fn test_name_lookup_is_reversible(#[case] id: LandmarkId) {
        assert_eq!(LandmarkId::from_name(id.name()), Some(id));
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert_eq!(LandmarkId::from_name("nose_tip"), None);
    }

    #[test]
    fn test_distance_ignores_depth() {
        let a = Point::with_z(0.0, 0.0, 5.0);
        let b = Point::with_z(3.0, 4.0, -5.0);
        assert_relative_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn test_get_filters_non_finite_points() {
        let frame = LandmarkFrame::new([(LandmarkId::LeftEyebrow, Point::new(f64::NAN, 0.2))]);
        assert!(frame.get(LandmarkId::LeftEyebrow).is_none());
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_eye_center_is_corner_midpoint() {
        let center = eyes_only().eye_center(Side::Left).unwrap();
        assert_relative_eq!(center.x, 0.40);
        assert_relative_eq!(center.y, 0.40);
    }

    #[test]
    fn test_inter_ocular_distance() {
        // Left center 0.40, right center 0.60
        assert_relative_eq!(eyes_only().inter_ocular_distance().unwrap(), 0.20, epsilon = 1e-12);
    }

    #[test]
    fn test_inter_ocular_distance_missing_eye() {
        let frame = LandmarkFrame::new([
            (LandmarkId::LeftEyeInner, Point::new(0.45, 0.40)),
            (LandmarkId::LeftEyeOuter, Point::new(0.35, 0.40)),
        ]);
        assert!(frame.inter_ocular_distance().is_none());
    }

    #[test]
    fn test_inter_ocular_distance_degenerate() {
        let p = Point::new(0.5, 0.5);
        let frame = LandmarkFrame::new([
            (LandmarkId::LeftEyeInner, p),
            (LandmarkId::LeftEyeOuter, p),
            (LandmarkId::RightEyeInner, p),
            (LandmarkId::RightEyeOuter, p),
        ]);
        assert!(frame.inter_ocular_distance().is_none());
    }

    #[test]
    fn test_builder_sets_timestamp() {
        let frame = LandmarkFrame::default().with_timestamp(Duration::from_millis(1500));
        assert!(frame.is_empty());
        assert_eq!(frame.timestamp(), Some(Duration::from_millis(1500)));
    }
}
