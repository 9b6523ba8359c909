use crate::expression::domain::expression_signal::ExpressionSignal;
use crate::expression::domain::face_geometry::{
    eye_openness_ratio, eyebrow_lift_ratio, mouth_width_ratio,
};
use crate::expression::domain::running_baseline::RunningBaseline;
use crate::shared::constants::{
    DEFAULT_BASELINE_ALPHA, DEFAULT_EXPRESSION_THRESHOLD, DEFAULT_WINK_OPEN_RATIO,
    EYEBROW_BASELINE_PRIOR, EYEBROW_RAISE, SMILE, SMILE_BASELINE_PRIOR, WINK,
};
use crate::shared::landmark_frame::{LandmarkFrame, Side};

/// Domain interface for turning landmarks into expression signals.
///
/// Implementations may keep per-face state (e.g. running baselines),
/// hence `&mut self`.
pub trait ExpressionClassifier: Send {
    /// Returns one signal per expression the frame has enough landmarks for.
    /// An unusable frame (no face scale) yields an empty set.
    fn classify(&mut self, frame: &LandmarkFrame) -> Vec<ExpressionSignal>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassifierThresholds {
    /// Margin above baseline for eyebrow_raise and smile; also the
    /// "closed" openness ratio for wink.
    pub expression_threshold: f64,
    /// The other eye must stay above this ratio for a closure to count as a wink.
    pub wink_open_ratio: f64,
    pub baseline_alpha: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            expression_threshold: DEFAULT_EXPRESSION_THRESHOLD,
            wink_open_ratio: DEFAULT_WINK_OPEN_RATIO,
            baseline_alpha: DEFAULT_BASELINE_ALPHA,
        }
    }
}

/// True when exactly one eye is closed and the other clearly open.
///
/// Both eyes closed is a blink and never counts.
pub fn is_wink(left_ratio: f64, right_ratio: f64, closed_below: f64, open_above: f64) -> bool {
    let (low, high) = if left_ratio <= right_ratio {
        (left_ratio, right_ratio)
    } else {
        (right_ratio, left_ratio)
    };
    low < closed_below && high > open_above
}

/// Ratio-threshold classifier for eyebrow_raise, wink and smile.
///
/// eyebrow_raise and smile compare against running baselines that start at
/// an anatomical prior and drift toward the user's own neutral face. A
/// baseline only absorbs frames where its expression is inactive.
pub struct GeometricClassifier {
    thresholds: ClassifierThresholds,
    eyebrow_baseline: RunningBaseline,
    smile_baseline: RunningBaseline,
}

impl GeometricClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self {
            thresholds,
            eyebrow_baseline: RunningBaseline::new(
                EYEBROW_BASELINE_PRIOR,
                thresholds.baseline_alpha,
            ),
            smile_baseline: RunningBaseline::new(SMILE_BASELINE_PRIOR, thresholds.baseline_alpha),
        }
    }

    pub fn eyebrow_baseline(&self) -> f64 {
        self.eyebrow_baseline.value()
    }

    pub fn smile_baseline(&self) -> f64 {
        self.smile_baseline.value()
    }

    fn above_baseline(
        name: &str,
        ratio: f64,
        baseline: &mut RunningBaseline,
        margin: f64,
    ) -> ExpressionSignal {
        let active = ratio > baseline.value() + margin;
        if !active {
            baseline.update(ratio);
        }
        ExpressionSignal::new(name, active, ratio)
    }
}

impl Default for GeometricClassifier {
    fn default() -> Self {
        Self::new(ClassifierThresholds::default())
    }
}

impl ExpressionClassifier for GeometricClassifier {
    fn classify(&mut self, frame: &LandmarkFrame) -> Vec<ExpressionSignal> {
        if frame.inter_ocular_distance().is_none() {
            return Vec::new();
        }

        let margin = self.thresholds.expression_threshold;
        let mut signals = Vec::with_capacity(3);

        if let Some(ratio) = eyebrow_lift_ratio(frame) {
            signals.push(Self::above_baseline(
                EYEBROW_RAISE,
                ratio,
                &mut self.eyebrow_baseline,
                margin,
            ));
        }

        if let (Some(left), Some(right)) = (
            eye_openness_ratio(frame, Side::Left),
            eye_openness_ratio(frame, Side::Right),
        ) {
            let active = is_wink(left, right, margin, self.thresholds.wink_open_ratio);
            signals.push(ExpressionSignal::new(WINK, active, left.min(right)));
        }

        if let Some(ratio) = mouth_width_ratio(frame) {
            signals.push(Self::above_baseline(
                SMILE,
                ratio,
                &mut self.smile_baseline,
                margin,
            ));
        }

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::landmark_frame::{LandmarkId, Point};
    use approx::assert_relative_eq;
    use rstest::rstest;

    struct Face {
        brow_lift: f64,
        left_open: f64,
        right_open: f64,
        mouth_width: f64,
    }

    impl Face {
        fn neutral() -> Self {
            Self {
                brow_lift: 0.35,
                left_open: 0.30,
                right_open: 0.30,
                mouth_width: 0.80,
            }
        }

        /// Ratios are relative to an inter-ocular distance of 100 and an
        /// eye width of 40, then every coordinate is multiplied by `scale`.
        fn frame(&self, scale: f64) -> LandmarkFrame {
            let p = |x: f64, y: f64| Point::new(x * scale, y * scale);
            let lg = self.left_open * 40.0 / 2.0;
            let rg = self.right_open * 40.0 / 2.0;
            let brow = self.brow_lift * 100.0;
            let mouth = self.mouth_width * 100.0 / 2.0;
            LandmarkFrame::new([
                (LandmarkId::LeftEyeOuter, p(80.0, 100.0)),
                (LandmarkId::LeftEyeInner, p(120.0, 100.0)),
                (LandmarkId::RightEyeInner, p(180.0, 100.0)),
                (LandmarkId::RightEyeOuter, p(220.0, 100.0)),
                (LandmarkId::LeftEyeTop, p(100.0, 100.0 - lg)),
                (LandmarkId::LeftEyeBottom, p(100.0, 100.0 + lg)),
                (LandmarkId::RightEyeTop, p(200.0, 100.0 - rg)),
                (LandmarkId::RightEyeBottom, p(200.0, 100.0 + rg)),
                (LandmarkId::LeftEyebrow, p(100.0, 100.0 - brow)),
                (LandmarkId::RightEyebrow, p(200.0, 100.0 - brow)),
                (LandmarkId::MouthLeft, p(150.0 - mouth, 200.0)),
                (LandmarkId::MouthRight, p(150.0 + mouth, 200.0)),
            ])
        }
    }

    fn signal<'a>(signals: &'a [ExpressionSignal], name: &str) -> &'a ExpressionSignal {
        signals
            .iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("missing signal {name}"))
    }

    // ── wink ────────────────────────────────────────────────────────

    #[rstest]
    #[case::left_closed(0.05, 0.35, true)]
    #[case::right_closed(0.35, 0.05, true)]
    #[case::blink(0.05, 0.05, false)]
    #[case::both_open(0.35, 0.35, false)]
    #[case::other_eye_squinting(0.05, 0.20, false)]
    fn test_is_wink(#[case] left: f64, #[case] right: f64, #[case] expected: bool) {
        assert_eq!(is_wink(left, right, 0.15, 0.25), expected);
    }

    #[test]
    fn test_wink_signal_active_for_one_closed_eye() {
        let face = Face {
            left_open: 0.05,
            right_open: 0.35,
            ..Face::neutral()
        };
        let signals = GeometricClassifier::default().classify(&face.frame(1.0));
        let wink = signal(&signals, WINK);
        assert!(wink.active);
        assert_relative_eq!(wink.raw_metric, 0.05, epsilon = 1e-9);
    }

    #[test]
    fn test_blink_is_not_a_wink() {
        let face = Face {
            left_open: 0.05,
            right_open: 0.05,
            ..Face::neutral()
        };
        let signals = GeometricClassifier::default().classify(&face.frame(1.0));
        assert!(!signal(&signals, WINK).active);
    }

    #[test]
    fn test_wink_does_not_raise_eyebrows() {
        let face = Face {
            left_open: 0.02,
            ..Face::neutral()
        };
        let signals = GeometricClassifier::default().classify(&face.frame(1.0));
        assert!(!signal(&signals, EYEBROW_RAISE).active);
    }

    // ── eyebrow_raise ───────────────────────────────────────────────

    #[rstest]
    #[case::neutral(0.35, false)]
    #[case::just_below(0.49, false)]
    #[case::just_above(0.51, true)]
    #[case::raised(0.60, true)]
    fn test_eyebrow_raise_threshold(#[case] lift: f64, #[case] expected: bool) {
        // Prior baseline 0.35 + threshold 0.15 = 0.50
        let face = Face {
            brow_lift: lift,
            ..Face::neutral()
        };
        let signals = GeometricClassifier::default().classify(&face.frame(1.0));
        let brow = signal(&signals, EYEBROW_RAISE);
        assert_eq!(brow.active, expected);
        assert_relative_eq!(brow.raw_metric, lift, epsilon = 1e-9);
    }

    #[rstest]
    #[case(0.01)]
    #[case(0.5)]
    #[case(3.0)]
    #[case(640.0)]
    fn test_eyebrow_raise_invariant_under_scaling(#[case] scale: f64) {
        for lift in [0.45, 0.55] {
            let face = Face {
                brow_lift: lift,
                ..Face::neutral()
            };
            let reference = GeometricClassifier::default().classify(&face.frame(1.0));
            let scaled = GeometricClassifier::default().classify(&face.frame(scale));

            let a = signal(&reference, EYEBROW_RAISE);
            let b = signal(&scaled, EYEBROW_RAISE);
            assert_eq!(a.active, b.active);
            assert_relative_eq!(a.raw_metric, b.raw_metric, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_baseline_adapts_to_neutral_frames_only() {
        let mut classifier = GeometricClassifier::default();
        let relaxed_high = Face {
            brow_lift: 0.45,
            ..Face::neutral()
        };
        for _ in 0..200 {
            let signals = classifier.classify(&relaxed_high.frame(1.0));
            assert!(!signal(&signals, EYEBROW_RAISE).active);
        }
        assert_relative_eq!(classifier.eyebrow_baseline(), 0.45, epsilon = 1e-3);

        // 0.55 would fire against the prior, but not against the adapted baseline
        let slight = Face {
            brow_lift: 0.55,
            ..Face::neutral()
        };
        let signals = classifier.classify(&slight.frame(1.0));
        assert!(!signal(&signals, EYEBROW_RAISE).active);
    }

    #[test]
    fn test_active_frames_do_not_move_baseline() {
        let mut classifier = GeometricClassifier::default();
        let raised = Face {
            brow_lift: 0.70,
            ..Face::neutral()
        };
        for _ in 0..50 {
            classifier.classify(&raised.frame(1.0));
        }
        assert_relative_eq!(classifier.eyebrow_baseline(), EYEBROW_BASELINE_PRIOR);
    }

    // ── smile ───────────────────────────────────────────────────────

    #[rstest]
    #[case::neutral(0.80, false)]
    #[case::grin(1.10, true)]
    fn test_smile_threshold(#[case] width: f64, #[case] expected: bool) {
        let face = Face {
            mouth_width: width,
            ..Face::neutral()
        };
        let signals = GeometricClassifier::default().classify(&face.frame(1.0));
        assert_eq!(signal(&signals, SMILE).active, expected);
    }

    #[test]
    fn test_no_mouth_omits_smile_only() {
        let full = Face::neutral().frame(1.0);
        let no_mouth = LandmarkFrame::new(full.points().filter(|(id, _)| {
            *id != LandmarkId::MouthLeft && *id != LandmarkId::MouthRight
        }));
        let signals = GeometricClassifier::default().classify(&no_mouth);
        let names: Vec<&str> = signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec![EYEBROW_RAISE, WINK]);
    }

    // ── missing face ────────────────────────────────────────────────

    #[test]
    fn test_empty_frame_yields_no_signals() {
        let signals = GeometricClassifier::default().classify(&LandmarkFrame::default());
        assert!(signals.is_empty());
    }

    #[test]
    fn test_frame_without_eye_corners_yields_no_signals() {
        let frame = LandmarkFrame::new([
            (LandmarkId::LeftEyebrow, Point::new(0.4, 0.3)),
            (LandmarkId::MouthLeft, Point::new(0.45, 0.7)),
            (LandmarkId::MouthRight, Point::new(0.55, 0.7)),
        ]);
        assert!(GeometricClassifier::default().classify(&frame).is_empty());
    }

    #[test]
    fn test_non_finite_coordinates_yield_no_signals() {
        let full = Face::neutral().frame(1.0);
        let broken = LandmarkFrame::new(full.points().map(|(id, p)| {
            if id == LandmarkId::RightEyeInner {
                (id, Point::new(f64::INFINITY, p.y))
            } else {
                (id, p)
            }
        }));
        assert!(GeometricClassifier::default().classify(&broken).is_empty());
    }
}
