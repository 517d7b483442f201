//! Facial landmark geometry
//!
//! Eye and mouth aspect ratios computed from the 68-point landmark scheme.
//! MAR uses the 8-point inner-lip convention (landmarks 60-67).

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Number of points in a landmark set
pub const LANDMARK_COUNT: usize = 68;

/// Jaw line (0-16)
pub const JAW: Range<usize> = 0..17;
/// Right eye (36-41)
pub const RIGHT_EYE: Range<usize> = 36..42;
/// Left eye (42-47)
pub const LEFT_EYE: Range<usize> = 42..48;
/// Inner lips (60-67)
pub const INNER_MOUTH: Range<usize> = 60..68;

/// EAR returned when the eye corners coincide ("wide open / invalid")
pub const EAR_DEGENERATE: f64 = 100.0;

/// MAR returned when the mouth corners coincide ("closed")
pub const MAR_DEGENERATE: f64 = 0.0;

/// 2D image point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Ordered landmarks for one detected face in one frame
///
/// Cardinality is not enforced on construction; detectors hand over whatever
/// they produced and [`crate::validation`] decides whether the set is usable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points of a region, `None` if the set is too short for it
    pub fn region(&self, range: Range<usize>) -> Option<&[Point]> {
        self.points.get(range)
    }

    pub fn left_eye(&self) -> Option<&[Point; 6]> {
        self.region(LEFT_EYE).and_then(|p| p.try_into().ok())
    }

    pub fn right_eye(&self) -> Option<&[Point; 6]> {
        self.region(RIGHT_EYE).and_then(|p| p.try_into().ok())
    }

    pub fn inner_mouth(&self) -> Option<&[Point; 8]> {
        self.region(INNER_MOUTH).and_then(|p| p.try_into().ok())
    }

    pub fn jaw(&self) -> Option<&[Point]> {
        self.region(JAW)
    }

    /// Mean EAR over both eyes
    pub fn mean_ear(&self) -> Option<f64> {
        let left = eye_aspect_ratio(self.left_eye()?);
        let right = eye_aspect_ratio(self.right_eye()?);
        Some((left + right) / 2.0)
    }

    pub fn mar(&self) -> Option<f64> {
        self.inner_mouth().map(mouth_aspect_ratio)
    }
}

impl From<Vec<Point>> for LandmarkSet {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

/// Eye Aspect Ratio
///
/// `(|p1-p5| + |p2-p4|) / (2 * |p0-p3|)` where p0/p3 are the eye corners.
/// Returns [`EAR_DEGENERATE`] when the corners coincide.
pub fn eye_aspect_ratio(eye: &[Point; 6]) -> f64 {
    let horizontal = eye[0].distance(&eye[3]);
    if horizontal <= f64::EPSILON {
        return EAR_DEGENERATE;
    }

    let v1 = eye[1].distance(&eye[5]);
    let v2 = eye[2].distance(&eye[4]);
    (v1 + v2) / (2.0 * horizontal)
}

/// Mouth Aspect Ratio over the inner lips
///
/// `|p2-p6| / |p0-p4|`: inner-lip gap over mouth width.
/// Returns [`MAR_DEGENERATE`] when the corners coincide.
pub fn mouth_aspect_ratio(inner_mouth: &[Point; 8]) -> f64 {
    let horizontal = inner_mouth[0].distance(&inner_mouth[4]);
    if horizontal <= f64::EPSILON {
        return MAR_DEGENERATE;
    }

    inner_mouth[2].distance(&inner_mouth[6]) / horizontal
}

/// Centroid of a set of points
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}
