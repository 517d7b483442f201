//! Synthetic landmark sets with known EAR/MAR

use drowsiness_engine::{LandmarkSet, Point, LANDMARK_COUNT};

fn eye(x: f64, y: f64, ear: f64) -> [Point; 6] {
    let w = 30.0;
    let h = ear * w / 2.0;
    [
        Point::new(x, y),
        Point::new(x + w / 3.0, y - h),
        Point::new(x + 2.0 * w / 3.0, y - h),
        Point::new(x + w, y),
        Point::new(x + 2.0 * w / 3.0, y + h),
        Point::new(x + w / 3.0, y + h),
    ]
}

fn inner_mouth(x: f64, y: f64, mar: f64) -> [Point; 8] {
    let w = 40.0;
    let g = mar * w / 2.0;
    [
        Point::new(x, y),
        Point::new(x + w / 4.0, y - g),
        Point::new(x + w / 2.0, y - g),
        Point::new(x + 3.0 * w / 4.0, y - g),
        Point::new(x + w, y),
        Point::new(x + 3.0 * w / 4.0, y + g),
        Point::new(x + w / 2.0, y + g),
        Point::new(x + w / 4.0, y + g),
    ]
}

/// 68-point face with the given EAR (both eyes) and inner-lip MAR
pub fn face(ear: f64, mar: f64) -> LandmarkSet {
    let mut points = vec![Point::default(); LANDMARK_COUNT];
    for (i, p) in points[0..17].iter_mut().enumerate() {
        *p = Point::new(40.0 + i as f64 * 7.5, 150.0);
    }
    points[36..42].copy_from_slice(&eye(55.0, 80.0, ear));
    points[42..48].copy_from_slice(&eye(115.0, 80.0, ear));
    points[60..68].copy_from_slice(&inner_mouth(80.0, 130.0, mar));
    LandmarkSet::new(points)
}
