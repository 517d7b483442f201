//! End-to-end frame sequences through the engine

mod support;

use drowsiness_engine::{
    AuxiliarySignals, DrowsinessEngine, EngineConfig, FrameAnalysis, FrameStatus, LandmarkSet,
};
use support::face;

fn engine() -> DrowsinessEngine {
    DrowsinessEngine::new(EngineConfig::default()).unwrap()
}

fn feed(engine: &mut DrowsinessEngine, face: &LandmarkSet) -> FrameAnalysis {
    engine.process_frame(std::slice::from_ref(face), &AuxiliarySignals::default())
}

#[test]
fn alert_driver_never_triggers() {
    let mut engine = engine();
    let open = face(0.4, 0.1);

    for _ in 0..10 {
        let analysis = feed(&mut engine, &open);
        assert_eq!(analysis.score, 0);
        assert!(!analysis.eyes_closed);
        assert!(!analysis.is_yawning);
        assert!(!analysis.blink_detected);
        assert!(analysis.alerts.is_empty());
    }
    assert_eq!(engine.state().eye_closed_streak(), 0);
    assert_eq!(engine.state().yawn_streak(), 0);
}

#[test]
fn sustained_closure_triggers_on_nth_frame() {
    let mut engine = engine();
    let closed = face(0.15, 0.1);
    let required = engine.config().thresholds.ear_consec_frames as usize;
    let eye_weight = engine.config().weights.eye_closed as u8;

    for frame in 1..=required + 5 {
        let analysis = feed(&mut engine, &closed);
        assert_eq!(analysis.eyes_closed, frame >= required, "frame {}", frame);
        if frame >= required {
            assert!(analysis.score >= eye_weight);
        } else {
            assert!(analysis.score < eye_weight);
        }
    }
}

#[test]
fn face_loss_restarts_accumulation() {
    let mut engine = engine();
    let closed = face(0.15, 0.1);
    let required = engine.config().thresholds.ear_consec_frames as usize;

    for _ in 0..required {
        feed(&mut engine, &closed);
    }
    assert!(engine.state().eye_closure.is_triggered());

    let lost = engine.process_frame(&[], &AuxiliarySignals::default());
    assert_eq!(lost.status, FrameStatus::FaceNotFound);
    assert_eq!(lost.score, 0);
    assert!(lost.error_reason.is_some());
    assert_eq!(engine.state().eye_closed_streak(), 0);
    assert_eq!(engine.state().yawn_streak(), 0);
    assert_eq!(engine.state().blink_streak(), 0);

    for frame in 1..=required {
        let analysis = feed(&mut engine, &closed);
        assert_eq!(analysis.eyes_closed, frame == required, "frame {}", frame);
    }
}

#[test]
fn brief_closure_is_a_blink_not_drowsiness() {
    let mut engine = engine();
    let open = face(0.35, 0.1);
    let shut = face(0.0, 0.1);

    for _ in 0..5 {
        feed(&mut engine, &open);
    }
    // One fully shut frame only moves the 5-frame mean to 0.28
    let analysis = feed(&mut engine, &shut);
    assert!(!analysis.eyes_closed);
    assert!(!analysis.blink_detected);
    assert!((analysis.smoothed_ear - 0.28).abs() < 1e-9);
    assert_eq!(analysis.score, 0);
}

#[test]
fn yawn_while_eyes_closed_stacks() {
    let mut engine = engine();
    let drowsy = face(0.15, 0.6);
    let last = (0..12).map(|_| feed(&mut engine, &drowsy)).last().unwrap();
    // eye 50 + yawn 35 + blink 15
    assert_eq!(last.score, 100);
    assert!(last.is_yawning && last.eyes_closed && last.blink_detected);
}

#[test]
fn score_drops_when_cause_clears() {
    let mut engine = engine();
    for _ in 0..10 {
        feed(&mut engine, &face(0.15, 0.1));
    }
    // Smoothed EAR needs a few open frames to climb back over the threshold
    let open = face(0.4, 0.1);
    let analysis = (0..5).map(|_| feed(&mut engine, &open)).last().unwrap();
    assert_eq!(analysis.score, 0);
    assert_eq!(engine.state().last_score, 0);
}
