//! Multi-subject tracking
//!
//! One [`DrowsinessEngine`] per subject. Frames for the same subject are
//! serialized by a per-subject lock; different subjects run in parallel.

use crate::analysis::FrameAnalysis;
use crate::config::EngineConfig;
use crate::engine::DrowsinessEngine;
use crate::error::EngineError;
use crate::geometry::LandmarkSet;
use crate::signals::{AuxiliarySignals, GazeEstimator};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::info;

/// Subject identifier
pub type SubjectId = String;

type SharedEngine = Arc<Mutex<DrowsinessEngine>>;

/// Registry of per-subject engines
pub struct SubjectRegistry {
    config: EngineConfig,
    gaze_estimator: Option<Arc<dyn GazeEstimator>>,
    engines: RwLock<HashMap<SubjectId, SharedEngine>>,
}

impl SubjectRegistry {
    /// Create a registry; the config is validated once here
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            gaze_estimator: None,
            engines: RwLock::new(HashMap::new()),
        })
    }

    /// Gaze estimator shared by every engine created afterwards
    pub fn with_gaze_estimator(mut self, estimator: Arc<dyn GazeEstimator>) -> Self {
        self.gaze_estimator = Some(estimator);
        self
    }

    /// Start tracking a subject; no-op if already tracked
    pub fn attach(&self, subject: &str) -> Result<(), EngineError> {
        self.engine_for(subject).map(|_| ())
    }

    /// Stop tracking a subject, discarding its state
    pub fn detach(&self, subject: &str) -> bool {
        let removed = self
            .engines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(subject)
            .is_some();
        if removed {
            info!("Detached subject {}", subject);
        }
        removed
    }

    /// Process one frame for a subject, creating its engine on first use
    pub fn process_frame(
        &self,
        subject: &str,
        faces: &[LandmarkSet],
        signals: &AuxiliarySignals,
    ) -> Result<FrameAnalysis, EngineError> {
        let engine = self.engine_for(subject)?;
        let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(engine.process_frame(faces, signals))
    }

    /// Currently tracked subjects, sorted
    pub fn subjects(&self) -> Vec<SubjectId> {
        let mut subjects: Vec<_> = self
            .engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        subjects.sort();
        subjects
    }

    pub fn len(&self) -> usize {
        self.engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` against a subject's engine, if tracked
    pub fn with_engine<R>(
        &self,
        subject: &str,
        f: impl FnOnce(&DrowsinessEngine) -> R,
    ) -> Option<R> {
        let engine = self
            .engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(subject)
            .cloned()?;
        let engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
        Some(f(&engine))
    }

    fn engine_for(&self, subject: &str) -> Result<SharedEngine, EngineError> {
        if let Some(engine) = self
            .engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(subject)
        {
            return Ok(Arc::clone(engine));
        }

        let mut engines = self.engines.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(engine) = engines.get(subject) {
            return Ok(Arc::clone(engine));
        }

        let mut engine = DrowsinessEngine::new(self.config.clone())?;
        if let Some(estimator) = &self.gaze_estimator {
            engine = engine.with_gaze_estimator(Arc::clone(estimator));
        }
        let engine = Arc::new(Mutex::new(engine));
        engines.insert(subject.to_string(), Arc::clone(&engine));
        info!("Attached subject {}", subject);
        Ok(engine)
    }
}
