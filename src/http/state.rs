//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::models::ReferenceClock;
use crate::services::face::{AcceptAll, FaceVerifier};
use crate::services::outlier::OutlierConfig;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for storage operations
    pub repository: Arc<dyn FullRepository>,
    /// Face-match collaborator
    pub face: Arc<dyn FaceVerifier>,
    /// Reference-zone clock
    pub clock: ReferenceClock,
    /// Outlier detection tuning
    pub outliers: OutlierConfig,
}

impl AppState {
    /// Create application state with default clock, outlier tuning and an
    /// accept-all face verifier.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            face: Arc::new(AcceptAll),
            clock: ReferenceClock::default(),
            outliers: OutlierConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: ReferenceClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_face(mut self, face: Arc<dyn FaceVerifier>) -> Self {
        self.face = face;
        self
    }

    pub fn with_outliers(mut self, outliers: OutlierConfig) -> Self {
        self.outliers = outliers;
        self
    }
}
