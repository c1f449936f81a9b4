//! Face-match collaborator interface.
//!
//! The actual face-match computation lives in an external service; the
//! engine only consumes a boolean verdict. A `false` verdict and an upstream
//! failure are kept distinct here so callers can decide retry behavior, but
//! both abort a check-in before classification.

use async_trait::async_trait;

/// Error from the face-match collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FaceVerifyError {
    /// The service could not be reached or timed out. Retryable by the
    /// caller with backoff; never treated as a successful match.
    #[error("Face service unavailable: {0}")]
    Unavailable(String),

    /// The service answered but rejected the request itself.
    #[error("Face service rejected request: {0}")]
    Rejected(String),
}

/// Narrow contract consumed from the external face-match service.
#[async_trait]
pub trait FaceVerifier: Send + Sync {
    /// Compare a photo payload against the stored reference for a student.
    ///
    /// # Arguments
    /// * `student_code` - Institutional student code known to the service
    /// * `photo` - Base64 photo payload
    ///
    /// # Returns
    /// * `Ok(true)` - The photo matches the student
    /// * `Ok(false)` - The photo does not match
    /// * `Err(FaceVerifyError)` - The verdict could not be obtained
    async fn verify(&self, student_code: &str, photo: &str) -> Result<bool, FaceVerifyError>;
}

/// Verifier that accepts every photo.
///
/// Default for local development, where no face service is deployed.
pub struct AcceptAll;

#[async_trait]
impl FaceVerifier for AcceptAll {
    async fn verify(&self, _student_code: &str, _photo: &str) -> Result<bool, FaceVerifyError> {
        Ok(true)
    }
}

/// Verifier returning a fixed verdict; test double.
pub struct FixedVerdict(pub bool);

#[async_trait]
impl FaceVerifier for FixedVerdict {
    async fn verify(&self, _student_code: &str, _photo: &str) -> Result<bool, FaceVerifyError> {
        Ok(self.0)
    }
}

/// Verifier that always fails as unreachable; test double.
pub struct Unreachable;

#[async_trait]
impl FaceVerifier for Unreachable {
    async fn verify(&self, _student_code: &str, _photo: &str) -> Result<bool, FaceVerifyError> {
        Err(FaceVerifyError::Unavailable(
            "connection refused".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_accept_all() {
        assert!(AcceptAll.verify("S-1", "photo").await.unwrap());
    }

    #[tokio::test]
    async fn test_fixed_verdict() {
        assert!(!FixedVerdict(false).verify("S-1", "photo").await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_errors() {
        let err = Unreachable.verify("S-1", "photo").await.unwrap_err();
        assert!(matches!(err, FaceVerifyError::Unavailable(_)));
    }
}
