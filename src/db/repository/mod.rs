//! Repository trait definitions for storage operations.
//!
//! This module provides a collection of focused repository traits that
//! abstract the backing store. By splitting responsibilities across multiple
//! traits, implementations can be more focused and testable.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`roster`]: Classes, students and enrollment membership
//! - [`attendance`]: Attendance records and the day-slot uniqueness contract
//!
//! # Trait Composition
//!
//! A complete repository implementation implements both traits:
//!
//! ```ignore
//! impl RosterRepository for MyRepo { ... }
//! impl AttendanceRepository for MyRepo { ... }
//! ```
//!
//! For functions that need the whole storage surface, use the
//! [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let class = repo.get_class(class_id).await?;
//!     repo.insert_record(&record).await?;
//!     Ok(())
//! }
//! ```

pub mod attendance;
pub mod error;
pub mod roster;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use attendance::AttendanceRepository;
pub use roster::RosterRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements both repository
/// traits.
pub trait FullRepository: RosterRepository + AttendanceRepository {}

// Blanket implementation: any type implementing both traits automatically implements FullRepository
impl<T> FullRepository for T where T: RosterRepository + AttendanceRepository {}
