//! # ATS Rust Backend
//!
//! Class-attendance tracking engine.
//!
//! This crate provides a Rust backend for the Attendance Tracking Service
//! (ATS): students check in to scheduled class sessions (optionally with
//! face-verification and geolocation proof), teachers review per-date
//! attendance, and the system computes per-student reports against an
//! expected session calendar derived from each class's weekly schedule.
//! The backend exposes a REST API via Axum.
//!
//! ## Features
//!
//! - **Schedule Model**: recurring weekly schedule blocks with first-match
//!   weekday resolution
//! - **Occurrence Calculation**: reconstruct which dates a class should have
//!   met on, time-zone-correct end to end
//! - **Check-in Classification**: Present/Late/Absent against the day's
//!   block, with late allowance and one-record-per-day enforcement
//! - **Report Reconciliation**: recorded events reconciled against the
//!   expected calendar, unrecorded sessions counted absent
//! - **Location Outlier Detection**: pairwise-consensus and
//!   centroid/deviation passes over simultaneous check-in coordinates
//! - **HTTP API**: RESTful endpoints for clients
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Domain types shared across layers
//! - [`models`]: Reference-zone clock, schedules, occurrence calculation
//! - [`services`]: Business logic (check-in, reports, outliers, backfill)
//! - [`db`]: Storage operations, repository pattern and configuration
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Time Policy
//!
//! All stored timestamps are UTC instants. One configured IANA reference
//! zone governs every "today", weekday and day-boundary decision; no
//! component reads machine-local time. `now` is always passed in
//! explicitly, which keeps the engine pure and testable across DST and
//! zone-boundary cases.

pub mod api;

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
