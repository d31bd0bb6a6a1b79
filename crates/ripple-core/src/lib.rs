//! Core abstractions for ripple-rs.
//!
//! This crate provides the GPU-independent pieces of the planar reflection
//! system:
//! - [`Plane`] math: signed distances, reflections, plane transforms
//! - [`MirrorConfig`] and [`WaterConfig`] tunables
//! - [`FrameClock`] for fixed-step water animation time

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod clock;
pub mod config;
pub mod error;
pub mod plane;

pub use clock::{FrameClock, DEFAULT_TIME_STEP};
pub use config::{MirrorConfig, WaterConfig};
pub use error::{Result, RippleError};
pub use plane::Plane;

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
