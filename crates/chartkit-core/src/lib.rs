//! chartkit Core - chart and release types for exercising deployment actions
//!
//! This crate provides the data model shared by the action layer and its fixtures:
//! - `Chart`: A versioned package tree with templates, values and nested dependencies
//! - `Values`: Loosely typed configuration with deep merge support
//! - `Hook`: A manifest bound to one or more lifecycle events
//! - `Release`: An installed chart with revision, status and hooks

pub mod chart;
pub mod error;
pub mod hook;
pub mod release;
pub mod values;

pub use chart::{Chart, ChartFile, ChartMetadata, Dependency};
pub use error::{CoreError, Result};
pub use hook::{Hook, HookDeletePolicy, HookEvent};
pub use release::{Info, Release, Status};
pub use values::Values;
