// src/resolver/mod.rs

//! Dependency resolution over the release catalog
//!
//! Turns a list of selected catalog indices into a [`Resolution`]: the user's
//! direct picks, the converged requirement set (one version per component,
//! newest wins), and the runtime packages that only produce manifest pins.

mod engine;
mod plan;

pub use engine::Resolver;
pub use plan::{Resolution, SkipReason, SkippedNode};
