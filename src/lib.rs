//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-service`, `core-playback`, `core-catalog`).
//! Host applications can depend on `sermon-player-workspace` and enable the
//! documented features without needing to wire each crate individually.
