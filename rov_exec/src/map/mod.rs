//! # Map
//!
//! This module implements the [`WorldMap`] type, the rover's accumulated evidence of what lies
//! where on the exploration area.

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

/// Implements the [`WorldMap`] type
mod world_map;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use world_map::{WorldMap, WorldMapError, WorldMapLayer, DEFAULT_MAP_SIZE};
