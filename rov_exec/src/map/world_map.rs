//! # World Map

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use std::{fs::File, io, path::Path};

use image::{Rgb, RgbImage};
use ndarray::{s, Array3};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of cells along each side of the default world map.
pub const DEFAULT_MAP_SIZE: usize = 200;

/// Number of layers in the map.
const NUM_LAYERS: usize = 3;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A fixed size square grid holding one signed evidence accumulator per layer per cell.
///
/// Values are never normalised, only their sign and relative magnitude across ticks carries
/// meaning. Data is indexed `[y, x, layer]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldMap {
    data: Array3<i32>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible layers in a [`WorldMap`]
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug, Serialize, Deserialize)]
pub enum WorldMapLayer {
    Obstacle,
    Sample,
    Navigable,
}

#[derive(Debug, thiserror::Error)]
pub enum WorldMapError {
    #[error("Requested cell outside map bounds")]
    OutsideMap,

    #[error("An IO operation failed: {0}")]
    IoError(io::Error),

    #[error("Couldn't serialize the world map: {0}")]
    SerializeError(serde_json::Error),

    #[error("Couldn't save the world map image: {0}")]
    ImageError(image::ImageError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WorldMapLayer {
    /// All layers in index order
    pub const ALL: [WorldMapLayer; NUM_LAYERS] = [
        WorldMapLayer::Obstacle,
        WorldMapLayer::Sample,
        WorldMapLayer::Navigable,
    ];

    fn index(self) -> usize {
        match self {
            WorldMapLayer::Obstacle => 0,
            WorldMapLayer::Sample => 1,
            WorldMapLayer::Navigable => 2,
        }
    }
}

impl WorldMap {
    /// Create a new empty map with `size` cells along each side.
    pub fn new(size: usize) -> Self {
        Self {
            data: Array3::zeros((size, size, NUM_LAYERS)),
        }
    }

    /// Number of cells along each side of the map.
    pub fn size(&self) -> usize {
        self.data.dim().0
    }

    /// Get the value of one layer in a cell.
    pub fn get(&self, x: usize, y: usize, layer: WorldMapLayer) -> Result<i32, WorldMapError> {
        self.data
            .get((y, x, layer.index()))
            .copied()
            .ok_or(WorldMapError::OutsideMap)
    }

    /// Record evidence of `layer` in each of the given `(x, y)` cells.
    ///
    /// The observed layer is raised by `reward` and every competing layer in the same cell is
    /// lowered by `penalty`. Each distinct cell is updated once per call, however many times it is
    /// listed. Cells outside the map are ignored.
    pub fn add_evidence<I>(&mut self, layer: WorldMapLayer, cells: I, reward: i32, penalty: i32)
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let size = self.size();

        let mut cells: Vec<(usize, usize)> = cells
            .into_iter()
            .filter(|&(x, y)| x < size && y < size)
            .collect();
        cells.sort_unstable();
        cells.dedup();

        for (x, y) in cells {
            for other in WorldMapLayer::ALL.iter() {
                let v = &mut self.data[[y, x, other.index()]];
                if *other == layer {
                    *v = v.saturating_add(reward);
                } else {
                    *v = v.saturating_sub(penalty);
                }
            }
        }
    }

    /// Returns the layer with the highest positive evidence in the cell, or `None` if no layer
    /// has positive evidence.
    pub fn classify(&self, x: usize, y: usize) -> Result<Option<WorldMapLayer>, WorldMapError> {
        let mut best: Option<(WorldMapLayer, i32)> = None;

        for layer in WorldMapLayer::ALL.iter() {
            let v = self.get(x, y, *layer)?;
            if v <= 0 {
                continue;
            }
            match best {
                Some((_, b)) if b >= v => (),
                _ => best = Some((*layer, v)),
            }
        }

        Ok(best.map(|(l, _)| l))
    }

    /// Number of cells in which the given layer has positive evidence.
    pub fn num_positive(&self, layer: WorldMapLayer) -> usize {
        self.data
            .slice(s![.., .., layer.index()])
            .iter()
            .filter(|&&v| v > 0)
            .count()
    }

    /// Render the map as an RGB image.
    ///
    /// Red is obstacle, green is sample and blue is navigable evidence. Positive evidence is
    /// saturated at 255, negative evidence is black. The image is flipped vertically so that the
    /// map's +y axis points up.
    pub fn to_image(&self) -> RgbImage {
        let size = self.size() as u32;

        RgbImage::from_fn(size, size, |x, row| {
            let y = (size - 1 - row) as usize;
            let x = x as usize;

            let mut px = [0u8; NUM_LAYERS];
            for (c, p) in px.iter_mut().enumerate() {
                *p = self.data[[y, x, c]].max(0).min(255) as u8;
            }

            Rgb(px)
        })
    }

    /// Save the map rendering as a PNG image.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), WorldMapError> {
        self.to_image()
            .save(path)
            .map_err(WorldMapError::ImageError)
    }

    /// Save the raw map data as JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), WorldMapError> {
        let file = File::create(path).map_err(WorldMapError::IoError)?;
        serde_json::to_writer(file, self).map_err(WorldMapError::SerializeError)
    }
}

impl Default for WorldMap {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_SIZE)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
