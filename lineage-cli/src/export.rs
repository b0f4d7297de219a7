//! Calibrated track export (JSON)
//!
//! Every selected valid cell is interpolated to one spot per frame and scaled
//! into physical units. Interpolation only reads the forest, so cells are
//! processed in parallel.

use anyhow::{anyhow, Context, Result};
use lineage_decoder::{CellId, LineageForest};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Scaling and selection applied to the export
#[derive(Debug, Clone)]
pub struct TrackOptions {
    pub fraction: f64,
    /// Multiplier for x and y
    pub calibration: f64,
    /// Multiplier for z
    pub z_scale: f64,
    /// Restrict the export to the descendants of this cell
    pub lineage: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrackExport {
    pub last_frame: u32,
    pub calibration: f64,
    pub z_scale: f64,
    pub cells: Vec<CellTrack>,
}

#[derive(Debug, Serialize)]
pub struct CellTrack {
    pub name: String,
    pub parent: Option<String>,
    pub quadrant: Option<String>,
    pub quartet: String,
    pub spots: Vec<TrackSpot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackSpot {
    pub frame: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub synthetic: bool,
}

/// Build the export document for the selected cells
pub fn build_tracks(forest: &LineageForest, options: &TrackOptions) -> Result<TrackExport> {
    let selected: Vec<(String, CellId)> = match &options.lineage {
        Some(founder) => {
            let root = forest
                .get(founder)
                .ok_or_else(|| anyhow!("Lineage root {:?} not found", founder))?;
            let descendants = forest.descendants(root);
            forest
                .valid_cells()
                .iter()
                .filter(|(name, _)| descendants.contains_key(*name))
                .map(|(name, id)| (name.to_string(), id))
                .collect()
        }
        None => forest
            .valid_cells()
            .iter()
            .map(|(name, id)| (name.to_string(), id))
            .collect(),
    };

    log::info!("Interpolating {} cells", selected.len());

    let cells: Vec<CellTrack> = selected
        .into_par_iter()
        .map(|(name, id)| CellTrack {
            parent: forest
                .parent(id)
                .map(|parent| forest.cell(parent).generic_name.clone()),
            quadrant: forest.quadrant(id).map(|q| q.label().to_string()),
            quartet: forest.quartet(id),
            spots: forest
                .interpolate(id, options.fraction)
                .into_iter()
                .map(|spot| TrackSpot {
                    frame: spot.frame,
                    x: spot.x as f64 * options.calibration,
                    y: spot.y as f64 * options.calibration,
                    z: spot.z as f64 * options.z_scale,
                    synthetic: spot.synthetic,
                })
                .collect(),
            name,
        })
        .collect();

    Ok(TrackExport {
        last_frame: forest.last_frame(),
        calibration: options.calibration,
        z_scale: options.z_scale,
        cells,
    })
}

/// Write the export document as pretty-printed JSON
pub fn write_tracks(export: &TrackExport, path: &Path) -> Result<()> {
    log::info!("Writing {} tracks: {:?}", export.cells.len(), path);

    let file = File::create(path)
        .with_context(|| format!("Failed to create track file: {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), export)
        .with_context(|| format!("Failed to write track file: {:?}", path))?;
    Ok(())
}
