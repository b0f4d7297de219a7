//! Summary report and cell matrix output

use anyhow::{Context, Result};
use lineage_decoder::LineageForest;
use std::io::Write;
use std::path::Path;

/// Print counts, roots, ambiguous links and rejected records
pub fn write_summary<W: Write>(forest: &LineageForest, out: &mut W) -> Result<()> {
    let stats = forest.stats();

    writeln!(out, "Lineage summary")?;
    writeln!(out, "  Cells:      {}", stats.num_cells)?;
    writeln!(out, "  Valid:      {}", stats.num_valid)?;
    writeln!(out, "  Rejected:   {}", stats.num_rejected)?;
    writeln!(out, "  Last frame: {}", stats.last_frame)?;

    let roots: Vec<&str> = forest
        .roots()
        .into_iter()
        .map(|id| forest.cell(id).generic_name.as_str())
        .collect();
    writeln!(out, "  Roots ({}): {}", roots.len(), roots.join(", "))?;

    if stats.num_ambiguities > 0 {
        writeln!(out, "\nAmbiguous sibling matches ({}):", stats.num_ambiguities)?;
        for ambiguity in forest.ambiguities() {
            let candidates: Vec<&str> = ambiguity
                .candidates
                .iter()
                .map(|&id| forest.cell(id).generic_name.as_str())
                .collect();
            writeln!(
                out,
                "  {} (birth time {}): candidates [{}], linked via {}",
                forest.cell(ambiguity.cell).generic_name,
                ambiguity.birth_time,
                candidates.join(", "),
                forest.cell(ambiguity.chosen).generic_name
            )?;
        }
    }

    if stats.num_rejected > 0 {
        writeln!(out, "\nRejected records:")?;
        for &id in forest.rejected_ids() {
            let name = &forest.cell(id).generic_name;
            match &forest.cell(id).diagnostic {
                Some(diagnostic) => writeln!(out, "  {:<8} {}", name, diagnostic)?,
                None => writeln!(out, "  {:<8} (no diagnostic)", name)?,
            }
        }
    }

    Ok(())
}

/// Write one CSV row per cell, in file order
pub fn write_matrix(forest: &LineageForest, path: &Path) -> Result<()> {
    log::info!("Writing cell matrix: {:?}", path);

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create matrix file: {:?}", path))?;

    writer.write_record([
        "generic_name",
        "birth_frame",
        "gen_birth_time",
        "color",
        "n_spots",
        "name",
    ])?;

    for (name, id) in forest.cells().iter() {
        let cell = forest.cell(id);
        let birth_time = cell
            .generation_birth_time
            .map(|t| t.to_string())
            .unwrap_or_default();
        writer.write_record([
            name.to_string(),
            cell.birth_frame.to_string(),
            birth_time,
            cell.color.to_string(),
            cell.n_spots.to_string(),
            cell.name.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
