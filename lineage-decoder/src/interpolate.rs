//! Trajectory interpolation
//!
//! Tracking tools only record a cell every few frames. Downstream viewers
//! want one spot per frame, plus a spot right before division that joins the
//! mother's trajectory to its daughters. Interpolated coordinates are
//! truncated to integers; the consuming formats are pixel based.

use crate::lineage::forest::LineageForest;
use crate::types::{CellId, Spot};

/// Clamp an interpolation density into `(0.0, 1.0]`
///
/// Anything outside the range, NaN included, falls back to `1.0`.
pub fn normalize_fraction(fraction: f64) -> f64 {
    if fraction > 0.0 && fraction <= 1.0 {
        fraction
    } else {
        1.0
    }
}

/// Dense trajectory of a cell
///
/// With `fraction == 1.0` every frame between the first and the last spot is
/// covered; smaller fractions sample proportionally fewer frames per gap.
/// Original spots are always kept and the result is ordered by frame. The
/// stored trajectory is not modified.
pub fn interpolate(forest: &LineageForest, id: CellId, fraction: f64) -> Vec<Spot> {
    let fraction = normalize_fraction(fraction);
    let mut spots = forest.trajectory(id).to_vec();

    if let Some(spot) = division_spot(forest, id) {
        spots.push(spot);
    }
    spots.sort_by_key(|spot| spot.frame);

    if spots.len() <= 1 {
        return spots;
    }

    let mut dense = Vec::with_capacity(spots.len());
    for pair in spots.windows(2) {
        dense.push(pair[0]);
        dense.extend(between(&pair[0], &pair[1], fraction));
    }
    dense.extend(spots.last().copied());
    dense
}

/// Synthesize the spot one frame before the earliest daughter appears
///
/// Its position is the mean of the mother's last spot and the first spot of
/// every daughter. Nothing is produced unless all daughters are valid. The
/// spot is also skipped when the mother already has a spot at that frame; a
/// daughter that appears before the mother's last frame yields a division
/// spot that [`interpolate`] places in frame order.
pub fn division_spot(forest: &LineageForest, id: CellId) -> Option<Spot> {
    let children = forest.children(id);
    if children.is_empty() {
        return None;
    }

    let mut firsts = Vec::with_capacity(children.len());
    for &child in children {
        let cell = forest.cell(child);
        if !cell.valid {
            return None;
        }
        firsts.push(*cell.first_spot()?);
    }

    let mother = forest.cell(id);
    let last = *mother.last_spot()?;
    let division_frame = firsts.iter().map(|s| s.frame).min()?.checked_sub(1)?;
    if division_frame == 0 || mother.spots.iter().any(|s| s.frame == division_frame) {
        log::trace!(
            "No division spot for {}: frame {} is already taken",
            mother,
            division_frame
        );
        return None;
    }

    let points: Vec<Spot> = std::iter::once(last).chain(firsts).collect();
    let n = points.len() as f64;
    let mean = |axis: fn(&Spot) -> i32| -> i32 {
        let sum: f64 = points.iter().map(|s| axis(s) as f64).sum();
        (sum / n).round() as i32
    };

    Some(Spot::synthetic(
        division_frame,
        mean(|s| s.x),
        mean(|s| s.y),
        mean(|s| s.z),
    ))
}

/// Linearly interpolated spots strictly between two recorded spots
fn between(start: &Spot, end: &Spot, fraction: f64) -> Vec<Spot> {
    let gap = end.frame.saturating_sub(start.frame);
    if gap <= 1 {
        return Vec::new();
    }

    let divisor = gap as f64 * fraction;
    let steps = divisor as u32;
    let step = |from: i32, to: i32| (to as f64 - from as f64) / divisor;
    let (dx, dy, dz) = (step(start.x, end.x), step(start.y, end.y), step(start.z, end.z));

    (1..steps)
        .map(|i| {
            let t = i as f64;
            Spot::synthetic(
                start.frame + (t / fraction) as u32,
                (start.x as f64 + dx * t) as i32,
                (start.y as f64 + dy * t) as i32,
                (start.z as f64 + dz * t) as i32,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, DaughterFlag};

    fn tracked(name: &str, left: DaughterFlag, right: DaughterFlag, spots: &[Spot]) -> Cell {
        let mut cell = Cell {
            generic_name: name.to_string(),
            cells_left: left,
            cells_right: right,
            generation_birth_time: Some(name.len() as i64),
            n_spots: spots.len(),
            valid: !spots.is_empty(),
            ..Cell::default()
        };
        for spot in spots {
            cell.push_spot(*spot);
        }
        cell
    }

    fn single(spots: &[Spot]) -> LineageForest {
        LineageForest::from_cells(vec![tracked(
            "A",
            DaughterFlag::Absent,
            DaughterFlag::Absent,
            spots,
        )])
    }

    #[test]
    fn test_gap_of_four_frames() {
        let forest = single(&[Spot::new(10, 0, 100, 5), Spot::new(14, 8, 90, 6)]);
        let dense = interpolate(&forest, CellId(0), 1.0);

        let frames: Vec<u32> = dense.iter().map(|s| s.frame).collect();
        assert_eq!(frames, vec![10, 11, 12, 13, 14]);
        assert_eq!(dense[1], Spot::synthetic(11, 2, 97, 5));
        assert_eq!(dense[2], Spot::synthetic(12, 4, 95, 5));
        assert_eq!(dense[3], Spot::synthetic(13, 6, 92, 5));
        assert!(!dense[0].synthetic);
        assert!(!dense[4].synthetic);
    }

    #[test]
    fn test_single_spot_is_returned_unchanged() {
        let forest = single(&[Spot::new(3, 1, 2, 3)]);
        assert_eq!(interpolate(&forest, CellId(0), 1.0), vec![Spot::new(3, 1, 2, 3)]);
    }

    #[test]
    fn test_fraction_out_of_range_means_one() {
        let forest = single(&[Spot::new(1, 0, 0, 0), Spot::new(9, 16, 8, 0)]);
        let reference = interpolate(&forest, CellId(0), 1.0);

        for fraction in [0.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            assert_eq!(interpolate(&forest, CellId(0), fraction), reference);
        }
    }

    #[test]
    fn test_half_density() {
        let forest = single(&[Spot::new(10, 0, 0, 0), Spot::new(14, 8, 0, 0)]);
        let dense = interpolate(&forest, CellId(0), 0.5);

        assert_eq!(
            dense,
            vec![
                Spot::new(10, 0, 0, 0),
                Spot::synthetic(12, 4, 0, 0),
                Spot::new(14, 8, 0, 0),
            ]
        );
    }

    #[test]
    fn test_consecutive_frames_need_nothing() {
        let spots = [Spot::new(5, 0, 0, 0), Spot::new(6, 3, 3, 3)];
        let forest = single(&spots);
        assert_eq!(interpolate(&forest, CellId(0), 1.0), spots.to_vec());
    }

    #[test]
    fn test_division_spot_with_two_daughters() {
        use DaughterFlag::{Absent, Present};

        let forest = LineageForest::from_cells(vec![
            tracked("M", Present, Absent, &[Spot::new(1, 0, 0, 0), Spot::new(4, 30, 30, 3)]),
            tracked("Ma", Absent, Present, &[Spot::new(8, 60, 0, 6)]),
            tracked("Mb", Absent, Absent, &[Spot::new(9, 0, 60, 0)]),
        ]);

        // "Ma" and "Mb" share the birth time derived from the name length
        let mother = forest.get("M").unwrap();
        assert_eq!(forest.children(mother).len(), 2);

        let spot = division_spot(&forest, mother).unwrap();
        assert_eq!(spot, Spot::synthetic(7, 30, 30, 3));

        let dense = interpolate(&forest, mother, 1.0);
        let frames: Vec<u32> = dense.iter().map(|s| s.frame).collect();
        assert_eq!(frames, vec![1, 2, 3, 4, 5, 6, 7]);
        // Stored trajectory is untouched
        assert_eq!(forest.trajectory(mother).len(), 2);
    }

    #[test]
    fn test_division_spot_needs_valid_daughters() {
        use DaughterFlag::{Absent, Present};

        let forest = LineageForest::from_cells(vec![
            tracked("M", Present, Absent, &[Spot::new(1, 0, 0, 0)]),
            tracked("Ma", Absent, Present, &[]),
            tracked("Mb", Absent, Absent, &[Spot::new(9, 0, 60, 0)]),
        ]);

        let mother = forest.get("M").unwrap();
        assert_eq!(division_spot(&forest, mother), None);
        assert_eq!(interpolate(&forest, mother, 1.0).len(), 1);
    }

    #[test]
    fn test_division_spot_collision_is_skipped() {
        use DaughterFlag::{Absent, Present};

        let forest = LineageForest::from_cells(vec![
            tracked("M", Present, Absent, &[Spot::new(1, 0, 0, 0), Spot::new(5, 2, 2, 2)]),
            tracked("D", Absent, Absent, &[Spot::new(6, 4, 4, 4)]),
        ]);

        let mother = forest.get("M").unwrap();
        assert_eq!(division_spot(&forest, mother), None);
        assert_eq!(interpolate(&forest, mother, 1.0).len(), 5);
    }

    #[test]
    fn test_early_division_spot_is_placed_in_frame_order() {
        use DaughterFlag::{Absent, Present};

        let forest = LineageForest::from_cells(vec![
            tracked("M", Present, Absent, &[Spot::new(1, 0, 0, 0), Spot::new(10, 90, 0, 0)]),
            tracked("D", Absent, Absent, &[Spot::new(6, 30, 30, 3)]),
        ]);

        let mother = forest.get("M").unwrap();
        let spot = Spot::synthetic(5, 60, 15, 2);
        assert_eq!(division_spot(&forest, mother), Some(spot));

        let dense = interpolate(&forest, mother, 1.0);
        let frames: Vec<u32> = dense.iter().map(|s| s.frame).collect();
        assert_eq!(frames, (1..=10).collect::<Vec<_>>());
        assert_eq!(dense[4], spot);
        assert_eq!(dense[9], Spot::new(10, 90, 0, 0));
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let forest = single(&[
            Spot::new(1, -2_000_000_000, i32::MIN, 0),
            Spot::new(3, 2_000_000_000, i32::MAX, 0),
        ]);
        let dense = interpolate(&forest, CellId(0), 1.0);

        assert_eq!(dense.len(), 3);
        assert_eq!(dense[1], Spot::synthetic(2, 0, 0, 0));
    }
}
