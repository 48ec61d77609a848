use crate::domain::model::{DestinationPlan, PlateGeometry};

/// Well count of the densest plate format the device addresses natively.
pub const HIGH_DENSITY_WELLS: usize = 384;

/// Maps a linear (column-wise) well position to the device's addressing order.
///
/// Implementations must be bijections on `[1, geometry.wells()]`.
pub trait WellOrdering: Send + Sync {
    fn name(&self) -> &'static str;
    fn remap(&self, position: usize, geometry: &PlateGeometry) -> usize;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LinearOrdering;

impl WellOrdering for LinearOrdering {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn remap(&self, position: usize, _geometry: &PlateGeometry) -> usize {
        position
    }
}

/// Splits the plate into four half-density quadrants and interleaves them.
///
/// Logical positions fill quadrant 0 first (rows A,C,E.. of the odd columns),
/// then quadrant 1 (rows B,D,F.. of the odd columns), then quadrants 2 and 3 on
/// the even columns. Inside a quadrant the half grid is walked column-wise.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadrantInterleave;

impl QuadrantInterleave {
    pub fn supports(geometry: &PlateGeometry) -> bool {
        geometry.rows >= 2
            && geometry.columns >= 2
            && geometry.rows % 2 == 0
            && geometry.columns % 2 == 0
    }
}

impl WellOrdering for QuadrantInterleave {
    fn name(&self) -> &'static str {
        "quadrant-interleave"
    }

    fn remap(&self, position: usize, geometry: &PlateGeometry) -> usize {
        if !Self::supports(geometry) || position == 0 || position > geometry.wells() {
            return position;
        }
        let half_rows = geometry.rows / 2;
        let quadrant_size = geometry.wells() / 4;

        let index = position - 1;
        let quadrant = index / quadrant_size;
        let within = index % quadrant_size;
        let row = 2 * (within % half_rows) + quadrant % 2;
        let column = 2 * (within / half_rows) + quadrant / 2;

        column * geometry.rows + row + 1
    }
}

/// Picks the ordering for a plate geometry: interleaved for high-density plates,
/// linear otherwise.
pub fn ordering_for(geometry: &PlateGeometry) -> &'static dyn WellOrdering {
    if geometry.wells() >= HIGH_DENSITY_WELLS && QuadrantInterleave::supports(geometry) {
        &QuadrantInterleave
    } else {
        &LinearOrdering
    }
}

/// Rewrites every `target_position` in the plan through `ordering`.
pub fn reorder(
    mut plan: DestinationPlan,
    geometry: &PlateGeometry,
    ordering: &dyn WellOrdering,
) -> DestinationPlan {
    tracing::debug!(
        "Reordering {} destination wells with {} ordering",
        plan.len(),
        ordering.name()
    );
    for assignment in plan.assignments.values_mut() {
        assignment.target_position = ordering.remap(assignment.target_position, geometry);
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DestinationAssignment;
    use indexmap::IndexMap;
    use std::collections::HashSet;

    const PLATE_384: PlateGeometry = PlateGeometry {
        rows: 16,
        columns: 24,
    };
    const PLATE_96: PlateGeometry = PlateGeometry {
        rows: 8,
        columns: 12,
    };

    #[test]
    fn test_quadrant_interleave_is_a_permutation() {
        let mapped: HashSet<usize> = (1..=384)
            .map(|p| QuadrantInterleave.remap(p, &PLATE_384))
            .collect();
        assert_eq!(mapped.len(), 384);
        assert!(mapped.iter().all(|&p| (1..=384).contains(&p)));
    }

    #[test]
    fn test_quadrant_interleave_first_quadrant() {
        // A1, C1, E1 ... then A3
        assert_eq!(QuadrantInterleave.remap(1, &PLATE_384), 1);
        assert_eq!(QuadrantInterleave.remap(2, &PLATE_384), 3);
        assert_eq!(QuadrantInterleave.remap(8, &PLATE_384), 15);
        assert_eq!(QuadrantInterleave.remap(9, &PLATE_384), 33);
    }

    #[test]
    fn test_quadrant_interleave_later_quadrants() {
        // B1, D1 ... for quadrant 1, A2 for quadrant 2, B2 for quadrant 3
        assert_eq!(QuadrantInterleave.remap(97, &PLATE_384), 2);
        assert_eq!(QuadrantInterleave.remap(98, &PLATE_384), 4);
        assert_eq!(QuadrantInterleave.remap(193, &PLATE_384), 17);
        assert_eq!(QuadrantInterleave.remap(289, &PLATE_384), 18);
        assert_eq!(QuadrantInterleave.remap(384, &PLATE_384), 384);
    }

    #[test]
    fn test_ordering_for_geometry() {
        assert_eq!(ordering_for(&PLATE_96).name(), "linear");
        assert_eq!(ordering_for(&PLATE_384).name(), "quadrant-interleave");
        assert_eq!(ordering_for(&PlateGeometry::new(15, 24)).name(), "linear");
    }

    #[test]
    fn test_reorder_is_identity_for_linear() {
        let mut assignments = IndexMap::new();
        for (i, name) in ["A", "B", "C"].iter().enumerate() {
            assignments.insert(
                name.to_string(),
                DestinationAssignment {
                    plate_instance: 1,
                    labware_name: "Pooled DNA plate".to_string(),
                    labware_type: "96 Well Eppendorf TwinTec PCR".to_string(),
                    target_position: i + 1,
                },
            );
        }
        let plan = DestinationPlan {
            assignments,
            capacity: 96,
            plates_needed: 1,
        };

        let reordered = reorder(plan.clone(), &PLATE_96, ordering_for(&PLATE_96));
        assert_eq!(reordered, plan);

        let interleaved = reorder(plan, &PLATE_384, &QuadrantInterleave);
        let positions: Vec<usize> = interleaved
            .assignments
            .values()
            .map(|a| a.target_position)
            .collect();
        assert_eq!(positions, vec![1, 3, 5]);
    }
}
