use crate::core::register::SampleRegister;
use crate::domain::model::{
    DestinationAssignment, DestinationPlan, PoolSettings, PoolWarning, SampleRow,
};
use crate::domain::ports::PositionDirectory;
use crate::utils::error::{PoolError, Result};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub plan: DestinationPlan,
    pub warnings: Vec<PoolWarning>,
}

/// Assigns every distinct sample one destination well.
///
/// Slot `n` with start offset `s` lands at zero-based absolute index
/// `(n - 1) + (s - 1)`; the plate instance and 1-based well are derived from
/// that index so positions always stay inside `[1, capacity]`.
pub fn allocate<D>(rows: &[SampleRow], settings: &PoolSettings, directory: &D) -> Result<Allocation>
where
    D: PositionDirectory + ?Sized,
{
    let dest_type = settings.destination_labware_type.as_str();
    let capacity = directory
        .capacity(dest_type)
        .filter(|&wells| wells > 0)
        .ok_or_else(|| PoolError::unknown_labware(dest_type))?;

    if settings.destination_start_offset < 1 {
        return Err(PoolError::InvalidConfigValueError {
            field: "destination_start_offset".to_string(),
            value: settings.destination_start_offset.to_string(),
            reason: "Starting position must be at least 1".to_string(),
        });
    }
    let offset = settings.destination_start_offset - 1;

    let register = SampleRegister::from_names(rows.iter().map(|row| row.sample_name.as_str()));
    let distinct = register.len();
    let plates_needed = if distinct == 0 {
        0
    } else {
        (distinct + offset).div_ceil(capacity)
    };

    let mut warnings = Vec::new();
    if plates_needed > 1 {
        let warning = PoolWarning::Overflow {
            distinct_samples: distinct,
            capacity,
            plates_needed,
        };
        tracing::warn!("{}", warning);
        warnings.push(warning);
    }

    let mut assignments = IndexMap::with_capacity(distinct);
    for (name, ordinal) in register.iter() {
        let absolute = ordinal - 1 + offset;
        let plate_instance = absolute / capacity + 1;
        let target_position = absolute % capacity + 1;

        // 多盤時每一盤都加上編號
        let labware_name = if plates_needed > 1 {
            format!("{} {}", settings.destination_labware_name, plate_instance)
        } else {
            settings.destination_labware_name.clone()
        };

        tracing::debug!(
            "Sample {} -> {} (plate {}) well {}",
            name,
            labware_name,
            plate_instance,
            target_position
        );

        assignments.insert(
            name.to_string(),
            DestinationAssignment {
                plate_instance,
                labware_name,
                labware_type: dest_type.to_string(),
                target_position,
            },
        );
    }

    Ok(Allocation {
        plan: DestinationPlan {
            assignments,
            capacity,
            plates_needed,
        },
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::labware::LabwareCatalog;
    use crate::domain::model::IncludeFlag;

    fn row(name: &str, position: usize) -> SampleRow {
        SampleRow {
            sample_name: name.to_string(),
            include_flag: IncludeFlag::Include,
            source_labware_name: "PCR plate 1".to_string(),
            source_labware_type: "96 Well Eppendorf TwinTec PCR".to_string(),
            source_position: position,
        }
    }

    fn settings(dest_type: &str, start: usize) -> PoolSettings {
        PoolSettings {
            destination_labware_type: dest_type.to_string(),
            destination_start_offset: start,
            ..PoolSettings::default()
        }
    }

    fn catalog() -> LabwareCatalog {
        LabwareCatalog::builtin().with_labware("Tiny 4 well", 2, 2)
    }

    fn distinct_rows(count: usize) -> Vec<SampleRow> {
        (1..=count).map(|i| row(&format!("S{}", i), i)).collect()
    }

    #[test]
    fn test_replicates_share_one_destination() {
        let rows = vec![row("A", 1), row("B", 2), row("A", 3)];
        let allocation = allocate(
            &rows,
            &settings("96 Well Eppendorf TwinTec PCR", 1),
            &catalog(),
        )
        .unwrap();

        let plan = &allocation.plan;
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.resolve("A").unwrap().target_position, 1);
        assert_eq!(plan.resolve("B").unwrap().target_position, 2);
        assert_eq!(plan.resolve("A").unwrap().plate_instance, 1);
        assert_eq!(plan.resolve("A").unwrap().labware_name, "Pooled DNA plate");
        assert!(allocation.warnings.is_empty());
    }

    #[test]
    fn test_wraparound_at_capacity_boundary() {
        let rows = distinct_rows(97);
        let allocation = allocate(
            &rows,
            &settings("96 Well Eppendorf TwinTec PCR", 1),
            &catalog(),
        )
        .unwrap();

        let last_on_first = allocation.plan.resolve("S96").unwrap();
        assert_eq!(last_on_first.target_position, 96);
        assert_eq!(last_on_first.plate_instance, 1);

        let first_on_second = allocation.plan.resolve("S97").unwrap();
        assert_eq!(first_on_second.target_position, 1);
        assert_eq!(first_on_second.plate_instance, 2);
    }

    #[test]
    fn test_overflow_records_warning_and_suffixes_names() {
        let rows = distinct_rows(5);
        let allocation = allocate(&rows, &settings("Tiny 4 well", 1), &catalog()).unwrap();

        let fifth = allocation.plan.resolve("S5").unwrap();
        assert_eq!(fifth.plate_instance, 2);
        assert_eq!(fifth.target_position, 1);
        assert_eq!(fifth.labware_name, "Pooled DNA plate 2");
        assert_eq!(
            allocation.plan.resolve("S1").unwrap().labware_name,
            "Pooled DNA plate 1"
        );
        assert_eq!(allocation.plan.plates_needed, 2);
        assert_eq!(
            allocation.warnings,
            vec![PoolWarning::Overflow {
                distinct_samples: 5,
                capacity: 4,
                plates_needed: 2
            }]
        );
    }

    #[test]
    fn test_start_offset_near_boundary_wraps() {
        // 從最後一格開始：第二個樣本必須換到下一盤的第 1 格
        let rows = distinct_rows(3);
        let allocation = allocate(&rows, &settings("Tiny 4 well", 4), &catalog()).unwrap();

        let first = allocation.plan.resolve("S1").unwrap();
        assert_eq!((first.plate_instance, first.target_position), (1, 4));
        let second = allocation.plan.resolve("S2").unwrap();
        assert_eq!((second.plate_instance, second.target_position), (2, 1));
        let third = allocation.plan.resolve("S3").unwrap();
        assert_eq!((third.plate_instance, third.target_position), (2, 2));
        assert_eq!(allocation.warnings.len(), 1);
    }

    #[test]
    fn test_start_offset_shifts_positions() {
        let rows = distinct_rows(2);
        let allocation = allocate(
            &rows,
            &settings("96 Well Eppendorf TwinTec PCR", 10),
            &catalog(),
        )
        .unwrap();

        assert_eq!(allocation.plan.resolve("S1").unwrap().target_position, 10);
        assert_eq!(allocation.plan.resolve("S2").unwrap().target_position, 11);
        assert!(allocation.warnings.is_empty());
    }

    #[test]
    fn test_slots_are_unique() {
        let rows = distinct_rows(10);
        let allocation = allocate(&rows, &settings("Tiny 4 well", 3), &catalog()).unwrap();

        let mut seen = std::collections::HashSet::new();
        for assignment in allocation.plan.assignments.values() {
            assert!(assignment.target_position >= 1 && assignment.target_position <= 4);
            assert!(seen.insert((assignment.plate_instance, assignment.target_position)));
        }
    }

    #[test]
    fn test_unknown_destination_type_fails() {
        let rows = distinct_rows(2);
        let err = allocate(&rows, &settings("Mystery plate", 1), &catalog()).unwrap_err();
        assert!(matches!(err, PoolError::UnknownLabware { .. }));
    }

    #[test]
    fn test_zero_start_offset_is_rejected() {
        let rows = distinct_rows(1);
        let err = allocate(
            &rows,
            &settings("96 Well Eppendorf TwinTec PCR", 0),
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_no_rows_yields_empty_plan() {
        let allocation = allocate(
            &[],
            &settings("96 Well Eppendorf TwinTec PCR", 1),
            &catalog(),
        )
        .unwrap();
        assert!(allocation.plan.is_empty());
        assert_eq!(allocation.plan.plates_needed, 0);
    }
}
