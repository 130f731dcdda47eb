//! Property-Based Tests for View-Model Builders
//!
//! **Property 1: Filter Options**
//!
//! For any column of nullable strings, the option set starts with "All" and
//! is followed by exactly the non-null values in source order.
//!
//! **Property 2: Plant Summary Inner-Join Semantics**
//!
//! For any plant rows, the summary keeps exactly the plants having at least
//! one contact and at least one drive, in input order, with counts unchanged.

use plantdash_core::{
    build_filter_options, build_plant_summary, CellValue, RawTable, ALL_OPTION,
};
use proptest::prelude::*;

fn nullable_name() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        1 => Just(None),
        4 => "[A-Z][a-z]{0,8}( [A-Z][a-z]{0,8})?".prop_map(Some),
    ]
}

#[derive(Debug, Clone)]
struct PlantRow {
    id: i64,
    name: String,
    contacts: Option<i64>,
    drives: Option<i64>,
}

fn plant_row() -> impl Strategy<Value = PlantRow> {
    (
        1i64..10_000,
        "Plant [A-Z]{1,3}",
        prop::option::weighted(0.9, 0i64..5),
        prop::option::weighted(0.9, 0i64..5),
    )
        .prop_map(|(id, name, contacts, drives)| PlantRow {
            id,
            name,
            contacts,
            drives,
        })
}

fn summary_table(rows: &[PlantRow]) -> RawTable {
    let cells = rows
        .iter()
        .map(|r| {
            vec![
                CellValue::Int(r.id),
                CellValue::from(r.name.as_str()),
                CellValue::from("Owner"),
                CellValue::from("City"),
                CellValue::from("ST"),
                CellValue::from("Gas"),
                CellValue::from(r.contacts),
                CellValue::from(r.drives),
            ]
        })
        .collect();
    RawTable::with_rows(
        [
            "plant_id",
            "plantname",
            "ownername",
            "company_city",
            "company_state",
            "fuel_type_1",
            "contact_count",
            "drive_count",
        ],
        cells,
    )
    .expect("rows match column count")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_filter_options_are_sentinel_plus_non_nulls(values in prop::collection::vec(nullable_name(), 0..50)) {
        let raw = RawTable::with_rows(
            ["fuel_type_1"],
            values.iter().cloned().map(|v| vec![CellValue::from(v)]).collect(),
        ).expect("single column rows");

        let options = build_filter_options(&raw, "fuel_type_1").expect("column exists");
        let expected: Vec<String> = values.into_iter().flatten().collect();

        prop_assert_eq!(options.as_slice()[0].as_str(), ALL_OPTION);
        prop_assert_eq!(options.values(), expected.as_slice());
    }

    #[test]
    fn prop_summary_keeps_only_plants_with_contacts_and_drives(rows in prop::collection::vec(plant_row(), 0..40)) {
        let raw = summary_table(&rows);
        let summary = build_plant_summary(&raw).expect("summary columns exist");

        let expected: Vec<&PlantRow> = rows
            .iter()
            .filter(|r| r.contacts.unwrap_or(0) > 0 && r.drives.unwrap_or(0) > 0)
            .collect();

        prop_assert_eq!(summary.len(), expected.len());
        for (row, want) in summary.rows().iter().zip(expected) {
            prop_assert_eq!(&row[0], &CellValue::Int(want.id));
            prop_assert_eq!(&row[6], &CellValue::from(want.contacts));
            prop_assert_eq!(&row[7], &CellValue::from(want.drives));
        }
    }

    #[test]
    fn prop_builders_are_deterministic(rows in prop::collection::vec(plant_row(), 0..20)) {
        let raw = summary_table(&rows);
        let first = build_plant_summary(&raw).expect("summary columns exist");
        let second = build_plant_summary(&raw).expect("summary columns exist");
        prop_assert_eq!(first, second);
    }
}
