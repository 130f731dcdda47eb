//! Property-Based Tests for Plant Search
//!
//! For any combination of dropdown selections, the search panel SHALL only
//! show plants matching every active selection, SHALL keep the summary's
//! row order, and SHALL never show more plants than the unfiltered view.

use std::sync::Arc;

use plantdash_api::{dispatch, CachedDashboard, CacheTtls, PanelView};
use plantdash_core::{CellValue, Panel, PlantSearchFilter};
use plantdash_storage::QueryCache;
use proptest::prelude::*;
use tokio::runtime::Runtime;

#[path = "support/source.rs"]
mod test_source_support;
use test_source_support::FakeSource;

// ============================================================================
// TEST CONFIGURATION
// ============================================================================

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

fn test_dashboard() -> CachedDashboard {
    CachedDashboard::new(
        Arc::new(FakeSource::default()),
        QueryCache::in_memory(),
        CacheTtls::default(),
    )
}

async fn search(
    dashboard: &CachedDashboard,
    filter: &PlantSearchFilter,
) -> Result<PanelView, TestCaseError> {
    dispatch(Panel::SearchPlants, dashboard, filter)
        .await
        .map_err(|e| TestCaseError::fail(format!("search failed: {}", e)))
}

fn column(view: &PanelView, name: &str) -> Vec<CellValue> {
    match view.table.column_index(name) {
        Ok(idx) => view.table.rows().iter().map(|row| row[idx].clone()).collect(),
        Err(_) => Vec::new(),
    }
}

// ============================================================================
// PROPERTY TEST STRATEGIES
// ============================================================================

/// A dropdown value: unset, the "All" sentinel, a known option, or noise.
fn selection_strategy(known: &'static [&'static str]) -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("All".to_string())),
        Just(Some(String::new())),
        proptest::sample::select(known).prop_map(|s| Some(s.to_string())),
        "[A-Z][a-z]{2,8}".prop_map(Some),
    ]
}

fn filter_strategy() -> impl Strategy<Value = PlantSearchFilter> {
    (
        selection_strategy(&["Barry", "Crist", "Smith", "Scholz"]),
        selection_strategy(&["Coal", "Gas"]),
        selection_strategy(&["ABB", "Siemens"]),
        selection_strategy(&["AC", "DC"]),
    )
        .prop_map(|(plant, fuel, manufacturer, drive_type)| PlantSearchFilter {
            plant,
            fuel,
            manufacturer,
            drive_type,
        })
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_search_rows_match_every_selection(filter in filter_strategy()) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let dashboard = test_dashboard();
            let all = search(&dashboard, &PlantSearchFilter::default()).await?;
            let view = search(&dashboard, &filter).await?;

            let names = column(&view, "Plant Name");
            let fuels = column(&view, "Primary Fuel");
            prop_assert!(names.len() <= all.table.len());

            if let Some(plant) = filter.plant() {
                prop_assert!(names.iter().all(|n| n.as_text() == Some(plant)));
            }
            if let Some(fuel) = filter.fuel() {
                prop_assert!(fuels.iter().all(|f| f.as_text() == Some(fuel)));
            }

            // Surviving rows keep the unfiltered order.
            let all_names = column(&all, "Plant Name");
            let positions: Vec<usize> = names
                .iter()
                .filter_map(|n| all_names.iter().position(|a| a == n))
                .collect();
            prop_assert_eq!(positions.len(), names.len());
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));

            prop_assert_eq!(view.filters.as_ref().map(|f| &f.applied), Some(&filter));
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_unfiltered_selections_return_the_full_summary(
        plant in prop_oneof![Just(None), Just(Some("All".to_string())), Just(Some("  ".to_string()))],
        fuel in prop_oneof![Just(None), Just(Some("All".to_string()))],
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let dashboard = test_dashboard();
            let filter = PlantSearchFilter { plant, fuel, ..PlantSearchFilter::default() };
            let all = search(&dashboard, &PlantSearchFilter::default()).await?;
            let view = search(&dashboard, &filter).await?;
            prop_assert_eq!(view.table, all.table);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
