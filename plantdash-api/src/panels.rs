//! Panel Router and Panels
//!
//! Each [`Panel`] has exactly one render action on [`PanelRenderer`];
//! [`dispatch`] is the total mapping between the two. Every panel reads
//! through the query cache and returns a [`PanelView`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use plantdash_core::{apply_plant_filter, DisplayTable, Panel, PlantFilterOptions, PlantSearchFilter};
use plantdash_storage::CacheRead;
use serde::Serialize;

use crate::cached_db::CachedDashboard;
use crate::error::ApiResult;
use crate::queries::{
    TableQuery, ALL_PLANTS_COLUMNS, CALL_DIRECTORY_COLUMNS, OUTAGES_COLUMNS,
    SALES_ACTIVITY_COLUMNS,
};

/// Prefix of the notice shown when the search dropdowns fail to load.
pub const DROPDOWN_ERROR_PREFIX: &str = "Error loading dropdown data";

// ============================================================================
// VIEW MODEL
// ============================================================================

/// Display-ready content of one panel.
#[derive(Debug, Clone, Serialize)]
pub struct PanelView {
    pub panel: Panel,
    pub label: &'static str,
    pub title: &'static str,
    pub table: DisplayTable,
    /// Dropdowns and current selections; plant search only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
    /// Inline messages for the user, such as a degraded dropdown load.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
    /// When the table data was last fetched from the database.
    pub refreshed_at: DateTime<Utc>,
    pub cache_hit: bool,
}

impl PanelView {
    fn from_read(panel: Panel, title: &'static str, read: CacheRead<DisplayTable>) -> Self {
        let refreshed_at = read.refreshed_at();
        let cache_hit = read.was_cache_hit();
        Self {
            panel,
            label: panel.label(),
            title,
            table: read.into_value(),
            filters: None,
            notices: Vec::new(),
            refreshed_at,
            cache_hit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchFilters {
    pub options: PlantFilterOptions,
    pub applied: PlantSearchFilter,
}

// ============================================================================
// ROUTER
// ============================================================================

/// One render action per panel.
#[async_trait]
pub trait PanelRenderer: Send + Sync {
    async fn search_plants(&self, filter: &PlantSearchFilter) -> ApiResult<PanelView>;

    async fn call_directory(&self) -> ApiResult<PanelView>;

    async fn all_plants(&self) -> ApiResult<PanelView>;

    async fn sales_activity(&self) -> ApiResult<PanelView>;

    async fn outages(&self) -> ApiResult<PanelView>;
}

/// Render `panel`. Exactly one handler runs for every panel.
pub async fn dispatch<R>(
    panel: Panel,
    renderer: &R,
    filter: &PlantSearchFilter,
) -> ApiResult<PanelView>
where
    R: PanelRenderer + ?Sized,
{
    tracing::debug!(panel = %panel, "rendering panel");
    match panel {
        Panel::SearchPlants => renderer.search_plants(filter).await,
        Panel::CallDirectory => renderer.call_directory().await,
        Panel::AllPlants => renderer.all_plants().await,
        Panel::SalesActivity => renderer.sales_activity().await,
        Panel::Outages => renderer.outages().await,
    }
}

// ============================================================================
// PANELS
// ============================================================================

#[async_trait]
impl PanelRenderer for CachedDashboard {
    /// Plant summary filtered by the dropdown selections.
    ///
    /// A failure loading the dropdowns degrades them to "All" only and adds a
    /// notice; the summary still renders. A summary failure is an error.
    async fn search_plants(&self, filter: &PlantSearchFilter) -> ApiResult<PanelView> {
        let mut notices = Vec::new();
        let options = match self.filter_options().await {
            Ok(read) => read.into_value(),
            Err(e) => {
                tracing::warn!(error = %e, "dropdown data unavailable, showing unfiltered options");
                notices.push(format!("{}: {}", DROPDOWN_ERROR_PREFIX, e.message));
                PlantFilterOptions::all_only()
            }
        };

        let summary = self.plant_summary().await?;
        let drive_matches = if filter.needs_drive_lookup() {
            Some(self.drive_matches(filter).await?)
        } else {
            None
        };
        let table = apply_plant_filter(summary.value(), filter, drive_matches.as_deref())?;

        Ok(PanelView {
            panel: Panel::SearchPlants,
            label: Panel::SearchPlants.label(),
            title: "Powerplants with Contacts & Drives",
            table,
            filters: Some(SearchFilters {
                options,
                applied: filter.clone(),
            }),
            notices,
            refreshed_at: summary.refreshed_at(),
            cache_hit: summary.was_cache_hit(),
        })
    }

    async fn call_directory(&self) -> ApiResult<PanelView> {
        let read = self
            .panel_table(TableQuery::CallDirectory, CALL_DIRECTORY_COLUMNS)
            .await?;
        Ok(PanelView::from_read(Panel::CallDirectory, "Call Directory", read))
    }

    async fn all_plants(&self) -> ApiResult<PanelView> {
        let read = self
            .panel_table(TableQuery::AllPlants, ALL_PLANTS_COLUMNS)
            .await?;
        Ok(PanelView::from_read(Panel::AllPlants, "All Power Plants", read))
    }

    async fn sales_activity(&self) -> ApiResult<PanelView> {
        let read = self
            .panel_table(TableQuery::SalesActivity, SALES_ACTIVITY_COLUMNS)
            .await?;
        Ok(PanelView::from_read(Panel::SalesActivity, "Sales Activity", read))
    }

    async fn outages(&self) -> ApiResult<PanelView> {
        let read = self
            .panel_table(TableQuery::Outages, OUTAGES_COLUMNS)
            .await?;
        Ok(PanelView::from_read(Panel::Outages, "Plant Outages", read))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records which handler ran.
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<Panel>>,
    }

    impl RecordingRenderer {
        fn record(&self, panel: Panel) -> ApiResult<PanelView> {
            self.calls.lock().unwrap().push(panel);
            Ok(PanelView {
                panel,
                label: panel.label(),
                title: "",
                table: DisplayTable::default(),
                filters: None,
                notices: Vec::new(),
                refreshed_at: Utc::now(),
                cache_hit: false,
            })
        }
    }

    #[async_trait]
    impl PanelRenderer for RecordingRenderer {
        async fn search_plants(&self, _filter: &PlantSearchFilter) -> ApiResult<PanelView> {
            self.record(Panel::SearchPlants)
        }
        async fn call_directory(&self) -> ApiResult<PanelView> {
            self.record(Panel::CallDirectory)
        }
        async fn all_plants(&self) -> ApiResult<PanelView> {
            self.record(Panel::AllPlants)
        }
        async fn sales_activity(&self) -> ApiResult<PanelView> {
            self.record(Panel::SalesActivity)
        }
        async fn outages(&self) -> ApiResult<PanelView> {
            self.record(Panel::Outages)
        }
    }

    #[tokio::test]
    async fn test_each_label_runs_exactly_one_handler() -> ApiResult<()> {
        for panel in Panel::ALL {
            let renderer = RecordingRenderer::default();
            let resolved = Panel::from_label(panel.label())?;
            let view = dispatch(resolved, &renderer, &PlantSearchFilter::default()).await?;

            assert_eq!(view.panel, panel);
            assert_eq!(*renderer.calls.lock().unwrap(), vec![panel]);
        }
        Ok(())
    }

    #[test]
    fn test_panel_view_omits_empty_sections() -> Result<(), serde_json::Error> {
        let view = PanelView {
            panel: Panel::Outages,
            label: Panel::Outages.label(),
            title: "Plant Outages",
            table: DisplayTable::default(),
            filters: None,
            notices: Vec::new(),
            refreshed_at: Utc::now(),
            cache_hit: true,
        };
        let json = serde_json::to_value(&view)?;
        assert_eq!(json["panel"], "outages");
        assert_eq!(json["label"], "Outtages");
        assert!(json.get("filters").is_none());
        assert!(json.get("notices").is_none());
        Ok(())
    }
}
