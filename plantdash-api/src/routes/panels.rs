//! Navigation and Panel Routes
//!
//! - GET /api/v1/navigation - the five panels in navigation order
//! - GET /api/v1/panels/:panel - render one panel by slug or label

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use plantdash_core::{Panel, PlantSearchFilter};
use serde::{Deserialize, Serialize};

use crate::cached_db::CachedDashboard;
use crate::error::ApiResult;
use crate::middleware::CurrentUser;
use crate::panels::{dispatch, PanelView};
use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationItem {
    pub panel: Panel,
    pub label: String,
    pub slug: String,
}

impl From<Panel> for NavigationItem {
    fn from(panel: Panel) -> Self {
        Self {
            panel,
            label: panel.label().to_string(),
            slug: panel.slug().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationResponse {
    pub items: Vec<NavigationItem>,
    /// Slug of the panel shown first.
    pub default: String,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/v1/navigation
pub async fn navigation() -> Json<NavigationResponse> {
    Json(NavigationResponse {
        items: Panel::ALL.into_iter().map(NavigationItem::from).collect(),
        default: Panel::default().slug().to_string(),
    })
}

/// GET /api/v1/panels/:panel
///
/// Search selections come from the query string, e.g.
/// `?fuel=Coal&manufacturer=ABB`. Other panels ignore them.
pub async fn render_panel(
    State(dashboard): State<CachedDashboard>,
    current: CurrentUser,
    Path(panel): Path<String>,
    Query(filter): Query<PlantSearchFilter>,
) -> ApiResult<Json<PanelView>> {
    let panel: Panel = panel.parse()?;
    tracing::debug!(
        panel = panel.slug(),
        username = %current.session.user.username,
        "panel requested"
    );
    let view = dispatch(panel, &dashboard, &filter).await?;
    Ok(Json(view))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/navigation", get(navigation))
        .route("/panels/:panel", get(render_panel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_navigation_lists_five_panels_default_first() {
        let Json(nav) = navigation().await;
        let labels: Vec<_> = nav.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "Search Plants By Name",
                "Call Directory Overview",
                "All Plants",
                "Sales Activity",
                "Outtages",
            ]
        );
        assert_eq!(nav.default, "search-plants");
    }
}
