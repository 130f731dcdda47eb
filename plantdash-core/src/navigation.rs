//! Dashboard navigation.
//!
//! The dashboard has a closed set of five panels. Labels are what the user
//! sees; slugs are what appear in URLs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ViewError;

/// One dashboard screen bound to one navigation label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    #[default]
    SearchPlants,
    CallDirectory,
    AllPlants,
    SalesActivity,
    Outages,
}

impl Panel {
    /// Every panel, in navigation order.
    pub const ALL: [Panel; 5] = [
        Panel::SearchPlants,
        Panel::CallDirectory,
        Panel::AllPlants,
        Panel::SalesActivity,
        Panel::Outages,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Panel::SearchPlants => "Search Plants By Name",
            Panel::CallDirectory => "Call Directory Overview",
            Panel::AllPlants => "All Plants",
            Panel::SalesActivity => "Sales Activity",
            Panel::Outages => "Outtages",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Panel::SearchPlants => "search-plants",
            Panel::CallDirectory => "call-directory",
            Panel::AllPlants => "all-plants",
            Panel::SalesActivity => "sales-activity",
            Panel::Outages => "outages",
        }
    }

    /// Resolve a navigation label exactly as displayed.
    pub fn from_label(label: &str) -> Result<Self, ViewError> {
        Self::ALL
            .into_iter()
            .find(|p| p.label() == label)
            .ok_or_else(|| ViewError::UnknownPanel {
                label: label.to_string(),
            })
    }

    pub fn from_slug(slug: &str) -> Result<Self, ViewError> {
        Self::ALL
            .into_iter()
            .find(|p| p.slug() == slug)
            .ok_or_else(|| ViewError::UnknownPanel {
                label: slug.to_string(),
            })
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either a label or a slug.
impl FromStr for Panel {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).or_else(|_| Self::from_slug(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_is_first_label() {
        assert_eq!(Panel::default(), Panel::ALL[0]);
        assert_eq!(Panel::default().label(), "Search Plants By Name");
    }

    #[test]
    fn test_labels_and_slugs_are_unique() {
        let labels: HashSet<_> = Panel::ALL.iter().map(|p| p.label()).collect();
        let slugs: HashSet<_> = Panel::ALL.iter().map(|p| p.slug()).collect();
        assert_eq!(labels.len(), 5);
        assert_eq!(slugs.len(), 5);
    }

    #[test]
    fn test_parse_round_trips_for_every_panel() {
        for panel in Panel::ALL {
            assert_eq!(panel.label().parse::<Panel>().unwrap(), panel);
            assert_eq!(panel.slug().parse::<Panel>().unwrap(), panel);
        }
    }

    #[test]
    fn test_unknown_label_is_an_error() {
        let err = "Weather".parse::<Panel>().unwrap_err();
        assert_eq!(
            err,
            ViewError::UnknownPanel {
                label: "Weather".to_string()
            }
        );
        // Labels are matched exactly.
        assert!(Panel::from_label("all plants").is_err());
    }
}
