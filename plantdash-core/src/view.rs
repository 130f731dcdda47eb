//! View-model builders.
//!
//! Pure functions turning [`RawTable`]s into what the panels display. Input
//! tables are never mutated and row order is always preserved.

use serde::{Deserialize, Serialize};

use crate::table::{CellValue, DisplayTable, RawTable};
use crate::ViewError;

/// Sentinel option meaning "apply no filter on this column".
pub const ALL_OPTION: &str = "All";

/// Storage → display column names for the plant summary.
pub const PLANT_SUMMARY_COLUMNS: &[(&str, &str)] = &[
    ("plantname", "Plant Name"),
    ("ownername", "Owner Name"),
    ("company_city", "City"),
    ("company_state", "State"),
    ("fuel_type_1", "Primary Fuel"),
    ("contact_count", "Contacts"),
    ("drive_count", "Drives"),
];

const CONTACT_COUNT: &str = "contact_count";
const DRIVE_COUNT: &str = "drive_count";

// ============================================================================
// FILTER OPTIONS
// ============================================================================

/// Ordered dropdown options for one column, always led by [`ALL_OPTION`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FilterOptionSet(Vec<String>);

impl FilterOptionSet {
    /// The degraded option set: nothing but the sentinel.
    pub fn all_only() -> Self {
        Self(vec![ALL_OPTION.to_string()])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Options after the sentinel.
    pub fn values(&self) -> &[String] {
        &self.0[1..]
    }

    pub fn contains(&self, option: &str) -> bool {
        self.0.iter().any(|o| o == option)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true: the sentinel is always present.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for FilterOptionSet {
    fn default() -> Self {
        Self::all_only()
    }
}

impl TryFrom<Vec<String>> for FilterOptionSet {
    type Error = String;

    fn try_from(options: Vec<String>) -> Result<Self, Self::Error> {
        match options.first() {
            Some(first) if first == ALL_OPTION => Ok(Self(options)),
            _ => Err(format!("filter options must start with \"{}\"", ALL_OPTION)),
        }
    }
}

impl From<FilterOptionSet> for Vec<String> {
    fn from(options: FilterOptionSet) -> Self {
        options.0
    }
}

/// The four dropdowns of the plant search panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantFilterOptions {
    pub plants: FilterOptionSet,
    pub fuels: FilterOptionSet,
    pub manufacturers: FilterOptionSet,
    pub drive_types: FilterOptionSet,
}

impl PlantFilterOptions {
    pub fn all_only() -> Self {
        Self::default()
    }
}

/// Build dropdown options from one column of a query result.
///
/// Non-null values are taken in the order the store returned them and
/// prefixed with [`ALL_OPTION`]. No sorting or de-duplication happens here;
/// the query is expected to `SELECT DISTINCT ... ORDER BY`.
pub fn build_filter_options(
    raw: &RawTable,
    key_column: &str,
) -> Result<FilterOptionSet, ViewError> {
    let mut options = vec![ALL_OPTION.to_string()];
    options.extend(
        raw.column(key_column)?
            .filter(|cell| !cell.is_null())
            .map(|cell| match cell {
                CellValue::Text(s) => s.clone(),
                other => other.to_string(),
            }),
    );
    Ok(FilterOptionSet(options))
}

// ============================================================================
// RENAMING
// ============================================================================

/// Rename columns via a fixed storage → display mapping.
///
/// Columns absent from the mapping keep their storage name. Cells are copied
/// verbatim.
pub fn rename_columns(raw: &RawTable, mapping: &[(&str, &str)]) -> DisplayTable {
    let columns = raw
        .columns()
        .iter()
        .map(|column| {
            mapping
                .iter()
                .find(|(from, _)| from == column)
                .map_or_else(|| column.clone(), |(_, to)| (*to).to_string())
        })
        .collect();
    DisplayTable::from_parts(columns, raw.rows().to_vec())
}

fn has_positive_count(cell: &CellValue) -> bool {
    cell.as_i64().is_some_and(|n| n > 0)
}

/// Build the plant summary view.
///
/// Applies [`PLANT_SUMMARY_COLUMNS`] and drops any plant lacking a contact
/// or a drive. Counts are passed through unchanged.
pub fn build_plant_summary(raw: &RawTable) -> Result<DisplayTable, ViewError> {
    let contacts = raw.column_index(CONTACT_COUNT)?;
    let drives = raw.column_index(DRIVE_COUNT)?;

    let mut table = rename_columns(raw, PLANT_SUMMARY_COLUMNS);
    table.retain_rows(|row| has_positive_count(&row[contacts]) && has_positive_count(&row[drives]));
    Ok(table)
}

// ============================================================================
// PLANT SEARCH FILTER
// ============================================================================

/// Dropdown selections on the plant search panel.
///
/// `None`, an empty string, and [`ALL_OPTION`] all mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantSearchFilter {
    pub plant: Option<String>,
    pub fuel: Option<String>,
    pub manufacturer: Option<String>,
    pub drive_type: Option<String>,
}

fn selection(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != ALL_OPTION)
}

impl PlantSearchFilter {
    pub fn plant(&self) -> Option<&str> {
        selection(&self.plant)
    }

    pub fn fuel(&self) -> Option<&str> {
        selection(&self.fuel)
    }

    pub fn manufacturer(&self) -> Option<&str> {
        selection(&self.manufacturer)
    }

    pub fn drive_type(&self) -> Option<&str> {
        selection(&self.drive_type)
    }

    /// Whether drive-level selections require a lookup of matching plants.
    pub fn needs_drive_lookup(&self) -> bool {
        self.manufacturer().is_some() || self.drive_type().is_some()
    }

    pub fn is_unfiltered(&self) -> bool {
        self.plant().is_none() && self.fuel().is_none() && !self.needs_drive_lookup()
    }
}

/// Narrow a plant summary to the current selections.
///
/// `drive_matches` holds the `plant_id`s whose drives match the drive-level
/// selections; pass `None` when no drive selection is active.
pub fn apply_plant_filter(
    summary: &DisplayTable,
    filter: &PlantSearchFilter,
    drive_matches: Option<&[CellValue]>,
) -> Result<DisplayTable, ViewError> {
    let mut table = summary.clone();
    if filter.is_unfiltered() && drive_matches.is_none() {
        return Ok(table);
    }

    let plant_col = table.column_index("Plant Name")?;
    let fuel_col = table.column_index("Primary Fuel")?;
    let id_col = match drive_matches {
        Some(_) => Some(table.column_index("plant_id")?),
        None => None,
    };

    let plant = filter.plant();
    let fuel = filter.fuel();
    table.retain_rows(|row| {
        let plant_ok = plant.map_or(true, |p| row[plant_col].as_text() == Some(p));
        let fuel_ok = fuel.map_or(true, |f| row[fuel_col].as_text() == Some(f));
        let drive_ok = match (id_col, drive_matches) {
            (Some(idx), Some(ids)) => ids.contains(&row[idx]),
            _ => true,
        };
        plant_ok && fuel_ok && drive_ok
    });
    Ok(table)
}
