//! SQL text and the display column mapping of every dashboard query.
//!
//! This is the only module that knows table and column names. The cache and
//! the view-model builders only see operation ids and [`RawTable`]s.
//!
//! [`RawTable`]: plantdash_core::RawTable

/// A named, parameterless query whose result is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableQuery {
    PlantNames,
    FuelTypes,
    DriveManufacturers,
    DriveTypes,
    PlantSummary,
    CallDirectory,
    AllPlants,
    SalesActivity,
    Outages,
}

impl TableQuery {
    pub const ALL: [TableQuery; 9] = [
        TableQuery::PlantNames,
        TableQuery::FuelTypes,
        TableQuery::DriveManufacturers,
        TableQuery::DriveTypes,
        TableQuery::PlantSummary,
        TableQuery::CallDirectory,
        TableQuery::AllPlants,
        TableQuery::SalesActivity,
        TableQuery::Outages,
    ];

    /// Stable id used for metrics and logging.
    pub fn operation_id(self) -> &'static str {
        match self {
            TableQuery::PlantNames => "plant_names",
            TableQuery::FuelTypes => "fuel_types",
            TableQuery::DriveManufacturers => "drive_manufacturers",
            TableQuery::DriveTypes => "drive_types",
            TableQuery::PlantSummary => "plant_summary",
            TableQuery::CallDirectory => "call_directory",
            TableQuery::AllPlants => "all_plants",
            TableQuery::SalesActivity => "sales_activity",
            TableQuery::Outages => "outages",
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            TableQuery::PlantNames => PLANT_NAMES_SQL,
            TableQuery::FuelTypes => FUEL_TYPES_SQL,
            TableQuery::DriveManufacturers => DRIVE_MANUFACTURERS_SQL,
            TableQuery::DriveTypes => DRIVE_TYPES_SQL,
            TableQuery::PlantSummary => PLANT_SUMMARY_SQL,
            TableQuery::CallDirectory => CALL_DIRECTORY_SQL,
            TableQuery::AllPlants => ALL_PLANTS_SQL,
            TableQuery::SalesActivity => SALES_ACTIVITY_SQL,
            TableQuery::Outages => OUTAGES_SQL,
        }
    }

    /// The column holding the option values, for the four dropdown queries.
    pub fn option_column(self) -> Option<&'static str> {
        match self {
            TableQuery::PlantNames => Some("plantname"),
            TableQuery::FuelTypes => Some("fuel_type_1"),
            TableQuery::DriveManufacturers => Some("drive_manufacturer"),
            TableQuery::DriveTypes => Some("drive_info"),
            _ => None,
        }
    }
}

// ============================================================================
// FILTER OPTIONS
// ============================================================================

pub const PLANT_NAMES_SQL: &str = "\
    SELECT DISTINCT plantname FROM general_plant_info \
    WHERE plantname IS NOT NULL ORDER BY plantname";

pub const FUEL_TYPES_SQL: &str = "\
    SELECT DISTINCT fuel_type_1 FROM general_plant_info \
    WHERE fuel_type_1 IS NOT NULL ORDER BY fuel_type_1";

pub const DRIVE_MANUFACTURERS_SQL: &str = "\
    SELECT DISTINCT drive_manufacturer FROM plant_drive_info \
    WHERE drive_manufacturer IS NOT NULL ORDER BY drive_manufacturer";

pub const DRIVE_TYPES_SQL: &str = "\
    SELECT DISTINCT drive_info FROM plant_drive_info \
    WHERE drive_info IS NOT NULL ORDER BY drive_info";

// ============================================================================
// PLANT SEARCH
// ============================================================================

/// Plants having at least one contact and one drive, with both counts.
pub const PLANT_SUMMARY_SQL: &str = "
    SELECT
        g.plant_id,
        g.plantname,
        g.ownername,
        g.company_city,
        g.company_state,
        g.fuel_type_1,
        COUNT(DISTINCT c.cont_id) AS contact_count,
        COUNT(DISTINCT d.drive_id) AS drive_count
    FROM general_plant_info g
    INNER JOIN contact_plant_info c ON g.plant_id = c.plant_id
    INNER JOIN plant_drive_info d ON g.plant_id = d.plant_id
    GROUP BY g.plant_id, g.plantname, g.ownername, g.company_address,
             g.company_city, g.company_state, g.fuel_type_1
    ORDER BY g.plantname ASC";

/// Plant ids carrying a drive that matches the manufacturer and type
/// selections. A NULL parameter matches every row.
pub const DRIVE_MATCHES_SQL: &str = "
    SELECT DISTINCT plant_id
    FROM plant_drive_info
    WHERE ($1::text IS NULL OR drive_manufacturer = $1)
      AND ($2::text IS NULL OR drive_info = $2)";

// ============================================================================
// OTHER PANELS
// ============================================================================

pub const CALL_DIRECTORY_SQL: &str = "
    SELECT
        g.plant_id,
        g.plantname,
        c.cont_name,
        c.cont_title,
        c.cont_phone,
        c.cont_email
    FROM contact_plant_info c
    INNER JOIN general_plant_info g ON g.plant_id = c.plant_id
    ORDER BY g.plantname ASC, c.cont_name ASC";

pub const CALL_DIRECTORY_COLUMNS: &[(&str, &str)] = &[
    ("plantname", "Plant Name"),
    ("cont_name", "Contact"),
    ("cont_title", "Title"),
    ("cont_phone", "Phone"),
    ("cont_email", "Email"),
];

pub const ALL_PLANTS_SQL: &str = "
    SELECT
        plant_id,
        plantname,
        ownername,
        company_address,
        company_city,
        company_state,
        fuel_type_1
    FROM general_plant_info
    ORDER BY plantname ASC";

pub const ALL_PLANTS_COLUMNS: &[(&str, &str)] = &[
    ("plantname", "Plant Name"),
    ("ownername", "Owner Name"),
    ("company_address", "Address"),
    ("company_city", "City"),
    ("company_state", "State"),
    ("fuel_type_1", "Primary Fuel"),
];

pub const SALES_ACTIVITY_SQL: &str = "
    SELECT
        s.plant_id,
        g.plantname,
        s.activity_date,
        s.activity_type,
        s.sales_rep,
        s.notes
    FROM sales_activity s
    INNER JOIN general_plant_info g ON g.plant_id = s.plant_id
    ORDER BY s.activity_date DESC, g.plantname ASC";

pub const SALES_ACTIVITY_COLUMNS: &[(&str, &str)] = &[
    ("plantname", "Plant Name"),
    ("activity_date", "Date"),
    ("activity_type", "Activity"),
    ("sales_rep", "Sales Rep"),
    ("notes", "Notes"),
];

pub const OUTAGES_SQL: &str = "
    SELECT
        o.plant_id,
        g.plantname,
        o.unit_name,
        o.outage_type,
        o.outage_start,
        o.outage_end,
        o.description
    FROM plant_outages o
    INNER JOIN general_plant_info g ON g.plant_id = o.plant_id
    ORDER BY o.outage_start DESC, g.plantname ASC";

pub const OUTAGES_COLUMNS: &[(&str, &str)] = &[
    ("plantname", "Plant Name"),
    ("unit_name", "Unit"),
    ("outage_type", "Type"),
    ("outage_start", "Start"),
    ("outage_end", "End"),
    ("description", "Description"),
];

// ============================================================================
// LOGIN
// ============================================================================

pub const FIND_USER_SQL: &str = "
    SELECT username, full_name, role, password_hash
    FROM dashboard_users
    WHERE username = $1";
