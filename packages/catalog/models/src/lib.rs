#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Catalog and crime-fact row types.
//!
//! These types mirror the reference tables (periods, population, place and
//! crime-group taxonomies) and the crime-fact table as they are stored in
//! either backing store. Physical table and column names are kept exactly
//! as the upstream data loads them, so field names are mapped with
//! `#[serde(rename)]`.

pub mod filter;
pub mod period;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use filter::{Comparison, Condition, FactFilter, FilterValue, Row, RowFilter};
pub use period::{InvalidPeriodError, Period};

/// Place code of the pre-aggregated nationwide series.
pub const NATIONAL_PLACE_CODE: &str = "P00";

/// Returns the place code of the pre-aggregated series for a state.
#[must_use]
pub fn state_aggregate_code(state_code: &str) -> String {
    format!("E{state_code}")
}

/// Physical column names shared by several tables.
pub mod columns {
    /// Year-month period (`YYYYMM`).
    pub const PERIOD: &str = "Aniomes";
    /// Place code.
    pub const PLACE_CODE: &str = "CVE_LUGAR";
    /// Place display name.
    pub const PLACE_NAME: &str = "NOM_LUGAR";
    /// Place kind tag.
    pub const PLACE_KIND: &str = "TIPO_LUGAR";
    /// Local (state or municipal) code of a place.
    pub const LOCAL_CODE: &str = "CVE_LOCAL";
    /// Enclosing state code.
    pub const STATE_CODE: &str = "CVE_ENT";
    /// Crime group code.
    pub const GROUP_CODE: &str = "Id_Agrupador_Delito";
    /// Crime group display name.
    pub const GROUP_NAME: &str = "Nombre_Agrupador_Delito";
    /// Individual crime code inside a group.
    pub const CRIME_CODE: &str = "Id_Delito";
    /// Population year.
    pub const YEAR: &str = "Year";
    /// Municipality code in the base population table.
    pub const MUNICIPALITY_ID: &str = "Id_Municipio";
    /// State code in the base population table.
    pub const STATE_ID: &str = "Id_Entidad";
    /// Number of inhabitants.
    pub const INHABITANTS: &str = "Num_Habs";
    /// Crime rate per 100k inhabitants.
    pub const RATE: &str = "tasa";
    /// Raw incident count.
    pub const INCIDENTS: &str = "Num_Delitos";
}

/// Value type of a stored column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// UTF-8 text.
    Text,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Real,
}

/// A declared column of a catalog table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    /// Physical column name.
    pub name: &'static str,
    /// Stored value type.
    pub ty: ColumnType,
}

impl Column {
    const fn text(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Text,
        }
    }

    const fn integer(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Integer,
        }
    }

    const fn real(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Real,
        }
    }
}

/// The tables (collections) a catalog store exposes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CatalogTable {
    /// Every year-month with published data.
    #[serde(rename = "col_aniomes")]
    #[strum(serialize = "col_aniomes")]
    Periods,
    /// Municipal population per year.
    #[serde(rename = "cat_poblacion")]
    #[strum(serialize = "cat_poblacion")]
    Population,
    /// Place taxonomy (country, states, metro areas, municipalities).
    #[serde(rename = "dfLugar")]
    #[strum(serialize = "dfLugar")]
    Places,
    /// Crime group headers.
    #[serde(rename = "cab_agrupador_delito")]
    #[strum(serialize = "cab_agrupador_delito")]
    CrimeGroups,
    /// Crime group membership details.
    #[serde(rename = "det_agrupador_delito")]
    #[strum(serialize = "det_agrupador_delito")]
    CrimeGroupDetails,
    /// Population per place and year, for every place kind.
    #[serde(rename = "dfPobExtendida")]
    #[strum(serialize = "dfPobExtendida")]
    PlacePopulation,
    /// Monthly crime rates per place and crime group.
    #[serde(rename = "dfDefinitivo")]
    #[strum(serialize = "dfDefinitivo")]
    CrimeFacts,
}

const PERIODS_COLUMNS: &[Column] = &[Column::integer(columns::PERIOD)];

const POPULATION_COLUMNS: &[Column] = &[
    Column::integer(columns::YEAR),
    Column::text(columns::MUNICIPALITY_ID),
    Column::text(columns::STATE_ID),
    Column::integer(columns::INHABITANTS),
];

const PLACES_COLUMNS: &[Column] = &[
    Column::text(columns::PLACE_CODE),
    Column::text(columns::PLACE_NAME),
    Column::text(columns::PLACE_KIND),
    Column::text(columns::LOCAL_CODE),
    Column::text(columns::STATE_CODE),
];

const CRIME_GROUPS_COLUMNS: &[Column] = &[
    Column::text(columns::GROUP_CODE),
    Column::text(columns::GROUP_NAME),
];

const CRIME_GROUP_DETAILS_COLUMNS: &[Column] = &[
    Column::text(columns::GROUP_CODE),
    Column::text(columns::CRIME_CODE),
];

const PLACE_POPULATION_COLUMNS: &[Column] = &[
    Column::text(columns::PLACE_CODE),
    Column::integer(columns::YEAR),
    Column::text(columns::PLACE_KIND),
    Column::integer(columns::INHABITANTS),
];

const CRIME_FACTS_COLUMNS: &[Column] = &[
    Column::text(columns::PLACE_CODE),
    Column::integer(columns::PERIOD),
    Column::text(columns::GROUP_CODE),
    Column::real(columns::RATE),
    Column::integer(columns::INCIDENTS),
];

impl CatalogTable {
    /// All tables, reference tables first.
    pub const ALL: &[Self] = &[
        Self::Periods,
        Self::Population,
        Self::Places,
        Self::CrimeGroups,
        Self::CrimeGroupDetails,
        Self::PlacePopulation,
        Self::CrimeFacts,
    ];

    /// Returns the physical table or collection name.
    #[must_use]
    pub const fn physical_name(self) -> &'static str {
        match self {
            Self::Periods => "col_aniomes",
            Self::Population => "cat_poblacion",
            Self::Places => "dfLugar",
            Self::CrimeGroups => "cab_agrupador_delito",
            Self::CrimeGroupDetails => "det_agrupador_delito",
            Self::PlacePopulation => "dfPobExtendida",
            Self::CrimeFacts => "dfDefinitivo",
        }
    }

    /// Returns the declared columns, in storage order.
    #[must_use]
    pub const fn columns(self) -> &'static [Column] {
        match self {
            Self::Periods => PERIODS_COLUMNS,
            Self::Population => POPULATION_COLUMNS,
            Self::Places => PLACES_COLUMNS,
            Self::CrimeGroups => CRIME_GROUPS_COLUMNS,
            Self::CrimeGroupDetails => CRIME_GROUP_DETAILS_COLUMNS,
            Self::PlacePopulation => PLACE_POPULATION_COLUMNS,
            Self::CrimeFacts => CRIME_FACTS_COLUMNS,
        }
    }

    /// Looks up a declared column by name.
    #[must_use]
    pub fn column(self, name: &str) -> Option<&'static Column> {
        self.columns().iter().find(|c| c.name == name)
    }
}

/// Kind of geographic place.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum PlaceKind {
    /// The whole country.
    #[serde(rename = "Pais")]
    #[strum(serialize = "Pais")]
    Country,
    /// A state (entidad federativa).
    #[serde(rename = "Entidad")]
    #[strum(serialize = "Entidad")]
    State,
    /// A metropolitan area.
    #[serde(rename = "Metropoli")]
    #[strum(serialize = "Metropoli")]
    MetroArea,
    /// A municipality.
    #[serde(rename = "Municipio")]
    #[strum(serialize = "Municipio")]
    Municipality,
}

/// A row of the place taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    /// Unique place code (e.g. `"P00"`, `"E9"`, `"M09015"`).
    #[serde(rename = "CVE_LUGAR")]
    pub code: String,
    /// Display name.
    #[serde(rename = "NOM_LUGAR")]
    pub name: String,
    /// Kind tag.
    #[serde(rename = "TIPO_LUGAR")]
    pub kind: PlaceKind,
    /// Local code within its state (municipal or state key).
    #[serde(rename = "CVE_LOCAL", default)]
    pub local_code: Option<String>,
    /// Raw enclosing state code. `"0"` marks the national row.
    #[serde(rename = "CVE_ENT", default)]
    pub state_code: Option<String>,
}

impl Place {
    /// Returns the code of the state enclosing this place, if any.
    ///
    /// The country row has no enclosing state, and the upstream data marks
    /// that with a `"0"` state code.
    #[must_use]
    pub fn enclosing_state(&self) -> Option<&str> {
        if self.kind == PlaceKind::Country {
            return None;
        }
        self.state_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty() && *code != "0")
    }
}

/// A crime group header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrimeGroup {
    /// Unique group code.
    #[serde(rename = "Id_Agrupador_Delito")]
    pub code: String,
    /// Display name.
    #[serde(rename = "Nombre_Agrupador_Delito")]
    pub name: String,
}

/// Membership of an individual crime code in a crime group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrimeGroupDetail {
    /// Group code.
    #[serde(rename = "Id_Agrupador_Delito")]
    pub group_code: String,
    /// Member crime code.
    #[serde(rename = "Id_Delito")]
    pub crime_code: String,
}

/// Municipal population for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalPopulation {
    /// Year of the estimate.
    #[serde(rename = "Year")]
    pub year: u32,
    /// Municipality code.
    #[serde(rename = "Id_Municipio")]
    pub municipality_code: String,
    /// Enclosing state code.
    #[serde(rename = "Id_Entidad")]
    pub state_code: String,
    /// Number of inhabitants.
    #[serde(rename = "Num_Habs")]
    pub inhabitants: u64,
}

/// Population of any place (country, state, metro area, municipality)
/// for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacePopulation {
    /// Place code.
    #[serde(rename = "CVE_LUGAR")]
    pub place_code: String,
    /// Year of the estimate.
    #[serde(rename = "Year")]
    pub year: u32,
    /// Kind of the place.
    #[serde(rename = "TIPO_LUGAR")]
    pub kind: PlaceKind,
    /// Number of inhabitants.
    #[serde(rename = "Num_Habs")]
    pub inhabitants: u64,
}

/// One monthly crime-rate observation.
///
/// At most one row exists per `(place_code, period, group_code)`; a
/// missing row means zero incidents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeFact {
    /// Place code.
    #[serde(rename = "CVE_LUGAR")]
    pub place_code: String,
    /// Month of the observation.
    #[serde(rename = "Aniomes")]
    pub period: Period,
    /// Crime group code.
    #[serde(rename = "Id_Agrupador_Delito")]
    pub group_code: String,
    /// Incidents per 100k inhabitants.
    #[serde(rename = "tasa")]
    pub rate: f64,
    /// Raw incident count.
    #[serde(rename = "Num_Delitos")]
    pub incidents: u64,
}

/// The location lists a user can pick a place from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum PlaceSelector {
    /// The country row.
    #[serde(rename = "national")]
    #[strum(serialize = "national")]
    National,
    /// Every state.
    #[serde(rename = "states")]
    #[strum(serialize = "states")]
    States,
    /// Every metro area.
    #[serde(rename = "metro_areas")]
    #[strum(serialize = "metro_areas")]
    MetroAreas,
    /// Municipalities with at least 800,000 inhabitants.
    #[serde(rename = "municipalities_800k")]
    #[strum(serialize = "municipalities_800k")]
    Municipalities800k,
    /// Municipalities with at least 400,000 inhabitants.
    #[serde(rename = "municipalities_400k")]
    #[strum(serialize = "municipalities_400k")]
    Municipalities400k,
    /// Municipalities with at least 100,000 inhabitants.
    #[serde(rename = "municipalities_100k")]
    #[strum(serialize = "municipalities_100k")]
    Municipalities100k,
    /// Every municipality.
    #[serde(rename = "all_municipalities")]
    #[strum(serialize = "all_municipalities")]
    AllMunicipalities,
}

impl PlaceSelector {
    /// All selectors, in the order the dashboard offers them.
    pub const ALL: &[Self] = &[
        Self::National,
        Self::States,
        Self::MetroAreas,
        Self::Municipalities800k,
        Self::Municipalities400k,
        Self::Municipalities100k,
        Self::AllMunicipalities,
    ];

    /// Returns the place kind this selector lists.
    #[must_use]
    pub const fn kind(self) -> PlaceKind {
        match self {
            Self::National => PlaceKind::Country,
            Self::States => PlaceKind::State,
            Self::MetroAreas => PlaceKind::MetroArea,
            Self::Municipalities800k
            | Self::Municipalities400k
            | Self::Municipalities100k
            | Self::AllMunicipalities => PlaceKind::Municipality,
        }
    }

    /// Returns the population floor, if the selector has one.
    #[must_use]
    pub const fn min_population(self) -> Option<u64> {
        match self {
            Self::Municipalities800k => Some(800_000),
            Self::Municipalities400k => Some(400_000),
            Self::Municipalities100k => Some(100_000),
            Self::National | Self::States | Self::MetroAreas | Self::AllMunicipalities => None,
        }
    }

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::National => "Nacional",
            Self::States => "Entidades",
            Self::MetroAreas => "Metrópolis",
            Self::Municipalities800k => "Municipios 800K+",
            Self::Municipalities400k => "Municipios 400K+",
            Self::Municipalities100k => "Municipios 100K+",
            Self::AllMunicipalities => "Todos los municipios",
        }
    }
}
