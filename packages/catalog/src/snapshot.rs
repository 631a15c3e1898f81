//! Immutable, once-per-process view of the catalog reference tables.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use crime_dash_catalog_models::{
    CatalogTable, CrimeGroup, CrimeGroupDetail, MunicipalPopulation, Period, Place, PlaceKind,
    PlacePopulation, PlaceSelector,
};
use serde::Deserialize;

use crate::queries::fetch_typed;
use crate::{CatalogStore, StoreError};

#[derive(Deserialize)]
struct PeriodRow {
    #[serde(rename = "Aniomes")]
    period: Period,
}

/// Reference tables loaded once at startup.
///
/// Periods are sorted and de-duplicated; places are ordered by name.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    periods: Vec<Period>,
    places: Vec<Place>,
    place_index: BTreeMap<String, usize>,
    crime_groups: Vec<CrimeGroup>,
    group_details: Vec<CrimeGroupDetail>,
    municipal_population: Vec<MunicipalPopulation>,
    place_population: BTreeMap<(String, u32), u64>,
}

impl CatalogSnapshot {
    /// Loads every reference table from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any table cannot be read or a row is
    /// malformed.
    pub fn load(store: &dyn CatalogStore) -> Result<Self, StoreError> {
        let periods = fetch_typed::<PeriodRow>(store, CatalogTable::Periods, None)?
            .into_iter()
            .map(|row| row.period)
            .collect();
        let snapshot = Self::from_parts(
            periods,
            fetch_typed(store, CatalogTable::Places, None)?,
            fetch_typed(store, CatalogTable::CrimeGroups, None)?,
            fetch_typed(store, CatalogTable::CrimeGroupDetails, None)?,
            fetch_typed(store, CatalogTable::Population, None)?,
            fetch_typed(store, CatalogTable::PlacePopulation, None)?,
        );

        log::info!(
            "Loaded catalog snapshot from {} store: {} periods, {} places, {} crime groups, {} population rows",
            store.backend_name(),
            snapshot.periods.len(),
            snapshot.places.len(),
            snapshot.crime_groups.len(),
            snapshot.place_population.len(),
        );

        Ok(snapshot)
    }

    /// Builds a snapshot from already-loaded tables.
    #[must_use]
    pub fn from_parts(
        periods: Vec<Period>,
        mut places: Vec<Place>,
        mut crime_groups: Vec<CrimeGroup>,
        group_details: Vec<CrimeGroupDetail>,
        municipal_population: Vec<MunicipalPopulation>,
        place_population: Vec<PlacePopulation>,
    ) -> Self {
        let periods: Vec<Period> = periods
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        places.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));
        let mut place_index = BTreeMap::new();
        for (i, place) in places.iter().enumerate() {
            match place_index.entry(place.code.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(i);
                }
                Entry::Occupied(_) => {
                    log::warn!("Duplicate place code {} in catalog", place.code);
                }
            }
        }

        crime_groups.sort_by(|a, b| a.name.cmp(&b.name));

        let place_population = place_population
            .into_iter()
            .map(|row| ((row.place_code, row.year), row.inhabitants))
            .collect();

        Self {
            periods,
            places,
            place_index,
            crime_groups,
            group_details,
            municipal_population,
            place_population,
        }
    }

    /// Returns every catalog period, ascending.
    #[must_use]
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Returns the year of the latest catalog period.
    #[must_use]
    pub fn max_year(&self) -> Option<u32> {
        self.periods.last().map(|p| p.year())
    }

    /// Returns the first and last of the latest `count` catalog periods.
    #[must_use]
    pub fn default_range(&self, count: usize) -> Option<(Period, Period)> {
        let end = *self.periods.last()?;
        let start_idx = self.periods.len().saturating_sub(count.max(1));
        Some((self.periods[start_idx], end))
    }

    /// Returns every place, ordered by name.
    #[must_use]
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Looks up a place by code.
    #[must_use]
    pub fn place(&self, code: &str) -> Option<&Place> {
        self.place_index.get(code).map(|&i| &self.places[i])
    }

    /// Lists the places offered by `selector`.
    ///
    /// Population floors are evaluated against the extended population
    /// table at [`Self::max_year`]; a municipality without a population row
    /// for that year is excluded from the thresholded lists.
    #[must_use]
    pub fn places_for(&self, selector: PlaceSelector) -> Vec<&Place> {
        let kind = selector.kind();
        let floor = selector.min_population();
        let year = self.max_year();

        self.places
            .iter()
            .filter(|place| place.kind == kind)
            .filter(|place| {
                floor.is_none_or(|floor| {
                    year.and_then(|year| self.population_of(&place.code, year))
                        .is_some_and(|population| population >= floor)
                })
            })
            .collect()
    }

    /// Returns every crime group, ordered by name.
    #[must_use]
    pub fn crime_groups(&self) -> &[CrimeGroup] {
        &self.crime_groups
    }

    /// Looks up a crime group by code.
    #[must_use]
    pub fn crime_group(&self, code: &str) -> Option<&CrimeGroup> {
        self.crime_groups.iter().find(|g| g.code == code)
    }

    /// Returns the member crime codes of a group.
    #[must_use]
    pub fn crime_codes_in_group(&self, group_code: &str) -> Vec<&str> {
        self.group_details
            .iter()
            .filter(|d| d.group_code == group_code)
            .map(|d| d.crime_code.as_str())
            .collect()
    }

    /// Returns the population of any place for `year`.
    #[must_use]
    pub fn population_of(&self, place_code: &str, year: u32) -> Option<u64> {
        self.place_population
            .get(&(place_code.to_string(), year))
            .copied()
    }

    /// Returns the summed municipal population of a state for `year`, or
    /// `None` if the state has no municipal rows that year.
    #[must_use]
    pub fn state_population(&self, state_code: &str, year: u32) -> Option<u64> {
        self.municipal_population
            .iter()
            .filter(|row| row.year == year && row.state_code == state_code)
            .map(|row| row.inhabitants)
            .reduce(|a, b| a + b)
    }

    /// Returns the population shown for `place` in `year`.
    ///
    /// A state uses the sum of its municipal populations, falling back to
    /// the extended population table when the state has no municipal rows.
    /// Every other place reads the extended table.
    #[must_use]
    pub fn population_for(&self, place: &Place, year: u32) -> Option<u64> {
        (place.kind == PlaceKind::State)
            .then(|| place.enclosing_state())
            .flatten()
            .and_then(|state| self.state_population(state, year))
            .or_else(|| self.population_of(&place.code, year))
    }

    /// Number of places of each kind, for diagnostics.
    #[must_use]
    pub fn place_counts(&self) -> BTreeMap<PlaceKind, usize> {
        let mut counts = BTreeMap::new();
        for place in &self.places {
            *counts.entry(place.kind).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duckdb_store::DuckDbStore;
    use serde_json::{Value, json};

    fn place(code: &str, name: &str, kind: PlaceKind, state: &str) -> Place {
        Place {
            code: code.to_string(),
            name: name.to_string(),
            kind,
            local_code: None,
            state_code: Some(state.to_string()),
        }
    }

    fn population(code: &str, year: u32, kind: PlaceKind, inhabitants: u64) -> PlacePopulation {
        PlacePopulation {
            place_code: code.to_string(),
            year,
            kind,
            inhabitants,
        }
    }

    fn municipal(year: u32, municipality: &str, state: &str, inhabitants: u64) -> MunicipalPopulation {
        MunicipalPopulation {
            year,
            municipality_code: municipality.to_string(),
            state_code: state.to_string(),
            inhabitants,
        }
    }

    fn snapshot() -> CatalogSnapshot {
        let periods = [202_312, 202_401, 202_402, 202_401, 202_311]
            .into_iter()
            .map(|c| Period::from_code(c).unwrap())
            .collect();
        CatalogSnapshot::from_parts(
            periods,
            vec![
                place("P00", "Nacional", PlaceKind::Country, "0"),
                place("E14", "Jalisco", PlaceKind::State, "14"),
                place("M14039", "Guadalajara", PlaceKind::Municipality, "14"),
                place("M14120", "Zapopan", PlaceKind::Municipality, "14"),
                place("M14001", "Acatic", PlaceKind::Municipality, "14"),
            ],
            vec![CrimeGroup {
                code: "3".to_string(),
                name: "Robo".to_string(),
            }],
            vec![
                CrimeGroupDetail {
                    group_code: "3".to_string(),
                    crime_code: "301".to_string(),
                },
                CrimeGroupDetail {
                    group_code: "3".to_string(),
                    crime_code: "302".to_string(),
                },
            ],
            vec![
                municipal(2024, "039", "14", 1_385_000),
                municipal(2024, "120", "14", 1_476_000),
                municipal(2023, "120", "14", 1_460_000),
            ],
            vec![
                population("M14039", 2024, PlaceKind::Municipality, 1_385_000),
                population("M14120", 2024, PlaceKind::Municipality, 450_000),
                population("M14120", 2023, PlaceKind::Municipality, 900_000),
                population("M14001", 2024, PlaceKind::Municipality, 23_000),
            ],
        )
    }

    #[test]
    fn periods_are_sorted_and_unique() {
        let codes: Vec<u32> = snapshot().periods().iter().map(|p| p.code()).collect();
        assert_eq!(codes, vec![202_311, 202_312, 202_401, 202_402]);
    }

    #[test]
    fn max_year_and_default_range() {
        let snapshot = snapshot();
        assert_eq!(snapshot.max_year(), Some(2024));

        let (start, end) = snapshot.default_range(3).unwrap();
        assert_eq!((start.code(), end.code()), (202_312, 202_402));

        let (start, _) = snapshot.default_range(12).unwrap();
        assert_eq!(start.code(), 202_311, "Range clamps to the first period");

        assert_eq!(CatalogSnapshot::default().default_range(12), None);
    }

    #[test]
    fn selectors_apply_population_floor_at_max_year() {
        let snapshot = snapshot();
        let names = |selector| {
            snapshot
                .places_for(selector)
                .into_iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
        };

        assert_eq!(names(PlaceSelector::National), vec!["Nacional"]);
        assert_eq!(names(PlaceSelector::States), vec!["Jalisco"]);
        assert_eq!(names(PlaceSelector::Municipalities800k), vec!["Guadalajara"]);
        assert_eq!(
            names(PlaceSelector::Municipalities400k),
            vec!["Guadalajara", "Zapopan"]
        );
        assert_eq!(
            names(PlaceSelector::AllMunicipalities),
            vec!["Acatic", "Guadalajara", "Zapopan"]
        );
        assert!(names(PlaceSelector::MetroAreas).is_empty());
    }

    #[test]
    fn population_lookups() {
        let snapshot = snapshot();
        assert_eq!(snapshot.population_of("M14120", 2023), Some(900_000));
        assert_eq!(snapshot.population_of("M14120", 2022), None);
        assert_eq!(snapshot.state_population("14", 2024), Some(2_861_000));
        assert_eq!(snapshot.state_population("9", 2024), None);
    }

    #[test]
    fn states_show_summed_municipal_population() {
        let snapshot = snapshot();
        let state = snapshot.place("E14").unwrap();
        assert_eq!(snapshot.population_for(state, 2024), Some(2_861_000));
        assert_eq!(snapshot.population_for(state, 2023), Some(1_460_000));

        let municipality = snapshot.place("M14120").unwrap();
        assert_eq!(snapshot.population_for(municipality, 2024), Some(450_000));

        let national = snapshot.place("P00").unwrap();
        assert_eq!(snapshot.population_for(national, 2024), None);
    }

    #[test]
    fn duplicate_place_code_keeps_first_by_name() {
        let snapshot = CatalogSnapshot::from_parts(
            Vec::new(),
            vec![
                place("M1", "Beta", PlaceKind::Municipality, "1"),
                place("M1", "Alfa", PlaceKind::Municipality, "1"),
            ],
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(snapshot.place("M1").unwrap().name, "Alfa");
    }

    #[test]
    fn lookups_by_code() {
        let snapshot = snapshot();
        assert_eq!(snapshot.place("E14").unwrap().name, "Jalisco");
        assert!(snapshot.place("E99").is_none());
        assert_eq!(snapshot.crime_group("3").unwrap().name, "Robo");
        assert_eq!(snapshot.crime_codes_in_group("3"), vec!["301", "302"]);
        assert!(snapshot.crime_codes_in_group("4").is_empty());
        assert_eq!(snapshot.place_counts()[&PlaceKind::Municipality], 3);
    }

    #[test]
    fn loads_from_store() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let rows = |values: Vec<Value>| {
            values
                .into_iter()
                .map(|v| match v {
                    Value::Object(map) => map,
                    _ => unreachable!(),
                })
                .collect::<Vec<_>>()
        };
        store
            .load_rows(
                CatalogTable::Periods,
                &rows(vec![json!({"Aniomes": 202_402}), json!({"Aniomes": 202_401})]),
            )
            .unwrap();
        store
            .load_rows(
                CatalogTable::Places,
                &rows(vec![json!({"CVE_LUGAR": "P00", "NOM_LUGAR": "Nacional", "TIPO_LUGAR": "Pais", "CVE_ENT": "0"})]),
            )
            .unwrap();
        store
            .load_rows(
                CatalogTable::CrimeGroups,
                &rows(vec![json!({"Id_Agrupador_Delito": "3", "Nombre_Agrupador_Delito": "Robo"})]),
            )
            .unwrap();

        let snapshot = CatalogSnapshot::load(&store).unwrap();
        assert_eq!(snapshot.periods().len(), 2);
        assert_eq!(snapshot.place("P00").unwrap().enclosing_state(), None);
        assert_eq!(snapshot.crime_groups().len(), 1);
    }
}
