//! HTTP handler functions for the dashboard API.

use actix_web::{HttpResponse, web};
use crime_dash_catalog_models::Period;
use crime_dash_series::SeriesError;
use crime_dash_series::pipeline::{DEFAULT_RANGE_PERIODS, SeriesRequest, build_view};
use crime_dash_series_models::{ChartToggles, LineStyle, MarkStyle, OverlaySeries};
use crime_dash_server_models::{
    ApiCrimeGroup, ApiError, ApiHealth, ApiPeriod, ApiPeriods, ApiPlace, ApiPlaces, ApiSeries,
    PlacesQueryParams, SeriesQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.store.backend_name().to_string(),
    })
}

/// `GET /api/periods`
///
/// Returns every catalog period and the default range.
pub async fn periods(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = &state.snapshot;
    let default_range = snapshot.default_range(DEFAULT_RANGE_PERIODS);

    HttpResponse::Ok().json(ApiPeriods {
        periods: snapshot.periods().iter().copied().map(ApiPeriod::from).collect(),
        default_start: default_range.map(|(start, _)| start.into()),
        default_end: default_range.map(|(_, end)| end.into()),
        max_year: snapshot.max_year(),
    })
}

/// `GET /api/crime-groups`
///
/// Returns every crime group with its member crime codes.
pub async fn crime_groups(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = &state.snapshot;
    let groups: Vec<ApiCrimeGroup> = snapshot
        .crime_groups()
        .iter()
        .map(|group| {
            let codes = snapshot
                .crime_codes_in_group(&group.code)
                .into_iter()
                .map(str::to_string)
                .collect();
            ApiCrimeGroup::new(group, codes)
        })
        .collect();

    HttpResponse::Ok().json(groups)
}

/// `GET /api/places?selector=...`
///
/// Lists the places of a selector with their latest-year population.
pub async fn places(
    state: web::Data<AppState>,
    params: web::Query<PlacesQueryParams>,
) -> HttpResponse {
    let snapshot = &state.snapshot;
    let year = snapshot.max_year();

    let places = snapshot
        .places_for(params.selector)
        .into_iter()
        .map(|place| {
            let population = year.and_then(|year| snapshot.population_for(place, year));
            ApiPlace::new(place, population)
        })
        .collect();

    HttpResponse::Ok().json(ApiPlaces {
        selector: params.selector,
        label: params.selector.label().to_string(),
        year,
        places,
    })
}

/// `GET /api/series?place=...&group=...`
///
/// Rebuilds the merged series, variation summary and chart spec for one
/// selection.
pub async fn series(
    state: web::Data<AppState>,
    params: web::Query<SeriesQueryParams>,
) -> HttpResponse {
    let request = match series_request(&params) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Rejected series query: {}", e.error);
            return HttpResponse::BadRequest().json(e);
        }
    };

    match build_view(&state.snapshot, state.store.as_ref(), &request) {
        Ok(view) => {
            let group_codes = state
                .snapshot
                .crime_codes_in_group(&view.group.code)
                .into_iter()
                .map(str::to_string)
                .collect();

            HttpResponse::Ok().json(ApiSeries {
                place: ApiPlace::new(&view.place, view.population),
                group: ApiCrimeGroup::new(&view.group, group_codes),
                start: view.start.into(),
                end: view.end.into(),
                population_year: view.population_year,
                has_trend: view.table.has_trend(),
                rows: view.table.rows().to_vec(),
                variation: view.variation,
                chart: view.chart,
                warnings: view.warnings,
            })
        }
        Err(e) => series_error_response(&e),
    }
}

fn series_request(params: &SeriesQueryParams) -> Result<SeriesRequest, ApiError> {
    let start = parse_period(params.start.as_deref(), "start")?;
    let end = parse_period(params.end.as_deref(), "end")?;

    let mut toggles = ChartToggles::default();
    if let Some(overlays) = params.overlays.as_deref() {
        toggles.overlays = parse_list::<OverlaySeries>(overlays);
    }
    if let Some(marks) = params.marks.as_deref() {
        toggles.marks = parse_list::<MarkStyle>(marks);
    }
    for (slot, color) in [&params.color1, &params.color2, &params.color3]
        .into_iter()
        .enumerate()
    {
        if let Some(color) = color.as_deref().filter(|c| !c.trim().is_empty()) {
            toggles.colors[slot] = color.trim().to_string();
        }
    }
    if let Some(width) = params.bar_width.filter(|w| w.is_finite() && *w > 0.0) {
        toggles.bar_width = width;
    }
    if let Some(width) = params.line_width.filter(|w| w.is_finite() && *w > 0.0) {
        toggles.line_width = width;
    }
    if let Some(style) = params.line_style.as_deref() {
        toggles.line_style = style.trim().parse::<LineStyle>().map_err(|_| {
            invalid_query("invalid_line_style", format!("Unknown line style '{style}'"))
        })?;
    }

    Ok(SeriesRequest {
        place_code: params.place.trim().to_string(),
        group_code: params.group.trim().to_string(),
        start,
        end,
        toggles,
    })
}

fn parse_period(value: Option<&str>, name: &str) -> Result<Option<Period>, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| {
            v.parse::<Period>()
                .map_err(|e| invalid_query("invalid_period", format!("Invalid {name}: {e}")))
        })
        .transpose()
}

/// Parses a comma-separated list, skipping unknown entries.
fn parse_list<T: std::str::FromStr>(value: &str) -> Vec<T> {
    value
        .split(',')
        .filter_map(|item| item.trim().parse().ok())
        .collect()
}

fn invalid_query(kind: &str, message: String) -> ApiError {
    ApiError {
        error: message,
        kind: kind.to_string(),
    }
}

fn series_error_response(e: &SeriesError) -> HttpResponse {
    let (mut builder, kind) = match e {
        SeriesError::InvalidRange { .. } => (HttpResponse::BadRequest(), "invalid_range"),
        SeriesError::UnknownPlace { .. } => (HttpResponse::NotFound(), "unknown_place"),
        SeriesError::UnknownCrimeGroup { .. } => {
            (HttpResponse::NotFound(), "unknown_crime_group")
        }
        SeriesError::EmptyCatalog => (HttpResponse::UnprocessableEntity(), "empty_catalog"),
        SeriesError::IncompleteReferenceData { .. } => (
            HttpResponse::UnprocessableEntity(),
            "incomplete_reference_data",
        ),
        SeriesError::ReferenceSeriesMismatch { .. } => (
            HttpResponse::UnprocessableEntity(),
            "reference_series_mismatch",
        ),
        SeriesError::TrendUndefined { .. } => {
            (HttpResponse::UnprocessableEntity(), "trend_undefined")
        }
        SeriesError::Store(_) => (HttpResponse::InternalServerError(), "store"),
    };

    if matches!(e, SeriesError::Store(_)) {
        log::error!("Failed to build series: {e}");
    } else {
        log::warn!("Rejected series request: {e}");
    }

    builder.json(ApiError {
        error: e.to_string(),
        kind: kind.to_string(),
    })
}
