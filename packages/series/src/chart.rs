//! Reduction of the chart controls to a bounded list of drawn series.
//!
//! Slot 0 is always the place rate. Slot `k` draws overlay `k - 1`. Each
//! slot takes the mark and color at its own index, so the number of
//! entries is `min(1 + overlays, marks)`: two overlays with a single mark
//! draw the place alone.

use crime_dash_series_models::chart::{MAX_MARKS, MAX_OVERLAYS, PLACE_LABEL};
use crime_dash_series_models::{ChartEntry, ChartSpec, ChartToggles, MarkStyle, OverlaySeries, columns};

/// Builds the chart title for a crime group and a place.
#[must_use]
pub fn chart_title(group_name: &str, place_name: &str) -> String {
    format!("Tasa delictiva mensual de {group_name}\n{place_name}")
}

/// Overlays that will actually be drawn: the first [`MAX_OVERLAYS`]
/// distinct selections whose column exists in the merged table.
#[must_use]
pub fn effective_overlays(
    selected: &[OverlaySeries],
    available_columns: &[&str],
) -> Vec<OverlaySeries> {
    let mut overlays: Vec<OverlaySeries> = Vec::with_capacity(MAX_OVERLAYS);
    for overlay in selected {
        if !overlays.contains(overlay) {
            overlays.push(*overlay);
        }
    }
    overlays.truncate(MAX_OVERLAYS);

    overlays.retain(|overlay| {
        let present = available_columns.contains(&overlay.column());
        if !present {
            log::warn!(
                "Dropping {overlay} overlay: column {} is not in the table",
                overlay.column()
            );
        }
        present
    });
    overlays
}

/// Resolves `toggles` against the columns of the merged table.
#[must_use]
pub fn resolve_chart_spec(
    toggles: &ChartToggles,
    available_columns: &[&str],
    title: &str,
) -> ChartSpec {
    let overlays = effective_overlays(&toggles.overlays, available_columns);

    let marks: Vec<MarkStyle> = if toggles.marks.is_empty() {
        vec![MarkStyle::Line]
    } else {
        toggles.marks.iter().take(MAX_MARKS).copied().collect()
    };

    let slots = (1 + overlays.len()).min(marks.len());

    let entries = (0..slots)
        .map(|slot| {
            let (column, label) = if slot == 0 {
                (columns::PLACE_RATE, PLACE_LABEL)
            } else {
                let overlay = overlays[slot - 1];
                (overlay.column(), overlay.label())
            };
            ChartEntry {
                column: column.to_string(),
                mark: marks[slot],
                color: toggles.colors[slot].clone(),
                label: label.to_string(),
            }
        })
        .collect();

    ChartSpec {
        title: title.to_string(),
        entries,
        bar_width: toggles.bar_width,
        line_width: toggles.line_width,
        line_style: toggles.line_style,
    }
}
