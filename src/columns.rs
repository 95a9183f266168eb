/// Column hierarchy reconstruction from rendered x-coordinates.
///
/// The bulletin table shows a three-level header (pollutant, measurement
/// kind, measurement unit) but its HTML encodes no usable column spans, so
/// the hierarchy is rebuilt positionally: the cells of a header row, sorted
/// left to right, partition the horizontal axis into half-open intervals
/// `[x_k, x_{k+1})`, the last extending to +infinity. A cell of the row
/// below belongs to the ancestor whose interval contains its x-coordinate.
///
/// Intervals are closed on the left and open on the right: a child sitting
/// exactly on an ancestor's start x belongs to that ancestor, not the
/// previous one. The linking runs twice, first measurement kinds onto
/// pollutants, then measurement units onto (pollutant, kind) pairs, yielding one
/// `ColumnDescriptor` per unit column.
///
/// All functions here are pure; callers guarantee the ancestor row is
/// non-empty (an empty pollutant row means "no bulletin for this date" and
/// is handled before linking).

use crate::model::{ColumnDescriptor, HeaderCell};

// ---------------------------------------------------------------------------
// Interval assignment
// ---------------------------------------------------------------------------

/// Index of the ancestor whose interval `[x_k, x_{k+1})` contains `x`:
/// the greatest `k` with `xs[k] <= x`, the last interval unbounded above.
///
/// A child left of every ancestor falls through to the last interval; real
/// headers start at the table's left edge, so the case is degenerate, and
/// with a single ancestor every child must link to it regardless of x.
pub fn owning_interval(xs: &[i64], x: i64) -> usize {
    debug_assert!(!xs.is_empty(), "ancestor row must be non-empty");
    xs.iter().rposition(|&start| start <= x).unwrap_or(xs.len() - 1)
}

// ---------------------------------------------------------------------------
// Linking passes
// ---------------------------------------------------------------------------

/// A measurement-kind cell tagged with the pollutant that owns its column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindColumn {
    pub text: String,
    pub x: i64,
    pub pollutant: String,
}

/// Links each measurement-kind header cell to its owning pollutant.
pub fn link_kinds_to_pollutants(
    pollutants: &[HeaderCell],
    kinds: &[HeaderCell],
) -> Vec<KindColumn> {
    let xs: Vec<i64> = pollutants.iter().map(|p| p.x).collect();
    kinds
        .iter()
        .map(|kind| {
            let owner = &pollutants[owning_interval(&xs, kind.x)];
            KindColumn {
                text: kind.text.clone(),
                x: kind.x,
                pollutant: owner.text.clone(),
            }
        })
        .collect()
}

/// Links each measurement-unit header cell to its owning (pollutant, kind)
/// pair, completing the three-level column map.
pub fn link_units_to_kinds(
    kinds: &[KindColumn],
    units: &[HeaderCell],
) -> Vec<ColumnDescriptor> {
    let xs: Vec<i64> = kinds.iter().map(|k| k.x).collect();
    units
        .iter()
        .map(|unit| {
            let owner = &kinds[owning_interval(&xs, unit.x)];
            ColumnDescriptor {
                pollutant: owner.pollutant.clone(),
                measurement_kind: owner.text.clone(),
                measurement_unit: unit.text.clone(),
                x: unit.x,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
