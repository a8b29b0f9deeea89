//! A rectangular grid of plot rows with keyed series attachment.
//!
//! [`GridPlot`] is the headless model behind the multi-row channel plot. It owns
//! every attached [`Series`], hands out [`CurveId`] handles for them, keeps a
//! per-row legend and view range, and optionally links the x range of all rows
//! so that panning one row pans them all.
//!
//! Series are identified by a [`SeriesKey`] of `(name, row, col, axis)`. The
//! name is lower-cased when keying, so `"Gravity"` and `"gravity"` on the same
//! row/axis are the same series. The same series may be attached to several
//! rows; each attachment is an independent entry with its own handle.

use std::collections::HashMap;

use crate::data::series::Series;
use crate::data::trace_look::TraceLook;
use crate::data::x_formatter::{AxisFormatter, PolyAxis};
use crate::error::{PlotError, Result};

/// Range reported for a row that has never shown any data.
pub const DEFAULT_RANGE: [f64; 2] = [0.0, 1.0];

// ─────────────────────────────────────────────────────────────────────────────
// Keys and handles
// ─────────────────────────────────────────────────────────────────────────────

/// Which y axis of a row a series is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Axis {
    #[default]
    Left,
    Right,
}

impl Axis {
    /// Resolve a free-form hint (`"left"`, `"RIGHT"`, ...). Unknown hints fall back to `Left`.
    pub fn from_hint(hint: &str) -> Self {
        if hint.trim().eq_ignore_ascii_case("right") {
            Axis::Right
        } else {
            Axis::Left
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Left => write!(f, "left"),
            Axis::Right => write!(f, "right"),
        }
    }
}

/// Unique identity of one attached series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    /// Lower-cased series name.
    pub name: String,
    pub row: usize,
    pub col: usize,
    pub axis: Axis,
}

/// Handle to a curve drawn on the grid, returned by [`GridPlot::add_series`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurveId(u64);

impl std::fmt::Display for CurveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "curve#{}", self.0)
    }
}

/// Handle to one per-row segment region visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(u64);

/// Anything placed on a row: a data curve or a segment region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotItem {
    Curve(CurveId),
    Region(RegionId),
}

// ─────────────────────────────────────────────────────────────────────────────
// Legend
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub curve: CurveId,
}

/// Per-row legend; curves on both axes of a row share it.
#[derive(Debug, Clone, Default)]
pub struct Legend {
    entries: Vec<LegendEntry>,
}

impl Legend {
    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|e| e.label == label)
    }

    fn add(&mut self, label: &str, curve: CurveId) {
        if !self.entries.iter().any(|e| e.curve == curve) {
            self.entries.push(LegendEntry {
                label: label.to_string(),
                curve,
            });
        }
    }

    fn remove(&mut self, curve: CurveId) {
        self.entries.retain(|e| e.curve != curve);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RowPlot
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct ViewBox {
    curves: Vec<CurveId>,
    y_range: [f64; 2],
    y_auto: bool,
}

impl Default for ViewBox {
    fn default() -> Self {
        Self {
            curves: Vec::new(),
            y_range: DEFAULT_RANGE,
            y_auto: true,
        }
    }
}

/// One cell of the grid: a bottom axis, a left (and optionally right) view box,
/// a legend and the items drawn on it.
#[derive(Debug, Clone)]
pub struct RowPlot {
    row: usize,
    col: usize,
    x_axis: PolyAxis,
    x_range: [f64; 2],
    x_auto: bool,
    left: ViewBox,
    right: Option<ViewBox>,
    legend: Legend,
    items: Vec<PlotItem>,
}

impl RowPlot {
    fn new(row: usize, col: usize, multiy: bool) -> Self {
        Self {
            row,
            col,
            x_axis: PolyAxis::default(),
            x_range: DEFAULT_RANGE,
            x_auto: true,
            left: ViewBox::default(),
            right: multiy.then(ViewBox::default),
            legend: Legend::default(),
            items: Vec::new(),
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn x_axis(&self) -> &PolyAxis {
        &self.x_axis
    }

    pub fn x_range(&self) -> [f64; 2] {
        self.x_range
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    /// Every item on the row, curves of both axes and segment regions, in insertion order.
    pub fn items(&self) -> &[PlotItem] {
        &self.items
    }

    pub fn has_right_axis(&self) -> bool {
        self.right.is_some()
    }

    fn view(&self, axis: Axis) -> Option<&ViewBox> {
        match axis {
            Axis::Left => Some(&self.left),
            Axis::Right => self.right.as_ref(),
        }
    }

    fn view_mut(&mut self, axis: Axis) -> Option<&mut ViewBox> {
        match axis {
            Axis::Left => Some(&mut self.left),
            Axis::Right => self.right.as_mut(),
        }
    }
}

/// A borrowed view of one axis of a [`RowPlot`], as returned by [`GridPlot::get_plot`].
#[derive(Debug, Clone, Copy)]
pub struct PlotAxes<'a> {
    plot: &'a RowPlot,
    axis: Axis,
}

impl<'a> PlotAxes<'a> {
    pub fn plot(&self) -> &'a RowPlot {
        self.plot
    }

    pub fn row(&self) -> usize {
        self.plot.row
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Curves attached to this axis only.
    pub fn data_items(&self) -> &'a [CurveId] {
        self.plot
            .view(self.axis)
            .map(|v| v.curves.as_slice())
            .unwrap_or(&[])
    }

    /// All items of the underlying row.
    pub fn items(&self) -> &'a [PlotItem] {
        &self.plot.items
    }

    pub fn legend(&self) -> &'a Legend {
        &self.plot.legend
    }

    pub fn x_axis(&self) -> &'a PolyAxis {
        &self.plot.x_axis
    }

    /// `[[x_min, x_max], [y_min, y_max]]` for this axis.
    pub fn view_range(&self) -> [[f64; 2]; 2] {
        let y = self
            .plot
            .view(self.axis)
            .map(|v| v.y_range)
            .unwrap_or(DEFAULT_RANGE);
        [self.plot.x_range, y]
    }
}

impl PartialEq for PlotAxes<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.plot, other.plot) && self.axis == other.axis
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GridPlot
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Curve {
    key: SeriesKey,
    look: TraceLook,
}

/// Grid of plot rows owning all attached series.
#[derive(Debug, Clone)]
pub struct GridPlot {
    rows: usize,
    cols: usize,
    multiy: bool,
    xlink: bool,
    plots: Vec<RowPlot>,
    series: HashMap<SeriesKey, Series>,
    items: HashMap<SeriesKey, CurveId>,
    curves: HashMap<CurveId, Curve>,
    order: Vec<SeriesKey>,
    next_id: u64,
}

impl GridPlot {
    /// A single-column grid with unlinked x axes and no right axes.
    pub fn new(rows: usize) -> Self {
        Self::with_layout(rows, 1, false, false)
    }

    /// Full constructor: `sharex` links all rows' x range, `multiy` adds a right axis per row.
    pub fn with_layout(rows: usize, cols: usize, sharex: bool, multiy: bool) -> Self {
        let cols = cols.max(1);
        let mut plots = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                plots.push(RowPlot::new(row, col, multiy));
            }
        }
        Self {
            rows,
            cols,
            multiy,
            xlink: sharex,
            plots,
            series: HashMap::new(),
            items: HashMap::new(),
            curves: HashMap::new(),
            order: Vec::new(),
            next_id: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_multiy(&self) -> bool {
        self.multiy
    }

    pub fn is_xlinked(&self) -> bool {
        self.xlink
    }

    /// Normalise a series identity into a [`SeriesKey`].
    ///
    /// ```
    /// # use flightline_plot::data::grid::{Axis, GridPlot};
    /// let key = GridPlot::make_index("GraVitY", 2, 0, Some("sideways")).unwrap();
    /// assert_eq!(key.name, "gravity");
    /// assert_eq!(key.axis, Axis::Left);
    /// ```
    pub fn make_index(
        name: &str,
        row: usize,
        col: usize,
        axis_hint: Option<&str>,
    ) -> Result<SeriesKey> {
        if name.trim().is_empty() {
            return Err(PlotError::EmptySeriesName);
        }
        Ok(SeriesKey {
            name: name.to_lowercase(),
            row,
            col,
            axis: axis_hint.map(Axis::from_hint).unwrap_or_default(),
        })
    }

    fn key(name: &str, row: usize, col: usize, axis: Axis) -> Result<SeriesKey> {
        let mut key = Self::make_index(name, row, col, None)?;
        key.axis = axis;
        Ok(key)
    }

    fn plot_index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows {
            return Err(PlotError::RowOutOfBounds(row));
        }
        if col >= self.cols {
            return Err(PlotError::ColOutOfBounds(col));
        }
        Ok(row * self.cols + col)
    }

    fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // ── Series attachment ───────────────────────────────────────────────────

    /// Attach `series` to column 0 of `row`. See [`add_series_at`](Self::add_series_at).
    pub fn add_series(
        &mut self,
        series: Series,
        row: usize,
        axis: Axis,
        autorange: bool,
    ) -> Result<CurveId> {
        self.add_series_at(series, row, 0, axis, autorange)
    }

    /// Attach `series` to the given cell and axis.
    ///
    /// Re-adding under an existing key returns the existing handle and changes
    /// nothing. With `autorange` the cell's view boxes are put back into
    /// auto-range mode and recomputed over every curve on the row.
    pub fn add_series_at(
        &mut self,
        series: Series,
        row: usize,
        col: usize,
        axis: Axis,
        autorange: bool,
    ) -> Result<CurveId> {
        let key = Self::key(&series.name, row, col, axis)?;
        let idx = self.plot_index(row, col)?;
        if self.plots[idx].view(axis).is_none() {
            return Err(PlotError::AxisUnavailable(axis));
        }
        if let Some(existing) = self.items.get(&key) {
            return Ok(*existing);
        }

        let id = CurveId(self.alloc_id());
        let look = TraceLook::new(self.order.len());
        let plot = &mut self.plots[idx];
        if let Some(view) = plot.view_mut(axis) {
            view.curves.push(id);
        }
        plot.items.push(PlotItem::Curve(id));
        plot.legend.add(&series.name, id);

        log::debug!(
            "attached series '{}' ({} points) to row {row}, col {col}, {axis} axis",
            series.name,
            series.len()
        );
        self.curves.insert(
            id,
            Curve {
                key: key.clone(),
                look,
            },
        );
        self.items.insert(key.clone(), id);
        self.series.insert(key.clone(), series);
        self.order.push(key);

        self.refresh_view(idx, axis, autorange);
        Ok(id)
    }

    /// Detach the series stored under `(name, row, axis)` in column 0.
    pub fn remove_series(&mut self, name: &str, row: usize, axis: Axis) -> Result<()> {
        self.remove_series_at(name, row, 0, axis)
    }

    pub fn remove_series_at(&mut self, name: &str, row: usize, col: usize, axis: Axis) -> Result<()> {
        let key = Self::key(name, row, col, axis)?;
        let id = self
            .items
            .get(&key)
            .copied()
            .ok_or_else(|| PlotError::SeriesNotFound {
                name: key.name.clone(),
                row,
                col,
                axis,
            })?;
        self.detach(id, &key);
        Ok(())
    }

    /// Detach a curve by handle, wherever it is plotted.
    pub fn remove_plotitem(&mut self, curve: CurveId) -> Result<()> {
        let key = self
            .curves
            .get(&curve)
            .map(|c| c.key.clone())
            .ok_or(PlotError::ItemNotFound(curve))?;
        self.detach(curve, &key);
        Ok(())
    }

    fn detach(&mut self, id: CurveId, key: &SeriesKey) {
        self.curves.remove(&id);
        self.items.remove(key);
        self.series.remove(key);
        self.order.retain(|k| k != key);
        let Ok(idx) = self.plot_index(key.row, key.col) else {
            return;
        };
        let plot = &mut self.plots[idx];
        if let Some(view) = plot.view_mut(key.axis) {
            view.curves.retain(|c| *c != id);
        }
        plot.items.retain(|item| *item != PlotItem::Curve(id));
        plot.legend.remove(id);
        log::debug!(
            "detached series '{}' from row {}, {} axis",
            key.name,
            key.row,
            key.axis
        );
        self.refresh_view(idx, key.axis, false);
    }

    /// Remove every curve from every row. Segment regions are left in place.
    pub fn clear(&mut self) {
        self.series.clear();
        self.items.clear();
        self.curves.clear();
        self.order.clear();
        for idx in 0..self.plots.len() {
            let plot = &mut self.plots[idx];
            plot.left.curves.clear();
            if let Some(right) = plot.right.as_mut() {
                right.curves.clear();
            }
            plot.items.retain(|item| matches!(item, PlotItem::Region(_)));
            plot.legend.clear();
            self.refresh_view(idx, Axis::Left, false);
            if self.multiy {
                self.refresh_view(idx, Axis::Right, false);
            }
        }
        log::debug!("cleared all series from the grid");
    }

    // ── Lookup ──────────────────────────────────────────────────────────────

    pub fn get_series(&self, name: &str, row: usize, axis: Axis) -> Option<&Series> {
        let key = Self::key(name, row, 0, axis).ok()?;
        self.series.get(&key)
    }

    pub fn get_series_by_key(&self, key: &SeriesKey) -> Option<&Series> {
        self.series.get(key)
    }

    /// Every key under which `name` is plotted, in attachment order.
    pub fn find_series(&self, name: &str) -> Vec<SeriesKey> {
        let name = name.to_lowercase();
        self.order
            .iter()
            .filter(|k| k.name == name)
            .cloned()
            .collect()
    }

    /// All attached keys, in attachment order.
    pub fn series_keys(&self) -> &[SeriesKey] {
        &self.order
    }

    pub fn curve_key(&self, curve: CurveId) -> Option<&SeriesKey> {
        self.curves.get(&curve).map(|c| &c.key)
    }

    pub fn curve_series(&self, curve: CurveId) -> Option<&Series> {
        self.curves
            .get(&curve)
            .and_then(|c| self.series.get(&c.key))
    }

    pub fn curve_look(&self, curve: CurveId) -> Option<&TraceLook> {
        self.curves.get(&curve).map(|c| &c.look)
    }

    /// Column 0 of `row`, or `None` when the row (or the right axis) does not exist.
    pub fn get_plot(&self, row: usize, axis: Axis) -> Option<PlotAxes<'_>> {
        self.get_plot_at(row, 0, axis)
    }

    pub fn get_plot_at(&self, row: usize, col: usize, axis: Axis) -> Option<PlotAxes<'_>> {
        let idx = self.plot_index(row, col).ok()?;
        let plot = &self.plots[idx];
        plot.view(axis)?;
        Some(PlotAxes { plot, axis })
    }

    /// Left axes of every cell, row by row.
    pub fn plots(&self) -> impl Iterator<Item = PlotAxes<'_>> + '_ {
        self.plots.iter().map(|plot| PlotAxes {
            plot,
            axis: Axis::Left,
        })
    }

    // ── Axes and views ──────────────────────────────────────────────────────

    /// Swap the bottom-axis formatter of every cell in `row`.
    pub fn set_xaxis_formatter(&mut self, formatter: AxisFormatter, row: usize) -> Result<()> {
        self.plot_index(row, 0)?;
        for plot in self.plots.iter_mut().filter(|p| p.row == row) {
            plot.x_axis.set_formatter(formatter);
        }
        Ok(())
    }

    /// Swap the bottom-axis formatter of every cell.
    pub(crate) fn set_all_xaxis_formatters(&mut self, formatter: AxisFormatter) {
        for plot in &mut self.plots {
            plot.x_axis.set_formatter(formatter);
        }
    }

    /// Link or unlink the x range of all cells.
    ///
    /// Linking adopts the first cell's range everywhere. Unlinking with
    /// `autorange` puts every cell back into auto mode over its own data.
    pub fn set_xlink(&mut self, enabled: bool, autorange: bool) {
        self.xlink = enabled;
        if enabled {
            if let Some(master) = self.plots.first().map(|p| p.x_range) {
                for plot in &mut self.plots {
                    plot.x_range = master;
                }
            }
        } else if autorange {
            for idx in 0..self.plots.len() {
                self.plots[idx].x_auto = true;
                self.refresh_x(idx);
            }
        }
        log::debug!("x link {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn get_xlim(&self, row: usize) -> Option<[f64; 2]> {
        let idx = self.plot_index(row, 0).ok()?;
        Some(self.plots[idx].x_range)
    }

    /// Set the visible x range of `row` (pan/zoom). Turns off x auto-range for the row.
    pub fn set_xlim(&mut self, row: usize, range: [f64; 2]) -> Result<()> {
        self.plot_index(row, 0)?;
        let range = ordered(range);
        if !(range[0].is_finite() && range[1].is_finite()) {
            return Ok(());
        }
        let linked = self.xlink;
        for plot in self.plots.iter_mut().filter(|p| linked || p.row == row) {
            plot.x_range = range;
            plot.x_auto = false;
        }
        Ok(())
    }

    pub fn get_ylim(&self, row: usize, axis: Axis) -> Option<[f64; 2]> {
        let idx = self.plot_index(row, 0).ok()?;
        self.plots[idx].view(axis).map(|v| v.y_range)
    }

    pub fn set_ylim(&mut self, row: usize, axis: Axis, range: [f64; 2]) -> Result<()> {
        let idx = self.plot_index(row, 0)?;
        let view = self.plots[idx]
            .view_mut(axis)
            .ok_or(PlotError::AxisUnavailable(axis))?;
        view.y_range = ordered(range);
        view.y_auto = false;
        Ok(())
    }

    /// Re-enable auto-range on every axis of `row` and fit it to its data.
    pub fn autorange(&mut self, row: usize) -> Result<()> {
        let idx = self.plot_index(row, 0)?;
        self.refresh_view(idx, Axis::Left, true);
        if self.multiy {
            self.refresh_view(idx, Axis::Right, true);
        }
        Ok(())
    }

    fn refresh_view(&mut self, idx: usize, axis: Axis, force: bool) {
        if force {
            self.plots[idx].x_auto = true;
            if let Some(view) = self.plots[idx].view_mut(axis) {
                view.y_auto = true;
            }
        }
        let y_bounds = self.data_y_bounds(idx, axis);
        if let Some(view) = self.plots[idx].view_mut(axis) {
            if view.y_auto {
                view.y_range = y_bounds.map(padded).unwrap_or(DEFAULT_RANGE);
            }
        }
        self.refresh_x(idx);
    }

    fn refresh_x(&mut self, idx: usize) {
        if !self.plots[idx].x_auto {
            return;
        }
        if self.xlink {
            // linked rows share one range spanning every auto-ranged row's data
            let range = merge_bounds(
                (0..self.plots.len())
                    .filter(|&i| self.plots[i].x_auto)
                    .filter_map(|i| self.data_x_bounds(i)),
            )
            .map(padded)
            .unwrap_or(DEFAULT_RANGE);
            for plot in &mut self.plots {
                plot.x_range = range;
            }
        } else {
            self.plots[idx].x_range = self
                .data_x_bounds(idx)
                .map(padded)
                .unwrap_or(DEFAULT_RANGE);
        }
    }

    fn data_x_bounds(&self, idx: usize) -> Option<[f64; 2]> {
        let plot = &self.plots[idx];
        let right = plot.right.iter().flat_map(|v| v.curves.iter());
        merge_bounds(
            plot.left
                .curves
                .iter()
                .chain(right)
                .filter_map(|c| self.curve_series(*c))
                .filter_map(Series::x_bounds),
        )
    }

    fn data_y_bounds(&self, idx: usize, axis: Axis) -> Option<[f64; 2]> {
        let view = self.plots[idx].view(axis)?;
        merge_bounds(
            view.curves
                .iter()
                .filter_map(|c| self.curve_series(*c))
                .filter_map(Series::y_bounds),
        )
    }

    // ── Segment regions ─────────────────────────────────────────────────────

    /// Place a new region visual on column 0 of `row`.
    pub(crate) fn attach_region(&mut self, row: usize) -> Result<RegionId> {
        let idx = self.plot_index(row, 0)?;
        let id = RegionId(self.alloc_id());
        self.plots[idx].items.push(PlotItem::Region(id));
        Ok(id)
    }

    pub(crate) fn detach_region(&mut self, row: usize, region: RegionId) {
        if let Ok(idx) = self.plot_index(row, 0) {
            self.plots[idx]
                .items
                .retain(|item| *item != PlotItem::Region(region));
        }
    }
}

fn ordered(range: [f64; 2]) -> [f64; 2] {
    if range[0] <= range[1] {
        range
    } else {
        [range[1], range[0]]
    }
}

/// Widen a degenerate range so the view never collapses to zero width.
fn padded(range: [f64; 2]) -> [f64; 2] {
    if range[1] > range[0] {
        range
    } else {
        [range[0] - 0.5, range[1] + 0.5]
    }
}

fn merge_bounds(bounds: impl Iterator<Item = [f64; 2]>) -> Option<[f64; 2]> {
    bounds.reduce(|a, b| [a[0].min(b[0]), a[1].max(b[1])])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_widens_single_point() {
        assert_eq!(padded([3.0, 3.0]), [2.5, 3.5]);
        assert_eq!(padded([1.0, 2.0]), [1.0, 2.0]);
    }

    #[test]
    fn regions_are_row_items() {
        let mut grid = GridPlot::new(2);
        let region = grid.attach_region(1).unwrap();
        assert_eq!(grid.get_plot(1, Axis::Left).unwrap().items().len(), 1);
        assert!(grid.get_plot(0, Axis::Left).unwrap().items().is_empty());
        grid.detach_region(1, region);
        assert!(grid.get_plot(1, Axis::Left).unwrap().items().is_empty());
    }

    #[test]
    fn clear_keeps_regions() {
        let mut grid = GridPlot::new(1);
        grid.add_series(Series::new("a", [1.0, 2.0]), 0, Axis::Left, true)
            .unwrap();
        grid.attach_region(0).unwrap();
        grid.clear();
        let items = grid.get_plot(0, Axis::Left).unwrap().items();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], PlotItem::Region(_)));
    }
}
