//! egui rendering of a [`LineSelectPlot`] and its pointer interaction.
//!
//! Every row is its own `egui_plot::Plot`. The model is the source of truth for
//! the x range: each frame the plot bounds are pushed from [`GridPlot`] and,
//! after the user pans or zooms a row, the resulting bounds are written back
//! with `set_xlim` so that linked rows follow.
//!
//! [`GridPlot`]: crate::data::grid::GridPlot

use egui::{Align2, Color32, PointerButton, Stroke, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoint, Polygon, Text, VLine};

use crate::data::grid::Axis;
use crate::data::line_select::LineSelectPlot;
use crate::data::segments::{DragTarget, SegmentId};
use crate::data::trace_look::{SegmentLook, TraceLook};
use crate::data::x_formatter::PolyAxis;

// ─────────────────────────────────────────────────────────────────────────────
// Per-frame snapshots
// ─────────────────────────────────────────────────────────────────────────────

struct CurveDraw {
    label: String,
    points: Vec<[f64; 2]>,
    look: TraceLook,
}

struct SegmentDraw {
    uid: SegmentId,
    start: f64,
    stop: f64,
    label: String,
    movable: bool,
}

/// What happened under the pointer on one row during this frame.
struct RowInput {
    pointer_x: Option<f64>,
    hovered: bool,
    pressed: bool,
    released: bool,
    clicked: bool,
    secondary_clicked: bool,
    bounds_changed: bool,
    /// Screen points per x unit.
    dpos_dvalue_x: f64,
}

#[derive(Debug, Clone)]
struct DragState {
    uid: SegmentId,
    row: usize,
    target: DragTarget,
    anchor: f64,
    start: f64,
    stop: f64,
}

#[derive(Debug, Clone)]
struct LabelEditor {
    uid: SegmentId,
    text: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// LineSelectPanel
// ─────────────────────────────────────────────────────────────────────────────

pub struct LineSelectPanel {
    pub look: SegmentLook,
    /// Pointer distance in screen points at which a boundary is grabbed.
    pub tolerance_px: f32,
    drag: Option<DragState>,
    hovered: Option<SegmentId>,
    editor: Option<LabelEditor>,
}

impl Default for LineSelectPanel {
    fn default() -> Self {
        Self {
            look: SegmentLook::default(),
            tolerance_px: 6.0,
            drag: None,
            hovered: None,
            editor: None,
        }
    }
}

impl LineSelectPanel {
    pub fn new(tolerance_px: f32) -> Self {
        Self {
            tolerance_px,
            ..Default::default()
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Mode toggle and view controls.
    pub fn render_controls(&mut self, ui: &mut Ui, plot: &mut LineSelectPlot) {
        ui.horizontal(|ui| {
            let mut active = plot.selection_mode();
            if ui
                .toggle_value(&mut active, "Toggle Line Selection Mode")
                .on_hover_text("Drag segment boundaries and click to create new segments")
                .changed()
            {
                plot.set_select_mode(active);
                self.drag = None;
            }
            if plot.selection_mode() {
                ui.separator();
                ui.heading(egui::RichText::new("Line Selection Active").strong());
            }

            ui.separator();
            if ui
                .button("Fit X")
                .on_hover_text("Fit all rows to their data")
                .clicked()
            {
                for row in 0..plot.rows() {
                    if let Err(e) = plot.grid_mut().autorange(row) {
                        log::warn!("autorange of row {row} failed: {e}");
                    }
                }
            }
            let mut linked = plot.grid().is_xlinked();
            if ui.checkbox(&mut linked, "Link X").changed() {
                plot.set_xlink(linked, true);
            }
            ui.separator();
            ui.label(format!("{} segments", plot.segment_count()));
        });
    }

    /// Draw every row, stacked vertically, and apply this frame's interaction.
    pub fn render_plots(&mut self, ui: &mut Ui, plot: &mut LineSelectPlot) {
        let rows = plot.rows().max(1);
        let spacing = ui.spacing().item_spacing.y;
        let height = ((ui.available_height() - spacing * (rows as f32 - 1.0)) / rows as f32)
            .max(60.0);
        let mut any_hovered = false;
        for row in 0..plot.rows() {
            any_hovered |= self.render_row(ui, plot, row, height);
        }
        if !any_hovered {
            self.hovered = None;
        }
        let ctx = ui.ctx().clone();
        self.render_label_editor(&ctx, plot);
    }

    /// Returns `true` when the pointer is over this row.
    fn render_row(&mut self, ui: &mut Ui, plot: &mut LineSelectPlot, row: usize, height: f32) -> bool {
        let Some(axes) = plot.get_plot(row, Axis::Left) else {
            return false;
        };
        let x_axis: PolyAxis = axes.x_axis().clone();
        let [xlim, ylim] = axes.view_range();
        let curves = collect_curves(plot, row, ylim);
        let segments: Vec<SegmentDraw> = plot
            .segments()
            .filter_map(|g| {
                g.segment(row).map(|s| SegmentDraw {
                    uid: g.uid().clone(),
                    start: s.start(),
                    stop: s.stop(),
                    label: s.label_text().to_string(),
                    movable: s.movable(),
                })
            })
            .collect();
        let select_mode = plot.selection_mode();
        let look = self.look.clone();
        let hovered = self.hovered.clone();

        let egui_plot = Plot::new(("line_select_row", row))
            .height(height)
            .legend(Legend::default())
            .allow_drag([!select_mode, false])
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_double_click_reset(false)
            .x_axis_formatter(move |mark, range| {
                x_axis.format_value(mark.value, [*range.start(), *range.end()], mark.step_size)
            });

        let plot_resp = egui_plot.show(ui, |plot_ui| {
            let resp = plot_ui.response().clone();
            let scroll = resp.ctx.input(|i| i.raw_scroll_delta);
            let is_zooming = (scroll.x != 0.0 || scroll.y != 0.0) && resp.hovered();
            let is_panning = !select_mode && resp.dragged_by(PointerButton::Primary);
            let bounds_changed = is_zooming || is_panning;

            if is_zooming {
                plot_ui.zoom_bounds_around_hovered(egui::Vec2::new(1.0 + scroll.y * 0.001, 1.0));
            } else if !is_panning {
                plot_ui.set_plot_bounds_x(xlim[0]..=xlim[1]);
            }
            plot_ui.set_plot_bounds_y(ylim[0]..=ylim[1]);

            for curve in curves {
                plot_ui.line(
                    Line::new(curve.label, curve.points)
                        .color(curve.look.color)
                        .width(curve.look.width)
                        .style(curve.look.style),
                );
            }

            for seg in &segments {
                let is_hovered = hovered.as_ref() == Some(&seg.uid);
                let name = format!("segment {}", seg.uid);
                plot_ui.polygon(
                    Polygon::new(
                        name.clone(),
                        vec![
                            [seg.start, ylim[0]],
                            [seg.stop, ylim[0]],
                            [seg.stop, ylim[1]],
                            [seg.start, ylim[1]],
                        ],
                    )
                    .fill_color(look.fill(seg.movable, is_hovered))
                    .stroke(Stroke::new(0.0, Color32::TRANSPARENT)),
                );
                for x in [seg.start, seg.stop] {
                    plot_ui.vline(
                        VLine::new(name.clone(), x)
                            .color(look.boundary)
                            .width(look.boundary_width),
                    );
                }
                if !seg.label.is_empty() {
                    plot_ui.text(
                        Text::new(
                            name,
                            PlotPoint::new((seg.start + seg.stop) / 2.0, ylim[1]),
                            seg.label.clone(),
                        )
                        .anchor(Align2::CENTER_TOP)
                        .color(look.label),
                    );
                }
            }

            let input = plot_ui.ctx().input(|i| {
                (
                    i.pointer.button_pressed(PointerButton::Primary),
                    i.pointer.button_released(PointerButton::Primary),
                )
            });
            RowInput {
                pointer_x: plot_ui.pointer_coordinate().map(|p| p.x),
                hovered: resp.hovered(),
                pressed: input.0,
                released: input.1,
                clicked: resp.clicked(),
                secondary_clicked: resp.secondary_clicked(),
                bounds_changed,
                dpos_dvalue_x: plot_ui.transform().dpos_dvalue_x(),
            }
        });

        let input = plot_resp.inner;
        if input.bounds_changed {
            let xr = plot_resp.transform.bounds().range_x();
            if let Err(e) = plot.set_xlim(row, [*xr.start(), *xr.end()]) {
                log::warn!("cannot apply view of row {row}: {e}");
            }
        }
        self.handle_pointer(plot, row, &input);
        input.hovered
    }

    fn handle_pointer(&mut self, plot: &mut LineSelectPlot, row: usize, input: &RowInput) {
        let tolerance = if input.dpos_dvalue_x.abs() > f64::EPSILON {
            self.tolerance_px as f64 / input.dpos_dvalue_x.abs()
        } else {
            0.0
        };
        let grab = input
            .pointer_x
            .filter(|_| input.hovered)
            .and_then(|x| plot.boundary_near(row, x, tolerance));
        if input.hovered {
            self.hovered = grab.as_ref().map(|(uid, _)| uid.clone());
        }

        // drag lifecycle
        if let Some(drag) = self.drag.clone().filter(|d| d.row == row) {
            if let Some(x) = input.pointer_x {
                let (a, b) = match drag.target {
                    DragTarget::Start => (x, drag.stop),
                    DragTarget::Stop => (drag.start, x),
                    DragTarget::Body => {
                        let dx = x - drag.anchor;
                        (drag.start + dx, drag.stop + dx)
                    }
                };
                if let Err(e) = plot.drag_segment(&drag.uid, row, a, b) {
                    log::warn!("drag of {} aborted: {e}", drag.uid);
                    self.drag = None;
                }
            }
            if input.released {
                if let Err(e) = plot.finish_drag(&drag.uid) {
                    log::warn!("cannot commit drag of {}: {e}", drag.uid);
                }
                self.drag = None;
            }
            return;
        }

        if input.secondary_clicked {
            if let Some((uid, _)) = grab.clone() {
                let text = plot
                    .segment(&uid)
                    .map(|g| g.label().to_string())
                    .unwrap_or_default();
                self.editor = Some(LabelEditor { uid, text });
            }
        }
        if !plot.selection_mode() {
            return;
        }
        if input.pressed && input.hovered {
            if let (Some(x), Some((uid, target))) = (input.pointer_x, grab.clone()) {
                if let Some(group) = plot.segment(&uid) {
                    self.drag = Some(DragState {
                        start: group.start(),
                        stop: group.stop(),
                        uid,
                        row,
                        target,
                        anchor: x,
                    });
                    return;
                }
            }
        }
        if input.clicked && grab.is_none() {
            if let Some(x) = input.pointer_x {
                match plot.click(row, x) {
                    Ok(Some(uid)) => log::info!("created segment {uid}"),
                    Ok(None) => {}
                    Err(e) => log::warn!("click on row {row} ignored: {e}"),
                }
            }
        }
    }

    fn render_label_editor(&mut self, ctx: &egui::Context, plot: &mut LineSelectPlot) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let mut open = true;
        let mut close = false;
        egui::Window::new("Segment")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Label:");
                    ui.text_edit_singleline(&mut editor.text);
                });
                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        if let Err(e) = plot.update_label(&editor.uid, &editor.text) {
                            log::warn!("label not applied: {e}");
                        }
                        close = true;
                    }
                    if ui
                        .button(format!("{} Delete", egui_phosphor::regular::TRASH))
                        .clicked()
                    {
                        if let Err(e) = plot.remove_segment(&editor.uid) {
                            log::warn!("segment not removed: {e}");
                        }
                        close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });
        if !open || close {
            self.editor = None;
        }
    }
}

/// Curves of both axes of `row`; right-axis values are mapped into the left axis range.
fn collect_curves(plot: &LineSelectPlot, row: usize, left_ylim: [f64; 2]) -> Vec<CurveDraw> {
    let grid = plot.grid();
    let mut out = Vec::new();
    for axis in [Axis::Left, Axis::Right] {
        let Some(axes) = grid.get_plot(row, axis) else {
            continue;
        };
        let [_, ylim] = axes.view_range();
        for id in axes.data_items() {
            let (Some(series), Some(look)) = (grid.curve_series(*id), grid.curve_look(*id)) else {
                continue;
            };
            let points = match axis {
                Axis::Left => series.points.clone(),
                Axis::Right => series
                    .points
                    .iter()
                    .map(|p| [p[0], remap(p[1], ylim, left_ylim)])
                    .collect(),
            };
            let label = match axis {
                Axis::Left => series.name.clone(),
                Axis::Right => format!("{} (right)", series.name),
            };
            out.push(CurveDraw {
                label,
                points,
                look: look.clone(),
            });
        }
    }
    out
}

fn remap(y: f64, from: [f64; 2], to: [f64; 2]) -> f64 {
    let span = from[1] - from[0];
    if span.abs() < f64::EPSILON {
        return (to[0] + to[1]) / 2.0;
    }
    to[0] + (y - from[0]) / span * (to[1] - to[0])
}

#[cfg(test)]
mod tests {
    use super::remap;

    #[test]
    fn remap_maps_endpoints() {
        assert_eq!(remap(10.0, [10.0, 20.0], [0.0, 1.0]), 0.0);
        assert_eq!(remap(20.0, [10.0, 20.0], [0.0, 1.0]), 1.0);
        assert_eq!(remap(5.0, [3.0, 3.0], [0.0, 1.0]), 0.5);
    }
}
