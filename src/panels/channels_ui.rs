//! The "Data Channels" dock: one checkbox per channel and plot row.

use egui::Ui;

use super::panel_trait::{Panel, PanelState};
use crate::data::grid::Axis;
use crate::data::line_select::LineSelectPlot;
use crate::data::series::Series;

#[derive(Default)]
pub struct ChannelsPanel {
    pub state: PanelState,
    channels: Vec<Series>,
}

impl ChannelsPanel {
    pub fn new(channels: Vec<Series>) -> Self {
        Self {
            state: PanelState::default(),
            channels,
        }
    }

    pub fn channels(&self) -> &[Series] {
        &self.channels
    }

    /// Offer another channel; a channel with the same name replaces the old one.
    pub fn add_channel(&mut self, series: Series) {
        self.channels
            .retain(|c| !c.name.eq_ignore_ascii_case(&series.name));
        self.channels.push(series);
    }

    fn toggle(plot: &mut LineSelectPlot, series: &Series, row: usize, axis: Axis, on: bool) {
        let result = if on {
            plot.add_series(series.clone(), row, axis, true).map(|_| ())
        } else {
            plot.remove_series(&series.name, row, axis)
        };
        if let Err(e) = result {
            log::warn!("channel '{}' on row {row}: {e}", series.name);
        }
    }
}

impl Panel for ChannelsPanel {
    fn name(&self) -> &'static str {
        "Data Channels"
    }

    fn state(&self) -> &PanelState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PanelState {
        &mut self.state
    }

    fn render_panel(&mut self, ui: &mut Ui, plot: &mut LineSelectPlot) {
        ui.horizontal(|ui| {
            ui.strong("Channels");
            if ui
                .button(format!("{} Clear", egui_phosphor::regular::BROOM))
                .on_hover_text("Remove every channel from every row")
                .clicked()
            {
                plot.clear();
            }
        });
        ui.separator();

        if self.channels.is_empty() {
            ui.label("No channels available.");
            return;
        }

        let multiy = plot.grid().is_multiy();
        let axes: &[Axis] = if multiy {
            &[Axis::Left, Axis::Right]
        } else {
            &[Axis::Left]
        };
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("channel_grid")
                .striped(true)
                .show(ui, |ui| {
                    ui.label("");
                    for row in 0..plot.rows() {
                        for axis in axes {
                            let header = match axis {
                                Axis::Left => format!("Row {}", row + 1),
                                Axis::Right => format!("Row {} R", row + 1),
                            };
                            ui.label(header);
                        }
                    }
                    ui.end_row();

                    for series in &self.channels {
                        ui.label(series.name.as_str());
                        for row in 0..plot.rows() {
                            for axis in axes {
                                let mut on = plot.get_series(&series.name, row, *axis).is_some();
                                if ui.checkbox(&mut on, "").changed() {
                                    Self::toggle(plot, series, row, *axis, on);
                                }
                            }
                        }
                        ui.end_row();
                    }
                });
        });
    }
}
