//! [`FlightPlotApp`] wires a [`LineSelectPlot`] to a [`SegmentStore`] and draws
//! it with the line-selection and channel panels.

use std::sync::mpsc::{Receiver, Sender};

use eframe::egui;

use crate::config::LineSelectConfig;
use crate::data::grid::Axis;
use crate::data::line_select::LineSelectPlot;
use crate::data::series::Series;
use crate::data::store::SegmentStore;
use crate::error::Result;
use crate::events::{EventFilter, EventKind, LineUpdate, PlotEvent};
use crate::panels::{ChannelsPanel, LineSelectPanel, Panel};

// ─────────────────────────────────────────────────────────────────────────────
// FlightPlotApp
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level application state.
///
/// Committed segment edits are drained from the plot's event channel once per
/// frame, persisted into [`store`](Self::store) and, when a sink is attached,
/// forwarded to the host.
pub struct FlightPlotApp {
    pub plot: LineSelectPlot,
    pub store: SegmentStore,
    pub title: String,
    line_panel: LineSelectPanel,
    channels_panel: ChannelsPanel,
    updates: Receiver<PlotEvent>,
    update_sink: Option<Sender<LineUpdate>>,
}

impl FlightPlotApp {
    /// Build the plot from `cfg` and load every segment in `store` without notifications.
    ///
    /// The first `rows` channels are plotted one per row; the rest wait in the channel dock.
    pub fn new(cfg: &LineSelectConfig, channels: Vec<Series>, store: SegmentStore) -> Result<Self> {
        cfg.validate()?;
        let mut plot = LineSelectPlot::with_config(cfg);
        let seeded = store.seed(&mut plot)?;
        log::info!("loaded {seeded} stored segments");
        // first channel on the first row, second on the second, ...
        for (row, series) in channels.iter().take(plot.rows()).enumerate() {
            plot.add_series(series.clone(), row, Axis::Left, true)?;
        }
        let updates = plot.subscribe(EventFilter::only(EventKind::SEGMENT_CHANGED));
        Ok(Self {
            plot,
            store,
            title: cfg.title.clone(),
            line_panel: LineSelectPanel::new(cfg.boundary_tolerance_px),
            channels_panel: ChannelsPanel::new(channels),
            updates,
            update_sink: None,
        })
    }

    /// Also send every committed [`LineUpdate`] to `tx`.
    pub fn with_update_sink(mut self, tx: Sender<LineUpdate>) -> Self {
        self.update_sink = Some(tx);
        self
    }

    pub fn channels_panel_mut(&mut self) -> &mut ChannelsPanel {
        &mut self.channels_panel
    }

    /// Persist pending segment changes; returns how many were applied.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(evt) = self.updates.try_recv() {
            let Some(update) = evt.segment else {
                continue;
            };
            match self.store.apply(&update) {
                Ok(()) => applied += 1,
                Err(e) => log::error!("segment {} not stored: {e}", update.uid),
            }
            if let Some(tx) = &self.update_sink {
                if tx.send(update).is_err() {
                    log::debug!("update sink closed");
                    self.update_sink = None;
                }
            }
        }
        applied
    }

    fn render_channels(&mut self, ctx: &egui::Context) {
        let state = *self.channels_panel.state();
        if !state.visible {
            return;
        }
        if state.detached {
            let mut open = true;
            egui::Window::new(self.channels_panel.name())
                .open(&mut open)
                .show(ctx, |ui| {
                    if ui.button("Dock").clicked() {
                        self.channels_panel.state_mut().detached = false;
                    }
                    self.channels_panel.render_panel(ui, &mut self.plot);
                });
            if !open {
                self.channels_panel.state_mut().visible = false;
            }
        } else {
            egui::SidePanel::right("channels_dock")
                .resizable(true)
                .default_width(260.0)
                .show(ctx, |ui| {
                    if ui.small_button("Detach").clicked() {
                        self.channels_panel.state_mut().detached = true;
                    }
                    self.channels_panel.render_panel(ui, &mut self.plot);
                });
        }
    }
}

impl eframe::App for FlightPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("flight_top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let state = self.channels_panel.state_mut();
                ui.toggle_value(&mut state.visible, "Data Channels");
                ui.separator();
                self.line_panel.render_controls(ui, &mut self.plot);
            });
        });

        self.render_channels(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.line_panel.render_plots(ui, &mut self.plot);
        });

        self.process_events();
    }
}
