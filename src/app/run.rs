//! Entry point for running the flight-line plot as a native window.

use std::sync::mpsc::Sender;

use eframe::egui;

use crate::config::LineSelectConfig;
use crate::data::series::Series;
use crate::data::store::SegmentStore;
use crate::events::LineUpdate;

use super::FlightPlotApp;

/// Open a window showing `channels` with the segments of `store` and block until it closes.
///
/// Every committed edit is sent to `updates` when given.
pub fn run_flightline_plot(
    cfg: LineSelectConfig,
    channels: Vec<Series>,
    store: SegmentStore,
    updates: Option<Sender<LineUpdate>>,
) -> eframe::Result<()> {
    let mut app = FlightPlotApp::new(&cfg, channels, store)
        .map_err(|e| eframe::Error::AppCreation(Box::new(e)))?;
    if let Some(tx) = updates {
        app = app.with_update_sink(tx);
    }

    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(egui::vec2(cfg.window_size[0], cfg.window_size[1]))
            .with_title(cfg.title.clone()),
        ..Default::default()
    };

    eframe::run_native(
        &cfg.title,
        opts,
        Box::new(|cc| {
            // Install Phosphor icon font before creating the app.
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(app))
        }),
    )
}
