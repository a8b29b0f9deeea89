use egui::Ui;

use crate::data::line_select::LineSelectPlot;

#[derive(Debug, Clone, Copy)]
pub struct PanelState {
    pub visible: bool,
    pub detached: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            visible: true,
            detached: false,
        }
    }
}

/// A dockable side panel operating on the line-selection plot.
pub trait Panel {
    fn name(&self) -> &'static str;
    fn state(&self) -> &PanelState;
    fn state_mut(&mut self) -> &mut PanelState;

    fn render_panel(&mut self, _ui: &mut Ui, _plot: &mut LineSelectPlot) {}
}
