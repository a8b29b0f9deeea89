//! Visual styling for plotted curves and segment regions.

use egui::Color32;
use egui_plot::LineStyle;

/// The visual presentation of one plotted curve.
#[derive(Debug, Clone)]
pub struct TraceLook {
    pub color: Color32,
    pub width: f32,
    pub style: LineStyle,
}

impl Default for TraceLook {
    fn default() -> Self {
        Self {
            color: Color32::GRAY,
            width: 1.5,
            style: LineStyle::Solid,
        }
    }
}

impl TraceLook {
    /// A look whose colour is allocated from the palette by curve index.
    pub fn new(index: usize) -> Self {
        Self {
            color: Self::alloc_color(index),
            ..Default::default()
        }
    }

    /// Distinct colour for the given index (wraps after ten).
    pub fn alloc_color(index: usize) -> Color32 {
        const PALETTE: [Color32; 10] = [
            Color32::from_rgb(31, 119, 180),
            Color32::from_rgb(255, 127, 14),
            Color32::from_rgb(44, 160, 44),
            Color32::from_rgb(214, 39, 40),
            Color32::from_rgb(148, 103, 189),
            Color32::from_rgb(140, 86, 75),
            Color32::from_rgb(227, 119, 194),
            Color32::from_rgb(127, 127, 127),
            Color32::from_rgb(188, 189, 34),
            Color32::from_rgb(23, 190, 207),
        ];
        PALETTE[index % PALETTE.len()]
    }
}

/// Colours of a segment region, depending on whether it can be dragged.
#[derive(Debug, Clone)]
pub struct SegmentLook {
    pub locked_fill: Color32,
    pub movable_fill: Color32,
    pub hover_fill: Color32,
    pub boundary: Color32,
    pub label: Color32,
    pub boundary_width: f32,
}

impl Default for SegmentLook {
    fn default() -> Self {
        Self {
            locked_fill: Color32::from_rgba_unmultiplied(120, 120, 200, 40),
            movable_fill: Color32::from_rgba_unmultiplied(0, 160, 255, 60),
            hover_fill: Color32::from_rgba_unmultiplied(0, 200, 255, 100),
            boundary: Color32::from_rgb(0, 140, 230),
            label: Color32::WHITE,
            boundary_width: 1.5,
        }
    }
}

impl SegmentLook {
    pub fn fill(&self, movable: bool, hovered: bool) -> Color32 {
        match (movable, hovered) {
            (true, true) => self.hover_fill,
            (true, false) => self.movable_fill,
            (false, _) => self.locked_fill,
        }
    }
}
