pub mod channels_ui;
pub mod line_select_ui;
pub mod panel_trait;

pub use channels_ui::ChannelsPanel;
pub use line_select_ui::LineSelectPanel;
pub use panel_trait::{Panel, PanelState};
