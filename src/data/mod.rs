pub mod grid;
pub mod line_select;
pub mod segments;
pub mod series;
pub mod store;
pub mod trace_look;
pub mod x_formatter;
