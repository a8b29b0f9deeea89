//! Standalone application for flight-line selection.
//!
//! | Sub-module     | Responsibility |
//! | -------------- | -------------- |
//! | [`flight_app`] | [`FlightPlotApp`] (eframe) owning the plot, the segment store and the panels |
//! | [`run`]        | Top-level [`run_flightline_plot()`] entry point |

mod flight_app;
mod run;

pub use flight_app::FlightPlotApp;
pub use run::run_flightline_plot;
