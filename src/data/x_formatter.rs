//! Bottom-axis tick formatting for plot rows.
//!
//! Every row of the grid carries a [`PolyAxis`] on its bottom edge. The axis can
//! render its ticks either as plain numbers ([`AxisFormatter::Scalar`]) or as
//! wall-clock times ([`AxisFormatter::DateTime`]), and the formatter can be
//! swapped per row at runtime without touching the other rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MINUTE_SECS: f64 = 60.0;
const HOUR_SECS: f64 = 60.0 * MINUTE_SECS;
const DAY_SECS: f64 = 24.0 * HOUR_SECS;
const WEEK_SECS: f64 = 7.0 * DAY_SECS;

// ─────────────────────────────────────────────────────────────────────────────
// AxisFormatter
// ─────────────────────────────────────────────────────────────────────────────

/// Selects how the bottom axis of a row renders its tick values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisFormatter {
    /// Plain numbers: `123.45`, switching to `1.23e5` for very large or small steps.
    #[default]
    Scalar,
    /// Values are POSIX seconds and are rendered as UTC wall-clock times.
    DateTime,
}

impl std::fmt::Display for AxisFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AxisFormatter::Scalar => write!(f, "scalar"),
            AxisFormatter::DateTime => write!(f, "datetime"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PolyAxis
// ─────────────────────────────────────────────────────────────────────────────

/// An axis whose tick labels are either numeric or date-time.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyAxis {
    formatter: AxisFormatter,
    /// Decimal places used by scalar labels.
    pub decimal_places: usize,
}

impl Default for PolyAxis {
    fn default() -> Self {
        Self::new(AxisFormatter::Scalar)
    }
}

impl PolyAxis {
    pub fn new(formatter: AxisFormatter) -> Self {
        Self {
            formatter,
            decimal_places: 3,
        }
    }

    pub fn formatter(&self) -> AxisFormatter {
        self.formatter
    }

    pub fn set_formatter(&mut self, formatter: AxisFormatter) {
        self.formatter = formatter;
    }

    /// `true` when ticks are rendered as date-times.
    pub fn is_time_axis(&self) -> bool {
        self.formatter == AxisFormatter::DateTime
    }

    /// Produce one label per tick value.
    ///
    /// For a date-time axis the format is picked from the range covered by the
    /// ticks themselves, so a dense minute-long window reads `MM:SS` while a
    /// multi-day window reads `mm-dd HH`. `spacing` is the distance between
    /// neighbouring ticks and drives the scalar notation choice.
    ///
    /// ```
    /// # use flightline_plot::data::x_formatter::{AxisFormatter, PolyAxis};
    /// let axis = PolyAxis::new(AxisFormatter::DateTime);
    /// assert_eq!(axis.tick_strings(&[0.0, 30.0], 30.0), vec!["00:00", "00:30"]);
    /// ```
    pub fn tick_strings(&self, values: &[f64], spacing: f64) -> Vec<String> {
        if values.is_empty() {
            return Vec::new();
        }
        match self.formatter {
            AxisFormatter::Scalar => values
                .iter()
                .map(|v| format_adaptive_numeric(*v, self.decimal_places, spacing))
                .collect(),
            AxisFormatter::DateTime => {
                let (lo, hi) = values
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(*v), hi.max(*v))
                    });
                let pattern = date_pattern_for_range(hi - lo);
                values
                    .iter()
                    .map(|v| secs_to_utc(*v).format(pattern).to_string())
                    .collect()
            }
        }
    }

    /// Format a single value for a tick or cursor readout given the visible range.
    pub fn format_value(&self, value: f64, visible: [f64; 2], step: f64) -> String {
        match self.formatter {
            AxisFormatter::Scalar => format_adaptive_numeric(value, self.decimal_places, step),
            AxisFormatter::DateTime => {
                let span = (visible[1] - visible[0]).abs();
                let pattern = if span <= DAY_SECS {
                    "%H:%M:%S"
                } else {
                    "%Y-%m-%d %H:%M:%S"
                };
                secs_to_utc(value).format(pattern).to_string()
            }
        }
    }
}

/// strftime pattern for a set of ticks spanning `range_secs`.
fn date_pattern_for_range(range_secs: f64) -> &'static str {
    if range_secs <= MINUTE_SECS {
        "%M:%S"
    } else if range_secs <= HOUR_SECS {
        "%H:%M"
    } else if range_secs <= DAY_SECS {
        "%d %H:%M"
    } else if range_secs <= WEEK_SECS {
        "%m-%d %H"
    } else {
        "%Y-%m-%d"
    }
}

/// Seconds since the epoch to UTC; non-finite or out-of-range values map to the epoch.
pub(crate) fn secs_to_utc(secs: f64) -> DateTime<Utc> {
    if !secs.is_finite() {
        return DateTime::<Utc>::UNIX_EPOCH;
    }
    let whole = secs.floor();
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(whole as i64, nanos).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

// ─────────────────────────────────────────────────────────────────────────────
// Numeric helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Render `value` as compact scientific notation like `1.23e5` or `-4.00e-2`.
fn format_scientific(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return format!("{:.*}", digits, 0.0_f64);
    }
    if !value.is_finite() {
        return format!("{}", value);
    }
    let exp = value.abs().log10().floor() as i32;
    let mantissa = value / 10f64.powi(exp);
    if exp == 0 {
        format!("{:.*}", digits, mantissa)
    } else {
        format!("{:.*}e{}", digits, mantissa, exp)
    }
}

/// Decimal notation unless the tick step is far outside `10^±dec_pl`.
fn format_adaptive_numeric(v: f64, dec_pl: usize, step: f64) -> String {
    let sci = if step.is_finite() && step != 0.0 {
        let exp = step.abs().log10().floor() as i32;
        exp < -(dec_pl as i32) || exp >= dec_pl as i32 + 3
    } else {
        false
    };
    if sci {
        format_scientific(v, dec_pl)
    } else {
        format!("{:.*}", dec_pl, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scientific_keeps_sign_and_exponent() {
        assert_eq!(format_scientific(-0.04, 2), "-4.00e-2");
        assert_eq!(format_scientific(12_300.0, 2), "1.23e4");
        assert_eq!(format_scientific(0.0, 1), "0.0");
    }

    #[test]
    fn adaptive_switches_to_scientific_for_tiny_steps() {
        assert_eq!(format_adaptive_numeric(1.5, 2, 0.1), "1.50");
        assert!(format_adaptive_numeric(0.00012, 2, 0.00001).contains('e'));
    }

    #[test]
    fn secs_to_utc_handles_nan() {
        assert_eq!(secs_to_utc(f64::NAN), DateTime::<Utc>::UNIX_EPOCH);
    }
}
