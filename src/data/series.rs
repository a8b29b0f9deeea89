//! Named data series fed into the plot grid by the host.

use chrono::{DateTime, Utc};

/// How the x values of a [`Series`] should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexKind {
    /// Positional or arbitrary numeric index.
    #[default]
    Numeric,
    /// POSIX seconds (converted from date-times on construction).
    DateTime,
}

/// A named, ordered sequence of `[x, y]` samples.
///
/// The name is kept exactly as given; the grid lower-cases it when keying.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub name: String,
    pub index_kind: IndexKind,
    pub points: Vec<[f64; 2]>,
}

impl Series {
    /// Build a series indexed by position (`0, 1, 2, ...`).
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            name: name.into(),
            index_kind: IndexKind::Numeric,
            points: values
                .into_iter()
                .enumerate()
                .map(|(i, v)| [i as f64, v])
                .collect(),
        }
    }

    /// Build a series from explicit numeric `[x, y]` pairs.
    pub fn from_points(name: impl Into<String>, points: Vec<[f64; 2]>) -> Self {
        Self {
            name: name.into(),
            index_kind: IndexKind::Numeric,
            points,
        }
    }

    /// Build a time-indexed series; timestamps are stored as POSIX seconds.
    pub fn from_datetimes(
        name: impl Into<String>,
        samples: impl IntoIterator<Item = (DateTime<Utc>, f64)>,
    ) -> Self {
        Self {
            name: name.into(),
            index_kind: IndexKind::DateTime,
            points: samples
                .into_iter()
                .map(|(t, v)| [datetime_to_secs(&t), v])
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest and largest x value, ignoring non-finite samples.
    pub fn x_bounds(&self) -> Option<[f64; 2]> {
        bounds(self.points.iter().map(|p| p[0]))
    }

    /// Smallest and largest y value, ignoring non-finite samples.
    pub fn y_bounds(&self) -> Option<[f64; 2]> {
        bounds(self.points.iter().map(|p| p[1]))
    }
}

/// Fractional POSIX seconds for a UTC date-time.
pub(crate) fn datetime_to_secs(t: &DateTime<Utc>) -> f64 {
    t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) * 1e-9
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<[f64; 2]> {
    let mut out: Option<[f64; 2]> = None;
    for v in values.filter(|v| v.is_finite()) {
        out = Some(match out {
            Some([lo, hi]) => [lo.min(v), hi.max(v)],
            None => [v, v],
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_index_starts_at_zero() {
        let s = Series::new("gravity", [3.0, 4.0, 5.0]);
        assert_eq!(s.points[0], [0.0, 3.0]);
        assert_eq!(s.x_bounds(), Some([0.0, 2.0]));
        assert_eq!(s.y_bounds(), Some([3.0, 5.0]));
    }

    #[test]
    fn bounds_skip_nan() {
        let s = Series::from_points("x", vec![[f64::NAN, 1.0], [2.0, f64::NAN], [4.0, 0.5]]);
        assert_eq!(s.x_bounds(), Some([2.0, 4.0]));
        assert_eq!(s.y_bounds(), Some([0.5, 1.0]));
        assert_eq!(Series::default().x_bounds(), None);
    }

    #[test]
    fn datetimes_become_posix_seconds() {
        let t = DateTime::from_timestamp(1_500_000_000, 500_000_000).unwrap();
        let s = Series::from_datetimes("gps", [(t, 1.0)]);
        assert_eq!(s.index_kind, IndexKind::DateTime);
        assert!((s.points[0][0] - 1_500_000_000.5).abs() < 1e-6);
    }
}
