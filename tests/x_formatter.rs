use flightline_plot::data::x_formatter::*;

// Helper: build a UTC timestamp as seconds
fn utc_secs(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> f64 {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
    let ndt = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        NaiveTime::from_hms_opt(h, m, s).unwrap(),
    );
    chrono::Utc.from_utc_datetime(&ndt).timestamp() as f64
}

#[test]
fn default_axis_is_scalar() {
    let axis = PolyAxis::default();
    assert_eq!(axis.formatter(), AxisFormatter::Scalar);
    assert!(!axis.is_time_axis());
}

#[test]
fn sub_minute_ticks_use_minutes_and_seconds() {
    let axis = PolyAxis::new(AxisFormatter::DateTime);
    let t = utc_secs(2018, 6, 14, 16, 5, 10);
    assert_eq!(
        axis.tick_strings(&[t, t + 20.0, t + 40.0], 20.0),
        vec!["05:10", "05:30", "05:50"]
    );
}

#[test]
fn sub_hour_ticks_use_hours_and_minutes() {
    let axis = PolyAxis::new(AxisFormatter::DateTime);
    let t = utc_secs(2018, 6, 14, 16, 0, 0);
    assert_eq!(
        axis.tick_strings(&[t, t + 1800.0, t + 3600.0], 1800.0),
        vec!["16:00", "16:30", "17:00"]
    );
}

#[test]
fn sub_day_ticks_include_day_of_month() {
    let axis = PolyAxis::new(AxisFormatter::DateTime);
    let t = utc_secs(2018, 6, 14, 6, 0, 0);
    assert_eq!(
        axis.tick_strings(&[t, t + 43_200.0], 43_200.0),
        vec!["14 06:00", "14 18:00"]
    );
}

#[test]
fn sub_week_ticks_use_month_day_hour() {
    let axis = PolyAxis::new(AxisFormatter::DateTime);
    let t = utc_secs(2018, 6, 14, 6, 0, 0);
    assert_eq!(
        axis.tick_strings(&[t, t + 3.0 * 86_400.0], 86_400.0),
        vec!["06-14 06", "06-17 06"]
    );
}

#[test]
fn long_ranges_use_full_dates() {
    let axis = PolyAxis::new(AxisFormatter::DateTime);
    let t = utc_secs(2018, 6, 1, 0, 0, 0);
    assert_eq!(
        axis.tick_strings(&[t, t + 30.0 * 86_400.0], 30.0 * 86_400.0),
        vec!["2018-06-01", "2018-07-01"]
    );
}

#[test]
fn empty_tick_list_yields_no_strings() {
    let axis = PolyAxis::new(AxisFormatter::DateTime);
    assert!(axis.tick_strings(&[], 1.0).is_empty());
}

#[test]
fn scalar_ticks_are_decimal_for_ordinary_steps() {
    let axis = PolyAxis::new(AxisFormatter::Scalar);
    assert_eq!(
        axis.tick_strings(&[0.0, 0.5, 1.0], 0.5),
        vec!["0.000", "0.500", "1.000"]
    );
}

#[test]
fn scalar_ticks_switch_to_scientific_for_huge_steps() {
    let axis = PolyAxis::new(AxisFormatter::Scalar);
    let ticks = axis.tick_strings(&[0.0, 1.0e7], 1.0e7);
    assert_eq!(ticks[1], "1.000e7");
}

#[test]
fn switching_formatter_changes_rendering() {
    let mut axis = PolyAxis::new(AxisFormatter::Scalar);
    let t = utc_secs(2018, 6, 14, 16, 0, 0);
    assert!(!axis.format_value(t, [t, t + 60.0], 10.0).contains(':'));
    axis.set_formatter(AxisFormatter::DateTime);
    assert_eq!(axis.format_value(t, [t, t + 60.0], 10.0), "16:00:00");
    assert_eq!(
        axis.format_value(t, [t, t + 3.0 * 86_400.0], 86_400.0),
        "2018-06-14 16:00:00"
    );
}

#[test]
fn formatter_parses_from_lowercase_names() {
    let f: AxisFormatter = serde_yaml::from_str("datetime").unwrap();
    assert_eq!(f, AxisFormatter::DateTime);
    assert_eq!(AxisFormatter::Scalar.to_string(), "scalar");
}
