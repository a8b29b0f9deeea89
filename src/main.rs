//! Demo: synthetic gravity channels with two stored flight lines.
//!
//! Run with `RUST_LOG=debug` to follow segment edits. An optional first
//! argument names a YAML config file. Committed edits are printed as JSON.

use std::f64::consts::PI;
use std::sync::mpsc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use flightline_plot::{run_flightline_plot, LineSelectConfig, SegmentId, SegmentStore, Series};

const SAMPLES: i64 = 7200;

fn synthetic_channels(t0: DateTime<Utc>) -> Vec<Series> {
    let times: Vec<DateTime<Utc>> = (0..SAMPLES).map(|i| t0 + Duration::seconds(i)).collect();
    let wave = |period: f64, amp: f64, offset: f64| {
        move |i: usize| offset + amp * (2.0 * PI * i as f64 / period).sin()
    };
    let gravity = wave(900.0, 12.0, 978_000.0);
    let long_acc = wave(130.0, 3.5, 0.0);
    let cross_acc = wave(75.0, 2.0, 0.0);
    let beam = wave(40.0, 0.8, 0.0);
    vec![
        Series::from_datetimes("gravity", times.iter().enumerate().map(|(i, t)| (*t, gravity(i)))),
        Series::from_datetimes("long_acc", times.iter().enumerate().map(|(i, t)| (*t, long_acc(i)))),
        Series::from_datetimes("cross_acc", times.iter().enumerate().map(|(i, t)| (*t, cross_acc(i)))),
        Series::from_datetimes("beam", times.iter().enumerate().map(|(i, t)| (*t, beam(i)))),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => LineSelectConfig::load(path)?,
        None => LineSelectConfig::default(),
    };

    let t0 = Utc
        .with_ymd_and_hms(2018, 6, 14, 16, 0, 0)
        .single()
        .ok_or("invalid demo start time")?;
    let secs = |offset: i64| (t0 + Duration::seconds(offset)).timestamp() as f64;

    let mut store = SegmentStore::new();
    store.add_segment(SegmentId::from("line-1"), secs(600), secs(1800), "Line 1")?;
    store.add_segment(SegmentId::from("line-2"), secs(3000), secs(4500), "Line 2")?;

    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for update in rx {
            match serde_json::to_string(&update) {
                Ok(json) => println!("{json}"),
                Err(e) => log::error!("cannot serialize update: {e}"),
            }
        }
    });

    run_flightline_plot(cfg, synthetic_channels(t0), store, Some(tx))?;
    if printer.join().is_err() {
        log::error!("update printer thread panicked");
    }
    Ok(())
}
