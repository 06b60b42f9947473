//! Analyze a batch of workouts in parallel.
//!
//! Run with: cargo run --example batch_analysis --features parallel

use std::time::Instant;

use workout_series::{analyze_workouts, analyze_workouts_parallel, LocationFix, RawWorkoutData};

/// A straight run of `minutes` heading east, one fix per second.
fn run(minutes: usize, offset: f64) -> RawWorkoutData {
    let seconds = minutes * 60;
    let mut raw = RawWorkoutData::new(0.0, seconds as f64);
    raw.locations = (0..=seconds)
        .map(|s| LocationFix {
            latitude: 40.0 + offset,
            longitude: -3.7 + s as f64 * 0.000_035,
            altitude: 650.0 + (s as f64 / 90.0).sin() * 5.0,
            horizontal_accuracy: 6.0,
            vertical_accuracy: 4.0,
            timestamp: s as f64,
        })
        .collect();
    raw
}

fn main() {
    let mut workouts: Vec<RawWorkoutData> = (0..32)
        .map(|i| run(20 + i % 40, i as f64 * 0.01))
        .collect();
    // one broken recording
    workouts.push(RawWorkoutData::new(100.0, 50.0));

    println!("Analyzing {} workouts\n", workouts.len());

    let start = Instant::now();
    let sequential = analyze_workouts(&workouts);
    let sequential_time = start.elapsed();

    let start = Instant::now();
    let parallel = analyze_workouts_parallel(&workouts);
    let parallel_time = start.elapsed();

    println!("Sequential: {:?}", sequential_time);
    println!("Parallel:   {:?}\n", parallel_time);

    let mut total_distance = 0.0;
    for (i, analysis) in parallel.iter().enumerate() {
        match analysis {
            Ok(analysis) => total_distance += analysis.summary().distance.unwrap_or(0.0),
            Err(e) => println!("workout {} skipped: {}", i, e),
        }
    }
    let analyzed = sequential.iter().filter(|a| a.is_ok()).count();
    println!("{} analyzed, {:.1} km in total", analyzed, total_distance / 1000.0);
}
