//! Analyze a synthetic ride and inspect it in both domains.
//!
//! Run with: cargo run --example analyze_workout

use workout_series::{
    DomainKey, EdgeInsets, GraphGuides, LocationFix, QuantitySample, RawWorkoutData, SeriesId,
    Size, WorkoutAnalysis,
};

/// Twenty minutes along the lake shore, one fix every 5 seconds, with a hill
/// in the middle and a short stop at 10 minutes.
fn sample_ride() -> RawWorkoutData {
    let start = 700_000_000.0;
    let mut raw = RawWorkoutData::new(start, start + 1_200.0);

    let mut latitude = 46.5100;
    for i in 0..=240 {
        let seconds = i as f64 * 5.0;
        let stopped = (600.0..660.0).contains(&seconds);
        if !stopped {
            latitude += 0.00025;
        }
        let hill = (seconds / 1_200.0 * std::f64::consts::PI).sin();
        raw.locations.push(LocationFix {
            latitude,
            longitude: 6.6300 + seconds * 0.000_01,
            altitude: 372.0 + 60.0 * hill,
            horizontal_accuracy: 4.0,
            vertical_accuracy: 3.0,
            timestamp: start + seconds,
        });
    }

    // heart rate every 20 seconds, rising on the climb
    for i in 0..60 {
        let seconds = i as f64 * 20.0;
        let effort = (seconds / 1_200.0 * std::f64::consts::PI).sin();
        raw.heart_rates.push(QuantitySample::new(
            2.0 + 0.6 * effort,
            start + seconds,
            start + seconds,
        ));
    }
    raw.cycling_power.push(QuantitySample::new(180.0, start, start + 1.0));
    raw.cycling_power.push(QuantitySample::new(260.0, start + 600.0, start + 601.0));
    raw.cycling_power.push(QuantitySample::new(150.0, start + 1_200.0, start + 1_201.0));

    raw
}

fn main() {
    let raw = sample_ride();
    let analysis = match WorkoutAnalysis::try_new(&raw) {
        Ok(analysis) => analysis,
        Err(e) => {
            eprintln!("cannot analyze workout: {}", e);
            return;
        }
    };

    println!("Workout Analysis\n");

    let summary = analysis.summary();
    println!("Samples:       {}", summary.sample_count);
    println!("Duration:      {:.0} s", summary.duration);
    if let Some(distance) = summary.distance {
        println!("Distance:      {:.0} m", distance);
    }
    if let (Some(up), Some(down)) = (summary.climbing, summary.descending) {
        println!("Climbing:      +{:.0} m / {:.0} m", up, down);
    }
    if let Some(speed) = summary.average_speed {
        println!("Average speed: {:.1} km/h", speed * 3.6);
    }
    if let Some(heart_rate) = summary.average_heart_rate {
        println!("Average HR:    {:.0} bpm", heart_rate * 60.0);
    }
    println!();

    let time = analysis.time_domain();
    let Some(distance) = analysis.distance_domain() else {
        println!("No GPS track, nothing to re-key");
        return;
    };

    // pick the second quarter of the ride by distance and look at it over time
    let selection = distance.index_for_percent(0.25)..distance.index_for_percent(0.5);
    let by_time = time.segment_converting(selection.clone(), distance);
    println!("Second quarter by distance: meters {:?}, seconds {:?}", selection, by_time.range());
    println!(
        "   {:.0} s, {:.0} m, grade {:.1}%",
        by_time.duration(),
        by_time.distance().unwrap_or(0.0),
        by_time.average_grade().unwrap_or(0.0) * 100.0
    );
    if let Some(power) = by_time.average(SeriesId::CyclingPower) {
        println!("   average power {:.0} W", power);
    }
    println!();

    // the stop leaves a flat stretch in distance but not in time
    let stop = time.point(630);
    println!(
        "During the stop ({} s in): speed {:.2} m/s at {:.0} m",
        630,
        stop.speed().unwrap_or(0.0),
        stop.distance().unwrap_or(0.0)
    );
    let index_by_distance = distance.convert_index(630, time);
    println!("   same moment in the distance domain: index {}", index_by_distance);
    println!();

    for key in [DomainKey::Time, DomainKey::Distance] {
        let Some(data) = analysis.domain(key) else { continue };
        let guides = GraphGuides::new(data, data.indices(), Size::new(375.0, 120.0), EdgeInsets::uniform(8.0));
        let mut guides = match guides {
            Ok(guides) => guides,
            Err(e) => {
                eprintln!("cannot lay out graph: {}", e);
                continue;
            }
        };

        println!("Graph over {} ({} samples, factor {}):", key, data.count(), guides.config().decimation_factor());
        for id in [SeriesId::Altitude, SeriesId::HeartRate, SeriesId::Speed] {
            if let Some(guide) = guides.guide(id) {
                println!(
                    "   {:<11} {:>3} points, range [{:.2}, {:.2}], y at center {:.1}",
                    id.name(),
                    guide.path().len(),
                    guide.minimum_value(),
                    guide.maximum_value(),
                    guide.y_for_x(375.0 / 2.0)
                );
            }
        }
    }
}
