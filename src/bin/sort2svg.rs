use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use sortviz::{natural_order, record, write_svg_file, Algorithm, Value};
use std::env::args;
use tracing_subscriber::EnvFilter;

/// Sort shuffled bars and save the animation:
/// `sort2svg <algorithm> <bar count> <svg file> [json trace file]`
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let algorithm: Algorithm = args()
        .nth(1)
        .expect("missing algorithm as first argument")
        .parse()
        .expect("unknown algorithm");
    let bar_count: usize = args()
        .nth(2)
        .expect("missing bar count as second argument")
        .parse()
        .expect("bar count is not a number");
    let svg_file = args()
        .nth(3)
        .expect("missing svg file name as third argument");

    let mut rng = StdRng::seed_from_u64(0);
    let mut values = Value::increments(bar_count);
    values.shuffle(&mut rng);
    let trace = record(algorithm, values, &natural_order, &mut rng).expect("sort failed");
    println!(
        "{}: {} steps, {} comparisons, {} swaps",
        algorithm, trace.stats.steps, trace.stats.comparisons, trace.stats.swaps
    );
    write_svg_file(&trace, Value::magnitude, 800, 400, 10, &svg_file)
        .expect("failed to save svg file");
    if let Some(json_file) = args().nth(4) {
        trace.save(&json_file).expect("failed to save json file");
    }
}
