use rand::rngs::StdRng;
use rand::SeedableRng;
use sortviz::{
    natural_order, time_string, Algorithm, Board, EngineConfig, SortError, SortSession, Value,
};
use std::env::args;
use std::io::{self, Write};
use std::thread;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// rows of text used to draw one graph
const GRAPH_ROWS: usize = 10;
/// widest graph we draw, bars are sampled beyond that
const GRAPH_COLUMNS: usize = 100;

/// Algorithms which terminate in reasonable time on that many bars.
fn demo_algorithms(bar_count: usize) -> Vec<Algorithm> {
    Algorithm::ALL
        .iter()
        .copied()
        .filter(|a| match a {
            Algorithm::Bogo => bar_count <= 6,
            Algorithm::Bitonic => bar_count.is_power_of_two(),
            _ => true,
        })
        .collect()
}

fn draw_graph<W: Write>(out: &mut W, index: usize, session: &SortSession<Value>) -> io::Result<()> {
    let stats = session.stats();
    writeln!(
        out,
        "#{} {:<15} comparisons: {:<8} swaps: {:<8} accesses: {:<8} {}{}",
        index,
        session.algorithm().name(),
        stats.comparisons,
        stats.swaps,
        stats.memory_accesses,
        time_string(stats.elapsed_ns),
        if session.is_paused() { " (paused)" } else { "" },
    )?;
    let values = session.snapshot();
    let highlighted = session.highlighted();
    let tallest = values.iter().map(Value::magnitude).fold(1.0, f64::max);
    let stride = (values.len() + GRAPH_COLUMNS - 1) / GRAPH_COLUMNS.max(1);
    let columns: Vec<&Value> = values.iter().step_by(stride.max(1)).collect();
    for row in (0..GRAPH_ROWS).rev() {
        let threshold = tallest * row as f64 / GRAPH_ROWS as f64;
        let line: String = columns
            .iter()
            .map(|value| {
                if value.magnitude() <= threshold {
                    ' '
                } else if highlighted.as_ref() == Some(*value) {
                    '░'
                } else {
                    '█'
                }
            })
            .collect();
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Shuffle and sort every graph, painting them until all are done:
/// `sortviz [json config file]`
fn main() -> Result<(), SortError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let config = match args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let frame_interval = config.frame_interval();
    let mut board = Board::new(config, Value::increments)?;
    let algorithms = demo_algorithms(board.bar_count());
    for index in 0..board.graph_count() {
        let algorithm = algorithms[index % algorithms.len()];
        board.graph_mut(index)?.set_algorithm(algorithm);
    }
    board.shuffle_all(&mut rng)?;
    let mut pending = board.sort_all(natural_order)?;
    info!(graphs = board.graph_count(), bars = board.bar_count(), "sorting");

    let stdout = io::stdout();
    loop {
        let mut out = stdout.lock();
        // clear screen, cursor home
        write!(out, "\x1b[2J\x1b[H")?;
        for (index, session) in board.graphs().iter().enumerate() {
            draw_graph(&mut out, index, session)?;
        }
        out.flush()?;
        drop(out);

        let mut running = Vec::with_capacity(pending.len());
        for handle in pending {
            match handle.try_join() {
                Ok(Some(report)) => match report.outcome {
                    Ok(()) => info!(
                        algorithm = %report.algorithm,
                        time = %time_string(report.stats.elapsed_ns),
                        "sorted"
                    ),
                    Err(error) => warn!(algorithm = %report.algorithm, %error, "sort failed"),
                },
                Ok(None) => running.push(handle),
                Err(error) => warn!(algorithm = %handle.algorithm(), %error, "sort lost"),
            }
        }
        pending = running;
        if pending.is_empty() && !board.is_any_sorting() {
            break;
        }
        thread::sleep(frame_interval);
    }
    Ok(())
}
