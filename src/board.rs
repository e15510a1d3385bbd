//! All graphs on screen and the controls acting on them.
//!
//! Actions apply either to the selected graph or to all graphs at once.
//! Anything reshaping the graphs is refused while one of them sorts.
use crate::config::EngineConfig;
use crate::error::{Result, SortError};
use crate::pool::WorkerPool;
use crate::session::{SortHandle, SortSession};
use crate::sort::{Algorithm, Comparator};
use crate::value::RadixKey;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, trace};

/// Most graphs a board displays.
pub const MAX_GRAPHS: usize = 8;

/// Several graphs sharing one pool of sort workers.
pub struct Board<T> {
    sessions: Vec<SortSession<T>>,
    pool: Arc<WorkerPool>,
    config: EngineConfig,
    selected: usize,
    all_selected: bool,
}

impl<T> Board<T>
where
    T: Clone + RadixKey + Send + 'static,
{
    /// Create `config.graph_count` graphs of `config.bar_count` bars.
    /// `fill` gives the values of a graph for a number of bars.
    pub fn new<F>(config: EngineConfig, mut fill: F) -> Result<Self>
    where
        F: FnMut(usize) -> Vec<T>,
    {
        let graph_count = config.graph_count.clamp(1, MAX_GRAPHS);
        let bar_count = config.bar_count.max(1);
        let pool = Arc::new(config.worker_pool(graph_count)?);
        let mut board = Board {
            sessions: Vec::with_capacity(graph_count),
            pool,
            config: EngineConfig {
                graph_count,
                bar_count,
                ..config
            },
            selected: 0,
            all_selected: false,
        };
        for _ in 0..graph_count {
            let session = board.new_session(fill(bar_count));
            board.sessions.push(session);
        }
        Ok(board)
    }

    fn new_session(&self, values: Vec<T>) -> SortSession<T> {
        let index = self.sessions.len() as u64;
        let mut session = SortSession::new(values.into_iter().collect(), Arc::clone(&self.pool));
        session.set_step_delay(self.config.step_delay());
        session.set_seed(self.config.seed.map(|seed| seed.wrapping_add(index)));
        session
    }

    /// Current settings (graph and bar counts included).
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of graphs.
    pub fn graph_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of bars per graph.
    pub fn bar_count(&self) -> usize {
        self.config.bar_count
    }

    /// All graphs.
    pub fn graphs(&self) -> &[SortSession<T>] {
        &self.sessions
    }

    /// Graph at given index.
    pub fn graph(&self, index: usize) -> Result<&SortSession<T>> {
        let len = self.sessions.len();
        self.sessions
            .get(index)
            .ok_or(SortError::OutOfRange { index, len })
    }

    /// Graph at given index, mutably.
    pub fn graph_mut(&mut self, index: usize) -> Result<&mut SortSession<T>> {
        let len = self.sessions.len();
        self.sessions
            .get_mut(index)
            .ok_or(SortError::OutOfRange { index, len })
    }

    /// Does any graph sort ?
    pub fn is_any_sorting(&self) -> bool {
        self.sessions.iter().any(SortSession::is_sorting)
    }

    fn refuse_while_sorting(&self, action: &'static str) -> Result<()> {
        if self.is_any_sorting() {
            trace!(action, "ignored, sorting");
            Err(SortError::AlreadySorting)
        } else {
            Ok(())
        }
    }

    /// Indices of the graphs actions apply to.
    pub fn selection(&self) -> Vec<usize> {
        if self.all_selected {
            (0..self.sessions.len()).collect()
        } else {
            vec![self.selected]
        }
    }

    /// Index of the focused graph.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Do actions apply to all graphs ?
    pub fn is_all_selected(&self) -> bool {
        self.all_selected
    }

    /// Focus given graph.
    pub fn select(&mut self, index: usize) -> Result<()> {
        self.refuse_while_sorting("select")?;
        self.graph(index)?;
        self.selected = index;
        Ok(())
    }

    /// Switch between acting on the focused graph and on all graphs.
    /// Returns whether all graphs are now selected.
    pub fn toggle_select_all(&mut self) -> Result<bool> {
        self.refuse_while_sorting("select all")?;
        self.all_selected = !self.all_selected;
        Ok(self.all_selected)
    }

    /// Give the next algorithm to all selected graphs.
    /// The next algorithm is the one following the focused graph's one
    /// (the first graph's one when all are selected).
    pub fn cycle_algorithm(&mut self) -> Result<Algorithm> {
        self.refuse_while_sorting("cycle algorithm")?;
        let reference = if self.all_selected { 0 } else { self.selected };
        let algorithm = self.sessions[reference].algorithm().next();
        for index in self.selection() {
            self.sessions[index].set_algorithm(algorithm);
        }
        debug!(%algorithm, "algorithm selected");
        Ok(algorithm)
    }

    /// Start the selected graphs, each with its own algorithm.
    /// Graphs already in order are left alone.
    pub fn sort_selected<C>(&self, comparator: C) -> Result<Vec<SortHandle>>
    where
        C: Comparator<T> + Clone + Send + 'static,
    {
        self.start(self.selection(), comparator)
    }

    /// Start every graph, each with its own algorithm.
    /// Graphs already in order are left alone.
    pub fn sort_all<C>(&self, comparator: C) -> Result<Vec<SortHandle>>
    where
        C: Comparator<T> + Clone + Send + 'static,
    {
        self.start((0..self.sessions.len()).collect(), comparator)
    }

    fn start<C>(&self, indices: Vec<usize>, comparator: C) -> Result<Vec<SortHandle>>
    where
        C: Comparator<T> + Clone + Send + 'static,
    {
        self.refuse_while_sorting("sort")?;
        let mut handles = Vec::with_capacity(indices.len());
        for index in indices {
            let session = &self.sessions[index];
            if session.is_sorted(&comparator) {
                trace!(graph = index, "already sorted");
                continue;
            }
            handles.push(session.start_selected(comparator.clone())?);
        }
        Ok(handles)
    }

    /// Pause or resume the selected graphs which are sorting.
    pub fn toggle_pause_selected(&self) {
        for index in self.selection() {
            let session = &self.sessions[index];
            if session.is_sorting() {
                session.toggle_pause();
            }
        }
    }

    /// Pause or resume every sorting graph.
    pub fn toggle_pause_all(&self) {
        for session in self.sessions.iter().filter(|s| s.is_sorting()) {
            session.toggle_pause();
        }
    }

    /// Shuffle the selected graphs.
    pub fn shuffle_selected<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<()> {
        self.refuse_while_sorting("shuffle")?;
        for index in self.selection() {
            self.sessions[index].shuffle(rng)?;
        }
        Ok(())
    }

    /// Shuffle every graph.
    pub fn shuffle_all<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<()> {
        self.refuse_while_sorting("shuffle")?;
        for session in &self.sessions {
            session.shuffle(rng)?;
        }
        Ok(())
    }

    /// Refill every graph with `bar_count` bars (at least one).
    pub fn set_bar_count<F>(&mut self, bar_count: usize, mut fill: F) -> Result<()>
    where
        F: FnMut(usize) -> Vec<T>,
    {
        self.refuse_while_sorting("resize bars")?;
        let bar_count = bar_count.max(1);
        for session in &self.sessions {
            session.replace_values(fill(bar_count))?;
        }
        self.config.bar_count = bar_count;
        debug!(bar_count, "bars resized");
        Ok(())
    }

    /// Grow or shrink to `graph_count` graphs (between one and `MAX_GRAPHS`).
    /// Remaining graphs keep their values and algorithm, new ones are filled
    /// with `fill`.
    pub fn set_graph_count<F>(&mut self, graph_count: usize, mut fill: F) -> Result<()>
    where
        F: FnMut(usize) -> Vec<T>,
    {
        self.refuse_while_sorting("resize graphs")?;
        let graph_count = graph_count.clamp(1, MAX_GRAPHS);
        if self.config.threads_for(graph_count) > self.pool.current_num_threads() {
            self.pool = Arc::new(self.config.worker_pool(graph_count)?);
            for session in &mut self.sessions {
                session.set_pool(Arc::clone(&self.pool));
            }
        }
        self.sessions.truncate(graph_count);
        while self.sessions.len() < graph_count {
            let session = self.new_session(fill(self.config.bar_count));
            self.sessions.push(session);
        }
        self.selected = self.selected.min(graph_count - 1);
        self.config.graph_count = graph_count;
        debug!(graph_count, "graphs resized");
        Ok(())
    }

    /// One more graph, up to `MAX_GRAPHS`.
    pub fn add_graph<F>(&mut self, fill: F) -> Result<()>
    where
        F: FnMut(usize) -> Vec<T>,
    {
        self.set_graph_count(self.graph_count() + 1, fill)
    }

    /// One graph less, keeping at least one.
    pub fn remove_graph(&mut self) -> Result<()> {
        let count = self.graph_count().saturating_sub(1);
        self.set_graph_count(count, |_| Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{natural_order, Value};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board(graph_count: usize, bar_count: usize) -> Board<Value> {
        let config = EngineConfig {
            graph_count,
            bar_count,
            step_delay_ms: 0,
            seed: Some(1),
            ..EngineConfig::default()
        };
        Board::new(config, Value::increments).unwrap()
    }

    #[test]
    fn graphs_are_created_from_config() {
        let board = board(3, 10);
        assert_eq!(board.graph_count(), 3);
        assert_eq!(board.bar_count(), 10);
        assert_eq!(board.graphs()[2].snapshot(), Value::increments(10));
        assert!(matches!(
            board.graph(3),
            Err(SortError::OutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(self::board(0, 0).graph_count(), 1);
    }

    #[test]
    fn sorted_graphs_are_skipped() {
        let mut board = board(2, 16);
        board.toggle_select_all().unwrap();
        board.graph(1).unwrap().shuffle(&mut StdRng::seed_from_u64(4)).unwrap();
        let handles = board.sort_selected(natural_order).unwrap();
        assert_eq!(handles.len(), 1);
        for handle in handles {
            assert!(handle.join().unwrap().outcome.is_ok());
        }
        assert_eq!(board.graph(1).unwrap().snapshot(), Value::increments(16));
        // nothing left to sort
        assert!(board.sort_all(natural_order).unwrap().is_empty());
    }

    #[test]
    fn cycling_applies_to_the_selection() {
        let mut board = board(2, 4);
        board.select(1).unwrap();
        assert_eq!(board.cycle_algorithm().unwrap(), Algorithm::Quick);
        assert_eq!(board.graph(0).unwrap().algorithm(), Algorithm::Bubble);
        assert_eq!(board.graph(1).unwrap().algorithm(), Algorithm::Quick);
        board.toggle_select_all().unwrap();
        assert_eq!(board.cycle_algorithm().unwrap(), Algorithm::Quick);
        assert_eq!(board.graph(0).unwrap().algorithm(), Algorithm::Quick);
        assert_eq!(board.cycle_algorithm().unwrap(), Algorithm::Merge);
        assert_eq!(board.graph(1).unwrap().algorithm(), Algorithm::Merge);
    }

    #[test]
    fn reshaping_is_refused_while_sorting() {
        let mut board = board(1, 40);
        board.graph_mut(0).unwrap().set_step_delay(std::time::Duration::from_millis(1));
        let graph = board.graph(0).unwrap();
        graph.replace_values((1..=40).rev().map(Value::Int)).unwrap();
        let handle = graph.start_selected(natural_order).unwrap();
        board.toggle_pause_all();
        assert!(board.graph(0).unwrap().is_paused());
        assert!(board.is_any_sorting());
        assert!(matches!(
            board.set_bar_count(5, Value::increments),
            Err(SortError::AlreadySorting)
        ));
        assert!(matches!(
            board.set_graph_count(3, Value::increments),
            Err(SortError::AlreadySorting)
        ));
        assert!(matches!(
            board.sort_all(natural_order),
            Err(SortError::AlreadySorting)
        ));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(board.shuffle_all(&mut rng).is_err());
        board.toggle_pause_selected();
        handle.join().unwrap();
        assert!(!board.is_any_sorting());
        board.set_bar_count(5, Value::increments).unwrap();
        assert_eq!(board.graph(0).unwrap().snapshot().len(), 5);
    }

    /// Sort every graph, pausing all of them but the last right away.
    /// The last one must finish while the others stay paused.
    fn last_graph_finishes_while_others_pause(board: &mut Board<Value>) {
        let count = board.graph_count();
        for index in 0..count {
            let graph = board.graph_mut(index).unwrap();
            if index + 1 < count {
                graph.set_step_delay(std::time::Duration::from_millis(1));
            }
            graph.replace_values((1..=30).rev().map(Value::Int)).unwrap();
        }
        let mut handles = board.sort_all(natural_order).unwrap();
        for index in 0..count - 1 {
            board.graph(index).unwrap().pause();
        }
        let last = handles.pop().unwrap();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let report = loop {
            if let Some(report) = last.try_join().unwrap() {
                break report;
            }
            assert!(std::time::Instant::now() < deadline, "last graph starved");
            std::thread::sleep(std::time::Duration::from_millis(5));
        };
        assert!(report.outcome.is_ok());
        assert!(board.graph(count - 1).unwrap().is_sorted(&natural_order));
        for index in 0..count - 1 {
            assert!(board.graph(index).unwrap().is_sorting());
        }
        board.toggle_pause_all();
        for handle in handles {
            assert!(handle.join().unwrap().outcome.is_ok());
        }
    }

    #[test]
    fn few_worker_threads_still_give_each_graph_its_own() {
        let config = EngineConfig {
            graph_count: 2,
            bar_count: 30,
            step_delay_ms: 0,
            worker_threads: Some(1),
            seed: Some(1),
            ..EngineConfig::default()
        };
        let mut board = Board::new(config, Value::increments).unwrap();
        last_graph_finishes_while_others_pause(&mut board);

        board.set_graph_count(3, Value::increments).unwrap();
        last_graph_finishes_while_others_pause(&mut board);
    }

    #[test]
    fn graph_count_changes_keep_existing_graphs() {
        let mut board = board(1, 3);
        board.graph_mut(0).unwrap().set_algorithm(Algorithm::Radix);
        board.graph(0).unwrap().replace_values(vec![Value::Int(9)]).unwrap();
        board.select(0).unwrap();
        board.set_graph_count(20, Value::increments).unwrap();
        assert_eq!(board.graph_count(), MAX_GRAPHS);
        assert_eq!(board.graph(0).unwrap().algorithm(), Algorithm::Radix);
        assert_eq!(board.graph(0).unwrap().snapshot(), vec![Value::Int(9)]);
        assert_eq!(board.graph(1).unwrap().snapshot(), Value::increments(3));
        board.select(MAX_GRAPHS - 1).unwrap();
        board.remove_graph().unwrap();
        assert_eq!(board.graph_count(), MAX_GRAPHS - 1);
        assert_eq!(board.selected(), MAX_GRAPHS - 2);
        board.set_graph_count(0, Value::increments).unwrap();
        assert_eq!(board.graph_count(), 1);
        board.add_graph(Value::increments).unwrap();
        assert_eq!(board.graph_count(), 2);
    }
}
