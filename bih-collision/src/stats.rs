use std::{
    fmt::Display,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use lazy_static::lazy_static;

/// A shared node of the timing tree.
pub type StatsNode = Arc<Mutex<Stats>>;

lazy_static! {
    static ref ROOT_STATS: StatsNode = Arc::new(Mutex::new(Stats::new(1)));
}

/// A node of the hierarchical timing tree. Every node accumulates the time of all recordings
/// registered on it and keeps its children in the order they were first requested.
pub struct Stats {
    depth: usize,
    elapsed: Duration,
    num_recordings: usize,
    children: Vec<(String, StatsNode)>,
}

/// Adds the time between its creation and its drop to the node it was created for.
pub struct TimeRecording {
    dst_node: StatsNode,
    t0: Instant,
}

pub trait StatsNodeTrait {
    /// Starts a new time recording on the node.
    fn register_timing(&self) -> TimeRecording;

    /// Returns the child node with the given name and creates it if needed.
    fn get_child(&self, name: &str) -> StatsNode;

    /// Returns the accumulated time of the node.
    fn elapsed(&self) -> Duration;

    /// Formats the node and all its children.
    fn report(&self) -> String;
}

/// Locks the node. A poisoned node is still used, the timings are plain counters.
fn lock(node: &StatsNode) -> MutexGuard<'_, Stats> {
    node.lock().unwrap_or_else(|e| e.into_inner())
}

impl StatsNodeTrait for StatsNode {
    fn register_timing(&self) -> TimeRecording {
        TimeRecording {
            dst_node: self.clone(),
            t0: Instant::now(),
        }
    }

    fn get_child(&self, name: &str) -> StatsNode {
        lock(self).child(name)
    }

    fn elapsed(&self) -> Duration {
        lock(self).elapsed
    }

    fn report(&self) -> String {
        lock(self).to_string()
    }
}

impl Drop for TimeRecording {
    #[inline]
    fn drop(&mut self) {
        let elapsed = self.t0.elapsed();

        let mut node = lock(&self.dst_node);
        node.elapsed += elapsed;
        node.num_recordings += 1;
    }
}

impl Stats {
    /// Returns the root stats node
    #[inline]
    pub fn root() -> StatsNode {
        ROOT_STATS.clone()
    }

    /// Creates a new detached root node, e.g., for measuring a single run.
    pub fn new_root() -> StatsNode {
        Arc::new(Mutex::new(Stats::new(1)))
    }

    /// Returns the number of finished recordings of the node.
    #[inline]
    pub fn num_recordings(&self) -> usize {
        self.num_recordings
    }

    /// Returns the elapsed time of the node in milliseconds.
    #[inline]
    pub fn as_millis_f64(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1e3f64
    }

    fn child(&mut self, name: &str) -> StatsNode {
        if let Some((_, node)) = self.children.iter().find(|(n, _)| n == name) {
            return node.clone();
        }

        let node = Arc::new(Mutex::new(Stats::new(self.depth + 1)));
        self.children.push((name.to_owned(), node.clone()));

        node
    }

    fn new(depth: usize) -> Self {
        Self {
            depth,
            elapsed: Duration::ZERO,
            num_recordings: 0,
            children: Vec::new(),
        }
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.num_recordings > 1 {
            write!(
                f,
                "{:.3} ms ({}x, {:.3} ms avg)",
                self.as_millis_f64(),
                self.num_recordings,
                self.as_millis_f64() / self.num_recordings as f64
            )?;
        } else if self.num_recordings == 1 {
            write!(f, "{:.3} ms", self.as_millis_f64())?;
        }

        if self.children.is_empty() {
            return writeln!(f);
        }

        writeln!(f, " {{")?;
        for (name, child) in self.children.iter() {
            write!(f, "{:indent$}{}: ", "", name, indent = self.depth * 2)?;
            lock(child).fmt(f)?;
        }

        writeln!(f, "{:indent$}}}", "", indent = (self.depth - 1) * 2)
    }
}
