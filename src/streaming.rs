//! Incremental work queues drained once per tick.
//!
//! Following the stage pattern: Enqueue → Tick → Report
//!
//! ```text
//!   update_camera ──► create / release      (visible set changed)
//!   load(dir)     ──► load                  (every visible leaf)
//!   save(dir)     ──► save                  (overlay, then cache)
//!
//!   tick(host):  for each queue in that order,
//!                  pop items until `items_per_tick` of them completed
//!                  Stale answers are dropped and do not count
//! ```
//!
//! An item is never processed twice: a coordinate already waiting in a
//! queue is not queued again, and a popped item is gone whatever its
//! outcome. Failures are reported, never retried.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};
use web_time::Instant;

use crate::config::StreamingSettings;
use crate::error::{Result, TerrainError};
use crate::types::ChunkCoord;

/// FIFO that ignores items already waiting.
#[derive(Clone, Debug)]
pub struct WorkQueue<T> {
  items: VecDeque<T>,
  waiting: HashSet<T>,
}

impl<T> Default for WorkQueue<T> {
  fn default() -> Self {
    Self {
      items: VecDeque::new(),
      waiting: HashSet::new(),
    }
  }
}

impl<T: Copy + Eq + Hash> WorkQueue<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Queue an item; `false` when it is already waiting.
  pub fn push(&mut self, item: T) -> bool {
    if !self.waiting.insert(item) {
      return false;
    }
    self.items.push_back(item);
    true
  }

  pub fn pop(&mut self) -> Option<T> {
    let item = self.items.pop_front()?;
    self.waiting.remove(&item);
    Some(item)
  }

  pub fn contains(&self, item: &T) -> bool {
    self.waiting.contains(item)
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn clear(&mut self) {
    self.items.clear();
    self.waiting.clear();
  }
}

impl<T: Copy + Eq + Hash> Extend<T> for WorkQueue<T> {
  fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
    for item in iter {
      self.push(item);
    }
  }
}

/// What the host did with one queued item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkOutcome {
  Done,
  /// No longer relevant; dropped without using budget.
  Stale,
}

/// Executes queued items against terrain state.
pub trait StreamingHost {
  fn create_chunk(&mut self, coord: ChunkCoord) -> Result<WorkOutcome>;
  fn release_chunk(&mut self, coord: ChunkCoord) -> Result<WorkOutcome>;
  fn load_field(&mut self, dir: &Path, coord: ChunkCoord) -> Result<WorkOutcome>;
  fn save_field(&mut self, dir: &Path, coord: ChunkCoord) -> Result<WorkOutcome>;
}

/// Work done by one tick.
#[derive(Debug, Default)]
pub struct TickReport {
  pub created: usize,
  pub released: usize,
  pub loaded: usize,
  pub saved: usize,
  /// Stale items dropped.
  pub dropped: usize,
  pub failures: Vec<(ChunkCoord, TerrainError)>,
  pub elapsed_us: u64,
}

impl TickReport {
  /// Items completed, failures included.
  pub fn processed(&self) -> usize {
    self.created + self.released + self.loaded + self.saved
  }
}

/// Create, release, load and save queues with a per-tick budget.
pub struct StreamingCoordinator {
  items_per_tick: usize,
  create: WorkQueue<ChunkCoord>,
  release: WorkQueue<ChunkCoord>,
  load: WorkQueue<ChunkCoord>,
  load_dir: Option<PathBuf>,
  save: WorkQueue<ChunkCoord>,
  save_dir: Option<PathBuf>,
}

impl StreamingCoordinator {
  pub fn new(settings: &StreamingSettings) -> Self {
    Self {
      items_per_tick: settings.items_per_tick,
      create: WorkQueue::new(),
      release: WorkQueue::new(),
      load: WorkQueue::new(),
      load_dir: None,
      save: WorkQueue::new(),
      save_dir: None,
    }
  }

  pub fn items_per_tick(&self) -> usize {
    self.items_per_tick
  }

  pub fn queue_create(&mut self, coords: impl IntoIterator<Item = ChunkCoord>) {
    self.create.extend(coords);
  }

  pub fn queue_release(&mut self, coords: impl IntoIterator<Item = ChunkCoord>) {
    self.release.extend(coords);
  }

  /// Start a load pass from `dir`. Returns `false`, queueing nothing,
  /// while a previous load is still draining.
  pub fn queue_load(&mut self, dir: PathBuf, coords: impl IntoIterator<Item = ChunkCoord>) -> bool {
    if !self.load.is_empty() {
      return false;
    }
    self.load_dir = Some(dir);
    self.load.extend(coords);
    true
  }

  /// Start a save pass into `dir`. Returns `false` while a previous save is
  /// still draining.
  pub fn queue_save(&mut self, dir: PathBuf, coords: impl IntoIterator<Item = ChunkCoord>) -> bool {
    if !self.save.is_empty() {
      return false;
    }
    self.save_dir = Some(dir);
    self.save.extend(coords);
    true
  }

  pub fn create_pending(&self) -> usize {
    self.create.len()
  }

  pub fn release_pending(&self) -> usize {
    self.release.len()
  }

  pub fn load_pending(&self) -> usize {
    self.load.len()
  }

  pub fn save_pending(&self) -> usize {
    self.save.len()
  }

  pub fn is_idle(&self) -> bool {
    self.create.is_empty() && self.release.is_empty() && self.load.is_empty() && self.save.is_empty()
  }

  /// Drop pending creation and release work.
  pub fn clear_visibility_work(&mut self) {
    self.create.clear();
    self.release.clear();
  }

  /// Drain every queue up to the per-tick budget.
  pub fn tick(&mut self, host: &mut impl StreamingHost) -> TickReport {
    let start = Instant::now();
    let budget = self.items_per_tick;
    let mut report = TickReport::default();

    report.created = drain(&mut self.create, budget, &mut report, |c| host.create_chunk(c));
    report.released = drain(&mut self.release, budget, &mut report, |c| host.release_chunk(c));
    if let Some(dir) = self.load_dir.as_deref() {
      report.loaded = drain(&mut self.load, budget, &mut report, |c| host.load_field(dir, c));
    }
    if let Some(dir) = self.save_dir.as_deref() {
      report.saved = drain(&mut self.save, budget, &mut report, |c| host.save_field(dir, c));
    }

    report.elapsed_us = start.elapsed().as_micros() as u64;
    if report.processed() + report.dropped > 0 {
      trace!(
        created = report.created,
        released = report.released,
        loaded = report.loaded,
        saved = report.saved,
        dropped = report.dropped,
        elapsed_us = report.elapsed_us,
        "streaming tick"
      );
    }
    report
  }
}

fn drain(
  queue: &mut WorkQueue<ChunkCoord>,
  budget: usize,
  report: &mut TickReport,
  mut run: impl FnMut(ChunkCoord) -> Result<WorkOutcome>,
) -> usize {
  let mut done = 0;
  while done < budget {
    let Some(coord) = queue.pop() else {
      break;
    };
    match run(coord) {
      Ok(WorkOutcome::Done) => done += 1,
      Ok(WorkOutcome::Stale) => {
        trace!(?coord, "stale item dropped");
        report.dropped += 1;
      }
      Err(err) => {
        warn!(?coord, %err, "queued work failed");
        report.failures.push((coord, err));
        done += 1;
      }
    }
  }
  done
}

#[cfg(test)]
#[path = "streaming_test.rs"]
mod streaming_test;
