// src/reduce/blocking.rs
use crate::error::{CorrDbError, Result};
use crate::types::{Block, Sample};
use crate::utils::{bit_identical, mean_series};

/// How many consecutive measurements go into one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockingOptions {
    /// Number of trajectories (or measurements, without time-source averaging) per block.
    pub block_size: usize,
    /// Fold every time source of a trajectory into the same block.
    pub avg_tsrc: bool,
}

impl Default for BlockingOptions {
    fn default() -> Self {
        BlockingOptions { block_size: 1, avg_tsrc: false }
    }
}

impl BlockingOptions {
    pub fn new(block_size: usize, avg_tsrc: bool) -> Self {
        BlockingOptions { block_size, avg_tsrc }
    }

    /// Effective group size `G`, derived from the measured time-source count.
    pub fn group_size(&self, tsrc_count: usize) -> Result<usize> {
        if self.block_size == 0 {
            return Err(CorrDbError::InvalidConfig("block size must be at least 1".into()));
        }
        let group = if self.avg_tsrc { self.block_size * tsrc_count } else { self.block_size };
        if group == 0 {
            return Err(CorrDbError::NoConfigurationsFound(
                "no time sources per configuration to block over".into(),
            ));
        }
        Ok(group)
    }
}

/// What the next input sample means for the group being accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// Same trajectory as the previous sample, or the very first sample.
    AccumulatingBlock,
    /// A new trajectory of the same series starts.
    TrajectoryBoundary,
    /// A new series starts; the partial group is dropped.
    SeriesBoundary,
}

struct Blocker<'a> {
    group_size: usize,
    tsrc_count: usize,
    nt: usize,
    buffer: Vec<&'a Sample>,
    /// Trajectory of the run being read and how many samples it has had so far.
    run: Option<((char, u32), usize)>,
    blocks: Vec<Block>,
}

impl<'a> Blocker<'a> {
    fn classify(&self, next: &Sample) -> BlockState {
        match self.run {
            None => BlockState::AccumulatingBlock,
            Some(((series, _), _)) if series != next.id.series => BlockState::SeriesBoundary,
            Some((key, _)) if key != next.id.trajectory_key() => BlockState::TrajectoryBoundary,
            Some(_) => BlockState::AccumulatingBlock,
        }
    }

    fn push(&mut self, sample: &'a Sample) -> Result<()> {
        let key = sample.id.trajectory_key();

        match self.classify(sample) {
            BlockState::SeriesBoundary => {
                if !self.buffer.is_empty() {
                    log::debug!(
                        "series change at {}: dropping {} unblocked entries",
                        sample.id,
                        self.buffer.len()
                    );
                }
                self.buffer.clear();
                self.run = Some((key, 1));
            }
            BlockState::TrajectoryBoundary => {
                if let Some((previous, seen)) = self.run {
                    if seen < self.tsrc_count {
                        self.evict_trajectory(previous, seen);
                    }
                }
                self.run = Some((key, 1));
            }
            BlockState::AccumulatingBlock => {
                self.run = match self.run {
                    Some((k, seen)) => Some((k, seen + 1)),
                    None => Some((key, 1)),
                };
            }
        }

        self.buffer.push(sample);
        if self.buffer.len() == self.group_size {
            self.finalize()?;
        }
        Ok(())
    }

    /// Drops the still-buffered samples of an incomplete trajectory.
    fn evict_trajectory(&mut self, trajectory: (char, u32), seen: usize) {
        let mut evicted = 0;
        while self
            .buffer
            .last()
            .map_or(false, |s| s.id.trajectory_key() == trajectory)
        {
            self.buffer.pop();
            evicted += 1;
        }
        if evicted > 0 {
            log::debug!(
                "trajectory {}{:05} has {} of {} time sources: evicted {} entries",
                trajectory.0,
                trajectory.1,
                seen,
                self.tsrc_count,
                evicted
            );
        }
    }

    fn finalize(&mut self) -> Result<()> {
        for (i, a) in self.buffer.iter().enumerate() {
            for b in &self.buffer[i + 1..] {
                if bit_identical(&a.values, &b.values) {
                    return Err(CorrDbError::DuplicateInBlock {
                        first: a.id.to_string(),
                        second: b.id.to_string(),
                    });
                }
            }
        }

        let values = mean_series(self.buffer.iter().map(|s| s.values.as_slice()), self.nt);
        let id = self
            .buffer
            .iter()
            .map(|s| s.id.to_string())
            .collect::<Vec<_>>()
            .join(Block::ID_SEPARATOR);

        self.blocks.push(Block { id, values });
        self.buffer.clear();
        Ok(())
    }
}

/// Partitions duplicate-free, canonically ordered samples into consecutive
/// groups of `group_size` and averages each group.
///
/// Groups never span two series. A trajectory seen with fewer than
/// `tsrc_count` time sources is removed from the group being filled.
/// Trailing samples that never fill a group are dropped.
pub fn block_samples(samples: &[Sample], tsrc_count: usize, group_size: usize) -> Result<Vec<Block>> {
    if group_size == 0 {
        return Err(CorrDbError::InvalidConfig("group size must be at least 1".into()));
    }

    let nt = samples.first().map_or(0, |s| s.values.len());
    let mut blocker = Blocker {
        group_size,
        tsrc_count,
        nt,
        buffer: Vec::with_capacity(group_size),
        run: None,
        blocks: Vec::with_capacity(samples.len() / group_size),
    };

    for sample in samples {
        blocker.push(sample)?;
    }

    if !blocker.buffer.is_empty() {
        log::debug!("dropping {} trailing entries that do not fill a block", blocker.buffer.len());
    }
    Ok(blocker.blocks)
}
