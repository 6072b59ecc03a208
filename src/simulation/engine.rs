//! High-level runtime engine settings
//!
//! Selects worker count, how the collision phase is partitioned and
//! whether the spatial index is rebuilt or refreshed each sub-step

use crate::configuration::config::{IndexConfig, PartitionConfig};

#[derive(Debug, Clone)]
pub struct Engine {
    pub threads: usize, // worker count, 0 = available parallelism
    pub partition: PartitionConfig, // serial or strip-parallel collision resolve
    pub index: IndexConfig, // full rebuild or incremental refresh
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            threads: 0,
            partition: PartitionConfig::Strips,
            index: IndexConfig::Rebuild,
        }
    }
}

impl Engine {
    /// Worker count with `0` resolved against the machine.
    pub fn resolved_threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}
