//! Distribution policy: decides which global indices each rank owns, and
//! keeps that ownership stable as the time-window filter erases indices.

use log::debug;

use crate::Result;

/// Contract every distribution policy satisfies: a partition of `{0..N-1}`
/// across ranks, with record atomicity declared rather than assumed.
pub trait Distribution {
    /// This rank's currently owned global indices, in stable ascending
    /// order.
    fn owned(&self) -> &[usize];

    /// Remove `i` from the owned set if present. Must leave a stable,
    /// repeatable order among the indices that remain.
    fn erase(&mut self, i: usize);

    /// Whether this policy guarantees record atomicity: every index
    /// sharing a record id lands on the same rank.
    fn is_record_atomic(&self) -> bool;
}

/// Reference policy: record `k` is assigned to rank `k mod R`. When no
/// record-group vector is supplied, each global index is its own record,
/// so index `i` goes to rank `i mod R`.
#[derive(Clone, Debug)]
pub struct RoundRobin {
    owned: Vec<usize>,
}

impl RoundRobin {
    /// Build the owned-index set for `rank` of `total_ranks`, over
    /// `n` global indices, with an optional per-index record id vector
    /// (`record_group[i]`; defaults to `i` itself when absent).
    pub fn new(n: usize, rank: usize, total_ranks: usize, record_group: Option<&[usize]>) -> Result<RoundRobin> {
        if total_ranks == 0 {
            return crate::err_at!(InvalidConfig, msg: "total_ranks must be > 0");
        }
        if let Some(g) = record_group {
            if g.len() != n {
                return crate::err_at!(
                    InvalidConfig,
                    msg: "record-group vector has length {}, expected {}",
                    g.len(),
                    n
                );
            }
        }

        let owned: Vec<usize> = (0..n)
            .filter(|&i| {
                let record_id = record_group.map(|g| g[i]).unwrap_or(i);
                record_id % total_ranks == rank
            })
            .collect();
        debug!(target: "roundrobin", "rank {}/{}, owns {} of {} indices", rank, total_ranks, owned.len(), n);
        Ok(RoundRobin { owned })
    }
}

impl Distribution for RoundRobin {
    fn owned(&self) -> &[usize] {
        &self.owned
    }

    fn erase(&mut self, i: usize) {
        self.owned.retain(|&x| x != i);
    }

    fn is_record_atomic(&self) -> bool {
        true
    }
}

/// Splits `{0..N-1}` into `R` contiguous, near-equal chunks, one per
/// rank. Ignores any record-group vector and declares no record
/// atomicity.
#[derive(Clone, Debug)]
pub struct EvenChunk {
    owned: Vec<usize>,
}

impl EvenChunk {
    pub fn new(n: usize, rank: usize, total_ranks: usize) -> Result<EvenChunk> {
        if total_ranks == 0 {
            return crate::err_at!(InvalidConfig, msg: "total_ranks must be > 0");
        }
        let base = n / total_ranks;
        let rem = n % total_ranks;
        let start = rank * base + rank.min(rem);
        let len = base + if rank < rem { 1 } else { 0 };
        Ok(EvenChunk { owned: (start..start + len).collect() })
    }
}

impl Distribution for EvenChunk {
    fn owned(&self) -> &[usize] {
        &self.owned
    }

    fn erase(&mut self, i: usize) {
        self.owned.retain(|&x| x != i);
    }

    fn is_record_atomic(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "distribution_test.rs"]
mod distribution_test;
