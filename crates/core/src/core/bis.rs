//! The branch-information snapshot: a per-IQE checkpoint of everything
//! needed to restore precise state on a misprediction (spec.md §4.7).

use super::predictor::{Predictor, Ras};
use super::regfile::{Ucrf, Uprf};
use super::rename::RenameTable;
use crate::config::Config;

/// Copy of rename table, predictor table, return stack, and the
/// forwarding UPRF/UCRF, taken at Dispatch.
///
/// Cloning all of this per dispatched instruction is O(rename_size +
/// predictor_size + phys_reg_count), exactly the cost spec.md §4.7 calls
/// out and accepts for a simulator of this size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BisSnapshot {
    pub rename: RenameTable,
    pub predictor: Predictor,
    pub ras: Ras,
    pub fwd_uprf: Uprf,
    pub fwd_ucrf: Ucrf,
}

impl BisSnapshot {
    /// Takes a snapshot of the four pieces of live state named above.
    #[must_use]
    pub fn capture(
        rename: &RenameTable,
        predictor: &Predictor,
        ras: &Ras,
        fwd_uprf: &Uprf,
        fwd_ucrf: &Ucrf,
    ) -> Self {
        Self {
            rename: rename.clone(),
            predictor: predictor.clone(),
            ras: ras.clone(),
            fwd_uprf: fwd_uprf.clone(),
            fwd_ucrf: fwd_ucrf.clone(),
        }
    }

    /// An empty snapshot matching a freshly reset machine; never actually
    /// read back (the reset-state IQE never mispredicts before it's
    /// replaced), but needed so HALT-class slots have *something* at
    /// construction time.
    #[must_use]
    pub fn blank(config: &Config) -> Self {
        Self {
            rename: RenameTable::new(config),
            predictor: Predictor::new(config.predictor_table_size),
            ras: Ras::new(config.return_stack_capacity),
            fwd_uprf: Uprf::new(config.uprf_size),
            fwd_ucrf: Ucrf::new(config.ucrf_size),
        }
    }
}
