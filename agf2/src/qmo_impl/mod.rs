//! Quasi-particle transform of the two-electron integrals
//!
//! The transform contracts three indices of `(xq|rs)` with the couplings of
//! occupied and virtual Green's-function poles. Whether the result is held
//! in memory or streamed to disk in blocks of the physical index is decided
//! once per call from a memory budget and the process's current usage.

mod memory;
mod transform;

pub use memory::{FixedMemory, MemoryProbe, ProcessMemory};
pub use transform::{
    make_qmo_eris, plan_for_spin, plan_strategy, transform_rows, ContractionDims, QmoTensor,
    TransformStrategy,
};
