//! Execution unit logic.
//!
//! The units are stateless: the pipeline engines own the latches and timing,
//! and call in here for the actual arithmetic and memory behavior.
//!
//! * `alu`: integer operations and branch decisions.
//! * `lsu`: effective-address computation and data-memory access.

pub mod alu;
pub mod lsu;
