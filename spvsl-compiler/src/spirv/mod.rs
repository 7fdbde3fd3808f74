//! SPIR-V emission: the module writer and access chains into variables.

mod access_chain;
mod writer;

pub use access_chain::AccessChain;
pub use writer::SpvWriter;
