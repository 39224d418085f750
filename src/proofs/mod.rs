pub mod bundle;
pub mod encode;
pub mod error;
pub mod evm;
pub mod generator;
pub mod slots;
pub mod store;

// Re-export the assembly API
pub use bundle::{ProofBundle, ResultSet};
pub use error::{ProofError, ProofResult};
pub use generator::ProofAssembler;
pub use store::{LoadResult, ProofStore};

// Re-export slot derivation for convenience
pub use slots::{array_slot, mapping_slot, two_level_mapping_slot, MappingLayout};
