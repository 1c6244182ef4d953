//! Audit analysis stages. Each stage degrades to a deterministic fallback
//! instead of failing, so callers always get a complete answer.

pub mod orchestrator;
pub mod photo;
pub mod structured;
pub mod summary;
pub mod urgency;

pub use orchestrator::*;
pub use photo::*;
pub use structured::*;
pub use summary::*;
pub use urgency::*;
