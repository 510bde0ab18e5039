pub mod engines;
pub mod orchestrator;
pub mod pipeline;
