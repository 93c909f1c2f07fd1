pub mod calculators;
pub mod effects;
pub mod engine;
pub mod log;
pub mod requests;
pub mod state;
pub mod stats;
pub mod turn_orchestrator;

#[cfg(test)]
pub(crate) mod tests;
