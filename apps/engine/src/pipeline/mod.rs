// Reconciliation pipeline: tokenize → assemble → reconcile → order.
// Every stage is total — malformed input degrades to `Other` sections, never
// an error — and every heuristic threshold or table hangs off EngineConfig.

pub mod assemble;
pub mod classify;
pub mod order;
pub mod reconcile;
pub mod tokenize;
