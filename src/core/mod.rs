//! Core gateway logic
//!
//! Model resolution, backend clients, concurrent generation, judging, and
//! best-candidate selection.

pub mod clients;
pub mod generate;
pub mod judge;
pub mod orchestrator;
pub mod providers;
pub mod registry;

pub use clients::{ClientCache, RoutedBackend};
pub use generate::CandidateResponse;
pub use judge::{FallbackReason, Judge, LlmJudge, Verdict};
pub use orchestrator::{EvaluatedCandidate, GatewayResult};
pub use providers::{BackendFamily, CompletionBackend, ProviderHandle};
