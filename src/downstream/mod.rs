//! Downstream service clients.
//!
//! # Data Flow
//! ```text
//! Route handler
//!     → service trait (DocumentStore / IngestionQueue / SafetyEvaluator /
//!       AssistantOrchestrator), live or stub, chosen at construction
//!     → facade.rs builds the URL and context-derived headers,
//!       executes one attempt, maps failures to GatewayError
//! ```
//!
//! # Design Decisions
//! - One facade per downstream service; the shared reqwest client pools
//!   connections across all chains
//! - Facade-produced errors pass through the service clients unchanged;
//!   only client-level failure modes (body decode) are translated
//! - No retries anywhere: one attempt, one terminal outcome

pub mod documents;
pub mod facade;
pub mod ingestion;
pub mod orchestrator;
pub mod safety;

pub use documents::{DocumentFilters, DocumentStore, HttpDocumentStore, StubDocumentStore};
pub use facade::{CallBody, DownstreamCallSpec, DownstreamFacade, FilePart};
pub use ingestion::{HttpIngestionQueue, IngestionQueue, StubIngestionQueue, UploadMetadata};
pub use orchestrator::{AssistantOrchestrator, HttpAssistantOrchestrator, StubAssistantOrchestrator};
pub use safety::{HttpSafetyEvaluator, SafetyEvaluator, StubSafetyEvaluator};
