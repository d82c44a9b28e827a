//! Lead aggregation pipeline: adapter fan-out, dedupe, validation, ranking
//! and the in-memory store used when no database is configured.

pub mod dedupe;
pub mod export;
pub mod memory_store;
pub mod pipeline;
pub mod status;

pub use dedupe::{dedup_key, dedupe};
pub use export::leads_to_csv;
pub use memory_store::InMemoryLeadStore;
pub use pipeline::{
    summarize, LeadDescriber, LeadPipeline, PipelineError, PipelineResult, PipelineSettings,
    SourceSummary, NO_LEADS_MESSAGE,
};
pub use status::{source_statuses, ServiceKind, SourceStatus};
