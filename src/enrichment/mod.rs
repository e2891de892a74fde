//! Best-effort enrichment of finalized agent utterances
//!
//! Finalized agent speech is handed to a pluggable `FieldExtractor`
//! which may detect the spoken language, a stated client name, an
//! address, or an emergency category. Detections come back as
//! `FieldUpdate` events; failures are silent no-ops. Timeline
//! correctness never depends on this module.

mod extractor;
mod fields;
mod pipeline;

pub use extractor::{Enrichment, FieldExtractor, KeywordExtractor, NoopExtractor};
pub use fields::{FieldKind, FieldUpdate, SessionFields};
pub use pipeline::{EnrichmentPipeline, EnrichmentResult};
