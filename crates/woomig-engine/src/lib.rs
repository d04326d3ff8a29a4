//! Product family consolidation: turns a flat product table into families of
//! variants with a consistent option schema, then into catalog rows.

pub mod emit;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod group;
pub mod normalize;
pub mod options;
pub mod pipeline;
pub mod resolve;
pub mod validate;

pub use emit::{slugify, EmittedFamily, Emitter, EnrichmentStats, VariantSlot};
pub use enrich::{
    BackupImageCatalog, Classification, Classifier, Enrichment, Estimator, ImageResolver,
    PlaceholderMatcher,
};
pub use error::EngineError;
pub use extract::{extract, ExtractedName, SizeMatch, SizeToken, Unit};
pub use group::{group, Family, FamilyOrigin, Grouping, RecordIndex};
pub use normalize::{decode_entities, normalize_text};
pub use options::{assign_options, Assignment, OptionValues};
pub use pipeline::{consolidate, Consolidation, DropEvent, EngineSettings, RunStats};
pub use resolve::{completeness_score, resolve_family, ResolvedFamily};
pub use validate::{validate_rows, ValidationIssue, ValidationReport};
