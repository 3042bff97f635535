// Knowledge base aggregation
//
// Reads the operator-managed knowledge directory (plain-text and markdown
// files) and concatenates it into one block that is prepended to every
// generation request. Failure to read the directory never propagates: the
// caller always gets a usable block, degraded to an error placeholder.

mod aggregator;
mod source;

pub use aggregator::{load_knowledge_base, KnowledgeBlock, FAILURE_MARKER};
pub use source::KnowledgeSource;
