use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinError;

use super::aggregator::{load_knowledge_base, KnowledgeBlock};

/// Where request handlers get their knowledge block from.
///
/// `Cached` is built once at start-up and shared read-only by every request.
/// `PerRequest` re-reads the directory each time, for knowledge directories
/// that operators edit while the service runs.
#[derive(Debug, Clone)]
pub enum KnowledgeSource {
    Cached(Arc<KnowledgeBlock>),
    PerRequest(PathBuf),
}

impl KnowledgeSource {
    /// Load the block now and keep it for the process lifetime
    pub fn cached(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self::Cached(Arc::new(load_knowledge_base(&dir)))
    }

    /// Wrap an already built block
    pub fn from_block(block: KnowledgeBlock) -> Self {
        Self::Cached(Arc::new(block))
    }

    /// Current knowledge block
    pub async fn block(&self) -> Arc<KnowledgeBlock> {
        match self {
            Self::Cached(block) => Arc::clone(block),
            Self::PerRequest(dir) => {
                let dir = dir.clone();
                match tokio::task::spawn_blocking(move || load_knowledge_base(&dir)).await {
                    Ok(block) => Arc::new(block),
                    Err(e) => Arc::new(reload_failed(&e)),
                }
            }
        }
    }
}

fn reload_failed(err: &JoinError) -> KnowledgeBlock {
    tracing::error!("Knowledge reload task failed: {}", err);
    KnowledgeBlock::degraded(format!("knowledge reload task failed: {}", err))
}
