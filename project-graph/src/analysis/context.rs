//! Per-run analysis state.
//!
//! Holds everything that used to be process-wide: the type cache and the
//! relation index. One context per run keeps repeated or concurrent analyses
//! of different projects isolated.

use crate::{
    analysis::{relations::RelationIndex, types::TypeResolver},
    config::AnalysisConfig,
    model::symbol::FileSymbols,
};

#[derive(Debug, Default)]
pub struct AnalysisContext {
    pub config: AnalysisConfig,
    pub types: TypeResolver,
    pub relations: RelationIndex,
}

impl AnalysisContext {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            types: TypeResolver::default(),
            relations: RelationIndex::default(),
        }
    }

    /// Forget everything derived from a previous run.
    pub fn reset(&mut self) {
        self.types.clear();
        self.relations = RelationIndex::default();
    }

    /// Reset, then index the project's declarations and class relations.
    pub fn prepare(&mut self, files: &[FileSymbols]) {
        self.reset();
        self.types.index_files(files);
        self.relations = RelationIndex::build(files);
    }
}
