use crate::{
    analysis::enrich::{EnrichEnv, SymbolEnricher},
    core::names::is_sdk_file,
    model::{
        kind::SymbolKind,
        symbol::{Access, RelationTarget, Relations, Symbol},
    },
};
use tracing::debug;

/// Origin flag, access level and (for classes) inheritance relations.
pub struct BasicInfo;

impl SymbolEnricher for BasicInfo {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn applies(&self, sym: &Symbol, _env: &EnrichEnv<'_>) -> bool {
        sym.access.is_none() || (sym.kind == SymbolKind::Class && sym.relations.is_none())
    }

    fn enrich(&self, sym: &mut Symbol, env: &EnrichEnv<'_>) {
        sym.is_sdk = is_sdk_file(&sym.file_id);
        sym.access = Some(Access::of(&sym.name));

        if sym.kind != SymbolKind::Class || sym.relations.is_some() {
            return;
        }
        let Some(found) = env.ctx.relations.get(&sym.file_id, &sym.name) else {
            return;
        };

        let resolve = |t: &RelationTarget| {
            let reference = env.ctx.types.resolve(t.name());
            if reference.definition.is_some() {
                RelationTarget::Resolved(reference)
            } else {
                t.clone()
            }
        };
        sym.relations = Some(Relations {
            extends: found.extends.as_ref().map(resolve),
            implements: found.implements.iter().map(resolve).collect(),
            with: found.with.iter().map(resolve).collect(),
        });
        debug!(class = %sym.name, "Attached class relations");
    }
}
