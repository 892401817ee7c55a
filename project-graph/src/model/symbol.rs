//! Symbol trees: raw descriptors from the language service and the enriched
//! [`Symbol`] records the pipeline mutates in place.

use crate::model::{kind::SymbolKind, span::Range};
use serde::{Deserialize, Serialize};

/// Placeholder prefix for `this.<field>` constructor parameters.
pub const SELF_FIELD_PREFIX: &str = "self_field:";

/// Symbol descriptor as delivered by the language service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSymbol {
    pub name: String,
    pub kind: u32,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub range: Option<Range>,
    #[serde(default)]
    pub selection_range: Option<Range>,
    #[serde(default)]
    pub children: Vec<RawSymbol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Private,
}

impl Access {
    /// Dart privacy is lexical: a leading underscore.
    pub fn of(name: &str) -> Self {
        if name.starts_with('_') {
            Access::Private
        } else {
            Access::Public
        }
    }
}

/// Where a resolved type is declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDefinition {
    pub name: String,
    pub kind: SymbolKind,
    pub file_id: String,
    pub selection_range: Option<Range>,
    pub is_sdk: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeReference {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<TypeDefinition>,
}

impl TypeReference {
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedParameter {
    /// Type text, or `self_field:<name>` until the closure pass runs.
    #[serde(rename = "type")]
    pub ty: String,
    pub name: Option<String>,
    pub is_named: bool,
    pub is_required: bool,
    pub is_optional_positional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<TypeReference>,
}

impl ParsedParameter {
    /// Field name behind a `this.<field>` placeholder.
    pub fn self_field(&self) -> Option<&str> {
        self.ty.strip_prefix(SELF_FIELD_PREFIX)
    }
}

/// One inheritance target: a bare name or a resolved reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationTarget {
    Name(String),
    Resolved(TypeReference),
}

impl RelationTarget {
    pub fn name(&self) -> &str {
        match self {
            RelationTarget::Name(n) => n,
            RelationTarget::Resolved(r) => &r.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Relations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<RelationTarget>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<RelationTarget>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub with: Vec<RelationTarget>,
}

impl Relations {
    pub fn is_empty(&self) -> bool {
        self.extends.is_none() && self.implements.is_empty() && self.with.is_empty()
    }

    /// All target names: extends, then implements, then with.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.extends
            .iter()
            .chain(self.implements.iter())
            .chain(self.with.iter())
            .map(RelationTarget::name)
    }
}

/// Enriched symbol. Owned by its file; children are owned by their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub detail: String,
    pub range: Option<Range>,
    pub selection_range: Option<Range>,
    pub file_id: String,
    pub children: Vec<Symbol>,
    pub unique_id: String,
    pub parent_id: Option<String>,
    pub access: Option<Access>,
    pub is_sdk: bool,
    pub resolved_type: Option<String>,
    pub resolved_type_ref: Option<TypeReference>,
    pub return_type: Option<String>,
    pub return_type_ref: Option<TypeReference>,
    pub parameters: Option<Vec<ParsedParameter>>,
    pub relations: Option<Relations>,
    #[serde(default)]
    pub hover_checked: bool,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, file_id: impl Into<String>) -> Self {
        let name = name.into();
        let file_id = file_id.into();
        let unique_id = format!("{file_id}#{name}#{}", kind.code());
        Self {
            name,
            kind,
            detail: String::new(),
            range: None,
            selection_range: None,
            file_id,
            children: Vec::new(),
            unique_id,
            parent_id: None,
            access: None,
            is_sdk: false,
            resolved_type: None,
            resolved_type_ref: None,
            return_type: None,
            return_type_ref: None,
            parameters: None,
            relations: None,
            hover_checked: false,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, SymbolKind::Class | SymbolKind::Enum) || !self.children.is_empty()
    }

    /// Depth-first pre-order walk over this symbol and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Symbol)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Symbol forest of one file plus the text it was read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSymbols {
    pub file_id: String,
    #[serde(skip)]
    pub text: String,
    pub symbols: Vec<Symbol>,
}

impl FileSymbols {
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Symbol)) {
        for sym in &self.symbols {
            sym.walk(visit);
        }
    }
}
