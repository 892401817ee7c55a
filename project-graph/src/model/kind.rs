//! Symbol kinds as reported by the language service.
//!
//! The wire format is the LSP `SymbolKind` number. Only the kinds the
//! pipeline reasons about get their own variant; everything else is kept as
//! [`SymbolKind::Other`] so it round-trips and still gets a stable id prefix.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Dart extensions are reported as namespaces.
    Namespace,
    Class,
    Method,
    Property,
    Field,
    Constructor,
    Enum,
    Function,
    Typedef,
    Other(u32),
}

impl SymbolKind {
    /// Map an LSP `SymbolKind` code.
    pub fn from_code(code: u32) -> Self {
        match code {
            3 => Self::Namespace,
            5 => Self::Class,
            6 => Self::Method,
            7 => Self::Property,
            8 => Self::Field,
            9 => Self::Constructor,
            10 => Self::Enum,
            12 => Self::Function,
            // Type aliases arrive as 22 from the Dart server.
            22 => Self::Typedef,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Self::Namespace => 3,
            Self::Class => 5,
            Self::Method => 6,
            Self::Property => 7,
            Self::Field => 8,
            Self::Constructor => 9,
            Self::Enum => 10,
            Self::Function => 12,
            Self::Typedef => 22,
            Self::Other(code) => code,
        }
    }

    /// Human-readable kind string used as the node `kind`.
    pub fn as_str(self) -> String {
        match self {
            Self::Namespace => "namespace".into(),
            Self::Class => "class".into(),
            Self::Method => "method".into(),
            Self::Property => "property".into(),
            Self::Field => "field".into(),
            Self::Constructor => "constructor".into(),
            Self::Enum => "enum".into(),
            Self::Function => "function".into(),
            Self::Typedef => "typedef".into(),
            Self::Other(code) => format!("kind_{code}"),
        }
    }

    /// Short prefix embedded in global node ids.
    pub fn id_prefix(self) -> String {
        match self {
            Self::Namespace => "ext".into(),
            Self::Class => "class".into(),
            Self::Method => "method".into(),
            Self::Property => "prop".into(),
            Self::Field => "field".into(),
            Self::Constructor => "ctor".into(),
            Self::Enum => "enum".into(),
            Self::Function => "func".into(),
            Self::Typedef => "typedef".into(),
            Self::Other(code) => format!("k{code}"),
        }
    }

    /// Kinds a type name can resolve to.
    pub fn is_type_definition(self) -> bool {
        matches!(self, Self::Class | Self::Enum | Self::Typedef)
    }

    pub fn is_callable(self) -> bool {
        matches!(self, Self::Method | Self::Function | Self::Constructor)
    }

    pub fn is_field_like(self) -> bool {
        matches!(self, Self::Field | Self::Property)
    }
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl Serialize for SymbolKind {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u32(self.code())
    }
}

impl<'de> Deserialize<'de> for SymbolKind {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        u32::deserialize(d).map(Self::from_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_keep_their_number() {
        let k = SymbolKind::from_code(13);
        assert_eq!(k, SymbolKind::Other(13));
        assert_eq!(k.as_str(), "kind_13");
        assert_eq!(k.id_prefix(), "k13");
        assert_eq!(k.code(), 13);
    }

    #[test]
    fn prefixes_are_short_forms() {
        assert_eq!(SymbolKind::Constructor.id_prefix(), "ctor");
        assert_eq!(SymbolKind::Function.id_prefix(), "func");
        assert_eq!(SymbolKind::Namespace.id_prefix(), "ext");
        assert_eq!(SymbolKind::Property.as_str(), "property");
    }

    #[test]
    fn typedef_uses_code_22() {
        assert_eq!(SymbolKind::from_code(22), SymbolKind::Typedef);
        assert_eq!(SymbolKind::Typedef.code(), 22);
        assert_eq!(SymbolKind::from_code(26), SymbolKind::Other(26));
        assert!(SymbolKind::from_code(22).is_type_definition());
    }
}
