//! Symbol table.
//!
//! Tern has no lexical scoping of names: one flat table covers the whole
//! compilation unit. Redeclaring a name overwrites its type, which is
//! accepted looseness of the language rather than an error.

use crate::error::{CapacityError, Resource};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Static type of a Tern value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    List,
    Dict,
    Tuple,
    Unknown,
}

impl Type {
    /// Declaration keywords, in dispatch order.
    pub const KEYWORDS: [(&'static str, Type); 7] = [
        ("int", Type::Int),
        ("float", Type::Float),
        ("bool", Type::Bool),
        ("string", Type::String),
        ("list", Type::List),
        ("dict", Type::Dict),
        ("tuple", Type::Tuple),
    ];

    /// Type named by a declaration keyword.
    pub fn from_keyword(word: &str) -> Option<Type> {
        Self::KEYWORDS
            .iter()
            .find(|(kw, _)| *kw == word)
            .map(|(_, ty)| *ty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Bool => "bool",
            Type::String => "string",
            Type::List => "list",
            Type::Dict => "dict",
            Type::Tuple => "tuple",
            Type::Unknown => "unknown",
        }
    }

    /// Containers are backed by runtime structs rather than C scalars.
    pub fn is_container(self) -> bool {
        matches!(self, Type::List | Type::Dict | Type::Tuple)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub is_const: bool,
}

/// Flat, capacity-bounded map from identifier to variable.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    vars: HashMap<String, Variable>,
    capacity: usize,
}

impl SymbolTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vars: HashMap::new(),
            capacity,
        }
    }

    /// Insert or overwrite a variable.
    ///
    /// Overwriting never fails; a new name is refused once the table holds
    /// `capacity` entries, leaving the table untouched.
    pub fn register(&mut self, name: &str, ty: Type, is_const: bool) -> Result<(), CapacityError> {
        if let Some(var) = self.vars.get_mut(name) {
            var.ty = ty;
            var.is_const = is_const;
            return Ok(());
        }
        if self.vars.len() >= self.capacity {
            return Err(CapacityError {
                resource: Resource::Variables,
                limit: self.capacity,
            });
        }
        self.vars.insert(
            name.to_string(),
            Variable {
                name: name.to_string(),
                ty,
                is_const,
            },
        );
        Ok(())
    }

    /// Type of `name`, or [`Type::Unknown`] when it was never declared.
    pub fn lookup(&self, name: &str) -> Type {
        self.vars.get(name).map_or(Type::Unknown, |v| v.ty)
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::with_capacity(crate::config::Limits::default().max_vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_unknown() {
        let table = SymbolTable::default();
        assert_eq!(table.lookup("x"), Type::Unknown);
    }

    #[test]
    fn test_redeclaration_overwrites_type() {
        let mut table = SymbolTable::default();
        table.register("x", Type::Int, false).unwrap();
        table.register("x", Type::String, true).unwrap();
        assert_eq!(table.lookup("x"), Type::String);
        assert!(table.get("x").unwrap().is_const);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_capacity_refuses_new_names_only() {
        let mut table = SymbolTable::with_capacity(2);
        table.register("a", Type::Int, false).unwrap();
        table.register("b", Type::Int, false).unwrap();
        let err = table.register("c", Type::Int, false).unwrap_err();
        assert_eq!(err.resource, Resource::Variables);
        assert_eq!(err.limit, 2);
        assert_eq!(table.lookup("c"), Type::Unknown);
        assert!(table.register("a", Type::List, false).is_ok());
        assert_eq!(table.lookup("a"), Type::List);
    }

    #[test]
    fn test_type_keywords() {
        assert_eq!(Type::from_keyword("dict"), Some(Type::Dict));
        assert_eq!(Type::from_keyword("char"), None);
        assert!(Type::Tuple.is_container());
        assert!(!Type::String.is_container());
    }
}
