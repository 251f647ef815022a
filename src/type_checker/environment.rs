//! Scopes and the symbols declared in them.
//!
//! The checker only talks to scopes through `SymbolTable`; `Scopes` is the
//! stack-of-environments implementation it uses by default.

use std::collections::HashMap;

use thiserror::Error;

use super::{literals::ConstValue, types::Type};

/// A variable binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub ty: Type,
    pub mutable: bool,
    /// The folded constant of a comptime `val`.
    pub value: Option<ConstValue>,
    /// The folded elements of a comptime array `val`, flattened row by row.
    pub elements: Option<Vec<ConstValue>>,
}

impl Symbol {
    pub fn new(ty: Type, mutable: bool) -> Self {
        Symbol {
            ty,
            mutable,
            value: None,
            elements: None,
        }
    }

    pub fn with_value(mut self, value: Option<ConstValue>) -> Self {
        self.value = value;
        self
    }

    pub fn with_elements(mut self, elements: Option<Vec<ConstValue>>) -> Self {
        self.elements = elements;
        self
    }

    /// Every constant this binding may stand for.
    pub fn constants(&self) -> Option<Vec<ConstValue>> {
        self.elements
            .clone()
            .or_else(|| self.value.map(|value| vec![value]))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSignature {
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub parameters: Vec<ParamSignature>,
    pub return_type: Type,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0:?} is already declared in this scope")]
pub struct DuplicateName(pub String);

pub trait SymbolTable {
    fn enter_scope(&mut self);
    fn exit_scope(&mut self);
    /// Declares `name` in the innermost scope. Shadowing an outer binding is
    /// allowed; redeclaring within the same scope is not.
    fn declare(&mut self, name: &str, symbol: Symbol) -> Result<(), DuplicateName>;
    fn lookup(&self, name: &str) -> Option<&Symbol>;
}

/// One lexical scope.
#[derive(Debug)]
pub struct Environment {
    pub variable_lookup: HashMap<String, Symbol>,
    pub function_lookup: HashMap<String, FunctionSignature>,
    pub id: usize,
}

impl Environment {
    pub fn new(id: usize) -> Self {
        Environment {
            variable_lookup: HashMap::new(),
            function_lookup: HashMap::new(),
            id,
        }
    }

    pub fn declare_variable(&mut self, name: &str, symbol: Symbol) -> Result<(), DuplicateName> {
        if self.variable_lookup.contains_key(name) {
            Err(DuplicateName(name.to_string()))
        } else {
            self.variable_lookup.insert(name.to_string(), symbol);
            Ok(())
        }
    }

    pub fn get_variable(&self, name: &str) -> Option<&Symbol> {
        self.variable_lookup.get(name)
    }

    pub fn declare_function(
        &mut self,
        name: &str,
        signature: FunctionSignature,
    ) -> Result<(), DuplicateName> {
        if self.function_lookup.contains_key(name) {
            Err(DuplicateName(name.to_string()))
        } else {
            self.function_lookup.insert(name.to_string(), signature);
            Ok(())
        }
    }

    pub fn get_function(&self, name: &str) -> Option<&FunctionSignature> {
        self.function_lookup.get(name)
    }
}

/// A stack of environments; the first one is the global scope.
#[derive(Debug)]
pub struct Scopes {
    environments: Vec<Environment>,
    next_id: usize,
    entered: usize,
    exited: usize,
}

impl Default for Scopes {
    fn default() -> Self {
        Scopes::new()
    }
}

impl Scopes {
    pub fn new() -> Self {
        Scopes {
            environments: vec![Environment::new(0)],
            next_id: 1,
            entered: 0,
            exited: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.environments.len()
    }

    /// Number of `enter_scope` calls so far.
    pub fn entered(&self) -> usize {
        self.entered
    }

    /// Number of `exit_scope` calls so far.
    pub fn exited(&self) -> usize {
        self.exited
    }

    fn current(&mut self) -> &mut Environment {
        let last = self.environments.len() - 1;
        &mut self.environments[last]
    }

    pub fn declare_function(
        &mut self,
        name: &str,
        signature: FunctionSignature,
    ) -> Result<(), DuplicateName> {
        self.current().declare_function(name, signature)
    }

    pub fn lookup_function(&self, name: &str) -> Option<&FunctionSignature> {
        self.environments
            .iter()
            .rev()
            .find_map(|environment| environment.get_function(name))
    }
}

impl SymbolTable for Scopes {
    fn enter_scope(&mut self) {
        self.environments.push(Environment::new(self.next_id));
        self.next_id += 1;
        self.entered += 1;
    }

    fn exit_scope(&mut self) {
        // The global scope is never popped.
        if self.environments.len() > 1 {
            self.environments.pop();
        }
        self.exited += 1;
    }

    fn declare(&mut self, name: &str, symbol: Symbol) -> Result<(), DuplicateName> {
        self.current().declare_variable(name, symbol)
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.environments
            .iter()
            .rev()
            .find_map(|environment| environment.get_variable(name))
    }
}
