use super::types::Type;

/// How the value of the expression being resolved is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMode {
    /// The value is observed and may stay comptime.
    ComptimePermissive,
    /// The value must materialize as a concrete type; a target is present.
    Runtime,
    /// The value is thrown away.
    Discarded,
}

/// The expected type of an expression, threaded down the resolution by value.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeContext {
    pub target: Option<Type>,
    pub mode: ContextMode,
}

impl TypeContext {
    /// A value position with no declared type.
    pub fn permissive() -> Self {
        TypeContext {
            target: None,
            mode: ContextMode::ComptimePermissive,
        }
    }

    /// A position that carries a type obligation.
    pub fn expecting(target: Type) -> Self {
        TypeContext {
            target: Some(target),
            mode: ContextMode::Runtime,
        }
    }

    pub fn discarded() -> Self {
        TypeContext {
            target: None,
            mode: ContextMode::Discarded,
        }
    }

    pub fn target(&self) -> Option<&Type> {
        self.target.as_ref()
    }

    /// Whether a runtime construct resolved here lacks the type it needs.
    pub fn lacks_runtime_target(&self) -> bool {
        self.target.is_none() && self.mode != ContextMode::Discarded
    }
}
