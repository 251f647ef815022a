//! The type lattice.
//!
//! Concrete scalar kinds, the two comptime literal types, arrays (concrete and
//! comptime) with fixed or inferred dimensions, ranges, `void`, and the
//! `Unknown` error-recovery sentinel.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    String,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 12] = [
        ScalarKind::I8,
        ScalarKind::I16,
        ScalarKind::I32,
        ScalarKind::I64,
        ScalarKind::U8,
        ScalarKind::U16,
        ScalarKind::U32,
        ScalarKind::U64,
        ScalarKind::F32,
        ScalarKind::F64,
        ScalarKind::Bool,
        ScalarKind::String,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "i8" => ScalarKind::I8,
            "i16" => ScalarKind::I16,
            "i32" => ScalarKind::I32,
            "i64" => ScalarKind::I64,
            "u8" => ScalarKind::U8,
            "u16" => ScalarKind::U16,
            "u32" => ScalarKind::U32,
            "u64" => ScalarKind::U64,
            "f32" => ScalarKind::F32,
            "f64" => ScalarKind::F64,
            "bool" => ScalarKind::Bool,
            "string" => ScalarKind::String,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ScalarKind::I8
                | ScalarKind::I16
                | ScalarKind::I32
                | ScalarKind::I64
                | ScalarKind::U8
                | ScalarKind::U16
                | ScalarKind::U32
                | ScalarKind::U64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }
}

/// One array dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Fixed(usize),
    /// `_`, resolved from the source length when a value is materialized
    Inferred,
}

impl Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Fixed(size) => write!(f, "{}", size),
            Dimension::Inferred => write!(f, "_"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Scalar(ScalarKind),
    ComptimeInt,
    ComptimeFloat,
    /// `dims` is outermost first and never empty.
    Array {
        element: Box<Type>,
        dims: Vec<Dimension>,
    },
    /// An array literal whose elements are still comptime.
    ComptimeArray {
        element: Box<Type>,
        dims: Vec<Dimension>,
    },
    Range {
        element: Box<Type>,
        has_start: bool,
        has_end: bool,
    },
    Void,
    Unknown,
}

impl Type {
    pub fn scalar(kind: ScalarKind) -> Self {
        Type::Scalar(kind)
    }

    pub fn bool() -> Self {
        Type::Scalar(ScalarKind::Bool)
    }

    pub fn array(element: Type, dims: Vec<Dimension>) -> Self {
        Type::Array {
            element: Box::new(element),
            dims,
        }
    }

    pub fn comptime_array(element: Type, dims: Vec<Dimension>) -> Self {
        Type::ComptimeArray {
            element: Box::new(element),
            dims,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn is_comptime(&self) -> bool {
        matches!(
            self,
            Type::ComptimeInt | Type::ComptimeFloat | Type::ComptimeArray { .. }
        )
    }

    pub fn is_comptime_scalar(&self) -> bool {
        matches!(self, Type::ComptimeInt | Type::ComptimeFloat)
    }

    pub fn is_numeric(&self) -> bool {
        match self {
            Type::Scalar(kind) => kind.is_numeric(),
            Type::ComptimeInt | Type::ComptimeFloat => true,
            _ => false,
        }
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Type::Scalar(kind) => kind.is_integer(),
            Type::ComptimeInt => true,
            _ => false,
        }
    }

    pub fn is_float(&self) -> bool {
        match self {
            Type::Scalar(kind) => kind.is_float(),
            Type::ComptimeFloat => true,
            _ => false,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. } | Type::ComptimeArray { .. })
    }

    /// Element type and dimensions of either array flavour.
    pub fn array_parts(&self) -> Option<(&Type, &[Dimension])> {
        match self {
            Type::Array { element, dims } | Type::ComptimeArray { element, dims } => {
                Some((element.as_ref(), dims.as_slice()))
            }
            _ => None,
        }
    }

    pub fn rank(&self) -> usize {
        self.array_parts().map(|(_, dims)| dims.len()).unwrap_or(0)
    }

    /// Strips the outermost dimension: `[2][3]i32` becomes `[3]i32`,
    /// `[3]i32` becomes `i32`.
    pub fn peel(&self) -> Option<Type> {
        let (element, dims) = self.array_parts()?;

        if dims.len() == 1 {
            return Some(element.clone());
        }

        let inner = dims[1..].to_vec();
        Some(match self {
            Type::ComptimeArray { .. } => Type::comptime_array(element.clone(), inner),
            _ => Type::array(element.clone(), inner),
        })
    }

    /// Adds an outer dimension: the inverse of `peel`.
    pub fn wrap(inner: Type, outer: Dimension) -> Type {
        match inner {
            Type::Array { element, mut dims } => {
                dims.insert(0, outer);
                Type::Array { element, dims }
            }
            Type::ComptimeArray { element, mut dims } => {
                dims.insert(0, outer);
                Type::ComptimeArray { element, dims }
            }
            element if element.is_comptime_scalar() => Type::comptime_array(element, vec![outer]),
            element => Type::array(element, vec![outer]),
        }
    }

    /// The type of one element produced by iterating over a value of this type.
    pub fn iteration_element(&self) -> Option<Type> {
        match self {
            Type::Range { element, .. } => Some(element.as_ref().clone()),
            Type::Array { .. } | Type::ComptimeArray { .. } => self.peel(),
            _ => None,
        }
    }

    /// Whether iterating over this type terminates on its own.
    pub fn is_bounded_iterable(&self) -> bool {
        match self {
            Type::Range { has_end, .. } => *has_end,
            _ => true,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Scalar(kind) => write!(f, "{}", kind.name()),
            Type::ComptimeInt => write!(f, "comptime_int"),
            Type::ComptimeFloat => write!(f, "comptime_float"),
            Type::Array { element, dims } => {
                for dim in dims {
                    write!(f, "[{}]", dim)?;
                }
                write!(f, "{}", element)
            }
            Type::ComptimeArray { element, dims } => {
                write!(f, "comptime ")?;
                for dim in dims {
                    write!(f, "[{}]", dim)?;
                }
                write!(f, "{}", element)
            }
            Type::Range { element, .. } => write!(f, "range[{}]", element),
            Type::Void => write!(f, "void"),
            Type::Unknown => write!(f, "unknown"),
        }
    }
}
