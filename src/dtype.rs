// Element type lattice for data arrays and scale domains

use std::fmt;
use std::str::FromStr;

use crate::error::PlotError;

/// Element kinds, concrete and abstract.
///
/// The abstract kinds (`Number`, `Integer`, `SignedInteger`, `UnsignedInteger`,
/// `Floating`) only appear as the declared domain type of a scale; arrays always
/// carry a concrete kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Number,
    Integer,
    SignedInteger,
    UnsignedInteger,
    Floating,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    DateTime64,
    Str,
    Bool,
}

impl DType {
    /// Immediate supertype, `None` at a root of the lattice.
    pub fn parent(self) -> Option<DType> {
        use DType::*;
        match self {
            Int8 | Int16 | Int32 | Int64 => Some(SignedInteger),
            UInt8 | UInt16 | UInt32 | UInt64 => Some(UnsignedInteger),
            SignedInteger | UnsignedInteger => Some(Integer),
            Float32 | Float64 => Some(Floating),
            Integer | Floating => Some(Number),
            Number | DateTime64 | Str | Bool => None,
        }
    }

    /// True when `self` equals `other` or lies below it in the lattice.
    pub fn is_subdtype(self, other: DType) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    pub fn is_abstract(self) -> bool {
        matches!(
            self,
            DType::Number
                | DType::Integer
                | DType::SignedInteger
                | DType::UnsignedInteger
                | DType::Floating
        )
    }

    pub fn name(self) -> &'static str {
        use DType::*;
        match self {
            Number => "number",
            Integer => "integer",
            SignedInteger => "signedinteger",
            UnsignedInteger => "unsignedinteger",
            Floating => "floating",
            Int8 => "int8",
            Int16 => "int16",
            Int32 => "int32",
            Int64 => "int64",
            UInt8 => "uint8",
            UInt16 => "uint16",
            UInt32 => "uint32",
            UInt64 => "uint64",
            Float32 => "float32",
            Float64 => "float64",
            DateTime64 => "datetime64",
            Str => "str",
            Bool => "bool",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use DType::*;
        let kind = match s {
            "number" => Number,
            "integer" => Integer,
            "signedinteger" => SignedInteger,
            "unsignedinteger" => UnsignedInteger,
            "floating" => Floating,
            "int8" => Int8,
            "int16" => Int16,
            "int32" => Int32,
            "int64" => Int64,
            "uint8" => UInt8,
            "uint16" => UInt16,
            "uint32" => UInt32,
            "uint64" => UInt64,
            "float32" => Float32,
            "float64" => Float64,
            "datetime64" | "date" => DateTime64,
            "str" | "string" => Str,
            "bool" => Bool,
            other => {
                return Err(PlotError::UnsupportedDType {
                    dtype: other.to_string(),
                })
            }
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_is_number() {
        assert!(DType::Float64.is_subdtype(DType::Number));
        assert!(DType::Float32.is_subdtype(DType::Floating));
        assert!(!DType::Float64.is_subdtype(DType::Integer));
    }

    #[test]
    fn test_integers_climb_to_number() {
        assert!(DType::Int8.is_subdtype(DType::SignedInteger));
        assert!(DType::UInt32.is_subdtype(DType::Integer));
        assert!(DType::Int64.is_subdtype(DType::Number));
        assert!(!DType::UInt8.is_subdtype(DType::SignedInteger));
    }

    #[test]
    fn test_disjoint_roots() {
        assert!(!DType::DateTime64.is_subdtype(DType::Number));
        assert!(!DType::Str.is_subdtype(DType::Number));
        assert!(!DType::Bool.is_subdtype(DType::Integer));
        assert!(DType::Str.is_subdtype(DType::Str));
    }

    #[test]
    fn test_supertype_is_not_subtype() {
        assert!(!DType::Number.is_subdtype(DType::Float64));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("float64".parse::<DType>().unwrap(), DType::Float64);
        assert_eq!("date".parse::<DType>().unwrap(), DType::DateTime64);
        assert!("complex128".parse::<DType>().is_err());
    }
}
