// Typed n-dimensional arrays and their wire representation

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dtype::DType;
use crate::error::{PlotError, Result};

/// Flat element storage. Width variants of a kind share one storage type.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    UInt(Vec<u64>),
    Float(Vec<f64>),
    /// Milliseconds since the Unix epoch.
    DateTime(Vec<i64>),
    Str(Vec<String>),
}

impl Values {
    fn len(&self) -> usize {
        match self {
            Values::Bool(v) => v.len(),
            Values::Int(v) => v.len(),
            Values::UInt(v) => v.len(),
            Values::Float(v) => v.len(),
            Values::DateTime(v) => v.len(),
            Values::Str(v) => v.len(),
        }
    }

    fn accepts(&self, dtype: DType) -> bool {
        use DType::*;
        match self {
            Values::Bool(_) => dtype == Bool,
            Values::Int(_) => matches!(dtype, Int8 | Int16 | Int32 | Int64),
            Values::UInt(_) => matches!(dtype, UInt8 | UInt16 | UInt32 | UInt64),
            Values::Float(_) => matches!(dtype, Float32 | Float64),
            Values::DateTime(_) => dtype == DateTime64,
            Values::Str(_) => dtype == Str,
        }
    }
}

/// A dense array with a concrete element type and a row-major shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayData {
    dtype: DType,
    shape: Vec<usize>,
    values: Values,
}

impl ArrayData {
    fn one_d(dtype: DType, values: Values) -> Self {
        let shape = vec![values.len()];
        ArrayData {
            dtype,
            shape,
            values,
        }
    }

    pub fn floats(values: Vec<f64>) -> Self {
        Self::one_d(DType::Float64, Values::Float(values))
    }

    pub fn ints(values: Vec<i64>) -> Self {
        Self::one_d(DType::Int64, Values::Int(values))
    }

    pub fn uints(values: Vec<u64>) -> Self {
        Self::one_d(DType::UInt64, Values::UInt(values))
    }

    pub fn bools(values: Vec<bool>) -> Self {
        Self::one_d(DType::Bool, Values::Bool(values))
    }

    /// Timestamps given as milliseconds since the epoch.
    pub fn datetimes(millis: Vec<i64>) -> Self {
        Self::one_d(DType::DateTime64, Values::DateTime(millis))
    }

    pub fn strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        Self::one_d(DType::Str, Values::Str(values))
    }

    /// Evenly spaced integers `0..n`.
    pub fn arange(n: usize) -> Self {
        Self::ints((0..n as i64).collect())
    }

    /// Build a 2-D float array from rows. Every row must have the same length.
    /// Errors are labelled `array`; see [`PlotError::for_attribute`].
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let ncols = rows.first().map(Vec::len).unwrap_or(0);
        let nrows = rows.len();
        let mut flat = Vec::with_capacity(nrows * ncols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != ncols {
                return Err(PlotError::RaggedArray {
                    attribute: "array".to_string(),
                    row: i,
                    expected: ncols,
                    found: row.len(),
                });
            }
            flat.extend(row);
        }
        Ok(ArrayData {
            dtype: DType::Float64,
            shape: vec![nrows, ncols],
            values: Values::Float(flat),
        })
    }

    /// Reinterpret with a narrower or wider width of the same kind.
    pub fn with_dtype(mut self, dtype: DType) -> Result<Self> {
        if dtype.is_abstract() || !self.values.accepts(dtype) {
            return Err(PlotError::UnsupportedDType {
                dtype: format!("{} (stored as {})", dtype, self.dtype),
            });
        }
        let fits = match &self.values {
            Values::Int(v) => v.iter().all(|n| int_fits(dtype, *n)),
            Values::UInt(v) => v.iter().all(|n| uint_fits(dtype, *n)),
            _ => true,
        };
        if !fits {
            return Err(PlotError::UnsupportedDType {
                dtype: format!("{} (values out of range)", dtype),
            });
        }
        self.dtype = dtype;
        Ok(self)
    }

    /// Reshape without copying. The element count must be preserved.
    pub fn reshape(mut self, shape: Vec<usize>) -> Result<Self> {
        let size: usize = shape.iter().product();
        if size != self.values.len() {
            return Err(PlotError::InvalidShape {
                attribute: "array".to_string(),
                reason: format!(
                    "cannot reshape {} elements into {:?}",
                    self.values.len(),
                    shape
                ),
            });
        }
        self.shape = shape;
        Ok(self)
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Length of the leading dimension.
    pub fn len(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Numeric contents widened to f64, `None` for strings.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match &self.values {
            Values::Float(v) => Some(v.clone()),
            Values::Int(v) | Values::DateTime(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Values::UInt(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Values::Bool(v) => Some(v.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect()),
            Values::Str(_) => None,
        }
    }

    /// Encode for the state-sync channel. Strings pass through as plain
    /// (nested) sequences; everything else carries dtype and shape.
    pub fn to_wire(&self) -> Value {
        if let Values::Str(strings) = &self.values {
            let flat: Vec<Value> = strings.iter().cloned().map(Value::String).collect();
            return nest(flat, &self.shape);
        }
        let value: Vec<Value> = match &self.values {
            Values::Bool(v) => v.iter().map(|&b| Value::Bool(b)).collect(),
            Values::Int(v) | Values::DateTime(v) => v.iter().map(|&x| Value::from(x)).collect(),
            Values::UInt(v) => v.iter().map(|&x| Value::from(x)).collect(),
            // NaN has no JSON form and travels as null
            Values::Float(v) => v.iter().map(|&x| Value::from(x)).collect(),
            Values::Str(v) => v.iter().cloned().map(Value::String).collect(),
        };
        let wire = WireArray {
            dtype: self.dtype.name().to_string(),
            shape: self.shape.clone(),
            value,
        };
        serde_json::to_value(wire).unwrap_or(Value::Null)
    }

    pub fn from_wire(wire: &Value) -> Result<Self> {
        match wire {
            Value::Array(_) => decode_strings(wire),
            Value::Object(_) => {
                let wire: WireArray = serde_json::from_value(wire.clone())
                    .map_err(|e| PlotError::MalformedWire(e.to_string()))?;
                decode_numeric(wire)
            }
            other => Err(PlotError::MalformedWire(format!(
                "expected an object or a sequence, got {}",
                other
            ))),
        }
    }
}

impl From<Vec<f64>> for ArrayData {
    fn from(values: Vec<f64>) -> Self {
        ArrayData::floats(values)
    }
}

impl From<Vec<i64>> for ArrayData {
    fn from(values: Vec<i64>) -> Self {
        ArrayData::ints(values)
    }
}

impl From<Vec<&str>> for ArrayData {
    fn from(values: Vec<&str>) -> Self {
        ArrayData::strings(values)
    }
}

impl From<Vec<String>> for ArrayData {
    fn from(values: Vec<String>) -> Self {
        ArrayData::strings(values)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireArray {
    dtype: String,
    shape: Vec<usize>,
    value: Vec<Value>,
}

fn nest(flat: Vec<Value>, shape: &[usize]) -> Value {
    if shape.len() <= 1 {
        return Value::Array(flat);
    }
    let inner: usize = shape[1..].iter().product();
    if inner == 0 {
        return Value::Array(vec![Value::Array(Vec::new()); shape[0]]);
    }
    let mut rows = Vec::with_capacity(shape[0]);
    let mut iter = flat.into_iter();
    for _ in 0..shape[0] {
        let chunk: Vec<Value> = iter.by_ref().take(inner).collect();
        rows.push(nest(chunk, &shape[1..]));
    }
    Value::Array(rows)
}

fn decode_strings(wire: &Value) -> Result<ArrayData> {
    let mut shape = Vec::new();
    let mut flat = Vec::new();
    collect_strings(wire, 0, &mut shape, &mut flat)?;
    if shape.is_empty() {
        shape.push(0);
    }
    Ok(ArrayData {
        dtype: DType::Str,
        shape,
        values: Values::Str(flat),
    })
}

fn collect_strings(
    value: &Value,
    depth: usize,
    shape: &mut Vec<usize>,
    flat: &mut Vec<String>,
) -> Result<()> {
    match value {
        Value::Array(items) => {
            if shape.len() == depth {
                shape.push(items.len());
            } else if shape[depth] != items.len() {
                return Err(PlotError::MalformedWire(format!(
                    "ragged string sequence at depth {}",
                    depth
                )));
            }
            for item in items {
                collect_strings(item, depth + 1, shape, flat)?;
            }
            Ok(())
        }
        Value::String(s) => {
            if shape.len() != depth {
                return Err(PlotError::MalformedWire(
                    "mixed nesting in string sequence".to_string(),
                ));
            }
            flat.push(s.clone());
            Ok(())
        }
        other => Err(PlotError::UnsupportedDType {
            dtype: format!("element {}", other),
        }),
    }
}

fn decode_numeric(wire: WireArray) -> Result<ArrayData> {
    let dtype: DType = wire.dtype.parse()?;
    if dtype.is_abstract() {
        return Err(PlotError::UnsupportedDType { dtype: wire.dtype });
    }
    let expected: usize = wire.shape.iter().product();
    if expected != wire.value.len() {
        return Err(PlotError::MalformedWire(format!(
            "shape {:?} needs {} elements, got {}",
            wire.shape,
            expected,
            wire.value.len()
        )));
    }
    let bad = |v: &Value| PlotError::MalformedWire(format!("{} is not a {}", v, dtype));
    use DType::*;
    let values = match dtype {
        Float32 | Float64 => Values::Float(
            wire.value
                .iter()
                .map(|v| match v {
                    Value::Null => Ok(f64::NAN),
                    _ => v.as_f64().ok_or_else(|| bad(v)),
                })
                .collect::<Result<_>>()?,
        ),
        Int8 | Int16 | Int32 | Int64 => Values::Int(
            wire.value
                .iter()
                .map(|v| {
                    v.as_i64()
                        .filter(|n| int_fits(dtype, *n))
                        .ok_or_else(|| bad(v))
                })
                .collect::<Result<_>>()?,
        ),
        UInt8 | UInt16 | UInt32 | UInt64 => Values::UInt(
            wire.value
                .iter()
                .map(|v| {
                    v.as_u64()
                        .filter(|n| uint_fits(dtype, *n))
                        .ok_or_else(|| bad(v))
                })
                .collect::<Result<_>>()?,
        ),
        DateTime64 => Values::DateTime(
            wire.value
                .iter()
                .map(|v| v.as_i64().ok_or_else(|| bad(v)))
                .collect::<Result<_>>()?,
        ),
        Bool => Values::Bool(
            wire.value
                .iter()
                .map(|v| v.as_bool().ok_or_else(|| bad(v)))
                .collect::<Result<_>>()?,
        ),
        Str => Values::Str(
            wire.value
                .iter()
                .map(|v| v.as_str().map(str::to_string).ok_or_else(|| bad(v)))
                .collect::<Result<_>>()?,
        ),
        _ => return Err(PlotError::UnsupportedDType { dtype: wire.dtype }),
    };
    Ok(ArrayData {
        dtype,
        shape: wire.shape,
        values,
    })
}

fn int_fits(dtype: DType, n: i64) -> bool {
    match dtype {
        DType::Int8 => i8::try_from(n).is_ok(),
        DType::Int16 => i16::try_from(n).is_ok(),
        DType::Int32 => i32::try_from(n).is_ok(),
        _ => true,
    }
}

fn uint_fits(dtype: DType, n: u64) -> bool {
    match dtype {
        DType::UInt8 => u8::try_from(n).is_ok(),
        DType::UInt16 => u16::try_from(n).is_ok(),
        DType::UInt32 => u32::try_from(n).is_ok(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_rows_uniform() {
        let arr = ArrayData::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(arr.shape(), &[3, 2]);
        assert_eq!(arr.ndim(), 2);
        assert_eq!(arr.len(), 3);
    }

    #[test]
    fn test_from_rows_ragged() {
        let err = ArrayData::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        match err {
            PlotError::RaggedArray { row, expected, found, .. } => {
                assert_eq!((row, expected, found), (1, 2, 1));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_from_rows_ragged_relabelled() {
        let err = ArrayData::from_rows(vec![vec![1.0], vec![]])
            .map_err(|e| e.for_attribute("y"))
            .unwrap_err();
        assert!(matches!(err, PlotError::RaggedArray { ref attribute, .. } if attribute == "y"));
        assert!(err.to_string().contains("'y'"));
    }

    #[test]
    fn test_with_dtype_checks_range() {
        assert!(ArrayData::ints(vec![100, -128]).with_dtype(DType::Int8).is_ok());
        assert!(ArrayData::ints(vec![1000]).with_dtype(DType::Int8).is_err());
        assert!(ArrayData::uints(vec![70_000]).with_dtype(DType::UInt16).is_err());
    }

    #[test]
    fn test_wire_rejects_out_of_range_values() {
        let wire = json!({"dtype": "int8", "shape": [1], "value": [1000]});
        assert!(matches!(
            ArrayData::from_wire(&wire),
            Err(PlotError::MalformedWire(_))
        ));
        let wire = json!({"dtype": "uint8", "shape": [2], "value": [255, 256]});
        assert!(ArrayData::from_wire(&wire).is_err());
        let wire = json!({"dtype": "int16", "shape": [1], "value": [-32768]});
        assert!(ArrayData::from_wire(&wire).is_ok());
    }

    #[test]
    fn test_with_dtype_narrows_width() {
        let arr = ArrayData::floats(vec![1.0]).with_dtype(DType::Float32).unwrap();
        assert_eq!(arr.dtype(), DType::Float32);
        assert!(ArrayData::floats(vec![1.0]).with_dtype(DType::Int32).is_err());
        assert!(ArrayData::floats(vec![1.0]).with_dtype(DType::Number).is_err());
    }

    #[test]
    fn test_wire_numeric_keeps_dtype_and_shape() {
        let arr = ArrayData::ints(vec![1, 2, 3, 4])
            .with_dtype(DType::Int32)
            .unwrap()
            .reshape(vec![2, 2])
            .unwrap();
        let wire = arr.to_wire();
        assert_eq!(wire["dtype"], json!("int32"));
        assert_eq!(wire["shape"], json!([2, 2]));
        assert_eq!(ArrayData::from_wire(&wire).unwrap(), arr);
    }

    #[test]
    fn test_wire_strings_pass_through() {
        let arr = ArrayData::strings(["a", "b"]);
        assert_eq!(arr.to_wire(), json!(["a", "b"]));
        assert_eq!(ArrayData::from_wire(&json!(["a", "b"])).unwrap(), arr);
    }

    #[test]
    fn test_wire_rejects_unknown_dtype() {
        let wire = json!({"dtype": "complex64", "shape": [1], "value": [1]});
        assert!(matches!(
            ArrayData::from_wire(&wire),
            Err(PlotError::UnsupportedDType { .. })
        ));
        let wire = json!({"dtype": "number", "shape": [1], "value": [1]});
        assert!(matches!(
            ArrayData::from_wire(&wire),
            Err(PlotError::UnsupportedDType { .. })
        ));
    }

    #[test]
    fn test_wire_rejects_size_mismatch() {
        let wire = json!({"dtype": "float64", "shape": [3], "value": [1.0]});
        assert!(matches!(
            ArrayData::from_wire(&wire),
            Err(PlotError::MalformedWire(_))
        ));
    }

    #[test]
    fn test_arange() {
        let arr = ArrayData::arange(3);
        assert_eq!(arr.values(), &Values::Int(vec![0, 1, 2]));
        assert_eq!(arr.dtype(), DType::Int64);
    }
}
