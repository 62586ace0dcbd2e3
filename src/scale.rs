// Scale kinds, their static descriptors and the scale-type registry

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{json, Map, Value};

use crate::dtype::DType;
use crate::error::{PlotError, Result};
use crate::model::{self, Attrs, Handle, Model, ModelId};

/// What a scale maps its domain onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeType {
    Number,
    Color,
    /// A projected coordinate pair.
    NumberPair,
}

impl fmt::Display for RangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RangeType::Number => "Number",
            RangeType::Color => "Color",
            RangeType::NumberPair => "(Number, Number)",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleKind {
    Linear,
    Log,
    Date,
    Ordinal,
    Color,
    DateColor,
    OrdinalColor,
    Mercator,
    Albers,
    AlbersUsa,
    EquiRectangular,
    Orthographic,
    Gnomonic,
    Stereographic,
}

impl ScaleKind {
    pub fn name(self) -> &'static str {
        use ScaleKind::*;
        match self {
            Linear => "LinearScale",
            Log => "LogScale",
            Date => "DateScale",
            Ordinal => "OrdinalScale",
            Color => "ColorScale",
            DateColor => "DateColorScale",
            OrdinalColor => "OrdinalColorScale",
            Mercator => "Mercator",
            Albers => "Albers",
            AlbersUsa => "AlbersUSA",
            EquiRectangular => "EquiRectangular",
            Orthographic => "Orthographic",
            Gnomonic => "Gnomonic",
            Stereographic => "Stereographic",
        }
    }

    pub fn rtype(self) -> RangeType {
        use ScaleKind::*;
        match self {
            Linear | Log | Date | Ordinal => RangeType::Number,
            Color | DateColor | OrdinalColor => RangeType::Color,
            Mercator | Albers | AlbersUsa | EquiRectangular | Orthographic | Gnomonic
            | Stereographic => RangeType::NumberPair,
        }
    }

    pub fn dtype(self) -> DType {
        use ScaleKind::*;
        match self {
            Date | DateColor => DType::DateTime64,
            Ordinal | OrdinalColor => DType::Str,
            _ => DType::Number,
        }
    }

    pub fn precedence(self) -> u32 {
        match self {
            ScaleKind::Linear => 2,
            _ => 1,
        }
    }

    pub fn is_geo(self) -> bool {
        self.rtype() == RangeType::NumberPair
    }

    fn extra_options(self) -> &'static [&'static str] {
        use ScaleKind::*;
        match self {
            Linear => &["mid_range", "min_range", "stabilized"],
            Log | Date => &[],
            Ordinal => &["domain"],
            Color | DateColor => &["scheme", "colors", "mid", "extrapolation"],
            OrdinalColor => &["scheme", "colors", "domain"],
            Mercator | Albers | AlbersUsa | EquiRectangular | Orthographic | Gnomonic
            | Stereographic => &["scale_factor", "center", "rotate", "precision", "clip_angle"],
        }
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registration entry: which scale to build for a range type and domain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleType {
    pub kind: ScaleKind,
    pub rtype: RangeType,
    pub dtype: DType,
    pub precedence: u32,
}

impl ScaleType {
    pub fn builtin(kind: ScaleKind) -> Self {
        ScaleType {
            kind,
            rtype: kind.rtype(),
            dtype: kind.dtype(),
            precedence: kind.precedence(),
        }
    }

    pub fn with_precedence(mut self, precedence: u32) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn accepts(&self, rtype: RangeType, dtype: DType) -> bool {
        self.rtype == rtype && dtype.is_subdtype(self.dtype)
    }
}

/// Ordered table of known scale types.
#[derive(Debug, Clone, Default)]
pub struct ScaleRegistry {
    types: Vec<ScaleType>,
}

impl ScaleRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every built-in scale, in registration order.
    pub fn builtin() -> Self {
        use ScaleKind::*;
        let mut registry = Self::empty();
        for kind in [
            Mercator,
            Albers,
            AlbersUsa,
            EquiRectangular,
            Orthographic,
            Gnomonic,
            Stereographic,
            Linear,
            Log,
            Date,
            Ordinal,
            Color,
            DateColor,
            OrdinalColor,
        ] {
            registry.register(ScaleType::builtin(kind));
        }
        registry
    }

    pub fn register(&mut self, scale_type: ScaleType) {
        self.types.push(scale_type);
    }

    pub fn types(&self) -> &[ScaleType] {
        &self.types
    }

    /// Highest-precedence scale type accepting `rtype` and `dtype`.
    /// Equal precedence goes to the later registration.
    pub fn best_match(&self, rtype: RangeType, dtype: DType) -> Option<ScaleType> {
        let mut best: Option<ScaleType> = None;
        for candidate in self.types.iter().filter(|t| t.accepts(rtype, dtype)) {
            match best {
                Some(current) if candidate.precedence < current.precedence => {}
                _ => best = Some(*candidate),
            }
        }
        best
    }
}

/// A domain-to-range mapping shared between marks, axes and the context.
#[derive(Debug, Clone)]
pub struct Scale {
    id: ModelId,
    kind: ScaleKind,
    min: Option<f64>,
    max: Option<f64>,
    reverse: bool,
    allow_padding: bool,
    options: BTreeMap<String, Value>,
}

pub type ScaleRef = Handle<Scale>;

impl Scale {
    pub fn new(kind: ScaleKind) -> Self {
        Scale {
            id: ModelId::next(),
            kind,
            min: None,
            max: None,
            reverse: false,
            allow_padding: true,
            options: BTreeMap::new(),
        }
    }

    /// Build a scale and apply constructor options.
    pub fn with_options(kind: ScaleKind, options: &Attrs) -> Result<Self> {
        let mut scale = Self::new(kind);
        for (name, value) in options {
            scale.set_property(name, value)?;
        }
        Ok(scale)
    }

    pub fn handle(kind: ScaleKind) -> ScaleRef {
        Handle::new(Self::new(kind))
    }

    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    pub fn rtype(&self) -> RangeType {
        self.kind.rtype()
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn set_limits(&mut self, min: Option<f64>, max: Option<f64>) {
        self.min = min;
        self.max = max;
    }

    pub fn reverse(&self) -> bool {
        self.reverse
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }
}

impl Model for Scale {
    fn id(&self) -> ModelId {
        self.id
    }

    fn model_name(&self) -> &'static str {
        self.kind.name()
    }

    fn state(&self) -> Map<String, Value> {
        let mut state = Map::new();
        state.insert("_model_name".into(), json!(self.kind.name()));
        state.insert("rtype".into(), json!(self.rtype().to_string()));
        state.insert("dtype".into(), json!(self.kind.dtype().name()));
        if !self.kind.is_geo() {
            state.insert("min".into(), json!(self.min));
            state.insert("max".into(), json!(self.max));
        }
        state.insert("reverse".into(), json!(self.reverse));
        state.insert("allow_padding".into(), json!(self.allow_padding));
        for (k, v) in &self.options {
            state.insert(k.clone(), v.clone());
        }
        state
    }

    fn set_property(&mut self, name: &str, value: &Value) -> Result<()> {
        let model = self.kind.name();
        match name {
            "min" | "max" if !self.kind.is_geo() => {
                let v = model::expect_opt_f64(model, name, value)?;
                if name == "min" {
                    self.min = v;
                } else {
                    self.max = v;
                }
            }
            "reverse" => self.reverse = model::expect_bool(model, name, value)?,
            "allow_padding" => self.allow_padding = model::expect_bool(model, name, value)?,
            other if self.kind.extra_options().contains(&other) => {
                validate_option(model, other, value)?;
                self.options.insert(other.to_string(), value.clone());
            }
            other => return Err(PlotError::unknown_property(model, other)),
        }
        Ok(())
    }
}

fn validate_option(model: &str, name: &str, value: &Value) -> Result<()> {
    match name {
        "mid_range" | "min_range" | "scale_factor" | "precision" | "clip_angle" => {
            model::expect_f64(model, name, value).map(|_| ())
        }
        "mid" => model::expect_opt_f64(model, name, value).map(|_| ()),
        "stabilized" => model::expect_bool(model, name, value).map(|_| ()),
        "scheme" => model::expect_str(model, name, value).map(|_| ()),
        "extrapolation" => {
            model::expect_choice(model, name, value, &["constant", "linear"]).map(|_| ())
        }
        "colors" => match value.as_array() {
            Some(items) if items.iter().all(Value::is_string) => Ok(()),
            _ => Err(PlotError::invalid_property(model, name, "expected a list of colors")),
        },
        "domain" => match value {
            Value::Array(_) => Ok(()),
            _ => Err(PlotError::invalid_property(model, name, "expected a list")),
        },
        "center" | "rotate" => match value.as_array() {
            Some(items) if items.iter().all(Value::is_number) => Ok(()),
            _ => Err(PlotError::invalid_property(model, name, "expected a list of numbers")),
        },
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_number_prefers_linear() {
        let registry = ScaleRegistry::builtin();
        let best = registry.best_match(RangeType::Number, DType::Float64).unwrap();
        assert_eq!(best.kind, ScaleKind::Linear);
    }

    #[test]
    fn test_dates_and_strings() {
        let registry = ScaleRegistry::builtin();
        assert_eq!(
            registry.best_match(RangeType::Number, DType::DateTime64).unwrap().kind,
            ScaleKind::Date
        );
        assert_eq!(
            registry.best_match(RangeType::Number, DType::Str).unwrap().kind,
            ScaleKind::Ordinal
        );
        assert_eq!(
            registry.best_match(RangeType::Color, DType::Int32).unwrap().kind,
            ScaleKind::Color
        );
        assert_eq!(
            registry.best_match(RangeType::Color, DType::Str).unwrap().kind,
            ScaleKind::OrdinalColor
        );
    }

    #[test]
    fn test_tie_goes_to_last_registered() {
        let mut registry = ScaleRegistry::empty();
        registry.register(ScaleType::builtin(ScaleKind::Linear).with_precedence(1));
        registry.register(ScaleType::builtin(ScaleKind::Log));
        let best = registry.best_match(RangeType::Number, DType::Float64).unwrap();
        assert_eq!(best.kind, ScaleKind::Log);
    }

    #[test]
    fn test_no_match() {
        let registry = ScaleRegistry::builtin();
        assert!(registry.best_match(RangeType::Color, DType::Bool).is_none());
        assert!(ScaleRegistry::empty()
            .best_match(RangeType::Number, DType::Float64)
            .is_none());
    }

    #[test]
    fn test_options_validated_per_kind() {
        let ok = Attrs::from([("scheme".to_string(), json!("RdYlGn"))]);
        assert!(Scale::with_options(ScaleKind::Color, &ok).is_ok());
        assert!(matches!(
            Scale::with_options(ScaleKind::Linear, &ok),
            Err(PlotError::UnknownProperty { .. })
        ));

        let bad = Attrs::from([("min".to_string(), json!("zero"))]);
        assert!(matches!(
            Scale::with_options(ScaleKind::Linear, &bad),
            Err(PlotError::InvalidProperty { .. })
        ));
    }

    #[test]
    fn test_geo_scales_have_no_limits() {
        let attrs = Attrs::from([("min".to_string(), json!(0.0))]);
        assert!(Scale::with_options(ScaleKind::Mercator, &attrs).is_err());
        let attrs = Attrs::from([("scale_factor".to_string(), json!(250.0))]);
        let scale = Scale::with_options(ScaleKind::Mercator, &attrs).unwrap();
        assert_eq!(scale.option("scale_factor"), Some(&json!(250.0)));
    }
}
