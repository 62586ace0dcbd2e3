// Mark kinds, their static descriptors, and mark models

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::array::ArrayData;
use crate::axis::AxisKind;
use crate::error::{PlotError, Result};
use crate::model::{self, Attrs, Handle, Model, ModelId};
use crate::palette::ColorPalette;
use crate::scale::{RangeType, ScaleRef};

/// Which axis, if any, represents a scaled attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisHint {
    /// The plain line axis.
    Default,
    Color,
    /// The attribute declares no axis type at all (size, opacity, rotation,
    /// skew). It is scaled but never gets an axis, not even the line axis
    /// that `Default` stands for.
    Hidden,
}

/// Static description of one scaled attribute of a mark kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledAttribute {
    pub name: &'static str,
    pub rtype: RangeType,
    pub dimension: &'static str,
    pub orientation: Option<&'static str>,
    pub axis: AxisHint,
}

impl ScaledAttribute {
    const fn new(
        name: &'static str,
        rtype: RangeType,
        dimension: &'static str,
        orientation: Option<&'static str>,
        axis: AxisHint,
    ) -> Self {
        ScaledAttribute {
            name,
            rtype,
            dimension,
            orientation,
            axis,
        }
    }

    pub fn preferred_axis(&self) -> Option<AxisKind> {
        match self.axis {
            AxisHint::Default => Some(AxisKind::Axis),
            AxisHint::Color => Some(AxisKind::ColorAxis),
            AxisHint::Hidden => None,
        }
    }
}

const X: ScaledAttribute =
    ScaledAttribute::new("x", RangeType::Number, "x", Some("horizontal"), AxisHint::Default);
const Y: ScaledAttribute =
    ScaledAttribute::new("y", RangeType::Number, "y", Some("vertical"), AxisHint::Default);
const COLOR: ScaledAttribute =
    ScaledAttribute::new("color", RangeType::Color, "color", None, AxisHint::Color);
const SIZE: ScaledAttribute =
    ScaledAttribute::new("size", RangeType::Number, "size", None, AxisHint::Hidden);
const OPACITY: ScaledAttribute =
    ScaledAttribute::new("opacity", RangeType::Number, "opacity", None, AxisHint::Hidden);
const ROTATION: ScaledAttribute =
    ScaledAttribute::new("rotation", RangeType::Number, "rotation", None, AxisHint::Hidden);
const SKEW: ScaledAttribute =
    ScaledAttribute::new("skew", RangeType::Number, "skew", None, AxisHint::Hidden);

const LINES_ATTRS: &[ScaledAttribute] = &[X, Y, COLOR];
const SCATTER_ATTRS: &[ScaledAttribute] = &[X, Y, COLOR, SIZE, OPACITY, ROTATION, SKEW];
const LABEL_ATTRS: &[ScaledAttribute] = &[X, Y, COLOR, SIZE, ROTATION, OPACITY];
const BARS_ATTRS: &[ScaledAttribute] = &[X, Y, COLOR];
const HIST_ATTRS: &[ScaledAttribute] = &[
    ScaledAttribute::new("sample", RangeType::Number, "x", Some("horizontal"), AxisHint::Default),
    ScaledAttribute::new("count", RangeType::Number, "y", Some("vertical"), AxisHint::Default),
];
const PIE_ATTRS: &[ScaledAttribute] = &[
    COLOR,
    ScaledAttribute::new("x", RangeType::Number, "x", Some("horizontal"), AxisHint::Hidden),
    ScaledAttribute::new("y", RangeType::Number, "y", Some("vertical"), AxisHint::Hidden),
];
const OHLC_ATTRS: &[ScaledAttribute] = &[X, Y];
const MAP_ATTRS: &[ScaledAttribute] = &[
    COLOR,
    ScaledAttribute::new(
        "projection",
        RangeType::NumberPair,
        "projection",
        None,
        AxisHint::Hidden,
    ),
];

const COMMON_PROPERTIES: &[&str] = &[
    "colors",
    "opacities",
    "labels",
    "visible",
    "tooltip",
    "enable_hover",
    "apply_clip",
    "selected",
    "selected_style",
    "unselected_style",
    "interactions",
];

pub const LINE_STYLES: &[&str] = &["solid", "dashed", "dotted", "dash_dotted"];
pub const MARKERS: &[&str] = &[
    "circle",
    "cross",
    "diamond",
    "square",
    "triangle-down",
    "triangle-up",
    "arrow",
    "rectangle",
    "ellipse",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
    Lines,
    Scatter,
    Label,
    Bars,
    Hist,
    Pie,
    Ohlc,
    Map,
}

impl MarkKind {
    pub fn name(self) -> &'static str {
        match self {
            MarkKind::Lines => "Lines",
            MarkKind::Scatter => "Scatter",
            MarkKind::Label => "Label",
            MarkKind::Bars => "Bars",
            MarkKind::Hist => "Hist",
            MarkKind::Pie => "Pie",
            MarkKind::Ohlc => "OHLC",
            MarkKind::Map => "Map",
        }
    }

    pub fn scaled_attributes(self) -> &'static [ScaledAttribute] {
        match self {
            MarkKind::Lines => LINES_ATTRS,
            MarkKind::Scatter => SCATTER_ATTRS,
            MarkKind::Label => LABEL_ATTRS,
            MarkKind::Bars => BARS_ATTRS,
            MarkKind::Hist => HIST_ATTRS,
            MarkKind::Pie => PIE_ATTRS,
            MarkKind::Ohlc => OHLC_ATTRS,
            MarkKind::Map => MAP_ATTRS,
        }
    }

    /// Array attributes that carry data but are not scaled.
    pub fn data_attributes(self) -> &'static [&'static str] {
        match self {
            MarkKind::Pie => &["sizes"],
            MarkKind::Label => &["text"],
            _ => &[],
        }
    }

    fn style_properties(self) -> &'static [&'static str] {
        match self {
            MarkKind::Lines => &[
                "line_style",
                "marker",
                "marker_size",
                "stroke_width",
                "fill",
                "fill_colors",
                "fill_opacities",
                "interpolation",
                "close_path",
                "curves_subset",
            ],
            MarkKind::Scatter => &[
                "marker",
                "default_size",
                "stroke",
                "stroke_width",
                "fill",
                "default_opacities",
            ],
            MarkKind::Label => &[
                "font_size",
                "font_weight",
                "align",
                "x_offset",
                "y_offset",
                "default_size",
            ],
            MarkKind::Bars => &["type", "orientation", "padding", "base", "align", "stroke"],
            MarkKind::Hist => &["bins", "normalized", "stroke"],
            MarkKind::Pie => &[
                "radius",
                "inner_radius",
                "start_angle",
                "end_angle",
                "sort",
                "stroke",
                "font_size",
                "font_weight",
                "display_labels",
                "display_values",
                "values_format",
                "label_color",
            ],
            MarkKind::Ohlc => &["marker", "format", "stroke", "stroke_width"],
            MarkKind::Map => &["map_data", "hover_highlight", "stroke_color", "hovered_styles"],
        }
    }

    pub fn attribute(self, name: &str) -> Option<&'static ScaledAttribute> {
        self.scaled_attributes().iter().find(|a| a.name == name)
    }

    pub fn is_scaled(self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Semantic dimension of an attribute; the attribute name when undeclared.
    pub fn dimension_of(self, name: &str) -> String {
        self.attribute(name)
            .map(|a| a.dimension.to_string())
            .unwrap_or_else(|| name.to_string())
    }

    /// Default axis metadata for every scaled attribute.
    pub fn scales_metadata(self) -> BTreeMap<String, Attrs> {
        self.scaled_attributes()
            .iter()
            .map(|attr| {
                let mut meta = Attrs::new();
                if let Some(orientation) = attr.orientation {
                    meta.insert("orientation".to_string(), json!(orientation));
                }
                meta.insert("dimension".to_string(), json!(attr.dimension));
                (attr.name.to_string(), meta)
            })
            .collect()
    }
}

/// A typed visual element bound to a fixed set of scales.
#[derive(Debug, Clone)]
pub struct Mark {
    id: ModelId,
    kind: MarkKind,
    scales: BTreeMap<String, ScaleRef>,
    scales_metadata: BTreeMap<String, Attrs>,
    data: BTreeMap<String, ArrayData>,
    properties: BTreeMap<String, Value>,
    display_legend: bool,
}

pub type MarkRef = Handle<Mark>;

impl Mark {
    /// Construct and validate a mark. Data shapes and scale range types are
    /// checked here, never deferred to render time.
    pub fn new(
        kind: MarkKind,
        scales: BTreeMap<String, ScaleRef>,
        data: IndexMap<String, ArrayData>,
        properties: &Attrs,
    ) -> Result<Self> {
        for (name, scale) in &scales {
            let attr = kind.attribute(name).ok_or_else(|| PlotError::UnknownAttribute {
                mark: kind.name().to_string(),
                attribute: name.clone(),
            })?;
            let found = scale.borrow().rtype();
            if found != attr.rtype {
                return Err(PlotError::ScaleRangeMismatch {
                    attribute: name.clone(),
                    expected: attr.rtype.to_string(),
                    found: found.to_string(),
                });
            }
        }

        let mut mark = Mark {
            id: ModelId::next(),
            kind,
            scales,
            scales_metadata: kind.scales_metadata(),
            data: BTreeMap::new(),
            properties: BTreeMap::from([(
                "colors".to_string(),
                json!(ColorPalette::category10().colors()),
            )]),
            display_legend: false,
        };
        for (name, array) in data {
            mark.set_data(&name, array)?;
        }
        check_paired_lengths(kind, &mark.data)?;
        for (name, value) in properties {
            mark.set_property(name, value)?;
        }
        mark.orient_metadata();
        Ok(mark)
    }

    pub fn kind(&self) -> MarkKind {
        self.kind
    }

    pub fn scales(&self) -> &BTreeMap<String, ScaleRef> {
        &self.scales
    }

    pub fn scale(&self, name: &str) -> Option<&ScaleRef> {
        self.scales.get(name)
    }

    pub fn scales_metadata(&self) -> &BTreeMap<String, Attrs> {
        &self.scales_metadata
    }

    /// Dimension recorded for an attribute, falling back to the attribute name.
    pub fn dimension_of(&self, name: &str) -> String {
        self.scales_metadata
            .get(name)
            .and_then(|meta| meta.get("dimension"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| name.to_string())
    }

    pub fn data(&self, name: &str) -> Option<&ArrayData> {
        self.data.get(name)
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn display_legend(&self) -> bool {
        self.display_legend
    }

    pub fn set_data(&mut self, name: &str, array: ArrayData) -> Result<()> {
        if !self.kind.is_scaled(name) && !self.kind.data_attributes().contains(&name) {
            return Err(PlotError::UnknownAttribute {
                mark: self.kind.name().to_string(),
                attribute: name.to_string(),
            });
        }
        check_shape(self.kind, name, &array)?;
        self.data.insert(name.to_string(), array);
        Ok(())
    }

    // Horizontal bars swap which scale runs along which side.
    fn orient_metadata(&mut self) {
        if self.kind != MarkKind::Bars {
            return;
        }
        let horizontal = self.properties.get("orientation") == Some(&json!("horizontal"));
        let (x, y) = if horizontal {
            ("vertical", "horizontal")
        } else {
            ("horizontal", "vertical")
        };
        for (name, orientation) in [("x", x), ("y", y)] {
            if let Some(meta) = self.scales_metadata.get_mut(name) {
                meta.insert("orientation".to_string(), json!(orientation));
            }
        }
    }
}

fn shape_error(attribute: &str, reason: impl Into<String>) -> PlotError {
    PlotError::InvalidShape {
        attribute: attribute.to_string(),
        reason: reason.into(),
    }
}

fn check_shape(kind: MarkKind, name: &str, array: &ArrayData) -> Result<()> {
    let ndim = array.ndim();
    match (kind, name) {
        (MarkKind::Lines, "x") | (MarkKind::Lines, "y") | (MarkKind::Bars, "y") => {
            if ndim == 0 || ndim > 2 {
                return Err(shape_error(name, format!("expected 1 or 2 dimensions, got {}", ndim)));
            }
        }
        (MarkKind::Ohlc, "y") => {
            if ndim != 2 || array.shape()[1] != 4 {
                return Err(shape_error(
                    name,
                    format!("expected rows of [open, high, low, close], got shape {:?}", array.shape()),
                ));
            }
        }
        (MarkKind::Pie, "x") | (MarkKind::Pie, "y") => {
            if ndim != 1 || array.len() != 1 {
                return Err(shape_error(name, "expected a single position"));
            }
        }
        (MarkKind::Label, "text") => {
            if ndim != 1 || array.to_f64().is_some() {
                return Err(shape_error(name, "expected a 1-D sequence of strings"));
            }
        }
        _ => {
            if ndim != 1 {
                return Err(shape_error(name, format!("expected 1 dimension, got {}", ndim)));
            }
        }
    }
    Ok(())
}

fn check_paired_lengths(kind: MarkKind, data: &BTreeMap<String, ArrayData>) -> Result<()> {
    if kind != MarkKind::Ohlc {
        return Ok(());
    }
    if let (Some(x), Some(y)) = (data.get("x"), data.get("y")) {
        if x.len() != y.len() {
            return Err(shape_error(
                "y",
                format!("{} rows for {} x values", y.len(), x.len()),
            ));
        }
    }
    Ok(())
}

fn validate_style(model: &str, name: &str, value: &Value) -> Result<()> {
    match name {
        "line_style" => model::expect_choice(model, name, value, LINE_STYLES).map(|_| ()),
        "marker" if model == "OHLC" => {
            model::expect_choice(model, name, value, &["candle", "bar"]).map(|_| ())
        }
        "marker" => {
            if value.is_null() {
                Ok(())
            } else {
                model::expect_choice(model, name, value, MARKERS).map(|_| ())
            }
        }
        "type" => model::expect_choice(model, name, value, &["stacked", "grouped"]).map(|_| ()),
        "orientation" => {
            model::expect_choice(model, name, value, &["vertical", "horizontal"]).map(|_| ())
        }
        "bins" => model::expect_u32(model, name, value).and_then(|bins| {
            if bins == 0 {
                Err(PlotError::invalid_property(model, name, "at least one bin is required"))
            } else {
                Ok(())
            }
        }),
        "normalized" | "close_path" | "display_labels" | "display_values" | "visible" => {
            model::expect_bool(model, name, value).map(|_| ())
        }
        "colors" => match value.as_array() {
            Some(items) if items.iter().all(Value::is_string) => Ok(()),
            _ => Err(PlotError::invalid_property(model, name, "expected a list of colors")),
        },
        _ => Ok(()),
    }
}

impl Model for Mark {
    fn id(&self) -> ModelId {
        self.id
    }

    fn model_name(&self) -> &'static str {
        self.kind.name()
    }

    fn state(&self) -> Map<String, Value> {
        let mut state = Map::new();
        state.insert("_model_name".into(), json!(self.kind.name()));
        let scales: Map<String, Value> = self
            .scales
            .iter()
            .map(|(name, scale)| (name.clone(), scale.reference()))
            .collect();
        state.insert("scales".into(), Value::Object(scales));
        let metadata: Map<String, Value> = self
            .scales_metadata
            .iter()
            .map(|(name, meta)| (name.clone(), json!(meta)))
            .collect();
        state.insert("scales_metadata".into(), Value::Object(metadata));
        for (name, array) in &self.data {
            state.insert(name.clone(), array.to_wire());
        }
        for (name, value) in &self.properties {
            state.insert(name.clone(), value.clone());
        }
        state.insert("display_legend".into(), json!(self.display_legend));
        state
    }

    fn set_property(&mut self, name: &str, value: &Value) -> Result<()> {
        let model = self.kind.name();
        if name == "display_legend" {
            self.display_legend = model::expect_bool(model, name, value)?;
            return Ok(());
        }
        if self.kind.is_scaled(name) || self.kind.data_attributes().contains(&name) {
            let array = ArrayData::from_wire(value)?;
            return self.set_data(name, array);
        }
        if COMMON_PROPERTIES.contains(&name) || self.kind.style_properties().contains(&name) {
            validate_style(model, name, value)?;
            self.properties.insert(name.to_string(), value.clone());
            if name == "orientation" {
                self.orient_metadata();
            }
            return Ok(());
        }
        Err(PlotError::unknown_property(model, name))
    }
}
