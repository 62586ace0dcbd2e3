// Axis models: the visual representation of one scale along one side

use serde_json::{json, Map, Value};

use crate::error::{PlotError, Result};
use crate::model::{self, Attrs, Handle, Model, ModelId};
use crate::scale::ScaleRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisKind {
    Axis,
    ColorAxis,
}

impl AxisKind {
    pub fn name(self) -> &'static str {
        match self {
            AxisKind::Axis => "Axis",
            AxisKind::ColorAxis => "ColorAxis",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Axis {
    id: ModelId,
    kind: AxisKind,
    scale: ScaleRef,
    orientation: String,
    side: Option<String>,
    label: String,
    grid_lines: String,
    tick_format: Option<String>,
    num_ticks: Option<u32>,
    tick_values: Option<Value>,
    visible: bool,
    color: Option<String>,
    offset: Option<Value>,
}

pub type AxisRef = Handle<Axis>;

const ORIENTATIONS: &[&str] = &["horizontal", "vertical"];
const SIDES: &[&str] = &["bottom", "top", "left", "right"];
const GRID_LINES: &[&str] = &["none", "solid", "dashed"];

impl Axis {
    pub fn new(kind: AxisKind, scale: ScaleRef) -> Self {
        Axis {
            id: ModelId::next(),
            kind,
            scale,
            orientation: "horizontal".to_string(),
            side: None,
            label: String::new(),
            grid_lines: "solid".to_string(),
            tick_format: None,
            num_ticks: None,
            tick_values: None,
            visible: true,
            color: None,
            offset: None,
        }
    }

    /// Build an axis from merged scale metadata and caller options.
    ///
    /// `dimension` entries are metadata for the registry, not axis properties,
    /// and are skipped. The side defaults from the orientation.
    pub fn with_options(kind: AxisKind, scale: ScaleRef, options: &Attrs) -> Result<Self> {
        let mut axis = Self::new(kind, scale);
        for (name, value) in options {
            if name == "dimension" {
                continue;
            }
            axis.set_property(name, value)?;
        }
        if axis.side.is_none() {
            axis.side = Some(
                if axis.orientation == "vertical" {
                    "left"
                } else {
                    "bottom"
                }
                .to_string(),
            );
        }
        Ok(axis)
    }

    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    pub fn scale(&self) -> &ScaleRef {
        &self.scale
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn orientation(&self) -> &str {
        &self.orientation
    }

    pub fn side(&self) -> Option<&str> {
        self.side.as_deref()
    }

    pub fn grid_lines(&self) -> &str {
        &self.grid_lines
    }

    pub fn visible(&self) -> bool {
        self.visible
    }
}

impl Model for Axis {
    fn id(&self) -> ModelId {
        self.id
    }

    fn model_name(&self) -> &'static str {
        self.kind.name()
    }

    fn state(&self) -> Map<String, Value> {
        let mut state = Map::new();
        state.insert("_model_name".into(), json!(self.kind.name()));
        state.insert("scale".into(), self.scale.reference());
        state.insert("orientation".into(), json!(self.orientation));
        state.insert("side".into(), json!(self.side));
        state.insert("label".into(), json!(self.label));
        state.insert("grid_lines".into(), json!(self.grid_lines));
        state.insert("tick_format".into(), json!(self.tick_format));
        state.insert("num_ticks".into(), json!(self.num_ticks));
        state.insert("tick_values".into(), self.tick_values.clone().unwrap_or(Value::Null));
        state.insert("visible".into(), json!(self.visible));
        state.insert("color".into(), json!(self.color));
        state.insert("offset".into(), self.offset.clone().unwrap_or_else(|| json!({})));
        state
    }

    fn set_property(&mut self, name: &str, value: &Value) -> Result<()> {
        let model = self.kind.name();
        match name {
            "orientation" => {
                self.orientation = model::expect_choice(model, name, value, ORIENTATIONS)?
            }
            "side" => {
                self.side = if value.is_null() {
                    None
                } else {
                    Some(model::expect_choice(model, name, value, SIDES)?)
                }
            }
            "label" => self.label = model::expect_str(model, name, value)?,
            "grid_lines" => self.grid_lines = model::expect_choice(model, name, value, GRID_LINES)?,
            "tick_format" => {
                self.tick_format = if value.is_null() {
                    None
                } else {
                    Some(model::expect_str(model, name, value)?)
                }
            }
            "num_ticks" => {
                self.num_ticks = if value.is_null() {
                    None
                } else {
                    Some(model::expect_u32(model, name, value)?)
                }
            }
            "tick_values" => match value {
                Value::Null | Value::Array(_) => {
                    self.tick_values = Some(value.clone()).filter(|v| !v.is_null())
                }
                _ => return Err(PlotError::invalid_property(model, name, "expected a list")),
            },
            "visible" => self.visible = model::expect_bool(model, name, value)?,
            "color" => {
                self.color = if value.is_null() {
                    None
                } else {
                    Some(model::expect_str(model, name, value)?)
                }
            }
            "offset" => match value {
                Value::Object(_) => self.offset = Some(value.clone()),
                _ => return Err(PlotError::invalid_property(model, name, "expected an object")),
            },
            other => return Err(PlotError::unknown_property(model, other)),
        }
        Ok(())
    }
}
