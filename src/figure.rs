// Figure model: the canvas holding marks, axes and an optional interaction

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};

use crate::axis::AxisRef;
use crate::axis_registry::AxisRegistry;
use crate::config::PlotConfig;
use crate::error::{PlotError, Result};
use crate::interaction::InteractionRef;
use crate::mark::MarkRef;
use crate::model::{self, Handle, Model, ModelId};
use crate::scale::{Scale, ScaleKind, ScaleRef};
use crate::sync::{SyncChannel, SyncMessage};

const LEGEND_LOCATIONS: &[&str] = &[
    "top-right",
    "top",
    "top-left",
    "left",
    "bottom-left",
    "bottom",
    "bottom-right",
    "right",
];

#[derive(Debug, Clone)]
pub struct Figure {
    id: ModelId,
    title: String,
    marks: Vec<MarkRef>,
    axes: Vec<AxisRef>,
    interaction: Option<InteractionRef>,
    scale_x: ScaleRef,
    scale_y: ScaleRef,
    layout: Value,
    fig_margin: Value,
    padding_x: f64,
    padding_y: f64,
    animation_duration: u32,
    legend_location: String,
    min_aspect_ratio: f64,
    max_aspect_ratio: f64,
    background_style: Value,
    title_style: Value,
    legend_style: Value,
    closed: bool,
    pub(crate) axis_registry: AxisRegistry,
}

pub type FigureRef = Handle<Figure>;

impl Figure {
    /// A blank figure with unit reference scales for absolute positioning.
    pub fn new() -> Self {
        Figure {
            id: ModelId::next(),
            title: String::new(),
            marks: Vec::new(),
            axes: Vec::new(),
            interaction: None,
            scale_x: unit_scale(),
            scale_y: unit_scale(),
            layout: json!({}),
            fig_margin: json!({"top": 60, "bottom": 60, "left": 60, "right": 60}),
            padding_x: 0.0,
            padding_y: 0.025,
            animation_duration: 0,
            legend_location: "top-right".to_string(),
            min_aspect_ratio: 0.01,
            max_aspect_ratio: 100.0,
            background_style: json!({}),
            title_style: json!({}),
            legend_style: json!({}),
            closed: false,
            axis_registry: AxisRegistry::default(),
        }
    }

    pub fn from_config(config: &PlotConfig) -> Self {
        let mut figure = Self::new();
        figure.layout = json!({
            "width": format!("{}px", config.width),
            "height": format!("{}px", config.height),
        });
        figure.animation_duration = config.animation_duration;
        figure
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn marks(&self) -> &[MarkRef] {
        &self.marks
    }

    pub fn axes(&self) -> &[AxisRef] {
        &self.axes
    }

    pub fn interaction(&self) -> Option<&InteractionRef> {
        self.interaction.as_ref()
    }

    pub fn scale_x(&self) -> &ScaleRef {
        &self.scale_x
    }

    pub fn scale_y(&self) -> &ScaleRef {
        &self.scale_y
    }

    /// Whether `scale` is one of the figure's absolute-positioning scales.
    pub fn is_reference_scale(&self, scale: &ScaleRef) -> bool {
        scale.ptr_eq(&self.scale_x) || scale.ptr_eq(&self.scale_y)
    }

    pub fn axis_registry(&self) -> &AxisRegistry {
        &self.axis_registry
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn set_marks(&mut self, marks: Vec<MarkRef>) {
        self.marks = marks;
    }

    pub(crate) fn set_axes(&mut self, axes: Vec<AxisRef>) {
        self.axes = axes;
    }

    pub(crate) fn set_interaction(&mut self, interaction: Option<InteractionRef>) {
        self.interaction = interaction;
    }
}

fn unit_scale() -> ScaleRef {
    let mut scale = Scale::new(ScaleKind::Linear);
    scale.set_limits(Some(0.0), Some(1.0));
    Handle::new(scale)
}

impl Default for Figure {
    fn default() -> Self {
        Self::new()
    }
}

impl Handle<Figure> {
    /// Replace the mark list wholesale, producing one observable change.
    pub fn replace_marks(&self, channel: &dyn SyncChannel, marks: Vec<MarkRef>) {
        self.borrow_mut().set_marks(marks);
        self.publish(channel, &["marks"]);
    }

    /// Replace the axis list wholesale, producing one observable change.
    pub fn replace_axes(&self, channel: &dyn SyncChannel, axes: Vec<AxisRef>) {
        self.borrow_mut().set_axes(axes);
        self.publish(channel, &["axes"]);
    }

    /// Close the interaction (if any), then the figure itself.
    pub fn close(&self, channel: &dyn SyncChannel) {
        let interaction = self.borrow().interaction.clone();
        if let Some(interaction) = interaction {
            interaction.borrow_mut().mark_closed();
            channel.send(SyncMessage::Close {
                id: interaction.id(),
            });
        }
        self.borrow_mut().closed = true;
        channel.send(SyncMessage::Close { id: self.id() });
    }

    /// Every model reachable from the figure, keyed by reference.
    pub fn graph(&self) -> Value {
        let mut seen = BTreeSet::new();
        let mut models = Map::new();
        let mut add = |id: ModelId, state: Map<String, Value>| {
            if seen.insert(id) {
                models.insert(id.reference(), Value::Object(state));
            }
        };

        let figure = self.borrow();
        add(figure.id(), figure.state());
        for scale in [&figure.scale_x, &figure.scale_y] {
            add(scale.id(), scale.borrow().state());
        }
        for mark in &figure.marks {
            let mark = mark.borrow();
            add(mark.id(), mark.state());
            for scale in mark.scales().values() {
                add(scale.id(), scale.borrow().state());
            }
        }
        for axis in &figure.axes {
            let axis = axis.borrow();
            add(axis.id(), axis.state());
            add(axis.scale().id(), axis.scale().borrow().state());
        }
        if let Some(interaction) = &figure.interaction {
            add(interaction.id(), interaction.borrow().state());
        }
        json!({"root": figure.id().reference(), "models": models})
    }
}

impl Model for Figure {
    fn id(&self) -> ModelId {
        self.id
    }

    fn model_name(&self) -> &'static str {
        "Figure"
    }

    fn state(&self) -> Map<String, Value> {
        let mut state = Map::new();
        state.insert("_model_name".into(), json!("Figure"));
        state.insert("title".into(), json!(self.title));
        state.insert(
            "marks".into(),
            Value::Array(self.marks.iter().map(|m| m.reference()).collect()),
        );
        state.insert(
            "axes".into(),
            Value::Array(self.axes.iter().map(|a| a.reference()).collect()),
        );
        state.insert(
            "interaction".into(),
            self.interaction
                .as_ref()
                .map(|i| i.reference())
                .unwrap_or(Value::Null),
        );
        state.insert("scale_x".into(), self.scale_x.reference());
        state.insert("scale_y".into(), self.scale_y.reference());
        state.insert("layout".into(), self.layout.clone());
        state.insert("fig_margin".into(), self.fig_margin.clone());
        state.insert("padding_x".into(), json!(self.padding_x));
        state.insert("padding_y".into(), json!(self.padding_y));
        state.insert("animation_duration".into(), json!(self.animation_duration));
        state.insert("legend_location".into(), json!(self.legend_location));
        state.insert("min_aspect_ratio".into(), json!(self.min_aspect_ratio));
        state.insert("max_aspect_ratio".into(), json!(self.max_aspect_ratio));
        state.insert("background_style".into(), self.background_style.clone());
        state.insert("title_style".into(), self.title_style.clone());
        state.insert("legend_style".into(), self.legend_style.clone());
        state
    }

    fn set_property(&mut self, name: &str, value: &Value) -> Result<()> {
        let expect_object = |value: &Value| -> Result<Value> {
            match value {
                Value::Object(_) => Ok(value.clone()),
                _ => Err(PlotError::invalid_property("Figure", name, "expected an object")),
            }
        };
        match name {
            "title" => self.title = model::expect_str("Figure", name, value)?,
            "animation_duration" => {
                self.animation_duration = model::expect_u32("Figure", name, value)?
            }
            "legend_location" => {
                self.legend_location = model::expect_choice("Figure", name, value, LEGEND_LOCATIONS)?
            }
            "padding_x" => self.padding_x = model::expect_f64("Figure", name, value)?,
            "padding_y" => self.padding_y = model::expect_f64("Figure", name, value)?,
            "min_aspect_ratio" => self.min_aspect_ratio = model::expect_f64("Figure", name, value)?,
            "max_aspect_ratio" => self.max_aspect_ratio = model::expect_f64("Figure", name, value)?,
            "layout" => self.layout = expect_object(value)?,
            "fig_margin" => self.fig_margin = expect_object(value)?,
            "background_style" => self.background_style = expect_object(value)?,
            "title_style" => self.title_style = expect_object(value)?,
            "legend_style" => self.legend_style = expect_object(value)?,
            other => return Err(PlotError::unknown_property("Figure", other)),
        }
        Ok(())
    }
}
