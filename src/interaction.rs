// Interaction models attached to a figure

use serde_json::{json, Map, Value};

use crate::error::{PlotError, Result};
use crate::mark::MarkRef;
use crate::model::{self, Handle, Model, ModelId};
use crate::scale::ScaleRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    PanZoom,
    BrushSelector,
    BrushIntervalSelector,
    FastIntervalSelector,
    IndexSelector,
    LassoSelector,
    HandDraw,
}

impl InteractionKind {
    pub fn name(self) -> &'static str {
        match self {
            InteractionKind::PanZoom => "PanZoom",
            InteractionKind::BrushSelector => "BrushSelector",
            InteractionKind::BrushIntervalSelector => "BrushIntervalSelector",
            InteractionKind::FastIntervalSelector => "FastIntervalSelector",
            InteractionKind::IndexSelector => "IndexSelector",
            InteractionKind::LassoSelector => "LassoSelector",
            InteractionKind::HandDraw => "HandDraw",
        }
    }

    /// Whether the interaction needs a vertical scale as well as a horizontal one.
    pub fn uses_y(self) -> bool {
        matches!(
            self,
            InteractionKind::PanZoom | InteractionKind::BrushSelector | InteractionKind::LassoSelector
        )
    }

    pub fn parse(name: &str) -> Option<Self> {
        let kind = match name {
            "panzoom" | "pan_zoom" => InteractionKind::PanZoom,
            "brush" => InteractionKind::BrushSelector,
            "brush_interval" => InteractionKind::BrushIntervalSelector,
            "interval" | "fast_interval" => InteractionKind::FastIntervalSelector,
            "index" => InteractionKind::IndexSelector,
            "lasso" => InteractionKind::LassoSelector,
            "hand_draw" => InteractionKind::HandDraw,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone)]
pub struct Interaction {
    id: ModelId,
    kind: InteractionKind,
    x_scale: Option<ScaleRef>,
    y_scale: Option<ScaleRef>,
    marks: Vec<MarkRef>,
    color: Option<String>,
    closed: bool,
}

pub type InteractionRef = Handle<Interaction>;

impl Interaction {
    pub fn new(
        kind: InteractionKind,
        x_scale: Option<ScaleRef>,
        y_scale: Option<ScaleRef>,
        marks: Vec<MarkRef>,
    ) -> Self {
        Interaction {
            id: ModelId::next(),
            kind,
            x_scale,
            y_scale: y_scale.filter(|_| kind.uses_y()),
            marks,
            color: None,
            closed: false,
        }
    }

    pub fn kind(&self) -> InteractionKind {
        self.kind
    }

    pub fn x_scale(&self) -> Option<&ScaleRef> {
        self.x_scale.as_ref()
    }

    pub fn y_scale(&self) -> Option<&ScaleRef> {
        self.y_scale.as_ref()
    }

    pub fn marks(&self) -> &[MarkRef] {
        &self.marks
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn mark_closed(&mut self) {
        self.closed = true;
    }
}

impl Model for Interaction {
    fn id(&self) -> ModelId {
        self.id
    }

    fn model_name(&self) -> &'static str {
        self.kind.name()
    }

    fn state(&self) -> Map<String, Value> {
        let mut state = Map::new();
        state.insert("_model_name".into(), json!(self.kind.name()));
        let scale_ref = |s: &Option<ScaleRef>| s.as_ref().map(|s| s.reference()).unwrap_or(Value::Null);
        state.insert("x_scale".into(), scale_ref(&self.x_scale));
        state.insert("y_scale".into(), scale_ref(&self.y_scale));
        state.insert(
            "marks".into(),
            Value::Array(self.marks.iter().map(|m| m.reference()).collect()),
        );
        state.insert("color".into(), json!(self.color));
        state
    }

    fn set_property(&mut self, name: &str, value: &Value) -> Result<()> {
        let model = self.kind.name();
        match name {
            "color" => {
                self.color = if value.is_null() {
                    None
                } else {
                    Some(model::expect_str(model, name, value)?)
                }
            }
            other => return Err(PlotError::unknown_property(model, other)),
        }
        Ok(())
    }
}
