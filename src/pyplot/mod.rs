// Pyplot-style drawing façade: one call per chart type on top of a context

mod format;

pub use format::FormatSpec;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::debug;
use serde_json::{json, Value};

use crate::array::ArrayData;
use crate::axis::AxisRef;
use crate::axis_registry::{ensure_axes_for_mark, resolve_axis};
use crate::context::Context;
use crate::error::{PlotError, Result};
use crate::figure::FigureRef;
use crate::interaction::{Interaction, InteractionKind, InteractionRef};
use crate::mark::{Mark, MarkKind, MarkRef};
use crate::model::{Attrs, Handle};
use crate::resolve::{resolve_scales, ScaleRequest};
use crate::scale::{Scale, ScaleKind, ScaleRef};
use crate::sync::SyncMessage;

/// Colors for a mark's color scale.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorMap {
    /// A named scheme such as `"viridis"`.
    Scheme(String),
    Colors(Vec<String>),
}

impl ColorMap {
    fn scale_options(&self) -> Attrs {
        match self {
            ColorMap::Scheme(scheme) => Attrs::from([("scheme".to_string(), json!(scheme))]),
            ColorMap::Colors(colors) => Attrs::from([("colors".to_string(), json!(colors))]),
        }
    }
}

/// Everything a drawing call accepts besides its positional data.
#[derive(Debug, Clone)]
pub struct MarkArgs {
    pub data: IndexMap<String, ArrayData>,
    pub properties: Attrs,
    /// Explicit scales by attribute name.
    pub scales: BTreeMap<String, ScaleRef>,
    /// Constructor options for inferred scales, by attribute name.
    pub scale_options: BTreeMap<String, Attrs>,
    /// Options for the axes of each attribute.
    pub axis_options: BTreeMap<String, Attrs>,
    /// Target figure; the current figure when absent.
    pub figure: Option<FigureRef>,
    pub update_context: bool,
    /// Whether to create axes; the context default when absent.
    pub axes: Option<bool>,
    pub cmap: Option<ColorMap>,
}

impl Default for MarkArgs {
    fn default() -> Self {
        MarkArgs {
            data: IndexMap::new(),
            properties: Attrs::new(),
            scales: BTreeMap::new(),
            scale_options: BTreeMap::new(),
            axis_options: BTreeMap::new(),
            figure: None,
            update_context: true,
            axes: None,
            cmap: None,
        }
    }
}

impl MarkArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(mut self, name: impl Into<String>, values: impl Into<ArrayData>) -> Self {
        self.data.insert(name.into(), values.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn scale(mut self, name: impl Into<String>, scale: ScaleRef) -> Self {
        self.scales.insert(name.into(), scale);
        self
    }

    pub fn scale_option(mut self, name: &str, option: &str, value: Value) -> Self {
        self.scale_options
            .entry(name.to_string())
            .or_default()
            .insert(option.to_string(), value);
        self
    }

    pub fn axis_option(mut self, name: &str, option: &str, value: Value) -> Self {
        self.axis_options
            .entry(name.to_string())
            .or_default()
            .insert(option.to_string(), value);
        self
    }

    pub fn figure(mut self, figure: FigureRef) -> Self {
        self.figure = Some(figure);
        self
    }

    pub fn update_context(mut self, update: bool) -> Self {
        self.update_context = update;
        self
    }

    pub fn axes(mut self, enabled: bool) -> Self {
        self.axes = Some(enabled);
        self
    }

    pub fn cmap(mut self, cmap: ColorMap) -> Self {
        self.cmap = Some(cmap);
        self
    }
}

impl Context {
    /// Resolve scales, build the mark, append it to the target figure and
    /// create its axes.
    pub fn draw_mark(&mut self, kind: MarkKind, args: MarkArgs) -> Result<MarkRef> {
        let MarkArgs {
            data,
            properties,
            scales,
            mut scale_options,
            axis_options,
            figure,
            update_context,
            axes,
            cmap,
        } = args;
        let figure = match figure {
            Some(figure) => figure,
            None => self.current_figure(),
        };
        if let Some(cmap) = cmap {
            scale_options
                .entry("color".to_string())
                .or_default()
                .extend(cmap.scale_options());
        }

        // Figure reference scales position marks absolutely and never enter the context.
        let (pinned, supplied): (BTreeMap<String, ScaleRef>, BTreeMap<String, ScaleRef>) = scales
            .into_iter()
            .partition(|(_, scale)| figure.borrow().is_reference_scale(scale));
        let unpinned: IndexMap<String, ArrayData> = data
            .iter()
            .filter(|(name, _)| !pinned.contains_key(*name))
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect();

        let known: Vec<ScaleRef> = self
            .state
            .scales
            .values()
            .chain(supplied.values())
            .cloned()
            .collect();
        // Context bindings change only once the mark exists.
        let mut staged = self.state.scales.clone();
        let resolved = resolve_scales(
            &self.registry,
            &mut staged,
            ScaleRequest {
                mark: kind,
                supplied: &supplied,
                data: &unpinned,
                options: &scale_options,
                update_context,
            },
        )?;
        let created: Vec<ScaleRef> = resolved
            .values()
            .filter(|scale| !known.iter().any(|k| k.ptr_eq(scale)))
            .cloned()
            .collect();
        let mut bindings = resolved;
        bindings.extend(pinned);

        let mark = Handle::new(Mark::new(kind, bindings, data, &properties)?);
        self.state.scales = staged;
        self.store_scales();
        for scale in &created {
            scale.open(self.channel());
        }
        mark.open(self.channel());
        debug!("drew {} {} on figure {}", kind.name(), mark.id(), figure.id());
        self.state.last_mark = Some(mark.clone());

        let mut marks = figure.borrow().marks().to_vec();
        marks.push(mark.clone());
        figure.replace_marks(self.channel(), marks);

        if axes.unwrap_or(self.config.draw_axes) {
            ensure_axes_for_mark(self.channel(), &figure, &mark, &axis_options)?;
        }
        Ok(mark)
    }

    /// Find or create the axes of `mark` (the last drawn mark by default).
    pub fn axes(
        &mut self,
        mark: Option<&MarkRef>,
        options: &BTreeMap<String, Attrs>,
        figure: Option<FigureRef>,
    ) -> Result<BTreeMap<String, AxisRef>> {
        let Some(mark) = mark.cloned().or_else(|| self.last_mark()) else {
            return Ok(BTreeMap::new());
        };
        let figure = match figure {
            Some(figure) => figure,
            None => self.current_figure(),
        };
        ensure_axes_for_mark(self.channel(), &figure, &mark, options)
    }

    /// Draw `y` against `x`, or against its index when `x` is absent.
    ///
    /// A format string picks the line style, color and marker; a marker
    /// without a line style draws a scatter instead.
    pub fn plot(
        &mut self,
        x: Option<ArrayData>,
        y: ArrayData,
        format: Option<&str>,
        mut args: MarkArgs,
    ) -> Result<MarkRef> {
        let x = x.unwrap_or_else(|| ArrayData::arange(y.shape().last().copied().unwrap_or(0)));
        args.data.insert("x".to_string(), x);
        args.data.insert("y".to_string(), y);

        let spec = format.map(FormatSpec::parse).unwrap_or_default();
        if let Some(color) = spec.color {
            args.properties
                .entry("colors".to_string())
                .or_insert_with(|| json!([color]));
        }
        if let Some(marker) = spec.marker {
            args.properties
                .entry("marker".to_string())
                .or_insert_with(|| json!(marker));
        }
        if spec.is_marker_only() {
            return self.draw_mark(MarkKind::Scatter, args);
        }
        args.properties
            .entry("line_style".to_string())
            .or_insert_with(|| json!(spec.line_style.unwrap_or("solid")));
        self.draw_mark(MarkKind::Lines, args)
    }

    pub fn scatter(&mut self, x: ArrayData, y: ArrayData, mut args: MarkArgs) -> Result<MarkRef> {
        args.data.insert("x".to_string(), x);
        args.data.insert("y".to_string(), y);
        self.draw_mark(MarkKind::Scatter, args)
    }

    pub fn bar(&mut self, x: ArrayData, y: ArrayData, mut args: MarkArgs) -> Result<MarkRef> {
        args.data.insert("x".to_string(), x);
        args.data.insert("y".to_string(), y);
        self.draw_mark(MarkKind::Bars, args)
    }

    /// Histogram of `sample`. The count axis reuses the context's `y` scale, or
    /// a new linear scale that then becomes the context's `y` scale.
    pub fn hist(&mut self, sample: ArrayData, mut args: MarkArgs) -> Result<MarkRef> {
        args.data.insert("sample".to_string(), sample);
        if !args.scales.contains_key("count") {
            let dimension = MarkKind::Hist.dimension_of("count");
            let count = match self.state.scales.get(&dimension) {
                Some(scale) => scale.clone(),
                None => {
                    let options = args.scale_options.get("count").cloned().unwrap_or_default();
                    let scale = Handle::new(Scale::with_options(ScaleKind::Linear, &options)?);
                    scale.open(self.channel());
                    self.state.scales.insert(dimension, scale.clone());
                    self.store_scales();
                    scale
                }
            };
            args.scales.insert("count".to_string(), count);
        }
        self.draw_mark(MarkKind::Hist, args)
    }

    /// Pie of `sizes`, centred on the figure unless a position is given.
    pub fn pie(&mut self, sizes: ArrayData, mut args: MarkArgs) -> Result<MarkRef> {
        args.data.insert("sizes".to_string(), sizes);
        if !args.data.contains_key("x") && !args.data.contains_key("y") {
            let figure = match &args.figure {
                Some(figure) => figure.clone(),
                None => self.current_figure(),
            };
            let figure = figure.borrow();
            args.data.insert("x".to_string(), ArrayData::floats(vec![0.5]));
            args.data.insert("y".to_string(), ArrayData::floats(vec![0.5]));
            args.scales
                .entry("x".to_string())
                .or_insert_with(|| figure.scale_x().clone());
            args.scales
                .entry("y".to_string())
                .or_insert_with(|| figure.scale_y().clone());
        }
        self.draw_mark(MarkKind::Pie, args)
    }

    /// Open/high/low/close chart. `y` holds one `[open, high, low, close]`
    /// row per `x`; `x` defaults to the row index.
    pub fn ohlc(&mut self, x: Option<ArrayData>, y: ArrayData, mut args: MarkArgs) -> Result<MarkRef> {
        let x = x.unwrap_or_else(|| ArrayData::arange(y.shape().first().copied().unwrap_or(0)));
        args.data.insert("x".to_string(), x);
        args.data.insert("y".to_string(), y);
        self.draw_mark(MarkKind::Ohlc, args)
    }

    pub fn label(&mut self, text: ArrayData, mut args: MarkArgs) -> Result<MarkRef> {
        args.data.insert("text".to_string(), text);
        self.draw_mark(MarkKind::Label, args)
    }

    /// Choropleth map. Projects with Mercator unless a projection is supplied.
    pub fn geo(&mut self, map_data: Option<Value>, mut args: MarkArgs) -> Result<MarkRef> {
        if !args.scales.contains_key("projection") {
            let options = args
                .scale_options
                .get("projection")
                .cloned()
                .unwrap_or_default();
            let projection = Handle::new(Scale::with_options(ScaleKind::Mercator, &options)?);
            projection.open(self.channel());
            args.scales.insert("projection".to_string(), projection);
        }
        if let Some(map_data) = map_data {
            args.properties.insert("map_data".to_string(), map_data);
        }
        self.draw_mark(MarkKind::Map, args)
    }

    pub fn xlabel(&mut self, label: &str, mark: Option<&MarkRef>) -> Result<Option<AxisRef>> {
        self.set_label(label, mark, "x")
    }

    pub fn ylabel(&mut self, label: &str, mark: Option<&MarkRef>) -> Result<Option<AxisRef>> {
        self.set_label(label, mark, "y")
    }

    // Labels the axis representing `attribute` of the mark, if it has one.
    fn set_label(&mut self, label: &str, mark: Option<&MarkRef>, attribute: &str) -> Result<Option<AxisRef>> {
        let Some(mark) = mark.cloned().or_else(|| self.last_mark()) else {
            return Ok(None);
        };
        let figure = self.current_figure();
        let (dimension, scale) = {
            let mark = mark.borrow();
            match mark.scale(attribute) {
                Some(scale) => (mark.dimension_of(attribute), scale.clone()),
                None => return Ok(None),
            }
        };
        let Some(axis) = resolve_axis(&figure, &dimension, &scale) else {
            return Ok(None);
        };
        axis.hold_sync(
            self.channel(),
            &Attrs::from([("label".to_string(), json!(label))]),
        )?;
        Ok(Some(axis))
    }

    pub fn title(&mut self, title: &str) -> Result<()> {
        let figure = self.current_figure();
        figure.hold_sync(
            self.channel(),
            &Attrs::from([("title".to_string(), json!(title))]),
        )
    }

    /// Show every mark of the current figure in the legend.
    pub fn legend(&mut self) -> Result<()> {
        let figure = self.current_figure();
        let marks = figure.borrow().marks().to_vec();
        let attrs = Attrs::from([("display_legend".to_string(), json!(true))]);
        for mark in marks {
            mark.hold_sync(self.channel(), &attrs)?;
        }
        Ok(())
    }

    /// Set the grid lines of every axis of the current figure.
    pub fn grids(&mut self, value: &str) -> Result<()> {
        let figure = self.current_figure();
        let axes = figure.borrow().axes().to_vec();
        let attrs = Attrs::from([("grid_lines".to_string(), json!(value))]);
        for axis in axes {
            axis.hold_sync(self.channel(), &attrs)?;
        }
        Ok(())
    }

    pub fn xlim(&mut self, min: f64, max: f64) -> Result<ScaleRef> {
        self.set_lim("x", min, max)
    }

    pub fn ylim(&mut self, min: f64, max: f64) -> Result<ScaleRef> {
        self.set_lim("y", min, max)
    }

    /// Fix the domain of the scale bound to `dimension`.
    pub fn set_lim(&mut self, dimension: &str, min: f64, max: f64) -> Result<ScaleRef> {
        let scale = self
            .scale(dimension)
            .ok_or_else(|| PlotError::UnboundDimension(dimension.to_string()))?;
        scale.hold_sync(
            self.channel(),
            &Attrs::from([("min".to_string(), json!(min)), ("max".to_string(), json!(max))]),
        )?;
        Ok(scale)
    }

    /// Attach an interaction to the current figure, driven by the context's
    /// `x` and `y` scales. Marks default to the last drawn mark. A previous
    /// interaction is closed.
    pub fn set_interaction(
        &mut self,
        kind: InteractionKind,
        marks: Option<Vec<MarkRef>>,
    ) -> InteractionRef {
        let figure = self.current_figure();
        let marks = marks.unwrap_or_else(|| self.last_mark().into_iter().collect());
        let interaction = Handle::new(Interaction::new(
            kind,
            self.scale("x"),
            self.scale("y"),
            marks,
        ));
        interaction.open(self.channel());

        let previous = figure.borrow().interaction().cloned();
        if let Some(previous) = previous {
            previous.borrow_mut().mark_closed();
            self.channel().send(SyncMessage::Close { id: previous.id() });
        }
        figure.borrow_mut().set_interaction(Some(interaction.clone()));
        figure.publish(self.channel(), &["interaction"]);
        interaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotConfig;
    use crate::context::FigureOptions;
    use crate::sync::RecordingChannel;
    use std::rc::Rc;

    fn recording() -> (Context, Rc<RecordingChannel>) {
        let channel = Rc::new(RecordingChannel::new());
        let ctx = Context::new(PlotConfig::default(), channel.clone());
        (ctx, channel)
    }

    fn ys() -> ArrayData {
        ArrayData::floats(vec![1.0, 4.0, 9.0])
    }

    #[test]
    fn test_plot_infers_index_domain() {
        let (mut ctx, _) = recording();
        let mark = ctx.plot(None, ys(), None, MarkArgs::new()).unwrap();
        let mark = mark.borrow();
        assert_eq!(mark.kind(), MarkKind::Lines);
        assert_eq!(mark.data("x").unwrap().to_f64(), Some(vec![0.0, 1.0, 2.0]));
        assert_eq!(mark.property("line_style"), Some(&json!("solid")));
    }

    #[test]
    fn test_plot_multi_line_domain_uses_last_dimension() {
        let (mut ctx, _) = recording();
        let y = ArrayData::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let mark = ctx.plot(None, y, None, MarkArgs::new()).unwrap();
        assert_eq!(mark.borrow().data("x").unwrap().len(), 2);
    }

    #[test]
    fn test_plot_format_string() {
        let (mut ctx, _) = recording();
        let mark = ctx.plot(None, ys(), Some("r--"), MarkArgs::new()).unwrap();
        assert_eq!(mark.borrow().property("line_style"), Some(&json!("dashed")));
        assert_eq!(mark.borrow().property("colors"), Some(&json!(["red"])));

        let points = ctx.plot(None, ys(), Some("o"), MarkArgs::new()).unwrap();
        assert_eq!(points.borrow().kind(), MarkKind::Scatter);
        assert_eq!(points.borrow().property("marker"), Some(&json!("circle")));
    }

    #[test]
    fn test_marks_share_context_scales_and_axes() {
        let (mut ctx, _) = recording();
        let line = ctx.plot(None, ys(), None, MarkArgs::new()).unwrap();
        let points = ctx
            .scatter(ArrayData::floats(vec![0.5]), ArrayData::floats(vec![2.0]), MarkArgs::new())
            .unwrap();

        assert!(line.borrow().scale("x").unwrap().ptr_eq(points.borrow().scale("x").unwrap()));
        let figure = ctx.current_figure();
        assert_eq!(figure.borrow().marks().len(), 2);
        assert_eq!(figure.borrow().axes().len(), 2);
        assert!(ctx.last_mark().unwrap().ptr_eq(&points));
    }

    #[test]
    fn test_mark_list_replaced_once_per_draw() {
        let (mut ctx, channel) = recording();
        let figure = ctx.current_figure();
        ctx.plot(None, ys(), None, MarkArgs::new().axes(false)).unwrap();
        let updates = channel.updates_for(figure.id());
        assert_eq!(updates.len(), 1);
        assert!(updates[0].contains_key("marks"));
        assert!(figure.borrow().axes().is_empty());
    }

    #[test]
    fn test_explicit_figure_target() {
        let (mut ctx, _) = recording();
        let other = ctx.figure(FigureOptions::new().key("other")).unwrap();
        ctx.figure(FigureOptions::new().key("main")).unwrap();
        ctx.plot(None, ys(), None, MarkArgs::new().figure(other.clone())).unwrap();
        assert_eq!(other.borrow().marks().len(), 1);
        assert!(ctx.current_figure().borrow().marks().is_empty());
    }

    #[test]
    fn test_without_context_update() {
        let (mut ctx, _) = recording();
        ctx.plot(None, ys(), None, MarkArgs::new().update_context(false)).unwrap();
        assert!(ctx.scales().is_empty());
    }

    #[test]
    fn test_cmap_reaches_color_scale() {
        let (mut ctx, _) = recording();
        let mark = ctx
            .scatter(
                ArrayData::floats(vec![1.0, 2.0]),
                ArrayData::floats(vec![1.0, 2.0]),
                MarkArgs::new()
                    .data("color", vec![0.1, 0.9])
                    .cmap(ColorMap::Scheme("viridis".to_string())),
            )
            .unwrap();
        let color = mark.borrow().scale("color").unwrap().clone();
        assert_eq!(color.borrow().kind(), ScaleKind::Color);
        assert_eq!(color.borrow().option("scheme"), Some(&json!("viridis")));
        assert_eq!(ctx.current_figure().borrow().axes().len(), 3);
    }

    #[test]
    fn test_hist_binds_count_scale() {
        let (mut ctx, _) = recording();
        let mark = ctx.hist(ArrayData::floats(vec![1.0, 1.5, 3.0]), MarkArgs::new()).unwrap();
        let count = mark.borrow().scale("count").unwrap().clone();
        assert_eq!(count.borrow().kind(), ScaleKind::Linear);
        assert!(ctx.scale("y").unwrap().ptr_eq(&count));
        assert!(ctx.scale("x").unwrap().ptr_eq(mark.borrow().scale("sample").unwrap()));
    }

    #[test]
    fn test_hist_reuses_context_y() {
        let (mut ctx, _) = recording();
        let line = ctx.plot(None, ys(), None, MarkArgs::new()).unwrap();
        let hist = ctx.hist(ArrayData::floats(vec![1.0]), MarkArgs::new()).unwrap();
        assert!(hist.borrow().scale("count").unwrap().ptr_eq(line.borrow().scale("y").unwrap()));
    }

    #[test]
    fn test_pie_centred_without_touching_context() {
        let (mut ctx, _) = recording();
        let pie = ctx.pie(ArrayData::floats(vec![1.0, 2.0, 3.0]), MarkArgs::new()).unwrap();
        let figure = ctx.current_figure();
        assert!(pie.borrow().scale("x").unwrap().ptr_eq(figure.borrow().scale_x()));
        assert_eq!(pie.borrow().data("x").unwrap().to_f64(), Some(vec![0.5]));
        assert!(ctx.scales().is_empty());
        assert!(figure.borrow().axes().is_empty());
    }

    #[test]
    fn test_ohlc_default_domain() {
        let (mut ctx, _) = recording();
        let y = ArrayData::from_rows(vec![vec![1.0, 2.0, 0.5, 1.5], vec![1.5, 2.5, 1.0, 2.0]]).unwrap();
        let mark = ctx.ohlc(None, y, MarkArgs::new()).unwrap();
        assert_eq!(mark.borrow().data("x").unwrap().len(), 2);
    }

    #[test]
    fn test_label_requires_strings() {
        let (mut ctx, _) = recording();
        let args = MarkArgs::new().data("x", vec![0.0]).data("y", vec![1.0]);
        assert!(ctx.label(ArrayData::strings(["peak"]), args.clone()).is_ok());
        assert!(matches!(
            ctx.label(ArrayData::floats(vec![1.0]), args),
            Err(PlotError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_geo_defaults_to_mercator() {
        let (mut ctx, _) = recording();
        let map = ctx.geo(Some(json!("WorldMap")), MarkArgs::new()).unwrap();
        let projection = map.borrow().scale("projection").unwrap().clone();
        assert_eq!(projection.borrow().kind(), ScaleKind::Mercator);
        assert_eq!(map.borrow().property("map_data"), Some(&json!("WorldMap")));
        assert!(ctx.current_figure().borrow().axes().is_empty());
    }

    #[test]
    fn test_labels_reach_axes() {
        let (mut ctx, _) = recording();
        ctx.plot(None, ys(), None, MarkArgs::new()).unwrap();
        let x_axis = ctx.xlabel("Index", None).unwrap().unwrap();
        let y_axis = ctx.ylabel("Value", None).unwrap().unwrap();
        assert_eq!(x_axis.borrow().label(), "Index");
        assert_eq!(y_axis.borrow().label(), "Value");
    }

    #[test]
    fn test_label_without_mark_is_noop() {
        let (mut ctx, _) = recording();
        assert!(ctx.xlabel("x", None).unwrap().is_none());
    }

    #[test]
    fn test_title_legend_grids() {
        let (mut ctx, _) = recording();
        let mark = ctx.plot(None, ys(), None, MarkArgs::new()).unwrap();
        ctx.title("Squares").unwrap();
        ctx.legend().unwrap();
        ctx.grids("dashed").unwrap();

        let figure = ctx.current_figure();
        assert_eq!(figure.borrow().title(), "Squares");
        assert!(mark.borrow().display_legend());
        assert!(figure.borrow().axes().iter().all(|a| a.borrow().grid_lines() == "dashed"));
        assert!(ctx.grids("wavy").is_err());
    }

    #[test]
    fn test_limits() {
        let (mut ctx, _) = recording();
        assert!(matches!(ctx.xlim(0.0, 1.0), Err(PlotError::UnboundDimension(_))));
        ctx.plot(None, ys(), None, MarkArgs::new()).unwrap();
        let scale = ctx.ylim(-1.0, 10.0).unwrap();
        assert_eq!(scale.borrow().min(), Some(-1.0));
        assert_eq!(scale.borrow().max(), Some(10.0));
    }

    #[test]
    fn test_set_interaction_uses_context_scales() {
        let (mut ctx, channel) = recording();
        let mark = ctx.plot(None, ys(), None, MarkArgs::new()).unwrap();
        let first = ctx.set_interaction(InteractionKind::BrushIntervalSelector, None);
        assert!(first.borrow().x_scale().unwrap().ptr_eq(&ctx.scale("x").unwrap()));
        assert!(first.borrow().y_scale().is_none());
        assert!(first.borrow().marks()[0].ptr_eq(&mark));

        let second = ctx.set_interaction(InteractionKind::PanZoom, Some(vec![]));
        assert!(first.borrow().is_closed());
        assert!(channel.was_closed(first.id()));
        assert!(ctx.current_figure().borrow().interaction().unwrap().ptr_eq(&second));
    }

    #[test]
    fn test_no_compatible_scale_surfaces() {
        let (mut ctx, _) = recording();
        let err = ctx
            .plot(None, ys(), None, MarkArgs::new().data("color", ArrayData::bools(vec![true])))
            .unwrap_err();
        assert!(matches!(err, PlotError::NoCompatibleScale { .. }));
    }
}
