// Plot context: current figure, keyed figure registry and scale contexts

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use log::{debug, info};
use serde_json::{json, Value};

use crate::config::PlotConfig;
use crate::error::{PlotError, Result};
use crate::figure::{Figure, FigureRef};
use crate::mark::MarkRef;
use crate::model::{Attrs, Handle, Model};
use crate::resolve::ScaleMap;
use crate::scale::{ScaleRef, ScaleRegistry};
use crate::sync::{NullChannel, SyncChannel};

/// How a dimension is bound when a scale context is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleSpec {
    /// Retain whatever the outgoing context binds to this dimension.
    Keep,
    Use(ScaleRef),
}

/// Dimension → binding request, in caller order.
pub type ScaleSpecs = IndexMap<String, ScaleSpec>;

/// Arguments to [`Context::figure`].
#[derive(Debug, Clone, Default)]
pub struct FigureOptions {
    pub key: Option<String>,
    pub figure: Option<FigureRef>,
    pub scales: ScaleSpecs,
    pub attrs: Attrs,
}

impl FigureOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn figure(mut self, figure: FigureRef) -> Self {
        self.figure = Some(figure);
        self
    }

    pub fn scale(mut self, dimension: impl Into<String>, spec: ScaleSpec) -> Self {
        self.scales.insert(dimension.into(), spec);
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }
}

/// The mutable part of a context. Cloning it is cheap: models are shared.
#[derive(Debug, Clone, Default)]
pub struct ContextState {
    pub(crate) figure: Option<FigureRef>,
    pub(crate) figure_registry: BTreeMap<String, FigureRef>,
    pub(crate) scales: ScaleMap,
    pub(crate) scale_registry: BTreeMap<String, ScaleMap>,
    /// Registry entry the active scales belong to, if any.
    pub(crate) scale_key: Option<String>,
    pub(crate) last_mark: Option<MarkRef>,
    pub(crate) current_key: Option<String>,
}

/// An explicit plotting context.
///
/// Tracks the current figure, figures registered by key, the dimension → scale
/// bindings used to draw into the current figure, and the last drawn mark.
pub struct Context {
    pub(crate) config: PlotConfig,
    pub(crate) registry: ScaleRegistry,
    pub(crate) channel: Rc<dyn SyncChannel>,
    pub(crate) state: ContextState,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(PlotConfig::default(), Rc::new(NullChannel))
    }
}

impl Context {
    pub fn new(config: PlotConfig, channel: Rc<dyn SyncChannel>) -> Self {
        Context {
            config,
            registry: ScaleRegistry::builtin(),
            channel,
            state: ContextState::default(),
        }
    }

    pub fn with_registry(mut self, registry: ScaleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    pub fn registry(&self) -> &ScaleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ScaleRegistry {
        &mut self.registry
    }

    pub fn channel(&self) -> &dyn SyncChannel {
        self.channel.as_ref()
    }

    /// Make a figure current.
    ///
    /// An explicit figure is adopted (and registered under the key, if one is
    /// given) and the attributes are applied to it. Otherwise: no key creates a
    /// fresh unregistered figure; an unseen key creates and registers one with a
    /// default title; a known key reselects its figure and applies the
    /// attributes. The scale context for the key is selected afterwards.
    pub fn figure(&mut self, options: FigureOptions) -> Result<FigureRef> {
        let FigureOptions {
            key,
            figure,
            scales,
            mut attrs,
        } = options;

        let figure = match (figure, key.as_deref()) {
            (Some(figure), _) => {
                figure.hold_sync(self.channel(), &attrs)?;
                figure
            }
            (None, None) => self.new_figure(&attrs)?,
            (None, Some(key)) => match self.state.figure_registry.get(key).cloned() {
                Some(existing) => {
                    existing.hold_sync(self.channel(), &attrs)?;
                    existing
                }
                None => {
                    if !attrs.contains_key("title") {
                        attrs.insert("title".to_string(), json!(self.config.default_title(key)));
                    }
                    info!("creating figure for key '{}'", key);
                    self.new_figure(&attrs)?
                }
            },
        };

        if let Some(key) = &key {
            self.state.figure_registry.insert(key.clone(), figure.clone());
        }
        debug!("current figure is now {} (key {:?})", figure.id(), key);
        self.state.current_key = key.clone();
        self.state.figure = Some(figure.clone());
        self.select_scales(key.as_deref(), &scales);
        Ok(figure)
    }

    fn new_figure(&self, attrs: &Attrs) -> Result<FigureRef> {
        let mut figure = Figure::from_config(&self.config);
        for (name, value) in attrs {
            figure.set_property(name, value)?;
        }
        let figure = Handle::new(figure);
        figure.open(self.channel());
        Ok(figure)
    }

    /// Select the active dimension → scale bindings.
    ///
    /// Without a key the bindings are built from `specs`, where `Keep` carries
    /// over the outgoing binding for that dimension. A key seen for the first
    /// time stores bindings built the same way; a known key reactivates its
    /// stored bindings and ignores `specs`.
    pub fn select_scales(&mut self, key: Option<&str>, specs: &ScaleSpecs) {
        let outgoing = &self.state.scales;
        let build = || -> ScaleMap {
            specs
                .iter()
                .filter_map(|(dimension, spec)| match spec {
                    ScaleSpec::Keep => outgoing
                        .get(dimension)
                        .map(|scale| (dimension.clone(), scale.clone())),
                    ScaleSpec::Use(scale) => Some((dimension.clone(), scale.clone())),
                })
                .collect()
        };
        let selected = match key {
            None => build(),
            Some(key) => match self.state.scale_registry.get(key) {
                Some(stored) => stored.clone(),
                None => {
                    let fresh = build();
                    self.state
                        .scale_registry
                        .insert(key.to_string(), fresh.clone());
                    fresh
                }
            },
        };
        self.state.scales = selected;
        self.state.scale_key = key.map(str::to_string);
    }

    /// Write the active bindings back to the registry entry they belong to.
    pub(crate) fn store_scales(&mut self) {
        if let Some(key) = &self.state.scale_key {
            if let Some(entry) = self.state.scale_registry.get_mut(key) {
                *entry = self.state.scales.clone();
            }
        }
    }

    /// Close the figure registered under `key`. Unknown keys are ignored.
    pub fn close(&mut self, key: &str) -> Result<()> {
        let Some(figure) = self.state.figure_registry.get(key).cloned() else {
            debug!("close: no figure registered under '{}'", key);
            return Ok(());
        };
        let is_current = self
            .state
            .figure
            .as_ref()
            .map_or(false, |current| current.ptr_eq(&figure));
        if is_current {
            self.figure(FigureOptions::new())?;
        }
        figure.close(self.channel());
        self.state.figure_registry.remove(key);
        if self.state.scale_registry.remove(key).is_none() {
            debug!("close: '{}' had no scale context", key);
        }
        if self.state.scale_key.as_deref() == Some(key) {
            self.state.scale_key = None;
        }
        info!("closed figure '{}'", key);
        Ok(())
    }

    /// Remove every mark, axis and axis registration from the current figure
    /// and forget the active scale bindings.
    pub fn clear(&mut self) {
        let Some(figure) = self.state.figure.clone() else {
            return;
        };
        figure.borrow_mut().axis_registry.clear();
        figure.replace_marks(self.channel(), Vec::new());
        figure.replace_axes(self.channel(), Vec::new());
        self.state.scales.clear();
        if let Some(key) = &self.state.current_key {
            self.state
                .scale_registry
                .insert(key.clone(), ScaleMap::new());
        }
    }

    /// The current figure, creating a blank one if there is none.
    pub fn current_figure(&mut self) -> FigureRef {
        if let Some(figure) = &self.state.figure {
            return figure.clone();
        }
        let figure = Handle::new(Figure::from_config(&self.config));
        figure.open(self.channel());
        self.state.current_key = None;
        self.state.figure = Some(figure.clone());
        self.select_scales(None, &ScaleSpecs::new());
        figure
    }

    /// The figure registered under `key`.
    pub fn figure_for(&self, key: &str) -> Result<FigureRef> {
        self.state
            .figure_registry
            .get(key)
            .cloned()
            .ok_or_else(|| PlotError::FigureNotFound(key.to_string()))
    }

    pub fn has_figure(&self, key: &str) -> bool {
        self.state.figure_registry.contains_key(key)
    }

    pub fn has_scale_context(&self, key: &str) -> bool {
        self.state.scale_registry.contains_key(key)
    }

    /// Stored bindings for `key`.
    pub fn scale_context(&self, key: &str) -> Option<&ScaleMap> {
        self.state.scale_registry.get(key)
    }

    /// Active dimension → scale bindings.
    pub fn scales(&self) -> &ScaleMap {
        &self.state.scales
    }

    pub fn scale(&self, dimension: &str) -> Option<ScaleRef> {
        self.state.scales.get(dimension).cloned()
    }

    pub fn last_mark(&self) -> Option<MarkRef> {
        self.state.last_mark.clone()
    }

    pub fn current_key(&self) -> Option<&str> {
        self.state.current_key.as_deref()
    }

    pub fn snapshot(&self) -> ContextState {
        self.state.clone()
    }

    pub fn restore(&mut self, state: ContextState) {
        self.state = state;
    }

    /// Forget every figure and binding. Figures are not closed.
    pub fn reset(&mut self) {
        self.state = ContextState::default();
    }
}

thread_local! {
    static DEFAULT_CONTEXT: RefCell<Context> = RefCell::new(Context::new(PlotConfig::from_env(), Rc::new(NullChannel)));
}

/// Run `f` against this thread's ambient context.
pub fn with_default_context<R>(f: impl FnOnce(&mut Context) -> R) -> R {
    DEFAULT_CONTEXT.with(|ctx| f(&mut ctx.borrow_mut()))
}
