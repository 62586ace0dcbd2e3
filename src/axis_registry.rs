// Per-figure axis registry and axis deduplication

use std::collections::BTreeMap;

use log::debug;

use crate::axis::{Axis, AxisRef};
use crate::error::Result;
use crate::figure::FigureRef;
use crate::mark::MarkRef;
use crate::model::{Attrs, Handle};
use crate::scale::ScaleRef;
use crate::sync::SyncChannel;

/// One scale/axis pairing ever bound to a dimension.
#[derive(Debug, Clone)]
pub struct AxisEntry {
    pub scale: ScaleRef,
    pub axis: AxisRef,
}

/// Dimension → history of scale/axis pairs for a single figure.
///
/// Entries are only ever appended. Lookup is by scale identity.
#[derive(Debug, Clone, Default)]
pub struct AxisRegistry {
    dimensions: BTreeMap<String, Vec<AxisEntry>>,
}

impl AxisRegistry {
    pub fn lookup(&self, dimension: &str, scale: &ScaleRef) -> Option<AxisRef> {
        self.dimensions
            .get(dimension)?
            .iter()
            .find(|entry| entry.scale.ptr_eq(scale))
            .map(|entry| entry.axis.clone())
    }

    pub fn register(&mut self, dimension: &str, scale: ScaleRef, axis: AxisRef) {
        self.dimensions
            .entry(dimension.to_string())
            .or_default()
            .push(AxisEntry { scale, axis });
    }

    pub fn entries(&self, dimension: &str) -> &[AxisEntry] {
        self.dimensions
            .get(dimension)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn clear(&mut self) {
        self.dimensions.clear();
    }
}

/// The axis already representing `scale` along `dimension` on `figure`.
pub fn resolve_axis(figure: &FigureRef, dimension: &str, scale: &ScaleRef) -> Option<AxisRef> {
    figure.borrow().axis_registry.lookup(dimension, scale)
}

pub fn register_axis(figure: &FigureRef, dimension: &str, scale: ScaleRef, axis: AxisRef) {
    figure
        .borrow_mut()
        .axis_registry
        .register(dimension, scale, axis);
}

/// Find or create an axis for every axis-bearing scaled attribute of `mark`.
///
/// Existing axes receive the caller's overrides for that attribute as one
/// batched update. New axes are built from the mark's scale metadata merged
/// with the caller's options; the figure's axis list is then replaced once.
/// Returns the axis used for each attribute.
pub fn ensure_axes_for_mark(
    channel: &dyn SyncChannel,
    figure: &FigureRef,
    mark: &MarkRef,
    options: &BTreeMap<String, Attrs>,
) -> Result<BTreeMap<String, AxisRef>> {
    let mark = mark.borrow();
    let mut axes = BTreeMap::new();
    let mut created: Vec<(String, ScaleRef, AxisRef)> = Vec::new();

    for (name, scale) in mark.scales() {
        let Some(attribute) = mark.kind().attribute(name) else {
            continue;
        };
        let dimension = mark.dimension_of(name);
        let overrides = options.get(name).cloned().unwrap_or_default();

        let existing = resolve_axis(figure, &dimension, scale).or_else(|| {
            created
                .iter()
                .find(|(d, s, _)| *d == dimension && s.ptr_eq(scale))
                .map(|(_, _, axis)| axis.clone())
        });
        if let Some(axis) = existing {
            debug!("reusing {} axis {} for '{}'", dimension, axis.id(), name);
            axis.hold_sync(channel, &overrides)?;
            axes.insert(name.clone(), axis);
            continue;
        }

        let Some(kind) = attribute.preferred_axis() else {
            continue;
        };
        let mut axis_args = mark.scales_metadata().get(name).cloned().unwrap_or_default();
        axis_args.extend(overrides);
        let axis = Handle::new(Axis::with_options(kind, scale.clone(), &axis_args)?);
        debug!("created {} {} for dimension '{}'", kind.name(), axis.id(), dimension);
        created.push((dimension, scale.clone(), axis.clone()));
        axes.insert(name.clone(), axis);
    }

    if !created.is_empty() {
        let mut figure_axes = figure.borrow().axes().to_vec();
        for (dimension, scale, axis) in created {
            axis.open(channel);
            figure_axes.push(axis.clone());
            register_axis(figure, &dimension, scale, axis);
        }
        figure.replace_axes(channel, figure_axes);
    }
    Ok(axes)
}
