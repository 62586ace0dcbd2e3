// Scale resolution: decide which scale governs each scaled attribute of a mark

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::debug;

use crate::array::ArrayData;
use crate::error::{PlotError, Result};
use crate::mark::{MarkKind, ScaledAttribute};
use crate::model::{Attrs, Handle};
use crate::scale::{Scale, ScaleRef, ScaleRegistry};

/// Dimension → scale bindings of a context.
pub type ScaleMap = BTreeMap<String, ScaleRef>;

/// Everything the resolver needs to know about a mark about to be drawn.
#[derive(Debug, Clone, Copy)]
pub struct ScaleRequest<'a> {
    pub mark: MarkKind,
    /// Scales the caller bound explicitly, by attribute name.
    pub supplied: &'a BTreeMap<String, ScaleRef>,
    /// Attribute values the caller supplied.
    pub data: &'a IndexMap<String, ArrayData>,
    /// Constructor options for inferred scales, by attribute name.
    pub options: &'a BTreeMap<String, Attrs>,
    /// Whether bindings made here become part of the context.
    pub update_context: bool,
}

/// Bind a scale to every supplied scaled attribute of the requested mark.
///
/// Attributes without a value are skipped. Explicit scales win; otherwise the
/// context's scale for the attribute's dimension is reused, and when the
/// dimension is unbound a scale is inferred from the attribute's range type and
/// the data's element type. Explicit scales for attributes without a value are
/// passed through untouched.
pub fn resolve_scales(
    registry: &ScaleRegistry,
    context: &mut ScaleMap,
    request: ScaleRequest<'_>,
) -> Result<BTreeMap<String, ScaleRef>> {
    let mut scales = request.supplied.clone();

    for attribute in request.mark.scaled_attributes() {
        let name = attribute.name;
        let Some(values) = request.data.get(name) else {
            continue;
        };
        let dimension = attribute.dimension;

        if let Some(scale) = request.supplied.get(name) {
            if request.update_context {
                context.insert(dimension.to_string(), scale.clone());
            }
        } else if let Some(scale) = context.get(dimension) {
            scales.insert(name.to_string(), scale.clone());
        } else {
            let options = request.options.get(name).cloned().unwrap_or_default();
            let scale = Handle::new(infer_scale(registry, attribute, values, &options)?);
            if request.update_context {
                context.insert(dimension.to_string(), scale.clone());
            }
            scales.insert(name.to_string(), scale);
        }
    }
    Ok(scales)
}

/// Instantiate the highest-precedence scale type compatible with the
/// attribute's range type and the data's element type.
pub fn infer_scale(
    registry: &ScaleRegistry,
    attribute: &ScaledAttribute,
    values: &ArrayData,
    options: &Attrs,
) -> Result<Scale> {
    let dtype = values.dtype();
    let scale_type = registry
        .best_match(attribute.rtype, dtype)
        .ok_or_else(|| PlotError::NoCompatibleScale {
            attribute: attribute.name.to_string(),
            rtype: attribute.rtype.to_string(),
            dtype: dtype.to_string(),
        })?;
    debug!(
        "inferred {} for '{}' ({}, {})",
        scale_type.kind, attribute.name, attribute.rtype, dtype
    );
    Scale::with_options(scale_type.kind, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::{ScaleKind, ScaleType};
    use serde_json::json;

    fn data(pairs: Vec<(&str, ArrayData)>) -> IndexMap<String, ArrayData> {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    fn request<'a>(
        mark: MarkKind,
        supplied: &'a BTreeMap<String, ScaleRef>,
        data: &'a IndexMap<String, ArrayData>,
        options: &'a BTreeMap<String, Attrs>,
    ) -> ScaleRequest<'a> {
        ScaleRequest {
            mark,
            supplied,
            data,
            options,
            update_context: true,
        }
    }

    #[test]
    fn test_infers_linear_and_date() {
        let registry = ScaleRegistry::builtin();
        let mut context = ScaleMap::new();
        let values = data(vec![
            ("x", ArrayData::datetimes(vec![0, 86_400_000])),
            ("y", ArrayData::floats(vec![1.0, 2.0])),
        ]);
        let none = BTreeMap::new();
        let options = BTreeMap::new();
        let scales = resolve_scales(&registry, &mut context, request(MarkKind::Lines, &none, &values, &options)).unwrap();

        assert_eq!(scales["x"].borrow().kind(), ScaleKind::Date);
        assert_eq!(scales["y"].borrow().kind(), ScaleKind::Linear);
        assert!(context["x"].ptr_eq(&scales["x"]));
        assert!(!scales.contains_key("color"));
    }

    #[test]
    fn test_reuses_context_dimension() {
        let registry = ScaleRegistry::builtin();
        let existing = Scale::handle(ScaleKind::Log);
        let mut context = ScaleMap::new();
        context.insert("y".to_string(), existing.clone());
        let values = data(vec![("y", ArrayData::floats(vec![1.0]))]);
        let none = BTreeMap::new();
        let options = BTreeMap::new();
        let scales = resolve_scales(&registry, &mut context, request(MarkKind::Scatter, &none, &values, &options)).unwrap();

        assert!(scales["y"].ptr_eq(&existing));
    }

    #[test]
    fn test_explicit_scale_propagates() {
        let registry = ScaleRegistry::builtin();
        let explicit = Scale::handle(ScaleKind::Log);
        let mut supplied = BTreeMap::new();
        supplied.insert("x".to_string(), explicit.clone());
        let mut context = ScaleMap::new();
        let values = data(vec![("x", ArrayData::floats(vec![1.0]))]);
        let options = BTreeMap::new();
        let scales = resolve_scales(&registry, &mut context, request(MarkKind::Lines, &supplied, &values, &options)).unwrap();

        assert!(scales["x"].ptr_eq(&explicit));
        assert!(context["x"].ptr_eq(&explicit));
    }

    #[test]
    fn test_without_context_update() {
        let registry = ScaleRegistry::builtin();
        let mut context = ScaleMap::new();
        let values = data(vec![("x", ArrayData::floats(vec![1.0]))]);
        let none = BTreeMap::new();
        let options = BTreeMap::new();
        let mut req = request(MarkKind::Lines, &none, &values, &options);
        req.update_context = false;
        let scales = resolve_scales(&registry, &mut context, req).unwrap();

        assert!(scales.contains_key("x"));
        assert!(context.is_empty());
    }

    #[test]
    fn test_options_reach_inferred_scale() {
        let registry = ScaleRegistry::builtin();
        let mut context = ScaleMap::new();
        let values = data(vec![("color", ArrayData::floats(vec![1.0, 2.0]))]);
        let none = BTreeMap::new();
        let mut options = BTreeMap::new();
        options.insert("color".to_string(), Attrs::from([("scheme".to_string(), json!("viridis"))]));
        let scales = resolve_scales(&registry, &mut context, request(MarkKind::Scatter, &none, &values, &options)).unwrap();

        assert_eq!(scales["color"].borrow().kind(), ScaleKind::Color);
        assert_eq!(scales["color"].borrow().option("scheme"), Some(&json!("viridis")));
    }

    #[test]
    fn test_precedence_picks_highest() {
        let mut registry = ScaleRegistry::empty();
        registry.register(ScaleType::builtin(ScaleKind::Log).with_precedence(2));
        registry.register(ScaleType::builtin(ScaleKind::Linear).with_precedence(1));
        let mut context = ScaleMap::new();
        let values = data(vec![("y", ArrayData::floats(vec![1.0]))]);
        let none = BTreeMap::new();
        let options = BTreeMap::new();
        let scales = resolve_scales(&registry, &mut context, request(MarkKind::Lines, &none, &values, &options)).unwrap();

        assert_eq!(scales["y"].borrow().kind(), ScaleKind::Log);
    }

    #[test]
    fn test_no_compatible_scale() {
        let registry = ScaleRegistry::builtin();
        let mut context = ScaleMap::new();
        let values = data(vec![("color", ArrayData::bools(vec![true]))]);
        let none = BTreeMap::new();
        let options = BTreeMap::new();
        let err = resolve_scales(&registry, &mut context, request(MarkKind::Lines, &none, &values, &options)).unwrap_err();

        match err {
            PlotError::NoCompatibleScale { attribute, rtype, dtype } => {
                assert_eq!(attribute, "color");
                assert_eq!(rtype, "Color");
                assert_eq!(dtype, "bool");
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(context.is_empty());
    }
}
