// Error taxonomy for the plot context

use thiserror::Error;

/// Errors raised by the model layer and the plot context.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("no compatible scale for attribute '{attribute}' (rtype {rtype}, dtype {dtype})")]
    NoCompatibleScale {
        attribute: String,
        rtype: String,
        dtype: String,
    },

    #[error("explicit scale for '{attribute}' has range type {found}, expected {expected}")]
    ScaleRangeMismatch {
        attribute: String,
        expected: String,
        found: String,
    },

    #[error("invalid shape for '{attribute}': {reason}")]
    InvalidShape { attribute: String, reason: String },

    #[error("ragged data for '{attribute}': row {row} has {found} elements, expected {expected}")]
    RaggedArray {
        attribute: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{mark} has no data attribute '{attribute}'")]
    UnknownAttribute { mark: String, attribute: String },

    #[error("{model} has no property '{property}'")]
    UnknownProperty { model: String, property: String },

    #[error("invalid value for {model}.{property}: {reason}")]
    InvalidProperty {
        model: String,
        property: String,
        reason: String,
    },

    #[error("unsupported dtype '{dtype}'")]
    UnsupportedDType { dtype: String },

    #[error("malformed wire array: {0}")]
    MalformedWire(String),

    #[error("no figure registered under key '{0}'")]
    FigureNotFound(String),

    #[error("no scale is bound to dimension '{0}'")]
    UnboundDimension(String),

    #[error("{call}() requires argument '{argument}'")]
    MissingArgument { call: String, argument: String },
}

impl PlotError {
    pub(crate) fn invalid_property(
        model: &str,
        property: &str,
        reason: impl Into<String>,
    ) -> Self {
        PlotError::InvalidProperty {
            model: model.to_string(),
            property: property.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_property(model: &str, property: &str) -> Self {
        PlotError::UnknownProperty {
            model: model.to_string(),
            property: property.to_string(),
        }
    }

    /// Name `attribute` in shape errors raised before the data was bound to one.
    pub fn for_attribute(self, attribute: &str) -> Self {
        match self {
            PlotError::InvalidShape { reason, .. } => PlotError::InvalidShape {
                attribute: attribute.to_string(),
                reason,
            },
            PlotError::RaggedArray {
                row,
                expected,
                found,
                ..
            } => PlotError::RaggedArray {
                attribute: attribute.to_string(),
                row,
                expected,
                found,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;
