// Library exports for plotctx

pub mod array;
pub mod axis;
pub mod axis_registry;
pub mod config;
pub mod context;
pub mod csv_reader;
pub mod dtype;
pub mod error;
pub mod figure;
pub mod interaction;
pub mod mark;
pub mod model;
pub mod palette;
pub mod parser;
pub mod pyplot;
pub mod resolve;
pub mod scale;
pub mod script;
pub mod sync;

pub use array::ArrayData;
pub use config::PlotConfig;
pub use context::{with_default_context, Context, FigureOptions, ScaleSpec};
pub use error::{PlotError, Result};
pub use pyplot::{ColorMap, MarkArgs};
