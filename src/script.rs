// Runs parsed pipeline scripts against a plot context

use anyhow::{anyhow, bail, Context as _, Result};
use log::debug;
use serde_json::{json, Value};

use crate::array::ArrayData;
use crate::context::{Context, FigureOptions};
use crate::csv_reader::{self, CsvData};
use crate::error::PlotError;
use crate::interaction::InteractionKind;
use crate::parser::{ArgValue, Call, Script};
use crate::pyplot::{ColorMap, MarkArgs};

/// Named arguments every drawing call understands besides mark data and properties.
const DRAW_OPTIONS: &[&str] = &["axes", "update_context", "cmap"];

pub struct Executor<'a> {
    ctx: &'a mut Context,
    data: &'a CsvData,
}

impl<'a> Executor<'a> {
    pub fn new(ctx: &'a mut Context, data: &'a CsvData) -> Self {
        Executor { ctx, data }
    }

    /// Apply every call in order, stopping at the first failure.
    pub fn run(&mut self, script: &Script) -> Result<()> {
        for (i, call) in script.calls.iter().enumerate() {
            debug!("call {}: {}()", i + 1, call.name);
            self.apply(call)
                .with_context(|| format!("{}() failed (call {})", call.name, i + 1))?;
        }
        Ok(())
    }

    fn apply(&mut self, call: &Call) -> Result<()> {
        match call.name.as_str() {
            "figure" => self.figure(call)?,
            "close" => {
                let key = self.text(call, "key", 0)?;
                self.ctx.close(&key)?;
            }
            "clear" => self.ctx.clear(),
            "plot" => self.plot(call)?,
            "scatter" | "bar" => {
                let x = self.array(call, "x", 0)?;
                let y = self.array(call, "y", 1)?;
                let args = self.mark_args(call, &["x", "y"])?;
                if call.name == "scatter" {
                    self.ctx.scatter(x, y, args)?;
                } else {
                    self.ctx.bar(x, y, args)?;
                }
            }
            "hist" => {
                let sample = self.array(call, "sample", 0)?;
                let args = self.mark_args(call, &["sample"])?;
                self.ctx.hist(sample, args)?;
            }
            "pie" => {
                let sizes = self.array(call, "sizes", 0)?;
                let args = self.mark_args(call, &["sizes"])?;
                self.ctx.pie(sizes, args)?;
            }
            "ohlc" => self.ohlc(call)?,
            "label" => {
                let text = self.strings(call, "text", 0)?;
                let args = self.mark_args(call, &["text"])?;
                self.ctx.label(text, args)?;
            }
            "geo" => {
                let map_data = call.arg("map_data", 0).map(literal).transpose()?;
                let args = self.mark_args(call, &["map_data"])?;
                self.ctx.geo(map_data, args)?;
            }
            "xlabel" | "ylabel" => {
                let label = self.text(call, "label", 0)?;
                if call.name == "xlabel" {
                    self.ctx.xlabel(&label, None)?;
                } else {
                    self.ctx.ylabel(&label, None)?;
                }
            }
            "title" => {
                let title = self.text(call, "title", 0)?;
                self.ctx.title(&title)?;
            }
            "legend" => self.ctx.legend()?,
            "grids" => {
                let value = match call.arg("value", 0) {
                    Some(_) => self.text(call, "value", 0)?,
                    None => "solid".to_string(),
                };
                self.ctx.grids(&value)?;
            }
            "xlim" | "ylim" => {
                let min = number(call, "min", 0)?;
                let max = number(call, "max", 1)?;
                let dimension = if call.name == "xlim" { "x" } else { "y" };
                self.ctx.set_lim(dimension, min, max)?;
            }
            "interaction" => {
                let kind = self.text(call, "kind", 0)?;
                let kind = InteractionKind::parse(&kind)
                    .ok_or_else(|| anyhow!("unknown interaction '{}'", kind))?;
                self.ctx.set_interaction(kind, None);
            }
            other => bail!("unknown call '{}'", other),
        }
        Ok(())
    }

    fn figure(&mut self, call: &Call) -> Result<()> {
        let mut options = FigureOptions::new();
        if call.arg("key", 0).is_some() {
            options = options.key(self.text(call, "key", 0)?);
        }
        for (name, value) in call.remaining(&["key"]) {
            options = options.attr(name, literal(value)?);
        }
        self.ctx.figure(options)?;
        Ok(())
    }

    // plot(y) | plot(x, y) | plot(y, "fmt") | plot(x, y, "fmt"), or by name.
    fn plot(&mut self, call: &Call) -> Result<()> {
        let mut positional: Vec<&ArgValue> = call.positional().collect();
        let mut format = match call.named("style") {
            Some(ArgValue::Str(style)) => Some(style.clone()),
            Some(other) => bail!("style must be a string, got {:?}", other),
            None => None,
        };
        if let Some(ArgValue::Str(style)) = positional.last() {
            format = Some(style.clone());
            positional.pop();
        }

        let mut x = call.named("x").or_else(|| call.named("index_data"));
        let y = match call.named("y") {
            Some(y) => y,
            None => match positional.as_slice() {
                [only] => *only,
                [first, second, ..] => {
                    x = x.or(Some(*first));
                    *second
                }
                [] => {
                    return Err(PlotError::MissingArgument {
                        call: "plot".to_string(),
                        argument: "y".to_string(),
                    }
                    .into())
                }
            },
        };

        let x = x.map(|value| self.to_array(value)).transpose()?;
        let y = self.to_array(y)?;
        let args = self.mark_args(call, &["x", "y", "index_data", "style"])?;
        self.ctx.plot(x, y, format.as_deref(), args)?;
        Ok(())
    }

    // ohlc(x, open: o, high: h, low: l, close: c); x defaults to the row index.
    fn ohlc(&mut self, call: &Call) -> Result<()> {
        let x = call.arg("x", 0).map(|value| self.to_array(value)).transpose()?;
        let mut columns = Vec::with_capacity(4);
        for (position, name) in ["open", "high", "low", "close"].into_iter().enumerate() {
            let column = self.array(call, name, position + 1)?;
            let values = column
                .to_f64()
                .ok_or_else(|| anyhow!("ohlc {} must be numeric", name))?;
            columns.push(values);
        }
        let expected = columns[0].len();
        for (name, column) in ["high", "low", "close"].into_iter().zip(&columns[1..]) {
            if column.len() != expected {
                return Err(PlotError::InvalidShape {
                    attribute: name.to_string(),
                    reason: format!("{} values, expected {} like 'open'", column.len(), expected),
                }
                .into());
            }
        }
        let rows: Vec<Vec<f64>> = (0..expected)
            .map(|i| columns.iter().map(|c| c[i]).collect())
            .collect();
        let y = ArrayData::from_rows(rows).map_err(|e| e.for_attribute("y"))?;
        let args = self.mark_args(call, &["x", "open", "high", "low", "close"])?;
        self.ctx.ohlc(x, y, args)?;
        Ok(())
    }

    /// Remaining named arguments: columns become mark data, literals become
    /// mark properties.
    fn mark_args(&self, call: &Call, consumed: &[&str]) -> Result<MarkArgs> {
        let mut args = MarkArgs::new();
        if let Some(value) = call.named("axes") {
            args = args.axes(flag(value)?);
        }
        if let Some(value) = call.named("update_context") {
            args = args.update_context(flag(value)?);
        }
        match call.named("cmap") {
            Some(ArgValue::Str(scheme)) => args = args.cmap(ColorMap::Scheme(scheme.clone())),
            Some(ArgValue::List(items)) => {
                let colors = items
                    .iter()
                    .map(|item| match item {
                        ArgValue::Str(color) => Ok(color.clone()),
                        other => Err(anyhow!("cmap colors must be strings, got {:?}", other)),
                    })
                    .collect::<Result<Vec<String>>>()?;
                args = args.cmap(ColorMap::Colors(colors));
            }
            Some(other) => bail!("cmap must be a scheme name or a list of colors, got {:?}", other),
            None => {}
        }

        let skip: Vec<&str> = consumed.iter().chain(DRAW_OPTIONS).copied().collect();
        for (name, value) in call.remaining(&skip) {
            args = match value {
                ArgValue::Column(_) => args.data(name, self.to_array(value)?),
                _ => args.property(name, literal(value)?),
            };
        }
        Ok(args)
    }

    fn array(&self, call: &Call, name: &str, position: usize) -> Result<ArrayData> {
        let value = call.arg(name, position).ok_or_else(|| missing(call, name))?;
        self.to_array(value)
    }

    // Like `array`, but columns are always read as text.
    fn strings(&self, call: &Call, name: &str, position: usize) -> Result<ArrayData> {
        match call.arg(name, position).ok_or_else(|| missing(call, name))? {
            ArgValue::Column(column) => {
                let selector = csv_reader::parse_column_selector(column);
                let (_, cells) = csv_reader::extract_column_as_string(self.data, selector)?;
                Ok(ArrayData::strings(cells))
            }
            ArgValue::Str(text) => Ok(ArrayData::strings([text.as_str()])),
            other => self.to_array(other),
        }
    }

    fn to_array(&self, value: &ArgValue) -> Result<ArrayData> {
        match value {
            ArgValue::Column(column) => {
                let selector = csv_reader::parse_column_selector(column);
                let (_, array) = csv_reader::column_array(self.data, selector)?;
                Ok(array)
            }
            ArgValue::Number(n) => Ok(ArrayData::floats(vec![*n])),
            ArgValue::List(items) => {
                if let Some(numbers) = items
                    .iter()
                    .map(|item| match item {
                        ArgValue::Number(n) => Some(*n),
                        _ => None,
                    })
                    .collect::<Option<Vec<f64>>>()
                {
                    return Ok(ArrayData::floats(numbers));
                }
                let strings = items
                    .iter()
                    .map(|item| match item {
                        ArgValue::Str(s) => Ok(s.clone()),
                        other => Err(anyhow!("lists must hold only numbers or only strings, got {:?}", other)),
                    })
                    .collect::<Result<Vec<String>>>()?;
                Ok(ArrayData::strings(strings))
            }
            ArgValue::Str(s) => Err(anyhow!("expected data, got string \"{}\"", s)),
            ArgValue::Bool(b) => Ok(ArrayData::bools(vec![*b])),
        }
    }

    fn text(&self, call: &Call, name: &str, position: usize) -> Result<String> {
        match call.arg(name, position).ok_or_else(|| missing(call, name))? {
            ArgValue::Str(s) | ArgValue::Column(s) => Ok(s.clone()),
            ArgValue::Number(n) => Ok(n.to_string()),
            other => Err(anyhow!("{} must be a string, got {:?}", name, other)),
        }
    }
}

fn missing(call: &Call, name: &str) -> anyhow::Error {
    PlotError::MissingArgument {
        call: call.name.clone(),
        argument: name.to_string(),
    }
    .into()
}

fn number(call: &Call, name: &str, position: usize) -> Result<f64> {
    match call.arg(name, position).ok_or_else(|| missing(call, name))? {
        ArgValue::Number(n) => Ok(*n),
        other => Err(anyhow!("{} must be a number, got {:?}", name, other)),
    }
}

fn flag(value: &ArgValue) -> Result<bool> {
    match value {
        ArgValue::Bool(b) => Ok(*b),
        other => Err(anyhow!("expected true or false, got {:?}", other)),
    }
}

/// Property value for a literal. Bare identifiers are taken as strings.
fn literal(value: &ArgValue) -> Result<Value> {
    Ok(match value {
        ArgValue::Str(s) | ArgValue::Column(s) => json!(s),
        ArgValue::Number(n) => number_json(*n),
        ArgValue::Bool(b) => json!(b),
        ArgValue::List(items) => Value::Array(items.iter().map(literal).collect::<Result<_>>()?),
    })
}

// Whole numbers travel as integers so integer-typed properties accept them.
fn number_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        if n >= 0.0 {
            json!(n as u64)
        } else {
            json!(n as i64)
        }
    } else {
        json!(n)
    }
}
