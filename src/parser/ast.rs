// Abstract Syntax Tree for the plotting pipeline DSL

/// A complete script: calls applied left to right
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub calls: Vec<Call>,
}

/// One call, e.g. `plot(x: date, y: temp, style: "r-o")`
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Arg>,
}

/// Positional (`name` is None) or named argument
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: Option<String>,
    pub value: ArgValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Bare identifier: a CSV column
    Column(String),
    Str(String),
    Number(f64),
    Bool(bool),
    List(Vec<ArgValue>),
}

impl Call {
    pub fn positional(&self) -> impl Iterator<Item = &ArgValue> {
        self.args
            .iter()
            .filter(|arg| arg.name.is_none())
            .map(|arg| &arg.value)
    }

    pub fn named(&self, name: &str) -> Option<&ArgValue> {
        self.args
            .iter()
            .find(|arg| arg.name.as_deref() == Some(name))
            .map(|arg| &arg.value)
    }

    /// Named argument, or the positional one at `position` when not named.
    pub fn arg(&self, name: &str, position: usize) -> Option<&ArgValue> {
        self.named(name).or_else(|| self.positional().nth(position))
    }

    /// Named arguments not in `consumed`, in script order.
    pub fn remaining<'a>(&'a self, consumed: &'a [&str]) -> impl Iterator<Item = (&'a str, &'a ArgValue)> {
        self.args.iter().filter_map(move |arg| match &arg.name {
            Some(name) if !consumed.contains(&name.as_str()) => Some((name.as_str(), &arg.value)),
            _ => None,
        })
    }
}
