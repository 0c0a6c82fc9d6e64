//! Declared signatures of benchmark subjects
//!
//! Each subject is registered with an ordered parameter list. The list drives
//! two things: binding a call's arguments to parameter names (with defaults
//! applied and the call checked against the signature), and the CSV column
//! layout of the subject's output file. Parameters marked assistive, such as
//! a memo table, take part in binding but never become columns.

use crate::error::{HarnessError, Result};
use std::fmt;

/// Default value of a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    /// Caller must supply a value
    Required,
    Int(i64),
    Text(&'static str),
    /// Optional, no value unless supplied
    Absent,
}

/// One formal parameter of a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub default: ParamDefault,
    /// Excluded from the CSV schema
    pub assistive: bool,
}

impl Param {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            default: ParamDefault::Required,
            assistive: false,
        }
    }

    pub const fn optional(name: &'static str, default: ParamDefault) -> Self {
        Self {
            name,
            default,
            assistive: false,
        }
    }

    /// Optional parameter left out of the CSV schema
    pub const fn assistive(name: &'static str) -> Self {
        Self {
            name,
            default: ParamDefault::Absent,
            assistive: true,
        }
    }
}

/// Name and ordered parameter list of a benchmark subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectSchema {
    pub name: &'static str,
    pub params: &'static [Param],
}

impl SubjectSchema {
    pub const fn new(name: &'static str, params: &'static [Param]) -> Self {
        Self { name, params }
    }

    /// Parameter names that become CSV columns, in declaration order
    pub fn recorded_params(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.params
            .iter()
            .filter(|param| !param.assistive)
            .map(|param| param.name)
    }

    /// Full CSV header: `algorithm`, recorded params, `elapsed_ms`, `peak_kib`
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec!["algorithm"];
        columns.extend(self.recorded_params());
        columns.push("elapsed_ms");
        columns.push("peak_kib");
        columns
    }

    /// Bind a call to this signature
    ///
    /// Positional arguments fill parameters in order, keyword arguments fill
    /// them by name, and every parameter left unset takes its default.
    pub fn bind(&self, call: Call) -> Result<BoundArgs> {
        let mut slots: Vec<Option<ArgValue>> = vec![None; self.params.len()];

        if call.positional.len() > self.params.len() {
            return Err(HarnessError::InvalidArgument(format!(
                "{}() takes {} arguments but {} were given",
                self.name,
                self.params.len(),
                call.positional.len()
            )));
        }
        for (slot, value) in slots.iter_mut().zip(call.positional) {
            *slot = Some(value);
        }

        for (name, value) in call.keyword {
            let index = self
                .params
                .iter()
                .position(|param| param.name == name)
                .ok_or_else(|| {
                    HarnessError::InvalidArgument(format!(
                        "{}() got an unexpected keyword argument '{}'",
                        self.name, name
                    ))
                })?;
            if slots[index].is_some() {
                return Err(HarnessError::InvalidArgument(format!(
                    "{}() got multiple values for argument '{}'",
                    self.name, name
                )));
            }
            slots[index] = Some(value);
        }

        let values = self
            .params
            .iter()
            .zip(slots)
            .map(|(param, slot)| {
                let value = match (slot, param.default) {
                    (Some(value), _) => value,
                    (None, ParamDefault::Required) => {
                        return Err(HarnessError::InvalidArgument(format!(
                            "{}() missing required argument '{}'",
                            self.name, param.name
                        )))
                    }
                    (None, ParamDefault::Int(value)) => ArgValue::Int(value),
                    (None, ParamDefault::Text(value)) => ArgValue::Text(value.to_string()),
                    (None, ParamDefault::Absent) => ArgValue::Absent,
                };
                Ok((param.name, value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BoundArgs {
            schema: *self,
            values,
        })
    }
}

/// An argument value as it appears in a benchmark row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Int(i64),
    UInt(u64),
    Text(String),
    Absent,
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Int(value) => write!(f, "{}", value),
            ArgValue::UInt(value) => write!(f, "{}", value),
            ArgValue::Text(value) => f.write_str(value),
            ArgValue::Absent => Ok(()),
        }
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<u64> for ArgValue {
    fn from(value: u64) -> Self {
        ArgValue::UInt(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

/// Arguments of one call, before binding
#[derive(Debug, Clone, Default)]
pub struct Call {
    positional: Vec<ArgValue>,
    keyword: Vec<(String, ArgValue)>,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a keyword argument
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.keyword.push((name.into(), value.into()));
        self
    }
}

/// A call bound to a schema, one value per declared parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundArgs {
    schema: SubjectSchema,
    values: Vec<(&'static str, ArgValue)>,
}

impl BoundArgs {
    pub fn schema(&self) -> &SubjectSchema {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| value)
    }

    /// Value of a non-negative integer parameter
    pub fn uint(&self, name: &str) -> Result<u64> {
        match self.get(name) {
            Some(ArgValue::UInt(value)) => Ok(*value),
            Some(ArgValue::Int(value)) => u64::try_from(*value).map_err(|_| {
                HarnessError::InvalidArgument(format!(
                    "argument '{}' must be non-negative, got {}",
                    name, value
                ))
            }),
            other => Err(HarnessError::InvalidArgument(format!(
                "argument '{}' must be an integer, got {:?}",
                name, other
            ))),
        }
    }

    /// Value of a text parameter
    pub fn text(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(ArgValue::Text(value)) => Ok(value),
            other => Err(HarnessError::InvalidArgument(format!(
                "argument '{}' must be text, got {:?}",
                name, other
            ))),
        }
    }

    /// Rendered values of the recorded (non-assistive) parameters
    pub fn recorded_fields(&self) -> Vec<String> {
        self.schema
            .params
            .iter()
            .zip(&self.values)
            .filter(|(param, _)| !param.assistive)
            .map(|(_, (_, value))| value.to_string())
            .collect()
    }
}
