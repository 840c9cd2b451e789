//! Execution specifications for candidate and reference programs.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a program is launched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandLine {
    /// Executable followed by its arguments; no shell interpretation.
    Argv(Vec<String>),
    /// Single string run through the platform shell.
    Shell(String),
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandLine::Argv(args) => f.write_str(&args.join(" ")),
            CommandLine::Shell(cmd) => f.write_str(cmd),
        }
    }
}

/// A command plus an optional wall-clock bound.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionSpec {
    /// Program to run.
    pub command: CommandLine,

    /// `None` means unbounded.
    #[serde(default, with = "optional_secs")]
    pub timeout: Option<Duration>,
}

impl ExecutionSpec {
    /// Run an argument vector directly, without a shell.
    pub fn argv<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: CommandLine::Argv(args.into_iter().map(Into::into).collect()),
            timeout: None,
        }
    }

    /// Run a command line through the platform shell.
    pub fn shell(command: impl Into<String>) -> Self {
        Self {
            command: CommandLine::Shell(command.into()),
            timeout: None,
        }
    }

    /// Limit the run to `timeout`; must be positive.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Label used in reports: the command text.
    pub fn label(&self) -> String {
        self.command.to_string()
    }
}

impl From<&str> for ExecutionSpec {
    fn from(value: &str) -> Self {
        ExecutionSpec::shell(value)
    }
}

impl From<Vec<String>> for ExecutionSpec {
    fn from(value: Vec<String>) -> Self {
        ExecutionSpec::argv(value)
    }
}

impl<C: Into<ExecutionSpec>> From<(C, Duration)> for ExecutionSpec {
    fn from((command, timeout): (C, Duration)) -> Self {
        command.into().with_timeout(timeout)
    }
}

/// Timeouts are written as fractional seconds in config files.
mod optional_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs_f64()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let secs: Option<f64> = Option::deserialize(d)?;
        match secs {
            Some(s) => Duration::try_from_secs_f64(s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
