//! Command records and argument validation
//!
//! A [`CommandRecord`] is one entry of the command log: the Tello SDK command name and its
//! arguments. Arguments are kept loosely typed as [`Argument`] so that values read back from a
//! file, or passed through the programmatic API, can be validated the same way.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SimulationError;

/// A primitive command argument
/// # Example
/// ```
/// use tello_sim::Argument;
/// assert_eq!(Argument::from(130), Argument::Int(130));
/// assert_eq!(Argument::from("f"), Argument::Text("f".to_string()));
/// assert_eq!(Argument::from(10.5).to_string(), "10.5");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    /// A whole number
    Int(i64),
    /// A number with a fractional part
    Float(f64),
    /// A string token
    Text(String),
    /// Any other value read from a command file, never accepted by an operation
    Other(serde_json::Value),
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Int(value) => write!(f, "{value}"),
            // Debug keeps the trailing `.0` so the value is not read back as an integer
            Argument::Float(value) => write!(f, "{value:?}"),
            Argument::Text(value) => f.write_str(value),
            Argument::Other(value) => write!(f, "{value}"),
        }
    }
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Argument::Int(value.into())
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Argument::Int(value)
    }
}

impl From<u32> for Argument {
    fn from(value: u32) -> Self {
        Argument::Int(value.into())
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Argument::Float(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Text(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Text(value)
    }
}

impl From<FlipDirection> for Argument {
    fn from(value: FlipDirection) -> Self {
        Argument::Text(value.as_str().to_string())
    }
}

/// Parse a single token of a serialized command
fn parse_token(token: &str) -> Argument {
    if let Ok(value) = token.parse::<i64>() {
        Argument::Int(value)
    } else if let Ok(value) = token.parse::<f64>() {
        Argument::Float(value)
    } else {
        Argument::Text(token.to_string())
    }
}

/// One issued command, as stored in the command log
/// # Example
/// ```
/// use tello_sim::CommandRecord;
/// let record = CommandRecord::new("forward", vec![130.into()]);
/// assert_eq!(record.serialize(), "forward 130");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// Command name as understood by the Tello SDK
    pub command: String,
    /// Ordered command arguments
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

impl CommandRecord {
    /// Create a new command record
    /// # Arguments
    /// * `command` - The command name
    /// * `arguments` - The command arguments
    pub fn new(command: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            command: command.into(),
            arguments,
        }
    }

    /// Serialize to the string sent to the drone: the name followed by space-joined arguments
    pub fn serialize(&self) -> String {
        std::iter::once(self.command.clone())
            .chain(self.arguments.iter().map(Argument::to_string))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse a serialized command string
    /// # Arguments
    /// * `line` - A command string such as `"cw 90"`
    /// # Errors
    /// * `MalformedCommand` if the line is empty
    /// # Example
    /// ```
    /// use tello_sim::{Argument, CommandRecord};
    /// let record = CommandRecord::parse("flip f").unwrap();
    /// assert_eq!(record, CommandRecord::new("flip", vec![Argument::from("f")]));
    /// ```
    pub fn parse(line: &str) -> Result<Self, SimulationError> {
        let mut tokens = line.split_whitespace();
        let command = tokens
            .next()
            .ok_or_else(|| SimulationError::MalformedCommand("empty command line".to_string()))?;
        Ok(Self::new(command, tokens.map(parse_token).collect()))
    }
}

impl fmt::Display for CommandRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// Direction of a flip maneuver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipDirection {
    Forward,
    Back,
    Right,
    Left,
}

impl FlipDirection {
    /// The single-letter token used by the Tello SDK
    pub fn as_str(&self) -> &'static str {
        match self {
            FlipDirection::Forward => "f",
            FlipDirection::Back => "b",
            FlipDirection::Right => "r",
            FlipDirection::Left => "l",
        }
    }
}

impl FromStr for FlipDirection {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f" => Ok(FlipDirection::Forward),
            "b" => Ok(FlipDirection::Back),
            "r" => Ok(FlipDirection::Right),
            "l" => Ok(FlipDirection::Left),
            other => Err(SimulationError::InvalidArgument(format!(
                "I can't tell which way to flip ({other:?}). Please use f, b, r, or l"
            ))),
        }
    }
}

/// Require a whole-number argument
/// # Arguments
/// * `parameter` - Name of the parameter, used in the error message
/// * `value` - The argument to check
/// # Returns
/// * The argument as an integer
/// # Errors
/// * `InvalidArgument` if the value is a float or a string
/// # Example
/// ```
/// use tello_sim::{command::require_integer, Argument};
/// assert_eq!(require_integer("dist", &Argument::Int(10)).unwrap(), 10);
/// assert!(require_integer("dist", &Argument::Float(10.5)).is_err());
/// ```
pub fn require_integer(parameter: &str, value: &Argument) -> Result<i64, SimulationError> {
    match value {
        Argument::Int(value) => Ok(*value),
        other => Err(SimulationError::InvalidArgument(format!(
            "`{parameter}` only accepts whole numbers without quotation marks, got {other}"
        ))),
    }
}

/// Require one of the flip direction tokens `f`, `b`, `r` or `l`
/// # Errors
/// * `InvalidArgument` for any other value
pub fn require_valid_flip_direction(value: &Argument) -> Result<FlipDirection, SimulationError> {
    match value {
        Argument::Text(token) => token.parse(),
        other => Err(SimulationError::InvalidArgument(format!(
            "I can't tell which way to flip ({other}). Please use f, b, r, or l"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_without_arguments() {
        assert_eq!(CommandRecord::new("takeoff", vec![]).serialize(), "takeoff");
    }

    #[test]
    fn parse_reads_typed_tokens() {
        let record = CommandRecord::parse("  up 20  ").unwrap();
        assert_eq!(record.command, "up");
        assert_eq!(record.arguments, vec![Argument::Int(20)]);
        let record = CommandRecord::parse("go 1.5 x").unwrap();
        assert_eq!(
            record.arguments,
            vec![Argument::Float(1.5), Argument::Text("x".to_string())]
        );
    }

    #[test]
    fn parse_rejects_blank_line() {
        assert!(matches!(
            CommandRecord::parse("   "),
            Err(SimulationError::MalformedCommand(_))
        ));
    }

    #[test]
    fn whole_float_is_not_an_integer() {
        let value = Argument::Float(10.0);
        assert_eq!(value.to_string(), "10.0");
        assert!(matches!(
            require_integer("dist", &value),
            Err(SimulationError::InvalidArgument(_))
        ));
        assert!(require_integer("dist", &Argument::from("10")).is_err());
    }

    #[test]
    fn flip_direction_tokens() {
        for token in ["f", "b", "r", "l"] {
            let direction = require_valid_flip_direction(&token.into()).unwrap();
            assert_eq!(direction.as_str(), token);
        }
        assert!(require_valid_flip_direction(&"x".into()).is_err());
        assert!(require_valid_flip_direction(&Argument::Int(1)).is_err());
    }

    #[test]
    fn json_arguments_are_untagged() {
        let record: CommandRecord =
            serde_json::from_str(r#"{"command": "flip", "arguments": ["f"]}"#).unwrap();
        assert_eq!(record.arguments, vec![Argument::from("f")]);
        let record: CommandRecord =
            serde_json::from_str(r#"{"command": "up", "arguments": [10.5]}"#).unwrap();
        assert_eq!(record.arguments, vec![Argument::Float(10.5)]);
        let record: CommandRecord = serde_json::from_str(r#"{"command": "land"}"#).unwrap();
        assert!(record.arguments.is_empty());
    }

    #[test]
    fn non_primitive_json_arguments_still_decode() {
        let record: CommandRecord =
            serde_json::from_str(r#"{"command": "up", "arguments": [true, null]}"#).unwrap();
        assert_eq!(
            record.arguments,
            vec![
                Argument::Other(serde_json::Value::Bool(true)),
                Argument::Other(serde_json::Value::Null)
            ]
        );
        assert_eq!(record.serialize(), "up true null");
        assert!(require_integer("dist", &record.arguments[0]).is_err());
    }
}
