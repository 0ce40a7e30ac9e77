//! Command log
//!
//! The ordered record of every command accepted by a [`crate::Simulator`] session. The log is
//! what gets deployed to a real drone and what gets written to, and replayed from, a file.
//!
//! Two file formats are supported:
//! - JSON (canonical): a list of `{"command": "forward", "arguments": [130]}` objects
//! - CSV: a single `command` column holding the serialized command string, e.g. `forward 130`
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::command::{Argument, CommandRecord};
use crate::SimulationError;

/// On-disk format of a command log
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Csv,
}

impl LogFormat {
    /// Pick the format from the file extension, JSON unless the extension is `csv`
    /// # Example
    /// ```
    /// use tello_sim::LogFormat;
    /// assert_eq!(LogFormat::from_path("flight.csv"), LogFormat::Csv);
    /// assert_eq!(LogFormat::from_path("commands.json"), LogFormat::Json);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => LogFormat::Csv,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CsvRow {
    command: String,
}

/// Ordered sequence of issued commands
/// # Example
/// ```
/// use tello_sim::CommandLog;
/// let mut log = CommandLog::new();
/// log.record("command", vec![]);
/// log.record("cw", vec![90.into()]);
/// assert_eq!(log.serialized(), vec!["command", "cw 90"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandLog {
    entries: Vec<CommandRecord>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command to the log
    pub fn record(&mut self, command: &str, arguments: Vec<Argument>) {
        self.entries.push(CommandRecord::new(command, arguments));
    }

    pub fn entries(&self) -> &[CommandRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&CommandRecord> {
        self.entries.last()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The serialized command strings, in issuance order
    pub fn serialized(&self) -> Vec<String> {
        self.entries.iter().map(CommandRecord::serialize).collect()
    }

    /// Write the log in the given format
    /// # Errors
    /// * If the writer fails or the records cannot be encoded
    pub fn write_to<W: Write>(
        &self,
        mut writer: W,
        format: LogFormat,
    ) -> Result<(), SimulationError> {
        match format {
            LogFormat::Json => {
                serde_json::to_writer_pretty(&mut writer, &self.entries)?;
                writer.flush()?;
            }
            LogFormat::Csv => {
                let mut writer = csv::Writer::from_writer(writer);
                for record in &self.entries {
                    writer.serialize(CsvRow {
                        command: record.serialize(),
                    })?;
                }
                writer.flush()?;
            }
        }
        Ok(())
    }

    /// Read records in the given format
    /// # Errors
    /// * If the input cannot be decoded
    /// * `MalformedCommand` if a CSV row holds an empty command
    pub fn read_from<R: Read>(
        reader: R,
        format: LogFormat,
    ) -> Result<Vec<CommandRecord>, SimulationError> {
        match format {
            LogFormat::Json => Ok(serde_json::from_reader(reader)?),
            LogFormat::Csv => csv::Reader::from_reader(reader)
                .into_deserialize::<CsvRow>()
                .map(|row| CommandRecord::parse(&row?.command))
                .collect(),
        }
    }

    /// Save the log to a file, the format is picked from the extension
    /// # Arguments
    /// * `path` - Destination file
    /// # Errors
    /// * If the file cannot be created or written
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SimulationError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file), LogFormat::from_path(path))
    }

    /// Read the records stored in a file, the format is picked from the extension
    /// # Errors
    /// * If the file cannot be opened or decoded
    pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<CommandRecord>, SimulationError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file), LogFormat::from_path(path))
    }
}

impl<'a> IntoIterator for &'a CommandLog {
    type Item = &'a CommandRecord;
    type IntoIter = std::slice::Iter<'a, CommandRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
