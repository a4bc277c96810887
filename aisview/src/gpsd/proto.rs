//! gpsd JSON protocol
//!
//! gpsd talks newline-delimited JSON: every line sent by the daemon is
//! one JSON object whose `class` member says what kind of report it is.
//! Clients steer the daemon with `?COMMAND=<json>` lines; the only one
//! needed here is `?WATCH`, which starts the report stream.

use crate::vessel::{Field, Mmsi, PartialRecord, Value, VesselReport};
use serde::Serialize;
use serde_json::{Map, Value as Json};
use std::fmt;

/// Longest line accepted from the daemon, terminator included.
pub const MAX_LINE_SIZE: usize = 8192;

#[derive(Debug)]
pub enum Error {
    /// A complete line is not available yet.
    NeedMore,
    /// No line terminator within `MAX_LINE_SIZE` bytes.
    LineTooLong(usize),
    /// The line is not valid JSON, or a command failed to serialize.
    Json(serde_json::Error),
    /// Valid JSON, but not an object. Carries the offending line.
    NotAnObject(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NeedMore => write!(f, "incomplete line"),
            Error::LineTooLong(size) => write!(f, "line exceeds {} bytes", size),
            Error::Json(e) => write!(f, "invalid json: {}", e),
            Error::NotAnObject(line) => write!(f, "not a json object: {}", line),
        }
    }
}

impl std::error::Error for Error {}

/// Returns the first line in `raw` without its terminator, and the number
/// of bytes it spans including the terminator.
pub fn next_line(raw: &[u8]) -> Result<(&[u8], usize), Error> {
    match raw.iter().position(|b| *b == b'\n') {
        Some(end) => Ok((&raw[..end], end + 1)),
        None if raw.len() >= MAX_LINE_SIZE => Err(Error::LineTooLong(MAX_LINE_SIZE)),
        None => Err(Error::NeedMore),
    }
}

/// A decoded report from the daemon.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    fields: Map<String, Json>,
}

impl From<Map<String, Json>> for Message {
    fn from(fields: Map<String, Json>) -> Message {
        Message { fields }
    }
}

impl Message {
    /// Parses one line. Blank lines decode to `None`.
    pub fn parse(line: &[u8]) -> Result<Option<Message>, Error> {
        if line.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(None);
        }
        match serde_json::from_slice::<Json>(line).map_err(Error::Json)? {
            Json::Object(fields) => Ok(Some(Message { fields })),
            _ => Err(Error::NotAnObject(
                String::from_utf8_lossy(line).trim_end().to_string(),
            )),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Json> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Json)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The report class, e.g. `AIS`, `VERSION` or `DEVICES`.
    pub fn class(&self) -> Option<&str> {
        self.fields.get("class").and_then(Json::as_str)
    }

    /// The vessel identifier, if this is a vessel report. Numeric strings
    /// are accepted; anything that doesn't fit an MMSI is not a report.
    pub fn mmsi(&self) -> Option<Mmsi> {
        match self.fields.get(Field::Mmsi.name())? {
            Json::Number(n) => n.as_u64().and_then(|x| u32::try_from(x).ok()).map(Mmsi),
            Json::String(s) => s.trim().parse().ok().map(Mmsi),
            _ => None,
        }
    }

    /// The recognized fields of this message. Everything else is dropped.
    pub fn partial_record(&self) -> PartialRecord {
        Field::ALL
            .iter()
            .filter_map(|field| {
                let value = scalar(self.fields.get(field.name())?)?;
                Some((*field, value))
            })
            .collect()
    }
}

impl VesselReport for Message {
    fn vessel_id(&self) -> Option<Mmsi> {
        self.mmsi()
    }

    fn partial_record(&self) -> PartialRecord {
        Message::partial_record(self)
    }
}

/// Converts a JSON scalar. `null` explicitly clears a field; arrays and
/// objects are not scalars and leave the field unspecified.
fn scalar(json: &Json) -> Option<Value> {
    match json {
        Json::Null => Some(Value::Absent),
        Json::Bool(b) => Some(Value::Int(i64::from(*b))),
        Json::Number(n) => Some(match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64()?),
        }),
        Json::String(s) => Some(Value::Text(s.clone())),
        Json::Array(_) | Json::Object(_) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Watch {
    pub enable: bool,
    pub json: bool,
    /// Ask the daemon for human-scaled values instead of raw units.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub scaled: bool,
}

/// Commands sent to the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Watch(Watch),
}

impl Command {
    /// Enables the JSON report stream.
    pub fn watch(scaled: bool) -> Command {
        Command::Watch(Watch {
            enable: true,
            json: true,
            scaled,
        })
    }

    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        let (verb, arg) = match self {
            Command::Watch(w) => ("WATCH", serde_json::to_string(w).map_err(Error::Json)?),
        };
        Ok(format!("?{}={}\n", verb, arg).into_bytes())
    }
}
