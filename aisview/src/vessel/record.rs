//! Vessel records
//!
//! A `VesselRecord` holds the latest known value of every recognized field
//! for a single vessel. Reports only ever carry part of that picture, so
//! they arrive as a `PartialRecord` which is merged on top of whatever is
//! already known: specified fields overwrite, unspecified fields carry over.

use std::collections::BTreeMap;
use std::fmt;

/// Maritime Mobile Service Identity, the key for all per-vessel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mmsi(pub u32);

impl From<u32> for Mmsi {
    fn from(id: u32) -> Mmsi {
        Mmsi(id)
    }
}

impl fmt::Display for Mmsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recognized report fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Mmsi,
    Imo,
    Lat,
    Lon,
    Course,
    Heading,
    Speed,
    Callsign,
    Type,
    Shipname,
    Name,
}

impl Field {
    pub const COUNT: usize = 11;

    pub const ALL: [Field; Field::COUNT] = [
        Field::Mmsi,
        Field::Imo,
        Field::Lat,
        Field::Lon,
        Field::Course,
        Field::Heading,
        Field::Speed,
        Field::Callsign,
        Field::Type,
        Field::Shipname,
        Field::Name,
    ];

    /// Name of the field as it appears in gpsd reports and in the header.
    pub fn name(self) -> &'static str {
        match self {
            Field::Mmsi => "mmsi",
            Field::Imo => "imo",
            Field::Lat => "lat",
            Field::Lon => "lon",
            Field::Course => "course",
            Field::Heading => "heading",
            Field::Speed => "speed",
            Field::Callsign => "callsign",
            Field::Type => "type",
            Field::Shipname => "shipname",
            Field::Name => "name",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar value of a field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    #[default]
    Absent,
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(x) => write!(f, "{}", x),
            // Whole numbers keep their decimal point, e.g. "7.0".
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Absent => f.write_str("None"),
        }
    }
}

/// The recognized subset of one incoming report. A field that is not
/// present here is left untouched by a merge; a field explicitly set to
/// `Value::Absent` clears the stored value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialRecord {
    values: BTreeMap<Field, Value>,
}

impl PartialRecord {
    pub fn new() -> PartialRecord {
        PartialRecord::default()
    }

    pub fn with(mut self, field: Field, value: Value) -> PartialRecord {
        self.values.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: Field, value: Value) -> Option<Value> {
        self.values.insert(field, value)
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.values.get(&field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Value)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }
}

impl FromIterator<(Field, Value)> for PartialRecord {
    fn from_iter<T: IntoIterator<Item = (Field, Value)>>(iter: T) -> PartialRecord {
        PartialRecord {
            values: iter.into_iter().collect(),
        }
    }
}

/// Accumulated state of one vessel: a value (possibly absent) for every
/// recognized field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VesselRecord {
    values: [Value; Field::COUNT],
}

impl VesselRecord {
    /// Returns a record with every field absent.
    pub fn new() -> VesselRecord {
        VesselRecord::default()
    }

    pub fn get(&self, field: Field) -> &Value {
        &self.values[field.index()]
    }

    /// Merges `incoming` into this record in place.
    pub fn merge(&mut self, incoming: &PartialRecord) {
        for (field, value) in incoming.iter() {
            self.values[field.index()] = value.clone();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Value)> {
        Field::ALL.iter().copied().zip(self.values.iter())
    }
}

/// Returns `existing` with `incoming` merged on top of it.
pub fn merge(existing: VesselRecord, incoming: &PartialRecord) -> VesselRecord {
    let mut record = existing;
    record.merge(incoming);
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> VesselRecord {
        merge(
            VesselRecord::new(),
            &PartialRecord::new()
                .with(Field::Mmsi, Value::Int(205024000))
                .with(Field::Lat, Value::Float(51.9))
                .with(Field::Callsign, Value::Text("ABCD".into())),
        )
    }

    #[test]
    fn new_record_is_all_absent() {
        let record = VesselRecord::new();
        assert!(record.iter().all(|(_, v)| v.is_absent()));
        assert_eq!(record.iter().count(), Field::COUNT);
    }

    #[test]
    fn empty_merge_is_noop() {
        let record = sample_record();
        assert_eq!(merge(record.clone(), &PartialRecord::new()), record);
        assert_eq!(merge(VesselRecord::new(), &PartialRecord::new()), VesselRecord::new());
    }

    #[test]
    fn merge_overwrites_specified_fields() {
        let prior = sample_record();
        for field in Field::ALL {
            let incoming = PartialRecord::new().with(field, Value::Text("new".into()));
            let merged = merge(prior.clone(), &incoming);
            assert_eq!(merged.get(field), &Value::Text("new".into()));
            for other in Field::ALL.iter().filter(|f| **f != field) {
                assert_eq!(merged.get(*other), prior.get(*other));
            }
        }
    }

    #[test]
    fn explicit_absent_clears_field() {
        let merged = merge(
            sample_record(),
            &PartialRecord::new().with(Field::Callsign, Value::Absent),
        );
        assert!(merged.get(Field::Callsign).is_absent());
        assert_eq!(merged.get(Field::Lat), &Value::Float(51.9));
    }

    #[test]
    fn merge_does_not_touch_incoming() {
        let incoming = PartialRecord::new().with(Field::Speed, Value::Float(12.5));
        let snapshot = incoming.clone();
        let mut record = VesselRecord::new();
        record.merge(&incoming);
        assert_eq!(incoming, snapshot);
    }

    #[test]
    fn field_names() {
        assert_eq!(Field::from_name("shipname"), Some(Field::Shipname));
        assert_eq!(Field::from_name("status"), None);
        let names: Vec<&str> = Field::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            [
                "mmsi", "imo", "lat", "lon", "course", "heading", "speed", "callsign", "type",
                "shipname", "name"
            ]
        );
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Absent.to_string(), "None");
        assert_eq!(Value::Float(51.9).to_string(), "51.9");
        assert_eq!(Value::Float(7.0).to_string(), "7.0");
        assert_eq!(Value::Float(-0.5).to_string(), "-0.5");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Text("ABCD".into()).to_string(), "ABCD");
    }
}
