//! Reader for MultiWii / iNav XML mission files.
//!
//! Only `MISSIONITEM` elements are interpreted; the surrounding `MISSION`
//! envelope, `VERSION` and `mwp` metadata elements are ignored.

use crate::models::{Action, Coordinate, MissionItem};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("failed to read mission file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed mission XML at byte {position}: {message}")]
    Xml { position: u64, message: String },
    #[error("mission item {index}: missing attribute '{name}'")]
    MissingAttribute { index: usize, name: &'static str },
    #[error("mission item {index}: invalid {name} '{value}'")]
    InvalidAttribute {
        index: usize,
        name: &'static str,
        value: String,
    },
}

/// Read and parse a mission file from disk.
pub fn read_mission(path: impl AsRef<Path>) -> Result<Vec<MissionItem>, MissionError> {
    let xml = std::fs::read_to_string(path)?;
    parse_mission(&xml)
}

/// Parse mission items, in file order, from an XML document.
pub fn parse_mission(xml: &str) -> Result<Vec<MissionItem>, MissionError> {
    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();

    loop {
        let event = reader.read_event().map_err(|err| MissionError::Xml {
            position: reader.error_position(),
            message: err.to_string(),
        })?;
        match event {
            Event::Start(element) | Event::Empty(element)
                if element.name().as_ref().eq_ignore_ascii_case(b"missionitem") =>
            {
                let position = reader.buffer_position();
                let item = parse_item(&element, items.len(), position)?;
                items.push(item);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    tracing::debug!("Parsed {} mission items", items.len());
    Ok(items)
}

#[derive(Default)]
struct RawAttributes {
    no: Option<String>,
    action: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
    alt: Option<String>,
    params: [String; 3],
}

fn parse_item(
    element: &BytesStart<'_>,
    index: usize,
    position: u64,
) -> Result<MissionItem, MissionError> {
    let mut raw = RawAttributes::default();
    for attr in element.attributes() {
        let attr = attr.map_err(|err| MissionError::Xml {
            position,
            message: err.to_string(),
        })?;
        let value = attr
            .unescape_value()
            .map_err(|err| MissionError::Xml {
                position,
                message: err.to_string(),
            })?
            .trim()
            .to_string();
        match attr.key.as_ref() {
            b"no" => raw.no = Some(value),
            b"action" => raw.action = Some(value),
            b"lat" => raw.lat = Some(value),
            b"lon" => raw.lon = Some(value),
            b"alt" => raw.alt = Some(value),
            b"parameter1" => raw.params[0] = value,
            b"parameter2" => raw.params[1] = value,
            b"parameter3" => raw.params[2] = value,
            _ => {}
        }
    }

    let action = raw.action.ok_or(MissionError::MissingAttribute {
        index,
        name: "action",
    })?;
    let lat = parse_degrees(raw.lat, index, "lat")?;
    let lon = parse_degrees(raw.lon, index, "lon")?;

    let no = parse_integral(raw.no, index, "no")?;
    let alt = parse_integral(raw.alt, index, "alt")?;

    Ok(MissionItem {
        no,
        action: Action::from(action.as_str()),
        position: Coordinate::new(lat, lon),
        alt,
        params: raw.params,
    })
}

/// Integer attribute, defaulting to 0 when absent.
///
/// Some planners write fractional values (`"1.0"`, `"35.7"`); these are truncated.
fn parse_integral<T>(
    value: Option<String>,
    index: usize,
    name: &'static str,
) -> Result<T, MissionError>
where
    T: std::str::FromStr + TryFrom<i64> + Default,
{
    let Some(value) = value else {
        return Ok(T::default());
    };
    if let Ok(parsed) = value.parse::<T>() {
        return Ok(parsed);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .and_then(|v| T::try_from(v.trunc() as i64).ok())
        .ok_or(MissionError::InvalidAttribute { index, name, value })
}

fn parse_degrees(
    value: Option<String>,
    index: usize,
    name: &'static str,
) -> Result<f64, MissionError> {
    let value = value.ok_or(MissionError::MissingAttribute { index, name })?;
    match value.parse::<f64>() {
        Ok(deg) if deg.is_finite() => Ok(deg),
        _ => Err(MissionError::InvalidAttribute { index, name, value }),
    }
}
