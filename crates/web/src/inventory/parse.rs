//! Inventory XML parsing.
//!
//! The feed repeats `<vehicle>` elements, each with `year`, `make` and
//! `model` children. Field text is the full text content of the first
//! matching descendant, trimmed; a missing field is an empty string.

use quick_xml::Reader;
use quick_xml::events::Event;

use classic_matcher_core::InventoryItem;

use super::InventoryError;

const VEHICLE: &[u8] = b"vehicle";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Year,
    Make,
    Model,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"year" => Some(Self::Year),
            b"make" => Some(Self::Make),
            b"model" => Some(Self::Model),
            _ => None,
        }
    }
}

/// A `<vehicle>` element being read.
#[derive(Default)]
struct PartialVehicle {
    /// Element depth of the `<vehicle>` start tag.
    depth: usize,
    year: Option<String>,
    make: Option<String>,
    model: Option<String>,
    /// Field whose text is being collected, and the depth it was opened at.
    capturing: Option<(Field, usize, String)>,
}

impl PartialVehicle {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Year => &mut self.year,
            Field::Make => &mut self.make,
            Field::Model => &mut self.model,
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some((_, _, buf)) = self.capturing.as_mut() {
            buf.push_str(text);
        }
    }

    fn into_item(self) -> InventoryItem {
        InventoryItem::new(
            self.year.as_deref().unwrap_or_default(),
            self.make.as_deref().unwrap_or_default(),
            self.model.as_deref().unwrap_or_default(),
        )
    }
}

/// Parse the vendor inventory document into a flat list of vehicles.
///
/// # Errors
///
/// Returns [`InventoryError::Parse`] if the document is not well-formed.
pub fn parse_inventory(xml: &str) -> Result<Vec<InventoryItem>, InventoryError> {
    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut current: Option<PartialVehicle> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                let name = e.local_name();
                match current.as_mut() {
                    None if name.as_ref() == VEHICLE => {
                        current = Some(PartialVehicle {
                            depth,
                            ..PartialVehicle::default()
                        });
                    }
                    Some(vehicle) if vehicle.capturing.is_none() => {
                        if let Some(field) = Field::from_name(name.as_ref())
                            && vehicle.slot(field).is_none()
                        {
                            vehicle.capturing = Some((field, depth, String::new()));
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if let Some(vehicle) = current.as_mut()
                    && vehicle.capturing.is_none()
                    && let Some(field) = Field::from_name(e.local_name().as_ref())
                {
                    vehicle.slot(field).get_or_insert_with(String::new);
                }
            }
            Event::Text(e) => {
                if let Some(vehicle) = current.as_mut() {
                    vehicle.push_text(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(vehicle) = current.as_mut() {
                    vehicle.push_text(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                if let Some(vehicle) = current.as_mut() {
                    if let Some((field, at, _)) = vehicle.capturing
                        && at == depth
                        && let Some((_, _, text)) = vehicle.capturing.take()
                    {
                        *vehicle.slot(field) = Some(text);
                    }
                    if vehicle.depth == depth
                        && let Some(done) = current.take()
                    {
                        items.push(done.into_item());
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => {
                if depth != 0 {
                    return Err(InventoryError::Parse(
                        "unexpected end of document".to_string(),
                    ));
                }
                break;
            }
            _ => {}
        }
    }

    Ok(items)
}
