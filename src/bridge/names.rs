//! Canonical channel table.
//!
//! Maps the well-known foreign channels to their persisted attributes:
//!
//! | channel      | foreign  | fallback      | persisted               | tuple |
//! |--------------|----------|---------------|-------------------------|-------|
//! | Position     | `P`      |               | `points`                | 3     |
//! | Normal       | `N`      |               | `normals`               | 3     |
//! | Velocity     | `v`      |               | `velocities`            | 3     |
//! | Width        | `widths` | `pscale` (x2) | `widths`                | 1     |
//! | DisplayColor | `Cd`     |               | `primvars:displayColor` | 3     |
//!
//! The foreign side stores a half-width (`pscale`), the stage a full width.

use std::borrow::Cow;

use crate::core::Ownership;
use crate::geom::{AttributeView, DataArray};
use crate::util::{DataType, Error, Result};

/// Well-known channels with explicit mappings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CanonicalChannel {
    Position,
    Normal,
    Velocity,
    Width,
    DisplayColor,
}

/// Value transform applied when reading a fallback alias.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Conversion {
    Identity,
    Scale(f32),
}

impl Conversion {
    /// Apply to `data`. Scaling only applies to single-component arrays;
    /// anything else passes through unchanged.
    pub fn apply<'a>(&self, data: &'a DataArray) -> Cow<'a, DataArray> {
        match *self {
            Self::Scale(f) if data.tuple_size() == 1 => match data.scaled(f) {
                Some(scaled) => Cow::Owned(scaled),
                None => Cow::Borrowed(data),
            },
            _ => Cow::Borrowed(data),
        }
    }
}

/// One row of the table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelMapping {
    pub channel: CanonicalChannel,
    pub foreign: &'static str,
    pub fallback: Option<(&'static str, Conversion)>,
    pub persisted: &'static str,
    pub ownership: Ownership,
    pub tuple_size: usize,
}

/// Persisted primvar name of the display colour, without the prefix.
pub const DISPLAY_COLOR_PRIMVAR: &str = "displayColor";
/// Foreign half-width alias.
pub const PSCALE_CHANNEL: &str = "pscale";

static NAME_MAP: [ChannelMapping; 5] = [
    ChannelMapping {
        channel: CanonicalChannel::Position,
        foreign: "P",
        fallback: None,
        persisted: "points",
        ownership: Ownership::PerPoint,
        tuple_size: 3,
    },
    ChannelMapping {
        channel: CanonicalChannel::Normal,
        foreign: "N",
        fallback: None,
        persisted: "normals",
        ownership: Ownership::PerPoint,
        tuple_size: 3,
    },
    ChannelMapping {
        channel: CanonicalChannel::Velocity,
        foreign: "v",
        fallback: None,
        persisted: "velocities",
        ownership: Ownership::PerPoint,
        tuple_size: 3,
    },
    ChannelMapping {
        channel: CanonicalChannel::Width,
        foreign: "widths",
        fallback: Some((PSCALE_CHANNEL, Conversion::Scale(2.0))),
        persisted: "widths",
        ownership: Ownership::PerPoint,
        tuple_size: 1,
    },
    ChannelMapping {
        channel: CanonicalChannel::DisplayColor,
        foreign: "Cd",
        fallback: None,
        persisted: "primvars:displayColor",
        ownership: Ownership::PerPoint,
        tuple_size: 3,
    },
];

impl CanonicalChannel {
    pub const ALL: [Self; 5] = [
        Self::Position,
        Self::Normal,
        Self::Velocity,
        Self::Width,
        Self::DisplayColor,
    ];

    /// Channels authored by the write pass before primvar harvesting.
    pub const WRITE_ORDER: [Self; 4] = [Self::Position, Self::Normal, Self::Velocity, Self::Width];

    #[inline]
    pub fn mapping(self) -> &'static ChannelMapping {
        &NAME_MAP[self as usize]
    }

    #[inline]
    pub fn foreign_name(self) -> &'static str {
        self.mapping().foreign
    }

    #[inline]
    pub fn persisted_name(self) -> &'static str {
        self.mapping().persisted
    }

    /// Persisted data type.
    pub fn data_type(self) -> DataType {
        DataType::new(crate::util::ElementType::Float32, self.mapping().tuple_size)
    }
}

/// Find a canonical channel on the foreign side.
///
/// Looks up the foreign name, then the fallback alias with its conversion.
/// Returns the ownership the data was found under.
pub fn lookup_foreign(
    view: &dyn AttributeView,
    channel: CanonicalChannel,
) -> Option<(Ownership, Cow<'_, DataArray>)> {
    let mapping = channel.mapping();
    if let Some((own, data)) = view.find_attribute(mapping.foreign) {
        return Some((own, Cow::Borrowed(data)));
    }
    let (alias, conversion) = mapping.fallback?;
    let (own, data) = view.find_attribute(alias)?;
    Some((own, conversion.apply(data)))
}

/// Convert foreign data to the persisted representation of `channel`.
///
/// Numeric data of the right tuple size becomes `Float32`. Anything else is
/// a [`Error::ValueType`].
pub fn persistable(channel: CanonicalChannel, data: &DataArray) -> Result<DataArray> {
    let expected = channel.data_type();
    let fits = data.element_type().is_numeric() && data.tuple_size() == expected.tuple_size;
    match data.to_float32() {
        Some(converted) if fits => Ok(converted),
        _ => Err(Error::value_type(channel.persisted_name(), expected, data.data_type())),
    }
}

/// Foreign channels produced from a persisted channel.
///
/// Widths yield both the raw `widths` and the half-width `pscale`.
pub fn to_foreign(channel: CanonicalChannel, data: DataArray) -> Vec<(&'static str, DataArray)> {
    match channel {
        CanonicalChannel::Width => {
            let mut out = Vec::with_capacity(2);
            if let Some(half) = data.scaled(0.5) {
                out.push((PSCALE_CHANNEL, half));
            }
            out.push((channel.foreign_name(), data));
            out
        }
        _ => vec![(channel.foreign_name(), data)],
    }
}

/// Foreign name for a harvested primvar.
pub fn foreign_primvar_name(primvar: &str) -> &str {
    if primvar == DISPLAY_COLOR_PRIMVAR {
        CanonicalChannel::DisplayColor.foreign_name()
    } else {
        primvar
    }
}

/// True for names the table maps explicitly, including fallback aliases.
pub fn is_reserved_foreign_name(name: &str) -> bool {
    NAME_MAP
        .iter()
        .any(|m| m.foreign == name || m.fallback.is_some_and(|(alias, _)| alias == name))
}
