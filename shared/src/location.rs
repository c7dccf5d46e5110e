//! Bin location parsing and zone grouping rules
//!
//! Bin names are short codes of the form zone letter + slot number
//! (e.g. "E3"). Slots 1-4 of a zone form group 1, slots 5-8 group 2.
//! Each group of four bins shares a combined weight cap.

use serde::{Deserialize, Serialize};

/// Maximum weight a single bin may carry, in kg.
pub const BIN_WEIGHT_CAP: f64 = 500.0;

/// Maximum combined weight of a 4-bin group, in kg.
pub const GROUP_WEIGHT_CAP: f64 = 2000.0;

/// Zone letters of the floor, in display order.
pub const ZONES: [char; 5] = ['E', 'D', 'C', 'B', 'A'];

/// Number of slots per zone letter.
pub const SLOTS_PER_ZONE: u8 = 8;

/// A parsed bin location: zone letter plus numeric slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinLocation {
    pub zone: char,
    pub slot: u8,
}

impl BinLocation {
    pub fn new(zone: char, slot: u8) -> Self {
        Self { zone, slot }
    }

    /// Parse a bin name into a location.
    ///
    /// The zone is the first character, uppercased. A numeric part that
    /// fails to parse falls back to slot 1, matching how weight checks
    /// have always treated malformed names. Only an empty name is
    /// unparsable.
    pub fn parse(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        let mut chars = trimmed.chars();
        let zone = chars.next()?.to_ascii_uppercase();
        let slot = chars.as_str().parse::<u8>().unwrap_or(1);
        Some(Self { zone, slot })
    }

    /// Group index within the zone: slots 1-4 are group 1, 5 and above
    /// group 2.
    pub fn group(&self) -> u8 {
        if self.slot <= 4 {
            1
        } else {
            2
        }
    }

    /// Names of the four bins sharing this location's group.
    pub fn group_members(&self) -> [String; 4] {
        group_members(self.zone, self.group())
    }

    pub fn name(&self) -> String {
        format!("{}{}", self.zone, self.slot)
    }
}

/// Names of the four bins in `group` (1 or 2) of `zone`.
pub fn group_members(zone: char, group: u8) -> [String; 4] {
    let base = if group == 1 { 1u8 } else { 5u8 };
    [
        format!("{}{}", zone, base),
        format!("{}{}", zone, base + 1),
        format!("{}{}", zone, base + 2),
        format!("{}{}", zone, base + 3),
    ]
}

/// Human-readable slot span of a group, e.g. "E(1..4)".
pub fn group_label(zone: char, group: u8) -> String {
    if group == 1 {
        format!("{}(1..4)", zone)
    } else {
        format!("{}(5..8)", zone)
    }
}
