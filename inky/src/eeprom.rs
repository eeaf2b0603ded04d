//! Identification EEPROM carried on Inky boards.
//!
//! The EEPROM sits at I2C address 0x50 and holds a 29-byte record:
//!
//! | offset | size | field                               |
//! |--------|------|-------------------------------------|
//! | 0      | 2    | width, little-endian                |
//! | 2      | 2    | height, little-endian               |
//! | 4      | 1    | colour                              |
//! | 5      | 1    | PCB variant (major * 10 + minor)    |
//! | 6      | 1    | display variant                     |
//! | 7      | 22   | write date, length-prefixed string  |

use core::fmt::Debug;
use embedded_hal::i2c::{I2c, SevenBitAddress};
use std::fmt::Display;

/// I2c bus address of the EEPROM.
const ADDRESS: u8 = 0x50;

/// Size of the identification record.
const RECORD_SIZE: usize = 29;

/// Display variant names, indexed by the variant byte.
const DISPLAY_VARIANTS: [Option<&str>; 13] = [
    None,
    Some("Red pHAT (High-Temp)"),
    Some("Yellow wHAT"),
    Some("Black wHAT"),
    Some("Black pHAT"),
    Some("Yellow pHAT"),
    Some("Red wHAT"),
    Some("Red wHAT (High-Temp)"),
    Some("Red wHAT"),
    None,
    Some("Black pHAT (SSD1608)"),
    Some("Red pHAT (SSD1608)"),
    Some("Yellow pHAT (SSD1608)"),
];

/// An error reading the identification EEPROM.
pub enum Error<I2cError> {
    I2c(I2cError),
    Blank(),
}

impl<I2cError> Debug for Error<I2cError>
where
    I2cError: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "Error::I2c({:?})", e),
            Error::Blank() => write!(f, "Error::Blank"),
        }
    }
}

impl<I2cError> Display for Error<I2cError>
where
    I2cError: Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "in EEPROM read from I2c: {}", e),
            Error::Blank() => write!(f, "EEPROM is blank; no Inky board detected"),
        }
    }
}

impl<I2cError> core::error::Error for Error<I2cError>
where
    I2cError: core::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::I2c(e) => Some(e),
            _ => None,
        }
    }
}

/// Ink colour of a panel, beyond black and white.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InkColor {
    Black,
    Red,
    Yellow,
    Unknown(u8),
}

impl From<u8> for InkColor {
    fn from(v: u8) -> Self {
        match v {
            1 => InkColor::Black,
            2 => InkColor::Red,
            3 => InkColor::Yellow,
            v => InkColor::Unknown(v),
        }
    }
}

/// The decoded identification record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub width: u16,
    pub height: u16,
    pub color: InkColor,
    pub pcb_variant: u8,
    pub display_variant: u8,
    pub write_date: String,
}

impl Identity {
    /// Decode a raw record. Returns None for an unprogrammed (all 0xFF) EEPROM.
    pub fn decode(raw: &[u8; RECORD_SIZE]) -> Option<Self> {
        if raw.iter().all(|b| *b == 0xFF) {
            return None;
        }
        let date_len = (raw[7] as usize).min(RECORD_SIZE - 8);
        let write_date = String::from_utf8_lossy(&raw[8..8 + date_len]).into_owned();
        Some(Identity {
            width: u16::from_le_bytes([raw[0], raw[1]]),
            height: u16::from_le_bytes([raw[2], raw[3]]),
            color: raw[4].into(),
            pcb_variant: raw[5],
            display_variant: raw[6],
            write_date,
        })
    }

    /// Human-readable name of the display variant, if known.
    pub fn display_name(&self) -> Option<&'static str> {
        DISPLAY_VARIANTS
            .get(self.display_variant as usize)
            .copied()
            .flatten()
    }

    /// Resolution as (width, height).
    pub fn resolution(&self) -> (u16, u16) {
        (self.width, self.height)
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}x{} ({:?}), PCB v{}.{}, written {}",
            self.display_name().unwrap_or("unknown display"),
            self.width,
            self.height,
            self.color,
            self.pcb_variant / 10,
            self.pcb_variant % 10,
            self.write_date
        )
    }
}

/// Read the identification record from the board's EEPROM.
pub fn read<I>(bus: &mut I) -> Result<Identity, Error<I::Error>>
where
    I: I2c<SevenBitAddress>,
{
    let mut raw = [0u8; RECORD_SIZE];
    // Two-byte word address, then read sequentially.
    bus.write_read(ADDRESS, &[0x00, 0x00], &mut raw)
        .map_err(Error::I2c)?;
    Identity::decode(&raw).ok_or(Error::Blank())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(width: u16, height: u16, color: u8, display: u8, date: &str) -> [u8; RECORD_SIZE] {
        let mut raw = [0u8; RECORD_SIZE];
        raw[0..2].copy_from_slice(&width.to_le_bytes());
        raw[2..4].copy_from_slice(&height.to_le_bytes());
        raw[4] = color;
        raw[5] = 12;
        raw[6] = display;
        raw[7] = date.len() as u8;
        raw[8..8 + date.len()].copy_from_slice(date.as_bytes());
        raw
    }

    #[test]
    fn decode_red_phat() {
        let raw = record(250, 122, 2, 11, "2021-03-04 10:11:12.1");
        let id = Identity::decode(&raw).expect("record should decode");
        assert_eq!(id.resolution(), (250, 122));
        assert_eq!(id.color, InkColor::Red);
        assert_eq!(id.display_name(), Some("Red pHAT (SSD1608)"));
        assert_eq!(id.write_date, "2021-03-04 10:11:12.1");
        assert_eq!(
            id.to_string(),
            "Red pHAT (SSD1608) 250x122 (Red), PCB v1.2, written 2021-03-04 10:11:12.1"
        );
    }

    #[test]
    fn blank_eeprom() {
        assert!(Identity::decode(&[0xFF; RECORD_SIZE]).is_none());
    }

    #[test]
    fn unknown_variant() {
        let raw = record(212, 104, 9, 42, "");
        let id = Identity::decode(&raw).expect("record should decode");
        assert_eq!(id.color, InkColor::Unknown(9));
        assert_eq!(id.display_name(), None);
    }
}
