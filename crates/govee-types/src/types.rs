//! Core value types for Govee lights.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// Operation carried by a command frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Command {
    /// Switch the light on or off.
    Power = 0x01,
    /// Set the brightness level.
    Brightness = 0x04,
    /// Set the RGB color.
    Color = 0x05,
}

impl Command {
    /// The opcode byte written at index 1 of a frame.
    #[must_use]
    pub fn opcode(self) -> u8 {
        self as u8
    }

    /// Look up a command by its opcode byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_types::Command;
    ///
    /// assert_eq!(Command::from_opcode(0x04), Ok(Command::Brightness));
    /// assert!(Command::from_opcode(0x02).is_err());
    /// ```
    pub fn from_opcode(opcode: u8) -> Result<Self, FrameError> {
        match opcode {
            0x01 => Ok(Command::Power),
            0x04 => Ok(Command::Brightness),
            0x05 => Ok(Command::Color),
            other => Err(FrameError::InvalidCommand(u16::from(other))),
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_opcode(value)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Power => write!(f, "power"),
            Command::Brightness => write!(f, "brightness"),
            Command::Color => write!(f, "color"),
        }
    }
}

/// Mode in which a color change is applied.
///
/// Only [`LedMode::Manual`] is used by the built-in encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum LedMode {
    /// Static color chosen by the user.
    Manual = 0x02,
    /// Built-in scene animations.
    Scenes = 0x05,
    /// Music-reactive mode driven by the on-board microphone.
    Microphone = 0x06,
}

impl LedMode {
    /// Mode byte as sent on the wire.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// An RGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self { red, green, blue }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl FromStr for Rgb {
    type Err = FrameError;

    /// Parse `#RRGGBB`, `RRGGBB` or `r,g,b`.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_types::Rgb;
    ///
    /// assert_eq!("#FF8000".parse::<Rgb>(), Ok(Rgb::new(255, 128, 0)));
    /// assert_eq!("10, 20, 30".parse::<Rgb>(), Ok(Rgb::new(10, 20, 30)));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || FrameError::InvalidColor(s.to_string());

        if s.contains(',') {
            let parts: Vec<&str> = s.split(',').map(str::trim).collect();
            if parts.len() != 3 {
                return Err(invalid());
            }
            let channel = |p: &str| p.parse::<u8>().map_err(|_| invalid());
            return Ok(Rgb::new(
                channel(parts[0])?,
                channel(parts[1])?,
                channel(parts[2])?,
            ));
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: core::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Govee model identifier such as `H6053` or `H6127`.
///
/// Identifiers are stored upper-case so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub struct DeviceModel(String);

impl DeviceModel {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Guess the model from an advertised device name.
    ///
    /// Govee lights advertise names like `ihoment_H6127_ABCD` or
    /// `Govee_H6053_12AB`; the model is the first `H` token followed by four
    /// digits.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_types::DeviceModel;
    ///
    /// assert_eq!(
    ///     DeviceModel::from_name("ihoment_H6127_ABCD"),
    ///     Some(DeviceModel::new("H6127"))
    /// );
    /// assert_eq!(DeviceModel::from_name("Kitchen lamp"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        name.split(|c: char| !c.is_ascii_alphanumeric())
            .find(|token| {
                token.len() == 5
                    && token.starts_with(['H', 'h'])
                    && token[1..].chars().all(|c| c.is_ascii_digit())
            })
            .map(DeviceModel::new)
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceModel {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DeviceModel::new(s))
    }
}

impl From<&str> for DeviceModel {
    fn from(s: &str) -> Self {
        DeviceModel::new(s)
    }
}

impl From<String> for DeviceModel {
    fn from(s: String) -> Self {
        DeviceModel::new(s)
    }
}

impl From<DeviceModel> for String {
    fn from(model: DeviceModel) -> Self {
        model.0
    }
}

/// Last state sent to a light.
///
/// The device is never read back, so this mirrors what was successfully
/// written and may drift if a write is lost over the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LightState {
    /// `None` until the first power command succeeds.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub is_on: Option<bool>,
    /// Brightness on the 0-255 scale, as requested by the caller.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub brightness: Option<u8>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub rgb: Option<Rgb>,
}
