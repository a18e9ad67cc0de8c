//! Per-model payload encoding.
//!
//! Govee firmwares disagree on how brightness and color payloads are laid
//! out. Each model maps to a [`ModelProfile`] holding one encoder per
//! command; framing is shared and lives in [`crate::frame`].

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::FrameResult;
use crate::frame::Frame;
use crate::types::{Command, DeviceModel, LedMode, Rgb};

/// Builds a brightness payload from a 0-255 level.
pub type BrightnessEncoder = fn(u8) -> Vec<u8>;

/// Builds a color payload from an RGB triple.
pub type ColorEncoder = fn(Rgb) -> Vec<u8>;

/// Payload encoders for one model family.
#[derive(Debug, Clone, Copy)]
pub struct ModelProfile {
    pub brightness: BrightnessEncoder,
    pub color: ColorEncoder,
}

impl ModelProfile {
    /// Profile used for models without a registered entry.
    pub const GENERIC: ModelProfile = ModelProfile {
        brightness: generic_brightness,
        color: generic_color,
    };

    /// H6053: brightness on a 0-100 scale, color wrapped in a fixed
    /// mode/extension block.
    pub const H6053: ModelProfile = ModelProfile {
        brightness: percent_brightness,
        color: h6053_color,
    };

    /// H6127: raw brightness, color prefixed with the manual mode byte.
    pub const H6127: ModelProfile = ModelProfile {
        brightness: generic_brightness,
        color: manual_mode_color,
    };
}

fn generic_brightness(level: u8) -> Vec<u8> {
    vec![level]
}

/// Rescale 0-255 to 0-100, rounding to nearest.
fn percent_brightness(level: u8) -> Vec<u8> {
    let percent = (u16::from(level) * 100 + 127) / 255;
    vec![percent as u8]
}

fn generic_color(rgb: Rgb) -> Vec<u8> {
    vec![rgb.red, rgb.green, rgb.blue]
}

fn manual_mode_color(rgb: Rgb) -> Vec<u8> {
    vec![LedMode::Manual.as_byte(), rgb.red, rgb.green, rgb.blue]
}

fn h6053_color(rgb: Rgb) -> Vec<u8> {
    vec![
        0x15, 0x01, rgb.red, rgb.green, rgb.blue, 0, 0, 0, 0, 0, 0xFF, 0x0F,
    ]
}

/// Maps model identifiers to their payload encoders.
///
/// Unknown identifiers fall back to [`ModelProfile::GENERIC`], which passes
/// values through unchanged.
///
/// # Example
///
/// ```
/// use govee_types::{DeviceModel, ModelProfile, ModelRegistry};
///
/// let mut registry = ModelRegistry::builtin().clone();
/// registry.register(DeviceModel::new("H6159"), ModelProfile::H6127);
///
/// let frame = registry.encode_brightness(&DeviceModel::new("H6053"), 255).unwrap();
/// assert_eq!(frame.payload_area()[0], 100);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    profiles: HashMap<DeviceModel, ModelProfile>,
}

impl ModelRegistry {
    /// An empty registry; every model uses the generic profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared registry with the built-in model profiles.
    pub fn builtin() -> &'static ModelRegistry {
        static BUILTIN: OnceLock<ModelRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut registry = ModelRegistry::new();
            registry.register(DeviceModel::new("H6053"), ModelProfile::H6053);
            registry.register(DeviceModel::new("H6127"), ModelProfile::H6127);
            registry
        })
    }

    /// Register or replace the profile for a model.
    pub fn register(&mut self, model: DeviceModel, profile: ModelProfile) -> &mut Self {
        self.profiles.insert(model, profile);
        self
    }

    pub fn is_known(&self, model: &DeviceModel) -> bool {
        self.profiles.contains_key(model)
    }

    /// Registered model identifiers, sorted.
    pub fn models(&self) -> Vec<&DeviceModel> {
        let mut models: Vec<_> = self.profiles.keys().collect();
        models.sort();
        models
    }

    /// Profile for a model, falling back to the generic one.
    pub fn profile(&self, model: &DeviceModel) -> ModelProfile {
        self.profiles
            .get(model)
            .copied()
            .unwrap_or(ModelProfile::GENERIC)
    }

    pub fn brightness_payload(&self, model: &DeviceModel, brightness: u8) -> Vec<u8> {
        (self.profile(model).brightness)(brightness)
    }

    pub fn color_payload(&self, model: &DeviceModel, rgb: Rgb) -> Vec<u8> {
        (self.profile(model).color)(rgb)
    }

    /// Encode a brightness frame for `model`.
    ///
    /// # Errors
    ///
    /// Fails only if a registered encoder produces an oversized payload.
    pub fn encode_brightness(&self, model: &DeviceModel, brightness: u8) -> FrameResult<Frame> {
        Frame::for_command(
            Command::Brightness,
            &self.brightness_payload(model, brightness),
        )
    }

    /// Encode a color frame for `model`.
    ///
    /// # Errors
    ///
    /// Fails only if a registered encoder produces an oversized payload.
    pub fn encode_color(&self, model: &DeviceModel, rgb: Rgb) -> FrameResult<Frame> {
        Frame::for_command(Command::Color, &self.color_payload(model, rgb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameError;

    #[test]
    fn test_percent_brightness_rounding() {
        assert_eq!(percent_brightness(0), vec![0]);
        assert_eq!(percent_brightness(1), vec![0]);
        assert_eq!(percent_brightness(2), vec![1]);
        assert_eq!(percent_brightness(128), vec![50]);
        assert_eq!(percent_brightness(254), vec![100]);
        assert_eq!(percent_brightness(255), vec![100]);
    }

    #[test]
    fn test_builtin_payloads() {
        let registry = ModelRegistry::builtin();
        let rgb = Rgb::new(10, 20, 30);

        assert_eq!(
            registry.brightness_payload(&DeviceModel::new("H6053"), 255),
            vec![100]
        );
        assert_eq!(
            registry.brightness_payload(&DeviceModel::new("H6127"), 255),
            vec![255]
        );
        assert_eq!(
            registry.color_payload(&DeviceModel::new("H6127"), rgb),
            vec![0x02, 10, 20, 30]
        );
        let h6053 = registry.color_payload(&DeviceModel::new("H6053"), rgb);
        assert_eq!(h6053, vec![0x15, 0x01, 10, 20, 30, 0, 0, 0, 0, 0, 0xFF, 0x0F]);
        assert_eq!(h6053.len(), 12);
    }

    #[test]
    fn test_unknown_model_falls_back_to_generic() {
        let registry = ModelRegistry::builtin();
        let model = DeviceModel::new("H1234");
        assert!(!registry.is_known(&model));
        assert_eq!(registry.brightness_payload(&model, 77), vec![77]);
        assert_eq!(
            registry.color_payload(&model, Rgb::new(1, 2, 3)),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = ModelRegistry::builtin();
        assert!(registry.is_known(&DeviceModel::new("h6053")));
    }

    #[test]
    fn test_register_new_model() {
        let mut registry = ModelRegistry::new();
        registry.register(DeviceModel::new("H6159"), ModelProfile::H6127);
        assert_eq!(registry.models(), vec![&DeviceModel::new("H6159")]);
        assert_eq!(
            registry.color_payload(&DeviceModel::new("H6159"), Rgb::new(4, 5, 6)),
            vec![0x02, 4, 5, 6]
        );
    }

    #[test]
    fn test_oversized_custom_encoder_is_rejected() {
        fn noisy(_: Rgb) -> Vec<u8> {
            vec![0xEE; 18]
        }

        let mut registry = ModelRegistry::new();
        registry.register(
            DeviceModel::new("H0000"),
            ModelProfile {
                brightness: |level| vec![level; 18],
                color: noisy,
            },
        );
        let model = DeviceModel::new("H0000");

        assert_eq!(
            registry.encode_color(&model, Rgb::default()),
            Err(FrameError::InvalidPayload { len: 18, max: 17 })
        );
        assert_eq!(
            registry.encode_brightness(&model, 1),
            Err(FrameError::InvalidPayload { len: 18, max: 17 })
        );
    }
}
