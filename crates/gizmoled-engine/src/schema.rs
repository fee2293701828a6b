//! Typed parameter schema for effect settings
//!
//! Every effect declares an ordered list of [`ParamField`]s. The settings blob
//! exchanged with the companion app and written to storage is derived from that
//! list, field after field:
//!
//! | Field    | Encoding                         |
//! |----------|----------------------------------|
//! | color    | `[1, var, r, g, b]`              |
//! | slider   | `[2, var, value, min, max]`      |
//! | checkbox | `[3, var, value]`                |
//!
//! The value of a field always sits [`VALUE_OFFSET`] bytes into it, so a
//! [`SettingsView`] can address values by [`VarName`] instead of raw offsets.

use heapless::Vec;
use smart_leds::RGB8;

use crate::config::MAX_SETTINGS_SIZE;

/// Offset of the value inside an encoded field (after type and name bytes)
pub const VALUE_OFFSET: usize = 2;

const COLOR_FIELD_LEN: usize = 5;
const SLIDER_FIELD_LEN: usize = 5;
const CHECKBOX_FIELD_LEN: usize = 3;

/// Field type tag, first byte of every encoded field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VarType {
    Color = 1,
    Slider = 2,
    Checkbox = 3,
}

/// Parameter names understood by the companion app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VarName {
    Color = 0,
    Color1,
    Color2,
    Color3,
    NumberOfColors,
    Speed,
    Brightness,
    Length,
    Decay,
    RainbowEnabled,
    RainbowSpeed,
    RainbowLength,
    FadeIn,
    FadeOut,
    Angle,
    Sensitivity,
    ColorBackground,
    RainbowOffset,
    BackgroundBrightness,
}

/// One typed entry of an effect's parameter list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    Color { name: VarName, value: RGB8 },
    Slider { name: VarName, value: u8, min: u8, max: u8 },
    Checkbox { name: VarName, value: bool },
}

impl ParamField {
    pub const fn color(name: VarName, r: u8, g: u8, b: u8) -> Self {
        Self::Color {
            name,
            value: RGB8 { r, g, b },
        }
    }

    pub const fn slider(name: VarName, value: u8, min: u8, max: u8) -> Self {
        Self::Slider {
            name,
            value,
            min,
            max,
        }
    }

    pub const fn checkbox(name: VarName, value: bool) -> Self {
        Self::Checkbox { name, value }
    }

    pub const fn var_type(&self) -> VarType {
        match self {
            Self::Color { .. } => VarType::Color,
            Self::Slider { .. } => VarType::Slider,
            Self::Checkbox { .. } => VarType::Checkbox,
        }
    }

    pub const fn name(&self) -> VarName {
        match self {
            Self::Color { name, .. } | Self::Slider { name, .. } | Self::Checkbox { name, .. } => {
                *name
            }
        }
    }

    /// Number of bytes this field occupies in the settings blob
    pub const fn encoded_len(&self) -> usize {
        match self {
            Self::Color { .. } => COLOR_FIELD_LEN,
            Self::Slider { .. } => SLIDER_FIELD_LEN,
            Self::Checkbox { .. } => CHECKBOX_FIELD_LEN,
        }
    }

    fn encode_into(&self, out: &mut Vec<u8, MAX_SETTINGS_SIZE>) -> Result<(), SchemaError> {
        let header = [self.var_type() as u8, self.name() as u8];
        let result = match *self {
            Self::Color { value, .. } => {
                out.extend_from_slice(&header)
                    .and_then(|()| out.extend_from_slice(&[value.r, value.g, value.b]))
            }
            Self::Slider {
                value, min, max, ..
            } => out
                .extend_from_slice(&header)
                .and_then(|()| out.extend_from_slice(&[value, min, max])),
            Self::Checkbox { value, .. } => out
                .extend_from_slice(&header)
                .and_then(|()| out.push(u8::from(value)).map_err(|_| ())),
        };
        result.map_err(|()| SchemaError::TooLarge)
    }
}

/// Schema encoding error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaError {
    /// Encoded settings do not fit into one storage page
    TooLarge,
}

/// Total encoded length of a parameter list
pub const fn encoded_len(fields: &[ParamField]) -> usize {
    let mut len = 0;
    let mut i = 0;
    while i < fields.len() {
        len += fields[i].encoded_len();
        i += 1;
    }
    len
}

/// Encode a parameter list into its settings blob
pub fn encode_settings(fields: &[ParamField]) -> Result<Vec<u8, MAX_SETTINGS_SIZE>, SchemaError> {
    let mut out = Vec::new();
    for field in fields {
        field.encode_into(&mut out)?;
    }
    Ok(out)
}

/// Read-only view over a settings blob, addressed through its schema.
///
/// Lookups return `None` when the name is not declared, the declared type does
/// not match, or the blob is shorter than the schema expects.
#[derive(Debug, Clone, Copy)]
pub struct SettingsView<'a> {
    schema: &'static [ParamField],
    bytes: &'a [u8],
}

impl<'a> SettingsView<'a> {
    pub const fn new(schema: &'static [ParamField], bytes: &'a [u8]) -> Self {
        Self { schema, bytes }
    }

    /// Raw settings bytes
    pub const fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Byte offset of the value of `name`, with its declared type
    pub fn value_offset(&self, name: VarName) -> Option<(usize, VarType)> {
        let mut start = 0;
        for field in self.schema {
            if field.name() == name {
                return Some((start + VALUE_OFFSET, field.var_type()));
            }
            start += field.encoded_len();
        }
        None
    }

    fn value_bytes(&self, name: VarName, expected: VarType, len: usize) -> Option<&'a [u8]> {
        let (offset, var_type) = self.value_offset(name)?;
        if var_type != expected {
            return None;
        }
        self.bytes.get(offset..offset + len)
    }

    pub fn color(&self, name: VarName) -> Option<RGB8> {
        self.value_bytes(name, VarType::Color, 3)
            .map(|c| RGB8 {
                r: c[0],
                g: c[1],
                b: c[2],
            })
    }

    pub fn slider(&self, name: VarName) -> Option<u8> {
        self.value_bytes(name, VarType::Slider, 1).map(|v| v[0])
    }

    pub fn checkbox(&self, name: VarName) -> Option<bool> {
        self.value_bytes(name, VarType::Checkbox, 1).map(|v| v[0] != 0)
    }

    /// Slider value or a fallback when the slider is missing
    pub fn slider_or(&self, name: VarName, default: u8) -> u8 {
        self.slider(name).unwrap_or(default)
    }

    /// Checkbox value, `false` when missing
    pub fn flag(&self, name: VarName) -> bool {
        self.checkbox(name).unwrap_or(false)
    }
}
