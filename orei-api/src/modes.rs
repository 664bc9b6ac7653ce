//! Device enumerations with their firmware numeric codes
//!
//! The codes are bit-exact with the matrix firmware. Gaps are intentional:
//! scaler code 2 is reserved, and EDID presets are numbered from 1 here while
//! the device stores them from 0 (see [`EdidMode::device_code`]).

use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// Lowercase and strip everything but ASCII alphanumerics, so that
/// `"4K -> 1080P"`, `"4k-1080p"` and `"4K1080P"` compare equal.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Shared `FromStr` logic: numeric code or any normalized alias
fn parse_mode<T: Copy>(
    what: &str,
    input: &str,
    all: &[T],
    from_code: impl Fn(u8) -> Option<T>,
    aliases: impl Fn(T) -> Vec<&'static str>,
) -> Result<T, ApiError> {
    let trimmed = input.trim();
    if let Ok(code) = trimmed.parse::<u8>() {
        return from_code(code)
            .ok_or_else(|| ApiError::InvalidParameter(format!("unknown {} code {}", what, code)));
    }

    let wanted = normalize(trimmed);
    all.iter()
        .copied()
        .find(|mode| aliases(*mode).iter().any(|alias| normalize(alias) == wanted))
        .ok_or_else(|| ApiError::InvalidParameter(format!("unknown {} '{}'", what, input)))
}

// ============================================================================
// Scaler
// ============================================================================

/// Per-output video scaling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalerMode {
    Bypass,
    Scale4kTo1080p,
    Auto,
}

impl ScalerMode {
    pub const ALL: [ScalerMode; 3] = [ScalerMode::Bypass, ScalerMode::Scale4kTo1080p, ScalerMode::Auto];

    pub fn code(&self) -> u8 {
        match self {
            ScalerMode::Bypass => 0,
            ScalerMode::Scale4kTo1080p => 1,
            ScalerMode::Auto => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ScalerMode::Bypass),
            1 => Some(ScalerMode::Scale4kTo1080p),
            3 => Some(ScalerMode::Auto),
            _ => None,
        }
    }

    /// Name shown in zone attributes
    pub fn label(&self) -> &'static str {
        match self {
            ScalerMode::Bypass => "Bypass",
            ScalerMode::Scale4kTo1080p => "4K -> 1080P",
            ScalerMode::Auto => "AUTO",
        }
    }

    fn aliases(self) -> Vec<&'static str> {
        match self {
            ScalerMode::Bypass => vec![self.label()],
            ScalerMode::Scale4kTo1080p => vec![self.label(), "scale-4k-1080p", "scale-4k-to-1080p"],
            ScalerMode::Auto => vec![self.label()],
        }
    }
}

impl fmt::Display for ScalerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScalerMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_mode("scaler mode", s, &Self::ALL, Self::from_code, Self::aliases)
    }
}

// ============================================================================
// EDID
// ============================================================================

/// EDID preset advertised by an input to its source device
///
/// Enumeration codes run 1..=31. `CopyFromOut1`..`CopyFromOut8` mirror
/// whatever the device reads from that output; the matrix decides what is
/// copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EdidMode {
    Edid1080pStereoAudio20 = 1,
    Edid1080pDolbyDts51 = 2,
    Edid1080pHdAudio71 = 3,
    Edid1080iStereoAudio20 = 4,
    Edid1080iDolbyDts51 = 5,
    Edid1080iHdAudio71 = 6,
    Edid3dStereoAudio20 = 7,
    Edid3dDolbyDts51 = 8,
    Edid3dHdAudio71 = 9,
    Edid4k2k30444StereoAudio20 = 10,
    Edid4k2k30444DolbyDts51 = 11,
    Edid4k2k30444HdAudio71 = 12,
    Edid4k2k60420StereoAudio20 = 13,
    Edid4k2k60420DolbyDts51 = 14,
    Edid4k2k60420HdAudio71 = 15,
    Edid4k2k60444StereoAudio20 = 16,
    Edid4k2k60444DolbyDts51 = 17,
    Edid4k2k60444HdAudio71 = 18,
    Edid4k2k60444StereoAudio20Hdr = 19,
    Edid4k2k60444DolbyDts51Hdr = 20,
    Edid4k2k60444HdAudio71Hdr = 21,
    UserDefine1 = 22,
    UserDefine2 = 23,
    CopyFromOut1 = 24,
    CopyFromOut2 = 25,
    CopyFromOut3 = 26,
    CopyFromOut4 = 27,
    CopyFromOut5 = 28,
    CopyFromOut6 = 29,
    CopyFromOut7 = 30,
    CopyFromOut8 = 31,
}

impl EdidMode {
    /// All presets in enumeration order (index + 1 == code)
    pub const ALL: [EdidMode; 31] = [
        EdidMode::Edid1080pStereoAudio20,
        EdidMode::Edid1080pDolbyDts51,
        EdidMode::Edid1080pHdAudio71,
        EdidMode::Edid1080iStereoAudio20,
        EdidMode::Edid1080iDolbyDts51,
        EdidMode::Edid1080iHdAudio71,
        EdidMode::Edid3dStereoAudio20,
        EdidMode::Edid3dDolbyDts51,
        EdidMode::Edid3dHdAudio71,
        EdidMode::Edid4k2k30444StereoAudio20,
        EdidMode::Edid4k2k30444DolbyDts51,
        EdidMode::Edid4k2k30444HdAudio71,
        EdidMode::Edid4k2k60420StereoAudio20,
        EdidMode::Edid4k2k60420DolbyDts51,
        EdidMode::Edid4k2k60420HdAudio71,
        EdidMode::Edid4k2k60444StereoAudio20,
        EdidMode::Edid4k2k60444DolbyDts51,
        EdidMode::Edid4k2k60444HdAudio71,
        EdidMode::Edid4k2k60444StereoAudio20Hdr,
        EdidMode::Edid4k2k60444DolbyDts51Hdr,
        EdidMode::Edid4k2k60444HdAudio71Hdr,
        EdidMode::UserDefine1,
        EdidMode::UserDefine2,
        EdidMode::CopyFromOut1,
        EdidMode::CopyFromOut2,
        EdidMode::CopyFromOut3,
        EdidMode::CopyFromOut4,
        EdidMode::CopyFromOut5,
        EdidMode::CopyFromOut6,
        EdidMode::CopyFromOut7,
        EdidMode::CopyFromOut8,
    ];

    /// 1-based enumeration code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// 0-based code stored by the device
    pub fn device_code(&self) -> u8 {
        self.code() - 1
    }

    pub fn from_code(code: u8) -> Option<Self> {
        let idx = usize::from(code).checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }

    /// Translate the device's 0-based code
    pub fn from_device_code(code: u8) -> Option<Self> {
        Self::from_code(code.checked_add(1)?)
    }

    /// Menu text as printed by the matrix
    pub fn label(&self) -> &'static str {
        match self {
            EdidMode::Edid1080pStereoAudio20 => "1080P, Stereo Audio 2.0",
            EdidMode::Edid1080pDolbyDts51 => "1080P, Dolby/DTS 5.1",
            EdidMode::Edid1080pHdAudio71 => "1080P, HD Audio 7.1",
            EdidMode::Edid1080iStereoAudio20 => "1080I, Stereo Audio 2.0",
            EdidMode::Edid1080iDolbyDts51 => "1080I, Dolby/DTS 5.1",
            EdidMode::Edid1080iHdAudio71 => "1080I, HD Audio 7.1",
            EdidMode::Edid3dStereoAudio20 => "3D, Stereo Audio 2.0",
            EdidMode::Edid3dDolbyDts51 => "3D, Dolby/DTS 5.1",
            EdidMode::Edid3dHdAudio71 => "3D, HD Audio 7.1",
            EdidMode::Edid4k2k30444StereoAudio20 => "4K2K30_444, Stereo Audio 2.0",
            EdidMode::Edid4k2k30444DolbyDts51 => "4K2K30_444, Dolby/DTS 5.1",
            EdidMode::Edid4k2k30444HdAudio71 => "4K2K30_444, HD Audio 7.1",
            EdidMode::Edid4k2k60420StereoAudio20 => "4K2K60_420, Stereo Audio 2.0",
            EdidMode::Edid4k2k60420DolbyDts51 => "4K2K60_420, Dolby/DTS 5.1",
            EdidMode::Edid4k2k60420HdAudio71 => "4K2K60_420, HD Audio 7.1",
            EdidMode::Edid4k2k60444StereoAudio20 => "4K2K60_444, Stereo Audio 2.0",
            EdidMode::Edid4k2k60444DolbyDts51 => "4K2K60_444, Dolby/DTS 5.1",
            EdidMode::Edid4k2k60444HdAudio71 => "4K2K60_444, HD Audio 7.1",
            EdidMode::Edid4k2k60444StereoAudio20Hdr => "4K2K60_444, Stereo Audio 2.0 HDR",
            EdidMode::Edid4k2k60444DolbyDts51Hdr => "4K2K60_444, Dolby/DTS 5.1 HDR",
            EdidMode::Edid4k2k60444HdAudio71Hdr => "4K2K60_444, HD Audio 7.1 HDR",
            EdidMode::UserDefine1 => "User Define1",
            EdidMode::UserDefine2 => "User Define2",
            EdidMode::CopyFromOut1 => "Copy From Out 1",
            EdidMode::CopyFromOut2 => "Copy From Out 2",
            EdidMode::CopyFromOut3 => "Copy From Out 3",
            EdidMode::CopyFromOut4 => "Copy From Out 4",
            EdidMode::CopyFromOut5 => "Copy From Out 5",
            EdidMode::CopyFromOut6 => "Copy From Out 6",
            EdidMode::CopyFromOut7 => "Copy From Out 7",
            EdidMode::CopyFromOut8 => "Copy From Out 8",
        }
    }

    fn aliases(self) -> Vec<&'static str> {
        vec![self.label()]
    }
}

impl fmt::Display for EdidMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EdidMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_mode("EDID mode", s, &Self::ALL, Self::from_code, Self::aliases)
    }
}

// ============================================================================
// CEC
// ============================================================================

/// CEC commands accepted by an output port (0-based codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputCecCommand {
    PowerOn,
    PowerOff,
    VolumeMute,
    VolumeDown,
    VolumeUp,
    Source,
}

impl OutputCecCommand {
    pub const ALL: [OutputCecCommand; 6] = [
        OutputCecCommand::PowerOn,
        OutputCecCommand::PowerOff,
        OutputCecCommand::VolumeMute,
        OutputCecCommand::VolumeDown,
        OutputCecCommand::VolumeUp,
        OutputCecCommand::Source,
    ];

    pub fn code(&self) -> u8 {
        match self {
            OutputCecCommand::PowerOn => 0,
            OutputCecCommand::PowerOff => 1,
            OutputCecCommand::VolumeMute => 2,
            OutputCecCommand::VolumeDown => 3,
            OutputCecCommand::VolumeUp => 4,
            OutputCecCommand::Source => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputCecCommand::PowerOn => "power-on",
            OutputCecCommand::PowerOff => "power-off",
            OutputCecCommand::VolumeMute => "volume-mute",
            OutputCecCommand::VolumeDown => "volume-down",
            OutputCecCommand::VolumeUp => "volume-up",
            OutputCecCommand::Source => "source",
        }
    }

    fn aliases(self) -> Vec<&'static str> {
        vec![self.label()]
    }
}

impl fmt::Display for OutputCecCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputCecCommand {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_mode("output CEC command", s, &Self::ALL, Self::from_code, Self::aliases)
    }
}

/// CEC commands accepted by an input port (1-based codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InputCecCommand {
    PowerOn = 1,
    PowerOff = 2,
    Up = 3,
    Left = 4,
    Enter = 5,
    Right = 6,
    Menu = 7,
    Down = 8,
    Back = 9,
    Prev = 10,
    Play = 11,
    Next = 12,
    Rewind = 13,
    Pause = 14,
    FastForward = 15,
    Stop = 16,
    VolumeMute = 17,
    VolumeDown = 18,
    VolumeUp = 19,
}

impl InputCecCommand {
    pub const ALL: [InputCecCommand; 19] = [
        InputCecCommand::PowerOn,
        InputCecCommand::PowerOff,
        InputCecCommand::Up,
        InputCecCommand::Left,
        InputCecCommand::Enter,
        InputCecCommand::Right,
        InputCecCommand::Menu,
        InputCecCommand::Down,
        InputCecCommand::Back,
        InputCecCommand::Prev,
        InputCecCommand::Play,
        InputCecCommand::Next,
        InputCecCommand::Rewind,
        InputCecCommand::Pause,
        InputCecCommand::FastForward,
        InputCecCommand::Stop,
        InputCecCommand::VolumeMute,
        InputCecCommand::VolumeDown,
        InputCecCommand::VolumeUp,
    ];

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        let idx = usize::from(code).checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            InputCecCommand::PowerOn => "power-on",
            InputCecCommand::PowerOff => "power-off",
            InputCecCommand::Up => "up",
            InputCecCommand::Left => "left",
            InputCecCommand::Enter => "enter",
            InputCecCommand::Right => "right",
            InputCecCommand::Menu => "menu",
            InputCecCommand::Down => "down",
            InputCecCommand::Back => "back",
            InputCecCommand::Prev => "prev",
            InputCecCommand::Play => "play",
            InputCecCommand::Next => "next",
            InputCecCommand::Rewind => "rewind",
            InputCecCommand::Pause => "pause",
            InputCecCommand::FastForward => "fast-forward",
            InputCecCommand::Stop => "stop",
            InputCecCommand::VolumeMute => "volume-mute",
            InputCecCommand::VolumeDown => "volume-down",
            InputCecCommand::VolumeUp => "volume-up",
        }
    }

    fn aliases(self) -> Vec<&'static str> {
        vec![self.label()]
    }
}

impl fmt::Display for InputCecCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InputCecCommand {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_mode("input CEC command", s, &Self::ALL, Self::from_code, Self::aliases)
    }
}
