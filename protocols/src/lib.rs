// SPDX-License-Identifier: LGPL-3.0-or-later
// Copyright (c) 2024 Takashi Sakamoto

//! Protocol implementation for Fender Mustang series of USB amplifiers.
//!
//! The crate includes structures, enumerations, and functions for the control protocol defined by
//! Fender for its Mustang series of amplifiers. The protocol is a vendor specific exchange of
//! 64 byte packets over USB interrupt endpoints; it covers recall and storage of presets,
//! configuration of amplifier and effect parameters, and the operating mode in which the
//! amplifier streams pitch detection frames for its tuner.

pub mod ids;
pub mod packet;
pub mod serializer;

use std::fmt;

use thiserror::Error;

/// The error within protocol encoding and decoding.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ProtocolError {
    /// The length of buffer differs from the fixed packet size.
    #[error("packet should be {expected} bytes long, while {found} bytes are given")]
    PacketSize { expected: usize, found: usize },
    /// The effect is not storable into an effect bank of the amplifier.
    #[error("effect '{0}' is not storable into an effect bank")]
    InvalidBankEffect(Effect),
    /// No effect is given for storage into an effect bank.
    #[error("an effect bank requires at least one effect")]
    EmptyBank,
    /// The empty effect slot has no wire representation of its own.
    #[error("an empty effect slot can not be serialized")]
    EmptyEffect,
}

/// The enumeration to express model of amplifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AmpModel {
    Fender57Deluxe,
    Fender59Bassman,
    Fender57Champ,
    Fender65DeluxeReverb,
    Fender65Princeton,
    Fender65TwinReverb,
    FenderSuperSonic,
    British60s,
    British70s,
    British80s,
    American90s,
    Metal2000,
    // Available in the second generation of hardware.
    StudioPreamp,
    Fender57Twin,
    SixtiesThrift,
    BritishWatts,
    BritishColour,
    Unknown,
}

impl Default for AmpModel {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for AmpModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Fender57Deluxe => write!(f, "'57 Deluxe"),
            Self::Fender59Bassman => write!(f, "'59 Bassman"),
            Self::Fender57Champ => write!(f, "'57 Champ"),
            Self::Fender65DeluxeReverb => write!(f, "'65 Deluxe Reverb"),
            Self::Fender65Princeton => write!(f, "'65 Princeton"),
            Self::Fender65TwinReverb => write!(f, "'65 Twin Reverb"),
            Self::FenderSuperSonic => write!(f, "Super-Sonic"),
            Self::British60s => write!(f, "British '60s"),
            Self::British70s => write!(f, "British '70s"),
            Self::British80s => write!(f, "British '80s"),
            Self::American90s => write!(f, "American '90s"),
            Self::Metal2000 => write!(f, "Metal 2000"),
            Self::StudioPreamp => write!(f, "Studio Preamp"),
            Self::Fender57Twin => write!(f, "'57 Twin"),
            Self::SixtiesThrift => write!(f, "'60s Thrift"),
            Self::BritishWatts => write!(f, "British Watts"),
            Self::BritishColour => write!(f, "British Colour"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The enumeration to express model of speaker cabinet.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Cabinet {
    Off,
    Cab57Dlx,
    CabBssmn,
    Cab65Dlx,
    Cab65Prn,
    CabChamp,
    Cab4x12M,
    Cab2x12C,
    Cab4x12G,
    Cab65Twn,
    Cab4x12V,
    CabSs212,
    CabSs112,
    Unknown,
}

impl Default for Cabinet {
    fn default() -> Self {
        Self::Off
    }
}

impl fmt::Display for Cabinet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Cab57Dlx => write!(f, "57dlx"),
            Self::CabBssmn => write!(f, "bssmn"),
            Self::Cab65Dlx => write!(f, "65dlx"),
            Self::Cab65Prn => write!(f, "65prn"),
            Self::CabChamp => write!(f, "champ"),
            Self::Cab4x12M => write!(f, "4x12m"),
            Self::Cab2x12C => write!(f, "2x12c"),
            Self::Cab4x12G => write!(f, "4x12g"),
            Self::Cab65Twn => write!(f, "65twn"),
            Self::Cab4x12V => write!(f, "4x12v"),
            Self::CabSs212 => write!(f, "ss212"),
            Self::CabSs112 => write!(f, "ss112"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The enumeration to express family of effect, one per DSP block of the amplifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EffectFamily {
    Stompbox,
    Modulation,
    Delay,
    Reverb,
}

/// The enumeration to express model of effect.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Effect {
    Empty,

    // Stompbox family.
    Overdrive,
    Wah,
    TouchWah,
    Fuzz,
    FuzzTouchWah,
    SimpleComp,
    Compressor,
    RangeBoost,
    GreenBox,
    OrangeBox,
    BlackBox,
    BigFuzz,

    // Modulation family.
    SineChorus,
    TriangleChorus,
    SineFlanger,
    TriangleFlanger,
    Vibratone,
    VintageTremolo,
    SineTremolo,
    RingModulator,
    StepFilter,
    Phaser,
    PitchShifter,

    // Delay family.
    MonoDelay,
    MonoEchoFilter,
    StereoEchoFilter,
    MultitapDelay,
    PingPongDelay,
    DuckingDelay,
    ReverseDelay,
    TapeDelay,
    StereoTapeDelay,

    // Reverb family.
    SmallHallReverb,
    LargeHallReverb,
    SmallRoomReverb,
    LargeRoomReverb,
    SmallPlateReverb,
    LargePlateReverb,
    AmbientReverb,
    ArenaReverb,
    Fender63SpringReverb,
    Fender65SpringReverb,
}

impl Default for Effect {
    fn default() -> Self {
        Self::Empty
    }
}

impl Effect {
    /// Return the family of the effect, if any.
    pub fn family(&self) -> Option<EffectFamily> {
        match self {
            Self::Empty => None,
            Self::Overdrive
            | Self::Wah
            | Self::TouchWah
            | Self::Fuzz
            | Self::FuzzTouchWah
            | Self::SimpleComp
            | Self::Compressor
            | Self::RangeBoost
            | Self::GreenBox
            | Self::OrangeBox
            | Self::BlackBox
            | Self::BigFuzz => Some(EffectFamily::Stompbox),
            Self::SineChorus
            | Self::TriangleChorus
            | Self::SineFlanger
            | Self::TriangleFlanger
            | Self::Vibratone
            | Self::VintageTremolo
            | Self::SineTremolo
            | Self::RingModulator
            | Self::StepFilter
            | Self::Phaser
            | Self::PitchShifter => Some(EffectFamily::Modulation),
            Self::MonoDelay
            | Self::MonoEchoFilter
            | Self::StereoEchoFilter
            | Self::MultitapDelay
            | Self::PingPongDelay
            | Self::DuckingDelay
            | Self::ReverseDelay
            | Self::TapeDelay
            | Self::StereoTapeDelay => Some(EffectFamily::Delay),
            Self::SmallHallReverb
            | Self::LargeHallReverb
            | Self::SmallRoomReverb
            | Self::LargeRoomReverb
            | Self::SmallPlateReverb
            | Self::LargePlateReverb
            | Self::AmbientReverb
            | Self::ArenaReverb
            | Self::Fender63SpringReverb
            | Self::Fender65SpringReverb => Some(EffectFamily::Reverb),
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Overdrive => write!(f, "overdrive"),
            Self::Wah => write!(f, "wah"),
            Self::TouchWah => write!(f, "touch wah"),
            Self::Fuzz => write!(f, "fuzz"),
            Self::FuzzTouchWah => write!(f, "fuzz touch wah"),
            Self::SimpleComp => write!(f, "simple compressor"),
            Self::Compressor => write!(f, "compressor"),
            Self::RangeBoost => write!(f, "range boost"),
            Self::GreenBox => write!(f, "green box"),
            Self::OrangeBox => write!(f, "orange box"),
            Self::BlackBox => write!(f, "black box"),
            Self::BigFuzz => write!(f, "big fuzz"),
            Self::SineChorus => write!(f, "sine chorus"),
            Self::TriangleChorus => write!(f, "triangle chorus"),
            Self::SineFlanger => write!(f, "sine flanger"),
            Self::TriangleFlanger => write!(f, "triangle flanger"),
            Self::Vibratone => write!(f, "vibratone"),
            Self::VintageTremolo => write!(f, "vintage tremolo"),
            Self::SineTremolo => write!(f, "sine tremolo"),
            Self::RingModulator => write!(f, "ring modulator"),
            Self::StepFilter => write!(f, "step filter"),
            Self::Phaser => write!(f, "phaser"),
            Self::PitchShifter => write!(f, "pitch shifter"),
            Self::MonoDelay => write!(f, "mono delay"),
            Self::MonoEchoFilter => write!(f, "mono echo filter"),
            Self::StereoEchoFilter => write!(f, "stereo echo filter"),
            Self::MultitapDelay => write!(f, "multitap delay"),
            Self::PingPongDelay => write!(f, "ping-pong delay"),
            Self::DuckingDelay => write!(f, "ducking delay"),
            Self::ReverseDelay => write!(f, "reverse delay"),
            Self::TapeDelay => write!(f, "tape delay"),
            Self::StereoTapeDelay => write!(f, "stereo tape delay"),
            Self::SmallHallReverb => write!(f, "small hall reverb"),
            Self::LargeHallReverb => write!(f, "large hall reverb"),
            Self::SmallRoomReverb => write!(f, "small room reverb"),
            Self::LargeRoomReverb => write!(f, "large room reverb"),
            Self::SmallPlateReverb => write!(f, "small plate reverb"),
            Self::LargePlateReverb => write!(f, "large plate reverb"),
            Self::AmbientReverb => write!(f, "ambient reverb"),
            Self::ArenaReverb => write!(f, "arena reverb"),
            Self::Fender63SpringReverb => write!(f, "'63 spring reverb"),
            Self::Fender65SpringReverb => write!(f, "'65 spring reverb"),
        }
    }
}

/// The enumeration to express position of effect pedal in the signal chain.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Position {
    /// Between instrument input and amplifier.
    Input,
    /// In the effects loop behind the pre-amplifier.
    EffectsLoop,
}

impl Default for Position {
    fn default() -> Self {
        Self::Input
    }
}

/// The parameters of amplifier block.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub struct AmpSettings {
    pub amp: AmpModel,
    pub gain: u8,
    pub volume: u8,
    pub treble: u8,
    pub middle: u8,
    pub bass: u8,
    pub cabinet: Cabinet,
    /// Between 0 and 5. The highest step enables threshold and depth.
    pub noise_gate: u8,
    pub master_volume: u8,
    pub gain2: u8,
    pub presence: u8,
    /// Between 0 and 9, effective when noise gate is at its highest step.
    pub threshold: u8,
    pub depth: u8,
    pub bias: u8,
    /// Between 0 and 2.
    pub sag: u8,
    pub brightness: bool,
    pub usb_gain: u8,
}

/// The parameters of one effect pedal slot.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub struct EffectSettings {
    /// Between 0 and 3.
    pub fx_slot: u8,
    pub effect: Effect,
    pub position: Position,
    pub knob1: u8,
    pub knob2: u8,
    pub knob3: u8,
    pub knob4: u8,
    pub knob5: u8,
    /// Used by echo filters and tape delays only.
    pub knob6: u8,
}

/// The logical content of one preset; a name, the amplifier configuration, and four effect
/// pedal slots.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct SignalChain {
    pub name: String,
    pub amp: AmpSettings,
    pub effects: [EffectSettings; 4],
}
