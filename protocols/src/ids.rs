// SPDX-License-Identifier: LGPL-3.0-or-later
// Copyright (c) 2024 Takashi Sakamoto

//! Static tables between wire identifiers and logical models.
//!
//! The amplifier addresses models by opaque identifiers. Each amplifier model additionally
//! prescribes five bytes of model specific data which the firmware expects verbatim; they were
//! recovered from captures of the vendor application and are part of the wire contract.

use super::*;

/// The table of amplifier models; wire identifier and the model specific bytes.
const AMP_MODELS: &[(AmpModel, u8, [u8; 5])] = &[
    (AmpModel::Fender57Deluxe, 0x67, [0x01, 0x01, 0x01, 0x01, 0x53]),
    (AmpModel::Fender59Bassman, 0x64, [0x02, 0x02, 0x02, 0x02, 0x67]),
    (AmpModel::Fender57Champ, 0x7c, [0x0c, 0x0c, 0x0c, 0x0c, 0x00]),
    (
        AmpModel::Fender65DeluxeReverb,
        0x53,
        [0x03, 0x03, 0x03, 0x03, 0x6a],
    ),
    (
        AmpModel::Fender65Princeton,
        0x6a,
        [0x04, 0x04, 0x04, 0x04, 0x61],
    ),
    (
        AmpModel::Fender65TwinReverb,
        0x75,
        [0x05, 0x05, 0x05, 0x05, 0x72],
    ),
    (
        AmpModel::FenderSuperSonic,
        0x72,
        [0x06, 0x06, 0x06, 0x06, 0x79],
    ),
    (AmpModel::British60s, 0x61, [0x07, 0x07, 0x07, 0x07, 0x5e]),
    (AmpModel::British70s, 0x79, [0x0b, 0x0b, 0x0b, 0x0b, 0x7c]),
    (AmpModel::British80s, 0x5e, [0x09, 0x09, 0x09, 0x09, 0x5d]),
    (AmpModel::American90s, 0x5d, [0x0a, 0x0a, 0x0a, 0x0a, 0x6d]),
    (AmpModel::Metal2000, 0x6d, [0x08, 0x08, 0x08, 0x08, 0x75]),
    // Second generation of hardware.
    (AmpModel::StudioPreamp, 0xf1, [0x0d, 0x0d, 0x0d, 0x0d, 0xf6]),
    (AmpModel::Fender57Twin, 0xf6, [0x0e, 0x0e, 0x0e, 0x0e, 0xf9]),
    (AmpModel::SixtiesThrift, 0xf9, [0x0f, 0x0f, 0x0f, 0x0f, 0xfc]),
    (AmpModel::BritishWatts, 0xff, [0x11, 0x11, 0x11, 0x11, 0x00]),
    (AmpModel::BritishColour, 0xfc, [0x10, 0x10, 0x10, 0x10, 0xff]),
];

const CABINETS: &[(Cabinet, u8)] = &[
    (Cabinet::Off, 0x00),
    (Cabinet::Cab57Dlx, 0x01),
    (Cabinet::CabBssmn, 0x02),
    (Cabinet::Cab65Dlx, 0x03),
    (Cabinet::Cab65Prn, 0x04),
    (Cabinet::CabChamp, 0x05),
    (Cabinet::Cab4x12M, 0x06),
    (Cabinet::Cab2x12C, 0x07),
    (Cabinet::Cab4x12G, 0x08),
    (Cabinet::Cab65Twn, 0x09),
    (Cabinet::Cab4x12V, 0x0a),
    (Cabinet::CabSs212, 0x0b),
    (Cabinet::CabSs112, 0x0c),
];

const EFFECTS: &[(Effect, u16)] = &[
    (Effect::Overdrive, 0x3c),
    (Effect::Wah, 0x49),
    (Effect::TouchWah, 0x4a),
    (Effect::Fuzz, 0x1a),
    (Effect::FuzzTouchWah, 0x1c),
    (Effect::SimpleComp, 0x88),
    (Effect::Compressor, 0x07),
    (Effect::RangeBoost, 0x0103),
    (Effect::GreenBox, 0xba),
    (Effect::OrangeBox, 0x0110),
    (Effect::BlackBox, 0x0111),
    (Effect::BigFuzz, 0x010f),
    (Effect::SineChorus, 0x12),
    (Effect::TriangleChorus, 0x13),
    (Effect::SineFlanger, 0x18),
    (Effect::TriangleFlanger, 0x19),
    (Effect::Vibratone, 0x2d),
    (Effect::VintageTremolo, 0x40),
    (Effect::SineTremolo, 0x41),
    (Effect::RingModulator, 0x22),
    (Effect::StepFilter, 0x29),
    (Effect::Phaser, 0x4f),
    (Effect::PitchShifter, 0x1f),
    (Effect::MonoDelay, 0x16),
    (Effect::MonoEchoFilter, 0x43),
    (Effect::StereoEchoFilter, 0x48),
    (Effect::MultitapDelay, 0x44),
    (Effect::PingPongDelay, 0x45),
    (Effect::DuckingDelay, 0x15),
    (Effect::ReverseDelay, 0x46),
    (Effect::TapeDelay, 0x2b),
    (Effect::StereoTapeDelay, 0x2a),
    (Effect::SmallHallReverb, 0x24),
    (Effect::LargeHallReverb, 0x3a),
    (Effect::SmallRoomReverb, 0x26),
    (Effect::LargeRoomReverb, 0x3b),
    (Effect::SmallPlateReverb, 0x4e),
    (Effect::LargePlateReverb, 0x4b),
    (Effect::AmbientReverb, 0x4c),
    (Effect::ArenaReverb, 0x4d),
    (Effect::Fender63SpringReverb, 0x21),
    (Effect::Fender65SpringReverb, 0x0b),
];

/// Look up the amplifier model addressed by the given wire identifier.
pub fn lookup_amp_by_id(id: u8) -> AmpModel {
    AMP_MODELS
        .iter()
        .find(|(_, wire_id, _)| id.eq(wire_id))
        .map(|&(model, _, _)| model)
        .unwrap_or(AmpModel::Unknown)
}

/// Return the wire identifier and the five model specific bytes of the amplifier model.
pub fn amp_entry(model: AmpModel) -> Option<(u8, [u8; 5])> {
    AMP_MODELS
        .iter()
        .find(|(m, _, _)| model.eq(m))
        .map(|&(_, id, specific)| (id, specific))
}

/// Look up the cabinet model addressed by the given wire identifier.
pub fn lookup_cabinet_by_id(id: u8) -> Cabinet {
    CABINETS
        .iter()
        .find(|(_, wire_id)| id.eq(wire_id))
        .map(|&(cabinet, _)| cabinet)
        .unwrap_or(Cabinet::Unknown)
}

/// Return the wire identifier of the cabinet model. The unknown sentinel encodes as off.
pub fn cabinet_id(cabinet: Cabinet) -> u8 {
    CABINETS
        .iter()
        .find(|(c, _)| cabinet.eq(c))
        .map(|&(_, id)| id)
        .unwrap_or(0x00)
}

/// Look up the effect model addressed by the given wire identifier.
pub fn lookup_effect_by_id(id: u16) -> Effect {
    EFFECTS
        .iter()
        .find(|(_, wire_id)| id.eq(wire_id))
        .map(|&(effect, _)| effect)
        .unwrap_or(Effect::Empty)
}

/// Return the wire identifier of the effect model, or none for the empty slot.
pub fn effect_id(effect: Effect) -> Option<u16> {
    EFFECTS
        .iter()
        .find(|(e, _)| effect.eq(e))
        .map(|&(_, id)| id)
}
