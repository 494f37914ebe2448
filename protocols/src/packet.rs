// SPDX-License-Identifier: LGPL-3.0-or-later
// Copyright (c) 2024 Takashi Sakamoto

//! Codec for the 64 byte wire packet.
//!
//! Every exchange with the amplifier is a packet of exactly 64 bytes; a 16 byte header followed
//! by a 48 byte payload. Almost all fields are single bytes at fixed offsets, the effect model
//! identifier is the only multi byte field and is encoded as little endian.

use super::*;
use std::convert::TryFrom;

/// The fixed size of packet on the wire.
pub const PACKET_SIZE: usize = 64;

/// The size of header in the packet.
pub const HEADER_SIZE: usize = 16;

/// The maximum length of preset and effect bank names.
pub const NAME_LENGTH: usize = 24;

/// The raw layout of packet.
pub type PacketRaw = [u8; PACKET_SIZE];

const STAGE_OFFSET: usize = 0;
const TYPE_OFFSET: usize = 1;
const DSP_OFFSET: usize = 2;
const UNKNOWN0_OFFSET: usize = 3;
const SLOT_OFFSET: usize = 4;
const UNKNOWN1_OFFSET: usize = 6;
const UNKNOWN2_OFFSET: usize = 7;

/// Interpret a reply buffer as a raw packet. The length is required to match exactly.
pub fn packet_from_slice(data: &[u8]) -> Result<PacketRaw, ProtocolError> {
    PacketRaw::try_from(data).map_err(|_| ProtocolError::PacketSize {
        expected: PACKET_SIZE,
        found: data.len(),
    })
}

/// The enumeration to express stage of communication in which a packet is valid.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Stage {
    Init0,
    Init1,
    Ready,
    Unknown,
}

impl Stage {
    fn to_raw(self) -> u8 {
        match self {
            Self::Init0 => 0x00,
            Self::Init1 => 0x1a,
            Self::Ready => 0x1c,
            Self::Unknown => 0xff,
        }
    }
}

/// The enumeration to express type of packet.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PacketType {
    Operation,
    Data,
    Init0,
    Init1,
    Load,
}

impl PacketType {
    fn to_raw(self) -> u8 {
        match self {
            Self::Operation => 0x01,
            // The second initialization packet shares the wire byte with data packets.
            Self::Data | Self::Init1 => 0x03,
            Self::Init0 => 0xc3,
            Self::Load => 0xc1,
        }
    }
}

/// The enumeration to express DSP block addressed by a packet.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Dsp {
    None,
    Amp,
    UsbGain,
    Effect0,
    Effect1,
    Effect2,
    Effect3,
    OpSave,
    OpSelectMemBank,
    OpSaveEffectName,
}

impl Dsp {
    fn to_raw(self) -> u8 {
        match self {
            Self::None => 0x00,
            Self::OpSelectMemBank => 0x01,
            Self::OpSave => 0x03,
            Self::OpSaveEffectName => 0x04,
            Self::Amp => 0x05,
            Self::Effect0 => 0x06,
            Self::Effect1 => 0x07,
            Self::Effect2 => 0x08,
            Self::Effect3 => 0x09,
            Self::UsbGain => 0x0d,
        }
    }
}

impl From<EffectFamily> for Dsp {
    fn from(family: EffectFamily) -> Self {
        match family {
            EffectFamily::Stompbox => Self::Effect0,
            EffectFamily::Modulation => Self::Effect1,
            EffectFamily::Delay => Self::Effect2,
            EffectFamily::Reverb => Self::Effect3,
        }
    }
}

/// The header in the first 16 bytes of packet.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Header {
    pub stage: Stage,
    pub packet_type: PacketType,
    pub dsp: Dsp,
    pub slot: u8,
    pub unknown: [u8; 3],
}

impl Default for Header {
    fn default() -> Self {
        Self {
            stage: Stage::Ready,
            packet_type: PacketType::Data,
            dsp: Dsp::None,
            slot: 0,
            unknown: [0; 3],
        }
    }
}

impl Header {
    fn build(&self, raw: &mut PacketRaw) {
        raw[STAGE_OFFSET] = self.stage.to_raw();
        raw[TYPE_OFFSET] = self.packet_type.to_raw();
        raw[DSP_OFFSET] = self.dsp.to_raw();
        raw[UNKNOWN0_OFFSET] = self.unknown[0];
        raw[SLOT_OFFSET] = self.slot;
        raw[UNKNOWN1_OFFSET] = self.unknown[1];
        raw[UNKNOWN2_OFFSET] = self.unknown[2];
    }
}

/// The payload which carries a preset or effect bank name.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct NamePayload {
    pub name: String,
}

impl NamePayload {
    const OFFSET: usize = HEADER_SIZE;

    fn build(&self, raw: &mut PacketRaw) {
        self.name
            .bytes()
            .take(NAME_LENGTH)
            .enumerate()
            .for_each(|(i, b)| raw[Self::OFFSET + i] = b);
    }

    pub fn parse(raw: &PacketRaw) -> Self {
        let region = &raw[Self::OFFSET..(Self::OFFSET + NAME_LENGTH)];
        let length = region.iter().position(|&b| b == 0).unwrap_or(NAME_LENGTH);
        let name = String::from_utf8_lossy(&region[..length]).to_string();
        Self { name }
    }
}

/// The payload which carries parameters of amplifier block. The same layout doubles for the
/// packet which carries nothing but the USB gain, stored in the model cell.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub struct AmpPayload {
    pub model: u8,
    pub gain: u8,
    pub volume: u8,
    pub gain2: u8,
    pub master_volume: u8,
    pub treble: u8,
    pub middle: u8,
    pub bass: u8,
    pub presence: u8,
    pub depth: u8,
    pub bias: u8,
    pub noise_gate: u8,
    pub threshold: u8,
    pub cabinet: u8,
    pub sag: u8,
    pub brightness: u8,
    pub amp_specific: [u8; 5],
    pub unknown: [u8; 3],
}

impl AmpPayload {
    const MODEL_OFFSET: usize = 16;
    const GAIN_OFFSET: usize = 32;
    const VOLUME_OFFSET: usize = 33;
    const GAIN2_OFFSET: usize = 34;
    const MASTER_VOLUME_OFFSET: usize = 35;
    const TREBLE_OFFSET: usize = 36;
    const MIDDLE_OFFSET: usize = 37;
    const BASS_OFFSET: usize = 38;
    const PRESENCE_OFFSET: usize = 39;
    const DEPTH_OFFSET: usize = 41;
    const BIAS_OFFSET: usize = 42;
    const NOISE_GATE_OFFSET: usize = 47;
    const THRESHOLD_OFFSET: usize = 48;
    const CABINET_OFFSET: usize = 49;
    const SAG_OFFSET: usize = 51;
    const BRIGHTNESS_OFFSET: usize = 52;

    fn build(&self, raw: &mut PacketRaw) {
        raw[Self::MODEL_OFFSET] = self.model;
        raw[Self::GAIN_OFFSET] = self.gain;
        raw[Self::VOLUME_OFFSET] = self.volume;
        raw[Self::GAIN2_OFFSET] = self.gain2;
        raw[Self::MASTER_VOLUME_OFFSET] = self.master_volume;
        raw[Self::TREBLE_OFFSET] = self.treble;
        raw[Self::MIDDLE_OFFSET] = self.middle;
        raw[Self::BASS_OFFSET] = self.bass;
        raw[Self::PRESENCE_OFFSET] = self.presence;
        raw[Self::DEPTH_OFFSET] = self.depth;
        raw[Self::BIAS_OFFSET] = self.bias;
        raw[Self::NOISE_GATE_OFFSET] = self.noise_gate;
        raw[Self::THRESHOLD_OFFSET] = self.threshold;
        raw[Self::CABINET_OFFSET] = self.cabinet;
        raw[Self::SAG_OFFSET] = self.sag;
        raw[Self::BRIGHTNESS_OFFSET] = self.brightness;
        // Bytes 43 and 50 repeat the neighbouring value in captures of vendor traffic.
        raw[40] = self.amp_specific[0];
        raw[43] = self.amp_specific[0];
        raw[44] = self.amp_specific[1];
        raw[45] = self.amp_specific[2];
        raw[46] = self.amp_specific[3];
        raw[50] = self.amp_specific[3];
        raw[54] = self.amp_specific[4];
        raw[53] = self.unknown[0];
        raw[55] = self.unknown[1];
        raw[56] = self.unknown[2];
    }

    pub fn parse(raw: &PacketRaw) -> Self {
        Self {
            model: raw[Self::MODEL_OFFSET],
            gain: raw[Self::GAIN_OFFSET],
            volume: raw[Self::VOLUME_OFFSET],
            gain2: raw[Self::GAIN2_OFFSET],
            master_volume: raw[Self::MASTER_VOLUME_OFFSET],
            treble: raw[Self::TREBLE_OFFSET],
            middle: raw[Self::MIDDLE_OFFSET],
            bass: raw[Self::BASS_OFFSET],
            presence: raw[Self::PRESENCE_OFFSET],
            depth: raw[Self::DEPTH_OFFSET],
            bias: raw[Self::BIAS_OFFSET],
            noise_gate: raw[Self::NOISE_GATE_OFFSET],
            threshold: raw[Self::THRESHOLD_OFFSET],
            cabinet: raw[Self::CABINET_OFFSET],
            sag: raw[Self::SAG_OFFSET],
            brightness: raw[Self::BRIGHTNESS_OFFSET],
            amp_specific: [raw[40], raw[44], raw[45], raw[46], raw[54]],
            unknown: [raw[53], raw[55], raw[56]],
        }
    }
}

/// The payload which carries parameters of one effect pedal slot.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub struct EffectPayload {
    pub model: u16,
    pub slot: u8,
    pub knob1: u8,
    pub knob2: u8,
    pub knob3: u8,
    pub knob4: u8,
    pub knob5: u8,
    pub knob6: u8,
    pub unknown: [u8; 3],
}

impl EffectPayload {
    const MODEL_OFFSET: usize = 16;
    const SLOT_OFFSET: usize = 18;
    const UNKNOWN_OFFSET: usize = 19;
    const KNOB_OFFSET: usize = 32;

    fn build(&self, raw: &mut PacketRaw) {
        raw[Self::MODEL_OFFSET..(Self::MODEL_OFFSET + 2)].copy_from_slice(&self.model.to_le_bytes());
        raw[Self::SLOT_OFFSET] = self.slot;
        raw[Self::UNKNOWN_OFFSET] = self.unknown[0];
        raw[Self::UNKNOWN_OFFSET + 1] = self.unknown[1];
        raw[Self::UNKNOWN_OFFSET + 2] = self.unknown[2];
        raw[Self::KNOB_OFFSET] = self.knob1;
        raw[Self::KNOB_OFFSET + 1] = self.knob2;
        raw[Self::KNOB_OFFSET + 2] = self.knob3;
        raw[Self::KNOB_OFFSET + 3] = self.knob4;
        raw[Self::KNOB_OFFSET + 4] = self.knob5;
        raw[Self::KNOB_OFFSET + 5] = self.knob6;
    }

    pub fn parse(raw: &PacketRaw) -> Self {
        Self {
            model: u16::from_le_bytes([raw[Self::MODEL_OFFSET], raw[Self::MODEL_OFFSET + 1]]),
            slot: raw[Self::SLOT_OFFSET],
            knob1: raw[Self::KNOB_OFFSET],
            knob2: raw[Self::KNOB_OFFSET + 1],
            knob3: raw[Self::KNOB_OFFSET + 2],
            knob4: raw[Self::KNOB_OFFSET + 3],
            knob5: raw[Self::KNOB_OFFSET + 4],
            knob6: raw[Self::KNOB_OFFSET + 5],
            unknown: [
                raw[Self::UNKNOWN_OFFSET],
                raw[Self::UNKNOWN_OFFSET + 1],
                raw[Self::UNKNOWN_OFFSET + 2],
            ],
        }
    }
}

/// The closed set of payload variants. The variant in use is implied by the DSP block and type
/// fields of the header.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Payload {
    Empty,
    Name(NamePayload),
    Amp(AmpPayload),
    Effect(EffectPayload),
}

impl Default for Payload {
    fn default() -> Self {
        Self::Empty
    }
}

/// One packet ready for encoding.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Packet {
    pub header: Header,
    pub payload: Payload,
}

impl Packet {
    pub fn to_bytes(&self) -> PacketRaw {
        let mut raw = [0; PACKET_SIZE];
        self.header.build(&mut raw);
        match &self.payload {
            Payload::Empty => (),
            Payload::Name(payload) => payload.build(&mut raw),
            Payload::Amp(payload) => payload.build(&mut raw),
            Payload::Effect(payload) => payload.build(&mut raw),
        }
        raw
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn packet_size_is_enforced() {
        assert!(packet_from_slice(&[0; PACKET_SIZE]).is_ok());

        [0, 1, 16, 63, 65, 128].iter().for_each(|&len| {
            let err = packet_from_slice(&vec![0; len]).unwrap_err();
            assert_eq!(
                err,
                ProtocolError::PacketSize {
                    expected: PACKET_SIZE,
                    found: len
                }
            );
        });
    }

    #[test]
    fn header_field_offsets() {
        let header = Header {
            stage: Stage::Ready,
            packet_type: PacketType::Operation,
            dsp: Dsp::OpSelectMemBank,
            slot: 0x21,
            unknown: [0xa0, 0xa1, 0xa2],
        };
        let raw = Packet {
            header,
            payload: Payload::Empty,
        }
        .to_bytes();

        assert_eq!(raw[0], 0x1c);
        assert_eq!(raw[1], 0x01);
        assert_eq!(raw[2], 0x01);
        assert_eq!(raw[3], 0xa0);
        assert_eq!(raw[4], 0x21);
        assert_eq!(raw[6], 0xa1);
        assert_eq!(raw[7], 0xa2);
        assert!(raw[HEADER_SIZE..].iter().all(|&b| b == 0));
    }

    #[test]
    fn name_payload_rounds_trip_and_truncates() {
        let payload = NamePayload {
            name: "Surf Green".to_string(),
        };
        let mut raw = [0; PACKET_SIZE];
        payload.build(&mut raw);
        assert_eq!(NamePayload::parse(&raw), payload);

        let long = NamePayload {
            name: "A name well beyond the twenty-four byte limit".to_string(),
        };
        let mut raw = [0; PACKET_SIZE];
        long.build(&mut raw);
        assert_eq!(NamePayload::parse(&raw).name.len(), NAME_LENGTH);
    }

    #[test]
    fn effect_payload_wide_model_is_little_endian() {
        let payload = EffectPayload {
            model: 0x0110,
            ..Default::default()
        };
        let mut raw = [0; PACKET_SIZE];
        payload.build(&mut raw);
        assert_eq!(raw[16], 0x10);
        assert_eq!(raw[17], 0x01);
        assert_eq!(EffectPayload::parse(&raw).model, 0x0110);
    }
}
