// SPDX-License-Identifier: LGPL-3.0-or-later
// Copyright (c) 2024 Takashi Sakamoto

//! Serialization of control commands and deserialization of replies.
//!
//! The module is the single source of truth for the byte patterns the amplifier firmware
//! expects. Several cells of header and payload have no documented meaning, yet their values
//! depend on the amplifier model, the effect family, and the kind of operation; they were
//! recovered from captures of the vendor application and are kept verbatim.

use super::{ids, packet::*, *};

fn clamp_to(value: u8, upper_bound: u8) -> u8 {
    value.min(upper_bound)
}

/// The protocol byte which identifies the effect family in apply and save commands.
fn fx_knob(effect: &EffectSettings) -> u8 {
    match effect.effect.family() {
        Some(EffectFamily::Modulation) | Some(EffectFamily::Delay) | Some(EffectFamily::Reverb) => {
            0x01
        }
        _ => 0x02,
    }
}

fn wire_slot(effect: &EffectSettings) -> u8 {
    // Slots in the effects loop are shifted up by four on the wire.
    const FX_LOOP_OFFSET: u8 = 4;

    match effect.position {
        Position::EffectsLoop => effect.fx_slot + FX_LOOP_OFFSET,
        Position::Input => effect.fx_slot,
    }
}

fn has_extra_knob(effect: Effect) -> bool {
    matches!(
        effect,
        Effect::MonoEchoFilter
            | Effect::StereoEchoFilter
            | Effect::TapeDelay
            | Effect::StereoTapeDelay
    )
}

/// The count of effect packets stored by one save operation.
fn save_repeats(effects: &[EffectSettings]) -> Result<usize, ProtocolError> {
    if effects.is_empty() {
        Err(ProtocolError::EmptyBank)
    } else if effects.len() > 2 {
        Ok(1)
    } else {
        Ok(effects.len())
    }
}

fn check_bank_effects(effects: &[EffectSettings]) -> Result<(), ProtocolError> {
    effects.iter().try_for_each(|e| match e.effect.family() {
        Some(EffectFamily::Modulation) | Some(EffectFamily::Delay) | Some(EffectFamily::Reverb) => {
            Ok(())
        }
        _ => Err(ProtocolError::InvalidBankEffect(e.effect)),
    })
}

/// Build the pair of handshake packets which bring the amplifier into its ready stage.
pub fn serialize_init_command() -> [Packet; 2] {
    let first = Packet {
        header: Header {
            stage: Stage::Init0,
            packet_type: PacketType::Init0,
            dsp: Dsp::None,
            ..Default::default()
        },
        payload: Payload::Empty,
    };
    let second = Packet {
        header: Header {
            stage: Stage::Init1,
            packet_type: PacketType::Init1,
            dsp: Dsp::None,
            ..Default::default()
        },
        payload: Payload::Empty,
    };
    [first, second]
}

/// Build the command which makes the amplifier dump all of its presets.
pub fn serialize_load_command() -> Packet {
    Packet {
        header: Header {
            stage: Stage::Unknown,
            packet_type: PacketType::Load,
            dsp: Dsp::None,
            ..Default::default()
        },
        payload: Payload::Empty,
    }
}

/// Build the command which recalls the preset in the given slot.
pub fn serialize_load_slot_command(slot: u8) -> Packet {
    Packet {
        header: Header {
            stage: Stage::Ready,
            packet_type: PacketType::Operation,
            dsp: Dsp::OpSelectMemBank,
            slot,
            unknown: [0x00, 0x01, 0x00],
        },
        payload: Payload::Empty,
    }
}

/// Build the command which applies the previously transferred configuration. When bound to an
/// effect the command carries the family byte of the effect.
pub fn serialize_apply_command(effect: Option<&EffectSettings>) -> Packet {
    let unknown = match effect {
        Some(e) => [fx_knob(e), 0x00, 0x00],
        None => [0x00; 3],
    };
    Packet {
        header: Header {
            stage: Stage::Ready,
            packet_type: PacketType::Data,
            dsp: Dsp::None,
            unknown,
            ..Default::default()
        },
        payload: Payload::Empty,
    }
}

/// Build the command which clears the currently addressed effect slot.
pub fn serialize_clear_effect_settings() -> Packet {
    Packet {
        header: Header {
            stage: Stage::Ready,
            packet_type: PacketType::Data,
            dsp: Dsp::None,
            unknown: [0x00, 0x01, 0x01],
            ..Default::default()
        },
        payload: Payload::Effect(EffectPayload {
            unknown: [0x00, 0x08, 0x01],
            ..Default::default()
        }),
    }
}

/// Build the command which stores a preset name into the given slot.
pub fn serialize_name(slot: u8, name: &str) -> Packet {
    Packet {
        header: Header {
            stage: Stage::Ready,
            packet_type: PacketType::Operation,
            dsp: Dsp::OpSave,
            slot,
            unknown: [0x00, 0x01, 0x01],
        },
        payload: Payload::Name(NamePayload {
            name: name.chars().take(NAME_LENGTH).collect(),
        }),
    }
}

/// Build the command which configures the amplifier block.
pub fn serialize_amp_settings(settings: &AmpSettings) -> Packet {
    let mut header = Header {
        stage: Stage::Ready,
        packet_type: PacketType::Data,
        dsp: Dsp::Amp,
        unknown: [0x00, 0x01, 0x01],
        ..Default::default()
    };
    if settings.amp == AmpModel::Fender65DeluxeReverb {
        header.unknown = [0x00, 0x00, 0x01];
    }

    let (model, amp_specific) = ids::amp_entry(settings.amp).unwrap_or((0x00, [0; 5]));

    // Threshold and depth are honored at the highest step of the noise gate only.
    let (threshold, depth) = if settings.noise_gate == 0x05 {
        (clamp_to(settings.threshold, 0x09), settings.depth)
    } else {
        (0x00, 0x80)
    };

    let payload = AmpPayload {
        model,
        gain: settings.gain,
        volume: settings.volume,
        gain2: settings.gain2,
        master_volume: settings.master_volume,
        treble: settings.treble,
        middle: settings.middle,
        bass: settings.bass,
        presence: settings.presence,
        depth,
        bias: settings.bias,
        noise_gate: clamp_to(settings.noise_gate, 0x05),
        threshold,
        cabinet: ids::cabinet_id(settings.cabinet),
        sag: clamp_to(settings.sag, 0x02),
        brightness: settings.brightness as u8,
        amp_specific,
        unknown: [0x80, 0x80, 0x01],
    };

    Packet {
        header,
        payload: Payload::Amp(payload),
    }
}

/// Build the twin of the amplifier command which carries nothing but the USB gain.
pub fn serialize_amp_settings_usb_gain(settings: &AmpSettings) -> Packet {
    Packet {
        header: Header {
            stage: Stage::Ready,
            packet_type: PacketType::Data,
            dsp: Dsp::UsbGain,
            unknown: [0x00, 0x01, 0x01],
            ..Default::default()
        },
        payload: Payload::Amp(AmpPayload {
            model: settings.usb_gain,
            ..Default::default()
        }),
    }
}

/// Build the command which configures one effect pedal slot. The empty slot has no wire
/// representation; clear the slot instead.
pub fn serialize_effect_settings(settings: &EffectSettings) -> Result<Packet, ProtocolError> {
    let family = settings
        .effect
        .family()
        .ok_or(ProtocolError::EmptyEffect)?;
    let model = ids::effect_id(settings.effect).ok_or(ProtocolError::EmptyEffect)?;

    let header = Header {
        stage: Stage::Ready,
        packet_type: PacketType::Data,
        dsp: Dsp::from(family),
        unknown: [0x00, 0x01, 0x01],
        ..Default::default()
    };

    let mut payload = EffectPayload {
        model,
        slot: wire_slot(settings),
        knob1: settings.knob1,
        knob2: settings.knob2,
        knob3: settings.knob3,
        knob4: settings.knob4,
        knob5: settings.knob5,
        knob6: if has_extra_knob(settings.effect) {
            settings.knob6
        } else {
            0x00
        },
        unknown: [0x00, 0x08, 0x01],
    };

    match family {
        EffectFamily::Modulation => payload.unknown = [0x01, 0x01, 0x01],
        EffectFamily::Delay => payload.unknown = [0x02, 0x01, 0x01],
        _ => (),
    }

    match settings.effect {
        Effect::Wah | Effect::TouchWah => payload.unknown = [0x01, 0x08, 0x01],
        Effect::SimpleComp => {
            payload.unknown = [0x08, 0x08, 0x01];
            payload.knob1 = clamp_to(settings.knob1, 0x03);
            payload.knob2 = 0x00;
            payload.knob3 = 0x00;
            payload.knob4 = 0x00;
            payload.knob5 = 0x00;
        }
        Effect::RingModulator => {
            payload.unknown = [0x01, 0x08, 0x01];
            payload.knob4 = clamp_to(settings.knob4, 0x01);
        }
        Effect::PitchShifter => payload.unknown = [0x01, 0x08, 0x01],
        Effect::Phaser => payload.knob5 = clamp_to(settings.knob5, 0x01),
        Effect::MultitapDelay => payload.knob5 = clamp_to(settings.knob5, 0x03),
        _ => (),
    }

    Ok(Packet {
        header,
        payload: Payload::Effect(payload),
    })
}

/// Build the command which stores the name of an effect bank. Solely effects of the
/// modulation, delay, and reverb families are storable.
pub fn serialize_save_effect_name(
    slot: u8,
    name: &str,
    effects: &[EffectSettings],
) -> Result<Packet, ProtocolError> {
    let repeat = save_repeats(effects)?;
    check_bank_effects(&effects[..repeat])?;

    Ok(Packet {
        header: Header {
            stage: Stage::Ready,
            packet_type: PacketType::Operation,
            dsp: Dsp::OpSaveEffectName,
            slot,
            unknown: [fx_knob(&effects[0]), 0x01, 0x01],
        },
        payload: Payload::Name(NamePayload {
            name: name.chars().take(NAME_LENGTH).collect(),
        }),
    })
}

/// Build the commands which store the effects of an effect bank into the given slot.
pub fn serialize_save_effect_packets(
    slot: u8,
    effects: &[EffectSettings],
) -> Result<Vec<Packet>, ProtocolError> {
    let repeat = save_repeats(effects)?;
    check_bank_effects(&effects[..repeat])?;
    let knob = fx_knob(&effects[0]);

    effects[..repeat]
        .iter()
        .map(|e| {
            serialize_effect_settings(e).map(|mut packet| {
                packet.header.slot = slot;
                packet.header.unknown = [knob, 0x00, 0x01];
                packet
            })
        })
        .collect()
}

/// Build the command which switches tuner mode. The bytes are a fixed template recovered from
/// captures; the packet follows none of the regular header conventions.
pub fn serialize_tuner_command(on: bool) -> PacketRaw {
    let state = if on { 0x01 } else { 0x00 };
    let mut raw = [0; PACKET_SIZE];
    raw[0] = 0x0a;
    raw[1] = 0x01;
    raw[2] = state;
    raw[3] = state;
    raw[4] = state;
    raw
}

/// Decode the preset or effect bank name carried by a reply.
pub fn decode_name_from_data(data: &PacketRaw) -> String {
    NamePayload::parse(data).name
}

/// Decode the amplifier configuration carried by a pair of replies; the amplifier packet and
/// its USB gain twin.
pub fn decode_amp_from_data(data: &PacketRaw, usb_gain_data: &PacketRaw) -> AmpSettings {
    let payload = AmpPayload::parse(data);

    AmpSettings {
        amp: ids::lookup_amp_by_id(payload.model),
        gain: payload.gain,
        volume: payload.volume,
        treble: payload.treble,
        middle: payload.middle,
        bass: payload.bass,
        cabinet: ids::lookup_cabinet_by_id(payload.cabinet),
        noise_gate: payload.noise_gate,
        master_volume: payload.master_volume,
        gain2: payload.gain2,
        presence: payload.presence,
        threshold: payload.threshold,
        depth: payload.depth,
        bias: payload.bias,
        sag: payload.sag,
        brightness: payload.brightness > 0,
        usb_gain: AmpPayload::parse(usb_gain_data).model,
    }
}

/// Decode the four effect pedal slots carried by four replies. Slots above three sit in the
/// effects loop.
pub fn decode_effects_from_data(data: &[PacketRaw; 4]) -> [EffectSettings; 4] {
    let mut effects = [EffectSettings::default(); 4];

    data.iter().for_each(|raw| {
        let payload = EffectPayload::parse(raw);
        let slot = (payload.slot % 4) as usize;
        effects[slot] = EffectSettings {
            fx_slot: slot as u8,
            effect: ids::lookup_effect_by_id(payload.model),
            position: if payload.slot > 0x03 {
                Position::EffectsLoop
            } else {
                Position::Input
            },
            knob1: payload.knob1,
            knob2: payload.knob2,
            knob3: payload.knob3,
            knob4: payload.knob4,
            knob5: payload.knob5,
            knob6: payload.knob6,
        };
    });

    effects
}

/// Decode the list of preset names out of a full dump. Name frames sit at even indices; the
/// count of frames reserved for the catalog depends on the generation of hardware.
pub fn decode_preset_list_from_data(data: &[PacketRaw]) -> Vec<String> {
    let cutoff = data.len().min(if data.len() > 143 { 200 } else { 48 });

    (0..cutoff)
        .step_by(2)
        .map(|i| NamePayload::parse(&data[i]).name)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn effect_settings(effect: Effect) -> EffectSettings {
        EffectSettings {
            fx_slot: 2,
            effect,
            position: Position::Input,
            knob1: 1,
            knob2: 2,
            knob3: 3,
            knob4: 1,
            knob5: 1,
            knob6: 6,
        }
    }

    #[test]
    fn every_command_is_packet_sized() {
        let amp = AmpSettings::default();
        let effect = effect_settings(Effect::Overdrive);

        assert_eq!(serialize_load_command().to_bytes().len(), PACKET_SIZE);
        assert_eq!(serialize_load_slot_command(3).to_bytes().len(), PACKET_SIZE);
        assert_eq!(serialize_apply_command(None).to_bytes().len(), PACKET_SIZE);
        assert_eq!(serialize_name(0, "abc").to_bytes().len(), PACKET_SIZE);
        assert_eq!(serialize_amp_settings(&amp).to_bytes().len(), PACKET_SIZE);
        assert_eq!(
            serialize_effect_settings(&effect).unwrap().to_bytes().len(),
            PACKET_SIZE
        );
        assert_eq!(serialize_tuner_command(true).len(), PACKET_SIZE);
        serialize_init_command().iter().for_each(|packet| {
            assert_eq!(packet.to_bytes().len(), PACKET_SIZE);
        });
    }

    #[test]
    fn init_command_headers() {
        let [first, second] = serialize_init_command();
        let raw = first.to_bytes();
        assert_eq!(&raw[..3], &[0x00, 0xc3, 0x00]);
        assert!(raw[3..].iter().all(|&b| b == 0));

        let raw = second.to_bytes();
        assert_eq!(&raw[..3], &[0x1a, 0x03, 0x00]);
        assert!(raw[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn load_command_header() {
        let raw = serialize_load_command().to_bytes();
        assert_eq!(&raw[..3], &[0xff, 0xc1, 0x00]);
        assert!(raw[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn load_slot_command_header() {
        let raw = serialize_load_slot_command(17).to_bytes();
        assert_eq!(&raw[..8], &[0x1c, 0x01, 0x01, 0x00, 17, 0x00, 0x01, 0x00]);
        assert!(raw[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn apply_command_carries_family_byte_when_bound() {
        let raw = serialize_apply_command(None).to_bytes();
        assert_eq!(&raw[..3], &[0x1c, 0x03, 0x00]);
        assert_eq!(raw[3], 0x00);

        let modulation = effect_settings(Effect::SineChorus);
        let raw = serialize_apply_command(Some(&modulation)).to_bytes();
        assert_eq!(raw[3], 0x01);

        let stompbox = effect_settings(Effect::Overdrive);
        let raw = serialize_apply_command(Some(&stompbox)).to_bytes();
        assert_eq!(raw[3], 0x02);

        let reverb = effect_settings(Effect::ArenaReverb);
        let raw = serialize_apply_command(Some(&reverb)).to_bytes();
        assert_eq!(raw[3], 0x01);
    }

    #[test]
    fn clear_effect_command_bytes() {
        let raw = serialize_clear_effect_settings().to_bytes();
        assert_eq!(&raw[..8], &[0x1c, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01]);
        assert_eq!(&raw[19..22], &[0x00, 0x08, 0x01]);
    }

    #[test]
    fn name_command_rounds_trip_with_truncation() {
        let raw = serialize_name(5, "Clean").to_bytes();
        assert_eq!(&raw[..8], &[0x1c, 0x01, 0x03, 0x00, 5, 0x00, 0x01, 0x01]);
        assert_eq!(decode_name_from_data(&raw), "Clean");

        let long = "Overdriven lead with much too long a name";
        let raw = serialize_name(0, long).to_bytes();
        let decoded = decode_name_from_data(&raw);
        assert_eq!(decoded.len(), NAME_LENGTH);
        assert!(long.starts_with(&decoded));
    }

    #[test]
    fn amp_settings_for_65_deluxe_reverb() {
        let settings = AmpSettings {
            amp: AmpModel::Fender65DeluxeReverb,
            gain: 0x44,
            volume: 0x55,
            usb_gain: 0x10,
            ..Default::default()
        };
        let raw = serialize_amp_settings(&settings).to_bytes();

        assert_eq!(&raw[..3], &[0x1c, 0x03, 0x05]);
        // The model overrides the regular header triple.
        assert_eq!((raw[3], raw[6], raw[7]), (0x00, 0x00, 0x01));
        assert_eq!(raw[16], 0x53);
        assert_eq!(raw[40], 0x03);
        assert_eq!(raw[43], 0x03);
        assert_eq!(&raw[44..47], &[0x03, 0x03, 0x03]);
        assert_eq!(raw[50], 0x03);
        assert_eq!(raw[54], 0x6a);

        let raw = serialize_amp_settings_usb_gain(&settings).to_bytes();
        assert_eq!(&raw[..3], &[0x1c, 0x03, 0x0d]);
        assert_eq!((raw[3], raw[6], raw[7]), (0x00, 0x01, 0x01));
        assert_eq!(raw[16], 0x10);
    }

    #[test]
    fn amp_settings_keep_regular_header_for_other_models() {
        let settings = AmpSettings {
            amp: AmpModel::Metal2000,
            ..Default::default()
        };
        let raw = serialize_amp_settings(&settings).to_bytes();
        assert_eq!((raw[3], raw[6], raw[7]), (0x00, 0x01, 0x01));
        assert_eq!(raw[16], 0x6d);
        assert_eq!(raw[54], 0x75);
    }

    #[test]
    fn amp_settings_clamp_noise_gate_sag_and_threshold() {
        let settings = AmpSettings {
            amp: AmpModel::Fender57Deluxe,
            noise_gate: 0x30,
            sag: 0x14,
            threshold: 0x22,
            depth: 0x66,
            ..Default::default()
        };
        let raw = serialize_amp_settings(&settings).to_bytes();
        assert_eq!(raw[47], 0x05);
        assert_eq!(raw[51], 0x02);
        // The gate was clamped rather than at its highest step, so depth falls back.
        assert_eq!(raw[48], 0x00);
        assert_eq!(raw[41], 0x80);

        let settings = AmpSettings {
            noise_gate: 0x05,
            threshold: 0x22,
            depth: 0x66,
            ..settings
        };
        let raw = serialize_amp_settings(&settings).to_bytes();
        assert_eq!(raw[47], 0x05);
        assert_eq!(raw[48], 0x09);
        assert_eq!(raw[41], 0x66);
    }

    #[test]
    fn amp_settings_round_trip() {
        let models = [
            AmpModel::Fender57Deluxe,
            AmpModel::Fender59Bassman,
            AmpModel::Fender57Champ,
            AmpModel::Fender65DeluxeReverb,
            AmpModel::Fender65Princeton,
            AmpModel::Fender65TwinReverb,
            AmpModel::FenderSuperSonic,
            AmpModel::British60s,
            AmpModel::British70s,
            AmpModel::British80s,
            AmpModel::American90s,
            AmpModel::Metal2000,
            AmpModel::StudioPreamp,
            AmpModel::Fender57Twin,
            AmpModel::SixtiesThrift,
            AmpModel::BritishWatts,
            AmpModel::BritishColour,
        ];

        models.iter().for_each(|&amp| {
            let settings = AmpSettings {
                amp,
                gain: 0x11,
                volume: 0x22,
                treble: 0x33,
                middle: 0x44,
                bass: 0x55,
                cabinet: Cabinet::Cab2x12C,
                noise_gate: 0x05,
                master_volume: 0x66,
                gain2: 0x77,
                presence: 0x88,
                threshold: 0x07,
                depth: 0x99,
                bias: 0xaa,
                sag: 0x01,
                brightness: true,
                usb_gain: 0x42,
            };
            let data = serialize_amp_settings(&settings).to_bytes();
            let usb_gain_data = serialize_amp_settings_usb_gain(&settings).to_bytes();
            assert_eq!(decode_amp_from_data(&data, &usb_gain_data), settings);
        });
    }

    #[test]
    fn effect_settings_reject_the_empty_slot() {
        let empty = EffectSettings::default();
        assert_eq!(
            serialize_effect_settings(&empty).unwrap_err(),
            ProtocolError::EmptyEffect
        );
    }

    #[test]
    fn effect_settings_dsp_block_follows_family() {
        [
            (Effect::Overdrive, 0x06, 0x3c),
            (Effect::SineChorus, 0x07, 0x12),
            (Effect::MonoDelay, 0x08, 0x16),
            (Effect::ArenaReverb, 0x09, 0x4d),
        ]
        .iter()
        .for_each(|&(effect, dsp, model)| {
            let raw = serialize_effect_settings(&effect_settings(effect))
                .unwrap()
                .to_bytes();
            assert_eq!(raw[2], dsp);
            assert_eq!(raw[16], model);
            assert_eq!((raw[3], raw[6], raw[7]), (0x00, 0x01, 0x01));
        });
    }

    #[test]
    fn effect_settings_payload_triples() {
        [
            (Effect::Overdrive, [0x00, 0x08, 0x01]),
            (Effect::Wah, [0x01, 0x08, 0x01]),
            (Effect::TouchWah, [0x01, 0x08, 0x01]),
            (Effect::SimpleComp, [0x08, 0x08, 0x01]),
            (Effect::RangeBoost, [0x00, 0x08, 0x01]),
            (Effect::GreenBox, [0x00, 0x08, 0x01]),
            (Effect::OrangeBox, [0x00, 0x08, 0x01]),
            (Effect::BlackBox, [0x00, 0x08, 0x01]),
            (Effect::BigFuzz, [0x00, 0x08, 0x01]),
            (Effect::SineChorus, [0x01, 0x01, 0x01]),
            (Effect::RingModulator, [0x01, 0x08, 0x01]),
            (Effect::PitchShifter, [0x01, 0x08, 0x01]),
            (Effect::StepFilter, [0x01, 0x01, 0x01]),
            (Effect::MonoDelay, [0x02, 0x01, 0x01]),
            (Effect::TapeDelay, [0x02, 0x01, 0x01]),
            (Effect::SmallHallReverb, [0x00, 0x08, 0x01]),
        ]
        .iter()
        .for_each(|&(effect, triple)| {
            let raw = serialize_effect_settings(&effect_settings(effect))
                .unwrap()
                .to_bytes();
            assert_eq!(&raw[19..22], &triple, "wrong triple for {}", effect);
        });
    }

    #[test]
    fn effect_settings_clamp_particular_knobs() {
        let mut settings = effect_settings(Effect::SimpleComp);
        settings.knob1 = 0x10;
        let raw = serialize_effect_settings(&settings).unwrap().to_bytes();
        assert_eq!(raw[32], 0x03);
        assert_eq!(&raw[33..37], &[0x00; 4]);

        let mut settings = effect_settings(Effect::RingModulator);
        settings.knob4 = 0x09;
        let raw = serialize_effect_settings(&settings).unwrap().to_bytes();
        assert_eq!(raw[35], 0x01);

        let mut settings = effect_settings(Effect::MultitapDelay);
        settings.knob5 = 0x09;
        let raw = serialize_effect_settings(&settings).unwrap().to_bytes();
        assert_eq!(raw[36], 0x03);

        let mut settings = effect_settings(Effect::Phaser);
        settings.knob5 = 0x09;
        let raw = serialize_effect_settings(&settings).unwrap().to_bytes();
        assert_eq!(raw[36], 0x01);
    }

    #[test]
    fn effect_settings_slot_offset_in_effects_loop() {
        let mut settings = effect_settings(Effect::Overdrive);
        settings.fx_slot = 1;
        settings.position = Position::Input;
        let raw = serialize_effect_settings(&settings).unwrap().to_bytes();
        assert_eq!(raw[18], 1);

        settings.position = Position::EffectsLoop;
        let raw = serialize_effect_settings(&settings).unwrap().to_bytes();
        assert_eq!(raw[18], 5);
    }

    #[test]
    fn effect_settings_extra_knob_set() {
        [
            (Effect::MonoEchoFilter, 6),
            (Effect::StereoEchoFilter, 6),
            (Effect::TapeDelay, 6),
            (Effect::StereoTapeDelay, 6),
            (Effect::MonoDelay, 0),
            (Effect::Overdrive, 0),
            (Effect::SineChorus, 0),
            (Effect::ArenaReverb, 0),
        ]
        .iter()
        .for_each(|&(effect, expected)| {
            let raw = serialize_effect_settings(&effect_settings(effect))
                .unwrap()
                .to_bytes();
            assert_eq!(raw[37], expected, "wrong sixth knob for {}", effect);
        });
    }

    #[test]
    fn effect_settings_round_trip() {
        let catalog = [
            Effect::Overdrive,
            Effect::Fuzz,
            Effect::SineChorus,
            Effect::StereoTapeDelay,
        ];
        let mut data = [[0; PACKET_SIZE]; 4];

        let mut expected = [EffectSettings::default(); 4];
        catalog.iter().enumerate().for_each(|(i, &effect)| {
            let settings = EffectSettings {
                fx_slot: i as u8,
                effect,
                position: if i % 2 > 0 {
                    Position::EffectsLoop
                } else {
                    Position::Input
                },
                knob1: 1,
                knob2: 2,
                knob3: 3,
                knob4: 1,
                knob5: 1,
                knob6: if has_extra_knob(effect) { 6 } else { 0 },
            };
            data[i] = serialize_effect_settings(&settings).unwrap().to_bytes();
            expected[i] = settings;
        });

        assert_eq!(decode_effects_from_data(&data), expected);
    }

    #[test]
    fn save_effect_name_validates_the_bank() {
        let valid = [
            effect_settings(Effect::SineChorus),
            effect_settings(Effect::StereoTapeDelay),
        ];
        let raw = serialize_save_effect_name(1, "MyFx", &valid)
            .unwrap()
            .to_bytes();
        assert_eq!(&raw[..8], &[0x1c, 0x01, 0x04, 0x01, 1, 0x00, 0x01, 0x01]);
        assert_eq!(decode_name_from_data(&raw), "MyFx");

        let invalid = [
            effect_settings(Effect::Overdrive),
            effect_settings(Effect::SineChorus),
        ];
        assert_eq!(
            serialize_save_effect_name(1, "MyFx", &invalid).unwrap_err(),
            ProtocolError::InvalidBankEffect(Effect::Overdrive)
        );

        assert_eq!(
            serialize_save_effect_name(1, "MyFx", &[]).unwrap_err(),
            ProtocolError::EmptyBank
        );
    }

    #[test]
    fn save_effect_packets_carry_slot_and_family_byte() {
        let bank = [
            effect_settings(Effect::SineChorus),
            effect_settings(Effect::StereoTapeDelay),
        ];
        let packets = serialize_save_effect_packets(1, &bank).unwrap();
        assert_eq!(packets.len(), 2);

        packets.iter().for_each(|packet| {
            let raw = packet.to_bytes();
            assert_eq!(raw[4], 1);
            assert_eq!((raw[3], raw[6], raw[7]), (0x01, 0x00, 0x01));
        });

        // More than two effects store the first one only.
        let bank = [
            effect_settings(Effect::SineChorus),
            effect_settings(Effect::TapeDelay),
            effect_settings(Effect::ArenaReverb),
        ];
        let packets = serialize_save_effect_packets(1, &bank).unwrap();
        assert_eq!(packets.len(), 1);

        let bank = [effect_settings(Effect::Fuzz)];
        assert_eq!(
            serialize_save_effect_packets(1, &bank).unwrap_err(),
            ProtocolError::InvalidBankEffect(Effect::Fuzz)
        );
    }

    #[test]
    fn tuner_command_template() {
        let raw = serialize_tuner_command(true);
        assert_eq!(&raw[..5], &[0x0a, 0x01, 0x01, 0x01, 0x01]);
        assert!(raw[5..].iter().all(|&b| b == 0));

        let raw = serialize_tuner_command(false);
        assert_eq!(&raw[..5], &[0x0a, 0x01, 0x00, 0x00, 0x00]);
        assert!(raw[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn preset_list_cutoff_and_stride() {
        let frame_with_name = |label: String| -> PacketRaw {
            let mut raw = [0; PACKET_SIZE];
            label
                .bytes()
                .take(NAME_LENGTH)
                .enumerate()
                .for_each(|(i, b)| raw[16 + i] = b);
            raw
        };
        let dump = |count: usize| -> Vec<PacketRaw> {
            (0..count).map(|i| frame_with_name(format!("P{:03}", i))).collect()
        };

        // At most 143 frames reserve 48 for the catalog.
        let names = decode_preset_list_from_data(&dump(60));
        assert_eq!(names.len(), 24);
        assert_eq!(names[1], "P002");

        // Short dumps stop at what is available.
        let names = decode_preset_list_from_data(&dump(45));
        assert_eq!(names.len(), 23);
        assert_eq!(names[22], "P044");

        // Above 143 frames the second generation catalog of 200 applies.
        let names = decode_preset_list_from_data(&dump(250));
        assert_eq!(names.len(), 100);
        assert_eq!(names[99], "P198");

        let names = decode_preset_list_from_data(&dump(150));
        assert_eq!(names.len(), 75);
    }
}
