// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (c) 2024 Takashi Sakamoto

//! The stateful session against a single amplifier.
//!
//! The session owns the transport for its lifetime. It is created closed, becomes running once
//! the initialization handshake succeeded, and returns to closed on shutdown. Every control
//! command is followed by one receive which drains the acknowledgement of the device, so that
//! callers never interleave with the reply stream.

use {
    super::{transport::Connection, *},
    std::convert::TryFrom,
    std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
    tracing::debug,
    usb_mustang_protocols::{packet::*, serializer::*, *},
};

/// The count of frames which carry one preset; name, amplifier, four effect slots, USB gain.
const PRESET_FRAMES: usize = 7;

/// The data available after the initialization handshake; the catalog of preset names and the
/// currently loaded signal chain.
#[derive(Debug, Clone)]
pub struct InitialData {
    pub preset_names: Vec<String>,
    pub current: SignalChain,
}

fn send_command<C: Connection>(conn: &mut C, raw: &PacketRaw) -> Result<()> {
    conn.send(raw)?;
    // The acknowledgement; empty when the device stays silent until the timeout.
    conn.receive(PACKET_SIZE)?;
    Ok(())
}

fn send_apply_command<C: Connection>(conn: &mut C, effect: Option<&EffectSettings>) -> Result<()> {
    send_command(conn, &serialize_apply_command(effect).to_bytes())
}

/// Issue the command, then keep reading frames until a short read marks the end of the stream.
fn drain_stream<C: Connection>(conn: &mut C, command: &PacketRaw) -> Result<Vec<PacketRaw>> {
    let mut frames = Vec::new();
    let mut received = conn.send(command)?;

    while received > 0 {
        let data = conn.receive(PACKET_SIZE)?;
        received = data.len();
        match PacketRaw::try_from(data.as_slice()) {
            Ok(frame) => frames.push(frame),
            Err(_) => break,
        }
    }

    Ok(frames)
}

fn load_bank_data<C: Connection>(conn: &mut C, slot: u8) -> Result<[PacketRaw; PRESET_FRAMES]> {
    let mut data = [[0; PACKET_SIZE]; PRESET_FRAMES];

    let frames = drain_stream(conn, &serialize_load_slot_command(slot).to_bytes())?;
    data.iter_mut()
        .zip(frames.iter())
        .for_each(|(entry, frame)| *entry = *frame);

    Ok(data)
}

/// Decode one group of preset frames. Frames the device left out stay zeroed and decode to the
/// unknown and empty sentinels.
fn decode_data(data: &[PacketRaw; PRESET_FRAMES]) -> SignalChain {
    let name = decode_name_from_data(&data[0]);
    let amp = decode_amp_from_data(&data[1], &data[6]);
    let effects = decode_effects_from_data(&[data[2], data[3], data[4], data[5]]);

    SignalChain { name, amp, effects }
}

/// The session against a single amplifier.
pub struct Session<C: Connection> {
    conn: Arc<Mutex<C>>,
    tuner_stop: Arc<AtomicBool>,
    running: bool,
}

impl<C: Connection> Session<C> {
    pub fn new(conn: C) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            tuner_stop: Arc::new(AtomicBool::new(true)),
            running: false,
        }
    }

    /// The shared handle to the transport, for the tuner feed.
    pub fn connection(&self) -> Arc<Mutex<C>> {
        Arc::clone(&self.conn)
    }

    /// The flag which cancels the tuner feed; raised by `set_tuner(false)` and by shutdown.
    pub fn tuner_stop(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.tuner_stop)
    }

    fn lock(&self) -> Result<MutexGuard<'_, C>> {
        self.conn
            .lock()
            .map_err(|_| Error::Transport("connection lock is poisoned".to_string()))
    }

    fn ensure_running(&self) -> Result<()> {
        if self.running {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    /// Perform the initialization handshake and read the full preset dump of the device. The
    /// count of received frames decides the size of the catalog; the seven frames behind the
    /// catalog carry the currently loaded preset.
    pub fn start(&mut self) -> Result<InitialData> {
        self.tuner_stop.store(true, Ordering::SeqCst);

        let frames = {
            let mut conn = self.lock()?;
            if !conn.is_open() {
                return Err(Error::Transport("device is not connected".to_string()));
            }

            // Leave tuner mode first in case a former session left it enabled.
            send_command(&mut *conn, &serialize_tuner_command(false))?;

            let [first, second] = serialize_init_command();
            send_command(&mut *conn, &first.to_bytes())?;
            send_command(&mut *conn, &second.to_bytes())?;

            drain_stream(&mut *conn, &serialize_load_command().to_bytes())?
        };

        let cutoff = if frames.len() > 143 { 200 } else { 48 };
        if frames.len() < cutoff + PRESET_FRAMES {
            return Err(Error::Transport(format!(
                "preset dump ended after {} frames, at least {} are required",
                frames.len(),
                cutoff + PRESET_FRAMES
            )));
        }

        let preset_names = decode_preset_list_from_data(&frames);

        let mut preset = [[0; PACKET_SIZE]; PRESET_FRAMES];
        preset
            .iter_mut()
            .zip(frames[cutoff..].iter())
            .for_each(|(entry, frame)| *entry = *frame);
        let current = decode_data(&preset);

        self.running = true;
        debug!(presets = preset_names.len(), "session is running");

        Ok(InitialData {
            preset_names,
            current,
        })
    }

    /// Shut the session down and release the device. Idempotent.
    pub fn stop(&mut self) {
        self.tuner_stop.store(true, Ordering::SeqCst);
        if let Ok(mut conn) = self.conn.lock() {
            conn.close();
        }
        self.running = false;
    }

    pub fn set_amplifier(&mut self, settings: &AmpSettings) -> Result<()> {
        self.ensure_running()?;
        debug!(model = %settings.amp, "configure amplifier");

        let mut conn = self.lock()?;
        send_command(&mut *conn, &serialize_amp_settings(settings).to_bytes())?;
        send_apply_command(&mut *conn, None)?;

        send_command(
            &mut *conn,
            &serialize_amp_settings_usb_gain(settings).to_bytes(),
        )?;
        send_apply_command(&mut *conn, None)
    }

    /// Clear the addressed effect slot, then configure it anew unless the slot goes empty.
    pub fn set_effect(&mut self, settings: &EffectSettings) -> Result<()> {
        self.ensure_running()?;
        debug!(slot = settings.fx_slot, effect = %settings.effect, "configure effect");

        let mut conn = self.lock()?;
        send_command(&mut *conn, &serialize_clear_effect_settings().to_bytes())?;
        send_apply_command(&mut *conn, None)?;

        if settings.effect != Effect::Empty {
            let packet = serialize_effect_settings(settings)?;
            send_command(&mut *conn, &packet.to_bytes())?;
            send_apply_command(&mut *conn, None)?;
        }

        Ok(())
    }

    /// Store the current configuration under the given name into the given preset slot.
    pub fn save_on_amp(&mut self, name: &str, slot: u8) -> Result<()> {
        self.ensure_running()?;

        let mut conn = self.lock()?;
        send_command(&mut *conn, &serialize_name(slot, name).to_bytes())?;
        // The recall stream confirms the store; its content is dropped.
        load_bank_data(&mut *conn, slot).map(|_| ())
    }

    /// Recall the preset in the given slot and decode it.
    pub fn load_memory_bank(&mut self, slot: u8) -> Result<SignalChain> {
        self.ensure_running()?;

        let mut conn = self.lock()?;
        load_bank_data(&mut *conn, slot).map(|data| decode_data(&data))
    }

    /// Store an effect bank of one or two modulation, delay, or reverb effects.
    pub fn save_effects(&mut self, slot: u8, name: &str, effects: &[EffectSettings]) -> Result<()> {
        self.ensure_running()?;

        // Serialize the whole sequence up front so that misuse leaves the device untouched.
        let name_packet = serialize_save_effect_name(slot, name, effects)?;
        let effect_packets = serialize_save_effect_packets(slot, effects)?;
        let apply = serialize_apply_command(effects.first());

        let mut conn = self.lock()?;
        send_command(&mut *conn, &name_packet.to_bytes())?;
        effect_packets
            .iter()
            .try_for_each(|packet| send_command(&mut *conn, &packet.to_bytes()))?;
        send_command(&mut *conn, &apply.to_bytes())
    }

    /// Switch tuner mode. While the mode is enabled the device streams pitch detection frames
    /// which the tuner feed consumes; no other control command may be issued meanwhile.
    pub fn set_tuner(&mut self, on: bool) -> Result<()> {
        self.ensure_running()?;
        debug!(on, "tuner mode");

        self.tuner_stop.store(!on, Ordering::SeqCst);

        let mut conn = self.lock()?;
        send_command(&mut *conn, &serialize_tuner_command(on))
    }
}

impl<C: Connection> Drop for Session<C> {
    fn drop(&mut self) {
        self.stop();
    }
}
