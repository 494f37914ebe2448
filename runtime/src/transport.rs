// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (c) 2024 Takashi Sakamoto

//! USB transport with interrupt transfers of fixed length buffers.

use {
    super::*,
    rusb::{Context, DeviceHandle, UsbContext},
    std::time::Duration,
    tracing::{debug, trace},
};

/// The vendor identifier assigned to Fender.
pub const USB_VID: u16 = 0x1ed8;

/// Mustang I and II.
pub const SMALL_AMPS_USB_PID: u16 = 0x0004;
/// Mustang III, IV, and V.
pub const BIG_AMPS_USB_PID: u16 = 0x0005;
/// Mustang Mini.
pub const MINI_USB_PID: u16 = 0x0010;
/// Mustang Floor.
pub const FLOOR_USB_PID: u16 = 0x0012;
/// Mustang I and II in their second generation.
pub const SMALL_AMPS_V2_USB_PID: u16 = 0x0014;
/// Mustang III, IV, and V in their second generation.
pub const BIG_AMPS_V2_USB_PID: u16 = 0x0016;

/// The candidates of product identifier, probed in order.
pub const USB_PIDS: [u16; 6] = [
    SMALL_AMPS_USB_PID,
    BIG_AMPS_USB_PID,
    SMALL_AMPS_V2_USB_PID,
    BIG_AMPS_V2_USB_PID,
    MINI_USB_PID,
    FLOOR_USB_PID,
];

const ENDPOINT_SEND: u8 = 0x01;
const ENDPOINT_RECV: u8 = 0x81;
const INTERFACE: u8 = 0;
const TIMEOUT: Duration = Duration::from_millis(500);

/// The interface to exchange buffers with an amplifier. The session is generic over it so that
/// tests replace the USB device by canned traffic.
pub trait Connection: Send {
    /// Transfer the buffer to the device and return the count of bytes the stack accepted.
    fn send(&mut self, data: &[u8]) -> Result<usize>;

    /// Receive at most the given count of bytes. A timeout is no error; it yields an empty
    /// buffer and marks the end of a streamed reply.
    fn receive(&mut self, length: usize) -> Result<Vec<u8>>;

    fn is_open(&self) -> bool;

    /// Release the interface and the device. Idempotent.
    fn close(&mut self);
}

/// The USB connection to the first available amplifier.
pub struct UsbConnection {
    handle: Option<DeviceHandle<Context>>,
}

impl UsbConnection {
    /// Open the first device which matches the vendor identifier and any of the candidate
    /// product identifiers. A kernel driver already bound to the interface is detached first.
    pub fn open_first(vid: u16, pids: &[u16]) -> Result<Self> {
        let ctx = Context::new()
            .map_err(|cause| Error::Transport(format!("unable to initialize libusb: {}", cause)))?;

        let mut handle = pids
            .iter()
            .find_map(|&pid| ctx.open_device_with_vid_pid(vid, pid))
            .ok_or_else(|| Error::Transport("no amplifier found".to_string()))?;

        debug!(
            vid,
            pid = handle
                .device()
                .device_descriptor()
                .map(|desc| desc.product_id())
                .unwrap_or_default(),
            "device opened"
        );

        let detached = match handle.kernel_driver_active(INTERFACE) {
            Ok(false) => false,
            _ => {
                handle.detach_kernel_driver(INTERFACE).map_err(|cause| {
                    Error::Transport(format!("unable to detach kernel driver: {}", cause))
                })?;
                true
            }
        };

        if let Err(cause) = handle.claim_interface(INTERFACE) {
            if detached {
                let _ = handle.attach_kernel_driver(INTERFACE);
            }
            return Err(Error::Transport(format!(
                "unable to claim interface: {}",
                cause
            )));
        }

        Ok(Self {
            handle: Some(handle),
        })
    }
}

fn finish_receive(mut buffer: Vec<u8>, result: rusb::Result<usize>) -> Result<Vec<u8>> {
    match result {
        Ok(length) => {
            buffer.truncate(length);
            Ok(buffer)
        }
        Err(rusb::Error::Timeout) => Ok(Vec::new()),
        Err(cause) => Err(Error::Transport(format!(
            "interrupt read failed: {}",
            cause
        ))),
    }
}

impl Connection for UsbConnection {
    fn send(&mut self, data: &[u8]) -> Result<usize> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| Error::Transport("connection is not open".to_string()))?;

        handle
            .write_interrupt(ENDPOINT_SEND, data, TIMEOUT)
            .map(|written| {
                trace!(written, "interrupt write");
                written
            })
            .map_err(|cause| Error::Transport(format!("interrupt write failed: {}", cause)))
    }

    fn receive(&mut self, length: usize) -> Result<Vec<u8>> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| Error::Transport("connection is not open".to_string()))?;

        let mut buffer = vec![0; length];
        let result = handle.read_interrupt(ENDPOINT_RECV, &mut buffer, TIMEOUT);
        finish_receive(buffer, result).map(|data| {
            trace!(received = data.len(), "interrupt read");
            data
        })
    }

    fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            match handle.release_interface(INTERFACE) {
                // The device is already gone; there is no driver left to reattach.
                Err(rusb::Error::NoDevice) => (),
                _ => {
                    let _ = handle.attach_kernel_driver(INTERFACE);
                }
            }
            debug!("device closed");
        }
    }
}

impl Drop for UsbConnection {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn receive_accepts_timeout_as_empty_read() {
        let buffer = vec![0x11, 0x22, 0x33, 0x44];

        let data = finish_receive(buffer.clone(), Ok(2)).unwrap();
        assert_eq!(data, vec![0x11, 0x22]);

        let data = finish_receive(buffer.clone(), Err(rusb::Error::Timeout)).unwrap();
        assert!(data.is_empty());

        let err = finish_receive(buffer, Err(rusb::Error::NoDevice)).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
