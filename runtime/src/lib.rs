// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (c) 2024 Takashi Sakamoto

//! Runtime implementation to operate Fender Mustang series of USB amplifiers.
//!
//! The crate includes the USB transport, the stateful session against a single amplifier, and
//! the worker which consumes the pitch detection frames streamed in tuner mode.

pub mod session;
pub mod transport;
pub mod tuner;

use {clap::ValueEnum, thiserror::Error, usb_mustang_protocols::ProtocolError};

/// The error at the boundary of runtime operation.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum Error {
    /// The device is absent, refuses its interface, or fails a transfer.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The caller passed a payload the protocol does not allow.
    #[error("protocol misuse: {0}")]
    Protocol(#[from] ProtocolError),
    /// The session has not completed its handshake yet.
    #[error("session is not running")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, Error>;

/// The level to debug runtime.
#[derive(ValueEnum, Debug, Copy, Clone, Eq, PartialEq)]
pub enum LogLevel {
    Debug,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Debug
    }
}

pub trait RuntimeOperation<T>: Sized {
    fn new(arg: T, log_level: Option<LogLevel>) -> Result<Self>;
    fn listen(&mut self) -> Result<()>;
    fn run(&mut self) -> Result<()>;
}
