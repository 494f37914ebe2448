// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (c) 2024 Takashi Sakamoto

use {
    clap::Parser,
    mustang_runtime::{
        session::{InitialData, Session},
        transport::{UsbConnection, USB_PIDS, USB_VID},
        tuner::TunerFeed,
        Error, LogLevel, Result, RuntimeOperation,
    },
    tracing::Level,
    usb_mustang_protocols::{Effect, Position, SignalChain},
};

#[derive(Parser)]
#[clap(name = "snd-mustang-ctl-service")]
#[clap(about = "Control Fender Mustang series of amplifiers connected to USB bus")]
struct Arguments {
    /// The level to debug runtime.
    #[clap(long, short, value_enum)]
    log_level: Option<LogLevel>,

    #[clap(subcommand)]
    operation: Operation,
}

#[derive(clap::Subcommand, Copy, Clone)]
enum Operation {
    /// Print the catalog of presets and the currently loaded signal chain.
    Info,
    /// Recall the preset in the given slot and print its signal chain.
    Select {
        /// The index of memory bank.
        slot: u8,
    },
    /// Stream tuner readings to stdout until enter is pressed.
    Tuner,
}

struct MustangRuntime {
    session: Session<UsbConnection>,
    operation: Operation,
    initial_data: Option<InitialData>,
}

impl RuntimeOperation<Operation> for MustangRuntime {
    fn new(operation: Operation, log_level: Option<LogLevel>) -> Result<Self> {
        if let Some(level) = log_level {
            let fmt_level = match level {
                LogLevel::Debug => Level::DEBUG,
            };
            tracing_subscriber::fmt().with_max_level(fmt_level).init();
        }

        let conn = UsbConnection::open_first(USB_VID, &USB_PIDS)?;

        Ok(Self {
            session: Session::new(conn),
            operation,
            initial_data: None,
        })
    }

    fn listen(&mut self) -> Result<()> {
        self.initial_data = Some(self.session.start()?);
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        match self.operation {
            Operation::Info => {
                let data = self.initial_data.take().ok_or(Error::NotConnected)?;
                data.preset_names
                    .iter()
                    .enumerate()
                    .for_each(|(i, name)| println!("{:3}: {}", i, name));
                println!();
                print_signal_chain(&data.current);
                Ok(())
            }
            Operation::Select { slot } => {
                let chain = self.session.load_memory_bank(slot)?;
                print_signal_chain(&chain);
                Ok(())
            }
            Operation::Tuner => {
                self.session.set_tuner(true)?;

                let (feed, rx) =
                    TunerFeed::start(self.session.connection(), self.session.tuner_stop());
                let printer = std::thread::spawn(move || {
                    rx.iter().for_each(|text| println!("{}", text));
                });

                let mut line = String::new();
                let _ = std::io::stdin().read_line(&mut line);

                self.session.set_tuner(false)?;
                feed.join();
                let _ = printer.join();
                Ok(())
            }
        }
    }
}

fn print_signal_chain(chain: &SignalChain) {
    println!("name: {}", chain.name);
    println!("amplifier: {}", chain.amp.amp);
    println!(
        "  gain: {}, volume: {}, treble: {}, middle: {}, bass: {}, cabinet: {}",
        chain.amp.gain,
        chain.amp.volume,
        chain.amp.treble,
        chain.amp.middle,
        chain.amp.bass,
        chain.amp.cabinet,
    );
    chain
        .effects
        .iter()
        .filter(|e| e.effect != Effect::Empty)
        .for_each(|e| {
            let position = match e.position {
                Position::Input => "input",
                Position::EffectsLoop => "effects loop",
            };
            println!("  fx{} ({}): {}", e.fx_slot, position, e.effect);
        });
}

fn main() {
    let args = Arguments::parse();

    let code = MustangRuntime::new(args.operation, args.log_level)
        .and_then(|mut runtime| {
            runtime.listen()?;
            runtime.run()?;
            Ok(libc::EXIT_SUCCESS)
        })
        .unwrap_or_else(|err| {
            eprintln!("{}", err);
            libc::EXIT_FAILURE
        });

    std::process::exit(code)
}
