//! ESP32 Serial Echo - Main entry point
//!
//! On target:
//! 1. Install the UART0 driver (and the optional log UART)
//! 2. Wait for the startup delay, print the banner
//! 3. Poll, dispatch, drain diagnostics, sleep - forever
//!
//! On the host the same loop runs over stdin/stdout, with diagnostics on
//! stderr, so host-side tooling can be exercised without a board.

use serial_echo::config::{ConfigError, ConsoleConfig};
use serial_echo::console::Console;
use serial_echo::serial::{announce, pump};
use serial_echo::uart_logger::drain_to;
use serial_echo::{diag_error, DIAG_LOG_STREAM};

#[cfg(target_os = "espidf")]
fn main() -> Result<(), firmware::AppError> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<(), host::AppError> {
    host::run()
}

#[cfg(target_os = "espidf")]
mod firmware {
    use super::*;

    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::hal::gpio::AnyOutputPin;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::sys::EspError;

    use serial_echo::hal::UartPort;
    use serial_echo::logging;
    use serial_echo::uart_logger::{init_uart_logger, UartLogSink};

    #[derive(Debug)]
    pub enum AppError {
        Config(ConfigError),
        Esp(EspError),
    }

    impl From<ConfigError> for AppError {
        fn from(e: ConfigError) -> Self {
            Self::Config(e)
        }
    }

    impl From<EspError> for AppError {
        fn from(e: EspError) -> Self {
            Self::Esp(e)
        }
    }

    pub fn run() -> Result<(), AppError> {
        // Initialize ESP-IDF
        esp_idf_svc::sys::link_patches();

        let config = ConsoleConfig::default();
        config.validate()?;

        let peripherals = Peripherals::take()?;

        // UART0 default pins
        #[cfg(not(feature = "esp32p4"))]
        let (tx, rx) = (peripherals.pins.gpio43, peripherals.pins.gpio44);
        #[cfg(feature = "esp32p4")]
        let (tx, rx) = (peripherals.pins.gpio37, peripherals.pins.gpio38);

        let mut port = UartPort::open(peripherals.uart0, tx, rx, &config)?;

        let mut log_sink = match config.log_uart {
            Some(log_config) => {
                // SAFETY: the log pin is not claimed by any other driver
                let pin = unsafe { AnyOutputPin::new(log_config.tx_pin as i32) };
                Some(UartLogSink(init_uart_logger(peripherals.uart1, pin, &log_config)?))
            }
            None => None,
        };

        FreeRtos::delay_ms(config.startup_delay_ms);

        let mut console = Console::new(&config);
        if let Err(e) = announce(&console, &mut port) {
            diag_error!(DIAG_LOG_STREAM, logging::timestamp_us(), "banner: {}", e);
        }

        loop {
            if let Err(e) = pump(&mut console, &mut port) {
                diag_error!(DIAG_LOG_STREAM, logging::timestamp_us(), "{}", e);
            }

            match log_sink.as_mut() {
                Some(sink) => {
                    drain_to(&DIAG_LOG_STREAM, sink);
                }
                None => {
                    // No log UART: discard so the ring never fills
                    while DIAG_LOG_STREAM.drain().is_some() {}
                    DIAG_LOG_STREAM.reset_dropped();
                }
            }

            FreeRtos::delay_ms(config.poll_delay_ms);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use super::*;

    use std::fmt;
    use std::io::{self, Read, Write};
    use std::sync::mpsc::{self, Receiver, TryRecvError};
    use std::sync::OnceLock;
    use std::thread;
    use std::time::{Duration, Instant};

    use serial_echo::serial::{PumpError, SerialPort};

    #[derive(Debug)]
    pub enum HostError {
        /// stdin reached end of file
        Closed,
        Io(io::Error),
    }

    #[derive(Debug)]
    pub enum AppError {
        Config(ConfigError),
        Serial(PumpError<HostError>),
    }

    impl From<ConfigError> for AppError {
        fn from(e: ConfigError) -> Self {
            Self::Config(e)
        }
    }

    impl From<PumpError<HostError>> for AppError {
        fn from(e: PumpError<HostError>) -> Self {
            Self::Serial(e)
        }
    }

    /// stdin/stdout as a serial port. A reader thread feeds a channel so
    /// `read_byte` never blocks.
    struct StdioPort {
        rx: Receiver<io::Result<u8>>,
        out: io::Stdout,
    }

    impl StdioPort {
        fn spawn() -> Self {
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                for byte in io::stdin().lock().bytes() {
                    if tx.send(byte).is_err() {
                        break;
                    }
                }
            });

            Self { rx, out: io::stdout() }
        }
    }

    impl SerialPort for StdioPort {
        type Error = HostError;

        fn read_byte(&mut self) -> Result<Option<u8>, HostError> {
            match self.rx.try_recv() {
                Ok(Ok(byte)) => Ok(Some(byte)),
                Ok(Err(e)) => Err(HostError::Io(e)),
                Err(TryRecvError::Empty) => Ok(None),
                Err(TryRecvError::Disconnected) => Err(HostError::Closed),
            }
        }

        fn write_all(&mut self, bytes: &[u8]) -> Result<(), HostError> {
            let mut out = self.out.lock();
            out.write_all(bytes).and_then(|_| out.flush()).map_err(HostError::Io)
        }
    }

    struct StderrSink;

    impl fmt::Write for StderrSink {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            io::stderr().write_all(s.as_bytes()).map_err(|_| fmt::Error)
        }
    }

    fn clock() -> i64 {
        static START: OnceLock<Instant> = OnceLock::new();
        START.get_or_init(Instant::now).elapsed().as_micros() as i64
    }

    pub fn run() -> Result<(), AppError> {
        let config = ConsoleConfig::default();
        config.validate()?;

        clock();
        let mut port = StdioPort::spawn();
        thread::sleep(Duration::from_millis(config.startup_delay_ms.into()));

        let mut console = Console::new(&config).with_clock(clock);
        announce(&console, &mut port)?;

        loop {
            match pump(&mut console, &mut port) {
                Ok(_) => {}
                Err(PumpError::Read(HostError::Closed)) => break,
                Err(PumpError::Read(e)) => {
                    diag_error!(DIAG_LOG_STREAM, clock(), "stdin: {:?}", e);
                    drain_to(&DIAG_LOG_STREAM, &mut StderrSink);
                    return Err(PumpError::Read(e).into());
                }
                Err(e) => return Err(e.into()),
            }

            drain_to(&DIAG_LOG_STREAM, &mut StderrSink);
            thread::sleep(Duration::from_millis(config.poll_delay_ms.into()));
        }

        drain_to(&DIAG_LOG_STREAM, &mut StderrSink);
        Ok(())
    }
}
