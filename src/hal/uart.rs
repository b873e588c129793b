//! Command UART on top of esp-idf-hal.
//!
//! UART0 is also the default ESP-IDF console. `sdkconfig.defaults` moves the
//! IDF console to USB-Serial-JTAG so boot and `ESP_LOG` output stay off the
//! command stream; the ROM bootloader still prints on UART0 before app start.

use esp_idf_svc::hal::delay::NON_BLOCK;
use esp_idf_svc::hal::gpio;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::uart::{self, Uart, UartDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::EspError;

use crate::config::ConsoleConfig;
use crate::serial::SerialPort;

/// Full-duplex UART carrying commands and responses.
pub struct UartPort<'d> {
    driver: UartDriver<'d>,
}

impl<'d> UartPort<'d> {
    /// Install the UART driver, 8N1 at `config.baud_rate`.
    ///
    /// Returns once the driver is ready to move bytes.
    pub fn open<U: Uart>(
        uart: impl Peripheral<P = U> + 'd,
        tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
        rx_pin: impl Peripheral<P = impl gpio::InputPin> + 'd,
        config: &ConsoleConfig,
    ) -> Result<Self, EspError> {
        let uart_config = uart::config::Config::default().baudrate(Hertz(config.baud_rate));

        let driver = UartDriver::new(
            uart,
            tx_pin,
            rx_pin,
            Option::<gpio::AnyIOPin>::None,  // CTS
            Option::<gpio::AnyIOPin>::None,  // RTS
            &uart_config,
        )?;

        Ok(Self { driver })
    }
}

impl SerialPort for UartPort<'_> {
    type Error = EspError;

    fn read_byte(&mut self) -> Result<Option<u8>, EspError> {
        let mut byte = [0u8; 1];
        match self.driver.read(&mut byte, NON_BLOCK)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    fn write_all(&mut self, mut bytes: &[u8]) -> Result<(), EspError> {
        while !bytes.is_empty() {
            let n = self.driver.write(bytes)?;
            bytes = &bytes[n..];
        }
        Ok(())
    }
}
