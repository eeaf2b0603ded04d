//! Helper module for SPI communication with the panel controller.

use crate::Error;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

/// Largest single transfer the Linux spidev driver accepts by default.
const MAX_TRANSFER: usize = 4096;

/// Wrapper for the controller's command/data protocol.
///
/// The data/command line is held low while the command byte is clocked out,
/// then high for any parameter bytes.
pub(crate) struct SpiComm<SPI, DC> {
    bus: SPI,
    dc: DC,
}

impl<SPI, DC> SpiComm<SPI, DC>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    pub fn new(bus: SPI, dc: DC) -> Self {
        SpiComm { bus, dc }
    }

    /// Sends the given command followed by its data, if any.
    pub fn send(&mut self, command: u8, data: &[u8]) -> Result<(), Error<SPI::Error, DC::Error>> {
        self.dc.set_low().map_err(Error::Pin)?;
        self.bus.write(&[command]).map_err(Error::Spi)?;

        if data.is_empty() {
            return Ok(());
        }
        self.dc.set_high().map_err(Error::Pin)?;
        for chunk in data.chunks(MAX_TRANSFER) {
            self.bus.write(chunk).map_err(Error::Spi)?;
        }
        Ok(())
    }
}
