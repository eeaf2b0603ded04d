///! Panel implementation on an Inky pHAT.
use inky::{eeprom, Color, Inky, Settings};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, I2cdev, SpidevDevice, SysfsPin};

use crate::canvas::{Canvas, TriColor};
use crate::{check_size, Panel, PanelError, Resolution};

impl From<TriColor> for Color {
    fn from(color: TriColor) -> Self {
        match color {
            TriColor::White => Color::White,
            TriColor::Black => Color::Black,
            TriColor::Red => Color::Red,
        }
    }
}

fn driver_error(e: impl std::fmt::Debug) -> PanelError {
    PanelError::Driver(format!("{:?}", e))
}

/// Panel implementation for real hardware.
/// Backed by an Inky pHAT on SPI0, with its EEPROM on I2C1.
pub struct InkyPanel {
    resolution: Resolution,
    inky: Inky<SpidevDevice, SysfsPin, SysfsPin, SysfsPin, Delay>,
}

impl InkyPanel {
    const I2C_BUS: &'static str = "/dev/i2c-1";
    const SPI_BUS: &'static str = "/dev/spidev0.0";
    const RESET_PIN: u64 = 27;
    const BUSY_PIN: u64 = 17;
    const DC_PIN: u64 = 22;

    /// Attach to the panel.
    /// The resolution is read from the board's EEPROM; `fallback` is used if it cannot be read.
    pub fn new(fallback: Resolution) -> Result<Self, PanelError> {
        let resolution = Resolution::detected(Self::identify(), fallback)?;

        let mut spi = SpidevDevice::open(Self::SPI_BUS).map_err(driver_error)?;
        spi.0
            .configure(
                &SpidevOptions::new()
                    .bits_per_word(8)
                    .max_speed_hz(488_000)
                    .mode(SpiModeFlags::SPI_MODE_0)
                    .build(),
            )
            .map_err(driver_error)?;

        let inky = Inky::new(
            spi,
            Self::pin(Self::DC_PIN, Direction::Out)?,
            Self::pin(Self::RESET_PIN, Direction::Out)?,
            Self::pin(Self::BUSY_PIN, Direction::In)?,
            Delay,
            Settings::with_resolution(resolution.width() as u16, resolution.height() as u16),
        )
        .map_err(driver_error)?;
        Ok(InkyPanel { resolution, inky })
    }

    /// Size reported by the board's EEPROM.
    fn identify() -> Result<(u32, u32), PanelError> {
        let mut i2c = I2cdev::new(Self::I2C_BUS).map_err(driver_error)?;
        let id = eeprom::read(&mut i2c).map_err(driver_error)?;
        tracing::info!("found {}", id);
        let (width, height) = id.resolution();
        Ok((width.into(), height.into()))
    }

    fn pin(number: u64, direction: Direction) -> Result<SysfsPin, PanelError> {
        let pin = SysfsPin::new(number);
        pin.export().map_err(driver_error)?;
        pin.set_direction(direction).map_err(driver_error)?;
        Ok(pin)
    }
}

impl Panel for InkyPanel {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn set_border(&mut self, color: TriColor) {
        self.inky.set_border(color.into());
    }

    fn set_image(&mut self, canvas: &Canvas) -> Result<(), PanelError> {
        check_size(canvas, self.resolution)?;
        let pixels: Vec<Color> = canvas.pixels().iter().map(|c| (*c).into()).collect();
        self.inky.set_image(&pixels).map_err(driver_error)
    }

    fn show(&mut self) -> Result<(), PanelError> {
        tracing::info!("refreshing panel");
        self.inky.show().map_err(driver_error)
    }
}

impl Drop for InkyPanel {
    fn drop(&mut self) {
        let _ = self.inky.sleep();
    }
}
