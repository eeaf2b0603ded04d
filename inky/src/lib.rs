//! Driver for the Inky pHAT tri-colour e-ink panel.
//!
//! The panel is driven over SPI with three GPIO lines (data/command, reset, busy),
//! and carries an I2C EEPROM describing which panel variant is attached;
//! see [`eeprom`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use std::time::Duration;

pub mod eeprom;
mod spi;

/// An error in communicating with the panel.
pub enum Error<SpiError, PinError> {
    Spi(SpiError),
    Pin(PinError),
    Timeout(),
    Unsupported(u16, u16),
    InvalidArgument(&'static str),
}

impl<SpiError, PinError> core::fmt::Debug for Error<SpiError, PinError>
where
    SpiError: core::fmt::Debug,
    PinError: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Spi(e) => write!(f, "Error::Spi({:?})", e),
            Error::Pin(e) => write!(f, "Error::Pin({:?})", e),
            Error::Timeout() => write!(f, "Error::Timeout"),
            Error::Unsupported(w, h) => write!(f, "Error::Unsupported({}, {})", w, h),
            Error::InvalidArgument(s) => write!(f, "Error::InvalidArgument({:?})", s),
        }
    }
}

impl<SpiError, PinError> core::fmt::Display for Error<SpiError, PinError>
where
    SpiError: core::fmt::Display,
    PinError: core::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Spi(e) => write!(f, "in Inky write to SPI: {}", e),
            Error::Pin(e) => write!(f, "in Inky GPIO access: {}", e),
            Error::Timeout() => write!(f, "timed out waiting for the panel busy signal"),
            Error::Unsupported(w, h) => write!(f, "unsupported panel resolution {}x{}", w, h),
            Error::InvalidArgument(s) => write!(f, "invalid argument for Inky: {}", s),
        }
    }
}

impl<SpiError, PinError> core::error::Error for Error<SpiError, PinError>
where
    SpiError: core::error::Error + 'static,
    PinError: core::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Spi(e) => Some(e),
            Error::Pin(e) => Some(e),
            _ => None,
        }
    }
}

/// The colours a tri-colour panel can show, by palette index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    White = 0,
    Black = 1,
    Red = 2,
}

impl Color {
    /// Value written to the border waveform register for this colour.
    fn border_data(self) -> u8 {
        match self {
            Color::Black => 0b0000_0000,
            Color::Red => 0b0111_0011,
            Color::White => 0b0011_0001,
        }
    }
}

/// Layout of the controller's RAM for a given panel.
///
/// The controller scans "rows" along the long edge of the glass;
/// each row is `cols` pixels, packed eight to a byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: u16,
    cols: u16,
    rows: u16,
}

impl Geometry {
    /// Look up the controller layout for a panel resolution.
    /// Only the two pHAT sizes are known.
    pub fn for_resolution(width: u16, height: u16) -> Option<Self> {
        let (cols, rows) = match (width, height) {
            (250, 122) => (136, 250),
            (212, 104) => (104, 212),
            _ => return None,
        };
        Some(Geometry {
            width,
            height,
            cols,
            rows,
        })
    }

    /// Number of bytes in one colour plane.
    pub fn plane_bytes(&self) -> usize {
        (self.cols as usize / 8) * self.rows as usize
    }
}

/// Settings when starting to use an Inky panel.
#[non_exhaustive]
pub struct Settings {
    /// Panel resolution, (width, height) in the landscape orientation.
    /// Defaults to the 250x122 pHAT.
    pub resolution: (u16, u16),

    /// How long to wait for the busy line to clear before giving up.
    pub busy_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution: (250, 122),
            busy_timeout: Duration::from_secs(30),
        }
    }
}

impl Settings {
    /// Settings for a panel of the given resolution.
    pub fn with_resolution(width: u16, height: u16) -> Self {
        Self {
            resolution: (width, height),
            ..Default::default()
        }
    }
}

/// Handle to an Inky pHAT panel.
pub struct Inky<SPI, DC, RST, BUSY, D> {
    comm: spi::SpiComm<SPI, DC>,
    reset: RST,
    busy: BUSY,
    delay: D,
    geometry: Geometry,
    busy_timeout: Duration,
    border: Color,
    buffer: Vec<Color>,
}

impl<SPI, DC, RST, BUSY, D, PE> Inky<SPI, DC, RST, BUSY, D>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = PE>,
    RST: OutputPin<Error = PE>,
    BUSY: InputPin<Error = PE>,
    D: DelayNs,
{
    /// Attach to a panel on the given bus and pins.
    pub fn new(
        bus: SPI,
        dc: DC,
        reset: RST,
        busy: BUSY,
        delay: D,
        settings: Settings,
    ) -> Result<Self, Error<SPI::Error, PE>> {
        let (width, height) = settings.resolution;
        let geometry =
            Geometry::for_resolution(width, height).ok_or(Error::Unsupported(width, height))?;
        Ok(Inky {
            comm: spi::SpiComm::new(bus, dc),
            reset,
            busy,
            delay,
            geometry,
            busy_timeout: settings.busy_timeout,
            border: Color::White,
            buffer: vec![Color::White; width as usize * height as usize],
        })
    }

    /// Set the colour of the border drawn around the active area.
    pub fn set_border(&mut self, color: Color) {
        self.border = color;
    }

    /// Stage a full image, in row-major order, for the next [`Inky::show`].
    pub fn set_image(&mut self, pixels: &[Color]) -> Result<(), Error<SPI::Error, PE>> {
        if pixels.len() != self.buffer.len() {
            return Err(Error::InvalidArgument(
                "image must match the panel resolution",
            ));
        }
        self.buffer.copy_from_slice(pixels);
        Ok(())
    }

    /// Push the staged image to the glass and wait for the refresh to finish.
    pub fn show(&mut self) -> Result<(), Error<SPI::Error, PE>> {
        let (black, red) = pack_planes(&self.buffer, &self.geometry);
        self.setup()?;

        let rows = self.geometry.rows.to_le_bytes();
        let cols = (self.geometry.cols / 8) as u8;
        self.run_command(Command::DriverControl(rows))?;
        self.run_command(Command::DummyLinePeriod(0x1B))?;
        self.run_command(Command::GateLineWidth(0x0B))?;
        // Increment X and Y.
        self.run_command(Command::DataEntryMode(0x03))?;
        self.run_command(Command::RamXRange(0, cols - 1))?;
        self.run_command(Command::RamYRange([0, 0, rows[0], rows[1]]))?;
        self.run_command(Command::WriteVcom(0x70))?;
        self.run_command(Command::Border(self.border.border_data()))?;
        self.run_command(Command::RamXCounter(0))?;
        self.run_command(Command::RamYCounter([0, 0]))?;

        self.comm.send(Command::WriteBlackRam.command(), &black)?;
        self.comm.send(Command::WriteRedRam.command(), &red)?;
        self.busy_wait()?;

        // Waveform from OTP, then refresh.
        self.run_command(Command::UpdateControl(0xC7))?;
        self.run_command(Command::MasterActivate())?;
        self.busy_wait()
    }

    /// Put the controller into deep sleep until the next [`Inky::show`].
    pub fn sleep(&mut self) -> Result<(), Error<SPI::Error, PE>> {
        self.run_command(Command::DeepSleep(0x01))
    }

    /// Hardware then software reset.
    fn setup(&mut self) -> Result<(), Error<SPI::Error, PE>> {
        self.reset.set_low().map_err(Error::Pin)?;
        self.delay.delay_ms(500);
        self.reset.set_high().map_err(Error::Pin)?;
        self.delay.delay_ms(500);
        self.run_command(Command::SoftReset())?;
        self.delay.delay_ms(1000);
        self.busy_wait()
    }

    fn busy_wait(&mut self) -> Result<(), Error<SPI::Error, PE>> {
        const POLL_MS: u32 = 10;
        let limit = self.busy_timeout.as_millis();
        let mut waited: u128 = 0;
        while self.busy.is_high().map_err(Error::Pin)? {
            if waited >= limit {
                return Err(Error::Timeout());
            }
            self.delay.delay_ms(POLL_MS);
            waited += POLL_MS as u128;
        }
        Ok(())
    }

    /// Run a command with its (short) parameter data.
    fn run_command(&mut self, cmd: Command) -> Result<(), Error<SPI::Error, PE>> {
        let mut data = [0u8; 4];
        let len = cmd.data(&mut data);
        self.comm.send(cmd.command(), &data[..len])
    }
}

/// Pack a row-major image into the controller's black and red planes.
///
/// The controller's rows run along the panel's width, so the image is
/// rotated a quarter turn; padding columns past the panel height stay white.
/// In the black plane a 0 bit is black; in the red plane a 1 bit is red.
pub fn pack_planes(pixels: &[Color], geometry: &Geometry) -> (Vec<u8>, Vec<u8>) {
    let width = geometry.width as usize;
    let height = geometry.height as usize;
    let row_bytes = geometry.cols as usize / 8;
    let mut black = vec![0xFFu8; geometry.plane_bytes()];
    let mut red = vec![0x00u8; geometry.plane_bytes()];

    for row in 0..geometry.rows as usize {
        for col in 0..geometry.cols as usize {
            if col >= height || row >= width {
                continue;
            }
            let (x, y) = (row, height - 1 - col);
            let byte = row * row_bytes + col / 8;
            let bit = 0x80u8 >> (col % 8);
            match pixels[y * width + x] {
                Color::Black => black[byte] &= !bit,
                Color::Red => red[byte] |= bit,
                Color::White => {}
            }
        }
    }
    (black, red)
}

/// Controller commands, with their parameter data.
enum Command {
    /// Gate count (rows, little-endian) and scan order.
    DriverControl([u8; 2]),

    /// Dummy line period, in units of line time.
    DummyLinePeriod(u8),

    /// Gate line width.
    GateLineWidth(u8),

    /// RAM address increment direction.
    DataEntryMode(u8),

    /// Start and end RAM column, in bytes.
    RamXRange(u8, u8),

    /// Start and end RAM row, each little-endian.
    RamYRange([u8; 4]),

    /// VCOM register value.
    WriteVcom(u8),

    /// Border waveform.
    Border(u8),

    /// RAM column address counter.
    RamXCounter(u8),

    /// RAM row address counter.
    RamYCounter([u8; 2]),

    /// Write the black/white plane.
    WriteBlackRam,

    /// Write the red plane.
    WriteRedRam,

    /// Display update sequence options.
    UpdateControl(u8),

    /// Run the display update sequence.
    MasterActivate(),

    /// Reset every register to its power-on value.
    SoftReset(),

    /// Enter deep sleep; only a hardware reset wakes the controller.
    DeepSleep(u8),
}

impl Command {
    /// Command identifier for this command.
    fn command(&self) -> u8 {
        match self {
            Command::DriverControl(_) => 0x01,
            Command::DummyLinePeriod(_) => 0x3A,
            Command::GateLineWidth(_) => 0x3B,
            Command::DataEntryMode(_) => 0x11,
            Command::RamXRange(_, _) => 0x44,
            Command::RamYRange(_) => 0x45,
            Command::WriteVcom(_) => 0x2C,
            Command::Border(_) => 0x3C,
            Command::RamXCounter(_) => 0x4E,
            Command::RamYCounter(_) => 0x4F,
            Command::WriteBlackRam => 0x24,
            Command::WriteRedRam => 0x26,
            Command::UpdateControl(_) => 0x22,
            Command::MasterActivate() => 0x20,
            Command::SoftReset() => 0x12,
            Command::DeepSleep(_) => 0x10,
        }
    }

    /// Copy the parameter bytes of this command into `buf`; returns how many were written.
    /// Plane writes carry their data separately.
    fn data(&self, buf: &mut [u8; 4]) -> usize {
        let data: &[u8] = match self {
            Command::DriverControl(rows) => {
                buf[..2].copy_from_slice(rows);
                buf[2] = 0x00;
                return 3;
            }
            Command::RamXRange(start, end) => {
                buf[0] = *start;
                buf[1] = *end;
                return 2;
            }
            Command::DummyLinePeriod(v)
            | Command::GateLineWidth(v)
            | Command::DataEntryMode(v)
            | Command::WriteVcom(v)
            | Command::Border(v)
            | Command::RamXCounter(v)
            | Command::UpdateControl(v)
            | Command::DeepSleep(v) => core::slice::from_ref(v),
            Command::RamYRange(range) => range,
            Command::RamYCounter(counter) => counter,
            _ => &[],
        };
        buf[..data.len()].copy_from_slice(data);
        data.len()
    }
}
