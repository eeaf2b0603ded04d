use inky::{eeprom, Color, Inky, Settings};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, I2cdev, SpidevDevice, SysfsPin};

const RESET_PIN: u64 = 27;
const BUSY_PIN: u64 = 17;
const DC_PIN: u64 = 22;

fn pin(number: u64, direction: Direction) -> SysfsPin {
    let pin = SysfsPin::new(number);
    pin.export().expect("could not export pin");
    pin.set_direction(direction)
        .expect("could not set pin direction");
    pin
}

fn main() {
    let mut i2c = I2cdev::new("/dev/i2c-1").expect("could not open i2c device");
    let id = match eeprom::read(&mut i2c) {
        Ok(id) => {
            println!("found {}", id);
            id
        }
        Err(e) => {
            println!("error: {}", e);
            return;
        }
    };

    let mut spi = SpidevDevice::open("/dev/spidev0.0").expect("could not open spi device");
    spi.0
        .configure(
            &SpidevOptions::new()
                .bits_per_word(8)
                .max_speed_hz(488_000)
                .mode(SpiModeFlags::SPI_MODE_0)
                .build(),
        )
        .expect("could not configure spi device");

    let (width, height) = id.resolution();
    let mut panel = Inky::new(
        spi,
        pin(DC_PIN, Direction::Out),
        pin(RESET_PIN, Direction::Out),
        pin(BUSY_PIN, Direction::In),
        Delay,
        Settings::with_resolution(width, height),
    )
    .unwrap();

    // Vertical stripes of each colour.
    let stripe = width as usize / 3;
    let pixels: Vec<Color> = (0..height as usize)
        .flat_map(|_| 0..width as usize)
        .map(|x| match x / stripe.max(1) {
            0 => Color::White,
            1 => Color::Black,
            _ => Color::Red,
        })
        .collect();

    panel.set_border(Color::Red);
    panel.set_image(&pixels).unwrap();
    println!("refreshing panel...");
    match panel.show() {
        Ok(()) => println!("done"),
        Err(e) => println!("error: {}", e),
    }
    let _ = panel.sleep();
}
