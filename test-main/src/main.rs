//! Bench bring-up binary: echoes every scanned keypad key to the log and the
//! LCD, without any calculator logic on top.

use dotenv::dotenv;
use log::{debug, info};
use picalc_gpio::keypad::{GpioKeypad, Keypad};
use picalc_gpio::lcd::hd44780::driver::{GpioHD44780Driver, HD44780Driver};
use picalc_gpio::raw::RawGpioDriver;
use picalc_gpio::{GpioBias, GpioDriveMode, GpioDriver};
use std::thread::sleep;
use std::time::Duration;
use sysinfo::System;

fn main() -> eyre::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    const UNKNOWN_STR: &str = "???";

    info!(
        "Hello, {}!",
        System::name().as_deref().unwrap_or(UNKNOWN_STR)
    );
    info!(
        "System ver {} kernel ver {}",
        System::long_os_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::kernel_version().as_deref().unwrap_or(UNKNOWN_STR),
    );
    info!(
        "Hostname {}",
        System::host_name().as_deref().unwrap_or(UNKNOWN_STR)
    );
    info!("Architecture {}", System::cpu_arch());

    let gpio = RawGpioDriver::new_gpiomem()?;

    let mut pin_e = gpio.get_pin(17)?;
    let mut pin_rw = gpio.get_pin(27)?;
    let mut pin_rs = gpio.get_pin(22)?;

    let pin_e_out = pin_e.as_output()?;
    let pin_rw_out = pin_rw.as_output()?;
    let pin_rs_out = pin_rs.as_output()?;

    // 4-bit data bus - D4 D5 D6 D7
    let bus_pins = [26, 16, 20, 21];
    let mut data_bus = gpio.get_pin_bus(bus_pins)?;

    let mut lcd = GpioHD44780Driver::new_4bit(
        &*pin_e_out,
        Some(&*pin_rw_out),
        &*pin_rs_out,
        &mut *data_bus,
    );

    lcd.init(true, false)?;

    let mut row_bus = gpio.get_pin_bus([5, 6, 13, 19])?;
    let mut col_bus = gpio.get_pin_bus([12, 25, 24, 23])?;
    row_bus.set_drive_mode(GpioDriveMode::OpenSource)?;
    col_bus.set_bias(GpioBias::PullDown)?;
    let row_out = row_bus.as_output()?;
    let col_in = col_bus.as_input()?;

    let keypad = GpioKeypad::new(&*row_out, &*col_in);

    info!("Scanning; every detected key goes to the log and the LCD.");

    let mut count = 0u32;

    loop {
        if let Some(key) = keypad.scan()? {
            count += 1;
            info!("Key {:?} (#{} so far)", key, count);
            debug!("row {} col {}", key.row(), key.col());

            // Wrap to a fresh display every 16 glyphs.
            if count % 16 == 1 {
                lcd.clear_display()?;
            }
            let glyph = char::from_digit(key.index() as u32, 16).unwrap_or('?');
            lcd.send_data(glyph as u8)?;
        }

        sleep(Duration::from_millis(20));
    }
}
