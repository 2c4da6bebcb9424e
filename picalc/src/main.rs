mod app;
mod config;
mod pace;
mod screen;
mod symbol;

use crate::app::Calculator;
use crate::config::Config;
use crate::pace::SleepPace;
use crate::screen::Screen;
use dotenv::dotenv;
use eyre::eyre;
use log::{debug, info};
use picalc_gpio::GpioBias::PullDown;
use picalc_gpio::GpioDriveMode::OpenSource;
use picalc_gpio::GpioDriver;
use picalc_gpio::gpiod::GpiodDriver;
use picalc_gpio::keypad::GpioKeypad;
use picalc_gpio::lcd::hd44780::driver::{GpioHD44780Driver, HD44780Driver};
use picalc_gpio::raw::RawGpioDriver;
use std::env::var;
use std::thread;
use std::time::Duration;

fn parse_pin_bus(pin_str: &str) -> eyre::Result<[usize; 4]> {
    pin_str
        .split([',', ' ', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse())
        .collect::<Result<Vec<_>, _>>()?
        .try_into()
        .map_err(|_| eyre!("Invalid number of pins in bus"))
}

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv()?;
    pretty_env_logger::init();

    info!("PiCalc starting...");

    debug!("Trying to load config...");
    let config = if let Some(config) = Config::try_load() {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };

    let backend = var("PICALC_GPIO_BACKEND").unwrap_or_else(|_| "raw".to_string());
    debug!("Initializing GPIO driver ({})...", backend);

    match backend.as_str() {
        "raw" => run(&RawGpioDriver::new_gpiomem()?, config),
        "gpiod" => {
            let chip = var("PICALC_GPIOD_CHIP").unwrap_or_else(|_| "/dev/gpiochip0".to_string());
            run(&GpiodDriver::open(chip)?, config)
        }
        other => Err(eyre!("Unknown GPIO backend {other:?}")),
    }
}

fn run(gpio: &impl GpioDriver, config: Config) -> eyre::Result<()> {
    debug!("{:?} initialized.", gpio);

    // Get pin numbers from env
    let lcd_e_pin_no: usize = var("PICALC_LCD_PIN_E")?.parse()?;
    let lcd_rw_pin_no: usize = var("PICALC_LCD_PIN_RW")?.parse()?;
    let lcd_rs_pin_no: usize = var("PICALC_LCD_PIN_RS")?.parse()?;
    let lcd_data_pin_nos: [usize; 4] = parse_pin_bus(&var("PICALC_LCD_PINS_DATA")?)?;

    let keypad_pin_row_nos: [usize; 4] = parse_pin_bus(&var("PICALC_KEYPAD_PINS_ROWS")?)?;
    let keypad_pin_col_nos: [usize; 4] = parse_pin_bus(&var("PICALC_KEYPAD_PINS_COLS")?)?;

    info!(
        "LCD @ E: {}, RW: {}, RS: {}, Data: {:?}",
        lcd_e_pin_no, lcd_rw_pin_no, lcd_rs_pin_no, lcd_data_pin_nos
    );
    info!(
        "Keypad @ Rows: {:?}, Cols: {:?}",
        keypad_pin_row_nos, keypad_pin_col_nos
    );

    debug!("Initializing LCD driver...");
    let mut lcd_e_pin = gpio.get_pin(lcd_e_pin_no)?;
    let lcd_e_out = lcd_e_pin.as_output()?;
    let mut lcd_rw_pin = gpio.get_pin(lcd_rw_pin_no)?;
    let lcd_rw_out = lcd_rw_pin.as_output()?;
    let mut lcd_rs_pin = gpio.get_pin(lcd_rs_pin_no)?;
    let lcd_rs_out = lcd_rs_pin.as_output()?;
    let mut lcd_data_bus = gpio.get_pin_bus(lcd_data_pin_nos)?;
    let mut lcd = GpioHD44780Driver::new_4bit(
        &*lcd_e_out,
        Some(&*lcd_rw_out),
        &*lcd_rs_out,
        &mut *lcd_data_bus,
    );

    lcd.init(true, false)?;

    lcd.print("PiCalc")?;
    lcd.second_line()?;
    const VERSION_LINE: &str = concat!("v.", env!("CARGO_PKG_VERSION", "UNKNOWN"));
    lcd.print(VERSION_LINE)?;

    debug!("{:?} initialized.", lcd);

    debug!("Initializing keypad driver...");
    let mut keypad_row_bus = gpio.get_pin_bus(keypad_pin_row_nos)?;
    let mut keypad_col_bus = gpio.get_pin_bus(keypad_pin_col_nos)?;
    // Inactive rows float instead of fighting an active row through a
    // second pressed key; idle columns read low through the pull-down.
    keypad_row_bus.set_drive_mode(OpenSource)?;
    keypad_col_bus.set_bias(PullDown)?;
    let keypad_row_out = keypad_row_bus.as_output()?;
    let keypad_col_in = keypad_col_bus.as_input()?;

    let keypad = GpioKeypad::new(&*keypad_row_out, &*keypad_col_in)
        .with_release_settle(config.release_settle());

    debug!("{:?} initialized.", keypad);

    info!("PiCalc initialized.");

    thread::sleep(Duration::from_secs(1));
    lcd.clear()?;

    info!("Starting main loop...");

    let mut calculator = Calculator::new(&keypad, &mut lcd, &SleepPace, &config);

    loop {
        calculator.run_cycle()?;
    }
}
