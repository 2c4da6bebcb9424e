//! The rendering interface the calculator draws through.

use log::warn;
use picalc_gpio::GpioResult;
use picalc_gpio::lcd::hd44780::driver::{HD44780Driver, SECOND_LINE_ADDRESS};

/// A character display reduced to what the calculator needs.
///
/// Every call is synchronous and complete when it returns. Implemented for
/// every HD44780 driver below; tests substitute a recording fake.
pub trait Screen {
    fn print(&mut self, text: &str) -> GpioResult<()>;
    fn print_int(&mut self, value: i32) -> GpioResult<()>;
    fn print_fraction(&mut self, value: f32, decimals: usize) -> GpioResult<()>;
    /// Moves the cursor to the start of the second display line.
    fn second_line(&mut self) -> GpioResult<()>;
    fn clear(&mut self) -> GpioResult<()>;
}

impl<T: ?Sized + HD44780Driver> Screen for T {
    fn print(&mut self, text: &str) -> GpioResult<()> {
        for c in text.chars() {
            if c.is_ascii() {
                self.send_data(c as u8)?;
            } else {
                warn!("Non-ASCII character: {}", c);
                self.send_data(b'?')?;
            }
        }
        Ok(())
    }

    fn print_int(&mut self, value: i32) -> GpioResult<()> {
        self.print(&value.to_string())
    }

    fn print_fraction(&mut self, value: f32, decimals: usize) -> GpioResult<()> {
        self.print(&format!("{value:.decimals$}"))
    }

    fn second_line(&mut self) -> GpioResult<()> {
        self.set_ddram_address(SECOND_LINE_ADDRESS)
    }

    fn clear(&mut self) -> GpioResult<()> {
        self.clear_display()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Captures the byte traffic of an HD44780 without any hardware.
    #[derive(Debug, Default)]
    struct CapturedLcd {
        data: Vec<u8>,
        commands: Vec<u8>,
    }

    impl HD44780Driver for CapturedLcd {
        fn init(&mut self, _multiline: bool, _alt_font: bool) -> GpioResult<()> {
            Ok(())
        }

        fn send_command(&mut self, command: u8) -> GpioResult<()> {
            self.commands.push(command);
            Ok(())
        }

        fn send_data(&mut self, data: u8) -> GpioResult<()> {
            self.data.push(data);
            Ok(())
        }

        fn read_command(&mut self) -> GpioResult<u8> {
            Ok(0)
        }

        fn read_data(&mut self) -> GpioResult<u8> {
            Ok(0)
        }
    }

    #[test]
    fn print_sends_the_bytes() {
        let mut lcd = CapturedLcd::default();
        lcd.print("8+13").unwrap();
        assert_eq!(lcd.data, b"8+13");
    }

    #[test]
    fn print_replaces_non_ascii() {
        let mut lcd = CapturedLcd::default();
        lcd.print("π=3").unwrap();
        assert_eq!(lcd.data, b"?=3");
    }

    #[test]
    fn integers_render_as_decimal_text() {
        let mut lcd = CapturedLcd::default();
        lcd.print_int(-15).unwrap();
        assert_eq!(lcd.data, b"-15");
    }

    #[test]
    fn fractions_render_with_the_requested_decimals() {
        let mut lcd = CapturedLcd::default();
        lcd.print_fraction(2.5, 2).unwrap();
        lcd.print_fraction(8.0 / 3.0, 2).unwrap();
        assert_eq!(lcd.data, b"2.502.67");
    }

    #[test]
    fn second_line_addresses_ddram_0x40() {
        let mut lcd = CapturedLcd::default();
        lcd.second_line().unwrap();
        assert_eq!(lcd.commands, vec![0b11000000]);
    }

    #[test]
    fn clear_issues_the_clear_command() {
        let mut lcd = CapturedLcd::default();
        lcd.clear().unwrap();
        assert_eq!(lcd.commands, vec![0b00000001]);
    }
}
