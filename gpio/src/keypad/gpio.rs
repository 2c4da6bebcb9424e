use crate::debounce::SettleWait;
use crate::keypad::{KeyIndex, Keypad};
use crate::soft::BusLineInput;
use crate::{GpioBusInput, GpioBusOutput, GpioResult};
use log::trace;
use std::fmt::{Debug, Formatter};
use std::hint::spin_loop;
use std::time::Duration;

/// Row drive pattern with every row asserted.
///
/// This is the idle state between sweeps: with all rows active, any pressed
/// key shows up on its column line, which is what press- and release-waiting
/// poll for.
const ROWS_IDLE: u8 = 0b1111;

/// A 4x4 matrix keypad scanned over GPIO.
///
/// The four row lines are outputs, the four column lines are inputs biased
/// towards the inactive state. A pressed key connects its row to its column,
/// so asserting a single row and sampling the columns identifies the key.
pub struct GpioKeypad<'a> {
    rows: &'a dyn GpioBusOutput<4>,
    cols: &'a dyn GpioBusInput<4>,
    release_settle: Duration,
}

impl Debug for GpioKeypad<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GpioKeypad({:?}, {:?})", self.rows, self.cols)
    }
}

impl<'a> GpioKeypad<'a> {
    /// Creates a new `GpioKeypad` over the row output bus and column input
    /// bus. Bus line 0 is row/column 0.
    pub fn new(rows: &'a dyn GpioBusOutput<4>, cols: &'a dyn GpioBusInput<4>) -> Self {
        GpioKeypad {
            rows,
            cols,
            release_settle: Duration::from_millis(20),
        }
    }

    /// Overrides how long a column must stay idle before a key counts as
    /// released.
    pub fn with_release_settle(mut self, release_settle: Duration) -> Self {
        self.release_settle = release_settle;
        self
    }

    /// Drives the row lines to the given 4-bit pattern, bit 0 = row 0.
    ///
    /// Only the four row lines move; the bus abstraction cannot touch the
    /// column inputs or anything else on the port.
    pub fn write_rows(&self, mask: u8) -> GpioResult<()> {
        self.rows.write_nibble(mask)
    }

    /// Samples the four column lines as a nibble, bit 0 = column 0.
    pub fn read_columns(&self) -> GpioResult<u8> {
        self.cols.read_nibble()
    }

    /// Samples a single column line.
    pub fn read_column_state(&self, col: usize) -> GpioResult<bool> {
        self.cols.read_line(col)
    }

    /// Busy-waits until the given column has settled back to idle.
    fn wait_for_release(&self, col: usize) -> GpioResult<()> {
        let line = BusLineInput::new(self.cols, col)?;
        SettleWait::new(&line)
            .with_settle_time(self.release_settle)
            .wait_for(false)
    }
}

impl Keypad for GpioKeypad<'_> {
    type Key = KeyIndex;

    fn scan(&self) -> GpioResult<Option<KeyIndex>> {
        for row in 0..4u8 {
            // Assert only this row; a pressed key in it raises its column.
            self.write_rows(1 << row)?;
            let columns = self.read_columns()?;

            if columns != 0 {
                // Two keys in one row assert two columns at once; the lower
                // column wins. An artifact of the sweep, not a guarantee.
                let col = columns.trailing_zeros() as u8;
                let key = KeyIndex::from_position(row, col);

                self.write_rows(ROWS_IDLE)?;
                self.wait_for_release(col as usize)?;

                if let Some(key) = key {
                    trace!("Scanned key {:?} (columns {:04b})", key, columns);
                    return Ok(Some(key));
                }
            }
        }

        self.write_rows(ROWS_IDLE)?;
        Ok(None)
    }

    fn read_key(&self) -> GpioResult<Option<KeyIndex>> {
        self.write_rows(ROWS_IDLE)?;
        while self.read_columns()? == 0 {
            spin_loop();
        }
        self.scan()
    }
}
