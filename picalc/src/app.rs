//! The calculator itself: resolving key presses into symbols and sequencing
//! them into evaluated two-operand expressions.

use crate::config::Config;
use crate::pace::Pace;
use crate::screen::Screen;
use crate::symbol::Symbol;
use log::{debug, warn};
use picalc_gpio::GpioResult;
use picalc_gpio::keypad::{KeyIndex, Keypad};
use std::time::Duration;
use thiserror::Error;

/// Decimal places shown for division results.
const FRACTION_DECIMALS: usize = 2;

/// What went wrong while assembling or evaluating one expression.
///
/// Every variant maps to a message on the second display line and none of
/// them is fatal; the loop always comes back for the next expression.
/// Hardware faults travel separately as [picalc_gpio::GpioError].
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum InputError {
    /// A key event fizzled out before the sweep could resolve it.
    #[error("no key detected")]
    NotDetected,
    /// A key resolved fine but is not allowed at this position.
    #[error("unexpected key for this position")]
    InvalidInput,
    /// The assembled expression cannot be evaluated.
    #[error("expression cannot be evaluated")]
    InvalidExpression,
}

impl InputError {
    /// The message shown on the second display line for this error.
    fn message(self) -> &'static str {
        match self {
            InputError::NotDetected => "ERROR IN KEYPAD!",
            InputError::InvalidInput => "INVALID INPUT!",
            InputError::InvalidExpression => "INVALID EXPR!",
        }
    }
}

/// An evaluated expression.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Value {
    Integer(i32),
    Fraction(f32),
}

/// Applies `operator` to the operands.
///
/// Division is the one fractional case; everything else stays integral.
pub fn evaluate(lhs: i32, operator: Symbol, rhs: i32) -> Result<Value, InputError> {
    match operator {
        Symbol::Plus => Ok(Value::Integer(lhs + rhs)),
        Symbol::Minus => Ok(Value::Integer(lhs - rhs)),
        Symbol::Times => Ok(Value::Integer(lhs * rhs)),
        Symbol::Divide => {
            if rhs == 0 {
                Err(InputError::InvalidExpression)
            } else {
                Ok(Value::Fraction(lhs as f32 / rhs as f32))
            }
        }
        // `C` and `=` resolve as operator-position symbols but carry no
        // arithmetic meaning.
        _ => Err(InputError::InvalidExpression),
    }
}

/// Outcome of a resolver step: a value, or the input error to display.
type Resolved<T> = Result<T, InputError>;

/// The calculator loop body over its three collaborators.
///
/// Owns nothing but the pacing; the in-progress expression lives on the
/// stack of [Calculator::run_cycle] and dies with it.
pub struct Calculator<'a> {
    keypad: &'a dyn Keypad<Key = KeyIndex>,
    screen: &'a mut dyn Screen,
    pace: &'a dyn Pace,
    echo_delay: Duration,
    hold_delay: Duration,
}

impl<'a> Calculator<'a> {
    pub fn new(
        keypad: &'a dyn Keypad<Key = KeyIndex>,
        screen: &'a mut dyn Screen,
        pace: &'a dyn Pace,
        config: &Config,
    ) -> Self {
        Calculator {
            keypad,
            screen,
            pace,
            echo_delay: config.echo_delay(),
            hold_delay: config.hold_delay(),
        }
    }

    /// Runs one full cycle: number, operator, number, equals, then the
    /// result or error display, the hold, and the clear.
    ///
    /// Both outcomes reconverge here; the next cycle always starts from a
    /// blank display and a blank expression.
    pub fn run_cycle(&mut self) -> GpioResult<()> {
        match self.read_expression()? {
            Ok(value) => {
                debug!("Evaluated to {:?}", value);
                self.show_value(value)?;
                self.pace.delay(self.echo_delay);
            }
            Err(error) => {
                warn!("Expression aborted: {}", error);
                self.screen.second_line()?;
                self.screen.print(error.message())?;
            }
        }

        self.pace.delay(self.hold_delay);
        self.screen.clear()?;
        Ok(())
    }

    fn show_value(&mut self, value: Value) -> GpioResult<()> {
        match value {
            Value::Integer(value) => self.screen.print_int(value),
            Value::Fraction(value) => self.screen.print_fraction(value, FRACTION_DECIMALS),
        }
    }

    /// The expression sequence. The inner `Result` carries user input
    /// aborts; the outer one hardware faults.
    fn read_expression(&mut self) -> GpioResult<Resolved<Value>> {
        let lhs = match self.resolve_numeric()? {
            Ok(digit) => digit as i32,
            Err(error) => return Ok(Err(error)),
        };

        let operator = match self.resolve_operator()? {
            Ok(symbol) => symbol,
            Err(error) => return Ok(Err(error)),
        };

        let rhs = match self.resolve_numeric()? {
            Ok(digit) => digit as i32,
            Err(error) => return Ok(Err(error)),
        };

        // The closing key is a gate only; whatever it is, it never becomes
        // part of the expression.
        match self.resolve_operator()? {
            Ok(Symbol::Equals) => {}
            Ok(_) => return Ok(Err(InputError::InvalidInput)),
            Err(error) => return Ok(Err(error)),
        }

        Ok(evaluate(lhs, operator, rhs))
    }

    /// Blocks for a key and accepts only digits.
    fn resolve_numeric(&mut self) -> GpioResult<Resolved<u8>> {
        let Some(symbol) = self.echo_next_key()? else {
            return Ok(Err(InputError::NotDetected));
        };
        Ok(symbol.digit_value().ok_or(InputError::InvalidInput))
    }

    /// Blocks for a key and accepts everything but digits.
    fn resolve_operator(&mut self) -> GpioResult<Resolved<Symbol>> {
        let Some(symbol) = self.echo_next_key()? else {
            return Ok(Err(InputError::NotDetected));
        };
        if symbol.is_digit() {
            Ok(Err(InputError::InvalidInput))
        } else {
            Ok(Ok(symbol))
        }
    }

    /// Blocks for the next key and echoes it on the screen, followed by the
    /// fixed visible pause that paces the input.
    fn echo_next_key(&mut self) -> GpioResult<Option<Symbol>> {
        let Some(key) = self.keypad.read_key()? else {
            return Ok(None);
        };

        let symbol = Symbol::from_key(key);
        debug!("Key {:?} resolved to '{}'", key, symbol.to_char());
        self.screen.print(symbol.to_char().encode_utf8(&mut [0; 4]))?;
        self.pace.delay(self.echo_delay);
        Ok(Some(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[test]
    fn addition_subtraction_multiplication_stay_integral() {
        assert_eq!(evaluate(5, Symbol::Plus, 3), Ok(Value::Integer(8)));
        assert_eq!(evaluate(5, Symbol::Minus, 3), Ok(Value::Integer(2)));
        assert_eq!(evaluate(5, Symbol::Times, 3), Ok(Value::Integer(15)));
    }

    #[test]
    fn division_is_fractional() {
        assert_eq!(evaluate(5, Symbol::Divide, 2), Ok(Value::Fraction(2.5)));
    }

    #[test]
    fn division_by_zero_is_an_error_not_a_value() {
        assert_eq!(
            evaluate(5, Symbol::Divide, 0),
            Err(InputError::InvalidExpression)
        );
    }

    #[test]
    fn non_arithmetic_operators_cannot_evaluate() {
        assert_eq!(
            evaluate(5, Symbol::Clear, 3),
            Err(InputError::InvalidExpression)
        );
        assert_eq!(
            evaluate(5, Symbol::Equals, 3),
            Err(InputError::InvalidExpression)
        );
    }

    /// Feeds a scripted key sequence to the calculator. `None` entries model
    /// presses that vanish before the sweep.
    #[derive(Debug)]
    struct ScriptedKeypad {
        keys: RefCell<VecDeque<Option<KeyIndex>>>,
    }

    impl ScriptedKeypad {
        fn new(legend: &[Option<char>]) -> Self {
            let keys = legend
                .iter()
                .map(|entry| entry.map(key_for))
                .collect();
            Self {
                keys: RefCell::new(keys),
            }
        }

        fn exhausted(&self) -> bool {
            self.keys.borrow().is_empty()
        }
    }

    impl Keypad for ScriptedKeypad {
        type Key = KeyIndex;

        fn scan(&self) -> GpioResult<Option<KeyIndex>> {
            self.read_key()
        }

        fn read_key(&self) -> GpioResult<Option<KeyIndex>> {
            Ok(self
                .keys
                .borrow_mut()
                .pop_front()
                .expect("script ran out of keys"))
        }
    }

    /// Finds the physical key whose legend character is `c`.
    fn key_for(c: char) -> KeyIndex {
        (0..KeyIndex::COUNT as u8)
            .map(|index| KeyIndex::from_index(index).unwrap())
            .find(|&key| Symbol::from_key(key).to_char() == c)
            .expect("character not on the pad")
    }

    #[derive(Debug, PartialEq)]
    enum ScreenOp {
        Print(String),
        SecondLine,
        Clear,
    }

    #[derive(Debug, Default)]
    struct RecordingScreen {
        ops: Vec<ScreenOp>,
    }

    impl Screen for RecordingScreen {
        fn print(&mut self, text: &str) -> GpioResult<()> {
            self.ops.push(ScreenOp::Print(text.to_string()));
            Ok(())
        }

        fn print_int(&mut self, value: i32) -> GpioResult<()> {
            self.print(&value.to_string())
        }

        fn print_fraction(&mut self, value: f32, decimals: usize) -> GpioResult<()> {
            self.print(&format!("{value:.decimals$}"))
        }

        fn second_line(&mut self) -> GpioResult<()> {
            self.ops.push(ScreenOp::SecondLine);
            Ok(())
        }

        fn clear(&mut self) -> GpioResult<()> {
            self.ops.push(ScreenOp::Clear);
            Ok(())
        }
    }

    /// Counts delays instead of sleeping.
    #[derive(Debug, Default)]
    struct CountingPace {
        delays: RefCell<Vec<Duration>>,
    }

    impl Pace for CountingPace {
        fn delay(&self, duration: Duration) {
            self.delays.borrow_mut().push(duration);
        }
    }

    fn zero_delay_config() -> Config {
        Config {
            echo_delay_ms: 0,
            hold_delay_ms: 0,
            release_settle_ms: 0,
        }
    }

    fn print(text: &str) -> ScreenOp {
        ScreenOp::Print(text.to_string())
    }

    fn run_script(legend: &[Option<char>]) -> (Vec<ScreenOp>, ScriptedKeypad) {
        let keypad = ScriptedKeypad::new(legend);
        let mut screen = RecordingScreen::default();
        let pace = CountingPace::default();
        let config = zero_delay_config();

        let mut calculator = Calculator::new(&keypad, &mut screen, &pace, &config);
        calculator.run_cycle().unwrap();

        (screen.ops, keypad)
    }

    #[test]
    fn a_full_expression_is_echoed_evaluated_and_cleared() {
        let script = ['5', '+', '3', '='].map(Some);
        let (ops, keypad) = run_script(&script);

        assert_eq!(
            ops,
            vec![
                print("5"),
                print("+"),
                print("3"),
                print("="),
                print("8"),
                ScreenOp::Clear,
            ]
        );
        assert!(keypad.exhausted());
    }

    #[test]
    fn division_renders_two_decimals() {
        let script = ['5', '/', '2', '='].map(Some);
        let (ops, _) = run_script(&script);

        assert!(ops.contains(&print("2.50")));
        assert_eq!(*ops.last().unwrap(), ScreenOp::Clear);
    }

    #[test]
    fn a_digit_in_the_operator_position_aborts_without_evaluating() {
        let script = ['5', '3'].map(Some);
        let (ops, keypad) = run_script(&script);

        assert_eq!(
            ops,
            vec![
                print("5"),
                print("3"),
                ScreenOp::SecondLine,
                print("INVALID INPUT!"),
                ScreenOp::Clear,
            ]
        );
        // Nothing was evaluated and no further key was consumed.
        assert!(keypad.exhausted());
    }

    #[test]
    fn a_non_equals_closing_key_is_rejected_and_not_reused() {
        let script = ['5', '+', '3', '+'].map(Some);
        let (ops, _) = run_script(&script);

        assert!(ops.contains(&print("INVALID INPUT!")));
        assert!(!ops.contains(&print("8")));
    }

    #[test]
    fn division_by_zero_shows_the_expression_error() {
        let script = ['5', '/', '0', '='].map(Some);
        let (ops, _) = run_script(&script);

        assert!(ops.contains(&ScreenOp::SecondLine));
        assert!(ops.contains(&print("INVALID EXPR!")));
    }

    #[test]
    fn clear_as_the_operator_fails_at_evaluation() {
        let script = ['5', 'C', '3', '='].map(Some);
        let (ops, _) = run_script(&script);

        assert!(ops.contains(&print("INVALID EXPR!")));
    }

    #[test]
    fn a_vanished_press_reports_the_keypad_error() {
        let (ops, _) = run_script(&[None]);

        assert_eq!(
            ops,
            vec![
                ScreenOp::SecondLine,
                print("ERROR IN KEYPAD!"),
                ScreenOp::Clear,
            ]
        );
    }

    #[test]
    fn cycles_are_independent() {
        let keypad = ScriptedKeypad::new(&[
            // First cycle aborts with a digit in the operator position.
            Some('5'),
            Some('3'),
            // Second cycle evaluates cleanly.
            Some('7'),
            Some('-'),
            Some('2'),
            Some('='),
        ]);
        let mut screen = RecordingScreen::default();
        let pace = CountingPace::default();
        let config = zero_delay_config();

        let mut calculator = Calculator::new(&keypad, &mut screen, &pace, &config);
        calculator.run_cycle().unwrap();
        calculator.run_cycle().unwrap();

        let ops = &screen.ops;
        assert!(ops.contains(&print("INVALID INPUT!")));
        // The second cycle runs from scratch: nothing of the aborted `5 3`
        // shows up in its result.
        assert_eq!(
            ops[ops.len() - 6..],
            [
                print("7"),
                print("-"),
                print("2"),
                print("="),
                print("5"),
                ScreenOp::Clear,
            ]
        );
        assert!(keypad.exhausted());
    }

    #[test]
    fn every_key_echo_is_paced() {
        let keypad = ScriptedKeypad::new(&['5', '+', '3', '='].map(Some));
        let mut screen = RecordingScreen::default();
        let pace = CountingPace::default();
        let config = Config {
            echo_delay_ms: 7,
            hold_delay_ms: 31,
            release_settle_ms: 0,
        };

        let mut calculator = Calculator::new(&keypad, &mut screen, &pace, &config);
        calculator.run_cycle().unwrap();

        let delays = pace.delays.borrow();
        // Four key echoes plus the result echo, then the final hold.
        let echo = Duration::from_millis(7);
        let hold = Duration::from_millis(31);
        assert_eq!(*delays, vec![echo, echo, echo, echo, echo, hold]);
    }
}
