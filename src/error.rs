use crate::cell::Xstr;

use std::fmt;

#[derive(PartialEq, Clone)]
pub enum Xerr {
    // token is neither a word nor a numeral
    MissingWord(Xstr),
    StackUnderflow,
    ReturnStackUnderflow,
    UnbalancedControlStructure,
    ExpectingName,
    InterpretOnly(Xstr),
    DivisionByZero,
    InvalidAddress,
    // external event delivered with nothing waiting for it
    NotSuspended,
    UnexpectedEvent,
    IOError { filename: Xstr, reason: Xstr, },
}

impl fmt::Display for Xerr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Xerr::MissingWord(s) => write!(f, "{} ?", s),
            Xerr::StackUnderflow => f.write_str("Stack underflow"),
            Xerr::ReturnStackUnderflow => f.write_str("Return stack underflow"),
            Xerr::UnbalancedControlStructure => f.write_str("Unbalanced control structure"),
            Xerr::ExpectingName => f.write_str("Expecting name"),
            Xerr::InterpretOnly(s) => write!(f, "{} is interpret only", s),
            Xerr::DivisionByZero => f.write_str("Division by zero"),
            Xerr::InvalidAddress => f.write_str("Invalid address"),
            Xerr::NotSuspended => f.write_str("Nothing is waiting for input"),
            Xerr::UnexpectedEvent => f.write_str("Unexpected event"),
            Xerr::IOError { filename, reason } => write!(f, "{}: {}", filename, reason),
        }
    }
}

impl fmt::Debug for Xerr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Xerr::MissingWord(s) => write!(f, "MissingWord({})", s),
            Xerr::StackUnderflow => f.write_str("StackUnderflow"),
            Xerr::ReturnStackUnderflow => f.write_str("ReturnStackUnderflow"),
            Xerr::UnbalancedControlStructure => f.write_str("UnbalancedControlStructure"),
            Xerr::ExpectingName => f.write_str("ExpectingName"),
            Xerr::InterpretOnly(s) => write!(f, "InterpretOnly({})", s),
            Xerr::DivisionByZero => f.write_str("DivisionByZero"),
            Xerr::InvalidAddress => f.write_str("InvalidAddress"),
            Xerr::NotSuspended => f.write_str("NotSuspended"),
            Xerr::UnexpectedEvent => f.write_str("UnexpectedEvent"),
            Xerr::IOError { filename, reason } => write!(f, "IOError({}: {})", filename, reason),
        }
    }
}

impl std::error::Error for Xerr {}

pub type Xresult = Xresult1<()>;

pub type Xresult1<T> = Result<T, Xerr>;

pub const OK: Xresult = Ok(());

#[test]
fn test_error_messages() {
    assert_eq!("foo ?", Xerr::MissingWord("foo".into()).to_string());
    assert_eq!("Stack underflow", Xerr::StackUnderflow.to_string());
    assert_eq!(
        "Unbalanced control structure",
        Xerr::UnbalancedControlStructure.to_string()
    );
}
