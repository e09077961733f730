use crate::cell::*;
use crate::dict::Definition;

use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Colon,
    Semicolon,
    If,
    Else,
    Then,
    Do,
    Loop,
    PlusLoop,
    Begin,
    Until,
    Variable,
    Constant,
}

pub const CONTROL_WORDS: [Control; 12] = [
    Control::Colon,
    Control::Semicolon,
    Control::If,
    Control::Else,
    Control::Then,
    Control::Do,
    Control::Loop,
    Control::PlusLoop,
    Control::Begin,
    Control::Until,
    Control::Variable,
    Control::Constant,
];

impl Control {
    pub fn name(&self) -> &'static str {
        match self {
            Control::Colon => ":",
            Control::Semicolon => ";",
            Control::If => "if",
            Control::Else => "else",
            Control::Then => "then",
            Control::Do => "do",
            Control::Loop => "loop",
            Control::PlusLoop => "+loop",
            Control::Begin => "begin",
            Control::Until => "until",
            Control::Variable => "variable",
            Control::Constant => "constant",
        }
    }

    /// Opens a nested structure inside a body.
    pub fn is_opener(&self) -> bool {
        matches!(self, Control::If | Control::Do | Control::Begin)
    }

    /// Closes the innermost structure.
    pub fn is_closer(&self) -> bool {
        matches!(
            self,
            Control::Then | Control::Loop | Control::PlusLoop | Control::Until
        )
    }

    /// Only meaningful at the outer interpreter level, never inside a body.
    pub fn is_interpret_only(&self) -> bool {
        matches!(
            self,
            Control::Colon | Control::Semicolon | Control::Variable | Control::Constant
        )
    }
}

/// The resolved form of one token.
#[derive(Clone)]
pub enum Action {
    PushNumber(Xint),
    PushString(Xstr),
    // the definition is captured when the token is resolved
    Invoke(Xstr, Rc<Definition>),
    Control(Control),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushNumber(n) => write!(f, "PushNumber({})", n),
            Self::PushString(s) => write!(f, "PushString({:?})", s.as_str()),
            Self::Invoke(name, _) => write!(f, "Invoke({})", name),
            Self::Control(c) => write!(f, "Control({})", c.name()),
        }
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::PushNumber(a), Self::PushNumber(b)) => a == b,
            (Self::PushString(a), Self::PushString(b)) => a == b,
            (Self::Invoke(_, a), Self::Invoke(_, b)) => Rc::ptr_eq(a, b),
            (Self::Control(a), Self::Control(b)) => a == b,
            _ => false,
        }
    }
}

#[test]
fn test_control_kinds() {
    for c in CONTROL_WORDS.iter() {
        let kinds = [c.is_opener(), c.is_closer(), c.is_interpret_only()];
        assert!(kinds.iter().filter(|x| **x).count() <= 1, "{}", c.name());
    }
    assert!(!Control::Else.is_opener());
    assert!(!Control::Else.is_closer());
    assert_eq!("+loop", Control::PlusLoop.name());
}
