pub mod error;
pub mod cell;
pub mod lex;
pub mod stack;
pub mod memory;
pub mod dict;
pub mod opcodes;
pub mod flow;
pub mod state;
mod arith;
mod words;
pub mod file;
#[cfg(feature = "stdio")]
pub mod repl;

pub mod prelude {
    pub type Xstate = crate::state::State;
    pub use crate::cell::{Xint, Xstr, FALSE, TRUE};
    pub use crate::error::{Xerr, Xresult, Xresult1, OK};
    pub use crate::state::{Status, Wait};
}
