use crate::error::Xresult;
use crate::state::State;

use std::fmt;

pub type Xstr = arcstr::ArcStr;
pub type Xint = i64;
pub type XfnType = fn(&mut State) -> Xresult;

pub const FALSE: Xint = 0;
pub const TRUE: Xint = -1;

pub fn flag(t: bool) -> Xint {
    if t {
        TRUE
    } else {
        FALSE
    }
}

#[derive(Clone, Copy)]
pub struct XfnPtr(pub XfnType);

impl PartialEq for XfnPtr {
    fn eq(&self, other: &Self) -> bool {
        (self.0 as usize) == (other.0 as usize)
    }
}

impl fmt::Debug for XfnPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0 as usize)
    }
}

#[test]
fn test_flag() {
    assert_eq!(TRUE, flag(true));
    assert_eq!(FALSE, flag(false));
}
