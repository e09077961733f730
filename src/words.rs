use crate::cell::*;
use crate::error::*;
use crate::state::*;

use std::convert::TryFrom;

fn pop_address(xs: &mut State) -> Xresult1<usize> {
    let a = xs.pop_data()?;
    usize::try_from(a).map_err(|_| Xerr::InvalidAddress)
}

fn core_word_print(xs: &mut State) -> Xresult {
    let n = xs.pop_data()?;
    xs.print(&format!("{} ", n));
    OK
}

fn core_word_print_stack(xs: &mut State) -> Xresult {
    let s = xs.get_stack_display();
    xs.print("\n");
    xs.print(&s);
    OK
}

fn core_word_emit(xs: &mut State) -> Xresult {
    let code = xs.pop_data()?;
    let c = u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    xs.print(c.encode_utf8(&mut [0; 4]));
    OK
}

fn core_word_dup(xs: &mut State) -> Xresult {
    let a = xs.pop_data()?;
    xs.push_data(a);
    xs.push_data(a);
    OK
}

fn core_word_drop(xs: &mut State) -> Xresult {
    xs.pop_data()?;
    OK
}

fn core_word_swap(xs: &mut State) -> Xresult {
    let a = xs.pop_data()?;
    let b = xs.pop_data()?;
    xs.push_data(a);
    xs.push_data(b);
    OK
}

fn core_word_over(xs: &mut State) -> Xresult {
    let a = xs.pop_data()?;
    let b = xs.pop_data()?;
    xs.push_data(b);
    xs.push_data(a);
    xs.push_data(b);
    OK
}

fn core_word_rot(xs: &mut State) -> Xresult {
    let a = xs.pop_data()?;
    let b = xs.pop_data()?;
    let c = xs.pop_data()?;
    xs.push_data(b);
    xs.push_data(a);
    xs.push_data(c);
    OK
}

// innermost loop index
fn core_word_i(xs: &mut State) -> Xresult {
    let i = xs.peek_return(1)?;
    xs.push_data(i);
    OK
}

// index of the enclosing loop
fn core_word_j(xs: &mut State) -> Xresult {
    let j = xs.peek_return(2)?;
    xs.push_data(j);
    OK
}

fn core_word_to_r(xs: &mut State) -> Xresult {
    let a = xs.pop_data()?;
    xs.push_return(a);
    OK
}

fn core_word_r_from(xs: &mut State) -> Xresult {
    let a = xs.pop_return()?;
    xs.push_data(a);
    OK
}

fn core_word_store(xs: &mut State) -> Xresult {
    let a = pop_address(xs)?;
    let val = xs.pop_data()?;
    xs.memory_mut().set_value(a, val);
    OK
}

fn core_word_fetch(xs: &mut State) -> Xresult {
    let a = pop_address(xs)?;
    let val = xs.memory().get_value(a);
    xs.push_data(val);
    OK
}

fn core_word_allot(xs: &mut State) -> Xresult {
    let n = pop_address(xs)?;
    xs.memory_mut().allot(n);
    OK
}

fn core_word_key(xs: &mut State) -> Xresult {
    xs.suspend(Wait::Key);
    OK
}

fn core_word_sleep(xs: &mut State) -> Xresult {
    let ms = xs.pop_data()?;
    xs.suspend(Wait::Timer(ms));
    OK
}

fn random_u64() -> Xresult1<u64> {
    let mut buf = [0u8; 8];
    getrandom::getrandom(&mut buf).map_err(|e| Xerr::IOError {
        filename: "random".into(),
        reason: e.to_string().into(),
    })?;
    Ok(u64::from_le_bytes(buf))
}

// ( n -- r ) with r in 0..n, zero when n is not positive
fn core_word_random(xs: &mut State) -> Xresult {
    let n = xs.pop_data()?;
    let r = if n > 0 {
        (random_u64()? % n as u64) as Xint
    } else {
        0
    };
    xs.push_data(r);
    OK
}

pub fn load(xs: &mut State) -> Xresult {
    xs.register_primitive(".", core_word_print)?;
    xs.register_primitive(".s", core_word_print_stack)?;
    xs.register_primitive("emit", core_word_emit)?;
    xs.register_primitive("dup", core_word_dup)?;
    xs.register_primitive("drop", core_word_drop)?;
    xs.register_primitive("swap", core_word_swap)?;
    xs.register_primitive("over", core_word_over)?;
    xs.register_primitive("rot", core_word_rot)?;
    xs.register_primitive("i", core_word_i)?;
    xs.register_primitive("r@", core_word_i)?;
    xs.register_primitive("j", core_word_j)?;
    xs.register_primitive(">r", core_word_to_r)?;
    xs.register_primitive("r>", core_word_r_from)?;
    xs.register_primitive("!", core_word_store)?;
    xs.register_primitive("@", core_word_fetch)?;
    xs.register_primitive("allot", core_word_allot)?;
    xs.register_primitive("key", core_word_key)?;
    xs.register_primitive("sleep", core_word_sleep)?;
    xs.register_primitive("random", core_word_random)?;
    OK
}
