use crate::cell::*;
use crate::error::*;
use crate::state::*;

// second operand is on top: `a b -` computes a - b
fn binary_op(xs: &mut State, op: fn(Xint, Xint) -> Xresult1<Xint>) -> Xresult {
    let b = xs.pop_data()?;
    let a = xs.pop_data()?;
    let c = op(a, b)?;
    xs.push_data(c);
    OK
}

fn wrapping_op(xs: &mut State, op: fn(Xint, Xint) -> Xint) -> Xresult {
    let b = xs.pop_data()?;
    let a = xs.pop_data()?;
    xs.push_data(op(a, b));
    OK
}

fn compare_op(xs: &mut State, op: fn(&Xint, &Xint) -> bool) -> Xresult {
    let b = xs.pop_data()?;
    let a = xs.pop_data()?;
    xs.push_data(flag(op(&a, &b)));
    OK
}

/// Quotient rounded toward negative infinity.
pub fn floor_div(a: Xint, b: Xint) -> Xresult1<Xint> {
    if b == 0 {
        return Err(Xerr::DivisionByZero);
    }
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        Ok(q.wrapping_sub(1))
    } else {
        Ok(q)
    }
}

/// Remainder with the sign of the divisor.
pub fn floor_mod(a: Xint, b: Xint) -> Xresult1<Xint> {
    if b == 0 {
        return Err(Xerr::DivisionByZero);
    }
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(r.wrapping_add(b))
    } else {
        Ok(r)
    }
}

pub fn core_word_add(xs: &mut State) -> Xresult {
    wrapping_op(xs, Xint::wrapping_add)
}

pub fn core_word_sub(xs: &mut State) -> Xresult {
    wrapping_op(xs, Xint::wrapping_sub)
}

pub fn core_word_mul(xs: &mut State) -> Xresult {
    wrapping_op(xs, Xint::wrapping_mul)
}

pub fn core_word_div(xs: &mut State) -> Xresult {
    binary_op(xs, floor_div)
}

pub fn core_word_mod(xs: &mut State) -> Xresult {
    binary_op(xs, floor_mod)
}

pub fn core_word_divmod(xs: &mut State) -> Xresult {
    let b = xs.pop_data()?;
    let a = xs.pop_data()?;
    let r = floor_mod(a, b)?;
    let q = floor_div(a, b)?;
    xs.push_data(r);
    xs.push_data(q);
    OK
}

pub fn core_word_eq(xs: &mut State) -> Xresult {
    compare_op(xs, Xint::eq)
}

pub fn core_word_lt(xs: &mut State) -> Xresult {
    compare_op(xs, Xint::lt)
}

pub fn core_word_gt(xs: &mut State) -> Xresult {
    compare_op(xs, Xint::gt)
}

pub fn core_word_and(xs: &mut State) -> Xresult {
    wrapping_op(xs, std::ops::BitAnd::<Xint>::bitand)
}

pub fn core_word_or(xs: &mut State) -> Xresult {
    wrapping_op(xs, std::ops::BitOr::<Xint>::bitor)
}

pub fn core_word_invert(xs: &mut State) -> Xresult {
    let a = xs.pop_data()?;
    xs.push_data(!a);
    OK
}

pub fn load(xs: &mut State) -> Xresult {
    xs.register_primitive("+", core_word_add)?;
    xs.register_primitive("-", core_word_sub)?;
    xs.register_primitive("*", core_word_mul)?;
    xs.register_primitive("/", core_word_div)?;
    xs.register_primitive("mod", core_word_mod)?;
    xs.register_primitive("/mod", core_word_divmod)?;
    xs.register_primitive("=", core_word_eq)?;
    xs.register_primitive("<", core_word_lt)?;
    xs.register_primitive(">", core_word_gt)?;
    xs.register_primitive("and", core_word_and)?;
    xs.register_primitive("or", core_word_or)?;
    xs.register_primitive("invert", core_word_invert)?;
    OK
}

#[cfg(test)]
fn eval_stack(line: &str) -> Xresult1<Vec<Xint>> {
    let mut xs = State::boot().unwrap();
    xs.capture_stdout();
    xs.read_line(line)?;
    Ok(xs.data_stack().to_vec())
}

#[test]
fn test_arith() {
    assert_eq!(Ok(vec![7]), eval_stack("3 4 +"));
    assert_eq!(Ok(vec![1]), eval_stack("5 4 -"));
    assert_eq!(Ok(vec![-12]), eval_stack("-3 4 *"));
    assert_eq!(Ok(vec![Xint::MIN]), eval_stack("9223372036854775807 1 +"));
    assert_eq!(Err(Xerr::StackUnderflow), eval_stack("1 +"));
}

#[test]
fn test_floor_division() {
    assert_eq!(Ok(3), floor_div(7, 2));
    assert_eq!(Ok(-4), floor_div(-7, 2));
    assert_eq!(Ok(-4), floor_div(7, -2));
    assert_eq!(Ok(3), floor_div(-7, -2));
    assert_eq!(Ok(1), floor_mod(7, 2));
    assert_eq!(Ok(1), floor_mod(-7, 2));
    assert_eq!(Ok(-1), floor_mod(7, -2));
    assert_eq!(Ok(-1), floor_mod(-7, -2));
    assert_eq!(Ok(0), floor_mod(Xint::MIN, -1));
    assert_eq!(Err(Xerr::DivisionByZero), floor_div(1, 0));
    assert_eq!(Err(Xerr::DivisionByZero), floor_mod(1, 0));
    assert_eq!(Ok(vec![-4]), eval_stack("-7 2 /"));
    assert_eq!(Ok(vec![1, -4]), eval_stack("-7 2 /mod"));
    assert_eq!(Ok(vec![2]), eval_stack("17 5 mod"));
    assert_eq!(Err(Xerr::DivisionByZero), eval_stack("1 0 /"));
}

#[test]
fn test_compare() {
    assert_eq!(Ok(vec![TRUE]), eval_stack("2 2 ="));
    assert_eq!(Ok(vec![FALSE]), eval_stack("2 3 ="));
    assert_eq!(Ok(vec![TRUE]), eval_stack("2 3 <"));
    assert_eq!(Ok(vec![FALSE]), eval_stack("2 3 >"));
    assert_eq!(Ok(vec![TRUE, FALSE]), eval_stack("-1 -5 > -1 -5 <"));
}

#[test]
fn test_bitwise() {
    assert_eq!(Ok(vec![0b100]), eval_stack("0b110 0b101 and"));
    assert_eq!(Ok(vec![0b111]), eval_stack("0b110 0b101 or"));
    assert_eq!(Ok(vec![FALSE]), eval_stack("-1 invert"));
    assert_eq!(Ok(vec![TRUE]), eval_stack("0 invert"));
}
