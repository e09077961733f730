use crate::cell::Xint;
use crate::error::*;

/// LIFO of integers. The argument and return stacks differ only in the error
/// raised when popping an empty stack.
#[derive(Debug, Clone)]
pub struct Stack {
    data: Vec<Xint>,
    underflow: Xerr,
}

impl Stack {
    pub fn new(underflow: Xerr) -> Self {
        Self {
            data: Vec::new(),
            underflow,
        }
    }

    pub fn argument() -> Self {
        Self::new(Xerr::StackUnderflow)
    }

    pub fn returns() -> Self {
        Self::new(Xerr::ReturnStackUnderflow)
    }

    pub fn push(&mut self, val: Xint) {
        self.data.push(val);
    }

    pub fn pop(&mut self) -> Xresult1<Xint> {
        self.data.pop().ok_or_else(|| self.underflow.clone())
    }

    /// Look at the n-th value from the top, 1 being the top itself.
    pub fn peek(&self, offset: usize) -> Xresult1<Xint> {
        self.data
            .len()
            .checked_sub(offset.max(1))
            .and_then(|i| self.data.get(i))
            .copied()
            .ok_or_else(|| self.underflow.clone())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    pub fn as_slice(&self) -> &[Xint] {
        &self.data
    }

    /// Bottom to top, followed by the top marker.
    pub fn print(&self) -> String {
        let mut buf = String::new();
        for (i, x) in self.data.iter().enumerate() {
            if i > 0 {
                buf.push(' ');
            }
            buf.push_str(&x.to_string());
        }
        buf.push_str(" <- Top ");
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo() {
        let mut s = Stack::argument();
        for i in 1..=5 {
            s.push(i);
        }
        for i in (1..=5).rev() {
            assert_eq!(Ok(i), s.pop());
        }
        assert_eq!(Err(Xerr::StackUnderflow), s.pop());
        let mut r = Stack::returns();
        assert_eq!(Err(Xerr::ReturnStackUnderflow), r.pop());
    }

    #[test]
    fn test_print() {
        let mut s = Stack::argument();
        assert_eq!(" <- Top ", s.print());
        s.push(1);
        s.push(2);
        s.push(3);
        assert_eq!("1 2 3 <- Top ", s.print());
    }

    #[test]
    fn test_peek() {
        let mut s = Stack::argument();
        assert_eq!(Err(Xerr::StackUnderflow), s.peek(1));
        s.push(1);
        s.push(2);
        assert_eq!(Ok(2), s.peek(1));
        assert_eq!(Ok(1), s.peek(2));
        assert_eq!(Err(Xerr::StackUnderflow), s.peek(3));
        assert_eq!("1 2 <- Top ", s.print());
    }
}
