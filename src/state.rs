use crate::cell::*;
use crate::dict::*;
use crate::error::*;
use crate::flow::*;
use crate::lex::*;
use crate::memory::Memory;
use crate::opcodes::*;
use crate::stack::Stack;

use log::{debug, trace, warn};
use std::collections::VecDeque;
use std::rc::Rc;

/// External event a suspended line is waiting for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wait {
    Key,
    Timer(Xint),
}

/// How far a submitted line got.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    Ok,
    // a definition is still open at the end of the line
    Defining,
    Suspended(Wait),
    // another line is suspended, this one runs after it
    Queued,
}

#[derive(Clone)]
enum Frame {
    Block {
        body: Body,
        pc: usize,
    },
    CountedLoop {
        body: Body,
        plus_loop: bool,
        index: Xint,
        limit: Xint,
        ascending: bool,
    },
    PostConditionLoop {
        body: Body,
    },
}

enum Step {
    Enter(Node),
    Leave,
    Iterate,
    Repeat,
}

struct PendingDefinition {
    name: String,
    actions: Vec<Action>,
}

struct PendingBlock {
    actions: Vec<Action>,
    depth: usize,
}

const LAST_KEY: &str = "last-key";

pub type OutputFn = Box<dyn FnMut(&str)>;

pub struct State {
    data_stack: Stack,
    return_stack: Stack,
    dict: Dictionary,
    memory: Memory,
    frames: Vec<Frame>,
    line: Option<Lex>,
    rs_len: usize,
    defining: Option<PendingDefinition>,
    block: Option<PendingBlock>,
    wait: Option<Wait>,
    queue: VecDeque<String>,
    console: Option<String>,
    output: Option<OutputFn>,
    last_error: Option<Xerr>,
}

impl Default for State {
    fn default() -> Self {
        let mut xs = Self {
            data_stack: Stack::argument(),
            return_stack: Stack::returns(),
            dict: Dictionary::default(),
            memory: Memory::default(),
            frames: Vec::new(),
            line: None,
            rs_len: 0,
            defining: None,
            block: None,
            wait: None,
            queue: VecDeque::new(),
            console: None,
            output: None,
            last_error: None,
        };
        #[cfg(not(feature = "stdio"))]
        {
            xs.console = Some(String::new());
        }
        for c in CONTROL_WORDS.iter() {
            xs.dict.add(c.name(), Definition::Control(*c));
        }
        xs
    }
}

impl State {
    /// Interpreter with control words only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpreter with the built-in word set and the prelude loaded.
    pub fn boot() -> Xresult1<State> {
        let mut xs = State::new();
        crate::arith::load(&mut xs)?;
        crate::words::load(&mut xs)?;
        xs.load_prelude()?;
        Ok(xs)
    }

    fn load_prelude(&mut self) -> Xresult {
        let saved = self.console.replace(String::new());
        let res = self.load_source(include_str!("prelude.fs"));
        self.console = saved;
        res
    }

    /// Run every line of the source, stopping at the first error.
    pub fn load_source(&mut self, src: &str) -> Xresult {
        for line in src.lines() {
            self.read_line(line)?;
        }
        OK
    }

    pub fn register_primitive(&mut self, name: &str, f: XfnType) -> Xresult {
        self.dict.add(name, Definition::Primitive(XfnPtr(f)));
        OK
    }

    pub fn create_variable(&mut self, name: &str) -> usize {
        let a = self.memory.add_variable(name);
        self.dict.add(name, Definition::Value(a as Xint));
        debug!("variable {} at {}", name, a);
        a
    }

    pub fn create_constant(&mut self, name: &str, val: Xint) {
        self.dict.add(name, Definition::Value(val));
        debug!("constant {} = {}", name, val);
    }

    pub fn lookup(&self, name: &str) -> Option<Rc<Definition>> {
        self.dict.lookup(name)
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn push_data(&mut self, val: Xint) {
        self.data_stack.push(val);
    }

    pub fn pop_data(&mut self) -> Xresult1<Xint> {
        self.data_stack.pop()
    }

    /// Value at depth n, 0 is the top.
    pub fn get_data(&self, n: usize) -> Option<Xint> {
        self.data_stack.peek(n + 1).ok()
    }

    pub fn data_depth(&self) -> usize {
        self.data_stack.len()
    }

    pub fn data_stack(&self) -> &[Xint] {
        self.data_stack.as_slice()
    }

    pub fn push_return(&mut self, val: Xint) {
        self.return_stack.push(val);
    }

    pub fn pop_return(&mut self) -> Xresult1<Xint> {
        self.return_stack.pop()
    }

    /// Value at offset n from the top of the return stack, 1 is the top.
    pub fn peek_return(&self, n: usize) -> Xresult1<Xint> {
        self.return_stack.peek(n)
    }

    pub fn return_depth(&self) -> usize {
        self.return_stack.len()
    }

    pub fn get_stack_display(&self) -> String {
        self.data_stack.print()
    }

    pub fn is_defining(&self) -> bool {
        self.defining.is_some()
    }

    pub fn waiting_for(&self) -> Option<Wait> {
        self.wait
    }

    pub fn last_error(&self) -> Option<&Xerr> {
        self.last_error.as_ref()
    }

    /// Pause the running line until the host delivers the event.
    pub fn suspend(&mut self, w: Wait) {
        debug!("suspend {:?}", w);
        self.wait = Some(w);
    }

    pub fn set_output(&mut self, f: OutputFn) {
        self.output = Some(f);
    }

    pub fn capture_stdout(&mut self) {
        if self.console.is_none() {
            self.console = Some(String::new());
        }
    }

    pub fn console(&mut self) -> Option<&mut String> {
        self.console.as_mut()
    }

    pub fn take_console(&mut self) -> String {
        self.console
            .as_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn print(&mut self, msg: &str) {
        if let Some(f) = self.output.as_mut() {
            f(msg);
        } else if let Some(out) = self.console.as_mut() {
            out.push_str(msg);
        } else {
            #[cfg(feature = "stdio")]
            if let Err(e) = crate::file::write_to_stdout(msg.as_bytes()) {
                warn!("{}", e);
            }
        }
    }

    /// Submit one line. The output goes to the console or output callback,
    /// the result is the status of the line or the error that aborted it.
    pub fn read_line(&mut self, line: &str) -> Xresult1<Status> {
        if self.line.is_some() {
            debug!("queued {:?}", line);
            self.queue.push_back(line.to_string());
            return Ok(Status::Queued);
        }
        self.start_line(line);
        self.continue_line()
    }

    /// Submit lines in order. Errors don't stop the batch, the status of the
    /// last line is returned.
    pub fn read_lines<'a, I>(&mut self, lines: I) -> Xresult1<Status>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut result = Ok(Status::Ok);
        for line in lines {
            result = self.read_line(line);
        }
        result
    }

    pub fn deliver_key(&mut self, code: Xint) -> Xresult1<Status> {
        match self.wait {
            Some(Wait::Key) => {
                debug!("key {}", code);
                self.wait = None;
                self.record_key(code);
                self.push_data(code);
                self.resume()
            }
            Some(w) => {
                warn!("key {} delivered while waiting for {:?}", code, w);
                Err(Xerr::UnexpectedEvent)
            }
            None => {
                warn!("key {} delivered with nothing suspended", code);
                Err(Xerr::NotSuspended)
            }
        }
    }

    /// Store a key press in `last-key` without resuming anything.
    pub fn record_key(&mut self, code: Xint) {
        if let Some(a) = self.memory.get_variable(LAST_KEY) {
            self.memory.set_value(a, code);
        }
    }

    pub fn deliver_timer_elapsed(&mut self) -> Xresult1<Status> {
        match self.wait {
            Some(Wait::Timer(_)) => {
                debug!("timer elapsed");
                self.wait = None;
                self.resume()
            }
            Some(w) => {
                warn!("timer delivered while waiting for {:?}", w);
                Err(Xerr::UnexpectedEvent)
            }
            None => {
                warn!("timer delivered with nothing suspended");
                Err(Xerr::NotSuspended)
            }
        }
    }

    fn resume(&mut self) -> Xresult1<Status> {
        let mut result = self.continue_line();
        while self.wait.is_none() {
            match self.queue.pop_front() {
                Some(line) => {
                    self.start_line(&line);
                    result = self.continue_line();
                }
                None => break,
            }
        }
        result
    }

    fn start_line(&mut self, line: &str) {
        let lex = Lex::from_str(line);
        self.rs_len = self.return_stack.len();
        self.line = Some(lex);
    }

    fn continue_line(&mut self) -> Xresult1<Status> {
        match self.interpret() {
            Ok(Status::Suspended(w)) => Ok(Status::Suspended(w)),
            Ok(status) => {
                self.line = None;
                if status == Status::Ok {
                    self.print(" ok");
                }
                Ok(status)
            }
            Err(e) => {
                self.abandon_line();
                self.print(&format!(" {}", e));
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn abandon_line(&mut self) {
        self.frames.clear();
        self.line = None;
        self.defining = None;
        self.block = None;
        self.wait = None;
        self.return_stack.truncate(self.rs_len);
    }

    fn interpret(&mut self) -> Xresult1<Status> {
        loop {
            self.run()?;
            if let Some(w) = self.wait {
                return Ok(Status::Suspended(w));
            }
            let tok = match self.line.as_mut() {
                Some(lex) => lex.next(),
                None => Tok::EndOfInput,
            };
            if tok == Tok::EndOfInput {
                break;
            }
            let action = self.resolve(tok)?;
            trace!("{:?}", action);
            self.dispatch(action)?;
        }
        if self.block.take().is_some() {
            return Err(Xerr::UnbalancedControlStructure);
        }
        if self.defining.is_some() {
            Ok(Status::Defining)
        } else {
            Ok(Status::Ok)
        }
    }

    fn resolve(&self, tok: Tok) -> Xresult1<Action> {
        match tok {
            Tok::Str(s) => Ok(Action::PushString(s.into())),
            Tok::Word(name) => match self.dict.lookup(&name) {
                Some(def) => {
                    if let Definition::Control(c) = *def {
                        return Ok(Action::Control(c));
                    }
                    Ok(Action::Invoke(name.into(), def))
                }
                None => match parse_number(&name) {
                    Some(n) => Ok(Action::PushNumber(n)),
                    None => Err(Xerr::MissingWord(name.into())),
                },
            },
            Tok::EndOfInput => Err(Xerr::ExpectingName),
        }
    }

    fn next_name(&mut self) -> Xresult1<String> {
        let tok = match self.line.as_mut() {
            Some(lex) => lex.next(),
            None => Tok::EndOfInput,
        };
        match tok {
            Tok::Word(name) => Ok(name),
            _ => Err(Xerr::ExpectingName),
        }
    }

    fn dispatch(&mut self, action: Action) -> Xresult {
        if self.defining.is_some() {
            return self.compile_action(action);
        }
        if self.block.is_some() {
            return self.gather_action(action);
        }
        match action {
            Action::Control(Control::Colon) => {
                let name = self.next_name()?;
                debug!("defining {}", name);
                self.defining = Some(PendingDefinition {
                    name,
                    actions: Vec::new(),
                });
                OK
            }
            Action::Control(Control::Variable) => {
                let name = self.next_name()?;
                self.create_variable(&name);
                OK
            }
            Action::Control(Control::Constant) => {
                let name = self.next_name()?;
                let val = self.pop_data()?;
                self.create_constant(&name, val);
                OK
            }
            Action::Control(c) if c.is_opener() => {
                self.block = Some(PendingBlock {
                    actions: vec![action],
                    depth: 1,
                });
                OK
            }
            Action::Control(_) => Err(Xerr::UnbalancedControlStructure),
            action => self.execute_action(&action),
        }
    }

    fn compile_action(&mut self, action: Action) -> Xresult {
        if action == Action::Control(Control::Semicolon) {
            if let Some(def) = self.defining.take() {
                let node = compile(&def.actions)?;
                self.dict.add(&def.name, Definition::Compiled(node));
                debug!("defined {}", def.name);
            }
        } else if let Some(def) = self.defining.as_mut() {
            def.actions.push(action);
        }
        OK
    }

    fn gather_action(&mut self, action: Action) -> Xresult {
        let complete = match self.block.as_mut() {
            Some(block) => {
                if let Action::Control(c) = &action {
                    if c.is_opener() {
                        block.depth += 1;
                    } else if c.is_closer() {
                        block.depth -= 1;
                    }
                }
                block.actions.push(action);
                block.depth == 0
            }
            None => false,
        };
        if complete {
            if let Some(block) = self.block.take() {
                let node = compile(&block.actions)?;
                self.enter(&node)?;
            }
        }
        OK
    }

    fn execute_action(&mut self, action: &Action) -> Xresult {
        match action {
            Action::PushNumber(n) => {
                self.push_data(*n);
                OK
            }
            Action::PushString(s) => {
                self.print(s);
                OK
            }
            Action::Invoke(_, def) => self.invoke(def),
            Action::Control(c) => Err(Xerr::InterpretOnly(c.name().into())),
        }
    }

    fn invoke(&mut self, def: &Definition) -> Xresult {
        match def {
            Definition::Primitive(x) => (x.0)(self),
            Definition::Compiled(node) => self.enter(node),
            Definition::Value(n) => {
                self.push_data(*n);
                OK
            }
            Definition::Control(c) => Err(Xerr::InterpretOnly(c.name().into())),
        }
    }

    fn push_block(&mut self, body: &Body) {
        self.frames.push(Frame::Block {
            body: body.clone(),
            pc: 0,
        });
    }

    // Schedule a node. Leaves run at once, structures push frames for run().
    fn enter(&mut self, node: &Node) -> Xresult {
        match node {
            Node::Sequence(body) => {
                self.push_block(body);
                OK
            }
            Node::Conditional {
                consequent,
                alternative,
            } => {
                let t = self.pop_data()?;
                self.push_block(if t != FALSE { consequent } else { alternative });
                OK
            }
            Node::CountedLoop { body, plus_loop } => {
                let start = self.pop_data()?;
                let limit = self.pop_data()?;
                let ascending = limit > start;
                if in_bounds(start, limit, ascending) {
                    self.return_stack.push(start);
                    self.frames.push(Frame::CountedLoop {
                        body: body.clone(),
                        plus_loop: *plus_loop,
                        index: start,
                        limit,
                        ascending,
                    });
                    self.push_block(body);
                }
                OK
            }
            Node::PostConditionLoop(body) => {
                self.frames.push(Frame::PostConditionLoop { body: body.clone() });
                self.push_block(body);
                OK
            }
            Node::Leaf(action) => self.execute_action(action),
        }
    }

    /// Step the scheduled frames until they are exhausted or something
    /// suspends. A loop frame on top means its body just finished.
    pub fn run(&mut self) -> Xresult {
        while self.wait.is_none() {
            let step = match self.frames.last_mut() {
                None => break,
                Some(Frame::Block { body, pc }) => match body.get(*pc) {
                    Some(node) => {
                        *pc += 1;
                        Step::Enter(node.clone())
                    }
                    None => Step::Leave,
                },
                Some(Frame::CountedLoop { .. }) => Step::Iterate,
                Some(Frame::PostConditionLoop { .. }) => Step::Repeat,
            };
            match step {
                Step::Enter(node) => self.enter(&node)?,
                Step::Leave => {
                    self.frames.pop();
                }
                Step::Iterate => self.next_iteration()?,
                Step::Repeat => self.next_repetition()?,
            }
        }
        OK
    }

    fn next_iteration(&mut self) -> Xresult {
        let (plus_loop, ascending) = match self.frames.last() {
            Some(Frame::CountedLoop {
                plus_loop,
                ascending,
                ..
            }) => (*plus_loop, *ascending),
            _ => return Err(Xerr::UnbalancedControlStructure),
        };
        self.return_stack.pop()?;
        let step = if plus_loop {
            self.pop_data()?
        } else if ascending {
            1
        } else {
            -1
        };
        let next = match self.frames.last_mut() {
            Some(Frame::CountedLoop {
                body,
                index,
                limit,
                ascending,
                ..
            }) => {
                *index = index.wrapping_add(step);
                if in_bounds(*index, *limit, *ascending) {
                    Some((*index, body.clone()))
                } else {
                    None
                }
            }
            _ => None,
        };
        match next {
            Some((index, body)) => {
                self.return_stack.push(index);
                self.push_block(&body);
            }
            None => {
                self.frames.pop();
            }
        }
        OK
    }

    fn next_repetition(&mut self) -> Xresult {
        let t = self.pop_data()?;
        if t == TRUE {
            self.frames.pop();
        } else if let Some(Frame::PostConditionLoop { body }) = self.frames.last() {
            let body = body.clone();
            self.push_block(&body);
        }
        OK
    }
}

// the limit itself is never visited, in either direction
fn in_bounds(index: Xint, limit: Xint, ascending: bool) -> bool {
    if ascending {
        index < limit
    } else {
        index > limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boot() -> State {
        let mut xs = State::boot().unwrap();
        xs.capture_stdout();
        xs
    }

    fn eval(xs: &mut State, line: &str) -> String {
        xs.take_console();
        let _ = xs.read_line(line);
        xs.take_console()
    }

    #[test]
    fn test_ok() {
        let mut xs = boot();
        assert_eq!(" ok", eval(&mut xs, "3 4 +"));
        assert_eq!(&[7], xs.data_stack());
        assert_eq!(" ok", eval(&mut xs, ""));
        assert_eq!(" ok", eval(&mut xs, "( nothing here )"));
    }

    #[test]
    fn test_missing_word() {
        let mut xs = boot();
        assert_eq!(" foo ?", eval(&mut xs, "1 foo 2"));
        assert_eq!(&[1], xs.data_stack());
        assert_eq!(Some(&Xerr::MissingWord("foo".into())), xs.last_error());
        assert_eq!(Err(Xerr::MissingWord("bar".into())), xs.read_line("bar"));
    }

    #[test]
    fn test_underflow() {
        let mut xs = boot();
        assert_eq!(Err(Xerr::StackUnderflow), xs.read_line("1 +"));
        assert_eq!(" Stack underflow", xs.take_console());
        assert_eq!(Err(Xerr::StackUnderflow), xs.read_line("drop"));
        assert_eq!(Err(Xerr::ReturnStackUnderflow), xs.read_line("r>"));
    }

    #[test]
    fn test_definition() {
        let mut xs = boot();
        assert_eq!(" ok", eval(&mut xs, ": add-10 10 + ;"));
        eval(&mut xs, "5 add-10");
        assert_eq!(&[15], xs.data_stack());
        eval(&mut xs, "ADD-10");
        assert_eq!(&[25], xs.data_stack());
    }

    #[test]
    fn test_multiline_definition() {
        let mut xs = boot();
        assert_eq!(Ok(Status::Defining), xs.read_line(": sq"));
        assert!(xs.is_defining());
        assert_eq!("", xs.take_console());
        assert_eq!(Ok(Status::Defining), xs.read_line("  dup *"));
        assert_eq!(Ok(Status::Ok), xs.read_line(";"));
        assert!(!xs.is_defining());
        eval(&mut xs, "7 sq");
        assert_eq!(&[49], xs.data_stack());
    }

    #[test]
    fn test_if_else() {
        let mut xs = boot();
        eval(&mut xs, ": foo -1 if 1 else 2 then 3 ;");
        eval(&mut xs, "foo");
        assert_eq!(&[1, 3], xs.data_stack());
        let mut xs = boot();
        eval(&mut xs, ": bar if 1 else 2 then ;");
        eval(&mut xs, "0 bar 5 bar");
        assert_eq!(&[2, 1], xs.data_stack());
        eval(&mut xs, "0 if 10 then");
        assert_eq!(&[2, 1], xs.data_stack());
    }

    #[test]
    fn test_unbalanced() {
        let mut xs = boot();
        assert_eq!(
            Err(Xerr::UnbalancedControlStructure),
            xs.read_line(": foo 1 if 2 ;")
        );
        assert_eq!(" Unbalanced control structure", xs.take_console());
        assert!(!xs.is_defining());
        assert!(xs.lookup("foo").is_none());
        assert_eq!(Err(Xerr::UnbalancedControlStructure), xs.read_line("then"));
        assert_eq!(Err(Xerr::UnbalancedControlStructure), xs.read_line("1 if 2"));
        assert_eq!(Err(Xerr::UnbalancedControlStructure), xs.read_line(";"));
        assert_eq!(
            Err(Xerr::UnbalancedControlStructure),
            xs.read_line("4 0 do i begin until")
        );
        assert_eq!(Ok(Status::Ok), xs.read_line("1 2 +"));
    }

    #[test]
    fn test_counted_loop() {
        let mut xs = boot();
        eval(&mut xs, ": foo 4 0 do i . loop ;");
        assert_eq!("0 1 2 3  ok", eval(&mut xs, "foo"));
        assert_eq!(0, xs.data_depth());
        assert_eq!(0, xs.return_depth());
        assert_eq!("3 2 1  ok", eval(&mut xs, "0 3 do i . loop"));
        assert_eq!(" ok", eval(&mut xs, "5 5 do i . loop"));
        assert_eq!(0, xs.data_depth());
    }

    #[test]
    fn test_plus_loop() {
        let mut xs = boot();
        assert_eq!("0 2 4  ok", eval(&mut xs, "6 0 do i . 2 +loop"));
        assert_eq!("10 7 4 1  ok", eval(&mut xs, "0 10 do i . -3 +loop"));
        assert_eq!(0, xs.return_depth());
    }

    #[test]
    fn test_nested_loops() {
        let mut xs = boot();
        eval(&mut xs, ": grid 2 0 do 3 0 do j 10 * i + . loop loop ;");
        assert_eq!("0 1 2 10 11 12  ok", eval(&mut xs, "grid"));
        assert_eq!(0, xs.return_depth());
    }

    #[test]
    fn test_post_condition_loop() {
        let mut xs = boot();
        // runs at least once
        eval(&mut xs, ": once begin 1 -1 until ;");
        eval(&mut xs, "once");
        assert_eq!(&[1], xs.data_stack());
        let mut xs = boot();
        eval(&mut xs, ": countdown begin dup . 1 - dup 0= until drop ;");
        assert_eq!("3 2 1  ok", eval(&mut xs, "3 countdown"));
        assert_eq!(0, xs.data_depth());
        // only the TRUE sentinel stops the loop
        let mut xs = boot();
        eval(&mut xs, "variable n");
        eval(&mut xs, "begin n @ 1 + dup n ! dup 3 = if -1 else 1 then until");
        assert_eq!(&[1, 2, 3], xs.data_stack());
    }

    #[test]
    fn test_variables() {
        let mut xs = boot();
        eval(&mut xs, "variable v");
        eval(&mut xs, "100 v !");
        eval(&mut xs, "v @");
        assert_eq!(&[100], xs.data_stack());
        let a = xs.memory().get_variable("v").unwrap();
        assert_eq!(100, xs.memory().get_value(a));
        assert_eq!(Err(Xerr::ExpectingName), xs.read_line("variable"));
        assert_eq!(" Expecting name", xs.take_console());
    }

    #[test]
    fn test_constants() {
        let mut xs = boot();
        eval(&mut xs, "42 constant answer");
        assert_eq!(0, xs.data_depth());
        eval(&mut xs, "answer answer +");
        assert_eq!(&[84], xs.data_stack());
        assert_eq!(Err(Xerr::StackUnderflow), xs.read_line("drop constant nope"));
        assert!(xs.lookup("nope").is_none());
    }

    #[test]
    fn test_interpret_only() {
        let mut xs = boot();
        assert_eq!(
            Err(Xerr::InterpretOnly("variable".into())),
            xs.read_line(": foo variable ;")
        );
        assert_eq!(
            Err(Xerr::InterpretOnly(":".into())),
            xs.read_line("1 if : then")
        );
    }

    #[test]
    fn test_shadowing() {
        let mut xs = boot();
        eval(&mut xs, ": foo 1 ;");
        eval(&mut xs, ": bar foo ;");
        eval(&mut xs, ": foo 2 ;");
        eval(&mut xs, "foo bar");
        assert_eq!(&[2, 1], xs.data_stack());
        // a word is not visible inside its own body
        let mut xs = boot();
        assert_eq!(Err(Xerr::MissingWord("rec".into())), xs.read_line(": rec rec ;"));
    }

    #[test]
    fn test_strings() {
        let mut xs = boot();
        assert_eq!("hello world ok", eval(&mut xs, ".\" hello world\""));
        eval(&mut xs, ": hi .\" hi\" ;");
        assert_eq!("hihi ok", eval(&mut xs, "hi hi"));
    }

    #[test]
    fn test_error_restores_return_stack() {
        let mut xs = boot();
        eval(&mut xs, "9 >r");
        assert_eq!(1, xs.return_depth());
        assert_eq!(
            Err(Xerr::StackUnderflow),
            xs.read_line("10 0 do i 5 = if drop drop then loop")
        );
        assert_eq!(1, xs.return_depth());
        eval(&mut xs, "r>");
        assert_eq!(Some(9), xs.get_data(0));
    }

    #[test]
    fn test_key_suspends_line() {
        let mut xs = boot();
        assert_eq!(
            Ok(Status::Suspended(Wait::Key)),
            xs.read_line("1 key 2 +")
        );
        assert_eq!(&[1], xs.data_stack());
        assert_eq!(Some(Wait::Key), xs.waiting_for());
        assert_eq!("", xs.take_console());
        assert_eq!(Ok(Status::Ok), xs.deliver_key(65));
        assert_eq!(&[1, 67], xs.data_stack());
        assert_eq!(" ok", xs.take_console());
        assert_eq!(None, xs.waiting_for());
    }

    #[test]
    fn test_key_inside_loops() {
        let mut xs = boot();
        eval(&mut xs, ": keys 3 0 do 2 0 do key j . i . . loop loop ;");
        let mut status = xs.read_line("keys");
        let mut code = 100;
        while let Ok(Status::Suspended(Wait::Key)) = status {
            status = xs.deliver_key(code);
            code += 1;
        }
        assert_eq!(Ok(Status::Ok), status);
        assert_eq!(106, code);
        assert_eq!(
            "0 0 100 0 1 101 1 0 102 1 1 103 2 0 104 2 1 105  ok",
            xs.take_console()
        );
        assert_eq!(0, xs.data_depth());
        assert_eq!(0, xs.return_depth());
    }

    #[test]
    fn test_key_in_interactive_loop() {
        let mut xs = boot();
        assert_eq!(
            Ok(Status::Suspended(Wait::Key)),
            xs.read_line("begin key dup last-key ! 13 = until last-key @")
        );
        assert_eq!(Ok(Status::Suspended(Wait::Key)), xs.deliver_key(65));
        assert_eq!(Ok(Status::Ok), xs.deliver_key(13));
        assert_eq!(&[13], xs.data_stack());
    }

    #[test]
    fn test_last_key() {
        let mut xs = boot();
        eval(&mut xs, "last-key @");
        assert_eq!(&[0], xs.data_stack());
        xs.read_line("50 sleep last-key @").unwrap();
        xs.record_key(32);
        xs.deliver_timer_elapsed().unwrap();
        assert_eq!(&[0, 32], xs.data_stack());
        xs.read_line("key drop").unwrap();
        xs.deliver_key(13).unwrap();
        eval(&mut xs, "last-key @");
        assert_eq!(&[0, 32, 13], xs.data_stack());
    }

    #[test]
    fn test_key_inside_nested_calls() {
        let mut xs = boot();
        eval(&mut xs, ": a key ;");
        eval(&mut xs, ": b a 1 if a then + ;");
        eval(&mut xs, ": c 2 0 do b loop ;");
        let mut status = xs.read_line("c 9");
        let mut code = 1;
        while let Ok(Status::Suspended(Wait::Key)) = status {
            assert_eq!(1, xs.return_depth());
            status = xs.deliver_key(code);
            code += 1;
        }
        assert_eq!(Ok(Status::Ok), status);
        assert_eq!(5, code);
        assert_eq!(&[3, 7, 9], xs.data_stack());
        assert_eq!(0, xs.return_depth());
        assert_eq!(" ok", xs.take_console());
    }

    #[test]
    fn test_sleep_inside_loop() {
        let mut xs = boot();
        let mut status = xs.read_line("3 0 do i 10 sleep loop 7");
        let mut naps = 0;
        while let Ok(Status::Suspended(Wait::Timer(10))) = status {
            status = xs.deliver_timer_elapsed();
            naps += 1;
        }
        assert_eq!(Ok(Status::Ok), status);
        assert_eq!(3, naps);
        assert_eq!(&[0, 1, 2, 7], xs.data_stack());
        assert_eq!(0, xs.return_depth());
    }

    #[test]
    fn test_bare_markers() {
        let mut xs = boot();
        assert_eq!(Err(Xerr::MissingWord("(".into())), xs.read_line("("));
        assert_eq!(Err(Xerr::MissingWord(".\"".into())), xs.read_line(".\""));
    }

    #[test]
    fn test_sleep() {
        let mut xs = boot();
        assert_eq!(
            Ok(Status::Suspended(Wait::Timer(250))),
            xs.read_line("1 250 sleep 2")
        );
        assert_eq!(Err(Xerr::UnexpectedEvent), xs.deliver_key(32));
        assert_eq!(&[1], xs.data_stack());
        assert_eq!(Ok(Status::Ok), xs.deliver_timer_elapsed());
        assert_eq!(&[1, 2], xs.data_stack());
    }

    #[test]
    fn test_events_without_suspension() {
        let mut xs = boot();
        assert_eq!(Err(Xerr::NotSuspended), xs.deliver_key(1));
        assert_eq!(Err(Xerr::NotSuspended), xs.deliver_timer_elapsed());
        xs.read_line("key").unwrap();
        assert_eq!(Err(Xerr::UnexpectedEvent), xs.deliver_timer_elapsed());
        assert_eq!(Ok(Status::Ok), xs.deliver_key(1));
        assert_eq!(Err(Xerr::NotSuspended), xs.deliver_key(2));
        assert_eq!(&[1], xs.data_stack());
    }

    #[test]
    fn test_lines_run_in_order() {
        let mut xs = boot();
        assert_eq!(Ok(Status::Suspended(Wait::Key)), xs.read_line("1 key"));
        assert_eq!(Ok(Status::Queued), xs.read_line("2"));
        assert_eq!(Ok(Status::Queued), xs.read_line("key 3"));
        assert_eq!(&[1], xs.data_stack());
        assert_eq!(Ok(Status::Suspended(Wait::Key)), xs.deliver_key(10));
        assert_eq!(&[1, 10, 2], xs.data_stack());
        assert_eq!(Ok(Status::Ok), xs.deliver_key(20));
        assert_eq!(&[1, 10, 2, 20, 3], xs.data_stack());
        assert_eq!(" ok ok ok", xs.take_console());
    }

    #[test]
    fn test_read_lines() {
        let mut xs = boot();
        let res = xs.read_lines(vec![": sq", "dup * ;", "oops", "3 sq"]);
        assert_eq!(Ok(Status::Ok), res);
        assert_eq!(&[9], xs.data_stack());
        assert_eq!(" ok oops ? ok", xs.take_console());
    }

    #[test]
    fn test_stack_display() {
        let mut xs = boot();
        eval(&mut xs, "1 2 3");
        assert_eq!("1 2 3 <- Top ", xs.get_stack_display());
        assert_eq!("\n1 2 3 <- Top  ok", eval(&mut xs, ".s"));
    }

    #[test]
    fn test_output_callback() {
        use std::cell::RefCell;
        let buf = Rc::new(RefCell::new(String::new()));
        let mut xs = State::boot().unwrap();
        let sink = buf.clone();
        xs.set_output(Box::new(move |s| sink.borrow_mut().push_str(s)));
        xs.read_line("1 . 2 .").unwrap();
        assert_eq!("1 2  ok", buf.borrow().as_str());
    }

    #[test]
    fn test_register_primitive() {
        let mut xs = State::new();
        xs.capture_stdout();
        xs.register_primitive("seven", |xs| {
            xs.push_data(7);
            OK
        })
        .unwrap();
        assert_eq!(Ok(Status::Ok), xs.read_line("seven 1"));
        assert_eq!(&[7, 1], xs.data_stack());
        assert_eq!(Err(Xerr::MissingWord("dup".into())), xs.read_line("dup"));
    }

    #[test]
    fn test_data_stack_access() {
        let mut xs = boot();
        eval(&mut xs, "1 2 3");
        assert_eq!(Some(3), xs.get_data(0));
        assert_eq!(Some(2), xs.get_data(1));
        assert_eq!(Some(1), xs.get_data(2));
        assert_eq!(None, xs.get_data(3));
        assert_eq!(3, xs.data_depth());
    }
}
