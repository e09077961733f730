use crate::error::*;
use crate::opcodes::*;

use std::rc::Rc;

pub type Body = Rc<[Node]>;

/// Compiled body of a word. Children are owned by their parent only.
#[derive(Debug, Clone)]
pub enum Node {
    Sequence(Body),
    Conditional { consequent: Body, alternative: Body },
    CountedLoop { body: Body, plus_loop: bool },
    PostConditionLoop(Body),
    Leaf(Action),
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum Open {
    Conditional,
    CountedLoop,
    PostConditionLoop,
}

struct OpenFrame {
    kind: Open,
    consequent: Vec<Node>,
    alternative: Vec<Node>,
    in_alternative: bool,
}

impl OpenFrame {
    fn new(kind: Open) -> Self {
        Self {
            kind,
            consequent: Vec::new(),
            alternative: Vec::new(),
            in_alternative: false,
        }
    }

    fn insertion_point(&mut self) -> &mut Vec<Node> {
        if self.in_alternative {
            &mut self.alternative
        } else {
            &mut self.consequent
        }
    }
}

struct Compiler {
    root: Vec<Node>,
    open: Vec<OpenFrame>,
}

impl Compiler {
    fn insertion_point(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(frame) => frame.insertion_point(),
            None => &mut self.root,
        }
    }

    fn close(&mut self, kind: Open) -> Xresult1<OpenFrame> {
        match self.open.last() {
            Some(frame) if frame.kind == kind => (),
            _ => return Err(Xerr::UnbalancedControlStructure),
        }
        self.open.pop().ok_or(Xerr::UnbalancedControlStructure)
    }

    fn control(&mut self, c: Control) -> Xresult {
        let node = match c {
            Control::If => {
                self.open.push(OpenFrame::new(Open::Conditional));
                return OK;
            }
            Control::Do => {
                self.open.push(OpenFrame::new(Open::CountedLoop));
                return OK;
            }
            Control::Begin => {
                self.open.push(OpenFrame::new(Open::PostConditionLoop));
                return OK;
            }
            Control::Else => {
                match self.open.last_mut() {
                    Some(frame) if frame.kind == Open::Conditional => {
                        frame.in_alternative = true;
                    }
                    _ => return Err(Xerr::UnbalancedControlStructure),
                }
                return OK;
            }
            Control::Then => {
                let frame = self.close(Open::Conditional)?;
                Node::Conditional {
                    consequent: frame.consequent.into(),
                    alternative: frame.alternative.into(),
                }
            }
            Control::Loop | Control::PlusLoop => {
                let frame = self.close(Open::CountedLoop)?;
                Node::CountedLoop {
                    body: frame.consequent.into(),
                    plus_loop: c == Control::PlusLoop,
                }
            }
            Control::Until => {
                let frame = self.close(Open::PostConditionLoop)?;
                Node::PostConditionLoop(frame.consequent.into())
            }
            c if c.is_interpret_only() => return Err(Xerr::InterpretOnly(c.name().into())),
            _ => return Err(Xerr::UnbalancedControlStructure),
        };
        self.insertion_point().push(node);
        OK
    }
}

/// Build the control tree for a flat list of actions. The result is always a
/// `Node::Sequence`.
pub fn compile(actions: &[Action]) -> Xresult1<Node> {
    let mut comp = Compiler {
        root: Vec::new(),
        open: Vec::new(),
    };
    for a in actions {
        match a {
            Action::Control(c) => comp.control(*c)?,
            a => comp.insertion_point().push(Node::Leaf(a.clone())),
        }
    }
    if !comp.open.is_empty() {
        return Err(Xerr::UnbalancedControlStructure);
    }
    Ok(Node::Sequence(comp.root.into()))
}
