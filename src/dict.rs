use crate::cell::*;
use crate::flow::Node;
use crate::opcodes::Control;

use std::fmt;
use std::rc::Rc;

pub enum Definition {
    Primitive(XfnPtr),
    Compiled(Node),
    // variables push their address, constants their value
    Value(Xint),
    Control(Control),
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Primitive(x) => write!(f, "primitive:{:?}", x),
            Definition::Compiled(_) => f.write_str("compiled"),
            Definition::Value(n) => write!(f, "value:{}", n),
            Definition::Control(c) => write!(f, "control:{}", c.name()),
        }
    }
}

#[derive(Clone)]
struct DictEntry {
    name: String,
    def: Rc<Definition>,
}

/// Newest first list of definitions. Entries are never replaced, a new
/// definition under an existing name shadows the old one.
#[derive(Clone, Default)]
pub struct Dictionary {
    entries: rpds::List<DictEntry>,
}

impl Dictionary {
    pub fn add(&mut self, name: &str, def: Definition) -> Rc<Definition> {
        let def = Rc::new(def);
        self.entries.push_front_mut(DictEntry {
            name: name.to_lowercase(),
            def: def.clone(),
        });
        def
    }

    pub fn lookup(&self, name: &str) -> Option<Rc<Definition>> {
        let key = name.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.name == key)
            .map(|e| e.def.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let mut dict = Dictionary::default();
        assert!(dict.lookup("missing").is_none());
        dict.add("Foo", Definition::Value(1));
        match dict.lookup("fOO").as_deref() {
            Some(Definition::Value(1)) => (),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_shadowing() {
        let mut dict = Dictionary::default();
        let old = dict.add("x", Definition::Value(1));
        dict.add("y", Definition::Value(2));
        let new = dict.add("X", Definition::Value(3));
        let found = dict.lookup("x").unwrap();
        assert!(Rc::ptr_eq(&new, &found));
        assert!(!Rc::ptr_eq(&old, &found));
        // the old definition stays alive for whoever captured it
        assert!(matches!(*old, Definition::Value(1)));
        assert_eq!(3, dict.len());
        assert_eq!(vec!["x", "y", "x"], dict.names().collect::<Vec<_>>());
    }
}
