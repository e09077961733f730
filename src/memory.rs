use crate::cell::Xint;

use std::collections::HashMap;

const ORIGIN: usize = 1000;

/// Flat cell memory. Cells are allocated upwards from a free pointer and read
/// as zero until written.
#[derive(Debug, Clone)]
pub struct Memory {
    cells: HashMap<usize, Xint>,
    names: HashMap<String, usize>,
    free: usize,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            cells: HashMap::new(),
            names: HashMap::new(),
            free: ORIGIN,
        }
    }
}

impl Memory {
    pub fn add_variable(&mut self, name: &str) -> usize {
        let a = self.free;
        self.free += 1;
        self.names.insert(name.to_lowercase(), a);
        a
    }

    pub fn get_variable(&self, name: &str) -> Option<usize> {
        self.names.get(&name.to_lowercase()).copied()
    }

    pub fn get_value(&self, a: usize) -> Xint {
        self.cells.get(&a).copied().unwrap_or(0)
    }

    pub fn set_value(&mut self, a: usize, val: Xint) {
        self.cells.insert(a, val);
    }

    pub fn allot(&mut self, n: usize) {
        self.free = self.free.saturating_add(n);
    }
}
