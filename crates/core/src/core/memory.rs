//! Flat, word-addressed data memory (spec.md §3, §4.9, §C9). No caches, no
//! TLBs, no timing model — an out-of-range access is logged and treated
//! as a no-op/zero read, the same defensive-but-non-fatal posture spec.md
//! §7 takes for an unknown opcode at a functional unit.

#[derive(Debug, Clone)]
pub struct DataMemory {
    cells: Vec<i32>,
}

impl DataMemory {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self { cells: vec![0; size] }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn read(&self, addr: i32) -> i32 {
        usize::try_from(addr).ok().and_then(|a| self.cells.get(a)).copied().unwrap_or(0)
    }

    pub fn write(&mut self, addr: i32, value: i32) {
        if let Some(cell) = usize::try_from(addr).ok().and_then(|a| self.cells.get_mut(a)) {
            *cell = value;
        }
    }

    /// Loads `values` starting at offset 0, as `SetMem` does (spec.md §6).
    pub fn load_image(&mut self, values: &[i32]) {
        for (cell, v) in self.cells.iter_mut().zip(values) {
            *cell = *v;
        }
    }

    /// The first `n` cells, for `Display`'s memory dump.
    #[must_use]
    pub fn first(&self, n: usize) -> &[i32] {
        &self.cells[..n.min(self.cells.len())]
    }
}
