use indexmap::IndexMap;

use crate::error::Error;

/// Width of every jump target operand.
pub const LABEL_WIDTH: usize = 3;
/// Largest offset a jump target operand can name.
pub const MAX_OFFSET: usize = (1 << (8 * LABEL_WIDTH)) - 1;

// name -> offset of its JUMPDEST, and name -> operand positions awaiting it
#[derive(Debug, Default, Clone)]
pub struct Labels {
    defined: IndexMap<String, usize>,
    pending: IndexMap<String, Vec<usize>>,
}

impl Labels {
    pub fn new() -> Self {
        Labels::default()
    }

    /// Records `name` at `offset` and hands back the patch sites waiting on it.
    pub fn define(&mut self, name: &str, offset: usize) -> Result<Vec<usize>, Error> {
        if self.defined.contains_key(name) {
            return Err(Error::DuplicateLabel(name.to_string()));
        }
        if offset > MAX_OFFSET {
            return Err(Error::OffsetOverflow(name.to_string(), offset));
        }
        self.defined.insert(name.to_string(), offset);
        Ok(self.pending.shift_remove(name).unwrap_or_default())
    }

    pub fn defer(&mut self, name: &str, site: usize) {
        self.pending.entry(name.to_string()).or_default().push(site);
    }

    pub fn get_val(&self, name: &str) -> Option<usize> {
        self.defined.get(name).copied()
    }

    pub fn defined(&self) -> &IndexMap<String, usize> {
        &self.defined
    }

    /// Labels referenced but not yet defined, in first-reference order.
    pub fn unresolved(&self) -> Vec<String> {
        self.pending.keys().cloned().collect()
    }

    pub fn check_resolved(&self) -> Result<(), Error> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(Error::UnresolvedLabels(self.unresolved()))
        }
    }
}

/// `offset` as a big-endian jump target operand.
pub fn encode_offset(offset: usize) -> [u8; LABEL_WIDTH] {
    [(offset >> 16) as u8, (offset >> 8) as u8, offset as u8]
}
