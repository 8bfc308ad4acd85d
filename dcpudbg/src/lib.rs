use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
pub use serde_json::Error;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DebugLine {
    pub address: u16,
    pub text: String,
    pub line_number: usize,
}

/// Source mapping written alongside an assembled image.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DebugInfo {
    pub name: String,
    pub lines: Vec<DebugLine>,
    pub offset_map: BTreeMap<u16, usize>,
    pub labels: BTreeMap<String, u16>,
}

impl DebugInfo {
    pub fn new(name: &str) -> Self {
        DebugInfo {
            name: name.into(),
            lines: Vec::new(),
            offset_map: BTreeMap::new(),
            labels: BTreeMap::new(),
        }
    }

    pub fn to_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_string(dbg: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(dbg)
    }

    pub fn add_label(&mut self, label: String, address: u16) {
        self.labels.insert(label, address);
    }

    pub fn add_line(&mut self, address: u16, text: String, line_number: usize) {
        self.lines.push(DebugLine {
            address,
            text,
            line_number,
        });
        self.offset_map.insert(address, self.lines.len() - 1);
    }

    /// The source line whose statement starts at `address`.
    pub fn line_at(&self, address: u16) -> Option<&DebugLine> {
        self.offset_map
            .get(&address)
            .and_then(|index| self.lines.get(*index))
    }

    pub fn address_of(&self, label: &str) -> Option<u16> {
        self.labels.get(label).copied()
    }
}
