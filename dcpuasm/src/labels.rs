use indexmap::IndexMap;
use libdcpu::word::Word;

use crate::{error::LabelError, operand::Ident};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub address: Word,
    pub line_no: usize,
    pub spelling: String,
}

/// Label bindings in definition order. Insert only.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    labels: IndexMap<String, Label>,
}

impl Labels {
    pub fn new() -> Self {
        Self {
            labels: IndexMap::new(),
        }
    }

    pub fn add(&mut self, ident: &Ident, address: Word, line_no: usize) -> Result<(), LabelError> {
        if let Some(existing) = self.labels.get(&ident.key) {
            return Err(LabelError::Duplicate {
                name: ident.spelling.clone(),
                first_line: existing.line_no,
            });
        }

        self.labels.insert(
            ident.key.clone(),
            Label {
                address,
                line_no,
                spelling: ident.spelling.clone(),
            },
        );
        Ok(())
    }

    pub fn get(&self, ident: &Ident) -> Result<Word, LabelError> {
        self.address(&ident.key)
            .ok_or_else(|| LabelError::Undefined(ident.spelling.clone()))
    }

    /// Case-insensitive lookup by name.
    pub fn address(&self, name: &str) -> Option<Word> {
        self.labels
            .get(&name.to_ascii_uppercase())
            .map(|label| label.address)
    }

    pub fn contains(&self, ident: &Ident) -> bool {
        self.labels.contains_key(&ident.key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
