use std::fmt::Display;

use libdcpu::word::Word;

/// The words one source statement assembled to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub address: Word,
    pub words: Vec<Word>,
    pub line_no: usize,
}

impl Record {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0>4X}:", self.address)?;
        for word in self.words.iter() {
            write!(f, " {:0>4X}", word)?;
        }

        Ok(())
    }
}
