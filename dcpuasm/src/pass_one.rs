use libdcpu::word::{MemoryError, Word, MEMORY_WORDS};

use crate::{
    constants::is_operand_keyword,
    data::StringPacking,
    error::{AsmError, AtLine, ErrorKind, LabelError},
    labels::Labels,
    operand::{Ident, Position},
    parser::{ParsedLine, Statement},
};

/// A parsed line together with where pass 1 put it.
#[derive(Debug, Clone)]
pub struct PlacedLine {
    pub line: ParsedLine,
    pub offset: usize,
    pub size: usize,
}

#[derive(Debug)]
pub struct PassOne {
    pub lines: Vec<PlacedLine>,
    pub labels: Labels,
    pub length: usize,
}

pub struct FirstPass {
    cur_offset: usize,
    labels: Labels,
    packing: StringPacking,
}

impl FirstPass {
    fn new(packing: StringPacking) -> Self {
        Self {
            cur_offset: 0,
            labels: Labels::new(),
            packing,
        }
    }

    pub fn place_lines(
        lines: Vec<ParsedLine>,
        packing: StringPacking,
    ) -> Result<PassOne, AsmError> {
        let mut pass = Self::new(packing);
        let lines = lines
            .into_iter()
            .map(|line| {
                let line_no = line.line_no;
                pass.place_line(line).at_line(line_no)
            })
            .collect::<Result<Vec<_>, _>>()?;

        check_references(&lines, &pass.labels)?;

        Ok(PassOne {
            lines,
            labels: pass.labels,
            length: pass.cur_offset,
        })
    }

    fn place_line(&mut self, line: ParsedLine) -> Result<PlacedLine, ErrorKind> {
        let offset = self.cur_offset;

        if let Some(label) = line.label.as_ref() {
            let address = Word::try_from(offset)
                .map_err(|_| MemoryError::Overflow {
                    address: offset,
                    len: 0,
                })?;
            self.labels.add(label, address, line.line_no)?;
            if is_operand_keyword(&label.key) {
                log::warn!(
                    "line {}: label {} is shadowed by the {} keyword and can't be referenced",
                    line.line_no,
                    label.spelling,
                    label.key
                );
            }
        }

        let size = line
            .statement
            .as_ref()
            .map(|statement| statement_size(statement, self.packing))
            .unwrap_or(0);

        if offset + size > MEMORY_WORDS {
            return Err(MemoryError::Overflow {
                address: offset,
                len: size,
            }
            .into());
        }
        self.cur_offset += size;

        Ok(PlacedLine { line, offset, size })
    }
}

/// Words a statement occupies, computed without any label values.
pub fn statement_size(statement: &Statement, packing: StringPacking) -> usize {
    match statement {
        Statement::Basic { b, a, .. } => {
            1 + b.extra_words(Position::Destination) + a.extra_words(Position::Source)
        }
        Statement::Special { a, .. } => 1 + a.extra_words(Position::Source),
        Statement::Data(items) => items.iter().map(|item| item.len(packing)).sum(),
    }
}

fn references(statement: &Statement) -> Vec<&Ident> {
    match statement {
        Statement::Basic { b, a, .. } => b.symbol().into_iter().chain(a.symbol()).collect(),
        Statement::Special { a, .. } => a.symbol().into_iter().collect(),
        Statement::Data(items) => items.iter().filter_map(|item| item.symbol()).collect(),
    }
}

// Every referenced label must be bound before encoding starts.
fn check_references(lines: &[PlacedLine], labels: &Labels) -> Result<(), AsmError> {
    for placed in lines {
        let Some(statement) = placed.line.statement.as_ref() else {
            continue;
        };
        if let Some(missing) = references(statement)
            .into_iter()
            .find(|ident| !labels.contains(ident))
        {
            return Err(LabelError::Undefined(missing.spelling.clone()))
                .at_line(placed.line.line_no);
        }
    }

    Ok(())
}
