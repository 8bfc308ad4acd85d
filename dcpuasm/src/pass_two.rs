use std::mem;

use dcpudbg::DebugInfo;
use libdcpu::{
    op::Instruction,
    word::{MemoryError, MemoryImage, Word},
};

use crate::{
    data::StringPacking,
    error::{AsmError, AtLine, ErrorKind, LabelError},
    labels::Labels,
    operand::Position,
    pass_one::{PassOne, PlacedLine},
    parser::Statement,
    record::Record,
    Assembly,
};

struct PassTwo {
    cur_address: usize,
    image: MemoryImage,
    records: Vec<Record>,
    debug: DebugInfo,
    packing: StringPacking,
    pass_one: PassOne,
}

impl PassTwo {
    fn new(name: &str, pass_one: PassOne, packing: StringPacking) -> Self {
        let mut debug = DebugInfo::new(name);
        for label in pass_one.labels.iter() {
            debug.add_label(label.spelling.clone(), label.address);
        }

        Self {
            cur_address: 0,
            image: MemoryImage::new(),
            records: Vec::new(),
            debug,
            packing,
            pass_one,
        }
    }

    fn assemble_lines(mut self) -> Result<Assembly, AsmError> {
        let lines = mem::take(&mut self.pass_one.lines);
        for placed in lines.iter() {
            self.assemble_line(placed).at_line(placed.line.line_no)?;
        }

        Ok(Assembly {
            image: self.image,
            records: self.records,
            labels: self.pass_one.labels,
            debug: self.debug,
        })
    }

    fn assemble_line(&mut self, placed: &PlacedLine) -> Result<(), ErrorKind> {
        let Some(statement) = placed.line.statement.as_ref() else {
            return Ok(());
        };

        if self.cur_address != placed.offset {
            return Err(ErrorKind::AddressMismatch {
                expected: placed.offset,
                actual: self.cur_address,
            });
        }

        let words = encode_statement(statement, self.packing, &self.pass_one.labels)?;
        if words.len() != placed.size {
            return Err(ErrorKind::SizeMismatch {
                sized: placed.size,
                emitted: words.len(),
            });
        }

        // Nothing to record, and the offset may already be past the end.
        if words.is_empty() {
            return Ok(());
        }

        self.image.write(placed.offset, &words)?;
        let address = Word::try_from(placed.offset).map_err(|_| MemoryError::Overflow {
            address: placed.offset,
            len: words.len(),
        })?;

        log::debug!(
            "line {} {:04X}: {:04X?} {}",
            placed.line.line_no,
            address,
            words,
            placed.line.text
        );

        self.debug
            .add_line(address, placed.line.text.clone(), placed.line.line_no);
        self.cur_address += words.len();
        self.records.push(Record {
            address,
            words,
            line_no: placed.line.line_no,
        });

        Ok(())
    }
}

/// Encode one statement against a complete symbol table.
pub fn encode_statement(
    statement: &Statement,
    packing: StringPacking,
    labels: &Labels,
) -> Result<Vec<Word>, LabelError> {
    Ok(match statement {
        Statement::Basic { opcode, b, a } => Instruction::Basic {
            opcode: *opcode,
            b: b.encode(Position::Destination, labels)?,
            a: a.encode(Position::Source, labels)?,
        }
        .to_words(),
        Statement::Special { opcode, a } => Instruction::Special {
            opcode: *opcode,
            a: a.encode(Position::Source, labels)?,
        }
        .to_words(),
        Statement::Data(items) => items
            .iter()
            .map(|item| item.encode(packing, labels))
            .collect::<Result<Vec<_>, _>>()?
            .concat(),
    })
}

pub fn pass_two(
    name: &str,
    pass_one: PassOne,
    packing: StringPacking,
) -> Result<Assembly, AsmError> {
    let pass = PassTwo::new(name, pass_one, packing);
    pass.assemble_lines()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{operand::Ident, pass_one::statement_size, parser::parse_program};

    #[test]
    fn test_size_matches_encoding() {
        let mut labels = Labels::new();
        labels.add(&Ident::new("L", "l"), 3, 1).unwrap();
        let program = parse_program(
            "SET A, l\nSET l, 0\nSET [l+A], [A+l]\nJSR l\nIFE PICK 1, 0xFFFF\nDAT \"ab\", l, 7",
        )
        .unwrap();

        for line in program {
            let statement = line.statement.unwrap();
            for packing in [StringPacking::OnePerWord, StringPacking::Packed] {
                assert_eq!(
                    encode_statement(&statement, packing, &labels).unwrap().len(),
                    statement_size(&statement, packing),
                    "line {}",
                    line.line_no
                );
            }
        }
    }

    #[test]
    fn test_unresolved_symbol_is_fatal() {
        let program = parse_program("SET PC, gone").unwrap();
        let statement = program[0].statement.as_ref().unwrap();

        assert_eq!(
            encode_statement(statement, StringPacking::OnePerWord, &Labels::new()),
            Err(LabelError::Undefined("gone".into()))
        );
    }
}
