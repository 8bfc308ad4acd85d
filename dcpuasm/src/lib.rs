use dcpudbg::DebugInfo;
use libdcpu::word::MemoryImage;
use pass_one::FirstPass;
use pass_two::pass_two;

pub use config::{Config, ConfigError};
pub use data::StringPacking;
pub use error::{AsmError, DataError, ErrorKind, LabelError, LexError, ParseError};
pub use labels::{Label, Labels};
pub use record::Record;

pub mod config;
mod constants;
mod data;
mod directive;
pub mod error;
mod labels;
mod lexer;
mod operand;
mod parser;
mod pass_one;
mod pass_two;
mod record;

/// Everything produced by a successful assembly.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub image: MemoryImage,
    pub records: Vec<Record>,
    pub labels: Labels,
    pub debug: DebugInfo,
}

impl Assembly {
    /// One `ADDR: WORD WORD ...` line per statement.
    pub fn listing(&self) -> String {
        self.records
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Assemble a program with the default configuration.
///
/// # Errors
///
/// If there's an error in the assembly code
pub fn assemble_program(program_text: &str) -> Result<MemoryImage, AsmError> {
    Ok(assemble_with_debug("program", program_text, &Config::default())?.image)
}

pub fn assemble_with_debug(
    name: &str,
    program_text: &str,
    config: &Config,
) -> Result<Assembly, AsmError> {
    let lines = parser::parse_program(program_text)?;
    let pass_one = FirstPass::place_lines(lines, config.string_packing)?;
    log::debug!(
        "pass one placed {} words and {} labels",
        pass_one.length,
        pass_one.labels.len()
    );

    pass_two(name, pass_one, config.string_packing)
}
