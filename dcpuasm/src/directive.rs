use std::str::FromStr as _;

use libdcpu::op::{BasicOp, SpecialOp};

use crate::constants::DATA_DIRECTIVE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Basic(BasicOp),
    Special(SpecialOp),
    Data,
}

impl Directive {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        if s == DATA_DIRECTIVE {
            Some(Self::Data)
        } else if let Ok(op) = BasicOp::from_str(s) {
            Some(Self::Basic(op))
        } else {
            SpecialOp::from_str(s).ok().map(Self::Special)
        }
    }
}
