use dcpuasm::{
    assemble_program, assemble_with_debug, AsmError, Config, DataError, ErrorKind, LabelError,
    LexError, ParseError,
};
use dcpudbg::DebugInfo;
use libdcpu::{
    op::{Instruction, INLINE_LITERAL, NEXT_WORD},
    word::{ByteOrder, MemoryError},
};

fn words(program_text: &str) -> Vec<u16> {
    assemble_program(program_text).unwrap().words().to_vec()
}

fn error(program_text: &str) -> AsmError {
    assemble_program(program_text).unwrap_err()
}

#[test]
fn test_string_is_one_word_per_character() {
    assert_eq!(words(r#"DAT "AB""#), vec![0x41, 0x42]);
}

#[test]
fn test_symbol_never_inlined() {
    let assembly =
        assemble_with_debug("loop", ":loop SET A, 1\n      SET PC, loop", &Config::default())
            .unwrap();

    assert_eq!(assembly.labels.address("loop"), Some(0));
    assert_eq!(assembly.records[1].words, vec![0x7F81, 0x0000]);
    assert_eq!(assembly.image.words(), &[0x8801, 0x7F81, 0x0000]);
}

#[test]
fn test_inline_literal_boundary() {
    assert_eq!(words("SET A, 31"), vec![0x7C01, 31]);
    assert_eq!(words("SET A, 30"), vec![0xFC01]);
    assert_eq!(words("SET A, 5"), vec![0x9801]);
    assert_eq!(words("SET A, -1"), vec![0x8001]);
    assert_eq!(words("SET A, 0xFFFF"), vec![0x8001]);
    assert_eq!(words("SET A, -2"), vec![0x7C01, 0xFFFE]);
}

#[test]
fn test_destination_never_inlines() {
    for value in ["0", "1", "30", "-1", "label"] {
        let image = assemble_program(&format!(":label ADD {value}, {value}")).unwrap();
        let (instruction, len) = Instruction::from_words(image.words()).unwrap();

        assert_eq!(len, image.len());
        match instruction {
            Instruction::Basic { b, a, .. } => {
                assert_eq!(b.code, NEXT_WORD, "destination of {}", value);
                assert!(b.next_word.is_some());
                if value != "label" {
                    assert!(a.code >= INLINE_LITERAL, "source of {}", value);
                }
            }
            other => panic!("expected a basic instruction, got {:?}", other),
        }
    }
}

#[test]
fn test_labels_are_sum_of_previous_sizes() {
    let program_text = include_str!("../programs/loop.dasm");
    let assembly = assemble_with_debug("loop", program_text, &Config::default()).unwrap();

    let mut address = 0;
    for record in assembly.records.iter() {
        assert_eq!(usize::from(record.address), address, "line {}", record.line_no);
        address += record.len();
    }
    assert_eq!(address, assembly.image.len());

    for (name, expected) in [
        ("start", 0x00),
        ("loop", 0x0B),
        ("crash", 0x13),
        ("subr", 0x15),
        ("msg", 0x16),
    ] {
        assert_eq!(assembly.labels.address(name), Some(expected), "{}", name);
    }
}

#[test]
fn test_forward_and_backward_references_agree() {
    assert_eq!(
        words("SET PC, end\n:mid SET A, mid\n:end SET PC, mid"),
        vec![0x7F81, 0x0004, 0x7C01, 0x0002, 0x7F81, 0x0002]
    );
}

#[test]
fn test_case_insensitive_but_strings_keep_case() {
    assert_eq!(
        words(":Top set a, top\ndat \"aB\""),
        words(":TOP SET A, TOP\nDAT \"aB\"")
    );
    assert_eq!(&words("DAT \"aB\"")[..], &[0x61, 0x42]);
}

#[test]
fn test_comment_inside_string() {
    assert_eq!(words("DAT \"a;b\" ; trailing"), vec![0x61, 0x3B, 0x62]);
}

#[test]
fn test_indirect_offset_either_order() {
    assert_eq!(words("SET [I+0x2000], 1"), words("SET [0x2000 + I], 1"));
}

#[test]
fn test_duplicate_label() {
    let err = error(":x DAT 1\n:x DAT 2");

    assert_eq!(err.line, 2);
    assert_eq!(
        err.kind,
        ErrorKind::Label(LabelError::Duplicate {
            name: "x".into(),
            first_line: 1
        })
    );
    assert!(err.to_string().starts_with("line 2:"));
    assert!(err.to_string().contains('x'));
}

#[test]
fn test_undefined_label() {
    let err = error("SET A, 1\nSET PC, nowhere");

    assert_eq!(err.line, 2);
    assert_eq!(
        err.kind,
        ErrorKind::Label(LabelError::Undefined("nowhere".into()))
    );
}

#[test]
fn test_lex_errors() {
    assert_eq!(
        error("SET A, 1\nDAT \"open").kind,
        ErrorKind::Lex(LexError::UnterminatedString)
    );
    assert_eq!(
        error("SET A, $1").kind,
        ErrorKind::Lex(LexError::IllegalCharacter('$'))
    );
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        error("BRK").kind,
        ErrorKind::Parse(ParseError::UnknownMnemonic(_))
    ));
    assert!(matches!(
        error("SET A, B, C").kind,
        ErrorKind::Parse(ParseError::Arity { found: 3, .. })
    ));
    assert_eq!(
        error("SET A, 017").kind,
        ErrorKind::Parse(ParseError::AmbiguousLeadingZero("017".into()))
    );
    assert!(matches!(
        error("SET POP, A").kind,
        ErrorKind::Parse(ParseError::MisplacedStackOp { .. })
    ));
    assert!(matches!(
        error("SET [A+B], 1").kind,
        ErrorKind::Parse(ParseError::MalformedIndirection(_))
    ));
}

#[test]
fn test_explicit_octal() {
    assert_eq!(words("SET A, 0o17"), vec![0xC001]);
}

#[test]
fn test_data_errors() {
    assert_eq!(
        error("DAT 0x10000").kind,
        ErrorKind::Data(DataError::OutOfRange("0x10000".into()))
    );
    assert_eq!(error("DAT").kind, ErrorKind::Data(DataError::Empty));
    assert_eq!(
        error("DAT 12AB").kind,
        ErrorKind::Data(DataError::Malformed("12AB".into()))
    );
    assert_eq!(
        error("DAT 99999999999999999999").kind,
        ErrorKind::Data(DataError::OutOfRange("99999999999999999999".into()))
    );
}

#[test]
fn test_operands_are_comma_separated() {
    assert_eq!(words("SET A,1"), vec![0x8801]);
    assert_eq!(
        error("SET A 1").kind,
        ErrorKind::Parse(ParseError::MissingSeparator("1".into()))
    );
    assert_eq!(
        error("SET A,,1").kind,
        ErrorKind::Parse(ParseError::MisplacedSeparator)
    );
    assert_eq!(
        error("DAT 1,").kind,
        ErrorKind::Parse(ParseError::MisplacedSeparator)
    );
}

#[test]
fn test_reserved_label_is_rejected() {
    let err = error("JSR sub\n:sub SET PC, POP");

    assert_eq!(err.line, 2);
    assert_eq!(
        err.kind,
        ErrorKind::Parse(ParseError::ReservedLabel("sub".into()))
    );
}

#[test]
fn test_program_filling_memory() {
    let fill = "a".repeat(0x8000);
    let image = assemble_program(&format!("DAT \"{fill}\"\nDAT \"{fill}\"")).unwrap();
    assert_eq!(image.len(), 0x10000);

    let image =
        assemble_program(&format!("DAT \"{fill}\"\nDAT \"{fill}\"\nDAT \"\"")).unwrap();
    assert_eq!(image.len(), 0x10000);

    let err = error(&format!("DAT \"{fill}\"\nDAT \"{fill}\"\nSET A, 1"));
    assert_eq!(err.line, 3);
    assert_eq!(
        err.kind,
        ErrorKind::Memory(MemoryError::Overflow {
            address: 0x10000,
            len: 1
        })
    );
}

#[test]
fn test_output_is_truncated_to_last_write() {
    let image = assemble_program(":a\nSET A, 1\n; end").unwrap();

    assert_eq!(image.words(), &[0x8801]);
    assert_eq!(image.to_bytes(ByteOrder::Big), vec![0x88, 0x01]);
    assert_eq!(image.to_bytes(ByteOrder::Little), vec![0x01, 0x88]);
}

#[test]
fn test_debug_info() {
    let program_text = include_str!("../programs/loop.dasm");
    let assembly = assemble_with_debug("loop", program_text, &Config::default()).unwrap();
    let debug = DebugInfo::from_string(&assembly.debug.to_string().unwrap()).unwrap();

    assert_eq!(debug.name, "loop");
    assert_eq!(debug.address_of("crash"), Some(0x13));
    let line = debug.line_at(0x0B).unwrap();
    assert_eq!(line.line_number, 8);
    assert_eq!(line.text, ":loop   SET [0x2000+I], [A]");
    assert_eq!(debug.lines.len(), assembly.records.len());
}
