use super::*;
use pretty_assertions::assert_eq;

fn bits(s: &str) -> BitVec {
    let mut bv = BitVec::new();
    for c in s.chars() {
        bv.push(c == '1');
    }
    bv
}

#[test]
fn bitvec_push_and_get() {
    let bv = bits("1011");
    assert_eq!(bv.len(), 4);
    assert_eq!(bv.as_bytes(), &[0b1101]);
    assert!(bv.get(0));
    assert!(!bv.get(1));
    assert!(!bv.get(100));
    assert_eq!(bv.count_ones(), 3);
}

#[test]
fn bitvec_set_grows() {
    let mut bv = BitVec::new();
    bv.set(9);
    assert_eq!(bv.len(), 10);
    assert_eq!(bv.as_bytes(), &[0, 0b10]);
    assert_eq!(format!("{bv:?}"), "BitVec(0000000001)");
}

#[test]
fn bitvec_trimmed_len() {
    assert_eq!(bits("0100").trimmed_len(), 2);
    assert_eq!(bits("000").trimmed_len(), 0);
}

#[test]
fn varint_encoding() {
    let mut buf = Vec::new();
    append_varint(&mut buf, 5);
    append_varint(&mut buf, 300);
    assert_eq!(buf, vec![5, 0xac, 0x02]);
}

#[test]
fn literal_program_expands() {
    let mut w = ProgramWriter::new();
    w.literal(&[0b101], 3, 120);
    let prog = w.finish();
    assert_eq!(prog.as_bytes(), &[3, 0, 0, 0, 3, 0b101, 0]);
    assert_eq!(prog.expand(1 << 20), Ok(bits("101")));
}

#[test]
fn long_literal_is_chunked() {
    let mask = vec![0xff; 32];
    let mut w = ProgramWriter::new();
    w.literal(&mask, 250, 120);
    let prog = w.finish();
    // 120 + 120 + 10 bits
    assert_eq!(prog.body()[0], 120);
    assert_eq!(prog.body()[16], 120);
    assert_eq!(prog.body()[32], 10);
    let expanded = prog.expand(1 << 20).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(expanded.len(), 250);
    assert_eq!(expanded.count_ones(), 250);
}

#[test]
fn repeat_program_expands() {
    // pattern "10" followed by one pad word, repeated 3 more times
    let mut w = ProgramWriter::new();
    w.literal(&[0b01], 2, 120).pad_words(1).repeat(3, 3);
    let prog = w.finish();
    assert_eq!(prog.expand(1 << 20), Ok(bits("100100100100")));
}

#[test]
fn long_pad_uses_repeat() {
    let mut w = ProgramWriter::new();
    w.literal(&[1], 1, 120).pad_words(5);
    let prog = w.finish();
    assert_eq!(prog.instructions(), &[1, 1, 0x01, 0x00, 0x81, 4]);
    assert_eq!(prog.expand(64), Ok(bits("100000")));
}

#[test]
fn wide_repeat_uses_varint_width() {
    let mut w = ProgramWriter::new();
    w.literal(&[1], 1, 120).pad_words(199).repeat(200, 1);
    let prog = w.finish();
    let expanded = prog.expand(1 << 20).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(expanded.len(), 400);
    assert!(expanded.get(0));
    assert!(expanded.get(200));
    assert_eq!(expanded.count_ones(), 2);
}

#[test]
fn append_program_splices_without_stop() {
    let mut inner = ProgramWriter::new();
    inner.literal(&[0b11], 2, 120);
    let inner = inner.finish();

    let mut outer = ProgramWriter::new();
    outer.append_program(&inner).repeat(2, 1);
    assert_eq!(outer.finish().expand(16), Ok(bits("1111")));
}

#[test]
fn expand_respects_limit() {
    let mut w = ProgramWriter::new();
    w.literal(&[1], 1, 120).repeat(1, 1_000_000);
    assert_eq!(
        w.finish().expand(1000),
        Err(ProgramError::TooLarge { limit: 1000 })
    );
}

#[test]
fn malformed_programs() {
    assert_eq!(
        GcProgram::from_bytes(&[1, 0]),
        Err(ProgramError::MissingPrefix)
    );
    assert_eq!(
        GcProgram::from_bytes(&[5, 0, 0, 0, 0]),
        Err(ProgramError::LengthMismatch { prefix: 5, body: 1 })
    );

    let unterminated = GcProgram::from_bytes(&[2, 0, 0, 0, 1, 1]).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(unterminated.expand(8), Err(ProgramError::Truncated));

    let bad_repeat = GcProgram::from_bytes(&[3, 0, 0, 0, 0x82, 1, 0]).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(
        bad_repeat.expand(8),
        Err(ProgramError::BadRepeat { n: 2, have: 0 })
    );
}
