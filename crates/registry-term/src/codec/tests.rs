//! Codec behavior tests over hand-built byte vectors.

use super::*;
use crate::term::{Atom, BigInt, Export, Fun, Pid, Port, Reference, Term};

fn decode(bytes: &[u8]) -> CodecResult<Term> {
    Etf.decode(bytes, &DecodeOptions::default())
}

fn decode_any_atom(bytes: &[u8]) -> CodecResult<Term> {
    Etf.decode(bytes, &DecodeOptions::default().allow_new_atoms())
}

fn encode(term: &Term) -> Vec<u8> {
    Etf.encode(term, &EncodeOptions::default()).unwrap()
}

fn local_pid() -> Pid {
    Pid {
        node: Atom::new("nonode@nohost"),
        id: 110,
        serial: 0,
        creation: 0,
    }
}

// ==================== Scalars ====================

#[test]
fn test_decode_integers() {
    assert_eq!(decode(&[131, 97, 42]).unwrap(), Term::Int(42));
    assert_eq!(
        decode(&[131, 98, 0xff, 0xff, 0xff, 0xfe]).unwrap(),
        Term::Int(-2)
    );
    // SMALL_BIG_EXT that still fits i64 collapses to Int.
    assert_eq!(
        decode(&[131, 110, 5, 1, 0, 0, 0, 0, 1]).unwrap(),
        Term::Int(-(1_i64 << 32))
    );
}

#[test]
fn test_decode_bignum_outside_i64() {
    let mut bytes = vec![131, 110, 9, 0];
    bytes.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 1]);
    let term = decode(&bytes).unwrap();
    assert_eq!(
        term,
        Term::BigInt(BigInt::from_le_bytes(false, vec![0, 0, 0, 0, 0, 0, 0, 0, 1]))
    );
    assert_eq!(term.to_string(), "18446744073709551616");
}

#[test]
fn test_decode_bignum_bad_sign() {
    let result = decode(&[131, 110, 1, 2, 5]);
    assert!(matches!(result, Err(CodecError::Invalid { .. })));
}

#[test]
fn test_decode_new_float() {
    let mut bytes = vec![131, 70];
    bytes.extend_from_slice(&1.5_f64.to_be_bytes());
    assert_eq!(decode(&bytes).unwrap(), Term::Float(1.5));
}

#[test]
fn test_decode_legacy_float_text() {
    let mut text = b"1.50000000000000000000e+00".to_vec();
    text.resize(31, 0);
    let mut bytes = vec![131, 99];
    bytes.extend_from_slice(&text);
    assert_eq!(decode(&bytes).unwrap(), Term::Float(1.5));
}

#[test]
fn test_decode_rejects_non_finite_float() {
    let mut bytes = vec![131, 70];
    bytes.extend_from_slice(&f64::NAN.to_be_bytes());
    assert_eq!(decode(&bytes), Err(CodecError::NonFiniteFloat));
}

#[test]
fn test_decode_binary_and_bitstring() {
    assert_eq!(
        decode(&[131, 109, 0, 0, 0, 2, b'h', b'i']).unwrap(),
        Term::text("hi")
    );
    let bits = decode(&[131, 77, 0, 0, 0, 1, 3, 0b1011_1111]).unwrap();
    assert_eq!(
        bits,
        Term::BitString(crate::term::BitString {
            bytes: vec![0b1010_0000],
            tail_bits: 3
        })
    );
    // A full last byte is a plain binary.
    assert_eq!(
        decode(&[131, 77, 0, 0, 0, 1, 8, 7]).unwrap(),
        Term::binary(vec![7])
    );
}

// ==================== Atoms ====================

#[test]
fn test_sentinel_atoms_decode_to_native_values() {
    assert_eq!(decode(&[131, 119, 3, b'n', b'i', b'l']).unwrap(), Term::Nil);
    assert_eq!(
        decode(&[131, 119, 4, b't', b'r', b'u', b'e']).unwrap(),
        Term::Bool(true)
    );
    assert_eq!(
        decode(&[131, 100, 0, 5, b'f', b'a', b'l', b's', b'e']).unwrap(),
        Term::Bool(false)
    );
}

#[test]
fn test_unknown_atom_rejected_by_default() {
    let bytes = [131, 119, 5, b'h', b'e', b'l', b'l', b'o'];
    assert_eq!(
        decode(&bytes),
        Err(CodecError::UnknownAtom("hello".to_string()))
    );
    assert_eq!(decode_any_atom(&bytes).unwrap(), Term::atom("hello"));

    let options = DecodeOptions::default().with_known_atoms(["hello"]);
    assert_eq!(Etf.decode(&bytes, &options).unwrap(), Term::atom("hello"));
}

#[test]
fn test_latin1_atom() {
    let bytes = [131, 115, 3, b'c', b'a', 0xe9];
    assert_eq!(decode_any_atom(&bytes).unwrap(), Term::atom("caé"));
}

#[test]
fn test_atom_invalid_utf8() {
    let bytes = [131, 119, 2, 0xc3, 0x28];
    assert!(matches!(
        decode_any_atom(&bytes),
        Err(CodecError::Invalid { what: "atom", .. })
    ));
}

// ==================== Containers ====================

#[test]
fn test_decode_string_ext_as_integer_list() {
    assert_eq!(
        decode(&[131, 107, 0, 3, 1, 2, 3]).unwrap(),
        Term::list([1.into(), 2.into(), 3.into()])
    );
}

#[test]
fn test_decode_nil_and_proper_list() {
    assert_eq!(decode(&[131, 106]).unwrap(), Term::List(vec![]));
    assert_eq!(
        decode(&[131, 108, 0, 0, 0, 2, 97, 1, 97, 2, 106]).unwrap(),
        Term::list([1.into(), 2.into()])
    );
}

#[test]
fn test_decode_improper_list() {
    let term = decode(&[131, 108, 0, 0, 0, 1, 97, 1, 97, 2]).unwrap();
    assert_eq!(
        term,
        Term::ImproperList {
            elements: vec![Term::Int(1)],
            tail: Box::new(Term::Int(2)),
        }
    );
}

#[test]
fn test_decode_chained_cons_cells_flatten() {
    // [1 | [2 | []]] written cell by cell.
    let bytes = [131, 108, 0, 0, 0, 1, 97, 1, 108, 0, 0, 0, 1, 97, 2, 106];
    assert_eq!(
        decode(&bytes).unwrap(),
        Term::list([1.into(), 2.into()])
    );
}

#[test]
fn test_decode_tuple_and_map() {
    let bytes = [
        131, 116, 0, 0, 0, 1, // map, 1 pair
        109, 0, 0, 0, 1, b'k', // "k"
        104, 2, 119, 2, b'o', b'k', 97, 9, // {:ok, 9}
    ];
    let term = decode(&bytes).unwrap();
    assert_eq!(
        term,
        Term::map([(Term::text("k"), Term::tuple([Term::atom("ok"), 9.into()]))])
    );
}

#[test]
fn test_duplicate_map_key_rejected() {
    let bytes = [131, 116, 0, 0, 0, 2, 97, 1, 97, 2, 97, 1, 97, 3];
    assert!(matches!(decode(&bytes), Err(CodecError::DuplicateKey(_))));
}

// ==================== Handles and callables ====================

#[test]
fn test_pid_reference_port_roundtrip() {
    let pid = Term::Pid(local_pid());
    let reference = Term::Reference(Reference {
        node: Atom::new("nonode@nohost"),
        creation: 3,
        ids: vec![1, 2, 3],
    });
    let port = Term::Port(Port {
        node: Atom::new("nonode@nohost"),
        id: 1 << 40,
        creation: 1,
    });
    for term in [pid, reference, port] {
        assert_eq!(decode(&encode(&term)).unwrap(), term);
    }
}

#[test]
fn test_legacy_pid_and_reference() {
    let mut pid = vec![131, 103, 119, 13];
    pid.extend_from_slice(b"nonode@nohost");
    pid.extend_from_slice(&[0, 0, 0, 110, 0, 0, 0, 0, 2]);
    assert_eq!(
        decode(&pid).unwrap(),
        Term::Pid(Pid {
            creation: 2,
            ..local_pid()
        })
    );

    let mut reference = vec![131, 101, 119, 13];
    reference.extend_from_slice(b"nonode@nohost");
    reference.extend_from_slice(&[0, 0, 0, 7, 1]);
    assert_eq!(
        decode(&reference).unwrap(),
        Term::Reference(Reference {
            node: Atom::new("nonode@nohost"),
            creation: 1,
            ids: vec![7],
        })
    );
}

#[test]
fn test_fun_roundtrip() {
    let fun = Term::Fun(Fun {
        module: Atom::new("erl_eval"),
        arity: 1,
        uniq: [7; 16],
        index: 3,
        old_index: 20,
        old_uniq: 1 << 40,
        pid: local_pid(),
        free_vars: vec![Term::text("captured"), Term::Int(1)],
    });
    assert_eq!(decode_any_atom(&encode(&fun)).unwrap(), fun);
}

#[test]
fn test_fun_size_mismatch_rejected() {
    let fun = Term::Fun(Fun {
        module: Atom::new("erl_eval"),
        arity: 0,
        uniq: [0; 16],
        index: 0,
        old_index: 0,
        old_uniq: 0,
        pid: local_pid(),
        free_vars: vec![],
    });
    let mut bytes = encode(&fun);
    // Size field follows the version and tag bytes.
    bytes[5] += 1;
    assert!(matches!(
        decode_any_atom(&bytes),
        Err(CodecError::Invalid { what: "fun", .. })
    ));
}

#[test]
fn test_export_decode() {
    let mut bytes = vec![131, 113, 119, 2, b'o', b's', 119, 3, b'c', b'm', b'd', 97, 1];
    let term = decode_any_atom(&bytes).unwrap();
    assert_eq!(
        term,
        Term::Export(Export {
            module: Atom::new("os"),
            function: Atom::new("cmd"),
            arity: 1,
        })
    );
    bytes[12] = 255;
    assert!(decode_any_atom(&bytes).is_ok());
}

// ==================== Malformed input ====================

#[test]
fn test_bad_version() {
    assert_eq!(decode(&[130, 97, 1]), Err(CodecError::BadVersion(130)));
}

#[test]
fn test_truncated_input() {
    assert!(matches!(
        decode(&[131, 109, 0, 0, 0, 10, b'x']),
        Err(CodecError::UnexpectedEof { .. })
    ));
    assert!(matches!(
        decode(&[131]),
        Err(CodecError::UnexpectedEof { .. })
    ));
}

#[test]
fn test_hostile_length_prefix_does_not_allocate() {
    // A list claiming u32::MAX elements with a two-byte body.
    let bytes = [131, 108, 0xff, 0xff, 0xff, 0xff, 97, 1];
    assert!(matches!(
        decode(&bytes),
        Err(CodecError::UnexpectedEof { .. })
    ));
    let bytes = [131, 116, 0xff, 0xff, 0xff, 0xff, 97, 1];
    assert!(matches!(
        decode(&bytes),
        Err(CodecError::UnexpectedEof { .. })
    ));
}

#[test]
fn test_trailing_bytes_rejected() {
    assert_eq!(
        decode(&[131, 97, 1, 0, 0]),
        Err(CodecError::TrailingBytes { count: 2 })
    );
}

#[test]
fn test_unknown_and_unsupported_tags() {
    assert_eq!(
        decode(&[131, 1]),
        Err(CodecError::UnknownTag { tag: 1, offset: 1 })
    );
    assert!(matches!(
        decode(&[131, 82, 0]),
        Err(CodecError::UnsupportedTag { tag: 82, .. })
    ));
}

#[test]
fn test_depth_limit() {
    let depth = MAX_DEPTH + 10;
    let mut bytes = vec![131];
    for _ in 0..depth {
        bytes.extend_from_slice(&[104, 1]);
    }
    bytes.extend_from_slice(&[97, 0]);
    assert!(matches!(
        decode(&bytes),
        Err(CodecError::DepthExceeded { .. })
    ));

    let shallow = DecodeLimits {
        max_depth: 2,
        ..DecodeLimits::default()
    };
    let options = DecodeOptions::default().with_limits(shallow);
    let nested = encode(&Term::list([Term::list([Term::list([])])]));
    assert!(Etf.decode(&nested, &options).is_ok());
    let deeper = encode(&Term::list([Term::list([Term::list([1.into()])])]));
    assert_eq!(
        Etf.decode(&deeper, &options),
        Err(CodecError::DepthExceeded { depth: 3, limit: 2 })
    );
}

#[test]
fn test_depth_limit_is_capped_at_ceiling() {
    let depth = MAX_DEPTH_CEILING + 1;
    let mut bytes = vec![131];
    for _ in 0..depth {
        bytes.extend_from_slice(&[104, 1]);
    }
    bytes.extend_from_slice(&[97, 0]);
    let unbounded = DecodeLimits {
        max_depth: usize::MAX,
        ..DecodeLimits::default()
    };
    let options = DecodeOptions::default().with_limits(unbounded);

    // 512 nested frames can overflow the default test thread stack in debug builds.
    let result = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || Etf.decode(&bytes, &options))
        .unwrap()
        .join()
        .unwrap();
    assert!(matches!(
        result,
        Err(CodecError::DepthExceeded {
            limit: MAX_DEPTH_CEILING,
            ..
        })
    ));
}

#[test]
fn test_input_size_limit() {
    let limits = DecodeLimits {
        max_input_size: 4,
        ..DecodeLimits::default()
    };
    let options = DecodeOptions::default().with_limits(limits);
    let bytes = encode(&Term::text("too long"));
    assert!(matches!(
        Etf.decode(&bytes, &options),
        Err(CodecError::InputTooLarge { .. })
    ));
}

// ==================== Compression ====================

#[test]
fn test_compressed_roundtrip() {
    let term = Term::map([(
        Term::text("releases"),
        Term::list((0..100).map(|i| Term::text(format!("1.0.{}", i)))),
    )]);
    let bytes = Etf
        .encode(&term, &EncodeOptions::default().compressed(6))
        .unwrap();
    assert_eq!(&bytes[..2], &[131, 80]);
    assert_eq!(decode(&bytes).unwrap(), term);
}

#[test]
fn test_compressed_rejected_when_disabled() {
    let bytes = Etf
        .encode(&Term::Int(1), &EncodeOptions::default().compressed(1))
        .unwrap();
    let limits = DecodeLimits {
        allow_compressed: false,
        ..DecodeLimits::default()
    };
    let options = DecodeOptions::default().with_limits(limits);
    assert_eq!(
        Etf.decode(&bytes, &options),
        Err(CodecError::CompressedNotAllowed)
    );
}

#[test]
fn test_compressed_size_mismatch() {
    let mut bytes = Etf
        .encode(&Term::text("abc"), &EncodeOptions::default().compressed(1))
        .unwrap();
    // Declared uncompressed size lives in bytes 2..6.
    bytes[5] += 1;
    assert!(matches!(
        decode(&bytes),
        Err(CodecError::Invalid {
            what: "compressed term",
            ..
        })
    ));
}

#[test]
fn test_compressed_garbage() {
    let bytes = [131, 80, 0, 0, 0, 3, 1, 2, 3, 4];
    assert!(matches!(
        decode(&bytes),
        Err(CodecError::Compression(_))
    ));
}

// ==================== Encoder ====================

#[test]
fn test_encode_integer_widths() {
    assert_eq!(encode(&Term::Int(5)), vec![131, 97, 5]);
    assert_eq!(encode(&Term::Int(-1)), vec![131, 98, 0xff, 0xff, 0xff, 0xff]);
    assert_eq!(
        encode(&Term::Int(1 << 40)),
        vec![131, 110, 6, 0, 0, 0, 0, 0, 0, 1]
    );
    assert_eq!(decode(&encode(&Term::Int(i64::MIN))).unwrap(), Term::Int(i64::MIN));
}

#[test]
fn test_encode_sentinels_as_atoms() {
    assert_eq!(encode(&Term::Nil), vec![131, 119, 3, b'n', b'i', b'l']);
    assert_eq!(
        encode(&Term::Bool(false)),
        vec![131, 119, 5, b'f', b'a', b'l', b's', b'e']
    );
}

#[test]
fn test_encode_rejects_non_finite_float() {
    assert_eq!(
        Etf.encode(&Term::Float(f64::INFINITY), &EncodeOptions::default()),
        Err(CodecError::NonFiniteFloat)
    );
}

#[test]
fn test_encode_rejects_long_atom() {
    let name = "a".repeat(256);
    assert_eq!(
        Etf.encode(&Term::atom(&name), &EncodeOptions::default()),
        Err(CodecError::AtomTooLong(name))
    );
}

#[test]
fn test_encode_multibyte_atom_uses_long_form() {
    let name = "é".repeat(200);
    let bytes = encode(&Term::atom(&name));
    assert_eq!(bytes[1], 118);
    assert_eq!(decode_any_atom(&bytes).unwrap(), Term::atom(&name));
}

#[test]
fn test_encode_large_tuple() {
    let term = Term::tuple((0..300).map(Term::from));
    let bytes = encode(&term);
    assert_eq!(bytes[1], 105);
    assert_eq!(decode(&bytes).unwrap(), term);
}
