//! External Term Format encoder.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::error::{CodecError, CodecResult};
use super::tags;
use super::EncodeOptions;
use crate::term::{BigInt, Pid, Term};

/// Encode a term into a complete blob, including the version byte.
pub(crate) fn encode(term: &Term, options: &EncodeOptions) -> CodecResult<Vec<u8>> {
    let mut body = Vec::new();
    write_term(&mut body, term)?;

    let Some(level) = options.compression else {
        let mut out = Vec::with_capacity(body.len() + 1);
        out.push(tags::VERSION);
        out.extend_from_slice(&body);
        return Ok(out);
    };

    let size = len_u32("term", body.len())?;
    let mut header = vec![tags::VERSION, tags::COMPRESSED];
    header.extend_from_slice(&size.to_be_bytes());

    let compression = |e: std::io::Error| CodecError::Compression(e.to_string());
    let mut encoder = ZlibEncoder::new(header, Compression::new(level));
    encoder.write_all(&body).map_err(compression)?;
    encoder.finish().map_err(compression)
}

fn len_u32(what: &'static str, len: usize) -> CodecResult<u32> {
    u32::try_from(len).map_err(|_| CodecError::TooLong { what, len })
}

fn write_term(out: &mut Vec<u8>, term: &Term) -> CodecResult<()> {
    match term {
        Term::Nil => write_atom(out, "nil"),
        Term::Bool(true) => write_atom(out, "true"),
        Term::Bool(false) => write_atom(out, "false"),
        Term::Int(value) => {
            write_int(out, *value);
            Ok(())
        }
        Term::BigInt(big) => write_big(out, big),
        Term::Float(value) => {
            if !value.is_finite() {
                return Err(CodecError::NonFiniteFloat);
            }
            out.push(tags::NEW_FLOAT_EXT);
            out.extend_from_slice(&value.to_be_bytes());
            Ok(())
        }
        Term::Binary(bytes) => {
            out.push(tags::BINARY_EXT);
            out.extend_from_slice(&len_u32("binary", bytes.len())?.to_be_bytes());
            out.extend_from_slice(bytes);
            Ok(())
        }
        Term::BitString(bits) => {
            if bits.bytes.is_empty() || !(1..=8).contains(&bits.tail_bits) {
                return Err(CodecError::invalid(
                    "bit binary",
                    format!("{} bytes with {} tail bits", bits.bytes.len(), bits.tail_bits),
                ));
            }
            out.push(tags::BIT_BINARY_EXT);
            out.extend_from_slice(&len_u32("bit binary", bits.bytes.len())?.to_be_bytes());
            out.push(bits.tail_bits);
            out.extend_from_slice(&bits.bytes);
            Ok(())
        }
        Term::Atom(atom) => write_atom(out, atom.as_str()),
        Term::List(items) => write_list(out, items, None),
        Term::ImproperList { elements, tail } => write_list(out, elements, Some(tail.as_ref())),
        Term::Tuple(items) => {
            match u8::try_from(items.len()) {
                Ok(arity) => out.extend_from_slice(&[tags::SMALL_TUPLE_EXT, arity]),
                Err(_) => {
                    out.push(tags::LARGE_TUPLE_EXT);
                    out.extend_from_slice(&len_u32("tuple", items.len())?.to_be_bytes());
                }
            }
            items.iter().try_for_each(|item| write_term(out, item))
        }
        Term::Map(map) => {
            out.push(tags::MAP_EXT);
            out.extend_from_slice(&len_u32("map", map.len())?.to_be_bytes());
            for (key, value) in map {
                write_term(out, key)?;
                write_term(out, value)?;
            }
            Ok(())
        }
        Term::Pid(pid) => write_pid(out, pid),
        Term::Reference(reference) => {
            let len = reference.ids.len();
            if len == 0 || len > tags::MAX_REFERENCE_IDS {
                return Err(CodecError::invalid("reference", format!("{} ids", len)));
            }
            out.push(tags::NEWER_REFERENCE_EXT);
            out.extend_from_slice(&(len as u16).to_be_bytes());
            write_atom(out, reference.node.as_str())?;
            out.extend_from_slice(&reference.creation.to_be_bytes());
            for id in &reference.ids {
                out.extend_from_slice(&id.to_be_bytes());
            }
            Ok(())
        }
        Term::Port(port) => {
            match u32::try_from(port.id) {
                Ok(id) => {
                    out.push(tags::NEW_PORT_EXT);
                    write_atom(out, port.node.as_str())?;
                    out.extend_from_slice(&id.to_be_bytes());
                }
                Err(_) => {
                    out.push(tags::V4_PORT_EXT);
                    write_atom(out, port.node.as_str())?;
                    out.extend_from_slice(&port.id.to_be_bytes());
                }
            }
            out.extend_from_slice(&port.creation.to_be_bytes());
            Ok(())
        }
        Term::Fun(fun) => {
            let mut body = Vec::new();
            body.push(fun.arity);
            body.extend_from_slice(&fun.uniq);
            body.extend_from_slice(&fun.index.to_be_bytes());
            body.extend_from_slice(&len_u32("fun environment", fun.free_vars.len())?.to_be_bytes());
            write_atom(&mut body, fun.module.as_str())?;
            write_int(&mut body, fun.old_index);
            write_int(&mut body, fun.old_uniq);
            write_pid(&mut body, &fun.pid)?;
            for var in &fun.free_vars {
                write_term(&mut body, var)?;
            }
            // Size counts its own four bytes.
            let size = len_u32("fun", body.len() + 4)?;
            out.push(tags::NEW_FUN_EXT);
            out.extend_from_slice(&size.to_be_bytes());
            out.extend_from_slice(&body);
            Ok(())
        }
        Term::Export(export) => {
            out.push(tags::EXPORT_EXT);
            write_atom(out, export.module.as_str())?;
            write_atom(out, export.function.as_str())?;
            out.extend_from_slice(&[tags::SMALL_INTEGER_EXT, export.arity]);
            Ok(())
        }
    }
}

fn write_atom(out: &mut Vec<u8>, name: &str) -> CodecResult<()> {
    if name.chars().count() > tags::MAX_ATOM_CHARS {
        return Err(CodecError::AtomTooLong(name.to_string()));
    }
    match u8::try_from(name.len()) {
        Ok(len) => out.extend_from_slice(&[tags::SMALL_ATOM_UTF8_EXT, len]),
        Err(_) => {
            // At most 255 characters of at most 4 bytes each.
            out.push(tags::ATOM_UTF8_EXT);
            out.extend_from_slice(&(name.len() as u16).to_be_bytes());
        }
    }
    out.extend_from_slice(name.as_bytes());
    Ok(())
}

fn write_int(out: &mut Vec<u8>, value: i64) {
    if let Ok(small) = u8::try_from(value) {
        out.extend_from_slice(&[tags::SMALL_INTEGER_EXT, small]);
    } else if let Ok(int) = i32::try_from(value) {
        out.push(tags::INTEGER_EXT);
        out.extend_from_slice(&int.to_be_bytes());
    } else {
        // Fits SMALL_BIG_EXT; the magnitude is at most eight bytes.
        let big = BigInt::from_i64(value);
        out.extend_from_slice(&[
            tags::SMALL_BIG_EXT,
            big.magnitude().len() as u8,
            u8::from(big.is_negative()),
        ]);
        out.extend_from_slice(big.magnitude());
    }
}

fn write_big(out: &mut Vec<u8>, big: &BigInt) -> CodecResult<()> {
    let digits = big.magnitude();
    match u8::try_from(digits.len()) {
        Ok(n) => out.extend_from_slice(&[tags::SMALL_BIG_EXT, n]),
        Err(_) => {
            out.push(tags::LARGE_BIG_EXT);
            out.extend_from_slice(&len_u32("bignum", digits.len())?.to_be_bytes());
        }
    }
    out.push(u8::from(big.is_negative()));
    out.extend_from_slice(digits);
    Ok(())
}

fn write_list(out: &mut Vec<u8>, items: &[Term], tail: Option<&Term>) -> CodecResult<()> {
    if items.is_empty() {
        return match tail {
            Some(tail) => write_term(out, tail),
            None => {
                out.push(tags::NIL_EXT);
                Ok(())
            }
        };
    }
    out.push(tags::LIST_EXT);
    out.extend_from_slice(&len_u32("list", items.len())?.to_be_bytes());
    for item in items {
        write_term(out, item)?;
    }
    match tail {
        Some(tail) => write_term(out, tail),
        None => {
            out.push(tags::NIL_EXT);
            Ok(())
        }
    }
}

fn write_pid(out: &mut Vec<u8>, pid: &Pid) -> CodecResult<()> {
    out.push(tags::NEW_PID_EXT);
    write_atom(out, pid.node.as_str())?;
    out.extend_from_slice(&pid.id.to_be_bytes());
    out.extend_from_slice(&pid.serial.to_be_bytes());
    out.extend_from_slice(&pid.creation.to_be_bytes());
    Ok(())
}
