//! External Term Format decoder.

use std::io::Read;

use flate2::read::ZlibDecoder;

use super::atoms::AtomPolicy;
use super::error::{CodecError, CodecResult};
use super::tags;
use super::{DecodeOptions, MAX_DEPTH_CEILING};
use crate::term::{Atom, BigInt, BitString, Export, Fun, Pid, Port, Reference, Term, TermMap};

/// Decode a complete blob, including the version byte.
pub(crate) fn decode(bytes: &[u8], options: &DecodeOptions) -> CodecResult<Term> {
    let limit = options.limits.max_input_size;
    if bytes.len() > limit {
        return Err(CodecError::InputTooLarge {
            size: bytes.len(),
            limit,
        });
    }

    let mut reader = Reader::new(bytes, options);
    let version = reader.u8()?;
    if version != tags::VERSION {
        return Err(CodecError::BadVersion(version));
    }

    if reader.peek() == Some(tags::COMPRESSED) {
        reader.u8()?;
        let inflated = reader.inflate()?;
        return Reader::new(&inflated, options).finish();
    }

    reader.finish()
}

fn finite(value: f64) -> CodecResult<Term> {
    if value.is_finite() {
        Ok(Term::Float(value))
    } else {
        Err(CodecError::NonFiniteFloat)
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    options: &'a DecodeOptions,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8], options: &'a DecodeOptions) -> Self {
        Self {
            buf,
            pos: 0,
            options,
        }
    }

    /// Decode one term and require the input to end there.
    fn finish(&mut self) -> CodecResult<Term> {
        let term = self.term(0)?;
        match self.remaining() {
            0 => Ok(term),
            count => Err(CodecError::TrailingBytes { count }),
        }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn take(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(CodecError::UnexpectedEof { offset: self.pos });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0_u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> CodecResult<u16> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    fn u32(&mut self) -> CodecResult<u32> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    fn u64(&mut self) -> CodecResult<u64> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    fn i32(&mut self) -> CodecResult<i32> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    /// Check that `count` items of at least `min_size` bytes each can still
    /// follow, so a hostile length prefix never drives an allocation.
    fn ensure_items(&self, count: usize, min_size: usize) -> CodecResult<()> {
        match count.checked_mul(min_size) {
            Some(needed) if needed <= self.remaining() => Ok(()),
            _ => Err(CodecError::UnexpectedEof { offset: self.pos }),
        }
    }

    fn inflate(&mut self) -> CodecResult<Vec<u8>> {
        let limits = self.options.limits;
        if !limits.allow_compressed {
            return Err(CodecError::CompressedNotAllowed);
        }
        let size = self.u32()? as usize;
        if size > limits.max_input_size {
            return Err(CodecError::InputTooLarge {
                size,
                limit: limits.max_input_size,
            });
        }

        let buf = self.buf;
        let compressed = &buf[self.pos..];
        self.pos = buf.len();

        let mut inflated = Vec::new();
        ZlibDecoder::new(compressed)
            .take(size as u64 + 1)
            .read_to_end(&mut inflated)
            .map_err(|e| CodecError::Compression(e.to_string()))?;
        if inflated.len() != size {
            return Err(CodecError::invalid(
                "compressed term",
                format!("declared {} bytes, inflated {}", size, inflated.len()),
            ));
        }
        Ok(inflated)
    }

    fn term(&mut self, depth: usize) -> CodecResult<Term> {
        let limit = self.options.limits.max_depth.min(MAX_DEPTH_CEILING);
        if depth > limit {
            return Err(CodecError::DepthExceeded { depth, limit });
        }

        let offset = self.pos;
        let tag = self.u8()?;
        match tag {
            tags::SMALL_INTEGER_EXT => Ok(Term::Int(i64::from(self.u8()?))),
            tags::INTEGER_EXT => Ok(Term::Int(i64::from(self.i32()?))),
            tags::SMALL_BIG_EXT => {
                let n = usize::from(self.u8()?);
                self.big(n)
            }
            tags::LARGE_BIG_EXT => {
                let n = self.u32()? as usize;
                self.big(n)
            }
            tags::NEW_FLOAT_EXT => finite(f64::from_be_bytes(self.array()?)),
            tags::FLOAT_EXT => self.float_text(),
            tags::ATOM_EXT | tags::SMALL_ATOM_EXT | tags::ATOM_UTF8_EXT | tags::SMALL_ATOM_UTF8_EXT => {
                let name = self.atom_body(tag)?;
                self.admit_atom(&name)?;
                Ok(Term::atom(&name))
            }
            tags::SMALL_TUPLE_EXT => {
                let n = usize::from(self.u8()?);
                Ok(Term::Tuple(self.terms(n, depth)?))
            }
            tags::LARGE_TUPLE_EXT => {
                let n = self.u32()? as usize;
                Ok(Term::Tuple(self.terms(n, depth)?))
            }
            tags::NIL_EXT => Ok(Term::List(Vec::new())),
            tags::STRING_EXT => {
                let n = usize::from(self.u16()?);
                let chars = self.take(n)?;
                Ok(Term::List(
                    chars.iter().map(|&c| Term::Int(i64::from(c))).collect(),
                ))
            }
            tags::LIST_EXT => {
                let n = self.u32()? as usize;
                let elements = self.terms(n, depth)?;
                let tail = self.term(depth + 1)?;
                Ok(Term::improper(elements, tail))
            }
            tags::BINARY_EXT => {
                let n = self.u32()? as usize;
                Ok(Term::Binary(self.take(n)?.to_vec()))
            }
            tags::BIT_BINARY_EXT => self.bit_binary(),
            tags::MAP_EXT => self.map(depth),
            tags::NEW_PID_EXT | tags::PID_EXT => Ok(Term::Pid(self.pid_body(tag)?)),
            tags::NEWER_REFERENCE_EXT | tags::NEW_REFERENCE_EXT => self.new_reference(tag),
            tags::REFERENCE_EXT => {
                let node = self.atom()?;
                let id = self.u32()?;
                let creation = u32::from(self.u8()?);
                Ok(Term::Reference(Reference {
                    node,
                    creation,
                    ids: vec![id],
                }))
            }
            tags::NEW_PORT_EXT | tags::V4_PORT_EXT | tags::PORT_EXT => self.port(tag),
            tags::NEW_FUN_EXT => self.fun(depth),
            tags::EXPORT_EXT => self.export(depth),
            tags::ATOM_CACHE_REF => Err(CodecError::UnsupportedTag {
                tag,
                offset,
                what: "atom cache reference",
            }),
            tags::FUN_EXT => Err(CodecError::UnsupportedTag {
                tag,
                offset,
                what: "legacy fun",
            }),
            tags::LOCAL_EXT => Err(CodecError::UnsupportedTag {
                tag,
                offset,
                what: "local term",
            }),
            _ => Err(CodecError::UnknownTag { tag, offset }),
        }
    }

    fn terms(&mut self, count: usize, depth: usize) -> CodecResult<Vec<Term>> {
        self.ensure_items(count, 1)?;
        (0..count).map(|_| self.term(depth + 1)).collect()
    }

    fn big(&mut self, n: usize) -> CodecResult<Term> {
        let negative = match self.u8()? {
            0 => false,
            1 => true,
            sign => return Err(CodecError::invalid("bignum sign", sign.to_string())),
        };
        let big = BigInt::from_le_bytes(negative, self.take(n)?.to_vec());
        Ok(match big.to_i64() {
            Some(value) => Term::Int(value),
            None => Term::BigInt(big),
        })
    }

    fn float_text(&mut self) -> CodecResult<Term> {
        let raw = self.take(31)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let text = std::str::from_utf8(&raw[..end])
            .map_err(|e| CodecError::invalid("float", e.to_string()))?;
        let value = text
            .trim()
            .parse::<f64>()
            .map_err(|_| CodecError::invalid("float", text.trim()))?;
        finite(value)
    }

    fn atom_body(&mut self, tag: u8) -> CodecResult<String> {
        let len = match tag {
            tags::ATOM_EXT | tags::ATOM_UTF8_EXT => usize::from(self.u16()?),
            _ => usize::from(self.u8()?),
        };
        let bytes = self.take(len)?;
        let name: String = match tag {
            tags::ATOM_EXT | tags::SMALL_ATOM_EXT => bytes.iter().map(|&b| char::from(b)).collect(),
            _ => std::str::from_utf8(bytes)
                .map_err(|e| CodecError::invalid("atom", e.to_string()))?
                .to_owned(),
        };
        let chars = name.chars().count();
        if chars > tags::MAX_ATOM_CHARS {
            return Err(CodecError::invalid("atom", format!("{} characters", chars)));
        }
        Ok(name)
    }

    /// Read an atom embedded in another term (node names, modules).
    fn atom(&mut self) -> CodecResult<Atom> {
        let offset = self.pos;
        let tag = self.u8()?;
        match tag {
            tags::ATOM_EXT | tags::SMALL_ATOM_EXT | tags::ATOM_UTF8_EXT | tags::SMALL_ATOM_UTF8_EXT => {
                let name = self.atom_body(tag)?;
                self.admit_atom(&name)?;
                Ok(Atom::new(name))
            }
            _ => Err(CodecError::invalid(
                "atom",
                format!("expected atom at byte {}, found tag {}", offset, tag),
            )),
        }
    }

    fn admit_atom(&self, name: &str) -> CodecResult<()> {
        match self.options.atom_policy {
            AtomPolicy::CreateNew => Ok(()),
            AtomPolicy::ExistingOnly if self.options.known_atoms.contains(name) => Ok(()),
            AtomPolicy::ExistingOnly => Err(CodecError::UnknownAtom(name.to_string())),
        }
    }

    fn bit_binary(&mut self) -> CodecResult<Term> {
        let len = self.u32()? as usize;
        let tail_bits = self.u8()?;
        if len == 0 || !(1..=8).contains(&tail_bits) {
            return Err(CodecError::invalid(
                "bit binary",
                format!("{} bytes with {} tail bits", len, tail_bits),
            ));
        }
        let mut bytes = self.take(len)?.to_vec();
        if tail_bits == 8 {
            return Ok(Term::Binary(bytes));
        }
        // Unused low bits carry no information; clear them.
        if let Some(last) = bytes.last_mut() {
            *last &= 0xff_u8 << (8 - tail_bits);
        }
        Ok(Term::BitString(BitString { bytes, tail_bits }))
    }

    fn map(&mut self, depth: usize) -> CodecResult<Term> {
        let count = self.u32()? as usize;
        self.ensure_items(count, 2)?;
        let mut map = TermMap::with_capacity(count);
        for _ in 0..count {
            let key = self.term(depth + 1)?;
            let value = self.term(depth + 1)?;
            if map.contains_key(&key) {
                return Err(CodecError::DuplicateKey(key.to_string()));
            }
            map.insert(key, value);
        }
        Ok(Term::Map(map))
    }

    fn pid_body(&mut self, tag: u8) -> CodecResult<Pid> {
        let node = self.atom()?;
        let id = self.u32()?;
        let serial = self.u32()?;
        let creation = match tag {
            tags::NEW_PID_EXT => self.u32()?,
            _ => u32::from(self.u8()?),
        };
        Ok(Pid {
            node,
            id,
            serial,
            creation,
        })
    }

    fn new_reference(&mut self, tag: u8) -> CodecResult<Term> {
        let len = usize::from(self.u16()?);
        if len == 0 || len > tags::MAX_REFERENCE_IDS {
            return Err(CodecError::invalid("reference", format!("{} ids", len)));
        }
        let node = self.atom()?;
        let creation = match tag {
            tags::NEWER_REFERENCE_EXT => self.u32()?,
            _ => u32::from(self.u8()?),
        };
        let ids = (0..len)
            .map(|_| self.u32())
            .collect::<CodecResult<Vec<u32>>>()?;
        Ok(Term::Reference(Reference {
            node,
            creation,
            ids,
        }))
    }

    fn port(&mut self, tag: u8) -> CodecResult<Term> {
        let node = self.atom()?;
        let id = match tag {
            tags::V4_PORT_EXT => self.u64()?,
            _ => u64::from(self.u32()?),
        };
        let creation = match tag {
            tags::PORT_EXT => u32::from(self.u8()?),
            _ => self.u32()?,
        };
        Ok(Term::Port(Port { node, id, creation }))
    }

    fn small_int(&mut self, depth: usize, what: &'static str) -> CodecResult<i64> {
        match self.term(depth + 1)? {
            Term::Int(value) => Ok(value),
            other => Err(CodecError::invalid(what, format!("expected integer, found {}", other))),
        }
    }

    fn fun(&mut self, depth: usize) -> CodecResult<Term> {
        let start = self.pos;
        let size = self.u32()? as usize;
        let arity = self.u8()?;
        let uniq = self.array::<16>()?;
        let index = self.u32()?;
        let num_free = self.u32()? as usize;
        let module = self.atom()?;
        let old_index = self.small_int(depth, "fun")?;
        let old_uniq = self.small_int(depth, "fun")?;
        let pid = match self.term(depth + 1)? {
            Term::Pid(pid) => pid,
            other => {
                return Err(CodecError::invalid(
                    "fun",
                    format!("expected pid, found {}", other),
                ))
            }
        };
        let free_vars = self.terms(num_free, depth)?;

        let consumed = self.pos - start;
        if consumed != size {
            return Err(CodecError::invalid(
                "fun",
                format!("declared size {}, consumed {}", size, consumed),
            ));
        }
        Ok(Term::Fun(Fun {
            module,
            arity,
            uniq,
            index,
            old_index,
            old_uniq,
            pid,
            free_vars,
        }))
    }

    fn export(&mut self, depth: usize) -> CodecResult<Term> {
        let module = self.atom()?;
        let function = self.atom()?;
        let arity = self.small_int(depth, "export arity")?;
        let arity = u8::try_from(arity)
            .map_err(|_| CodecError::invalid("export arity", arity.to_string()))?;
        Ok(Term::Export(Export {
            module,
            function,
            arity,
        }))
    }
}
