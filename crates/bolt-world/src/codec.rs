//! Argument wire format.
//!
//! Anchor programs deserialize instruction arguments with Borsh, so every
//! value is written little-endian with no padding:
//!
//! ```text
//! bool                1 byte (0 or 1)
//! uN / iN             N/8 bytes, little-endian
//! f32 / f64           IEEE 754, little-endian
//! publicKey           32 raw bytes
//! bytes / string      u32 LE length | raw bytes
//! option<T>           u8 tag (0 = absent, 1 = present) | T if present
//! vec<T>              u32 LE element count | T * count
//! [T; N]              T * N
//! ```

use crate::address::Pubkey;
use crate::error::WorldError;
use crate::schema::FieldType;
use crate::value::ArgValue;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Append `value` to `out` as a `ty`, naming `field` in any error.
pub fn encode_value(
    out: &mut Vec<u8>,
    field: &str,
    ty: &FieldType,
    value: &ArgValue,
) -> Result<(), WorldError> {
    match (ty, value) {
        (FieldType::Bool, ArgValue::Bool(v)) => out.push(u8::from(*v)),
        (FieldType::U8, ArgValue::U8(v)) => out.push(*v),
        (FieldType::U16, ArgValue::U16(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldType::U32, ArgValue::U32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldType::U64, ArgValue::U64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldType::U128, ArgValue::U128(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldType::I8, ArgValue::I8(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldType::I16, ArgValue::I16(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldType::I32, ArgValue::I32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldType::I64, ArgValue::I64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldType::I128, ArgValue::I128(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldType::F32, ArgValue::F32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldType::F64, ArgValue::F64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldType::PublicKey, ArgValue::PublicKey(key)) => out.extend_from_slice(key.as_ref()),
        (FieldType::Bytes, ArgValue::Bytes(bytes)) => {
            encode_len(out, field, bytes.len())?;
            out.extend_from_slice(bytes);
        }
        (FieldType::String, ArgValue::String(s)) => {
            encode_len(out, field, s.len())?;
            out.extend_from_slice(s.as_bytes());
        }
        (FieldType::Option(_), ArgValue::Option(None)) => out.push(0),
        (FieldType::Option(inner), ArgValue::Option(Some(v))) => {
            out.push(1);
            encode_value(out, field, inner, v)?;
        }
        (FieldType::Vec(inner), ArgValue::Vec(items)) => {
            encode_len(out, field, items.len())?;
            for item in items {
                encode_value(out, field, inner, item)?;
            }
        }
        (FieldType::Array(inner, len), ArgValue::Array(items)) => {
            if items.len() != *len {
                return Err(WorldError::encoding(
                    field,
                    format!("expected {len} elements, got {}", items.len()),
                ));
            }
            for item in items {
                encode_value(out, field, inner, item)?;
            }
        }
        _ => {
            return Err(WorldError::encoding(
                field,
                format!("expected {ty}, got {}", value.kind()),
            ));
        }
    }
    Ok(())
}

fn encode_len(out: &mut Vec<u8>, field: &str, len: usize) -> Result<(), WorldError> {
    let len = u32::try_from(len).map_err(|_| {
        WorldError::encoding(field, format!("length {len} exceeds u32 length prefix"))
    })?;
    out.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Cursor over an encoded payload.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], WorldError> {
        if n > self.remaining() {
            return Err(WorldError::Decoding(format!(
                "unexpected end of data: need {n} bytes at offset {}, have {}",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], WorldError> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.take(N)?);
        Ok(arr)
    }

    fn take_u8(&mut self) -> Result<u8, WorldError> {
        Ok(self.take(1)?[0])
    }

    fn take_len(&mut self) -> Result<usize, WorldError> {
        Ok(u32::from_le_bytes(self.take_array()?) as usize)
    }
}

/// Read one `ty` from the reader.
pub fn decode_value(reader: &mut Reader<'_>, ty: &FieldType) -> Result<ArgValue, WorldError> {
    let value = match ty {
        FieldType::Bool => match reader.take_u8()? {
            0 => ArgValue::Bool(false),
            1 => ArgValue::Bool(true),
            other => {
                return Err(WorldError::Decoding(format!("invalid bool byte {other}")));
            }
        },
        FieldType::U8 => ArgValue::U8(reader.take_u8()?),
        FieldType::U16 => ArgValue::U16(u16::from_le_bytes(reader.take_array()?)),
        FieldType::U32 => ArgValue::U32(u32::from_le_bytes(reader.take_array()?)),
        FieldType::U64 => ArgValue::U64(u64::from_le_bytes(reader.take_array()?)),
        FieldType::U128 => ArgValue::U128(u128::from_le_bytes(reader.take_array()?)),
        FieldType::I8 => ArgValue::I8(i8::from_le_bytes(reader.take_array()?)),
        FieldType::I16 => ArgValue::I16(i16::from_le_bytes(reader.take_array()?)),
        FieldType::I32 => ArgValue::I32(i32::from_le_bytes(reader.take_array()?)),
        FieldType::I64 => ArgValue::I64(i64::from_le_bytes(reader.take_array()?)),
        FieldType::I128 => ArgValue::I128(i128::from_le_bytes(reader.take_array()?)),
        FieldType::F32 => ArgValue::F32(f32::from_le_bytes(reader.take_array()?)),
        FieldType::F64 => ArgValue::F64(f64::from_le_bytes(reader.take_array()?)),
        FieldType::PublicKey => ArgValue::PublicKey(Pubkey::new_from_array(reader.take_array()?)),
        FieldType::Bytes => {
            let len = reader.take_len()?;
            ArgValue::Bytes(reader.take(len)?.to_vec())
        }
        FieldType::String => {
            let len = reader.take_len()?;
            let bytes = reader.take(len)?;
            let s = std::str::from_utf8(bytes)
                .map_err(|e| WorldError::Decoding(format!("invalid UTF-8 string: {e}")))?;
            ArgValue::String(s.to_string())
        }
        FieldType::Option(inner) => match reader.take_u8()? {
            0 => ArgValue::Option(None),
            1 => ArgValue::Option(Some(Box::new(decode_value(reader, inner)?))),
            other => {
                return Err(WorldError::Decoding(format!("invalid option tag {other}")));
            }
        },
        FieldType::Vec(inner) => {
            let count = reader.take_len()?;
            let items = decode_elements(reader, inner, count)?;
            ArgValue::Vec(items)
        }
        FieldType::Array(inner, len) => {
            let items = decode_elements(reader, inner, *len)?;
            ArgValue::Array(items)
        }
    };
    Ok(value)
}

/// Read `count` elements of `ty`.
///
/// `count` is untrusted: it must fit in what is left of the payload, and
/// element types that encode to zero bytes are refused outright.
fn decode_elements(
    reader: &mut Reader<'_>,
    ty: &FieldType,
    count: usize,
) -> Result<Vec<ArgValue>, WorldError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let needed = match ty.min_encoded_size() {
        Some(0) => {
            return Err(WorldError::Decoding(format!(
                "element type {ty} encodes to zero bytes"
            )));
        }
        Some(size) => size.checked_mul(count),
        None => None,
    };
    match needed {
        Some(needed) if needed <= reader.remaining() => {}
        _ => {
            return Err(WorldError::Decoding(format!(
                "{count} elements of {ty} do not fit in the {} bytes left at offset {}",
                reader.remaining(),
                reader.position()
            )));
        }
    }

    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(decode_value(reader, ty)?);
    }
    Ok(items)
}
