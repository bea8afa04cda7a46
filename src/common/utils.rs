use std::io;
use std::slice;

use futures_lite::io::{AsyncRead, AsyncReadExt};

use crate::{Encodable, Error, Protocol};

/// The largest value a 4 byte variable byte integer can hold.
pub const MAX_REMAINING_LEN: usize = 268_435_455;

#[inline]
pub(crate) fn write_string<W: io::Write>(writer: &mut W, value: &str) -> Result<(), Error> {
    write_bytes(writer, value.as_bytes())
}

/// Write length prefixed data, the length MUST fit in 2 bytes.
#[inline]
pub(crate) fn write_bytes<W: io::Write>(writer: &mut W, data: &[u8]) -> Result<(), Error> {
    let len = u16::try_from(data.len()).map_err(|_| Error::StringTooLong(data.len()))?;
    write_u16(writer, len)?;
    writer.write_all(data)?;
    Ok(())
}

#[inline]
pub(crate) fn write_u32<W: io::Write>(writer: &mut W, value: u32) -> Result<(), Error> {
    writer.write_all(&value.to_be_bytes())?;
    Ok(())
}

#[inline]
pub(crate) fn write_u16<W: io::Write>(writer: &mut W, value: u16) -> Result<(), Error> {
    writer.write_all(&value.to_be_bytes())?;
    Ok(())
}

#[inline]
pub(crate) fn write_u8<W: io::Write>(writer: &mut W, value: u8) -> Result<(), Error> {
    writer.write_all(slice::from_ref(&value))?;
    Ok(())
}

/// Write a variable byte integer (4 bytes max).
#[inline]
pub fn write_var_int<W: io::Write>(writer: &mut W, mut len: usize) -> Result<(), Error> {
    if len > MAX_REMAINING_LEN {
        return Err(Error::EncodingOverflow(len));
    }
    loop {
        let mut byte = (len % 128) as u8;
        len /= 128;
        if len > 0 {
            byte |= 128;
        }
        write_u8(writer, byte)?;
        if len == 0 {
            break;
        }
    }
    Ok(())
}

/// Encode a variable byte integer into its 1 to 4 bytes.
#[inline]
pub fn encode_var_int(value: usize) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::with_capacity(var_int_len(value)?);
    write_var_int(&mut buf, value)?;
    Ok(buf)
}

/// Decode a variable byte integer (4 bytes max), return the value and the
/// number of bytes it took.
#[inline]
pub fn decode_var_int(data: &[u8], offset: &mut usize) -> Result<(u32, usize), Error> {
    let start_offset = *offset;
    let mut var_int: u32 = 0;
    let mut i = 0;
    loop {
        let byte = *data
            .get(*offset)
            .ok_or(Error::IoError(io::ErrorKind::UnexpectedEof))?;
        *offset += 1;
        var_int |= (u32::from(byte) & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            break;
        } else if i < 3 {
            i += 1;
        } else {
            return Err(Error::InvalidVarByteInt);
        }
    }
    Ok((var_int, *offset - start_offset))
}

/// Decode a variable byte integer from an async reader.
#[inline]
pub async fn decode_var_int_async<T: AsyncRead + Unpin>(
    reader: &mut T,
) -> Result<(u32, usize), Error> {
    let mut var_int: u32 = 0;
    let mut i = 0;
    loop {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf).await?;
        let byte = buf[0];
        var_int |= (u32::from(byte) & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            break;
        } else if i < 3 {
            i += 1;
        } else {
            return Err(Error::InvalidVarByteInt);
        }
    }
    Ok((var_int, i + 1))
}

/// Return the encoded size of the variable byte integer.
#[inline]
pub fn var_int_len(value: usize) -> Result<usize, Error> {
    let len = if value < 128 {
        1
    } else if value < 16384 {
        2
    } else if value < 2097152 {
        3
    } else if value <= MAX_REMAINING_LEN {
        4
    } else {
        return Err(Error::EncodingOverflow(value));
    };
    Ok(len)
}

/// Return the packet total encoded length by a given remaining length.
#[inline]
pub fn total_len(remaining_len: usize) -> Result<usize, Error> {
    Ok(1 + var_int_len(remaining_len)? + remaining_len)
}

/// Calculate remaining length by given total length (the total length MUST be
/// valid value).
#[inline]
pub fn remaining_len(total_len: usize) -> usize {
    total_len - header_len(total_len)
}

/// Calculate header length by given total length (the total length MUST be
/// valid value).
#[inline]
pub fn header_len(total_len: usize) -> usize {
    if total_len < 128 + 2 {
        2
    } else if total_len < 16384 + 3 {
        3
    } else if total_len < 2097152 + 4 {
        4
    } else {
        5
    }
}

/// Encode packet use control byte and body type.
///
/// The body is written first so the remaining length is taken from the
/// bytes it actually produced.
#[inline]
pub(crate) fn encode_packet<E: Encodable>(
    control_byte: u8,
    body: &E,
    protocol: Protocol,
) -> Result<Vec<u8>, Error> {
    let mut body_buf = Vec::with_capacity(body.encode_len(protocol));
    body.encode(&mut body_buf, protocol)?;
    let remaining_len = body_buf.len();
    debug_assert_eq!(remaining_len, body.encode_len(protocol));

    let mut buf = Vec::with_capacity(total_len(remaining_len)?);
    buf.push(control_byte);
    write_var_int(&mut buf, remaining_len)?;
    buf.extend_from_slice(&body_buf);
    Ok(buf)
}

macro_rules! packet_from {
    ($($t:ident),+) => {
        $(
            impl From<$t> for Packet {
                fn from(p: $t) -> Self {
                    Packet::$t(p)
                }
            }
        )+
    }
}

pub(crate) use packet_from;
