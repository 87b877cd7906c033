//! OSC messages and bundles
//!
//! Packet = Message | Bundle
//! Message = padded address + padded type tag string + arguments
//! Bundle = "#bundle" + time tag + (size + packet)*

use bytes::{Buf, BufMut};

use tuio_core::{TuioError, TuioResult};

use crate::OscArg;

/// Bundle marker, NUL terminated and padded
pub const BUNDLE_TAG: &[u8; 8] = b"#bundle\0";

/// Time tag meaning "immediately"
pub const TIMETAG_IMMEDIATE: u64 = 1;

/// An addressed OSC message
#[derive(Clone, Debug, PartialEq)]
pub struct OscMessage {
    pub address: String,
    pub args: Vec<OscArg>,
}

impl OscMessage {
    pub fn new(address: impl Into<String>) -> Self {
        OscMessage {
            address: address.into(),
            args: Vec::new(),
        }
    }

    /// Builder-style argument append
    pub fn arg(mut self, arg: impl Into<OscArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// First argument as a string (the TUIO command)
    pub fn command(&self) -> Option<&str> {
        self.args.first().and_then(OscArg::as_str)
    }
}

/// A time-tagged group of packets
#[derive(Clone, Debug, PartialEq)]
pub struct OscBundle {
    pub timetag: u64,
    pub content: Vec<OscPacket>,
}

impl OscBundle {
    pub fn new(timetag: u64) -> Self {
        OscBundle {
            timetag,
            content: Vec::new(),
        }
    }

    pub fn push(mut self, packet: impl Into<OscPacket>) -> Self {
        self.content.push(packet.into());
        self
    }
}

/// A complete OSC packet as carried by one datagram
#[derive(Clone, Debug, PartialEq)]
pub enum OscPacket {
    Message(OscMessage),
    Bundle(OscBundle),
}

impl From<OscMessage> for OscPacket {
    fn from(msg: OscMessage) -> Self {
        OscPacket::Message(msg)
    }
}

impl From<OscBundle> for OscPacket {
    fn from(bundle: OscBundle) -> Self {
        OscPacket::Bundle(bundle)
    }
}

impl OscPacket {
    /// Parse a packet from a datagram
    pub fn decode(buf: &[u8]) -> TuioResult<Self> {
        if buf.is_empty() {
            return Err(TuioError::BufferTooShort {
                expected: 4,
                actual: 0,
            });
        }
        if buf.len() % 4 != 0 {
            return Err(TuioError::InvalidPacket(format!(
                "Packet size {} is not a multiple of 4",
                buf.len()
            )));
        }

        if buf.starts_with(BUNDLE_TAG) {
            decode_bundle(buf).map(OscPacket::Bundle)
        } else if buf[0] == b'/' {
            decode_message(buf).map(OscPacket::Message)
        } else {
            Err(TuioError::InvalidPacket(
                "Packet is neither a message nor a bundle".into(),
            ))
        }
    }

    /// Serialize the packet
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_size());
        self.encode_into(&mut buf);
        buf
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        match self {
            OscPacket::Message(msg) => encode_message(msg, buf),
            OscPacket::Bundle(bundle) => {
                buf.put_slice(BUNDLE_TAG);
                buf.put_u64(bundle.timetag);
                for element in &bundle.content {
                    let size_at = buf.len();
                    buf.put_i32(0);
                    element.encode_into(buf);
                    let size = (buf.len() - size_at - 4) as i32;
                    buf[size_at..size_at + 4].copy_from_slice(&size.to_be_bytes());
                }
            }
        }
    }

    fn encoded_size(&self) -> usize {
        match self {
            OscPacket::Message(msg) => {
                padded_len(msg.address.len())
                    + padded_len(msg.args.len() + 1)
                    + msg.args.iter().map(arg_size).sum::<usize>()
            }
            OscPacket::Bundle(bundle) => {
                BUNDLE_TAG.len()
                    + 8
                    + bundle
                        .content
                        .iter()
                        .map(|p| 4 + p.encoded_size())
                        .sum::<usize>()
            }
        }
    }

    /// Flatten bundles into their messages, in wire order
    pub fn into_messages(self) -> Vec<OscMessage> {
        let mut out = Vec::new();
        self.collect_messages(&mut out);
        out
    }

    fn collect_messages(self, out: &mut Vec<OscMessage>) {
        match self {
            OscPacket::Message(msg) => out.push(msg),
            OscPacket::Bundle(bundle) => {
                for packet in bundle.content {
                    packet.collect_messages(out);
                }
            }
        }
    }
}

// ============================================================================
// DECODING
// ============================================================================

fn decode_bundle(mut buf: &[u8]) -> TuioResult<OscBundle> {
    buf.advance(BUNDLE_TAG.len());
    ensure_remaining(buf, 8)?;
    let timetag = buf.get_u64();

    let mut content = Vec::new();
    while buf.has_remaining() {
        ensure_remaining(buf, 4)?;
        let size = buf.get_i32();
        if size < 0 || size as usize > buf.remaining() {
            return Err(TuioError::InvalidPacket(format!(
                "Bundle element size {} exceeds remaining {} bytes",
                size,
                buf.remaining()
            )));
        }
        let (element, rest) = buf.split_at(size as usize);
        content.push(OscPacket::decode(element)?);
        buf = rest;
    }

    Ok(OscBundle { timetag, content })
}

fn decode_message(mut buf: &[u8]) -> TuioResult<OscMessage> {
    let address = read_string(&mut buf)?;

    // Type tags are optional in very old OSC senders; no tags means no arguments
    if !buf.has_remaining() {
        return Ok(OscMessage {
            address,
            args: Vec::new(),
        });
    }

    let tags = read_string(&mut buf)?;
    let Some(tags) = tags.strip_prefix(',') else {
        return Err(TuioError::InvalidPacket(format!(
            "Type tag string {:?} does not start with ','",
            tags
        )));
    };

    let mut args = Vec::with_capacity(tags.len());
    for tag in tags.chars() {
        args.push(read_arg(tag, &mut buf)?);
    }

    Ok(OscMessage { address, args })
}

fn read_arg(tag: char, buf: &mut &[u8]) -> TuioResult<OscArg> {
    let arg = match tag {
        'i' => {
            ensure_remaining(buf, 4)?;
            OscArg::Int(buf.get_i32())
        }
        'f' => {
            ensure_remaining(buf, 4)?;
            OscArg::Float(buf.get_f32())
        }
        's' | 'S' => OscArg::String(read_string(buf)?),
        'b' => {
            ensure_remaining(buf, 4)?;
            let len = buf.get_i32();
            if len < 0 {
                return Err(TuioError::InvalidPacket(format!("Negative blob size {}", len)));
            }
            let len = len as usize;
            ensure_remaining(buf, padded_len_no_nul(len))?;
            let data = buf[..len].to_vec();
            buf.advance(padded_len_no_nul(len));
            OscArg::Blob(data)
        }
        'h' => {
            ensure_remaining(buf, 8)?;
            OscArg::Long(buf.get_i64())
        }
        'd' => {
            ensure_remaining(buf, 8)?;
            OscArg::Double(buf.get_f64())
        }
        't' => {
            ensure_remaining(buf, 8)?;
            OscArg::Time(buf.get_u64())
        }
        'T' => OscArg::True,
        'F' => OscArg::False,
        'N' => OscArg::Nil,
        'I' => OscArg::Impulse,
        other => return Err(TuioError::UnsupportedTypeTag(other)),
    };
    Ok(arg)
}

/// Read a NUL-terminated string padded to a 4-byte boundary
fn read_string(buf: &mut &[u8]) -> TuioResult<String> {
    let Some(nul) = buf.iter().position(|&b| b == 0) else {
        return Err(TuioError::InvalidPacket("Unterminated string".into()));
    };
    let s = std::str::from_utf8(&buf[..nul])
        .map_err(|e| TuioError::InvalidPacket(format!("String is not UTF-8: {}", e)))?
        .to_string();

    let consumed = padded_len(nul);
    ensure_remaining(buf, consumed)?;
    buf.advance(consumed);
    Ok(s)
}

fn ensure_remaining(buf: &[u8], expected: usize) -> TuioResult<()> {
    if buf.remaining() < expected {
        return Err(TuioError::BufferTooShort {
            expected,
            actual: buf.remaining(),
        });
    }
    Ok(())
}

// ============================================================================
// ENCODING
// ============================================================================

fn encode_message(msg: &OscMessage, buf: &mut Vec<u8>) {
    write_string(&msg.address, buf);

    let mut tags = String::with_capacity(msg.args.len() + 1);
    tags.push(',');
    tags.extend(msg.args.iter().map(OscArg::type_tag));
    write_string(&tags, buf);

    for arg in &msg.args {
        match arg {
            OscArg::Int(v) => buf.put_i32(*v),
            OscArg::Float(v) => buf.put_f32(*v),
            OscArg::String(s) => write_string(s, buf),
            OscArg::Blob(data) => {
                buf.put_i32(data.len() as i32);
                buf.put_slice(data);
                buf.put_bytes(0, padded_len_no_nul(data.len()) - data.len());
            }
            OscArg::Long(v) => buf.put_i64(*v),
            OscArg::Double(v) => buf.put_f64(*v),
            OscArg::Time(v) => buf.put_u64(*v),
            OscArg::True | OscArg::False | OscArg::Nil | OscArg::Impulse => {}
        }
    }
}

fn write_string(s: &str, buf: &mut Vec<u8>) {
    buf.put_slice(s.as_bytes());
    buf.put_bytes(0, padded_len(s.len()) - s.len());
}

fn arg_size(arg: &OscArg) -> usize {
    match arg {
        OscArg::Int(_) | OscArg::Float(_) => 4,
        OscArg::String(s) => padded_len(s.len()),
        OscArg::Blob(data) => 4 + padded_len_no_nul(data.len()),
        OscArg::Long(_) | OscArg::Double(_) | OscArg::Time(_) => 8,
        OscArg::True | OscArg::False | OscArg::Nil | OscArg::Impulse => 0,
    }
}

/// Size of a string of `len` bytes plus its NUL, rounded up to 4
#[inline]
fn padded_len(len: usize) -> usize {
    (len + 4) & !3
}

/// Size of `len` bytes rounded up to 4
#[inline]
fn padded_len_no_nul(len: usize) -> usize {
    (len + 3) & !3
}
