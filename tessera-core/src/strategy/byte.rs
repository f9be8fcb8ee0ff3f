//! Byte strategy: one token per input byte

use super::{SegmentContext, Strategy, StrategyKind};
use crate::error::Result;
use crate::token::{Segment, TokenKind};

/// Splits the raw input into single bytes
///
/// The only strategy that accepts input which is not valid UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteStrategy;

impl Strategy for ByteStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Byte
    }

    fn segment(&self, text: &str, ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
        self.segment_bytes(text.as_bytes(), ctx)
    }

    fn segment_bytes(&self, input: &[u8], ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
        let mut segments = Vec::with_capacity(input.len());
        for i in 0..input.len() {
            ctx.checkpoint()?;
            segments.push(Segment::new(i, i + 1, TokenKind::Byte));
        }
        Ok(segments)
    }
}

/// Token text for a single byte
///
/// ASCII bytes render as themselves; every other byte renders as `<0xNN>`
/// since it cannot stand alone as UTF-8.
pub fn render_byte(byte: u8) -> String {
    if byte.is_ascii() {
        char::from(byte).to_string()
    } else {
        format!("<0x{byte:02X}>")
    }
}

/// Inverse of [`render_byte`]; `None` for anything it never produces
pub fn parse_byte(text: &str) -> Option<u8> {
    let bytes = text.as_bytes();
    if bytes.len() == 1 && bytes[0].is_ascii() {
        return Some(bytes[0]);
    }
    let hex = text.strip_prefix("<0x")?.strip_suffix('>')?;
    if hex.len() != 2 || !hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'A'..=b'F')) {
        return None;
    }
    let value = u8::from_str_radix(hex, 16).ok()?;
    (!value.is_ascii()).then_some(value)
}
