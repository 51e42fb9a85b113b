//! Guest call stack as reported by the debugger
//!
//! Each [`StackEntry`] is one row of the debugger's stack listing: the frame's
//! base pointer, the caller's base pointer and return address, the first four
//! argument words and the frame's own instruction pointer.

use super::registers::parse_hex;
use std::fmt;
use std::str::FromStr;

/// A `segment:offset` address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FarPointer {
    pub segment: u16,
    pub offset: u64,
}

impl FarPointer {
    pub fn new(segment: u16, offset: u64) -> Self {
        FarPointer { segment, offset }
    }
}

impl fmt::Display for FarPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}:{:016X}", self.segment, self.offset)
    }
}

impl FromStr for FarPointer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (segment, offset) = s
            .split_once(':')
            .ok_or_else(|| format!("not a far pointer: {}", s))?;
        let segment = parse_hex(segment)
            .and_then(|seg| u16::try_from(seg).ok())
            .ok_or_else(|| format!("bad segment: {}", segment))?;
        let offset = parse_hex(offset).ok_or_else(|| format!("bad offset: {}", offset))?;
        Ok(FarPointer { segment, offset })
    }
}

/// One frame of the guest call stack
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackEntry {
    pub bp: FarPointer,
    pub ret_bp: FarPointer,
    pub ret_ip: FarPointer,
    pub args: [u64; 4],
    pub ip: FarPointer,
}

impl StackEntry {
    /// Parse one row of the stack listing.
    ///
    /// Returns `None` for the column header and for anything else that is not a
    /// frame row. Trailing symbol information after the instruction pointer is
    /// ignored.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();

        let bp = fields.next()?.parse().ok()?;
        let ret_bp = fields.next()?.parse().ok()?;
        let ret_ip = fields.next()?.parse().ok()?;

        let mut args = [0u64; 4];
        for arg in &mut args {
            *arg = parse_hex(fields.next()?)?;
        }

        let ip = fields.next()?.parse().ok()?;

        Some(StackEntry {
            bp,
            ret_bp,
            ret_ip,
            args,
            ip,
        })
    }
}

/// Parse a full stack listing, innermost frame first
pub fn parse_stack(output: &str) -> Vec<StackEntry> {
    output.lines().filter_map(StackEntry::parse_line).collect()
}
