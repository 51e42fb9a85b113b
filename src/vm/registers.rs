//! CPU register snapshot

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Named register values taken at one instant.
///
/// Names are stored lowercase and iterate in name order so the registers pane
/// lists them in the same order on every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registers {
    values: BTreeMap<String, u64>,
}

impl Registers {
    pub fn new() -> Self {
        Registers::default()
    }

    pub fn insert(&mut self, name: &str, value: u64) {
        self.values.insert(name.to_ascii_lowercase(), value);
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.values.get(&name.to_ascii_lowercase()).copied()
    }

    /// All registers in name order
    pub fn all(&self) -> impl Iterator<Item = (&str, u64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse `getregisters` output.
    ///
    /// Each line looks like `rax = 0x0000000000000000`, sometimes with a
    /// `cpu0.` style prefix on the name. Lines whose value does not fit a
    /// `u64` (vector registers, descriptor tables) are skipped.
    pub fn parse(output: &str) -> Result<Self> {
        let mut registers = Registers::new();

        for line in output.lines() {
            let Some((name, value)) = line.split_once('=') else {
                continue;
            };

            let name = name.trim();
            let name = name.rsplit('.').next().unwrap_or(name);
            if name.is_empty() || name.contains(char::is_whitespace) {
                continue;
            }

            if let Some(value) = parse_hex(value.trim()) {
                registers.insert(name, value);
            }
        }

        if registers.is_empty() && !output.trim().is_empty() {
            return Err(Error::Parse(format!(
                "no registers in output: {}",
                output.lines().next().unwrap_or_default()
            )));
        }

        Ok(registers)
    }
}

impl FromIterator<(String, u64)> for Registers {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut registers = Registers::new();
        for (name, value) in iter {
            registers.insert(&name, value);
        }
        registers
    }
}

/// Parse a hex number with or without a `0x` prefix
pub(crate) fn parse_hex(text: &str) -> Option<u64> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let digits = digits.replace(['`', '\''], "");
    u64::from_str_radix(&digits, 16).ok()
}
