use std::fmt;

use super::{trim_trailing_zeros, KTest};

impl KTest {
    /// Render the record the way the engine's own inspection tool prints it.
    ///
    /// With `trim_zeros`, the data/hex/text lines show each payload with its
    /// trailing NUL bytes removed; the size and integer lines always use the
    /// full payload.
    pub fn describe(&self, trim_zeros: bool) -> String {
        Dump { record: self, trim_zeros }.to_string()
    }
}

impl fmt::Display for KTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Dump { record: self, trim_zeros: false }, f)
    }
}

struct Dump<'a> {
    record: &'a KTest,
    trim_zeros: bool,
}

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record;
        let width = record.objects.len().saturating_sub(1).max(1).to_string().len();
        let path =
            record.source_path.as_ref().map(|p| p.display().to_string()).unwrap_or_default();
        let args: Vec<String> = record.args.iter().map(|a| format!("'{a}'")).collect();

        writeln!(f, "ktest file : '{path}'")?;
        writeln!(f, "args       : [{}]", args.join(", "))?;
        writeln!(f, "num objects: {}", record.objects.len())?;

        for (i, object) in record.objects.iter().enumerate() {
            let data = &object.bytes;
            let blob = if self.trim_zeros { trim_trailing_zeros(data) } else { data.as_slice() };
            let hex: String = blob.iter().map(|b| format!("{b:02x}")).collect();
            let text: String = blob
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();

            writeln!(f, "object {i:>width$}: name: '{}'", object.name)?;
            writeln!(f, "object {i:>width$}: size: {}", data.len())?;
            write!(f, "object {i:>width$}: data: ")?;
            write_bytes_literal(f, blob)?;
            writeln!(f)?;
            writeln!(f, "object {i:>width$}: hex : 0x{hex}")?;
            if let Some((int, uint)) = integer_views(data) {
                writeln!(f, "object {i:>width$}: int : {int}")?;
                writeln!(f, "object {i:>width$}: uint: {uint}")?;
            }
            writeln!(f, "object {i:>width$}: text: {text}")?;
        }
        Ok(())
    }
}

/// Signed and unsigned little-endian readings for 1, 2, 4 and 8 byte payloads.
fn integer_views(data: &[u8]) -> Option<(i64, u64)> {
    Some(match data.len() {
        1 => (data[0] as i8 as i64, data[0] as u64),
        2 => {
            let raw = [data[0], data[1]];
            (i16::from_le_bytes(raw) as i64, u16::from_le_bytes(raw) as u64)
        }
        4 => {
            let raw = [data[0], data[1], data[2], data[3]];
            (i32::from_le_bytes(raw) as i64, u32::from_le_bytes(raw) as u64)
        }
        8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(data);
            (i64::from_le_bytes(raw), u64::from_le_bytes(raw))
        }
        _ => return None,
    })
}

/// `b'...'` literal with non-printable bytes escaped.
fn write_bytes_literal(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("b'")?;
    for &b in bytes {
        match b {
            b'\\' => f.write_str("\\\\")?,
            b'\'' => f.write_str("\\'")?,
            b'\t' => f.write_str("\\t")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            0x20..=0x7e => write!(f, "{}", b as char)?,
            _ => write!(f, "\\x{b:02x}")?,
        }
    }
    f.write_str("'")
}
