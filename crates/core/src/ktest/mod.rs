//! KTest record decoding.
//!
//! A KTest file captures the concrete inputs that drove one program path
//! explored by the symbolic-execution engine. The layout is:
//!
//! ```text
//! magic[5]            "KTEST" (current) or "BOUT\n" (legacy)
//! version: i32        big-endian, 1..=max supported
//! num_args: i32       then num_args x (len: i32, ascii bytes)
//! [version >= 2]      sym_argvs: i32, sym_argv_len: i32
//! num_objects: i32    then num_objects x (len: i32, utf-8 name, len: i32, bytes)
//! ```
//!
//! Every integer is a 4-byte signed big-endian value.

mod display;
mod encode;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Magic tag written by current engine versions.
pub const KTEST_MAGIC: &[u8; 5] = b"KTEST";

/// Magic tag written by legacy engine versions.
pub const BOUT_MAGIC: &[u8; 5] = b"BOUT\n";

/// Highest record format version this crate decodes by default.
pub const MAX_SUPPORTED_VERSION: i32 = 3;

/// Errors raised while decoding a record stream.
///
/// All of these are local to one file; callers are expected to skip the
/// offending file and carry on with the rest.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unrecognized magic {found:?}")]
    BadMagic { found: Vec<u8> },

    #[error("unsupported version {found}; maximum supported is {max}")]
    UnsupportedVersion { found: i32, max: i32 },

    #[error("stream truncated while reading {field}")]
    Truncated { field: &'static str },

    #[error("negative {field} ({value})")]
    NegativeLength { field: &'static str, value: i32 },

    #[error("argument {index} is not valid ASCII")]
    InvalidArgument { index: usize },

    #[error("object name {index} is not valid UTF-8")]
    InvalidName { index: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One named symbolic object and the concrete bytes the engine assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KTestObject {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl KTestObject {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), bytes: bytes.into() }
    }
}

/// A decoded KTest record.
///
/// Records are never modified after decoding; fields are private and exposed
/// through accessors only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KTest {
    version: i32,
    source_path: Option<PathBuf>,
    args: Vec<String>,
    sym_argvs: i32,
    sym_argv_len: i32,
    objects: Vec<KTestObject>,
}

impl KTest {
    /// Build a record in memory. Used by fixtures and the reference encoder.
    ///
    /// The symbolic argv fields are forced to zero for version 1, matching
    /// what a decode of the encoded bytes would produce.
    pub fn new(
        version: i32,
        args: Vec<String>,
        sym_argvs: i32,
        sym_argv_len: i32,
        objects: Vec<KTestObject>,
    ) -> Self {
        let (sym_argvs, sym_argv_len) =
            if version >= 2 { (sym_argvs, sym_argv_len) } else { (0, 0) };
        Self { version, source_path: None, args, sym_argvs, sym_argv_len, objects }
    }

    /// Decode a record file from disk using the default version limit.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        Self::from_file_with_limit(path, MAX_SUPPORTED_VERSION)
    }

    /// Decode a record file, rejecting versions above `max_version`.
    pub fn from_file_with_limit(
        path: impl AsRef<Path>,
        max_version: i32,
    ) -> Result<Self, FormatError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mut record = Self::decode_with_limit(&mut bytes.as_slice(), max_version)?;
        record.source_path = Some(path.to_path_buf());
        Ok(record)
    }

    /// Decode a record from any byte stream using the default version limit.
    pub fn decode<R: Read>(reader: &mut R) -> Result<Self, FormatError> {
        Self::decode_with_limit(reader, MAX_SUPPORTED_VERSION)
    }

    /// Decode a record from a byte stream, rejecting versions above `max_version`.
    pub fn decode_with_limit<R: Read>(
        reader: &mut R,
        max_version: i32,
    ) -> Result<Self, FormatError> {
        let mut magic = [0u8; 5];
        read_exact(reader, &mut magic, "magic")?;
        if &magic != KTEST_MAGIC && &magic != BOUT_MAGIC {
            return Err(FormatError::BadMagic { found: magic.to_vec() });
        }

        let version = read_i32(reader, "version")?;
        if version > max_version {
            return Err(FormatError::UnsupportedVersion { found: version, max: max_version });
        }

        let num_args = read_len(reader, "argument count")?;
        let mut args = Vec::with_capacity(num_args.min(64));
        for index in 0..num_args {
            let bytes = read_blob(reader, "argument")?;
            if !bytes.is_ascii() {
                return Err(FormatError::InvalidArgument { index });
            }
            let arg = String::from_utf8(bytes).map_err(|_| FormatError::InvalidArgument { index })?;
            args.push(arg);
        }

        let (sym_argvs, sym_argv_len) = if version >= 2 {
            (read_i32(reader, "symbolic argv count")?, read_i32(reader, "symbolic argv length")?)
        } else {
            (0, 0)
        };

        let num_objects = read_len(reader, "object count")?;
        let mut objects = Vec::with_capacity(num_objects.min(64));
        for index in 0..num_objects {
            let name = String::from_utf8(read_blob(reader, "object name")?)
                .map_err(|_| FormatError::InvalidName { index })?;
            let bytes = read_blob(reader, "object bytes")?;
            objects.push(KTestObject { name, bytes });
        }

        Ok(Self { version, source_path: None, args, sym_argvs, sym_argv_len, objects })
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    /// Originating file, if the record was decoded from disk.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn sym_argvs(&self) -> i32 {
        self.sym_argvs
    }

    pub fn sym_argv_len(&self) -> i32 {
        self.sym_argv_len
    }

    pub fn objects(&self) -> &[KTestObject] {
        &self.objects
    }

    /// Write the named objects to `<source>.<name>` files next to the record.
    ///
    /// Returns the written paths. Fails with `NotFound` naming every requested
    /// object absent from the record; objects that were present are still
    /// written in that case. Names containing a path separator or NUL are
    /// rejected with `InvalidInput` before anything is written, so every
    /// output stays in the record's directory.
    pub fn extract(&self, names: &[String], trim_zeros: bool) -> io::Result<Vec<PathBuf>> {
        let source = self.source_path.as_deref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "record was not decoded from a file")
        })?;
        if let Some(bad) =
            names.iter().find(|n| n.chars().any(|c| c == '\0' || std::path::is_separator(c)))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("object name {bad:?} cannot be used as a file suffix"),
            ));
        }
        let mut written = Vec::new();
        for object in self.objects.iter().filter(|o| names.contains(&o.name)) {
            let mut target = source.as_os_str().to_owned();
            target.push(".");
            target.push(&object.name);
            let target = PathBuf::from(target);
            let payload = if trim_zeros {
                trim_trailing_zeros(&object.bytes)
            } else {
                object.bytes.as_slice()
            };
            fs::write(&target, payload)?;
            written.push(target);
        }

        let mut missing: Vec<&str> = names
            .iter()
            .filter(|n| !self.objects.iter().any(|o| &o.name == *n))
            .map(String::as_str)
            .collect();
        missing.sort_unstable();
        missing.dedup();
        if !missing.is_empty() {
            let noun = if missing.len() == 1 { "object" } else { "objects" };
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("could not find {noun}: {}", missing.join(", ")),
            ));
        }
        Ok(written)
    }
}

/// Strip trailing NUL bytes.
pub fn trim_trailing_zeros(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}

fn read_exact<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    field: &'static str,
) -> Result<(), FormatError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => FormatError::Truncated { field },
        _ => FormatError::Io(e),
    })
}

fn read_i32<R: Read>(reader: &mut R, field: &'static str) -> Result<i32, FormatError> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf, field)?;
    Ok(i32::from_be_bytes(buf))
}

fn read_len<R: Read>(reader: &mut R, field: &'static str) -> Result<usize, FormatError> {
    let value = read_i32(reader, field)?;
    usize::try_from(value).map_err(|_| FormatError::NegativeLength { field, value })
}

fn read_blob<R: Read>(reader: &mut R, field: &'static str) -> Result<Vec<u8>, FormatError> {
    let len = read_len(reader, field)?;
    // Read through `take` so a bogus length cannot force a huge allocation.
    let mut buf = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(FormatError::Truncated { field });
    }
    Ok(buf)
}
