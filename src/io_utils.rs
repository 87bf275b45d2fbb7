//! Input and output plumbing for the command-line front end.
//!
//! - **Sources**: files are read as raw bytes; the `-` path reads stdin.
//! - **Encoding**: input bytes are decoded with `encoding_rs`, UTF-8 by default.
//! - **Output**: the SQL script goes to a file or stdout, always UTF-8.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};

use crate::{error::SqlGenError, generate::SourceFile};

pub const STDIN_SOURCE_NAME: &str = "stdin.csv";

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding, SqlGenError> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| SqlGenError::UnknownEncoding(value.to_string())),
        None => Ok(UTF_8),
    }
}

/// Decodes `bytes`, stripping a byte-order mark when present.
pub fn decode_bytes(
    name: &str,
    bytes: &[u8],
    encoding: &'static Encoding,
) -> Result<String, SqlGenError> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(SqlGenError::Decode {
            name: name.to_string(),
            encoding: used.name().to_string(),
        });
    }
    Ok(text.into_owned())
}

pub fn read_source(path: &Path) -> Result<SourceFile> {
    if is_dash(path) {
        let mut bytes = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading CSV from stdin")?;
        return Ok(SourceFile::new(STDIN_SOURCE_NAME, bytes));
    }
    let bytes = fs::read(path).with_context(|| format!("Opening input file {path:?}"))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SourceFile::new(name, bytes))
}

pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths.iter().map(|path| read_source(path)).collect()
}

pub fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    let mut writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout().lock()),
    };
    writer
        .write_all(contents.as_bytes())
        .context("Writing SQL output")?;
    writer.flush().context("Flushing SQL output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn resolve_encoding_defaults_to_utf8() {
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
        assert_eq!(resolve_encoding(Some(" windows-1252 ")).unwrap(), WINDOWS_1252);
        assert!(matches!(
            resolve_encoding(Some("klingon")),
            Err(SqlGenError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn decode_bytes_handles_bom_and_legacy_encodings() {
        let with_bom = b"\xEF\xBB\xBFid,name\n";
        assert_eq!(decode_bytes("a.csv", with_bom, UTF_8).unwrap(), "id,name\n");

        let (encoded, _, _) = WINDOWS_1252.encode("name\nCaf\u{e9}\n");
        assert_eq!(
            decode_bytes("b.csv", &encoded, WINDOWS_1252).unwrap(),
            "name\nCaf\u{e9}\n"
        );
    }

    #[test]
    fn decode_bytes_rejects_invalid_utf8() {
        let err = decode_bytes("bad.csv", b"id\n\xFF\xFE\xFD\n", UTF_8).unwrap_err();
        assert!(err.to_string().contains("bad.csv"));
    }

    #[test]
    fn read_source_uses_file_name() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("Orders.csv");
        fs::write(&path, "id\n1\n").expect("write csv");
        let source = read_source(&path).expect("read source");
        assert_eq!(source.name, "Orders.csv");
        assert_eq!(source.bytes, b"id\n1\n");
    }

    #[test]
    fn write_output_creates_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("out.sql");
        write_output(Some(&path), "SELECT 1;\n").expect("write output");
        assert_eq!(fs::read_to_string(&path).unwrap(), "SELECT 1;\n");
    }
}
