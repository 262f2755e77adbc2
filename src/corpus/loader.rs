//! Corpus files: a JSON array or JSON Lines of `{"text", "category"}`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::corpus::LabeledExample;
use crate::error::{DocClassError, Result};

/// Read labeled examples from `path`.
///
/// A file whose first non-blank character is `[` is parsed as one JSON
/// array; anything else is parsed line by line, skipping blank lines.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<LabeledExample>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| DocClassError::data(format!("cannot read corpus {}: {e}", path.display())))?;

    let examples = parse_corpus(&content)?;
    info!("Loaded {} examples from {}", examples.len(), path.display());
    Ok(examples)
}

/// Parse corpus text in either supported layout.
pub fn parse_corpus(content: &str) -> Result<Vec<LabeledExample>> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content)
            .map_err(|e| DocClassError::data(format!("malformed corpus array: {e}")));
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line)
                .map_err(|e| DocClassError::data(format!("malformed corpus line {}: {e}", n + 1)))
        })
        .collect()
}

/// Write examples as JSON Lines.
pub fn write_jsonl<P: AsRef<Path>>(path: P, examples: &[LabeledExample]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    for example in examples {
        serde_json::to_writer(&mut writer, example)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
