//! Encoding of manifests into the YAML wire format.
use std::io::Write;

use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Represents every error which can be encountered during YAML encoding.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize YAML"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to write YAML to the output stream"))]
    WriteBytes { source: std::io::Error },

    #[snafu(display("failed to parse bytes as valid UTF-8 string"))]
    ParseUtf8Bytes { source: std::string::FromUtf8Error },
}

/// Provides configurable options during YAML encoding.
#[derive(Clone, Copy, Debug)]
pub struct SerializeOptions {
    /// Adds leading triple dashes (`---`) to the output.
    pub explicit_document: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            explicit_document: true,
        }
    }
}

/// Encodes `value` as one YAML document and writes it to `writer`.
///
/// The document is encoded in full before any bytes are written, so a failed
/// encode never produces partial output. Returns the number of bytes written.
pub fn serialize<T, W>(value: &T, mut writer: W, options: SerializeOptions) -> Result<usize>
where
    T: serde::Serialize,
    W: Write,
{
    let mut buffer = Vec::new();

    if options.explicit_document {
        buffer.extend_from_slice(b"---\n");
    }

    {
        let mut serializer = serde_yaml::Serializer::new(&mut buffer);
        value
            .serialize(&mut serializer)
            .context(SerializeYamlSnafu)?;
    }

    writer.write_all(&buffer).context(WriteBytesSnafu)?;
    Ok(buffer.len())
}

/// Encodes `value` as one YAML document and returns it as a [`String`].
pub fn to_string<T>(value: &T, options: SerializeOptions) -> Result<String>
where
    T: serde::Serialize,
{
    let mut buffer = Vec::new();
    serialize(value, &mut buffer, options)?;
    String::from_utf8(buffer).context(ParseUtf8BytesSnafu)
}

#[cfg(test)]
mod test {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Document {
        name: String,
    }

    #[test]
    fn explicit_document_leader() {
        let document = Document {
            name: "web-server".to_owned(),
        };

        let yaml = to_string(&document, SerializeOptions::default()).unwrap();
        assert_eq!(yaml, "---\nname: web-server\n");
    }

    #[test]
    fn byte_count_matches_output() {
        let document = Document {
            name: "web-server".to_owned(),
        };

        let mut buffer = Vec::new();
        let written = serialize(&document, &mut buffer, SerializeOptions::default()).unwrap();
        assert_eq!(written, buffer.len());
    }
}
