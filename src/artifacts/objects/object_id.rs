//! Object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character hexadecimal strings and are the sole identity of an
//! object's content.
//!
//! ## Storage
//!
//! Objects are stored in `.sprig/objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use sha1::{Digest, Sha1};
use std::io;
use std::path::PathBuf;

/// A validated 40-character lowercase hexadecimal digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Surrounding whitespace is ignored so ref files with a trailing newline parse.
    pub fn try_parse(id: impl AsRef<str>) -> anyhow::Result<Self> {
        let id = id.as_ref().trim();
        if id.len() != OBJECT_ID_LENGTH {
            anyhow::bail!("Invalid object ID length: {}", id.len());
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("Invalid object ID characters: {}", id);
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Digest of the given canonical object bytes.
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Write the object ID in binary format (20 bytes)
    pub fn write_h40_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        let hex40 = self.as_ref();

        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&hex40[i..i + 2], 16)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Invalid hex digit"))?;
            writer.write_all(&[byte])?;
        }

        Ok(())
    }

    /// Read an object ID from binary format (20 bytes)
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut raw = [0u8; OBJECT_ID_LENGTH / 2];
        reader.read_exact(&mut raw)?;

        let hex40 = raw
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<String>();

        Self::try_parse(hex40)
    }

    /// Convert to the bucketed storage path, e.g. `abc123...` becomes `ab/c123...`
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the hash
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::proptest;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("zz39a3ee5e6b4b0d3255bfef95601890afd80709")]
    fn rejects_malformed_ids(#[case] raw: &str) {
        assert!(ObjectId::try_parse(raw).is_err());
    }

    #[test]
    fn splits_into_bucket_and_file_name() {
        let oid = ObjectId::try_parse("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();

        assert_eq!(
            oid.to_path(),
            PathBuf::from("da").join("39a3ee5e6b4b0d3255bfef95601890afd80709")
        );
        assert_eq!(oid.to_short_oid(), "da39a3e");
    }

    #[test]
    fn digest_of_empty_input_is_well_known() {
        assert_eq!(
            ObjectId::digest(b"").as_ref(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    proptest! {
        #[test]
        fn binary_form_preserves_the_id(hex in "[0-9a-f]{40}") {
            let oid = ObjectId::try_parse(&hex).unwrap();
            let mut bytes = Vec::new();
            oid.write_h40_to(&mut bytes).unwrap();

            let decoded = ObjectId::read_h40_from(&mut std::io::Cursor::new(bytes)).unwrap();
            assert_eq!(decoded, oid);
        }
    }
}
