//! Commit object
//!
//! Commits represent snapshots of the repository at specific points in time.
//!
//! ## Format
//!
//! Header fields are separated by the unit separator `0x1F` (shown as `␟`):
//!
//! ```text
//! commit <size>\0
//! tree <tree-id>␟parent <parent-ids>␟author <name> <email> <timestamp> <tz>␟committer ...␟
//! <commit message>
//! ```
//!
//! The parent field lists the parent ids separated by single spaces and is empty
//! for a root commit.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::config::Identity;
use anyhow::Context;
use bytes::Bytes;

pub const FIELD_SEPARATOR: char = '\x1f';

/// Author or committer information
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Create a new author with the current local time
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Stamp an identity, pinning the time when a fixed author date is configured
    pub fn from_identity(
        identity: Identity,
        timestamp: Option<chrono::DateTime<chrono::FixedOffset>>,
    ) -> Self {
        match timestamp {
            Some(ts) => Author::new_with_timestamp(identity.name, identity.email, ts),
            None => Author::new(identity.name, identity.email),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// "Name <email> timestamp timezone"
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Timestamp in human-readable form, e.g. "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // "name <email> timestamp timezone", split from the right
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(anyhow::anyhow!("Invalid author format"));
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("Invalid timestamp"))?;
        let name_email_part = parts[2];

        let email_start = name_email_part
            .find('<')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '<'"))?;
        let email_end = name_email_part
            .rfind('>')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '>'"))?;

        let name = name_email_part[..email_start].trim().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        let offset = parse_offset(timezone).ok_or_else(|| anyhow::anyhow!("Invalid timezone"))?;
        let datetime = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid timestamp"))?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp: datetime,
        })
    }
}

/// `+hhmm` / `-hhmm` as written by `%z`
fn parse_offset(timezone: &str) -> Option<chrono::FixedOffset> {
    if timezone.len() != 5 || !timezone.is_ascii() {
        return None;
    }
    let sign = match &timezone[..1] {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours = timezone[1..3].parse::<i32>().ok()?;
    let minutes = timezone[3..5].parse::<i32>().ok()?;

    chrono::FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Empty for a root commit, two ids for a merge
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// Create a new commit; the author is recorded as committer too
    pub fn new(parents: Vec<ObjectId>, tree_oid: ObjectId, author: Author, message: String) -> Self {
        Commit {
            parents,
            tree_oid,
            author: author.clone(),
            committer: author,
            message,
        }
    }

    /// First line of the message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    /// First parent, the only link followed by the ancestry chain
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    fn parent_field(&self) -> String {
        self.parents
            .iter()
            .map(|parent| parent.as_ref())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let fields = [
            format!("tree {}", self.tree_oid),
            format!("parent {}", self.parent_field()),
            format!("author {}", self.author.display()),
            format!("committer {}", self.committer.display()),
        ];

        let mut record = String::new();
        for field in fields {
            record.push_str(&field);
            record.push(FIELD_SEPARATOR);
        }
        record.push('\n');
        record.push_str(&self.message);

        Ok(Bytes::from(record))
    }
}

impl Unpackable for Commit {
    fn deserialize(payload: Bytes) -> anyhow::Result<Self> {
        let content = String::from_utf8(payload.to_vec()).context("Commit payload is not UTF-8")?;
        let (header, message) = content
            .split_once(&format!("{FIELD_SEPARATOR}\n"))
            .context("Invalid commit object: missing message separator")?;

        let mut fields = header.split(FIELD_SEPARATOR);

        let tree_oid = fields
            .next()
            .and_then(|field| field.strip_prefix("tree "))
            .context("Invalid commit object: invalid tree field")?;
        let tree_oid = ObjectId::try_parse(tree_oid)?;

        let parents = fields
            .next()
            .and_then(|field| field.strip_prefix("parent"))
            .context("Invalid commit object: invalid parent field")?
            .split_whitespace()
            .map(ObjectId::try_parse)
            .collect::<anyhow::Result<Vec<_>>>()?;

        let author = fields
            .next()
            .and_then(|field| field.strip_prefix("author "))
            .context("Invalid commit object: invalid author field")?;
        let author = Author::try_from(author)?;

        let committer = fields
            .next()
            .and_then(|field| field.strip_prefix("committer "))
            .context("Invalid commit object: invalid committer field")?;
        let committer = Author::try_from(committer)?;

        Ok(Commit {
            parents,
            tree_oid,
            author,
            committer,
            message: message.to_string(),
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let lines = [
            format!("tree {}", self.tree_oid),
            format!("parent {}", self.parent_field()),
            format!("author {}", self.author.display()),
            format!("committer {}", self.committer.display()),
            String::new(),
            self.message.clone(),
        ];

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn author() -> Author {
        let timestamp =
            chrono::DateTime::parse_from_str("2024-03-01 10:20:30 +0200", "%Y-%m-%d %H:%M:%S %z")
                .unwrap();
        Author::new_with_timestamp("Ada".to_string(), "ada@example.com".to_string(), timestamp)
    }

    #[rstest]
    fn root_commit_has_an_empty_parent_field(author: Author) {
        let tree = ObjectId::digest(b"tree");
        let commit = Commit::new(vec![], tree.clone(), author, "initial".to_string());

        let payload = commit.serialize().unwrap();
        let expected = format!(
            "tree {tree}\x1fparent \x1fauthor Ada <ada@example.com> 1709281230 +0200\x1f\
             committer Ada <ada@example.com> 1709281230 +0200\x1f\ninitial"
        );
        assert_eq!(payload, Bytes::from(expected));
    }

    #[rstest]
    fn decoding_restores_parents_and_message(author: Author) {
        let parents = vec![ObjectId::digest(b"p1"), ObjectId::digest(b"p2")];
        let commit = Commit::new(
            parents.clone(),
            ObjectId::digest(b"tree"),
            author,
            "Merge: master feature\n\nbody".to_string(),
        );

        let decoded = Commit::deserialize(commit.serialize().unwrap()).unwrap();

        assert_eq!(decoded, commit);
        assert_eq!(decoded.parent(), Some(&parents[0]));
    }

    #[test]
    fn author_keeps_its_timezone() {
        let author = Author::try_from("Ada Lovelace <ada@example.com> 1709281230 -0130").unwrap();

        assert_eq!(author.name(), "Ada Lovelace");
        assert_eq!(author.email(), "ada@example.com");
        assert_eq!(author.display(), "Ada Lovelace <ada@example.com> 1709281230 -0130");
    }

    #[test]
    fn decoding_rejects_missing_fields() {
        assert!(Commit::deserialize(Bytes::from_static(b"tree abc\x1f\nmessage")).is_err());
    }
}
