//! Commit object.
//!
//! On disk:
//! ```text
//! commit <size>\0tree <tree-id>
//! parent <parent-id>
//! author <name> <email> <epoch> <±HHMM>
//! committer <name> <email> <epoch> <±HHMM>
//!
//! <message>
//! ```
//! The message is stored verbatim; a trailing newline is appended when the
//! caller's message lacks one.

use crate::artifacts::objects::object::{frame, Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;

const DEFAULT_NAME: &str = "pygit";
const DEFAULT_EMAIL: &str = "pygit@localhost";

/// Author or committer identity with timestamp.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
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

    /// Author identity: `GIT_AUTHOR_*`, falling back to `GIT_COMMITTER_*`,
    /// falling back to the built-in defaults.
    pub fn author_from_env() -> Self {
        Self::from_env_chain(
            &["GIT_AUTHOR_NAME", "GIT_COMMITTER_NAME"],
            &["GIT_AUTHOR_EMAIL", "GIT_COMMITTER_EMAIL"],
        )
    }

    /// Committer identity: `GIT_COMMITTER_*` first.
    pub fn committer_from_env() -> Self {
        Self::from_env_chain(
            &["GIT_COMMITTER_NAME", "GIT_AUTHOR_NAME"],
            &["GIT_COMMITTER_EMAIL", "GIT_AUTHOR_EMAIL"],
        )
    }

    fn from_env_chain(name_vars: &[&str], email_vars: &[&str]) -> Self {
        let lookup = |vars: &[&str], default: &str| {
            vars.iter()
                .find_map(|var| std::env::var(var).ok().filter(|value| !value.is_empty()))
                .unwrap_or_else(|| default.to_string())
        };
        Author::new(
            lookup(name_vars, DEFAULT_NAME),
            lookup(email_vars, DEFAULT_EMAIL),
        )
    }

    /// `Name <email> <epoch> <±HHMM>` as written into commit headers.
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // "name <email> epoch tz", split from the right
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(anyhow::anyhow!("invalid author line '{value}'"));
        }

        let timezone = parts[0];
        let epoch: i64 = parts[1]
            .parse()
            .with_context(|| format!("invalid author timestamp in '{value}'"))?;
        let name_email = parts[2];

        let email_start = name_email
            .find('<')
            .with_context(|| format!("missing '<' in author line '{value}'"))?;
        let email_end = name_email
            .find('>')
            .with_context(|| format!("missing '>' in author line '{value}'"))?;
        let name = name_email[..email_start].trim().to_string();
        let email = name_email[email_start + 1..email_end].to_string();

        let offset = parse_tz_offset(timezone)?;
        let timestamp = chrono::DateTime::from_timestamp(epoch, 0)
            .with_context(|| format!("invalid epoch in author line '{value}'"))?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

fn parse_tz_offset(tz: &str) -> anyhow::Result<chrono::FixedOffset> {
    if tz.len() != 5 {
        return Err(anyhow::anyhow!("invalid timezone offset '{tz}'"));
    }
    let sign = match &tz[..1] {
        "+" => 1,
        "-" => -1,
        _ => return Err(anyhow::anyhow!("invalid timezone offset '{tz}'")),
    };
    let hours: i32 = tz[1..3].parse()?;
    let minutes: i32 = tz[3..5].parse()?;
    chrono::FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| anyhow::anyhow!("timezone offset '{tz}' out of range"))
}

/// A commit: root tree, parent chain, identities, message.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    pub fn new(
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        committer: Author,
        message: String,
    ) -> Self {
        let message = if message.ends_with('\n') {
            message
        } else {
            format!("{message}\n")
        };
        Commit {
            parents,
            tree_oid,
            author,
            committer,
            message,
        }
    }

    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut lines = Vec::new();

        lines.push(format!("tree {}", self.tree_oid));
        for parent in &self.parents {
            lines.push(format!("parent {parent}"));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));

        let payload = format!("{}\n\n{}", lines.join("\n"), self.message);
        Ok(frame(ObjectType::Commit, payload.as_bytes()))
    }
}

impl Unpackable for Commit {
    fn deserialize(payload: Bytes) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(&payload).context("commit payload is not UTF-8")?;
        let (header, message) = text
            .split_once("\n\n")
            .context("commit is missing the header/message separator")?;

        let mut tree_oid = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        for line in header.lines() {
            if let Some(rest) = line.strip_prefix("tree ") {
                tree_oid = Some(ObjectId::try_parse(rest.to_string())?);
            } else if let Some(rest) = line.strip_prefix("parent ") {
                parents.push(ObjectId::try_parse(rest.to_string())?);
            } else if let Some(rest) = line.strip_prefix("author ") {
                author = Some(Author::try_from(rest)?);
            } else if let Some(rest) = line.strip_prefix("committer ") {
                committer = Some(Author::try_from(rest)?);
            }
        }

        let tree_oid = tree_oid.context("commit is missing its tree header")?;
        let author = author.context("commit is missing its author header")?;
        let committer = committer.unwrap_or_else(|| author.clone());

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
        let mut lines = Vec::new();
        lines.push(format!("tree {}", self.tree_oid));
        for parent in &self.parents {
            lines.push(format!("parent {parent}"));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        format!("{}\n\n{}", lines.join("\n"), self.message)
    }
}
