//! File modes carried by index and tree entries.
//!
//! Only the three modes Git uses for plain worktrees are supported:
//! `100644` (regular file), `100755` (executable file), `40000` (subtree).

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd, Hash)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd, Hash)]
pub enum EntryMode {
    File(FileMode),
    #[default]
    Directory,
}

impl EntryMode {
    /// Octal rendering without a leading zero, as trees serialize it.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::File(FileMode::Regular) => "100644",
            EntryMode::File(FileMode::Executable) => "100755",
            EntryMode::Directory => "40000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::Directory => 0o40000,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    pub fn try_from_u32(mode: u32) -> anyhow::Result<Self> {
        match mode {
            0o100644 => Ok(EntryMode::File(FileMode::Regular)),
            0o100755 => Ok(EntryMode::File(FileMode::Executable)),
            0o40000 => Ok(EntryMode::Directory),
            other => Err(anyhow::anyhow!("unsupported entry mode {other:o}")),
        }
    }

    pub fn from_octal_str(value: &str) -> anyhow::Result<Self> {
        match value {
            "100644" => Ok(EntryMode::File(FileMode::Regular)),
            "100755" => Ok(EntryMode::File(FileMode::Executable)),
            "40000" | "040000" => Ok(EntryMode::Directory),
            other => Err(anyhow::anyhow!("unsupported entry mode '{other}'")),
        }
    }

    /// Unix permission bits written back to checked-out files.
    pub fn unix_permissions(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Executable) => 0o755,
            _ => 0o644,
        }
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn octal_round_trip() {
        for mode in [
            EntryMode::File(FileMode::Regular),
            EntryMode::File(FileMode::Executable),
            EntryMode::Directory,
        ] {
            assert_eq!(EntryMode::from_octal_str(mode.as_str()).unwrap(), mode);
            assert_eq!(EntryMode::try_from_u32(mode.as_u32()).unwrap(), mode);
        }
    }

    #[test]
    fn rejects_symlink_mode() {
        assert!(EntryMode::try_from_u32(0o120000).is_err());
    }
}
