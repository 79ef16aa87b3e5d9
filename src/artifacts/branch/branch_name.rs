use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::RitError;
use anyhow::Context;

/// A validated branch name (the part after `refs/heads/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: &str) -> anyhow::Result<Self> {
        if name.is_empty() {
            return Err(RitError::InvalidRefName(name.to_string()).into());
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .context("invalid branch name pattern")?;

        if re.is_match(name) {
            return Err(RitError::InvalidRefName(name.to_string()).into());
        }

        Ok(Self(name.to_string()))
    }

    pub fn ref_path(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn accepts_plain_names(name in "[a-zA-Z0-9_-]+") {
            prop_assume!(!name.starts_with('-'));
            assert!(BranchName::try_parse(&name).is_ok());
        }

        #[test]
        fn accepts_hierarchical_names(
            prefix in "[a-zA-Z0-9_]+",
            suffix in "[a-zA-Z0-9_]+",
        ) {
            let name = format!("{prefix}/{suffix}");
            assert!(BranchName::try_parse(&name).is_ok());
        }

        #[test]
        fn rejects_leading_dot(suffix in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(&format!(".{suffix}")).is_err());
        }

        #[test]
        fn rejects_lock_suffix(prefix in "[a-zA-Z0-9_]+") {
            assert!(BranchName::try_parse(&format!("{prefix}.lock")).is_err());
        }

        #[test]
        fn rejects_double_dots(
            prefix in "[a-zA-Z0-9_]+",
            suffix in "[a-zA-Z0-9_]+",
        ) {
            assert!(BranchName::try_parse(&format!("{prefix}..{suffix}")).is_err());
        }

        #[test]
        fn rejects_metacharacters(
            prefix in "[a-zA-Z0-9_]+",
            special in r"[\*:\?\[\\^~ ]",
            suffix in "[a-zA-Z0-9_]+",
        ) {
            assert!(BranchName::try_parse(&format!("{prefix}{special}{suffix}")).is_err());
        }
    }

    #[test]
    fn rejects_empty_and_slashes_at_the_edges() {
        assert!(BranchName::try_parse("").is_err());
        assert!(BranchName::try_parse("/feature").is_err());
        assert!(BranchName::try_parse("feature/").is_err());
    }

    #[test]
    fn ref_path_prefixes_heads() {
        let name = BranchName::try_parse("feature/login").unwrap();
        assert_eq!(name.ref_path(), "refs/heads/feature/login");
    }
}
