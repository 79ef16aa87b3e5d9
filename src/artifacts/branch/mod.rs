pub mod branch_name;
pub mod revision;

/// Rejects names Git refuses: leading `-`, `.` segments, `..`, `@{`,
/// whitespace and control characters, glob metacharacters, `.lock`
/// suffixes, and stray slashes.
pub const INVALID_BRANCH_NAME_REGEX: &str = concat!(
    r"^-",           // begins with "-"
    r"|^\.",         // begins with "."
    r"|\.\.",        // includes ".."
    r"|[\x00-\x20]", // includes control characters or whitespace
    r"|/\.",         // a slash-dot sequence
    r"|^/|/$",       // begins or ends with "/"
    r"|\.lock$",     // ends with ".lock"
    r"|\.lock/",     // a segment ends with ".lock"
    r"|@\{",         // includes "@{"
    r"|[*:?\[\\^~]", // includes a forbidden metacharacter
);
