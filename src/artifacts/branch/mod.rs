pub mod branch_name;
pub mod head;

pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
pub const SYMREF_REGEX: &str = r"^ref: refs/heads/(.+)$";
pub const DEFAULT_BRANCH: &str = "master";
