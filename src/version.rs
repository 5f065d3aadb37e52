/// Version string from `git describe`, set by build.rs.
pub const VERSION: &str = env!("GIT_TAG");
