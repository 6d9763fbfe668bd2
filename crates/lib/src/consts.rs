/// Application name used for data directories.
pub const APP_NAME: &str = "pipeset";

/// Environment variable overriding the pipeline store location.
pub const STORE_ENV: &str = "PIPESET_STORE";
