use std::time::Duration;

pub const DEFAULT_PROFILE: &str = "ng-nest";

pub const DATABASE_FILE_NAME: &str = "database.sqlite3";
pub const RUNTIME_ENTRY_FILE: &str = "main.js";
pub const JVM_ARCHIVE_FILE: &str = "app.jar";
#[cfg(windows)]
pub const NATIVE_ENTRY_FILE: &str = "main.exe";
#[cfg(not(windows))]
pub const NATIVE_ENTRY_FILE: &str = "main";

pub const DEV_PORT: u16 = 3000;
pub const PROD_PORT: u16 = 5000;

pub const DEFAULT_HEALTH_PATH: &str = "/health";
pub const PROBE_WARMUP: Duration = Duration::from_secs(5);
pub const PROBE_INTERVAL: Duration = Duration::from_secs(1);
pub const PROBE_MAX_ATTEMPTS: u32 = 20;
