pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: i64 = 3000;
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info";
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_DB_MIN_IDLE: i64 = 2;

/// Scales the memory parameter of the secret hasher (2^cost KiB).
pub const DEFAULT_HASH_COST: i64 = 10;
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 3600;
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;
pub const DEFAULT_REFRESH_IDLE_TIMEOUT_MINS: i64 = 60;
pub const DEFAULT_RESET_CODE_TTL_MINS: i64 = 15;
