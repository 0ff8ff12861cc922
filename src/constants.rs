//! Protocol constants and connection defaults.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SOURCE: &str = "presto-rust-client";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const HTTP: &str = "http";
pub const HTTPS: &str = "https";

pub const URL_STATEMENT_PATH: &str = "/v1/statement";
pub const URL_QUERY_PATH: &str = "/v1/query";

pub const HEADER_CATALOG: &str = "X-Presto-Catalog";
pub const HEADER_SCHEMA: &str = "X-Presto-Schema";
pub const HEADER_SOURCE: &str = "X-Presto-Source";
pub const HEADER_USER: &str = "X-Presto-User";

pub const HEADER_SESSION: &str = "X-Presto-Session";
pub const HEADER_SET_SESSION: &str = "X-Presto-Set-Session";
pub const HEADER_CLEAR_SESSION: &str = "X-Presto-Clear-Session";

pub const HEADER_PREPARED_STATEMENT: &str = "X-Presto-Prepared-Statement";
pub const HEADER_ADDED_PREPARE: &str = "X-Presto-Added-Prepare";
pub const HEADER_DEALLOCATED_PREPARE: &str = "X-Presto-Deallocated-Prepare";

pub const HEADER_TRANSACTION: &str = "X-Presto-Transaction-Id";
pub const HEADER_STARTED_TRANSACTION: &str = "X-Presto-Started-Transaction-Id";
pub const HEADER_CLEAR_TRANSACTION: &str = "X-Presto-Clear-Transaction-Id";

/// Transaction id sent while the connection is in autocommit mode.
pub const NO_TRANSACTION: &str = "NONE";
