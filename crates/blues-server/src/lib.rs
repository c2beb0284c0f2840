// Library root: exposes the HTTP surface so integration tests can mount the
// router without going through the binary.

pub mod http_server;

pub use http_server::{router, run, AppState};
