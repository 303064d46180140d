// Library root
// -----------
// A small desktop client for the servlet demo's choose endpoint. The binary
// (`main.rs`) picks a mode and hands these modules a real HTTP session.
//
// Module responsibilities:
// - `config`: compiled-in base URL, endpoint path, timeout and client id.
// - `api`: the HTTP session wrapper posting the `choice` form field.
// - `ui`: the interactive prompt loop, the automated demo and the scope
//   guard that closes the session on every exit path.
pub mod api;
pub mod config;
pub mod ui;
