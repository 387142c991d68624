//! Purpose: Library crate behind the `dbus-tool` CLI and its tests.
//! Exports: `core` (signature grammar, lexer, value parser, errors) and `api` (public surface).
//! Role: Offline conversion of typed argument text into bus values; no transport here.
//! Invariants: Core modules are pure functions of their inputs with no hidden state.
//! Invariants: Callers outside the crate should prefer `api` over `core` paths.
pub mod api;
pub mod core;
