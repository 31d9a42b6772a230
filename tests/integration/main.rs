//! Integration tests: presentation flow against in-process backends and
//! the HTTP API end to end.

mod api;
mod client;
mod mock_backend;
mod page_flow;
