// Library root
// -----------
// This crate exposes the verification pipeline behind the `photoverify`
// binary. `main.rs` only parses arguments, sets up logging and calls
// `pipeline::run`.
//
// Module responsibilities:
// - `config`: the run configuration built once from the command line.
// - `image`: file reading, content sniffing and data-URI encoding.
// - `api`: credentials, request building, HTTP transport and response
//   decoding.
// - `pipeline`: concurrent encoding followed by the single request.
// - `ui`: plain-text rendering of the result and the progress spinner.
// - `error`: the error taxonomy shared by all of the above.
pub mod api;
pub mod config;
pub mod error;
pub mod image;
pub mod pipeline;
pub mod ui;
