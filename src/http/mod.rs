//! HTTP-like protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → reader.rs (block read loop, content-length arithmetic)
//!     → request.rs (request line, headers, body text, target URL)
//!     → server.rs (fetch + classify via imaging/classify)
//!     → response.rs (fixed 200 text response)
//!     → Send to client, close
//! ```

pub mod reader;
pub mod request;
pub mod response;
pub mod server;

pub use reader::{ConnectionReader, ReadError, ReadState};
pub use request::{ParseError, ParsedRequest, RequestError};
pub use server::{ColorServer, ConnectionError, ServerError};
