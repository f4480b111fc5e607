//! Search executors for Lectern.
//!
//! - [`HttpExecutor`]: calls the document API over HTTP and decodes its
//!   generic JSON result shape.
//! - [`StubExecutor`]: canned outcomes and call recording, for tests and
//!   offline use.
//! - [`html_to_text`]: flattens the HTML fragments the API embeds in titles
//!   and snippets.

pub mod html;
pub mod http;
pub mod stub;

pub use html::html_to_text;
pub use http::{HttpExecutor, decode_body, endpoint_path};
pub use stub::StubExecutor;
