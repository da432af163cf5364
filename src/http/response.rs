//! Plain-text response rendering.
//!
//! Every response is a `200 OK` with a permissive CORS header and no
//! Content-Length; closing the connection ends the body.

/// Content for an empty request line or the favicon.
pub const DEFAULT_CONTENT: &str = "DEFAULT";

/// Render the full response for `content`.
pub fn render(content: &str) -> String {
    format!("HTTP/1.1 200 OK\r\nAccess-Control-Allow-Origin: *\r\n\r\n{content}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fixed_head() {
        assert_eq!(
            render("teal"),
            "HTTP/1.1 200 OK\r\nAccess-Control-Allow-Origin: *\r\n\r\nteal"
        );
    }

    #[test]
    fn default_content() {
        assert!(render(DEFAULT_CONTENT).ends_with("\r\n\r\nDEFAULT"));
    }
}
