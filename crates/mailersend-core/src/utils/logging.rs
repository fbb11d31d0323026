//! Verbose output helpers
//!
//! Verbose output always goes to stderr so stdout stays clean for `--json`.

pub fn print_verbose(verbose: bool, msg: &str) {
    if verbose {
        eprintln!("Verbose: {}", msg);
    }
}

/// Request/response tracer used by the transport when `--verbose` is set.
#[derive(Debug, Clone, Copy)]
pub struct VerboseLogger {
    enabled: bool,
}

impl VerboseLogger {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn trace_request(&self, method: &str, url: &str, body: Option<&[u8]>) {
        if !self.enabled {
            return;
        }
        eprintln!("{}", format_request_line(method, url));
        if let Some(body) = body.filter(|b| !b.is_empty()) {
            eprintln!("--> body: {}", String::from_utf8_lossy(body));
        }
    }

    pub fn trace_response(&self, status: u16, body: &[u8]) {
        if !self.enabled {
            return;
        }
        eprintln!("<-- {}", status);
        if !body.is_empty() {
            eprintln!("<-- body: {}", String::from_utf8_lossy(body));
        }
    }
}

fn format_request_line(method: &str, url: &str) -> String {
    format!("--> {} {}", method, url)
}
