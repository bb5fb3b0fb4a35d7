//! Placeholder credential gate.
//!
//! The expected pair is hardcoded and checked by exact match. This is a
//! visible seam for a real identity flow, not a security boundary: no
//! hashing, no lockout, no rate limiting.

const EXPECTED_USERNAME: &str = "admin";
const EXPECTED_PASSWORD: &str = "admin123";

/// Hint surfaced on a failed login attempt.
pub const LOGIN_HINT: &str = "Invalid credentials. Try admin/admin123";

/// Exact-match check against the fixed credential pair.
pub fn check_credentials(username: &str, password: &str) -> bool {
    username == EXPECTED_USERNAME && password == EXPECTED_PASSWORD
}
