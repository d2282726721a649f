//! The `pufff_is_admin` hint cookie.
//!
//! The cookie is a UI hint only: it is readable by client scripts (not
//! HttpOnly) and its value never feeds into a privilege decision. Every
//! privileged server operation re-derives the verdict from the bearer
//! token. On denial the cookie is actively cleared (value `false`,
//! `Max-Age=0`), so a browser that lost admin rights cannot keep a stale
//! `true`.

/// Name of the hint cookie.
pub const ADMIN_COOKIE_NAME: &str = "pufff_is_admin";

/// Lifetime of the cookie on success: 30 days.
const ADMIN_COOKIE_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// Build the `Set-Cookie` value for an authorization verdict.
///
/// The cookie is always set; denial writes `false` with immediate expiry
/// rather than leaving the previous value in place.
#[must_use]
pub fn admin_cookie(is_admin: bool) -> String {
    let (value, max_age) = if is_admin {
        ("true", ADMIN_COOKIE_MAX_AGE_SECS)
    } else {
        ("false", 0)
    };
    format!("{ADMIN_COOKIE_NAME}={value}; Path=/; Max-Age={max_age}; SameSite=Lax")
}

/// Read the hint out of a `Cookie` request header.
///
/// Returns `true` only when the cookie is present with the literal value
/// `true`. Absence, any other value, or a malformed header all read as
/// `false`.
#[must_use]
pub fn read_admin_hint(cookie_header: &str) -> bool {
    cookie_header.split(';').any(|pair| {
        let mut parts = pair.splitn(2, '=');
        let name = parts.next().unwrap_or("").trim();
        let value = parts.next().unwrap_or("").trim();
        name == ADMIN_COOKIE_NAME && value == "true"
    })
}
