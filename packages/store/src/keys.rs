//! Names of the persisted session entries.

/// Bearer credential of an authenticated (non-guest) session.
pub const AUTH_TOKEN: &str = "auth_token";

/// JSON-serialised user record of the current session.
pub const USER_DATA: &str = "user_data";

/// `"true"` while a guest session is active, absent otherwise.
pub const IS_GUEST: &str = "is_guest";

/// Every key the session owns, in purge order.
pub const ALL: [&str; 3] = [AUTH_TOKEN, USER_DATA, IS_GUEST];
