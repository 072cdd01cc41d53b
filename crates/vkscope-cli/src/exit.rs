// Exit codes for scripted triage
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_GENERIC_FAIL: i32 = 1;
pub const EXIT_CONTEXT_FAIL: i32 = 2;
pub const EXIT_QUERY_FAIL: i32 = 3;
