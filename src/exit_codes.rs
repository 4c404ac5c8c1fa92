//! Exit code constants for the sharedfile CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid lock parameter, bad config)
//! - 2: Storage failure (permissions, open, read/write)
//! - 3: Lock failure (OS lock refused or data-level lock timeout)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid parameters or configuration.
pub const USER_ERROR: i32 = 1;

/// Storage failure: the state file could not be opened, read or written.
pub const STORAGE_FAILURE: i32 = 2;

/// Lock failure: the advisory lock failed or the shared mutex timed out.
pub const LOCK_FAILURE: i32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, STORAGE_FAILURE, LOCK_FAILURE];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn exit_codes_fit_in_a_byte() {
        for code in [SUCCESS, USER_ERROR, STORAGE_FAILURE, LOCK_FAILURE] {
            assert!((0..=255).contains(&code));
        }
    }
}
