//! Per-session parse limits.

/// Default execution fuel: token steps (including re-reads after
/// backtracking) a single parse may take.
pub const DEFAULT_EXEC_FUEL: u32 = 1_000_000;

/// Default recursion fuel: nesting of categories and productions.
///
/// One level of nesting costs two units. The limit has to trip before an
/// unoptimized build runs out of a 2 MiB thread stack.
pub const DEFAULT_RECURSION_FUEL: u32 = 128;

/// Limits applied to every parse of a session.
///
/// Both limits are fatal when hit: the parse returns
/// [`Error::ExecFuelExhausted`](crate::Error::ExecFuelExhausted) or
/// [`Error::RecursionLimitExceeded`](crate::Error::RecursionLimitExceeded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    exec_fuel: Option<u32>,
    recursion_fuel: Option<u32>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            exec_fuel: Some(DEFAULT_EXEC_FUEL),
            recursion_fuel: Some(DEFAULT_RECURSION_FUEL),
        }
    }
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set execution fuel limit. None = infinite.
    ///
    /// Execution fuel never replenishes. It protects against large inputs
    /// and grammars that backtrack excessively.
    pub fn with_exec_fuel(mut self, limit: Option<u32>) -> Self {
        self.exec_fuel = limit;
        self
    }

    /// Set recursion depth limit. None = infinite.
    ///
    /// Recursion fuel restores when exiting recursion. It protects the call
    /// stack against deeply nested input and self-referential notations.
    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.recursion_fuel = limit;
        self
    }

    pub fn exec_fuel(&self) -> Option<u32> {
        self.exec_fuel
    }

    pub fn recursion_fuel(&self) -> Option<u32> {
        self.recursion_fuel
    }
}
