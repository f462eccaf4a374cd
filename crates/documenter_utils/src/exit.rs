/// Process exit status of a documenter run.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Every reported test passed or was skipped.
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// At least one test errored or failed an assertion.
    pub const TESTS_FAILED: ExitCode = ExitCode(1);
    /// Documenter itself failed, rather than the tests it reports on.
    pub const DOCUMENTER_ERROR: ExitCode = ExitCode(101);

    pub fn for_run(any_failed: bool) -> Self {
        if any_failed {
            Self::TESTS_FAILED
        } else {
            Self::SUCCESS
        }
    }

    pub const fn get(&self) -> i32 {
        self.0
    }
}
