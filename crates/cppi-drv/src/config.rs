/// Tunes `compile_and_run`'s observability only (§6): every other field of
/// the result is the same regardless of which `Config` was passed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Narrate each phase into `diagnostic_output` as it runs.
    pub verbose: bool,
}
