/// The infallible shape `compile_and_run` always returns (§6): a host never
/// has to branch on `Result<_, CompileError>` at this boundary, only on
/// `success`.
#[derive(Clone, Debug, PartialEq)]
pub struct CompileResult {
    pub success: bool,
    pub error: Option<String>,
    pub details: Vec<String>,
    pub execution_output: String,
    pub diagnostic_output: String,
    pub exit_code: i32,
}
