/// ===============================
/// Dynamic SQL helpers
/// ===============================
///
/// The index loaders build `IN (...)` clauses at runtime, so the
/// placeholder list has to match the number of bound values exactly.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
