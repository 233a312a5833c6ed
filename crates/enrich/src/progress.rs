/// Observer for per-row enrichment progress.
///
/// Called after each eligible row and once at the end of a run. Purely
/// observational: implementations must not influence the run, and every
/// method has a no-op default so observers implement only what they report.
/// `i` is 1-based, `total` is the eligible row count after any cap.
pub trait Progress {
    /// Row skipped before lookup: set code or collector number missing.
    fn row_skipped(&mut self, _i: usize, _total: usize, _name: &str) {}

    /// Lookup succeeded; `color_code` is what was written to the table.
    fn row_filled(
        &mut self,
        _i: usize,
        _total: usize,
        _name: &str,
        _set_code: &str,
        _number: &str,
        _color_code: &str,
    ) {
    }

    /// Lookup cascade exhausted with no match.
    fn row_unmatched(&mut self, _i: usize, _total: usize, _name: &str, _set_code: &str, _number: &str) {
    }

    /// Run finished.
    fn finish(&mut self, _filled: usize, _skipped: usize) {}
}

/// Progress sink that reports nothing.
pub struct NullProgress;

impl Progress for NullProgress {}
