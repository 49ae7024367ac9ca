/// ProgressReporter port for user-facing composition progress
///
/// Messages go to a side channel (stderr) so that the rendered plan on
/// stdout stays machine readable.
pub trait ProgressReporter {
    /// Reports an informational message
    fn report(&self, message: &str);

    /// Reports that step `current` of `total` has been reached
    ///
    /// # Arguments
    /// * `current` - Steps completed so far
    /// * `total` - Total number of steps
    /// * `message` - Optional label for the step
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports a non-fatal problem, such as an ignored configuration value
    fn report_warning(&self, message: &str);

    /// Reports that composition finished
    fn report_completion(&self, message: &str);
}
