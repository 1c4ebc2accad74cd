//! Operator interaction seam.

use std::io;

use crate::model::{DeviceRecord, GroupCandidate};

/// Presents candidates and collects raw answers.
///
/// Implementations only display and read. All validation of answers is done
/// by the caller.
pub trait Console {
    /// Shows the candidate devices.
    fn show_devices(&mut self, devices: &[DeviceRecord]);

    /// Shows the eligible groups.
    fn show_groups(&mut self, groups: &[GroupCandidate]);

    /// Shows an informational line.
    fn notice(&mut self, message: &str);

    /// Asks `prompt` and returns the raw answer, or `None` at end of input.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;
}
