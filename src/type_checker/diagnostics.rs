use crate::errors::errors::{Error, ErrorKind};

/// Ordered collection of reported errors.
///
/// Reporting never aborts the pass. An empty collection means the program is
/// well typed.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Error>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, error: Error) {
        log::debug!("diagnostic: {}: {}", error.get_error_name(), error);
        self.entries.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Error] {
        &self.entries
    }

    pub fn count_kind(&self, kind: ErrorKind) -> usize {
        self.entries
            .iter()
            .filter(|error| error.get_kind() == kind)
            .count()
    }
}
