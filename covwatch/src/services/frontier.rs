use crate::feed::PostStream;

/// Accounts being monitored, in the order they were discovered.
///
/// Grows monotonically: handles are never removed.
#[derive(Default)]
pub struct AccountFrontier {
    accounts: Vec<(String, Box<dyn PostStream>)>,
}

impl AccountFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles are matched without regard to ASCII case.
    pub fn contains(&self, handle: &str) -> bool {
        self.accounts
            .iter()
            .any(|(known, _)| known.eq_ignore_ascii_case(handle))
    }

    /// Adds the account unless it is already known. Returns whether it was added.
    pub fn insert(&mut self, handle: impl Into<String>, stream: Box<dyn PostStream>) -> bool {
        let handle = handle.into();
        if self.contains(&handle) {
            return false;
        }
        self.accounts.push((handle, stream));
        true
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn handles(&self) -> Vec<String> {
        self.accounts.iter().map(|(handle, _)| handle.clone()).collect()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<(&str, &mut Box<dyn PostStream>)> {
        self.accounts
            .get_mut(index)
            .map(|(handle, stream)| (handle.as_str(), stream))
    }
}
