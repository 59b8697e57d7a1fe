/// Selectable answers for a question while it is being edited or composed.
///
/// Holds at least [`OptionList::MIN_OPTIONS`] entries. Blank entries are kept
/// while editing and dropped by [`OptionList::submission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionList {
    entries: Vec<String>,
}

impl Default for OptionList {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionList {
    pub const MIN_OPTIONS: usize = 2;

    pub fn new() -> Self {
        Self {
            entries: vec![String::new(); Self::MIN_OPTIONS],
        }
    }

    /// Pads with blank entries up to the minimum.
    pub fn from_options(options: impl IntoIterator<Item = String>) -> Self {
        let mut entries: Vec<String> = options.into_iter().collect();
        if entries.len() < Self::MIN_OPTIONS {
            entries.resize(Self::MIN_OPTIONS, String::new());
        }
        Self { entries }
    }

    pub fn add(&mut self) {
        self.entries.push(String::new());
    }

    /// No-op when removal would drop below the minimum or `index` is out of range.
    pub fn remove(&mut self, index: usize) -> bool {
        if self.entries.len() <= Self::MIN_OPTIONS || index >= self.entries.len() {
            return false;
        }
        self.entries.remove(index);
        true
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                *entry = value.into();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    /// Entries whose trimmed value is non-empty, in order.
    pub fn submission(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| !entry.trim().is_empty())
            .cloned()
            .collect()
    }
}
