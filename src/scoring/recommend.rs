/// Append-only list of advisory strings.
///
/// Triggered advice is appended in the order the caller evaluates its
/// conditions; `finish` appends the baseline catalog last. Nothing is ever
/// deduplicated or reordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    items: Vec<String>,
}

impl Recommendations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    pub fn push_if(&mut self, condition: bool, item: impl Into<String>) {
        if condition {
            self.push(item);
        }
    }

    pub fn extend_if(&mut self, condition: bool, items: &[&str]) {
        if condition {
            self.extend(items.iter().copied());
        }
    }

    pub fn extend<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items.extend(items.into_iter().map(Into::into));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append the universal baseline and hand back the final list.
    pub fn finish(mut self, baseline: &[&str]) -> Vec<String> {
        debug_assert!(!baseline.is_empty(), "baseline catalog must not be empty");
        self.extend(baseline.iter().copied());
        self.items
    }
}
