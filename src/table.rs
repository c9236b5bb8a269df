use tracing::warn;

/// A decoded export: one header row plus untyped text rows. Numeric cells
/// keep the portal's decimal commas and nothing is deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Number of data rows, the header doesn't count.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tacks another fragment's rows onto this table. The first fragment's
    /// header wins; a disagreeing header is logged and its rows are kept
    /// anyway.
    pub fn append(&mut self, mut other: ResultTable) {
        if self.headers.is_empty() {
            self.headers = other.headers;
        } else if other.headers != self.headers {
            warn!(
                ours = ?self.headers,
                theirs = ?other.headers,
                "export fragments disagree on columns"
            );
        }
        self.rows.append(&mut other.rows);
    }
}
