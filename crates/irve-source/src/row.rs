use std::collections::HashMap;

/// One CSV data row keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: HashMap<String, String>,
}

impl RawRow {
    /// Pairs `headers` with `values` positionally. Columns beyond the end of a
    /// short row are left absent; surplus values are ignored. A repeated
    /// header keeps its last value.
    #[must_use]
    pub fn from_record<V>(headers: &[String], values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<String>,
    {
        let fields = headers
            .iter()
            .zip(values)
            .map(|(h, v)| (h.clone(), v.into()))
            .collect();
        Self { fields }
    }

    /// Value of `column`, or `None` when the column is missing or empty.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
