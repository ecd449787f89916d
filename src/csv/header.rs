use itertools::Itertools;
use std::collections::HashMap;

/// Column name to zero-based field index
///
/// When a name appears more than once, only its last position is kept,
/// so earlier columns with that name are unreachable by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderMap {
    columns: HashMap<String, usize>,
}

impl HeaderMap {
    /// Index each name by its position in `names`
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(Into::<String>::into).collect()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.columns.iter().map(|(name, &index)| (name.as_str(), index))
    }

    /// Reachable names ordered by the index they resolve to
    pub fn names(&self) -> Vec<&str> {
        self.iter()
            .sorted_by_key(|&(_, index)| index)
            .map(|(name, _)| name)
            .collect()
    }
}

impl FromIterator<String> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut columns = HashMap::new();
        for (index, name) in iter.into_iter().enumerate() {
            // later duplicates overwrite earlier ones
            columns.insert(name, index);
        }
        HeaderMap { columns }
    }
}

impl From<HashMap<String, usize>> for HeaderMap {
    fn from(columns: HashMap<String, usize>) -> Self {
        HeaderMap { columns }
    }
}

impl From<Vec<String>> for HeaderMap {
    fn from(names: Vec<String>) -> Self {
        HeaderMap::from_names(names)
    }
}

impl From<Vec<&str>> for HeaderMap {
    fn from(names: Vec<&str>) -> Self {
        HeaderMap::from_names(names)
    }
}

impl From<&[&str]> for HeaderMap {
    fn from(names: &[&str]) -> Self {
        HeaderMap::from_names(names.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for HeaderMap {
    fn from(names: [&str; N]) -> Self {
        HeaderMap::from_names(names)
    }
}
