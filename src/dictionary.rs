use std::collections::HashMap;

/// A bidirectional dictionary between strings and integer ids.
///
/// Used to number classes, features and words when a model is serialized.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    /// Map from string to id
    str_to_id: HashMap<String, u32>,
    /// Map from id to string
    id_to_str: Vec<String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number strings in sorted order, ignoring duplicates
    pub fn sorted<'a, I>(strings: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut strings: Vec<&str> = strings.into_iter().collect();
        strings.sort_unstable();
        strings.dedup();
        let mut dict = Self::new();
        for s in strings {
            dict.get_or_insert(s);
        }
        dict
    }

    pub fn len(&self) -> usize {
        self.id_to_str.len()
    }

    /// Id of `s`, creating a new entry if it doesn't exist
    pub fn get_or_insert(&mut self, s: &str) -> u32 {
        if let Some(&id) = self.str_to_id.get(s) {
            id
        } else {
            let id = self.id_to_str.len() as u32;
            self.str_to_id.insert(s.to_string(), id);
            self.id_to_str.push(s.to_string());
            id
        }
    }

    pub fn get(&self, s: &str) -> Option<u32> {
        self.str_to_id.get(s).copied()
    }

    /// Iterate over all `(string, id)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.id_to_str
            .iter()
            .enumerate()
            .map(|(id, s)| (s.as_str(), id as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_basic() {
        let mut dict = Dictionary::new();
        assert_eq!(dict.len(), 0);

        assert_eq!(dict.get_or_insert("NN"), 0);
        assert_eq!(dict.get_or_insert("VB"), 1);
        assert_eq!(dict.get_or_insert("NN"), 0);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("VB"), Some(1));
        assert_eq!(dict.get("JJ"), None);
    }

    #[test]
    fn test_dictionary_sorted() {
        let dict = Dictionary::sorted(vec!["VB", "DT", "NN", "DT"]);
        let items: Vec<_> = dict.iter().collect();
        assert_eq!(items, [("DT", 0), ("NN", 1), ("VB", 2)]);
    }
}
