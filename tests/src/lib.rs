//! Shared fixture for the scenario tests: a small list capability, a real
//! implementation of it and its generated substitute.

use mimic_core::{logging, substitute, SubstituteConfig};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors a list operation can fail with
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ListError {
    #[error("Illegal argument: index {0} is negative")]
    IllegalArgument(i64),

    #[error("Index {index} out of bounds for size {size}")]
    IndexOutOfBounds { index: i64, size: usize },
}

/// A sequence of strings
pub trait StringList {
    fn get(&self, index: i64) -> String;
    fn size(&self) -> usize;
    fn add(&self, item: String) -> bool;
    fn contains(&self, item: String) -> bool;
    fn clear(&self);
    fn remove(&self, index: i64) -> Result<String, ListError>;
}

substitute! {
    pub MockStringList for StringList {
        fn get(&self, index: i64) -> String;
        fn size(&self) -> usize;
        fn add(&self, item: String) -> bool;
        fn contains(&self, item: String) -> bool;
        fn clear(&self);
        fn remove(&self, index: i64) -> Result<String, ListError>;
    }
}

/// Vec-backed list
#[derive(Debug, Default)]
pub struct VecList {
    items: RwLock<Vec<String>>,
}

impl VecList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: RwLock::new(items.into_iter().map(Into::into).collect()),
        }
    }

    fn position(&self, index: i64) -> Result<usize, ListError> {
        if index < 0 {
            return Err(ListError::IllegalArgument(index));
        }
        let size = self.items.read().len();
        match usize::try_from(index) {
            Ok(position) if position < size => Ok(position),
            _ => Err(ListError::IndexOutOfBounds { index, size }),
        }
    }
}

impl StringList for VecList {
    /// Panics on an index outside the list, like slice indexing
    fn get(&self, index: i64) -> String {
        match self.position(index) {
            Ok(position) => self.items.read()[position].clone(),
            Err(err) => panic!("{}", err),
        }
    }

    fn size(&self) -> usize {
        self.items.read().len()
    }

    fn add(&self, item: String) -> bool {
        self.items.write().push(item);
        true
    }

    fn contains(&self, item: String) -> bool {
        self.items.read().contains(&item)
    }

    fn clear(&self) {
        self.items.write().clear();
    }

    fn remove(&self, index: i64) -> Result<String, ListError> {
        let position = self.position(index)?;
        Ok(self.items.write().remove(position))
    }
}

/// Fresh substitute named `list`, created per test
pub fn mock_list() -> MockStringList {
    logging::init_test_tracing();
    debug!("Creating substitute for StringList");
    MockStringList::with_config(SubstituteConfig::named("list"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_list_behaves_like_a_list() {
        let list = VecList::with_items(["a", "b"]);
        assert_eq!(list.get(1), "b");
        assert_eq!(list.size(), 2);
        assert!(list.add("c".to_string()));
        assert!(list.contains("c".to_string()));
        assert_eq!(list.remove(0), Ok("a".to_string()));
        assert_eq!(list.remove(-1), Err(ListError::IllegalArgument(-1)));
        assert_eq!(
            list.remove(5),
            Err(ListError::IndexOutOfBounds { index: 5, size: 2 })
        );
        list.clear();
        assert_eq!(list.size(), 0);
    }

    #[test]
    #[should_panic(expected = "Illegal argument")]
    fn test_vec_list_get_rejects_negative_index() {
        VecList::new().get(-1);
    }

    #[test]
    fn test_mock_list_is_named() {
        assert_eq!(mock_list().name(), "list");
    }
}
