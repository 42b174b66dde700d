//! Lazily populated attribute cells.
//!
//! Every deferred attribute in the data model (`Source` sites, `Site` detail
//! and catalog, `TimeSeries` values) lives in a [`LazyField`]. The cell
//! tracks three states so that "never fetched", "fetched and holding a
//! value" and "last fetch failed" stay distinguishable; in particular a
//! fetched-but-empty collection counts as populated and is not fetched
//! again.

/// Population state of a [`LazyField`].
#[derive(Debug, Clone, Default)]
enum LazyState<T> {
    /// No population attempt has been made.
    #[default]
    Unpopulated,
    /// Population succeeded; the value is final for the life of the entity.
    Populated(T),
    /// The last population attempt failed. Treated like `Unpopulated` for
    /// retry purposes, but observable via [`LazyField::last_attempt_failed`].
    Failed,
}

/// A write-once cell populated on first access.
///
/// `get_or_populate` is idempotent: once a value is committed, later calls
/// return it without running the closure again. A failed attempt commits
/// nothing, so the next access retries.
#[derive(Debug, Clone, Default)]
pub struct LazyField<T> {
    state: LazyState<T>,
}

impl<T> LazyField<T> {
    pub fn new() -> Self {
        Self {
            state: LazyState::Unpopulated,
        }
    }

    pub fn is_populated(&self) -> bool {
        matches!(self.state, LazyState::Populated(_))
    }

    pub fn last_attempt_failed(&self) -> bool {
        matches!(self.state, LazyState::Failed)
    }

    pub fn get(&self) -> Option<&T> {
        match &self.state {
            LazyState::Populated(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match &mut self.state {
            LazyState::Populated(value) => Some(value),
            _ => None,
        }
    }

    /// Return the held value, running `populate` first if the cell is
    /// unpopulated or a previous attempt failed. An `Err` from `populate`
    /// leaves the cell without a value so the access can be retried.
    pub fn get_or_populate<E>(
        &mut self,
        populate: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, E> {
        self.get_or_populate_mut(populate).map(|value| &*value)
    }

    /// Mutable variant of [`get_or_populate`](Self::get_or_populate), for
    /// callers that drive further population of the held value.
    pub fn get_or_populate_mut<E>(
        &mut self,
        populate: impl FnOnce() -> Result<T, E>,
    ) -> Result<&mut T, E> {
        if !self.is_populated() {
            match populate() {
                Ok(value) => self.state = LazyState::Populated(value),
                Err(err) => {
                    self.state = LazyState::Failed;
                    return Err(err);
                }
            }
        }
        match &mut self.state {
            LazyState::Populated(value) => Ok(value),
            // the branch above either committed a value or returned early
            _ => unreachable!("cell populated above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_runs_once() {
        let mut cell: LazyField<u32> = LazyField::new();
        let mut runs = 0;
        let first = *cell
            .get_or_populate(|| -> Result<u32, ()> {
                runs += 1;
                Ok(7)
            })
            .unwrap();
        let second = *cell
            .get_or_populate(|| -> Result<u32, ()> {
                runs += 1;
                Ok(99)
            })
            .unwrap();
        assert_eq!(first, 7);
        assert_eq!(second, 7);
        assert_eq!(runs, 1);
    }

    #[test]
    fn empty_value_still_counts_as_populated() {
        // An empty Vec must not be mistaken for "never fetched".
        let mut cell: LazyField<Vec<u32>> = LazyField::new();
        let mut runs = 0;
        cell.get_or_populate(|| -> Result<Vec<u32>, ()> {
            runs += 1;
            Ok(Vec::new())
        })
        .unwrap();
        cell.get_or_populate(|| -> Result<Vec<u32>, ()> {
            runs += 1;
            Ok(vec![1])
        })
        .unwrap();
        assert!(cell.is_populated());
        assert_eq!(cell.get(), Some(&Vec::new()));
        assert_eq!(runs, 1);
    }

    #[test]
    fn failed_attempt_commits_nothing_and_retries() {
        let mut cell: LazyField<u32> = LazyField::new();
        let err = cell.get_or_populate(|| Err::<u32, &str>("boom")).unwrap_err();
        assert_eq!(err, "boom");
        assert!(!cell.is_populated());
        assert!(cell.last_attempt_failed());
        assert_eq!(cell.get(), None);

        let value = *cell.get_or_populate(|| Ok::<u32, &str>(42)).unwrap();
        assert_eq!(value, 42);
        assert!(cell.is_populated());
        assert!(!cell.last_attempt_failed());
    }

    #[test]
    fn get_mut_allows_in_place_access() {
        let mut cell: LazyField<Vec<u32>> = LazyField::new();
        assert!(cell.get_mut().is_none());
        cell.get_or_populate_mut(|| Ok::<_, ()>(vec![1, 2]))
            .unwrap()
            .push(3);
        assert_eq!(cell.get(), Some(&vec![1, 2, 3]));
    }
}
