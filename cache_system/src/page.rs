//! Page state
//!
//! A page moves Idle -> Loading -> Success | Error. A failed page may be
//! retried (Error -> Loading); nothing ever returns to Idle.

use chrono::{DateTime, Utc};
use list_source::LoadError;
use serde::Serialize;

/// Lifecycle status of one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// One fetched batch of entities for a page index
#[derive(Debug, Clone)]
pub struct Page<E> {
    index: u32,
    items: Vec<E>,
    status: PageStatus,
    error: Option<LoadError>,
    fetched_at: Option<DateTime<Utc>>,
}

impl<E> Page<E> {
    /// New page in Idle state
    pub fn new(index: u32) -> Self {
        Self {
            index,
            items: Vec::new(),
            status: PageStatus::Idle,
            error: None,
            fetched_at: None,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    /// Settlement time of the latest attempt
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn is_success(&self) -> bool {
        self.status == PageStatus::Success
    }

    pub(crate) fn mark_loading(&mut self) -> Result<(), LoadError> {
        match self.status {
            PageStatus::Idle | PageStatus::Error => {
                self.status = PageStatus::Loading;
                self.error = None;
                Ok(())
            }
            other => Err(self.illegal(other, PageStatus::Loading)),
        }
    }

    pub(crate) fn succeed(&mut self, items: Vec<E>) -> Result<(), LoadError> {
        if self.status != PageStatus::Loading {
            return Err(self.illegal(self.status, PageStatus::Success));
        }
        self.items = items;
        self.status = PageStatus::Success;
        self.fetched_at = Some(Utc::now());
        Ok(())
    }

    pub(crate) fn fail(&mut self, error: LoadError) -> Result<(), LoadError> {
        if self.status != PageStatus::Loading {
            return Err(self.illegal(self.status, PageStatus::Error));
        }
        self.error = Some(error);
        self.status = PageStatus::Error;
        self.fetched_at = Some(Utc::now());
        Ok(())
    }

    fn illegal(&self, from: PageStatus, to: PageStatus) -> LoadError {
        LoadError::invariant(format!(
            "page {} cannot move from {:?} to {:?}",
            self.index, from, to
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut page: Page<u32> = Page::new(1);
        assert_eq!(page.status(), PageStatus::Idle);

        page.mark_loading().unwrap();
        page.succeed(vec![1, 2, 3]).unwrap();

        assert!(page.is_success());
        assert_eq!(page.items(), &[1, 2, 3]);
        assert!(page.fetched_at().is_some());
    }

    #[test]
    fn test_failed_page_can_be_retried() {
        let mut page: Page<u32> = Page::new(2);
        page.mark_loading().unwrap();
        page.fail(LoadError::transport("timeout")).unwrap();
        assert_eq!(page.error(), Some(&LoadError::transport("timeout")));

        page.mark_loading().unwrap();
        assert_eq!(page.status(), PageStatus::Loading);
        assert!(page.error().is_none());
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        let mut page: Page<u32> = Page::new(1);
        assert!(matches!(
            page.succeed(vec![]),
            Err(LoadError::InvariantViolation(_))
        ));

        page.mark_loading().unwrap();
        assert!(page.mark_loading().is_err());

        page.succeed(vec![7]).unwrap();
        assert!(page.mark_loading().is_err());
        assert!(page.fail(LoadError::parse("late")).is_err());
        assert_eq!(page.items(), &[7]);
    }
}
