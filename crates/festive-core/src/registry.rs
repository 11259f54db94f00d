//! The festival registry: an immutable, ordered collection of festivals
//! loaded once at startup and replaced wholesale after a reseed.

use crate::error::{DashboardError, Result};
use crate::types::{DateWindow, Festival};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FestivalRegistry {
    festivals: Vec<Festival>,
}

impl FestivalRegistry {
    /// Build a registry from a backend listing.
    ///
    /// Every entry must carry a valid range and a unique id; otherwise the
    /// whole listing is rejected so the caller keeps its previous registry.
    pub fn from_festivals(festivals: Vec<Festival>) -> Result<Self> {
        for (i, f) in festivals.iter().enumerate() {
            if f.start_date > f.end_date {
                return Err(DashboardError::BadResponse(format!(
                    "festival '{}' ({}) ends before it starts: {} > {}",
                    f.name, f.id, f.start_date, f.end_date
                )));
            }
            if festivals[..i].iter().any(|other| other.id == f.id) {
                return Err(DashboardError::BadResponse(format!(
                    "duplicate festival id '{}'",
                    f.id
                )));
            }
        }
        Ok(Self { festivals })
    }

    pub fn is_empty(&self) -> bool {
        self.festivals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.festivals.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Festival> {
        self.festivals.iter()
    }

    pub fn as_slice(&self) -> &[Festival] {
        &self.festivals
    }

    /// Exact match on the string form of the id.
    pub fn find(&self, id: &str) -> Option<&Festival> {
        self.festivals.iter().find(|f| f.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&Festival> {
        self.find(id)
            .ok_or_else(|| DashboardError::FestivalNotFound(id.to_string()))
    }

    /// Festivals whose range intersects `window`, in registry order.
    pub fn overlapping<'a>(&'a self, window: &'a DateWindow) -> impl Iterator<Item = &'a Festival> {
        self.festivals.iter().filter(move |f| {
            f.window()
                .map(|fw| fw.overlaps(window))
                .unwrap_or(false)
        })
    }
}
