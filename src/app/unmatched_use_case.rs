use std::sync::Arc;
use tracing::info;

use crate::app::ports::GroupApiPort;
use crate::error::Result;
use crate::pipeline::listing::{filter_by_name, paginate};
use crate::types::UnmatchedGroup;

/// One rendered page of unmatched groups, with 1-based serial numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmatchedPage {
    pub rows: Vec<(usize, UnmatchedGroup)>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

pub struct UnmatchedGroupsUseCase {
    api: Arc<dyn GroupApiPort>,
    page_size: usize,
}

impl UnmatchedGroupsUseCase {
    pub fn new(api: Arc<dyn GroupApiPort>, page_size: usize) -> Self {
        Self { api, page_size }
    }

    pub async fn fetch(&self) -> Result<Vec<UnmatchedGroup>> {
        let groups = self.api.unmatched_groups().await?;
        info!(count = groups.len(), "Fetched unmatched groups");
        Ok(groups)
    }

    /// Filters by name, then slices out `page`.
    pub fn page_of(&self, groups: &[UnmatchedGroup], query: &str, page: usize) -> UnmatchedPage {
        let matches = filter_by_name(groups, query);
        let slice = paginate(&matches, page, self.page_size);
        let first_serial = slice.first_serial();
        UnmatchedPage {
            rows: slice
                .items
                .iter()
                .enumerate()
                .map(|(i, group)| (first_serial + i, (*group).clone()))
                .collect(),
            page: slice.page,
            total_pages: slice.total_pages,
            total_matches: slice.total_items,
        }
    }
}
