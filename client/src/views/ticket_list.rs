use crate::api::CategoryNames;
use crate::app::AppContext;
use crate::models::{Ticket, TicketFilter};
use crate::ui::sort::{SortKey, SortState, search_tickets, sort_tickets};
use crate::views::{LoadState, MountGuard, describe};
use futures::future::try_join;
use tracing::warn;

/// Ticket table with header sorting and a search box.
pub struct TicketListView {
    ctx: AppContext,
    guard: MountGuard,
    pub filter: TicketFilter,
    pub search: String,
    pub sort: SortState,
    pub state: LoadState,
    pub error: Option<String>,
    tickets: Vec<Ticket>,
    categories: CategoryNames,
}

impl TicketListView {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            ctx: ctx.clone(),
            guard: MountGuard::new(),
            filter: TicketFilter::default(),
            search: String::new(),
            sort: SortState::default(),
            state: LoadState::Idle,
            error: None,
            tickets: Vec::new(),
            categories: CategoryNames::new(),
        }
    }

    pub fn guard(&self) -> &MountGuard {
        &self.guard
    }

    /// Fetches tickets and category names together.
    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        self.error = None;

        let tickets = self.ctx.tickets.clone();
        let categories = self.ctx.categories.clone();
        let filter = self.filter.clone();
        let Some(result) = self
            .guard
            .guard(async move { try_join(tickets.list(&filter), categories.list()).await })
            .await
        else {
            return;
        };

        match result {
            Ok((tickets, categories)) => {
                self.tickets = tickets;
                self.categories = categories;
                self.state = LoadState::Loaded;
            }
            Err(error) => {
                warn!("Failed to load tickets: {}", error);
                let message = format!("Failed to load tickets: {}", describe(&error));
                self.ctx.flash.error(message.clone());
                self.error = Some(message);
                self.state = LoadState::Failed;
            }
        }
    }

    pub fn click_header(&mut self, key: SortKey) {
        self.sort.click(key);
    }

    pub fn categories(&self) -> &CategoryNames {
        &self.categories
    }

    pub fn category_name(&self, id: Option<u64>) -> String {
        match id {
            Some(id) => self
                .categories
                .get(&id)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
            None => "-".to_string(),
        }
    }

    /// Rows as displayed: sorted, then narrowed by the search box.
    pub fn rows(&self) -> Vec<Ticket> {
        let mut sorted = self.tickets.clone();
        sort_tickets(&mut sorted, &self.sort, &self.categories);
        search_tickets(&sorted, &self.search)
            .into_iter()
            .cloned()
            .collect()
    }
}
