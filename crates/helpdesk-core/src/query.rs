//! Read-side queries: filtered, paginated listing and dashboard counts.

use serde::Serialize;

use crate::model::{Status, Ticket};

pub const DEFAULT_PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketQuery {
    /// Case-insensitive text over title, description, and latest comment.
    pub text: Option<String>,
    pub status: Option<Status>,
    /// 1-based page number. Zero is treated as one.
    pub page: usize,
    pub per_page: usize,
}

impl Default for TicketQuery {
    fn default() -> Self {
        Self {
            text: None,
            status: None,
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub pages: usize,
}

/// Dashboard counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub open: usize,
    pub assigned: usize,
    pub breached: usize,
}

impl TicketQuery {
    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.status.is_none_or(|s| ticket.status == s)
            && self
                .text
                .as_deref()
                .is_none_or(|text| ticket.matches_text(text.trim()))
    }

    /// Filter, sort newest-created first, and cut out the requested page.
    #[must_use]
    pub fn run<'a>(&self, tickets: impl Iterator<Item = &'a Ticket>) -> Page<Ticket> {
        let mut matched: Vec<&Ticket> = tickets.filter(|t| self.matches(t)).collect();
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let per_page = self.per_page.max(1);
        let total = matched.len();
        let pages = total.div_ceil(per_page).max(1);
        let page = self.page.max(1);

        let items = matched
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .cloned()
            .collect();

        Page {
            items,
            total,
            page,
            pages,
        }
    }
}

impl Summary {
    pub fn of<'a>(tickets: impl Iterator<Item = &'a Ticket>) -> Self {
        tickets.fold(Self::default(), |mut acc, t| {
            acc.total += 1;
            acc.open += usize::from(t.status == Status::Open);
            acc.assigned += usize::from(t.assignee_id.is_some());
            acc.breached += usize::from(t.is_breached);
            acc
        })
    }
}
