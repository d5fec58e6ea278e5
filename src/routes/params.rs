use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::Role;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than "desc" sorts ascending.
    pub fn parse_or_asc(raw: Option<&str>) -> SortOrder {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSortBy {
    Name,
    Email,
}

impl ListSortBy {
    /// Only name and email are sortable; unrecognized fields silently fall
    /// back to name.
    pub fn parse_or_name(raw: Option<&str>) -> ListSortBy {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("email") => ListSortBy::Email,
            _ => ListSortBy::Name,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl UserListQuery {
    pub fn sort(&self) -> (ListSortBy, SortOrder) {
        (
            ListSortBy::parse_or_name(self.sort_by.as_deref()),
            SortOrder::parse_or_asc(self.sort_order.as_deref()),
        )
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub name: Option<String>,
    pub email: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl StoreListQuery {
    pub fn sort(&self) -> (ListSortBy, SortOrder) {
        (
            ListSortBy::parse_or_name(self.sort_by.as_deref()),
            SortOrder::parse_or_asc(self.sort_order.as_deref()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_normalizes() {
        let p = Pagination {
            page: None,
            per_page: None,
        };
        assert_eq!(p.normalize(), (1, 20, 0));

        let p = Pagination {
            page: Some(3),
            per_page: Some(500),
        };
        assert_eq!(p.normalize(), (3, 100, 200));
    }

    #[test]
    fn unknown_sort_field_falls_back_to_name() {
        assert_eq!(ListSortBy::parse_or_name(Some("address")), ListSortBy::Name);
        assert_eq!(ListSortBy::parse_or_name(Some("email")), ListSortBy::Email);
        assert_eq!(ListSortBy::parse_or_name(None), ListSortBy::Name);
    }

    #[test]
    fn order_defaults_ascending() {
        assert_eq!(SortOrder::parse_or_asc(Some("DESC")), SortOrder::Desc);
        assert_eq!(SortOrder::parse_or_asc(Some("sideways")), SortOrder::Asc);
        assert_eq!(SortOrder::parse_or_asc(None), SortOrder::Asc);
    }
}
