use serde::Deserialize;

pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: offset.max(0),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_LIMIT)
    }
}

impl TryFrom<PageQuery> for Page {
    type Error = String;

    fn try_from(query: PageQuery) -> Result<Self, Self::Error> {
        let offset = query.offset.unwrap_or(0);
        if offset < 0 {
            return Err("offset must not be negative".to_string());
        }

        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if limit <= 0 {
            return Err("limit must be a positive number".to_string());
        }
        if limit > MAX_PAGE_LIMIT {
            return Err(format!("limit must be <= {}", MAX_PAGE_LIMIT));
        }

        Ok(Self { offset, limit })
    }
}
