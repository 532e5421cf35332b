//! Page bindings for the resource and the named routes it links to.

use std::fmt;

use uuid::Uuid;

/// The four pages a resource exposes, each bound to a path relative to the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourcePage {
    Index,
    Create,
    Edit,
    Show,
}

impl ResourcePage {
    pub const ALL: [ResourcePage; 4] = [
        ResourcePage::Index,
        ResourcePage::Create,
        ResourcePage::Edit,
        ResourcePage::Show,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourcePage::Index => "index",
            ResourcePage::Create => "create",
            ResourcePage::Edit => "edit",
            ResourcePage::Show => "show",
        }
    }

    /// Relative route pattern in axum path syntax.
    pub fn route(self) -> &'static str {
        match self {
            ResourcePage::Index => "/",
            ResourcePage::Create => "/create",
            ResourcePage::Edit => "/{record}/edit",
            ResourcePage::Show => "/show/{id}",
        }
    }

    pub fn needs_record(self) -> bool {
        matches!(self, ResourcePage::Edit | ResourcePage::Show)
    }

    /// Route pattern joined to the resource base path, as registered on the router.
    pub fn full_route(self, base: &str) -> String {
        match self.route() {
            "/" => base.to_string(),
            route => format!("{base}{route}"),
        }
    }

    /// Concrete URL for this page. `record` is ignored by pages that take none.
    pub fn url(self, base: &str, record: Option<Uuid>) -> Result<String, RouteError> {
        match (self, record) {
            (ResourcePage::Index, _) => Ok(base.to_string()),
            (ResourcePage::Create, _) => Ok(format!("{base}/create")),
            (ResourcePage::Edit, Some(id)) => Ok(format!("{base}/{id}/edit")),
            (ResourcePage::Show, Some(id)) => Ok(format!("{base}/show/{id}")),
            (page, None) => Err(RouteError::MissingRecord(page.name())),
        }
    }
}

impl fmt::Display for ResourcePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("page `{0}` requires a record")]
    MissingRecord(&'static str),
}

/// Application routes outside the resource that its actions link to.
///
/// `DownloadImage` is the `download.image` route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedRoute {
    DownloadImage,
}

impl NamedRoute {
    pub fn pattern(self) -> &'static str {
        match self {
            NamedRoute::DownloadImage => "/download/image/{record}",
        }
    }

    pub fn url(self, record: Uuid) -> String {
        match self {
            NamedRoute::DownloadImage => format!("/download/image/{record}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationManager {
    Tags,
}

impl RelationManager {
    pub fn name(self) -> &'static str {
        match self {
            RelationManager::Tags => "tags",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RelationManager::Tags => "Tags",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    StatsOverview,
}

impl Widget {
    pub fn name(self) -> &'static str {
        match self {
            Widget::StatsOverview => "stats_overview",
        }
    }
}
