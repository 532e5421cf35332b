//! Table schema: columns, row actions, bulk actions and filter composition.

use std::collections::BTreeSet;

use crate::application::pagination::PageRequest;
use crate::application::repos::PostQueryFilter;
use crate::application::viewer::Viewer;
use crate::domain::entities::PostRecord;

use super::filters::{FilterSpec, FilterState, Indicator};

const ELLIPSIS: &str = "...";

/// What a column renders for a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    /// Public path of an image, if the record has one.
    Image(Option<String>),
    Toggle(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Sequential number derived from the page offset, not from the record.
    RowIndex,
    Text { limit: Option<usize> },
    Image,
    Toggle,
}

/// Who may see a column. Evaluated per render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Always,
    RequiresRole(&'static str),
}

impl Visibility {
    pub fn allows(self, viewer: &Viewer) -> bool {
        match self {
            Visibility::Always => true,
            Visibility::RequiresRole(role) => viewer.has_role(role),
        }
    }
}

pub type CellAccessor = fn(&PostRecord) -> CellValue;

#[derive(Debug, Clone)]
pub struct ColumnSpec {
    name: &'static str,
    label: &'static str,
    kind: ColumnKind,
    sortable: bool,
    searchable: bool,
    toggleable: bool,
    hidden_by_default: bool,
    visibility: Visibility,
    accessor: Option<CellAccessor>,
}

impl ColumnSpec {
    fn new(name: &'static str, label: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            label,
            kind,
            sortable: false,
            searchable: false,
            toggleable: false,
            hidden_by_default: false,
            visibility: Visibility::Always,
            accessor: None,
        }
    }

    pub fn row_index(name: &'static str) -> Self {
        Self::new(name, name, ColumnKind::RowIndex)
    }

    pub fn text(name: &'static str, label: &'static str, accessor: CellAccessor) -> Self {
        Self {
            accessor: Some(accessor),
            ..Self::new(name, label, ColumnKind::Text { limit: None })
        }
    }

    pub fn image(name: &'static str, label: &'static str, accessor: CellAccessor) -> Self {
        Self {
            accessor: Some(accessor),
            ..Self::new(name, label, ColumnKind::Image)
        }
    }

    pub fn toggle(name: &'static str, label: &'static str, accessor: CellAccessor) -> Self {
        Self {
            accessor: Some(accessor),
            ..Self::new(name, label, ColumnKind::Toggle)
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        if let ColumnKind::Text { .. } = self.kind {
            self.kind = ColumnKind::Text { limit: Some(limit) };
        }
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Let the viewer show or hide the column, optionally starting hidden.
    pub fn toggleable(mut self, hidden_by_default: bool) -> Self {
        self.toggleable = true;
        self.hidden_by_default = hidden_by_default;
        self
    }

    pub fn visible_to(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn is_toggleable(&self) -> bool {
        self.toggleable
    }

    pub fn is_hidden_by_default(&self) -> bool {
        self.hidden_by_default
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether the column shows for `viewer`, given the optional columns they switched on.
    pub fn is_visible(&self, viewer: &Viewer, toggled_on: &BTreeSet<String>) -> bool {
        if !self.visibility.allows(viewer) {
            return false;
        }
        if self.toggleable && self.hidden_by_default {
            return toggled_on.contains(self.name);
        }
        true
    }

    /// `iteration` is the 1-based index of the row within the current page.
    pub fn render(&self, record: &PostRecord, page: PageRequest, iteration: u64) -> CellValue {
        match (self.kind, self.accessor) {
            (ColumnKind::RowIndex, _) => CellValue::Text(page.row_number(iteration).to_string()),
            (ColumnKind::Text { limit }, Some(accessor)) => match accessor(record) {
                CellValue::Text(text) => CellValue::Text(match limit {
                    Some(limit) => truncate(&text, limit),
                    None => text,
                }),
                other => other,
            },
            (_, Some(accessor)) => accessor(record),
            (_, None) => CellValue::Text(String::new()),
        }
    }
}

/// Cut `text` to `limit` characters, appending `...` when anything was removed.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some((byte_index, _)) => {
            let mut truncated = text[..byte_index].trim_end().to_string();
            truncated.push_str(ELLIPSIS);
            truncated
        }
    }
}

pub type ActionUrl = fn(&PostRecord) -> String;

#[derive(Debug, Clone)]
pub struct RowAction {
    name: &'static str,
    label: &'static str,
    color: Option<&'static str>,
    icon: Option<&'static str>,
    url: ActionUrl,
    open_in_new_tab: bool,
}

impl RowAction {
    pub fn new(name: &'static str, label: &'static str, url: ActionUrl) -> Self {
        Self {
            name,
            label,
            color: None,
            icon: None,
            url,
            open_in_new_tab: false,
        }
    }

    pub fn color(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }

    pub fn icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn open_url_in_new_tab(mut self) -> Self {
        self.open_in_new_tab = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn action_color(&self) -> Option<&'static str> {
        self.color
    }

    pub fn action_icon(&self) -> Option<&'static str> {
        self.icon
    }

    pub fn opens_in_new_tab(&self) -> bool {
        self.open_in_new_tab
    }

    pub fn url_for(&self, record: &PostRecord) -> String {
        (self.url)(record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkActionKind {
    /// Soft delete of every selected record.
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkAction {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: BulkActionKind,
    pub requires_confirmation: bool,
}

impl BulkAction {
    pub fn delete() -> Self {
        Self {
            name: "delete",
            label: "Delete selected",
            kind: BulkActionKind::Delete,
            requires_confirmation: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableSchema {
    columns: Vec<ColumnSpec>,
    filters: Vec<FilterSpec>,
    actions: Vec<RowAction>,
    bulk_actions: Vec<BulkAction>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.columns = columns;
        self
    }

    pub fn filters(mut self, filters: Vec<FilterSpec>) -> Self {
        self.filters = filters;
        self
    }

    pub fn actions(mut self, actions: Vec<RowAction>) -> Self {
        self.actions = actions;
        self
    }

    pub fn bulk_actions(mut self, bulk_actions: Vec<BulkAction>) -> Self {
        self.bulk_actions = bulk_actions;
        self
    }

    pub fn all_columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn all_filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    pub fn row_actions(&self) -> &[RowAction] {
        &self.actions
    }

    pub fn row_action(&self, name: &str) -> Option<&RowAction> {
        self.actions.iter().find(|action| action.name == name)
    }

    pub fn all_bulk_actions(&self) -> &[BulkAction] {
        &self.bulk_actions
    }

    pub fn bulk_action(&self, name: &str) -> Option<&BulkAction> {
        self.bulk_actions.iter().find(|action| action.name == name)
    }

    pub fn visible_columns(
        &self,
        viewer: &Viewer,
        toggled_on: &BTreeSet<String>,
    ) -> Vec<&ColumnSpec> {
        self.columns
            .iter()
            .filter(|column| column.is_visible(viewer, toggled_on))
            .collect()
    }

    /// Optional columns a viewer may switch on or off.
    pub fn toggleable_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|column| column.toggleable)
    }

    pub fn is_searchable(&self) -> bool {
        self.columns.iter().any(|column| column.searchable)
    }

    /// Fold every active filter into `base`. Active filters combine with AND.
    pub fn apply_filters(&self, state: &FilterState, base: PostQueryFilter) -> PostQueryFilter {
        self.filters
            .iter()
            .fold(base, |query, filter| filter.apply(state, query))
    }

    pub fn indicators(&self, state: &FilterState) -> Vec<Indicator> {
        self.filters
            .iter()
            .flat_map(|filter| filter.indicators(state))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("Short title", 50), "Short title");
        let exact = "a".repeat(50);
        assert_eq!(truncate(&exact, 50), exact);
    }

    #[test]
    fn truncate_cuts_long_text_on_char_boundary() {
        let long = "é".repeat(60);
        let truncated = truncate(&long, 50);
        assert_eq!(truncated.chars().count(), 53);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncate_trims_trailing_whitespace_before_ellipsis() {
        let text = format!("{} tail", "x".repeat(49));
        assert_eq!(truncate(&text, 50), format!("{}...", "x".repeat(49)));
    }

    #[test]
    fn role_visibility_requires_role() {
        let admin = Viewer::new("ada", ["admin"]);
        let editor = Viewer::new("eve", ["editor"]);
        let rule = Visibility::RequiresRole("admin");
        assert!(rule.allows(&admin));
        assert!(!rule.allows(&editor));
        assert!(!rule.allows(&Viewer::anonymous()));
        assert!(Visibility::Always.allows(&Viewer::anonymous()));
    }
}
