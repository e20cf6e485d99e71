//! In-memory UI surface
//!
//! A [`Board`] is an ordered set of named [`Panel`]s, each backed by a
//! [`TextList`]. The terminal front end draws a board; tests inspect one
//! directly.

use super::{ListSurface, Region, UiSurface};

/// An ordered list of text rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextList {
    rows: Vec<String>,
}

impl TextList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rows, top to bottom
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ListSurface for TextList {
    fn clear(&mut self) {
        self.rows.clear();
    }

    fn append(&mut self, row: String) {
        self.rows.push(row);
    }
}

/// A titled, addressable region of the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    id: String,
    title: String,
    list: TextList,
}

impl Panel {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            list: TextList::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rows(&self) -> &[String] {
        self.list.rows()
    }
}

/// The set of panels making up the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    panels: Vec<Panel>,
}

impl Board {
    /// A board with the five standard regions in display order
    pub fn standard() -> Self {
        Self {
            panels: Region::ALL
                .iter()
                .map(|r| Panel::new(r.id(), r.title()))
                .collect(),
        }
    }

    /// A board with exactly the given region ids
    ///
    /// Known ids get their standard title; anything else is titled by id.
    pub fn with_regions<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            panels: ids
                .into_iter()
                .map(|id| {
                    let title = Region::from_id(id).map(|r| r.title()).unwrap_or(id);
                    Panel::new(id, title)
                })
                .collect(),
        }
    }

    /// Panels in display order
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id == id)
    }

    /// Rows currently shown in a region
    pub fn rows(&self, id: &str) -> Option<&[String]> {
        self.panel(id).map(Panel::rows)
    }

    /// Total number of rows across all panels
    pub fn row_count(&self) -> usize {
        self.panels.iter().map(|p| p.list.len()).sum()
    }
}

impl UiSurface for Board {
    type List = TextList;

    fn list_mut(&mut self, id: &str) -> Option<&mut TextList> {
        self.panels
            .iter_mut()
            .find(|p| p.id == id)
            .map(|p| &mut p.list)
    }
}
