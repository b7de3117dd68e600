//! crates/cinema_core/src/page.rs
//!
//! The DOM boundary. Storefront operations read form fields and write markup
//! through the [`Page`] trait; [`PageModel`] is the in-memory implementation
//! that records every write as a [`DomOp`] so it can be replayed by the shell.

use std::collections::{HashMap, HashSet};

/// Elements of the page shell the storefront touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    SearchInputDesktop,
    SearchInputMobile,
    NewsletterEmail,
    FilmsGrid,
    RecommendationsGrid,
    MobileMenu,
    MobileMenuButton,
    MobileSearchContainer,
}

impl ElementId {
    pub const ALL: [ElementId; 8] = [
        ElementId::SearchInputDesktop,
        ElementId::SearchInputMobile,
        ElementId::NewsletterEmail,
        ElementId::FilmsGrid,
        ElementId::RecommendationsGrid,
        ElementId::MobileMenu,
        ElementId::MobileMenuButton,
        ElementId::MobileSearchContainer,
    ];

    /// The `id` attribute in the page shell.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementId::SearchInputDesktop => "searchInputDesktop",
            ElementId::SearchInputMobile => "searchInputMobile",
            ElementId::NewsletterEmail => "newsletterEmail",
            ElementId::FilmsGrid => "filmsGrid",
            ElementId::RecommendationsGrid => "recommendationsGrid",
            ElementId::MobileMenu => "mobile-menu",
            ElementId::MobileMenuButton => "mobile-menu-button",
            ElementId::MobileSearchContainer => "mobileSearchContainer",
        }
    }

    pub fn from_dom_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == id)
    }
}

pub const HIDDEN_CLASS: &str = "hidden";

/// Everything the storefront may do to the page.
pub trait Page: Send {
    /// Current value of a form field; empty when the field is blank or unknown.
    fn value(&self, field: ElementId) -> String;

    fn set_value(&mut self, field: ElementId, value: String);

    /// Replaces the content of a container.
    fn set_html(&mut self, container: ElementId, markup: String);

    fn has_class(&self, element: ElementId, class: &str) -> bool;

    fn add_class(&mut self, element: ElementId, class: &str);

    fn remove_class(&mut self, element: ElementId, class: &str);

    /// Blocking notice the user has to dismiss.
    fn alert(&mut self, message: &str);

    /// Opens `url` in a new browsing context.
    fn open_url(&mut self, url: &str);

    /// Flips `class` on `element` and reports whether it is now present.
    fn toggle_class(&mut self, element: ElementId, class: &str) -> bool {
        if self.has_class(element, class) {
            self.remove_class(element, class);
            false
        } else {
            self.add_class(element, class);
            true
        }
    }
}

/// One recorded write against the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomOp {
    SetHtml { target: ElementId, html: String },
    SetValue { target: ElementId, value: String },
    AddClass { target: ElementId, class: String },
    RemoveClass { target: ElementId, class: String },
    Alert { message: String },
    OpenUrl { url: String },
}

/// An in-memory page seeded with the shell's field values and classes.
#[derive(Debug, Clone, Default)]
pub struct PageModel {
    values: HashMap<ElementId, String>,
    classes: HashMap<ElementId, HashSet<String>>,
    ops: Vec<DomOp>,
}

impl PageModel {
    /// A page as the shell first serves it: both mobile panels hidden.
    pub fn new() -> Self {
        let mut page = Self::default();
        page.seed_class(ElementId::MobileMenu, HIDDEN_CLASS);
        page.seed_class(ElementId::MobileSearchContainer, HIDDEN_CLASS);
        page
    }

    /// Sets a field value without recording an operation.
    pub fn seed_value(&mut self, field: ElementId, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Sets a class without recording an operation.
    pub fn seed_class(&mut self, element: ElementId, class: &str) {
        self.classes
            .entry(element)
            .or_default()
            .insert(class.to_string());
    }

    pub fn into_ops(self) -> Vec<DomOp> {
        self.ops
    }
}

#[cfg(test)]
impl PageModel {
    pub fn ops(&self) -> &[DomOp] {
        &self.ops
    }

    /// The markup most recently written into `container`.
    pub fn html(&self, container: ElementId) -> Option<&str> {
        self.ops.iter().rev().find_map(|op| match op {
            DomOp::SetHtml { target, html } if *target == container => Some(html.as_str()),
            _ => None,
        })
    }

    pub fn alerts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DomOp::Alert { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn opened_urls(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DomOp::OpenUrl { url } => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Page for PageModel {
    fn value(&self, field: ElementId) -> String {
        self.values.get(&field).cloned().unwrap_or_default()
    }

    fn set_value(&mut self, field: ElementId, value: String) {
        self.values.insert(field, value.clone());
        self.ops.push(DomOp::SetValue {
            target: field,
            value,
        });
    }

    fn set_html(&mut self, container: ElementId, markup: String) {
        self.ops.push(DomOp::SetHtml {
            target: container,
            html: markup,
        });
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.classes
            .get(&element)
            .is_some_and(|set| set.contains(class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if self.classes.entry(element).or_default().insert(class.to_string()) {
            self.ops.push(DomOp::AddClass {
                target: element,
                class: class.to_string(),
            });
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        let removed = self
            .classes
            .get_mut(&element)
            .is_some_and(|set| set.remove(class));
        if removed {
            self.ops.push(DomOp::RemoveClass {
                target: element,
                class: class.to_string(),
            });
        }
    }

    fn alert(&mut self, message: &str) {
        self.ops.push(DomOp::Alert {
            message: message.to_string(),
        });
    }

    fn open_url(&mut self, url: &str) {
        self.ops.push(DomOp::OpenUrl {
            url: url.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_ids_round_trip() {
        for id in ElementId::ALL {
            assert_eq!(ElementId::from_dom_id(id.as_str()), Some(id));
        }
        assert_eq!(ElementId::from_dom_id("footer"), None);
    }

    #[test]
    fn toggle_records_only_real_changes() {
        let mut page = PageModel::new();
        assert!(page.has_class(ElementId::MobileMenu, HIDDEN_CLASS));

        assert!(!page.toggle_class(ElementId::MobileMenu, HIDDEN_CLASS));
        page.remove_class(ElementId::MobileMenu, HIDDEN_CLASS);

        assert_eq!(
            page.ops(),
            &[DomOp::RemoveClass {
                target: ElementId::MobileMenu,
                class: HIDDEN_CLASS.to_string()
            }]
        );
    }

    #[test]
    fn html_returns_latest_write() {
        let mut page = PageModel::new();
        page.set_html(ElementId::FilmsGrid, "first".to_string());
        page.set_html(ElementId::RecommendationsGrid, "other".to_string());
        page.set_html(ElementId::FilmsGrid, "second".to_string());
        assert_eq!(page.html(ElementId::FilmsGrid), Some("second"));
        assert_eq!(page.html(ElementId::NewsletterEmail), None);
    }

    #[test]
    fn seeded_values_are_readable_but_not_recorded() {
        let mut page = PageModel::new();
        page.seed_value(ElementId::NewsletterEmail, "a@b.c");
        assert_eq!(page.value(ElementId::NewsletterEmail), "a@b.c");
        assert_eq!(page.value(ElementId::SearchInputMobile), "");
        assert!(page.ops().is_empty());
    }
}
