//! services/storefront/src/web/protocol.rs
//!
//! Defines the JSON protocol between the page shell and the storefront service.
//! The shell posts an event together with the state of its form fields; the
//! service answers with the DOM writes the shell has to apply, in order.

use cinema_core::page::{DomOp, ElementId, PageModel};
use cinema_core::wiring::{EventKind, UiEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

//=========================================================================================
// Messages Sent FROM the Shell (Browser) TO the Server
//=========================================================================================

/// One event as reported by the shell.
#[derive(Deserialize, Debug, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// The document finished loading.
    PageReady,
    /// An `input` event fired on the element with this DOM id.
    Input { element: String },
    /// A `click` event fired on the element with this DOM id.
    Click { element: String },
    /// A category link was chosen.
    Category { category: String },
    /// A play or watch trigger on a card.
    Play { film_id: i64 },
    /// A favorite trigger on a card.
    Favorite { film_id: i64 },
    NewsletterSubmit,
    /// The retry control of an inline error.
    Retry,
    ToggleMobileSearch,
}

impl ClientEvent {
    pub fn into_ui_event(self) -> Result<UiEvent, String> {
        let dom = |element: &str, kind| {
            ElementId::from_dom_id(element)
                .map(|element| UiEvent::Dom { element, kind })
                .ok_or_else(|| format!("Unknown element id '{}'", element))
        };
        match self {
            ClientEvent::PageReady => Ok(UiEvent::PageReady),
            ClientEvent::Input { element } => dom(&element, EventKind::Input),
            ClientEvent::Click { element } => dom(&element, EventKind::Click),
            ClientEvent::Category { category } => Ok(UiEvent::CategorySelected(category)),
            ClientEvent::Play { film_id } => Ok(UiEvent::PlayClicked(film_id)),
            ClientEvent::Favorite { film_id } => Ok(UiEvent::FavoriteClicked(film_id)),
            ClientEvent::NewsletterSubmit => Ok(UiEvent::NewsletterSubmitted),
            ClientEvent::Retry => Ok(UiEvent::RetryClicked),
            ClientEvent::ToggleMobileSearch => Ok(UiEvent::MobileSearchToggled),
        }
    }
}

/// The body of `POST /events`.
#[derive(Deserialize, Debug, ToSchema)]
pub struct EventRequest {
    pub event: ClientEvent,
    /// Current values of the shell's form fields, keyed by DOM id.
    #[serde(default)]
    pub fields: HashMap<String, String>,
    /// DOM ids of the elements that currently carry the `hidden` class.
    #[serde(default)]
    pub hidden: Vec<String>,
}

impl EventRequest {
    /// Splits the request into the event and a page seeded with the shell's state.
    /// Unknown DOM ids in `fields` and `hidden` are ignored.
    pub fn into_parts(self) -> Result<(UiEvent, PageModel), String> {
        let event = self.event.into_ui_event()?;
        let mut page = PageModel::default();
        for (id, value) in self.fields {
            if let Some(field) = ElementId::from_dom_id(&id) {
                page.seed_value(field, value);
            }
        }
        for id in self.hidden {
            if let Some(element) = ElementId::from_dom_id(&id) {
                page.seed_class(element, cinema_core::page::HIDDEN_CLASS);
            }
        }
        Ok((event, page))
    }
}

//=========================================================================================
// Messages Sent FROM the Server TO the Shell (Browser)
//=========================================================================================

/// One DOM write for the shell to apply.
#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PatchOp {
    /// Replace the content of the element.
    SetHtml { target: String, html: String },
    /// Set the value of a form field.
    SetValue { target: String, value: String },
    AddClass { target: String, class: String },
    RemoveClass { target: String, class: String },
    /// Show a blocking notice.
    Alert { message: String },
    /// Open the URL in a new browsing context.
    OpenUrl { url: String },
}

impl From<DomOp> for PatchOp {
    fn from(op: DomOp) -> Self {
        match op {
            DomOp::SetHtml { target, html } => PatchOp::SetHtml {
                target: target.as_str().to_string(),
                html,
            },
            DomOp::SetValue { target, value } => PatchOp::SetValue {
                target: target.as_str().to_string(),
                value,
            },
            DomOp::AddClass { target, class } => PatchOp::AddClass {
                target: target.as_str().to_string(),
                class,
            },
            DomOp::RemoveClass { target, class } => PatchOp::RemoveClass {
                target: target.as_str().to_string(),
                class,
            },
            DomOp::Alert { message } => PatchOp::Alert { message },
            DomOp::OpenUrl { url } => PatchOp::OpenUrl { url },
        }
    }
}

/// The response to `POST /events`.
#[derive(Serialize, Debug, ToSchema)]
pub struct PagePatch {
    pub ops: Vec<PatchOp>,
}

impl From<PageModel> for PagePatch {
    fn from(page: PageModel) -> Self {
        Self {
            ops: page.into_ops().into_iter().map(PatchOp::from).collect(),
        }
    }
}
