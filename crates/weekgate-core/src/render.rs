//! The seam to the rendering collaborator.
//!
//! The core never touches a view directly. It computes plain data (card
//! views, identity views, timer text) and pushes it through [`Surface`].
//! Views may leave out optional widgets, so a missing element is logged and
//! skipped rather than treated as a failure.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::RenderError;
use crate::gate::GateDecision;
use crate::session::Identity;

/// Element ids the core writes to.
pub mod ids {
    pub const NAME: &str = "dynamic-name";
    pub const PHOTO_DISPLAY: &str = "user-photo-display";
    pub const PHOTO_FRAME: &str = "photo-frame";
    pub const NAV_PHOTO: &str = "nav-photo-img";
    pub const NAV_FRAME: &str = "nav-photo";
    pub const TIMER: &str = "timer";
    pub const TIMER_LABEL: &str = "timer-label";
}

/// Badge color for open cards.
pub const OPEN_BADGE_COLOR: &str = "#4cc9f0";

/// How a dashboard card should look.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub decision: GateDecision,
    pub class: &'static str,
    pub badge_text: &'static str,
    pub badge_color: Option<&'static str>,
}

impl From<GateDecision> for CardView {
    fn from(decision: GateDecision) -> Self {
        match decision {
            GateDecision::Unlocked => CardView {
                decision,
                class: "unlocked",
                badge_text: "Open",
                badge_color: Some(OPEN_BADGE_COLOR),
            },
            GateDecision::Locked => CardView {
                decision,
                class: "locked",
                badge_text: "Locked",
                badge_color: None,
            },
        }
    }
}

/// Implemented by whatever actually draws (DOM bridge, terminal, test double).
pub trait Surface {
    fn has_element(&self, id: &str) -> bool;
    fn set_text(&self, id: &str, text: &str) -> Result<(), RenderError>;
    fn set_image(&self, id: &str, src: &str) -> Result<(), RenderError>;
    fn show(&self, id: &str) -> Result<(), RenderError>;
    fn set_card(&self, id: &str, view: &CardView) -> Result<(), RenderError>;
}

/// Log and drop a missing-element error.
pub(crate) fn skip_missing(result: Result<(), RenderError>) {
    if let Err(RenderError::MissingElement { id }) = result {
        tracing::debug!(id = %id, "element not in view; skipped");
    }
}

/// Fill the name and photo placeholders. Unset fields leave the view as is.
pub fn render_identity(surface: &dyn Surface, identity: &Identity) {
    if let Some(name) = identity.name.as_deref() {
        skip_missing(surface.set_text(ids::NAME, name));
    }
    let Some(photo) = identity.photo.as_deref() else {
        return;
    };
    for (image, frame) in [
        (ids::PHOTO_DISPLAY, ids::PHOTO_FRAME),
        (ids::NAV_PHOTO, ids::NAV_FRAME),
    ] {
        if surface.has_element(image) {
            skip_missing(surface.set_image(image, photo));
            skip_missing(surface.show(frame));
        }
    }
}

pub fn render_card(surface: &dyn Surface, card_id: &str, decision: GateDecision) {
    skip_missing(surface.set_card(card_id, &CardView::from(decision)));
}

/// In-memory surface. Only elements registered up front exist.
#[derive(Debug, Default)]
pub struct MemorySurface {
    elements: HashSet<String>,
    texts: RefCell<HashMap<String, String>>,
    images: RefCell<HashMap<String, String>>,
    visible: RefCell<HashSet<String>>,
    cards: RefCell<HashMap<String, CardView>>,
}

impl MemorySurface {
    pub fn with_elements<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            elements: ids.into_iter().map(str::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn text(&self, id: &str) -> Option<String> {
        self.texts.borrow().get(id).cloned()
    }

    pub fn image(&self, id: &str) -> Option<String> {
        self.images.borrow().get(id).cloned()
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.borrow().contains(id)
    }

    pub fn card(&self, id: &str) -> Option<CardView> {
        self.cards.borrow().get(id).cloned()
    }

    fn require(&self, id: &str) -> Result<(), RenderError> {
        if self.elements.contains(id) {
            Ok(())
        } else {
            Err(RenderError::MissingElement { id: id.to_string() })
        }
    }
}

impl Surface for MemorySurface {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains(id)
    }

    fn set_text(&self, id: &str, text: &str) -> Result<(), RenderError> {
        self.require(id)?;
        self.texts.borrow_mut().insert(id.to_string(), text.to_string());
        Ok(())
    }

    fn set_image(&self, id: &str, src: &str) -> Result<(), RenderError> {
        self.require(id)?;
        self.images.borrow_mut().insert(id.to_string(), src.to_string());
        Ok(())
    }

    fn show(&self, id: &str) -> Result<(), RenderError> {
        self.require(id)?;
        self.visible.borrow_mut().insert(id.to_string());
        Ok(())
    }

    fn set_card(&self, id: &str, view: &CardView) -> Result<(), RenderError> {
        self.require(id)?;
        self.cards.borrow_mut().insert(id.to_string(), view.clone());
        Ok(())
    }
}
