use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use js_sys::{Object, WeakMap};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlElement, Node, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, ScrollToOptions, Window,
};

use crate::feed::markers::{selector_list, LIVE_MARKERS};
use crate::feed::{card_selector, CardId, CardRect, FeedDocument};
use crate::watch::InsertedCard;

/// [`FeedDocument`] over the live page.
///
/// Card identity lives in a `WeakMap` keyed by the element, so the page's
/// DOM is never annotated and detached elements can still be collected.
/// `elements` only holds the cards seen since the last `locate_cards`.
pub struct WebFeed {
    window: Window,
    document: Document,
    ids: WeakMap,
    next_id: Cell<u64>,
    elements: RefCell<HashMap<CardId, Element>>,
    live_selector: String,
}

impl WebFeed {
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            ids: WeakMap::new(),
            next_id: Cell::new(1),
            elements: RefCell::new(HashMap::new()),
            live_selector: selector_list(LIVE_MARKERS),
        }
    }

    /// Identity of `element`, assigning one on first sight.
    pub fn card_id(&self, element: &Element) -> CardId {
        let key: &Object = element.unchecked_ref();
        let id = match self.ids.get(key).as_f64() {
            Some(raw) => CardId(raw as u64),
            None => {
                let id = CardId(self.next_id.get());
                self.next_id.set(id.0 + 1);
                self.ids.set(key, &JsValue::from_f64(id.0 as f64));
                id
            }
        };
        self.elements.borrow_mut().insert(id, element.clone());
        id
    }

    pub fn element(&self, card: CardId) -> Option<Element> {
        self.elements.borrow().get(&card).cloned()
    }

    /// Cards at or below an inserted node.
    pub fn inserted_cards(&self, node: &Node) -> Vec<InsertedCard> {
        let Some(element) = node.dyn_ref::<Element>() else {
            return Vec::new();
        };
        let selector = card_selector();
        let mut found = Vec::new();

        if element.matches(selector).unwrap_or(false) {
            found.push(InsertedCard {
                card: self.card_id(element),
                nested: false,
            });
        }

        if let Ok(list) = element.query_selector_all(selector) {
            for i in 0..list.length() {
                if let Some(nested) = list.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    found.push(InsertedCard {
                        card: self.card_id(&nested),
                        nested: true,
                    });
                }
            }
        }
        found
    }
}

impl FeedDocument for WebFeed {
    fn locate_cards(&self) -> Vec<CardId> {
        let Ok(list) = self.document.query_selector_all(card_selector()) else {
            return Vec::new();
        };

        let mut located = Vec::with_capacity(list.length() as usize);
        let mut elements = HashMap::with_capacity(located.capacity());
        for i in 0..list.length() {
            let Some(element) = list.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let id = self.card_id(&element);
            elements.insert(id, element);
            located.push(id);
        }
        *self.elements.borrow_mut() = elements;
        located
    }

    fn card_text(&self, card: CardId) -> Option<String> {
        let element = self.element(card)?;
        let inner = element
            .dyn_ref::<HtmlElement>()
            .map(HtmlElement::inner_text)
            .unwrap_or_default();
        if inner.is_empty() {
            element.text_content()
        } else {
            Some(inner)
        }
    }

    fn has_live_marker(&self, card: CardId) -> bool {
        self.element(card)
            .and_then(|el| el.query_selector(&self.live_selector).ok().flatten())
            .is_some()
    }

    fn card_rect(&self, card: CardId) -> Option<CardRect> {
        let rect = self.element(card)?.get_bounding_client_rect();
        Some(CardRect {
            top: rect.top(),
            bottom: rect.bottom(),
        })
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_card_into_view(&self, card: CardId) {
        let Some(element) = self.element(card) else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Center);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn scroll_window_by(&self, dy: f64) {
        let options = ScrollToOptions::new();
        options.set_top(dy);
        options.set_left(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_by_with_scroll_to_options(&options);
    }
}
