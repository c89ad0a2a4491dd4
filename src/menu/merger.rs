//! Fragment merger
//!
//! Walks fragments top to bottom and builds menu items one classification
//! at a time. Only the most recently created item can still receive a
//! description or a price; a section header closes it.

use tracing::{debug, info};

use super::rules::{classify, Classification, PendingItem};
use super::{MenuItem, DEFAULT_SECTION};
use crate::vision::TextFragment;

/// One decision taken while merging, tagged with the fragment's `y1`
#[derive(Debug, Clone, PartialEq)]
pub enum MergeEvent {
    /// A section header replaced the current section
    SectionStarted { y: u32, section: String },
    /// A new item was appended at `index`
    ItemCreated {
        y: u32,
        index: usize,
        embedded_price: bool,
    },
    /// A standalone price was attached to the pending item
    PriceAttached { y: u32, index: usize, price: f64 },
    /// A standalone price matched the pattern but did not parse
    UnparsedPrice { y: u32, text: String },
    /// A description was attached to the pending item
    DescriptionAttached { y: u32, index: usize },
    /// A standalone price had nothing to attach to
    OrphanedPrice { y: u32, text: String },
    /// The fragment was blank after trimming
    Skipped { y: u32 },
}

/// Items plus the decisions that produced them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub items: Vec<MenuItem>,
    pub events: Vec<MergeEvent>,
}

/// Merges OCR fragments into structured menu items
#[derive(Debug, Clone, Copy, Default)]
pub struct Merger;

impl Merger {
    pub fn new() -> Self {
        Self
    }

    /// Merge fragments into menu items in top-to-bottom order
    pub fn merge(&self, fragments: &[TextFragment]) -> Vec<MenuItem> {
        self.merge_traced(fragments).items
    }

    /// Merge fragments and keep the per-fragment decisions.
    ///
    /// Fragments are ordered by `y1`; ties keep their input order.
    pub fn merge_traced(&self, fragments: &[TextFragment]) -> MergeOutcome {
        info!("Merging {} fragments...", fragments.len());

        let mut ordered: Vec<&TextFragment> = fragments.iter().collect();
        ordered.sort_by_key(|fragment| fragment.bbox.y1);

        let mut state = MergeState::new();
        for fragment in ordered {
            state.apply(fragment);
        }

        let outcome = state.finish();
        info!("Merge complete. Produced {} menu items.", outcome.items.len());
        outcome
    }
}

struct MergeState {
    current_section: String,
    /// Index of the item that can still take a description or price
    pending: Option<usize>,
    items: Vec<MenuItem>,
    events: Vec<MergeEvent>,
}

impl MergeState {
    fn new() -> Self {
        Self {
            current_section: DEFAULT_SECTION.to_string(),
            pending: None,
            items: Vec::new(),
            events: Vec::new(),
        }
    }

    fn pending_item(&self) -> Option<PendingItem> {
        let item = self.items.get(self.pending?)?;
        Some(PendingItem {
            has_price: item.price.is_some(),
            has_description: item.description.is_some(),
        })
    }

    fn apply(&mut self, fragment: &TextFragment) {
        let y = fragment.bbox.y1;
        let text = fragment.text.trim();
        if text.is_empty() {
            self.events.push(MergeEvent::Skipped { y });
            return;
        }

        match classify(text, self.pending_item()) {
            Classification::EmbeddedPrice { name, price } => {
                let mut item = MenuItem::new(&self.current_section, name);
                item.price = price;
                debug!("Created Item (Embedded Price): {} - {:?}", item.name, item.price);
                self.push_item(item, y, true);
            }
            Classification::StandalonePrice { price } => self.attach_price(text, price, y),
            Classification::SectionHeader => {
                self.current_section = text.to_string();
                self.pending = None;
                debug!("Found Section: {}", self.current_section);
                self.events.push(MergeEvent::SectionStarted {
                    y,
                    section: text.to_string(),
                });
            }
            Classification::Description => {
                if let Some(index) = self.pending {
                    if let Some(item) = self.items.get_mut(index) {
                        item.description = Some(text.to_string());
                        debug!("Assigned Description to {}", item.name);
                    }
                    self.events.push(MergeEvent::DescriptionAttached { y, index });
                }
            }
            Classification::NewItem => {
                debug!("Created Item: {}", text);
                self.push_item(MenuItem::new(&self.current_section, text), y, false);
            }
        }
    }

    fn push_item(&mut self, item: MenuItem, y: u32, embedded_price: bool) {
        let index = self.items.len();
        self.items.push(item);
        self.pending = Some(index);
        self.events.push(MergeEvent::ItemCreated {
            y,
            index,
            embedded_price,
        });
    }

    fn attach_price(&mut self, text: &str, price: Option<f64>, y: u32) {
        let target = self
            .pending
            .filter(|&index| self.items.get(index).is_some_and(|item| item.price.is_none()));

        let Some(index) = target else {
            debug!("Orphaned price: {}", text);
            self.events.push(MergeEvent::OrphanedPrice {
                y,
                text: text.to_string(),
            });
            return;
        };

        match (price, self.items.get_mut(index)) {
            (Some(price), Some(item)) => {
                item.price = Some(price);
                debug!("Assigned Price {} to {}", price, item.name);
                self.events.push(MergeEvent::PriceAttached { y, index, price });
            }
            _ => {
                debug!("Could not parse price: {}", text);
                self.events.push(MergeEvent::UnparsedPrice {
                    y,
                    text: text.to_string(),
                });
            }
        }
    }

    fn finish(self) -> MergeOutcome {
        MergeOutcome {
            items: self.items,
            events: self.events,
        }
    }
}
