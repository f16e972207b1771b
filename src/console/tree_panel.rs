use std::collections::HashSet;

use anyhow::Result;

use crate::change_tree::{self, TreeNode};
use crate::model::TreeListing;

use super::context::{Delivery, Generation, Origin, SelectionContext, Ticket};
use super::request::Request;

/// File tree for the current context. Keeps the last accepted listing so the
/// changed-only filter can be flipped without a round trip.
#[derive(Debug)]
pub struct TreePanel {
    generation: Generation,
    pending: Option<Origin>,
    show_all: bool,
    listing: Option<TreeListing>,
    forest: Vec<TreeNode>,
    collapsed: HashSet<String>,
}

impl TreePanel {
    pub fn new(show_all: bool) -> Self {
        Self {
            generation: Generation::default(),
            pending: None,
            show_all,
            listing: None,
            forest: Vec::new(),
            collapsed: HashSet::new(),
        }
    }

    pub fn request(&mut self, context: &SelectionContext, origin: Origin) -> Request {
        let generation = self.generation.advance();
        self.pending = Some(origin);
        Request::Tree {
            ticket: Ticket {
                context: context.clone(),
                generation,
                origin,
            },
        }
    }

    pub fn complete(
        &mut self,
        ticket: &Ticket,
        current: Option<&SelectionContext>,
        outcome: Result<TreeListing>,
    ) -> Delivery {
        if !self.generation.is_current(ticket.generation) || current != Some(&ticket.context) {
            return Delivery::Stale;
        }
        self.pending = None;
        match outcome {
            Ok(listing) => {
                self.forest = build_forest(&listing, self.show_all);
                self.listing = Some(listing);
                Delivery::Applied
            }
            Err(err) => Delivery::Failed(err.context("fetch file tree")),
        }
    }

    pub fn set_show_all(&mut self, show_all: bool) {
        self.show_all = show_all;
        if let Some(listing) = &self.listing {
            self.forest = build_forest(listing, show_all);
        }
    }

    /// Drops everything tied to the previous context and orphans in-flight fetches.
    pub fn clear(&mut self) {
        self.generation.advance();
        self.pending = None;
        self.listing = None;
        self.forest.clear();
        self.collapsed.clear();
    }

    pub fn toggle_collapsed(&mut self, key: &str) {
        if !self.collapsed.remove(key) {
            self.collapsed.insert(key.to_string());
        }
    }

    pub fn is_collapsed(&self, key: &str) -> bool {
        self.collapsed.contains(key)
    }

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Origin of the fetch currently awaited, if any.
    pub fn pending_origin(&self) -> Option<Origin> {
        self.pending
    }

    pub fn listing(&self) -> Option<&TreeListing> {
        self.listing.as_ref()
    }

    pub fn forest(&self) -> &[TreeNode] {
        &self.forest
    }

    pub fn rows(&self) -> Vec<change_tree::VisibleRow<'_>> {
        change_tree::flatten_visible(&self.forest, &self.collapsed)
    }
}

fn build_forest(listing: &TreeListing, show_all: bool) -> Vec<TreeNode> {
    let statuses = listing.statuses();
    change_tree::build(&listing.prefix, &listing.paths, &statuses, show_all)
}
