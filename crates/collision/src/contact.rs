use glam::Vec2;
use std::collections::BTreeMap;
use tilespace_common::TileType;

/// Contact phase reported by the host's physics space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Begin,
    End,
}

/// One contact against a registered tile region, fed by the host per
/// physics event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub kind: ContactKind,
    pub tile_type: TileType,
    pub position: Vec2,
}

type ContactHandler = Box<dyn FnMut(&Contact)>;

/// Explicit contact event bus.
///
/// Handlers subscribe per tile type; the host dispatches each contact it
/// observes. There is no global registry — a router belongs to exactly one
/// tilemap and is reached only through it.
#[derive(Default)]
pub struct ContactRouter {
    handlers: BTreeMap<TileType, Vec<ContactHandler>>,
}

impl ContactRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler to contacts against tiles of the given type.
    pub fn on_contact(&mut self, tile_type: TileType, handler: impl FnMut(&Contact) + 'static) {
        self.handlers
            .entry(tile_type)
            .or_default()
            .push(Box::new(handler));
    }

    /// Dispatch one contact to its type's subscribers. Returns how many
    /// handlers ran.
    pub fn dispatch(&mut self, contact: &Contact) -> usize {
        let Some(handlers) = self.handlers.get_mut(&contact.tile_type) else {
            return 0;
        };
        for handler in handlers.iter_mut() {
            handler(contact);
        }
        handlers.len()
    }

    pub fn handler_count(&self, tile_type: TileType) -> usize {
        self.handlers.get(&tile_type).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for ContactRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: BTreeMap<_, _> = self.handlers.iter().map(|(t, h)| (t, h.len())).collect();
        f.debug_struct("ContactRouter").field("handlers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn contact(kind: ContactKind, tile_type: TileType) -> Contact {
        Contact {
            kind,
            tile_type,
            position: Vec2::ZERO,
        }
    }

    #[test]
    fn dispatch_reaches_matching_type_only() {
        let mut router = ContactRouter::new();
        let hazard_hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hazard_hits);
        router.on_contact(TileType::Hazard, move |_| counter.set(counter.get() + 1));

        assert_eq!(router.dispatch(&contact(ContactKind::Begin, TileType::Hazard)), 1);
        assert_eq!(router.dispatch(&contact(ContactKind::Begin, TileType::Solid)), 0);
        assert_eq!(hazard_hits.get(), 1);
    }

    #[test]
    fn begin_and_end_both_flow_through() {
        let mut router = ContactRouter::new();
        let log = Rc::new(Cell::new((0, 0)));
        let shared = Rc::clone(&log);
        router.on_contact(TileType::Liquid, move |c| {
            let (begins, ends) = shared.get();
            match c.kind {
                ContactKind::Begin => shared.set((begins + 1, ends)),
                ContactKind::End => shared.set((begins, ends + 1)),
            }
        });

        router.dispatch(&contact(ContactKind::Begin, TileType::Liquid));
        router.dispatch(&contact(ContactKind::End, TileType::Liquid));
        assert_eq!(log.get(), (1, 1));
    }

    #[test]
    fn multiple_handlers_per_type() {
        let mut router = ContactRouter::new();
        router.on_contact(TileType::Solid, |_| {});
        router.on_contact(TileType::Solid, |_| {});
        assert_eq!(router.handler_count(TileType::Solid), 2);
        assert_eq!(router.dispatch(&contact(ContactKind::Begin, TileType::Solid)), 2);
    }
}
