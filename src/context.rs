//! Application context passed explicitly to whatever needs shared state.
//!
//! [`AppContext`] owns the catalog, cart, transition gate, router and shelf display.
//! Its frame drives them in order: cart timers, transition tiles (which may
//! navigate), the mounted view for the current route, then the shelf display.

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::cart::Cart;
use crate::catalog::{Catalog, CatalogError};
use crate::config::StorefrontConfig;
use crate::display::{DisplayMode, FrameStats, ShelfDisplay};
use crate::input::PointerSurface;
use crate::render::RenderSurface;
use crate::routes::{HistoryRouter, Router, HOME};
use crate::storage::{FileStore, KeyValueStore, StorageError};
use crate::transition::PageTransition;
use crate::viewport::ViewportSize;

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct AppContext {
    config: StorefrontConfig,
    catalog: Catalog,
    cart: Cart,
    transitions: PageTransition,
    router: HistoryRouter,
    display: ShelfDisplay,
    pointer: Rc<PointerSurface>,
    shelf_preferred: bool,
}

impl AppContext {
    pub fn new(
        config: StorefrontConfig,
        catalog: Catalog,
        store: Box<dyn KeyValueStore>,
        pointer: Rc<PointerSurface>,
        viewport: ViewportSize,
    ) -> Self {
        let cart = Cart::restore(store, config.cart.clone());
        let transitions = PageTransition::new(config.transition.clone());
        let display = ShelfDisplay::new(&config, catalog.items(), Rc::clone(&pointer), viewport);
        Self {
            config,
            catalog,
            cart,
            transitions,
            router: HistoryRouter::default(),
            display,
            pointer,
            shelf_preferred: true,
        }
    }

    /// Built-in catalog with the cart persisted under the configured data directory.
    pub fn from_config(config: StorefrontConfig, viewport: ViewportSize) -> Result<Self, ContextError> {
        let catalog = Catalog::builtin()?;
        let store = FileStore::open(config.resolved_data_dir())?;
        info!(dir = %store.dir().display(), items = catalog.len(), "storefront context ready");
        Ok(Self::new(
            config,
            catalog,
            Box::new(store),
            Rc::new(PointerSurface::new()),
            viewport,
        ))
    }

    pub fn frame(&mut self, dt: f32, surface: &mut dyn RenderSurface) -> FrameStats {
        self.cart.tick(f64::from(dt));
        self.transitions.tick(dt, &mut self.router);
        self.mount_view(surface);
        self.display.frame(dt, surface)
    }

    fn mount_view(&mut self, surface: &mut dyn RenderSurface) {
        let wants_shelf = self.shelf_preferred && self.router.current() == HOME;
        match (wants_shelf, self.display.mode()) {
            (true, DisplayMode::Grid) => {
                if let Err(err) = self.display.enter_shelf_mode(surface) {
                    warn!(%err, "shelf view unavailable, falling back to grid");
                    self.shelf_preferred = false;
                }
            }
            (false, DisplayMode::Shelf) => self.display.exit_shelf_mode(surface),
            _ => {}
        }
    }

    /// Ask the transition gate to move to `to`. False when the request was ignored.
    pub fn navigate(&mut self, to: &str) -> bool {
        self.transitions.request_transition(to, &self.router)
    }

    pub fn add_to_cart(&mut self, item_id: u32) -> bool {
        match self.catalog.get(item_id) {
            Some(item) => {
                self.cart.add(item);
                true
            }
            None => {
                debug!(item = item_id, "no such catalog item");
                false
            }
        }
    }

    /// Add whatever item is drawn at (`x`, `y`) to the cart.
    pub fn select_at(&mut self, x: f32, y: f32) -> Option<u32> {
        if self.transitions.is_animating() || self.router.current() != HOME {
            return None;
        }
        let item_id = self.display.item_at(x, y)?;
        self.add_to_cart(item_id).then_some(item_id)
    }

    /// Flip between the shelf and the grid presentation. Takes effect next frame.
    pub fn toggle_layout(&mut self) -> bool {
        self.shelf_preferred = !self.shelf_preferred;
        info!(shelf = self.shelf_preferred, "layout toggled");
        self.shelf_preferred
    }

    pub fn resize(&mut self, size: ViewportSize) {
        self.display.viewport_resized(size);
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub fn transitions(&self) -> &PageTransition {
        &self.transitions
    }

    pub fn router(&self) -> &HistoryRouter {
        &self.router
    }

    pub fn display(&self) -> &ShelfDisplay {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut ShelfDisplay {
        &mut self.display
    }

    pub fn pointer(&self) -> &Rc<PointerSurface> {
        &self.pointer
    }

    pub fn shelf_preferred(&self) -> bool {
        self.shelf_preferred
    }
}
