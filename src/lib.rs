mod physics;
mod viewport;
mod shelf;
mod input;
mod world;
mod pointer;
mod runner;
mod render;
mod sync;
mod display;
mod catalog;
mod storage;
mod cart;
mod routes;
mod easing;
mod transition;
mod context;
mod config;

// Re-export public items
pub use physics::{px_to_m, m_to_px, BodyParams, BodySnapshot, FIXED_TIME_STEP, PIXELS_PER_METER, SHELF_THICKNESS_PX};
pub use viewport::{screen_to_world, Breakpoint, ViewportSize, DEFAULT_MOBILE_BREAKPOINT};
pub use shelf::{grid_layout, layout_shelves, organized_position, Shelf};
pub use input::{ListenerId, PointerEvent, PointerSurface};
pub use world::{BodyHandle, BodySpec, CookieBody, ShelfWorld, WorldError, WorldId};
pub use pointer::{GrabState, PointerConstraint};
pub use runner::Runner;
pub use render::{ElementGone, ElementId, ElementTable, ItemTransform, MountedElement, RenderSurface};
pub use sync::{LoopState, StopReason, SyncLoop, Synchronizer};
pub use display::{CommandOutcome, DisplayMode, FrameStats, ShelfDisplay, SkipReason};
pub use catalog::{Catalog, CatalogError, CatalogItem};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use cart::{Cart, CartEntry};
pub use routes::{HistoryRouter, NavLink, Router, ABOUT, CONTACT, HOME, NAV_LINKS, SHOP};
pub use easing::Easing;
pub use transition::{stagger_delays, PageTransition, Phase, StaggerFrom, TransitionTile, TILE_SHAPES};
pub use context::{AppContext, ContextError};
pub use config::{CartConfig, ConfigError, LayoutConfig, PhysicsConfig, StorefrontConfig, TransitionConfig};
