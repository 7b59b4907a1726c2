// Copyright 2025 the Nearfield Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearfield Engine: the provider that wires every subsystem together.
//!
//! [`Engine`] owns the cursor tracker, the element registry, the attraction
//! engine, the click-wave tracker, and the overlay renderer, and drives them
//! from three host-supplied inputs: pointer events, button events, and a
//! per-frame tick. All time arrives as caller-supplied millisecond
//! timestamps, so a test can script an entire session deterministically.
//!
//! Capability gating happens once at construction: a reduced-motion
//! preference disables the engine outright, and a touch-only surface keeps it
//! gated until a real pointer move proves hybrid input. While disabled the
//! engine accepts registrations and configuration but produces no frames and
//! applies no transforms.
//!
//! ```rust
//! use kurbo::{Point, Rect, Size};
//! use nearfield_engine::{
//!     Capabilities, Config, ElementCallbacks, ElementOptions, Engine, NullTransformHost,
//! };
//! use nearfield_registry::ElementNode;
//!
//! struct FixedNode(Rect);
//!
//! impl ElementNode for FixedNode {
//!     fn bounds(&self) -> Option<Rect> {
//!         Some(self.0)
//!     }
//!     fn attached(&self) -> bool {
//!         true
//!     }
//! }
//!
//! let caps = Capabilities::CSS_FILTERS | Capabilities::FINE_POINTER;
//! let mut engine = Engine::new(Config::default(), &caps);
//! engine.set_viewport(Size::new(1200.0, 800.0));
//! engine.start(0);
//!
//! let node = FixedNode(Rect::new(100.0, 100.0, 150.0, 150.0));
//! let id = engine
//!     .register_element(Box::new(node), ElementOptions::default(), ElementCallbacks::default())
//!     .unwrap();
//!
//! let mut host = NullTransformHost;
//! engine.pointer_moved(Point::new(120.0, 120.0), 10);
//! let frame = engine.frame(&mut host, 20).unwrap();
//! assert!(frame.glow.is_some());
//! assert!(engine.element(id).unwrap().in_proximity);
//! ```

mod config;

pub use config::{Config, ThemeChoice};
pub use nearfield_attract::{TransformError, TransformHost};
pub use nearfield_overlay::{Color, EffectLayers, OverlayFrame, Theme, ThemePreset, ZoneStrategy};
pub use nearfield_pointer::{Capabilities, CapabilityProbe, CursorSample};
pub use nearfield_registry::{
    AttractionMode, ElementId, ElementKind, ElementNode, ElementOptions,
};

use hashbrown::HashMap;
use kurbo::{Point, Size, Vec2};
use nearfield_attract::AttractionEngine;
use nearfield_overlay::{OverlayRenderer, zone};
use nearfield_pointer::CursorTracker;
use nearfield_registry::{DEFAULT_GRID_THRESHOLD, ElementData, ElementEventKind, ElementRegistry};
use nearfield_wave::{Wave, WaveTracker};

/// Minimum interval between full grid rebuilds, milliseconds.
pub const REBUILD_INTERVAL_MS: u64 = 1000;

/// Minimum interval between liveness sweeps, milliseconds.
pub const SWEEP_INTERVAL_MS: u64 = 2000;

/// Handle for a cursor-state subscription.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The published cursor state, delivered to subscribers on every accepted
/// sample.
///
/// `revision` increases by exactly one per publication, so a consumer that
/// stores the last revision it saw can cheaply detect missed updates.
#[derive(Clone, Debug)]
pub struct CursorState {
    /// Pointer position.
    pub position: Point,
    /// Velocity in units per reference frame.
    pub velocity: Vec2,
    /// Velocity magnitude.
    pub speed: f64,
    /// Whether the cursor is considered moving.
    pub is_moving: bool,
    /// Whether a button is held.
    pub is_clicking: bool,
    /// Theme color for the zone under the cursor.
    pub zone_color: Color,
    /// Elements currently inside their proximity radius.
    pub active: Vec<ElementId>,
    /// Monotonic publication counter.
    pub revision: u64,
}

/// Per-element notification hooks.
///
/// All hooks are optional; an element registered purely for visual effects
/// needs none of them.
#[derive(Default)]
pub struct ElementCallbacks {
    /// Fires when the cursor enters the element's proximity radius.
    pub on_proximity_enter: Option<Box<dyn FnMut(ElementId)>>,
    /// Fires when the cursor leaves the element's proximity radius.
    pub on_proximity_exit: Option<Box<dyn FnMut(ElementId)>>,
    /// Fires when the cursor point enters the element rectangle.
    pub on_hover: Option<Box<dyn FnMut(ElementId)>>,
}

impl core::fmt::Debug for ElementCallbacks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ElementCallbacks")
            .field("on_proximity_enter", &self.on_proximity_enter.is_some())
            .field("on_proximity_exit", &self.on_proximity_exit.is_some())
            .field("on_hover", &self.on_hover.is_some())
            .finish()
    }
}

/// A [`TransformHost`] that discards every transform.
///
/// Useful for hosts that render displacement themselves from
/// [`ElementData`], and for tests.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullTransformHost;

impl TransformHost for NullTransformHost {
    fn apply_transform(&mut self, _id: ElementId, _dx: f64, _dy: f64) -> Result<(), TransformError> {
        Ok(())
    }

    fn clear_transform(&mut self, _id: ElementId) {}
}

/// A cursor-state subscriber callback.
pub type Subscriber = Box<dyn FnMut(&CursorState)>;

/// The Nearfield provider.
pub struct Engine {
    config: config::ResolvedConfig,
    caps: Capabilities,
    running: bool,
    /// True while a touch-only surface is waiting for proof of hybrid input.
    touch_gated: bool,
    viewport: Size,
    tracker: CursorTracker,
    registry: ElementRegistry,
    attraction: AttractionEngine,
    waves: WaveTracker<Color>,
    renderer: OverlayRenderer,
    callbacks: HashMap<ElementId, ElementCallbacks>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    last_sample: Option<CursorSample>,
    revision: u64,
    last_rebuild_ms: u64,
    last_sweep_ms: u64,
}

impl core::fmt::Debug for Engine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("caps", &self.caps)
            .field("running", &self.running)
            .field("touch_gated", &self.touch_gated)
            .field("elements", &self.registry.len())
            .field("subscribers", &self.subscribers.len())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine from a host configuration and a capability probe.
    ///
    /// The probe is read exactly once; hosts whose capabilities can change
    /// (say, a device rotating into a mode with a pointer) rebuild the
    /// engine.
    pub fn new(config: Config, probe: &dyn CapabilityProbe) -> Self {
        let caps = probe.probe();
        let config = config::resolve(config, caps);
        if !caps.motion_allowed() {
            log::info!("nearfield: reduced motion requested, engine stays disabled");
        }
        let touch_gated = config.disable_on_mobile && caps.touch_only();
        Self {
            registry: ElementRegistry::new(
                config.proximity_radius,
                nearfield_grid::DEFAULT_CELL_SIZE,
            ),
            waves: WaveTracker::new(config.max_waves, config.max_wave_radius),
            renderer: OverlayRenderer::new(config.layers, config.intensity),
            config,
            caps,
            running: false,
            touch_gated,
            viewport: Size::ZERO,
            tracker: CursorTracker::new(),
            attraction: AttractionEngine::new(),
            callbacks: HashMap::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
            last_sample: None,
            revision: 0,
            last_rebuild_ms: 0,
            last_sweep_ms: 0,
        }
    }

    /// The capability snapshot taken at construction.
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Whether the engine currently reacts to input and produces frames.
    pub fn is_enabled(&self) -> bool {
        self.running && self.caps.motion_allowed() && !self.touch_gated
    }

    /// Start producing frames. `now_ms` anchors the maintenance cadences.
    pub fn start(&mut self, now_ms: u64) {
        self.running = true;
        self.last_rebuild_ms = now_ms;
        self.last_sweep_ms = now_ms;
    }

    /// Stop the engine and release every applied transform.
    ///
    /// Registrations and subscriptions survive a stop; waves and pointer
    /// state do not.
    pub fn stop(&mut self, host: &mut dyn TransformHost) {
        self.running = false;
        self.tracker.reset();
        self.waves.clear();
        self.attraction.reset(host);
        self.last_sample = None;
    }

    /// Record the viewport size used for zone resolution.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Register an element with the engine.
    ///
    /// Returns `None` when the node is detached, mirroring
    /// [`ElementRegistry::register`].
    pub fn register_element(
        &mut self,
        node: Box<dyn ElementNode>,
        options: ElementOptions,
        callbacks: ElementCallbacks,
    ) -> Option<ElementId> {
        let id = self.registry.register(node, options)?;
        self.callbacks.insert(id, callbacks);
        Some(id)
    }

    /// Remove an element. Safe to call with a stale id.
    pub fn unregister_element(&mut self, id: ElementId) {
        self.registry.unregister(id);
        self.callbacks.remove(&id);
    }

    /// Computed state for a registered element.
    pub fn element(&self, id: ElementId) -> Option<&ElementData> {
        self.registry.element(id)
    }

    /// Number of registered elements.
    pub fn element_count(&self) -> usize {
        self.registry.len()
    }

    /// Subscribe to cursor-state publications.
    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    /// Drop a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Tell a touch-gated engine that a fine pointer has appeared.
    ///
    /// Hosts with their own pointer-type detection call this directly; a
    /// plain [`Engine::pointer_moved`] has the same effect.
    pub fn notice_fine_pointer(&mut self) {
        if self.touch_gated {
            log::debug!("nearfield: fine pointer detected on touch surface, enabling effects");
            self.touch_gated = false;
        }
        self.caps |= Capabilities::FINE_POINTER;
    }

    /// Feed a pointer move.
    ///
    /// On a touch-gated engine the first move is taken as proof of hybrid
    /// input and lifts the gate; the move itself is then processed normally.
    pub fn pointer_moved(&mut self, position: Point, now_ms: u64) {
        if !self.running || !self.caps.motion_allowed() {
            return;
        }
        self.notice_fine_pointer();
        if let Some(sample) = self.tracker.pointer_moved(position, now_ms) {
            self.process_sample(sample);
        }
    }

    /// Feed a button press. Spawns a click wave at the current position.
    pub fn button_down(&mut self, now_ms: u64) {
        self.tracker.button_down();
        if !self.is_enabled() {
            return;
        }
        if let Some(position) = self.tracker.position() {
            let color = zone::resolve(&self.config.theme, self.config.zones, position, self.viewport);
            self.waves.spawn(position, color, now_ms);
        }
    }

    /// Feed a button release.
    pub fn button_up(&mut self, _now_ms: u64) {
        self.tracker.button_up();
    }

    /// Advance one frame: flush the throttle window, run maintenance, apply
    /// attraction, advance waves, and compose the overlay.
    ///
    /// Returns `None` while the engine is disabled or before the first
    /// pointer sample.
    pub fn frame(&mut self, host: &mut dyn TransformHost, now_ms: u64) -> Option<OverlayFrame> {
        if !self.is_enabled() {
            return None;
        }
        if let Some(sample) = self.tracker.flush(now_ms) {
            self.process_sample(sample);
        }
        self.maintain(now_ms);

        let sample = self.last_sample?;
        self.attraction
            .apply(host, sample.position, self.registry.iter());

        let candidates: Vec<(ElementId, Point, f64)> = self
            .registry
            .iter()
            .map(|(id, data)| (id, data.center(), bounding_radius(data)))
            .collect();
        let pulses = self.waves.step(&candidates);

        let zone_color = zone::resolve(
            &self.config.theme,
            self.config.zones,
            sample.position,
            self.viewport,
        );
        Some(self.renderer.render(
            &sample,
            &self.config.theme,
            zone_color,
            self.waves.waves(),
            &pulses,
            self.caps,
        ))
    }

    /// Live click waves, oldest first.
    pub fn waves(&self) -> &[Wave<Color>] {
        self.waves.waves()
    }

    fn maintain(&mut self, now_ms: u64) {
        if now_ms.saturating_sub(self.last_sweep_ms) >= SWEEP_INTERVAL_MS {
            self.last_sweep_ms = now_ms;
            for id in self.registry.sweep() {
                self.callbacks.remove(&id);
            }
        }
        if self.registry.len() > DEFAULT_GRID_THRESHOLD
            && now_ms.saturating_sub(self.last_rebuild_ms) >= REBUILD_INTERVAL_MS
        {
            self.last_rebuild_ms = now_ms;
            self.registry.rebuild_grid();
        }
    }

    fn process_sample(&mut self, sample: CursorSample) {
        let events = self.registry.update_cursor(sample.position);
        for event in &events {
            let Some(callbacks) = self.callbacks.get_mut(&event.id) else {
                continue;
            };
            let hook = match event.kind {
                ElementEventKind::ProximityEnter => callbacks.on_proximity_enter.as_mut(),
                ElementEventKind::ProximityExit => callbacks.on_proximity_exit.as_mut(),
                ElementEventKind::HoverStart => callbacks.on_hover.as_mut(),
                ElementEventKind::HoverEnd => None,
            };
            if let Some(hook) = hook {
                hook(event.id);
            }
        }

        self.revision += 1;
        let state = CursorState {
            position: sample.position,
            velocity: sample.velocity,
            speed: sample.speed,
            is_moving: sample.is_moving,
            is_clicking: sample.is_clicking,
            zone_color: zone::resolve(
                &self.config.theme,
                self.config.zones,
                sample.position,
                self.viewport,
            ),
            active: self.registry.active_ids(),
            revision: self.revision,
        };
        self.last_sample = Some(sample);
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&state);
        }
    }
}

/// Radius of the circle circumscribing the element's cached bounds.
fn bounding_radius(data: &ElementData) -> f64 {
    data.bounds.width().hypot(data.bounds.height()) / 2.0
}
