// Copyright 2025 the Nearfield Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted pointer session driven through the full engine.
//!
//! This example shows how to combine:
//! - `nearfield_registry` element nodes standing in for host widgets,
//! - a recording transform host that prints applied displacements,
//! - the engine's frame loop with deterministic millisecond timestamps.
//!
//! Run:
//! - `cargo run -p nearfield_demos --example pointer_session`

use std::collections::HashMap;

use kurbo::{Point, Rect, Size};
use nearfield_engine::{
    Capabilities, Config, ElementCallbacks, ElementId, ElementKind, ElementOptions, Engine,
    TransformError, TransformHost,
};
use nearfield_registry::{AttractionMode, ElementNode};

/// A host widget with fixed bounds.
struct FixedNode(Rect);

impl ElementNode for FixedNode {
    fn bounds(&self) -> Option<Rect> {
        Some(self.0)
    }

    fn attached(&self) -> bool {
        true
    }
}

/// Transform host that remembers and prints displacements.
#[derive(Default)]
struct PrintingHost {
    offsets: HashMap<ElementId, (f64, f64)>,
}

impl TransformHost for PrintingHost {
    fn apply_transform(
        &mut self,
        id: ElementId,
        dx: f64,
        dy: f64,
    ) -> Result<(), TransformError> {
        self.offsets.insert(id, (dx, dy));
        println!("  transform {id:?}: ({dx:+.2}, {dy:+.2})");
        Ok(())
    }

    fn clear_transform(&mut self, id: ElementId) {
        if self.offsets.remove(&id).is_some() {
            println!("  transform {id:?}: cleared");
        }
    }
}

fn main() {
    env_logger::init();

    let caps = Capabilities::CSS_FILTERS | Capabilities::FINE_POINTER;
    let mut engine = Engine::new(Config::default(), &caps);
    engine.set_viewport(Size::new(1280.0, 800.0));
    engine.start(0);

    for (label, bounds, kind, attraction) in [
        (
            "save-button",
            Rect::new(200.0, 120.0, 320.0, 160.0),
            ElementKind::Button,
            AttractionMode::Attract,
        ),
        (
            "docs-link",
            Rect::new(600.0, 400.0, 700.0, 420.0),
            ElementKind::Link,
            AttractionMode::Attract,
        ),
        (
            "hero-card",
            Rect::new(900.0, 600.0, 1200.0, 780.0),
            ElementKind::Card,
            AttractionMode::None,
        ),
    ] {
        let callbacks = ElementCallbacks {
            on_proximity_enter: Some(Box::new(move |_| println!("  enter: {label}"))),
            on_proximity_exit: Some(Box::new(move |_| println!("  exit:  {label}"))),
            ..Default::default()
        };
        let id = engine
            .register_element(
                Box::new(FixedNode(bounds)),
                ElementOptions {
                    kind,
                    attraction,
                    ..Default::default()
                },
                callbacks,
            )
            .expect("node is attached");
        log::info!("registered {label} as {id:?} at {bounds:?}");
    }

    let mut host = PrintingHost::default();

    // Sweep the pointer diagonally across the viewport, clicking once near
    // the button and once near the card.
    let mut now: u64 = 0;
    for step in 0..40_u64 {
        now += 16;
        let t = step as f64 / 39.0;
        let position = Point::new(160.0 + t * 1100.0, 100.0 + t * 680.0);
        engine.pointer_moved(position, now);

        if step == 6 || step == 34 {
            engine.button_down(now);
            engine.button_up(now + 8);
            println!("== click at ({:.0}, {:.0}) ==", position.x, position.y);
        }

        let Some(frame) = engine.frame(&mut host, now) else {
            continue;
        };
        if step % 8 == 0
            && let Some(glow) = &frame.glow
        {
            println!(
                "t={now:4}ms pos=({:6.1}, {:6.1}) glow a={:.2} waves={} particles={}",
                glow.position.x,
                glow.position.y,
                glow.color.a,
                frame.waves.len(),
                frame.particles.len(),
            );
        }
    }

    engine.stop(&mut host);
    println!("session over, {} transforms still applied", host.offsets.len());
}
