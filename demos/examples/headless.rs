// Copyright 2025 the Hypertree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drive an engine without a window: load a synthetic tree, pan, zoom,
//! click and animate, printing what the render layers receive.
//!
//! Run:
//! - `cargo run -p hypertree_demos --example headless`
//! - `RUST_LOG=debug cargo run -p hypertree_demos --example headless -- '{"max_labels": 10}'`

use hypertree_engine::{
    ConfigOverride, Engine, LabelMap, LayerFrame, LayerKind, LoadTiming, LoadedData, RenderSink,
};
use hypertree_tree::SourceNode;
use kurbo::Point;

/// A "category/subcategory/item" style hierarchy.
fn synthetic(depth: u32, fanout: u32, prefix: &str) -> SourceNode<String> {
    if depth == 0 {
        return SourceNode::leaf(prefix.to_owned());
    }
    let children = (0..fanout)
        .map(|i| synthetic(depth - 1, fanout, &format!("{prefix}.{i}")))
        .collect();
    SourceNode::with_children(prefix.to_owned(), children)
}

/// Prints one line per layer update.
#[derive(Default)]
struct Printer {
    frames: usize,
}

impl RenderSink for Printer {
    fn update_parent(&mut self, kind: LayerKind) {
        println!("  attach {kind:?}");
    }

    fn update_data(&mut self, frame: &LayerFrame) {
        println!("  data   {:?}: {} elements", frame.kind(), frame.len());
    }

    fn update_transformation(&mut self, frame: &LayerFrame) {
        if frame.kind() == LayerKind::Labels {
            self.frames += 1;
            if let LayerFrame::Labels(labels) = frame {
                let shown: Vec<&str> = labels.iter().take(4).map(|l| l.text.as_str()).collect();
                println!("  frame {}: labels {shown:?}", self.frames);
            }
        }
    }
}

fn main() {
    env_logger::init();

    let o: ConfigOverride = match std::env::args().nth(1) {
        Some(json) => match serde_json::from_str(&json) {
            Ok(o) => o,
            Err(err) => {
                log::error!("ignoring invalid override: {err}");
                ConfigOverride::default()
            }
        },
        None => ConfigOverride::default(),
    };

    let root = synthetic(6, 4, "n");
    let mut labels = LabelMap::new();
    let mut stack = vec![&root];
    while let Some(node) = stack.pop() {
        labels.insert(node.data.clone(), format!("Item {}", node.data));
        stack.extend(node.children.iter());
    }

    let mut engine = Engine::with_override(&o);
    engine.set_render_sink(Printer::default());
    engine.on_center_node_change(|_, crumb| println!("center: {crumb}"));
    engine.on_node_click(|node, point| println!("click at {point:?} on {node:?}"));

    println!("load");
    let loaded = move || LoadedData {
        root: root.clone(),
        timing: LoadTiming {
            started_ms: 0,
            finished_ms: 12,
        },
    };
    if let Err(err) = engine.load_with(loaded, labels) {
        log::error!("load failed: {err}");
        return;
    }
    println!(
        "{} nodes, {} visible, magic {:.3}",
        engine.tree().len(),
        engine.cache().unculled.len(),
        engine.magic()
    );

    println!("drag");
    engine.pointer_down(None, Point::new(0.0, 0.0));
    for step in 1..=5 {
        engine.pointer_move(None, Point::new(-0.08 * f64::from(step), 0.02));
    }
    engine.pointer_up(None, Point::new(-0.4, 0.02), 100);

    println!("zoom in");
    for _ in 0..3 {
        engine.wheel(-1.0, Point::new(0.1, 0.0));
    }
    println!("lambda {:.4}", engine.lambda());

    println!("click the first label");
    let target = engine.cache().labels.first().copied();
    if let Some(node) = target
        && let Some(c) = engine.tree().cache(node)
    {
        let at: Point = c.z.into();
        engine.pointer_down(None, at);
        engine.pointer_up(None, at, 200);
    }
    let mut now = 1_000;
    while engine.is_animating() {
        engine.tick(now);
        now += 16;
    }

    let matches = engine.select_query(".3.3");
    println!("query matched {matches} nodes; visible {}", engine.cache().unculled.len());

    if engine.goto_home(Some(400)).is_ok() {
        while engine.is_animating() {
            engine.tick(now);
            now += 16;
        }
    }
    println!("home; center {:?}", engine.center());
}
