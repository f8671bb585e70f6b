// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reaching a tool behind a tab, while a consent dialog is still open.
//!
//! The simulated UI has a dashboard with two tabs. `enable-2fa` lives on the
//! security tab, and a modal consent dialog covers the page for the first few
//! hundred milliseconds. The controller asks the session to invoke `enable-2fa`:
//! the session waits for the dialog to go away, switches tabs, waits for the
//! button to become interactable, and clicks it.
//!
//! Run:
//! - `cargo run -p understory_examples --example dashboard`
//! - `UNDERSTORY_LOG=debug cargo run -p understory_examples --example dashboard`

use std::sync::{Arc, Weak};
use std::time::Duration;

use kurbo::Rect;
use parking_lot::Mutex;
use understory_exposure::{ExposureChangeEvent, Layer, VisibilityProbe};
use understory_navigation::NamingConvention;
use understory_reach::{
    InvokeError, ReachConfig, Session, Signal, ToolId, ToolInvoker, init_logging,
};

const CONFIG: &str = r#"
wait_timeout_ms = 2000
step_timeout_ms = 1000

[logging]
level = "info"
"#;

struct Widget {
    tool: &'static str,
    panel: &'static str,
    bounds: Rect,
}

const WIDGETS: &[Widget] = &[
    Widget {
        tool: "dashboard.tab-overview",
        panel: "dashboard",
        bounds: Rect::new(10.0, 10.0, 110.0, 40.0),
    },
    Widget {
        tool: "dashboard.tab-security",
        panel: "dashboard",
        bounds: Rect::new(120.0, 10.0, 220.0, 40.0),
    },
    Widget {
        tool: "dashboard.overview.refresh",
        panel: "dashboard.overview",
        bounds: Rect::new(10.0, 60.0, 110.0, 90.0),
    },
    Widget {
        tool: "dashboard.security.enable-2fa",
        panel: "dashboard.security",
        bounds: Rect::new(10.0, 60.0, 160.0, 90.0),
    },
];

/// The simulated host UI.
struct Ui {
    session: Session<Weak<()>>,
    probe: VisibilityProbe,
    active_panel: Mutex<&'static str>,
    layers: Mutex<Vec<Layer>>,
    // Keeps the widgets alive.
    _nodes: Vec<Arc<()>>,
}

impl Ui {
    fn mount(session: Session<Weak<()>>) -> Result<Self, Box<dyn std::error::Error>> {
        let naming = NamingConvention::default();
        let mut nodes = Vec::new();
        for w in WIDGETS {
            naming.apply(&mut session.planner(), w.tool)?;
            let node = Arc::new(());
            session.tracker().register(w.tool, Arc::downgrade(&node))?;
            nodes.push(node);
        }
        {
            let mut planner = session.planner();
            planner.register_edge("dashboard", "dashboard.overview", "dashboard.tab-overview")?;
            planner.register_edge("dashboard", "dashboard.security", "dashboard.tab-security")?;
            planner.register_edge("dashboard.overview", "dashboard.security", "dashboard.tab-security")?;
            planner.register_edge("dashboard.security", "dashboard.overview", "dashboard.tab-overview")?;
            planner.set_current_context("dashboard.overview")?;
        }
        let consent = Layer {
            bounds: Rect::new(100.0, 100.0, 500.0, 300.0),
            z_index: 1000,
            modal: true,
        };
        let ui = Self {
            session,
            probe: VisibilityProbe::new(Rect::new(0.0, 0.0, 800.0, 600.0)),
            active_panel: Mutex::new("dashboard.overview"),
            layers: Mutex::new(vec![consent]),
            _nodes: nodes,
        };
        ui.relayout();
        Ok(ui)
    }

    /// Report the visibility of every widget to the tracker.
    fn relayout(&self) {
        let active = *self.active_panel.lock();
        let layers = self.layers.lock().clone();
        for w in WIDGETS {
            let shown = w.panel == "dashboard" || w.panel == active;
            let signal = if shown {
                self.probe.observe(w.bounds, 0, &layers)
            } else {
                Signal::Visibility {
                    visible: false,
                    obstructed: false,
                }
            };
            self.session.tracker().apply(w.tool, signal);
        }
    }

    fn dismiss_dialogs(&self) {
        self.layers.lock().retain(|l| !l.modal);
        println!("   (consent dialog dismissed)");
        self.relayout();
    }
}

#[async_trait::async_trait]
impl ToolInvoker for Ui {
    async fn invoke(&self, tool: &ToolId) -> Result<(), InvokeError> {
        println!("   click {tool}");
        let panel = match tool.as_str() {
            "dashboard.tab-overview" => Some("dashboard.overview"),
            "dashboard.tab-security" => Some("dashboard.security"),
            _ => None,
        };
        if let Some(panel) = panel {
            // Tab switches settle a little later than the click.
            tokio::time::sleep(Duration::from_millis(50)).await;
            *self.active_panel.lock() = panel;
            self.relayout();
        }
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ReachConfig::from_toml_str(CONFIG)?;
    init_logging(&config.logging)?;

    let session: Session<Weak<()>> = Session::new(config)?;
    let subscription = session
        .tracker()
        .subscribe(None, |e: &ExposureChangeEvent| {
            println!("   {}: {:?} -> {:?}", e.tool, e.previous, e.current);
        });

    let ui = Arc::new(Ui::mount(session.clone())?);
    println!("== Mounted ==");
    for (tool, state) in session.tracker().tracked() {
        println!("  {tool:<32} {state:?}");
    }

    let host = Arc::clone(&ui);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        host.dismiss_dialogs();
    });

    println!("== Invoke dashboard.security.enable-2fa ==");
    let path = session
        .invoke("dashboard.security.enable-2fa", ui.as_ref())
        .await?;
    let route: Vec<&str> = path.tools().map(|t| t.as_str()).collect();
    println!("== Done: route {route:?}, cost {} ==", path.total_weight);

    subscription.unsubscribe();
    session.shutdown();
    Ok(())
}
