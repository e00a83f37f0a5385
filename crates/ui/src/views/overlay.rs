use std::rc::Rc;

use dioxus::prelude::*;
use tutor_core::model::OverlayId;
use tutor_core::overlay::{OverlayManager, Placement, Rect, Size};
use tutor_core::time::Ticker;

const PANEL: Size = Size {
    width: 260.0,
    height: 120.0,
};
const FALLBACK_VIEWPORT: Size = Size {
    width: 1200.0,
    height: 800.0,
};

/// Shared owner of the single open overlay on a page.
#[derive(Clone, Copy)]
pub struct OverlayHost {
    pub manager: Signal<OverlayManager>,
    ticker: Ticker,
}

impl OverlayHost {
    pub fn escape(mut self) {
        self.manager.write().escape();
    }

    pub fn click_outside(mut self) {
        self.manager.write().click(None);
    }
}

/// Provide an [`OverlayHost`] for the current subtree.
pub fn use_overlay_host(grace: std::time::Duration) -> OverlayHost {
    use_context_provider(|| OverlayHost {
        manager: Signal::new(OverlayManager::new(grace)),
        ticker: Ticker::real(),
    })
}

async fn viewport_size() -> Size {
    document::eval("return [window.innerWidth, window.innerHeight];")
        .join::<(f64, f64)>()
        .await
        .map(|(width, height)| Size::new(width, height))
        .unwrap_or(FALLBACK_VIEWPORT)
}

async fn anchor_rect(element: Option<Rc<MountedData>>) -> Option<Rect> {
    let rect = element?.get_client_rect().await.ok()?;
    Some(Rect::new(
        rect.origin.x,
        rect.origin.y,
        rect.size.width,
        rect.size.height,
    ))
}

#[component]
fn OverlayPanel(id: u32, text: String) -> Element {
    let host = use_context::<OverlayHost>();
    let owner = OverlayId::new(id);
    let Some(position) = host
        .manager
        .read()
        .position()
        .filter(|_| host.manager.read().is_open_for(owner))
    else {
        return rsx! {};
    };
    let placement = match position.placement {
        Placement::Above => "above",
        Placement::Below => "below",
    };

    rsx! {
        div {
            class: "overlay-panel overlay-{placement}",
            role: "tooltip",
            style: "left: {position.x}px; top: {position.y}px; width: {PANEL.width}px;",
            onclick: move |evt| {
                evt.stop_propagation();
                let mut manager = host.manager;
                manager.write().click(Some(owner));
            },
            onmouseenter: move |_| {
                let mut manager = host.manager;
                manager.write().pointer_enter();
            },
            "{text}"
        }
    }
}

/// Click-to-toggle help bubble.
#[component]
pub fn InlineHelp(id: u32, label: String, text: String) -> Element {
    let host = use_context::<OverlayHost>();
    let mut element = use_signal(|| None::<Rc<MountedData>>);
    let owner = OverlayId::new(id);
    let expanded = host.manager.read().is_open_for(owner);

    rsx! {
        span { class: "inline-help",
            button {
                class: "inline-help-trigger",
                aria_label: "{label}",
                aria_expanded: "{expanded}",
                onmounted: move |evt| element.set(Some(evt.data())),
                onclick: move |evt| {
                    evt.stop_propagation();
                    let mut manager = host.manager;
                    spawn(async move {
                        let Some(anchor) = anchor_rect(element()).await else {
                            return;
                        };
                        let viewport = viewport_size().await;
                        manager.write().toggle(owner, anchor, PANEL, viewport);
                    });
                },
                "?"
            }
            OverlayPanel { id, text }
        }
    }
}

/// Hover tooltip around `children`. Closes after the hover grace period.
#[component]
pub fn ToolChip(id: u32, tooltip: String, children: Element) -> Element {
    let host = use_context::<OverlayHost>();
    let mut element = use_signal(|| None::<Rc<MountedData>>);
    let owner = OverlayId::new(id);

    rsx! {
        span {
            class: "tool-chip",
            onmounted: move |evt| element.set(Some(evt.data())),
            onmouseenter: move |_| {
                let mut manager = host.manager;
                if manager.read().is_open_for(owner) {
                    manager.write().pointer_enter();
                    return;
                }
                spawn(async move {
                    let Some(anchor) = anchor_rect(element()).await else {
                        return;
                    };
                    let viewport = viewport_size().await;
                    manager.write().open(owner, anchor, PANEL, viewport);
                });
            },
            onmouseleave: move |_| {
                let mut manager = host.manager;
                let ticker = host.ticker;
                manager.write().pointer_leave(ticker.now());
                let grace = manager.peek().close_deadline();
                spawn(async move {
                    if let Some(deadline) = grace {
                        let now = ticker.now();
                        if deadline > now {
                            tokio::time::sleep(deadline - now).await;
                        }
                    }
                    manager.write().poll(ticker.now());
                });
            },
            {children}
            OverlayPanel { id, text: tooltip }
        }
    }
}
