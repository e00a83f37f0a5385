use dioxus::prelude::*;
use dioxus::core::Task;
use tutor_core::model::DiagramNode;
use tutor_core::sequencer::{SequencerEvent, SequencerHandle};
use tutor_core::time::Ticker;
use tutor_core::visualization::StagePlayer;

use crate::context::AppContext;

/// Drive `handle` until its script finishes or a newer run replaces it.
fn drive(mut player: Signal<StagePlayer>, ticker: Ticker, handle: SequencerHandle) -> Task {
    spawn(async move {
        while let Some(deadline) = { player.peek().next_deadline() } {
            let now = ticker.now();
            if deadline > now {
                tokio::time::sleep(deadline - now).await;
            }
            if player.peek().handle() != handle {
                break;
            }
            player.write().poll(handle, ticker.now());
        }
    })
}

#[component]
pub fn SequenceViz(nodes: Vec<DiagramNode>, script: Vec<SequencerEvent>, active: bool) -> Element {
    let ctx = use_context::<AppContext>();
    let settings = ctx.settings();
    let ticker = use_hook(Ticker::real);
    let mut player = use_signal(|| StagePlayer::new(script.clone(), &settings));
    let mut task = use_signal(|| None::<Task>);

    let mut restart = move |handle: Option<SequencerHandle>| {
        if let Some(previous) = task.write().take() {
            previous.cancel();
        }
        if let Some(handle) = handle {
            task.set(Some(drive(player, ticker, handle)));
        }
    };

    use_effect(use_reactive((&active,), move |(active,)| {
        let handle = player.write().set_active(active, ticker.now());
        if handle.is_some() || !active {
            restart(handle);
        }
    }));

    let view = player.read().view().clone();
    let finished = player.read().is_finished();

    rsx! {
        div { class: "viz viz-sequence",
            if let Some(phase) = view.phase.as_ref() {
                p { class: "viz-phase", "{phase}" }
            }
            ol { class: "viz-nodes",
                for node in nodes.iter() {
                    li {
                        key: "{node.id}",
                        class: if view.is_revealed(node.id) { "viz-node revealed" } else { "viz-node" },
                        "{node.label}"
                    }
                }
            }
            for (index, typed) in view.typed.iter().enumerate() {
                p { key: "typed-{index}", class: "viz-typed", "{typed}" }
            }
            if !view.lines.is_empty() {
                pre { class: "viz-lines",
                    for (index, line) in view.lines.iter().enumerate() {
                        div { key: "line-{index}", "{line}" }
                    }
                }
            }
            if finished {
                button {
                    class: "btn btn-secondary",
                    onclick: move |_| {
                        let handle = player.write().replay(ticker.now());
                        restart(handle);
                    },
                    "Replay"
                }
            }
        }
    }
}
