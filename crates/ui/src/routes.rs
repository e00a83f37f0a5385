use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{HomeView, ModuleView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/module/:module_id", ModuleView)] Module { module_id: String },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();

    rsx! {
        nav { class: "sidebar",
            h1 { "Tutor" }
            ul {
                li { Link { to: Route::Home {}, "Overview" } }
                for module in ctx.modules().iter() {
                    li {
                        key: "{module.id()}",
                        Link {
                            to: Route::Module { module_id: module.id().as_str().to_string() },
                            "{module.title()}"
                        }
                    }
                }
            }
        }
    }
}
