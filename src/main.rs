use leptos::prelude::*;
use temporal_flow_canvas::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App)
}
