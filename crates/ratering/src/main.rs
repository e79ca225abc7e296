use ratering::config;
use ratering::gui::app::AppModel;
use ratering::gui::ring::State;
use ratering::sys::runtime;
use relm4::prelude::*;

fn main() {
    env_logger::init();

    let config = config::load_or_setup();
    let state = State::new(config.size);

    // frames beyond this are dropped rather than queued
    let (events_tx, events_rx) = async_channel::bounded(256);
    let (commands_tx, commands_rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(events_tx, commands_tx.clone(), commands_rx);

    let app = RelmApp::new("org.troia.ratering");

    app.run::<AppModel>((state, commands_tx, events_rx));
}
