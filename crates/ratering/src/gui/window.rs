use gtk4 as gtk;
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};

/// Gap between the badge and the screen corner.
pub const SCREEN_MARGIN: i32 = 24;

/// Pins the badge to the top-right corner below normal windows.
pub fn init_layer_shell(window: &gtk::ApplicationWindow) {
    window.init_layer_shell();
    window.set_layer(Layer::Bottom);
    window.set_namespace(Some("ratering"));
    window.set_exclusive_zone(0);
    for (edge, anchored) in [
        (Edge::Top, true),
        (Edge::Right, true),
        (Edge::Bottom, false),
        (Edge::Left, false),
    ] {
        window.set_anchor(edge, anchored);
        if anchored {
            window.set_margin(edge, SCREEN_MARGIN);
        }
    }
    window.set_keyboard_mode(KeyboardMode::OnDemand);
}
