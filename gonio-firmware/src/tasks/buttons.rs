//! Button edge tasks

use defmt::*;
use embassy_time::Instant;

use gonio_core::input::Button;
use gonio_hal::{Edge, EdgeInput, InputPin};
use gonio_hal_rp2040::ButtonInput;

/// Wait for presses on one button and record the debounced ones
///
/// Buttons pull low when pressed.
#[embassy_executor::task(pool_size = 2)]
pub async fn button_task(
    mut input: ButtonInput<'static>,
    button: &'static Button,
    name: &'static str,
) {
    info!("{} button task started", name);

    loop {
        input.wait_for_edge(Edge::Falling).await;
        // Debounce arithmetic wraps, so truncation is fine
        let now_ms = Instant::now().as_millis() as u32;
        if button.on_edge(now_ms, input.is_low()) {
            debug!("{} pressed", name);
        } else {
            trace!("{} bounce ignored", name);
        }
    }
}
