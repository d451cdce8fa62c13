//! Edge-source and long-press timer loops.
//!
//! These are regular `async fn`s, **not** Embassy `#[task]`s: Embassy
//! tasks cannot be generic, so firmware wraps each one in a thin task
//! with concrete pin types:
//!
//! ```ignore
//! #[embassy_executor::task]
//! async fn rotation_task(
//!     controller: &'static RotaryController,
//!     s1: Input<'static>,
//!     s2: Input<'static>,
//! ) {
//!     rotation_edge_task(controller, s1, s2).await
//! }
//! ```
//!
//! Pin errors are logged and the edge dropped; the loops never return.

use embassy_futures::select::{select, Either};
use embassy_time::{Instant, Timer};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

use crate::controller::RotaryController;

/// Watch the rotation line for falling edges and sample the companion
/// line on each one.
pub async fn rotation_edge_task<S1, S2>(
    controller: &RotaryController,
    mut rotation: S1,
    mut companion: S2,
) -> !
where
    S1: Wait,
    S2: InputPin,
{
    #[cfg(feature = "defmt")]
    defmt::info!("rotation edge task started");

    loop {
        if rotation.wait_for_falling_edge().await.is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("rotation line wait failed");
            continue;
        }
        let now = Instant::now();

        match companion.is_high() {
            Ok(level) => {
                controller.on_rotation_edge(now, level);
            }
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("companion line read failed; edge dropped");
            }
        }
    }
}

/// Watch the button line for edges in both directions. The level read
/// right after the edge decides press versus release.
///
/// With a button debounce window configured, the line is sampled again
/// once the window after each accepted edge has elapsed. A settled level
/// that differs from the accepted one is fed back as a new edge, so an
/// edge swallowed by the window can never leave a press outstanding.
pub async fn button_edge_task<SW>(controller: &RotaryController, mut button: SW) -> !
where
    SW: Wait + InputPin,
{
    #[cfg(feature = "defmt")]
    defmt::info!("button edge task started");

    let window = controller.config().button_debounce_window();

    loop {
        if button.wait_for_any_edge().await.is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("button line wait failed");
            continue;
        }
        let now = Instant::now();

        let Ok(mut accepted) = button.is_high() else {
            #[cfg(feature = "defmt")]
            defmt::warn!("button line read failed; edge dropped");
            continue;
        };
        if !controller.on_button_edge(now, accepted) || window.as_ticks() == 0 {
            continue;
        }

        loop {
            Timer::after(window).await;
            match button.is_high() {
                Ok(settled) if settled != accepted => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("button settled {}, replaying edge", settled);
                    if !controller.on_button_edge(Instant::now(), settled) {
                        break;
                    }
                    accepted = settled;
                }
                _ => break,
            }
        }
    }
}

/// Run long-press deadlines.
///
/// Sleeps until the current deadline and then offers it to the
/// controller. A deadline armed in the meantime replaces the one being
/// waited on, so at most one is ever outstanding. A deadline whose press
/// was already released simply loses the claim.
pub async fn long_press_task(controller: &RotaryController) -> ! {
    let mut pending = controller.next_deadline().await;

    loop {
        match select(Timer::at(pending.at), controller.next_deadline()).await {
            Either::First(()) => {
                controller.on_deadline(pending.press);
                pending = controller.next_deadline().await;
            }
            Either::Second(next) => pending = next,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
