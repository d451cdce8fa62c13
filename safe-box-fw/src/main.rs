//! safe-box-fw
//!
//! Front-panel input firmware for the electronic safe on the Raspberry Pi
//! Pico 2. Wires the rotary knob into the `safe-rotary` event subsystem:
//!
//! 1. The knob is turned: S1 falls, the rotation task samples S2 and the
//!    controller debounces, updates the position and publishes it.
//! 2. The knob is pressed: the button task sees the SW edge, the
//!    controller arms a long-press deadline and the deadline task waits on
//!    it. Whichever of release or deadline claims the press first decides
//!    `BTN_SHORT` versus `BTN_LONG`.
//! 3. The consumer task reads one event line at a time from the device
//!    (50 ms timeout per read) and logs it with the knob delta.
//!
//! The game, settings screen, RTC, OLED and buzzer are not driven here.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Input, Pin, Pull};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use safe_rotary::{
    button_edge_task, long_press_task, rotation_edge_task, PinAssignment, PinRegistry,
    PositionTracker, RotaryConfig, RotaryController, RotaryDevice, RotaryEvent,
};

// ---------------------------------------------------------------------------
// Boot block
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Written by the edge and deadline tasks, read by the consumer task.
static CONTROLLER: StaticCell<RotaryController> = StaticCell::new();

/// GPIO ownership for the lifetime of the firmware.
static PINS: PinRegistry = PinRegistry::new();

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Thin wrappers that monomorphise the generic loops so they can be
/// spawned as concrete Embassy tasks.
#[embassy_executor::task]
async fn rotation_task(
    controller: &'static RotaryController,
    s1: Input<'static>,
    s2: Input<'static>,
) {
    rotation_edge_task(controller, s1, s2).await
}

#[embassy_executor::task]
async fn button_task(controller: &'static RotaryController, sw: Input<'static>) {
    button_edge_task(controller, sw).await
}

#[embassy_executor::task]
async fn deadline_task(controller: &'static RotaryController) {
    long_press_task(controller).await
}

/// Reads event lines the way the application loop does: decode each line,
/// turn absolute positions into deltas.
#[embassy_executor::task]
async fn consumer_task(device: RotaryDevice<'static>) {
    info!("Consumer task started");

    let mut tracker = PositionTracker::new();
    let mut buf = [0u8; 32];

    loop {
        let n = match device.read(&mut buf).await {
            Ok(0) => continue,
            Ok(n) => n,
            Err(e) => {
                error!("Rotary read failed: {}", e);
                continue;
            }
        };

        match RotaryEvent::parse_line(&buf[..n]) {
            Ok(RotaryEvent::Rotation(position)) => {
                let delta = tracker.update(position);
                info!("Knob: position={}, delta={}", position, delta);
            }
            Ok(RotaryEvent::ButtonShort) => info!("Button: short"),
            Ok(RotaryEvent::ButtonLong) => info!("Button: long"),
            Err(e) => warn!("Unparseable event line: {}", e),
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("safe-box-fw starting");

    // —— Pin assignments ————————————————————————————————————————————————————
    // ENC_S1 → GP20  (p.PIN_20)  falling edge = one detent
    // ENC_S2 → GP21  (p.PIN_21)  sampled on S1 edge for direction
    // ENC_SW → GP16  (p.PIN_16)  active-low push-switch
    // ———————————————————————————————————————————————————————————————————————

    let config = RotaryConfig::default();
    let (s1_pin, s2_pin, sw_pin) = (p.PIN_20, p.PIN_21, p.PIN_16);

    let wired = PinAssignment {
        rotation: s1_pin.pin(),
        companion: s2_pin.pin(),
        button: sw_pin.pin(),
    };
    if let Err(e) = config.pins.check_wiring(&wired) {
        error!("Rotary wiring does not match configuration: {}", e);
        return;
    }

    let controller = CONTROLLER.init(RotaryController::new(config));

    // Claim pins before touching the hardware. Failure is fatal: nothing
    // is spawned and every claim made so far has already been released.
    let device = match RotaryDevice::open(controller, &PINS) {
        Ok(device) => device,
        Err(e) => {
            error!("Rotary startup failed: {}", e);
            return;
        }
    };

    let s1 = Input::new(s1_pin, Pull::Up);
    let s2 = Input::new(s2_pin, Pull::Up);
    let sw = Input::new(sw_pin, Pull::Up);

    // —— Spawn tasks ————————————————————————————————————————————————————————

    spawner.spawn(unwrap!(deadline_task(controller)));
    spawner.spawn(unwrap!(rotation_task(controller, s1, s2)));
    spawner.spawn(unwrap!(button_task(controller, sw)));
    spawner.spawn(unwrap!(consumer_task(device)));

    info!("All tasks spawned");
}
