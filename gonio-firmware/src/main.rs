//! Gonio - Goniometric Laser Rangefinder Firmware
//!
//! Two laser rangefinder modules sit on a hinged arm with an angle sensor
//! at the pivot. Measuring both ranges and the angle between the beams
//! gives the distance between the two points the lasers hit.
//!
//! The control loop runs on the thread executor and blocks inside the
//! drivers while waiting on the lasers; button edges are handled by tasks
//! on a higher-priority interrupt executor so they can preempt it.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::I2c;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use gonio_core::controller::Controller;
use gonio_core::traits::Side;
use gonio_drivers::rangefinder::LaserRangefinder;
use gonio_drivers::sensor::{AngleSensorDriver, Gain, Mcp3421, Resolution};
use gonio_drivers::storage::EepromCalibrationStore;
use gonio_hal::i2c::I2cConfig;
use gonio_hal::uart::UartConfig;
use gonio_hal_rp2040::{
    i2c, uart, BatteryAdc, ButtonInput, EmbassyClock, FlashEeprom, I2cMaster, LaserUart,
};

use crate::channels::{BUTTONS, SNAPSHOT};

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Static cells for UART buffers (must live forever)
static LEFT_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static LEFT_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RIGHT_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RIGHT_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Gonio firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Buttons first, so presses during the rest of start-up are not lost
    // Pin assignment is board-specific (measure: GPIO14, mode: GPIO15)
    let measure = ButtonInput::new(Input::new(p.PIN_14, Pull::Up));
    let mode = ButtonInput::new(Input::new(p.PIN_15, Pull::Up));

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high.spawn(tasks::button_task(measure, &BUTTONS.measure, "measure")).unwrap();
    high.spawn(tasks::button_task(mode, &BUTTONS.mode, "mode")).unwrap();

    // Laser modules, one UART each (left: GPIO0/1, right: GPIO4/5)
    let uart_config = uart::embassy_config(UartConfig::LASER_MODULE);

    let left_uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config.clone());
    let left_uart = left_uart.into_buffered(
        Irqs,
        LEFT_TX_BUF.init([0u8; 256]),
        LEFT_RX_BUF.init([0u8; 256]),
    );
    let right_uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, uart_config);
    let right_uart = right_uart.into_buffered(
        Irqs,
        RIGHT_TX_BUF.init([0u8; 256]),
        RIGHT_RX_BUF.init([0u8; 256]),
    );

    let timeouts = config::rangefinder_timeouts();
    let left = LaserRangefinder::new(
        Side::Left,
        LaserUart::new(left_uart),
        EmbassyClock,
        timeouts,
    );
    let right = LaserRangefinder::new(
        Side::Right,
        LaserUart::new(right_uart),
        EmbassyClock,
        timeouts,
    );

    info!("Laser UARTs initialized");

    // Angle ADC on I2C0 (SCL: GPIO17, SDA: GPIO16)
    let i2c_config = i2c::embassy_config(I2cConfig::STANDARD);
    let bus = I2c::new_blocking(p.I2C0, p.PIN_17, p.PIN_16, i2c_config);
    let mut angle_adc = Mcp3421::new(
        I2cMaster::new(bus),
        EmbassyClock,
        Resolution::Bits16,
        Gain::X1,
    )
    .with_timeout(config::CONVERSION_TIMEOUT_MS);
    if let Err(e) = angle_adc.init() {
        // Sampling reports the fault to the controller
        warn!("MCP3421 init failed: {}", e);
    }

    // Battery divider on ADC0 (GPIO26)
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let battery = BatteryAdc::new(adc, Channel::new_pin(p.PIN_26, Pull::None));

    let angle = AngleSensorDriver::new(angle_adc, battery, config::angle_sensor_config());

    info!("Angle sensor initialized");

    let storage = EepromCalibrationStore::new(FlashEeprom::new(p.FLASH));

    spawner.spawn(tasks::display_task()).unwrap();

    let mut controller = Controller::new(
        left,
        right,
        angle,
        storage,
        EmbassyClock,
        &BUTTONS,
        config::controller_config(),
    );

    info!("All tasks spawned, entering control loop");

    let period = Duration::from_millis(config::CONTROL_PERIOD_MS as u64);
    let mut last_state = controller.state();
    loop {
        let state = controller.step();
        if state != last_state {
            debug!("{} -> {}", last_state, state);
            last_state = state;
        }
        SNAPSHOT.signal(controller.snapshot());

        Timer::after(period).await;
    }
}
