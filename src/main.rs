#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
use panic_halt as _;

#[cfg(target_arch = "avr")]
use atmega_stopwatch::{
    application::{Application, Stopwatch},
    config::*,
    drivers::SerialConsole,
    hal::{Eeprom, LedBar, TickTimer, Usart0},
    logger,
    rtos::SharedScheduler,
    serial::FlowChannel,
    storage::PersistedConfig,
};
#[cfg(target_arch = "avr")]
use core::cell::RefCell;
#[cfg(target_arch = "avr")]
use critical_section::Mutex;

// Shared between the interrupt handlers and the main loop
#[cfg(target_arch = "avr")]
static CHANNEL: FlowChannel<Usart0, RX_BUFFER_SIZE> = FlowChannel::new(Usart0::new(), RX_WATERMARKS);
#[cfg(target_arch = "avr")]
static TIMERS: SharedScheduler<Stopwatch, TIMER_SLOTS> = SharedScheduler::new(SWEEP_POLICY);
#[cfg(target_arch = "avr")]
static STOPWATCH: Mutex<RefCell<Stopwatch>> = Mutex::new(RefCell::new(Stopwatch::new()));
#[cfg(target_arch = "avr")]
static LEDS: Mutex<RefCell<Option<LedBar>>> = Mutex::new(RefCell::new(None));

#[cfg(target_arch = "avr")]
#[avr_device::entry]
fn main() -> ! {
    Usart0::new().init(UART_UBRR);
    let _tick = TickTimer::new(TICK_PRESCALER, TICK_COMPARE);
    critical_section::with(|cs| LEDS.borrow_ref_mut(cs).replace(LedBar::new()));

    // Enable interrupts globally
    unsafe { avr_device::interrupt::enable() };

    let mut app = Application::new(
        SerialConsole::new(&CHANNEL),
        &TIMERS,
        &STOPWATCH,
        PersistedConfig::new(Eeprom::new(), START_TIME_ADDR, FACTORY_START_TIME),
    );
    let mut console = SerialConsole::new(&CHANNEL);

    if app.boot().is_err() {
        let _ = logger::error(&mut console, "boot failed");
    }

    let mut reported_drops = 0u16;
    loop {
        critical_section::with(|cs| TIMERS.poll(cs, &mut STOPWATCH.borrow_ref_mut(cs)));

        if let Err(nb::Error::Other(_)) = app.try_run_once() {
            let _ = logger::error(&mut console, "command failed");
        }

        let dropped = CHANNEL.dropped();
        if dropped != reported_drops {
            reported_drops = dropped;
            let _ = logger::error(&mut console, "receive buffer overflow");
            let _ = logger::debug(&mut console, "dropped", dropped.min(0xFF) as u8);
        }
    }
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega128a)]
fn TIMER1_COMPA() {
    critical_section::with(|cs| {
        let mut stopwatch = STOPWATCH.borrow_ref_mut(cs);
        TIMERS.on_interrupt(cs, &mut stopwatch);
        if let Some(leds) = LEDS.borrow_ref_mut(cs).as_mut() {
            stopwatch.render(leds);
        }
    });
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega128a)]
fn USART0_RX() {
    let byte = Usart0::new().read_received();
    // Overflow is counted by the channel and reported from the main loop
    let _ = CHANNEL.receive_byte(byte);
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    eprintln!("atmega_stopwatch runs on the ATmega128; build with an avr target");
}
