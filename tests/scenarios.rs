use atmega_stopwatch::rtos::{Scheduler, SharedScheduler, SweepPolicy};
use atmega_stopwatch::serial::{FlowChannel, FlowState, Watermarks, XOFF, XON};
use atmega_stopwatch::storage::{ByteStorage, Migration, PersistedConfig};
use embedded_hal_mock::serial::{Mock, Transaction};
use std::convert::Infallible;
use std::thread;
use std::time::Duration;

fn increment(counter: &mut u32) {
    *counter += 1;
}

#[test]
fn twenty_tick_timer_over_forty_ticks() {
    let mut scheduler = Scheduler::<u32, 2>::new();
    let mut counter = 0;
    scheduler.declare(0, 20, increment).unwrap();
    scheduler.start(0).unwrap();

    for _ in 0..39 {
        scheduler.on_tick(&mut counter);
    }
    assert_eq!(counter, 1);

    scheduler.on_tick(&mut counter);
    assert_eq!(counter, 2);
    assert_eq!(scheduler.ticks(), 40);
}

#[test]
fn polled_and_interrupt_sweeps_agree_when_polled_every_tick() {
    let isr = SharedScheduler::<u32, 2>::new(SweepPolicy::InInterrupt);
    let polled = SharedScheduler::<u32, 2>::new(SweepPolicy::Polled);
    let (mut a, mut b) = (0, 0);
    for shared in [&isr, &polled] {
        shared.with(|s| {
            s.declare(1, 7, increment).unwrap();
            s.start(1).unwrap();
        });
    }

    for _ in 0..100 {
        critical_section::with(|cs| {
            isr.on_interrupt(cs, &mut a);
            polled.on_interrupt(cs, &mut b);
        });
        critical_section::with(|cs| polled.poll(cs, &mut b));
    }
    assert_eq!(a, 14);
    assert_eq!(a, b);
}

#[test]
fn pause_sent_once_at_26_of_32() {
    let channel = FlowChannel::<_, 32>::new(Mock::new(&[Transaction::write(XOFF)]), Watermarks::DEFAULT);

    for i in 1..=25u8 {
        channel.receive_byte(b'0' + i % 10).unwrap();
        assert!(!channel.pause_sent(), "paused early at {}", i);
    }
    channel.receive_byte(b'x').unwrap();
    assert!(channel.pause_sent());

    // further pushes up to capacity do not repeat the pause
    for _ in 0..6 {
        channel.receive_byte(b'y').unwrap();
    }
    assert_eq!(channel.len(), 32);
    channel.free().done();
}

#[test]
fn blocking_receive_waits_for_interrupt() {
    let channel = FlowChannel::<_, 32>::new(Mock::<u8>::new(&[]), Watermarks::DEFAULT);

    thread::scope(|s| {
        s.spawn(|| {
            thread::sleep(Duration::from_millis(20));
            channel.receive_byte(b'k').unwrap();
        });
        assert_eq!(channel.receive_decoded_byte(), Ok(b'k'));
    });
    channel.free().done();
}

#[test]
fn blocking_transmit_waits_for_resume() {
    let channel = FlowChannel::<_, 32>::new(Mock::new(&[Transaction::write(b'A')]), Watermarks::DEFAULT);
    channel.receive_byte(XOFF).unwrap();
    assert_eq!(channel.permission(), FlowState::Paused);

    thread::scope(|s| {
        s.spawn(|| {
            thread::sleep(Duration::from_millis(20));
            channel.receive_byte(XON).unwrap();
        });
        channel.transmit_byte(b'A').unwrap();
    });
    assert_eq!(channel.permission(), FlowState::Ready);
    channel.free().done();
}

struct Eeprom([u8; 16]);

impl ByteStorage for Eeprom {
    type Error = Infallible;

    fn read_byte(&mut self, addr: u16) -> Result<u8, Infallible> {
        Ok(self.0[addr as usize])
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Infallible> {
        self.0[addr as usize] = value;
        Ok(())
    }
}

#[test]
fn migration_survives_two_boots() {
    let mut eeprom = Eeprom([0xFF; 16]);
    eeprom.0[0] = 6;

    let first = PersistedConfig::new(&mut eeprom, 0, 6).migrate();
    assert_eq!(first, Ok(Migration::Applied(1)));

    let second = PersistedConfig::new(&mut eeprom, 0, 6).migrate();
    assert_eq!(second, Ok(Migration::AlreadyDone));
    assert_eq!(eeprom.0[0], 1);
}
