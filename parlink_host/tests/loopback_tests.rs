//! Host↔device loopback integration tests.
//!
//! A device thread ticks the real processes over simulated converters
//! while the host issues commands through `HostLink` on the test
//! thread — the full protocol end to end: command write, busy mark,
//! completion poll, result read, voltage scaling.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use parlink_common::bank::SharedParamBank;
use parlink_common::config::DoneSlot;
use parlink_device::process::{DuplexProcess, MeasureProcess};
use parlink_device::sim::SimBus;
use parlink_device::tick::TickDriver;
use parlink_host::link::{HostError, HostLink};
use parlink_host::scale::VoltageScale;

/// One DAC step on a 16-bit ±10 V converter; the loopback is exact up
/// to the host-side rounding of volts to the nearest code.
const DAC_LSB_VOLTS: f64 = 20.0 / 65536.0;

struct DeviceUnderTest {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl DeviceUnderTest {
    /// Spawn a device thread running both processes over a loopback bus.
    fn spawn(bank: SharedParamBank, done_slot: DoneSlot) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();
        let handle = std::thread::spawn(move || {
            let bus = SimBus::new();
            let mut driver = TickDriver::new(Duration::from_micros(30));
            driver.install(Box::new(MeasureProcess::new(bus.adc(), done_slot)));
            driver.install(Box::new(DuplexProcess::new(bus.adc(), bus.dac())));
            driver.run(&bank, &r);
        });
        Self { running, handle }
    }

    fn stop(self) {
        self.running.store(false, Ordering::SeqCst);
        self.handle.join().unwrap();
    }
}

#[test]
fn set_voltage_loops_back_through_measure() {
    let bank = SharedParamBank::new();
    let device = DeviceUnderTest::spawn(bank.clone(), DoneSlot::Par5);
    let link = HostLink::new(bank, DoneSlot::Par5);

    link.set_voltage(2, 2.5).unwrap();
    let volts = link.read_voltage(2).unwrap();
    assert!((volts - 2.5).abs() <= DAC_LSB_VOLTS, "read back {volts}");

    device.stop();
}

#[test]
fn set_and_measure_follows_the_output() {
    let bank = SharedParamBank::new();
    let device = DeviceUnderTest::spawn(bank.clone(), DoneSlot::Par5);
    let link = HostLink::new(bank, DoneSlot::Par5);

    for volts in [-7.25, -0.015, 0.0, 3.75, 9.5] {
        let back = link.set_and_measure(1, 1, volts).unwrap();
        assert!((back - volts).abs() <= DAC_LSB_VOLTS, "{volts} → {back}");
    }

    device.stop();
}

#[test]
fn duplex_measure_observes_driven_channel() {
    let bank = SharedParamBank::new();
    let device = DeviceUnderTest::spawn(bank.clone(), DoneSlot::Par5);
    let link = HostLink::new(bank, DoneSlot::Par5);

    link.set_voltage(3, -4.0).unwrap();
    let sample = link.measure_via_duplex(3).unwrap();
    let adc = VoltageScale::ADC_18BIT;
    let volts = adc.to_volts(adc.from_sample(sample));
    assert!((volts - (-4.0)).abs() <= DAC_LSB_VOLTS, "read back {volts}");

    device.stop();
}

#[test]
fn alternate_done_wiring_completes() {
    let bank = SharedParamBank::new();
    let device = DeviceUnderTest::spawn(bank.clone(), DoneSlot::Par6);
    let link = HostLink::new(bank, DoneSlot::Par6);

    let volts = link.read_voltage(1).unwrap();
    // Nothing driven yet: the loopback idles at mid-scale, 0 V.
    assert!(volts.abs() <= DAC_LSB_VOLTS, "idle read {volts}");

    device.stop();
}

#[test]
fn unknown_channel_faults_through_the_protocol() {
    let bank = SharedParamBank::new();
    let device = DeviceUnderTest::spawn(bank.clone(), DoneSlot::Par5);
    let link = HostLink::new(bank, DoneSlot::Par5);

    // The simulated bus has 8 channels; channel 99 answers nothing.
    assert_eq!(link.measure(99), Err(HostError::ConversionFault));

    device.stop();
}
