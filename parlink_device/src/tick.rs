//! Timer simulation: periodic handler invocation and tick statistics.
//!
//! On hardware the handler is invoked by the coprocessor timer at a
//! fixed period and the core owns no loop. This module stands in for
//! that timer in tests and the demo binary: `TickDriver` paces on
//! absolute deadlines (drift-free), invokes every installed process
//! once per period, and records O(1) timing statistics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::info;

use parlink_common::bank::ParamBank;

use crate::process::Process;

/// Simulated duration of one native coprocessor clock unit.
///
/// The protocol itself only ever speaks in units; this mapping exists
/// so the simulation has a wall-clock period to pace on.
pub const UNIT_NS: u64 = 10;

/// Convert a handler period in native clock units to a wall-clock period.
#[inline]
pub fn period_from_delay(process_delay: u32) -> Duration {
    Duration::from_nanos(process_delay as u64 * UNIT_NS)
}

// ─── Tick Statistics ────────────────────────────────────────────────

/// O(1) per-tick timing statistics.
///
/// Updated every tick with no allocation.
#[derive(Debug, Clone)]
pub struct TickStats {
    /// Total ticks executed.
    pub tick_count: u64,
    /// Last tick duration [ns].
    pub last_tick_ns: u64,
    /// Minimum tick duration [ns].
    pub min_tick_ns: u64,
    /// Maximum tick duration [ns].
    pub max_tick_ns: u64,
    /// Running sum for average computation.
    pub sum_tick_ns: u64,
    /// Ticks that finished past their deadline.
    pub overruns: u64,
}

impl TickStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            tick_count: 0,
            last_tick_ns: 0,
            min_tick_ns: u64::MAX,
            max_tick_ns: 0,
            sum_tick_ns: 0,
            overruns: 0,
        }
    }

    /// Record a tick duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: u64) {
        self.tick_count += 1;
        self.last_tick_ns = duration_ns;
        if duration_ns < self.min_tick_ns {
            self.min_tick_ns = duration_ns;
        }
        if duration_ns > self.max_tick_ns {
            self.max_tick_ns = duration_ns;
        }
        self.sum_tick_ns += duration_ns;
    }

    /// Average tick time [ns] (returns 0 if no ticks).
    #[inline]
    pub fn avg_tick_ns(&self) -> u64 {
        if self.tick_count == 0 {
            0
        } else {
            self.sum_tick_ns / self.tick_count
        }
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tick Driver ────────────────────────────────────────────────────

/// Periodic driver invoking the installed processes once per period.
pub struct TickDriver {
    period: Duration,
    processes: Vec<Box<dyn Process>>,
    stats: TickStats,
}

impl TickDriver {
    /// Create a driver with the given tick period and no processes.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            processes: Vec::new(),
            stats: TickStats::new(),
        }
    }

    /// Install a process. Processes are ticked in installation order.
    pub fn install(&mut self, process: Box<dyn Process>) {
        info!(process = process.name(), "process installed");
        self.processes.push(process);
    }

    /// Number of installed processes.
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Tick statistics collected so far.
    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Run the init step of every installed process.
    pub fn init(&mut self) {
        for process in &mut self.processes {
            process.init();
        }
    }

    /// Execute one timed tick of every installed process.
    pub fn step(&mut self, bank: &dyn ParamBank) {
        let start = Instant::now();
        for process in &mut self.processes {
            process.tick(bank);
        }
        self.stats.record(start.elapsed().as_nanos() as u64);
    }

    /// Init once, then tick on absolute deadlines until `running`
    /// clears. Blocks the calling thread.
    pub fn run(&mut self, bank: &dyn ParamBank, running: &AtomicBool) {
        self.init();
        let mut deadline = Instant::now() + self.period;
        while running.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now < deadline {
                std::thread::sleep(deadline - now);
            }
            self.step(bank);
            deadline += self.period;
            // A late tick must not cause a burst of catch-up ticks.
            let now = Instant::now();
            if deadline < now {
                self.stats.overruns += 1;
                deadline = now + self.period;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlink_common::bank::SharedParamBank;
    use std::sync::Arc;

    struct CountingProcess {
        ticks: u64,
        inits: u64,
    }

    impl Process for CountingProcess {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn init(&mut self) {
            self.inits += 1;
        }

        fn tick(&mut self, _bank: &dyn ParamBank) {
            self.ticks += 1;
        }
    }

    #[test]
    fn stats_track_min_max_avg() {
        let mut stats = TickStats::new();
        stats.record(100);
        stats.record(300);
        stats.record(200);
        assert_eq!(stats.tick_count, 3);
        assert_eq!(stats.min_tick_ns, 100);
        assert_eq!(stats.max_tick_ns, 300);
        assert_eq!(stats.last_tick_ns, 200);
        assert_eq!(stats.avg_tick_ns(), 200);
    }

    #[test]
    fn empty_stats_average_is_zero() {
        assert_eq!(TickStats::new().avg_tick_ns(), 0);
    }

    #[test]
    fn period_from_delay_uses_unit_mapping() {
        assert_eq!(
            period_from_delay(3000),
            Duration::from_nanos(3000 * UNIT_NS)
        );
    }

    #[test]
    fn step_ticks_every_installed_process() {
        let bank = SharedParamBank::new();
        let mut driver = TickDriver::new(Duration::from_micros(30));
        driver.install(Box::new(CountingProcess { ticks: 0, inits: 0 }));
        driver.install(Box::new(CountingProcess { ticks: 0, inits: 0 }));
        driver.init();
        driver.step(&bank);
        driver.step(&bank);
        assert_eq!(driver.stats().tick_count, 2);
    }

    #[test]
    fn run_stops_when_flag_clears() {
        let bank = SharedParamBank::new();
        let mut driver = TickDriver::new(Duration::from_micros(10));
        driver.install(Box::new(CountingProcess { ticks: 0, inits: 0 }));

        let running = Arc::new(AtomicBool::new(true));
        let stop = running.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(5));
            stop.store(false, Ordering::SeqCst);
        });

        driver.run(&bank, &running);
        handle.join().unwrap();
        assert!(driver.stats().tick_count > 0);
    }
}
