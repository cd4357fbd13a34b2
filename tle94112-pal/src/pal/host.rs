//! Timer for hosted targets (Raspberry Pi, Linux boards).

use crate::hw_trait::{Error, Result, Timer};
use std::thread;
use std::time::{Duration, Instant};

/// Timer backed by `std::time::Instant` and `thread::sleep`.
#[derive(Debug, Default)]
pub struct HostTimer {
    started_at: Option<Instant>,
    initialized: bool,
}

impl HostTimer {
    pub fn new() -> Self {
        Self::default()
    }

    fn sleep(&self, duration: Duration) -> Result<()> {
        if !self.initialized {
            return Err(Error::NotInitialized("timer"));
        }
        thread::sleep(duration);
        Ok(())
    }
}

impl Timer for HostTimer {
    fn init(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        self.started_at = None;
        self.initialized = false;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(Error::NotInitialized("timer"));
        }
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn elapsed(&mut self) -> Result<Duration> {
        Ok(self
            .started_at
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO))
    }

    fn stop(&mut self) -> Result<()> {
        self.started_at = None;
        Ok(())
    }

    fn delay_milli(&mut self, ms: u32) -> Result<()> {
        self.sleep(Duration::from_millis(ms.into()))
    }

    fn delay_micro(&mut self, us: u32) -> Result<()> {
        self.sleep(Duration::from_micros(us.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_near_zero_after_start() {
        let mut timer = HostTimer::new();
        timer.init().unwrap();
        timer.start().unwrap();
        assert!(timer.elapsed().unwrap() < Duration::from_millis(50));
    }

    #[test]
    fn delay_blocks_at_least_requested_time() {
        let mut timer = HostTimer::new();
        timer.init().unwrap();
        timer.start().unwrap();

        timer.delay_milli(10).unwrap();
        assert!(timer.elapsed().unwrap() >= Duration::from_millis(10));

        timer.delay_micro(500).unwrap();
        assert!(timer.elapsed().unwrap() >= Duration::from_micros(10_500));
    }

    #[test]
    fn delay_before_init_fails() {
        let mut timer = HostTimer::new();
        assert_eq!(timer.delay_milli(1), Err(Error::NotInitialized("timer")));
        assert_eq!(timer.elapsed().unwrap(), Duration::ZERO);
    }
}
