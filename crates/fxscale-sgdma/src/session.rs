//! Accelerator transfer session
//!
//! One [`TransferSession::scale`] call walks the state machine
//!
//! ```text
//! Idle -> Configuring -> Streaming -> Completing -> Idle
//! ```
//!
//! - **Configuring**: plan the scale exactly like the software path,
//!   allocate the output raster, map both rasters on the bus, build both
//!   descriptor chains and program the accelerator registers.
//! - **Streaming**: start the receive engine, then the transmit engine. A
//!   refused kickoff is logged and streaming continues; the wait below is
//!   what decides the outcome.
//! - **Completing**: once both completion flags are set (transmit first),
//!   clear them, stop both engines, reset the accelerator and release the
//!   chains and bus mappings.
//!
//! Without a configured timeout the wait never gives up, so an
//! accelerator that never completes hangs the caller.

use crate::bus::BusMap;
use crate::chain::{Direction, build_receive_chain, build_transmit_chain};
use crate::regs::{AcceleratorConfig, AcceleratorRegisters, CTL_RESET, SgdmaEngine, offset};
use crate::signal::CompletionSignal;
use crate::{DescriptorChain, SgdmaResult};
use fxscale_core::Raster;
use fxscale_transform::ScalePlan;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Environment variable holding the completion wait bound in milliseconds
pub const WAIT_TIMEOUT_ENV: &str = "FXSCALE_WAIT_TIMEOUT_MS";

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Configuring,
    Streaming,
    Completing,
}

/// Session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig {
    /// Upper bound on the completion wait; `None` waits forever.
    pub wait_timeout: Option<Duration>,
}

impl SessionConfig {
    /// Read the configuration from the environment.
    ///
    /// `FXSCALE_WAIT_TIMEOUT_MS` sets the wait bound; unset, unparsable or
    /// zero leaves the wait unbounded.
    pub fn from_env() -> Self {
        Self::default().with_wait_timeout(parse_timeout_ms(
            std::env::var(WAIT_TIMEOUT_ENV).ok().as_deref(),
        ))
    }

    /// Set the completion wait bound.
    pub fn with_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.wait_timeout = timeout;
        self
    }
}

fn parse_timeout_ms(value: Option<&str>) -> Option<Duration> {
    let raw = value?.trim();
    match raw.parse::<u64>() {
        Ok(0) => None,
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            log::warn!("ignoring {}={:?}: not a millisecond count", WAIT_TIMEOUT_ENV, raw);
            None
        }
    }
}

/// Bus regions held for the duration of one transfer
struct BusLease<'a> {
    bus: &'a BusMap,
    regions: Vec<u32>,
}

impl<'a> BusLease<'a> {
    fn new(bus: &'a BusMap) -> Self {
        BusLease {
            bus,
            regions: Vec::with_capacity(4),
        }
    }

    fn hold(&mut self, addr: u32) -> u32 {
        self.regions.push(addr);
        addr
    }

    /// Map `raster`, holding the region only if this lease created it.
    fn hold_raster(&mut self, raster: &Raster) -> SgdmaResult<u32> {
        let (addr, created) = self.bus.map_raster_tracked(raster)?;
        if created {
            self.regions.push(addr);
        }
        Ok(addr)
    }
}

impl Drop for BusLease<'_> {
    fn drop(&mut self) {
        for addr in self.regions.drain(..).rev() {
            self.bus.unmap(addr);
        }
    }
}

/// Drives one accelerator and its two streaming engines
pub struct TransferSession<R, E> {
    regs: R,
    tx: E,
    rx: E,
    bus: Arc<BusMap>,
    signal: CompletionSignal,
    config: SessionConfig,
    state: SessionState,
}

impl<R: AcceleratorRegisters, E: SgdmaEngine> TransferSession<R, E> {
    /// Create a session and install the completion callbacks on both engines.
    pub fn new(regs: R, mut tx: E, mut rx: E, bus: Arc<BusMap>, config: SessionConfig) -> Self {
        let signal = CompletionSignal::new();
        tx.register_callback(signal.notifier(Direction::Transmit));
        rx.register_callback(signal.notifier(Direction::Receive));
        TransferSession {
            regs,
            tx,
            rx,
            bus,
            signal,
            config,
            state: SessionState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Bus the session maps rasters and chains on.
    pub fn bus(&self) -> &Arc<BusMap> {
        &self.bus
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Transmit and receive engines, in that order.
    pub fn engines_mut(&mut self) -> (&mut E, &mut E) {
        (&mut self.tx, &mut self.rx)
    }

    /// Scale `input` by `(sx, sy)` on the accelerator.
    ///
    /// The output has the same dimensions as
    /// [`fxscale_transform::scale_bilinear`] produces for the same input.
    ///
    /// # Errors
    ///
    /// - scale factor and dimension errors from planning
    /// - [`crate::SgdmaError::RegisterOverflow`] for sources wider or
    ///   taller than the 16-bit registers
    /// - [`crate::SgdmaError::Bus`] if the bus cannot map the transfer
    /// - [`crate::SgdmaError::Timeout`] if a wait bound is configured and
    ///   completion does not arrive in time; both engines are stopped
    ///   before returning
    pub fn scale(&mut self, input: &Raster, sx: f32, sy: f32) -> SgdmaResult<Raster> {
        let result = self.run(input, sx, sy);
        self.enter(SessionState::Idle);
        result
    }

    fn enter(&mut self, next: SessionState) {
        if self.state != next {
            log::debug!("session {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn run(&mut self, input: &Raster, sx: f32, sy: f32) -> SgdmaResult<Raster> {
        self.enter(SessionState::Configuring);
        let started = Instant::now();
        let plan = ScalePlan::new(input.height(), input.width(), sx, sy)?;
        let registers = AcceleratorConfig::from_plan(&plan)?;
        let output = Raster::new(plan.out_height, plan.out_width)?;

        let bus = Arc::clone(&self.bus);
        let mut lease = BusLease::new(&bus);
        lease.hold_raster(input)?;
        lease.hold_raster(&output)?;
        let mut tx_chain = build_transmit_chain(&bus, input)?;
        lease.hold(tx_chain.head_address());
        let mut rx_chain = build_receive_chain(&bus, &output)?;
        lease.hold(rx_chain.head_address());
        registers.program(&self.regs);

        self.enter(SessionState::Streaming);
        self.signal.clear();
        if let Err(e) = self.rx.start(&rx_chain) {
            log::warn!("{}: receive chain kickoff failed: {}", self.rx.name(), e);
        }
        if let Err(e) = self.tx.start(&tx_chain) {
            log::warn!("{}: transmit chain kickoff failed: {}", self.tx.name(), e);
        }
        let waited = self.signal.wait_both(self.config.wait_timeout);

        self.enter(SessionState::Completing);
        self.signal.clear();
        self.tx.stop();
        self.rx.stop();
        self.regs.write_u16(offset::CTL, CTL_RESET);
        waited?;

        for chain in [&mut tx_chain, &mut rx_chain] {
            report_write_back(&bus, chain);
        }
        log::info!(
            "accelerator scaled {}x{} -> {}x{} in {:?}",
            plan.input_height,
            plan.input_width,
            plan.out_height,
            plan.out_width,
            started.elapsed()
        );
        Ok(output)
    }
}

fn report_write_back(bus: &BusMap, chain: &mut DescriptorChain) {
    if let Err(e) = chain.refresh(bus) {
        log::warn!("could not read back {} chain: {}", chain.direction(), e);
        return;
    }
    let errors = chain.error_count();
    if errors > 0 {
        log::warn!(
            "{} chain: {} of {} descriptors report errors",
            chain.direction(),
            errors,
            chain.transfer_count()
        );
    }
    log::debug!(
        "{} chain: {} of {} descriptors completed",
        chain.direction(),
        chain.completed_count(),
        chain.transfer_count()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SgdmaError;
    use crate::regs::CompletionCallback;
    use std::sync::Mutex;

    type EventLog = Arc<Mutex<Vec<String>>>;

    struct MockRegisters {
        log: EventLog,
    }

    impl AcceleratorRegisters for MockRegisters {
        fn write_u8(&self, offset: usize, value: u8) {
            self.log
                .lock()
                .unwrap()
                .push(format!("reg {offset:#x}={value}"));
        }

        fn write_u16(&self, offset: usize, value: u16) {
            self.log
                .lock()
                .unwrap()
                .push(format!("reg {offset:#x}={value}"));
        }

        fn read_u16(&self, _offset: usize) -> u16 {
            0
        }
    }

    /// Completes instantly on start; `refuse` makes start report Busy
    /// after completing anyway.
    struct MockEngine {
        name: &'static str,
        refuse: bool,
        complete: bool,
        callback: Option<CompletionCallback>,
        log: EventLog,
    }

    impl MockEngine {
        fn new(name: &'static str, log: &EventLog) -> Self {
            MockEngine {
                name,
                refuse: false,
                complete: true,
                callback: None,
                log: Arc::clone(log),
            }
        }
    }

    impl SgdmaEngine for MockEngine {
        fn register_callback(&mut self, callback: CompletionCallback) {
            self.callback = Some(callback);
        }

        fn start(&mut self, chain: &DescriptorChain) -> SgdmaResult<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("start {} {}", self.name, chain.direction()));
            if self.complete {
                if let Some(cb) = &self.callback {
                    cb();
                }
            }
            if self.refuse {
                return Err(SgdmaError::Busy {
                    engine: self.name.to_string(),
                });
            }
            Ok(())
        }

        fn stop(&mut self) {
            self.log.lock().unwrap().push(format!("stop {}", self.name));
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn session(log: &EventLog, config: SessionConfig) -> TransferSession<MockRegisters, MockEngine> {
        TransferSession::new(
            MockRegisters {
                log: Arc::clone(log),
            },
            MockEngine::new("tx", log),
            MockEngine::new("rx", log),
            Arc::new(BusMap::new(0x1000)),
            config,
        )
    }

    #[test]
    fn test_protocol_order() {
        let log = EventLog::default();
        let mut s = session(&log, SessionConfig::default());
        let input = Raster::new(4, 4).unwrap();
        let out = s.scale(&input, 2.0, 2.0).unwrap();
        assert_eq!(out.dimensions(), (8, 8));
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "reg 0x6=4",
                "reg 0x8=4",
                "reg 0x2=2048",
                "reg 0x4=2048",
                "reg 0x0=64",
                "reg 0x1=64",
                "start rx receive",
                "start tx transmit",
                "stop tx",
                "stop rx",
                "reg 0xa=2",
            ]
        );
        assert_eq!(s.bus().region_count(), 0);
    }

    #[test]
    fn test_refused_kickoff_is_not_fatal() {
        let log = EventLog::default();
        let mut s = session(&log, SessionConfig::default());
        s.rx.refuse = true;
        let input = Raster::new(3, 5).unwrap();
        let out = s.scale(&input, 1.0, 1.0).unwrap();
        assert_eq!(out.dimensions(), (3, 5));
        assert!(log.lock().unwrap().iter().any(|e| e == "start tx transmit"));
    }

    #[test]
    fn test_timeout_still_stops_engines() {
        let log = EventLog::default();
        let config = SessionConfig::default().with_wait_timeout(Some(Duration::from_millis(20)));
        let mut s = session(&log, config);
        s.rx.complete = false;
        let input = Raster::new(2, 2).unwrap();
        let err = s.scale(&input, 1.0, 1.0).unwrap_err();
        assert!(matches!(
            err,
            SgdmaError::Timeout {
                direction: Direction::Receive,
                ..
            }
        ));
        let log = log.lock().unwrap();
        assert!(log.iter().any(|e| e == "stop tx"));
        assert!(log.iter().any(|e| e == "stop rx"));
        assert_eq!(log.last().map(String::as_str), Some("reg 0xa=2"));
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.bus().region_count(), 0);
    }

    #[test]
    fn test_planning_error_leaves_session_idle() {
        let log = EventLog::default();
        let mut s = session(&log, SessionConfig::default());
        let input = Raster::new(2, 2).unwrap();
        assert!(matches!(
            s.scale(&input, 0.0, 1.0),
            Err(SgdmaError::Transform(_))
        ));
        assert_eq!(s.state(), SessionState::Idle);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_register_overflow_before_streaming() {
        let log = EventLog::default();
        let mut s = session(&log, SessionConfig::default());
        let input = Raster::new(1, 70_000).unwrap();
        assert!(matches!(
            s.scale(&input, 1.0, 1.0),
            Err(SgdmaError::RegisterOverflow { field: "WIDTH", .. })
        ));
        assert_eq!(s.bus().region_count(), 0);
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout_ms(None), None);
        assert_eq!(parse_timeout_ms(Some("0")), None);
        assert_eq!(parse_timeout_ms(Some("abc")), None);
        assert_eq!(
            parse_timeout_ms(Some(" 250 ")),
            Some(Duration::from_millis(250))
        );
    }
}
