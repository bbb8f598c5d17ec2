//! Fixed-capacity registry of sensor driver instances.
//!
//! The slot table is an arena of [`SENSOR_SLOT_MAX`] positions. Identity
//! lives in the [`SensorId`], never in the position: identifiers are
//! issued monotonically starting at 1 and are never reused, while a freed
//! position is eligible for the next registration. A caller holding a
//! stale identifier therefore deterministically gets
//! [`SensorError::Invalid`] instead of silently reaching whatever device
//! happens to occupy the slot now.
//!
//! The table is shared between the scheduler task and any thread doing
//! direct register/unregister calls (startup, provisioning). Every
//! operation takes the mutex, finishes its table work including the
//! driver call, and releases it; no await point ever holds the lock.

use core::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use heapless::Vec;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{SensorError, SensorResult};
use crate::sensorif::driver::{AccessMode, Reading, SensorDriver};

/// Number of slots in the table.
pub const SENSOR_SLOT_MAX: usize = 5;

/// Stable handle distinguishing registrations over time.
///
/// Lives in a 1-byte domain (the inbound queue item format); 0 is
/// reserved as "invalid/unspecified".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SensorId(u8);

impl SensorId {
    /// The reserved "no sensor" value.
    pub const INVALID: SensorId = SensorId(0);

    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One arena position: the driver it holds, the identifier under which it
/// was registered, and the most recent reading obtained through it.
struct Slot {
    id: SensorId,
    valid: bool,
    driver: Box<dyn SensorDriver>,
    last_reading: Option<Reading>,
}

/// The backing storage. `next_id` is a u16 so that id 255 is issuable and
/// "previously issued" stays decidable at the end of the u8 domain.
struct SlotTable {
    slots: [Option<Slot>; SENSOR_SLOT_MAX],
    next_id: u16,
    count: u8,
}

impl SlotTable {
    const fn new() -> Self {
        const EMPTY: Option<Slot> = None;
        Self {
            slots: [EMPTY; SENSOR_SLOT_MAX],
            next_id: 1,
            count: 0,
        }
    }

    /// Whether this identifier has ever been issued.
    fn issued(&self, id: SensorId) -> bool {
        id.is_valid() && u16::from(id.raw()) < self.next_id
    }

    /// Resolve an identifier to its currently-valid slot.
    ///
    /// Scans the whole table; "not found" is only concluded against the
    /// monotonic id horizon, never from a partial scan.
    fn lookup(&mut self, id: SensorId) -> SensorResult<&mut Slot> {
        if !id.is_valid() {
            return Err(SensorError::InvalidArgs);
        }
        let issued = self.issued(id);
        match self.slots.iter_mut().flatten().find(|s| s.id == id) {
            Some(slot) if slot.valid => Ok(slot),
            // Still in the table but unregistered.
            Some(_) => Err(SensorError::Invalid),
            // Issued once, slot since reused: the registration is gone.
            None if issued => Err(SensorError::Invalid),
            None => Err(SensorError::NotFound),
        }
    }

    /// Index of the first position eligible for a new registration.
    fn free_index(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| !s.as_ref().is_some_and(|s| s.valid))
    }
}

/// Register/unregister/read/write operations over the shared slot table.
pub struct Registry {
    table: Mutex<SlotTable>,
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(SlotTable::new()),
        }
    }

    /// Lock the table. A panicking driver poisons the mutex but cannot
    /// leave the table mid-mutation, so the guard is recovered.
    fn table(&self) -> MutexGuard<'_, SlotTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a device, returning its freshly issued identifier.
    ///
    /// The first invalid slot in table order is used. The driver's
    /// `init()` runs under the registration; if it fails, the slot stays
    /// free and the valid count untouched, but the identifier is still
    /// consumed, so issued identifiers stay strictly increasing.
    pub fn register(&self, mut driver: Box<dyn SensorDriver>) -> SensorResult<SensorId> {
        let mut t = self.table();
        let Some(index) = t.free_index() else {
            return Err(SensorError::OverCapacity);
        };
        if t.next_id > u16::from(u8::MAX) {
            // 255 registrations over the process lifetime: the 1-byte
            // identifier domain is spent and ids are never recycled.
            return Err(SensorError::OverCapacity);
        }
        let id = SensorId::new(t.next_id as u8);
        t.next_id += 1;

        if let Err(e) = driver.init() {
            warn!("sensorif: init failed for sensor {id}: {e}");
            return Err(e);
        }

        t.slots[index] = Some(Slot {
            id,
            valid: true,
            driver,
            last_reading: None,
        });
        t.count += 1;
        info!("sensorif: registered sensor {id} in slot {index}");
        Ok(id)
    }

    /// Unregister a device by identifier.
    ///
    /// Unregistering an already-unregistered identifier (including one
    /// whose slot has since been reused) succeeds as a no-op. The
    /// driver's `shutdown()` result is surfaced, but the slot is freed
    /// and the count decremented regardless.
    pub fn unregister(&self, id: SensorId) -> SensorResult<()> {
        if !id.is_valid() {
            return Err(SensorError::InvalidArgs);
        }
        let mut t = self.table();
        let issued = t.issued(id);
        match t.slots.iter_mut().flatten().find(|s| s.id == id) {
            Some(slot) if slot.valid => {
                slot.valid = false;
                let ret = slot.driver.shutdown();
                t.count -= 1;
                info!("sensorif: unregistered sensor {id}");
                ret
            }
            Some(_) => Ok(()),
            None if issued => Ok(()),
            None => Err(SensorError::NotFound),
        }
    }

    /// Command-driven read. Delegates to the device's `read(cmd)` and
    /// latches the result as the slot's last reading.
    pub fn read(&self, id: SensorId, cmd: &[u8]) -> SensorResult<Reading> {
        let mut t = self.table();
        let slot = t.lookup(id)?;
        let reading = slot.driver.read(cmd)?;
        slot.last_reading = Some(reading.clone());
        Ok(reading)
    }

    /// Parameterless read (idle-sweep path). Latches like [`Self::read`].
    pub fn read_default(&self, id: SensorId) -> SensorResult<Reading> {
        let mut t = self.table();
        let slot = t.lookup(id)?;
        let reading = slot.driver.read_default()?;
        slot.last_reading = Some(reading.clone());
        Ok(reading)
    }

    /// Write opaque configuration data to a device.
    ///
    /// Rejected with `InvalidArgs` before reaching the driver when the
    /// device was registered read-only.
    pub fn write(&self, id: SensorId, args: &[u8]) -> SensorResult<()> {
        let mut t = self.table();
        let slot = t.lookup(id)?;
        if slot.driver.descriptor().mode == AccessMode::ReadOnly {
            return Err(SensorError::InvalidArgs);
        }
        slot.driver.write(args)
    }

    /// The most recent reading latched for a device, if any yet.
    pub fn last_reading(&self, id: SensorId) -> SensorResult<Option<Reading>> {
        let mut t = self.table();
        let slot = t.lookup(id)?;
        Ok(slot.last_reading.clone())
    }

    /// Number of currently valid registrations.
    pub fn count(&self) -> usize {
        usize::from(self.table().count)
    }

    pub const fn capacity(&self) -> usize {
        SENSOR_SLOT_MAX
    }

    /// Identifiers of all valid slots, in table (registration-slot)
    /// order, which is the order an idle sweep visits them.
    pub fn valid_ids(&self) -> Vec<SensorId, SENSOR_SLOT_MAX> {
        self.table()
            .slots
            .iter()
            .flatten()
            .filter(|s| s.valid)
            .map(|s| s.id)
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensorif::driver::{Descriptor, SensorKind};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Scripted driver for exercising the table protocol.
    struct Probe {
        mode: AccessMode,
        init_result: SensorResult<()>,
        shutdown_result: SensorResult<()>,
        value: i32,
        writes: Arc<AtomicU32>,
        shutdowns: Arc<AtomicU32>,
    }

    impl Probe {
        fn new(value: i32) -> Self {
            Self {
                mode: AccessMode::ReadWrite,
                init_result: Ok(()),
                shutdown_result: Ok(()),
                value,
                writes: Arc::new(AtomicU32::new(0)),
                shutdowns: Arc::new(AtomicU32::new(0)),
            }
        }

        fn read_only(mut self) -> Self {
            self.mode = AccessMode::ReadOnly;
            self
        }

        fn failing_init(mut self) -> Self {
            self.init_result = Err(SensorError::Invalid);
            self
        }

        fn failing_shutdown(mut self) -> Self {
            self.shutdown_result = Err(SensorError::Invalid);
            self
        }
    }

    impl SensorDriver for Probe {
        fn descriptor(&self) -> Descriptor {
            Descriptor {
                mode: self.mode,
                kind: SensorKind::Single,
            }
        }

        fn init(&mut self) -> SensorResult<()> {
            self.init_result
        }

        fn shutdown(&mut self) -> SensorResult<()> {
            self.shutdowns.fetch_add(1, Ordering::Relaxed);
            self.shutdown_result
        }

        fn write(&mut self, _args: &[u8]) -> SensorResult<()> {
            self.writes.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        fn read(&mut self, cmd: &[u8]) -> SensorResult<Reading> {
            match cmd {
                [1] => Ok(Reading::single(self.value * 2)),
                _ => Err(SensorError::InvalidArgs),
            }
        }

        fn read_default(&mut self) -> SensorResult<Reading> {
            Ok(Reading::single(self.value))
        }
    }

    fn sid(raw: u8) -> SensorId {
        SensorId::new(raw)
    }

    #[test]
    fn ids_are_monotonic_from_one() {
        let reg = Registry::new();
        let a = reg.register(Box::new(Probe::new(1))).unwrap();
        let b = reg.register(Box::new(Probe::new(2))).unwrap();
        assert_eq!(a, sid(1));
        assert_eq!(b, sid(2));
    }

    #[test]
    fn capacity_is_enforced_without_mutation() {
        let reg = Registry::new();
        for i in 0..SENSOR_SLOT_MAX {
            reg.register(Box::new(Probe::new(i as i32))).unwrap();
        }
        assert_eq!(
            reg.register(Box::new(Probe::new(99))),
            Err(SensorError::OverCapacity)
        );
        assert_eq!(reg.count(), SENSOR_SLOT_MAX);
        // Freeing one slot makes room again, with a fresh id.
        reg.unregister(sid(3)).unwrap();
        let fresh = reg.register(Box::new(Probe::new(99))).unwrap();
        assert_eq!(fresh, sid(SENSOR_SLOT_MAX as u8 + 1));
        assert_eq!(reg.count(), SENSOR_SLOT_MAX);
    }

    #[test]
    fn freed_slot_is_reused_in_table_order() {
        let reg = Registry::new();
        let a = reg.register(Box::new(Probe::new(1))).unwrap();
        let b = reg.register(Box::new(Probe::new(2))).unwrap();
        let c = reg.register(Box::new(Probe::new(3))).unwrap();
        reg.unregister(b).unwrap();
        let d = reg.register(Box::new(Probe::new(4))).unwrap();
        // d landed in b's old position: sweep order is a, d, c.
        assert_eq!(reg.valid_ids().as_slice(), &[a, d, c][..]);
    }

    #[test]
    fn unregister_is_idempotent() {
        let reg = Registry::new();
        let probe = Probe::new(1);
        let shutdowns = probe.shutdowns.clone();
        let id = reg.register(Box::new(probe)).unwrap();
        reg.unregister(id).unwrap();
        assert_eq!(reg.count(), 0);
        // Second unregister: Ok, no double decrement, no second shutdown.
        reg.unregister(id).unwrap();
        assert_eq!(reg.count(), 0);
        assert_eq!(shutdowns.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn stale_id_is_rejected_after_slot_reuse() {
        let reg = Registry::new();
        let old = reg.register(Box::new(Probe::new(1))).unwrap();
        reg.unregister(old).unwrap();
        let new = reg.register(Box::new(Probe::new(2))).unwrap();
        assert_ne!(old, new);
        // The stale handle must never reach the new occupant.
        assert_eq!(reg.read(old, &[1]), Err(SensorError::Invalid));
        assert_eq!(reg.read_default(old), Err(SensorError::Invalid));
        assert_eq!(reg.write(old, &[0]), Err(SensorError::Invalid));
        // And unregistering it stays a no-op.
        reg.unregister(old).unwrap();
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn never_issued_id_is_not_found() {
        let reg = Registry::new();
        reg.register(Box::new(Probe::new(1))).unwrap();
        assert_eq!(reg.read_default(sid(200)), Err(SensorError::NotFound));
        assert_eq!(reg.unregister(sid(200)), Err(SensorError::NotFound));
    }

    #[test]
    fn zero_id_is_invalid_args_everywhere() {
        let reg = Registry::new();
        assert_eq!(reg.unregister(SensorId::INVALID), Err(SensorError::InvalidArgs));
        assert_eq!(reg.read(SensorId::INVALID, &[]), Err(SensorError::InvalidArgs));
        assert_eq!(reg.write(SensorId::INVALID, &[]), Err(SensorError::InvalidArgs));
        assert_eq!(reg.read_default(SensorId::INVALID), Err(SensorError::InvalidArgs));
    }

    #[test]
    fn init_failure_rolls_back_but_consumes_the_id() {
        let reg = Registry::new();
        assert_eq!(
            reg.register(Box::new(Probe::new(1).failing_init())),
            Err(SensorError::Invalid)
        );
        assert_eq!(reg.count(), 0);
        // The burned id is gone; the next registration gets id 2 and the
        // failed id reads as unregistered, not unknown.
        let next = reg.register(Box::new(Probe::new(2))).unwrap();
        assert_eq!(next, sid(2));
        assert_eq!(reg.read_default(sid(1)), Err(SensorError::Invalid));
    }

    #[test]
    fn write_to_read_only_device_never_reaches_driver() {
        let reg = Registry::new();
        let probe = Probe::new(1).read_only();
        let writes = probe.writes.clone();
        let id = reg.register(Box::new(probe)).unwrap();
        assert_eq!(reg.write(id, &[1, 2]), Err(SensorError::InvalidArgs));
        assert_eq!(writes.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn writable_device_accepts_writes() {
        let reg = Registry::new();
        let probe = Probe::new(1);
        let writes = probe.writes.clone();
        let id = reg.register(Box::new(probe)).unwrap();
        reg.write(id, &[1, 2]).unwrap();
        assert_eq!(writes.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn reads_latch_the_last_reading() {
        let reg = Registry::new();
        let id = reg.register(Box::new(Probe::new(5))).unwrap();
        assert_eq!(reg.last_reading(id).unwrap(), None);
        reg.read_default(id).unwrap();
        assert_eq!(reg.last_reading(id).unwrap(), Some(Reading::single(5)));
        reg.read(id, &[1]).unwrap();
        assert_eq!(reg.last_reading(id).unwrap(), Some(Reading::single(10)));
    }

    #[test]
    fn failed_read_does_not_clobber_the_latch() {
        let reg = Registry::new();
        let id = reg.register(Box::new(Probe::new(5))).unwrap();
        reg.read_default(id).unwrap();
        assert_eq!(reg.read(id, &[9]), Err(SensorError::InvalidArgs));
        assert_eq!(reg.last_reading(id).unwrap(), Some(Reading::single(5)));
    }

    #[test]
    fn shutdown_error_is_surfaced_but_slot_is_freed() {
        let reg = Registry::new();
        let id = reg
            .register(Box::new(Probe::new(1).failing_shutdown()))
            .unwrap();
        assert_eq!(reg.unregister(id), Err(SensorError::Invalid));
        assert_eq!(reg.count(), 0);
        assert!(reg.valid_ids().is_empty());
    }
}
