//! # Shared setpoints
//!
//! The commanded demand is handed from the control loop to the simulation
//! thread through this structure. Each field is an atomic, and a sequence
//! counter makes sure the reader never sees half of one demand mixed with
//! half of another.
//!
//! There must only ever be one writer (the control loop's drive client). The
//! reader retries if it overlaps with a write, the writer never waits.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::atomic::{fence, AtomicBool, AtomicU64, AtomicU8, Ordering};

use comms_if::eqpt::drive::{ChassisVelCmd, DriveDemand};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Last-write-wins demand shared between one writer and one reader.
#[derive(Debug, Default)]
pub struct SharedSetpoints {
    /// Odd while a write is in progress.
    seq: AtomicU64,

    kind: AtomicU8,
    vx_ms: AtomicU64,
    vy_ms: AtomicU64,
    omega_rads: AtomicU64,
    field_relative: AtomicBool,
    volts: AtomicU64,
}

/// A consistent copy of the shared setpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetpointSnapshot {
    pub kind: DemandKind,
    pub cmd: ChassisVelCmd,

    /// Units: volts
    pub volts: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandKind {
    Velocity,
    CharacterizeDrive,
    CharacterizeRotation,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DemandKind {
    fn to_u8(self) -> u8 {
        match self {
            DemandKind::Velocity => 0,
            DemandKind::CharacterizeDrive => 1,
            DemandKind::CharacterizeRotation => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => DemandKind::CharacterizeDrive,
            2 => DemandKind::CharacterizeRotation,
            _ => DemandKind::Velocity,
        }
    }
}

impl SharedSetpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new demand. Must only be called from the single writer.
    pub fn publish(&self, demand: &DriveDemand) {
        let (kind, cmd, volts) = match demand {
            DriveDemand::Velocity(c) => (DemandKind::Velocity, *c, 0.0),
            DriveDemand::CharacterizeDrive { volts } => {
                (DemandKind::CharacterizeDrive, ChassisVelCmd::zero(), *volts)
            },
            DriveDemand::CharacterizeRotation { volts } => {
                (DemandKind::CharacterizeRotation, ChassisVelCmd::zero(), *volts)
            },
        };

        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        self.kind.store(kind.to_u8(), Ordering::Relaxed);
        self.vx_ms.store(cmd.vx_ms.to_bits(), Ordering::Relaxed);
        self.vy_ms.store(cmd.vy_ms.to_bits(), Ordering::Relaxed);
        self.omega_rads.store(cmd.omega_rads.to_bits(), Ordering::Relaxed);
        self.field_relative.store(cmd.field_relative, Ordering::Relaxed);
        self.volts.store(volts.to_bits(), Ordering::Relaxed);

        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    /// Read a consistent snapshot of the last published demand.
    pub fn read(&self) -> SetpointSnapshot {
        loop {
            let seq0 = self.seq.load(Ordering::Acquire);
            if seq0 % 2 == 1 {
                std::hint::spin_loop();
                continue;
            }

            let snapshot = SetpointSnapshot {
                kind: DemandKind::from_u8(self.kind.load(Ordering::Relaxed)),
                cmd: ChassisVelCmd::new(
                    f64::from_bits(self.vx_ms.load(Ordering::Relaxed)),
                    f64::from_bits(self.vy_ms.load(Ordering::Relaxed)),
                    f64::from_bits(self.omega_rads.load(Ordering::Relaxed)),
                    self.field_relative.load(Ordering::Relaxed),
                ),
                volts: f64::from_bits(self.volts.load(Ordering::Relaxed)),
            };

            fence(Ordering::Acquire);
            if self.seq.load(Ordering::Relaxed) == seq0 {
                return snapshot;
            }
        }
    }

    /// Number of demands published so far.
    pub fn num_published(&self) -> u64 {
        self.seq.load(Ordering::Acquire) / 2
    }
}

impl SetpointSnapshot {
    pub fn to_demand(&self) -> DriveDemand {
        match self.kind {
            DemandKind::Velocity => DriveDemand::Velocity(self.cmd),
            DemandKind::CharacterizeDrive => DriveDemand::CharacterizeDrive { volts: self.volts },
            DemandKind::CharacterizeRotation => {
                DriveDemand::CharacterizeRotation { volts: self.volts }
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::{sync::Arc, thread};

    #[test]
    fn test_default_is_stop() {
        let sp = SharedSetpoints::new();
        let s = sp.read();
        assert_eq!(s.kind, DemandKind::Velocity);
        assert!(s.cmd.is_zero());
        assert_eq!(sp.num_published(), 0);
    }

    #[test]
    fn test_last_write_wins() {
        let sp = SharedSetpoints::new();
        sp.publish(&DriveDemand::Velocity(ChassisVelCmd::new(1.0, 2.0, 3.0, false)));
        sp.publish(&DriveDemand::CharacterizeRotation { volts: 2.5 });

        let s = sp.read();
        assert_eq!(s.to_demand(), DriveDemand::CharacterizeRotation { volts: 2.5 });
        assert_eq!(sp.num_published(), 2);
    }

    #[test]
    fn test_no_torn_reads() {
        let sp = Arc::new(SharedSetpoints::new());
        let sp_reader = sp.clone();

        // Every published command has vx == vy == -omega, a torn read breaks this
        let reader = thread::spawn(move || {
            for _ in 0..20_000 {
                let s = sp_reader.read();
                assert_eq!(s.cmd.vx_ms, s.cmd.vy_ms);
                assert_eq!(s.cmd.vx_ms, -s.cmd.omega_rads);
            }
        });

        for i in 0..20_000 {
            let v = i as f64;
            sp.publish(&DriveDemand::Velocity(ChassisVelCmd::new(v, v, -v, true)));
        }

        reader.join().unwrap();
    }
}
