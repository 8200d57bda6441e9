//! Cyclic module interface
//!
//! Modules stepped by the `drive_exec` control loop implement [`State`]. The
//! loop owns the module, calls [`State::init`] once with the module's
//! parameter file and then [`State::proc`] exactly once per cycle.
//!
//! ```ignore
//! let mut align_ctrl = AlignCtrl::default();
//! align_ctrl.init("align_ctrl.toml", &session)?;
//!
//! loop {
//!     let (demand, report) = align_ctrl.proc(&input)?;
//!     drive_client.apply(&demand)?;
//! }
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A module stepped at the control loop rate.
pub trait State {
    /// Passed to `init`, for `AlignCtrl` the parameter file name.
    type InitData;
    type InitError;

    /// Sampled at the start of each cycle.
    type InputData;
    /// Sent to the drive boundary.
    type OutputData;
    /// Logged by the loop at 1 Hz.
    type StatusReport;
    type ProcError;

    /// Load parameters and build internal state. Called once before the loop
    /// starts.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one control cycle.
    ///
    /// Must not block. An error leaves the module usable on the next cycle,
    /// the loop decides what to send to the drive instead.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
