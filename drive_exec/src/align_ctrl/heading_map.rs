//! # Alliance heading mapper
//!
//! Maps an alignment target and the current alliance to the source of the
//! desired heading. Most targets have a fixed field heading per alliance, the
//! speaker is resolved by the intercept resolver every cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use std::collections::HashMap;

use comms_if::tc::drive::{Alliance, AlignTarget};
use super::params::{AllianceHeadings, Params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lookup table from `(target, alliance)` to heading source.
///
/// `Alliance::Unknown` is never stored, it resolves as Blue.
#[derive(Debug, Clone, Default)]
pub struct HeadingMap {
    table: HashMap<(AlignTarget, Alliance), HeadingSource>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Where the desired heading for a target comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingSource {
    /// A fixed field heading in radians.
    Fixed(f64),

    /// Resolve an intercept heading to the field position, in meters.
    Intercept(Vector2<f64>),

    /// Keep the current heading.
    Hold,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HeadingMap {
    pub fn from_params(params: &Params) -> Self {
        let mut map = Self::default();
        map.insert_alliance(Alliance::Blue, &params.headings.blue);
        map.insert_alliance(Alliance::Red, &params.headings.red);
        map
    }

    fn insert_alliance(&mut self, alliance: Alliance, h: &AllianceHeadings) {
        use AlignTarget::*;

        self.insert(Amp, alliance, HeadingSource::Fixed(h.amp_rad));
        self.insert(Source, alliance, HeadingSource::Fixed(h.source_rad));
        self.insert(Up, alliance, HeadingSource::Fixed(h.up_rad));
        self.insert(Down, alliance, HeadingSource::Fixed(h.down_rad));
        self.insert(Left, alliance, HeadingSource::Fixed(h.left_rad));
        self.insert(Right, alliance, HeadingSource::Fixed(h.right_rad));
        self.insert(
            Speaker,
            alliance,
            HeadingSource::Intercept(Vector2::new(h.speaker_pos_m[0], h.speaker_pos_m[1]))
        );
    }

    /// Set the source for a target, replacing any existing entry.
    pub fn insert(&mut self, target: AlignTarget, alliance: Alliance, source: HeadingSource) {
        self.table.insert((target, alliance.effective()), source);
    }

    /// Get the heading source for the target on the given alliance.
    ///
    /// Targets with no entry, including `None` and `Endgame`, hold the
    /// current heading.
    pub fn source(&self, target: AlignTarget, alliance: Alliance) -> HeadingSource {
        self.table
            .get(&(target, alliance.effective()))
            .copied()
            .unwrap_or(HeadingSource::Hold)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_unknown_resolves_as_blue() {
        let map = HeadingMap::from_params(&Params::default());
        for t in [AlignTarget::Source, AlignTarget::Up, AlignTarget::Speaker].iter() {
            assert_eq!(
                map.source(*t, Alliance::Unknown),
                map.source(*t, Alliance::Blue)
            );
        }
    }

    #[test]
    fn test_alliance_specific() {
        let map = HeadingMap::from_params(&Params::default());
        assert_eq!(map.source(AlignTarget::Up, Alliance::Blue), HeadingSource::Fixed(0.0));
        assert_eq!(map.source(AlignTarget::Up, Alliance::Red), HeadingSource::Fixed(PI));
        assert_eq!(
            map.source(AlignTarget::Source, Alliance::Red),
            HeadingSource::Fixed(-2.0 * PI / 3.0)
        );
        match map.source(AlignTarget::Speaker, Alliance::Red) {
            HeadingSource::Intercept(p) => assert!(p[0] > 8.0),
            s => panic!("Expected intercept, got {:?}", s),
        }
    }

    #[test]
    fn test_unmapped_targets_hold() {
        let map = HeadingMap::from_params(&Params::default());
        assert_eq!(map.source(AlignTarget::None, Alliance::Blue), HeadingSource::Hold);
        assert_eq!(map.source(AlignTarget::Endgame, Alliance::Red), HeadingSource::Hold);
    }

    #[test]
    fn test_insert_replaces() {
        let mut map = HeadingMap::default();
        map.insert(AlignTarget::Amp, Alliance::Unknown, HeadingSource::Fixed(1.0));
        assert_eq!(map.source(AlignTarget::Amp, Alliance::Blue), HeadingSource::Fixed(1.0));
        map.insert(AlignTarget::Amp, Alliance::Blue, HeadingSource::Fixed(2.0));
        assert_eq!(map.source(AlignTarget::Amp, Alliance::Blue), HeadingSource::Fixed(2.0));
    }
}
