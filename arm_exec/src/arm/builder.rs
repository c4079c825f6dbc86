//! Arm assembly from the equipment registry
//!
//! The builder turns a flat registry of named equipment into a structured
//! [`Arm`], purely from naming convention and measured orientation:
//!
//! - `"{arm} X+"` — an actuator on the X axis, positive polarity, station 0
//! - `"{arm} X+ 2"` — same, at station 2 (stations chain in order)
//! - `"{arm} Crawl Z"` — a crawl slider on the Z axis, whose connectors and
//!   merge blocks are `"... top"`, `"... bottom"`, `"... merge top"` and
//!   `"... merge bottom"`
//! - `"{arm}"` — the tool head itself
//!
//! Several actuators carrying the same station name work in lockstep as a
//! group. Misconfiguration is fatal at build time: a half-built arm must
//! never start moving.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use mech_if::eqpt::{
    ActuatorHandle, ConnectorHandle, EqptRegistry, MergeBlockHandle, ToolHeadHandle,
};
use nalgebra::Vector3;
use std::collections::BTreeMap;

// Internal
use crate::crawl::{CrawlError, CrawlParams, CrawlSegment};
use crate::motion::{Actuator, ActuatorGroup, AxisChain, MotionError, Positionable, Reversed};

use super::Arm;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Arm frame axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            _ => None,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Possible errors during arm assembly.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Arm \"{arm}\" has no elements on its {axis} axis")]
    EmptyAxis { arm: String, axis: Axis },

    #[error("Actuator \"{name}\" opposes the other members of {axis} station {station}")]
    MixedStationPolarity {
        name: String,
        axis: Axis,
        station: u32,
    },

    #[error("Crawl slider \"{name}\" is missing its \"{part}\" equipment")]
    MissingCrawlEqpt { name: String, part: &'static str },

    #[error("Could not build crawl segment: {0}")]
    Crawl(#[from] CrawlError),

    #[error("Could not group actuators: {0}")]
    Motion(#[from] MotionError),

    #[error("No tool head named \"{arm}\" found")]
    NoToolHead { arm: String },
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The reference orientation the arm is mounted in, as three orthonormal
/// world-space basis vectors.
#[derive(Debug, Clone)]
pub struct RefFrame {
    pub x: Vector3<f64>,
    pub y: Vector3<f64>,
    pub z: Vector3<f64>,
}

/// An actuator name parsed against the naming convention.
struct ParsedName {
    axis: Axis,
    positive: bool,
    station: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RefFrame {
    /// The identity mounting: arm axes coincide with world axes.
    pub fn standard() -> Self {
        Self {
            x: Vector3::x(),
            y: Vector3::y(),
            z: Vector3::z(),
        }
    }

    /// Classify a world direction as the closest arm axis and polarity.
    fn classify(&self, dir: &Vector3<f64>) -> (Axis, bool) {
        let dots = [self.x.dot(dir), self.y.dot(dir), self.z.dot(dir)];

        let mut best = 0;
        for i in 1..3 {
            if dots[i].abs() > dots[best].abs() {
                best = i;
            }
        }

        let axis = match best {
            0 => Axis::X,
            1 => Axis::Y,
            _ => Axis::Z,
        };

        (axis, dots[best] >= 0.0)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Assemble the named arm from the registry.
pub fn build_arm(
    registry: &EqptRegistry,
    frame: &RefFrame,
    arm_name: &str,
    crawl_params: &CrawlParams,
) -> Result<Arm, BuildError> {
    // Stationed actuators per axis, station order preserved by the map.
    let mut stations: [BTreeMap<u32, (bool, Vec<ActuatorHandle>)>; 3] =
        [BTreeMap::new(), BTreeMap::new(), BTreeMap::new()];

    for handle in &registry.actuators {
        let name = handle.borrow().name();

        let parsed = match parse_actuator_name(arm_name, &name) {
            Some(p) => p,
            None => continue,
        };

        check_orientation(frame, handle, &name, &parsed);

        let station = stations[parsed.axis as usize]
            .entry(parsed.station)
            .or_insert_with(|| (parsed.positive, Vec::new()));

        // Lockstep members of one station must all push the same way.
        if station.0 != parsed.positive {
            return Err(BuildError::MixedStationPolarity {
                name,
                axis: parsed.axis,
                station: parsed.station,
            });
        }

        station.1.push(handle.clone());
    }

    let mut chains = Vec::with_capacity(3);

    for axis in [Axis::X, Axis::Y, Axis::Z] {
        let mut elements: Vec<Box<dyn Positionable>> = Vec::new();

        for (_, (positive, handles)) in std::mem::take(&mut stations[axis as usize]) {
            let members = handles.into_iter().map(Actuator::new).collect();
            let group = ActuatorGroup::new(members)?;

            if positive {
                elements.push(Box::new(group));
            } else {
                elements.push(Box::new(Reversed::new(group)));
            }
        }

        // A crawl slider, if present, is the outermost element of its axis.
        if let Some(segment) = build_crawl(registry, arm_name, axis, crawl_params)? {
            elements.push(Box::new(segment));
        }

        if elements.is_empty() {
            return Err(BuildError::EmptyAxis {
                arm: arm_name.into(),
                axis,
            });
        }

        chains.push(AxisChain::new(elements));
    }

    let z = chains.pop().unwrap_or_else(|| AxisChain::new(vec![]));
    let y = chains.pop().unwrap_or_else(|| AxisChain::new(vec![]));
    let x = chains.pop().unwrap_or_else(|| AxisChain::new(vec![]));

    Ok(Arm::new(arm_name.into(), x, y, z))
}

/// Find the arm's tool head, which carries the arm's own name.
pub fn find_tool_head(
    registry: &EqptRegistry,
    arm_name: &str,
) -> Result<ToolHeadHandle, BuildError> {
    registry
        .tool_heads
        .iter()
        .find(|t| t.borrow().name() == arm_name)
        .cloned()
        .ok_or_else(|| BuildError::NoToolHead {
            arm: arm_name.into(),
        })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse `"{arm} X+"` / `"{arm} X+ 2"` style names. Crawl equipment and
/// unrelated names return None.
fn parse_actuator_name(arm_name: &str, name: &str) -> Option<ParsedName> {
    let rest = name.strip_prefix(arm_name)?.strip_prefix(' ')?;

    if rest.starts_with("Crawl") {
        return None;
    }

    let mut tokens = rest.split(' ');
    let axis_token = tokens.next()?;

    let mut chars = axis_token.chars();
    let axis = Axis::from_char(chars.next()?)?;
    let positive = match chars.next()? {
        '+' => true,
        '-' => false,
        _ => return None,
    };
    if chars.next().is_some() {
        return None;
    }

    let station = match tokens.next() {
        Some(t) => t.parse().ok()?,
        None => 0,
    };
    if tokens.next().is_some() {
        return None;
    }

    Some(ParsedName {
        axis,
        positive,
        station,
    })
}

/// Cross-check the measured mounting direction against the name. The name
/// is authoritative, a mismatch is logged and otherwise ignored: it usually
/// means the operator renamed an actuator without remounting it.
fn check_orientation(
    frame: &RefFrame,
    handle: &ActuatorHandle,
    name: &str,
    parsed: &ParsedName,
) {
    let dir = handle.borrow().world_direction();
    let dir = Vector3::new(dir[0], dir[1], dir[2]);

    if dir.norm() < f64::EPSILON {
        return;
    }

    let (axis, positive) = frame.classify(&dir);

    if axis != parsed.axis || positive != parsed.positive {
        warn!(
            "Actuator \"{}\" is named for {}{} but mounted along {}{}",
            name,
            parsed.axis,
            if parsed.positive { "+" } else { "-" },
            axis,
            if positive { "+" } else { "-" },
        );
    }
}

/// Gather crawl equipment for one axis, if a slider for it exists.
fn build_crawl(
    registry: &EqptRegistry,
    arm_name: &str,
    axis: Axis,
    params: &CrawlParams,
) -> Result<Option<CrawlSegment>, BuildError> {
    let base = format!("{} Crawl {}", arm_name, axis);

    let slider = match registry
        .actuators
        .iter()
        .find(|a| a.borrow().name() == base)
    {
        Some(s) => s.clone(),
        None => return Ok(None),
    };

    let conn = |suffix: &'static str| -> Result<ConnectorHandle, BuildError> {
        registry
            .connectors
            .iter()
            .find(|c| c.borrow().name() == format!("{} {}", base, suffix))
            .cloned()
            .ok_or(BuildError::MissingCrawlEqpt {
                name: base.clone(),
                part: suffix,
            })
    };
    let merge = |suffix: &'static str| -> Result<MergeBlockHandle, BuildError> {
        registry
            .merge_blocks
            .iter()
            .find(|m| m.borrow().name() == format!("{} {}", base, suffix))
            .cloned()
            .ok_or(BuildError::MissingCrawlEqpt {
                name: base.clone(),
                part: suffix,
            })
    };

    let segment = CrawlSegment::new(
        base.clone(),
        slider,
        conn("top")?,
        conn("bottom")?,
        merge("merge top")?,
        merge("merge bottom")?,
        params.clone(),
    )?;

    Ok(Some(segment))
}

#[cfg(test)]
mod test {
    use super::*;
    use mech_if::sim::{SimActuator, SimCrawlRig, SimToolHead};

    const CRAWL_PARAMS: CrawlParams = CrawlParams {
        travel_m: 10.0,
        approach_speed_ms: 0.5,
        shuttle_speed_ms: 1.0,
        grind_duration_s: 2.0,
        lock_window_m: 0.2,
        settle_m: 0.05,
    };

    fn registry_with_crawl() -> EqptRegistry {
        let mut reg = EqptRegistry::default();

        // X: two lockstep actuators at station 0, one more at station 1
        for _ in 0..2 {
            reg.actuators
                .push(SimActuator::new("Rig 0 X+", 10.0, [1.0, 0.0, 0.0]).shared());
        }
        reg.actuators
            .push(SimActuator::new("Rig 0 X+ 1", 10.0, [1.0, 0.0, 0.0]).shared());

        // Y: single actuator
        reg.actuators
            .push(SimActuator::new("Rig 0 Y+", 10.0, [0.0, 1.0, 0.0]).shared());

        // Z: inverted mount plus a crawl carriage
        reg.actuators
            .push(SimActuator::new("Rig 0 Z-", 5.0, [0.0, 0.0, -1.0]).shared());

        let rig = SimCrawlRig::new("Rig 0 Crawl Z", 2.5, [0.0, 0.0, -1.0]);
        reg.actuators.push(rig.slider.clone());
        reg.connectors.push(rig.top_connector.clone());
        reg.connectors.push(rig.bottom_connector.clone());
        reg.merge_blocks.push(rig.top_merge.clone());
        reg.merge_blocks.push(rig.bottom_merge.clone());

        reg.tool_heads
            .push(SimToolHead::new("Rig 0", mech_if::eqpt::ToolKind::Drill).shared());

        reg
    }

    #[test]
    fn test_parse_names() {
        let p = parse_actuator_name("Rig 0", "Rig 0 X+").unwrap();
        assert_eq!(p.axis, Axis::X);
        assert!(p.positive);
        assert_eq!(p.station, 0);

        let p = parse_actuator_name("Rig 0", "Rig 0 Z- 3").unwrap();
        assert_eq!(p.axis, Axis::Z);
        assert!(!p.positive);
        assert_eq!(p.station, 3);

        assert!(parse_actuator_name("Rig 0", "Rig 0 Crawl Z").is_none());
        assert!(parse_actuator_name("Rig 0", "Rig 1 X+").is_none());
        assert!(parse_actuator_name("Rig 0", "Rig 0 W+").is_none());
        assert!(parse_actuator_name("Rig 0", "Rig 0 X+ not-a-station").is_none());
    }

    #[test]
    fn test_build_full_arm() {
        let reg = registry_with_crawl();
        let arm = build_arm(&reg, &RefFrame::standard(), "Rig 0", &CRAWL_PARAMS).unwrap();

        // X: two stations of 10 m; Y: 10 m; Z: 5 m actuator + 10 m crawl
        let max = arm.max();
        assert!((max[0] - 20.0).abs() < 1e-9);
        assert!((max[1] - 10.0).abs() < 1e-9);
        assert!((max[2] - 15.0).abs() < 1e-9);

        assert!(find_tool_head(&reg, "Rig 0").is_ok());
    }

    #[test]
    fn test_mixed_station_polarity_is_fatal() {
        let mut reg = registry_with_crawl();

        // An X- actuator at station 0 opposes the two X+ members there.
        reg.actuators
            .push(SimActuator::new("Rig 0 X-", 10.0, [-1.0, 0.0, 0.0]).shared());

        let res = build_arm(&reg, &RefFrame::standard(), "Rig 0", &CRAWL_PARAMS);
        assert!(matches!(
            res,
            Err(BuildError::MixedStationPolarity {
                axis: Axis::X,
                station: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_axis_is_fatal() {
        let mut reg = registry_with_crawl();
        reg.actuators
            .retain(|a| !a.borrow().name().starts_with("Rig 0 Y"));

        let res = build_arm(&reg, &RefFrame::standard(), "Rig 0", &CRAWL_PARAMS);
        assert!(matches!(
            res,
            Err(BuildError::EmptyAxis { axis: Axis::Y, .. })
        ));
    }

    #[test]
    fn test_missing_crawl_part_is_fatal() {
        let mut reg = registry_with_crawl();
        reg.merge_blocks
            .retain(|m| m.borrow().name() != "Rig 0 Crawl Z merge top");

        let res = build_arm(&reg, &RefFrame::standard(), "Rig 0", &CRAWL_PARAMS);
        assert!(matches!(res, Err(BuildError::MissingCrawlEqpt { .. })));
    }

    #[test]
    fn test_missing_tool_head_is_fatal() {
        let mut reg = registry_with_crawl();
        reg.tool_heads.clear();

        assert!(matches!(
            find_tool_head(&reg, "Rig 0"),
            Err(BuildError::NoToolHead { .. })
        ));
    }
}
