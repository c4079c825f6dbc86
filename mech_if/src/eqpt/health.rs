//! Structural health interface

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Health of one monitored structural element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHealth {
    /// True if the element reports physical damage.
    pub damaged: bool,

    /// True if the element is mechanically connected to the reference
    /// structure. A disconnection mid-operation means the arm has split.
    pub connected: bool,
}

/// Per-element health report for the structure around the tool head.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralReport {
    /// `(element name, health)` pairs for every monitored element.
    pub elements: Vec<(String, ElementHealth)>,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Read-only query of the structural health collaborator.
///
/// Note: health can only be trusted while the arm is stable. During a crawl
/// relocation the structure is briefly split by design, and a disconnection
/// report is expected, not a fault.
pub trait HealthMonitor {
    /// Report the health of every monitored element.
    fn report(&self) -> StructuralReport;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl StructuralReport {
    /// True if any element is damaged or disconnected.
    pub fn is_damaged(&self) -> bool {
        self.elements
            .iter()
            .any(|(_, h)| h.damaged || !h.connected)
    }

    /// Names of the offending elements, for status display.
    pub fn offenders(&self) -> Vec<String> {
        self.elements
            .iter()
            .filter(|(_, h)| h.damaged || !h.connected)
            .map(|(n, _)| n.clone())
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_is_damaged() {
        let ok = ElementHealth {
            damaged: false,
            connected: true,
        };

        let mut report = StructuralReport {
            elements: vec![("drill".into(), ok), ("ejector".into(), ok)],
        };
        assert!(!report.is_damaged());

        report.elements[1].1.connected = false;
        assert!(report.is_damaged());
        assert_eq!(report.offenders(), vec!["ejector".to_string()]);

        report.elements[1].1 = ok;
        report.elements[0].1.damaged = true;
        assert!(report.is_damaged());
    }
}
