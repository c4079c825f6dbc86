//! Simulated structural health monitor

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::RefCell;
use std::rc::Rc;

use crate::eqpt::health::{ElementHealth, HealthMonitor, StructuralReport};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A simulated health monitor over a fixed element list.
pub struct SimHealth {
    elements: Vec<(String, ElementHealth)>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimHealth {
    /// Create a monitor with all named elements healthy and connected.
    pub fn new(element_names: &[&str]) -> Self {
        Self {
            elements: element_names
                .iter()
                .map(|n| {
                    (
                        n.to_string(),
                        ElementHealth {
                            damaged: false,
                            connected: true,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Rig input: set one element's health by name. Unknown names are
    /// ignored.
    pub fn set_element(&mut self, name: &str, health: ElementHealth) {
        if let Some(e) = self.elements.iter_mut().find(|(n, _)| n == name) {
            e.1 = health;
        }
    }
}

impl HealthMonitor for SimHealth {
    fn report(&self) -> StructuralReport {
        StructuralReport {
            elements: self.elements.clone(),
        }
    }
}
