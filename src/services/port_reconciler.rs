//! Port list reconciliation
//!
//! Every agent port-list event replaces the displayed options wholesale.
//! The current selection is the one thing carried across refreshes: it is
//! swapped for the fresh entry with the same identifier, or, when the device
//! has gone away, kept, flagged disconnected and shown first.

use serde_json::Value;

use crate::models::port::{PortDescriptor, PortSelection};

/// Build the new port selection from a raw agent `Ports` array
pub fn reconcile(previous: Option<&PortDescriptor>, raw_ports: &[Value]) -> PortSelection {
    let mut options: Vec<PortDescriptor> = raw_ports
        .iter()
        .filter_map(PortDescriptor::from_agent_entry)
        .collect();

    let selected = match previous {
        None => options.first().cloned(),
        Some(previous) => match options.iter().find(|p| p.value == previous.value) {
            Some(fresh) => Some(fresh.clone()),
            None => {
                let mut kept = previous.clone();
                if !kept.disconnected {
                    log::warn!("⚠️ Selected port {} is no longer available", kept.value);
                }
                kept.mark_disconnected();
                options.insert(0, kept.clone());
                Some(kept)
            }
        },
    };

    PortSelection { options, selected }
}

impl PortSelection {
    /// Select the displayed option with identifier `id`
    pub fn select(&mut self, id: &str) -> bool {
        match self.options.iter().find(|p| p.value == id) {
            Some(port) => {
                self.selected = Some(port.clone());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::port::DisplayStyle;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use serde_json::json;

    fn ports(names: &[&str]) -> Vec<Value> {
        names.iter().map(|n| json!({"Name": n})).collect()
    }

    #[test]
    fn test_first_list_selects_first_entry() {
        let selection = reconcile(None, &ports(&["/dev/ttyACM0", "/dev/ttyUSB0"]));
        assert_eq!(selection.options.len(), 2);
        assert_eq!(selection.selected.unwrap().value, "/dev/ttyACM0");
    }

    #[test]
    fn test_empty_list_without_selection() {
        let selection = reconcile(None, &[]);
        assert!(selection.options.is_empty());
        assert!(selection.selected.is_none());
    }

    #[test]
    fn test_selection_follows_identifier_across_reorder() {
        let mut selection = reconcile(None, &ports(&["COM3", "COM4"]));
        assert!(selection.select("COM4"));

        let selection = reconcile(selection.selected.as_ref(), &ports(&["COM5", "COM4", "COM3"]));
        let selected = selection.selected.unwrap();
        assert_eq!(selected.value, "COM4");
        assert!(!selected.disconnected);
        assert_eq!(selection.options.len(), 3);
    }

    #[test]
    fn test_missing_selection_is_kept_and_prepended() {
        let first = reconcile(None, &ports(&["/dev/ttyACM0", "/dev/ttyUSB0"]));
        let second = reconcile(first.selected.as_ref(), &ports(&["/dev/ttyUSB0"]));

        let selected = second.selected.clone().unwrap();
        assert_eq!(selected.value, "/dev/ttyACM0");
        assert!(selected.disconnected);
        assert_eq!(selected.style, Some(DisplayStyle::Warning));
        assert_eq!(second.options[0], selected);
        assert_eq!(second.options.len(), 2);

        // Still gone: kept once, not duplicated
        let third = reconcile(second.selected.as_ref(), &ports(&["/dev/ttyUSB0"]));
        assert_eq!(third.options.len(), 2);
        assert_eq!(third.options[0].value, "/dev/ttyACM0");
    }

    #[test]
    fn test_replugged_port_is_fresh_again() {
        let first = reconcile(None, &ports(&["COM3"]));
        let unplugged = reconcile(first.selected.as_ref(), &[]);
        assert!(unplugged.selected.as_ref().unwrap().disconnected);
        assert_eq!(unplugged.options.len(), 1);

        let replugged = reconcile(unplugged.selected.as_ref(), &ports(&["COM3"]));
        let selected = replugged.selected.unwrap();
        assert!(!selected.disconnected);
        assert_eq!(selected.style, None);
        assert_eq!(replugged.options.len(), 1);
    }

    #[test]
    fn test_entries_without_name_are_skipped() {
        let raw = vec![json!({"SerialNumber": "123"}), json!({"Name": "COM7"})];
        let selection = reconcile(None, &raw);
        assert_eq!(selection.options.len(), 1);
        assert_eq!(selection.selected.unwrap().value, "COM7");
    }

    #[test]
    fn test_select_unknown_port() {
        let mut selection = reconcile(None, &ports(&["COM3"]));
        assert!(!selection.select("COM9"));
        assert_eq!(selection.selected.unwrap().value, "COM3");
    }

    #[test]
    fn test_property_identity_preserved_over_random_refreshes() {
        let universe = ["COM1", "COM2", "COM3", "COM4", "COM5"];
        let mut rng = StdRng::seed_from_u64(0x2545_f491);
        let mut selection = reconcile(None, &ports(&["COM2", "COM3"]));
        let chosen = selection.selected.clone().unwrap().value;

        for _ in 0..200 {
            let names: Vec<&str> = universe
                .iter()
                .filter(|_| rng.gen_bool(0.5))
                .copied()
                .collect();
            let present = names.contains(&chosen.as_str());

            selection = reconcile(selection.selected.as_ref(), &ports(&names));
            let selected = selection.selected.clone().unwrap();
            assert_eq!(selected.value, chosen);
            assert_eq!(selected.disconnected, !present);
            if !present {
                assert_eq!(selection.options[0].value, chosen);
            }
        }
    }
}
