//! Derives one bookable unit (label, duration, price) from a multi-service
//! selection, and reconstructs a selection from a stored label when editing.

use crate::api::Service;

/// Slot length used when no services have been chosen yet
pub const DEFAULT_SLOT_MINUTES: i64 = 60;

/// The derived fields of an appointment draft
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceAggregate {
    /// Catalog names joined with ", " in selection order
    pub service_names: String,
    pub total_duration: i64,
    /// `None` while the selection is empty; an unpriced draft is not a free
    /// booking
    pub total_price: Option<f64>,
}

/// Recompute the aggregate from the current selection. Ids with no catalog
/// entry contribute nothing.
pub fn aggregate(selected_ids: &[String], catalog: &[Service]) -> ServiceAggregate {
    let mut names: Vec<&str> = Vec::new();
    let mut duration = 0i64;
    let mut price = 0f64;

    for id in selected_ids {
        if let Some(service) = catalog.iter().find(|s| &s.id == id) {
            names.push(&service.name);
            duration += service.duration;
            price += service.price;
        }
    }

    if names.is_empty() {
        return ServiceAggregate {
            service_names: String::new(),
            total_duration: DEFAULT_SLOT_MINUTES,
            total_price: None,
        };
    }

    ServiceAggregate {
        service_names: names.join(", "),
        total_duration: duration,
        total_price: Some(price),
    }
}

/// Map a stored comma-joined service label back to catalog ids by exact name
/// match. Names the catalog no longer carries are dropped from the selection;
/// the caller sees the shrunken draft on review.
pub fn selection_from_label(label: &str, catalog: &[Service]) -> Vec<String> {
    label
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| catalog.iter().find(|s| s.name == name))
        .map(|s| s.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Service> {
        vec![
            Service { id: "svc-1".into(), name: "Haircut".into(), duration: 60, price: 3000.0 },
            Service { id: "svc-2".into(), name: "Beard Trim".into(), duration: 30, price: 1500.0 },
            Service { id: "svc-3".into(), name: "Head Massage".into(), duration: 20, price: 800.0 },
        ]
    }

    #[test]
    fn sums_selection_in_order() {
        let agg = aggregate(&["svc-1".into(), "svc-2".into()], &catalog());
        assert_eq!(agg.service_names, "Haircut, Beard Trim");
        assert_eq!(agg.total_duration, 90);
        assert_eq!(agg.total_price, Some(4500.0));

        // Selection order, not catalog order, drives the label
        let reversed = aggregate(&["svc-2".into(), "svc-1".into()], &catalog());
        assert_eq!(reversed.service_names, "Beard Trim, Haircut");
    }

    #[test]
    fn empty_selection_gets_the_default_slot_and_no_price() {
        let agg = aggregate(&[], &catalog());
        assert_eq!(agg.total_duration, DEFAULT_SLOT_MINUTES);
        assert_eq!(agg.total_price, None);
        assert!(agg.service_names.is_empty());
    }

    #[test]
    fn reconstructs_selection_from_stored_label() {
        let ids = selection_from_label("Haircut, Head Massage", &catalog());
        assert_eq!(ids, vec!["svc-1".to_string(), "svc-3".to_string()]);
    }

    #[test]
    fn unmatched_names_are_dropped_silently() {
        let ids = selection_from_label("Haircut, Hot Towel Shave", &catalog());
        assert_eq!(ids, vec!["svc-1".to_string()]);

        assert!(selection_from_label("", &catalog()).is_empty());
    }
}
