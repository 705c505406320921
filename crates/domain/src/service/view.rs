//! Presentation predicates evaluated against a service snapshot.
//!
//! These decide which workflow buttons are offered and which fields are
//! shown or editable. They never authorize anything: the transition table
//! in [`ServiceState`] is what gets enforced.

use serde::Serialize;

use super::{Service, ServiceState};

/// Whether the button leading to `target` is shown for `service`.
#[must_use]
pub fn is_button_visible(service: &Service, target: ServiceState) -> bool {
    use ServiceState::{Delivered, Pending, Ready, Review, Warranty, Without};

    match target {
        Review => service.state == Pending,
        Ready | Without => !matches!(service.state, Ready | Without | Delivered),
        Warranty => service.garanty,
        Delivered => !matches!(service.state, Pending | Delivered),
        Pending => false,
    }
}

/// Field-level display rules for one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldRules {
    /// Header fields and lines are read-only.
    pub readonly: bool,
    /// Warranty paperwork fields are shown.
    pub warranty_fields_visible: bool,
}

/// Snapshot of everything a client needs to render a service form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceView {
    pub buttons: Vec<ServiceState>,
    pub fields: FieldRules,
}

impl ServiceView {
    #[must_use]
    pub fn of(service: &Service) -> Self {
        Self {
            buttons: ServiceState::ACTIONS
                .into_iter()
                .filter(|target| is_button_visible(service, *target))
                .collect(),
            fields: FieldRules {
                readonly: service.state == ServiceState::Delivered,
                warranty_fields_visible: service.garanty,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(state: ServiceState, garanty: bool) -> Service {
        Service::builder()
            .state(state)
            .garanty(garanty)
            .build()
            .unwrap()
    }

    #[test]
    fn should_offer_review_only_while_pending() {
        let view = ServiceView::of(&service(ServiceState::Pending, false));
        assert_eq!(
            view.buttons,
            vec![ServiceState::Review, ServiceState::Ready, ServiceState::Without]
        );
    }

    #[test]
    fn should_offer_warranty_when_garanty_is_set() {
        let view = ServiceView::of(&service(ServiceState::Review, true));
        assert!(view.buttons.contains(&ServiceState::Warranty));
        assert!(view.buttons.contains(&ServiceState::Delivered));
        assert!(!view.buttons.contains(&ServiceState::Review));
        assert!(view.fields.warranty_fields_visible);
    }

    #[test]
    fn should_hide_ready_and_without_once_chosen() {
        let ready = service(ServiceState::Ready, false);
        assert!(!is_button_visible(&ready, ServiceState::Ready));
        assert!(!is_button_visible(&ready, ServiceState::Without));
        assert!(is_button_visible(&ready, ServiceState::Delivered));
    }

    #[test]
    fn should_make_delivered_service_readonly() {
        let view = ServiceView::of(&service(ServiceState::Delivered, false));
        assert!(view.fields.readonly);
        assert!(view.buttons.is_empty());
    }
}
