//! One pass over the subscription registry.

use crate::alert::notify::Dispatcher;
use crate::alert::subscriptions::SubscriptionStore;
use crate::alert::thresholds::meets_threshold;
use crate::assess::Assessor;
use crate::logging::{self, DataSource};
use crate::model::{AlertNotification, AssessmentError, DeliveryStatus};

/// Assesses every subscribed location and dispatches an alert wherever the
/// grade meets that subscriber's threshold. Subscriptions outside the
/// coverage area are skipped with a warning. Returns the notifications
/// produced by this pass.
pub fn run_alert_cycle(
    assessor: &Assessor,
    store: &SubscriptionStore,
    dispatcher: &Dispatcher,
) -> Vec<AlertNotification> {
    let subscriptions = store.list();
    let mut sent = Vec::new();

    for sub in &subscriptions {
        let assessment = match assessor.assess(&sub.address, sub.latitude, sub.longitude) {
            Ok(a) => a,
            Err(e @ AssessmentError::OutsideCoverage { .. }) => {
                logging::warn(DataSource::Alerts, Some(&sub.phone_number), &format!("Skipped: {}", e));
                continue;
            }
        };

        if meets_threshold(assessment.risk.grade, sub.threshold_grade) {
            sent.push(dispatcher.dispatch(sub, &assessment.risk));
        } else {
            logging::debug(
                DataSource::Alerts,
                Some(&sub.phone_number),
                &format!(
                    "Grade {} below threshold {}",
                    assessment.risk.grade, sub.threshold_grade
                ),
            );
        }
    }

    let failed = sent
        .iter()
        .filter(|n| matches!(n.delivery, DeliveryStatus::Failed { .. }))
        .count();
    logging::log_alert_cycle_summary(subscriptions.len(), sent.len(), failed);

    sent
}
