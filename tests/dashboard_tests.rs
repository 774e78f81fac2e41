// tests/dashboard_tests.rs

use crm_core::models::{LeadStatus, UpdateLead};
use crm_core::CrmStore;
use rust_decimal::Decimal;

fn logged_store() -> CrmStore {
    let store = CrmStore::in_memory().unwrap();
    store.login("admin@acme.com", "x").unwrap();
    store
}

#[test]
fn seeded_metrics_add_up() {
    let store = logged_store();
    let metrics = store.dashboard_metrics().unwrap();

    assert_eq!(metrics.total_leads, 2);
    // Só o John Carter está qualificado no seed.
    assert_eq!(metrics.qualified_leads, 1);
    assert_eq!(metrics.conversion_rate, 0.0);

    assert_eq!(metrics.total_deals, 2);
    assert_eq!(metrics.total_deal_value, Decimal::from(100_000));
    assert_eq!(metrics.avg_deal_value, Decimal::from(50_000));
    // "Starter package" é o único negócio no estágio closed-won.
    assert_eq!(metrics.won_deal_value, Decimal::from(25_000));

    assert_eq!(metrics.open_activities, 2);
}

#[test]
fn conversion_rate_follows_closed_won_leads() {
    let store = logged_store();
    let lead = store.leads().unwrap().into_iter().next().unwrap();

    store
        .update_lead(
            lead.id,
            UpdateLead {
                status: Some(LeadStatus::ClosedWon),
                ..UpdateLead::default()
            },
        )
        .unwrap();

    let metrics = store.dashboard_metrics().unwrap();
    assert_eq!(metrics.conversion_rate, 50.0);
}

#[test]
fn completing_an_activity_shrinks_the_open_count() {
    let store = logged_store();
    let activity = store
        .activities_list()
        .unwrap()
        .into_iter()
        .next()
        .unwrap();

    let done = store.complete_activity(activity.id).unwrap();
    assert!(done.completed);
    assert!(done.completed_at.is_some());

    let metrics = store.dashboard_metrics().unwrap();
    assert_eq!(metrics.open_activities, 1);
}
