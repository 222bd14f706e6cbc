use channel_budget::{AllocationEngine, Channel, ChannelId};

#[test]
fn example_one_google_ads() {
    let eng = AllocationEngine::new(10_000.0, vec![Channel::new(1, "Google Ads", 40.0, 2.5, 2.5)]);
    let m = eng.compute_channel_metrics(&eng.channels()[0]);
    assert_eq!(m.budget, 4000.0);
    assert_eq!(m.clicks, 1600);
    assert_eq!(m.conversions, 40);
    assert_eq!(format!("{:.2}", m.cpa), "100.00");
}

#[test]
fn example_two_linkedin_ads() {
    let eng = AllocationEngine::new(10_000.0, vec![Channel::new(2, "LinkedIn Ads", 30.0, 5.5, 1.8)]);
    let m = eng.compute_channel_metrics(&eng.channels()[0]);
    assert_eq!(m.budget, 3000.0);
    assert_eq!(m.clicks, 545);
    assert_eq!(m.conversions, 9);
    assert_eq!(format!("{:.2}", m.cpa), "333.33");
}

#[test]
fn example_three_allocation_sum() {
    let mut eng = AllocationEngine::default();
    assert_eq!(eng.compute_total_allocation(), 100.0);
    assert!(eng.allocation_warning().is_none());

    eng.set_channel_allocation(ChannelId(1), 41.0);
    assert_eq!(eng.compute_total_allocation(), 101.0);
    assert_eq!(eng.allocation_warning(), Some(101.0));
}

#[test]
fn seed_session_summary() {
    let eng = AllocationEngine::default();
    let agg = eng.compute_aggregate_metrics();
    // 1600 + 545 + 1666 + 500
    assert_eq!(agg.total_clicks, 4311);
    // 40 + 9 + 24 + 6
    assert_eq!(agg.total_conversions, 79);
    assert_eq!(format!("{:.2}", agg.avg_cpa), "126.58");
}
