//! Rank the Bucharest garages, dispatch the runner-up and watch it approach.
//!
//! Run with: cargo run -p dispatch_core --example dispatch_run

use dispatch_core::display::ProviderCard;
use dispatch_core::feed::{LocalFeed, PositionUpdate};
use dispatch_core::test_helpers::{
    bucharest_providers, north_of_bucharest, StaticDirectory, BUCHAREST,
};
use dispatch_core::ProximityDispatcher;

fn main() {
    let dispatcher = ProximityDispatcher::default();
    let currency = dispatcher.config().pricing.currency.clone();
    let directory = StaticDirectory::new(bucharest_providers());

    let view = dispatcher.locate_and_rank(&BUCHAREST, &directory);
    let feed = LocalFeed::new();
    let Some(mut session) = dispatcher.start_session(&view, feed.clone()) else {
        println!("No shortlist: {view:?}");
        return;
    };
    let shortlist = view.providers().to_vec();

    println!(
        "--- Shortlist around ({:.4}, {:.4}) ---",
        BUCHAREST.latitude, BUCHAREST.longitude
    );
    for ranked in &shortlist {
        println!("  {}", ProviderCard::new(ranked, &currency));
    }

    let Some(chosen) = shortlist.into_iter().nth(1) else {
        return;
    };
    let chosen_id = chosen.id().clone();
    println!("\nSelected {}", chosen.provider().business_name);
    session.select_provider(chosen);

    // Drive from ~8 km to ~1 km in 1 km steps.
    for step in 1..=7 {
        let offset = 0.072 - step as f64 * 0.009;
        let update = PositionUpdate::new(chosen_id.clone(), north_of_bucharest(offset))
            .observed_at(step * 60_000);
        feed.publish(update);
        session.pump_updates();
        if let Some(selected) = session.selected() {
            println!("  t+{step} min  {}", ProviderCard::new(selected, &currency));
        }
    }

    session.deselect_provider();
    let telemetry = session.telemetry();
    println!(
        "\nUpdates applied: {}  out of order: {}  feed disconnects: {}",
        telemetry.updates_applied, telemetry.updates_out_of_order, telemetry.feed_disconnects
    );
}
