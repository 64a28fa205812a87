//! `rank` and `replay` subcommands. Output goes to any writer.

use std::io::Write;
use std::path::PathBuf;

use dispatch_core::directory::RecordDirectory;
use dispatch_core::display::ProviderCard;
use dispatch_core::feed::{LocalFeed, PositionUpdate};
use dispatch_core::geo::Coordinate;
use dispatch_core::telemetry::SessionTelemetry;
use dispatch_core::{DispatchConfig, DispatchView, FeedStatus, ProximityDispatcher};
use serde::Serialize;
use tracing::info;

use crate::input::{load_config, load_garage_records, CliError, ReplayScenario};

#[derive(Debug, Clone)]
pub struct RankArgs {
    pub latitude: f64,
    pub longitude: f64,
    pub garages: PathBuf,
    pub limit: Option<usize>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct ReplayArgs {
    pub scenario: PathBuf,
    pub config: Option<PathBuf>,
    pub json: bool,
}

fn effective_config(
    config: DispatchConfig,
    limit: Option<usize>,
) -> Result<DispatchConfig, CliError> {
    let config = match limit {
        Some(limit) => config.with_shortlist_limit(limit),
        None => config,
    };
    config.validate()?;
    Ok(config)
}

fn write_view(out: &mut impl Write, view: &DispatchView, currency: &str) -> Result<(), CliError> {
    match view {
        DispatchView::LocationUnavailable { reason } => {
            writeln!(out, "Location unavailable: {reason} (retry)")?
        }
        DispatchView::DirectoryUnavailable { message } => {
            writeln!(out, "Garage directory unavailable: {message} (retry)")?
        }
        DispatchView::NoProvidersNearby { .. } => writeln!(out, "No mechanics available nearby.")?,
        DispatchView::Shortlist { providers, .. } => {
            for (index, ranked) in providers.iter().enumerate() {
                writeln!(out, "{:>2}. {}", index + 1, ProviderCard::new(ranked, currency))?;
            }
        }
    }
    Ok(())
}

pub fn run_rank(args: &RankArgs, out: &mut impl Write) -> Result<(), CliError> {
    let config = effective_config(load_config(args.config.as_deref())?, args.limit)?;
    let requester = Coordinate::validated(args.latitude, args.longitude)?;
    let directory = RecordDirectory::new(load_garage_records(&args.garages)?);

    let dispatcher = ProximityDispatcher::new(config);
    let view = dispatcher.locate_and_rank(&requester, &directory);

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &view)?;
        writeln!(out)?;
    } else {
        write_view(out, &view, &dispatcher.config().pricing.currency)?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ReplayStep {
    observed_at_ms: Option<u64>,
    card: ProviderCard,
    feed_status: FeedStatus,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    shortlist: Vec<ProviderCard>,
    selected: ProviderCard,
    steps: Vec<ReplayStep>,
    final_status: Option<FeedStatus>,
    telemetry: SessionTelemetry,
}

pub fn run_replay(args: &ReplayArgs, out: &mut impl Write) -> Result<(), CliError> {
    let scenario = ReplayScenario::load(&args.scenario)?;
    let config = effective_config(load_config(args.config.as_deref())?, scenario.limit)?;
    let requester = Coordinate::validated(scenario.requester.latitude, scenario.requester.longitude)?;
    let directory = RecordDirectory::new(scenario.garages.clone());

    let dispatcher = ProximityDispatcher::new(config);
    let currency = dispatcher.config().pricing.currency.clone();
    let view = dispatcher.locate_and_rank(&requester, &directory);
    let feed = LocalFeed::new();
    let Some(mut session) = dispatcher.start_session(&view, feed.clone()) else {
        if args.json {
            serde_json::to_writer_pretty(&mut *out, &view)?;
            writeln!(out)?;
        } else {
            write_view(out, &view, &currency)?;
        }
        return Ok(());
    };

    let providers = view.providers();
    let chosen = providers
        .get(scenario.select)
        .cloned()
        .ok_or(CliError::Selection {
            index: scenario.select,
            available: providers.len(),
        })?;
    let shortlist: Vec<ProviderCard> = providers
        .iter()
        .map(|ranked| ProviderCard::new(ranked, &currency))
        .collect();
    let selected = ProviderCard::new(&chosen, &currency);
    let chosen_id = chosen.id().clone();
    session.select_provider(chosen);

    let mut steps = Vec::with_capacity(scenario.updates.len());
    for recorded in &scenario.updates {
        let mut update = PositionUpdate::new(chosen_id.clone(), recorded.coordinate());
        if let Some(observed_at_ms) = recorded.observed_at_ms {
            update = update.observed_at(observed_at_ms);
        }
        feed.publish(update);
        session.pump_updates();
        if let (Some(current), Some(feed_status)) = (session.selected(), session.feed_status()) {
            steps.push(ReplayStep {
                observed_at_ms: recorded.observed_at_ms,
                card: ProviderCard::new(current, &currency),
                feed_status,
            });
        }
    }
    if scenario.disconnect_at_end {
        feed.disconnect(&chosen_id);
        session.pump_updates();
    }

    let report = ReplayReport {
        shortlist,
        selected,
        steps,
        final_status: session.feed_status(),
        telemetry: *session.telemetry(),
    };
    info!(
        provider_id = %chosen_id,
        updates = report.steps.len(),
        out_of_order = report.telemetry.updates_out_of_order,
        "replay finished"
    );

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        write_report(out, &report)?;
    }
    Ok(())
}

fn write_report(out: &mut impl Write, report: &ReplayReport) -> Result<(), CliError> {
    writeln!(out, "Shortlist:")?;
    for (index, card) in report.shortlist.iter().enumerate() {
        writeln!(out, "{:>2}. {card}", index + 1)?;
    }
    writeln!(out, "\nDispatched: {}", report.selected)?;
    for step in &report.steps {
        let at = step
            .observed_at_ms
            .map(|ms| format!("{:>6}s", ms / 1000))
            .unwrap_or_else(|| "      -".to_string());
        writeln!(out, "  {at}  {}", step.card)?;
    }
    if report.final_status == Some(FeedStatus::Disconnected) {
        writeln!(out, "Live feed lost; showing last known position.")?;
    }
    let telemetry = &report.telemetry;
    writeln!(
        out,
        "Updates received: {}  applied: {}  out of order: {}  ignored: {}  feed disconnects: {}",
        telemetry.updates_received(),
        telemetry.updates_applied,
        telemetry.updates_out_of_order,
        telemetry.updates_ignored,
        telemetry.feed_disconnects
    )?;
    Ok(())
}
