use agile_tracker::Config;
use agile_tracker::cache::CacheStore;
use agile_tracker::countdown::{CountdownScheduler, Remaining, format_remaining};
use agile_tracker::fetch::OctopusClient;
use agile_tracker::logging::{get_logger, init_logging};
use agile_tracker::rates::{PriceBand, SlotSeries, WindowOutcome, find_cheapest_window, locate};
use agile_tracker::repository::{RateRepository, rates_cache_key};
use agile_tracker::schedule::{next_publish_fetch, next_slot_boundary};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::io::Write;

const TIME_FORMAT: &str = "%a %H:%M";

fn print_current(series: &SlotSeries, config: &Config, now: DateTime<Utc>) {
    match locate(series, now) {
        Some(slot) => {
            let band = PriceBand::classify(slot.price(), &config.bands);
            println!(
                "Current price: {:.2}p/kWh ({}) until {}",
                slot.value_inc_vat,
                band.as_str(),
                slot.valid_to.format(TIME_FORMAT)
            );
        }
        None => println!("Current price not published yet"),
    }
}

fn print_upcoming(series: &SlotSeries, config: &Config, now: DateTime<Utc>) {
    let from = locate(series, now).map_or(now, |slot| slot.valid_from);
    let upcoming = series.upcoming(from, Duration::hours(i64::from(config.chart_hours)));
    if upcoming.is_empty() {
        return;
    }
    println!("Upcoming prices:");
    for slot in &upcoming {
        let band = PriceBand::classify(slot.price(), &config.bands);
        println!(
            "  {}  {:>7.2}p  {}",
            slot.valid_from.format(TIME_FORMAT),
            slot.value_inc_vat,
            band.as_str()
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let force = std::env::args().skip(1).any(|a| a == "--force" || a == "-f");

    let config = Config::load()?;
    config.validate()?;
    init_logging(&config.logging)?;

    let logger = get_logger("main");
    logger.info(&format!("Agile Tracker {} starting up", env!("APP_VERSION")));

    let cache = CacheStore::from_config(&config.cache)?;
    let swept = cache.cleanup();
    if swept > 0 {
        logger.info(&format!("Removed {} expired cache entries", swept));
    }

    let policy = config.release.policy()?;
    let repository = RateRepository::new(cache, policy);
    let client = OctopusClient::new(&config.tariff)?;
    logger.debug(&format!("Rates endpoint: {}", client.url()));

    let now = Utc::now();
    let key = rates_cache_key(&config.tariff.tariff_code, now);
    let series = match repository.get_rates(&key, force, &client, now).await {
        Ok(series) => series,
        Err(e) => {
            logger.error(&format!("Failed to fetch rates: {}", e));
            return Err(e.into());
        }
    };
    if let Some(until) = series.covered_until() {
        logger.info(&format!("Prices available until {}", until));
    }
    println!(
        "Next prices expected after {} (published daily at {} {})",
        next_publish_fetch(now, &policy, config.release.fetch_delay()).format(TIME_FORMAT),
        policy.release_time().format("%H:%M"),
        policy.timezone()
    );

    print_current(&series, &config, now);
    print_upcoming(&series, &config, now);

    let window = match find_cheapest_window(
        &series,
        config.search.duration_hours,
        config.search.horizon_hours,
        now,
    ) {
        WindowOutcome::Found(window) => window,
        WindowOutcome::InsufficientData {
            required,
            available,
        } => {
            println!(
                "Not enough upcoming prices for a {}h window ({} of {} slots published)",
                config.search.duration_hours, available, required
            );
            return Ok(());
        }
    };
    println!(
        "Cheapest {}h window: {} - {}, average {:.2}p/kWh",
        window.duration().num_hours(),
        window.start.format(TIME_FORMAT),
        window.end.format(TIME_FORMAT),
        window.average_price() * 100.0
    );

    let (mut scheduler, mut updates) = CountdownScheduler::new();
    scheduler.arm(window.start);

    let mut boundary = next_slot_boundary(Utc::now());
    loop {
        let until_boundary = (boundary - Utc::now()).to_std().unwrap_or_default();
        tokio::select! {
            update = updates.recv() => {
                let Some(state) = update else { break };
                match state.remaining {
                    Remaining::Counting(left) => {
                        logger.trace(&format!("{} until window", format_remaining(left)));
                        print!("\rStarts in {}", format_remaining(left));
                        let _ = std::io::stdout().flush();
                    }
                    Remaining::Reached => {
                        println!("\rCheapest window has started");
                        break;
                    }
                }
            }
            _ = tokio::time::sleep(until_boundary) => {
                println!();
                print_current(&series, &config, Utc::now());
                boundary = next_slot_boundary(Utc::now());
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                logger.info("Interrupted, shutting down");
                scheduler.cancel();
                break;
            }
        }
    }

    Ok(())
}
