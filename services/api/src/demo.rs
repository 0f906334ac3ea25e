use crate::infra::{shared_http_client, RecordingRefreshHook, ScriptedIssuer};
use chrono::Utc;
use clap::Args;
use logos_pay::config::AppConfig;
use logos_pay::error::AppError;
use logos_pay::identity::{AccountProfile, ResolvedWallet};
use logos_pay::orders::{CardOrderRequest, OrderFlowTimings, OrderSession, OrderStatus};
use logos_pay::pricing::normalize_pricing;
use logos_pay::reputation::{tier_with_progress, TIERS};
use logos_pay::rewards::{
    cashback_earned, transaction_from_entry, RewardLedgerEntry, RewardsClient, MERCHANTS,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Card amount in USD for the demo purchase
    #[arg(long, default_value_t = 100.0)]
    pub(crate) amount: f64,
    /// Reputation score driving the tier portion of the demo
    #[arg(long, default_value_t = 1550)]
    pub(crate) score: i64,
    /// Settle the demo order through the operator bypass instead of polling
    #[arg(long)]
    pub(crate) force_complete: bool,
    /// Pull a live cashback summary from this rewards backend instead of the built-in sample
    #[arg(long)]
    pub(crate) rewards_url: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct TierArgs {
    /// Reputation score to resolve
    #[arg(long)]
    pub(crate) score: i64,
}

pub(crate) fn run_tier_report(args: TierArgs) -> Result<(), AppError> {
    render_tier_ladder(args.score);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        amount,
        score,
        force_complete,
        rewards_url,
    } = args;

    let config = AppConfig::load()?;
    if force_complete && config.environment.is_production() {
        println!("The operator bypass is disabled in production; run without --force-complete.");
        return Ok(());
    }

    println!("Logos Pay demo");

    render_tier_ladder(score);
    let wallet = render_wallet_resolution();
    render_pricing_normalization(amount, config.starpay.markup_percent);
    run_order_lifecycle(amount, force_complete).await?;
    render_rewards(rewards_url, wallet).await?;

    Ok(())
}

fn render_tier_ladder(score: i64) {
    let progress = tier_with_progress(score);
    let tier = progress.tier;

    println!("\nTier resolution");
    println!(
        "- Score {} -> {} | cashback {:.1}% | fee {:.1}% | {}",
        score,
        tier.name,
        tier.cashback_percent,
        tier.fee_percent,
        if tier.card_eligible {
            "card eligible"
        } else {
            "not card eligible"
        }
    );
    match progress.next_tier {
        Some(next) => println!(
            "- {} points to {}",
            progress.points_to_next_tier, next.name
        ),
        None => println!("- Top of the ladder"),
    }

    println!("\nTier ladder");
    for band in TIERS.iter() {
        let marker = if band.name == tier.name { ">" } else { " " };
        println!(
            "{} {:<13} {:>5}-{:>5} | cashback {:>4.1}% | fee {:>4.1}% | {}",
            marker,
            band.name,
            band.min_score,
            band.max_score,
            band.cashback_percent,
            band.fee_percent,
            if band.card_eligible { "card" } else { "no card" }
        );
    }
}

fn render_wallet_resolution() -> Option<ResolvedWallet> {
    println!("\nWallet resolution");
    let payload = json!({
        "linkedAccounts": [
            { "type": "email", "address": "buyer@example.com" },
            {
                "type": "cross_app",
                "smartWallets": [
                    { "address": "7rDJ6cYrNDeZmFSZTpRDMccTqrQS8y5FNDLL73VbCW9e" }
                ],
                "embeddedWallets": [
                    { "address": "3kQ9vXqLpWn2UzCdHhRaYbTmEgJfKsN8P4u6wA1xB5cD" }
                ]
            }
        ]
    });

    let wallet = AccountProfile::from_value(&payload).and_then(|profile| profile.reputation_wallet());
    match &wallet {
        Some(wallet) => println!("- {} via {}", wallet.address, wallet.capability.label()),
        None => println!("- No reputation wallet in the sample payload"),
    }
    wallet
}

fn render_pricing_normalization(amount: f64, markup_percent: f64) {
    println!("\nPricing normalization");
    // Sample issuer quote without a reseller markup, the case the platform
    // markup injection exists for.
    let quote = json!({
        "pricing": {
            "card_value": amount,
            "starpay_fee_percent": 2.5,
            "starpay_fee_usd": amount * 2.5 / 100.0,
            "reseller_markup_usd": 0.0
        }
    });

    let pricing = normalize_pricing(Some(&quote), amount, markup_percent);
    println!("- Issuer quote carried no markup; platform markup injected");
    println!(
        "- Card ${:.2} | fee ${:.2} ({:.1}%) | markup ${:.2} | total ${:.2}",
        pricing.card_value,
        pricing.fee_amount,
        pricing.fee_percent,
        pricing.markup_amount,
        pricing.total
    );
}

async fn run_order_lifecycle(amount: f64, force_complete: bool) -> Result<(), AppError> {
    println!("\nOrder lifecycle (scripted issuer, compressed timers)");

    let request =
        match CardOrderRequest::from_parts(Some(amount), Some("visa"), Some("demo@logos.cards")) {
            Ok(request) => request,
            Err(err) => {
                println!("- Order rejected at intake: {err}");
                return Ok(());
            }
        };

    let issuer = if force_complete {
        Arc::new(ScriptedIssuer::never_settling())
    } else {
        Arc::new(ScriptedIssuer::settling([
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Completed,
        ]))
    };
    let refresh = Arc::new(RecordingRefreshHook::default());
    let timings = OrderFlowTimings {
        poll_interval: Duration::from_millis(150),
        poll_ceiling: Duration::from_secs(5),
        completion_hold: Duration::from_millis(300),
    };
    let mut session = OrderSession::new(issuer, refresh.clone(), timings);

    let order = session.submit(&request).await?;
    println!("- Order {} accepted", order.order_id.as_str());
    println!(
        "- Pay {:.4} units to {} (reference ${:.2}/unit)",
        order.payment_destination.amount,
        order.payment_destination.address,
        order.payment_destination.reference_price
    );
    println!(
        "- Total ${:.2} | expires in {} minutes",
        order.pricing.total,
        (order.expires_at - Utc::now()).num_minutes()
    );

    let settled = if force_complete {
        session.confirm_payment_sent()?;
        session.poll_step().await?;
        session.poll_step().await?;
        println!("- Two pending rounds; applying the operator bypass");
        session.force_complete()?;
        session.finalize_completed().await?;
        OrderStatus::Completed
    } else {
        println!("- Payment reported; polling for settlement");
        session.await_settlement().await?
    };

    println!("- Session settled: {}", settled.label());
    for event in refresh.events() {
        println!(
            "- Dashboard refresh fired for {} ({})",
            event.order_id.as_str(),
            event.settled_status.label()
        );
    }

    Ok(())
}

async fn render_rewards(
    rewards_url: Option<String>,
    wallet: Option<ResolvedWallet>,
) -> Result<(), AppError> {
    println!("\nCashback rewards");

    if let Some(base_url) = rewards_url {
        let address = wallet
            .map(|wallet| wallet.address)
            .unwrap_or_else(|| "demo-wallet".to_string());
        let client = RewardsClient::new(shared_http_client()?, &base_url);
        let summary = client.summary_or_empty(&address).await;

        println!(
            "- Tier {} at {:.1}% | ${:.2} lifetime | ${:.2} this month",
            summary.current_tier_name,
            summary.current_cashback_percent,
            summary.total_earned_usd,
            summary.current_month_earned_usd
        );
        for entry in summary.history.iter().take(5) {
            let transaction = transaction_from_entry(entry);
            println!(
                "  - {} | ${:.2} spend | ${:.2} back at {:.1}%",
                transaction.merchant,
                transaction.amount,
                transaction.cashback_earned,
                transaction.cashback_rate
            );
        }
        return Ok(());
    }

    for entry in &sample_ledger() {
        let transaction = transaction_from_entry(entry);
        println!(
            "- {} | ${:.2} spend | ${:.2} back at {:.1}%",
            transaction.merchant,
            transaction.amount,
            transaction.cashback_earned,
            transaction.cashback_rate
        );
    }
    println!(
        "- A $120.00 purchase at {} at 3.0% earns ${:.2}",
        MERCHANTS[0],
        cashback_earned(120.0, 3.0)
    );

    Ok(())
}

fn sample_ledger() -> Vec<RewardLedgerEntry> {
    vec![
        RewardLedgerEntry {
            id: "rw-1001".to_string(),
            tier_name: Some("Established".to_string()),
            cashback_percent: 3.0,
            reward_amount_usd: 3.6,
            source: Some("order".to_string()),
            created_at: "2026-08-20T14:32:00Z".to_string(),
        },
        RewardLedgerEntry {
            id: "rw-1002".to_string(),
            tier_name: Some("Established".to_string()),
            cashback_percent: 3.0,
            reward_amount_usd: 1.2,
            source: Some("claim".to_string()),
            created_at: "2026-08-22T09:05:00Z".to_string(),
        },
    ]
}
