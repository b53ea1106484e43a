//! Menu entries.

use std::time::Duration;

use diam_kit::{
    AssetCode, AssetSpec, Operation, PaymentPath, PaymentRecord, Session, SubmissionReceipt, TimeBounds,
    parse_key, parse_offer_id, parse_positive_amount, parse_price,
};

use crate::console::{Console, ask, ask_field};
use crate::error::CliError;
use crate::menu::{MenuFuture, MenuOperation, MenuRegistry};

/// Validity window for plain payments.
pub const PAYMENT_WINDOW: Duration = Duration::from_secs(30);

/// Entries that have a title but no ledger behaviour yet.
const PLACEHOLDERS: &[(u32, &str)] = &[
    (9, "Payment channel"),
    (11, "Mint NFT"),
    (12, "Manage DeFi"),
    (13, "Tokenize real estate"),
    (14, "Manage token swaps"),
    (15, "Manage crowdfunding"),
    (16, "Manage digital identity"),
    (17, "Manage e-learning"),
    (18, "Manage loyalty program"),
    (19, "Manage P2P lending"),
    (20, "Manage digital art"),
    (21, "Manage prediction market"),
    (22, "Manage content moderation"),
    (23, "Trade green energy"),
    (24, "Manage intellectual property"),
];

/// The full menu.
pub fn registry() -> MenuRegistry {
    let mut menu = MenuRegistry::new();
    menu.register(1, SetupTrustline)
        .register(2, IssueAsset)
        .register(3, MakePayment)
        .register(4, ManageBuyOffer)
        .register(5, ManageSellOffer)
        .register(6, StreamPayments)
        .register(7, HandlePreconditions)
        .register(8, Pathfinding)
        .register(10, ManageVotingTokens);
    for &(key, title) in PLACEHOLDERS {
        menu.register(key, Placeholder(title));
    }
    menu
}

// ============================================================================
// Prompt helpers
// ============================================================================

async fn ask_key(console: &mut dyn Console, prompt: &str, field: &'static str) -> Result<String, CliError> {
    ask_field(console, prompt, |s| parse_key(field, s)).await
}

async fn ask_amount(console: &mut dyn Console, prompt: &str, field: &'static str) -> Result<String, CliError> {
    ask_field(console, prompt, |s| parse_positive_amount(field, s)).await
}

/// Ask for an issued asset: code, then issuer.
async fn ask_issued(console: &mut dyn Console, code_prompt: &str, issuer_prompt: &str) -> Result<AssetSpec, CliError> {
    let code = ask_field(console, code_prompt, |s| AssetCode::new(s)).await?;
    let issuer = ask_key(console, issuer_prompt, "issuer").await?;
    Ok(AssetSpec::issued(code, issuer))
}

/// Ask for either side of an offer. `native` skips the issuer prompt.
async fn ask_offer_asset(
    console: &mut dyn Console,
    code_prompt: &str,
    issuer_prompt: &str,
) -> Result<AssetSpec, CliError> {
    let code = ask_field(console, code_prompt, |s| {
        if s.eq_ignore_ascii_case("native") {
            Ok(())
        } else {
            AssetCode::new(s).map(|_| ())
        }
    })
    .await?;
    if code.eq_ignore_ascii_case("native") {
        return Ok(AssetSpec::Native);
    }
    let issuer = ask_key(console, issuer_prompt, "issuer").await?;
    Ok(AssetSpec::issued(code, issuer))
}

fn report(console: &mut dyn Console, what: &str, receipt: &SubmissionReceipt) {
    let message = match receipt.ledger {
        Some(ledger) => format!("{} Successful! Transaction {} in ledger {}", what, receipt.hash, ledger),
        None => format!("{} Successful! Transaction {}", what, receipt.hash),
    };
    console.say(&message);
}

fn describe_payment(payment: &PaymentRecord) -> String {
    let asset = payment
        .asset()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "unknown asset".to_string());
    format!(
        "New payment: {} of {} {} from {} to {} (id {})",
        payment.kind,
        payment.moved_amount().unwrap_or("?"),
        asset,
        payment.sender().unwrap_or("?"),
        payment.receiver().unwrap_or("?"),
        payment.id,
    )
}

fn describe_path(path: &PaymentPath) -> String {
    let hops = if path.path.is_empty() {
        "direct".to_string()
    } else {
        path.path
            .iter()
            .map(|asset| asset.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    };
    format!(
        "Send {} {} to deliver {} {} ({})",
        path.source_amount, path.source_asset, path.destination_amount, path.destination_asset, hops
    )
}

// ============================================================================
// Operations
// ============================================================================

/// 1: change-trust for an issued asset.
pub struct SetupTrustline;

impl MenuOperation for SetupTrustline {
    fn title(&self) -> &str {
        "Set up a trustline"
    }

    fn run<'a>(&'a self, session: &'a mut Session, console: &'a mut dyn Console) -> MenuFuture<'a> {
        Box::pin(async move {
            let asset = ask_issued(
                console,
                "Enter the asset code (e.g., USD): ",
                "Enter the asset issuer public key: ",
            )
            .await?;
            let receipt = session.execute(Operation::change_trust(asset), None).await?;
            report(console, "Trustline Set", &receipt);
            Ok(())
        })
    }
}

/// 2: pay an issued asset to the session account.
pub struct IssueAsset;

impl MenuOperation for IssueAsset {
    fn title(&self) -> &str {
        "Issue an asset"
    }

    fn run<'a>(&'a self, session: &'a mut Session, console: &'a mut dyn Console) -> MenuFuture<'a> {
        Box::pin(async move {
            let asset = ask_issued(
                console,
                "Enter the asset code (e.g., USD): ",
                "Enter the asset issuer public key: ",
            )
            .await?;
            let amount = ask_amount(console, "Enter the amount to issue: ", "amount").await?;

            let me = session.public_key().to_string();
            let receipt = session.execute(Operation::payment(me, asset, amount), None).await?;
            report(console, "Asset Issued", &receipt);
            Ok(())
        })
    }
}

/// 3: native payment with a short validity window.
pub struct MakePayment;

impl MenuOperation for MakePayment {
    fn title(&self) -> &str {
        "Make a payment"
    }

    fn run<'a>(&'a self, session: &'a mut Session, console: &'a mut dyn Console) -> MenuFuture<'a> {
        Box::pin(async move {
            let destination = ask_key(
                console,
                "Enter the destination account public key: ",
                "destination",
            )
            .await?;
            let amount = ask_amount(console, "Enter the amount to pay: ", "amount").await?;

            let payment = Operation::payment(destination, AssetSpec::Native, amount);
            let receipt = session
                .execute(payment, Some(TimeBounds::expiring_in(PAYMENT_WINDOW)))
                .await?;
            report(console, "Payment", &receipt);
            Ok(())
        })
    }
}

/// 4: manage-buy-offer.
pub struct ManageBuyOffer;

impl MenuOperation for ManageBuyOffer {
    fn title(&self) -> &str {
        "Manage buy offer"
    }

    fn run<'a>(&'a self, session: &'a mut Session, console: &'a mut dyn Console) -> MenuFuture<'a> {
        Box::pin(async move {
            let selling = ask_offer_asset(
                console,
                "Enter the asset code you are selling (e.g., native): ",
                "Enter the asset issuer public key for the selling asset: ",
            )
            .await?;
            let buying = ask_offer_asset(
                console,
                "Enter the asset code you are buying (e.g., USD): ",
                "Enter the asset issuer public key for the buying asset: ",
            )
            .await?;
            let buy_amount = ask_amount(console, "Enter the amount to buy: ", "buy amount").await?;
            let price = ask_field(console, "Enter the price per unit: ", parse_price).await?;
            let offer_id = ask_field(
                console,
                "Enter the offer ID (use 0 for a new offer): ",
                parse_offer_id,
            )
            .await?;

            let offer = Operation::ManageBuyOffer {
                selling,
                buying,
                buy_amount,
                price,
                offer_id,
            };
            let receipt = session.execute(offer, None).await?;
            report(console, "Buy Offer", &receipt);
            Ok(())
        })
    }
}

/// 5: manage-sell-offer.
pub struct ManageSellOffer;

impl MenuOperation for ManageSellOffer {
    fn title(&self) -> &str {
        "Manage sell offer"
    }

    fn run<'a>(&'a self, session: &'a mut Session, console: &'a mut dyn Console) -> MenuFuture<'a> {
        Box::pin(async move {
            let selling = ask_offer_asset(
                console,
                "Enter the asset code you are selling (e.g., USD): ",
                "Enter the asset issuer public key for the selling asset: ",
            )
            .await?;
            let buying = ask_offer_asset(
                console,
                "Enter the asset code you are buying (e.g., native): ",
                "Enter the asset issuer public key for the buying asset: ",
            )
            .await?;
            let amount = ask_amount(console, "Enter the amount to sell: ", "amount").await?;
            let price = ask_field(console, "Enter the price per unit: ", parse_price).await?;
            let offer_id = ask_field(
                console,
                "Enter the offer ID (use 0 for a new offer): ",
                parse_offer_id,
            )
            .await?;

            let offer = Operation::ManageSellOffer {
                selling,
                buying,
                amount,
                price,
                offer_id,
            };
            let receipt = session.execute(offer, None).await?;
            report(console, "Sell Offer", &receipt);
            Ok(())
        })
    }
}

/// 6: subscribe to the session account's payments.
///
/// Returns as soon as the subscription is opened; payments print in the
/// background until another stream replaces it or the session exits.
pub struct StreamPayments;

impl MenuOperation for StreamPayments {
    fn title(&self) -> &str {
        "Stream payments"
    }

    fn run<'a>(&'a self, session: &'a mut Session, console: &'a mut dyn Console) -> MenuFuture<'a> {
        Box::pin(async move {
            let account = *session.public_key();
            let print_payment = console.printer();
            let print_error = console.printer();

            let subscription = session
                .ledger()
                .stream_payments(&account)
                .on_payment(move |payment| print_payment(describe_payment(&payment)))
                .on_error(move |err| print_error(format!("Payment stream stopped: {}", err)))
                .open();
            session.set_subscription(subscription);

            console.say(&format!("Streaming payments for {}", account));
            Ok(())
        })
    }
}

/// 7: native payment to self, valid only inside user-supplied time bounds.
pub struct HandlePreconditions;

impl MenuOperation for HandlePreconditions {
    fn title(&self) -> &str {
        "Handle preconditions"
    }

    fn run<'a>(&'a self, session: &'a mut Session, console: &'a mut dyn Console) -> MenuFuture<'a> {
        Box::pin(async move {
            let min_time = ask(console, "Enter the minimum time (UNIX timestamp): ", |s| {
                s.parse::<u64>().map_err(|_| format!("Invalid timestamp: {:?}", s))
            })
            .await?;
            let max_time = ask(console, "Enter the maximum time (UNIX timestamp, 0 for none): ", |s| {
                match s.parse::<u64>() {
                    Ok(max) if max == 0 || max >= min_time => Ok(max),
                    Ok(_) => Err("Maximum time is before the minimum time".to_string()),
                    Err(_) => Err(format!("Invalid timestamp: {:?}", s)),
                }
            })
            .await?;
            let amount = ask_amount(console, "Enter the amount to send: ", "amount").await?;

            let me = session.public_key().to_string();
            let payment = Operation::payment(me, AssetSpec::Native, amount);
            let receipt = session
                .execute(payment, Some(TimeBounds::new(min_time, max_time)))
                .await?;
            report(console, "Precondition Transaction", &receipt);
            Ok(())
        })
    }
}

/// 8: strict-receive path finding towards the native asset.
pub struct Pathfinding;

impl MenuOperation for Pathfinding {
    fn title(&self) -> &str {
        "Pathfinding"
    }

    fn run<'a>(&'a self, session: &'a mut Session, console: &'a mut dyn Console) -> MenuFuture<'a> {
        Box::pin(async move {
            let amount = ask_amount(
                console,
                "Enter the amount to find a path for: ",
                "destination amount",
            )
            .await?;

            let paths = session
                .ledger()
                .find_paths(session.public_key(), AssetSpec::Native, &amount)
                .await?;
            if paths.is_empty() {
                console.say("No payment paths found.");
            } else {
                console.say(&format!("Found {} payment path(s):", paths.len()));
                for path in &paths {
                    console.say(&describe_path(path));
                }
            }
            Ok(())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoteAction {
    Issue,
    Tally,
}

/// 10: issue a self-issued voting token, or tally (not available yet).
pub struct ManageVotingTokens;

impl MenuOperation for ManageVotingTokens {
    fn title(&self) -> &str {
        "Manage voting tokens"
    }

    fn run<'a>(&'a self, session: &'a mut Session, console: &'a mut dyn Console) -> MenuFuture<'a> {
        Box::pin(async move {
            let token = ask_field(console, "Enter the voting token name: ", |s| AssetCode::new(s)).await?;
            let action = ask(console, "Enter the action (issue, tally): ", |s| {
                match s.to_ascii_lowercase().as_str() {
                    "issue" => Ok(VoteAction::Issue),
                    "tally" => Ok(VoteAction::Tally),
                    _ => Err("Invalid action, expected issue or tally"),
                }
            })
            .await?;

            match action {
                VoteAction::Issue => {
                    let amount = ask_amount(console, "Enter the amount to issue: ", "amount").await?;
                    let me = session.public_key().to_string();
                    let token = AssetSpec::issued(token, me.clone());
                    let receipt = session.execute(Operation::payment(me, token, amount), None).await?;
                    report(console, "Voting Token Issued", &receipt);
                }
                VoteAction::Tally => console.say("Vote tallying is not available yet."),
            }
            Ok(())
        })
    }
}

/// An entry listed in the menu with no ledger behaviour.
pub struct Placeholder(pub &'static str);

impl MenuOperation for Placeholder {
    fn title(&self) -> &str {
        self.0
    }

    fn run<'a>(&'a self, _session: &'a mut Session, console: &'a mut dyn Console) -> MenuFuture<'a> {
        Box::pin(async move {
            console.say(&format!("{} is not available yet.", self.0));
            Ok(())
        })
    }
}
