//! Startup (create or login) and the menu loop.

use diam_kit::{Identity, Ledger, Session, Signer, parse_key};
use zeroize::Zeroizing;

use crate::console::{Console, ask};
use crate::error::CliError;
use crate::menu::{Choice, MenuRegistry};
use crate::operations;

const MENU_PROMPT: &str = "> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Start {
    Create,
    Login,
}

/// Run a whole session against `ledger`.
///
/// Returns an error only when the session could not start or the console
/// failed; operation failures are reported and the menu continues.
pub async fn run(ledger: Ledger, console: &mut dyn Console) -> Result<(), CliError> {
    console.say("Welcome to the Diamante CLI");

    let mut session = match start_session(ledger, console).await {
        Ok(session) => session,
        Err(CliError::Eof | CliError::Interrupted) => return Ok(()),
        Err(e) => {
            console.say(&format!("Login failed: {}", e));
            return Err(e);
        }
    };

    let menu = operations::registry();
    let result = run_menu(&mut session, &menu, console).await;

    session.close_subscription();
    console.say("Exiting...");
    result
}

/// Ask whether to create or log in, and build the session.
pub async fn start_session(ledger: Ledger, console: &mut dyn Console) -> Result<Session, CliError> {
    let start = ask(
        console,
        "Do you want to create a new account or login? (create/login): ",
        |s| match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Start::Create),
            "login" => Ok(Start::Login),
            _ => Err("Invalid action, expected create or login"),
        },
    )
    .await?;

    match start {
        Start::Create => Ok(create(ledger, console).await),
        Start::Login => login(ledger, console).await,
    }
}

/// Generate a keypair and ask the faucet to fund it.
///
/// Only the public key is shown. A funding failure leaves a usable, but
/// not yet existing, account.
async fn create(ledger: Ledger, console: &mut dyn Console) -> Session {
    let created = ledger.create_identity().await;
    let identity = created.identity;

    console.say(&format!("New Public Key: {}", identity.public_key()));
    console.say("The secret key is kept in memory for this session only.");
    match created.funding {
        Ok(receipt) => match receipt.hash {
            Some(hash) => console.say(&format!("Account funded by friendbot in transaction {}", hash)),
            None => console.say("Account funded by friendbot."),
        },
        Err(e) => console.say(&format!("Friendbot funding failed: {}", e)),
    }

    Session::new(ledger, identity)
}

/// Read a keypair and load its account. A load failure is fatal.
async fn login(ledger: Ledger, console: &mut dyn Console) -> Result<Session, CliError> {
    let account = ask(console, "Enter your public key: ", |s| parse_key("public key", s)).await?;

    let identity = loop {
        let secret = Zeroizing::new(
            console
                .read_secret("Enter your secret key: ")
                .await?
                .ok_or(CliError::Eof)?,
        );
        match Identity::from_secret(secret.as_str()) {
            Ok(identity) if identity.public_key() == &account => break identity,
            Ok(_) => console.say("That secret key does not belong to this public key. Please try again."),
            Err(e) => console.say(&format!("{}. Please try again.", e)),
        }
    };

    let snapshot = ledger.load_account(&account).await?;
    console.say(&format!(
        "Account Loaded Successfully! Sequence: {}",
        snapshot.sequence()
    ));
    Ok(Session::new(ledger, identity))
}

/// Show the menu and dispatch choices until exit or end of input.
pub async fn run_menu(
    session: &mut Session,
    menu: &MenuRegistry,
    console: &mut dyn Console,
) -> Result<(), CliError> {
    loop {
        console.say(&menu.render());
        let line = match console.read_line(MENU_PROMPT).await {
            Ok(Some(line)) => line,
            Ok(None) | Err(CliError::Eof | CliError::Interrupted) => return Ok(()),
            Err(e) => return Err(e),
        };

        let key = match menu.choose(&line) {
            Choice::Exit => return Ok(()),
            Choice::Invalid => {
                console.say("Invalid choice. Please try again.");
                continue;
            }
            Choice::Operation(key) => key,
        };
        let Some(operation) = menu.get(key) else {
            continue;
        };

        match operation.run(session, console).await {
            Ok(()) => {}
            Err(CliError::Eof | CliError::Interrupted) => return Ok(()),
            Err(e @ CliError::Console(_)) => return Err(e),
            Err(e) => {
                tracing::debug!(operation = operation.title(), error = %e, "operation failed");
                console.say(&format!("Error: {}", e));
            }
        }
    }
}
