//! The terminal page: one event loop that owns the form, reacts to input
//! lines, wallet and balance pushes, and completed wallet calls, and renders
//! a [`PageView`] after every change.

pub mod command;
pub mod view;

use ethers::types::Address;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::blockchain::traits::{
    BalanceFeed, BalanceReading, BalanceSubscription, ConnectionState, SendCapability,
    SubmissionReceipt,
};
use crate::bridge::form::{BridgeForm, PrepareStatus};
use crate::bridge::request::{PreparationHandle, SubmissionHandle, TransactionRequester, TransferRequest};
use crate::context::AppContext;
use crate::core::errors::BridgeError;

pub use command::{help_text, ShellCommand, ShellInput};
pub use view::PageView;

/// Runs the page until input ends or `:quit`, then waits for any pending
/// submission to settle. Returns the last page rendered.
pub async fn run_page<F>(
    ctx: &AppContext,
    mut input: mpsc::Receiver<String>,
    mut render: F,
) -> Result<PageView, BridgeError>
where
    F: FnMut(&PageView),
{
    let session = Arc::clone(&ctx.session);
    let requester = TransactionRequester::new(Arc::clone(&ctx.session));
    let mut connection_rx = session.watch_connection();

    let mut form = BridgeForm::new();
    let mut balance: Option<BalanceSubscription> = None;
    let mut preparation: Option<PreparationHandle> = None;
    let mut submission: Option<SubmissionHandle> = None;
    let mut connecting: Option<JoinHandle<Result<Address, BridgeError>>> = None;
    let mut message: Option<String> = None;
    let mut input_open = true;
    let mut connection_open = true;

    let initial = connection_rx.borrow_and_update().clone();
    apply_connection(&mut form, &mut balance, ctx.balances.as_ref(), initial);
    schedule_preparation(&mut form, &mut preparation, &requester);
    let mut page = build_view(&form, &message);
    render(&page);

    info!(app = %ctx.config.app_name, "Page ready");

    loop {
        if !input_open && submission.is_none() {
            break;
        }

        tokio::select! {
            line = input.recv(), if input_open => match line {
                Some(line) => {
                    message = None;
                    match ShellInput::parse(&line) {
                        ShellInput::Amount(raw) => form.set_input(raw),
                        ShellInput::Command(ShellCommand::Connect) => {
                            if form.connection().connected {
                                message = Some("Wallet already connected".to_string());
                            } else if connecting.is_none() {
                                let session = Arc::clone(&session);
                                connecting = Some(tokio::spawn(async move { session.connect().await }));
                                message = Some("Connecting wallet...".to_string());
                            }
                        }
                        ShellInput::Command(ShellCommand::Disconnect) => {
                            session.disconnect();
                            apply_connection(&mut form, &mut balance, ctx.balances.as_ref(), session.connection());
                        }
                        ShellInput::Command(ShellCommand::Send) => match form.submit() {
                            Some(capability) => submission = Some(requester.invoke(capability)),
                            None => message = Some("Send to Base is disabled".to_string()),
                        },
                        ShellInput::Command(ShellCommand::Quit) => input_open = false,
                        ShellInput::Command(ShellCommand::Help) => message = Some(help_text()),
                        ShellInput::Unknown(name) => {
                            message = Some(format!("Unknown command :{} (try :help)", name));
                        }
                    }
                }
                None => input_open = false,
            },
            changed = connection_rx.changed(), if connection_open => match changed {
                Ok(()) => {
                    let state = connection_rx.borrow_and_update().clone();
                    apply_connection(&mut form, &mut balance, ctx.balances.as_ref(), state);
                }
                Err(_) => connection_open = false,
            },
            reading = next_balance(&mut balance) => match reading {
                Ok(reading) => form.on_balance(reading),
                Err(e) => {
                    warn!(error = %e, "Balance feed ended");
                    balance = None;
                    form.on_balance(BalanceReading::failed("0"));
                }
            },
            (request, result) = wait_preparation(&mut preparation) => {
                preparation = None;
                if let Err(e) = &result {
                    debug!(error = %e, "Send preparation unavailable");
                }
                form.on_prepared(&request, result);
            },
            result = wait_submission(&mut submission) => {
                submission = None;
                form.on_submitted(result);
            },
            result = wait_connect(&mut connecting) => {
                connecting = None;
                match result {
                    Ok(_) => apply_connection(&mut form, &mut balance, ctx.balances.as_ref(), session.connection()),
                    Err(e) => {
                        warn!(error = %e, "Wallet connection failed");
                        form.on_connect_error(&e);
                    }
                }
                message = None;
            },
        }

        schedule_preparation(&mut form, &mut preparation, &requester);
        page = build_view(&form, &message);
        render(&page);
    }

    info!("Page closed");
    Ok(page)
}

fn build_view(form: &BridgeForm, message: &Option<String>) -> PageView {
    let view = PageView::from_form(form);
    match message {
        Some(message) => view.with_message(message.clone()),
        None => view,
    }
}

/// Feeds a connection snapshot to the form and keeps the balance
/// subscription on the connected address.
fn apply_connection(
    form: &mut BridgeForm,
    balance: &mut Option<BalanceSubscription>,
    feed: &dyn BalanceFeed,
    state: ConnectionState,
) {
    let address = state.active_address();
    if !form.on_connection(state) {
        return;
    }
    match address {
        Some(address) if balance.as_ref().map(BalanceSubscription::address) == Some(address) => {}
        Some(address) => {
            let mut subscription = feed.subscribe(address);
            form.on_balance(subscription.current());
            *balance = Some(subscription);
            info!(address = ?address, "Watching balance");
        }
        None => *balance = None,
    }
}

/// Drops a preparation the form no longer waits for, then starts the next one.
fn schedule_preparation(
    form: &mut BridgeForm,
    preparation: &mut Option<PreparationHandle>,
    requester: &TransactionRequester,
) {
    let stale = preparation.as_ref().is_some_and(|handle| {
        *form.prepare_status() != PrepareStatus::InFlight || form.request() != Some(handle.request())
    });
    if stale {
        debug!("Aborting superseded preparation");
        *preparation = None;
    }
    if preparation.is_none() {
        if let Some(request) = form.take_preparation_job() {
            *preparation = Some(requester.prepare(request));
        }
    }
}

async fn next_balance(
    subscription: &mut Option<BalanceSubscription>,
) -> Result<BalanceReading, BridgeError> {
    match subscription {
        Some(subscription) => subscription.changed().await,
        None => std::future::pending().await,
    }
}

async fn wait_preparation(
    preparation: &mut Option<PreparationHandle>,
) -> (TransferRequest, Result<SendCapability, BridgeError>) {
    match preparation {
        Some(handle) => {
            let result = handle.join().await;
            (handle.request().clone(), result)
        }
        None => std::future::pending().await,
    }
}

async fn wait_submission(
    submission: &mut Option<SubmissionHandle>,
) -> Result<SubmissionReceipt, BridgeError> {
    match submission {
        Some(handle) => handle.join().await,
        None => std::future::pending().await,
    }
}

async fn wait_connect(
    connecting: &mut Option<JoinHandle<Result<Address, BridgeError>>>,
) -> Result<Address, BridgeError> {
    match connecting {
        Some(handle) => handle.await?,
        None => std::future::pending().await,
    }
}
