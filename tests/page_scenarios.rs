use burn_the_boats::blockchain::mock::{ManualBalanceFeed, MockSendOutcome, MockWalletSession};
use burn_the_boats::blockchain::traits::BalanceReading;
use burn_the_boats::bridge::form::SubmitState;
use burn_the_boats::core::config::AppConfig;
use burn_the_boats::shell::view::{PageView, WalletBlock};
use burn_the_boats::shell::run_page;
use burn_the_boats::{AppContext, BridgeError, BRIDGE_CONTRACT};
use ethers::types::{Address, H160, U256};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const ACCOUNT: Address = H160([0x7a; 20]);

struct Page {
    session: Arc<MockWalletSession>,
    feed: Arc<ManualBalanceFeed>,
    lines: mpsc::Sender<String>,
    views: watch::Receiver<Option<PageView>>,
    task: JoinHandle<Result<PageView, BridgeError>>,
}

impl Page {
    fn start(balance: &str) -> Self {
        let session =
            Arc::new(MockWalletSession::new(ACCOUNT).with_send_delay(Duration::from_millis(300)));
        let feed = Arc::new(ManualBalanceFeed::new(BalanceReading::known(balance)));
        let ctx = AppContext::new(AppConfig::default(), session.clone(), feed.clone());

        let (lines, rx) = mpsc::channel(16);
        let (view_tx, views) = watch::channel(None);
        let task = tokio::spawn(async move {
            run_page(&ctx, rx, move |view: &PageView| {
                view_tx.send_replace(Some(view.clone()));
            })
            .await
        });
        Self { session, feed, lines, views, task }
    }

    async fn type_line(&self, line: &str) {
        self.lines.send(line.to_string()).await.expect("page loop stopped reading");
    }

    async fn wait_for(&mut self, what: &str, pred: impl Fn(&PageView) -> bool) -> PageView {
        let views = &mut self.views;
        let waited = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(view) = views.borrow_and_update().as_ref() {
                    if pred(view) {
                        return view.clone();
                    }
                }
                views.changed().await.expect("page loop ended");
            }
        })
        .await;
        waited.unwrap_or_else(|_| panic!("timed out waiting for {}", what))
    }

    async fn connect(&mut self) -> PageView {
        self.type_line(":connect").await;
        self.wait_for("connection", |v| matches!(v.wallet, WalletBlock::Connected { .. })).await
    }

    async fn finish(self) -> PageView {
        drop(self.lines);
        self.task.await.unwrap().unwrap()
    }
}

#[tokio::test]
async fn full_bridge_flow() {
    let mut page = Page::start("2.0000");
    let first = page.wait_for("first render", |_| true).await;
    assert_eq!(first.balance, "0 ETH");
    assert!(!first.can_submit);

    let connected = page.connect().await;
    assert_eq!(connected.balance, "2.0000 ETH");

    page.type_line("3").await;
    let over = page.wait_for("insufficient notice", |v| v.insufficient_funds).await;
    assert!(!over.can_submit);
    assert!(over.to_string().contains("You dont have enough ETH..."));

    page.type_line("1").await;
    let ready = page.wait_for("ready button", |v| v.button == SubmitState::Ready).await;
    assert!(ready.can_submit);
    assert!(!ready.insufficient_funds);

    page.type_line(":send").await;
    let pending = page.wait_for("pending", |v| v.button == SubmitState::Pending).await;
    assert!(pending.check_wallet);
    assert!(pending.to_string().contains("Check Wallet"));

    let settled = page.wait_for("settled", |v| v.button == SubmitState::Settled).await;
    let result = settled.result.clone().expect("result shown");
    assert!(result.starts_with("Transaction: {"), "{}", result);
    assert!(result.contains("0x49048044d57e1c92a77f79988d21fa8faf74e97e"), "{}", result);
    assert_eq!(settled.raw, "");
    assert!(!settled.check_wallet);

    let sent = page.session.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].request.to, BRIDGE_CONTRACT);
    assert_eq!(sent[0].request.value, U256::exp10(18));

    page.finish().await;
}

#[tokio::test]
async fn rejected_send_shows_failure_and_allows_retry() {
    let mut page = Page::start("5");
    page.connect().await;
    page.session.set_send_outcome(MockSendOutcome::Reject("user rejected".into()));

    page.type_line("1.5").await;
    page.wait_for("ready button", |v| v.button == SubmitState::Ready).await;
    page.type_line(":send").await;

    let failed = page
        .wait_for("failure", |v| v.result.as_deref() == Some("Transaction failed: user rejected"))
        .await;
    assert_eq!(failed.raw, "1.5");
    assert!(page.session.sent().is_empty());

    page.session.set_send_outcome(MockSendOutcome::Succeed);
    let retry = page.wait_for("ready again", |v| v.button == SubmitState::Ready).await;
    assert!(retry.can_submit);
    assert!(retry.to_string().contains("[ Send to Base ]  ready (:send)"));
    assert_eq!(retry.result.as_deref(), Some("Transaction failed: user rejected"));
    page.type_line(":send").await;
    page.wait_for("success", |v| v.result.as_deref().is_some_and(|r| r.starts_with("Transaction: {"))).await;
    assert_eq!(page.session.sent().len(), 1);

    page.finish().await;
}

#[tokio::test]
async fn quitting_waits_for_pending_submission() {
    let mut page = Page::start("2");
    page.connect().await;
    page.type_line("0.5").await;
    page.wait_for("ready button", |v| v.button == SubmitState::Ready).await;
    page.type_line(":send").await;
    page.wait_for("pending", |v| v.check_wallet).await;
    page.type_line(":quit").await;

    let session = page.session.clone();
    let last = page.finish().await;
    assert_eq!(last.button, SubmitState::Settled);
    assert!(last.result.is_some());
    assert_eq!(session.sent().len(), 1);
}

#[tokio::test]
async fn balance_errors_fail_closed() {
    let mut page = Page::start("10");
    page.connect().await;
    page.type_line("1").await;
    page.wait_for("ready button", |v| v.button == SubmitState::Ready).await;

    page.feed.push(BalanceReading::failed("10"));
    let errored = page.wait_for("balance error", |v| v.balance == "Error fetching balance").await;
    assert!(!errored.can_submit);
    assert!(!errored.insufficient_funds);

    page.feed.push(BalanceReading::loading());
    let loading = page.wait_for("balance loading", |v| v.balance == "Fetching balance…").await;
    assert!(!loading.can_submit);

    page.feed.push(BalanceReading::known("10"));
    page.wait_for("balance back", |v| v.can_submit).await;
    page.finish().await;
}

#[tokio::test]
async fn unavailable_preparation_keeps_button_disabled() {
    let mut page = Page::start("10");
    page.session.set_prepare_error(Some("gas estimation failed"));
    page.connect().await;
    page.type_line("1").await;
    page.type_line(":send").await;
    let refused = page.wait_for("refusal", |v| v.message.as_deref() == Some("Send to Base is disabled")).await;
    assert!(!refused.can_submit);
    assert!(page.session.sent().is_empty());
    page.finish().await;
}

#[tokio::test]
async fn disconnect_resets_balance_card() {
    let mut page = Page::start("3");
    page.connect().await;
    page.type_line("4").await;
    page.wait_for("insufficient notice", |v| v.insufficient_funds).await;

    page.type_line(":disconnect").await;
    let view = page.wait_for("disconnect", |v| matches!(v.wallet, WalletBlock::Disconnected { .. })).await;
    assert_eq!(view.balance, "0 ETH");
    assert!(!view.insufficient_funds);
    assert_eq!(view.raw, "4");
    page.finish().await;
}
