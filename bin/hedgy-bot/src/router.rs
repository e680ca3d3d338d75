use std::{sync::Arc, time::Duration};

use alloy::primitives::U256;
use burberry::ActionSubmitter;
use eyre::Result;
use hedgy_contracts::ContractGateway;
use hedgy_store::{SendKind, SessionStore, UserStore};
use tracing::{debug, error, info, warn};
use utils::{
    link::{account_url, tx_url},
    units::{format_amount, format_amount_trimmed, parse_positive_amount, tinybar_to_weibar, WEIBAR_DECIMALS},
};

use crate::{
    command::{Callback, Command, CommandError, WalletCallback, WalletCommand},
    config::{BotSettings, NATIVE_SYMBOL, SECRET_MESSAGE_TTL},
    cooldown::{self, Clock},
    guard::{FailureReason, Guards},
    keyboards, messages,
    send_input::{self, SendInputError},
    types::{Action, ChatUser, Event, IncomingCallback, IncomingMessage, Keyboard, MessageRef, OutgoingMessage},
    wallet::{Wallet, Wallets},
};

pub type Submitter<'a> = &'a dyn ActionSubmitter<Action>;

/// Turns decoded commands and button presses into chat actions.
pub struct Router {
    wallets: Wallets,
    sessions: Arc<dyn SessionStore>,
    guards: Guards,
    gateway: Arc<dyn ContractGateway>,
    clock: Arc<dyn Clock>,
    settings: Arc<BotSettings>,
}

fn edit(target: MessageRef, text: String, keyboard: Option<Keyboard>) -> Action {
    Action::Edit { target, text, keyboard }
}

impl Router {
    pub fn new(
        gateway: Arc<dyn ContractGateway>,
        store: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        settings: Arc<BotSettings>,
    ) -> Self {
        Self {
            wallets: Wallets::new(store.clone(), clock.clone()),
            sessions,
            guards: Guards::new(gateway.clone(), store, clock.clone(), settings.clone()),
            gateway,
            clock,
            settings,
        }
    }

    /// Never fails: errors are logged and answered with an apology.
    pub async fn handle(&self, event: Event, out: Submitter<'_>) {
        let user = event.user_id();
        let chat = match &event {
            Event::Message(msg) => Some(msg.chat_id),
            Event::Callback(cb) => cb.origin.map(|o| o.chat_id),
        };

        let result = match event {
            Event::Message(msg) => self.on_message(msg, out).await,
            Event::Callback(cb) => self.on_callback(cb, out).await,
        };

        if let Err(e) = result {
            error!(user, ?chat, error = %format!("{e:#}"), "event handling failed");
            if let Some(chat) = chat {
                out.submit(OutgoingMessage::new(chat, messages::apology()).into());
            }
        }
    }

    fn symbol(&self) -> &str {
        &self.settings.token_symbol
    }

    fn tokens(&self, value: U256, precision: u8) -> String {
        format_amount(value, self.settings.token_decimals, precision)
    }

    async fn on_message(&self, msg: IncomingMessage, out: Submitter<'_>) -> Result<()> {
        match Command::parse(&msg.text) {
            Ok(command) => {
                debug!(user = msg.from.id, chat = msg.chat_id, ?command, "command");
                self.on_command(command, &msg, out).await
            }
            Err(CommandError::Unknown(name)) => {
                debug!(user = msg.from.id, %name, "ignoring unknown command");
                Ok(())
            }
            Err(CommandError::NotACommand) => self.on_free_text(&msg, out).await,
        }
    }

    async fn on_command(&self, command: Command, msg: &IncomingMessage, out: Submitter<'_>) -> Result<()> {
        let chat = msg.chat_id;
        let reply = |text: String| OutgoingMessage::new(chat, text);

        let reply = match command {
            Command::Start => return self.start(&msg.from, chat, out).await,
            Command::Help => reply(messages::help(self.symbol())).keyboard(keyboards::back_to_menu()),
            Command::Buy => reply(messages::use_menu_to_buy()),
            Command::Sell => reply(messages::use_menu_to_sell()),
            Command::Status => {
                out.submit(Action::Typing(chat));
                reply(self.status_text().await).keyboard(keyboards::back_to_menu())
            }
            Command::Wallet(command) => {
                let Some(wallet) = self.wallets.get(msg.from.id)? else {
                    out.submit(reply(messages::no_wallet()).into());
                    return Ok(());
                };
                self.on_wallet_command(command, &wallet, chat, out).await
            }
        };
        out.submit(reply.into());
        Ok(())
    }

    async fn on_wallet_command(
        &self,
        command: WalletCommand,
        wallet: &Wallet,
        chat: i64,
        out: Submitter<'_>,
    ) -> OutgoingMessage {
        let reply = |text: String| OutgoingMessage::new(chat, text);
        match command {
            WalletCommand::Balance => {
                out.submit(Action::Typing(chat));
                reply(self.balances_text(wallet).await).keyboard(keyboards::back_to_menu())
            }
            WalletCommand::Faucet => {
                out.submit(Action::Typing(chat));
                reply(self.claim_text(wallet).await).keyboard(keyboards::back_to_menu())
            }
            WalletCommand::Show => reply(self.wallet_text(wallet)).keyboard(keyboards::back_to_menu()),
            WalletCommand::Export => reply(messages::export_warning()).keyboard(keyboards::confirm_export()),
            WalletCommand::HbarFaucet => {
                reply(messages::hbar_faucet(&wallet.address, self.symbol())).keyboard(keyboards::back_to_menu())
            }
            WalletCommand::Send => reply(messages::send_menu()).keyboard(keyboards::send_menu(self.symbol())),
        }
    }

    async fn start(&self, from: &ChatUser, chat: i64, out: Submitter<'_>) -> Result<()> {
        let (wallet, created) = self.wallets.get_or_create(from.id, from.username.as_deref()).await?;
        if created {
            info!(user = from.id, chat, address = %wallet.address, "new user");
        }
        out.submit(
            OutgoingMessage::new(chat, messages::welcome(&wallet.address, created))
                .keyboard(keyboards::main_menu(self.symbol()))
                .into(),
        );
        Ok(())
    }

    async fn on_callback(&self, cb: IncomingCallback, out: Submitter<'_>) -> Result<()> {
        out.submit(Action::AnswerCallback(cb.query_id.clone()));

        let user = cb.from.id;
        let Some(origin) = cb.origin else {
            warn!(user, data = ?cb.data, "callback without a message");
            return Ok(());
        };
        let chat = origin.chat_id;
        let Some(callback) = cb.data.as_deref().and_then(Callback::decode) else {
            warn!(user, data = ?cb.data, "undecodable callback data");
            out.submit(OutgoingMessage::new(chat, messages::invalid_action()).into());
            return Ok(());
        };
        debug!(user, chat, ?callback, "callback");

        match callback {
            Callback::Menu => {
                if self.sessions.cancel(user) {
                    debug!(user, "pending send cancelled");
                }
                out.submit(edit(origin, messages::main_menu(), Some(keyboards::main_menu(self.symbol()))));
            }
            Callback::BuyMenu => {
                out.submit(edit(origin, messages::buy_menu(self.symbol()), Some(keyboards::buy_amounts())));
            }
            Callback::SellMenu => {
                let keyboard = keyboards::sell_amounts(self.symbol());
                out.submit(edit(origin, messages::sell_menu(self.symbol()), Some(keyboard)));
            }
            Callback::Help => {
                out.submit(edit(origin, messages::help(self.symbol()), Some(keyboards::back_to_menu())));
            }
            Callback::SendToken => self.open_send(user, SendKind::Token, origin, out),
            Callback::SendNative => self.open_send(user, SendKind::Native, origin, out),
            Callback::Wallet(callback) => {
                let Some(wallet) = self.wallets.get(user)? else {
                    out.submit(edit(origin, messages::no_wallet(), None));
                    return Ok(());
                };
                self.on_wallet_callback(callback, &wallet, origin, out).await;
            }
        }
        Ok(())
    }

    fn open_send(&self, user: u64, kind: SendKind, origin: MessageRef, out: Submitter<'_>) {
        let pending = self.sessions.begin(user, kind, origin.chat_id, self.clock.now());
        debug!(user, chat = origin.chat_id, %kind, expires = %pending.expires_at, "send intent opened");
        out.submit(edit(
            origin,
            messages::send_prompt(kind, self.symbol()),
            Some(keyboards::back_to_menu()),
        ));
    }

    async fn on_wallet_callback(&self, callback: WalletCallback, wallet: &Wallet, origin: MessageRef, out: Submitter<'_>) {
        let chat = origin.chat_id;
        let back = Some(keyboards::back_to_menu());
        match callback {
            WalletCallback::Balance => {
                out.submit(edit(origin, messages::fetching_balances(), None));
                out.submit(edit(origin, self.balances_text(wallet).await, back));
            }
            WalletCallback::Faucet => {
                out.submit(edit(origin, messages::claiming_faucet(), None));
                let text = self.claim_text(wallet).await;
                out.submit(OutgoingMessage::new(chat, text).keyboard(keyboards::back_to_menu()).into());
                out.submit(Action::Delete(origin));
            }
            WalletCallback::Show => {
                let text = self.wallet_text(wallet);
                out.submit(OutgoingMessage::new(chat, text).keyboard(keyboards::back_to_menu()).into());
                out.submit(Action::Delete(origin));
            }
            WalletCallback::ExportKey => {
                out.submit(edit(origin, messages::export_warning(), Some(keyboards::confirm_export())));
            }
            WalletCallback::ConfirmExport => {
                info!(user = wallet.user, chat, "private key exported");
                out.submit(Action::Delete(origin));
                out.submit(
                    OutgoingMessage::new(chat, messages::private_key(wallet.secret().expose()))
                        .self_destruct(SECRET_MESSAGE_TTL)
                        .into(),
                );
                out.submit(
                    OutgoingMessage::new(chat, messages::menu_heading())
                        .keyboard(keyboards::main_menu(self.symbol()))
                        .into(),
                );
            }
            WalletCallback::HbarFaucet => {
                out.submit(edit(origin, messages::hbar_faucet(&wallet.address, self.symbol()), back));
            }
            WalletCallback::SendMenu => {
                out.submit(edit(origin, messages::send_menu(), Some(keyboards::send_menu(self.symbol()))));
            }
            WalletCallback::Buy(amount) => {
                out.submit(edit(origin, messages::buy_processing(&amount, self.symbol()), None));
                let text = match self.guards.buy(wallet, &amount).await {
                    Ok(s) => messages::buy_success(&amount, &s.amount, self.symbol(), &s.tx_hash),
                    Err(f) => messages::buy_failed(&f.message),
                };
                out.submit(edit(origin, text, back));
            }
            WalletCallback::Sell(amount) => {
                out.submit(edit(origin, messages::sell_processing(&amount, self.symbol()), None));
                let text = match self.guards.sell(wallet, &amount).await {
                    Ok(s) => messages::sell_success(&amount, self.symbol(), &s.amount, &s.tx_hash),
                    Err(f) => messages::sell_failed(&f.message, self.symbol()),
                };
                out.submit(edit(origin, text, back));
            }
        }
    }

    /// The `<address> <amount>` reply to a send prompt. Anything else is ignored.
    async fn on_free_text(&self, msg: &IncomingMessage, out: Submitter<'_>) -> Result<()> {
        let (user, chat) = (msg.from.id, msg.chat_id);
        let now = self.clock.now();
        let Some(open) = self.sessions.peek(user, chat, now) else {
            return Ok(());
        };

        // a malformed reply leaves the intent open for another try
        let input = match send_input::parse(&msg.text) {
            Ok(input) => input,
            Err(e) => {
                debug!(user, chat, error = %e, "bad send input");
                let text = match e {
                    SendInputError::WrongShape => messages::send_format_error(),
                    SendInputError::InvalidAmount => messages::invalid_amount(),
                };
                out.submit(OutgoingMessage::new(chat, text).into());
                return Ok(());
            }
        };

        let decimals = match open.kind {
            SendKind::Native => WEIBAR_DECIMALS,
            SendKind::Token => self.settings.token_decimals,
        };
        if let Err(e) = parse_positive_amount(input.amount, decimals) {
            debug!(user, chat, amount = input.amount, error = %e, "send amount out of range");
            out.submit(OutgoingMessage::new(chat, messages::invalid_amount()).into());
            return Ok(());
        }

        let Some(pending) = self.sessions.take(user, chat, now) else {
            debug!(user, chat, "send intent already consumed");
            return Ok(());
        };
        let Some(wallet) = self.wallets.get(user)? else {
            out.submit(OutgoingMessage::new(chat, messages::no_wallet()).into());
            return Ok(());
        };

        out.submit(Action::Typing(chat));
        let outcome = self
            .guards
            .transfer(&wallet, pending.kind, input.recipient, input.amount)
            .await;
        let text = match outcome {
            Ok(s) => {
                let symbol = match pending.kind {
                    SendKind::Token => self.symbol(),
                    SendKind::Native => NATIVE_SYMBOL,
                };
                let recipient = s
                    .recipient
                    .map(|a| a.to_checksum(None))
                    .unwrap_or_else(|| input.recipient.to_string());
                let url = tx_url(&self.settings.network, &s.tx_hash);
                messages::send_success(&s.amount, symbol, &recipient, &s.tx_hash, &url)
            }
            Err(f) => messages::send_failed(&f.message),
        };
        out.submit(OutgoingMessage::new(chat, text).no_preview().into());
        Ok(())
    }

    async fn balances_text(&self, wallet: &Wallet) -> String {
        let balances = tokio::try_join!(
            self.gateway.token_balance(wallet.address),
            self.gateway.native_balance(wallet.address)
        );
        match balances {
            Ok((tokens, native)) => messages::balances(
                self.symbol(),
                &self.tokens(tokens, 2),
                &format_amount(native, WEIBAR_DECIMALS, 4),
                &wallet.address,
            ),
            Err(e) => {
                warn!(user = wallet.user, error = %format!("{e:#}"), "balance lookup failed");
                messages::balance_failed()
            }
        }
    }

    async fn claim_text(&self, wallet: &Wallet) -> String {
        match self.guards.claim_faucet(wallet).await {
            Ok(s) => messages::faucet_success(&s.amount, self.symbol(), &s.tx_hash, &self.faucet_period().await),
            Err(f) if f.reason == FailureReason::Cooldown => {
                let drip = self.tokens(self.settings.drip_amount, 0);
                messages::faucet_cooldown(&f.message, &drip, self.symbol(), &self.faucet_period().await)
            }
            Err(f) => messages::faucet_failed(&f.message),
        }
    }

    /// Claim interval in words. The faucet contract's own setting wins when readable.
    async fn faucet_period(&self) -> String {
        let period = match self.gateway.faucet_cooldown().await {
            Ok(secs) => Duration::from_secs(secs),
            Err(e) => {
                debug!(error = %e, "cooldownTime unreadable, using the configured cooldown");
                self.settings.faucet_cooldown
            }
        };
        cooldown::describe_period(period)
    }

    fn wallet_text(&self, wallet: &Wallet) -> String {
        messages::wallet(&wallet.address, &account_url(&self.settings.network, &wallet.address))
    }

    async fn status_text(&self) -> String {
        let gateway = &self.gateway;
        let reads = match tokio::try_join!(
            gateway.faucet_balance(),
            gateway.faucet_drip_amount(),
            gateway.faucet_cooldown(),
            gateway.buy_liquidity(),
            gateway.buy_price(),
            gateway.buy_bounds(),
            gateway.sell_liquidity_tinybar(),
            gateway.sell_price(),
            gateway.sell_bounds(),
        ) {
            Ok(reads) => reads,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "status lookup failed");
                return messages::status_failed();
            }
        };
        let (faucet_balance, drip, faucet_cooldown, buy_stock, buy_price, buy_bounds, sell_tinybar, sell_price, sell_bounds) =
            reads;

        let status = messages::ContractStatus {
            faucet_balance: self.tokens(faucet_balance, 2),
            drip_amount: self.tokens(drip, 2),
            faucet_period: cooldown::describe_period(Duration::from_secs(faucet_cooldown)),
            buy_available: self.tokens(buy_stock, 2),
            buy_price: format_amount_trimmed(buy_price, WEIBAR_DECIMALS),
            buy_min: self.tokens(buy_bounds.min, 0),
            buy_max: self.tokens(buy_bounds.max, 0),
            sell_available: format_amount(tinybar_to_weibar(sell_tinybar), WEIBAR_DECIMALS, 2),
            sell_price: format_amount_trimmed(sell_price, WEIBAR_DECIMALS),
            sell_min: self.tokens(sell_bounds.min, 0),
            sell_max: self.tokens(sell_bounds.max, 0),
        };
        messages::status(&self.settings.token_name, self.symbol(), &status, self.settings.version)
    }
}
