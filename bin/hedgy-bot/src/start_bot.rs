use std::{sync::Arc, time::Duration};

use ::utils::{
    heartbeat,
    telegram::{set_admin_chat, AdminChat},
};
use burberry::Engine;
use clap::Parser;
use eyre::{eyre, Result};
use hedgy_contracts::RpcGateway;
use hedgy_store::{FileStore, MemorySessionStore, SessionStore, UserStore};
use teloxide::Bot;
use tracing::{info, warn};

use crate::{
    collector::TelegramUpdateCollector,
    config::{
        BotSettings, ContractsConfig, FaucetConfig, NetworkConfig, StoreConfig, TelegramConfig, TokenConfig,
        HEARTBEAT_INTERVAL, POLL_TIMEOUT_SECS,
    },
    cooldown::{Clock, SystemClock},
    executor::TelegramExecutor,
    router::Router,
    strategy::{BotStrategy, UserLocks},
    types::{Action, Event},
    BUILD_VERSION,
};

#[derive(Clone, Debug, Parser)]
pub struct Args {
    #[command(flatten)]
    pub network: NetworkConfig,

    #[command(flatten)]
    pub contracts: ContractsConfig,

    #[command(flatten)]
    pub token: TokenConfig,

    #[command(flatten)]
    pub faucet: FaucetConfig,

    #[command(flatten)]
    pub store: StoreConfig,

    #[command(flatten)]
    pub telegram: TelegramConfig,
}

pub async fn run(args: Args) -> Result<()> {
    if let Some(chat_id) = &args.telegram.admin_chat_id {
        set_admin_chat(AdminChat {
            bot_token: args.telegram.telegram_bot_token.clone(),
            chat_id: chat_id.clone(),
            thread_id: None,
        });
    }
    utils::set_panic_hook();
    hedgy_logger::init_with_whitelisted_modules(
        &args.network.network,
        "hedgy-bot",
        &["hedgy_bot", "hedgy_contracts", "hedgy_store", "utils"],
    );

    info!(
        version = BUILD_VERSION,
        "start_bot network: {:#?}, contracts: {:#?}, token: {:#?}, faucet: {:#?}, store: {:#?}, telegram: {:#?}",
        args.network,
        args.contracts,
        args.token,
        args.faucet,
        args.store,
        args.telegram
    );

    let gateway = RpcGateway::new(&args.network.rpc_url, args.contracts.addresses())?;
    match gateway.chain_id().await {
        Ok(id) if id != args.network.chain_id => {
            warn!(expected = args.network.chain_id, actual = id, "rpc reports a different chain id")
        }
        Ok(id) => info!(chain_id = id, "connected to rpc"),
        Err(e) => warn!(error = %e, "could not read chain id, continuing"),
    }

    let store = Arc::new(FileStore::open(&args.store.db_path)?);
    info!(path = %args.store.db_path.display(), users = store.user_count()?, "user store opened");

    let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(args.store.session_ttl)));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let settings = Arc::new(BotSettings::new(&args.network, &args.token, &args.faucet, BUILD_VERSION));
    let router = Router::new(Arc::new(gateway), store, sessions.clone(), clock.clone(), settings);

    let locks = UserLocks::default();
    let bot = Bot::new(args.telegram.telegram_bot_token.clone());

    let mut engine = Engine::<Event, Action>::default();
    engine.add_collector(Box::new(TelegramUpdateCollector::new(bot.clone(), POLL_TIMEOUT_SECS)));
    engine.add_strategy(Box::new(BotStrategy::new(router, locks.clone())));
    engine.add_executor(Box::new(TelegramExecutor::new(bot)));

    heartbeat::start("hedgy-bot", HEARTBEAT_INTERVAL, move || {
        let expired = sessions.purge_expired(clock.now());
        let locked = locks.prune();
        format!("pending sends: {}, expired: {expired}, user locks: {locked}", sessions.len())
    });

    info!("hedgy-bot engine starting");
    engine
        .run_and_join()
        .await
        .map_err(|e| eyre!("engine stopped: {e:?}"))?;

    Ok(())
}
