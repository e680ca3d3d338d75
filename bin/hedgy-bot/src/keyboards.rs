use crate::{
    command::{Callback, WalletCallback},
    config::{BUY_AMOUNTS, NATIVE_SYMBOL, SELL_AMOUNTS},
    types::{Button, Keyboard},
};

fn back_button() -> Button {
    Button::new("🔙 Back to Menu", Callback::Menu)
}

pub fn main_menu(symbol: &str) -> Keyboard {
    Keyboard::default()
        .row(vec![
            Button::new("💰 Balance", WalletCallback::Balance.into()),
            Button::new("💧 Faucet", WalletCallback::Faucet.into()),
        ])
        .row(vec![
            Button::new(format!("🛒 Buy {symbol}"), Callback::BuyMenu),
            Button::new(format!("💸 Sell {symbol}"), Callback::SellMenu),
        ])
        .row(vec![
            Button::new("📤 Send", WalletCallback::SendMenu.into()),
            Button::new("👛 My Wallet", WalletCallback::Show.into()),
        ])
        .row(vec![
            Button::new(format!("🌊 Get {NATIVE_SYMBOL}"), WalletCallback::HbarFaucet.into()),
            Button::new("🔑 Export Key", WalletCallback::ExportKey.into()),
        ])
        .row(vec![Button::new("ℹ️ Help", Callback::Help)])
}

/// Amount pickers: three buttons, then two, then back.
fn amount_picker(amounts: &[&str], unit: &str, make: fn(String) -> WalletCallback) -> Keyboard {
    let (first, second) = amounts.split_at(amounts.len().min(3));
    let buttons = |chunk: &[&str]| {
        chunk
            .iter()
            .map(|amount| Button::new(format!("{amount} {unit}"), make(amount.to_string()).into()))
            .collect::<Vec<_>>()
    };
    Keyboard::default()
        .row(buttons(first))
        .row(buttons(second))
        .row(vec![back_button()])
}

pub fn buy_amounts() -> Keyboard {
    amount_picker(&BUY_AMOUNTS, NATIVE_SYMBOL, WalletCallback::Buy)
}

pub fn sell_amounts(symbol: &str) -> Keyboard {
    amount_picker(&SELL_AMOUNTS, symbol, WalletCallback::Sell)
}

pub fn back_to_menu() -> Keyboard {
    Keyboard::default().row(vec![back_button()])
}

pub fn confirm_export() -> Keyboard {
    Keyboard::default().row(vec![
        Button::new("✅ Yes, Export", WalletCallback::ConfirmExport.into()),
        Button::new("❌ Cancel", Callback::Menu),
    ])
}

pub fn send_menu(symbol: &str) -> Keyboard {
    Keyboard::default()
        .row(vec![
            Button::new(format!("💎 Send {symbol}"), Callback::SendToken),
            Button::new(format!("💰 Send {NATIVE_SYMBOL}"), Callback::SendNative),
        ])
        .row(vec![back_button()])
}
