const REPLIES: [(&str, &str); 3] = [
    ("price", "You can view live prices on the dashboard!"),
    ("trade", "Use the Trade tab to simulate testnet trading!"),
    ("wallet", "Your wallet balance updates automatically after trades."),
];

const FALLBACK_REPLY: &str = "I'm not sure I understand.";

/// Canned assistant reply. The first keyword found wins.
pub fn get_reply(message: &str) -> &'static str {
    let message = message.to_lowercase();
    REPLIES
        .iter()
        .find(|(keyword, _)| message.contains(keyword))
        .map(|(_, reply)| *reply)
        .unwrap_or(FALLBACK_REPLY)
}
