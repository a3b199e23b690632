mod amazon;
mod anthropic;

pub use amazon::AmazonAdapter;
pub use anthropic::AnthropicAdapter;

/// Widens a sampling parameter for the JSON body via the shortest decimal
/// representation, so `0.7f32` reaches the wire as `0.7` rather than the
/// raw widened `0.699999988079071`.
pub(crate) fn wire_number(value: f32) -> f64 {
    value.to_string().parse().unwrap_or_else(|_| f64::from(value))
}
