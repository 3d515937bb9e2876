/// Display text for a ticket count.
///
/// Counts above ten intentionally produce no text at all, so listings only
/// call out scarcity.
pub fn availability_text(count: u32) -> String {
    match count {
        0 => "SOLD OUT".to_string(),
        1..=10 => format!("{count} seats left"),
        _ => String::new(),
    }
}
