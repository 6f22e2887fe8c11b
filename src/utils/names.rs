use crate::models::PlayerRecord;

/// The forms a player's name may take on other sites, highest priority first:
/// "First Last", the display name, "Last", then "F. Last".
///
/// Candidates are trimmed; empty and repeated candidates are dropped, a
/// repeat keeping the priority of its first occurrence.
pub fn name_variations(first_name: &str, second_name: &str, web_name: &str) -> Vec<String> {
    let first = first_name.trim();
    let last = second_name.trim();

    let mut candidates = vec![
        format!("{} {}", first, last),
        web_name.trim().to_string(),
        last.to_string(),
    ];
    if let Some(initial) = first.chars().next() {
        candidates.push(format!("{}. {}", initial, last));
    }

    let mut variations: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let candidate = candidate.trim();
        if !candidate.is_empty() && !variations.iter().any(|v| v == candidate) {
            variations.push(candidate.to_string());
        }
    }
    variations
}

pub fn player_name_variations(player: &PlayerRecord) -> Vec<String> {
    name_variations(&player.first_name, &player.second_name, &player.web_name)
}
